//! Test assertions for pipelines.

use crate::errors::{FaultKind, IncompatibilityError, InvocationFault, Location};
use crate::testing::CallLog;

/// Asserts that a construction or subscription failed with the given code.
pub fn assert_incompatible<T: std::fmt::Debug>(
    result: &Result<T, IncompatibilityError>,
    expected_code: &str,
) {
    match result {
        Ok(value) => panic!("Expected incompatibility {expected_code}, got Ok({value:?})"),
        Err(err) => assert_eq!(
            err.code(),
            expected_code,
            "Expected incompatibility {expected_code}, got: {err}"
        ),
    }
}

/// Asserts that a send faulted with the given kind at the given location.
pub fn assert_fault_at(
    result: &Result<(), InvocationFault>,
    expected_kind: FaultKind,
    expected_location: &Location,
) {
    match result {
        Ok(()) => panic!("Expected {expected_kind} fault at {expected_location}, got Ok"),
        Err(fault) => {
            assert_eq!(
                fault.kind, expected_kind,
                "Expected {expected_kind} fault, got: {fault}"
            );
            assert_eq!(
                fault.location.as_ref(),
                Some(expected_location),
                "Expected fault at {expected_location}, got: {fault}"
            );
        }
    }
}

/// Asserts that a call log holds exactly `expected`, in order.
pub fn assert_call_order(log: &CallLog, expected: &[&str]) {
    let actual = log.lock().clone();
    assert_eq!(
        actual, expected,
        "Expected call order {expected:?}, got {actual:?}"
    );
}
