//! Testing utilities for fanpipe pipelines.
//!
//! This module provides:
//! - Recording and failing callables
//! - Assertions for incompatibilities, faults and call order

mod assertions;
mod mocks;

pub use assertions::{assert_call_order, assert_fault_at, assert_incompatible};
pub use mocks::{new_call_log, CallLog, FailingCallable, RecordingCallable};
