//! Type compatibility checking between callables.
//!
//! The checker is positional and strict about arity: a producer's outputs
//! must line up one-for-one with a consumer's inputs. Partial application and
//! variadic adaptation are not supported.

use crate::callable::Handle;
use crate::errors::{IncompatibilityError, Role};
use crate::types::{ConversionPolicy, ValueType};
use tracing::trace;

/// Checks that `producer`'s outputs can be passed positionally as
/// `consumer`'s inputs, using the default widening policy.
///
/// # Errors
///
/// Returns `NotCallable` if either handle is a plain value (producer first),
/// `ArityMismatch` if the counts differ, or `TypeMismatch` for the first
/// position whose types are neither identical nor convertible.
pub fn check_compatible(producer: &Handle, consumer: &Handle) -> Result<(), IncompatibilityError> {
    check_compatible_with(producer, consumer, ConversionPolicy::default())
}

/// Policy-aware form of [`check_compatible`].
///
/// # Errors
///
/// See [`check_compatible`].
pub fn check_compatible_with(
    producer: &Handle,
    consumer: &Handle,
    policy: ConversionPolicy,
) -> Result<(), IncompatibilityError> {
    let producer = producer.as_callable(Role::Producer)?;
    let consumer = consumer.as_callable(Role::Consumer)?;

    trace!(
        producer = producer.name(),
        consumer = consumer.name(),
        "checking compatibility"
    );
    check_signatures(producer.output_types(), consumer.input_types(), policy)
}

/// Checks raw type lists: `outputs` feeding `inputs`.
///
/// # Errors
///
/// Returns `ArityMismatch` or `TypeMismatch`.
pub fn check_signatures(
    outputs: &[ValueType],
    inputs: &[ValueType],
    policy: ConversionPolicy,
) -> Result<(), IncompatibilityError> {
    if outputs.len() != inputs.len() {
        return Err(IncompatibilityError::ArityMismatch {
            produced: outputs.len(),
            expected: inputs.len(),
        });
    }

    for (position, (&out, &inp)) in outputs.iter().zip(inputs).enumerate() {
        if !policy.permits(out, inp) {
            return Err(IncompatibilityError::TypeMismatch {
                position,
                producer: out,
                consumer: inp,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::FnCallable;
    use crate::types::Value;
    use pretty_assertions::assert_eq;

    fn double() -> Handle {
        FnCallable::unary("double", |n: i64| 2 * n).into()
    }

    #[test]
    fn test_identical_types_are_compatible() {
        assert_eq!(check_compatible(&double(), &double()), Ok(()));
    }

    #[test]
    fn test_widening_is_compatible() {
        let small = FnCallable::nullary("small", || 7_i32).into();
        assert_eq!(check_compatible(&small, &double()), Ok(()));
    }

    #[test]
    fn test_strict_policy_rejects_widening() {
        let small = FnCallable::nullary("small", || 7_i32).into();
        let err = check_compatible_with(&small, &double(), ConversionPolicy::Strict).unwrap_err();
        assert_eq!(
            err,
            IncompatibilityError::TypeMismatch {
                position: 0,
                producer: ValueType::I32,
                consumer: ValueType::I64
            }
        );
    }

    #[test]
    fn test_any_consumer_accepts_anything() {
        let log = FnCallable::unary("log", |v: Value| format!("log(): {v}")).into();
        assert_eq!(check_compatible(&double(), &log), Ok(()));
    }

    #[test]
    fn test_arity_mismatch() {
        let pair = FnCallable::nullary("pair", || (1_i64, 2_i64)).into();
        let err = check_compatible(&pair, &double()).unwrap_err();
        assert_eq!(
            err,
            IncompatibilityError::ArityMismatch {
                produced: 2,
                expected: 1
            }
        );
    }

    #[test]
    fn test_type_mismatch_reports_first_bad_position() {
        let pair = FnCallable::nullary("pair", || (1_i64, String::new())).into();
        let sum = FnCallable::binary("sum", |a: i64, b: i64| a + b).into();
        let err = check_compatible(&pair, &sum).unwrap_err();
        assert_eq!(
            err,
            IncompatibilityError::TypeMismatch {
                position: 1,
                producer: ValueType::Str,
                consumer: ValueType::I64
            }
        );
    }

    #[test]
    fn test_not_callable_producer_checked_first() {
        let value = Handle::from(Value::Bool(true));
        let other = Handle::from(Value::I64(1));
        let err = check_compatible(&value, &other).unwrap_err();
        assert_eq!(
            err,
            IncompatibilityError::NotCallable {
                role: Role::Producer,
                found: ValueType::Bool
            }
        );

        let err = check_compatible(&double(), &other).unwrap_err();
        assert_eq!(
            err,
            IncompatibilityError::NotCallable {
                role: Role::Consumer,
                found: ValueType::I64
            }
        );
    }

    #[test]
    fn test_zero_outputs_feed_zero_inputs() {
        let print = FnCallable::unary("print", |_s: String| ()).into();
        let notify = FnCallable::nullary("notify", || ()).into();
        assert_eq!(check_compatible(&print, &notify), Ok(()));
    }
}
