//! Mapping between Rust types and runtime values.

use super::{Value, ValueType};

/// A Rust type with a fixed runtime [`ValueType`].
///
/// Typed callable constructors use this to derive a signature from a closure
/// and to move arguments in and out of [`Value`]s. [`Value`] itself maps to
/// [`ValueType::Any`], which lets a closure accept whatever it is handed.
pub trait NativeType: Sized {
    /// The runtime tag for this type.
    const VALUE_TYPE: ValueType;

    /// Wraps the native value.
    fn into_value(self) -> Value;

    /// Unwraps a value carrying exactly this type's tag.
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_native_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl NativeType for $ty {
                const VALUE_TYPE: ValueType = ValueType::$variant;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_native_type! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => Str,
    Vec<u8> => Bytes,
}

impl NativeType for Value {
    const VALUE_TYPE: ValueType = ValueType::Any;

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_round_trip_keeps_tag() {
        assert_eq!(<i64 as NativeType>::VALUE_TYPE, ValueType::I64);
        assert_eq!(42_i64.into_value(), Value::I64(42));
        assert_eq!(i64::from_value(Value::I64(42)), Some(42));
    }

    #[test]
    fn test_from_value_rejects_other_tags() {
        assert_eq!(i64::from_value(Value::I32(1)), None);
        assert_eq!(String::from_value(Value::Bytes(vec![])), None);
    }

    #[test]
    fn test_value_is_any() {
        assert_eq!(<Value as NativeType>::VALUE_TYPE, ValueType::Any);
        assert_eq!(Value::from_value(Value::Bool(false)), Some(Value::Bool(false)));
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(Value::from("hi"), Value::Str("hi".to_string()));
        assert_eq!(Value::from(1.5_f64), Value::F64(1.5));
    }
}
