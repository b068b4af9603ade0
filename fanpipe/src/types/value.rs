//! Tagged runtime values.

use super::{is_convertible, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A positional argument or return value flowing between stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// 8-bit signed integer.
    I8(i8),
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit unsigned integer.
    U64(u64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

/// A value could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {from} value to {to}")]
pub struct ConversionError {
    /// The value's own type.
    pub from: ValueType,
    /// The requested type.
    pub to: ValueType,
}

impl Value {
    /// Returns the runtime tag of this value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::I8(_) => ValueType::I8,
            Self::I16(_) => ValueType::I16,
            Self::I32(_) => ValueType::I32,
            Self::I64(_) => ValueType::I64,
            Self::U8(_) => ValueType::U8,
            Self::U16(_) => ValueType::U16,
            Self::U32(_) => ValueType::U32,
            Self::U64(_) => ValueType::U64,
            Self::F32(_) => ValueType::F32,
            Self::F64(_) => ValueType::F64,
            Self::Str(_) => ValueType::Str,
            Self::Bytes(_) => ValueType::Bytes,
        }
    }

    /// Converts this value so that it carries the `target` tag.
    ///
    /// Values already of the target type, and any value targeted at
    /// [`ValueType::Any`], are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] when [`is_convertible`] rejects the pair.
    pub fn convert_to(self, target: ValueType) -> Result<Self, ConversionError> {
        let from = self.value_type();
        if from == target || target == ValueType::Any {
            return Ok(self);
        }
        if !is_convertible(from, target) {
            return Err(ConversionError { from, to: target });
        }
        self.widen(target).ok_or(ConversionError { from, to: target })
    }

    fn widen(&self, target: ValueType) -> Option<Self> {
        let widened = match target {
            ValueType::I16 => match *self {
                Self::I8(v) => Self::I16(v.into()),
                Self::U8(v) => Self::I16(v.into()),
                _ => return None,
            },
            ValueType::I32 => match *self {
                Self::I8(v) => Self::I32(v.into()),
                Self::I16(v) => Self::I32(v.into()),
                Self::U8(v) => Self::I32(v.into()),
                Self::U16(v) => Self::I32(v.into()),
                _ => return None,
            },
            ValueType::I64 => match *self {
                Self::I8(v) => Self::I64(v.into()),
                Self::I16(v) => Self::I64(v.into()),
                Self::I32(v) => Self::I64(v.into()),
                Self::U8(v) => Self::I64(v.into()),
                Self::U16(v) => Self::I64(v.into()),
                Self::U32(v) => Self::I64(v.into()),
                _ => return None,
            },
            ValueType::U16 => match *self {
                Self::U8(v) => Self::U16(v.into()),
                _ => return None,
            },
            ValueType::U32 => match *self {
                Self::U8(v) => Self::U32(v.into()),
                Self::U16(v) => Self::U32(v.into()),
                _ => return None,
            },
            ValueType::U64 => match *self {
                Self::U8(v) => Self::U64(v.into()),
                Self::U16(v) => Self::U64(v.into()),
                Self::U32(v) => Self::U64(v.into()),
                _ => return None,
            },
            ValueType::F32 => match *self {
                Self::I8(v) => Self::F32(v.into()),
                Self::I16(v) => Self::F32(v.into()),
                Self::U8(v) => Self::F32(v.into()),
                Self::U16(v) => Self::F32(v.into()),
                _ => return None,
            },
            ValueType::F64 => match *self {
                Self::I8(v) => Self::F64(v.into()),
                Self::I16(v) => Self::F64(v.into()),
                Self::I32(v) => Self::F64(v.into()),
                Self::U8(v) => Self::F64(v.into()),
                Self::U16(v) => Self::F64(v.into()),
                Self::U32(v) => Self::F64(v.into()),
                Self::F32(v) => Self::F64(v.into()),
                _ => return None,
            },
            _ => return None,
        };
        Some(widened)
    }

    /// Renders the value as plain JSON for events and diagnostics.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(v) => serde_json::json!(v),
            Self::I8(v) => serde_json::json!(v),
            Self::I16(v) => serde_json::json!(v),
            Self::I32(v) => serde_json::json!(v),
            Self::I64(v) => serde_json::json!(v),
            Self::U8(v) => serde_json::json!(v),
            Self::U16(v) => serde_json::json!(v),
            Self::U32(v) => serde_json::json!(v),
            Self::U64(v) => serde_json::json!(v),
            Self::F32(v) => serde_json::json!(v),
            Self::F64(v) => serde_json::json!(v),
            Self::Str(v) => serde_json::json!(v),
            Self::Bytes(v) => serde_json::json!(v),
        }
    }

    /// Returns the string contents if this is a `Str` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::Bytes(v) => write!(f, "{v:?}"),
        }
    }
}

/// Renders a list of values as a JSON array.
pub(crate) fn values_to_json(values: &[Value]) -> serde_json::Value {
    serde_json::Value::Array(values.iter().map(Value::to_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(ty: ValueType) -> Option<Value> {
        Some(match ty {
            ValueType::Bool => Value::Bool(true),
            ValueType::I8 => Value::I8(-8),
            ValueType::I16 => Value::I16(-16),
            ValueType::I32 => Value::I32(-32),
            ValueType::I64 => Value::I64(-64),
            ValueType::U8 => Value::U8(8),
            ValueType::U16 => Value::U16(16),
            ValueType::U32 => Value::U32(32),
            ValueType::U64 => Value::U64(64),
            ValueType::F32 => Value::F32(1.5),
            ValueType::F64 => Value::F64(2.5),
            ValueType::Str => Value::Str("s".to_string()),
            ValueType::Bytes => Value::Bytes(vec![1, 2]),
            ValueType::Any => return None,
        })
    }

    #[test]
    fn test_conversion_agrees_with_table() {
        for from in ValueType::ALL {
            let Some(value) = sample(from) else { continue };
            for to in ValueType::ALL {
                let converted = value.clone().convert_to(to);
                assert_eq!(
                    converted.is_ok(),
                    is_convertible(from, to),
                    "{from} -> {to}"
                );
                if let Ok(converted) = converted {
                    if to != ValueType::Any {
                        assert_eq!(converted.value_type(), to);
                    }
                }
            }
        }
    }

    #[test]
    fn test_widening_preserves_value() {
        assert_eq!(Value::I32(-7).convert_to(ValueType::I64), Ok(Value::I64(-7)));
        assert_eq!(Value::U32(7).convert_to(ValueType::F64), Ok(Value::F64(7.0)));
        assert_eq!(Value::F32(0.5).convert_to(ValueType::F64), Ok(Value::F64(0.5)));
    }

    #[test]
    fn test_rejected_conversion_reports_types() {
        let err = Value::I64(1).convert_to(ValueType::I32).unwrap_err();
        assert_eq!(
            err,
            ConversionError {
                from: ValueType::I64,
                to: ValueType::I32
            }
        );
        assert_eq!(err.to_string(), "cannot convert i64 value to i32");
    }

    #[test]
    fn test_display_and_json() {
        assert_eq!(Value::Str("log(): 3".into()).to_string(), "log(): 3");
        assert_eq!(Value::I64(3).to_string(), "3");
        assert_eq!(Value::Bytes(vec![1, 2]).to_json(), serde_json::json!([1, 2]));
        assert_eq!(
            values_to_json(&[Value::Bool(true), Value::U8(2)]),
            serde_json::json!([true, 2])
        );
    }

    #[test]
    fn test_tagged_serde_form() {
        let json = serde_json::to_value(Value::I64(5)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "i64", "value": 5}));
        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, Value::I64(5));
    }
}
