//! Runtime type model for pipeline values.
//!
//! Stages exchange positional [`Value`]s whose tags are described by the
//! closed [`ValueType`] enumeration. Whether one type may be handed to a
//! parameter of another type is decided by [`is_convertible`], an explicit
//! table rather than any implicit coercion.

mod native;
mod value;

pub use native::NativeType;
pub use value::{ConversionError, Value};
pub(crate) use value::values_to_json;

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of a positional parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Boolean.
    Bool,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// UTF-8 string.
    Str,
    /// Raw bytes.
    Bytes,
    /// Accepts a value of any concrete type.
    ///
    /// Only valid as a consumer type; no [`Value`] carries this tag.
    Any,
}

impl ValueType {
    /// Every type, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Str,
        Self::Bytes,
        Self::Any,
    ];

    /// Returns the lowercase name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "str",
            Self::Bytes => "bytes",
            Self::Any => "any",
        }
    }

    /// Returns true for the integer and float types.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::F32
                | Self::F64
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if a value of type `from` can be passed where `to` is expected
/// without failing or losing information.
///
/// Identity and `Any` targets always succeed. Integers widen to wider integers
/// of the same signedness, unsigned integers also widen to strictly wider
/// signed integers, and integers convert to floats only when the mantissa can
/// hold every value. `Bool`, `Str` and `Bytes` convert only to themselves.
#[must_use]
pub fn is_convertible(from: ValueType, to: ValueType) -> bool {
    use ValueType::{Any, F32, F64, I16, I32, I64, I8, U16, U32, U64, U8};

    if to == Any {
        return true;
    }
    // `Any` is consumer-only, so it never narrows to a concrete type.
    if from == Any {
        return false;
    }
    if from == to {
        return true;
    }

    matches!(
        (from, to),
        (I8, I16 | I32 | I64)
            | (I16, I32 | I64)
            | (I32, I64)
            | (U8, U16 | U32 | U64 | I16 | I32 | I64)
            | (U16, U32 | U64 | I32 | I64)
            | (U32, U64 | I64)
            | (I8 | I16 | U8 | U16, F32)
            | (I8 | I16 | I32 | U8 | U16 | U32, F64)
            | (F32, F64)
    )
}

/// Which producer/consumer type pairs a pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionPolicy {
    /// Identity, `Any`, and the lossless widenings of [`is_convertible`].
    #[default]
    Widening,
    /// Identity and `Any` only.
    Strict,
}

impl ConversionPolicy {
    /// Returns true if a `from` output may feed a `to` input under this policy.
    #[must_use]
    pub fn permits(self, from: ValueType, to: ValueType) -> bool {
        match self {
            Self::Widening => is_convertible(from, to),
            Self::Strict => from == to || to == ValueType::Any,
        }
    }
}
