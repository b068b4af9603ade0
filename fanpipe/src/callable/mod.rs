//! Callable descriptors.
//!
//! A [`Callable`] is a unit of behaviour that can be inspected before it is
//! run: it declares the types of its positional inputs and outputs, and it can
//! be invoked with a list of [`Value`]s. Pipelines only ever see callables
//! through this trait, which is what lets them validate a chain of unrelated
//! functions at runtime.

mod function;

pub use function::{FnCallable, IntoOutputs};

use crate::errors::{FaultKind, IncompatibilityError, InvocationFault, Role};
use crate::types::{Value, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Trait for invocable units with a runtime-inspectable signature.
pub trait Callable: Send + Sync + Debug {
    /// Returns the name used in diagnostics.
    fn name(&self) -> &str;

    /// Returns the positional input types.
    fn input_types(&self) -> &[ValueType];

    /// Returns the positional output types.
    fn output_types(&self) -> &[ValueType];

    /// Invokes the callable.
    ///
    /// # Errors
    ///
    /// Returns an [`InvocationFault`] if the arguments do not fit the declared
    /// inputs or the callable itself fails.
    fn invoke(&self, args: Vec<Value>) -> Result<Vec<Value>, InvocationFault>;

    /// Returns an owned copy of the signature.
    fn signature(&self) -> Signature {
        Signature::new(self.input_types().to_vec(), self.output_types().to_vec())
    }
}

/// Positional input and output types of a callable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Signature {
    /// Input types, in order.
    pub inputs: Vec<ValueType>,
    /// Output types, in order.
    pub outputs: Vec<ValueType>,
}

impl Signature {
    /// Creates a signature.
    #[must_use]
    pub fn new(inputs: Vec<ValueType>, outputs: Vec<ValueType>) -> Self {
        Self { inputs, outputs }
    }
}

fn write_types(f: &mut fmt::Formatter<'_>, types: &[ValueType]) -> fmt::Result {
    f.write_str("(")?;
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{ty}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_types(f, &self.inputs)?;
        f.write_str(" -> ")?;
        write_types(f, &self.outputs)
    }
}

/// Something supplied as a stage or subscriber.
///
/// Callers may hand the pipeline plain values where a callable is expected;
/// those are carried as [`Handle::Value`] and rejected during validation.
#[derive(Debug, Clone)]
pub enum Handle {
    /// An invocable callable.
    Callable(Arc<dyn Callable>),
    /// A plain value, which cannot be invoked.
    Value(Value),
}

impl Handle {
    /// Wraps any callable.
    pub fn callable(callable: impl Callable + 'static) -> Self {
        Self::Callable(Arc::new(callable))
    }

    /// Returns the name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Callable(c) => c.name().to_string(),
            Self::Value(v) => format!("{} value", v.value_type()),
        }
    }

    /// Borrows the callable, or reports that this handle is not callable.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibilityError::NotCallable`] for value handles.
    pub fn as_callable(&self, role: Role) -> Result<&Arc<dyn Callable>, IncompatibilityError> {
        match self {
            Self::Callable(c) => Ok(c),
            Self::Value(v) => Err(IncompatibilityError::NotCallable {
                role,
                found: v.value_type(),
            }),
        }
    }

    /// Takes the callable, or reports that this handle is not callable.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibilityError::NotCallable`] for value handles.
    pub fn into_callable(self, role: Role) -> Result<Arc<dyn Callable>, IncompatibilityError> {
        match self {
            Self::Callable(c) => Ok(c),
            Self::Value(v) => Err(IncompatibilityError::NotCallable {
                role,
                found: v.value_type(),
            }),
        }
    }
}

impl From<Arc<dyn Callable>> for Handle {
    fn from(callable: Arc<dyn Callable>) -> Self {
        Self::Callable(callable)
    }
}

impl From<FnCallable> for Handle {
    fn from(callable: FnCallable) -> Self {
        Self::Callable(Arc::new(callable))
    }
}

impl From<Value> for Handle {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Checks `values` against `expected`, converting where the widening table
/// allows.
///
/// # Errors
///
/// Returns a fault of `kind` naming `callable` when the count differs or a
/// value cannot be converted.
pub fn coerce_values(
    callable: &str,
    kind: FaultKind,
    expected: &[ValueType],
    values: Vec<Value>,
) -> Result<Vec<Value>, InvocationFault> {
    if values.len() != expected.len() {
        return Err(InvocationFault::new(
            kind,
            callable,
            format!("expected {} value(s), got {}", expected.len(), values.len()),
        ));
    }

    values
        .into_iter()
        .zip(expected)
        .enumerate()
        .map(|(position, (value, ty))| {
            value.convert_to(*ty).map_err(|err| {
                InvocationFault::new(kind, callable, format!("position {position}: {err}"))
            })
        })
        .collect()
}
