//! Closure-backed callables.

use super::{coerce_values, Callable};
use crate::errors::{FaultKind, InvocationFault};
use crate::types::{NativeType, Value, ValueType};
use std::fmt::{self, Debug, Display};

type InvokeFn = dyn Fn(Vec<Value>) -> Result<Vec<Value>, InvocationFault> + Send + Sync;

/// A Rust return type that maps onto zero or more positional outputs.
pub trait IntoOutputs {
    /// The declared output types.
    fn output_types() -> Vec<ValueType>;

    /// Splits the return value into positional outputs.
    fn into_outputs(self) -> Vec<Value>;
}

impl IntoOutputs for () {
    fn output_types() -> Vec<ValueType> {
        Vec::new()
    }

    fn into_outputs(self) -> Vec<Value> {
        Vec::new()
    }
}

macro_rules! impl_single_output {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoOutputs for $ty {
                fn output_types() -> Vec<ValueType> {
                    vec![<$ty as NativeType>::VALUE_TYPE]
                }

                fn into_outputs(self) -> Vec<Value> {
                    vec![self.into_value()]
                }
            }
        )*
    };
}

impl_single_output!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, String, Vec<u8>, Value);

impl<A: NativeType, B: NativeType> IntoOutputs for (A, B) {
    fn output_types() -> Vec<ValueType> {
        vec![A::VALUE_TYPE, B::VALUE_TYPE]
    }

    fn into_outputs(self) -> Vec<Value> {
        vec![self.0.into_value(), self.1.into_value()]
    }
}

impl<A: NativeType, B: NativeType, C: NativeType> IntoOutputs for (A, B, C) {
    fn output_types() -> Vec<ValueType> {
        vec![A::VALUE_TYPE, B::VALUE_TYPE, C::VALUE_TYPE]
    }

    fn into_outputs(self) -> Vec<Value> {
        vec![self.0.into_value(), self.1.into_value(), self.2.into_value()]
    }
}

/// A callable backed by a closure over positional values.
///
/// Every invocation checks the arguments against the declared inputs and the
/// closure's results against the declared outputs, converting along the
/// widening table where needed.
pub struct FnCallable {
    name: String,
    inputs: Vec<ValueType>,
    outputs: Vec<ValueType>,
    func: Box<InvokeFn>,
}

impl FnCallable {
    /// Creates a callable from an explicit signature and a closure over
    /// already-checked values.
    pub fn new<F>(
        name: impl Into<String>,
        inputs: Vec<ValueType>,
        outputs: Vec<ValueType>,
        func: F,
    ) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Vec<Value>, InvocationFault> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            inputs,
            outputs,
            func: Box::new(func),
        }
    }

    /// Creates a callable taking no arguments.
    pub fn nullary<O, F>(name: impl Into<String>, func: F) -> Self
    where
        O: IntoOutputs,
        F: Fn() -> O + Send + Sync + 'static,
    {
        Self::new(name, Vec::new(), O::output_types(), move |_| {
            Ok(func().into_outputs())
        })
    }

    /// Creates a callable taking one argument.
    pub fn unary<A, O, F>(name: impl Into<String>, func: F) -> Self
    where
        A: NativeType,
        O: IntoOutputs,
        F: Fn(A) -> O + Send + Sync + 'static,
    {
        let name = name.into();
        let label = name.clone();
        Self::new(name, vec![A::VALUE_TYPE], O::output_types(), move |args| {
            let mut args = args.into_iter();
            let a = take::<A>(&label, 0, args.next())?;
            Ok(func(a).into_outputs())
        })
    }

    /// Creates a callable taking two arguments.
    pub fn binary<A, B, O, F>(name: impl Into<String>, func: F) -> Self
    where
        A: NativeType,
        B: NativeType,
        O: IntoOutputs,
        F: Fn(A, B) -> O + Send + Sync + 'static,
    {
        let name = name.into();
        let label = name.clone();
        Self::new(
            name,
            vec![A::VALUE_TYPE, B::VALUE_TYPE],
            O::output_types(),
            move |args| {
                let mut args = args.into_iter();
                let a = take::<A>(&label, 0, args.next())?;
                let b = take::<B>(&label, 1, args.next())?;
                Ok(func(a, b).into_outputs())
            },
        )
    }

    /// Creates a one-argument callable that may fail.
    ///
    /// An `Err` becomes an [`InvocationFault`] of kind [`FaultKind::Failed`].
    pub fn try_unary<A, O, E, F>(name: impl Into<String>, func: F) -> Self
    where
        A: NativeType,
        O: IntoOutputs,
        E: Display,
        F: Fn(A) -> Result<O, E> + Send + Sync + 'static,
    {
        let name = name.into();
        let label = name.clone();
        Self::new(name, vec![A::VALUE_TYPE], O::output_types(), move |args| {
            let mut args = args.into_iter();
            let a = take::<A>(&label, 0, args.next())?;
            func(a)
                .map(IntoOutputs::into_outputs)
                .map_err(|err| InvocationFault::failed(label.as_str(), err.to_string()))
        })
    }
}

fn take<A: NativeType>(
    callable: &str,
    position: usize,
    value: Option<Value>,
) -> Result<A, InvocationFault> {
    let value = value.ok_or_else(|| {
        InvocationFault::arguments(callable, format!("missing argument at position {position}"))
    })?;
    let found = value.value_type();
    A::from_value(value).ok_or_else(|| {
        InvocationFault::arguments(
            callable,
            format!(
                "position {position}: expected {}, found {found}",
                A::VALUE_TYPE
            ),
        )
    })
}

impl Debug for FnCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCallable")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl Callable for FnCallable {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_types(&self) -> &[ValueType] {
        &self.inputs
    }

    fn output_types(&self) -> &[ValueType] {
        &self.outputs
    }

    fn invoke(&self, args: Vec<Value>) -> Result<Vec<Value>, InvocationFault> {
        let args = coerce_values(&self.name, FaultKind::Arguments, &self.inputs, args)?;
        let outputs = (self.func)(args)?;
        coerce_values(&self.name, FaultKind::Outputs, &self.outputs, outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unary_signature_and_invoke() {
        let double = FnCallable::unary("double", |n: i64| 2 * n);
        assert_eq!(double.input_types(), &[ValueType::I64]);
        assert_eq!(double.output_types(), &[ValueType::I64]);
        assert_eq!(double.invoke(vec![Value::I64(4)]).unwrap(), vec![Value::I64(8)]);
    }

    #[test]
    fn test_invoke_widens_arguments() {
        let double = FnCallable::unary("double", |n: i64| 2 * n);
        assert_eq!(double.invoke(vec![Value::I32(4)]).unwrap(), vec![Value::I64(8)]);
    }

    #[test]
    fn test_invoke_rejects_bad_arguments() {
        let double = FnCallable::unary("double", |n: i64| 2 * n);

        let fault = double.invoke(vec![Value::Str("4".into())]).unwrap_err();
        assert_eq!(fault.kind, FaultKind::Arguments);
        assert_eq!(fault.callable, "double");

        let fault = double.invoke(vec![]).unwrap_err();
        assert_eq!(fault.kind, FaultKind::Arguments);
    }

    #[test]
    fn test_unit_return_has_no_outputs() {
        let sink = FnCallable::unary("print", |_s: String| ());
        assert!(sink.output_types().is_empty());
        assert!(sink.invoke(vec![Value::from("hi")]).unwrap().is_empty());
    }

    #[test]
    fn test_nullary_and_binary() {
        let answer = FnCallable::nullary("answer", || 42_u8);
        assert!(answer.input_types().is_empty());
        assert_eq!(answer.invoke(vec![]).unwrap(), vec![Value::U8(42)]);

        let divmod = FnCallable::binary("divmod", |a: u32, b: u32| (a / b, a % b));
        assert_eq!(divmod.output_types(), &[ValueType::U32, ValueType::U32]);
        assert_eq!(
            divmod.invoke(vec![Value::U32(7), Value::U32(2)]).unwrap(),
            vec![Value::U32(3), Value::U32(1)]
        );
    }

    #[test]
    fn test_any_parameter_accepts_every_value() {
        let describe = FnCallable::unary("describe", |v: Value| format!("log(): {v}"));
        assert_eq!(describe.input_types(), &[ValueType::Any]);
        assert_eq!(
            describe.invoke(vec![Value::I64(3)]).unwrap(),
            vec![Value::from("log(): 3")]
        );
    }

    #[test]
    fn test_try_unary_reports_failure() {
        let parse = FnCallable::try_unary("parse", |s: String| s.parse::<i64>());
        assert_eq!(parse.invoke(vec![Value::from("12")]).unwrap(), vec![Value::I64(12)]);

        let fault = parse.invoke(vec![Value::from("x")]).unwrap_err();
        assert_eq!(fault.kind, FaultKind::Failed);
        assert_eq!(fault.callable, "parse");
    }

    #[test]
    fn test_raw_closure_output_mismatch_is_a_fault() {
        let liar = FnCallable::new("liar", vec![], vec![ValueType::I64], |_| {
            Ok(vec![Value::from("not a number")])
        });
        let fault = liar.invoke(vec![]).unwrap_err();
        assert_eq!(fault.kind, FaultKind::Outputs);
    }
}
