//! Mock callables for testing.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::callable::{coerce_values, Callable, Handle};
use crate::errors::{FaultKind, InvocationFault};
use crate::types::{Value, ValueType};

/// A shared, ordered log of callable names, for asserting invocation order
/// across several mocks.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Creates an empty [`CallLog`].
#[must_use]
pub fn new_call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A callable that records the arguments of every invocation.
///
/// By default it returns nothing, which makes it a natural subscriber. A
/// passthrough recorder returns its arguments and can sit anywhere in a
/// stage chain.
#[derive(Debug)]
pub struct RecordingCallable {
    name: String,
    inputs: Vec<ValueType>,
    outputs: Vec<ValueType>,
    calls: Mutex<Vec<Vec<Value>>>,
    log: Option<CallLog>,
}

impl RecordingCallable {
    /// Creates a recorder with the given inputs and no outputs.
    #[must_use]
    pub fn new(name: impl Into<String>, inputs: Vec<ValueType>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            inputs,
            outputs: Vec::new(),
            calls: Mutex::new(Vec::new()),
            log: None,
        })
    }

    /// Creates a recorder that returns its arguments unchanged.
    #[must_use]
    pub fn passthrough(name: impl Into<String>, types: Vec<ValueType>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            outputs: types.clone(),
            inputs: types,
            calls: Mutex::new(Vec::new()),
            log: None,
        })
    }

    /// Creates a recorder with no outputs that also appends its name to `log`.
    #[must_use]
    pub fn logged(name: impl Into<String>, inputs: Vec<ValueType>, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            inputs,
            outputs: Vec::new(),
            calls: Mutex::new(Vec::new()),
            log: Some(Arc::clone(log)),
        })
    }

    /// Returns a handle sharing this recorder.
    #[must_use]
    pub fn handle(self: &Arc<Self>) -> Handle {
        let callable: Arc<dyn Callable> = Arc::clone(self) as Arc<dyn Callable>;
        Handle::Callable(callable)
    }

    /// Returns the arguments of every invocation, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.calls.lock().clone()
    }

    /// Returns the number of invocations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Clears recorded invocations.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

impl Callable for RecordingCallable {
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
        self.calls.lock().push(args.clone());
        if let Some(log) = &self.log {
            log.lock().push(self.name.clone());
        }

        if self.outputs.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(args)
        }
    }
}

/// A callable that always fails.
#[derive(Debug)]
pub struct FailingCallable {
    name: String,
    inputs: Vec<ValueType>,
    outputs: Vec<ValueType>,
    message: String,
}

impl FailingCallable {
    /// Creates a failing callable with the given signature.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<ValueType>,
        outputs: Vec<ValueType>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            message: message.into(),
        }
    }
}

impl Callable for FailingCallable {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_types(&self) -> &[ValueType] {
        &self.inputs
    }

    fn output_types(&self) -> &[ValueType] {
        &self.outputs
    }

    fn invoke(&self, _args: Vec<Value>) -> Result<Vec<Value>, InvocationFault> {
        Err(InvocationFault::failed(self.name.as_str(), self.message.as_str()))
    }
}
