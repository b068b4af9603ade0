//! Error types for fanpipe.
//!
//! Two families are kept apart: [`IncompatibilityError`] is structural and is
//! only returned while a pipeline is being built or subscribed to, while
//! [`InvocationFault`] is only returned while a pipeline is running.

use crate::types::ValueType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The main error type for fanpipe operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FanpipeError {
    /// Adjacent callables do not fit together.
    #[error("{0}")]
    Incompatible(#[from] IncompatibilityError),

    /// A stage or subscriber failed while running.
    #[error("{0}")]
    Invocation(#[from] InvocationFault),
}

/// Which side of a producer/consumer edge a handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Supplies outputs.
    Producer,
    /// Receives inputs.
    Consumer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Producer => f.write_str("producer"),
            Self::Consumer => f.write_str("consumer"),
        }
    }
}

/// A position in a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    /// The arguments handed to `send`.
    Input,
    /// A stage, by position.
    Stage {
        /// Position in the stage sequence.
        index: usize,
        /// The stage's name.
        name: String,
    },
    /// A subscriber, by registration position.
    Subscriber {
        /// Position in the subscriber list.
        index: usize,
        /// The subscriber's name.
        name: String,
    },
}

impl Location {
    /// Creates a stage location.
    #[must_use]
    pub fn stage(index: usize, name: impl Into<String>) -> Self {
        Self::Stage {
            index,
            name: name.into(),
        }
    }

    /// Creates a subscriber location.
    #[must_use]
    pub fn subscriber(index: usize, name: impl Into<String>) -> Self {
        Self::Subscriber {
            index,
            name: name.into(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Stage { index, name } => write!(f, "stage[{index}] '{name}'"),
            Self::Subscriber { index, name } => write!(f, "subscriber[{index}] '{name}'"),
        }
    }
}

/// Metadata about a structural error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "PIPE-002-ARITY").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a JSON object.
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A producer's outputs cannot be passed positionally as a consumer's inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncompatibilityError {
    /// A supplied handle is a plain value, not something invocable.
    #[error("{role} is not callable (found a {found} value)")]
    NotCallable {
        /// The side that was not callable.
        role: Role,
        /// The type of the value supplied instead.
        found: ValueType,
    },

    /// Output count differs from input count.
    #[error("argument count mismatch: producer yields {produced} value(s), consumer expects {expected}")]
    ArityMismatch {
        /// Number of values the producer returns.
        produced: usize,
        /// Number of parameters the consumer takes.
        expected: usize,
    },

    /// A positional type is neither identical nor safely convertible.
    #[error("type mismatch at position {position}: {producer} cannot be passed as {consumer}")]
    TypeMismatch {
        /// Zero-based argument position.
        position: usize,
        /// The producer's type at that position.
        producer: ValueType,
        /// The consumer's type at that position.
        consumer: ValueType,
    },

    /// An empty pipeline without declared inputs has no terminal signature.
    #[error("pipeline has no stages and no declared input types, so its output signature is unknown")]
    UnknownTerminal,

    /// One of the above, attributed to the pipeline edge where it occurred.
    #[error("{producer} -> {consumer}: {source}")]
    AtEdge {
        /// The producing end of the edge.
        producer: Location,
        /// The consuming end of the edge.
        consumer: Location,
        /// The underlying incompatibility.
        source: Box<IncompatibilityError>,
    },
}

impl IncompatibilityError {
    /// Attributes this error to a pipeline edge.
    ///
    /// An error that already carries an edge is returned unchanged.
    #[must_use]
    pub fn at(self, producer: Location, consumer: Location) -> Self {
        match self {
            Self::AtEdge { .. } => self,
            other => Self::AtEdge {
                producer,
                consumer,
                source: Box::new(other),
            },
        }
    }

    /// Returns the underlying error without edge attribution.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::AtEdge { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the edge this error was attributed to, if any.
    #[must_use]
    pub fn edge(&self) -> Option<(&Location, &Location)> {
        match self {
            Self::AtEdge {
                producer, consumer, ..
            } => Some((producer, consumer)),
            _ => None,
        }
    }

    /// Returns the stable diagnostic code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self.root() {
            Self::NotCallable { .. } => "PIPE-001-NOT_CALLABLE",
            Self::ArityMismatch { .. } => "PIPE-002-ARITY",
            Self::TypeMismatch { .. } => "PIPE-003-TYPE",
            Self::UnknownTerminal | Self::AtEdge { .. } => "PIPE-004-NO_TERMINAL",
        }
    }

    /// Builds diagnostic metadata with a fix hint and context.
    #[must_use]
    pub fn error_info(&self) -> ContractErrorInfo {
        let root = self.root();
        let mut info = ContractErrorInfo::new(self.code(), root.to_string());

        info = match root {
            Self::NotCallable { role, found } => info
                .with_fix_hint("Wrap the function in a callable before adding it to a pipeline.")
                .with_context_entry("role", role.to_string())
                .with_context_entry("found", found.to_string()),
            Self::ArityMismatch { produced, expected } => info
                .with_fix_hint("Make the producer return exactly as many values as the consumer takes.")
                .with_context_entry("produced", produced.to_string())
                .with_context_entry("expected", expected.to_string()),
            Self::TypeMismatch {
                position,
                producer,
                consumer,
            } => info
                .with_fix_hint("Change the consumer's parameter to the producer's type, a wider type, or `any`.")
                .with_context_entry("position", position.to_string())
                .with_context_entry("producer_type", producer.to_string())
                .with_context_entry("consumer_type", consumer.to_string()),
            Self::UnknownTerminal | Self::AtEdge { .. } => info
                .with_fix_hint("Declare the pipeline's input types or add at least one stage."),
        };

        if let Some((producer, consumer)) = self.edge() {
            info = info
                .with_context_entry("producer", producer.to_string())
                .with_context_entry("consumer", consumer.to_string());
        }
        info
    }

    /// Converts to a JSON object.
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        serde_json::json!({
            "message": self.to_string(),
            "error_info": self.error_info().to_dict(),
        })
    }
}

/// What went wrong during an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// The callable was handed arguments that do not fit its inputs.
    Arguments,
    /// The callable returned values that do not fit its declared outputs.
    Outputs,
    /// The callable reported its own failure.
    Failed,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arguments => f.write_str("arguments"),
            Self::Outputs => f.write_str("outputs"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// A stage or subscriber faulted while being invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind} fault in '{callable}'{}: {message}", location_suffix(.location))]
pub struct InvocationFault {
    /// The category of fault.
    pub kind: FaultKind,
    /// Name of the callable that faulted.
    pub callable: String,
    /// Human-readable description.
    pub message: String,
    /// Where in the pipeline it happened, once known.
    pub location: Option<Location>,
}

fn location_suffix(location: &Option<Location>) -> String {
    location
        .as_ref()
        .map_or_else(String::new, |loc| format!(" at {loc}"))
}

impl InvocationFault {
    /// Creates a fault of the given kind.
    #[must_use]
    pub fn new(kind: FaultKind, callable: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            callable: callable.into(),
            message: message.into(),
            location: None,
        }
    }

    /// Creates an argument fault.
    #[must_use]
    pub fn arguments(callable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FaultKind::Arguments, callable, message)
    }

    /// Creates an output fault.
    #[must_use]
    pub fn outputs(callable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FaultKind::Outputs, callable, message)
    }

    /// Creates a fault reported by the callable itself.
    #[must_use]
    pub fn failed(callable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FaultKind::Failed, callable, message)
    }

    /// Records where the fault happened, keeping the innermost location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        if self.location.is_none() {
            self.location = Some(location);
        }
        self
    }

    /// Converts to a JSON object.
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "InvocationFault",
            "kind": self.kind,
            "callable": self.callable,
            "message": self.message,
            "location": self.location,
        })
    }
}
