//! # Fanpipe
//!
//! Runtime-composed function pipelines with dynamic type checking.
//!
//! A pipeline is an ordered chain of callables whose final output is
//! broadcast to any number of subscribers:
//!
//! - **Checked composition**: every adjacent pair of stages is checked for
//!   arity and type compatibility when the pipeline is built
//! - **Gated subscription**: a subscriber is only accepted if it can consume
//!   the pipeline's final output
//! - **Ordered fan-out**: each send runs the stages in order and notifies
//!   subscribers in registration order
//! - **Event-driven observability**: construction, subscription and every
//!   send are reported to an event sink and through `tracing`
//!
//! ## Quick Start
//!
//! ```rust
//! use fanpipe::prelude::*;
//!
//! let double = FnCallable::unary("double", |n: i64| 2 * n);
//! let plus_one = FnCallable::unary("plus_one", |n: i64| n + 1);
//! let show = FnCallable::unary("show", |n: i64| format!("got {n}"));
//!
//! let pipeline = Pipeline::builder("numbers")
//!     .stage(double)
//!     .stage(plus_one)
//!     .stage(show)
//!     .build()?;
//!
//! pipeline.subscribe(FnCallable::unary("print", |s: String| println!("{s}")))?;
//! pipeline.send(vec![Value::I64(1)])?;
//! # Ok::<(), FanpipeError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod callable;
pub mod checker;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod testing;
pub mod types;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::callable::{Callable, FnCallable, Handle, Signature};
    pub use crate::checker::{check_compatible, check_compatible_with};
    pub use crate::errors::{
        ContractErrorInfo, FanpipeError, FaultKind, IncompatibilityError,
        InvocationFault, Location, Role,
    };
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::observability::{init_tracing, TracingConfig};
    pub use crate::pipeline::{Pipeline, PipelineBuilder, PipelineConfig};
    pub use crate::types::{ConversionPolicy, NativeType, Value, ValueType};
    pub use crate::utils::{generate_run_id, iso_timestamp, Timestamp};
}
