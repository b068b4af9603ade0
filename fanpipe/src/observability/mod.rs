//! Observability utilities.

mod spans;
mod subscriber;

pub use spans::{SendSpanAttributes, SpanTimer};
pub use subscriber::{init_tracing, TracingConfig, TracingInitError};
