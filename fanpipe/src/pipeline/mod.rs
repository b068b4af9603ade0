//! Pipeline building and execution.
//!
//! This module provides:
//! - The validated stage chain with fan-out subscribers
//! - Pipeline builder with validation
//! - Pipeline configuration

mod builder;
mod chain;
mod config;

pub use builder::PipelineBuilder;
pub use chain::Pipeline;
pub use config::PipelineConfig;
