//! Pipeline builder with validation.

use super::{Pipeline, PipelineConfig};
use crate::callable::Handle;
use crate::errors::IncompatibilityError;
use crate::events::{get_event_sink, EventSink};
use crate::types::{ConversionPolicy, ValueType};
use std::sync::Arc;

/// Builder for creating validated pipelines.
///
/// Nothing is checked until [`build`](Self::build), which validates every
/// stage edge and every pre-registered subscriber. Building is
/// all-or-nothing.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    input_types: Option<Vec<ValueType>>,
    stages: Vec<Handle>,
    subscribers: Vec<Handle>,
    sink: Option<Arc<dyn EventSink>>,
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(PipelineConfig::new(name))
    }

    /// Creates a builder from a full configuration.
    #[must_use]
    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            config,
            input_types: None,
            stages: Vec::new(),
            subscribers: Vec::new(),
            sink: None,
        }
    }

    /// Sets the conversion policy.
    #[must_use]
    pub fn conversion(mut self, conversion: ConversionPolicy) -> Self {
        self.config.conversion = conversion;
        self
    }

    /// Includes values in emitted events.
    #[must_use]
    pub fn emit_values(mut self, emit_values: bool) -> Self {
        self.config.emit_values = emit_values;
        self
    }

    /// Declares the types `send` will be called with.
    ///
    /// The first stage must accept them. For a pipeline without stages they
    /// are also the signature subscribers must accept.
    #[must_use]
    pub fn input_types(mut self, types: impl IntoIterator<Item = ValueType>) -> Self {
        self.input_types = Some(types.into_iter().collect());
        self
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage(mut self, stage: impl Into<Handle>) -> Self {
        self.stages.push(stage.into());
        self
    }

    /// Appends several stages, in order.
    #[must_use]
    pub fn stages(mut self, stages: impl IntoIterator<Item = Handle>) -> Self {
        self.stages.extend(stages);
        self
    }

    /// Registers a subscriber to be checked and added at build time.
    #[must_use]
    pub fn subscriber(mut self, subscriber: impl Into<Handle>) -> Self {
        self.subscribers.push(subscriber.into());
        self
    }

    /// Sets the event sink. Defaults to the process-wide sink.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Appends another builder's stages and subscribers to this one.
    ///
    /// The result is named `"{self}+{other}"` and keeps this builder's
    /// configuration, declared inputs and sink.
    #[must_use]
    pub fn compose(mut self, other: Self) -> Self {
        self.config.name = format!("{}+{}", self.config.name, other.config.name);
        self.stages.extend(other.stages);
        self.subscribers.extend(other.subscribers);
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first incompatibility among the declared inputs, the
    /// stage edges and the subscribers, in that order.
    pub fn build(self) -> Result<Pipeline, IncompatibilityError> {
        let sink = self.sink.unwrap_or_else(get_event_sink);
        let pipeline = Pipeline::assemble(self.config, self.input_types, self.stages, sink)?;
        for subscriber in self.subscribers {
            pipeline.subscribe(subscriber)?;
        }
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::FnCallable;
    use crate::errors::Location;
    use crate::events::CollectingEventSink;
    use crate::testing::{assert_incompatible, RecordingCallable};
    use crate::types::Value;
    use pretty_assertions::assert_eq;

    fn double() -> FnCallable {
        FnCallable::unary("double", |n: i64| 2 * n)
    }

    #[test]
    fn test_builder_creation() {
        let builder = PipelineBuilder::new("test");
        assert_eq!(builder.name(), "test");
        assert_eq!(builder.stage_count(), 0);
    }

    #[test]
    fn test_builder_build_success() {
        let sub = RecordingCallable::new("sub", vec![ValueType::I64]);
        let pipeline = PipelineBuilder::new("numbers")
            .stage(double())
            .stage(double())
            .subscriber(sub.handle())
            .build()
            .unwrap();

        assert_eq!(pipeline.name(), "numbers");
        assert_eq!(pipeline.stage_count(), 2);
        assert_eq!(pipeline.subscriber_count(), 1);
    }

    #[test]
    fn test_builder_rejects_bad_subscriber() {
        let bad = RecordingCallable::new("bad", vec![ValueType::I64, ValueType::I64]);
        let result = PipelineBuilder::new("numbers")
            .stage(double())
            .subscriber(bad.handle())
            .build();
        assert_incompatible(&result, "PIPE-002-ARITY");
    }

    #[test]
    fn test_builder_checks_declared_inputs() {
        let result = PipelineBuilder::new("numbers")
            .input_types([ValueType::Str])
            .stage(double())
            .build();

        assert_incompatible(&result, "PIPE-003-TYPE");
        let err = result.unwrap_err();
        assert_eq!(err.edge(), Some((&Location::Input, &Location::stage(0, "double"))));
    }

    #[test]
    fn test_strict_builder_rejects_widening() {
        let small = FnCallable::nullary("small", || 1_i32);
        let result = PipelineBuilder::new("strict")
            .conversion(ConversionPolicy::Strict)
            .stage(small)
            .stage(double())
            .build();
        assert_incompatible(&result, "PIPE-003-TYPE");
    }

    #[test]
    fn test_builder_compose() {
        let first = PipelineBuilder::new("a").stage(double());
        let second = PipelineBuilder::new("b").stage(double());

        let composed = first.compose(second);
        assert_eq!(composed.name(), "a+b");
        assert_eq!(composed.stage_count(), 2);
        assert!(composed.build().is_ok());
    }

    #[test]
    fn test_builder_uses_given_sink() {
        let sink = Arc::new(CollectingEventSink::new());
        let pipeline = PipelineBuilder::new("observed")
            .event_sink(sink.clone())
            .stage(double())
            .build()
            .unwrap();

        pipeline.send(vec![Value::I64(1)]).unwrap();
        assert_eq!(
            sink.event_types(),
            vec![
                "pipeline.constructed",
                "pipeline.send.started",
                "pipeline.stage.completed",
                "pipeline.send.completed",
            ]
        );
    }
}
