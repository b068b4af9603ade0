//! Span attributes and timing for pipeline sends.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{info_span, Span};

/// Attributes describing one `send` of a pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendSpanAttributes {
    /// Pipeline name.
    pub pipeline_name: String,
    /// Identifier of this send.
    pub run_id: String,
    /// Number of stages run.
    pub stage_count: usize,
    /// Number of subscribers notified.
    pub subscriber_count: usize,
}

impl SendSpanAttributes {
    /// Creates attributes for a send.
    #[must_use]
    pub fn new(pipeline_name: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            run_id: run_id.into(),
            ..Default::default()
        }
    }

    /// Sets the stage count.
    #[must_use]
    pub fn with_stage_count(mut self, count: usize) -> Self {
        self.stage_count = count;
        self
    }

    /// Sets the subscriber count.
    #[must_use]
    pub fn with_subscriber_count(mut self, count: usize) -> Self {
        self.subscriber_count = count;
        self
    }

    /// Converts to OpenTelemetry-style attributes.
    #[must_use]
    pub fn to_otel_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        attrs.insert("pipeline.name".to_string(), self.pipeline_name.clone());
        attrs.insert("pipeline.run_id".to_string(), self.run_id.clone());
        attrs.insert("pipeline.stage_count".to_string(), self.stage_count.to_string());
        attrs.insert(
            "pipeline.subscriber_count".to_string(),
            self.subscriber_count.to_string(),
        );
        attrs
    }

    /// Opens a tracing span carrying these attributes.
    #[must_use]
    pub fn span(&self) -> Span {
        info_span!(
            "pipeline.send",
            pipeline = %self.pipeline_name,
            run_id = %self.run_id,
            stages = self.stage_count,
            subscribers = self.subscriber_count,
        )
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_span_attributes() {
        let attrs = SendSpanAttributes::new("numbers", "run-123")
            .with_stage_count(3)
            .with_subscriber_count(2);

        let otel = attrs.to_otel_attributes();
        assert_eq!(otel.get("pipeline.name"), Some(&"numbers".to_string()));
        assert_eq!(otel.get("pipeline.run_id"), Some(&"run-123".to_string()));
        assert_eq!(otel.get("pipeline.stage_count"), Some(&"3".to_string()));
        assert_eq!(otel.get("pipeline.subscriber_count"), Some(&"2".to_string()));
    }

    #[test]
    fn test_span_opens_without_subscriber() {
        let attrs = SendSpanAttributes::new("numbers", "run-1");
        let span = attrs.span();
        let _entered = span.enter();
    }

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start("send");
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 10.0);
        assert_eq!(timer.name(), "send");
    }
}
