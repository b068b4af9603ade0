//! Event sink system for observability.
//!
//! Pipelines report construction, subscription and each send's progress to
//! an [`EventSink`]. A process-wide default sink can be installed with
//! [`set_event_sink`]; pipelines built without an explicit sink pick it up.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use parking_lot::RwLock;
use std::sync::Arc;

static GLOBAL_EVENT_SINK: RwLock<Option<Arc<dyn EventSink>>> = RwLock::new(None);

/// Sets the process-wide default event sink.
pub fn set_event_sink(sink: Arc<dyn EventSink>) {
    *GLOBAL_EVENT_SINK.write() = Some(sink);
}

/// Clears the process-wide default event sink.
pub fn clear_event_sink() {
    *GLOBAL_EVENT_SINK.write() = None;
}

/// Gets the process-wide default event sink.
///
/// Returns a `NoOpEventSink` if no sink is set.
pub fn get_event_sink() -> Arc<dyn EventSink> {
    GLOBAL_EVENT_SINK
        .read()
        .clone()
        .unwrap_or_else(|| Arc::new(NoOpEventSink))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear_sink() {
        let collecting = Arc::new(CollectingEventSink::new());
        set_event_sink(collecting.clone());
        get_event_sink().emit("test.event", Some(serde_json::json!({"key": "value"})));
        clear_event_sink();

        get_event_sink().emit("after.clear", None);
        let types = collecting.event_types();
        assert!(types.iter().any(|t| t == "test.event"));
        assert!(!types.iter().any(|t| t == "after.clear"));
    }
}
