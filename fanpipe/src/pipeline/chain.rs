//! The pipeline: validated stages plus fan-out subscribers.

use super::PipelineConfig;
use crate::callable::{coerce_values, Callable, Handle};
use crate::checker::{check_compatible_with, check_signatures};
use crate::errors::{FaultKind, IncompatibilityError, InvocationFault, Location, Role};
use crate::events::{get_event_sink, EventSink};
use crate::observability::{SendSpanAttributes, SpanTimer};
use crate::types::{values_to_json, ConversionPolicy, Value, ValueType};
use crate::utils::{generate_run_id, iso_timestamp};
use parking_lot::RwLock;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An ordered chain of stages whose final output is broadcast to subscribers.
///
/// Adjacent stages are checked for compatibility once, when the pipeline is
/// constructed, and every subscriber is checked against the terminal
/// signature when it is added. A [`send`](Self::send) therefore never
/// produces an [`IncompatibilityError`]; it can only fail with an
/// [`InvocationFault`] raised by a stage or subscriber.
///
/// The subscriber list sits behind a read-write lock so that `subscribe`
/// takes `&self`. Each send works on a snapshot of the list taken when it
/// starts.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    input_types: Option<Vec<ValueType>>,
    stages: Vec<Arc<dyn Callable>>,
    subscribers: RwLock<Vec<Arc<dyn Callable>>>,
    sink: Arc<dyn EventSink>,
}

impl Pipeline {
    /// Builds a pipeline from an ordered list of stages with default settings.
    ///
    /// Zero stages is allowed and yields an identity pass-through.
    ///
    /// # Errors
    ///
    /// Returns the first incompatibility found between adjacent stages,
    /// attributed to that edge. No pipeline is returned on failure.
    pub fn construct(stages: impl IntoIterator<Item = Handle>) -> Result<Self, IncompatibilityError> {
        Self::assemble(
            PipelineConfig::default(),
            None,
            stages.into_iter().collect(),
            get_event_sink(),
        )
    }

    /// Starts a builder for a named pipeline.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> super::PipelineBuilder {
        super::PipelineBuilder::new(name)
    }

    pub(super) fn assemble(
        config: PipelineConfig,
        input_types: Option<Vec<ValueType>>,
        handles: Vec<Handle>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, IncompatibilityError> {
        if let Err(err) = validate_stages(&handles, input_types.as_deref(), config.conversion) {
            warn!(pipeline = %config.name, error = %err, "pipeline construction rejected");
            emit_event(
                sink.as_ref(),
                &config.name,
                "pipeline.construct_rejected",
                json!({ "error": err.to_dict() }),
            );
            return Err(err);
        }

        let stages = handles
            .into_iter()
            .map(|handle| handle.into_callable(Role::Consumer))
            .collect::<Result<Vec<_>, _>>()?;

        info!(pipeline = %config.name, stages = stages.len(), "pipeline constructed");
        emit_event(
            sink.as_ref(),
            &config.name,
            "pipeline.constructed",
            json!({
                "stages": stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
                "input_types": input_types,
            }),
        );

        Ok(Self {
            config,
            input_types,
            stages,
            subscribers: RwLock::new(Vec::new()),
            sink,
        })
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[Arc<dyn Callable>] {
        &self.stages
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name().to_string()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Returns the subscriber names in registration order.
    #[must_use]
    pub fn subscriber_names(&self) -> Vec<String> {
        self.subscribers
            .read()
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Returns the declared input types, if any.
    #[must_use]
    pub fn input_types(&self) -> Option<&[ValueType]> {
        self.input_types.as_deref()
    }

    /// Returns the signature subscribers must accept.
    ///
    /// This is the last stage's outputs, or the declared input types for a
    /// pipeline without stages. `None` means no terminal signature is known.
    #[must_use]
    pub fn terminal_types(&self) -> Option<&[ValueType]> {
        match self.stages.last() {
            Some(last) => Some(last.output_types()),
            None => self.input_types(),
        }
    }

    fn terminal_location(&self) -> Location {
        self.stages.last().map_or(Location::Input, |last| {
            Location::stage(self.stages.len() - 1, last.name())
        })
    }

    /// Registers a subscriber for the pipeline's final output.
    ///
    /// Subscribers are notified in registration order; the same callable may
    /// be registered more than once. A subscription never affects a send that
    /// is already running.
    ///
    /// # Errors
    ///
    /// Returns an error, and registers nothing, if the subscriber is not
    /// callable, its inputs do not fit the terminal signature, or the
    /// pipeline has no terminal signature.
    pub fn subscribe(&self, subscriber: impl Into<Handle>) -> Result<(), IncompatibilityError> {
        let handle = subscriber.into();
        let consumer = Location::subscriber(self.subscriber_count(), handle.name());

        let callable = match self.check_subscriber(handle) {
            Ok(callable) => callable,
            Err(err) => {
                let err = err.at(self.terminal_location(), consumer);
                warn!(pipeline = %self.config.name, error = %err, "subscription rejected");
                self.emit("pipeline.subscribe_rejected", json!({ "error": err.to_dict() }));
                return Err(err);
            }
        };

        let name = callable.name().to_string();
        let index = {
            let mut subscribers = self.subscribers.write();
            subscribers.push(callable);
            subscribers.len() - 1
        };

        debug!(pipeline = %self.config.name, subscriber = %name, index, "subscriber registered");
        self.emit(
            "pipeline.subscribed",
            json!({ "subscriber": name, "index": index }),
        );
        Ok(())
    }

    fn check_subscriber(&self, handle: Handle) -> Result<Arc<dyn Callable>, IncompatibilityError> {
        if let Some(last) = self.stages.last() {
            check_compatible_with(&Handle::Callable(Arc::clone(last)), &handle, self.config.conversion)?;
            return handle.into_callable(Role::Consumer);
        }

        let consumer = handle.into_callable(Role::Consumer)?;
        let terminal = self
            .input_types()
            .ok_or(IncompatibilityError::UnknownTerminal)?;
        check_signatures(terminal, consumer.input_types(), self.config.conversion)?;
        Ok(consumer)
    }

    /// Runs the stages in order on `args`, then hands the final values to
    /// every subscriber in registration order.
    ///
    /// Nothing is returned on success; observing the result is the
    /// subscribers' job. A pipeline without stages delivers `args`
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvocationFault`] raised, annotated with its
    /// location. No later stage or subscriber runs after a fault.
    pub fn send(&self, args: Vec<Value>) -> Result<(), InvocationFault> {
        let subscribers: Vec<Arc<dyn Callable>> = self.subscribers.read().clone();
        let run_id = generate_run_id().to_string();

        let attrs = SendSpanAttributes::new(&self.config.name, &run_id)
            .with_stage_count(self.stages.len())
            .with_subscriber_count(subscribers.len());
        let span = attrs.span();
        let _entered = span.enter();
        let timer = SpanTimer::start("pipeline.send");

        let mut started = json!({
            "stage_count": self.stages.len(),
            "subscriber_count": subscribers.len(),
        });
        if self.config.emit_values {
            started["args"] = values_to_json(&args);
        }
        self.emit_run("pipeline.send.started", &run_id, started);

        match self.run(args, &subscribers, &run_id) {
            Ok(()) => {
                let duration_ms = timer.elapsed_ms();
                info!(duration_ms, "send completed");
                self.emit_run(
                    "pipeline.send.completed",
                    &run_id,
                    json!({ "duration_ms": duration_ms }),
                );
                Ok(())
            }
            Err(fault) => {
                warn!(error = %fault, "send aborted");
                self.emit_run(
                    "pipeline.send.failed",
                    &run_id,
                    json!({ "error": fault.to_dict(), "duration_ms": timer.elapsed_ms() }),
                );
                Err(fault)
            }
        }
    }

    fn run(
        &self,
        args: Vec<Value>,
        subscribers: &[Arc<dyn Callable>],
        run_id: &str,
    ) -> Result<(), InvocationFault> {
        let mut current = match &self.input_types {
            Some(types) => coerce_values(&self.config.name, FaultKind::Arguments, types, args)
                .map_err(|fault| fault.at(Location::Input))?,
            None => args,
        };

        for (index, stage) in self.stages.iter().enumerate() {
            debug!(index, stage = stage.name(), "invoking stage");
            current = stage
                .invoke(current)
                .map_err(|fault| fault.at(Location::stage(index, stage.name())))?;

            let mut data = json!({ "index": index, "stage": stage.name() });
            if self.config.emit_values {
                data["outputs"] = values_to_json(&current);
            }
            self.emit_run("pipeline.stage.completed", run_id, data);
        }

        for (index, subscriber) in subscribers.iter().enumerate() {
            debug!(index, subscriber = subscriber.name(), "notifying subscriber");
            subscriber
                .invoke(current.clone())
                .map_err(|fault| fault.at(Location::subscriber(index, subscriber.name())))?;
            self.emit_run(
                "pipeline.subscriber.notified",
                run_id,
                json!({ "index": index, "subscriber": subscriber.name() }),
            );
        }

        Ok(())
    }

    fn emit(&self, event_type: &str, data: serde_json::Value) {
        emit_event(self.sink.as_ref(), &self.config.name, event_type, data);
    }

    fn emit_run(&self, event_type: &str, run_id: &str, mut data: serde_json::Value) {
        data["run_id"] = json!(run_id);
        self.emit(event_type, data);
    }
}

fn emit_event(sink: &dyn EventSink, pipeline: &str, event_type: &str, mut data: serde_json::Value) {
    if let Some(map) = data.as_object_mut() {
        map.insert("pipeline".to_string(), json!(pipeline));
        map.insert("timestamp".to_string(), json!(iso_timestamp()));
    }
    sink.emit(event_type, Some(data));
}

/// Checks every edge of a stage list: declared input to the first stage,
/// then each adjacent pair. The first failure wins.
fn validate_stages(
    handles: &[Handle],
    input_types: Option<&[ValueType]>,
    policy: ConversionPolicy,
) -> Result<(), IncompatibilityError> {
    if let Some(first) = handles.first() {
        let at_first = |err: IncompatibilityError| err.at(Location::Input, Location::stage(0, first.name()));
        let callable = first.as_callable(Role::Consumer).map_err(at_first)?;
        if let Some(inputs) = input_types {
            check_signatures(inputs, callable.input_types(), policy).map_err(at_first)?;
        }
    }

    for (index, pair) in handles.windows(2).enumerate() {
        check_compatible_with(&pair[0], &pair[1], policy).map_err(|err| {
            err.at(
                Location::stage(index, pair[0].name()),
                Location::stage(index + 1, pair[1].name()),
            )
        })?;
    }

    Ok(())
}
