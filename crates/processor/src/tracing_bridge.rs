//! Bridge from the `tracing` ecosystem into the serialized processor.
//!
//! [`ProcessorLayer`] is a `tracing-subscriber` layer that forwards tracing
//! events into a [`Handle`], so code instrumented with the standard macros
//! (`error!`, `warn!`, `info!`, `debug!`, `trace!`) shares the serialized
//! output channel with directly submitted messages.
//!
//! Event targets become message sources: the layer registers one source per
//! distinct target (at ceiling [`Severity::Everything`]) the first time the
//! target is seen, and caches the mapping. Filtering then happens through the
//! processor's own verbosity ceilings.
//!
//! # Usage
//!
//! ```rust,ignore
//! use messages::Severity;
//! use processor::{init_tracing, Processor};
//!
//! let processor = Processor::new(Severity::MinorSteps)?;
//! init_tracing(processor.handle());
//!
//! tracing::info!(target: "net", "listening");
//! tracing::error!(target: "net", "connection reset");
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use messages::{Severity, SourceId};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::Handle;

/// A tracing layer that forwards events into the message processor.
pub struct ProcessorLayer {
    handle: Handle,
    sources: Mutex<HashMap<String, SourceId>>,
}

impl ProcessorLayer {
    /// Creates a layer that submits through the given handle.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            sources: Mutex::new(HashMap::new()),
        }
    }

    /// Maps a tracing level to a severity tier.
    fn level_to_severity(level: &Level) -> Severity {
        match *level {
            Level::ERROR | Level::WARN => Severity::Errors,
            Level::INFO => Severity::MinorSteps,
            Level::DEBUG | Level::TRACE => Severity::Everything,
        }
    }

    /// Returns the source registered for a target, registering it on first
    /// sight.
    fn source_for(&self, target: &str) -> SourceId {
        let mut sources = self.sources.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(&id) = sources.get(target) {
            return id;
        }
        let id = self.handle.register_source(Severity::Everything, target);
        sources.insert(target.to_owned(), id);
        id
    }
}

impl<S> Layer<S> for ProcessorLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let severity = Self::level_to_severity(metadata.level());

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if let Some(message) = visitor.message {
            let source = self.source_for(metadata.target());
            self.handle.submit(source, severity, message);
        }
    }
}

/// Visitor that extracts the `message` field from a tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        }
    }
}

/// Installs a [`ProcessorLayer`] over the given handle as the global tracing
/// subscriber.
///
/// # Panics
///
/// Panics if a global subscriber is already installed, matching the behaviour
/// of `tracing_subscriber`'s `init` helpers.
pub fn init_tracing(handle: Handle) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(ProcessorLayer::new(handle))
        .init();
}
