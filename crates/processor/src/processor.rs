//! The facade owning the queue, the registry, and the consumer thread.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread;
use std::time::Duration;

use messages::{Envelope, ProducerId, Severity, SourceId, SourceRegistry};
use queue::Queue;

use crate::error::ProcessorError;
use crate::worker;

/// How long shutdown waits for the worker to confirm it has exited before
/// abandoning it.
const SHUTDOWN_WAIT: Duration = Duration::from_secs(1);

/// State shared between the facade, its handles, and the worker thread.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) queue: Queue<Envelope>,
    pub(crate) registry: SourceRegistry,
    pub(crate) dead: AtomicBool,
}

impl Shared {
    pub(crate) fn new(overall: Severity) -> Self {
        Self {
            queue: Queue::new(),
            registry: SourceRegistry::new(overall),
            dead: AtomicBool::new(false),
        }
    }
}

/// The one live processor per process, tracked weakly so a dead instance
/// never blocks a fresh construction.
static CURRENT: Mutex<Weak<Shared>> = Mutex::new(Weak::new());

fn current_guard() -> std::sync::MutexGuard<'static, Weak<Shared>> {
    CURRENT.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cheap clonable accessor to a running processor.
///
/// Handles are how producer threads reach the processor without owning its
/// lifecycle: obtain one from [`Processor::handle`] or
/// [`Processor::current`], move clones into threads freely. A handle keeps
/// the shared state alive but not the worker; once the owning [`Processor`]
/// shuts down, submissions through surviving handles are queued but never
/// consumed.
#[derive(Clone, Debug)]
pub struct Handle {
    shared: Arc<Shared>,
}

impl Handle {
    /// Registers a message source and returns its id.
    ///
    /// Ids are sequential and never retired. Registration takes a coarse
    /// registry lock and is meant for module-initialization time, not hot
    /// paths.
    pub fn register_source(&self, ceiling: Severity, name: impl Into<String>) -> SourceId {
        self.shared.registry.register(ceiling, name)
    }

    /// Submits a message for serialized display.
    ///
    /// The calling thread's identity is recorded in the envelope; text ending
    /// in the ticker suffix animates in place instead of scrolling. Messages
    /// that the current ceilings would hide are dropped here without being
    /// queued — an optimization only, the render step re-checks.
    pub fn submit(&self, source: SourceId, severity: Severity, text: impl Into<String>) {
        if self.shared.registry.visible(source, severity) {
            self.shared.queue.push(Envelope::display(
                ProducerId::current(),
                source,
                severity,
                text.into(),
            ));
        }
    }

    /// Updates the overall verbosity ceiling.
    ///
    /// Affects subsequently rendered messages only; envelopes already queued
    /// are re-checked at render time against the value current then.
    pub fn set_overall_verbosity(&self, overall: Severity) {
        self.shared.registry.set_overall(overall);
    }

    /// Returns the current overall verbosity ceiling.
    #[must_use]
    pub fn overall_verbosity(&self) -> Severity {
        self.shared.registry.overall()
    }

    /// Blocks until the queue has drained.
    ///
    /// The envelope being rendered at that instant may still be in flight;
    /// only the queue itself is guaranteed empty.
    pub fn wait_idle(&self) {
        self.shared.queue.wait_empty();
    }

    /// Reports whether the worker has exited its loop.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.shared.dead.load(Ordering::SeqCst)
    }
}

/// Process-wide serializer of diagnostic messages.
///
/// Owns the blocking queue, the source registry, and the single consumer
/// thread that renders every message. At most one live instance exists per
/// process; construction fails with [`ProcessorError::AlreadyRunning`] while
/// one is alive, and [`Processor::current`] hands out [`Handle`]s to code
/// that did not construct it.
///
/// Dropping the processor runs the shutdown protocol: a final status message
/// followed by the kill envelope, then a bounded wait for the worker to
/// confirm. Shutdown is best-effort — a backlog the worker cannot drain
/// within the wait is abandoned, not flushed.
///
/// # Examples
///
/// ```
/// use messages::Severity;
/// use processor::Processor;
///
/// let processor = Processor::with_sink(Severity::MinorSteps, Box::new(std::io::sink()))?;
/// let net = processor.register_source(Severity::MinorSteps, "Net");
///
/// processor.submit(net, Severity::MajorSteps, "listening");
/// processor.submit(net, Severity::Everything, "socket options");  // filtered
///
/// processor.wait_idle();
/// processor.shutdown();
/// # Ok::<(), processor::ProcessorError>(())
/// ```
#[derive(Debug)]
pub struct Processor {
    handle: Handle,
    worker: Option<thread::JoinHandle<()>>,
    done: Receiver<()>,
}

impl Processor {
    /// Starts a processor rendering to standard error.
    ///
    /// # Errors
    ///
    /// [`ProcessorError::AlreadyRunning`] if a live processor exists;
    /// [`ProcessorError::Spawn`] if the consumer thread cannot be started.
    pub fn new(overall: Severity) -> Result<Self, ProcessorError> {
        Self::with_sink(overall, Box::new(io::stderr()))
    }

    /// Starts a processor rendering to the given sink.
    ///
    /// The sink is moved into the consumer thread, which is its only writer;
    /// fragments appear on it in render order.
    ///
    /// # Errors
    ///
    /// [`ProcessorError::AlreadyRunning`] if a live processor exists;
    /// [`ProcessorError::Spawn`] if the consumer thread cannot be started.
    pub fn with_sink(
        overall: Severity,
        sink: Box<dyn Write + Send>,
    ) -> Result<Self, ProcessorError> {
        let mut current = current_guard();
        if current
            .upgrade()
            .is_some_and(|shared| !shared.dead.load(Ordering::SeqCst))
        {
            return Err(ProcessorError::AlreadyRunning);
        }

        let shared = Arc::new(Shared::new(overall));
        let (done_tx, done) = mpsc::channel();
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("message-processor".into())
            .spawn(move || worker::run(worker_shared, sink, done_tx))?;
        *current = Arc::downgrade(&shared);
        drop(current);

        let processor = Self {
            handle: Handle { shared },
            worker: Some(worker),
            done,
        };
        processor.submit(
            SourceId::PROCESSOR,
            Severity::Everything,
            "started message processor",
        );
        Ok(processor)
    }

    /// Returns a handle to the live processor.
    ///
    /// # Errors
    ///
    /// [`ProcessorError::NotRunning`] if none was ever constructed or the
    /// last one has shut down.
    pub fn current() -> Result<Handle, ProcessorError> {
        current_guard()
            .upgrade()
            .filter(|shared| !shared.dead.load(Ordering::SeqCst))
            .map(|shared| Handle { shared })
            .ok_or(ProcessorError::NotRunning)
    }

    /// Returns a clonable handle to this processor.
    #[must_use]
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Registers a message source and returns its id. See
    /// [`Handle::register_source`].
    pub fn register_source(&self, ceiling: Severity, name: impl Into<String>) -> SourceId {
        self.handle.register_source(ceiling, name)
    }

    /// Submits a message for serialized display. See [`Handle::submit`].
    pub fn submit(&self, source: SourceId, severity: Severity, text: impl Into<String>) {
        self.handle.submit(source, severity, text);
    }

    /// Updates the overall verbosity ceiling. See
    /// [`Handle::set_overall_verbosity`].
    pub fn set_overall_verbosity(&self, overall: Severity) {
        self.handle.set_overall_verbosity(overall);
    }

    /// Returns the current overall verbosity ceiling.
    #[must_use]
    pub fn overall_verbosity(&self) -> Severity {
        self.handle.overall_verbosity()
    }

    /// Blocks until the queue has drained. See [`Handle::wait_idle`].
    pub fn wait_idle(&self) {
        self.handle.wait_idle();
    }

    /// Reports whether the worker has exited its loop.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.handle.is_dead()
    }

    /// Shuts the processor down explicitly.
    ///
    /// Equivalent to dropping it: pushes the final status message and the
    /// kill envelope, then waits a bounded interval for the worker to exit.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        // The kill envelope itself never renders, so a status message goes
        // ahead of it; queue order guarantees the line appears before the
        // worker exits. Pushed unfiltered — render applies the ceilings.
        let producer = ProducerId::current();
        self.handle.shared.queue.push(Envelope::display(
            producer,
            SourceId::PROCESSOR,
            Severity::MinorSteps,
            "killing message processor",
        ));
        self.handle.shared.queue.push(Envelope::kill(producer));

        match self.done.recv_timeout(SHUTDOWN_WAIT) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = worker.join();
            }
            Err(RecvTimeoutError::Timeout) => {
                // Best effort: a worker that has not drained in time is
                // abandoned, not waited on further.
            }
        }
    }
}

impl Drop for Processor {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}
