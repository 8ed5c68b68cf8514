use std::io;

use thiserror::Error;

/// Errors surfaced by the [`Processor`](crate::Processor) facade.
///
/// All variants are construction- or lookup-time failures. Faults inside the
/// running worker are never surfaced as errors; they are rendered as internal
/// `Error: `-prefixed lines and the worker continues.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// A live processor already exists in this process.
    #[error("a message processor is already running in this process")]
    AlreadyRunning,

    /// No live processor exists: none was ever constructed, or the last one
    /// has shut down.
    #[error("no message processor is running in this process")]
    NotRunning,

    /// The consumer thread could not be started.
    #[error("failed to start the message processor thread: {0}")]
    Spawn(#[from] io::Error),
}
