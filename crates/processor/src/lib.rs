#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `processor` serializes human-readable diagnostics from any number of
//! producer threads through one consumer thread. Producers submit
//! severity-tagged messages for registered sources; the consumer filters
//! them against per-source and overall verbosity ceilings, formats them, and
//! writes them to a single sink — so concurrent output never interleaves
//! mid-line.
//!
//! Repeated progress messages get special treatment: any text ending in the
//! `" ."` ticker suffix animates in place as a rotating spinner glyph instead
//! of scrolling, and a burst of N identical progress messages renders as one
//! line plus N glyphs.
//!
//! # Design
//!
//! The blocking queue (the `queue` crate) is the only producer/consumer
//! synchronisation point. The worker loop owns the sink and all coalescing
//! state; the [`Processor`] facade owns the worker thread's lifecycle and
//! enforces the at-most-one-per-process invariant through a constructor-time
//! check. [`Handle`]s are cheap clones for producer threads, obtainable from
//! the facade or via [`Processor::current`].
//!
//! Shutdown pushes a final status message followed by a kill envelope, then
//! waits a bounded interval for the worker to confirm; it never guarantees a
//! full drain.
//!
//! # Errors
//!
//! Construction and lookup surface [`ProcessorError`]. Faults inside the
//! running worker — sink I/O errors, panics while formatting — are contained,
//! rendered as internal `Error: `-prefixed lines when the ceilings allow, and
//! never propagate: only the kill envelope ends the worker.
//!
//! # Examples
//!
//! ```
//! use messages::Severity;
//! use processor::Processor;
//!
//! let processor = Processor::with_sink(Severity::MinorSteps, Box::new(std::io::sink()))?;
//! let net = processor.register_source(Severity::MinorSteps, "Net");
//!
//! processor.submit(net, Severity::Errors, "::connect failed");
//! for _ in 0..3 {
//!     processor.submit(net, Severity::MinorSteps, "retrying .");
//! }
//!
//! processor.wait_idle();
//! processor.shutdown();
//! # Ok::<(), processor::ProcessorError>(())
//! ```

mod error;
mod processor;
#[cfg(feature = "tracing")]
mod tracing_bridge;
mod worker;

pub use error::ProcessorError;
pub use processor::{Handle, Processor};
#[cfg(feature = "tracing")]
pub use tracing_bridge::{init_tracing, ProcessorLayer};
