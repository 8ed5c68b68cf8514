#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `messages` is the vocabulary crate for the serialized diagnostics system:
//! the ordered [`Severity`] tiers, the append-only [`SourceRegistry`] mapping
//! source ids to display names and verbosity ceilings, the [`Envelope`] unit
//! of work, and the pure [`render`] function that decides visibility and
//! produces the exact formatted line.
//!
//! Everything here is synchronous string work. Threads, queues, and the
//! consumer loop live in the `processor` crate; the transport lives in
//! `queue`.
//!
//! # Design
//!
//! Rendering is split from writing so the consumer can make newline decisions
//! that depend on ticker state: [`render`] never appends a newline to a
//! ticker message (text ending in [`TICKER_SUFFIX`]), and renders
//! [`Severity::Quiet`] text verbatim for pass-through of normal program
//! output.
//!
//! # Invariants
//!
//! - The visibility predicate is monotone: lowering a message's severity
//!   never hides it under the same ceilings.
//! - Source ids are assigned sequentially and never retired; id 0 is
//!   reserved for the processor's own diagnostics.
//! - `Quiet` is the minimum severity, so quiet messages pass every source
//!   ceiling.
//!
//! # Examples
//!
//! ```
//! use messages::{render, Envelope, ProducerId, Severity, SourceRegistry};
//!
//! let registry = SourceRegistry::new(Severity::MinorSteps);
//! let net = registry.register(Severity::MinorSteps, "Net");
//!
//! let envelope = Envelope::display(
//!     ProducerId::from_raw(7),
//!     net,
//!     Severity::Errors,
//!     "::connect failed",
//! );
//! let rendered = render(&envelope, &registry);
//!
//! assert!(rendered.visible);
//! assert_eq!(rendered.line, "[ 7] Error:  Net::connect failed\n");
//! ```

mod envelope;
mod render;
mod severity;
mod source;

pub use envelope::{Action, Envelope, ProducerId, TICKER_SUFFIX};
pub use render::{render, Rendered};
pub use severity::{ParseSeverityError, Severity};
pub use source::{SourceId, SourceRecord, SourceRegistry, PROCESSOR_SOURCE_NAME};
