use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Severity, SourceId};

/// Suffix that marks a message as a progress ticker.
///
/// A textual convention, not a flag: any message whose text ends with these
/// two characters is animated in place by the consumer instead of scrolling.
pub const TICKER_SUFFIX: &str = " .";

static NEXT_PRODUCER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_PRODUCER: ProducerId =
        ProducerId(NEXT_PRODUCER.fetch_add(1, Ordering::Relaxed));
}

/// Identity of a message-producing thread.
///
/// Each thread is lazily assigned a compact id from a process-wide counter the
/// first time it asks for [`current`](Self::current). The id survives for the
/// thread's lifetime and is what ticker coalescing compares, so two bursts of
/// the same progress text from different threads animate as different tickers.
///
/// # Examples
///
/// ```
/// use messages::ProducerId;
///
/// let here = ProducerId::current();
/// assert_eq!(here, ProducerId::current());
///
/// let other = std::thread::spawn(ProducerId::current).join().unwrap();
/// assert_ne!(here, other);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ProducerId(u64);

impl ProducerId {
    /// Returns the calling thread's producer identity, assigning one on first
    /// use.
    #[must_use]
    pub fn current() -> Self {
        CURRENT_PRODUCER.with(|id| *id)
    }

    /// Builds a producer identity from a raw value. Primarily useful in tests
    /// that fabricate envelopes without spawning threads.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the numeric value of this id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProducerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the consumer should do with an envelope.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// Render the message if the verbosity ceilings allow it.
    Display,
    /// Exit the worker loop.
    Kill,
}

/// The unit of work transported through the blocking queue.
///
/// Immutable once constructed; consumed and dropped by the worker.
#[derive(Clone, Debug)]
pub struct Envelope {
    /// What the consumer should do.
    pub action: Action,
    /// Identity of the submitting thread.
    pub producer: ProducerId,
    /// Message source; must have been registered before this envelope is
    /// consumed (guaranteed by construction of the submit API).
    pub source: SourceId,
    /// Severity tier.
    pub severity: Severity,
    /// Message text.
    pub text: String,
}

impl Envelope {
    /// Builds a display envelope.
    #[must_use]
    pub fn display(
        producer: ProducerId,
        source: SourceId,
        severity: Severity,
        text: impl Into<String>,
    ) -> Self {
        Self {
            action: Action::Display,
            producer,
            source,
            severity,
            text: text.into(),
        }
    }

    /// Builds the kill envelope that ends the worker loop.
    #[must_use]
    pub fn kill(producer: ProducerId) -> Self {
        Self {
            action: Action::Kill,
            producer,
            source: SourceId::PROCESSOR,
            severity: Severity::Quiet,
            text: String::new(),
        }
    }

    /// Reports whether the text is a progress ticker (ends with
    /// [`TICKER_SUFFIX`]).
    #[must_use]
    pub fn is_ticker(&self) -> bool {
        self.text.ends_with(TICKER_SUFFIX)
    }
}
