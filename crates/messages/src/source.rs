use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::Severity;

/// Display name of the source reserved for the processor's own diagnostics.
pub const PROCESSOR_SOURCE_NAME: &str = "Message_Processor";

/// Identifier of a registered message source.
///
/// Ids are handed out sequentially by [`SourceRegistry::register`], starting
/// after the reserved [`PROCESSOR`](Self::PROCESSOR) slot. They are never
/// reused or retired.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SourceId(usize);

impl SourceId {
    /// The source reserved for the processor's own internal messages.
    pub const PROCESSOR: Self = Self(0);

    /// Builds a source id from a raw index.
    ///
    /// An id that was never handed out by a registry resolves to no name and
    /// an effective ceiling of [`Severity::Quiet`]. Primarily useful in tests.
    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the numeric value of this id.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered message source: a module or class that emits messages.
#[derive(Clone, Debug)]
pub struct SourceRecord {
    /// Identifier assigned at registration.
    pub id: SourceId,
    /// Display name rendered ahead of the message text.
    pub name: String,
    /// Most verbose severity this source is allowed to display.
    pub ceiling: Severity,
}

/// Append-only registry of message sources plus the overall verbosity.
///
/// The registry is shared between producer threads (registration, verbosity
/// changes, the eager submit filter) and the consumer (rendering), all
/// through `&self`; one internal `RwLock` is the only guard. Registration is
/// expected at module-initialization time, not on hot paths.
///
/// Slot 0 is seeded at construction with [`PROCESSOR_SOURCE_NAME`] at ceiling
/// [`Severity::Everything`], so internal diagnostics are only muted by the
/// overall verbosity.
///
/// # Examples
///
/// ```
/// use messages::{Severity, SourceRegistry};
///
/// let registry = SourceRegistry::new(Severity::MinorSteps);
/// let net = registry.register(Severity::MajorSteps, "Net");
///
/// assert!(registry.visible(net, Severity::Errors));
/// assert!(!registry.visible(net, Severity::MinorSteps));
/// ```
#[derive(Debug)]
pub struct SourceRegistry {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    sources: Vec<SourceRecord>,
    overall: Severity,
}

impl SourceRegistry {
    /// Creates a registry with the given overall verbosity and the reserved
    /// processor source in slot 0.
    #[must_use]
    pub fn new(overall: Severity) -> Self {
        let seed = SourceRecord {
            id: SourceId::PROCESSOR,
            name: PROCESSOR_SOURCE_NAME.to_string(),
            ceiling: Severity::Everything,
        };
        Self {
            inner: RwLock::new(Inner {
                sources: vec![seed],
                overall,
            }),
        }
    }

    /// Registers a source and returns its id.
    ///
    /// Ids are sequential in registration order. Records are never deleted.
    pub fn register(&self, ceiling: Severity, name: impl Into<String>) -> SourceId {
        let mut inner = self.write();
        let id = SourceId(inner.sources.len());
        inner.sources.push(SourceRecord {
            id,
            name: name.into(),
            ceiling,
        });
        id
    }

    /// Returns the current overall verbosity.
    #[must_use]
    pub fn overall(&self) -> Severity {
        self.read().overall
    }

    /// Updates the overall verbosity.
    ///
    /// Takes effect for subsequently rendered messages only; envelopes already
    /// queued were filtered eagerly but are re-checked at render time against
    /// the value current then.
    pub fn set_overall(&self, overall: Severity) {
        self.write().overall = overall;
    }

    /// Returns the record for an id, or `None` if it was never registered.
    #[must_use]
    pub fn get(&self, id: SourceId) -> Option<SourceRecord> {
        self.read().sources.get(id.0).cloned()
    }

    /// Returns the display name for an id, or `None` if it was never
    /// registered.
    #[must_use]
    pub fn name(&self, id: SourceId) -> Option<String> {
        self.read().sources.get(id.0).map(|record| record.name.clone())
    }

    /// Returns the verbosity ceiling for an id.
    ///
    /// An unregistered id has an effective ceiling of [`Severity::Quiet`]:
    /// only pass-through messages from unknown sources are visible.
    #[must_use]
    pub fn ceiling(&self, id: SourceId) -> Severity {
        self.read()
            .sources
            .get(id.0)
            .map_or(Severity::Quiet, |record| record.ceiling)
    }

    /// The authoritative visibility predicate: true when `severity` is at or
    /// below both the source ceiling and the overall verbosity.
    #[must_use]
    pub fn visible(&self, id: SourceId, severity: Severity) -> bool {
        let inner = self.read();
        let ceiling = inner
            .sources
            .get(id.0)
            .map_or(Severity::Quiet, |record| record.ceiling);
        severity <= ceiling && severity <= inner.overall
    }

    /// Returns the number of registered sources, the reserved slot included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().sources.len()
    }

    /// Reports whether the registry holds no sources. Always false: slot 0 is
    /// seeded at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().sources.is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
