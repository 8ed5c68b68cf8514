use crate::{Envelope, Severity, SourceRegistry};

/// Outcome of rendering an envelope: the visibility decision and the
/// formatted text.
///
/// The line is produced regardless of visibility so internal callers can
/// format first and decide later; ordinary consumers discard invisible
/// results.
#[derive(Clone, Debug)]
pub struct Rendered {
    /// Whether the verbosity ceilings allow this message to be displayed.
    pub visible: bool,
    /// The formatted text.
    pub line: String,
}

/// Decides visibility and produces the exact formatted line for an envelope.
///
/// Pure string work: no I/O, no state. This is the authoritative filter; any
/// eager check done before queueing is an optimization only.
///
/// [`Severity::Quiet`] messages are normal program output funnelled through
/// the serialized channel and pass through verbatim: no prefix, no trailing
/// newline. Every other severity renders as
///
/// ```text
/// [<producer>] <prefix> <source><separator><text>
/// ```
///
/// where the separator is `" - "` unless the text begins with `"::"`, in
/// which case the source name (typically a type) and the text (typically a
/// member) concatenate directly. A trailing newline is appended unless the
/// text is a ticker; ticker newline placement belongs to the consumer.
///
/// # Examples
///
/// ```
/// use messages::{render, Envelope, ProducerId, Severity, SourceRegistry};
///
/// let registry = SourceRegistry::new(Severity::MinorSteps);
/// let net = registry.register(Severity::MinorSteps, "Net");
///
/// let envelope = Envelope::display(
///     ProducerId::from_raw(7),
///     net,
///     Severity::Errors,
///     "::connect failed",
/// );
/// let rendered = render(&envelope, &registry);
///
/// assert!(rendered.visible);
/// assert_eq!(rendered.line, "[ 7] Error:  Net::connect failed\n");
/// ```
#[must_use]
pub fn render(envelope: &Envelope, registry: &SourceRegistry) -> Rendered {
    let visible = registry.visible(envelope.source, envelope.severity);

    if envelope.severity.is_quiet() {
        return Rendered {
            visible,
            line: envelope.text.clone(),
        };
    }

    let mut line = format!(
        "[{:2}] {} ",
        envelope.producer.as_u64(),
        envelope.severity.prefix()
    );
    if let Some(name) = registry.name(envelope.source) {
        line.push_str(&name);
        if !envelope.text.starts_with("::") {
            line.push_str(" - ");
        }
    }
    line.push_str(&envelope.text);
    if !envelope.is_ticker() {
        line.push('\n');
    }

    Rendered { visible, line }
}
