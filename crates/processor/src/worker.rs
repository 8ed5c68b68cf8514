//! The consumer side: the single worker loop that renders every envelope.
//!
//! Exactly one worker thread exists per processor. It is the only reader of
//! the queue and the only writer of the sink, so the ticker state it carries
//! between iterations needs no synchronisation.

use std::io::{self, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use messages::{render, Action, Envelope, ProducerId, Severity, SourceId};

use crate::processor::Shared;

/// Rotating spinner glyphs. Each starts with a backspace so the glyph
/// overwrites the final character of the line already on screen (the period
/// of the `" ."` ticker suffix, or the previous glyph).
const TICK_GLYPHS: [&str; 4] = ["\x08|", "\x08/", "\x08-", "\x08\\"];

/// Glyphs written when a different producer's ticker blips through an active
/// one.
const INTERRUPT_GLYPHS: [&str; 4] = ["\x08!", "\x08X", "\x08=", "\x08V"];

/// What the loop should do after consuming an envelope.
enum Step {
    Continue,
    Exit,
}

/// State carried across loop iterations.
///
/// `tick_count != 0` means a ticker is animating; `source`, `producer` and
/// `text` then identify it. `prev_severity` is what the last non-ticker
/// message rendered at, used to separate annotated lines from verbatim
/// pass-through output.
struct TickerState {
    tick_count: u32,
    source: SourceId,
    producer: ProducerId,
    text: String,
    prev_severity: Severity,
}

impl TickerState {
    fn new() -> Self {
        Self {
            tick_count: 0,
            source: SourceId::PROCESSOR,
            producer: ProducerId::from_raw(0),
            text: String::new(),
            prev_severity: Severity::Errors,
        }
    }

    fn active(&self) -> bool {
        self.tick_count != 0
    }
}

/// The consumer. Owns the sink and the ticker state machine.
struct Worker<W> {
    shared: Arc<Shared>,
    sink: W,
    state: TickerState,
}

/// Entry point of the consumer thread. Returns only after a kill envelope.
pub(crate) fn run(shared: Arc<Shared>, sink: Box<dyn Write + Send>, done: Sender<()>) {
    let mut worker = Worker::new(Arc::clone(&shared), sink);
    loop {
        let envelope = shared.queue.pop();
        match worker.consume(envelope) {
            Step::Continue => {}
            Step::Exit => break,
        }
    }
    worker.finish();
    shared.dead.store(true, Ordering::SeqCst);
    let _ = done.send(());
}

impl<W: Write> Worker<W> {
    fn new(shared: Arc<Shared>, sink: W) -> Self {
        Self {
            shared,
            sink,
            state: TickerState::new(),
        }
    }

    /// Handles one envelope. A fault while displaying — a sink error or a
    /// panic — is reported as an internal error message and the loop keeps
    /// going; only a kill envelope ends it.
    fn consume(&mut self, envelope: Envelope) -> Step {
        if envelope.action == Action::Kill {
            return Step::Exit;
        }
        match catch_unwind(AssertUnwindSafe(|| self.display(&envelope))) {
            Ok(Ok(())) => {}
            Ok(Err(_)) | Err(_) => self.report_fault(),
        }
        Step::Continue
    }

    fn display(&mut self, envelope: &Envelope) -> io::Result<()> {
        let rendered = render(envelope, &self.shared.registry);
        if !rendered.visible {
            return Ok(());
        }
        if envelope.is_ticker() {
            self.display_ticker(envelope, &rendered.line)?;
        } else {
            self.display_line(envelope, &rendered.line)?;
        }
        self.sink.flush()
    }

    fn display_ticker(&mut self, envelope: &Envelope, line: &str) -> io::Result<()> {
        if !self.state.active() {
            // first tick: write the full line, then start the spinner
            self.sink.write_all(line.as_bytes())?;
            self.sink.write_all(TICK_GLYPHS[0].as_bytes())?;
            self.state.source = envelope.source;
            self.state.producer = envelope.producer;
            self.state.text = envelope.text.clone();
            self.state.tick_count = 1;
            return Ok(());
        }

        if envelope.source == self.state.source && envelope.producer == self.state.producer {
            if envelope.text == self.state.text {
                // same message: advance the spinner in place
                let glyph = TICK_GLYPHS[(self.state.tick_count & 3) as usize];
                self.sink.write_all(glyph.as_bytes())?;
                self.state.tick_count = self.state.tick_count.wrapping_add(1);
            } else {
                // same identity, new text: restart on a fresh line
                self.sink.write_all(b"\n")?;
                self.sink.write_all(line.as_bytes())?;
                self.sink.write_all(TICK_GLYPHS[0].as_bytes())?;
                self.state.text = envelope.text.clone();
                self.state.tick_count = 1;
            }
        } else {
            // another producer blips through; the recorded baseline is
            // deliberately left untouched so the running ticker cannot be
            // hijacked by single interrupting ticks
            let glyph = INTERRUPT_GLYPHS[(self.state.tick_count & 3) as usize];
            self.sink.write_all(glyph.as_bytes())?;
            self.state.tick_count = self.state.tick_count.wrapping_add(1);
        }
        Ok(())
    }

    fn display_line(&mut self, envelope: &Envelope, line: &str) -> io::Result<()> {
        if self.state.active() {
            // terminate the spinner line before scrolling resumes
            self.sink.write_all(b"\n")?;
            self.state.tick_count = 0;
        } else if self.state.prev_severity.is_quiet() && !envelope.severity.is_quiet() {
            // separate annotated output from preceding verbatim pass-through
            self.sink.write_all(b"\n")?;
        }
        self.sink.write_all(line.as_bytes())?;
        self.state.source = envelope.source;
        self.state.producer = envelope.producer;
        self.state.text = envelope.text.clone();
        self.state.prev_severity = envelope.severity;
        Ok(())
    }

    /// Renders the internal error line for a fault caught in [`consume`].
    ///
    /// Written directly, outside the ticker state machine: the fault may have
    /// left the sink mid-line, and a failing sink must not fault again.
    fn report_fault(&mut self) {
        let envelope = Envelope::display(
            ProducerId::current(),
            SourceId::PROCESSOR,
            Severity::Errors,
            "unknown fault while displaying a message",
        );
        let rendered = render(&envelope, &self.shared.registry);
        if rendered.visible {
            let _ = self.sink.write_all(rendered.line.as_bytes());
            let _ = self.sink.flush();
        }
    }

    /// Emits the final status line after the loop has exited.
    fn finish(&mut self) {
        let envelope = Envelope::display(
            ProducerId::current(),
            SourceId::PROCESSOR,
            Severity::MinorSteps,
            "exiting message processor",
        );
        let rendered = render(&envelope, &self.shared.registry);
        if rendered.visible {
            let _ = self.sink.write_all(rendered.line.as_bytes());
            let _ = self.sink.flush();
        }
    }
}
