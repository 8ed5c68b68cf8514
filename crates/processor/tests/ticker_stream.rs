//! Integration test for the rendered byte stream: quiet pass-through,
//! ticker coalescing, ticker interruption by a foreign producer, and the
//! closing status lines — asserted byte-for-byte against the sink.
//!
//! Producer ids are deterministic here: the main thread takes id 1 on its
//! first visible submission, the spawned producer takes 2, and the worker
//! takes 3 when it writes its exit line. One test function per file keeps
//! the process-wide facade unshared.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;

use messages::Severity;
use processor::Processor;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn rendered_stream_matches_byte_for_byte() {
    let buf = SharedBuf::default();
    let processor =
        Processor::with_sink(Severity::MinorSteps, Box::new(buf.clone())).expect("start");

    let out = processor.register_source(Severity::MinorSteps, "Out");
    let pack = processor.register_source(Severity::MinorSteps, "Pack");

    // Verbatim pass-through, then an annotated line that must separate
    // itself from the partial quiet output.
    processor.submit(out, Severity::Quiet, "chunk-a");
    processor.submit(out, Severity::Quiet, "chunk-b");
    processor.submit(out, Severity::Errors, "bad block");

    // Three identical progress messages coalesce into one line plus three
    // spinner glyphs.
    for _ in 0..3 {
        processor.submit(pack, Severity::MinorSteps, "compressing block .");
    }

    // A different producer's tick blips through with an interrupted glyph
    // and does not take the ticker over.
    let foreign = processor.handle();
    thread::spawn(move || {
        foreign.submit(pack, Severity::MinorSteps, "other task .");
    })
    .join()
    .unwrap();

    // New text under the baseline identity restarts the spinner on a fresh
    // line; a plain message then terminates it.
    processor.submit(pack, Severity::MinorSteps, "writing index .");
    processor.submit(pack, Severity::MajorSteps, "done");

    processor.wait_idle();
    processor.shutdown();

    let expected = concat!(
        "chunk-achunk-b",
        "\n[ 1] Error:  Out - bad block\n",
        "[ 1] Info:   Pack - compressing block .\x08|\x08/\x08-",
        "\x08V",
        "\n[ 1] Info:   Pack - writing index .\x08|",
        "\n[ 1] Info:   Pack - done\n",
        "[ 1] Info:   Message_Processor - killing message processor\n",
        "[ 3] Info:   Message_Processor - exiting message processor\n",
    );
    assert_eq!(buf.contents(), expected);
}
