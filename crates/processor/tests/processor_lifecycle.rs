//! Integration test for the facade lifecycle: the at-most-one invariant,
//! handle lookup, verbosity filtering through the full pipeline, and
//! reconstruction after shutdown.
//!
//! The whole scenario lives in one test function: the guard is process-wide,
//! and test functions within one binary run concurrently.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use messages::Severity;
use processor::{Processor, ProcessorError};

/// In-memory sink that stays inspectable after moving into the worker.
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
fn lifecycle_enforces_the_single_instance_protocol() {
    // Nothing constructed yet.
    assert!(matches!(
        Processor::current(),
        Err(ProcessorError::NotRunning)
    ));

    let buf = SharedBuf::default();
    let processor =
        Processor::with_sink(Severity::MinorSteps, Box::new(buf.clone())).expect("start");

    // A second live construction is refused.
    assert!(matches!(
        Processor::with_sink(Severity::MinorSteps, Box::new(io::sink())),
        Err(ProcessorError::AlreadyRunning)
    ));

    // Threads that did not construct the processor reach it by lookup.
    let handle = Processor::current().expect("running");
    let net = handle.register_source(Severity::MinorSteps, "Net");
    let chatty = handle.register_source(Severity::Everything, "Chatty");

    handle.submit(net, Severity::Errors, "::connect failed");
    // Cut by the source ceiling.
    handle.submit(net, Severity::Everything, "hidden socket detail");
    // Cut by the overall ceiling.
    handle.submit(chatty, Severity::Everything, "hidden debug detail");

    // Raising the overall verbosity admits what it previously cut.
    handle.set_overall_verbosity(Severity::Everything);
    assert_eq!(handle.overall_verbosity(), Severity::Everything);
    handle.submit(chatty, Severity::Everything, "now visible detail");

    processor.wait_idle();
    let keep = processor.handle();
    assert!(!keep.is_dead());
    processor.shutdown();
    assert!(keep.is_dead());

    // A dead processor is no longer reachable.
    assert!(matches!(
        Processor::current(),
        Err(ProcessorError::NotRunning)
    ));

    let contents = buf.contents();
    // Constructed at MinorSteps, so the Everything-level startup note was
    // filtered eagerly.
    assert!(!contents.contains("started message processor"));
    assert!(contents.contains("Error:  Net::connect failed\n"));
    assert!(!contents.contains("hidden"));
    assert!(contents.contains("Debug:  Chatty - now visible detail\n"));
    assert!(contents.contains("Message_Processor - killing message processor\n"));
    assert!(contents.contains("Message_Processor - exiting message processor\n"));

    // Same-thread submissions render in submission order, and the farewell
    // status precedes the worker's exit line.
    let error = contents.find("Net::connect failed").unwrap();
    let detail = contents.find("now visible detail").unwrap();
    let killing = contents.find("killing message processor").unwrap();
    let exiting = contents.find("exiting message processor").unwrap();
    assert!(error < detail);
    assert!(detail < killing);
    assert!(killing < exiting);

    // A dead instance does not block a fresh construction.
    let second = Processor::with_sink(Severity::Errors, Box::new(io::sink())).expect("restart");
    drop(second);
}
