//! Integration test for the tracing bridge: events emitted through the
//! standard macros flow into the processor, with targets becoming sources
//! and levels mapping onto severity tiers.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use messages::Severity;
use processor::{Processor, ProcessorLayer};
use tracing_subscriber::layer::SubscriberExt;

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
fn tracing_events_flow_through_the_processor() {
    let buf = SharedBuf::default();
    let processor =
        Processor::with_sink(Severity::Everything, Box::new(buf.clone())).expect("start");

    let subscriber =
        tracing_subscriber::registry().with(ProcessorLayer::new(processor.handle()));
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(target: "net", "listening");
        tracing::warn!(target: "net", "slow peer");
        tracing::error!(target: "net", "connection reset");
        tracing::debug!(target: "disk", "cache warm");
        tracing::trace!(target: "disk", "sector read");
    });

    processor.wait_idle();
    processor.shutdown();

    let contents = buf.contents();
    assert!(contents.contains("Info:   net - listening\n"));
    assert!(contents.contains("Error:  net - slow peer\n"));
    assert!(contents.contains("Error:  net - connection reset\n"));
    assert!(contents.contains("Debug:  disk - cache warm\n"));
    assert!(contents.contains("Debug:  disk - sector read\n"));

    // Events render in emission order.
    let listening = contents.find("listening").unwrap();
    let slow = contents.find("slow peer").unwrap();
    let reset = contents.find("connection reset").unwrap();
    assert!(listening < slow);
    assert!(slow < reset);
}
