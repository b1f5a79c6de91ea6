//! JSON Event Sink
//!
//! Outputs watch events as NDJSON for CI/automation consumption.

use crate::domain::ports::{WatchEvent, WatchEventSink};
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// One JSON object per line; lines from concurrent emitters never interleave
pub struct JsonEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }
}

impl WatchEventSink for JsonEventSink {
    fn on_event(&self, event: WatchEvent) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        // A closed stdout must not take the watch loop down
        if writeln!(writer, "{}", event.to_json()).and_then(|_| writer.flush()).is_err() {
            tracing::debug!("event output closed");
        }
    }
}
