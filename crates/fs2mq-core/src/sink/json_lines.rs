//! JSON-lines output for dry runs

use super::{EventSink, PublishOutcome};
use fs2mq_scanner::FileEvent;
use std::io::Write;

/// Writes one JSON object per line to any writer
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn publish(&mut self, event: &FileEvent) -> PublishOutcome {
        let line = match event.to_json() {
            Ok(line) => line,
            Err(e) => return PublishOutcome::Rejected(e.to_string()),
        };
        match writeln!(self.writer, "{line}") {
            Ok(()) => PublishOutcome::Confirmed,
            Err(e) => PublishOutcome::Rejected(format!("write failed: {e}")),
        }
    }

    fn close(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(error = %e, "failed to flush dry-run output");
        }
    }
}
