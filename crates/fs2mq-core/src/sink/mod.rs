//! Event sinks
//!
//! A sink is where the pipeline sends finished events: the AMQP broker for
//! real runs, or a JSON-lines writer for dry runs.

pub mod amqp;
pub mod json_lines;

pub use amqp::AmqpPublisher;
pub use json_lines::JsonLinesSink;

use fs2mq_scanner::FileEvent;

/// Result of handing one event to a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The event was accepted (broker-confirmed for AMQP)
    Confirmed,
    /// The event was not accepted; the run continues
    Rejected(String),
}

impl PublishOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Destination for file events
///
/// Implementations must never report [`PublishOutcome::Confirmed`] for an
/// event that was not accepted.
pub trait EventSink {
    /// Deliver a single event
    fn publish(&mut self, event: &FileEvent) -> PublishOutcome;

    /// Release any held resources; called once when the run ends
    fn close(&mut self) {}
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn publish(&mut self, event: &FileEvent) -> PublishOutcome {
        (**self).publish(event)
    }

    fn close(&mut self) {
        (**self).close();
    }
}
