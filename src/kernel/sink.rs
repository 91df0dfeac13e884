//! Where committed events go besides the kernel's own history log

use tokio::sync::mpsc;

use crate::events::{Event, EventCategory};

/// Receives every event once its tick has committed, in order
pub trait EventSink: Send {
    fn record(&mut self, event: &Event);
}

/// Renders events as log lines
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, event: &Event) {
        let category = event.kind.category();
        let line = event.kind.describe();
        match category {
            EventCategory::Disaster | EventCategory::Collapse | EventCategory::Anomaly => {
                tracing::warn!(year = event.tick, ?category, "{line}");
            }
            EventCategory::Weather => tracing::debug!(year = event.tick, ?category, "{line}"),
            _ => tracing::info!(year = event.tick, ?category, "{line}"),
        }
    }
}

/// Forwards events to a consumer task. A dropped receiver is not an error;
/// the run goes on without it.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn record(&mut self, event: &Event) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(event = event.id, "Event receiver gone");
        }
    }
}
