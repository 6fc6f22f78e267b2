use tokio::sync::mpsc;
use tracing::debug;

use crate::{application::EventSink, BatchedMessage};

/// Пачка, отданная приёмнику, вместе с именем события.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedBatch {
    pub event_name: String,
    pub messages: Vec<BatchedMessage>,
}

/// Приёмник, пересылающий пачки в неограниченный mpsc-канал.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<EmittedBatch>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EmittedBatch>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(
        &self,
        event_name: &str,
        batch: Vec<BatchedMessage>,
    ) {
        let batch = EmittedBatch {
            event_name: event_name.to_string(),
            messages: batch,
        };
        if self.tx.send(batch).is_err() {
            debug!(event = event_name, "batch receiver dropped, batch discarded");
        }
    }
}
