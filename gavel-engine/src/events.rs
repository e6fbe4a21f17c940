//! Live conversation event broadcasting.
//!
//! A single process-wide broadcast channel distributes message and status
//! events; subscribers filter by conversation. Delivery is exactly-once
//! and in publish order for every currently-subscribed consumer; there is
//! no history replay at subscribe time (history is a point-in-time read
//! through the conversation manager).

use gavel_core::{ConversationId, ConversationStatus, Message};
use std::pin::Pin;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

/// Events published by the engine about a conversation.
#[derive(Debug, Clone)]
pub enum ConversationEvent {
    /// A message was appended to the conversation.
    MessageSent { message: Message },
    /// The conversation's status changed.
    StatusChanged {
        conversation_id: ConversationId,
        status: ConversationStatus,
    },
}

impl ConversationEvent {
    fn conversation_id(&self) -> ConversationId {
        match self {
            ConversationEvent::MessageSent { message } => message.conversation_id,
            ConversationEvent::StatusChanged {
                conversation_id, ..
            } => *conversation_id,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ConversationEvent::MessageSent { .. } => "message_sent",
            ConversationEvent::StatusChanged { .. } => "status_changed",
        }
    }
}

/// Broadcast hub shared by all services that publish conversation events.
#[derive(Debug, Clone)]
pub struct EventHub {
    tx: broadcast::Sender<ConversationEvent>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventHub {
    /// Create a hub. `capacity` bounds how many events a slow consumer may
    /// fall behind before it starts missing events (lagged).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Non-blocking; with no subscribers the event is
    /// simply dropped.
    pub fn publish(&self, event: ConversationEvent) {
        let kind = event.kind();
        match self.tx.send(event) {
            Ok(receivers) => {
                debug!(kind, receivers, "broadcast conversation event");
            }
            Err(_) => {
                debug!(kind, "no receivers for conversation event");
            }
        }
    }

    /// Subscribe to the raw, unfiltered event feed.
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.tx.subscribe()
    }

    /// Live, order-preserving stream of messages for one conversation.
    pub fn subscribe_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Pin<Box<dyn Stream<Item = Message> + Send>> {
        let stream = BroadcastStream::new(self.tx.subscribe()).filter_map(move |event| {
            match event {
                Ok(ConversationEvent::MessageSent { message })
                    if message.conversation_id == conversation_id =>
                {
                    Some(message)
                }
                // Lagged receivers drop missed events rather than erroring.
                _ => None,
            }
        });
        Box::pin(stream)
    }

    /// Live stream of status changes for one conversation.
    pub fn subscribe_status(
        &self,
        conversation_id: ConversationId,
    ) -> Pin<Box<dyn Stream<Item = ConversationStatus> + Send>> {
        let stream = BroadcastStream::new(self.tx.subscribe()).filter_map(move |event| {
            match event {
                Ok(ConversationEvent::StatusChanged {
                    conversation_id: id,
                    status,
                }) if id == conversation_id => Some(status),
                _ => None,
            }
        });
        Box::pin(stream)
    }
}
