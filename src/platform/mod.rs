pub mod console;
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

use crate::reply::Reply;

/// Where an event came from and where its reply goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    /// Platform-specific chat/channel ID
    pub chat_id: i64,
    /// Message that triggered the event, if any
    pub message_id: Option<i32>,
}

/// Kind of non-text content attached to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Sticker,
    Photo,
    Animation,
    Other,
}

/// A message received from any platform
#[derive(Debug, Clone)]
pub struct TextMessage {
    pub origin: Origin,
    /// Display name of the sender
    pub sender_name: String,
    /// The message text; None for media-only messages
    pub text: Option<String>,
    pub attachment: Option<Attachment>,
}

/// A button press carrying an opaque payload
#[derive(Debug, Clone)]
pub struct CallbackEvent {
    pub origin: Origin,
    pub sender_name: String,
    pub payload: String,
}

#[derive(Debug, Clone)]
pub enum IncomingEvent {
    Text(TextMessage),
    Callback(CallbackEvent),
}

impl IncomingEvent {
    pub fn origin(&self) -> Origin {
        match self {
            IncomingEvent::Text(msg) => msg.origin,
            IncomingEvent::Callback(cb) => cb.origin,
        }
    }

    pub fn sender_name(&self) -> &str {
        match self {
            IncomingEvent::Text(msg) => &msg.sender_name,
            IncomingEvent::Callback(cb) => &cb.sender_name,
        }
    }
}

/// Delivers events one at a time. `None` means the source is closed.
#[async_trait]
pub trait UpdateSource: Send {
    async fn next_event(&mut self) -> Option<IncomingEvent>;
}

/// Delivers a handler's reply back to the originating conversation
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, to: Origin, reply: Reply) -> Result<()>;
}
