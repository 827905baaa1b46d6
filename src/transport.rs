//! Outbound transport boundary.
//!
//! The engine talks to the chat platform through this trait only: status
//! replies and replay of previously delivered messages. The Telegram
//! implementation lives in [`crate::telegram`]; tests use a recording mock.

use crate::error::TransportResult;
use crate::events::MessageRef;
use async_trait::async_trait;

/// Message format hint for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageFormat {
    /// Plain text, no formatting.
    #[default]
    Plain,
    /// Markdown formatted text.
    Markdown,
}

/// Outbound calls the engine makes on the chat platform.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a status or confirmation message into a conversation.
    async fn reply_text(
        &self,
        chat_id: i64,
        text: &str,
        format: MessageFormat,
    ) -> TransportResult<()>;

    /// Re-emit a previously received message into the same conversation,
    /// preserving its original content.
    async fn replay_message(&self, chat_id: i64, reference: MessageRef) -> TransportResult<()>;
}
