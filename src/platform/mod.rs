pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// A reply to be delivered to a chat
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// Target chat
    pub chat_id: i64,
    /// The message text
    pub text: String,
    /// Incoming message this one is threaded under
    pub reply_to: Option<i32>,
}

/// Outbound side of a messaging platform
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(&self, msg: &OutboundMessage) -> Result<()>;
}
