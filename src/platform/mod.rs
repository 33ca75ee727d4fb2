pub mod discord;
pub mod telegram;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::commands::HandlerRegistry;

/// A message received from any platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Platform identifier (e.g., "telegram", "discord")
    pub platform: String,
    /// Platform-specific author ID as string
    pub author_id: String,
    /// Platform-specific chat/channel ID as string
    pub channel_id: String,
    /// The raw message text
    pub content: String,
}

/// The live connection a handler replies through.
#[async_trait]
pub trait Session: Send + Sync {
    /// The bot's own user ID, in the same format as `InboundMessage::author_id`
    fn bot_user_id(&self) -> &str;

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<()>;
}

/// A platform connection that delivers every inbound message to a registry.
#[async_trait]
pub trait Gateway: Send {
    /// Connect and start delivering messages. Returns once the bot is logged in.
    async fn open(&mut self, registry: Arc<HandlerRegistry>) -> Result<()>;

    async fn close(&mut self);
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Session double that records every reply instead of sending it.
    pub struct RecordingSession {
        bot_id: String,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSession {
        pub fn new(bot_id: &str) -> Self {
            Self {
                bot_id: bot_id.to_string(),
                sent: Mutex::new(Vec::new()),
            }
        }

        /// (channel_id, text) pairs in send order
        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Session for RecordingSession {
        fn bot_user_id(&self) -> &str {
            &self.bot_id
        }

        async fn send_message(&self, channel_id: &str, text: &str) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((channel_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    pub fn message(author_id: &str, content: &str) -> InboundMessage {
        InboundMessage {
            platform: "test".to_string(),
            author_id: author_id.to_string(),
            channel_id: "channel-1".to_string(),
            content: content.to_string(),
        }
    }
}
