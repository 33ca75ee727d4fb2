use async_trait::async_trait;

use super::parser::Parser;
use super::{is_own_message, reply, Handler};
use crate::platform::{InboundMessage, Session};

/// Answers `ping` with `Pong!` and `pong` with `Ping!`.
pub struct PingHandler {
    parser: Parser,
}

impl PingHandler {
    pub fn new(parser: Parser) -> Self {
        Self { parser }
    }

    fn response(command: &str) -> Option<&'static str> {
        match command {
            "ping" => Some("Pong!"),
            "pong" => Some("Ping!"),
            _ => None,
        }
    }
}

#[async_trait]
impl Handler for PingHandler {
    fn name(&self) -> &str {
        "ping"
    }

    async fn handle(&self, session: &dyn Session, msg: &InboundMessage) {
        let parsed = self.parser.parse(&msg.content);
        if !parsed.matched {
            return;
        }

        // Never answer ourselves
        if is_own_message(session, msg) {
            return;
        }

        if let Some(text) = parsed.command().and_then(Self::response) {
            reply(session, msg, text).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::{message, RecordingSession};

    async fn run(author: &str, content: &str) -> Vec<(String, String)> {
        let session = RecordingSession::new("bot-id");
        PingHandler::new(Parser::default())
            .handle(&session, &message(author, content))
            .await;
        session.sent()
    }

    #[tokio::test]
    async fn test_ping_replies_pong_on_same_channel() {
        let sent = run("user-1", "!hugot ping").await;
        assert_eq!(
            sent,
            vec![("channel-1".to_string(), "Pong!".to_string())]
        );
    }

    #[tokio::test]
    async fn test_pong_replies_ping() {
        let sent = run("user-1", "!hugot pong").await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "Ping!");
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        assert!(run("user-1", "!hugot pingpong").await.is_empty());
        assert!(run("user-1", "!hugot Ping").await.is_empty());
    }

    #[tokio::test]
    async fn test_without_prefix_is_ignored() {
        assert!(run("user-1", "ping").await.is_empty());
    }

    #[tokio::test]
    async fn test_prefix_only_is_ignored() {
        assert!(run("user-1", "!hugot").await.is_empty());
    }

    #[tokio::test]
    async fn test_own_message_is_ignored() {
        assert!(run("bot-id", "!hugot ping").await.is_empty());
        assert!(run("bot-id", "!hugot pong").await.is_empty());
    }

    #[tokio::test]
    async fn test_extra_args_still_reply() {
        let sent = run("user-1", "!hugot ping please").await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "Pong!");
    }
}
