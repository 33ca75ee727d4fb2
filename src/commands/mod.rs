pub mod calc;
pub mod parser;
pub mod ping;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, trace, warn};

use crate::config::Config;
use crate::eval::IvyEvaluator;
use crate::platform::{InboundMessage, Session};

use self::calc::CalculatorHandler;
use self::parser::Parser;
use self::ping::PingHandler;

/// A command module's message callback.
///
/// Every registered handler sees every inbound message and decides on its
/// own whether to act. Handlers keep no state between calls.
#[async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(&self, session: &dyn Session, msg: &InboundMessage);
}

/// Ordered, append-only list of handlers.
///
/// Filled once during startup, then shared read-only with the gateway.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn Handler>) {
        info!(
            "Registering handler {}: {}",
            self.len(),
            handler.name()
        );
        self.handlers.push(handler);
    }

    /// All handlers in registration order
    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run every handler on one message, one after another.
    pub async fn dispatch(&self, session: &dyn Session, msg: &InboundMessage) {
        trace!(
            "Dispatching {} message from {} in {} to {} handler(s)",
            msg.platform,
            msg.author_id,
            msg.channel_id,
            self.len()
        );
        for handler in self.handlers() {
            handler.handle(session, msg).await;
        }
    }
}

/// Register the built-in command modules: ping, then the calculator.
pub fn register_builtin(registry: &mut HandlerRegistry, config: &Config) {
    let parser = Parser::new(config.bot.prefix.clone());

    registry.register(Arc::new(PingHandler::new(parser.clone())));
    registry.register(Arc::new(CalculatorHandler::new(
        parser,
        Arc::new(IvyEvaluator::new()),
        config.calculator.max_reply_chars,
    )));
}

/// True when the bot itself wrote the message.
pub fn is_own_message(session: &dyn Session, msg: &InboundMessage) -> bool {
    msg.author_id == session.bot_user_id()
}

/// Send a reply to the channel the message came from. Failures are logged, not returned.
pub async fn reply(session: &dyn Session, msg: &InboundMessage, text: &str) {
    if let Err(e) = session.send_message(&msg.channel_id, text).await {
        warn!(
            "Failed to send reply to {} channel {}: {:#}",
            msg.platform, msg.channel_id, e
        );
    }
}
