use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::dispatching::ShutdownToken;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::task::JoinHandle;
use tracing::{info, trace, warn};

use super::{Gateway, InboundMessage, Session};
use crate::commands::HandlerRegistry;

/// Replies through the Bot API.
pub struct TelegramSession {
    bot: Bot,
    bot_id: String,
}

#[async_trait]
impl Session for TelegramSession {
    fn bot_user_id(&self) -> &str {
        &self.bot_id
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<()> {
        let chat_id: i64 = channel_id
            .parse()
            .with_context(|| format!("Invalid Telegram chat id: {}", channel_id))?;
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .context("Telegram send failed")?;
        Ok(())
    }
}

/// Dependencies injected into the dispatcher endpoint
struct TelegramContext {
    registry: Arc<HandlerRegistry>,
    bot_id: String,
}

/// Telegram long-polling connection.
pub struct TelegramGateway {
    token: String,
    shutdown: Option<ShutdownToken>,
    task: Option<JoinHandle<()>>,
}

impl TelegramGateway {
    pub fn new(token: String) -> Self {
        Self {
            token,
            shutdown: None,
            task: None,
        }
    }
}

#[async_trait]
impl Gateway for TelegramGateway {
    async fn open(&mut self, registry: Arc<HandlerRegistry>) -> Result<()> {
        let bot = Bot::new(&self.token);

        info!("Starting Telegram platform...");

        // Also validates the token before any update is polled
        let me = bot
            .get_me()
            .await
            .context("Failed to log in to Telegram")?;
        let bot_id = me.user.id.0.to_string();
        info!(
            "Telegram bot connected as {} ({})",
            me.user.first_name, bot_id
        );

        let ctx = Arc::new(TelegramContext { registry, bot_id });
        let handler = Update::filter_message().endpoint(handle_message);

        let mut dispatcher = Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![ctx])
            .default_handler(|upd| async move {
                trace!("Unhandled update: {:?}", upd.id);
            })
            .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
            .build();

        self.shutdown = Some(dispatcher.shutdown_token());
        self.task = Some(tokio::spawn(async move {
            dispatcher.dispatch().await;
        }));

        Ok(())
    }

    async fn close(&mut self) {
        let (Some(token), Some(task)) = (self.shutdown.take(), self.task.take()) else {
            return;
        };

        info!("Closing Telegram connection");
        match token.shutdown() {
            Ok(done) => done.await,
            Err(e) => {
                // Dispatcher has not started polling yet, so there is nothing to drain
                warn!("Telegram dispatcher was idle on close: {}", e);
                task.abort();
            }
        }
        task.await.ok();
    }
}

async fn handle_message(bot: Bot, msg: Message, ctx: Arc<TelegramContext>) -> ResponseResult<()> {
    let author_id = match msg.from.as_ref() {
        Some(user) => user.id.0.to_string(),
        None => return Ok(()),
    };

    let content = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(()),
    };

    let inbound = InboundMessage {
        platform: "telegram".to_string(),
        author_id,
        channel_id: msg.chat.id.0.to_string(),
        content,
    };
    let session = TelegramSession {
        bot,
        bot_id: ctx.bot_id.clone(),
    };

    ctx.registry.dispatch(&session, &inbound).await;

    Ok(())
}
