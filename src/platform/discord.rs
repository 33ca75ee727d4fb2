use std::num::NonZeroU64;
use std::sync::{Arc, OnceLock};

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serenity::gateway::ShardManager;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::id::ChannelId;
use serenity::prelude::{Context, EventHandler};
use serenity::Client;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{Gateway, InboundMessage, Session};
use crate::commands::HandlerRegistry;

/// Replies through the Discord REST API.
pub struct DiscordSession {
    http: Arc<Http>,
    bot_id: String,
}

#[async_trait]
impl Session for DiscordSession {
    fn bot_user_id(&self) -> &str {
        &self.bot_id
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<()> {
        let raw: NonZeroU64 = channel_id
            .parse()
            .with_context(|| format!("Invalid Discord channel id: {}", channel_id))?;
        ChannelId::from(raw)
            .say(self.http.as_ref(), text)
            .await
            .context("Discord send failed")?;
        Ok(())
    }
}

/// Serenity event handler that feeds every message to the registry.
struct DiscordHandler {
    registry: Arc<HandlerRegistry>,
    bot_id: OnceLock<String>,
    /// Fired once on the first READY so `open` can return
    ready_tx: Mutex<Option<oneshot::Sender<String>>>,
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        let bot_id = ready.user.id.to_string();
        self.bot_id.set(bot_id.clone()).ok();

        info!("Discord bot connected as {} ({})", ready.user.name, bot_id);

        if let Some(tx) = self.ready_tx.lock().await.take() {
            tx.send(bot_id).ok();
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Messages can race the READY event during reconnects
        let Some(bot_id) = self.bot_id.get() else {
            return;
        };

        let inbound = InboundMessage {
            platform: "discord".to_string(),
            author_id: msg.author.id.to_string(),
            channel_id: msg.channel_id.to_string(),
            content: msg.content,
        };
        let session = DiscordSession {
            http: Arc::clone(&ctx.http),
            bot_id: bot_id.clone(),
        };

        self.registry.dispatch(&session, &inbound).await;
    }
}

/// Wait for the first READY, or for the client task to report why it stopped.
async fn wait_until_ready<T, E>(
    ready_rx: oneshot::Receiver<T>,
    failed_rx: oneshot::Receiver<E>,
) -> Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    // A failed start also drops the ready sender, so check the failure first
    tokio::select! {
        biased;
        Ok(e) = failed_rx => {
            Err(e).context("Failed to connect to Discord")
        }
        ready = ready_rx => {
            ready.context("Discord client stopped before it was ready")
        }
    }
}

/// Discord gateway connection.
pub struct DiscordGateway {
    token: String,
    shard_manager: Option<Arc<ShardManager>>,
    task: Option<JoinHandle<()>>,
}

impl DiscordGateway {
    pub fn new(token: String) -> Self {
        Self {
            token,
            shard_manager: None,
            task: None,
        }
    }
}

#[async_trait]
impl Gateway for DiscordGateway {
    async fn open(&mut self, registry: Arc<HandlerRegistry>) -> Result<()> {
        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let (ready_tx, ready_rx) = oneshot::channel();
        let handler = DiscordHandler {
            registry,
            bot_id: OnceLock::new(),
            ready_tx: Mutex::new(Some(ready_tx)),
        };

        let mut client = Client::builder(&self.token, intents)
            .event_handler(handler)
            .await
            .context("Failed to create Discord client")?;

        let shard_manager = Arc::clone(&client.shard_manager);
        let (failed_tx, failed_rx) = oneshot::channel();

        info!("Connecting to Discord gateway...");
        let task = tokio::spawn(async move {
            if let Err(e) = client.start().await {
                error!("Discord gateway stopped: {}", e);
                failed_tx.send(e).ok();
            }
        });

        wait_until_ready(ready_rx, failed_rx).await?;

        self.shard_manager = Some(shard_manager);
        self.task = Some(task);
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(shard_manager) = self.shard_manager.take() {
            info!("Closing Discord connection");
            shard_manager.shutdown_all().await;
        }
        if let Some(task) = self.task.take() {
            task.await.ok();
        }
    }
}
