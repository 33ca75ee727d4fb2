use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::commands::parser::DEFAULT_PREFIX;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Discord,
    Telegram,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Discord => write!(f, "discord"),
            Platform::Telegram => write!(f, "telegram"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub calculator: CalculatorConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BotConfig {
    #[serde(default)]
    pub platform: Platform,
    /// Leading token a message must start with to be addressed to the bot
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscordConfig {
    /// Name of the environment variable holding the bot token
    #[serde(default = "default_discord_token_env")]
    pub token_env: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_token_env")]
    pub token_env: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalculatorConfig {
    /// Longer results are cut down to this many characters before sending
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_discord_token_env() -> String {
    "DISCORD_TOKEN".to_string()
}

fn default_telegram_token_env() -> String {
    "TELEGRAM_BOT_TOKEN".to_string()
}

fn default_max_reply_chars() -> usize {
    1900
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            prefix: default_prefix(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token_env: default_discord_token_env(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token_env: default_telegram_token_env(),
        }
    }
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            max_reply_chars: default_max_reply_chars(),
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;

        if config.bot.prefix.contains(' ') {
            anyhow::bail!(
                "Prefix '{}' contains a space and could never match a message",
                config.bot.prefix
            );
        }

        if config.calculator.max_reply_chars == 0 {
            anyhow::bail!("calculator.max_reply_chars must be at least 1");
        }

        Ok(config)
    }

    /// Name of the environment variable the selected platform reads its token from.
    pub fn token_env(&self) -> &str {
        match self.bot.platform {
            Platform::Discord => &self.discord.token_env,
            Platform::Telegram => &self.telegram.token_env,
        }
    }

    /// Read the bot token for the selected platform from the environment.
    pub fn bot_token(&self) -> Result<String> {
        let var = self.token_env();
        let token = std::env::var(var)
            .with_context(|| format!("Bot token not set: export {} before starting", var))?;

        if token.trim().is_empty() {
            anyhow::bail!("Bot token in {} is empty", var);
        }

        Ok(token)
    }
}
