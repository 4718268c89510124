use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, ReplyParameters};
use tracing::{debug, error, info};

use crate::config::TelegramConfig;
use crate::platform::{MessageSender, OutboundMessage};

/// One webhook delivery. Only the fields the bot reads are modelled;
/// everything else Telegram sends is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i32,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

enum BotState {
    Ready(Bot),
    /// Initialization failed once; the reason is kept for every later send.
    Unavailable(String),
}

/// Sends replies through the Bot API using teloxide.
pub struct TelegramSender {
    state: BotState,
}

impl TelegramSender {
    /// Create the bot and validate its token with `getMe`.
    ///
    /// Never fails: a missing or rejected token leaves the sender unavailable
    /// for the lifetime of the process.
    pub async fn connect(config: &TelegramConfig) -> Self {
        match Self::try_connect(config).await {
            Ok(bot) => Self {
                state: BotState::Ready(bot),
            },
            Err(e) => {
                error!("Failed to create bot: {:#}", e);
                Self {
                    state: BotState::Unavailable(format!("{:#}", e)),
                }
            }
        }
    }

    async fn try_connect(config: &TelegramConfig) -> Result<Bot> {
        if config.bot_token.is_empty() {
            anyhow::bail!("BOT_TOKEN environment variable not set");
        }

        let api_url = reqwest::Url::parse(&config.api_url)
            .with_context(|| format!("Invalid Telegram API URL: {}", config.api_url))?;
        let bot = Bot::new(config.bot_token.clone()).set_api_url(api_url);

        let me = bot
            .get_me()
            .await
            .context("Telegram rejected the bot token")?;
        info!("Bot initialized successfully (id {})", me.user.id.0);

        Ok(bot)
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, BotState::Ready(_))
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send_message(&self, msg: &OutboundMessage) -> Result<()> {
        let bot = match &self.state {
            BotState::Ready(bot) => bot,
            BotState::Unavailable(reason) => anyhow::bail!("Bot is unavailable: {}", reason),
        };

        let mut request = bot.send_message(ChatId(msg.chat_id), msg.text.clone());
        if let Some(reply_to) = msg.reply_to {
            request = request.reply_parameters(ReplyParameters::new(MessageId(reply_to)));
        }
        request
            .await
            .with_context(|| format!("Failed to send message to chat {}", msg.chat_id))?;

        debug!("Reply delivered to chat {}", msg.chat_id);
        Ok(())
    }
}

/// Register `webhook_url` as the delivery endpoint for the bot.
///
/// Only transport failures are errors; whatever status Telegram answers with
/// is handed back to the caller.
pub async fn set_webhook(
    client: &reqwest::Client,
    api_url: &str,
    bot_token: &str,
    webhook_url: &str,
) -> Result<reqwest::StatusCode> {
    let url = format!(
        "{}/bot{}/setWebhook",
        api_url.trim_end_matches('/'),
        bot_token
    );

    let response = client
        .get(&url)
        .query(&[("url", webhook_url)])
        .send()
        .await
        .context("Failed to send setWebhook request")?;

    Ok(response.status())
}
