//! Telegram notification sink: one HTTP POST per message, nothing more.

use anyhow::{Context, Result};
use serde_json::json;

use crate::config::TelegramConfig;

#[derive(Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("adboard/0.1.0")
            .build()
            .context("failed to build Telegram HTTP client")?;

        Ok(Self {
            http,
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    /// Send one message to the configured chat. HTML formatting is enabled
    /// so reports can bold metric names.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        self.http
            .post(&url)
            .json(&json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await
            .context("failed to reach Telegram")?
            .error_for_status()
            .context("Telegram rejected the message")?;
        Ok(())
    }
}
