//! Telegram Bot API `sendMessage` delivery.

use super::Notifier;
use crate::config::{Credentials, TelegramConfig};
use crate::error::WatchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Error payload returned by the Bot API alongside a non-2xx status.
#[derive(Debug, Deserialize)]
struct ApiReply {
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig, credentials: &Credentials) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build Telegram HTTP client")?;
        Ok(Self {
            client,
            endpoint: send_message_url(&config.api_base, &credentials.bot_token),
            chat_id: credentials.chat_id.clone(),
        })
    }

    /// Post one message. Non-2xx answers come back as
    /// [`WatchError::Notification`] carrying the API's explanation.
    pub async fn send(&self, text: &str) -> Result<(), WatchError> {
        let form = [("chat_id", self.chat_id.as_str()), ("text", text)];
        // The endpoint embeds the token; keep it out of error text.
        let resp = self
            .client
            .post(&self.endpoint)
            .form(&form[..])
            .send()
            .await
            .map_err(|e| WatchError::transport("telegram sendMessage", e.without_url()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(WatchError::Notification {
            status: status.as_u16(),
            body: describe_rejection(&body),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> bool {
        match self.send(message).await {
            Ok(()) => {
                tracing::info!(chat_id = %self.chat_id, "notification sent");
                true
            }
            Err(e) => {
                tracing::error!(kind = ?e.kind(), error = %e, "notification failed");
                false
            }
        }
    }
}

fn send_message_url(api_base: &str, bot_token: &str) -> String {
    format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), bot_token)
}

/// Prefer the API's `description`; otherwise the raw body.
fn describe_rejection(body: &str) -> String {
    serde_json::from_str::<ApiReply>(body)
        .ok()
        .and_then(|r| r.description)
        .unwrap_or_else(|| body.to_string())
}
