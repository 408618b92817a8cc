//! HTTP client for the Telegram Bot API
//!
//! Plain request/response JSON over reqwest. Send-side failures are
//! logged and swallowed here so callers never have to unwind because
//! chat was briefly unreachable; only the long-poll returns its error,
//! because the ingestion loop owns the retry policy for it.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::api::{ApiResponse, InlineKeyboardMarkup, Update};

/// Server-side long-poll wait, and the larger network bound around it.
const POLL_WAIT_SECS: u64 = 30;
const POLL_TIMEOUT: Duration = Duration::from_secs(40);

const SEND_TIMEOUT: Duration = Duration::from_secs(10);
const ANSWER_TIMEOUT: Duration = Duration::from_secs(5);
const IP_TIMEOUT: Duration = Duration::from_secs(5);

/// Seam between the bot and the chat platform.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<InlineKeyboardMarkup>);
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    );
    async fn answer_callback(&self, callback_id: &str, text: &str);
}

pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .unwrap();

        Self {
            http,
            base_url: format!("https://api.telegram.org/bot{}/", token),
        }
    }

    async fn call(
        &self,
        method: &str,
        payload: serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}{}", self.base_url, method);
        let response = self
            .http
            .post(&url)
            .timeout(timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("Telegram returned status: {}", response.status()).into());
        }

        Ok(response.json().await?)
    }

    /// Fire a method whose outcome we only log.
    async fn call_logged(&self, method: &str, payload: serde_json::Value, timeout: Duration) {
        if let Err(e) = self.call(method, payload, timeout).await {
            tracing::warn!("Request error {}: {}", method, e);
        }
    }

    /// Long-poll for updates. `offset` is last seen update id + 1; passing
    /// it back confirms everything before it so Telegram never redelivers.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
    ) -> Result<Vec<Update>, Box<dyn std::error::Error + Send + Sync>> {
        let payload = json!({ "offset": offset, "timeout": POLL_WAIT_SECS });
        let value = self.call("getUpdates", payload, POLL_TIMEOUT).await?;
        let parsed: ApiResponse<Vec<Update>> = serde_json::from_value(value)?;
        if !parsed.ok {
            return Err("Telegram rejected getUpdates".into());
        }
        Ok(parsed.result.unwrap_or_default())
    }

    /// Public address lookup for the "Copy IP" button. The configured
    /// address wins; otherwise ask an external echo service.
    pub async fn fetch_public_ip(configured: Option<&str>) -> String {
        if let Some(ip) = configured {
            return ip.to_string();
        }

        let lookup = async {
            let response = reqwest::Client::new()
                .get("https://ifconfig.me")
                .timeout(IP_TIMEOUT)
                .send()
                .await
                .ok()?;
            response.text().await.ok()
        };

        match lookup.await {
            Some(ip) if !ip.trim().is_empty() => ip.trim().to_string(),
            _ => "Unknown IP".to_string(),
        }
    }
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<InlineKeyboardMarkup>) {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });
        if let Some(kb) = keyboard {
            payload["reply_markup"] = json!(kb);
        }
        self.call_logged("sendMessage", payload, SEND_TIMEOUT).await;
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) {
        let mut payload = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": "Markdown",
        });
        if let Some(kb) = keyboard {
            payload["reply_markup"] = json!(kb);
        }
        self.call_logged("editMessageText", payload, SEND_TIMEOUT).await;
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) {
        let payload = json!({
            "callback_query_id": callback_id,
            "text": text,
        });
        self.call_logged("answerCallbackQuery", payload, ANSWER_TIMEOUT)
            .await;
    }
}
