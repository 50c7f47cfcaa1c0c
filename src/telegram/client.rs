use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Envelope around every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

/// Client for the Telegram Bot API (long polling + plain text replies).
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    /// `<api_url>/bot<token>`
    base_url: String,
}

impl TelegramClient {
    /// `poll_timeout` is the `getUpdates` long-poll window; the HTTP timeout
    /// is set a little above it.
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(TelegramClient {
            http,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Telegram {} request failed", method))?;
        let status = resp.status();
        let text = resp.text().await.context("Failed to read Telegram response")?;
        parse_response(method, status.as_u16(), &text)
    }

    /// Updates with id >= `offset`, waiting up to `timeout_secs` for new ones.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                serde_json::json!({
                    "offset": offset,
                    "timeout": timeout_secs,
                    "allowed_updates": ["message"],
                }),
            )
            .await?;
        if !updates.is_empty() {
            debug!("Received {} update(s)", updates.len());
        }
        Ok(updates)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                serde_json::json!({ "chat_id": chat_id, "text": text }),
            )
            .await?;
        Ok(())
    }
}

fn parse_response<T: DeserializeOwned>(method: &str, status: u16, body: &str) -> Result<T> {
    let parsed: ApiResponse<T> = serde_json::from_str(body)
        .with_context(|| format!("Telegram {} returned HTTP {} with an unreadable body", method, status))?;
    if !parsed.ok {
        anyhow::bail!(
            "Telegram {} error (HTTP {}): {}",
            method,
            status,
            parsed.description.unwrap_or_default()
        );
    }
    parsed
        .result
        .with_context(|| format!("Telegram {} response has no result", method))
}
