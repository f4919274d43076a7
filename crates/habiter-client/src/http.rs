//! REST transport.

use std::time::Duration;

use async_trait::async_trait;
use habiter_common::Snowflake;
use habiter_common::config::{DEFAULT_API_BASE, HttpConfig};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{HabiterError, Result};
use crate::models::{CreateMessage, Message, PrivateChannel};

/// The network operations the session needs. [`RestClient`] is the real
/// implementation; tests substitute their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open (or fetch the existing) DM channel with `user_id`.
    async fn start_private_message(&self, user_id: Snowflake) -> Result<PrivateChannel>;

    /// Post a message to `channel_id`.
    async fn create_message(&self, channel_id: Snowflake, message: &CreateMessage) -> Result<Message>;
}

/// Async REST client.
///
/// ```rust,no_run
/// use habiter_client::{RestClient, Snowflake, Transport};
///
/// #[tokio::main]
/// async fn main() -> habiter_client::Result<()> {
///     let rest = RestClient::new("mytoken", None)?;
///     let dm = rest.start_private_message(Snowflake::new(80351110224678912)).await?;
///     println!("{dm:?}");
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    pub fn new(token: impl Into<String>, base_url: Option<&str>) -> Result<Self> {
        Self::build(token.into(), base_url.unwrap_or(DEFAULT_API_BASE), None)
    }

    pub fn from_config(cfg: &HttpConfig) -> Result<Self> {
        Self::build(cfg.token.clone(), &cfg.base_url, Some(Duration::from_secs(cfg.timeout_secs)))
    }

    fn build(token: String, base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let token = bot_token(token);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&token)
                .map_err(|e| HabiterError::Other(e.to_string()))?,
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(HabiterError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request<T: DeserializeOwned>(&self, method: Method, path: &str, body: &Value) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "REST request");

        let resp = self.client.request(method, &url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
                .unwrap_or_else(|| status.to_string());
            return Err(HabiterError::Api { status: status.as_u16(), message });
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl Transport for RestClient {
    async fn start_private_message(&self, user_id: Snowflake) -> Result<PrivateChannel> {
        self.request(Method::POST, "/users/@me/channels", &json!({ "recipient_id": user_id }))
            .await
    }

    async fn create_message(&self, channel_id: Snowflake, message: &CreateMessage) -> Result<Message> {
        let body = serde_json::to_value(message)?;
        self.request(Method::POST, &format!("/channels/{channel_id}/messages"), &body)
            .await
    }
}

fn bot_token(token: String) -> String {
    if token.starts_with("Bot ") { token } else { format!("Bot {token}") }
}
