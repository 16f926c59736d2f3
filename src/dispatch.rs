use crate::types::{RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const SEND_TIMEOUT: Duration = Duration::from_secs(20);

/// Delivery of one rendered message to one recipient.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// Telegram Bot API messenger.
pub struct TelegramMessenger {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<Value>,
}

impl TelegramMessenger {
    pub fn new(token: &str) -> Self {
        let client = Client::builder()
            .user_agent("news-relay/0.1")
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: format!("https://api.telegram.org/bot{token}"),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    pub(crate) async fn call(&self, method: &str, body: &impl Serialize) -> Result<Value> {
        let response = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await?;
        let reply: ApiReply = response.json().await?;
        if !reply.ok {
            return Err(RelayError::Telegram(
                reply
                    .description
                    .unwrap_or_else(|| format!("{method} failed")),
            ));
        }
        Ok(reply.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: "Markdown",
        };
        self.call("sendMessage", &request).await?;
        Ok(())
    }
}

/// Best-effort fanout: one delivery attempt per subscriber per cycle, each
/// recipient isolated from the others' failures.
pub struct Dispatcher {
    messenger: Arc<dyn Messenger>,
}

impl Dispatcher {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    /// Returns the number of successful deliveries. Never errors: a failed
    /// recipient is logged with its chat id and skipped.
    pub async fn send_to_all(&self, message: &str, subscribers: &[i64]) -> usize {
        let mut delivered = 0;
        for &chat_id in subscribers {
            match self.messenger.send(chat_id, message).await {
                Ok(()) => {
                    debug!("delivered to chat {}", chat_id);
                    delivered += 1;
                }
                Err(e) => {
                    warn!("delivery to chat {} failed: {}", chat_id, e);
                }
            }
        }
        delivered
    }
}
