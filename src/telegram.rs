use crate::commands::{Command, CommandHandler};
use crate::dispatch::{Messenger, TelegramMessenger};
use crate::types::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Long-poll window passed to getUpdates. Must stay under the messenger's
/// request timeout or the client would abort its own poll.
const POLL_TIMEOUT_SECS: u64 = 10;
/// Back-off after a transport error before the next poll.
const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
}

/// Telegram command front end: long-polls getUpdates, parses each message
/// into a [`Command`], and replies to the originating chat. Transport errors
/// are logged and retried; they never reach the scheduler.
pub struct CommandLoop {
    messenger: Arc<TelegramMessenger>,
    handler: CommandHandler,
    offset: i64,
}

impl CommandLoop {
    pub fn new(messenger: Arc<TelegramMessenger>, handler: CommandHandler) -> Self {
        Self {
            messenger,
            handler,
            offset: 0,
        }
    }

    pub async fn run(mut self) {
        loop {
            match self.poll_updates().await {
                Ok(updates) => {
                    for update in updates {
                        self.offset = self.offset.max(update.update_id + 1);
                        self.handle_update(update).await;
                    }
                }
                Err(e) => {
                    warn!("getUpdates failed: {}; retrying in {:?}", e, RETRY_DELAY);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    async fn poll_updates(&self) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset: self.offset,
            timeout: POLL_TIMEOUT_SECS,
        };
        let result = self.messenger.call("getUpdates", &request).await?;
        let updates: Vec<Update> = serde_json::from_value(result)?;
        Ok(updates)
    }

    async fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text else {
            return;
        };
        let chat_id = message.chat.id;

        let Some(command) = Command::parse(&text, chat_id) else {
            debug!("ignoring non-command message from chat {}", chat_id);
            return;
        };

        let reply = self.handler.handle(command).await;
        if let Err(e) = self.messenger.send(chat_id, &reply).await {
            warn!("failed to reply to chat {}: {}", chat_id, e);
        }
    }
}
