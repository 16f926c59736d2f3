use crate::scheduler::Scheduler;
use crate::subscribers::SubscriberRegistry;
use std::sync::Arc;
use tracing::info;

/// Control commands, decoupled from any chat-platform binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Register the chat and (re)start the background cycle.
    Subscribe(i64),
    /// Pause the background cycle; registry membership is retained.
    Pause,
    /// One synchronous fetch for the requesting chat only.
    FetchNow(i64),
}

impl Command {
    /// Parse a chat message into a command. Tolerates `@botname` suffixes and
    /// trailing arguments.
    pub fn parse(text: &str, chat_id: i64) -> Option<Self> {
        let first = text.trim().split_whitespace().next()?;
        let name = first.split('@').next()?;
        match name {
            "/start" => Some(Command::Subscribe(chat_id)),
            "/stop" => Some(Command::Pause),
            "/news" => Some(Command::FetchNow(chat_id)),
            _ => None,
        }
    }
}

/// Applies control commands to the registry and scheduler and produces the
/// reply text for the requesting chat.
pub struct CommandHandler {
    scheduler: Arc<Scheduler>,
    subscribers: Arc<SubscriberRegistry>,
}

impl CommandHandler {
    pub fn new(scheduler: Arc<Scheduler>, subscribers: Arc<SubscriberRegistry>) -> Self {
        Self {
            scheduler,
            subscribers,
        }
    }

    pub async fn handle(&self, command: Command) -> String {
        match command {
            Command::Subscribe(chat_id) => {
                self.subscribers.add(chat_id).await;
                self.scheduler.start().await;
                "\u{1F680} Relay activated. Fresh market news with analysis will arrive here."
                    .to_string()
            }
            Command::Pause => {
                self.scheduler.stop().await;
                info!("relay paused by command");
                "\u{1F6D1} Auto-check paused. Send /start to resume.".to_string()
            }
            Command::FetchNow(chat_id) => {
                info!("on-demand fetch for chat {}", chat_id);
                match self.scheduler.fetch_once().await {
                    Some(message) => message,
                    None => "\u{1F4ED} No news available right now.".to_string(),
                }
            }
        }
    }
}
