pub mod audit;
pub mod commands;
pub mod config;
pub mod dedup;
pub mod dispatch;
pub mod enrich;
pub mod scheduler;
pub mod sources;
pub mod subscribers;
pub mod telegram;
pub mod types;

pub use audit::AuditLog;
pub use commands::{Command, CommandHandler};
pub use config::RelayConfig;
pub use dedup::DedupTracker;
pub use dispatch::{Dispatcher, Messenger, TelegramMessenger};
pub use enrich::{AnalysisStage, EnrichStage, EnrichmentPipeline, TranslationStage};
pub use scheduler::{CycleOutcome, Scheduler};
pub use sources::{FetchNews, KeywordFeedSource, PrioritySource, StructuredApiSource};
pub use subscribers::SubscriberRegistry;
pub use types::*;
