use anyhow::Context;
use clap::Parser;
use news_relay::commands::CommandHandler;
use news_relay::dispatch::{Dispatcher, TelegramMessenger};
use news_relay::enrich::{AnalysisStage, EnrichmentPipeline, TranslationStage};
use news_relay::sources::{FetchNews, KeywordFeedSource, PrioritySource, StructuredApiSource};
use news_relay::telegram::CommandLoop;
use news_relay::{AuditLog, RelayConfig, Scheduler, SubscriberRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "news-relay", about = "Market news relay bot")]
struct Cli {
    /// Poll interval in seconds, overriding CHECK_INTERVAL_SECONDS.
    #[arg(long)]
    interval: Option<u64>,

    /// Audit log path, overriding NEWS_LOG_PATH.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = RelayConfig::from_env().context("invalid configuration")?;
    if let Some(secs) = cli.interval {
        config.poll_interval = Duration::from_secs(secs.max(1));
    }
    if let Some(path) = cli.log_file {
        config.log_path = path;
    }

    info!(
        "starting news-relay (feed: {}, interval: {:?})",
        config.feed_url, config.poll_interval
    );

    let source = build_source(&config);
    let pipeline = build_pipeline(&config);

    let messenger = Arc::new(TelegramMessenger::new(&config.telegram_token));
    let dispatcher = Dispatcher::new(messenger.clone());
    let subscribers = Arc::new(SubscriberRegistry::new());
    let audit = AuditLog::new(config.log_path.clone());

    let scheduler = Arc::new(Scheduler::new(
        source,
        pipeline,
        dispatcher,
        subscribers.clone(),
        audit,
        config.poll_interval,
    ));

    let handler = CommandHandler::new(scheduler, subscribers);
    info!("bot ready, waiting for commands");
    CommandLoop::new(messenger, handler).run().await;
    Ok(())
}

fn build_source(config: &RelayConfig) -> Box<dyn FetchNews> {
    let feed = Box::new(KeywordFeedSource::new(
        config.feed_url.clone(),
        config.keywords.clone(),
    ));

    match &config.api_url {
        Some(api_url) => {
            let api = Box::new(StructuredApiSource::new(
                api_url.clone(),
                config.api_key.clone(),
            ));
            Box::new(PrioritySource::new(vec![feed, api]))
        }
        None => feed,
    }
}

fn build_pipeline(config: &RelayConfig) -> EnrichmentPipeline {
    let mut pipeline = EnrichmentPipeline::new();
    if config.translation_enabled() {
        pipeline = pipeline.with_stage(Box::new(TranslationStage::new(
            config.source_lang.clone(),
            config.target_lang.clone(),
        )));
    }
    pipeline.with_stage(Box::new(AnalysisStage::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    )))
}
