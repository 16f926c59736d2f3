#![allow(dead_code)]

use async_trait::async_trait;
use news_relay::dispatch::{Dispatcher, Messenger};
use news_relay::enrich::EnrichmentPipeline;
use news_relay::sources::FetchNews;
use news_relay::types::{NewsItem, NewsOrigin, RelayError, Result};
use news_relay::{AuditLog, Scheduler, SubscriberRegistry};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn item(title: &str) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        summary: format!("{title} summary"),
        link: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
        origin: NewsOrigin::Feed,
        sentiment: None,
        published_at: None,
    }
}

/// Source that replays a fixed fetch script, then yields nothing.
pub struct ScriptedSource {
    script: VecDeque<Option<NewsItem>>,
}

impl ScriptedSource {
    pub fn new(titles: &[Option<&str>]) -> Self {
        let script = titles.iter().map(|t| t.map(item)).collect();
        Self { script }
    }
}

#[async_trait]
impl FetchNews for ScriptedSource {
    fn source_name(&self) -> String {
        "scripted".to_string()
    }

    async fn fetch(&mut self) -> Option<NewsItem> {
        self.script.pop_front().flatten()
    }
}

/// Source that never has news; keeps the cycle loop idling.
pub struct EmptySource;

#[async_trait]
impl FetchNews for EmptySource {
    fn source_name(&self) -> String {
        "empty".to_string()
    }

    async fn fetch(&mut self) -> Option<NewsItem> {
        None
    }
}

/// Messenger that records deliveries and fails for a configured set of chats.
#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<(i64, String)>>,
    pub fail_chats: Vec<i64>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(chats: &[i64]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_chats: chats.to_vec(),
        }
    }

    pub fn deliveries_to(&self, chat_id: i64) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .count()
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        if self.fail_chats.contains(&chat_id) {
            return Err(RelayError::Telegram(format!("chat {chat_id} unreachable")));
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

/// Scheduler over an identity pipeline and a temp-dir audit log.
pub fn build_scheduler(
    source: Box<dyn FetchNews>,
    messenger: Arc<RecordingMessenger>,
    subscribers: Arc<SubscriberRegistry>,
    interval: Duration,
) -> (Arc<Scheduler>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let audit = AuditLog::new(dir.path().join("news_log.txt"));
    let scheduler = Arc::new(Scheduler::new(
        source,
        EnrichmentPipeline::new(),
        Dispatcher::new(messenger),
        subscribers,
        audit,
        interval,
    ));
    (scheduler, dir)
}
