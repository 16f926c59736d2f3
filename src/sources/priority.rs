use crate::sources::FetchNews;
use crate::types::NewsItem;
use async_trait::async_trait;
use tracing::debug;

/// Ordered fallback over multiple sources: each is tried in priority order and
/// the first item wins. Yields `None` only when every source comes up empty.
pub struct PrioritySource {
    sources: Vec<Box<dyn FetchNews>>,
}

impl PrioritySource {
    pub fn new(sources: Vec<Box<dyn FetchNews>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl FetchNews for PrioritySource {
    fn source_name(&self) -> String {
        let names: Vec<String> = self.sources.iter().map(|s| s.source_name()).collect();
        format!("priority[{}]", names.join(", "))
    }

    async fn fetch(&mut self) -> Option<NewsItem> {
        for source in &mut self.sources {
            if let Some(item) = source.fetch().await {
                debug!("priority source settled on {}", source.source_name());
                return Some(item);
            }
        }
        None
    }
}
