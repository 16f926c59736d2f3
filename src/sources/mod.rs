pub mod keyword_feed;
pub mod news_api;
pub mod priority;

pub use keyword_feed::KeywordFeedSource;
pub use news_api::StructuredApiSource;
pub use priority::PrioritySource;

use crate::types::NewsItem;
use async_trait::async_trait;

/// A polymorphic news source: yields the single most relevant unseen item per
/// call. I/O, HTTP-status, and parse failures stay inside the adapter — they
/// are logged and surface as `None` ("no news this cycle").
#[async_trait]
pub trait FetchNews: Send + Sync {
    /// Human-readable name, used in log records.
    fn source_name(&self) -> String;

    /// Fetch the most relevant currently-available item, if any.
    async fn fetch(&mut self) -> Option<NewsItem>;
}
