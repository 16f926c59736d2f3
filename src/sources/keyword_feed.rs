use crate::sources::FetchNews;
use crate::types::{NewsItem, NewsOrigin, RelayError, Result};
use async_trait::async_trait;
use chrono::Utc;
use feed_rs::model::Feed;
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// RSS/Atom source that returns the first entry matching a keyword list.
///
/// The adapter remembers the title it last returned and skips it on the next
/// scan. That memory is local to this instance and independent of the
/// scheduler's delivery dedup.
pub struct KeywordFeedSource {
    url: String,
    keywords: Vec<String>,
    client: Client,
    last_title: Option<String>,
}

impl KeywordFeedSource {
    pub fn new(url: String, keywords: Vec<String>) -> Self {
        let client = Client::builder()
            .user_agent("news-relay/0.1")
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        let keywords = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        Self {
            url,
            keywords,
            client,
            last_title: None,
        }
    }

    async fn try_fetch(&self) -> Result<Option<NewsItem>> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Parse(format!(
                "HTTP {} fetching {}",
                status, self.url
            )));
        }

        let body = response.text().await?;
        let feed = parser::parse(body.as_bytes())
            .map_err(|e| RelayError::Parse(format!("failed to parse feed: {e}")))?;

        Ok(select_entry(
            &feed,
            &self.keywords,
            self.last_title.as_deref(),
        ))
    }
}

#[async_trait]
impl FetchNews for KeywordFeedSource {
    fn source_name(&self) -> String {
        format!("feed:{}", self.url)
    }

    async fn fetch(&mut self) -> Option<NewsItem> {
        match self.try_fetch().await {
            Ok(Some(item)) => {
                debug!("feed {} matched entry: {}", self.url, item.title);
                self.last_title = Some(item.title.clone());
                Some(item)
            }
            Ok(None) => {
                debug!("feed {} has no new matching entries", self.url);
                None
            }
            Err(e) => {
                warn!("feed {} fetch failed: {}", self.url, e);
                None
            }
        }
    }
}

/// Scan entries in feed order and return the first whose title+summary
/// contains any keyword (case-insensitive substring), skipping the title
/// returned last time.
fn select_entry(feed: &Feed, keywords: &[String], last_title: Option<&str>) -> Option<NewsItem> {
    for entry in &feed.entries {
        let title = match &entry.title {
            Some(t) => t.content.clone(),
            None => continue,
        };
        let summary = entry
            .summary
            .as_ref()
            .map(|s| s.content.clone())
            .unwrap_or_default();

        let haystack = format!("{} {}", title, summary).to_lowercase();
        if !keywords.iter().any(|k| haystack.contains(k.as_str())) {
            continue;
        }
        if last_title == Some(title.as_str()) {
            continue;
        }

        let link = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default();
        let published_at = entry.published.map(|dt| dt.with_timezone(&Utc));

        return Some(NewsItem {
            title,
            summary,
            link,
            origin: NewsOrigin::Feed,
            sentiment: None,
            published_at,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
  <title>Test Feed</title>
  <item>
    <title>Company reports quarterly earnings</title>
    <description>Revenue was in line with expectations.</description>
    <link>https://example.com/earnings</link>
  </item>
  <item>
    <title>Bitcoin surges past $70k</title>
    <description>Markets react to the rally.</description>
    <link>https://example.com/btc</link>
  </item>
  <item>
    <title>Fed signals rate pause</title>
    <description>Officials point to cooling inflation.</description>
    <link>https://example.com/fed</link>
  </item>
</channel></rss>"#;

    fn parse(xml: &str) -> Feed {
        parser::parse(xml.as_bytes()).unwrap()
    }

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let feed = parse(FEED_XML);
        let item = select_entry(&feed, &kw(&["bitcoin"]), None).unwrap();
        assert_eq!(item.title, "Bitcoin surges past $70k");
        assert_eq!(item.link, "https://example.com/btc");
        assert_eq!(item.origin, NewsOrigin::Feed);
    }

    #[test]
    fn unrelated_entries_are_skipped() {
        let feed = parse(FEED_XML);
        assert!(select_entry(&feed, &kw(&["altcoin"]), None).is_none());
    }

    #[test]
    fn last_returned_title_is_not_repeated() {
        let feed = parse(FEED_XML);
        let item = select_entry(&feed, &kw(&["bitcoin", "fed"]), Some("Bitcoin surges past $70k"))
            .unwrap();
        assert_eq!(item.title, "Fed signals rate pause");
    }

    #[test]
    fn summary_text_also_matches() {
        let feed = parse(FEED_XML);
        let item = select_entry(&feed, &kw(&["inflation"]), None).unwrap();
        assert_eq!(item.title, "Fed signals rate pause");
    }
}
