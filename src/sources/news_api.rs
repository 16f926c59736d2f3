use crate::sources::FetchNews;
use crate::types::{NewsItem, NewsOrigin, RelayError, Result, Sentiment};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// JSON news endpoint source. Expects a CryptoPanic-shaped response and maps
/// the first result onto a `NewsItem`, carrying the provider's sentiment when
/// present.
pub struct StructuredApiSource {
    url: String,
    auth_token: Option<String>,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    results: Vec<ApiResult>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    title: String,
    #[serde(default)]
    description: Option<String>,
    url: String,
    #[serde(default)]
    source: Option<ApiSource>,
    #[serde(default)]
    sentiment: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    #[serde(default)]
    title: Option<String>,
}

impl StructuredApiSource {
    pub fn new(url: String, auth_token: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent("news-relay/0.1")
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            url,
            auth_token,
            client,
        }
    }

    async fn try_fetch(&self) -> Result<Option<NewsItem>> {
        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth_token", token.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Parse(format!(
                "HTTP {} fetching {}",
                status, self.url
            )));
        }

        let payload: ApiResponse = response.json().await?;
        let Some(first) = payload.results.into_iter().next() else {
            return Ok(None);
        };

        Ok(Some(map_result(first)))
    }
}

fn map_result(result: ApiResult) -> NewsItem {
    let sentiment = result.sentiment.as_deref().and_then(parse_sentiment);
    let summary = result
        .description
        .or_else(|| result.source.and_then(|s| s.title))
        .unwrap_or_default();

    NewsItem {
        title: result.title,
        summary,
        link: result.url,
        origin: NewsOrigin::Api,
        sentiment,
        published_at: result.published_at,
    }
}

fn parse_sentiment(raw: &str) -> Option<Sentiment> {
    match raw.to_lowercase().as_str() {
        "positive" | "bullish" => Some(Sentiment::Bullish),
        "negative" | "bearish" => Some(Sentiment::Bearish),
        "neutral" => Some(Sentiment::Neutral),
        _ => None,
    }
}

#[async_trait]
impl FetchNews for StructuredApiSource {
    fn source_name(&self) -> String {
        format!("api:{}", self.url)
    }

    async fn fetch(&mut self) -> Option<NewsItem> {
        match self.try_fetch().await {
            Ok(Some(item)) => {
                debug!("api {} returned: {}", self.url, item.title);
                Some(item)
            }
            Ok(None) => {
                debug!("api {} returned no results", self.url);
                None
            }
            Err(e) => {
                warn!("api {} fetch failed: {}", self.url, e);
                None
            }
        }
    }
}
