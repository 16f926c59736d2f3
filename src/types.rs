use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a news item was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsOrigin {
    Feed,
    Api,
}

/// Market sentiment as reported by a structured news provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

/// A single fetched news unit. Immutable once fetched; enrichment derives an
/// [`AnalyzedItem`] instead of mutating this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub origin: NewsOrigin,
    pub sentiment: Option<Sentiment>,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsItem {
    /// The dedup identity: exact title text.
    pub fn identity(&self) -> &str {
        &self.title
    }
}

/// Expected market impact of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Impact::Positive => write!(f, "Positive"),
            Impact::Negative => write!(f, "Negative"),
            Impact::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Trade direction suggested by the analysis stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Long,
    Short,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Long => write!(f, "LONG"),
            Recommendation::Short => write!(f, "SHORT"),
        }
    }
}

/// Structured output of the analysis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub impact: Impact,
    pub coin: Option<String>,
    pub recommendation: Option<Recommendation>,
    pub rationale: String,
}

impl Verdict {
    pub fn render(&self) -> String {
        format!(
            "Impact: {}\nCoin: {}\nRecommendation: {}\nRationale: {}",
            self.impact,
            self.coin.as_deref().unwrap_or("none"),
            self.recommendation
                .map(|r| r.to_string())
                .unwrap_or_else(|| "none".to_string()),
            self.rationale
        )
    }
}

/// Outcome of the analysis stage. A failed analysis is still delivered so the
/// failure is visible end-to-end.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Verdict(Verdict),
    Failed(String),
}

impl Analysis {
    pub fn render(&self) -> String {
        match self {
            Analysis::Verdict(v) => v.render(),
            Analysis::Failed(msg) => msg.clone(),
        }
    }
}

/// A news item after the enrichment pipeline has run. `title` and `summary`
/// start as copies of the item fields; the translation stage replaces them.
#[derive(Debug, Clone)]
pub struct AnalyzedItem {
    pub item: NewsItem,
    pub title: String,
    pub summary: String,
    pub analysis: Option<Analysis>,
}

impl AnalyzedItem {
    pub fn from_item(item: NewsItem) -> Self {
        let title = item.title.clone();
        let summary = item.summary.clone();
        Self {
            item,
            title,
            summary,
            analysis: None,
        }
    }

    /// The message delivered to subscribers.
    pub fn render(&self) -> String {
        let mut msg = format!(
            "\u{1F4F0} *News update:*\n\n*{}*\n\n{}\n\n\u{1F517} {}",
            self.title, self.summary, self.item.link
        );
        if let Some(analysis) = &self.analysis {
            msg.push_str("\n\n\u{1F916} *AI analysis:*\n");
            msg.push_str(&analysis.render());
        }
        msg
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Enrichment provider error: {0}")]
    Provider(String),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
