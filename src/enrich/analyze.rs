use crate::enrich::EnrichStage;
use crate::types::{
    Analysis, AnalyzedItem, Impact, Recommendation, RelayError, Result, Sentiment, Verdict,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const ANALYZE_TIMEOUT: Duration = Duration::from_secs(30);

/// Prefix of every delivered analysis-failure placeholder.
pub const ANALYSIS_FAILED_MARKER: &str = "\u{26A0} AI analysis unavailable";

/// Market-impact analysis via a chat-completions provider. Fail-visible: a
/// provider failure becomes a delivered placeholder beginning with
/// [`ANALYSIS_FAILED_MARKER`], never a silently dropped section.
///
/// Items that already carry a provider sentiment (structured API origin) skip
/// the provider call and derive the verdict from that sentiment.
pub struct AnalysisStage {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: String,
}

impl AnalysisStage {
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .user_agent("news-relay/0.1")
            .timeout(ANALYZE_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn build_prompt(title: &str, summary: &str) -> String {
        format!(
            "News headline: {title}\n\
             Summary: {summary}\n\n\
             Analyze how this news may affect the cryptocurrency market.\n\
             1) Give one word for the impact: Positive / Negative / Neutral.\n\
             2) If a specific top-20 cryptocurrency is mentioned, name it and \
             recommend LONG or SHORT.\n\
             3) Explain the reason in one or two sentences.\n\n\
             Answer in exactly this format:\n\
             Impact: <Positive/Negative/Neutral>\n\
             Coin: <name or none>\n\
             Recommendation: <LONG/SHORT/none>\n\
             Rationale: <text>"
        )
    }

    async fn call_provider(&self, title: &str, summary: &str) -> Result<String> {
        let prompt = Self::build_prompt(title, summary);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            max_tokens: 200,
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Provider(format!(
                "analysis provider returned HTTP {status}"
            )));
        }

        let payload: ChatResponse = response.json().await?;
        payload
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| RelayError::Provider("analysis reply had no choices".to_string()))
    }

    fn verdict_from_sentiment(sentiment: Sentiment) -> Verdict {
        let impact = match sentiment {
            Sentiment::Bullish => Impact::Positive,
            Sentiment::Bearish => Impact::Negative,
            Sentiment::Neutral => Impact::Neutral,
        };
        Verdict {
            impact,
            coin: None,
            recommendation: None,
            rationale: "Sentiment reported by the news provider.".to_string(),
        }
    }
}

/// Parse the provider's fixed four-line reply. `None` means the reply did not
/// follow the contract and is treated like a provider failure.
fn parse_verdict(reply: &str) -> Option<Verdict> {
    let mut impact = None;
    let mut coin = None;
    let mut recommendation = None;
    let mut rationale = None;

    for line in reply.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("Impact:") {
            impact = match value.trim().to_lowercase().as_str() {
                "positive" => Some(Impact::Positive),
                "negative" => Some(Impact::Negative),
                "neutral" => Some(Impact::Neutral),
                _ => None,
            };
        } else if let Some(value) = line.strip_prefix("Coin:") {
            let value = value.trim();
            if !value.is_empty() && !value.eq_ignore_ascii_case("none") {
                coin = Some(value.to_string());
            }
        } else if let Some(value) = line.strip_prefix("Recommendation:") {
            recommendation = match value.trim().to_uppercase().as_str() {
                "LONG" => Some(Recommendation::Long),
                "SHORT" => Some(Recommendation::Short),
                _ => None,
            };
        } else if let Some(value) = line.strip_prefix("Rationale:") {
            rationale = Some(value.trim().to_string());
        }
    }

    Some(Verdict {
        impact: impact?,
        coin,
        recommendation,
        rationale: rationale.unwrap_or_default(),
    })
}

#[async_trait]
impl EnrichStage for AnalysisStage {
    fn stage_name(&self) -> String {
        format!("analyze({})", self.model)
    }

    async fn apply(&self, mut draft: AnalyzedItem) -> AnalyzedItem {
        if let Some(sentiment) = draft.item.sentiment {
            debug!("using provider sentiment, skipping analysis call");
            draft.analysis = Some(Analysis::Verdict(Self::verdict_from_sentiment(sentiment)));
            return draft;
        }

        let analysis = match self.call_provider(&draft.title, &draft.summary).await {
            Ok(reply) => match parse_verdict(&reply) {
                Some(verdict) => Analysis::Verdict(verdict),
                None => {
                    warn!("analysis reply did not follow the output format");
                    Analysis::Failed(format!(
                        "{ANALYSIS_FAILED_MARKER}: reply did not follow the expected format"
                    ))
                }
            },
            Err(e) => {
                warn!("analysis provider call failed: {}", e);
                Analysis::Failed(format!("{ANALYSIS_FAILED_MARKER}: {e}"))
            }
        };

        draft.analysis = Some(analysis);
        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_reply() {
        let reply = "Impact: Positive\nCoin: BTC\nRecommendation: LONG\nRationale: ETF inflows.";
        let verdict = parse_verdict(reply).unwrap();
        assert_eq!(verdict.impact, Impact::Positive);
        assert_eq!(verdict.coin.as_deref(), Some("BTC"));
        assert_eq!(verdict.recommendation, Some(Recommendation::Long));
        assert_eq!(verdict.rationale, "ETF inflows.");
    }

    #[test]
    fn none_fields_stay_empty() {
        let reply = "Impact: Neutral\nCoin: none\nRecommendation: none\nRationale: Broad macro news.";
        let verdict = parse_verdict(reply).unwrap();
        assert_eq!(verdict.impact, Impact::Neutral);
        assert!(verdict.coin.is_none());
        assert!(verdict.recommendation.is_none());
    }

    #[test]
    fn reply_without_impact_is_rejected() {
        assert!(parse_verdict("The market will probably go up.").is_none());
    }

    #[test]
    fn sentiment_bypass_maps_to_impact() {
        let verdict = AnalysisStage::verdict_from_sentiment(Sentiment::Bearish);
        assert_eq!(verdict.impact, Impact::Negative);
    }
}
