use crate::enrich::EnrichStage;
use crate::types::{AnalyzedItem, RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com/translate_a/single";
const TRANSLATE_TIMEOUT: Duration = Duration::from_secs(15);

/// Translates the item title and summary. Fail-open: a provider failure keeps
/// the original text, so localization never blocks delivery.
pub struct TranslationStage {
    client: Client,
    base_url: String,
    source_lang: String,
    target_lang: String,
}

impl TranslationStage {
    pub fn new(source_lang: String, target_lang: String) -> Self {
        let client = Client::builder()
            .user_agent("news-relay/0.1")
            .timeout(TRANSLATE_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            source_lang,
            target_lang,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn translate(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_lang.as_str()),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Provider(format!(
                "translation endpoint returned HTTP {status}"
            )));
        }

        // Reply shape: [[["<translated>", "<original>", ...], ...], ...]
        let payload: Value = response.json().await?;
        let segments = payload
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| RelayError::Provider("unexpected translation reply".to_string()))?;

        let mut translated = String::new();
        for segment in segments {
            if let Some(part) = segment.get(0).and_then(Value::as_str) {
                translated.push_str(part);
            }
        }

        if translated.is_empty() {
            return Err(RelayError::Provider(
                "translation reply contained no text".to_string(),
            ));
        }
        Ok(translated)
    }

    async fn translate_or_keep(&self, text: &str) -> String {
        match self.translate(text).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("translation failed, keeping original text: {}", e);
                text.to_string()
            }
        }
    }
}

#[async_trait]
impl EnrichStage for TranslationStage {
    fn stage_name(&self) -> String {
        format!("translate({}->{})", self.source_lang, self.target_lang)
    }

    async fn apply(&self, mut draft: AnalyzedItem) -> AnalyzedItem {
        draft.title = self.translate_or_keep(&draft.title).await;
        draft.summary = self.translate_or_keep(&draft.summary).await;
        draft
    }
}
