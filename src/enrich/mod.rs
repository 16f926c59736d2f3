pub mod analyze;
pub mod translate;

pub use analyze::AnalysisStage;
pub use translate::TranslationStage;

use crate::types::{AnalyzedItem, NewsItem};
use async_trait::async_trait;
use tracing::debug;

/// One step of the enrichment chain. A stage receives the draft built so far
/// and returns an updated draft; provider failures stay inside the stage
/// (fail-open for translation, fail-visible for analysis) and never reach the
/// scheduler.
#[async_trait]
pub trait EnrichStage: Send + Sync {
    fn stage_name(&self) -> String;

    async fn apply(&self, draft: AnalyzedItem) -> AnalyzedItem;
}

/// Ordered chain of enrichment stages. An empty pipeline is the identity.
pub struct EnrichmentPipeline {
    stages: Vec<Box<dyn EnrichStage>>,
}

impl EnrichmentPipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn with_stage(mut self, stage: Box<dyn EnrichStage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub async fn apply(&self, item: NewsItem) -> AnalyzedItem {
        let mut draft = AnalyzedItem::from_item(item);
        for stage in &self.stages {
            debug!("running enrichment stage: {}", stage.stage_name());
            draft = stage.apply(draft).await;
        }
        draft
    }
}

impl Default for EnrichmentPipeline {
    fn default() -> Self {
        Self::new()
    }
}
