use crate::types::{AnalyzedItem, Result};
use chrono::{SecondsFormat, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Append-only log of every processed item, written regardless of delivery
/// outcome. Write-only from the relay's perspective; nothing reads it back.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn append(&self, item: &AnalyzedItem) -> Result<()> {
        let analysis = item
            .analysis
            .as_ref()
            .map(|a| a.render())
            .unwrap_or_else(|| "-".to_string());

        let record = format!(
            "\n{}\n{}\nTitle: {}\nSummary: {}\nAnalysis:\n{}\n",
            "=".repeat(60),
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            item.title,
            item.summary,
            analysis,
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Analysis, NewsItem, NewsOrigin};

    #[test]
    fn record_has_separator_timestamp_and_labeled_fields() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("news_log.txt"));

        let mut item = AnalyzedItem::from_item(NewsItem {
            title: "BTC breaks out".to_string(),
            summary: "Spot volumes jump.".to_string(),
            link: "https://example.com/btc".to_string(),
            origin: NewsOrigin::Feed,
            sentiment: None,
            published_at: None,
        });
        item.analysis = Some(Analysis::Failed("\u{26A0} AI analysis unavailable: test".into()));

        log.append(&item).unwrap();
        log.append(&item).unwrap();

        let content = std::fs::read_to_string(dir.path().join("news_log.txt")).unwrap();
        assert_eq!(content.matches(&"=".repeat(60)).count(), 2);
        assert!(content.contains("Title: BTC breaks out"));
        assert!(content.contains("Summary: Spot volumes jump."));
        assert!(content.contains("Analysis:\n\u{26A0} AI analysis unavailable: test"));
    }
}
