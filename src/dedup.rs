use crate::types::NewsItem;

/// Tracks the identity of the last successfully delivered item. The identity
/// is the exact title text; `record` must only be called after dispatch
/// completes, so a fetched-but-undelivered item never suppresses a later
/// delivery of the same story.
#[derive(Debug, Default)]
pub struct DedupTracker {
    last_delivered: Option<String>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_new(&self, item: &NewsItem) -> bool {
        self.last_delivered.as_deref() != Some(item.identity())
    }

    pub fn record(&mut self, item: &NewsItem) {
        self.last_delivered = Some(item.identity().to_string());
    }

    pub fn last_delivered(&self) -> Option<&str> {
        self.last_delivered.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewsOrigin;

    fn item(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            summary: String::new(),
            link: String::new(),
            origin: NewsOrigin::Feed,
            sentiment: None,
            published_at: None,
        }
    }

    #[test]
    fn repeat_after_intervening_item_is_new_again() {
        let mut tracker = DedupTracker::new();
        let a = item("A");
        let b = item("B");

        assert!(tracker.is_new(&a));
        tracker.record(&a);
        assert!(!tracker.is_new(&a));

        assert!(tracker.is_new(&b));
        tracker.record(&b);

        // A repeat after an intervening different item counts as new.
        assert!(tracker.is_new(&a));
    }

    #[test]
    fn identity_is_exact_string_match() {
        let mut tracker = DedupTracker::new();
        tracker.record(&item("Bitcoin rallies"));
        assert!(tracker.is_new(&item("bitcoin rallies")));
    }
}
