use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::info;

/// The set of chats currently subscribed to the relay. Insertion is
/// idempotent; there is no remove operation — pausing the scheduler retains
/// membership.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    chats: RwLock<HashSet<i64>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the chat was not subscribed before.
    pub async fn add(&self, chat_id: i64) -> bool {
        let added = self.chats.write().await.insert(chat_id);
        if added {
            info!("chat {} subscribed", chat_id);
        }
        added
    }

    /// Snapshot of the current set, for fanout.
    pub async fn all(&self) -> Vec<i64> {
        self.chats.read().await.iter().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.chats.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chats.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_is_idempotent() {
        let registry = SubscriberRegistry::new();
        assert!(registry.add(42).await);
        assert!(!registry.add(42).await);
        assert_eq!(registry.len().await, 1);

        registry.add(7).await;
        let mut all = registry.all().await;
        all.sort();
        assert_eq!(all, vec![7, 42]);
    }
}
