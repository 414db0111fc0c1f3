use crate::types::*;
use serde::{Deserialize, Serialize};

/// One stored item together with its normalized key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredItem {
    pub key: ItemKey,
    #[serde(flatten)]
    pub item: Item,
}

/// Current tally, kept in insertion order so that ranking ties are stable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemStore {
    entries: Vec<StoredItem>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&Item> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.item)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_votes(&self) -> u32 {
        self.entries.iter().map(|e| e.item.votes).sum()
    }

    /// Add one vote, creating the item if needed.
    ///
    /// Display metadata always takes the values of the latest vote.
    pub fn upsert_vote(
        &mut self,
        key: &str,
        name: &str,
        url: Option<String>,
        user: &str,
        time: String,
    ) -> &Item {
        let idx = match self.position(key) {
            Some(idx) => {
                let item = &mut self.entries[idx].item;
                item.votes += 1;
                item.name = name.to_string();
                item.url = url;
                item.user = user.to_string();
                item.time = time;
                idx
            }
            None => {
                self.entries.push(StoredItem {
                    key: key.to_string(),
                    item: Item {
                        name: name.to_string(),
                        votes: 1,
                        url,
                        user: user.to_string(),
                        time,
                    },
                });
                self.entries.len() - 1
            }
        };
        &self.entries[idx].item
    }

    /// Remove one vote. Returns whether the item still exists afterwards.
    pub fn decrement(&mut self, key: &str) -> bool {
        let Some(idx) = self.position(key) else {
            return false;
        };

        let item = &mut self.entries[idx].item;
        item.votes = item.votes.saturating_sub(1);
        if item.votes == 0 {
            self.entries.remove(idx);
            false
        } else {
            true
        }
    }

    /// Items ranked by vote count, ties in insertion order
    pub fn snapshot(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.entries.iter().map(|e| e.item.clone()).collect();
        // sort_by is stable
        items.sort_by(|a, b| b.votes.cmp(&a.votes));
        items
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn entries(&self) -> &[StoredItem] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(store: &mut ItemStore, key: &str, user: &str) {
        store.upsert_vote(key, key, None, user, "12:00 PM, Oct 19".to_string());
    }

    #[test]
    fn test_upsert_creates_then_increments() {
        let mut store = ItemStore::new();
        let item = store.upsert_vote("hades", "Hades", None, "alice", "t1".to_string());
        assert_eq!(item.votes, 1);

        let item = store.upsert_vote(
            "hades",
            "Hades",
            Some("https://store.example/hades".to_string()),
            "bob",
            "t2".to_string(),
        );
        assert_eq!(item.votes, 2);
        assert_eq!(item.user, "bob");
        assert_eq!(item.time, "t2");
        assert_eq!(item.url.as_deref(), Some("https://store.example/hades"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_decrement_removes_at_zero() {
        let mut store = ItemStore::new();
        vote(&mut store, "hades", "alice");
        vote(&mut store, "hades", "bob");

        assert!(store.decrement("hades"));
        assert_eq!(store.get("hades").unwrap().votes, 1);

        assert!(!store.decrement("hades"));
        assert!(!store.contains("hades"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_decrement_missing_key() {
        let mut store = ItemStore::new();
        assert!(!store.decrement("nothing"));
    }

    #[test]
    fn test_snapshot_ranks_with_stable_ties() {
        let mut store = ItemStore::new();
        vote(&mut store, "celeste", "a");
        vote(&mut store, "hades", "a");
        vote(&mut store, "outer wilds", "a");
        vote(&mut store, "hades", "b");

        let names: Vec<_> = store.snapshot().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["hades", "celeste", "outer wilds"]);
        assert_eq!(store.total_votes(), 4);
    }

    #[test]
    fn test_clear() {
        let mut store = ItemStore::new();
        vote(&mut store, "hades", "a");
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.total_votes(), 0);
    }
}
