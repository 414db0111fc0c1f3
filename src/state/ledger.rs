use crate::types::*;
use serde::{Deserialize, Serialize};

/// Ordered history of accepted votes, used to undo them.
///
/// Pops scan from the newest entry backwards and remove exactly one entry,
/// leaving the relative order of all other entries untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteLedger {
    events: Vec<VoteEvent>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: &str, user: &str) {
        self.events.push(VoteEvent::new(key, user));
    }

    /// Remove the most recent vote by anyone
    pub fn pop_last(&mut self) -> Option<VoteEvent> {
        self.events.pop()
    }

    /// Remove the most recent vote cast by `user`
    pub fn pop_last_for_user(&mut self, user: &str) -> Option<VoteEvent> {
        let idx = self.events.iter().rposition(|e| e.user == user)?;
        Some(self.events.remove(idx))
    }

    /// Remove the most recent vote for `key`, whoever cast it
    pub fn pop_last_for_item(&mut self, key: &str) -> Option<VoteEvent> {
        let idx = self.events.iter().rposition(|e| e.key == key)?;
        Some(self.events.remove(idx))
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoteEvent> {
        self.events.iter()
    }

    /// Number of recorded votes for `key`
    pub fn count_for_item(&self, key: &str) -> usize {
        self.events.iter().filter(|e| e.key == key).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(entries: &[(&str, &str)]) -> VoteLedger {
        let mut ledger = VoteLedger::new();
        for (key, user) in entries {
            ledger.record(key, user);
        }
        ledger
    }

    #[test]
    fn test_pop_last() {
        let mut ledger = ledger(&[("hades", "alice"), ("celeste", "bob")]);
        assert_eq!(ledger.pop_last(), Some(VoteEvent::new("celeste", "bob")));
        assert_eq!(ledger.pop_last(), Some(VoteEvent::new("hades", "alice")));
        assert_eq!(ledger.pop_last(), None);
    }

    #[test]
    fn test_pop_last_for_user_preserves_others() {
        let mut ledger = ledger(&[
            ("hades", "alice"),
            ("celeste", "alice"),
            ("outer wilds", "bob"),
            ("tunic", "carol"),
        ]);

        assert_eq!(
            ledger.pop_last_for_user("alice"),
            Some(VoteEvent::new("celeste", "alice"))
        );

        let rest: Vec<_> = ledger.iter().cloned().collect();
        assert_eq!(
            rest,
            vec![
                VoteEvent::new("hades", "alice"),
                VoteEvent::new("outer wilds", "bob"),
                VoteEvent::new("tunic", "carol"),
            ]
        );
        assert_eq!(ledger.pop_last_for_user("dave"), None);
    }

    #[test]
    fn test_pop_last_for_item() {
        let mut ledger = ledger(&[("hades", "alice"), ("celeste", "bob"), ("hades", "carol")]);

        assert_eq!(
            ledger.pop_last_for_item("hades"),
            Some(VoteEvent::new("hades", "carol"))
        );
        assert_eq!(ledger.count_for_item("hades"), 1);
        assert_eq!(ledger.pop_last_for_item("tunic"), None);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut ledger = ledger(&[("hades", "alice")]);
        ledger.clear();
        assert!(ledger.is_empty());
    }
}
