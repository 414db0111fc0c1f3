mod confirm;
pub mod export;
pub mod fuzzy;
mod ledger;
mod quota;
mod store;

pub use confirm::{ActionKind, ConfirmationGate, PendingAction};
pub use ledger::VoteLedger;
pub use quota::{QuotaTracker, DAILY_VOTE_LIMIT};
pub use store::{ItemStore, StoredItem};

use crate::clock::WeekId;
use crate::types::*;
use chrono::NaiveDate;

/// All mutable state of one running voting session.
///
/// Store, ledger and quota are only changed together through the methods
/// below, which keep the vote count of every item equal to its number of
/// ledger entries.
#[derive(Debug, Clone)]
pub struct VoteSession {
    pub store: ItemStore,
    pub ledger: VoteLedger,
    pub quota: QuotaTracker,
    pub gate: ConfirmationGate,
    /// Voting week the current tally belongs to
    pub week: WeekId,
}

/// Values recorded for one accepted vote
#[derive(Debug, Clone)]
pub struct AcceptedVote<'a> {
    pub key: &'a str,
    pub name: &'a str,
    pub url: Option<String>,
    pub user: &'a str,
    pub stamp: String,
    pub week: WeekId,
    pub day: NaiveDate,
}

impl VoteSession {
    pub fn new(week: WeekId) -> Self {
        Self {
            store: ItemStore::new(),
            ledger: VoteLedger::new(),
            quota: QuotaTracker::new(),
            gate: ConfirmationGate::new(),
            week,
        }
    }

    /// Record an accepted vote everywhere it needs to go
    pub fn apply_vote(&mut self, vote: AcceptedVote<'_>) -> Item {
        let item = self
            .store
            .upsert_vote(vote.key, vote.name, vote.url, vote.user, vote.stamp)
            .clone();
        self.ledger.record(vote.key, vote.user);
        self.quota.record_vote(vote.user, vote.key, vote.week);
        self.quota.increment_daily(vote.user, vote.day);
        item
    }

    fn revert(&mut self, event: &VoteEvent) {
        self.store.decrement(&event.key);
        self.quota.forget_vote(&event.user, &event.key);
    }

    /// Undo the most recent vote by anyone
    pub fn undo_last(&mut self) -> Option<VoteEvent> {
        let event = self.ledger.pop_last()?;
        self.revert(&event);
        Some(event)
    }

    /// Undo the most recent vote cast by `user`
    pub fn undo_last_for_user(&mut self, user: &str) -> Option<VoteEvent> {
        let event = self.ledger.pop_last_for_user(user)?;
        self.revert(&event);
        Some(event)
    }

    /// Remove one vote from `key`, undoing its most recent ledger entry.
    ///
    /// Returns `false` if the item is not in the tally.
    pub fn remove_one_for_item(&mut self, key: &str) -> bool {
        let Some(event) = self.ledger.pop_last_for_item(key) else {
            return false;
        };
        self.revert(&event);
        true
    }

    /// Drop every vote and all quota state, starting over in `week`
    pub fn clear_all(&mut self, week: WeekId) {
        self.store.clear();
        self.ledger.clear();
        self.quota.clear();
        self.week = week;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::parse_from_str("2026-10-19", "%Y-%m-%d").unwrap()
    }

    fn session() -> VoteSession {
        VoteSession::new(WeekId::containing(today()))
    }

    fn vote(session: &mut VoteSession, key: &str, user: &str) -> Item {
        session.apply_vote(AcceptedVote {
            key,
            name: key,
            url: None,
            user,
            stamp: "12:00 PM, Oct 19".to_string(),
            week: WeekId::containing(today()),
            day: today(),
        })
    }

    fn assert_consistent(session: &VoteSession) {
        assert_eq!(session.store.total_votes() as usize, session.ledger.len());
        for key in session.store.keys() {
            let votes = session.store.get(key).unwrap().votes as usize;
            assert!(votes > 0);
            assert_eq!(votes, session.ledger.count_for_item(key));
        }
    }

    #[test]
    fn test_apply_vote_updates_all_structures() {
        let mut session = session();
        let item = vote(&mut session, "hades", "alice");

        assert_eq!(item.votes, 1);
        assert_eq!(session.ledger.len(), 1);
        assert_eq!(
            session.quota.week_of_last_vote("alice", "hades"),
            Some(session.week)
        );
        assert_eq!(session.quota.daily_count("alice", today()), 1);
        assert_consistent(&session);
    }

    #[test]
    fn test_undo_for_user_clears_week_mark() {
        let mut session = session();
        vote(&mut session, "hades", "alice");
        vote(&mut session, "celeste", "bob");

        let undone = session.undo_last_for_user("alice").unwrap();
        assert_eq!(undone, VoteEvent::new("hades", "alice"));
        assert!(!session.store.contains("hades"));
        assert_eq!(session.quota.week_of_last_vote("alice", "hades"), None);
        // Daily quota is not refunded
        assert_eq!(session.quota.daily_count("alice", today()), 1);
        assert_consistent(&session);

        assert!(session.undo_last_for_user("alice").is_none());
    }

    #[test]
    fn test_undo_last() {
        let mut session = session();
        vote(&mut session, "hades", "alice");
        vote(&mut session, "hades", "bob");

        assert_eq!(session.undo_last(), Some(VoteEvent::new("hades", "bob")));
        assert_eq!(session.store.get("hades").unwrap().votes, 1);
        assert_consistent(&session);
    }

    #[test]
    fn test_remove_one_for_item() {
        let mut session = session();
        vote(&mut session, "hades", "alice");
        vote(&mut session, "celeste", "bob");
        vote(&mut session, "hades", "carol");

        assert!(session.remove_one_for_item("hades"));
        assert_eq!(session.quota.week_of_last_vote("carol", "hades"), None);
        assert!(session.quota.week_of_last_vote("alice", "hades").is_some());
        assert_consistent(&session);

        assert!(!session.remove_one_for_item("tunic"));
    }

    #[test]
    fn test_clear_all() {
        let mut session = session();
        vote(&mut session, "hades", "alice");
        let next = session.week.previous();

        session.clear_all(next);
        assert!(session.store.is_empty());
        assert!(session.ledger.is_empty());
        assert!(session.quota.is_empty());
        assert_eq!(session.week, next);
    }
}
