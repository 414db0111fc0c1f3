use crate::clock::WeekId;
use crate::types::*;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum accepted votes per user per calendar day
pub const DAILY_VOTE_LIMIT: u32 = 5;

/// Per-user daily vote counts and weekly duplicate marks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaTracker {
    /// user -> item key -> week of that user's last vote for the item
    user_weeks: HashMap<UserId, HashMap<ItemKey, WeekId>>,
    /// user -> day -> accepted votes
    daily_counts: HashMap<UserId, HashMap<NaiveDate, u32>>,
}

impl QuotaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn daily_count(&self, user: &str, day: NaiveDate) -> u32 {
        self.daily_counts
            .get(user)
            .and_then(|days| days.get(&day))
            .copied()
            .unwrap_or(0)
    }

    pub fn daily_limit_reached(&self, user: &str, day: NaiveDate) -> bool {
        self.daily_count(user, day) >= DAILY_VOTE_LIMIT
    }

    /// Count one accepted vote for `day`, dropping the user's older days
    pub fn increment_daily(&mut self, user: &str, day: NaiveDate) {
        let days = self.daily_counts.entry(user.to_string()).or_default();
        days.retain(|d, _| *d >= day);
        *days.entry(day).or_insert(0) += 1;
    }

    pub fn week_of_last_vote(&self, user: &str, key: &str) -> Option<WeekId> {
        self.user_weeks
            .get(user)
            .and_then(|items| items.get(key))
            .copied()
    }

    pub fn record_vote(&mut self, user: &str, key: &str, week: WeekId) {
        self.user_weeks
            .entry(user.to_string())
            .or_default()
            .insert(key.to_string(), week);
    }

    /// Drop the week mark for an undone vote
    pub fn forget_vote(&mut self, user: &str, key: &str) {
        if let Some(items) = self.user_weeks.get_mut(user) {
            items.remove(key);
            if items.is_empty() {
                self.user_weeks.remove(user);
            }
        }
    }

    pub fn clear(&mut self) {
        self.user_weeks.clear();
        self.daily_counts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.user_weeks.is_empty() && self.daily_counts.is_empty()
    }
}
