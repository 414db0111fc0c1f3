//! Commands any chatter may use

use super::{CommandProcessor, Outcome, Rejection};
use crate::resolver::resolve_or_none;
use crate::state::fuzzy::best_match;
use crate::state::{AcceptedVote, DAILY_VOTE_LIMIT};
use crate::types::*;
use chrono::{DateTime, Utc};

/// Where a vote lands once the text has been resolved
struct Target {
    key: ItemKey,
    name: String,
    url: Option<String>,
}

impl CommandProcessor {
    pub(super) async fn handle_vote(
        &mut self,
        user: &str,
        text: &str,
        time: DateTime<Utc>,
    ) -> Result<Outcome, Rejection> {
        let day = self.clock.day_of(time);
        let week = self.clock.week_of(time);

        if self.session.quota.daily_limit_reached(user, day) {
            return Err(Rejection::QuotaExceeded {
                limit: DAILY_VOTE_LIMIT,
            });
        }

        let target = self.resolve_target(text).await;

        if self.session.quota.week_of_last_vote(user, &target.key) == Some(week) {
            let name = self
                .session
                .store
                .get(&target.key)
                .map(|item| item.name.clone())
                .unwrap_or(target.name);
            return Err(Rejection::DuplicateWeeklyVote { name });
        }

        let item = self.session.apply_vote(AcceptedVote {
            key: &target.key,
            name: &target.name,
            url: target.url,
            user,
            stamp: self.clock.display_stamp(time),
            week,
            day,
        });

        tracing::info!(user, key = %target.key, votes = item.votes, "Vote counted");
        Ok(Outcome::changed(format!(
            "@{} ✅ Vote for '{}' counted!",
            user, item.name
        )))
    }

    /// Existing item, then resolver, then the raw text
    async fn resolve_target(&self, text: &str) -> Target {
        if let Some(key) = best_match(text, self.session.store.keys()) {
            if let Some(item) = self.session.store.get(key) {
                tracing::debug!(text, key, "Matched existing item");
                return Target {
                    key: key.to_string(),
                    name: item.name.clone(),
                    url: item.url.clone(),
                };
            }
        }

        if let Some(resolver) = &self.resolver {
            if let Some(resolved) = resolve_or_none(resolver.as_ref(), text).await {
                tracing::debug!(text, name = %resolved.name, "Resolved via {}", resolver.name());
                return Target {
                    key: normalize_key(&resolved.name),
                    name: resolved.name,
                    url: Some(resolved.url),
                };
            }
        }

        Target {
            key: normalize_key(text),
            name: text.trim().to_string(),
            url: None,
        }
    }

    pub(super) fn handle_remove_own(&mut self, user: &str) -> Result<Outcome, Rejection> {
        let event = self
            .session
            .undo_last_for_user(user)
            .ok_or(Rejection::EmptyHistory)?;

        tracing::info!(user, key = %event.key, "Voter removed own vote");
        Ok(Outcome::changed(format!(
            "@{} 🗑️ Your vote for '{}' was removed.",
            user, event.key
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::publish::MemoryArchiveStore;
    use crate::resolver::{ResolveError, ResolveResult, Resolved};
    use async_trait::async_trait;

    struct FixedResolver;

    #[async_trait]
    impl NameResolver for FixedResolver {
        async fn resolve(&self, query: &str) -> ResolveResult<Option<Resolved>> {
            match query.to_lowercase().as_str() {
                "sts" | "slay spire" => Ok(Some(Resolved {
                    name: "Slay the Spire".to_string(),
                    url: "https://store.steampowered.com/app/646570/".to_string(),
                })),
                "broken" => Err(ResolveError::Request("connection refused".to_string())),
                _ => Ok(None),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn processor(now: DateTime<Utc>, resolver: Option<Box<dyn NameResolver>>) -> CommandProcessor {
        let clock = VoteClock::default();
        CommandProcessor::new(
            VoteSession::new(clock.week_of(now)),
            clock,
            "streamer",
            resolver,
            Arc::new(MemoryArchiveStore::new()),
        )
    }

    async fn say(p: &mut CommandProcessor, user: &str, msg: &str, time: DateTime<Utc>) -> Outcome {
        p.handle_event(&ChatEvent::new(user, msg, time)).await
    }

    #[tokio::test]
    async fn test_vote_creates_item_with_stamp() {
        let now = utc("2026-10-19T20:05:00Z");
        let mut p = processor(now, None);

        let outcome = say(&mut p, "alice", "!vote Hades", now).await;
        assert!(outcome.changed);
        assert_eq!(
            outcome.reply.as_deref(),
            Some("@alice ✅ Vote for 'Hades' counted!")
        );

        let items = p.snapshot();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].votes, 1);
        assert_eq!(items[0].user, "alice");
        assert_eq!(items[0].time, "01:05 PM, Oct 19");
    }

    #[tokio::test]
    async fn test_fuzzy_vote_reuses_existing_name() {
        let now = utc("2026-10-19T20:00:00Z");
        let mut p = processor(now, None);

        say(&mut p, "alice", "!vote Stardew Valley", now).await;
        let outcome = say(&mut p, "bob", "!vote stardew valey", now).await;

        assert_eq!(
            outcome.reply.as_deref(),
            Some("@bob ✅ Vote for 'Stardew Valley' counted!")
        );
        let items = p.snapshot();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].votes, 2);
        assert_eq!(items[0].user, "bob");
    }

    #[tokio::test]
    async fn test_resolver_supplies_name_and_link() {
        let now = utc("2026-10-19T20:00:00Z");
        let mut p = processor(now, Some(Box::new(FixedResolver)));

        let outcome = say(&mut p, "alice", "!vote sts", now).await;
        assert_eq!(
            outcome.reply.as_deref(),
            Some("@alice ✅ Vote for 'Slay the Spire' counted!")
        );
        let item = p.session().store.get("slay the spire").unwrap();
        assert_eq!(
            item.url.as_deref(),
            Some("https://store.steampowered.com/app/646570/")
        );
    }

    #[tokio::test]
    async fn test_resolver_failure_falls_back_to_raw_text() {
        let now = utc("2026-10-19T20:00:00Z");
        let mut p = processor(now, Some(Box::new(FixedResolver)));

        let outcome = say(&mut p, "alice", "!vote Broken", now).await;
        assert!(outcome.changed);
        let item = p.session().store.get("broken").unwrap();
        assert_eq!(item.name, "Broken");
        assert!(item.url.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_vote_same_week_rejected() {
        let now = utc("2026-10-19T20:00:00Z");
        let mut p = processor(now, None);

        say(&mut p, "alice", "!vote Hades", now).await;
        let outcome = say(&mut p, "alice", "!vote hades", now).await;

        assert!(!outcome.changed);
        assert_eq!(
            outcome.reply.as_deref(),
            Some("@alice ❌ Already voted 'Hades' this week.")
        );
        assert_eq!(p.session().store.get("hades").unwrap().votes, 1);
        assert_eq!(p.session().quota.daily_count("alice", p.clock().day_of(now)), 1);
    }

    #[tokio::test]
    async fn test_daily_quota() {
        let now = utc("2026-10-19T20:00:00Z");
        let mut p = processor(now, None);

        for game in ["Hades", "Celeste", "Tunic", "Outer Wilds", "Balatro"] {
            let outcome = say(&mut p, "alice", &format!("!vote {}", game), now).await;
            assert!(outcome.changed, "{} should be accepted", game);
        }

        let outcome = say(&mut p, "alice", "!vote Inscryption", now).await;
        assert!(!outcome.changed);
        assert_eq!(
            outcome.reply.as_deref(),
            Some("@alice ❌ You've reached 5 votes today.")
        );
        assert!(!p.session().store.contains("inscryption"));

        // Next local day
        let tomorrow = utc("2026-10-20T20:00:00Z");
        assert!(say(&mut p, "alice", "!vote Inscryption", tomorrow).await.changed);
    }

    #[tokio::test]
    async fn test_remove_own_allows_revote() {
        let now = utc("2026-10-19T20:00:00Z");
        let mut p = processor(now, None);

        say(&mut p, "alice", "!vote Hades", now).await;
        let outcome = say(&mut p, "alice", "!voteremove", now).await;
        assert!(outcome.changed);
        assert_eq!(
            outcome.reply.as_deref(),
            Some("@alice 🗑️ Your vote for 'hades' was removed.")
        );
        assert!(p.snapshot().is_empty());

        assert!(say(&mut p, "alice", "!vote Hades", now).await.changed);
        assert_eq!(p.session().store.get("hades").unwrap().votes, 1);
    }

    #[tokio::test]
    async fn test_remove_own_without_history() {
        let now = utc("2026-10-19T20:00:00Z");
        let mut p = processor(now, None);

        say(&mut p, "alice", "!vote Hades", now).await;
        let outcome = say(&mut p, "bob", "!voteremove", now).await;
        assert!(!outcome.changed);
        assert_eq!(
            outcome.reply.as_deref(),
            Some("@bob ❌ No recent vote to remove.")
        );
        assert_eq!(p.session().store.get("hades").unwrap().votes, 1);
    }
}
