//! Chat command processing
//!
//! Turns one chat event into at most one reply plus a "tally changed" flag.
//! Admin checks happen here, then commands are dispatched to the viewer and
//! admin handler modules.
//!
//! The operator is identified purely by chat username. Admin commands from
//! anyone else are ignored without a reply.

mod admin;
mod viewer;

use crate::clock::{VoteClock, WeekId};
use crate::command::ChatCommand;
use crate::publish::ArchiveStore;
use crate::resolver::NameResolver;
use crate::state::VoteSession;
use crate::types::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Why a command was refused. Never escapes the processor as an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("You've reached {limit} votes today.")]
    QuotaExceeded { limit: u32 },

    #[error("Already voted '{name}' this week.")]
    DuplicateWeeklyVote { name: String },

    #[error("No votes for '{query}'.")]
    NoMatchFound { query: String },

    #[error("No recent vote to remove.")]
    EmptyHistory,

    #[error("Nothing pending to confirm.")]
    NotArmed,

    #[error("Archive '{name}' not found.")]
    ArchiveNotFound { name: String },

    #[error("Only the channel operator can do that.")]
    Unauthorized,
}

/// Result of processing one chat event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Reply to post in chat, if any
    pub reply: Option<String>,
    /// The tally (or its session state) changed and must be re-rendered
    pub changed: bool,
    /// Archives were added or removed
    pub archives_changed: bool,
}

impl Outcome {
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn reply(text: String) -> Self {
        Self {
            reply: Some(text),
            ..Self::default()
        }
    }

    pub fn changed(text: String) -> Self {
        Self {
            reply: Some(text),
            changed: true,
            archives_changed: false,
        }
    }

    fn rejected(user: &str, rejection: Rejection) -> Self {
        match rejection {
            Rejection::Unauthorized => Self::silent(),
            other => Self::reply(format!("@{} ❌ {}", user, other)),
        }
    }
}

/// Interprets chat events against one voting session
pub struct CommandProcessor {
    session: VoteSession,
    clock: VoteClock,
    admin: UserId,
    resolver: Option<Box<dyn NameResolver>>,
    archives: Arc<dyn ArchiveStore>,
}

impl CommandProcessor {
    pub fn new(
        session: VoteSession,
        clock: VoteClock,
        admin: impl Into<UserId>,
        resolver: Option<Box<dyn NameResolver>>,
        archives: Arc<dyn ArchiveStore>,
    ) -> Self {
        Self {
            session,
            clock,
            admin: admin.into(),
            resolver,
            archives,
        }
    }

    pub fn session(&self) -> &VoteSession {
        &self.session
    }

    pub fn clock(&self) -> &VoteClock {
        &self.clock
    }

    /// Ranked tally
    pub fn snapshot(&self) -> Vec<Item> {
        self.session.store.snapshot()
    }

    pub fn is_admin(&self, user: &str) -> bool {
        user.eq_ignore_ascii_case(&self.admin)
    }

    /// Handle one chat message.
    ///
    /// A message from a later week first runs the weekly transition, so the
    /// command never lands in the finished week's tally.
    pub async fn handle_event(&mut self, event: &ChatEvent) -> Outcome {
        let rollover = if self.week_rolled_over(event.time) {
            self.on_week_boundary(event.time).await
        } else {
            Outcome::silent()
        };

        let Some(command) = ChatCommand::parse(&event.message) else {
            return rollover;
        };
        let mut outcome = self.handle_command(&event.user, command, event.time).await;
        outcome.changed |= rollover.changed;
        outcome.archives_changed |= rollover.archives_changed;
        outcome
    }

    /// Handle an already parsed command
    pub async fn handle_command(
        &mut self,
        user: &str,
        command: ChatCommand,
        time: DateTime<Utc>,
    ) -> Outcome {
        tracing::debug!(user, command = ?command, "Chat command");

        let result = if command.requires_admin() && !self.is_admin(user) {
            tracing::debug!(user, "Ignoring admin command from non-admin");
            Err(Rejection::Unauthorized)
        } else {
            match command {
                ChatCommand::Vote { text } => self.handle_vote(user, &text, time).await,
                ChatCommand::RemoveOwn => self.handle_remove_own(user),
                ChatCommand::RemoveLast => self.handle_remove_last(user),
                ChatCommand::RemoveItem { name } => self.handle_remove_item(user, &name),
                ChatCommand::RemoveAll => Ok(self.handle_arm_clear(user)),
                ChatCommand::Confirm => self.handle_confirm_clear(user, time),
                ChatCommand::Archive => Ok(self.handle_arm_archive(user)),
                ChatCommand::ConfirmArchive => self.handle_confirm_archive(user, time).await,
                ChatCommand::ArchiveDelete { name } => Ok(self.handle_arm_delete(user, name)),
                ChatCommand::ArchiveDeleteAll => Ok(self.handle_arm_delete_all(user)),
                ChatCommand::ConfirmDelete => self.handle_confirm_delete(user).await,
                ChatCommand::ConfirmDeleteAll => self.handle_confirm_delete_all(user).await,
            }
        };

        result.unwrap_or_else(|rejection| {
            tracing::info!(user, "Command rejected: {:?}", rejection);
            Outcome::rejected(user, rejection)
        })
    }

    /// Whether `now` belongs to a later voting week than the current tally
    pub fn week_rolled_over(&self, now: DateTime<Utc>) -> bool {
        self.clock.week_of(now) > self.session.week
    }

    /// Weekly transition: archive the finished week's tally, then clear it.
    ///
    /// Empty tallies are not archived. If archiving fails the votes are kept
    /// so the next call can retry.
    pub async fn on_week_boundary(&mut self, now: DateTime<Utc>) -> Outcome {
        let finished = self.session.week;
        let next = self.clock.week_of(now);
        tracing::info!(finished = %finished, next = %next, "Voting week rolled over");

        let archived = !self.session.store.is_empty();
        if archived && !self.archive_current(finished).await {
            return Outcome::silent();
        }

        self.session.clear_all(next);
        Outcome {
            reply: None,
            changed: true,
            archives_changed: archived,
        }
    }

    /// Archive the ranked tally under `week`. Failures are logged.
    async fn archive_current(&self, week: WeekId) -> bool {
        let snapshot = self.session.store.snapshot();
        match self.archives.archive_snapshot(&snapshot, week).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(week = %week, "Failed to archive votes: {}", e);
                false
            }
        }
    }
}
