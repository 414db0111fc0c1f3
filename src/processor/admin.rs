//! Operator commands. The caller has already checked the sender.

use super::{CommandProcessor, Outcome, Rejection};
use crate::state::fuzzy::best_match;
use crate::state::{ActionKind, PendingAction};
use crate::types::*;
use chrono::{DateTime, Utc};

impl CommandProcessor {
    pub(super) fn handle_remove_last(&mut self, user: &str) -> Result<Outcome, Rejection> {
        let event = self.session.undo_last().ok_or(Rejection::EmptyHistory)?;

        tracing::info!(voter = %event.user, key = %event.key, "Admin removed last vote");
        Ok(Outcome::changed(format!(
            "@{} 🗑️ Removed last vote for '{}' by {}.",
            user, event.key, event.user
        )))
    }

    pub(super) fn handle_remove_item(&mut self, user: &str, name: &str) -> Result<Outcome, Rejection> {
        let key = best_match(name, self.session.store.keys())
            .map(str::to_string)
            .unwrap_or_else(|| normalize_key(name));

        if !self.session.remove_one_for_item(&key) {
            return Err(Rejection::NoMatchFound {
                query: name.to_string(),
            });
        }

        let remaining = self.session.store.get(&key).map_or(0, |item| item.votes);
        tracing::info!(key = %key, remaining, "Admin removed one vote");
        Ok(Outcome::changed(format!(
            "@{} 🗑️ Removed one vote from '{}' ({} left).",
            user, key, remaining
        )))
    }

    fn arm(&mut self, user: &str, action: PendingAction, prompt: String) -> Outcome {
        if let Some(previous) = self.session.gate.arm(action) {
            tracing::debug!(superseded = ?previous, "Replaced pending action");
        }
        Outcome::reply(format!("@{} ⚠️ {}", user, prompt))
    }

    pub(super) fn handle_arm_clear(&mut self, user: &str) -> Outcome {
        self.arm(
            user,
            PendingAction::ClearAll,
            "Delete ALL votes? Type !confirm to proceed.".to_string(),
        )
    }

    pub(super) fn handle_arm_archive(&mut self, user: &str) -> Outcome {
        self.arm(
            user,
            PendingAction::Archive,
            "Archive and clear the current votes? Type !confirmarchive to proceed.".to_string(),
        )
    }

    pub(super) fn handle_arm_delete(&mut self, user: &str, name: String) -> Outcome {
        let prompt = format!("Delete archive '{}'? Type !confirmdelete to proceed.", name);
        self.arm(user, PendingAction::DeleteArchive(name), prompt)
    }

    pub(super) fn handle_arm_delete_all(&mut self, user: &str) -> Outcome {
        self.arm(
            user,
            PendingAction::DeleteAllArchives,
            "Delete ALL archives? Type !confirmdeleteall to proceed.".to_string(),
        )
    }

    pub(super) fn handle_confirm_clear(
        &mut self,
        user: &str,
        time: DateTime<Utc>,
    ) -> Result<Outcome, Rejection> {
        self.session
            .gate
            .take_if(ActionKind::ClearAll)
            .ok_or(Rejection::NotArmed)?;

        let removed = self.session.store.total_votes();
        self.session.clear_all(self.clock.week_of(time));
        tracing::info!(removed, "Admin cleared all votes");
        Ok(Outcome::changed(format!("@{} ✅ All votes removed.", user)))
    }

    pub(super) async fn handle_confirm_archive(
        &mut self,
        user: &str,
        time: DateTime<Utc>,
    ) -> Result<Outcome, Rejection> {
        self.session
            .gate
            .take_if(ActionKind::Archive)
            .ok_or(Rejection::NotArmed)?;

        if !self.archive_current(self.session.week).await {
            return Ok(Outcome::reply(format!(
                "@{} ❌ Archiving failed, votes were kept.",
                user
            )));
        }

        self.session.clear_all(self.clock.week_of(time));
        tracing::info!("Admin archived and cleared votes");
        Ok(Outcome {
            reply: Some(format!("@{} ✅ Votes archived and cleared.", user)),
            changed: true,
            archives_changed: true,
        })
    }

    pub(super) async fn handle_confirm_delete(&mut self, user: &str) -> Result<Outcome, Rejection> {
        let Some(PendingAction::DeleteArchive(name)) =
            self.session.gate.take_if(ActionKind::DeleteArchive)
        else {
            return Err(Rejection::NotArmed);
        };

        match self.archives.delete_archive(&name).await {
            Ok(true) => {
                tracing::info!(archive = %name, "Admin deleted archive");
                Ok(Outcome {
                    reply: Some(format!("@{} ✅ Archive '{}' deleted.", user, name)),
                    changed: false,
                    archives_changed: true,
                })
            }
            Ok(false) => Err(Rejection::ArchiveNotFound { name }),
            Err(e) => {
                tracing::error!(archive = %name, "Failed to delete archive: {}", e);
                Ok(Outcome::reply(format!(
                    "@{} ❌ Failed to delete archive '{}'.",
                    user, name
                )))
            }
        }
    }

    pub(super) async fn handle_confirm_delete_all(&mut self, user: &str) -> Result<Outcome, Rejection> {
        self.session
            .gate
            .take_if(ActionKind::DeleteAllArchives)
            .ok_or(Rejection::NotArmed)?;

        match self.archives.delete_all_archives().await {
            Ok(count) => {
                tracing::info!(count, "Admin deleted all archives");
                Ok(Outcome {
                    reply: Some(format!("@{} ✅ Deleted {} archive(s).", user, count)),
                    changed: false,
                    archives_changed: true,
                })
            }
            Err(e) => {
                tracing::error!("Failed to delete archives: {}", e);
                Ok(Outcome::reply(format!(
                    "@{} ❌ Failed to delete archives.",
                    user
                )))
            }
        }
    }
}
