//! Session export/import so a restart keeps undo history and quotas.
//!
//! The published `votes.json` only carries the ranked tally. This snapshot
//! additionally holds the vote ledger, the weekly duplicate marks and the
//! daily counts, which would otherwise be lost with the process.

use super::{ItemStore, QuotaTracker, VoteLedger, VoteSession};
use crate::clock::WeekId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Schema version for export format compatibility
/// Version 1: items, ledger, quota, week
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// A serializable snapshot of one voting session.
///
/// The pending confirmation is runtime-only and never exported: a restart
/// disarms any destructive action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExport {
    /// Schema version for forward compatibility
    pub schema_version: u32,
    /// Export timestamp (ISO8601)
    pub exported_at: String,
    /// Voting week the tally belongs to
    pub week: WeekId,
    /// Items in insertion order
    pub items: ItemStore,
    /// Vote history, oldest first
    pub ledger: VoteLedger,
    /// Weekly marks and daily counts
    #[serde(default)]
    pub quota: QuotaTracker,
}

impl SessionExport {
    /// Capture the current session with the current timestamp
    pub fn new(session: &VoteSession) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: chrono::Utc::now().to_rfc3339(),
            week: session.week,
            items: session.store.clone(),
            ledger: session.ledger.clone(),
            quota: session.quota.clone(),
        }
    }

    /// Validate the export before import
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version > EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Export schema version {} is newer than supported version {}. \
                 Please update the bot.",
                self.schema_version, EXPORT_SCHEMA_VERSION
            ));
        }

        let mut counted: HashMap<&str, u32> = HashMap::new();
        for event in self.ledger.iter() {
            if !self.items.contains(&event.key) {
                return Err(format!(
                    "Ledger entry for '{}' by '{}' references an item which doesn't exist",
                    event.key, event.user
                ));
            }
            *counted.entry(event.key.as_str()).or_insert(0) += 1;
        }

        for entry in self.items.entries() {
            if entry.item.votes == 0 {
                return Err(format!("Item '{}' has zero votes", entry.key));
            }
            let recorded = counted.get(entry.key.as_str()).copied().unwrap_or(0);
            if recorded != entry.item.votes {
                return Err(format!(
                    "Item '{}' has {} votes but {} ledger entries",
                    entry.key, entry.item.votes, recorded
                ));
            }
        }

        Ok(())
    }

    /// Rebuild a session from a validated export
    pub fn into_session(self) -> VoteSession {
        let mut session = VoteSession::new(self.week);
        session.store = self.items;
        session.ledger = self.ledger;
        session.quota = self.quota;
        session
    }

    /// Read and validate an export file. `Ok(None)` if the file doesn't exist.
    pub async fn load(path: &Path) -> Result<Option<Self>, String> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("Failed to read {}: {}", path.display(), e)),
        };

        let export: SessionExport = serde_json::from_str(&raw)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
        export.validate()?;
        Ok(Some(export))
    }

    /// Write the export as pretty JSON, replacing the file atomically
    pub async fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AcceptedVote;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::parse_from_str("2026-10-19", "%Y-%m-%d").unwrap()
    }

    fn sample_session() -> VoteSession {
        let week = WeekId::containing(today());
        let mut session = VoteSession::new(week);
        for (key, user) in [("hades", "alice"), ("celeste", "bob"), ("hades", "bob")] {
            session.apply_vote(AcceptedVote {
                key,
                name: key,
                url: None,
                user,
                stamp: "12:00 PM, Oct 19".to_string(),
                week,
                day: today(),
            });
        }
        session
    }

    #[test]
    fn test_export_serialization_roundtrip() {
        let export = SessionExport::new(&sample_session());

        let json = serde_json::to_string_pretty(&export).unwrap();
        let parsed: SessionExport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);
        assert!(parsed.validate().is_ok());

        let restored = parsed.into_session();
        assert_eq!(restored.store.snapshot(), sample_session().store.snapshot());
        assert_eq!(restored.ledger.len(), 3);
        assert_eq!(
            restored.quota.week_of_last_vote("bob", "hades"),
            Some(WeekId::containing(today()))
        );
        assert_eq!(restored.quota.daily_count("bob", today()), 2);
    }

    #[test]
    fn test_validation_future_schema() {
        let mut export = SessionExport::new(&sample_session());
        export.schema_version = EXPORT_SCHEMA_VERSION + 1;

        let result = export.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("newer than supported"));
    }

    #[test]
    fn test_validation_ledger_mismatch() {
        let mut export = SessionExport::new(&sample_session());
        export.ledger.pop_last();

        let result = export.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("ledger entries"));
    }

    #[test]
    fn test_validation_unknown_item() {
        let mut export = SessionExport::new(&sample_session());
        export.ledger.record("tunic", "carol");

        let result = export.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("doesn't exist"));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        assert!(SessionExport::load(&path).await.unwrap().is_none());

        SessionExport::new(&sample_session()).save(&path).await.unwrap();
        let loaded = SessionExport::load(&path).await.unwrap().unwrap();
        assert_eq!(loaded.into_session().store.total_votes(), 3);
    }
}
