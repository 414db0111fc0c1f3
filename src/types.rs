use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque ID types for readability
pub type ItemKey = String;
pub type UserId = String;

/// Normalize free text into an item key (trim whitespace, lowercase)
pub fn normalize_key(text: &str) -> ItemKey {
    text.trim().to_lowercase()
}

/// A votable entry in the tally.
///
/// Field names match the published `votes.json` format so that external
/// viewers and the manual editing tool can read the same file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Display name, as most recently resolved
    pub name: String,
    /// Number of accepted votes (never 0 while stored)
    pub votes: u32,
    /// Canonical store link, if the resolver found one
    pub url: Option<String>,
    /// Last voter
    pub user: UserId,
    /// Time of the last vote, formatted for display
    pub time: String,
}

/// A single accepted vote, as recorded in the undo ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteEvent {
    pub key: ItemKey,
    pub user: UserId,
}

impl VoteEvent {
    pub fn new(key: impl Into<ItemKey>, user: impl Into<UserId>) -> Self {
        Self {
            key: key.into(),
            user: user.into(),
        }
    }
}

/// An inbound chat message
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub user: UserId,
    pub message: String,
    pub time: DateTime<Utc>,
}

impl ChatEvent {
    pub fn new(user: impl Into<UserId>, message: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            user: user.into(),
            message: message.into(),
            time,
        }
    }
}

/// Metadata for one archived voting week (`archives.json` entry)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveEntry {
    pub week_id: String,
    /// First day of the period, e.g. "October 17, 2026"
    pub start: String,
    /// Last day of the period
    pub end: String,
    pub total_votes: u32,
    /// File name of the archived page, relative to the archive directory
    pub file: String,
}
