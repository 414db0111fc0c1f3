//! Two-step confirmation for destructive admin commands.
//!
//! An admin first arms an action, then confirms it with the matching
//! command. Each category holds at most one pending action; arming again
//! replaces only the action of the same category.

use std::collections::HashMap;

/// A destructive action waiting for confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Remove every vote and all quota state
    ClearAll,
    /// Archive the current tally, then clear it
    Archive,
    /// Delete one archive by name
    DeleteArchive(String),
    /// Delete every archive
    DeleteAllArchives,
}

/// Category of a pending action, used to match confirm commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    ClearAll,
    Archive,
    DeleteArchive,
    DeleteAllArchives,
}

impl PendingAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            PendingAction::ClearAll => ActionKind::ClearAll,
            PendingAction::Archive => ActionKind::Archive,
            PendingAction::DeleteArchive(_) => ActionKind::DeleteArchive,
            PendingAction::DeleteAllArchives => ActionKind::DeleteAllArchives,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfirmationGate {
    pending: HashMap<ActionKind, PendingAction>,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm an action, returning the one of the same category it superseded
    pub fn arm(&mut self, action: PendingAction) -> Option<PendingAction> {
        self.pending.insert(action.kind(), action)
    }

    /// Consume the pending action of the given category, if any
    pub fn take_if(&mut self, kind: ActionKind) -> Option<PendingAction> {
        self.pending.remove(&kind)
    }

    pub fn pending(&self, kind: ActionKind) -> Option<&PendingAction> {
        self.pending.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_and_confirm() {
        let mut gate = ConfirmationGate::new();
        assert!(gate.take_if(ActionKind::ClearAll).is_none());

        gate.arm(PendingAction::ClearAll);
        assert_eq!(gate.take_if(ActionKind::ClearAll), Some(PendingAction::ClearAll));
        assert!(gate.is_empty());
    }

    #[test]
    fn test_categories_are_independent() {
        let mut gate = ConfirmationGate::new();
        gate.arm(PendingAction::Archive);
        gate.arm(PendingAction::DeleteAllArchives);

        assert!(gate.take_if(ActionKind::ClearAll).is_none());
        assert_eq!(gate.pending(ActionKind::Archive), Some(&PendingAction::Archive));
        assert_eq!(
            gate.take_if(ActionKind::DeleteAllArchives),
            Some(PendingAction::DeleteAllArchives)
        );
        assert_eq!(gate.take_if(ActionKind::Archive), Some(PendingAction::Archive));
        assert!(gate.is_empty());
    }

    #[test]
    fn test_new_arm_supersedes_same_category() {
        let mut gate = ConfirmationGate::new();
        gate.arm(PendingAction::DeleteArchive("archive_2026-10-10.html".to_string()));

        let previous = gate.arm(PendingAction::DeleteArchive("archive_2026-10-17.html".to_string()));
        assert_eq!(
            previous,
            Some(PendingAction::DeleteArchive("archive_2026-10-10.html".to_string()))
        );
        assert_eq!(
            gate.take_if(ActionKind::DeleteArchive),
            Some(PendingAction::DeleteArchive("archive_2026-10-17.html".to_string()))
        );
        assert!(gate.take_if(ActionKind::DeleteArchive).is_none());
    }
}
