//! Chat command grammar.
//!
//! Commands are matched case-insensitively after trimming the message.
//! Arguments keep the sender's original casing.

/// A recognized chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `!vote <text>`
    Vote { text: String },
    /// `!voteremove`: undo the sender's own latest vote
    RemoveOwn,
    /// `!voteremove last` (admin)
    RemoveLast,
    /// `!voteremove all` (admin)
    RemoveAll,
    /// `!voteremove <name>` (admin)
    RemoveItem { name: String },
    /// `!confirm` (admin)
    Confirm,
    /// `!archive` (admin)
    Archive,
    /// `!confirmarchive` (admin)
    ConfirmArchive,
    /// `!archivedelete all` (admin)
    ArchiveDeleteAll,
    /// `!archivedelete <name>` (admin)
    ArchiveDelete { name: String },
    /// `!confirmdelete` (admin)
    ConfirmDelete,
    /// `!confirmdeleteall` (admin)
    ConfirmDeleteAll,
}

impl ChatCommand {
    /// Parse a chat message. Returns `None` for anything that isn't a command.
    pub fn parse(message: &str) -> Option<Self> {
        let msg = message.trim();
        let lower = msg.to_lowercase();

        // Exact commands first, so "!confirmarchive" never reads as "!confirm"
        let exact = match lower.as_str() {
            "!voteremove" => Some(ChatCommand::RemoveOwn),
            "!voteremove last" => Some(ChatCommand::RemoveLast),
            "!voteremove all" => Some(ChatCommand::RemoveAll),
            "!confirm" => Some(ChatCommand::Confirm),
            "!archive" => Some(ChatCommand::Archive),
            "!confirmarchive" => Some(ChatCommand::ConfirmArchive),
            "!confirmdelete" => Some(ChatCommand::ConfirmDelete),
            "!confirmdeleteall" => Some(ChatCommand::ConfirmDeleteAll),
            _ => None,
        };
        if exact.is_some() {
            return exact;
        }

        if let Some(arg) = argument(msg, &lower, "!archivedelete ") {
            return Some(if arg.eq_ignore_ascii_case("all") {
                ChatCommand::ArchiveDeleteAll
            } else {
                ChatCommand::ArchiveDelete {
                    name: arg.to_string(),
                }
            });
        }

        if let Some(name) = argument(msg, &lower, "!voteremove ") {
            return Some(ChatCommand::RemoveItem {
                name: name.to_string(),
            });
        }

        if let Some(text) = argument(msg, &lower, "!vote ") {
            return Some(ChatCommand::Vote {
                text: text.to_string(),
            });
        }

        None
    }

    /// Whether only the operator may issue this command
    pub fn requires_admin(&self) -> bool {
        !matches!(self, ChatCommand::Vote { .. } | ChatCommand::RemoveOwn)
    }
}

/// Non-empty, trimmed argument following `prefix`
fn argument<'a>(msg: &'a str, lower: &str, prefix: &str) -> Option<&'a str> {
    if !lower.starts_with(prefix) {
        return None;
    }
    // Lowercasing can change byte lengths outside ASCII; the prefix is ASCII
    let arg = msg.get(prefix.len()..)?.trim();
    (!arg.is_empty()).then_some(arg)
}
