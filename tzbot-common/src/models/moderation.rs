use serde::{Deserialize, Serialize};

/// A message that parsed into a known built-in command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInvocation {
    /// Command name without the prefix character.
    pub name: String,
    /// Arguments split on whitespace, with quoted spans kept together.
    pub args: Vec<String>,
    /// Everything after the command name, leading whitespace trimmed and
    /// otherwise untouched. Used by commands that take free text.
    pub raw_args: String,
}

/// The single decision the moderation pipeline makes for a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationAction {
    Ignore,
    InvokeCommand(CommandInvocation),
    SendCustomResponse(String),
    Allow,
    /// Delete the message and warn with the channel's allowed prefixes.
    DeleteAndWarn(Vec<String>),
}

impl ModerationAction {
    pub fn kind(&self) -> &'static str {
        match self {
            ModerationAction::Ignore => "ignore",
            ModerationAction::InvokeCommand(_) => "invoke_command",
            ModerationAction::SendCustomResponse(_) => "custom_response",
            ModerationAction::Allow => "allow",
            ModerationAction::DeleteAndWarn(_) => "delete_and_warn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    Removed,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixRemoval {
    Removed,
    /// The prefix was the last one, so the channel is unrestricted now.
    RemovedLast,
    NotPresent,
}
