// File: tzbot-common/src/models/mod.rs
pub mod message;
pub mod moderation;

pub use message::{ChatMessage, MessageRef};
pub use moderation::{
    AddOutcome,
    CommandInvocation,
    ModerationAction,
    PrefixRemoval,
    RemovalOutcome,
};
