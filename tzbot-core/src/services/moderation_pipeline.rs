// File: tzbot-core/src/services/moderation_pipeline.rs
//! The per-message decision engine. Pure: it reads a message and a view of
//! the registries and returns one `ModerationAction`. Side effects belong to
//! `ActionExecutor`.
//!
//! Checks run in a fixed order and the first hit wins:
//!   1) own messages        => Ignore
//!   2) custom triggers     => SendCustomResponse
//!   3) known bot commands  => InvokeCommand
//!   4) whitelisted authors => Allow
//!   5) channel restriction => Allow or DeleteAndWarn

use tracing::trace;
use tzbot_common::models::{ChatMessage, ModerationAction};

use crate::services::command_parser::CommandRouter;
use crate::services::moderation_state::RegistryView;

/// `prefix` allows `text` when `text` starts with it, character for
/// character. No word boundary is required, so `!buy` allows `!buying`.
pub fn prefix_allows(prefix: &str, text: &str) -> bool {
    text.starts_with(prefix)
}

pub struct ModerationPipeline {
    router: CommandRouter,
}

impl ModerationPipeline {
    pub fn new(router: CommandRouter) -> Self {
        Self { router }
    }

    pub fn evaluate(
        &self,
        message: &ChatMessage,
        bot_user_id: Option<&str>,
        view: RegistryView<'_>,
    ) -> ModerationAction {
        let text = message.text.as_str();

        if bot_user_id.is_some_and(|id| id == message.author_id) {
            return ModerationAction::Ignore;
        }

        if let Some((trigger, response)) = view
            .custom_commands
            .iter_by_precedence()
            .find(|(trigger, _)| prefix_allows(trigger, text))
        {
            trace!(trigger = %trigger, "custom trigger matched");
            return ModerationAction::SendCustomResponse(response.to_string());
        }

        if let Some(invocation) = self.router.route(text) {
            return ModerationAction::InvokeCommand(invocation);
        }

        if view.whitelist.contains(&message.author_id) {
            return ModerationAction::Allow;
        }

        match view.restrictions.allowed_prefixes(&message.channel_id) {
            None => ModerationAction::Allow,
            Some(allowed) if allowed.iter().any(|p| prefix_allows(p, text)) => ModerationAction::Allow,
            Some(allowed) => ModerationAction::DeleteAndWarn(allowed.to_vec()),
        }
    }
}
