// File: tzbot-core/src/services/moderation_service.rs

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info};
use tzbot_common::models::{ChatMessage, ModerationAction};
use tzbot_common::traits::ChatGateway;

use crate::Error;
use crate::config::BotConfig;
use crate::services::action_executor::{ActionExecutor, ExecutionReport};
use crate::services::builtin_commands::{BuiltinCommand, CommandContext, handle_builtin_command};
use crate::services::command_parser::CommandRouter;
use crate::services::moderation_pipeline::ModerationPipeline;
use crate::services::moderation_state::{ModerationState, RegistryView};
use crate::storage::JsonStore;

/// Result of handling one inbound message.
#[derive(Debug)]
pub struct MessageOutcome {
    pub action: ModerationAction,
    pub report: ExecutionReport,
}

/// Glue between the platform runtime, the pipeline, the command handlers and
/// the executor. Messages are handled one at a time; no error escapes
/// `handle_message`.
pub struct ModerationService {
    config: BotConfig,
    state: Arc<ModerationState>,
    pipeline: ModerationPipeline,
    executor: ActionExecutor,
    bot_user_id: RwLock<Option<String>>,
}

impl ModerationService {
    pub fn new(config: BotConfig, state: Arc<ModerationState>, gateway: Arc<dyn ChatGateway>) -> Self {
        debug!("Initializing ModerationService");
        let router = CommandRouter::new(&config.command_prefix, BuiltinCommand::names());
        let executor = ActionExecutor::new(gateway, config.warning_delay);
        Self {
            config,
            state,
            pipeline: ModerationPipeline::new(router),
            executor,
            bot_user_id: RwLock::new(None),
        }
    }

    /// Loads the tables from `config.data_dir` and builds the service.
    pub fn from_config(config: BotConfig, gateway: Arc<dyn ChatGateway>) -> Result<Self, Error> {
        let store = JsonStore::new(config.data_dir.clone());
        let state = Arc::new(ModerationState::load(&store)?);
        Ok(Self::new(config, state, gateway))
    }

    pub fn state(&self) -> &Arc<ModerationState> {
        &self.state
    }

    pub async fn set_bot_user_id(&self, id: impl Into<String>) {
        let id = id.into();
        info!(bot_user = %id, "bot identity set");
        *self.bot_user_id.write().await = Some(id);
    }

    /// Runs the pipeline against the current registry contents.
    pub async fn evaluate(&self, message: &ChatMessage) -> ModerationAction {
        let bot_user_id = self.bot_user_id.read().await.clone();
        let restrictions = self.state.restrictions.read().await;
        let custom_commands = self.state.custom_commands.read().await;
        let whitelist = self.state.whitelist.read().await;

        let view = RegistryView {
            restrictions: &restrictions,
            custom_commands: &custom_commands,
            whitelist: &whitelist,
        };
        self.pipeline.evaluate(message, bot_user_id.as_deref(), view)
    }

    pub async fn handle_message(&self, message: &ChatMessage) -> MessageOutcome {
        let action = self.evaluate(message).await;
        debug!(
            channel = %message.channel_id,
            author = %message.author_id,
            author_name = %message.author_name,
            action = action.kind(),
            "message evaluated"
        );

        let report = match &action {
            ModerationAction::InvokeCommand(invocation) => {
                let mut report = ExecutionReport::default();
                let is_admin = message.author_is_admin || self.config.is_configured_admin(&message.author_id);
                let ctx = CommandContext {
                    channel_id: &message.channel_id,
                    author_id: &message.author_id,
                    is_admin,
                    prefix: &self.config.command_prefix,
                    state: &self.state,
                };

                let reply = match handle_builtin_command(invocation, &ctx).await {
                    Ok(reply) => reply,
                    Err(Error::Validation(msg)) => Some(msg),
                    Err(e) => {
                        error!(command = %invocation.name, "command failed: {e}");
                        Some(format!("Command `{}` failed: {e}", invocation.name))
                    }
                };
                if let Some(text) = reply {
                    self.executor.send(&message.channel_id, &text, &mut report).await;
                }
                report
            }
            other => self.executor.execute(message, other).await,
        };

        MessageOutcome { action, report }
    }
}
