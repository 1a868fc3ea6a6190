pub mod action_executor;
pub mod builtin_commands;
pub mod command_parser;
pub mod moderation_pipeline;
pub mod moderation_service;
pub mod moderation_state;

pub use action_executor::{ActionExecutor, ExecutionReport};
pub use command_parser::CommandRouter;
pub use moderation_pipeline::ModerationPipeline;
pub use moderation_service::{MessageOutcome, ModerationService};
pub use moderation_state::{ModerationState, RegistryView};
