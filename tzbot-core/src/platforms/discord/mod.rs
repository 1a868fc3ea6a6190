pub mod gateway;
pub mod runtime;

pub use gateway::DiscordGateway;
pub use runtime::{DiscordEvent, DiscordPlatform};
