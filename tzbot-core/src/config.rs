// File: tzbot-core/src/config.rs

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

pub const RESTRICTED_CHANNELS_TABLE: &str = "restricted_channels";
pub const CUSTOM_COMMANDS_TABLE: &str = "custom_commands";
pub const WHITELIST_TABLE: &str = "whitelist";

pub const DEFAULT_COMMAND_PREFIX: &str = "!";
pub const DEFAULT_WARNING_DELAY_SECS: u64 = 5;

/// Runtime settings shared by the core services.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Directory holding the three JSON tables.
    pub data_dir: PathBuf,
    pub command_prefix: String,
    /// How long a restriction warning stays up before the bot removes it.
    pub warning_delay: Duration,
    /// Users treated as administrators regardless of platform permissions.
    pub admin_user_ids: HashSet<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            warning_delay: Duration::from_secs(DEFAULT_WARNING_DELAY_SECS),
            admin_user_ids: HashSet::new(),
        }
    }
}

impl BotConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn is_configured_admin(&self, user_id: &str) -> bool {
        self.admin_user_ids.contains(user_id)
    }
}
