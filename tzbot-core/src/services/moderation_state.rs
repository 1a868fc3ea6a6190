// File: tzbot-core/src/services/moderation_state.rs

use tokio::sync::RwLock;
use tracing::info;

use crate::Error;
use crate::registries::{CustomCommandRegistry, RestrictionRegistry, WhitelistRegistry};
use crate::storage::JsonStore;

/// The three registries, each behind its own writer lock.
#[derive(Debug)]
pub struct ModerationState {
    pub restrictions: RwLock<RestrictionRegistry>,
    pub custom_commands: RwLock<CustomCommandRegistry>,
    pub whitelist: RwLock<WhitelistRegistry>,
}

/// Borrowed view of all registries, handed to the pipeline for one message.
#[derive(Clone, Copy)]
pub struct RegistryView<'a> {
    pub restrictions: &'a RestrictionRegistry,
    pub custom_commands: &'a CustomCommandRegistry,
    pub whitelist: &'a WhitelistRegistry,
}

impl ModerationState {
    pub fn load(store: &JsonStore) -> Result<Self, Error> {
        let restrictions = RestrictionRegistry::load(store.clone())?;
        let custom_commands = CustomCommandRegistry::load(store.clone())?;
        let whitelist = WhitelistRegistry::load(store.clone())?;
        info!(
            restricted_channels = restrictions.len(),
            custom_commands = custom_commands.len(),
            whitelisted_users = whitelist.len(),
            "moderation state loaded from {}",
            store.dir().display()
        );
        Ok(Self {
            restrictions: RwLock::new(restrictions),
            custom_commands: RwLock::new(custom_commands),
            whitelist: RwLock::new(whitelist),
        })
    }

    /// Re-reads every table from disk, discarding the in-memory copies.
    pub async fn reload_all(&self) -> Result<(), Error> {
        self.restrictions.write().await.reload()?;
        self.custom_commands.write().await.reload()?;
        self.whitelist.write().await.reload()?;
        info!("moderation state reloaded from disk");
        Ok(())
    }
}
