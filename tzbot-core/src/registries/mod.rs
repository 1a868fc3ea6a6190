// File: tzbot-core/src/registries/mod.rs
//! In-memory registries mirrored to JSON tables. Every mutation is written
//! through to disk before it becomes visible in memory; disk is only read
//! again through an explicit `reload()`.

pub mod restriction;
pub mod custom_command;
pub mod whitelist;

pub use restriction::RestrictionRegistry;
pub use custom_command::CustomCommandRegistry;
pub use whitelist::WhitelistRegistry;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::Error;
use crate::storage::JsonStore;

/// Loads a table, treating a corrupt file as empty. The corrupt file is left
/// on disk until the next successful save replaces it.
pub(crate) fn load_or_empty<T>(store: &JsonStore, table: &str) -> Result<T, Error>
where
    T: DeserializeOwned + Default,
{
    match store.load_table(table) {
        Ok(t) => Ok(t),
        Err(Error::StorageCorrupt { table, reason }) => {
            warn!(table = %table, reason = %reason, "corrupt table; falling back to empty");
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}

pub(crate) fn require_non_empty(value: &str, what: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{what} must not be empty")));
    }
    Ok(())
}
