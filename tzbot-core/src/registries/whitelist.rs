// File: tzbot-core/src/registries/whitelist.rs

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};
use tzbot_common::models::{AddOutcome, RemovalOutcome};

use crate::Error;
use crate::config::WHITELIST_TABLE;
use crate::registries::{load_or_empty, require_non_empty};
use crate::storage::JsonStore;

/// On disk the set is stored as `{ "<user_id>": true }`.
type WhitelistTable = BTreeMap<String, bool>;

/// Users exempt from restriction enforcement.
#[derive(Debug)]
pub struct WhitelistRegistry {
    store: JsonStore,
    users: BTreeSet<String>,
}

impl WhitelistRegistry {
    pub fn load(store: JsonStore) -> Result<Self, Error> {
        let users = Self::read(&store)?;
        Ok(Self { store, users })
    }

    fn read(store: &JsonStore) -> Result<BTreeSet<String>, Error> {
        let table: WhitelistTable = load_or_empty(store, WHITELIST_TABLE)?;
        Ok(table
            .into_iter()
            .filter_map(|(user, present)| present.then_some(user))
            .collect())
    }

    pub fn reload(&mut self) -> Result<(), Error> {
        self.users = Self::read(&self.store)?;
        debug!(count = self.users.len(), "whitelist reloaded");
        Ok(())
    }

    fn commit(&mut self, next: BTreeSet<String>) -> Result<(), Error> {
        let table: WhitelistTable = next.iter().map(|u| (u.clone(), true)).collect();
        self.store.save_table(WHITELIST_TABLE, &table)?;
        self.users = next;
        Ok(())
    }

    pub fn add(&mut self, user: &str) -> Result<AddOutcome, Error> {
        require_non_empty(user, "user id")?;
        if self.users.contains(user) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        let mut next = self.users.clone();
        next.insert(user.to_string());
        self.commit(next)?;
        info!(user = %user, "user whitelisted");
        Ok(AddOutcome::Added)
    }

    pub fn remove(&mut self, user: &str) -> Result<RemovalOutcome, Error> {
        if !self.users.contains(user) {
            return Ok(RemovalOutcome::NotFound);
        }
        let mut next = self.users.clone();
        next.remove(user);
        self.commit(next)?;
        info!(user = %user, "user removed from whitelist");
        Ok(RemovalOutcome::Removed)
    }

    pub fn contains(&self, user: &str) -> bool {
        self.users.contains(user)
    }

    pub fn list(&self) -> &BTreeSet<String> {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
