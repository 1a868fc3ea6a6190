// File: tzbot-core/src/registries/restriction.rs

use std::collections::BTreeMap;

use tracing::{debug, info, warn};
use tzbot_common::models::{AddOutcome, PrefixRemoval, RemovalOutcome};

use crate::Error;
use crate::config::RESTRICTED_CHANNELS_TABLE;
use crate::registries::{load_or_empty, require_non_empty};
use crate::storage::JsonStore;

type RestrictionTable = BTreeMap<String, Vec<String>>;

/// channel id => ordered allowed prefixes. A channel that is present always
/// has at least one prefix; removing the last one unrestricts the channel.
#[derive(Debug)]
pub struct RestrictionRegistry {
    store: JsonStore,
    channels: RestrictionTable,
}

impl RestrictionRegistry {
    pub fn load(store: JsonStore) -> Result<Self, Error> {
        let channels = Self::read(&store)?;
        Ok(Self { store, channels })
    }

    fn read(store: &JsonStore) -> Result<RestrictionTable, Error> {
        let mut table: RestrictionTable = load_or_empty(store, RESTRICTED_CHANNELS_TABLE)?;
        table.retain(|channel, prefixes| {
            if prefixes.is_empty() {
                warn!(channel = %channel, "dropping restriction entry with no prefixes");
                false
            } else {
                true
            }
        });
        Ok(table)
    }

    pub fn reload(&mut self) -> Result<(), Error> {
        self.channels = Self::read(&self.store)?;
        debug!(count = self.channels.len(), "restrictions reloaded");
        Ok(())
    }

    fn commit(&mut self, next: RestrictionTable) -> Result<(), Error> {
        self.store.save_table(RESTRICTED_CHANNELS_TABLE, &next)?;
        self.channels = next;
        Ok(())
    }

    /// Replaces the channel's allowed prefixes. Duplicates collapse onto
    /// their first occurrence.
    pub fn restrict(&mut self, channel: &str, prefixes: &[String]) -> Result<(), Error> {
        if prefixes.is_empty() {
            return Err(Error::validation("at least one allowed prefix is required"));
        }
        let mut list: Vec<String> = Vec::with_capacity(prefixes.len());
        for p in prefixes {
            require_non_empty(p, "allowed prefix")?;
            if !list.contains(p) {
                list.push(p.clone());
            }
        }

        let mut next = self.channels.clone();
        next.insert(channel.to_string(), list);
        self.commit(next)?;
        info!(channel = %channel, "channel restricted");
        Ok(())
    }

    pub fn unrestrict(&mut self, channel: &str) -> Result<RemovalOutcome, Error> {
        if !self.channels.contains_key(channel) {
            return Ok(RemovalOutcome::NotFound);
        }
        let mut next = self.channels.clone();
        next.remove(channel);
        self.commit(next)?;
        info!(channel = %channel, "channel unrestricted");
        Ok(RemovalOutcome::Removed)
    }

    pub fn add_prefix(&mut self, channel: &str, prefix: &str) -> Result<AddOutcome, Error> {
        require_non_empty(prefix, "allowed prefix")?;
        if self
            .channels
            .get(channel)
            .is_some_and(|list| list.iter().any(|p| p == prefix))
        {
            return Ok(AddOutcome::AlreadyPresent);
        }

        let mut next = self.channels.clone();
        next.entry(channel.to_string())
            .or_default()
            .push(prefix.to_string());
        self.commit(next)?;
        Ok(AddOutcome::Added)
    }

    pub fn remove_prefix(&mut self, channel: &str, prefix: &str) -> Result<PrefixRemoval, Error> {
        let Some(current) = self.channels.get(channel) else {
            return Ok(PrefixRemoval::NotPresent);
        };
        if !current.iter().any(|p| p == prefix) {
            return Ok(PrefixRemoval::NotPresent);
        }

        let remaining: Vec<String> = current.iter().filter(|p| *p != prefix).cloned().collect();
        let mut next = self.channels.clone();
        let outcome = if remaining.is_empty() {
            next.remove(channel);
            PrefixRemoval::RemovedLast
        } else {
            next.insert(channel.to_string(), remaining);
            PrefixRemoval::Removed
        };
        self.commit(next)?;
        Ok(outcome)
    }

    /// Drops every restriction. Returns how many channels were cleared.
    pub fn clear(&mut self) -> Result<usize, Error> {
        let cleared = self.channels.len();
        self.commit(RestrictionTable::new())?;
        info!(cleared, "all channel restrictions cleared");
        Ok(cleared)
    }

    pub fn is_restricted(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    pub fn allowed_prefixes(&self, channel: &str) -> Option<&[String]> {
        self.channels.get(channel).map(Vec::as_slice)
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
