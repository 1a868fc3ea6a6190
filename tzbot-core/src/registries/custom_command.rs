// File: tzbot-core/src/registries/custom_command.rs

use std::collections::BTreeMap;

use tracing::{debug, info};
use tzbot_common::models::RemovalOutcome;

use crate::Error;
use crate::config::CUSTOM_COMMANDS_TABLE;
use crate::registries::{load_or_empty, require_non_empty};
use crate::storage::JsonStore;

type CustomCommandTable = BTreeMap<String, String>;

/// trigger text => response text, last write wins.
#[derive(Debug)]
pub struct CustomCommandRegistry {
    store: JsonStore,
    commands: CustomCommandTable,
    /// Triggers in matching order: longest first, ties broken by byte order.
    precedence: Vec<String>,
}

impl CustomCommandRegistry {
    pub fn load(store: JsonStore) -> Result<Self, Error> {
        let commands: CustomCommandTable = load_or_empty(&store, CUSTOM_COMMANDS_TABLE)?;
        let mut reg = Self {
            store,
            commands: CustomCommandTable::new(),
            precedence: Vec::new(),
        };
        reg.install(commands);
        Ok(reg)
    }

    pub fn reload(&mut self) -> Result<(), Error> {
        let commands = load_or_empty(&self.store, CUSTOM_COMMANDS_TABLE)?;
        self.install(commands);
        debug!(count = self.commands.len(), "custom commands reloaded");
        Ok(())
    }

    fn install(&mut self, commands: CustomCommandTable) {
        let mut precedence: Vec<String> = commands.keys().cloned().collect();
        precedence.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        self.commands = commands;
        self.precedence = precedence;
    }

    fn commit(&mut self, next: CustomCommandTable) -> Result<(), Error> {
        self.store.save_table(CUSTOM_COMMANDS_TABLE, &next)?;
        self.install(next);
        Ok(())
    }

    /// Inserts or overwrites `trigger`. Returns the previous response, if any.
    pub fn set(&mut self, trigger: &str, response: &str) -> Result<Option<String>, Error> {
        require_non_empty(trigger, "trigger")?;
        require_non_empty(response, "response")?;

        let mut next = self.commands.clone();
        let previous = next.insert(trigger.to_string(), response.to_string());
        self.commit(next)?;
        info!(trigger = %trigger, replaced = previous.is_some(), "custom command saved");
        Ok(previous)
    }

    pub fn remove(&mut self, trigger: &str) -> Result<RemovalOutcome, Error> {
        if !self.commands.contains_key(trigger) {
            return Ok(RemovalOutcome::NotFound);
        }
        let mut next = self.commands.clone();
        next.remove(trigger);
        self.commit(next)?;
        info!(trigger = %trigger, "custom command removed");
        Ok(RemovalOutcome::Removed)
    }

    pub fn get(&self, trigger: &str) -> Option<&str> {
        self.commands.get(trigger).map(String::as_str)
    }

    pub fn list(&self) -> &BTreeMap<String, String> {
        &self.commands
    }

    /// `(trigger, response)` pairs in the order the pipeline tests them.
    pub fn iter_by_precedence(&self) -> impl Iterator<Item = (&str, &str)> {
        self.precedence.iter().filter_map(|t| {
            self.commands
                .get_key_value(t)
                .map(|(k, v)| (k.as_str(), v.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
