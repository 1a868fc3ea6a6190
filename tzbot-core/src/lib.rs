// src/lib.rs

pub mod config;
pub mod storage;
pub mod registries;
pub mod platforms;
pub mod services;
pub mod test_utils;

pub use config::BotConfig;
pub use storage::JsonStore;
pub use tzbot_common::error::Error;
