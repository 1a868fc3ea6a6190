// File: tzbot-core/src/test_utils/helpers.rs

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tzbot_common::models::{ChatMessage, MessageRef};
use tzbot_common::traits::ChatGateway;

use crate::Error;
use crate::config::BotConfig;
use crate::services::ModerationService;

/// One call observed by `RecordingGateway`, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Send { channel_id: String, text: String, sent: MessageRef },
    Delete(MessageRef),
}

/// In-memory `ChatGateway` that records every call. Sends and deletes can be
/// made to fail per channel / per message id.
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    next_id: AtomicU64,
    failing_send_channels: Mutex<HashSet<String>>,
    failing_delete_ids: Mutex<HashSet<String>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(9000),
            ..Self::default()
        }
    }

    pub async fn fail_sends_in(&self, channel_id: &str) {
        self.failing_send_channels.lock().await.insert(channel_id.to_string());
    }

    pub async fn fail_deletes_of(&self, message_id: &str) {
        self.failing_delete_ids.lock().await.insert(message_id.to_string());
    }

    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().await.clone()
    }

    pub async fn sent_texts(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                GatewayCall::Send { text, .. } => Some(text.clone()),
                GatewayCall::Delete(_) => None,
            })
            .collect()
    }

    pub async fn deleted(&self) -> Vec<MessageRef> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                GatewayCall::Delete(m) => Some(m.clone()),
                GatewayCall::Send { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatGateway for RecordingGateway {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<MessageRef, Error> {
        if self.failing_send_channels.lock().await.contains(channel_id) {
            return Err(Error::Platform(format!("Missing access to channel {channel_id}")));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let sent = MessageRef::new(channel_id, id.to_string());
        self.calls.lock().await.push(GatewayCall::Send {
            channel_id: channel_id.to_string(),
            text: text.to_string(),
            sent: sent.clone(),
        });
        Ok(sent)
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), Error> {
        if self.failing_delete_ids.lock().await.contains(&message.message_id) {
            return Err(Error::Platform(format!("Unknown Message {}", message.message_id)));
        }
        self.calls.lock().await.push(GatewayCall::Delete(message.clone()));
        Ok(())
    }
}

pub const TEST_BOT_ID: &str = "1";
pub const TEST_ADMIN_ID: &str = "500";

/// A `ModerationService` over a throwaway data directory and a recording
/// gateway. Keep the struct alive for as long as the directory is needed.
pub struct TestBot {
    pub dir: TempDir,
    pub gateway: Arc<RecordingGateway>,
    pub service: ModerationService,
}

impl TestBot {
    pub async fn new() -> Result<Self, Error> {
        let dir = tempfile::tempdir()?;
        Self::in_dir(dir).await
    }

    /// Builds a bot over an existing directory, e.g. to simulate a restart.
    pub async fn in_dir(dir: TempDir) -> Result<Self, Error> {
        let mut config = BotConfig::with_data_dir(dir.path());
        config.warning_delay = Duration::from_millis(20);
        config.admin_user_ids.insert(TEST_ADMIN_ID.to_string());

        let gateway = Arc::new(RecordingGateway::new());
        let service = ModerationService::from_config(config, gateway.clone())?;
        service.set_bot_user_id(TEST_BOT_ID).await;
        Ok(Self { dir, gateway, service })
    }
}

/// Message with a fresh id from `author` in `channel`.
pub fn message(channel: &str, author: &str, text: &str) -> ChatMessage {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    let id = NEXT.fetch_add(1, Ordering::SeqCst);
    ChatMessage::new(id.to_string(), channel, author, text)
}

pub fn admin_message(channel: &str, text: &str) -> ChatMessage {
    message(channel, TEST_ADMIN_ID, text)
}
