use async_trait::async_trait;

use crate::error::Error;
use crate::models::MessageRef;

/// Outbound side of a chat platform. Both calls may fail with
/// `Error::Platform` (missing permission, unknown message, ...).
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<MessageRef, Error>;
    async fn delete_message(&self, message: &MessageRef) -> Result<(), Error>;
}
