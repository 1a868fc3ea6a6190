use serde::{Deserialize, Serialize};

/// Handle to a message that lives on the chat platform. Needed to delete it later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}

impl MessageRef {
    pub fn new(channel_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
        }
    }
}

/// An inbound chat message. Never persisted; it only lives while the
/// moderation pipeline evaluates it.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub message_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub author_name: String,
    pub text: String,

    /// Whether the platform reports the author as holding the
    /// administrator capability. Resolved by the platform runtime.
    pub author_is_admin: bool,
}

impl ChatMessage {
    pub fn new(
        message_id: impl Into<String>,
        channel_id: impl Into<String>,
        author_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let author_id = author_id.into();
        Self {
            message_id: message_id.into(),
            channel_id: channel_id.into(),
            author_name: author_id.clone(),
            author_id,
            text: text.into(),
            author_is_admin: false,
        }
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.author_is_admin = is_admin;
        self
    }

    pub fn message_ref(&self) -> MessageRef {
        MessageRef::new(self.channel_id.clone(), self.message_id.clone())
    }
}
