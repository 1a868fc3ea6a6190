use std::sync::Arc;

use async_trait::async_trait;
use twilight_http::Client as HttpClient;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, MessageMarker};

use tzbot_common::error::Error;
use tzbot_common::models::MessageRef;
use tzbot_common::traits::ChatGateway;

fn parse_id<T>(raw: &str, what: &str) -> Result<Id<T>, Error> {
    raw.parse::<u64>()
        .ok()
        .and_then(Id::new_checked)
        .ok_or_else(|| Error::Platform(format!("Invalid {what} ID: {raw}")))
}

/// `ChatGateway` backed by the twilight HTTP client.
#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<HttpClient>,
}

impl DiscordGateway {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatGateway for DiscordGateway {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<MessageRef, Error> {
        let channel: Id<ChannelMarker> = parse_id(channel_id, "channel")?;

        let sent = self
            .http
            .create_message(channel)
            .content(text)
            .await
            .map_err(|e| Error::Platform(format!("Error sending Discord message: {e:?}")))?
            .model()
            .await
            .map_err(|e| Error::Platform(format!("Error reading sent Discord message: {e:?}")))?;

        Ok(MessageRef::new(channel_id, sent.id.to_string()))
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), Error> {
        let channel: Id<ChannelMarker> = parse_id(&message.channel_id, "channel")?;
        let message_id: Id<MessageMarker> = parse_id(&message.message_id, "message")?;

        self.http
            .delete_message(channel, message_id)
            .await
            .map_err(|e| Error::Platform(format!("Error deleting Discord message: {e:?}")))?;
        Ok(())
    }
}
