use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use twilight_cache_inmemory::{InMemoryCache, ResourceType};
use twilight_gateway::{
    self as gateway,
    CloseFrame,
    Config,
    Event,
    EventTypeFlags,
    Intents,
    MessageSender,
    Shard,
    StreamExt,
};
use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_model::gateway::payload::incoming::{MessageCreate, Ready as ReadyPayload};
use twilight_model::guild::Permissions;

use tzbot_common::models::ChatMessage;

use crate::Error;
use crate::platforms::discord::gateway::DiscordGateway;
use crate::platforms::{ConnectionStatus, PlatformAuth, PlatformIntegration};

/// What the shard runners forward to the main loop.
#[derive(Debug, Clone)]
pub enum DiscordEvent {
    Ready { bot_user_id: String, bot_name: String },
    Message(ChatMessage),
}

/// Administrator capability of the author in the message's channel, from the
/// cache. DMs and anything the cache cannot resolve count as non-admin.
fn author_is_admin(cache: &InMemoryCache, msg: &MessageCreate) -> bool {
    if msg.guild_id.is_none() {
        return false;
    }
    match cache.permissions().in_channel(msg.author.id, msg.channel_id) {
        Ok(perms) => perms.contains(Permissions::ADMINISTRATOR),
        Err(e) => {
            debug!(user = %msg.author.id, "could not calculate permissions: {e}");
            false
        }
    }
}

/// Pulls events off one shard:
///   - updates the in-memory cache
///   - forwards READY and inbound chat messages to `tx`.
async fn shard_runner(
    mut shard: Shard,
    tx: UnboundedSender<DiscordEvent>,
    cache: Arc<InMemoryCache>,
) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => event,
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
                continue;
            }
        };
        cache.update(&event);

        let forwarded = match &event {
            Event::Ready(ready) => {
                let data: &ReadyPayload = ready.as_ref();
                info!(
                    "Shard {shard_id} => READY as {} (ID={})",
                    data.user.name, data.user.id
                );
                DiscordEvent::Ready {
                    bot_user_id: data.user.id.to_string(),
                    bot_name: data.user.name.clone(),
                }
            }
            Event::MessageCreate(msg_create) => {
                let msg: &MessageCreate = msg_create;
                DiscordEvent::Message(ChatMessage {
                    message_id: msg.id.to_string(),
                    channel_id: msg.channel_id.to_string(),
                    author_id: msg.author.id.to_string(),
                    author_name: msg.author.name.clone(),
                    text: msg.content.clone(),
                    author_is_admin: author_is_admin(&cache, msg),
                })
            }
            _ => {
                trace!("Shard {shard_id} => unhandled event: {:?}", event.kind());
                continue;
            }
        };

        if tx.send(forwarded).is_err() {
            warn!("Shard {shard_id} => event receiver dropped; stopping.");
            break;
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

pub struct DiscordPlatform {
    token: String,
    connection_status: ConnectionStatus,

    /// Filled by `connect`, emptied by `disconnect`.
    rx: Mutex<Option<UnboundedReceiver<DiscordEvent>>>,

    shard_tasks: Vec<JoinHandle<()>>,
    shard_senders: Vec<MessageSender>,

    http: Arc<HttpClient>,
    cache: Option<Arc<InMemoryCache>>,
}

impl DiscordPlatform {
    pub fn new(token: String) -> Self {
        let http = Arc::new(
            ClientBuilder::new()
                .token(token.clone())
                .timeout(Duration::from_secs(30))
                .build(),
        );
        Self {
            token,
            connection_status: ConnectionStatus::Disconnected,
            rx: Mutex::new(None),
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
            http,
            cache: None,
        }
    }

    /// Outbound side, usable before and after `connect`.
    pub fn gateway(&self) -> DiscordGateway {
        DiscordGateway::new(self.http.clone())
    }

    /// Waits for the next event from any shard. `None` once disconnected or
    /// every shard has stopped.
    pub async fn next_event(&self) -> Option<DiscordEvent> {
        let mut guard = self.rx.lock().await;
        match guard.as_mut() {
            Some(r) => r.recv().await,
            None => None,
        }
    }
}

#[async_trait]
impl PlatformAuth for DiscordPlatform {
    async fn authenticate(&mut self) -> Result<(), Error> {
        if self.token.trim().is_empty() {
            return Err(Error::Auth("Discord token is empty".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformIntegration for DiscordPlatform {
    async fn connect(&mut self) -> Result<(), Error> {
        if matches!(self.connection_status, ConnectionStatus::Connected) {
            info!("(DiscordPlatform) Already connected => skipping");
            return Ok(());
        }
        self.authenticate().await?;

        let (tx, rx) = unbounded_channel::<DiscordEvent>();
        {
            let mut guard = self.rx.lock().await;
            *guard = Some(rx);
        }

        // Guilds, channels, roles and members are enough to compute permissions.
        let cache = Arc::new(
            InMemoryCache::builder()
                .resource_types(
                    ResourceType::GUILD
                        | ResourceType::CHANNEL
                        | ResourceType::ROLE
                        | ResourceType::MEMBER,
                )
                .build(),
        );
        self.cache = Some(cache.clone());

        let config = Config::new(
            self.token.clone(),
            Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT,
        );

        let shards = match gateway::create_recommended(&self.http, config, |_, b| b.build()).await {
            Ok(shards) => shards,
            Err(e) => {
                self.connection_status = ConnectionStatus::Disconnected;
                *self.rx.lock().await = None;
                self.cache = None;
                return Err(Error::Platform(format!("create_recommended error: {e}")));
            }
        };

        for shard in shards {
            self.shard_senders.push(shard.sender());
            let handle = tokio::spawn(shard_runner(shard, tx.clone(), cache.clone()));
            self.shard_tasks.push(handle);
        }

        info!(shards = self.shard_tasks.len(), "(DiscordPlatform) connected");
        self.connection_status = ConnectionStatus::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), Error> {
        self.connection_status = ConnectionStatus::Disconnected;

        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        for task in &mut self.shard_tasks {
            let _ = task.await;
        }

        self.shard_senders.clear();
        self.shard_tasks.clear();
        self.cache = None;

        let mut guard = self.rx.lock().await;
        *guard = None;
        Ok(())
    }
}
