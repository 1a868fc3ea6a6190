use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use tzbot_core::BotConfig;
use tzbot_core::config::{DEFAULT_COMMAND_PREFIX, DEFAULT_WARNING_DELAY_SECS};
use tzbot_core::platforms::discord::{DiscordEvent, DiscordPlatform};
use tzbot_core::platforms::PlatformIntegration;
use tzbot_core::services::ModerationService;

#[derive(Parser, Debug, Clone)]
#[command(name = "tzbot")]
#[command(author, version, about = "TZbot - restricts channels to preset message prefixes")]
struct Args {
    /// Directory holding restricted_channels.json, custom_commands.json and whitelist.json
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Prefix character(s) for built-in commands
    #[arg(long, default_value = DEFAULT_COMMAND_PREFIX)]
    prefix: String,

    /// Seconds before a restriction warning is deleted again
    #[arg(long, default_value_t = DEFAULT_WARNING_DELAY_SECS)]
    warning_delay_secs: u64,

    /// User id that is always treated as an administrator (repeatable)
    #[arg(long = "admin-id")]
    admin_ids: Vec<String>,
}

impl Args {
    fn into_config(self) -> BotConfig {
        BotConfig {
            data_dir: self.data_dir,
            command_prefix: self.prefix,
            warning_delay: Duration::from_secs(self.warning_delay_secs),
            admin_user_ids: self.admin_ids.into_iter().collect::<HashSet<_>>(),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("tzbot=info".parse().unwrap_or_default())
        .add_directive("tzbot_core=info".parse().unwrap_or_default());
    fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the variables may come from the environment.
    let _ = dotenv::dotenv();
    init_tracing();

    let args = Args::parse();
    info!(
        "TZbot starting. data_dir={}, prefix={}, warning_delay={}s",
        args.data_dir.display(), args.prefix, args.warning_delay_secs
    );

    let token = match std::env::var("BOT_TOKEN") {
        Ok(t) if !t.trim().is_empty() => t,
        _ => {
            error!("BOT_TOKEN environment variable not set!");
            bail!("BOT_TOKEN environment variable not set");
        }
    };

    run(args.into_config(), token).await
}

async fn run(config: BotConfig, token: String) -> anyhow::Result<()> {
    let mut platform = DiscordPlatform::new(token);
    let service = ModerationService::from_config(config, Arc::new(platform.gateway()))
        .context("loading moderation state")?;

    platform.connect().await.context("connecting to Discord")?;

    loop {
        tokio::select! {
            event = platform.next_event() => {
                match event {
                    Some(DiscordEvent::Ready { bot_user_id, bot_name }) => {
                        info!("{bot_name} is online!");
                        service.set_bot_user_id(bot_user_id).await;
                    }
                    Some(DiscordEvent::Message(message)) => {
                        // One message at a time; the service never fails a message.
                        service.handle_message(&message).await;
                    }
                    None => {
                        warn!("Discord event stream ended.");
                        break;
                    }
                }
            }
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    error!("Failed to listen for Ctrl-C: {:?}", e);
                }
                info!("Ctrl-C detected; shutting down...");
                break;
            }
        }
    }

    if let Err(e) = platform.disconnect().await {
        error!("Error during disconnect: {:?}", e);
    }
    info!("Main finished. Goodbye!");
    Ok(())
}
