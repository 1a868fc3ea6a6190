use tzbot_common::models::{AddOutcome, RemovalOutcome};

use crate::Error;
use crate::services::builtin_commands::{BuiltinCommand, CommandContext};

/// Accepts a raw id or a Discord mention (`<@123>` / `<@!123>`).
pub fn normalize_user_ref(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("<@")
        .and_then(|s| s.strip_suffix('>'))
        .map(|s| s.trim_start_matches('!'))
        .unwrap_or(trimmed)
}

pub async fn handle_whitelist_add(ctx: &CommandContext<'_>, args: &[String]) -> Result<String, Error> {
    let Some(user) = args.first().map(|a| normalize_user_ref(a)) else {
        return Ok(format!("Usage: {}", ctx.usage_line(BuiltinCommand::WhitelistAdd)));
    };
    let outcome = ctx.state.whitelist.write().await.add(user)?;
    Ok(match outcome {
        AddOutcome::Added => format!("User <@{user}> added to the whitelist."),
        AddOutcome::AlreadyPresent => format!("User <@{user}> is already whitelisted."),
    })
}

pub async fn handle_whitelist_remove(ctx: &CommandContext<'_>, args: &[String]) -> Result<String, Error> {
    let Some(user) = args.first().map(|a| normalize_user_ref(a)) else {
        return Ok(format!("Usage: {}", ctx.usage_line(BuiltinCommand::WhitelistRemove)));
    };
    let outcome = ctx.state.whitelist.write().await.remove(user)?;
    Ok(match outcome {
        RemovalOutcome::Removed => format!("User <@{user}> removed from the whitelist."),
        RemovalOutcome::NotFound => format!("User <@{user}> is not whitelisted."),
    })
}

pub async fn handle_whitelist_list(ctx: &CommandContext<'_>) -> String {
    let whitelist = ctx.state.whitelist.read().await;
    if whitelist.is_empty() {
        return "No users are whitelisted.".to_string();
    }
    let users: Vec<String> = whitelist.list().iter().map(|u| format!("<@{u}>")).collect();
    format!("Whitelisted users: {}", users.join(", "))
}
