use tzbot_common::models::{AddOutcome, PrefixRemoval, RemovalOutcome};

use crate::Error;
use crate::services::builtin_commands::{BuiltinCommand, CommandContext};

pub async fn handle_restrict_channel(ctx: &CommandContext<'_>, args: &[String]) -> Result<String, Error> {
    if args.is_empty() {
        return Ok(format!(
            "Please provide commands to allow. Example: `{p}restrict_channel \"{p}buy 5\" \"{p}buy 10\" {p}shop`",
            p = ctx.prefix
        ));
    }

    let mut restrictions = ctx.state.restrictions.write().await;
    restrictions.restrict(ctx.channel_id, args)?;
    let allowed = restrictions
        .allowed_prefixes(ctx.channel_id)
        .unwrap_or_default()
        .join(", ");
    Ok(format!("Channel restricted. Only these commands are allowed: {allowed}"))
}

/// Shared by `unrestrict_channel` and `clear_allowed_list`; they differ only
/// in wording.
pub async fn handle_unrestrict_channel(ctx: &CommandContext<'_>, as_clear: bool) -> Result<String, Error> {
    let outcome = ctx.state.restrictions.write().await.unrestrict(ctx.channel_id)?;
    let reply = match (outcome, as_clear) {
        (RemovalOutcome::Removed, false) => "Channel restrictions removed.",
        (RemovalOutcome::Removed, true) => "All allowed commands cleared. Channel is now unrestricted.",
        (RemovalOutcome::NotFound, false) => "This channel is not restricted.",
        (RemovalOutcome::NotFound, true) => "This channel has no restrictions to clear.",
    };
    Ok(reply.to_string())
}

pub async fn handle_check_restrictions(ctx: &CommandContext<'_>) -> String {
    let restrictions = ctx.state.restrictions.read().await;
    match restrictions.allowed_prefixes(ctx.channel_id) {
        Some(allowed) => format!("This channel is restricted. Allowed: {}", allowed.join(", ")),
        None => "This channel is not restricted.".to_string(),
    }
}

pub async fn handle_add_allowed_cmd(ctx: &CommandContext<'_>, args: &[String]) -> Result<String, Error> {
    let Some(prefix) = args.first() else {
        return Ok(format!("Usage: {}", ctx.usage_line(BuiltinCommand::AddAllowedCmd)));
    };
    let outcome = ctx.state.restrictions.write().await.add_prefix(ctx.channel_id, prefix)?;
    Ok(match outcome {
        AddOutcome::Added => format!("Added '{prefix}' to allowed commands."),
        AddOutcome::AlreadyPresent => format!("'{prefix}' is already allowed."),
    })
}

pub async fn handle_remove_allowed_cmd(ctx: &CommandContext<'_>, args: &[String]) -> Result<String, Error> {
    let Some(prefix) = args.first() else {
        return Ok(format!("Usage: {}", ctx.usage_line(BuiltinCommand::RemoveAllowedCmd)));
    };
    let outcome = ctx.state.restrictions.write().await.remove_prefix(ctx.channel_id, prefix)?;
    Ok(match outcome {
        PrefixRemoval::Removed => format!("Removed '{prefix}' from allowed commands."),
        PrefixRemoval::RemovedLast => {
            format!("Removed '{prefix}' from allowed commands. Channel is now unrestricted.")
        }
        PrefixRemoval::NotPresent => format!("'{prefix}' is not in the allowed list."),
    })
}

pub async fn handle_clear_all_restrictions(ctx: &CommandContext<'_>) -> Result<String, Error> {
    let cleared = ctx.state.restrictions.write().await.clear()?;
    Ok(format!("All channel restrictions cleared ({cleared} channel(s))."))
}
