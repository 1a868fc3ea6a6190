use tzbot_common::models::RemovalOutcome;

use crate::Error;
use crate::services::builtin_commands::{BuiltinCommand, CommandContext};
use crate::services::command_parser::split_first_argument;

/// `add_command <trigger> <response...>`: the response is taken verbatim
/// from the rest of the message.
pub async fn handle_add_command(ctx: &CommandContext<'_>, raw_args: &str) -> Result<String, Error> {
    let Some((trigger, response)) = split_first_argument(raw_args)
        .filter(|(_, response)| !response.trim().is_empty())
    else {
        return Ok(format!("Usage: {}", ctx.usage_line(BuiltinCommand::AddCommand)));
    };

    let previous = ctx.state.custom_commands.write().await.set(&trigger, response)?;
    Ok(match previous {
        Some(_) => format!("Custom command '{trigger}' updated."),
        None => format!("Custom command '{trigger}' added."),
    })
}

pub async fn handle_remove_command(ctx: &CommandContext<'_>, args: &[String]) -> Result<String, Error> {
    let Some(trigger) = args.first() else {
        return Ok(format!("Usage: {}", ctx.usage_line(BuiltinCommand::RemoveCommand)));
    };
    let outcome = ctx.state.custom_commands.write().await.remove(trigger)?;
    Ok(match outcome {
        RemovalOutcome::Removed => format!("Custom command '{trigger}' removed."),
        RemovalOutcome::NotFound => format!("Command '{trigger}' not found."),
    })
}

pub async fn handle_list_commands(ctx: &CommandContext<'_>) -> String {
    let commands = ctx.state.custom_commands.read().await;
    if commands.is_empty() {
        return "No custom commands available.".to_string();
    }
    let names: Vec<&str> = commands.list().keys().map(String::as_str).collect();
    format!("Available custom commands: {}", names.join(", "))
}
