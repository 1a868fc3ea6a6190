// File: tzbot-core/src/services/builtin_commands/mod.rs
//! Built-in `!` commands. Each group lives in its own file; the service only
//! calls `handle_builtin_command`.

pub mod restriction_commands;
pub mod custom_commands;
pub mod whitelist_commands;
pub mod help_command;

use tracing::{debug, info};
use tzbot_common::models::CommandInvocation;

use crate::Error;
use crate::services::moderation_state::ModerationState;
use crate::services::builtin_commands::{
    custom_commands::{handle_add_command, handle_list_commands, handle_remove_command},
    help_command::handle_help,
    restriction_commands::{
        handle_add_allowed_cmd,
        handle_check_restrictions,
        handle_clear_all_restrictions,
        handle_remove_allowed_cmd,
        handle_restrict_channel,
        handle_unrestrict_channel,
    },
    whitelist_commands::{handle_whitelist_add, handle_whitelist_list, handle_whitelist_remove},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinCommand {
    RestrictChannel,
    UnrestrictChannel,
    ClearAllowedList,
    CheckRestrictions,
    AddAllowedCmd,
    RemoveAllowedCmd,
    ClearAllRestrictions,
    AddCommand,
    RemoveCommand,
    ListCommands,
    WhitelistAdd,
    WhitelistRemove,
    WhitelistList,
    ReloadData,
    Help,
}

impl BuiltinCommand {
    pub const ALL: [BuiltinCommand; 15] = [
        BuiltinCommand::RestrictChannel,
        BuiltinCommand::UnrestrictChannel,
        BuiltinCommand::ClearAllowedList,
        BuiltinCommand::CheckRestrictions,
        BuiltinCommand::AddAllowedCmd,
        BuiltinCommand::RemoveAllowedCmd,
        BuiltinCommand::ClearAllRestrictions,
        BuiltinCommand::AddCommand,
        BuiltinCommand::RemoveCommand,
        BuiltinCommand::ListCommands,
        BuiltinCommand::WhitelistAdd,
        BuiltinCommand::WhitelistRemove,
        BuiltinCommand::WhitelistList,
        BuiltinCommand::ReloadData,
        BuiltinCommand::Help,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinCommand::RestrictChannel => "restrict_channel",
            BuiltinCommand::UnrestrictChannel => "unrestrict_channel",
            BuiltinCommand::ClearAllowedList => "clear_allowed_list",
            BuiltinCommand::CheckRestrictions => "check_restrictions",
            BuiltinCommand::AddAllowedCmd => "add_allowed_cmd",
            BuiltinCommand::RemoveAllowedCmd => "remove_allowed_cmd",
            BuiltinCommand::ClearAllRestrictions => "clear_all_restrictions",
            BuiltinCommand::AddCommand => "add_command",
            BuiltinCommand::RemoveCommand => "remove_command",
            BuiltinCommand::ListCommands => "list_commands",
            BuiltinCommand::WhitelistAdd => "whitelist_add",
            BuiltinCommand::WhitelistRemove => "whitelist_remove",
            BuiltinCommand::WhitelistList => "whitelist_list",
            BuiltinCommand::ReloadData => "reload_data",
            BuiltinCommand::Help => "help",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(BuiltinCommand::name)
    }

    pub fn requires_admin(self) -> bool {
        !matches!(
            self,
            BuiltinCommand::ListCommands
                | BuiltinCommand::WhitelistList
                | BuiltinCommand::Help
        )
    }

    /// Argument synopsis shown in usage and help replies.
    pub fn usage(self) -> &'static str {
        match self {
            BuiltinCommand::RestrictChannel => "<prefix> [prefix...]",
            BuiltinCommand::AddAllowedCmd | BuiltinCommand::RemoveAllowedCmd => "<prefix>",
            BuiltinCommand::AddCommand => "<trigger> <response>",
            BuiltinCommand::RemoveCommand => "<trigger>",
            BuiltinCommand::WhitelistAdd | BuiltinCommand::WhitelistRemove => "<user>",
            _ => "",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            BuiltinCommand::RestrictChannel => "only allow messages starting with the given prefixes here",
            BuiltinCommand::UnrestrictChannel => "remove this channel's restriction",
            BuiltinCommand::ClearAllowedList => "clear this channel's allowed list (unrestricts it)",
            BuiltinCommand::CheckRestrictions => "show this channel's allowed prefixes",
            BuiltinCommand::AddAllowedCmd => "allow one more prefix here",
            BuiltinCommand::RemoveAllowedCmd => "stop allowing a prefix here",
            BuiltinCommand::ClearAllRestrictions => "unrestrict every channel",
            BuiltinCommand::AddCommand => "add or replace a custom command",
            BuiltinCommand::RemoveCommand => "remove a custom command",
            BuiltinCommand::ListCommands => "list custom commands",
            BuiltinCommand::WhitelistAdd => "exempt a user from channel restrictions",
            BuiltinCommand::WhitelistRemove => "stop exempting a user",
            BuiltinCommand::WhitelistList => "list exempt users",
            BuiltinCommand::ReloadData => "reload all tables from disk",
            BuiltinCommand::Help => "show this help",
        }
    }
}

/// Context passed to built-in command handlers.
pub struct CommandContext<'a> {
    pub channel_id: &'a str,
    pub author_id: &'a str,
    pub is_admin: bool,
    pub prefix: &'a str,
    pub state: &'a ModerationState,
}

impl CommandContext<'_> {
    pub fn usage_line(&self, cmd: BuiltinCommand) -> String {
        let usage = cmd.usage();
        if usage.is_empty() {
            format!("`{}{}`", self.prefix, cmd.name())
        } else {
            format!("`{}{} {}`", self.prefix, cmd.name(), usage)
        }
    }
}

/// Runs a routed command and returns the reply text. Validation failures
/// come back as `Error::Validation` so the caller can show them verbatim.
pub async fn handle_builtin_command(
    invocation: &CommandInvocation,
    ctx: &CommandContext<'_>,
) -> Result<Option<String>, Error> {
    let Some(cmd) = BuiltinCommand::from_name(&invocation.name) else {
        debug!("No built-in command named '{}'", invocation.name);
        return Ok(None);
    };

    if cmd.requires_admin() && !ctx.is_admin {
        info!(user = %ctx.author_id, command = cmd.name(), "rejected non-admin command");
        return Ok(Some(format!(
            "You need administrator permission to use `{}{}`.",
            ctx.prefix,
            cmd.name()
        )));
    }

    let reply = match cmd {
        BuiltinCommand::RestrictChannel => handle_restrict_channel(ctx, &invocation.args).await?,
        BuiltinCommand::UnrestrictChannel => handle_unrestrict_channel(ctx, false).await?,
        BuiltinCommand::ClearAllowedList => handle_unrestrict_channel(ctx, true).await?,
        BuiltinCommand::CheckRestrictions => handle_check_restrictions(ctx).await,
        BuiltinCommand::AddAllowedCmd => handle_add_allowed_cmd(ctx, &invocation.args).await?,
        BuiltinCommand::RemoveAllowedCmd => handle_remove_allowed_cmd(ctx, &invocation.args).await?,
        BuiltinCommand::ClearAllRestrictions => handle_clear_all_restrictions(ctx).await?,
        BuiltinCommand::AddCommand => handle_add_command(ctx, &invocation.raw_args).await?,
        BuiltinCommand::RemoveCommand => handle_remove_command(ctx, &invocation.args).await?,
        BuiltinCommand::ListCommands => handle_list_commands(ctx).await,
        BuiltinCommand::WhitelistAdd => handle_whitelist_add(ctx, &invocation.args).await?,
        BuiltinCommand::WhitelistRemove => handle_whitelist_remove(ctx, &invocation.args).await?,
        BuiltinCommand::WhitelistList => handle_whitelist_list(ctx).await,
        BuiltinCommand::ReloadData => {
            ctx.state.reload_all().await?;
            "All data reloaded from files.".to_string()
        }
        BuiltinCommand::Help => handle_help(ctx),
    };

    Ok(Some(reply))
}
