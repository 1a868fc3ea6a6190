use crate::services::builtin_commands::{BuiltinCommand, CommandContext};

pub fn handle_help(ctx: &CommandContext<'_>) -> String {
    let mut lines = vec![
        "**TZbot** - restricts text in channels and allows only preset commands.".to_string(),
    ];
    for cmd in BuiltinCommand::ALL {
        if cmd.requires_admin() && !ctx.is_admin {
            continue;
        }
        lines.push(format!("{} - {}", ctx.usage_line(cmd), cmd.summary()));
    }
    lines.join("\n")
}
