//! Command registry and the random teleport (`/rtp`) command.

pub mod error;
pub mod rtp;

use std::collections::HashMap;

pub use error::{RelocationError, RtpError};

/// Lowest operator level (ordinary players).
pub const PERMISSION_LEVEL_ALL: u8 = 0;

/// Level required for `/rtp`.
pub const RTP_PERMISSION_LEVEL: u8 = 2;

/// Highest operator level.
pub const PERMISSION_LEVEL_OWNER: u8 = 4;

/// Context passed to a command handler.
pub struct CommandContext {
    /// Name of the player executing the command.
    pub sender_name: String,
    /// Operator level of the sender, 0 to 4.
    pub permission_level: u8,
    /// Arguments after the command name.
    pub args: Vec<String>,
}

/// Result returned by a command handler.
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,
    /// Messages to send back to the command sender.
    pub messages: Vec<String>,
    /// If true, the server should shut down.
    pub should_stop: bool,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            messages: vec![message.into()],
            should_stop: false,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![message.into()],
            should_stop: false,
        }
    }
}

/// Function pointer type for command handlers.
pub type CommandFn = fn(&CommandContext) -> CommandResult;

/// A registered command.
pub struct CommandEntry {
    pub name: String,
    pub description: String,
    /// Minimum operator level needed to run it.
    pub permission_level: u8,
    pub handler: CommandFn,
}

/// Registry of available commands.
pub struct CommandRegistry {
    commands: HashMap<String, CommandEntry>,
}

impl CommandRegistry {
    /// A registry with `help`, `list`, `stop`, and `rtp`.
    ///
    /// `rtp` needs host state, so only its name, description and permission
    /// level live here; the server runs it itself.
    pub fn new() -> Self {
        let mut registry = Self {
            commands: HashMap::new(),
        };
        registry.register("help", "List available commands", PERMISSION_LEVEL_ALL, cmd_help);
        registry.register("list", "Show online players", PERMISSION_LEVEL_ALL, cmd_list);
        registry.register("stop", "Stop the server", PERMISSION_LEVEL_OWNER, cmd_stop);
        registry.register_stub(
            "rtp",
            "Teleport to a random safe location",
            RTP_PERMISSION_LEVEL,
        );
        registry
    }

    /// Register a command whose work is done by the server, not the registry.
    pub fn register_stub(&mut self, name: &str, description: &str, permission_level: u8) {
        self.register(name, description, permission_level, |_| {
            CommandResult::err("This command is handled internally.")
        });
    }

    fn register(&mut self, name: &str, description: &str, permission_level: u8, handler: CommandFn) {
        self.commands.insert(
            name.to_string(),
            CommandEntry {
                name: name.to_string(),
                description: description.to_string(),
                permission_level,
                handler,
            },
        );
    }

    /// Whether a sender at `level` may run `name`. Unknown commands are never permitted.
    pub fn is_permitted(&self, name: &str, level: u8) -> bool {
        self.commands
            .get(name)
            .is_some_and(|entry| level >= entry.permission_level)
    }

    /// Execute a command by name, enforcing its permission level.
    pub fn execute(&self, name: &str, ctx: &CommandContext) -> CommandResult {
        match self.commands.get(name) {
            Some(entry) if ctx.permission_level < entry.permission_level => {
                CommandResult::err("You do not have permission to use this command")
            }
            Some(entry) => (entry.handler)(ctx),
            None => CommandResult::err(format!(
                "Unknown command: {name}. Type help for a list of commands."
            )),
        }
    }

    /// `name:description` pairs visible at `level`, sorted by name, as `help` expects them.
    pub fn help_args(&self, level: u8) -> Vec<String> {
        let mut entries: Vec<&CommandEntry> = self
            .commands
            .values()
            .filter(|e| level >= e.permission_level)
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
            .into_iter()
            .map(|e| format!("{}:{}", e.name, e.description))
            .collect()
    }

    pub fn get_commands(&self) -> &HashMap<String, CommandEntry> {
        &self.commands
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Built-in commands
// ---------------------------------------------------------------------------

fn cmd_help(ctx: &CommandContext) -> CommandResult {
    // The server injects "name:description" pairs as args.
    let mut lines = vec!["Available commands:".to_string()];
    for arg in &ctx.args {
        if let Some((name, desc)) = arg.split_once(':') {
            lines.push(format!("  {name} - {desc}"));
        }
    }
    CommandResult {
        success: true,
        messages: lines,
        should_stop: false,
    }
}

fn cmd_list(ctx: &CommandContext) -> CommandResult {
    // args contains the online player names (injected by the server).
    let count = ctx.args.len();
    let names = if ctx.args.is_empty() {
        String::new()
    } else {
        format!(": {}", ctx.args.join(", "))
    };
    CommandResult::ok(format!(
        "There {verb} {count} player{s} online{names}",
        verb = if count == 1 { "is" } else { "are" },
        s = if count == 1 { "" } else { "s" },
    ))
}

fn cmd_stop(_ctx: &CommandContext) -> CommandResult {
    CommandResult {
        success: true,
        messages: vec!["Stopping the server...".to_string()],
        should_stop: true,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ctx(level: u8, args: Vec<&str>) -> CommandContext {
        CommandContext {
            sender_name: "Steve".to_string(),
            permission_level: level,
            args: args.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn registry_has_builtins_and_rtp() {
        let reg = CommandRegistry::new();
        assert_eq!(reg.get_commands().len(), 4);
        for name in ["help", "list", "stop", "rtp"] {
            assert!(reg.get_commands().contains_key(name), "{name}");
        }
        assert_eq!(reg.get_commands()["rtp"].permission_level, RTP_PERMISSION_LEVEL);
    }

    #[test]
    fn unknown_command() {
        let reg = CommandRegistry::new();
        let result = reg.execute("teleport", &make_ctx(PERMISSION_LEVEL_OWNER, vec![]));
        assert!(!result.success);
        assert!(result.messages[0].contains("Unknown command"));
    }

    #[test]
    fn rtp_permission_gate() {
        let reg = CommandRegistry::new();
        assert!(!reg.is_permitted("rtp", 0));
        assert!(!reg.is_permitted("rtp", 1));
        assert!(reg.is_permitted("rtp", 2));
        assert!(reg.is_permitted("rtp", 4));
        assert!(!reg.is_permitted("nope", 4));
    }

    #[test]
    fn execute_refuses_low_level() {
        let reg = CommandRegistry::new();
        let result = reg.execute("stop", &make_ctx(2, vec![]));
        assert!(!result.success);
        assert!(!result.should_stop);
        assert!(result.messages[0].contains("permission"));
    }

    #[test]
    fn rtp_stub_is_not_run_by_registry() {
        let reg = CommandRegistry::new();
        let result = reg.execute("rtp", &make_ctx(RTP_PERMISSION_LEVEL, vec![]));
        assert!(!result.success);
        assert!(result.messages[0].contains("handled internally"));
    }

    #[test]
    fn help_lists_visible_commands() {
        let reg = CommandRegistry::new();
        let args = reg.help_args(0);
        assert_eq!(args, vec!["help:List available commands", "list:Show online players"]);

        let owner_args = reg.help_args(PERMISSION_LEVEL_OWNER);
        assert_eq!(owner_args.len(), 4);
        let result = reg.execute(
            "help",
            &make_ctx(0, owner_args.iter().map(String::as_str).collect()),
        );
        assert!(result.success);
        assert_eq!(result.messages[0], "Available commands:");
        assert!(result.messages.iter().any(|m| m.contains("rtp - Teleport")));
    }

    #[test]
    fn list_counts_players() {
        let reg = CommandRegistry::new();
        let empty = reg.execute("list", &make_ctx(0, vec![]));
        assert!(empty.messages[0].contains("0 players online"));
        let one = reg.execute("list", &make_ctx(0, vec!["Steve"]));
        assert_eq!(one.messages[0], "There is 1 player online: Steve");
        let two = reg.execute("list", &make_ctx(0, vec!["Steve", "Alex"]));
        assert_eq!(two.messages[0], "There are 2 players online: Steve, Alex");
    }

    #[test]
    fn stop_flags_shutdown() {
        let reg = CommandRegistry::new();
        let result = reg.execute("stop", &make_ctx(PERMISSION_LEVEL_OWNER, vec![]));
        assert!(result.success);
        assert!(result.should_stop);
    }
}
