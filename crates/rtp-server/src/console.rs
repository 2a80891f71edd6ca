//! Console commands: player simulation plus the registry commands.

use std::sync::Arc;

use rtp_command::rtp::{RtpHandler, RtpHost, RtpReport};
use rtp_command::{CommandContext, CommandRegistry, PERMISSION_LEVEL_OWNER};
use rtp_world::Vec3;
use tokio::task::JoinHandle;
use tracing::info;

use crate::host::{GameMode, ServerHost};
use crate::permissions::PermissionManager;

/// Result of one console line.
#[derive(Default)]
pub struct ConsoleOutcome {
    /// Lines to print on the console.
    pub messages: Vec<String>,
    pub should_stop: bool,
    /// An accepted teleport still running on the worker pool.
    pub pending: Option<JoinHandle<RtpReport>>,
}

impl ConsoleOutcome {
    fn say(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
            ..Self::default()
        }
    }
}

pub struct Console {
    host: Arc<ServerHost>,
    handler: RtpHandler<ServerHost>,
    registry: CommandRegistry,
    permissions: PermissionManager,
}

impl Console {
    pub fn new(
        host: Arc<ServerHost>,
        handler: RtpHandler<ServerHost>,
        registry: CommandRegistry,
        permissions: PermissionManager,
    ) -> Self {
        Self {
            host,
            handler,
            registry,
            permissions,
        }
    }

    pub fn handle_line(&mut self, line: &str) -> ConsoleOutcome {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return ConsoleOutcome::default();
        };
        let command = command.trim_start_matches('/').to_lowercase();
        let args: Vec<&str> = parts.collect();

        match command.as_str() {
            "join" => self.cmd_join(&args),
            "leave" => self.cmd_leave(&args),
            "gamemode" => self.cmd_gamemode(&args),
            "op" => self.cmd_op(&args),
            "rtp" => self.cmd_rtp(&args),
            _ => self.run_registry(&command, &args),
        }
    }

    fn cmd_join(&self, args: &[&str]) -> ConsoleOutcome {
        let position = match args {
            [_] => None,
            [_, x, y, z] => match (x.parse::<f32>(), y.parse::<f32>(), z.parse::<f32>()) {
                (Ok(x), Ok(y), Ok(z)) => Some(Vec3::new(x, y, z)),
                _ => return ConsoleOutcome::say("Invalid coordinates"),
            },
            _ => return ConsoleOutcome::say("Usage: join <name> [x y z]"),
        };
        let name = args[0];
        match self.host.join(name, position) {
            Some(id) => ConsoleOutcome::say(format!("{name} joined the game (player {id})")),
            None => ConsoleOutcome::say(format!("{name} is already online")),
        }
    }

    fn cmd_leave(&self, args: &[&str]) -> ConsoleOutcome {
        let [name] = args else {
            return ConsoleOutcome::say("Usage: leave <name>");
        };
        match self.host.leave(name) {
            Some(_) => ConsoleOutcome::say(format!("{name} left the game")),
            None => ConsoleOutcome::say(format!("Player not found: {name}")),
        }
    }

    fn cmd_gamemode(&self, args: &[&str]) -> ConsoleOutcome {
        let [mode, name] = args else {
            return ConsoleOutcome::say(
                "Usage: gamemode <survival|creative|adventure|spectator> <name>",
            );
        };
        let Some(mode) = GameMode::parse(mode) else {
            return ConsoleOutcome::say(format!("Unknown game mode: {mode}"));
        };
        match self.host.find_by_name(name) {
            Some(id) if self.host.set_gamemode(id, mode) => {
                ConsoleOutcome::say(format!("Set {name}'s game mode to {mode}"))
            }
            _ => ConsoleOutcome::say(format!("Player not found: {name}")),
        }
    }

    fn cmd_op(&mut self, args: &[&str]) -> ConsoleOutcome {
        let (name, level) = match args {
            [name] => (*name, PERMISSION_LEVEL_OWNER),
            [name, level] => match level.parse::<u8>() {
                Ok(level) => (*name, level.min(PERMISSION_LEVEL_OWNER)),
                Err(_) => return ConsoleOutcome::say(format!("Invalid level: {level}")),
            },
            _ => return ConsoleOutcome::say("Usage: op <name> [level]"),
        };
        self.permissions.set_level(name, level);
        info!("Set operator level of {name} to {level}");
        ConsoleOutcome::say(format!("Set operator level of {name} to {level}"))
    }

    /// Run `/rtp` as the named player.
    fn cmd_rtp(&self, args: &[&str]) -> ConsoleOutcome {
        let [name] = args else {
            return ConsoleOutcome::say("Usage: rtp <name>");
        };
        let Some(id) = self.host.find_by_name(name) else {
            return ConsoleOutcome::say(format!("Player not found: {name}"));
        };
        let level = self.permissions.level_of(name);
        if !self.registry.is_permitted("rtp", level) {
            let denied = self.registry.execute(
                "rtp",
                &CommandContext {
                    sender_name: name.to_string(),
                    permission_level: level,
                    args: Vec::new(),
                },
            );
            for message in &denied.messages {
                self.host.send_message(id, message);
            }
            return ConsoleOutcome::default();
        }
        // Rejections have already been messaged to the player.
        match self.handler.handle_request(id) {
            Ok(job) => ConsoleOutcome {
                pending: Some(job),
                ..ConsoleOutcome::default()
            },
            Err(_) => ConsoleOutcome::default(),
        }
    }

    fn run_registry(&self, command: &str, args: &[&str]) -> ConsoleOutcome {
        let args = match command {
            "help" => {
                let mut help = self.registry.help_args(PERMISSION_LEVEL_OWNER);
                help.extend(
                    [
                        "join:<name> [x y z] Add a player",
                        "leave:<name> Remove a player",
                        "gamemode:<mode> <name> Change a player's game mode",
                        "op:<name> [level] Set a player's operator level",
                    ]
                    .map(String::from),
                );
                help
            }
            "list" => self.host.player_names(),
            _ => args.iter().map(|s| s.to_string()).collect(),
        };
        let ctx = CommandContext {
            sender_name: "Server".to_string(),
            permission_level: PERMISSION_LEVEL_OWNER,
            args,
        };
        let result = self.registry.execute(command, &ctx);
        ConsoleOutcome {
            messages: result.messages,
            should_stop: result.should_stop,
            pending: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtp_command::rtp::{CooldownLedger, RtpSettings};
    use rtp_world::{GeneratorKind, World};
    use tokio::runtime::Handle;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use crate::host::Outgoing;

    fn console(test: &str) -> (Console, Arc<ServerHost>, UnboundedReceiver<Outgoing>) {
        let world = Arc::new(World::new(GeneratorKind::Flat.build(0, &[])));
        let (tx, rx) = mpsc::unbounded_channel();
        let host = Arc::new(ServerHost::new(world, tx));
        let settings = RtpSettings {
            max_radius: 64,
            ..RtpSettings::default()
        };
        let handler = RtpHandler::new(
            Arc::clone(&host),
            Arc::new(CooldownLedger::default()),
            settings,
            Handle::current(),
        );
        let dir = std::env::temp_dir().join(format!("rtp_console_test_{}_{test}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let permissions = PermissionManager::load_from(dir.join("ops.json"), 0);
        let console = Console::new(Arc::clone(&host), handler, CommandRegistry::new(), permissions);
        (console, host, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Outgoing>) -> Vec<String> {
        let mut texts = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            texts.push(msg.text);
        }
        texts
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rtp_requires_operator_level() {
        let (mut console, _host, mut rx) = console("denied");
        console.handle_line("join Steve");
        let outcome = console.handle_line("rtp Steve");
        assert!(outcome.pending.is_none());
        assert_eq!(
            drain(&mut rx),
            vec!["You do not have permission to use this command"]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn operator_rtp_moves_player() {
        let (mut console, host, mut rx) = console("granted");
        console.handle_line("join Steve 0.5 4 0.5");
        console.handle_line("op Steve 2");
        let job = console.handle_line("/rtp Steve").pending.unwrap();
        let report = job.await.unwrap();
        assert!(report.relocation.is_ok());
        assert!(report.search.safe);

        let id = host.find_by_name("Steve").unwrap();
        let pos = host.player(id).unwrap().position;
        assert_eq!(pos.y, 4.0);
        assert!(pos.x.abs() <= 65.0 && pos.z.abs() <= 65.0);

        let texts = drain(&mut rx);
        assert_eq!(texts[0], "Calculating...");
        assert_eq!(texts[2], "Teleportation successful.");

        // Second request inside the cooldown.
        assert!(console.handle_line("rtp Steve").pending.is_none());
        let texts = drain(&mut rx);
        assert_eq!(texts, vec!["You must wait 180 seconds before using this command again."]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn spectator_is_refused() {
        let (mut console, _host, mut rx) = console("spectator");
        console.handle_line("join Alex");
        console.handle_line("op Alex");
        console.handle_line("gamemode spectator Alex");
        assert!(console.handle_line("rtp Alex").pending.is_none());
        assert_eq!(
            drain(&mut rx),
            vec!["This command can only be used by a player in a live world."]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn player_management_commands() {
        let (mut console, _host, _rx) = console("players");
        assert_eq!(console.handle_line("join Steve").messages[0], "Steve joined the game (player #1)");
        assert_eq!(console.handle_line("join Steve").messages[0], "Steve is already online");
        assert_eq!(console.handle_line("join Alex 1 x 2").messages[0], "Invalid coordinates");
        console.handle_line("join Alex");
        assert_eq!(
            console.handle_line("list").messages[0],
            "There are 2 players online: Alex, Steve"
        );
        assert_eq!(console.handle_line("leave Alex").messages[0], "Alex left the game");
        assert_eq!(console.handle_line("leave Alex").messages[0], "Player not found: Alex");
        assert_eq!(console.handle_line("rtp Nobody").messages[0], "Player not found: Nobody");
        assert!(console.handle_line("gamemode hardcore Steve").messages[0].contains("Unknown game mode"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn help_and_stop() {
        let (mut console, _host, _rx) = console("stop");
        let help = console.handle_line("help");
        assert!(help.messages.iter().any(|m| m.starts_with("  rtp - ")));
        assert!(help.messages.iter().any(|m| m.starts_with("  join - ")));
        assert!(console.handle_line("teleport").messages[0].starts_with("Unknown command"));
        assert!(console.handle_line("").messages.is_empty());
        assert!(console.handle_line("stop").should_stop);
    }
}
