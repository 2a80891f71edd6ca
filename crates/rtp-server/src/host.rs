//! Player table and world, exposed to the random-teleport command.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rtp_command::rtp::{PlayerId, RtpHost};
use rtp_command::RelocationError;
use rtp_world::{BlockPos, Rotation, TerrainQuery, Vec3, World};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl GameMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "survival" | "s" | "0" => Some(Self::Survival),
            "creative" | "c" | "1" => Some(Self::Creative),
            "adventure" | "a" | "2" => Some(Self::Adventure),
            "spectator" | "sp" | "3" => Some(Self::Spectator),
            _ => None,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Survival => "survival",
            Self::Creative => "creative",
            Self::Adventure => "adventure",
            Self::Spectator => "spectator",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub name: String,
    pub position: Vec3,
    pub rotation: Rotation,
    pub gamemode: GameMode,
}

/// A chat message on its way to a player.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub player: PlayerId,
    /// Recipient's name at send time.
    pub name: String,
    pub text: String,
}

pub struct ServerHost {
    world: Arc<World>,
    players: RwLock<HashMap<PlayerId, PlayerState>>,
    next_id: AtomicI64,
    outbox: UnboundedSender<Outgoing>,
}

impl ServerHost {
    pub fn new(world: Arc<World>, outbox: UnboundedSender<Outgoing>) -> Self {
        Self {
            world,
            players: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            outbox,
        }
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    /// Add a player at `position`, or standing on the surface at the origin.
    /// Returns `None` if the name is already online.
    pub fn join(&self, name: &str, position: Option<Vec3>) -> Option<PlayerId> {
        let position = position.unwrap_or_else(|| {
            let y = self.world.surface_height(0, 0, true);
            BlockPos::new(0, y, 0).to_feet()
        });
        let mut players = self.players.write();
        if players.values().any(|p| p.name.eq_ignore_ascii_case(name)) {
            return None;
        }
        let id = PlayerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        players.insert(
            id,
            PlayerState {
                name: name.to_string(),
                position,
                rotation: Rotation::default(),
                gamemode: GameMode::Survival,
            },
        );
        info!(
            "{name} joined as player {id} at ({:.1}, {:.1}, {:.1})",
            position.x, position.y, position.z
        );
        Some(id)
    }

    pub fn leave(&self, name: &str) -> Option<PlayerId> {
        let id = self.find_by_name(name)?;
        let removed = self.players.write().remove(&id)?;
        info!("{} left the game", removed.name);
        Some(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<PlayerId> {
        self.players
            .read()
            .iter()
            .find(|(_, p)| p.name.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }

    pub fn player(&self, id: PlayerId) -> Option<PlayerState> {
        self.players.read().get(&id).cloned()
    }

    pub fn set_gamemode(&self, id: PlayerId, mode: GameMode) -> bool {
        match self.players.write().get_mut(&id) {
            Some(p) => {
                p.gamemode = mode;
                true
            }
            None => false,
        }
    }

    /// Online player names, sorted.
    pub fn player_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.players.read().values().map(|p| p.name.clone()).collect();
        names.sort();
        names
    }
}

impl RtpHost for ServerHost {
    fn is_relocatable(&self, player: PlayerId) -> bool {
        self.players
            .read()
            .get(&player)
            .is_some_and(|p| p.gamemode != GameMode::Spectator)
    }

    fn position(&self, player: PlayerId) -> Option<Vec3> {
        self.players.read().get(&player).map(|p| p.position)
    }

    fn rotation(&self, player: PlayerId) -> Option<Rotation> {
        self.players.read().get(&player).map(|p| p.rotation)
    }

    fn terrain(&self) -> &dyn TerrainQuery {
        self.world.as_ref()
    }

    fn relocate(
        &self,
        player: PlayerId,
        pos: BlockPos,
        rotation: Rotation,
    ) -> Result<(), RelocationError> {
        if !World::contains_y(pos.y) {
            return Err(RelocationError::OutOfBounds(pos));
        }
        let mut players = self.players.write();
        let state = players
            .get_mut(&player)
            .ok_or(RelocationError::PlayerNotFound(player))?;
        state.position = pos.to_feet();
        state.rotation = rotation;
        debug!("Moved {} to {pos}", state.name);
        Ok(())
    }

    fn send_message(&self, player: PlayerId, text: &str) {
        let name = self
            .players
            .read()
            .get(&player)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| player.to_string());
        // The receiver only goes away at shutdown.
        let _ = self.outbox.send(Outgoing {
            player,
            name,
            text: text.to_string(),
        });
    }
}
