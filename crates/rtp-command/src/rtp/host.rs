//! What the random-teleport command needs from the server hosting it.

use std::fmt;

use rtp_world::{BlockPos, Rotation, TerrainQuery, Vec3};

use crate::error::RelocationError;

/// Opaque identity of a connected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub i64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host runtime seen from the command.
///
/// Implementations must serialise mutations of one player's state:
/// [`RtpHost::relocate`] may be called from a worker thread while the host
/// is updating the same player elsewhere.
pub trait RtpHost: Send + Sync + 'static {
    /// The player is in a world they can be teleported out of
    /// (online, alive, not spectating).
    fn is_relocatable(&self, player: PlayerId) -> bool;

    fn position(&self, player: PlayerId) -> Option<Vec3>;

    fn rotation(&self, player: PlayerId) -> Option<Rotation>;

    fn terrain(&self) -> &dyn TerrainQuery;

    /// Move the player's feet to `pos`, facing `rotation`, as one update.
    fn relocate(
        &self,
        player: PlayerId,
        pos: BlockPos,
        rotation: Rotation,
    ) -> Result<(), RelocationError>;

    /// Fire-and-forget chat message to the player.
    fn send_message(&self, player: PlayerId, text: &str);
}
