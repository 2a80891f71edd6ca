//! Errors reported back to the player who ran `/rtp`.

use rtp_world::BlockPos;
use thiserror::Error;

use crate::rtp::PlayerId;

/// Why a random teleport request did not complete.
///
/// The `Display` text is what the player sees.
#[derive(Debug, Error)]
pub enum RtpError {
    #[error("This command can only be used by a player in a live world.")]
    NotRelocatable,

    #[error("You must wait {0} seconds before using this command again.")]
    OnCooldown(u64),

    #[error("Teleportation failed: {0}")]
    RelocationFailed(#[from] RelocationError),
}

/// Failure of the host's relocation primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelocationError {
    #[error("player {0} is no longer online")]
    PlayerNotFound(PlayerId),

    #[error("destination {0} is outside the world")]
    OutOfBounds(BlockPos),

    #[error("{0}")]
    Rejected(String),
}
