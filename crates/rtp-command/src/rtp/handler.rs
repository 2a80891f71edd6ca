//! The `/rtp` request pipeline.
//!
//! `handle_request` runs the cooldown check on the caller's thread and
//! acknowledges immediately. The search and the relocation then run as one
//! job on the runtime's blocking pool, so slow terrain generation never
//! stalls the thread that accepted the command. The finished job's
//! [`RtpReport`] comes back through the returned `JoinHandle`.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::cooldown::{CooldownLedger, CooldownStatus};
use super::finder::{random_target, SafeLocationFinder, SearchOutcome, MAX_RADIUS};
use super::host::{PlayerId, RtpHost};
use crate::error::{RelocationError, RtpError};

/// Tunables for one handler.
#[derive(Debug, Clone, Copy)]
pub struct RtpSettings {
    /// Half-width of the square the random column is drawn from.
    pub max_radius: i32,
    pub finder: SafeLocationFinder,
}

impl Default for RtpSettings {
    fn default() -> Self {
        Self {
            max_radius: MAX_RADIUS,
            finder: SafeLocationFinder::default(),
        }
    }
}

/// What happened to an accepted request.
#[derive(Debug)]
pub struct RtpReport {
    pub player: PlayerId,
    pub search: SearchOutcome,
    /// `Err` holds [`RtpError::RelocationFailed`].
    pub relocation: Result<(), RtpError>,
    /// From acceptance to the end of the relocation.
    pub elapsed: Duration,
}

/// Runs `/rtp` requests against a host.
pub struct RtpHandler<H: RtpHost> {
    host: Arc<H>,
    ledger: Arc<CooldownLedger>,
    settings: RtpSettings,
    runtime: Handle,
}

impl<H: RtpHost> RtpHandler<H> {
    /// `runtime` provides the worker pool searches run on.
    pub fn new(
        host: Arc<H>,
        ledger: Arc<CooldownLedger>,
        settings: RtpSettings,
        runtime: Handle,
    ) -> Self {
        Self {
            host,
            ledger,
            settings,
            runtime,
        }
    }

    pub fn ledger(&self) -> &Arc<CooldownLedger> {
        &self.ledger
    }

    pub fn settings(&self) -> &RtpSettings {
        &self.settings
    }

    /// Handle a request using the wall clock for the cooldown.
    pub fn handle_request(&self, player: PlayerId) -> Result<JoinHandle<RtpReport>, RtpError> {
        self.handle_request_at(player, unix_millis())
    }

    /// Handle a request made at `now_ms` (milliseconds since the Unix epoch).
    ///
    /// Rejections are messaged to the player and returned as `Err`; nothing
    /// is recorded in the ledger for them. An accepted request always
    /// completes with a report, even if the relocation itself fails.
    pub fn handle_request_at(
        &self,
        player: PlayerId,
        now_ms: u64,
    ) -> Result<JoinHandle<RtpReport>, RtpError> {
        let accepted = Instant::now();

        let origin = match self.host.position(player) {
            Some(pos) if self.host.is_relocatable(player) => pos,
            _ => return Err(self.reject(player, RtpError::NotRelocatable)),
        };

        if let CooldownStatus::Denied { seconds_remaining } =
            self.ledger.try_acquire(player, now_ms)
        {
            return Err(self.reject(player, RtpError::OnCooldown(seconds_remaining)));
        }

        self.host.send_message(player, "Calculating...");

        let (target_x, target_z) =
            random_target(&mut rand::thread_rng(), origin, self.settings.max_radius);
        info!(
            "Random teleport for player {player} from ({:.1}, {:.1}, {:.1}) towards column ({target_x}, {target_z})",
            origin.x, origin.y, origin.z
        );

        let job = TeleportJob {
            host: Arc::clone(&self.host),
            ledger: Arc::clone(&self.ledger),
            finder: self.settings.finder,
            player,
            target_x,
            target_z,
            requested_at_ms: now_ms,
            accepted,
        };
        Ok(self.runtime.spawn_blocking(move || job.run()))
    }

    fn reject(&self, player: PlayerId, err: RtpError) -> RtpError {
        debug!("Rejected random teleport for player {player}: {err}");
        self.host.send_message(player, &err.to_string());
        err
    }
}

/// Search and relocation for one accepted request.
struct TeleportJob<H: RtpHost> {
    host: Arc<H>,
    ledger: Arc<CooldownLedger>,
    finder: SafeLocationFinder,
    player: PlayerId,
    target_x: i32,
    target_z: i32,
    requested_at_ms: u64,
    accepted: Instant,
}

impl<H: RtpHost> TeleportJob<H> {
    fn run(self) -> RtpReport {
        let player = self.player;

        let search = self
            .finder
            .find(self.host.terrain(), self.target_x, self.target_z);
        if !search.safe {
            warn!(
                "No safe spot found for player {player} near ({}, {}) after {} attempts, using {}",
                search.target_x, search.target_z, search.attempts, search.position
            );
        }
        let pos = search.position;
        self.host.send_message(
            player,
            &format!("Teleporting to: X: {}, Y: {}, Z: {}", pos.x, pos.y, pos.z),
        );

        self.ledger.record(player, self.requested_at_ms);
        let relocation = match self.host.rotation(player) {
            Some(rotation) => self.host.relocate(player, pos, rotation),
            None => Err(RelocationError::PlayerNotFound(player)),
        }
        .map_err(RtpError::from);

        match &relocation {
            Ok(()) => self.host.send_message(player, "Teleportation successful."),
            Err(e) => {
                warn!("Random teleport of player {player} to {pos} failed: {e}");
                self.host.send_message(player, &e.to_string());
            }
        }

        let elapsed = self.accepted.elapsed();
        self.host.send_message(
            player,
            &format!("Command executed in {} ms.", elapsed.as_millis()),
        );
        info!(
            "Random teleport for player {player} finished in {elapsed:?} at {pos} (safe: {})",
            search.safe
        );

        RtpReport {
            player,
            search,
            relocation,
            elapsed,
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
