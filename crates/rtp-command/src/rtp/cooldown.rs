//! Per-player cooldown between random teleports.

use std::time::Duration;

use dashmap::DashMap;

use super::PlayerId;

/// Default time between two teleports of the same player.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(180);

/// Outcome of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Allowed,
    Denied { seconds_remaining: u64 },
}

/// Last-use timestamps (milliseconds since the Unix epoch) per player.
///
/// Backed by a sharded map, so players on different shards never contend.
/// Entries live for the whole session.
pub struct CooldownLedger {
    duration_ms: u64,
    last_use: DashMap<PlayerId, u64>,
}

impl CooldownLedger {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration_ms: duration.as_millis() as u64,
            last_use: DashMap::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Check whether `player` may teleport at `now_ms`. Does not record anything.
    pub fn try_acquire(&self, player: PlayerId, now_ms: u64) -> CooldownStatus {
        let Some(last) = self.last_use.get(&player).map(|entry| *entry) else {
            return CooldownStatus::Allowed;
        };
        let elapsed = now_ms.saturating_sub(last);
        if elapsed >= self.duration_ms {
            return CooldownStatus::Allowed;
        }
        CooldownStatus::Denied {
            seconds_remaining: (self.duration_ms - elapsed).div_ceil(1000),
        }
    }

    /// Record a use at `now_ms`. A concurrent or stale write never moves the
    /// timestamp backwards.
    pub fn record(&self, player: PlayerId, now_ms: u64) {
        self.last_use
            .entry(player)
            .and_modify(|last| *last = (*last).max(now_ms))
            .or_insert(now_ms);
    }

    pub fn last_use(&self, player: PlayerId) -> Option<u64> {
        self.last_use.get(&player).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.last_use.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_use.is_empty()
    }

    /// Forget every entry, e.g. when a new session starts.
    pub fn clear(&self) {
        self.last_use.clear();
    }
}

impl Default for CooldownLedger {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
