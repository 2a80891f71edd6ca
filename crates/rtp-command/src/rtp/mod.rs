//! Random teleport: cooldowns, safe-spot search, and the request pipeline.

pub mod cooldown;
pub mod finder;
pub mod handler;
pub mod host;

pub use cooldown::{CooldownLedger, CooldownStatus, DEFAULT_COOLDOWN};
pub use finder::{SafeLocationFinder, SearchOutcome, WaterAvoidance};
pub use handler::{RtpHandler, RtpReport, RtpSettings};
pub use host::{PlayerId, RtpHost};
