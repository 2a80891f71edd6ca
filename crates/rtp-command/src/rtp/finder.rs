//! Safe landing spot search around a random column.
//!
//! The surface height of the target column gives a first candidate. If water
//! is within `water_check_radius` of it, the surrounding square is scanned for
//! a dry, safe column and the candidate jumps there. When no such column
//! exists the candidate is raised one block at a time while it stands on
//! water. Finally the candidate is raised until it is safe. Both raising
//! passes share one attempt budget, so the search is bounded; if the budget
//! runs out the last candidate is used as a best effort.

use rand::Rng;
use rtp_world::{BlockPos, TerrainQuery, Vec3};
use tracing::{debug, trace};

/// Default half-width of the square the random target is drawn from.
pub const MAX_RADIUS: i32 = 5000;

/// Default number of one-block raises before giving up.
pub const MAX_ATTEMPTS: u32 = 10;

/// Default radius of the square checked for nearby water.
pub const WATER_CHECK_RADIUS: i32 = 3;

/// How the candidate got away from water, if it had to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterAvoidance {
    /// No water nearby.
    None,
    /// Jumped to a dry column in the surrounding square.
    Jumped,
    /// No dry column nearby; raised above the water instead.
    Raised,
}

/// Result of one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Where the player will be placed.
    pub position: BlockPos,
    /// The random column the search started from.
    pub target_x: i32,
    pub target_z: i32,
    /// One-block raises performed.
    pub attempts: u32,
    /// Whether `position` passed [`is_safe`]. `false` means best effort.
    pub safe: bool,
    pub water: WaterAvoidance,
}

/// Draw a random column with each axis offset by `[-max_radius, max_radius)`
/// from `origin`. A non-positive radius returns the origin's column.
pub fn random_target<R: Rng + ?Sized>(rng: &mut R, origin: Vec3, max_radius: i32) -> (i32, i32) {
    if max_radius <= 0 {
        return (origin.x as i32, origin.z as i32);
    }
    let dx = rng.gen_range(-max_radius..max_radius);
    let dz = rng.gen_range(-max_radius..max_radius);
    (
        (f64::from(origin.x) + f64::from(dx)) as i32,
        (f64::from(origin.z) + f64::from(dz)) as i32,
    )
}

/// A player can stand at `pos`: feet and head in passable, non-water blocks,
/// and solid non-fluid footing underneath.
pub fn is_safe<T: TerrainQuery + ?Sized>(terrain: &T, pos: BlockPos) -> bool {
    terrain.is_passable(pos)
        && !terrain.is_water(pos)
        && terrain.is_solid_footing(pos.below())
        && terrain.is_passable(pos.above())
}

/// Any column in the square of `radius` around `pos` has water just below `pos.y`.
pub fn is_near_water<T: TerrainQuery + ?Sized>(terrain: &T, pos: BlockPos, radius: i32) -> bool {
    square(radius).any(|(dx, dz)| terrain.is_water(pos.offset(dx, -1, dz)))
}

/// First column in the square of `radius` around `pos` whose surface is safe
/// and has no water around it.
pub fn find_nearby_dry<T: TerrainQuery + ?Sized>(
    terrain: &T,
    pos: BlockPos,
    radius: i32,
) -> Option<BlockPos> {
    square(radius).find_map(|(dx, dz)| {
        let (x, z) = (pos.x.wrapping_add(dx), pos.z.wrapping_add(dz));
        let candidate = BlockPos::new(x, terrain.surface_height(x, z, true), z);
        (!is_near_water(terrain, candidate, radius) && is_safe(terrain, candidate))
            .then_some(candidate)
    })
}

/// Offsets of a `(2r+1)²` square, row by row from `(-r, -r)`.
fn square(radius: i32) -> impl Iterator<Item = (i32, i32)> {
    let r = radius.max(0);
    (-r..=r).flat_map(move |dx| (-r..=r).map(move |dz| (dx, dz)))
}

/// Bounded local search for a safe landing spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeLocationFinder {
    pub max_attempts: u32,
    pub water_check_radius: i32,
}

impl Default for SafeLocationFinder {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            water_check_radius: WATER_CHECK_RADIUS,
        }
    }
}

impl SafeLocationFinder {
    /// Search from the surface of column (`x`, `z`). Never fails; check
    /// [`SearchOutcome::safe`] for the quality of the result.
    pub fn find<T: TerrainQuery + ?Sized>(&self, terrain: &T, x: i32, z: i32) -> SearchOutcome {
        let surface = terrain.surface_height(x, z, true);
        let mut candidate = BlockPos::new(x, surface, z);
        let mut attempts = 0;
        let mut water = WaterAvoidance::None;

        if is_near_water(terrain, candidate, self.water_check_radius) {
            match find_nearby_dry(terrain, candidate, self.water_check_radius) {
                Some(dry) => {
                    debug!("Water near {candidate}, moved to dry column at {dry}");
                    candidate = dry;
                    water = WaterAvoidance::Jumped;
                }
                None => {
                    while terrain.is_water(candidate.below()) && attempts < self.max_attempts {
                        candidate = candidate.above();
                        attempts += 1;
                    }
                    if attempts > 0 {
                        debug!("No dry column near ({x}, {z}), raised to {candidate}");
                        water = WaterAvoidance::Raised;
                    }
                }
            }
        }

        while !is_safe(terrain, candidate) && attempts < self.max_attempts {
            trace!("{candidate} is obstructed, moving up");
            candidate = candidate.above();
            attempts += 1;
        }

        SearchOutcome {
            position: candidate,
            target_x: x,
            target_z: z,
            attempts,
            safe: is_safe(terrain, candidate),
            water,
        }
    }
}
