//! Overworld terrain generator.
//!
//! Rolling hills from octave Perlin noise, sand shores, oceans filled to sea
//! level, oak trees and short grass.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::block::Block;
use crate::chunk::{ChunkColumn, MIN_Y};
use crate::generator::ChunkGenerator;
use crate::noise::OctaveNoise;

/// Standard Minecraft sea level.
pub const SEA_LEVEL: i32 = 62;

/// Trees attempted per chunk.
const TREES_PER_CHUNK: u32 = 3;

pub struct OverworldGenerator {
    seed: u64,
    terrain_noise: OctaveNoise,
    detail_noise: OctaveNoise,
}

impl OverworldGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            terrain_noise: OctaveNoise::new(seed, 6, 2.0, 0.5),
            detail_noise: OctaveNoise::new(seed.wrapping_add(1000), 3, 2.0, 0.5),
        }
    }

    /// Y of the topmost terrain block (before water and vegetation) at a world column.
    pub fn terrain_height(&self, world_x: i32, world_z: i32) -> i32 {
        let nx = world_x as f64 / 128.0;
        let nz = world_z as f64 / 128.0;
        let base = self.terrain_noise.sample(nx, nz);
        let detail = self.detail_noise.sample(nx * 4.0, nz * 4.0) * 0.1;
        let height = 64.0 + (base + detail) * 24.0;
        (height.round() as i32).clamp(MIN_Y + 5, 250)
    }

    fn fill_column(&self, column: &mut ChunkColumn, lx: usize, lz: usize, surface_y: i32) {
        column.set_block_world(lx, MIN_Y, lz, Block::Bedrock);
        for y in (MIN_Y + 1)..(surface_y - 3) {
            column.set_block_world(lx, y, lz, Block::Stone);
        }

        let shore = surface_y <= SEA_LEVEL + 1;
        let (filler, top) = if surface_y < SEA_LEVEL - 4 {
            (Block::Gravel, Block::Gravel)
        } else if shore {
            (Block::Sand, Block::Sand)
        } else {
            (Block::Dirt, Block::GrassBlock)
        };
        for y in (surface_y - 3).max(MIN_Y + 1)..surface_y {
            column.set_block_world(lx, y, lz, filler);
        }
        column.set_block_world(lx, surface_y, lz, top);

        for y in (surface_y + 1)..=SEA_LEVEL {
            column.set_block_world(lx, y, lz, Block::Water);
        }
    }

    fn place_trees(&self, column: &mut ChunkColumn, heightmap: &[[i32; 16]; 16]) {
        let mut rng = chunk_rng(self.seed, column.x, column.z, 0x7EE5);
        for _ in 0..TREES_PER_CHUNK {
            let tx = rng.gen_range(2..14);
            let tz = rng.gen_range(2..14);
            let ground = heightmap[tx][tz];
            if ground <= SEA_LEVEL + 1
                || column.get_block_world(tx, ground, tz) != Some(Block::GrassBlock)
            {
                continue;
            }
            let trunk_height = rng.gen_range(4..7);
            self.place_oak(column, tx, ground + 1, tz, trunk_height);
        }
    }

    /// Trunk plus a 5x5x2 canopy (corners clipped) capped by a 3x3 layer.
    fn place_oak(&self, column: &mut ChunkColumn, x: usize, base_y: i32, z: usize, trunk: i32) {
        for dy in 0..trunk {
            column.set_block_world(x, base_y + dy, z, Block::OakLog);
        }
        let top_y = base_y + trunk;
        for (y, radius) in [(top_y, 1i32), (top_y - 1, 2), (top_y - 2, 2)] {
            for dx in -radius..=radius {
                for dz in -radius..=radius {
                    if radius == 2 && dx.abs() == 2 && dz.abs() == 2 {
                        continue;
                    }
                    let lx = x as i32 + dx;
                    let lz = z as i32 + dz;
                    if (0..16).contains(&lx) && (0..16).contains(&lz) {
                        set_if_air(column, lx as usize, y, lz as usize, Block::OakLeaves);
                    }
                }
            }
        }
    }

    fn place_vegetation(&self, column: &mut ChunkColumn, heightmap: &[[i32; 16]; 16]) {
        let mut rng = chunk_rng(self.seed, column.x, column.z, 0x9A55);
        for (lx, row) in heightmap.iter().enumerate() {
            for (lz, &surface_y) in row.iter().enumerate() {
                if column.get_block_world(lx, surface_y, lz) != Some(Block::GrassBlock) {
                    continue;
                }
                if rng.gen_range(0..8) == 0 {
                    set_if_air(column, lx, surface_y + 1, lz, Block::ShortGrass);
                }
            }
        }
    }
}

impl ChunkGenerator for OverworldGenerator {
    fn generate_chunk(&self, chunk_x: i32, chunk_z: i32) -> ChunkColumn {
        let mut column = ChunkColumn::new_air(chunk_x, chunk_z);

        let mut heightmap = [[0i32; 16]; 16];
        for (lx, row) in heightmap.iter_mut().enumerate() {
            for (lz, h) in row.iter_mut().enumerate() {
                *h = self.terrain_height(chunk_x * 16 + lx as i32, chunk_z * 16 + lz as i32);
            }
        }

        for (lx, row) in heightmap.iter().enumerate() {
            for (lz, &surface_y) in row.iter().enumerate() {
                self.fill_column(&mut column, lx, lz, surface_y);
            }
        }
        self.place_trees(&mut column, &heightmap);
        self.place_vegetation(&mut column, &heightmap);

        column
    }
}

fn set_if_air(column: &mut ChunkColumn, x: usize, y: i32, z: usize, block: Block) {
    if column.get_block_world(x, y, z) == Some(Block::Air) {
        column.set_block_world(x, y, z, block);
    }
}

fn chunk_rng(seed: u64, chunk_x: i32, chunk_z: i32, salt: u64) -> StdRng {
    StdRng::seed_from_u64(
        seed.wrapping_add((chunk_x as u64).wrapping_mul(341_873_128_712))
            .wrapping_add((chunk_z as u64).wrapping_mul(132_897_987_541))
            .wrapping_add(salt),
    )
}
