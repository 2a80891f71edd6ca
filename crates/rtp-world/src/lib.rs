//! World management: blocks, chunks, generation, and terrain queries.

pub mod block;
pub mod chunk;
pub mod flat_generator;
pub mod generator;
pub mod noise;
pub mod overworld_generator;
pub mod terrain;
pub mod types;

pub use block::Block;
pub use generator::{ChunkGenerator, GeneratorKind};
pub use terrain::{TerrainQuery, World};
pub use types::{BlockPos, ChunkPos, Rotation, Vec3};
