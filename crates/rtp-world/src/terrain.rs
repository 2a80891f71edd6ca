//! Terrain queries over a lazily generated world.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::block::Block;
use crate::chunk::{ChunkColumn, MAX_Y, MIN_Y};
use crate::generator::ChunkGenerator;
use crate::types::{BlockPos, ChunkPos};

/// Read-only terrain access used by the safe-location search.
///
/// Implementations load or generate terrain as needed. Two calls for the
/// same unmodified column must agree.
pub trait TerrainQuery: Send + Sync {
    /// Y a player would stand at on top of the highest motion-blocking
    /// block of column (x, z), looking through leaves when `ignore_foliage`.
    fn surface_height(&self, x: i32, z: i32, ignore_foliage: bool) -> i32;

    /// Nothing collidable and no fluid at `pos`.
    fn is_passable(&self, pos: BlockPos) -> bool;

    fn is_water(&self, pos: BlockPos) -> bool;

    /// Something collidable that is not a fluid at `pos`.
    fn is_solid_footing(&self, pos: BlockPos) -> bool;
}

/// A world whose chunks are generated on first access and cached for the session.
pub struct World {
    generator: Box<dyn ChunkGenerator>,
    chunks: RwLock<HashMap<ChunkPos, Arc<ChunkColumn>>>,
}

impl World {
    pub fn new(generator: Box<dyn ChunkGenerator>) -> Self {
        Self {
            generator,
            chunks: RwLock::new(HashMap::new()),
        }
    }

    /// Whether `y` lies inside the world's vertical range.
    pub fn contains_y(y: i32) -> bool {
        (MIN_Y..MAX_Y).contains(&y)
    }

    /// Block at `pos`; air outside the vertical range.
    pub fn block_at(&self, pos: BlockPos) -> Block {
        let chunk = self.chunk(pos.chunk_pos());
        chunk
            .get_block_world(local(pos.x), pos.y, local(pos.z))
            .unwrap_or(Block::Air)
    }

    /// Replace a block. Returns `false` if `pos` is outside the vertical range.
    pub fn set_block(&self, pos: BlockPos, block: Block) -> bool {
        if !Self::contains_y(pos.y) {
            return false;
        }
        let chunk_pos = pos.chunk_pos();
        // Make sure the chunk exists before taking the write lock.
        self.chunk(chunk_pos);
        let mut chunks = self.chunks.write();
        if let Some(chunk) = chunks.get_mut(&chunk_pos) {
            Arc::make_mut(chunk).set_block_world(local(pos.x), pos.y, local(pos.z), block);
        }
        true
    }

    pub fn loaded_chunks(&self) -> usize {
        self.chunks.read().len()
    }

    /// Fetch a chunk, generating it outside the lock if it is not cached yet.
    fn chunk(&self, chunk_pos: ChunkPos) -> Arc<ChunkColumn> {
        if let Some(chunk) = self.chunks.read().get(&chunk_pos) {
            return Arc::clone(chunk);
        }
        trace!("Generating chunk ({}, {})", chunk_pos.x, chunk_pos.z);
        let generated = Arc::new(self.generator.generate_chunk(chunk_pos.x, chunk_pos.z));
        let mut chunks = self.chunks.write();
        Arc::clone(chunks.entry(chunk_pos).or_insert(generated))
    }
}

fn local(coord: i32) -> usize {
    (coord & 15) as usize
}

impl TerrainQuery for World {
    fn surface_height(&self, x: i32, z: i32, ignore_foliage: bool) -> i32 {
        let chunk = self.chunk(BlockPos::new(x, 0, z).chunk_pos());
        chunk.surface_y(local(x), local(z), ignore_foliage)
    }

    fn is_passable(&self, pos: BlockPos) -> bool {
        self.block_at(pos).is_passable()
    }

    fn is_water(&self, pos: BlockPos) -> bool {
        self.block_at(pos).is_water()
    }

    fn is_solid_footing(&self, pos: BlockPos) -> bool {
        self.block_at(pos).is_solid()
    }
}
