//! Chunk and sub-chunk data structures.

use crate::block::Block;

/// Sub-chunks per column: Y range [-64, 319] = 384 blocks / 16 = 24.
pub const SUB_CHUNK_COUNT: usize = 24;

/// Minimum Y coordinate of the world.
pub const MIN_Y: i32 = -64;

/// One past the highest Y coordinate of the world.
pub const MAX_Y: i32 = MIN_Y + (SUB_CHUNK_COUNT as i32) * 16;

/// A 16x16x16 sub-chunk with a single block storage layer.
#[derive(Clone)]
pub struct SubChunk {
    /// Palette indices for each block, stored in XZY order: `(x*16 + z)*16 + y`.
    blocks: Box<[u16; 4096]>,
    palette: Vec<Block>,
}

impl SubChunk {
    /// Create a sub-chunk filled entirely with a single block.
    pub fn new_single(block: Block) -> Self {
        Self {
            blocks: Box::new([0; 4096]),
            palette: vec![block],
        }
    }

    /// `x`, `y`, `z` must each be in `[0, 15]`.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block: Block) {
        debug_assert!(x < 16 && y < 16 && z < 16);
        let palette_index = match self.palette.iter().position(|&b| b == block) {
            Some(idx) => idx,
            None => {
                self.palette.push(block);
                self.palette.len() - 1
            }
        };
        self.blocks[index(x, y, z)] = palette_index as u16;
    }

    pub fn get_block(&self, x: usize, y: usize, z: usize) -> Block {
        let palette_index = self.blocks[index(x, y, z)] as usize;
        self.palette[palette_index]
    }

    /// Whether every block in this sub-chunk is `block`.
    pub fn is_uniform(&self, block: Block) -> bool {
        match self.palette.as_slice() {
            [only] => *only == block,
            _ => self.blocks.iter().all(|&i| self.palette[i as usize] == block),
        }
    }

    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }
}

fn index(x: usize, y: usize, z: usize) -> usize {
    (x * 16 + z) * 16 + y
}

/// A full chunk column (16 x 384 x 16).
#[derive(Clone)]
pub struct ChunkColumn {
    pub x: i32,
    pub z: i32,
    sub_chunks: Vec<SubChunk>,
}

impl ChunkColumn {
    /// A column of nothing but air.
    pub fn new_air(x: i32, z: i32) -> Self {
        Self {
            x,
            z,
            sub_chunks: (0..SUB_CHUNK_COUNT)
                .map(|_| SubChunk::new_single(Block::Air))
                .collect(),
        }
    }

    /// Block at local `x`/`z` and world `y`. `None` outside the world's height.
    pub fn get_block_world(&self, x: usize, y: i32, z: usize) -> Option<Block> {
        let (sub, local_y) = split_y(y)?;
        Some(self.sub_chunks[sub].get_block(x & 15, local_y, z & 15))
    }

    /// Writes outside the world's height are ignored.
    pub fn set_block_world(&mut self, x: usize, y: i32, z: usize, block: Block) {
        if let Some((sub, local_y)) = split_y(y) {
            self.sub_chunks[sub].set_block(x & 15, local_y, z & 15, block);
        }
    }

    /// Y one above the highest motion-blocking block in the local column,
    /// optionally looking through leaves. `MIN_Y` if nothing blocks motion.
    pub fn surface_y(&self, x: usize, z: usize, ignore_foliage: bool) -> i32 {
        for (sub, sub_chunk) in self.sub_chunks.iter().enumerate().rev() {
            if sub_chunk.is_uniform(Block::Air) {
                continue;
            }
            for local_y in (0..16).rev() {
                let block = sub_chunk.get_block(x & 15, local_y, z & 15);
                if block.blocks_motion() && !(ignore_foliage && block.is_foliage()) {
                    return MIN_Y + (sub * 16 + local_y) as i32 + 1;
                }
            }
        }
        MIN_Y
    }

    pub fn sub_chunks(&self) -> &[SubChunk] {
        &self.sub_chunks
    }
}

/// Map a world Y to (sub-chunk index, local y).
fn split_y(y: i32) -> Option<(usize, usize)> {
    if !(MIN_Y..MAX_Y).contains(&y) {
        return None;
    }
    let offset = (y - MIN_Y) as usize;
    Some((offset / 16, offset % 16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_block_subchunk() {
        let sub = SubChunk::new_single(Block::Stone);
        assert_eq!(sub.palette_len(), 1);
        assert_eq!(sub.get_block(0, 0, 0), Block::Stone);
        assert_eq!(sub.get_block(15, 15, 15), Block::Stone);
        assert!(sub.is_uniform(Block::Stone));
    }

    #[test]
    fn palette_grows_only_for_new_blocks() {
        let mut sub = SubChunk::new_single(Block::Air);
        sub.set_block(0, 0, 0, Block::Dirt);
        sub.set_block(0, 1, 0, Block::Stone);
        assert_eq!(sub.palette_len(), 3);
        sub.set_block(0, 2, 0, Block::Dirt);
        assert_eq!(sub.palette_len(), 3);
        assert!(!sub.is_uniform(Block::Air));
    }

    #[test]
    fn uniformity_follows_indices_not_palette() {
        let mut sub = SubChunk::new_single(Block::Air);
        sub.set_block(4, 4, 4, Block::Stone);
        sub.set_block(4, 4, 4, Block::Air);
        // Palette still lists stone, but every index points at air.
        assert!(sub.is_uniform(Block::Air));
    }

    #[test]
    fn world_y_maps_across_sub_chunks() {
        let mut col = ChunkColumn::new_air(0, 0);
        col.set_block_world(3, MIN_Y, 5, Block::Bedrock);
        col.set_block_world(3, 0, 5, Block::Dirt);
        col.set_block_world(3, MAX_Y - 1, 5, Block::Stone);
        assert_eq!(col.get_block_world(3, MIN_Y, 5), Some(Block::Bedrock));
        assert_eq!(col.get_block_world(3, 0, 5), Some(Block::Dirt));
        assert_eq!(col.get_block_world(3, MAX_Y - 1, 5), Some(Block::Stone));
        assert_eq!(col.get_block_world(3, 1, 5), Some(Block::Air));
    }

    #[test]
    fn out_of_range_y() {
        let mut col = ChunkColumn::new_air(0, 0);
        col.set_block_world(0, MAX_Y, 0, Block::Stone);
        assert_eq!(col.get_block_world(0, MAX_Y, 0), None);
        assert_eq!(col.get_block_world(0, MIN_Y - 1, 0), None);
    }

    #[test]
    fn surface_y_skips_leaves_when_asked() {
        let mut col = ChunkColumn::new_air(0, 0);
        for y in MIN_Y..=63 {
            col.set_block_world(2, y, 2, Block::Stone);
        }
        col.set_block_world(2, 64, 2, Block::ShortGrass);
        col.set_block_world(2, 70, 2, Block::OakLeaves);
        assert_eq!(col.surface_y(2, 2, true), 64);
        assert_eq!(col.surface_y(2, 2, false), 71);
    }

    #[test]
    fn surface_y_stops_at_water() {
        let mut col = ChunkColumn::new_air(0, 0);
        for y in MIN_Y..=50 {
            col.set_block_world(0, y, 0, Block::Sand);
        }
        for y in 51..=62 {
            col.set_block_world(0, y, 0, Block::Water);
        }
        assert_eq!(col.surface_y(0, 0, true), 63);
    }

    #[test]
    fn surface_y_crosses_air_and_mixed_sub_chunks() {
        let mut col = ChunkColumn::new_air(0, 0);
        // Bottom of one sub-chunk, top of another.
        col.set_block_world(0, 0, 0, Block::Stone);
        col.set_block_world(1, -1, 1, Block::Stone);
        // Makes the sub-chunk around y = 200 mixed without touching column (0, 0).
        col.set_block_world(5, 200, 5, Block::Stone);
        assert_eq!(col.surface_y(0, 0, true), 1);
        assert_eq!(col.surface_y(1, 1, true), 0);
        assert_eq!(col.surface_y(5, 5, true), 201);
        col.set_block_world(0, MAX_Y - 1, 0, Block::Dirt);
        assert_eq!(col.surface_y(0, 0, false), MAX_Y);
    }

    #[test]
    fn empty_column_surface_is_world_bottom() {
        let col = ChunkColumn::new_air(0, 0);
        assert_eq!(col.surface_y(7, 7, true), MIN_Y);
    }
}
