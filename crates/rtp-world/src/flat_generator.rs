//! Flat world chunk generator.
//!
//! Default layout, bottom-up from Y = 0:
//! - Y = 0: Bedrock
//! - Y = 1-2: Dirt
//! - Y = 3: Grass Block
//! - Y = 4+: Air

use crate::block::Block;
use crate::chunk::ChunkColumn;
use crate::generator::ChunkGenerator;

/// Fills every column with the same stack of layers starting at Y = 0.
#[derive(Debug, Clone)]
pub struct FlatGenerator {
    layers: Vec<Block>,
}

impl FlatGenerator {
    pub fn new(layers: Vec<Block>) -> Self {
        Self { layers }
    }

    /// Y a player stands at on this world's surface.
    pub fn surface_y(&self) -> i32 {
        self.layers.len() as i32
    }
}

impl Default for FlatGenerator {
    fn default() -> Self {
        Self::new(vec![
            Block::Bedrock,
            Block::Dirt,
            Block::Dirt,
            Block::GrassBlock,
        ])
    }
}

impl ChunkGenerator for FlatGenerator {
    fn generate_chunk(&self, chunk_x: i32, chunk_z: i32) -> ChunkColumn {
        let mut column = ChunkColumn::new_air(chunk_x, chunk_z);
        for x in 0..16 {
            for z in 0..16 {
                for (y, &block) in self.layers.iter().enumerate() {
                    column.set_block_world(x, y as i32, z, block);
                }
            }
        }
        column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layer_layout() {
        let col = FlatGenerator::default().generate_chunk(0, 0);
        assert_eq!(col.get_block_world(0, 0, 0), Some(Block::Bedrock));
        assert_eq!(col.get_block_world(0, 1, 0), Some(Block::Dirt));
        assert_eq!(col.get_block_world(0, 2, 0), Some(Block::Dirt));
        assert_eq!(col.get_block_world(0, 3, 0), Some(Block::GrassBlock));
        assert_eq!(col.get_block_world(0, 4, 0), Some(Block::Air));
        assert_eq!(col.get_block_world(0, -1, 0), Some(Block::Air));
    }

    #[test]
    fn uniform_across_xz() {
        let col = FlatGenerator::default().generate_chunk(5, -3);
        for x in 0..16 {
            for z in 0..16 {
                assert_eq!(col.get_block_world(x, 0, z), Some(Block::Bedrock));
                assert_eq!(col.surface_y(x, z, true), 4);
            }
        }
    }

    #[test]
    fn custom_layers() {
        let gen = FlatGenerator::new(vec![Block::Stone; 10]);
        assert_eq!(gen.surface_y(), 10);
        let col = gen.generate_chunk(0, 0);
        assert_eq!(col.get_block_world(8, 9, 8), Some(Block::Stone));
        assert_eq!(col.surface_y(8, 8, false), 10);
    }
}
