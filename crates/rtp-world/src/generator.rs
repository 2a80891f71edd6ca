//! Generator selection.

use crate::block::Block;
use crate::chunk::ChunkColumn;
use crate::flat_generator::FlatGenerator;
use crate::overworld_generator::OverworldGenerator;

/// Produces chunk columns on demand. Must be deterministic per chunk.
pub trait ChunkGenerator: Send + Sync {
    fn generate_chunk(&self, chunk_x: i32, chunk_z: i32) -> ChunkColumn;
}

/// Generator named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    Flat,
    Overworld,
}

impl GeneratorKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "flat" => Some(Self::Flat),
            "overworld" | "default" | "normal" => Some(Self::Overworld),
            _ => None,
        }
    }

    /// `flat_layers` is only consulted for [`GeneratorKind::Flat`]; empty means the default stack.
    pub fn build(self, seed: u64, flat_layers: &[Block]) -> Box<dyn ChunkGenerator> {
        match self {
            Self::Flat if flat_layers.is_empty() => Box::new(FlatGenerator::default()),
            Self::Flat => Box::new(FlatGenerator::new(flat_layers.to_vec())),
            Self::Overworld => Box::new(OverworldGenerator::new(seed)),
        }
    }
}
