//! Block kinds and the physical properties the teleport search relies on.

/// The block kinds produced by the built-in generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Block {
    #[default]
    Air,
    Bedrock,
    Stone,
    Dirt,
    GrassBlock,
    Sand,
    Gravel,
    Water,
    Lava,
    OakLog,
    OakLeaves,
    ShortGrass,
    SnowLayer,
}

impl Block {
    pub const ALL: [Block; 13] = [
        Block::Air,
        Block::Bedrock,
        Block::Stone,
        Block::Dirt,
        Block::GrassBlock,
        Block::Sand,
        Block::Gravel,
        Block::Water,
        Block::Lava,
        Block::OakLog,
        Block::OakLeaves,
        Block::ShortGrass,
        Block::SnowLayer,
    ];

    /// Namespaced identifier, e.g. `minecraft:grass_block`.
    pub fn name(self) -> &'static str {
        match self {
            Block::Air => "minecraft:air",
            Block::Bedrock => "minecraft:bedrock",
            Block::Stone => "minecraft:stone",
            Block::Dirt => "minecraft:dirt",
            Block::GrassBlock => "minecraft:grass_block",
            Block::Sand => "minecraft:sand",
            Block::Gravel => "minecraft:gravel",
            Block::Water => "minecraft:water",
            Block::Lava => "minecraft:lava",
            Block::OakLog => "minecraft:oak_log",
            Block::OakLeaves => "minecraft:oak_leaves",
            Block::ShortGrass => "minecraft:short_grass",
            Block::SnowLayer => "minecraft:snow_layer",
        }
    }

    /// Look up a block by name. The `minecraft:` namespace is optional.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let qualified = if name.contains(':') {
            name.to_string()
        } else {
            format!("minecraft:{name}")
        };
        Self::ALL.into_iter().find(|b| b.name() == qualified)
    }

    pub fn is_fluid(self) -> bool {
        matches!(self, Block::Water | Block::Lava)
    }

    pub fn is_water(self) -> bool {
        self == Block::Water
    }

    /// Leaves. Skipped by foliage-ignoring heightmap queries.
    pub fn is_foliage(self) -> bool {
        self == Block::OakLeaves
    }

    /// Has a collision box.
    pub fn is_collidable(self) -> bool {
        !matches!(
            self,
            Block::Air | Block::Water | Block::Lava | Block::ShortGrass | Block::SnowLayer
        )
    }

    /// Stops a falling entity: anything collidable, plus fluids.
    pub fn blocks_motion(self) -> bool {
        self.is_collidable() || self.is_fluid()
    }

    /// Collidable and not a fluid; something a player can stand on.
    pub fn is_solid(self) -> bool {
        self.is_collidable() && !self.is_fluid()
    }

    /// A player's body can occupy this block.
    pub fn is_passable(self) -> bool {
        !self.is_collidable() && !self.is_fluid()
    }
}
