use serde::{Deserialize, Serialize};

/// One distinct block state: a block type plus its packed property values.
/// Compared by equality only; the global registry owns the mapping to wire
/// identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState {
    pub block_type: u16,
    pub properties: u16,
}

impl BlockState {
    pub const AIR: BlockState = BlockState {
        block_type: 0,
        properties: 0,
    };

    pub fn is_air(&self) -> bool {
        self.block_type == 0 // Assuming block_type 0 is air
    }
}

/// Biome identifier for one 4x4x4 biome cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Biome(pub u8);
