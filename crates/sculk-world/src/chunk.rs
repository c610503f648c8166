use crate::container::PaletteContainer;
use crate::palette::PaletteKind;
use crate::registry::{BiomeRegistry, BlockRegistry, BIOME_REGISTRY, BLOCK_REGISTRY};
use crate::types::{Biome, BlockState};
use sculk_common::Result;
use sculk_protocol::PacketBuffer;

/// One 16x16x16 section of a chunk column: a non-air block count plus the
/// paletted block-state and biome arrays.
pub struct ChunkSection {
    block_count: u16,
    states: PaletteContainer<BlockState, &'static BlockRegistry>,
    biomes: PaletteContainer<Biome, &'static BiomeRegistry>,
}

impl ChunkSection {
    /// A fresh all-air section.
    pub fn new() -> Self {
        ChunkSection {
            block_count: 0,
            states: PaletteContainer::filled(
                PaletteKind::BlockStates,
                &*BLOCK_REGISTRY,
                BlockState::AIR,
            ),
            biomes: PaletteContainer::filled(PaletteKind::Biomes, &BIOME_REGISTRY, Biome(0)),
        }
    }

    fn block_index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < 16 && y < 16 && z < 16);
        (y * 16 * 16) + (z * 16) + x
    }

    fn biome_index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < 4 && y < 4 && z < 4);
        (y * 4 * 4) + (z * 4) + x
    }

    /// Number of non-air blocks in the section.
    pub fn block_count(&self) -> u16 {
        self.block_count
    }

    pub fn get_block_state(&self, x: usize, y: usize, z: usize) -> BlockState {
        self.states
            .get(Self::block_index(x, y, z))
            .unwrap_or(BlockState::AIR)
    }

    pub fn set_block_state(&mut self, x: usize, y: usize, z: usize, state: BlockState) -> Result<()> {
        let old_state = self.get_block_state(x, y, z);
        self.states.set(Self::block_index(x, y, z), state)?;

        if state.is_air() && !old_state.is_air() {
            self.block_count -= 1;
        } else if !state.is_air() && old_state.is_air() {
            self.block_count += 1;
        }
        Ok(())
    }

    /// Biome of one 4x4x4 biome cell.
    pub fn get_biome(&self, x: usize, y: usize, z: usize) -> Biome {
        self.biomes
            .get(Self::biome_index(x, y, z))
            .unwrap_or(Biome(0))
    }

    pub fn set_biome(&mut self, x: usize, y: usize, z: usize, biome: Biome) -> Result<()> {
        self.biomes.set(Self::biome_index(x, y, z), biome)
    }

    /// Writes the section frame: block count, block-state container, biome
    /// container.
    pub fn write_to(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_u16(self.block_count);
        self.states.write_to(buffer)?;
        self.biomes.write_to(buffer)
    }

    /// Reads a section frame written by `write_to`, in the same order,
    /// stopping at the first error.
    pub fn read_from(&mut self, buffer: &mut PacketBuffer) -> Result<()> {
        self.block_count = buffer.read_u16()?;
        self.states.read_from(buffer)?;
        self.biomes.read_from(buffer)
    }
}

impl Default for ChunkSection {
    fn default() -> Self {
        Self::new()
    }
}
