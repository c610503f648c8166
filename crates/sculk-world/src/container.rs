use crate::bit_storage::BitStorage;
use crate::palette::{IdLookup, Palette, PaletteKind};
use crate::registry::Registry;
use sculk_common::{Result, SculkError};
use sculk_protocol::PacketBuffer;

/// One chunk-section's paletted cell array: an active palette plus the
/// packed storage it indexes into, always at the same bit width.
///
/// Not safe for concurrent mutation; a section needs one exclusive owner
/// while it is being edited.
#[derive(Debug)]
pub struct PaletteContainer<V, R> {
    kind: PaletteKind,
    registry: R,
    palette: Palette<V>,
    bits: u8,
    storage: BitStorage,
}

impl<V: Copy + Eq, R: Registry<V>> PaletteContainer<V, R> {
    /// Creates a container for the declared bit width, installing the
    /// palette the kind's selection table picks for it.
    pub fn new(kind: PaletteKind, registry: R, bits: u8) -> Self {
        let (palette, width) = kind.select(bits, registry.len());
        Self {
            kind,
            palette,
            bits: width,
            storage: BitStorage::new(width, kind.entries()),
            registry,
        }
    }

    /// Creates a width-0 container with every cell holding `value`; the
    /// state a freshly generated section starts in.
    pub fn filled(kind: PaletteKind, registry: R, value: V) -> Self {
        Self {
            kind,
            registry,
            palette: Palette::SingleValue { value: Some(value) },
            bits: 0,
            storage: BitStorage::new(0, kind.entries()),
        }
    }

    pub fn kind(&self) -> PaletteKind {
        self.kind
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Local index for `value`, assigning one on first occurrence. Replaces
    /// the palette and storage with wider ones when the active palette is
    /// out of capacity.
    pub fn id(&mut self, value: V) -> Result<u32> {
        match self.palette.id(value, &self.registry) {
            IdLookup::Hit(index) => Ok(index),
            IdLookup::Miss { min_bits } => self.on_resize(min_bits, value),
        }
    }

    /// Value previously assigned to `index`, or `None` if the index is
    /// unassigned under the active palette.
    pub fn value(&self, index: u32) -> Option<V> {
        self.palette.value(index, &self.registry)
    }

    /// Value stored in cell `pos`.
    pub fn get(&self, pos: usize) -> Option<V> {
        self.value(self.storage.get(pos))
    }

    /// Stores `value` in cell `pos`, growing the palette if needed.
    pub fn set(&mut self, pos: usize, value: V) -> Result<()> {
        let index = self.id(value)?;
        self.storage.set(pos, index)
    }

    /// Replaces palette and storage with ones of at least `min_bits`, then
    /// assigns `pending` its index. Old assignments keep their values: the
    /// old index order is replayed into the replacement palette and every
    /// cell is re-encoded through it. Nothing is installed until the whole
    /// rebuild has succeeded.
    fn on_resize(&mut self, min_bits: u8, pending: V) -> Result<u32> {
        let (mut palette, bits) = self.kind.select(min_bits, self.registry.len());

        for index in 0..self.palette.len() as u32 {
            if let Some(v) = self.palette.value(index, &self.registry) {
                if let IdLookup::Miss { .. } = palette.id(v, &self.registry) {
                    return Err(SculkError::ProtocolError(format!(
                        "palette overflow while growing to {} bits",
                        bits
                    )));
                }
            }
        }
        let new_index = match palette.id(pending, &self.registry) {
            IdLookup::Hit(index) => index,
            IdLookup::Miss { .. } => {
                return Err(SculkError::ProtocolError(format!(
                    "palette overflow while growing to {} bits",
                    bits
                )))
            }
        };

        let mut storage = BitStorage::new(bits, self.storage.entries());
        for pos in 0..self.storage.entries() {
            if let Some(v) = self.palette.value(self.storage.get(pos), &self.registry) {
                if let IdLookup::Hit(index) = palette.id(v, &self.registry) {
                    storage.set(pos, index)?;
                }
            }
        }

        self.palette = palette;
        self.bits = bits;
        self.storage = storage;
        Ok(new_index)
    }

    /// Reads one container frame: bit width byte, palette payload, then the
    /// packed storage, stopping at the first error. On failure the old
    /// state is kept but the buffer position is mid-frame; the caller must
    /// discard the rest of the frame.
    pub fn read_from(&mut self, buffer: &mut PacketBuffer) -> Result<()> {
        let bits = buffer.read_u8()?;
        let (mut palette, width) = self.kind.select(bits, self.registry.len());
        palette.read_from(buffer, &self.registry)?;

        let mut storage = BitStorage::new(width, self.kind.entries());
        storage.read_from(buffer)?;

        self.palette = palette;
        self.bits = width;
        self.storage = storage;
        Ok(())
    }

    /// Writes the container frame in the same fixed order.
    pub fn write_to(&self, buffer: &mut PacketBuffer) -> Result<()> {
        buffer.write_u8(self.bits);
        self.palette.write_to(buffer, &self.registry)?;
        self.storage.write_to(buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{BiomeRegistry, BLOCK_REGISTRY};
    use crate::types::{Biome, BlockState};
    use assert_matches::assert_matches;

    const BIOMES: BiomeRegistry = BiomeRegistry::new(64);

    fn block(id: u32) -> BlockState {
        BLOCK_REGISTRY.value_of(id).unwrap()
    }

    #[test]
    fn test_single_value_scenario() {
        let mut container = PaletteContainer::new(PaletteKind::BlockStates, &*BLOCK_REGISTRY, 0);
        let stone = block(1);
        assert_eq!(container.id(stone).unwrap(), 0);

        let mut buffer = PacketBuffer::new();
        container.write_to(&mut buffer).unwrap();
        // width byte, one VarInt (stone's global id), zero-long storage
        assert_eq!(buffer.as_bytes(), &[0x00, 0x01, 0x00]);

        let mut decoded = PaletteContainer::new(PaletteKind::BlockStates, &*BLOCK_REGISTRY, 0);
        let mut read_buffer = PacketBuffer::from_bytes(buffer.into_bytes());
        decoded.read_from(&mut read_buffer).unwrap();
        assert_eq!(decoded.value(0), Some(stone));
        assert_eq!(decoded.bits(), 0);
    }

    #[test]
    fn test_index_stability() {
        let mut container = PaletteContainer::new(PaletteKind::BlockStates, &*BLOCK_REGISTRY, 4);
        let first = container.id(block(3)).unwrap();
        container.id(block(9)).unwrap();
        container.id(block(25)).unwrap();
        assert_eq!(container.id(block(3)).unwrap(), first);
        assert_eq!(container.value(1), Some(block(9)));
        assert_eq!(container.value(2), Some(block(25)));
    }

    #[test]
    fn test_out_of_range_index_is_absent() {
        let mut container = PaletteContainer::new(PaletteKind::BlockStates, &*BLOCK_REGISTRY, 0);
        container.id(block(1)).unwrap();
        assert_eq!(container.value(1), None);
        assert_eq!(container.value(500), None);
    }

    #[test]
    fn test_linear_growth_at_capacity_four() {
        // Biome containers at 2 bits hold exactly 4 distinct values.
        let mut container = PaletteContainer::new(PaletteKind::Biomes, &BIOMES, 2);
        for (index, id) in [10u8, 11, 12, 13].iter().enumerate() {
            assert_eq!(container.id(Biome(*id)).unwrap(), index as u32);
        }
        assert_eq!(container.id(Biome(10)).unwrap(), 0);
        assert_eq!(container.bits(), 2);

        // A fifth distinct value forces a wider palette.
        let new_index = container.id(Biome(14)).unwrap();
        assert_eq!(container.bits(), 3);
        assert_eq!(new_index, 4);
        for (index, id) in [10u8, 11, 12, 13].iter().enumerate() {
            assert_eq!(container.value(index as u32), Some(Biome(*id)));
        }
    }

    #[test]
    fn test_growth_preserves_stored_cells() {
        let mut container = PaletteContainer::new(PaletteKind::Biomes, &BIOMES, 1);
        for pos in 0..64 {
            container.set(pos, Biome((pos % 2) as u8)).unwrap();
        }
        // Third value grows 1 -> 2 bits and re-encodes all 64 cells.
        container.set(63, Biome(50)).unwrap();
        assert_eq!(container.bits(), 2);
        for pos in 0..63 {
            assert_eq!(container.get(pos), Some(Biome((pos % 2) as u8)));
        }
        assert_eq!(container.get(63), Some(Biome(50)));
    }

    #[test]
    fn test_single_value_grows_without_losing_cells() {
        let mut container =
            PaletteContainer::filled(PaletteKind::BlockStates, &*BLOCK_REGISTRY, block(26));
        assert_eq!(container.bits(), 0);
        container.set(100, block(2)).unwrap();
        // Block-state linear palettes are normalized to 4 bits.
        assert_eq!(container.bits(), 4);
        assert_eq!(container.get(0), Some(block(26)));
        assert_eq!(container.get(100), Some(block(2)));
        assert_eq!(container.get(4095), Some(block(26)));
    }

    #[test]
    fn test_block_linear_growth_past_sixteen() {
        let mut container = PaletteContainer::new(PaletteKind::BlockStates, &*BLOCK_REGISTRY, 4);
        for id in 0..16 {
            assert_eq!(container.id(block(id)).unwrap(), id);
        }
        assert_eq!(container.bits(), 4);

        let new_index = container.id(block(16)).unwrap();
        assert_eq!(container.bits(), 5);
        assert_eq!(new_index, 16);
        for id in 0..16 {
            assert_eq!(container.value(id), Some(block(id)));
        }
    }

    #[test]
    fn test_biome_growth_reaches_global() {
        let mut container = PaletteContainer::new(PaletteKind::Biomes, &BIOMES, 3);
        for id in 0..8u8 {
            container.id(Biome(id)).unwrap();
        }
        // Ninth distinct biome exceeds the 3-bit ceiling; the container
        // switches to the global palette at the registry's width.
        let index = container.id(Biome(40)).unwrap();
        assert_eq!(container.bits(), 6);
        assert_eq!(index, 40);
        assert_eq!(container.value(40), Some(Biome(40)));
        assert_eq!(container.value(3), Some(Biome(3)));
    }

    #[test]
    fn test_global_frame_has_empty_palette_payload() {
        let mut container = PaletteContainer::new(PaletteKind::Biomes, &BIOMES, 4);
        container.set(0, Biome(63)).unwrap();

        let mut buffer = PacketBuffer::new();
        container.write_to(&mut buffer).unwrap();

        // width byte, then immediately the storage long count: 64 cells at
        // 6 bits is 6 longs.
        assert_eq!(buffer.as_bytes()[0], 6);
        assert_eq!(buffer.as_bytes()[1], 6);
        assert_eq!(buffer.len(), 2 + 6 * 8);
    }

    #[test]
    fn test_roundtrip_after_growth() {
        let mut container = PaletteContainer::new(PaletteKind::Biomes, &BIOMES, 1);
        for pos in 0..64 {
            container.set(pos, Biome((pos % 6) as u8)).unwrap();
        }

        let mut buffer = PacketBuffer::new();
        container.write_to(&mut buffer).unwrap();

        let mut decoded = PaletteContainer::new(PaletteKind::Biomes, &BIOMES, 0);
        let mut read_buffer = PacketBuffer::from_bytes(buffer.into_bytes());
        decoded.read_from(&mut read_buffer).unwrap();

        assert_eq!(decoded.bits(), container.bits());
        for pos in 0..64 {
            assert_eq!(decoded.get(pos), Some(Biome((pos % 6) as u8)));
        }
    }

    #[test]
    fn test_unknown_identifier_is_a_decode_failure() {
        let mut buffer = PacketBuffer::new();
        buffer.write_u8(0);
        buffer.write_varint(9999); // no such global id
        buffer.write_varint(0);

        let mut container =
            PaletteContainer::<BlockState, _>::new(PaletteKind::BlockStates, &*BLOCK_REGISTRY, 0);
        let mut read_buffer = PacketBuffer::from_bytes(buffer.into_bytes());
        assert_matches!(
            container.read_from(&mut read_buffer),
            Err(SculkError::RegistryError(_))
        );
    }

    #[test]
    fn test_truncated_frame_stops_at_first_error() {
        let mut buffer = PacketBuffer::new();
        buffer.write_u8(0);
        // palette payload and storage missing entirely

        let mut container =
            PaletteContainer::<BlockState, _>::new(PaletteKind::BlockStates, &*BLOCK_REGISTRY, 0);
        let mut read_buffer = PacketBuffer::from_bytes(buffer.into_bytes());
        assert_matches!(
            container.read_from(&mut read_buffer),
            Err(SculkError::IoError(_))
        );
        // One byte (the width) was consumed before the failure.
        assert_eq!(read_buffer.cursor(), 1);
    }

    #[test]
    fn test_unseeded_container_does_not_serialize() {
        let container = PaletteContainer::<BlockState, _>::new(
            PaletteKind::BlockStates,
            &*BLOCK_REGISTRY,
            0,
        );
        let mut buffer = PacketBuffer::new();
        assert_matches!(
            container.write_to(&mut buffer),
            Err(SculkError::ProtocolError(_))
        );
    }
}
