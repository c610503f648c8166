use sculk_protocol::PacketBuffer;
use sculk_world::registry::Registry;
use sculk_world::{Biome, BlockState, ChunkSection, BLOCK_REGISTRY};

fn block(id: u32) -> BlockState {
    BLOCK_REGISTRY.value_of(id).unwrap()
}

#[test]
fn test_empty_section_roundtrip() {
    let section = ChunkSection::new();

    let mut buffer = PacketBuffer::new();
    section.write_to(&mut buffer).unwrap();
    // block count, two single-value frames: 2 + 3 + 3 bytes
    assert_eq!(buffer.len(), 8);

    let mut decoded = ChunkSection::new();
    let mut read_buffer = PacketBuffer::from_bytes(buffer.into_bytes());
    decoded.read_from(&mut read_buffer).unwrap();

    assert_eq!(decoded.block_count(), 0);
    assert_eq!(decoded.get_block_state(8, 8, 8), BlockState::AIR);
    assert_eq!(read_buffer.remaining(), 0);
}

#[test]
fn test_section_roundtrip_with_palette_growth() {
    let mut section = ChunkSection::new();

    // A bedrock floor, a stone layer, and enough distinct states above to
    // push the block palette past its initial width.
    for x in 0..16 {
        for z in 0..16 {
            section.set_block_state(x, 0, z, block(26)).unwrap();
            section.set_block_state(x, 1, z, block(1)).unwrap();
        }
    }
    for id in 0..20 {
        section.set_block_state(id % 16, 2 + id / 16, 3, block(id as u32 + 1)).unwrap();
    }
    for x in 0..4 {
        for z in 0..4 {
            section.set_biome(x, 0, z, Biome(4)).unwrap();
            section.set_biome(x, 3, z, Biome(29)).unwrap();
        }
    }

    let mut buffer = PacketBuffer::new();
    section.write_to(&mut buffer).unwrap();

    let mut decoded = ChunkSection::new();
    let mut read_buffer = PacketBuffer::from_bytes(buffer.into_bytes());
    decoded.read_from(&mut read_buffer).unwrap();
    assert_eq!(read_buffer.remaining(), 0);

    assert_eq!(decoded.block_count(), section.block_count());
    for x in 0..16 {
        for y in 0..16 {
            for z in 0..16 {
                assert_eq!(
                    decoded.get_block_state(x, y, z),
                    section.get_block_state(x, y, z),
                    "block at ({}, {}, {})",
                    x,
                    y,
                    z
                );
            }
        }
    }
    for x in 0..4 {
        for y in 0..4 {
            for z in 0..4 {
                assert_eq!(decoded.get_biome(x, y, z), section.get_biome(x, y, z));
            }
        }
    }
}

#[test]
fn test_corrupt_frame_is_rejected() {
    let mut section = ChunkSection::new();
    section.set_block_state(0, 0, 0, block(1)).unwrap();

    let mut buffer = PacketBuffer::new();
    section.write_to(&mut buffer).unwrap();
    let mut bytes = buffer.into_bytes();
    bytes.truncate(bytes.len() - 1);

    let mut decoded = ChunkSection::new();
    let mut read_buffer = PacketBuffer::from_bytes(bytes);
    assert!(decoded.read_from(&mut read_buffer).is_err());
}
