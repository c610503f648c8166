use crate::registry::{bits_for, Registry};
use sculk_common::{Result, SculkError};
use sculk_protocol::PacketBuffer;

/// Outcome of a palette lookup. `Miss` means the active palette cannot hold
/// another distinct value at its width; the owning container must replace it
/// with one of at least `min_bits` before the value can be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdLookup {
    Hit(u32),
    Miss { min_bits: u8 },
}

/// The active value-to-index mapping for a paletted container.
///
/// Index assignment is insertion-ordered and stable for the lifetime of one
/// palette instance; the single-value and linear variants keep their indices
/// contiguous from 0.
#[derive(Debug, Clone)]
pub enum Palette<V> {
    /// At most one value, always at index 0.
    SingleValue { value: Option<V> },
    /// Insertion-ordered values, capacity 2^bits, looked up by linear scan.
    Linear { values: Vec<V>, bits: u8 },
    /// No local table; indices are the registry's global identifiers.
    Global,
}

impl<V: Copy + Eq> Palette<V> {
    /// Returns the local index for `value`, assigning a fresh index on first
    /// occurrence, or signals that the palette is out of capacity.
    pub fn id<R: Registry<V>>(&mut self, value: V, registry: &R) -> IdLookup {
        match self {
            Palette::SingleValue { value: held } => match held {
                None => {
                    *held = Some(value);
                    IdLookup::Hit(0)
                }
                Some(v) if *v == value => IdLookup::Hit(0),
                // We have 2 distinct values now. At least 1 bit is required.
                Some(_) => IdLookup::Miss { min_bits: 1 },
            },
            Palette::Linear { values, bits } => {
                if let Some(index) = values.iter().position(|v| *v == value) {
                    return IdLookup::Hit(index as u32);
                }
                if values.len() < (1usize << *bits) {
                    values.push(value);
                    IdLookup::Hit((values.len() - 1) as u32)
                } else {
                    IdLookup::Miss {
                        min_bits: *bits + 1,
                    }
                }
            }
            Palette::Global => IdLookup::Hit(registry.id_of(value)),
        }
    }

    /// Returns the value assigned to `index`, or `None` if the index was
    /// never assigned. Decoders may legitimately probe unused slots.
    pub fn value<R: Registry<V>>(&self, index: u32, registry: &R) -> Option<V> {
        match self {
            Palette::SingleValue { value } => {
                if index == 0 {
                    *value
                } else {
                    None
                }
            }
            Palette::Linear { values, .. } => values.get(index as usize).copied(),
            Palette::Global => registry.value_of(index),
        }
    }

    /// Number of locally assigned indices. The global palette assigns none
    /// of its own (and is never the source of a resize).
    pub fn len(&self) -> usize {
        match self {
            Palette::SingleValue { value } => value.is_some() as usize,
            Palette::Linear { values, .. } => values.len(),
            Palette::Global => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the palette payload, translating global identifiers back into
    /// values. An identifier the registry does not know is a decode failure.
    pub fn read_from<R: Registry<V>>(
        &mut self,
        buffer: &mut PacketBuffer,
        registry: &R,
    ) -> Result<()> {
        match self {
            Palette::SingleValue { value } => {
                let id = buffer.read_varint()? as u32;
                let v = registry.value_of(id).ok_or_else(|| {
                    SculkError::RegistryError(format!(
                        "unknown identifier {} in single-value palette",
                        id
                    ))
                })?;
                *value = Some(v);
                Ok(())
            }
            Palette::Linear { values, bits } => {
                let count = buffer.read_varint()?;
                if count < 0 || count as usize > (1usize << *bits) {
                    return Err(SculkError::ProtocolError(format!(
                        "linear palette of {} entries exceeds {}-bit capacity",
                        count, bits
                    )));
                }
                values.clear();
                for _ in 0..count {
                    let id = buffer.read_varint()? as u32;
                    let v = registry.value_of(id).ok_or_else(|| {
                        SculkError::RegistryError(format!(
                            "unknown identifier {} in linear palette",
                            id
                        ))
                    })?;
                    values.push(v);
                }
                Ok(())
            }
            Palette::Global => Ok(()),
        }
    }

    /// Writes the palette payload: each value's global identifier, in
    /// insertion order. The global palette writes nothing.
    pub fn write_to<R: Registry<V>>(&self, buffer: &mut PacketBuffer, registry: &R) -> Result<()> {
        match self {
            Palette::SingleValue { value } => match value {
                Some(v) => {
                    buffer.write_varint(registry.id_of(*v) as i32);
                    Ok(())
                }
                None => Err(SculkError::ProtocolError(
                    "single-value palette serialized before a value was assigned".to_string(),
                )),
            },
            Palette::Linear { values, .. } => {
                buffer.write_varint(values.len() as i32);
                for v in values {
                    buffer.write_varint(registry.id_of(*v) as i32);
                }
                Ok(())
            }
            Palette::Global => Ok(()),
        }
    }
}

/// Which selection table a container uses: block states and biomes compress
/// over different cell counts and switch to the global palette at different
/// widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKind {
    BlockStates,
    Biomes,
}

impl PaletteKind {
    /// Fixed cell count per section for this kind.
    pub fn entries(&self) -> usize {
        match self {
            PaletteKind::BlockStates => 4096, // 16x16x16 blocks
            PaletteKind::Biomes => 64,        // 4x4x4 biome cells
        }
    }

    /// Strategy selection for a declared bit width. Returns the palette and
    /// the storage width it operates at, which may be wider than declared
    /// (block-state palettes below 4 bits are normalized up to 4; the global
    /// palette is at least as wide as the registry needs).
    pub(crate) fn select<V>(&self, bits: u8, registry_len: u32) -> (Palette<V>, u8) {
        match self {
            PaletteKind::BlockStates => match bits {
                0 => (Palette::SingleValue { value: None }, 0),
                1..=4 => (
                    Palette::Linear {
                        values: Vec::with_capacity(16),
                        bits: 4,
                    },
                    4,
                ),
                // A hash-backed palette would slot in here; linear scan is
                // tolerable at up to 256 entries.
                5..=8 => (
                    Palette::Linear {
                        values: Vec::with_capacity(1 << bits),
                        bits,
                    },
                    bits,
                ),
                _ => (Palette::Global, bits.max(bits_for(registry_len))),
            },
            PaletteKind::Biomes => match bits {
                0 => (Palette::SingleValue { value: None }, 0),
                1..=3 => (
                    Palette::Linear {
                        values: Vec::with_capacity(1 << bits),
                        bits,
                    },
                    bits,
                ),
                _ => (Palette::Global, bits.max(bits_for(registry_len))),
            },
        }
    }
}
