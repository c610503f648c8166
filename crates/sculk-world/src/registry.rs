use crate::types::{Biome, BlockState};
use once_cell::sync::Lazy;
use sculk_common::{Result, SculkError};
use serde::Deserialize;
use std::collections::HashMap;

/// Bidirectional mapping between values and their stable global identifiers.
///
/// `id_of` is total: every value handed to a palette is assumed to be
/// registered. `value_of` returns `None` for identifiers outside the
/// registry's known range; identifiers are always `0..len()`.
pub trait Registry<V> {
    fn id_of(&self, value: V) -> u32;
    fn value_of(&self, id: u32) -> Option<V>;
    fn len(&self) -> u32;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V, T: Registry<V>> Registry<V> for &T {
    fn id_of(&self, value: V) -> u32 {
        (**self).id_of(value)
    }

    fn value_of(&self, id: u32) -> Option<V> {
        (**self).value_of(id)
    }

    fn len(&self) -> u32 {
        (**self).len()
    }
}

/// Minimum bits needed to distinguish `n` identifiers (0 when a single
/// identifier, or none, is in play).
pub fn bits_for(n: u32) -> u8 {
    if n <= 1 {
        0
    } else {
        (u32::BITS - (n - 1).leading_zeros()) as u8
    }
}

#[derive(Deserialize, Debug)]
struct PropertyDef {
    #[allow(dead_code)]
    name: String,
    #[allow(dead_code)]
    #[serde(rename = "type")]
    property_type: String,
    num_values: u32,
    #[allow(dead_code)]
    #[serde(default)] // Handle missing values
    values: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct BlockDef {
    #[allow(dead_code)]
    id: u32,
    name: String,
    #[serde(rename = "minStateId")]
    min_state_id: u32,
    #[serde(rename = "maxStateId")]
    max_state_id: u32,
    states: Vec<PropertyDef>,
    #[serde(rename = "defaultState")]
    default_state: u32,
}

/// Global block-state registry, derived from the blocks.json asset. Each
/// global state id in a block's range is unpacked into the block's property
/// values, mixed-radix, last property varying fastest.
#[derive(Debug)]
pub struct BlockRegistry {
    states: Vec<BlockState>,
    ids: HashMap<BlockState, u32>,
    default_states: HashMap<String, u32>,
}

pub static BLOCK_REGISTRY: Lazy<BlockRegistry> = Lazy::new(|| {
    BlockRegistry::from_json(include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/blocks.json"
    )))
    .expect("embedded blocks.json is valid")
});

impl BlockRegistry {
    pub fn from_json(json: &str) -> Result<Self> {
        let blocks: Vec<BlockDef> = serde_json::from_str(json)
            .map_err(|e| SculkError::RegistryError(format!("failed to parse blocks json: {}", e)))?;

        let mut states = Vec::new();
        let mut ids = HashMap::new();
        let mut default_states = HashMap::new();

        let mut next_block_type_id: u16 = 0;
        let mut block_name_to_id: HashMap<String, u16> = HashMap::new();

        for block in blocks {
            let block_type = *block_name_to_id
                .entry(block.name.clone())
                .or_insert_with(|| {
                    let id = next_block_type_id;
                    next_block_type_id += 1;
                    id
                });

            default_states.insert(block.name.clone(), block.default_state);

            for state_id in block.min_state_id..=block.max_state_id {
                if states.len() as u32 != state_id {
                    return Err(SculkError::RegistryError(format!(
                        "state ids for block '{}' are not contiguous (expected {}, got {})",
                        block.name,
                        states.len(),
                        state_id
                    )));
                }

                let mut properties: u16 = 0;
                let mut state_offset = state_id - block.min_state_id;
                for property in block.states.iter().rev() {
                    let property_value = state_offset % property.num_values;
                    state_offset /= property.num_values;
                    properties =
                        (properties << bits_for(property.num_values)) | property_value as u16;
                }

                let state = BlockState {
                    block_type,
                    properties,
                };
                states.push(state);
                ids.insert(state, state_id);
            }
        }

        Ok(Self {
            states,
            ids,
            default_states,
        })
    }

    /// Default state for a block name, if the block is registered.
    pub fn default_state(&self, name: &str) -> Option<BlockState> {
        let id = *self.default_states.get(name)?;
        self.value_of(id)
    }
}

impl Registry<BlockState> for BlockRegistry {
    fn id_of(&self, value: BlockState) -> u32 {
        match self.ids.get(&value) {
            Some(&id) => id,
            None => panic!("block state not found in global registry: {:?}", value),
        }
    }

    fn value_of(&self, id: u32) -> Option<BlockState> {
        self.states.get(id as usize).copied()
    }

    fn len(&self) -> u32 {
        self.states.len() as u32
    }
}

/// Global biome registry: an identity mapping over a fixed biome count.
pub struct BiomeRegistry {
    count: u32,
}

pub static BIOME_REGISTRY: BiomeRegistry = BiomeRegistry::new(64);

impl BiomeRegistry {
    pub const fn new(count: u32) -> Self {
        Self { count }
    }
}

impl Registry<Biome> for BiomeRegistry {
    fn id_of(&self, value: Biome) -> u32 {
        value.0 as u32
    }

    fn value_of(&self, id: u32) -> Option<Biome> {
        if id < self.count {
            Some(Biome(id as u8))
        } else {
            None
        }
    }

    fn len(&self) -> u32 {
        self.count
    }
}
