pub mod bit_storage;
pub mod chunk;
pub mod container;
pub mod palette;
pub mod registry;
pub mod types;

// Re-export commonly used items
pub use bit_storage::BitStorage;
pub use chunk::ChunkSection;
pub use container::PaletteContainer;
pub use palette::{Palette, PaletteKind};
pub use registry::{BiomeRegistry, BlockRegistry, Registry, BIOME_REGISTRY, BLOCK_REGISTRY};
pub use types::{Biome, BlockState};
