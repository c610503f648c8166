pub mod error;
pub mod types;

pub use error::SculkError;
pub use types::Result;
