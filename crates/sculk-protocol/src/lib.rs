pub mod packet;

pub use packet::PacketBuffer;
