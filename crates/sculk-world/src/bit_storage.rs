use sculk_common::{Result, SculkError};
use sculk_protocol::PacketBuffer;

/// Fixed-entry-count array packing each entry at a configured bit width.
/// Entries are packed contiguously into big-endian longs and may span a long
/// boundary. Width 0 is the degenerate store: no data, every entry reads 0.
#[derive(Debug, Clone)]
pub struct BitStorage {
    bits: u8,
    entries: usize,
    data: Vec<u64>,
}

impl BitStorage {
    pub fn new(bits: u8, entries: usize) -> Self {
        let data_len = if bits == 0 {
            0
        } else {
            (entries * bits as usize + 63) / 64 // Round up to whole longs
        };
        Self {
            bits,
            entries,
            data: vec![0; data_len],
        }
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    fn max_value(&self) -> u32 {
        if self.bits == 0 {
            0
        } else {
            ((1u64 << self.bits) - 1) as u32
        }
    }

    /// Reads the entry at `pos`. Positions are caller-validated; the cell
    /// counts are fixed per palette kind.
    pub fn get(&self, pos: usize) -> u32 {
        debug_assert!(pos < self.entries);
        if self.bits == 0 {
            return 0;
        }

        let bits = self.bits as usize;
        let bit_index = pos * bits;
        let long_index = bit_index / 64;
        let bit_offset = bit_index % 64;

        let mut value = (self.data[long_index] >> bit_offset) as u32;
        if bit_offset + bits > 64 {
            let bits_in_next = bit_offset + bits - 64;
            value |= ((self.data[long_index + 1] & ((1u64 << bits_in_next) - 1))
                << (bits - bits_in_next)) as u32;
        }
        value & self.max_value()
    }

    /// Writes the entry at `pos`. Fails when `value` does not fit the
    /// configured bit width.
    pub fn set(&mut self, pos: usize, value: u32) -> Result<()> {
        debug_assert!(pos < self.entries);
        if value > self.max_value() {
            return Err(SculkError::ProtocolError(format!(
                "value {} exceeds {}-bit storage",
                value, self.bits
            )));
        }
        if self.bits == 0 {
            return Ok(());
        }

        let bits = self.bits as usize;
        let bit_index = pos * bits;
        let long_index = bit_index / 64;
        let bit_offset = bit_index % 64;
        let mask = (1u64 << bits) - 1;

        self.data[long_index] &= !(mask << bit_offset); // Clear existing bits
        self.data[long_index] |= (value as u64) << bit_offset;

        if bit_offset + bits > 64 {
            let bits_in_next = bit_offset + bits - 64;
            self.data[long_index + 1] &= !((1u64 << bits_in_next) - 1);
            self.data[long_index + 1] |= (value as u64) >> (bits - bits_in_next);
        }
        Ok(())
    }

    /// Writes the long count as a VarInt, then the longs themselves.
    pub fn write_to(&self, buffer: &mut PacketBuffer) {
        buffer.write_varint(self.data.len() as i32);
        for &long in &self.data {
            buffer.write_u64(long);
        }
    }

    /// Reads the long array, checking the declared count against the
    /// configured geometry.
    pub fn read_from(&mut self, buffer: &mut PacketBuffer) -> Result<()> {
        let count = buffer.read_varint()?;
        if count < 0 || count as usize != self.data.len() {
            return Err(SculkError::ProtocolError(format!(
                "data array of {} longs does not match {} entries at {} bits",
                count, self.entries, self.bits
            )));
        }
        for slot in self.data.iter_mut() {
            *slot = buffer.read_u64()?;
        }
        Ok(())
    }
}
