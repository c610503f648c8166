use byteorder::{BigEndian, ReadBytesExt};
use std::io;

/// Wire buffer for chunk-section frames. Contains the raw bytes and a read
/// cursor; writes append at the end, reads advance the cursor.
#[derive(Debug, Default)]
pub struct PacketBuffer {
    buffer: Vec<u8>,
    cursor: usize,
}

impl PacketBuffer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            cursor: 0,
        }
    }

    /// Wraps an already-received frame for decoding. The cursor starts at 0.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buffer: bytes,
            cursor: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Total bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Current read position. On a failed read this is wherever the failure
    /// occurred; the remainder of the frame must be discarded.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    /// Writes a VarInt to the buffer.
    /// A VarInt is a variable-length integer encoded 7 bits per byte, least
    /// significant group first, with the high bit of each byte set on every
    /// byte except the last.
    pub fn write_varint(&mut self, mut value: i32) {
        while (value & !0x7F) != 0 {
            self.buffer.push(((value & 0x7F) as u8) | 0x80);
            value = ((value as u32) >> 7) as i32;
        }
        self.buffer.push((value & 0x7F) as u8);
    }

    /// Reads a VarInt from the buffer. At most 5 bytes are consumed; longer
    /// encodings are rejected as invalid data.
    pub fn read_varint(&mut self) -> io::Result<i32> {
        let mut result = 0;
        let mut shift = 0;

        loop {
            if self.cursor >= self.buffer.len() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "EOF while reading VarInt",
                ));
            }

            let byte = self.buffer[self.cursor];
            self.cursor += 1;

            result |= ((byte & 0x7F) as i32) << shift;
            shift += 7;

            if (byte & 0x80) == 0 {
                break;
            }

            if shift >= 32 {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "VarInt too big"));
            }
        }

        Ok(result)
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        if self.cursor >= self.buffer.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Not enough bytes to read u8",
            ));
        }
        let value = self.buffer[self.cursor];
        self.cursor += 1;
        Ok(value)
    }

    // Write an u16 in network (big-endian) order.
    pub fn write_u16(&mut self, value: u16) {
        self.buffer.push((value >> 8) as u8);
        self.buffer.push((value & 0xFF) as u8);
    }

    // Read an u16 in network (big-endian) order.
    pub fn read_u16(&mut self) -> io::Result<u16> {
        if self.cursor + 2 > self.buffer.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Not enough bytes to read u16",
            ));
        }
        let hi = self.buffer[self.cursor] as u16;
        let lo = self.buffer[self.cursor + 1] as u16;
        self.cursor += 2;
        Ok((hi << 8) | lo)
    }

    /// Writes a packed-storage long in network (big-endian) order.
    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Reads a packed-storage long in network (big-endian) order.
    pub fn read_u64(&mut self) -> io::Result<u64> {
        if self.cursor + 8 > self.buffer.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Not enough bytes to read u64",
            ));
        }
        let mut slice = &self.buffer[self.cursor..self.cursor + 8];
        let value = slice.read_u64::<BigEndian>()?;
        self.cursor += 8;
        Ok(value)
    }
}
