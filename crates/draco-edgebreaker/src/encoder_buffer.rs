// Copyright 2022 The Draco Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use byteorder::{ByteOrder, LittleEndian};

use crate::status::{DracoError, Status};

/// Output buffer for Draco serialization.
/// Supports both byte-aligned and bit-level encoding.
#[derive(Debug, Clone, Default)]
pub struct EncoderBuffer {
    /// Main buffer data
    buffer: Vec<u8>,

    /// Bit encoder state (active when encoding bits)
    bit_encoder: Option<BitEncoder>,
}

/// State of an active bit sequence inside the buffer.
#[derive(Debug, Clone)]
struct BitEncoder {
    /// Current bit position within the reserved area
    bit_offset: usize,

    /// Starting byte position of the bit data
    start_byte_offset: usize,

    /// Number of bytes reserved for the bit data
    reserved_bytes: usize,

    /// Position of the size placeholder, when the size is encoded
    size_offset: Option<usize>,
}

/// Placeholder reserved in front of a sized bit sequence. The final size is
/// written as a varint, which never needs more than this.
const BIT_SEQUENCE_SIZE_RESERVE: usize = 8;

impl EncoderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            bit_encoder: None,
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.bit_encoder = None;
    }

    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn bit_encoder_active(&self) -> bool {
        self.bit_encoder.is_some()
    }

    /// Starts encoding a bit sequence of at most `required_bits` bits.
    ///
    /// When `encode_size` is set, the byte size of the sequence is stored as a
    /// varint in front of it once `end_bit_encoding` is called.
    pub fn start_bit_encoding(&mut self, required_bits: usize, encode_size: bool) -> Status {
        if self.bit_encoder_active() {
            return Err(DracoError::BufferError("Bit encoder already active".into()));
        }
        let size_offset = if encode_size {
            let offset = self.buffer.len();
            self.buffer.resize(offset + BIT_SEQUENCE_SIZE_RESERVE, 0);
            Some(offset)
        } else {
            None
        };

        let required_bytes = (required_bits + 7) / 8;
        let start_pos = self.buffer.len();
        self.buffer.resize(start_pos + required_bytes, 0);

        self.bit_encoder = Some(BitEncoder {
            bit_offset: 0,
            start_byte_offset: start_pos,
            reserved_bytes: required_bytes,
            size_offset,
        });
        Ok(())
    }

    /// Ends bit encoding and trims the reserved area to the bits actually written.
    pub fn end_bit_encoding(&mut self) -> Status {
        let encoder = self
            .bit_encoder
            .take()
            .ok_or_else(|| DracoError::BufferError("Bit encoder not active".into()))?;

        let encoded_bytes = (encoder.bit_offset + 7) / 8;
        let end_pos = encoder.start_byte_offset + encoded_bytes;
        self.buffer.truncate(end_pos);

        if let Some(size_offset) = encoder.size_offset {
            let payload = self.buffer[encoder.start_byte_offset..].to_vec();
            self.buffer.truncate(size_offset);
            self.encode_varint(encoded_bytes as u64)?;
            self.buffer.extend_from_slice(&payload);
        }
        Ok(())
    }

    /// Encodes the `nbits` least significant bits of `value`, LSB first.
    pub fn encode_least_significant_bits32(&mut self, nbits: u32, value: u32) -> Status {
        if nbits > 32 {
            return Err(DracoError::BufferError("Cannot encode more than 32 bits".into()));
        }
        let encoder = self
            .bit_encoder
            .as_mut()
            .ok_or_else(|| DracoError::BufferError("Bit encoder not active".into()))?;
        if encoder.bit_offset + nbits as usize > encoder.reserved_bytes * 8 {
            return Err(DracoError::BufferError(
                "Bit sequence exceeds reserved space".into(),
            ));
        }
        for bit in 0..nbits {
            let offset = encoder.bit_offset;
            let byte = encoder.start_byte_offset + offset / 8;
            let shift = offset % 8;
            if (value >> bit) & 1 != 0 {
                self.buffer[byte] |= 1 << shift;
            } else {
                self.buffer[byte] &= !(1 << shift);
            }
            encoder.bit_offset += 1;
        }
        Ok(())
    }

    fn check_byte_mode(&self) -> Status {
        if self.bit_encoder_active() {
            return Err(DracoError::BufferError(
                "Cannot encode byte-aligned data during bit encoding".into(),
            ));
        }
        Ok(())
    }

    /// Encodes raw bytes (byte-aligned).
    pub fn encode_data(&mut self, data: &[u8]) -> Status {
        self.check_byte_mode()?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    pub fn encode_u8(&mut self, value: u8) -> Status {
        self.encode_data(&[value])
    }

    pub fn encode_u32(&mut self, value: u32) -> Status {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        self.encode_data(&bytes)
    }

    /// Encodes an unsigned LEB128 varint.
    pub fn encode_varint(&mut self, mut value: u64) -> Status {
        self.check_byte_mode()?;
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buffer.push(byte);
                return Ok(());
            }
            self.buffer.push(byte | 0x80);
        }
    }

    /// Encodes a signed value as a varint of its zig-zag symbol.
    pub fn encode_varint_signed_i32(&mut self, value: i32) -> Status {
        let symbol = if value >= 0 {
            (value as u32) << 1
        } else {
            ((-(value + 1)) as u32) << 1 | 1
        };
        self.encode_varint(symbol as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_buffer_creation() {
        let buf = EncoderBuffer::new();
        assert_eq!(buf.size(), 0);
        assert!(!buf.bit_encoder_active());
    }

    #[test]
    fn test_fixed_width_encoding() {
        let mut buf = EncoderBuffer::new();
        buf.encode_u32(0x12345678).unwrap();
        buf.encode_u8(0xAB).unwrap();
        assert_eq!(buf.data(), &[0x78, 0x56, 0x34, 0x12, 0xAB]);
    }

    #[test]
    fn test_varint_encoding() {
        let mut buf = EncoderBuffer::new();
        buf.encode_varint(1).unwrap();
        buf.encode_varint(300).unwrap();
        assert_eq!(buf.data(), &[0x01, 0xAC, 0x02]);

        let mut signed = EncoderBuffer::new();
        signed.encode_varint_signed_i32(-1).unwrap();
        signed.encode_varint_signed_i32(2).unwrap();
        assert_eq!(signed.data(), &[0x01, 0x04]);
    }

    #[test]
    fn test_bit_encoding() {
        let mut buf = EncoderBuffer::new();

        buf.start_bit_encoding(16, false).unwrap();
        buf.encode_least_significant_bits32(4, 0b1010).unwrap();
        buf.encode_least_significant_bits32(4, 0b1100).unwrap();
        buf.encode_least_significant_bits32(8, 0xFF).unwrap();
        buf.end_bit_encoding().unwrap();

        assert_eq!(buf.size(), 2);
        assert_eq!(buf.data()[0], 0b11001010);
        assert_eq!(buf.data()[1], 0b11111111);
    }

    #[test]
    fn test_bit_encoding_with_size() {
        let mut buf = EncoderBuffer::new();
        buf.encode_u8(9).unwrap();

        buf.start_bit_encoding(64, true).unwrap();
        buf.encode_least_significant_bits32(4, 0b1010).unwrap();
        buf.encode_least_significant_bits32(4, 0b1100).unwrap();
        buf.encode_least_significant_bits32(1, 1).unwrap();
        buf.end_bit_encoding().unwrap();

        // Leading byte, varint size (2 bytes), then the two data bytes.
        assert_eq!(buf.data(), &[9, 2, 0b11001010, 0b00000001]);
    }

    #[test]
    fn test_error_conditions() {
        let mut buf = EncoderBuffer::new();

        assert!(buf.encode_least_significant_bits32(8, 0xFF).is_err());
        assert!(buf.end_bit_encoding().is_err());

        buf.start_bit_encoding(8, false).unwrap();
        assert!(buf.encode_data(b"test").is_err());
        assert!(buf.encode_varint(3).is_err());
        assert!(buf.start_bit_encoding(8, false).is_err());
        buf.encode_least_significant_bits32(8, 0xFF).unwrap();
        assert!(buf.encode_least_significant_bits32(1, 1).is_err());
    }
}
