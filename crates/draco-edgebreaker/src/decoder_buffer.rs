use byteorder::{ByteOrder, LittleEndian};
use num_traits::ToPrimitive;

use crate::status::{DracoError, Status};
use crate::version::{version_less_than, DEFAULT_MESH_VERSION, VERSION_INLINE_SPLIT_EVENTS};

/// Input buffer for reading compressed Draco data.
///
/// `DecoderBuffer` provides sequential byte and bit-level access to compressed data.
/// It supports both byte-aligned reads (integers, varints) and bit-level
/// reads for packed symbol data. The buffer is a cheap cursor over a borrowed
/// slice and can be cloned to read ahead.
///
/// # Example
///
/// ```
/// use draco_edgebreaker::DecoderBuffer;
///
/// let data = [0x44, 0xAC, 0x02];
/// let mut buffer = DecoderBuffer::new(&data);
///
/// assert_eq!(buffer.decode_u8().unwrap(), 0x44);
/// assert_eq!(buffer.decode_varint().unwrap(), 300);
/// assert_eq!(buffer.remaining_size(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct DecoderBuffer<'a> {
    data: &'a [u8],
    pos: usize,
    bit_decoder_active: bool,
    bit_start_pos: usize,
    current_bit_offset: usize,
    bit_stream_end_pos: usize,
    bit_sequence_size_known: bool,
    version_major: u8,
    version_minor: u8,
}

impl<'a> DecoderBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bit_decoder_active: false,
            bit_start_pos: 0,
            current_bit_offset: 0,
            bit_stream_end_pos: 0,
            bit_sequence_size_known: false,
            version_major: DEFAULT_MESH_VERSION.0,
            version_minor: DEFAULT_MESH_VERSION.1,
        }
    }

    /// Sets the Draco bitstream version for version-dependent decoding.
    pub fn set_version(&mut self, major: u8, minor: u8) {
        self.version_major = major;
        self.version_minor = minor;
    }

    pub fn version_major(&self) -> u8 {
        self.version_major
    }

    pub fn version_minor(&self) -> u8 {
        self.version_minor
    }

    /// Returns true if the buffer version is older than `target`.
    pub fn version_less_than(&self, target: (u8, u8)) -> bool {
        version_less_than(self.version_major, self.version_minor, target)
    }

    /// Returns the current read position in bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining_size(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Advances the position by `n` bytes without reading.
    pub fn advance(&mut self, n: usize) -> Status {
        if n > self.remaining_size() {
            return Err(DracoError::BufferError(format!(
                "Cannot skip {} bytes, only {} remaining",
                n,
                self.remaining_size()
            )));
        }
        self.pos += n;
        Ok(())
    }

    pub fn bit_decoder_active(&self) -> bool {
        self.bit_decoder_active
    }

    fn decode_bit_sequence_size(&mut self) -> Result<u64, DracoError> {
        if self.version_less_than(VERSION_INLINE_SPLIT_EVENTS) {
            self.decode_u64()
        } else {
            self.decode_varint()
        }
    }

    /// Starts bit-level decoding mode.
    ///
    /// When `decode_size` is true, reads the bit sequence size (in bytes) from
    /// the buffer and returns it; the sequence is then bounded by that size.
    pub fn start_bit_decoding(&mut self, decode_size: bool) -> Result<u64, DracoError> {
        if self.bit_decoder_active {
            return Err(DracoError::BufferError("Bit decoding already active".into()));
        }
        let mut size_bytes: u64 = 0;
        if decode_size {
            size_bytes = self.decode_bit_sequence_size()?;
            if size_bytes > self.remaining_size() as u64 {
                return Err(DracoError::BufferError(format!(
                    "Bit sequence of {} bytes exceeds the {} remaining",
                    size_bytes,
                    self.remaining_size()
                )));
            }
        }

        self.bit_start_pos = self.pos;
        self.bit_decoder_active = true;
        self.current_bit_offset = 0;
        self.bit_sequence_size_known = decode_size;
        self.bit_stream_end_pos = if decode_size {
            self.bit_start_pos + size_bytes as usize
        } else {
            self.data.len()
        };
        Ok(size_bytes)
    }

    /// Ends bit-level decoding mode and advances the byte position.
    ///
    /// A sized sequence is skipped entirely, otherwise the position advances
    /// by the number of decoded bits rounded up to whole bytes.
    pub fn end_bit_decoding(&mut self) {
        if !self.bit_decoder_active {
            return;
        }
        self.bit_decoder_active = false;
        if self.bit_sequence_size_known {
            self.pos = self.bit_stream_end_pos;
        } else {
            self.pos = self.bit_start_pos + (self.current_bit_offset + 7) / 8;
        }
    }

    /// Carves a size-prefixed bit sequence out of the buffer.
    ///
    /// Returns a new buffer in bit-decoding mode bounded to the sequence and
    /// moves `self` past it.
    pub fn split_bit_sequence(&mut self) -> Result<DecoderBuffer<'a>, DracoError> {
        let mut sequence = self.clone();
        let size = sequence.start_bit_decoding(true)?;
        self.pos = sequence.pos;
        self.advance(size as usize)?;
        Ok(sequence)
    }

    /// Decodes `nbits` least significant bits as a u32, LSB first.
    pub fn decode_least_significant_bits32(&mut self, nbits: u32) -> Result<u32, DracoError> {
        if !self.bit_decoder_active {
            return Err(DracoError::BufferError("Bit decoding not active".into()));
        }
        if nbits > 32 {
            return Err(DracoError::BufferError("Cannot decode more than 32 bits".into()));
        }
        let mut value = 0;
        for i in 0..nbits {
            let bit = self.get_bit()?;
            value |= bit << i;
        }
        Ok(value)
    }

    fn get_bit(&mut self) -> Result<u32, DracoError> {
        let byte_offset = self.bit_start_pos + self.current_bit_offset / 8;
        let bit_shift = self.current_bit_offset % 8;

        if byte_offset < self.bit_stream_end_pos && byte_offset < self.data.len() {
            let bit = (self.data[byte_offset] >> bit_shift) & 1;
            self.current_bit_offset += 1;
            Ok(bit as u32)
        } else {
            Err(DracoError::BufferError("Unexpected end of bit stream".into()))
        }
    }

    /// Decodes and returns a slice of the specified size.
    pub fn decode_slice(&mut self, size: usize) -> Result<&'a [u8], DracoError> {
        if self.bit_decoder_active {
            return Err(DracoError::BufferError(
                "Cannot decode bytes while bit decoding is active".into(),
            ));
        }
        if size > self.remaining_size() {
            return Err(DracoError::BufferError(format!(
                "Unexpected end of buffer: need {} bytes, have {}",
                size,
                self.remaining_size()
            )));
        }
        let slice = &self.data[self.pos..self.pos + size];
        self.pos += size;
        Ok(slice)
    }

    pub fn decode_u8(&mut self) -> Result<u8, DracoError> {
        Ok(self.decode_slice(1)?[0])
    }

    pub fn decode_u32(&mut self) -> Result<u32, DracoError> {
        Ok(LittleEndian::read_u32(self.decode_slice(4)?))
    }

    pub fn decode_i32(&mut self) -> Result<i32, DracoError> {
        Ok(LittleEndian::read_i32(self.decode_slice(4)?))
    }

    pub fn decode_u64(&mut self) -> Result<u64, DracoError> {
        Ok(LittleEndian::read_u64(self.decode_slice(8)?))
    }

    /// Decodes a variable-length unsigned integer (varint).
    pub fn decode_varint(&mut self) -> Result<u64, DracoError> {
        let mut val = 0u64;
        let mut shift = 0;
        loop {
            let b = self.decode_u8()?;
            val |= ((b & 0x7F) as u64) << shift;
            if (b & 0x80) == 0 {
                break;
            }
            shift += 7;
            if shift >= 64 {
                return Err(DracoError::BufferError("Varint exceeds 64 bits".into()));
            }
        }
        Ok(val)
    }

    /// Decodes a varint that must fit into 32 bits.
    pub fn decode_varint_u32(&mut self) -> Result<u32, DracoError> {
        let value = self.decode_varint()?;
        value
            .to_u32()
            .ok_or_else(|| DracoError::BufferError(format!("Varint {} exceeds 32 bits", value)))
    }

    /// Decodes a zig-zag coded signed varint.
    pub fn decode_varint_signed_i32(&mut self) -> Result<i32, DracoError> {
        let symbol = self.decode_varint_u32()?;
        let v = (symbol >> 1) as i32;
        if symbol & 1 == 0 {
            Ok(v)
        } else {
            Ok(-v - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder_buffer::EncoderBuffer;

    #[test]
    fn test_fixed_width_reads() {
        let data = [0x78, 0x56, 0x34, 0x12, 0xFF];
        let mut buffer = DecoderBuffer::new(&data);
        assert_eq!(buffer.decode_u32().unwrap(), 0x12345678);
        assert_eq!(buffer.decode_u8().unwrap(), 0xFF);
        assert!(buffer.decode_u8().is_err());
    }

    #[test]
    fn test_varint_u32_overflow() {
        let mut enc = EncoderBuffer::new();
        enc.encode_varint(u64::from(u32::MAX) + 1).unwrap();
        let mut buffer = DecoderBuffer::new(enc.data());
        assert!(buffer.decode_varint_u32().is_err());
    }

    #[test]
    fn test_signed_varint() {
        let mut enc = EncoderBuffer::new();
        for v in [-5, -1, 0, 1, 77] {
            enc.encode_varint_signed_i32(v).unwrap();
        }
        let mut buffer = DecoderBuffer::new(enc.data());
        for v in [-5, -1, 0, 1, 77] {
            assert_eq!(buffer.decode_varint_signed_i32().unwrap(), v);
        }
    }

    #[test]
    fn test_unsized_bit_decoding_advances_by_bytes() {
        let data = [0b0000_0101, 0xAA];
        let mut buffer = DecoderBuffer::new(&data);
        buffer.start_bit_decoding(false).unwrap();
        assert_eq!(buffer.decode_least_significant_bits32(3).unwrap(), 0b101);
        buffer.end_bit_decoding();
        assert_eq!(buffer.decode_u8().unwrap(), 0xAA);
    }

    #[test]
    fn test_split_bit_sequence() {
        let mut enc = EncoderBuffer::new();
        enc.start_bit_encoding(16, true).unwrap();
        enc.encode_least_significant_bits32(3, 0b110).unwrap();
        enc.end_bit_encoding().unwrap();
        enc.encode_u8(42).unwrap();

        let mut buffer = DecoderBuffer::new(enc.data());
        let mut bits = buffer.split_bit_sequence().unwrap();
        assert_eq!(buffer.decode_u8().unwrap(), 42);
        assert_eq!(bits.decode_least_significant_bits32(3).unwrap(), 0b110);
        // Padding bits of the last byte are readable, nothing past them.
        assert_eq!(bits.decode_least_significant_bits32(5).unwrap(), 0);
        assert!(bits.decode_least_significant_bits32(1).is_err());
    }

    #[test]
    fn test_legacy_bit_sequence_size() {
        let mut data = vec![1, 0, 0, 0, 0, 0, 0, 0];
        data.push(0b1);
        let mut buffer = DecoderBuffer::new(&data);
        buffer.set_version(2, 1);
        let size = buffer.start_bit_decoding(true).unwrap();
        assert_eq!(size, 1);
        assert_eq!(buffer.decode_least_significant_bits32(1).unwrap(), 1);
        buffer.end_bit_decoding();
        assert_eq!(buffer.remaining_size(), 0);
    }

    #[test]
    fn test_truncated_bit_sequence_is_rejected() {
        let data = [5u8, 0xFF];
        let mut buffer = DecoderBuffer::new(&data);
        assert!(buffer.split_bit_sequence().is_err());
    }
}
