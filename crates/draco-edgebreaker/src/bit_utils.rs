//! Binary coder interfaces shared by the traversal encoders and decoders.

use crate::decoder_buffer::DecoderBuffer;
use crate::encoder_buffer::EncoderBuffer;
use crate::status::Status;

/// Collects single bits and serializes them at the end of a pass.
pub trait BinaryEncoder: Default {
    fn start_encoding(&mut self);

    fn encode_bit(&mut self, bit: bool);

    /// Encodes the `nbits` least significant bits of `value`, most significant first.
    fn encode_least_significant_bits32(&mut self, nbits: u32, value: u32);

    fn end_encoding(&mut self, target_buffer: &mut EncoderBuffer) -> Status;
}

/// Reads back the bits of a [`BinaryEncoder`].
pub trait BinaryDecoder<'a>: Default {
    /// Consumes the serialized bits from `source_buffer`.
    fn start_decoding(&mut self, source_buffer: &mut DecoderBuffer<'a>) -> Status;

    fn decode_next_bit(&mut self) -> bool;

    fn decode_least_significant_bits32(&mut self, nbits: u32) -> u32 {
        let mut value = 0;
        for _ in 0..nbits {
            value = (value << 1) | self.decode_next_bit() as u32;
        }
        value
    }

    fn end_decoding(&mut self);
}

pub fn reverse_bits32(mut n: u32) -> u32 {
    n = ((n >> 1) & 0x55555555) | ((n & 0x55555555) << 1);
    n = ((n >> 2) & 0x33333333) | ((n & 0x33333333) << 2);
    n = ((n >> 4) & 0x0F0F0F0F) | ((n & 0x0F0F0F0F) << 4);
    n = ((n >> 8) & 0x00FF00FF) | ((n & 0x00FF00FF) << 8);
    (n >> 16) | (n << 16)
}

pub fn count_one_bits32(n: u32) -> u32 {
    n.count_ones()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_bits32() {
        assert_eq!(reverse_bits32(1), 0x8000_0000);
        assert_eq!(reverse_bits32(0b1011), 0xD000_0000);
        assert_eq!(count_one_bits32(0b1011), 3);
    }
}
