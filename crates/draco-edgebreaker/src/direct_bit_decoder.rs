use crate::bit_utils::BinaryDecoder;
use crate::decoder_buffer::DecoderBuffer;
use crate::status::{invalid_data, Status};

#[derive(Debug, Default)]
pub struct DirectBitDecoder {
    bits: Vec<u32>,
    pos: usize,
    num_used_bits: u32,
}

impl DirectBitDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear(&mut self) {
        self.bits.clear();
        self.pos = 0;
        self.num_used_bits = 0;
    }
}

impl<'a> BinaryDecoder<'a> for DirectBitDecoder {
    fn start_decoding(&mut self, source_buffer: &mut DecoderBuffer<'a>) -> Status {
        self.clear();
        let size_in_bytes = source_buffer.decode_u32()?;
        if size_in_bytes == 0 || size_in_bytes & 0x3 != 0 {
            return Err(invalid_data("Direct bit sequence size must be a non-zero multiple of 4"));
        }
        if source_buffer.remaining_size() < size_in_bytes as usize {
            return Err(invalid_data("Direct bit sequence exceeds the buffer"));
        }
        let num_words = (size_in_bytes / 4) as usize;
        self.bits.reserve(num_words);
        for _ in 0..num_words {
            self.bits.push(source_buffer.decode_u32()?);
        }
        Ok(())
    }

    fn decode_next_bit(&mut self) -> bool {
        let Some(&word) = self.bits.get(self.pos) else {
            return false;
        };
        let bit = word & (1u32 << (31 - self.num_used_bits)) != 0;
        self.num_used_bits += 1;
        if self.num_used_bits == 32 {
            self.pos += 1;
            self.num_used_bits = 0;
        }
        bit
    }

    fn end_decoding(&mut self) {}
}
