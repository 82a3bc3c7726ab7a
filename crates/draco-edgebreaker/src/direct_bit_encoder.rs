use crate::bit_utils::BinaryEncoder;
use crate::encoder_buffer::EncoderBuffer;
use crate::status::Status;

/// Stores bits verbatim in 32-bit words, most significant bit first.
#[derive(Debug, Default)]
pub struct DirectBitEncoder {
    bits: Vec<u32>,
    local_bits: u32,
    num_local_bits: u32,
}

impl DirectBitEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear(&mut self) {
        self.bits.clear();
        self.local_bits = 0;
        self.num_local_bits = 0;
    }

    fn flush_full_word(&mut self) {
        if self.num_local_bits == 32 {
            self.bits.push(self.local_bits);
            self.num_local_bits = 0;
            self.local_bits = 0;
        }
    }
}

impl BinaryEncoder for DirectBitEncoder {
    fn start_encoding(&mut self) {
        self.clear();
    }

    fn encode_bit(&mut self, bit: bool) {
        if bit {
            self.local_bits |= 1u32 << (31 - self.num_local_bits);
        }
        self.num_local_bits += 1;
        self.flush_full_word();
    }

    fn encode_least_significant_bits32(&mut self, nbits: u32, value: u32) {
        debug_assert!(nbits > 0 && nbits <= 32);

        let remaining = 32 - self.num_local_bits;
        // Drop leading bits that are not part of the value.
        let value = value << (32 - nbits);

        if nbits <= remaining {
            self.local_bits |= value >> self.num_local_bits;
            self.num_local_bits += nbits;
            self.flush_full_word();
        } else {
            let value = value >> (32 - nbits);
            self.num_local_bits = nbits - remaining;
            self.local_bits |= value >> self.num_local_bits;
            self.bits.push(self.local_bits);
            self.local_bits = value << (32 - self.num_local_bits);
        }
    }

    fn end_encoding(&mut self, target_buffer: &mut EncoderBuffer) -> Status {
        self.bits.push(self.local_bits);
        let size_in_bytes = (self.bits.len() * 4) as u32;
        target_buffer.encode_u32(size_in_bytes)?;
        for &word in &self.bits {
            target_buffer.encode_u32(word)?;
        }
        self.clear();
        Ok(())
    }
}
