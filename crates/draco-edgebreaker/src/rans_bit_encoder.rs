use crate::ans::AnsCoder;
use crate::bit_utils::{count_one_bits32, reverse_bits32, BinaryEncoder};
use crate::encoder_buffer::EncoderBuffer;
use crate::status::Status;

/// Adaptive binary coder. The probability of a zero bit is measured over the
/// whole sequence and stored in front of the rANS payload.
#[derive(Debug, Default)]
pub struct RAnsBitEncoder {
    bit_counts: [u64; 2],
    bits: Vec<u32>,
    local_bits: u32,
    num_local_bits: u32,
}

impl RAnsBitEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear(&mut self) {
        self.bit_counts = [0; 2];
        self.bits.clear();
        self.local_bits = 0;
        self.num_local_bits = 0;
    }

    /// Probability of a zero bit mapped to [1, 255].
    fn zero_probability(&self) -> u8 {
        let total = (self.bit_counts[0] + self.bit_counts[1]).max(1);
        let zero_prob_raw = ((self.bit_counts[0] as f64 / total as f64) * 256.0 + 0.5) as u32;
        zero_prob_raw.clamp(1, 255) as u8
    }
}

impl BinaryEncoder for RAnsBitEncoder {
    fn start_encoding(&mut self) {
        self.clear();
    }

    fn encode_bit(&mut self, bit: bool) {
        if bit {
            self.bit_counts[1] += 1;
            self.local_bits |= 1 << self.num_local_bits;
        } else {
            self.bit_counts[0] += 1;
        }
        self.num_local_bits += 1;

        if self.num_local_bits == 32 {
            self.bits.push(self.local_bits);
            self.num_local_bits = 0;
            self.local_bits = 0;
        }
    }

    fn encode_least_significant_bits32(&mut self, nbits: u32, value: u32) {
        debug_assert!(nbits > 0 && nbits <= 32);

        let reversed = reverse_bits32(value) >> (32 - nbits);
        let ones = count_one_bits32(reversed);
        self.bit_counts[0] += (nbits - ones) as u64;
        self.bit_counts[1] += ones as u64;

        let remaining = 32 - self.num_local_bits;
        if nbits <= remaining {
            self.local_bits |= reversed.checked_shl(self.num_local_bits).unwrap_or(0);
            self.num_local_bits += nbits;
            if self.num_local_bits == 32 {
                self.bits.push(self.local_bits);
                self.local_bits = 0;
                self.num_local_bits = 0;
            }
        } else {
            self.local_bits |= reversed << self.num_local_bits;
            self.bits.push(self.local_bits);
            self.local_bits = reversed >> remaining;
            self.num_local_bits = nbits - remaining;
        }
    }

    fn end_encoding(&mut self, target_buffer: &mut EncoderBuffer) -> Status {
        let zero_prob = self.zero_probability();

        let mut ans_coder = AnsCoder::new();
        ans_coder.write_init();
        for i in (0..self.num_local_bits).rev() {
            let bit = (self.local_bits >> i) & 1;
            ans_coder.rabs_desc_write(bit != 0, zero_prob);
        }
        for &word in self.bits.iter().rev() {
            for i in (0..32).rev() {
                let bit = (word >> i) & 1;
                ans_coder.rabs_desc_write(bit != 0, zero_prob);
            }
        }
        ans_coder.write_end()?;

        target_buffer.encode_u8(zero_prob)?;
        target_buffer.encode_varint(ans_coder.data().len() as u64)?;
        target_buffer.encode_data(ans_coder.data())?;
        self.clear();
        Ok(())
    }
}
