//! Binary asymmetric numeral system (rABS) primitives.
//!
//! The coder writes its state renormalization bytes forward and the decoder
//! consumes them backwards, so bits must be written in reverse order.

use byteorder::{ByteOrder, LittleEndian};

use crate::status::{invalid_data, DracoError, Status};

pub const ANS_P8_PRECISION: u32 = 256;
pub const ANS_L_BASE: u32 = 4096;
pub const ANS_IO_BASE: u32 = 256;

#[derive(Debug)]
pub struct AnsCoder {
    buf: Vec<u8>,
    state: u32,
}

impl Default for AnsCoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnsCoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            state: ANS_L_BASE,
        }
    }

    pub fn write_init(&mut self) {
        self.buf.clear();
        self.state = ANS_L_BASE;
    }

    /// Encodes `val` with probability `p0 / 256` of being false.
    pub fn rabs_desc_write(&mut self, val: bool, p0: u8) {
        let p = ANS_P8_PRECISION - p0 as u32;
        let l_s = if val { p } else { p0 as u32 };
        if self.state >= ANS_L_BASE / ANS_P8_PRECISION * ANS_IO_BASE * l_s {
            self.buf.push((self.state % ANS_IO_BASE) as u8);
            self.state /= ANS_IO_BASE;
        }
        let quot = self.state / l_s;
        let rem = self.state % l_s;
        self.state = quot * ANS_P8_PRECISION + rem + if val { 0 } else { p };
    }

    /// Flushes the final state. The top two bits of the last byte tell the
    /// decoder how many bytes the state occupies.
    pub fn write_end(&mut self) -> Status {
        let state = self.state - ANS_L_BASE;
        if state < (1 << 6) {
            self.buf.push(state as u8);
        } else if state < (1 << 14) {
            let mut bytes = [0u8; 2];
            LittleEndian::write_u16(&mut bytes, ((0x01 << 14) + state) as u16);
            self.buf.extend_from_slice(&bytes);
        } else if state < (1 << 22) {
            let mut bytes = [0u8; 3];
            LittleEndian::write_u24(&mut bytes, (0x02 << 22) + state);
            self.buf.extend_from_slice(&bytes);
        } else {
            return Err(DracoError::DracoError(format!(
                "State is too large to be serialized: {}",
                state
            )));
        }
        Ok(())
    }

    pub fn data(&self) -> &[u8] {
        &self.buf
    }
}

#[derive(Debug)]
pub struct AnsDecoder<'a> {
    buf: &'a [u8],
    buf_offset: usize,
    state: u32,
}

impl<'a> AnsDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            buf_offset: 0,
            state: 0,
        }
    }

    pub fn read_init(&mut self) -> Status {
        let offset = self.buf.len();
        if offset == 0 {
            return Err(invalid_data("Empty rANS payload"));
        }
        let (state, width) = match self.buf[offset - 1] >> 6 {
            0 => ((self.buf[offset - 1] & 0x3F) as u32, 1),
            1 if offset >= 2 => {
                (LittleEndian::read_u16(&self.buf[offset - 2..]) as u32 & 0x3FFF, 2)
            }
            2 if offset >= 3 => (LittleEndian::read_u24(&self.buf[offset - 3..]) & 0x3F_FFFF, 3),
            _ => return Err(invalid_data("Malformed rANS state")),
        };
        self.buf_offset = offset - width;
        self.state = state + ANS_L_BASE;
        if self.state >= ANS_L_BASE * ANS_IO_BASE {
            return Err(invalid_data("rANS state out of range"));
        }
        Ok(())
    }

    pub fn rabs_desc_read(&mut self, p0: u8) -> bool {
        let p = ANS_P8_PRECISION - p0 as u32;
        if self.state < ANS_L_BASE && self.buf_offset > 0 {
            self.buf_offset -= 1;
            self.state = self.state * ANS_IO_BASE + self.buf[self.buf_offset] as u32;
        }
        let x = self.state;
        let quot = x / ANS_P8_PRECISION;
        let rem = x % ANS_P8_PRECISION;
        let xn = quot * p;
        let val = rem < p;
        if val {
            self.state = xn + rem;
        } else {
            self.state = x - xn - p;
        }
        val
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rabs_round_trip() {
        let bits = [true, false, false, true, true, true, false, true, false, false];
        let p0 = 100;
        let mut coder = AnsCoder::new();
        coder.write_init();
        for &bit in bits.iter().rev() {
            coder.rabs_desc_write(bit, p0);
        }
        coder.write_end().unwrap();

        let mut decoder = AnsDecoder::new(coder.data());
        decoder.read_init().unwrap();
        for &bit in bits.iter() {
            assert_eq!(decoder.rabs_desc_read(p0), bit);
        }
    }

    #[test]
    fn test_read_init_rejects_empty_payload() {
        let mut decoder = AnsDecoder::new(&[]);
        assert!(decoder.read_init().is_err());
        let mut decoder = AnsDecoder::new(&[0xC0]);
        assert!(decoder.read_init().is_err());
    }
}
