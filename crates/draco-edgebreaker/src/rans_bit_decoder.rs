use crate::ans::AnsDecoder;
use crate::bit_utils::BinaryDecoder;
use crate::decoder_buffer::DecoderBuffer;
use crate::status::{DracoError, Status};
use crate::version::VERSION_INLINE_SPLIT_EVENTS;

#[derive(Debug, Default)]
pub struct RAnsBitDecoder<'a> {
    ans_decoder: Option<AnsDecoder<'a>>,
    prob_zero: u8,
}

impl<'a> RAnsBitDecoder<'a> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> BinaryDecoder<'a> for RAnsBitDecoder<'a> {
    fn start_decoding(&mut self, source_buffer: &mut DecoderBuffer<'a>) -> Status {
        self.end_decoding();
        self.prob_zero = source_buffer.decode_u8()?;

        // The payload size is a fixed u32 before v2.2.
        let size = if source_buffer.version_less_than(VERSION_INLINE_SPLIT_EVENTS) {
            source_buffer.decode_u32()?
        } else {
            source_buffer.decode_varint_u32()?
        };
        if size as usize > source_buffer.remaining_size() {
            return Err(DracoError::BufferError(format!(
                "rANS payload of {} bytes exceeds the {} remaining",
                size,
                source_buffer.remaining_size()
            )));
        }
        let slice = source_buffer.decode_slice(size as usize)?;
        let mut decoder = AnsDecoder::new(slice);
        decoder.read_init()?;
        self.ans_decoder = Some(decoder);
        Ok(())
    }

    fn decode_next_bit(&mut self) -> bool {
        match self.ans_decoder.as_mut() {
            Some(decoder) => decoder.rabs_desc_read(self.prob_zero),
            None => false,
        }
    }

    fn end_decoding(&mut self) {
        self.ans_decoder = None;
    }
}
