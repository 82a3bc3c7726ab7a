//! Reading side of [`crate::mesh_edgebreaker_traversal_encoder`].

use crate::bit_utils::BinaryDecoder;
use crate::corner_table::CornerTable;
use crate::decoder_buffer::DecoderBuffer;
use crate::geometry_indices::{CornerIndex, VertexIndex};
use crate::mesh_edgebreaker_shared::EdgebreakerSymbol;
use crate::rans_bit_decoder::RAnsBitDecoder;
use crate::status::{invalid_data, DracoError, Status};
use crate::version::VERSION_INLINE_SPLIT_EVENTS;

/// Source of the symbols, start face configurations and seam flags of one
/// connectivity decoding pass.
pub trait TraversalDecoder<'a> {
    /// `buffer` starts at the traversal data. `num_vertices` is the largest
    /// number of vertices the decoder may create.
    fn init(
        &mut self,
        buffer: DecoderBuffer<'a>,
        num_vertices: usize,
        num_faces: usize,
        num_attribute_data: usize,
    );

    /// Prepares all streams. Returns the buffer positioned after the
    /// traversal data.
    fn start(&mut self) -> Result<DecoderBuffer<'a>, DracoError>;

    fn decode_symbol(&mut self) -> Result<EdgebreakerSymbol, DracoError>;

    /// Called after every decoded symbol with the new top of the active
    /// corner stack.
    fn new_active_corner_reached(&mut self, _corner_table: &CornerTable, _corner: CornerIndex) {}

    /// `source` is unified into `dest` by an S symbol.
    fn merge_vertices(&mut self, _dest: VertexIndex, _source: VertexIndex) {}

    fn decode_start_face_configuration(&mut self) -> Result<bool, DracoError>;

    fn decode_attribute_seam(&mut self, attribute: usize) -> bool;

    fn done(&mut self);
}

/// Reads one CLERS code from a bit sequence.
pub(crate) fn decode_symbol_bits(
    buffer: &mut DecoderBuffer<'_>,
) -> Result<EdgebreakerSymbol, DracoError> {
    let symbol = buffer.decode_least_significant_bits32(1)?;
    if symbol == EdgebreakerSymbol::C.bit_pattern() {
        return Ok(EdgebreakerSymbol::C);
    }
    let suffix = buffer.decode_least_significant_bits32(2)?;
    EdgebreakerSymbol::from_bit_pattern(symbol | (suffix << 1))
}

#[derive(Debug)]
pub struct MeshEdgebreakerTraversalDecoder<'a, B: BinaryDecoder<'a> = RAnsBitDecoder<'a>> {
    buffer: DecoderBuffer<'a>,
    symbol_buffer: Option<DecoderBuffer<'a>>,
    // Start faces are a plain bit sequence before 2.2.
    start_face_buffer: Option<DecoderBuffer<'a>>,
    start_face_decoder: B,
    attribute_connectivity_decoders: Vec<B>,
    num_attribute_data: usize,
}

impl<'a, B: BinaryDecoder<'a>> Default for MeshEdgebreakerTraversalDecoder<'a, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, B: BinaryDecoder<'a>> MeshEdgebreakerTraversalDecoder<'a, B> {
    pub fn new() -> Self {
        Self {
            buffer: DecoderBuffer::new(&[]),
            symbol_buffer: None,
            start_face_buffer: None,
            start_face_decoder: B::default(),
            attribute_connectivity_decoders: Vec::new(),
            num_attribute_data: 0,
        }
    }

    pub(crate) fn buffer(&self) -> &DecoderBuffer<'a> {
        &self.buffer
    }

    pub(crate) fn is_legacy(&self) -> bool {
        self.buffer.version_less_than(VERSION_INLINE_SPLIT_EVENTS)
    }

    pub(crate) fn decode_traversal_symbols(&mut self) -> Status {
        self.symbol_buffer = Some(self.buffer.split_bit_sequence()?);
        Ok(())
    }

    pub(crate) fn decode_start_faces(&mut self) -> Status {
        if self.is_legacy() {
            self.start_face_buffer = Some(self.buffer.split_bit_sequence()?);
            return Ok(());
        }
        self.start_face_decoder.start_decoding(&mut self.buffer)
    }

    pub(crate) fn decode_attribute_seams(&mut self) -> Status {
        self.attribute_connectivity_decoders.clear();
        for _ in 0..self.num_attribute_data {
            let mut decoder = B::default();
            decoder.start_decoding(&mut self.buffer)?;
            self.attribute_connectivity_decoders.push(decoder);
        }
        Ok(())
    }
}

impl<'a, B: BinaryDecoder<'a>> TraversalDecoder<'a> for MeshEdgebreakerTraversalDecoder<'a, B> {
    fn init(
        &mut self,
        buffer: DecoderBuffer<'a>,
        _num_vertices: usize,
        _num_faces: usize,
        num_attribute_data: usize,
    ) {
        self.buffer = buffer;
        self.symbol_buffer = None;
        self.start_face_buffer = None;
        self.num_attribute_data = num_attribute_data;
    }

    fn start(&mut self) -> Result<DecoderBuffer<'a>, DracoError> {
        self.decode_traversal_symbols()?;
        self.decode_start_faces()?;
        self.decode_attribute_seams()?;
        Ok(self.buffer.clone())
    }

    fn decode_symbol(&mut self) -> Result<EdgebreakerSymbol, DracoError> {
        let buffer = self
            .symbol_buffer
            .as_mut()
            .ok_or_else(|| invalid_data("Traversal symbols were not started"))?;
        decode_symbol_bits(buffer)
    }

    fn decode_start_face_configuration(&mut self) -> Result<bool, DracoError> {
        match self.start_face_buffer.as_mut() {
            Some(buffer) => Ok(buffer.decode_least_significant_bits32(1)? != 0),
            None => Ok(self.start_face_decoder.decode_next_bit()),
        }
    }

    fn decode_attribute_seam(&mut self, attribute: usize) -> bool {
        self.attribute_connectivity_decoders
            .get_mut(attribute)
            .map(|decoder| decoder.decode_next_bit())
            .unwrap_or(false)
    }

    fn done(&mut self) {
        if let Some(buffer) = self.symbol_buffer.as_mut() {
            buffer.end_bit_decoding();
        }
        if let Some(buffer) = self.start_face_buffer.as_mut() {
            buffer.end_bit_decoding();
        }
        self.start_face_decoder.end_decoding();
        for decoder in &mut self.attribute_connectivity_decoders {
            decoder.end_decoding();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder_buffer::EncoderBuffer;

    #[test]
    fn test_symbol_bits() {
        let symbols = [
            EdgebreakerSymbol::E,
            EdgebreakerSymbol::C,
            EdgebreakerSymbol::S,
            EdgebreakerSymbol::L,
            EdgebreakerSymbol::R,
            EdgebreakerSymbol::C,
        ];
        let mut buffer = EncoderBuffer::new();
        buffer.start_bit_encoding(symbols.len() * 3, true).unwrap();
        for symbol in &symbols {
            buffer
                .encode_least_significant_bits32(symbol.bit_pattern_length(), symbol.bit_pattern())
                .unwrap();
        }
        buffer.end_bit_encoding().unwrap();

        let mut decoder_buffer = DecoderBuffer::new(buffer.data());
        let mut sequence = decoder_buffer.split_bit_sequence().unwrap();
        for symbol in &symbols {
            assert_eq!(decode_symbol_bits(&mut sequence).unwrap(), *symbol);
        }
        assert_eq!(decoder_buffer.remaining_size(), 0);
    }
}
