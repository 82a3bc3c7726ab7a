//! Serialization of the EdgeBreaker traversal.
//!
//! The connectivity encoder walks the mesh and reports symbols, start face
//! configurations and attribute seams to a [`TraversalEncoder`], which owns
//! the layout of the traversal part of the stream.

use crate::bit_utils::BinaryEncoder;
use crate::compression_config::MeshEdgebreakerConnectivityEncodingMethod;
use crate::corner_table::{CornerTable, CornerTableView};
use crate::encoder_buffer::EncoderBuffer;
use crate::geometry_indices::CornerIndex;
use crate::mesh_edgebreaker_shared::EdgebreakerSymbol;
use crate::rans_bit_encoder::RAnsBitEncoder;
use crate::status::{DracoError, Status};

/// Sink for the events of one connectivity encoding pass.
pub trait TraversalEncoder {
    /// Value of the traversal type byte that selects the matching decoder.
    fn method(&self) -> MeshEdgebreakerConnectivityEncodingMethod;

    /// Called once before the traversal starts.
    fn init(&mut self, corner_table: &CornerTable, num_attribute_data: usize) -> Status;

    /// Reports the corner of the face about to be encoded.
    fn new_corner_reached(&mut self, _corner: CornerIndex) {}

    /// Reports the symbol of the current face. `visited_faces` already
    /// contains the current face.
    fn encode_symbol(
        &mut self,
        symbol: EdgebreakerSymbol,
        corner_table: &CornerTable,
        visited_faces: &[bool],
    );

    fn encode_start_face_configuration(&mut self, interior: bool);

    fn encode_attribute_seam(&mut self, attribute: usize, is_seam: bool);

    fn num_encoded_symbols(&self) -> usize;

    /// Serializes everything collected so far.
    fn done(&mut self, corner_table: &CornerTable) -> Result<EncoderBuffer, DracoError>;
}

/// Writes every symbol with its fixed length bit pattern, last symbol first.
#[derive(Debug, Default)]
pub struct MeshEdgebreakerTraversalEncoder<B: BinaryEncoder = RAnsBitEncoder> {
    symbols: Vec<EdgebreakerSymbol>,
    start_face_encoder: B,
    attribute_connectivity_encoders: Vec<B>,
}

impl<B: BinaryEncoder> MeshEdgebreakerTraversalEncoder<B> {
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            start_face_encoder: B::default(),
            attribute_connectivity_encoders: Vec::new(),
        }
    }

    /// Symbols in traversal order.
    pub fn symbols(&self) -> &[EdgebreakerSymbol] {
        &self.symbols
    }

    pub(crate) fn encode_traversal_symbols(
        &self,
        corner_table: &CornerTable,
        buffer: &mut EncoderBuffer,
    ) -> Status {
        buffer.start_bit_encoding(corner_table.num_faces() * 3, true)?;
        for symbol in self.symbols.iter().rev() {
            buffer.encode_least_significant_bits32(
                symbol.bit_pattern_length(),
                symbol.bit_pattern(),
            )?;
        }
        buffer.end_bit_encoding()
    }

    pub(crate) fn encode_start_faces(&mut self, buffer: &mut EncoderBuffer) -> Status {
        self.start_face_encoder.end_encoding(buffer)
    }

    pub(crate) fn encode_attribute_seams(&mut self, buffer: &mut EncoderBuffer) -> Status {
        for encoder in &mut self.attribute_connectivity_encoders {
            encoder.end_encoding(buffer)?;
        }
        Ok(())
    }
}

impl<B: BinaryEncoder> TraversalEncoder for MeshEdgebreakerTraversalEncoder<B> {
    fn method(&self) -> MeshEdgebreakerConnectivityEncodingMethod {
        MeshEdgebreakerConnectivityEncodingMethod::Standard
    }

    fn init(&mut self, _corner_table: &CornerTable, num_attribute_data: usize) -> Status {
        self.symbols.clear();
        self.start_face_encoder = B::default();
        self.start_face_encoder.start_encoding();
        self.attribute_connectivity_encoders = (0..num_attribute_data)
            .map(|_| {
                let mut encoder = B::default();
                encoder.start_encoding();
                encoder
            })
            .collect();
        Ok(())
    }

    fn encode_symbol(
        &mut self,
        symbol: EdgebreakerSymbol,
        _corner_table: &CornerTable,
        _visited_faces: &[bool],
    ) {
        self.symbols.push(symbol);
    }

    fn encode_start_face_configuration(&mut self, interior: bool) {
        self.start_face_encoder.encode_bit(interior);
    }

    fn encode_attribute_seam(&mut self, attribute: usize, is_seam: bool) {
        if let Some(encoder) = self.attribute_connectivity_encoders.get_mut(attribute) {
            encoder.encode_bit(is_seam);
        }
    }

    fn num_encoded_symbols(&self) -> usize {
        self.symbols.len()
    }

    fn done(&mut self, corner_table: &CornerTable) -> Result<EncoderBuffer, DracoError> {
        let mut buffer = EncoderBuffer::new();
        self.encode_traversal_symbols(corner_table, &mut buffer)?;
        self.encode_start_faces(&mut buffer)?;
        self.encode_attribute_seams(&mut buffer)?;
        Ok(buffer)
    }
}
