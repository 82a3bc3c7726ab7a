//! Valence predictive traversal encoder.
//!
//! The decoder rebuilds the mesh in reverse traversal order and knows the
//! valence every vertex has gained so far. The encoder mirrors that number
//! by starting from the full valences and removing the contribution of each
//! encoded face. Every symbol except the last one is then coded as a hit
//! flag against [`predict_symbol`], and only mispredicted symbols are stored
//! with their full bit pattern.

use tracing::debug;

use crate::bit_utils::BinaryEncoder;
use crate::compression_config::MeshEdgebreakerConnectivityEncodingMethod;
use crate::corner_table::{CornerTable, CornerTableView};
use crate::encoder_buffer::EncoderBuffer;
use crate::geometry_indices::{CornerIndex, VertexIndex, INVALID_CORNER_INDEX};
use crate::mesh_edgebreaker_shared::{predict_symbol, EdgebreakerSymbol};
use crate::mesh_edgebreaker_traversal_encoder::{MeshEdgebreakerTraversalEncoder, TraversalEncoder};
use crate::rans_bit_encoder::RAnsBitEncoder;
use crate::status::{DracoError, Status};

#[derive(Debug)]
pub struct MeshEdgebreakerTraversalValenceEncoder<B: BinaryEncoder = RAnsBitEncoder> {
    base: MeshEdgebreakerTraversalEncoder<B>,
    vertex_valences: Vec<i32>,
    // Vertices are split on S symbols, so the map diverges from the table.
    corner_to_vertex_map: Vec<usize>,
    last_corner: CornerIndex,
    prev_symbol: Option<EdgebreakerSymbol>,
    // Pairs of (tip valence, symbol) in traversal order.
    predicted_symbols: Vec<(i32, EdgebreakerSymbol)>,
}

impl<B: BinaryEncoder> Default for MeshEdgebreakerTraversalValenceEncoder<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BinaryEncoder> MeshEdgebreakerTraversalValenceEncoder<B> {
    pub fn new() -> Self {
        Self {
            base: MeshEdgebreakerTraversalEncoder::new(),
            vertex_valences: Vec::new(),
            corner_to_vertex_map: Vec::new(),
            last_corner: INVALID_CORNER_INDEX,
            prev_symbol: None,
            predicted_symbols: Vec::new(),
        }
    }

    /// Symbols in traversal order.
    pub fn symbols(&self) -> &[EdgebreakerSymbol] {
        self.base.symbols()
    }

    fn vertex_of(&self, corner: CornerIndex) -> Option<usize> {
        self.corner_to_vertex_map.get(corner.as_usize()).copied()
    }

    fn valence_at(&self, corner: CornerIndex) -> i32 {
        self.vertex_of(corner)
            .and_then(|v| self.vertex_valences.get(v).copied())
            .unwrap_or(0)
    }

    fn add_valence(&mut self, corner: CornerIndex, delta: i32) {
        if let Some(v) = self.vertex_of(corner) {
            if let Some(valence) = self.vertex_valences.get_mut(v) {
                *valence += delta;
            }
        }
    }

    /// The decoder merges the two fans of the tip vertex only when it reaches
    /// the S face, so until then they count as separate vertices.
    fn split_tip_vertex(&mut self, corner_table: &CornerTable, visited_faces: &[bool]) {
        let is_visited = |c: CornerIndex| {
            visited_faces
                .get(corner_table.face(c).as_usize())
                .copied()
                .unwrap_or(true)
        };
        let next = corner_table.next(self.last_corner);
        let prev = corner_table.previous(self.last_corner);

        let mut num_left_faces = 0;
        let mut act_c = corner_table.opposite(prev);
        while act_c.is_valid() && !is_visited(act_c) {
            num_left_faces += 1;
            act_c = corner_table.opposite(corner_table.next(act_c));
        }
        if let Some(v) = self.vertex_of(self.last_corner) {
            if let Some(valence) = self.vertex_valences.get_mut(v) {
                *valence = num_left_faces + 1;
            }
        }

        let new_vert_id = self.vertex_valences.len();
        let mut num_right_faces = 0;
        act_c = corner_table.opposite(next);
        while act_c.is_valid() && !is_visited(act_c) {
            num_right_faces += 1;
            if let Some(slot) = self
                .corner_to_vertex_map
                .get_mut(corner_table.next(act_c).as_usize())
            {
                *slot = new_vert_id;
            }
            act_c = corner_table.opposite(corner_table.previous(act_c));
        }
        self.vertex_valences.push(num_right_faces + 1);
    }
}

impl<B: BinaryEncoder> TraversalEncoder for MeshEdgebreakerTraversalValenceEncoder<B> {
    fn method(&self) -> MeshEdgebreakerConnectivityEncodingMethod {
        MeshEdgebreakerConnectivityEncodingMethod::Valence
    }

    fn init(&mut self, corner_table: &CornerTable, num_attribute_data: usize) -> Status {
        self.base.init(corner_table, num_attribute_data)?;
        self.vertex_valences = (0..corner_table.num_vertices())
            .map(|v| corner_table.valence(VertexIndex::from(v)))
            .collect();
        self.corner_to_vertex_map = (0..corner_table.num_corners())
            .map(|c| corner_table.vertex(CornerIndex::from(c)).as_usize())
            .collect();
        self.last_corner = INVALID_CORNER_INDEX;
        self.prev_symbol = None;
        self.predicted_symbols.clear();
        Ok(())
    }

    fn new_corner_reached(&mut self, corner: CornerIndex) {
        self.last_corner = corner;
    }

    fn encode_symbol(
        &mut self,
        symbol: EdgebreakerSymbol,
        corner_table: &CornerTable,
        visited_faces: &[bool],
    ) {
        self.base.encode_symbol(symbol, corner_table, visited_faces);

        let corner = self.last_corner;
        let next = corner_table.next(corner);
        let prev = corner_table.previous(corner);
        // Valence of the vertex the decoder uses to predict the previous symbol.
        let active_valence = self.valence_at(next);
        match symbol {
            EdgebreakerSymbol::C => {
                self.add_valence(next, -1);
                self.add_valence(prev, -1);
            }
            EdgebreakerSymbol::S => {
                self.add_valence(next, -1);
                self.add_valence(prev, -1);
                self.split_tip_vertex(corner_table, visited_faces);
            }
            EdgebreakerSymbol::R => {
                self.add_valence(corner, -1);
                self.add_valence(next, -1);
                self.add_valence(prev, -2);
            }
            EdgebreakerSymbol::L => {
                self.add_valence(corner, -1);
                self.add_valence(next, -2);
                self.add_valence(prev, -1);
            }
            EdgebreakerSymbol::E => {
                self.add_valence(corner, -2);
                self.add_valence(next, -2);
                self.add_valence(prev, -2);
            }
        }
        if let Some(prev_symbol) = self.prev_symbol {
            self.predicted_symbols.push((active_valence, prev_symbol));
        }
        self.prev_symbol = Some(symbol);
    }

    fn encode_start_face_configuration(&mut self, interior: bool) {
        self.base.encode_start_face_configuration(interior);
    }

    fn encode_attribute_seam(&mut self, attribute: usize, is_seam: bool) {
        self.base.encode_attribute_seam(attribute, is_seam);
    }

    fn num_encoded_symbols(&self) -> usize {
        self.base.num_encoded_symbols()
    }

    fn done(&mut self, _corner_table: &CornerTable) -> Result<EncoderBuffer, DracoError> {
        let mut buffer = EncoderBuffer::new();
        self.base.encode_start_faces(&mut buffer)?;
        self.base.encode_attribute_seams(&mut buffer)?;

        // Flags and corrections are stored in decoding order.
        let mut flag_encoder = B::default();
        flag_encoder.start_encoding();
        let mut mispredicted = Vec::new();
        for &(valence, symbol) in self.predicted_symbols.iter().rev() {
            let hit = predict_symbol(valence) == symbol;
            flag_encoder.encode_bit(hit);
            if !hit {
                mispredicted.push(symbol);
            }
        }
        flag_encoder.end_encoding(&mut buffer)?;

        let num_bits: usize = mispredicted
            .iter()
            .map(|s| s.bit_pattern_length() as usize)
            .sum();
        buffer.start_bit_encoding(num_bits, true)?;
        for symbol in &mispredicted {
            buffer.encode_least_significant_bits32(
                symbol.bit_pattern_length(),
                symbol.bit_pattern(),
            )?;
        }
        buffer.end_bit_encoding()?;

        debug!(
            symbols = self.num_encoded_symbols(),
            mispredicted = mispredicted.len(),
            "valence traversal encoded"
        );
        Ok(buffer)
    }
}
