//! Reading side of
//! [`MeshEdgebreakerTraversalValenceEncoder`](crate::MeshEdgebreakerTraversalValenceEncoder).

use crate::bit_utils::BinaryDecoder;
use crate::corner_table::{CornerTable, CornerTableView};
use crate::decoder_buffer::DecoderBuffer;
use crate::geometry_indices::{CornerIndex, VertexIndex};
use crate::mesh_edgebreaker_shared::{predict_symbol, EdgebreakerSymbol, VALENCE_MODE_2_7};
use crate::mesh_edgebreaker_traversal_decoder::{
    decode_symbol_bits, MeshEdgebreakerTraversalDecoder, TraversalDecoder,
};
use crate::rans_bit_decoder::RAnsBitDecoder;
use crate::status::{invalid_data, DracoError};
use crate::version::VERSION_VARINT_ENCODING;

#[derive(Debug)]
pub struct MeshEdgebreakerTraversalValenceDecoder<'a, B: BinaryDecoder<'a> = RAnsBitDecoder<'a>> {
    base: MeshEdgebreakerTraversalDecoder<'a, B>,
    flag_decoder: B,
    mispredicted_symbols: Option<DecoderBuffer<'a>>,
    vertex_valences: Vec<i32>,
    num_vertices: usize,
    // Valence of the tip vertex of the active edge, unset before the first symbol.
    active_valence: Option<i32>,
    last_symbol: Option<EdgebreakerSymbol>,
}

impl<'a, B: BinaryDecoder<'a>> Default for MeshEdgebreakerTraversalValenceDecoder<'a, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, B: BinaryDecoder<'a>> MeshEdgebreakerTraversalValenceDecoder<'a, B> {
    pub fn new() -> Self {
        Self {
            base: MeshEdgebreakerTraversalDecoder::new(),
            flag_decoder: B::default(),
            mispredicted_symbols: None,
            vertex_valences: Vec::new(),
            num_vertices: 0,
            active_valence: None,
            last_symbol: None,
        }
    }

    fn add_valence(&mut self, vertex: VertexIndex, delta: i32) {
        if let Some(valence) = self.vertex_valences.get_mut(vertex.as_usize()) {
            *valence += delta;
        }
    }

    fn valence(&self, vertex: VertexIndex) -> i32 {
        self.vertex_valences
            .get(vertex.as_usize())
            .copied()
            .unwrap_or(0)
    }
}

impl<'a, B: BinaryDecoder<'a>> TraversalDecoder<'a>
    for MeshEdgebreakerTraversalValenceDecoder<'a, B>
{
    fn init(
        &mut self,
        buffer: DecoderBuffer<'a>,
        num_vertices: usize,
        num_faces: usize,
        num_attribute_data: usize,
    ) {
        self.base
            .init(buffer, num_vertices, num_faces, num_attribute_data);
        self.num_vertices = num_vertices;
        self.mispredicted_symbols = None;
        self.active_valence = None;
        self.last_symbol = None;
    }

    fn start(&mut self) -> Result<DecoderBuffer<'a>, DracoError> {
        let legacy = self.base.is_legacy();
        if legacy {
            // Only the first symbol is read from here.
            self.base.decode_traversal_symbols()?;
        }
        self.base.decode_start_faces()?;
        self.base.decode_attribute_seams()?;
        let mut out_buffer = self.base.buffer().clone();

        if legacy {
            let num_split_symbols = if out_buffer.version_less_than(VERSION_VARINT_ENCODING) {
                out_buffer.decode_u32()?
            } else {
                out_buffer.decode_varint_u32()?
            };
            if num_split_symbols as usize >= self.num_vertices {
                return Err(invalid_data("Too many split symbols in valence stream"));
            }
            let mode = out_buffer.decode_u8()?;
            if mode != VALENCE_MODE_2_7 {
                return Err(DracoError::UnsupportedFeature(format!(
                    "Unknown valence mode {mode}"
                )));
            }
        }

        self.vertex_valences = vec![0; self.num_vertices];
        self.flag_decoder.start_decoding(&mut out_buffer)?;
        self.mispredicted_symbols = Some(out_buffer.split_bit_sequence()?);
        Ok(out_buffer)
    }

    fn decode_symbol(&mut self) -> Result<EdgebreakerSymbol, DracoError> {
        let symbol = match self.active_valence {
            None if self.base.is_legacy() => self.base.decode_symbol()?,
            // The last face of every traversal closes it.
            None => EdgebreakerSymbol::E,
            Some(valence) => {
                if self.flag_decoder.decode_next_bit() {
                    predict_symbol(valence)
                } else {
                    let buffer = self
                        .mispredicted_symbols
                        .as_mut()
                        .ok_or_else(|| invalid_data("Valence symbols were not started"))?;
                    decode_symbol_bits(buffer)?
                }
            }
        };
        self.last_symbol = Some(symbol);
        Ok(symbol)
    }

    fn new_active_corner_reached(&mut self, corner_table: &CornerTable, corner: CornerIndex) {
        let next = corner_table.next(corner);
        let prev = corner_table.previous(corner);
        let (vertex, vertex_next, vertex_prev) = (
            corner_table.vertex(corner),
            corner_table.vertex(next),
            corner_table.vertex(prev),
        );
        match self.last_symbol {
            Some(EdgebreakerSymbol::C) | Some(EdgebreakerSymbol::S) => {
                self.add_valence(vertex_next, 1);
                self.add_valence(vertex_prev, 1);
            }
            Some(EdgebreakerSymbol::R) => {
                self.add_valence(vertex, 1);
                self.add_valence(vertex_next, 1);
                self.add_valence(vertex_prev, 2);
            }
            Some(EdgebreakerSymbol::L) => {
                self.add_valence(vertex, 1);
                self.add_valence(vertex_next, 2);
                self.add_valence(vertex_prev, 1);
            }
            Some(EdgebreakerSymbol::E) => {
                self.add_valence(vertex, 2);
                self.add_valence(vertex_next, 2);
                self.add_valence(vertex_prev, 2);
            }
            None => {}
        }
        self.active_valence = Some(self.valence(vertex_next));
    }

    fn merge_vertices(&mut self, dest: VertexIndex, source: VertexIndex) {
        let source_valence = self.valence(source);
        self.add_valence(dest, source_valence);
    }

    fn decode_start_face_configuration(&mut self) -> Result<bool, DracoError> {
        self.base.decode_start_face_configuration()
    }

    fn decode_attribute_seam(&mut self, attribute: usize) -> bool {
        self.base.decode_attribute_seam(attribute)
    }

    fn done(&mut self) {
        self.base.done();
        self.flag_decoder.end_decoding();
        if let Some(buffer) = self.mispredicted_symbols.as_mut() {
            buffer.end_bit_decoding();
        }
    }
}
