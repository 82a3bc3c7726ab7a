//! EdgeBreaker connectivity decoder.
//!
//! Symbols are consumed in reverse traversal order. Every symbol attaches one
//! new face to the corners on the active corner stack, so the corner table
//! grows face by face. Topology split events tell the decoder where a split
//! branch has to be reconnected.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::compression_config::{MeshEdgebreakerConnectivityEncodingMethod, MeshTraversalMethod};
use crate::corner_table::{CornerTable, CornerTableView};
use crate::corner_table_iterators::VertexCornersIterator;
use crate::decoder_buffer::DecoderBuffer;
use crate::geometry_indices::{CornerIndex, FaceIndex, PointIndex, VertexIndex};
use crate::mesh::Mesh;
use crate::mesh_attribute_corner_table::MeshAttributeCornerTable;
use crate::mesh_edgebreaker_shared::{
    EdgeFaceName, EdgebreakerSymbol, HoleEventData, TopologySplitEventData,
};
use crate::mesh_edgebreaker_traversal_decoder::{MeshEdgebreakerTraversalDecoder, TraversalDecoder};
use crate::mesh_edgebreaker_traversal_valence_decoder::MeshEdgebreakerTraversalValenceDecoder;
use crate::mesh_traversal_sequencer::{generate_point_sequence, PointSequence};
use crate::rans_bit_decoder::RAnsBitDecoder;
use crate::status::{invalid_data, DracoError, Status};
use crate::version::{
    is_supported_mesh_version, VERSION_DELTA_CODED_EVENTS, VERSION_INLINE_SPLIT_EVENTS,
    VERSION_NO_HOLE_EVENTS, VERSION_VARINT_ENCODING,
};

/// Connectivity rebuilt from a stream.
#[derive(Debug, Clone)]
pub struct DecodedConnectivity {
    method: MeshEdgebreakerConnectivityEncodingMethod,
    corner_table: CornerTable,
    mesh: Mesh,
    symbols: Vec<EdgebreakerSymbol>,
    topology_split_events: Vec<TopologySplitEventData>,
    hole_events: Vec<HoleEventData>,
    init_face_configurations: Vec<bool>,
    init_corners: Vec<CornerIndex>,
    num_encoded_symbols: usize,
    num_split_symbols: usize,
    is_vert_hole: Vec<bool>,
    attribute_seam_corners: Vec<Vec<CornerIndex>>,
    point_to_corner_map: Vec<CornerIndex>,
}

impl DecodedConnectivity {
    pub fn method(&self) -> MeshEdgebreakerConnectivityEncodingMethod {
        self.method
    }

    pub fn corner_table(&self) -> &CornerTable {
        &self.corner_table
    }

    /// Faces with point ids. Without attribute data every vertex is a point.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }

    pub fn num_vertices(&self) -> usize {
        self.corner_table.num_vertices()
    }

    pub fn num_faces(&self) -> usize {
        self.corner_table.num_faces()
    }

    pub fn num_points(&self) -> usize {
        self.mesh.num_points()
    }

    /// Symbols in decoding order, i.e. the reversed traversal.
    pub fn symbols(&self) -> &[EdgebreakerSymbol] {
        &self.symbols
    }

    pub fn num_encoded_symbols(&self) -> usize {
        self.num_encoded_symbols
    }

    pub fn num_split_symbols(&self) -> usize {
        self.num_split_symbols
    }

    /// Split events in encoder order, as read from the stream.
    pub fn topology_split_events(&self) -> &[TopologySplitEventData] {
        &self.topology_split_events
    }

    /// Only streams older than 2.1 carry hole events.
    pub fn hole_events(&self) -> &[HoleEventData] {
        &self.hole_events
    }

    pub fn init_face_configurations(&self) -> &[bool] {
        &self.init_face_configurations
    }

    pub fn init_corners(&self) -> &[CornerIndex] {
        &self.init_corners
    }

    /// Whether a vertex may lie on an open boundary.
    pub fn is_vertex_hole(&self, vertex: VertexIndex) -> bool {
        self.is_vert_hole
            .get(vertex.as_usize())
            .copied()
            .unwrap_or(false)
    }

    pub fn num_attribute_data(&self) -> usize {
        self.attribute_seam_corners.len()
    }

    /// Corners opposite to the seam edges of attribute data entry `index`,
    /// boundary edges included.
    pub fn attribute_seam_corners(&self, index: usize) -> Option<&[CornerIndex]> {
        self.attribute_seam_corners.get(index).map(Vec::as_slice)
    }

    /// Corner each point was created from.
    pub fn point_to_corner_map(&self) -> &[CornerIndex] {
        &self.point_to_corner_map
    }

    pub fn attribute_corner_table(
        &self,
        index: usize,
    ) -> Result<MeshAttributeCornerTable<'_>, DracoError> {
        let seams = self.attribute_seam_corners(index).ok_or_else(|| {
            DracoError::InvalidParameter(format!("No attribute data with index {index}"))
        })?;
        seam_corner_table(&self.corner_table, seams)
    }

    /// Order in which the decoder visits the values of the positions (`None`)
    /// or of an attribute data entry. Faces are visited in decoding order.
    pub fn point_sequence(
        &self,
        attribute_data: Option<usize>,
        method: MeshTraversalMethod,
    ) -> Result<PointSequence, DracoError> {
        match attribute_data {
            None => generate_point_sequence(&self.mesh, &self.corner_table, None, method),
            Some(index) => {
                let table = self.attribute_corner_table(index)?;
                generate_point_sequence(&self.mesh, &table, None, method)
            }
        }
    }
}

fn seam_corner_table<'t>(
    corner_table: &'t CornerTable,
    seams: &[CornerIndex],
) -> Result<MeshAttributeCornerTable<'t>, DracoError> {
    let mut table = MeshAttributeCornerTable::init_empty(corner_table);
    for &corner in seams {
        if corner.as_usize() >= corner_table.num_corners() {
            return Err(invalid_data("Seam corner out of range"));
        }
        table.add_seam_edge(corner);
    }
    table.recompute_vertices(None)?;
    Ok(table)
}

/// Decodes connectivity written by
/// [`MeshEdgebreakerEncoder`](crate::mesh_edgebreaker_encoder::MeshEdgebreakerEncoder).
/// Standard traversals and the legacy header and event layouts of Draco
/// releases since 1.0 are read as well. The valence traversal layout is the
/// one written by this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshEdgebreakerDecoder;

impl MeshEdgebreakerDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Reads one connectivity block. The version of `in_buffer` selects the
    /// stream layout.
    pub fn decode_connectivity<'a>(
        &self,
        in_buffer: &mut DecoderBuffer<'a>,
    ) -> Result<DecodedConnectivity, DracoError> {
        let method = peek_method(in_buffer)?;
        match method {
            MeshEdgebreakerConnectivityEncodingMethod::Standard => decode_connectivity_with(
                in_buffer,
                MeshEdgebreakerTraversalDecoder::<RAnsBitDecoder<'a>>::new(),
            ),
            MeshEdgebreakerConnectivityEncodingMethod::Valence => decode_connectivity_with(
                in_buffer,
                MeshEdgebreakerTraversalValenceDecoder::<RAnsBitDecoder<'a>>::new(),
            ),
        }
    }
}

fn peek_method(
    in_buffer: &DecoderBuffer<'_>,
) -> Result<MeshEdgebreakerConnectivityEncodingMethod, DracoError> {
    let mut header = in_buffer.clone();
    MeshEdgebreakerConnectivityEncodingMethod::try_from(header.decode_u8()?)
}

fn decode_count(buffer: &mut DecoderBuffer<'_>) -> Result<u32, DracoError> {
    if buffer.version_less_than(VERSION_VARINT_ENCODING) {
        buffer.decode_u32()
    } else {
        buffer.decode_varint_u32()
    }
}

/// Decodes a connectivity block through an explicit traversal decoder. The
/// decoder must match the method byte of the stream.
pub fn decode_connectivity_with<'a, D: TraversalDecoder<'a>>(
    in_buffer: &mut DecoderBuffer<'a>,
    traversal_decoder: D,
) -> Result<DecodedConnectivity, DracoError> {
    if !is_supported_mesh_version(in_buffer.version_major(), in_buffer.version_minor()) {
        return Err(DracoError::UnsupportedVersion(format!(
            "Cannot decode connectivity of version {}.{}",
            in_buffer.version_major(),
            in_buffer.version_minor()
        )));
    }
    let method = MeshEdgebreakerConnectivityEncodingMethod::try_from(in_buffer.decode_u8()?)?;
    let header = ConnectivityHeader::decode(in_buffer, method)?;
    let mut state = DecoderTraversalState::new(&header, traversal_decoder);

    // Before 2.2 the split events follow the traversal data.
    let mut topology_split_decoded_bytes = 0;
    if in_buffer.version_less_than(VERSION_INLINE_SPLIT_EVENTS) {
        let encoded_connectivity_size = decode_count(in_buffer)? as usize;
        if encoded_connectivity_size == 0
            || encoded_connectivity_size > in_buffer.remaining_size()
        {
            return Err(invalid_data("Invalid encoded connectivity size"));
        }
        let mut event_buffer = in_buffer.clone();
        event_buffer.advance(encoded_connectivity_size)?;
        let events_start = event_buffer.position();
        state.decode_hole_and_topology_split_events(&mut event_buffer)?;
        topology_split_decoded_bytes = event_buffer.position() - events_start;
    } else {
        state.decode_hole_and_topology_split_events(in_buffer)?;
    }

    state.traversal_decoder.init(
        in_buffer.clone(),
        state.max_num_vertices(),
        header.num_faces,
        header.num_attribute_data,
    );
    let mut traversal_end_buffer = state.traversal_decoder.start()?;
    let num_connectivity_verts = state.decode_connectivity(header.num_encoded_symbols)?;
    if in_buffer.version_less_than(VERSION_INLINE_SPLIT_EVENTS) {
        traversal_end_buffer.advance(topology_split_decoded_bytes)?;
    }
    *in_buffer = traversal_end_buffer;

    if header.num_attribute_data > 0 {
        let legacy = in_buffer.version_less_than(VERSION_NO_HOLE_EVENTS);
        for f in 0..state.corner_table.num_faces() {
            state.decode_attribute_connectivities_on_face(FaceIndex::from(f), legacy);
        }
    }
    state.traversal_decoder.done();

    let (mesh, point_to_corner_map) = state.assign_points_to_corners(num_connectivity_verts)?;
    debug!(
        vertices = num_connectivity_verts,
        faces = state.corner_table.num_faces(),
        points = mesh.num_points(),
        symbols = header.num_encoded_symbols,
        split_symbols = header.num_split_symbols,
        "edgebreaker connectivity decoded"
    );

    let DecoderTraversalState {
        corner_table,
        symbols,
        topology_split_data,
        hole_event_data,
        init_face_configurations,
        init_corners,
        is_vert_hole,
        attribute_seam_corners,
        ..
    } = state;
    Ok(DecodedConnectivity {
        method,
        corner_table,
        mesh,
        symbols,
        topology_split_events: topology_split_data,
        hole_events: hole_event_data,
        init_face_configurations,
        init_corners,
        num_encoded_symbols: header.num_encoded_symbols,
        num_split_symbols: header.num_split_symbols,
        is_vert_hole,
        attribute_seam_corners,
        point_to_corner_map,
    })
}

/// Counts at the start of a connectivity block, validated against each other.
#[derive(Debug, Clone, Copy)]
struct ConnectivityHeader {
    num_encoded_vertices: usize,
    num_faces: usize,
    num_attribute_data: usize,
    num_encoded_symbols: usize,
    num_split_symbols: usize,
}

impl ConnectivityHeader {
    fn decode(
        buffer: &mut DecoderBuffer<'_>,
        method: MeshEdgebreakerConnectivityEncodingMethod,
    ) -> Result<Self, DracoError> {
        if buffer.version_less_than(VERSION_INLINE_SPLIT_EVENTS) {
            // Number of new vertices, no longer used.
            decode_count(buffer)?;
        }
        let num_encoded_vertices = decode_count(buffer)? as usize;
        let num_faces = decode_count(buffer)? as usize;
        if num_faces > (u32::MAX / 3) as usize {
            return Err(invalid_data("Too many faces"));
        }
        let num_attribute_data = buffer.decode_u8()? as usize;
        let num_encoded_symbols = decode_count(buffer)? as usize;
        if num_faces < num_encoded_symbols {
            return Err(invalid_data("More symbols than faces"));
        }
        // Every interior start face comes with at least three symbols.
        if num_faces > num_encoded_symbols + num_encoded_symbols / 3 {
            return Err(invalid_data("Too many faces for the number of symbols"));
        }
        if num_encoded_vertices > num_faces * 3 {
            return Err(invalid_data("Too many vertices for the number of faces"));
        }
        let num_split_symbols = decode_count(buffer)? as usize;
        if num_split_symbols > num_encoded_symbols {
            return Err(invalid_data("More split symbols than symbols"));
        }
        // Standard traversals spend at least one raw bit per symbol. Valence
        // traversals spend at least one rANS flag, and a flag with the highest
        // probability of 255/256 still costs more than 1/256 of a bit.
        let max_symbols_per_byte = match method {
            MeshEdgebreakerConnectivityEncodingMethod::Standard => 8,
            MeshEdgebreakerConnectivityEncodingMethod::Valence => 8 * 256,
        };
        if num_encoded_symbols > buffer.remaining_size().saturating_mul(max_symbols_per_byte) {
            return Err(invalid_data("Symbol count exceeds the stream size"));
        }
        trace!(
            vertices = num_encoded_vertices,
            faces = num_faces,
            attribute_data = num_attribute_data,
            symbols = num_encoded_symbols,
            split_symbols = num_split_symbols,
            "connectivity header"
        );
        Ok(Self {
            num_encoded_vertices,
            num_faces,
            num_attribute_data,
            num_encoded_symbols,
            num_split_symbols,
        })
    }
}

/// Per pass state of the connectivity reconstruction.
struct DecoderTraversalState<D> {
    traversal_decoder: D,
    corner_table: CornerTable,
    symbols: Vec<EdgebreakerSymbol>,
    // Events are consumed from the back while decoding.
    topology_split_data: Vec<TopologySplitEventData>,
    hole_event_data: Vec<HoleEventData>,
    init_face_configurations: Vec<bool>,
    init_corners: Vec<CornerIndex>,
    is_vert_hole: Vec<bool>,
    attribute_seam_corners: Vec<Vec<CornerIndex>>,
}

impl<D> DecoderTraversalState<D> {
    fn new(header: &ConnectivityHeader, traversal_decoder: D) -> Self {
        let max_num_vertices = header.num_encoded_vertices + header.num_split_symbols;
        let mut corner_table = CornerTable::new();
        corner_table.reset(header.num_faces, max_num_vertices);
        Self {
            traversal_decoder,
            corner_table,
            symbols: Vec::with_capacity(header.num_encoded_symbols),
            topology_split_data: Vec::new(),
            hole_event_data: Vec::new(),
            init_face_configurations: Vec::new(),
            init_corners: Vec::new(),
            is_vert_hole: vec![true; max_num_vertices],
            attribute_seam_corners: vec![Vec::new(); header.num_attribute_data],
        }
    }

    /// Vertices created during decoding, before merged vertices are removed.
    fn max_num_vertices(&self) -> usize {
        self.is_vert_hole.len()
    }

    fn decode_hole_and_topology_split_events(&mut self, buffer: &mut DecoderBuffer<'_>) -> Status {
        let num_topology_splits = decode_count(buffer)? as usize;
        if num_topology_splits > self.corner_table.num_faces() {
            return Err(invalid_data("Too many topology split events"));
        }
        if num_topology_splits > 0 {
            self.topology_split_data.reserve(num_topology_splits);
            if buffer.version_less_than(VERSION_DELTA_CODED_EVENTS) {
                for _ in 0..num_topology_splits {
                    let split_symbol_id = buffer.decode_u32()?;
                    let source_symbol_id = buffer.decode_u32()?;
                    let edge_data = buffer.decode_u8()?;
                    self.topology_split_data.push(TopologySplitEventData {
                        split_symbol_id,
                        source_symbol_id,
                        source_edge: EdgeFaceName::from_bit(edge_data as u32),
                    });
                }
            } else {
                let mut last_source_symbol_id = 0u32;
                for _ in 0..num_topology_splits {
                    let delta = buffer.decode_varint_u32()?;
                    let source_symbol_id = last_source_symbol_id
                        .checked_add(delta)
                        .ok_or_else(|| invalid_data("Split source symbol overflows"))?;
                    let delta = buffer.decode_varint_u32()?;
                    if delta > source_symbol_id {
                        return Err(invalid_data("Split symbol precedes the first symbol"));
                    }
                    self.topology_split_data.push(TopologySplitEventData {
                        split_symbol_id: source_symbol_id - delta,
                        source_symbol_id,
                        source_edge: EdgeFaceName::LeftFaceEdge,
                    });
                    last_source_symbol_id = source_symbol_id;
                }
                let edge_bits = if buffer.version_less_than(VERSION_INLINE_SPLIT_EVENTS) {
                    2
                } else {
                    1
                };
                buffer.start_bit_decoding(false)?;
                for event in &mut self.topology_split_data {
                    let edge_data = buffer.decode_least_significant_bits32(edge_bits)?;
                    event.source_edge = EdgeFaceName::from_bit(edge_data);
                }
                buffer.end_bit_decoding();
            }
        }

        let num_hole_events = if buffer.version_less_than(VERSION_VARINT_ENCODING) {
            buffer.decode_u32()? as usize
        } else if buffer.version_less_than(VERSION_NO_HOLE_EVENTS) {
            buffer.decode_varint_u32()? as usize
        } else {
            0
        };
        if num_hole_events > self.corner_table.num_faces() {
            return Err(invalid_data("Too many hole events"));
        }
        if buffer.version_less_than(VERSION_DELTA_CODED_EVENTS) {
            for _ in 0..num_hole_events {
                let symbol_id = buffer.decode_i32()?;
                self.hole_event_data.push(HoleEventData { symbol_id });
            }
        } else {
            let mut last_symbol_id = 0i32;
            for _ in 0..num_hole_events {
                let delta = buffer.decode_varint_u32()?;
                let symbol_id = i32::try_from(delta)
                    .ok()
                    .and_then(|d| last_symbol_id.checked_add(d))
                    .ok_or_else(|| invalid_data("Hole event symbol overflows"))?;
                self.hole_event_data.push(HoleEventData { symbol_id });
                last_symbol_id = symbol_id;
            }
        }
        trace!(
            split_events = self.topology_split_data.len(),
            hole_events = self.hole_event_data.len(),
            "decoded connectivity events"
        );
        Ok(())
    }
}

impl<'a, D: TraversalDecoder<'a>> DecoderTraversalState<D> {
    /// Pops the next split event whose source is the encoder symbol
    /// `encoder_symbol_id`. A pending event with a larger source id means the
    /// stream skipped it.
    fn next_topology_split(
        &mut self,
        encoder_symbol_id: usize,
    ) -> Result<Option<(EdgeFaceName, u32)>, DracoError> {
        let Some(event) = self.topology_split_data.last().copied() else {
            return Ok(None);
        };
        if event.source_symbol_id as usize > encoder_symbol_id {
            return Err(invalid_data("Missed a topology split event"));
        }
        if event.source_symbol_id as usize != encoder_symbol_id {
            return Ok(None);
        }
        self.topology_split_data.pop();
        Ok(Some((event.source_edge, event.split_symbol_id)))
    }

    fn check_num_vertices(&self) -> Status {
        if self.corner_table.num_vertices() > self.max_num_vertices() {
            return Err(invalid_data("More vertices than declared"));
        }
        Ok(())
    }

    fn set_hole(&mut self, vertex: VertexIndex, is_hole: bool) {
        if let Some(flag) = self.is_vert_hole.get_mut(vertex.as_usize()) {
            *flag = is_hole;
        }
    }

    /// Returns the number of vertices after merged vertices were removed.
    fn decode_connectivity(&mut self, num_symbols: usize) -> Result<usize, DracoError> {
        let mut active_corner_stack: Vec<CornerIndex> = Vec::new();
        let mut topology_split_active_corners: HashMap<usize, CornerIndex> = HashMap::new();
        let mut invalid_vertices: Vec<VertexIndex> = Vec::new();
        // Attribute decoding needs the merged vertices in place.
        let remove_invalid_vertices = self.attribute_seam_corners.is_empty();
        // Sources increase in stream order while encoder symbol ids decrease
        // here, so events are consumed from the back.
        let all_split_events = self.topology_split_data.clone();

        let mut num_faces = 0usize;
        for symbol_id in 0..num_symbols {
            let corner = CornerIndex::from(3 * num_faces);
            num_faces += 1;
            let symbol = self.traversal_decoder.decode_symbol()?;
            self.symbols.push(symbol);
            let mut check_topology_split = false;
            match symbol {
                EdgebreakerSymbol::C => {
                    let corner_a = *active_corner_stack
                        .last()
                        .ok_or_else(|| invalid_data("C symbol without an active corner"))?;
                    let ct = &mut self.corner_table;
                    let vertex_x = ct.vertex(ct.next(corner_a));
                    let corner_b = ct.next(ct.left_most_corner(vertex_x));
                    if !corner_b.is_valid() || corner_a == corner_b {
                        return Err(invalid_data("C symbol closes onto itself"));
                    }
                    if ct.opposite(corner_a).is_valid() || ct.opposite(corner_b).is_valid() {
                        return Err(invalid_data("Corner already has an opposite"));
                    }
                    ct.set_opposite_corners(corner_a, ct.next(corner));
                    ct.set_opposite_corners(corner_b, ct.previous(corner));
                    let vert_a_prev = ct.vertex(ct.previous(corner_a));
                    let vert_b_next = ct.vertex(ct.next(corner_b));
                    if vertex_x == vert_a_prev || vertex_x == vert_b_next {
                        return Err(invalid_data("C symbol creates a degenerate face"));
                    }
                    ct.map_corner_to_vertex(corner, vertex_x);
                    ct.map_corner_to_vertex(ct.next(corner), vert_b_next);
                    ct.map_corner_to_vertex(ct.previous(corner), vert_a_prev);
                    ct.set_left_most_corner(vert_a_prev, ct.previous(corner));
                    self.set_hole(vertex_x, false);
                    if let Some(top) = active_corner_stack.last_mut() {
                        *top = corner;
                    }
                }
                EdgebreakerSymbol::R | EdgebreakerSymbol::L => {
                    let corner_a = *active_corner_stack
                        .last()
                        .ok_or_else(|| invalid_data("Symbol without an active corner"))?;
                    if self.corner_table.opposite(corner_a).is_valid() {
                        return Err(invalid_data("Corner already has an opposite"));
                    }
                    let ct = &mut self.corner_table;
                    let (opp_corner, corner_l, corner_r) = if symbol == EdgebreakerSymbol::R {
                        (ct.previous(corner), ct.next(corner), corner)
                    } else {
                        (ct.next(corner), corner, ct.previous(corner))
                    };
                    ct.set_opposite_corners(opp_corner, corner_a);
                    let new_vert_index = ct.add_new_vertex();
                    self.check_num_vertices()?;
                    let ct = &mut self.corner_table;
                    ct.map_corner_to_vertex(opp_corner, new_vert_index);
                    ct.set_left_most_corner(new_vert_index, opp_corner);
                    let vertex_r = ct.vertex(ct.previous(corner_a));
                    ct.map_corner_to_vertex(corner_r, vertex_r);
                    ct.set_left_most_corner(vertex_r, corner_r);
                    let vertex_l = ct.vertex(ct.next(corner_a));
                    ct.map_corner_to_vertex(corner_l, vertex_l);
                    if let Some(top) = active_corner_stack.last_mut() {
                        *top = corner;
                    }
                    check_topology_split = true;
                }
                EdgebreakerSymbol::S => {
                    let corner_b = active_corner_stack
                        .pop()
                        .ok_or_else(|| invalid_data("S symbol without an active corner"))?;
                    if let Some(&split_corner) = topology_split_active_corners.get(&symbol_id) {
                        active_corner_stack.push(split_corner);
                    }
                    let corner_a = *active_corner_stack
                        .last()
                        .ok_or_else(|| invalid_data("S symbol without a second active corner"))?;
                    if corner_a == corner_b {
                        return Err(invalid_data("S symbol joins a corner with itself"));
                    }
                    let ct = &mut self.corner_table;
                    if ct.opposite(corner_a).is_valid() || ct.opposite(corner_b).is_valid() {
                        return Err(invalid_data("Corner already has an opposite"));
                    }
                    ct.set_opposite_corners(corner_a, ct.previous(corner));
                    ct.set_opposite_corners(corner_b, ct.next(corner));
                    let vertex_p = ct.vertex(ct.previous(corner_a));
                    ct.map_corner_to_vertex(corner, vertex_p);
                    let vertex_a_next = ct.vertex(ct.next(corner_a));
                    ct.map_corner_to_vertex(ct.next(corner), vertex_a_next);
                    let vert_b_prev = ct.vertex(ct.previous(corner_b));
                    ct.map_corner_to_vertex(ct.previous(corner), vert_b_prev);
                    ct.set_left_most_corner(vert_b_prev, ct.previous(corner));

                    // Unify the tip vertex of the split with the vertex of b.
                    let mut corner_n = ct.next(corner_b);
                    let vertex_n = ct.vertex(corner_n);
                    if !vertex_n.is_valid() || !vertex_p.is_valid() {
                        return Err(invalid_data("S symbol on an unmapped corner"));
                    }
                    self.traversal_decoder.merge_vertices(vertex_p, vertex_n);
                    let ct = &mut self.corner_table;
                    ct.set_left_most_corner(vertex_p, ct.left_most_corner(vertex_n));
                    let first_corner = corner_n;
                    while corner_n.is_valid() {
                        ct.map_corner_to_vertex(corner_n, vertex_p);
                        corner_n = ct.swing_left(corner_n);
                        if corner_n == first_corner {
                            return Err(invalid_data("Split vertex has a closed fan"));
                        }
                    }
                    ct.make_vertex_isolated(vertex_n);
                    if remove_invalid_vertices {
                        invalid_vertices.push(vertex_n);
                    }
                    if let Some(top) = active_corner_stack.last_mut() {
                        *top = corner;
                    }
                }
                EdgebreakerSymbol::E => {
                    let ct = &mut self.corner_table;
                    let first_vert_index = ct.add_new_vertex();
                    let second_vert_index = ct.add_new_vertex();
                    let third_vert_index = ct.add_new_vertex();
                    ct.map_corner_to_vertex(corner, first_vert_index);
                    ct.map_corner_to_vertex(ct.next(corner), second_vert_index);
                    ct.map_corner_to_vertex(ct.previous(corner), third_vert_index);
                    self.check_num_vertices()?;
                    let ct = &mut self.corner_table;
                    ct.set_left_most_corner(first_vert_index, corner);
                    ct.set_left_most_corner(second_vert_index, ct.next(corner));
                    ct.set_left_most_corner(third_vert_index, ct.previous(corner));
                    active_corner_stack.push(corner);
                    check_topology_split = true;
                }
            }
            if let Some(&top) = active_corner_stack.last() {
                self.traversal_decoder
                    .new_active_corner_reached(&self.corner_table, top);
            }

            if check_topology_split {
                let encoder_symbol_id = num_symbols - symbol_id - 1;
                while let Some((split_edge, encoder_split_symbol_id)) =
                    self.next_topology_split(encoder_symbol_id)?
                {
                    let act_top_corner = *active_corner_stack
                        .last()
                        .ok_or_else(|| invalid_data("Split event without an active corner"))?;
                    let new_active_corner = match split_edge {
                        EdgeFaceName::RightFaceEdge => self.corner_table.next(act_top_corner),
                        EdgeFaceName::LeftFaceEdge => self.corner_table.previous(act_top_corner),
                    };
                    let encoder_split_symbol_id = encoder_split_symbol_id as usize;
                    if encoder_split_symbol_id >= num_symbols {
                        return Err(invalid_data("Split symbol out of range"));
                    }
                    let decoder_split_symbol_id = num_symbols - encoder_split_symbol_id - 1;
                    topology_split_active_corners
                        .insert(decoder_split_symbol_id, new_active_corner);
                }
            }
        }
        self.check_num_vertices()?;
        self.topology_split_data = all_split_events;

        self.decode_start_faces(&mut active_corner_stack, num_faces)?;
        self.remove_invalid_vertices(&invalid_vertices)
    }

    /// Every corner left on the stack belongs to the start face of one
    /// component. Interior start faces are added as new faces.
    fn decode_start_faces(
        &mut self,
        active_corner_stack: &mut Vec<CornerIndex>,
        mut num_faces: usize,
    ) -> Status {
        while let Some(corner) = active_corner_stack.pop() {
            let interior_face = self.traversal_decoder.decode_start_face_configuration()?;
            if !interior_face {
                self.init_face_configurations.push(false);
                self.init_corners.push(corner);
                continue;
            }
            if num_faces >= self.corner_table.num_faces() {
                return Err(invalid_data("Interior start face exceeds the face count"));
            }
            let ct = &mut self.corner_table;
            let corner_a = corner;
            let vert_n = ct.vertex(ct.next(corner_a));
            let corner_b = ct.next(ct.left_most_corner(vert_n));
            let vert_x = ct.vertex(ct.next(corner_b));
            let corner_c = ct.next(ct.left_most_corner(vert_x));
            if !corner_b.is_valid() || !corner_c.is_valid() {
                return Err(invalid_data("Start face references an unmapped vertex"));
            }
            if corner == corner_b || corner == corner_c || corner_b == corner_c {
                return Err(invalid_data("Start face corners are not distinct"));
            }
            if ct.opposite(corner).is_valid()
                || ct.opposite(corner_b).is_valid()
                || ct.opposite(corner_c).is_valid()
            {
                return Err(invalid_data("Corner already has an opposite"));
            }
            let vert_p = ct.vertex(ct.next(corner_c));
            let new_corner = CornerIndex::from(3 * num_faces);
            num_faces += 1;
            ct.set_opposite_corners(new_corner, corner);
            ct.set_opposite_corners(ct.next(new_corner), corner_b);
            ct.set_opposite_corners(ct.previous(new_corner), corner_c);
            ct.map_corner_to_vertex(new_corner, vert_x);
            ct.map_corner_to_vertex(ct.next(new_corner), vert_p);
            ct.map_corner_to_vertex(ct.previous(new_corner), vert_n);
            for vertex in [vert_x, vert_p, vert_n] {
                self.set_hole(vertex, false);
            }
            self.init_face_configurations.push(true);
            self.init_corners.push(new_corner);
        }
        if num_faces != self.corner_table.num_faces() {
            return Err(invalid_data("Decoded face count does not match the header"));
        }
        trace!(start_faces = self.init_corners.len(), "decoded start faces");
        Ok(())
    }

    /// Moves the last valid vertices into the slots of merged vertices so the
    /// vertex ids stay dense.
    fn remove_invalid_vertices(
        &mut self,
        invalid_vertices: &[VertexIndex],
    ) -> Result<usize, DracoError> {
        let num_corners = self.corner_table.num_corners();
        let mut num_vertices = self.corner_table.num_vertices();
        for &invalid_vert in invalid_vertices {
            let mut src_vert;
            loop {
                if num_vertices == 0 {
                    return Err(invalid_data("No vertex left to replace a merged one"));
                }
                src_vert = VertexIndex::from(num_vertices - 1);
                if self.corner_table.left_most_corner(src_vert).is_valid() {
                    break;
                }
                num_vertices -= 1;
            }
            if src_vert < invalid_vert {
                continue;
            }
            let corners: Vec<CornerIndex> = VertexCornersIterator::new(&self.corner_table, src_vert)
                .take(num_corners)
                .collect();
            for cid in corners {
                if self.corner_table.vertex(cid) != src_vert {
                    return Err(invalid_data("Vertex fan is inconsistent"));
                }
                self.corner_table.map_corner_to_vertex(cid, invalid_vert);
            }
            let left_most = self.corner_table.left_most_corner(src_vert);
            self.corner_table.set_left_most_corner(invalid_vert, left_most);
            self.corner_table.make_vertex_isolated(src_vert);
            let src_is_hole = self.is_vert_hole[src_vert.as_usize()];
            self.set_hole(invalid_vert, src_is_hole);
            self.set_hole(src_vert, false);
            num_vertices -= 1;
        }
        self.corner_table.set_num_vertices(num_vertices);
        Ok(num_vertices)
    }

    fn decode_attribute_connectivities_on_face(&mut self, face: FaceIndex, legacy: bool) {
        let ct = &self.corner_table;
        let corner = ct.first_corner(face);
        for c in [corner, ct.next(corner), ct.previous(corner)] {
            let opp_corner = ct.opposite(c);
            if !opp_corner.is_valid() {
                // Boundary edges are seams of every attribute.
                for seams in &mut self.attribute_seam_corners {
                    seams.push(c);
                }
                continue;
            }
            if !legacy && ct.face(opp_corner) < face {
                continue;
            }
            for (i, seams) in self.attribute_seam_corners.iter_mut().enumerate() {
                if self.traversal_decoder.decode_attribute_seam(i) {
                    seams.push(c);
                }
            }
        }
    }

    /// Builds the point ids of every corner. Without attribute data points
    /// are vertices; otherwise a vertex is split into one point per group of
    /// corners that agree on all attribute values.
    fn assign_points_to_corners(
        &self,
        num_connectivity_verts: usize,
    ) -> Result<(Mesh, Vec<CornerIndex>), DracoError> {
        let ct = &self.corner_table;
        let mut mesh = Mesh::new();
        if self.attribute_seam_corners.is_empty() {
            for f in 0..ct.num_faces() {
                let [v0, v1, v2] = ct.face_vertices(FaceIndex::from(f));
                mesh.add_face([PointIndex(v0.0), PointIndex(v1.0), PointIndex(v2.0)]);
            }
            mesh.set_num_points(num_connectivity_verts);
            let point_to_corner_map = (0..num_connectivity_verts)
                .map(|v| ct.left_most_corner(VertexIndex::from(v)))
                .collect();
            return Ok((mesh, point_to_corner_map));
        }

        let attribute_tables = self
            .attribute_seam_corners
            .iter()
            .map(|seams| seam_corner_table(ct, seams))
            .collect::<Result<Vec<_>, _>>()?;
        let num_corners = ct.num_corners();
        let mut point_to_corner_map: Vec<CornerIndex> = Vec::new();
        let mut corner_to_point_map = vec![PointIndex(0); num_corners];
        for v in 0..ct.num_vertices() {
            let c = ct.left_most_corner(VertexIndex::from(v));
            if !c.is_valid() {
                continue;
            }
            // Left-most corners of boundary vertices lie on the boundary.
            let mut deduplication_first_corner = c;
            if !self.is_vert_hole.get(v).copied().unwrap_or(false) {
                // Interior vertices start after the first seam of any attribute.
                'attributes: for table in &attribute_tables {
                    if !table.is_corner_on_seam(c) {
                        continue;
                    }
                    let vert_id = table.vertex(c);
                    let mut act_c = ct.swing_right(c);
                    let mut steps = 0;
                    while act_c != c {
                        if !act_c.is_valid() || steps >= num_corners {
                            return Err(invalid_data("Interior vertex has an open fan"));
                        }
                        if table.vertex(act_c) != vert_id {
                            deduplication_first_corner = act_c;
                            break 'attributes;
                        }
                        act_c = ct.swing_right(act_c);
                        steps += 1;
                    }
                }
            }

            let mut c = deduplication_first_corner;
            corner_to_point_map[c.as_usize()] = PointIndex::from(point_to_corner_map.len());
            point_to_corner_map.push(c);
            let mut prev_c = c;
            c = ct.swing_right(c);
            let mut steps = 0;
            while c.is_valid() && c != deduplication_first_corner {
                steps += 1;
                if steps > num_corners {
                    return Err(invalid_data("Vertex fan does not terminate"));
                }
                let attribute_seam = attribute_tables
                    .iter()
                    .any(|table| table.vertex(c) != table.vertex(prev_c));
                if attribute_seam {
                    corner_to_point_map[c.as_usize()] = PointIndex::from(point_to_corner_map.len());
                    point_to_corner_map.push(c);
                } else {
                    corner_to_point_map[c.as_usize()] = corner_to_point_map[prev_c.as_usize()];
                }
                prev_c = c;
                c = ct.swing_right(c);
            }
        }

        for face in corner_to_point_map.chunks_exact(3) {
            mesh.add_face([face[0], face[1], face[2]]);
        }
        mesh.set_num_points(point_to_corner_map.len());
        Ok((mesh, point_to_corner_map))
    }
}
