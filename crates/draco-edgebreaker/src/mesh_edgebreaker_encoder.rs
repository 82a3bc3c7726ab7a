//! EdgeBreaker connectivity encoder.
//!
//! Every mesh component is traversed depth first from a start face. Each
//! traversed face is described by one CLERS symbol relative to the faces
//! visited before it. Split symbols cut the boundary of the visited region
//! in two; when the traversal later touches a face that was split off, a
//! topology split event tells the decoder which two boundary edges belong
//! together.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::compression_config::{MeshEdgebreakerConnectivityEncodingMethod, MeshTraversalMethod};
use crate::corner_table::{CornerTable, CornerTableView};
use crate::encoder_buffer::EncoderBuffer;
use crate::encoder_options::EncoderOptions;
use crate::geometry_attribute::GeometryAttributeType;
use crate::geometry_indices::{CornerIndex, FaceIndex, VertexIndex};
use crate::mesh::Mesh;
use crate::mesh_attribute_corner_table::MeshAttributeCornerTable;
use crate::mesh_edgebreaker_shared::{EdgeFaceName, EdgebreakerSymbol, TopologySplitEventData};
use crate::mesh_edgebreaker_traversal_encoder::{MeshEdgebreakerTraversalEncoder, TraversalEncoder};
use crate::mesh_edgebreaker_traversal_valence_encoder::MeshEdgebreakerTraversalValenceEncoder;
use crate::mesh_traversal_sequencer::{generate_point_sequence, PointSequence};
use crate::rans_bit_encoder::RAnsBitEncoder;
use crate::status::{error_status, DracoError, Status};
use crate::version::DEFAULT_MESH_VERSION;

/// Builds the corner table used for connectivity coding. Points that share a
/// position value share a vertex.
pub fn create_corner_table_from_position_attribute(mesh: &Mesh) -> Result<CornerTable, DracoError> {
    let position = mesh.named_attribute(GeometryAttributeType::Position);
    let faces: Vec<[VertexIndex; 3]> = mesh
        .faces()
        .iter()
        .map(|face| {
            face.map(|point| match position {
                Some(att) => VertexIndex(att.mapped_index(point).0),
                None => VertexIndex(point.0),
            })
        })
        .collect();
    CornerTable::create(&faces)
}

/// Result of encoding the connectivity of a mesh.
#[derive(Debug, Clone)]
pub struct EncodedConnectivity {
    method: MeshEdgebreakerConnectivityEncodingMethod,
    corner_table: CornerTable,
    symbols: Vec<EdgebreakerSymbol>,
    processed_connectivity_corners: Vec<CornerIndex>,
    topology_split_events: Vec<TopologySplitEventData>,
    num_encoded_vertices: usize,
    num_encoded_faces: usize,
    num_split_symbols: usize,
    attribute_ids: Vec<i32>,
}

impl EncodedConnectivity {
    pub fn method(&self) -> MeshEdgebreakerConnectivityEncodingMethod {
        self.method
    }

    pub fn corner_table(&self) -> &CornerTable {
        &self.corner_table
    }

    /// Symbols in traversal order. The stream stores them reversed.
    pub fn symbols(&self) -> &[EdgebreakerSymbol] {
        &self.symbols
    }

    pub fn num_encoded_symbols(&self) -> usize {
        self.symbols.len()
    }

    pub fn num_split_symbols(&self) -> usize {
        self.num_split_symbols
    }

    pub fn num_encoded_vertices(&self) -> usize {
        self.num_encoded_vertices
    }

    pub fn num_encoded_faces(&self) -> usize {
        self.num_encoded_faces
    }

    pub fn topology_split_events(&self) -> &[TopologySplitEventData] {
        &self.topology_split_events
    }

    /// Corners of the encoded faces in decoding order, followed by the
    /// corners of interior start faces.
    pub fn processed_connectivity_corners(&self) -> &[CornerIndex] {
        &self.processed_connectivity_corners
    }

    /// Number of attributes with their own seams.
    pub fn num_attribute_data(&self) -> usize {
        self.attribute_ids.len()
    }

    /// Mesh attribute id of the attribute data entry `index`.
    pub fn attribute_id(&self, index: usize) -> Option<i32> {
        self.attribute_ids.get(index).copied()
    }

    /// Seam aware view of attribute data entry `index`. `mesh` must be the
    /// encoded mesh.
    pub fn attribute_corner_table<'s>(
        &'s self,
        mesh: &Mesh,
        index: usize,
    ) -> Result<MeshAttributeCornerTable<'s>, DracoError> {
        let att_id = self.attribute_id(index).ok_or_else(|| {
            DracoError::InvalidParameter(format!("No attribute data with index {index}"))
        })?;
        MeshAttributeCornerTable::init_from_attribute(
            mesh,
            &self.corner_table,
            mesh.attribute(att_id),
        )
    }

    /// Order in which the values of the positions (`None`) or of an attribute
    /// data entry are visited, replaying the connectivity traversal.
    pub fn point_sequence(
        &self,
        mesh: &Mesh,
        attribute_data: Option<usize>,
        method: MeshTraversalMethod,
    ) -> Result<PointSequence, DracoError> {
        let corner_order = Some(self.processed_connectivity_corners.as_slice());
        match attribute_data {
            None => generate_point_sequence(mesh, &self.corner_table, corner_order, method),
            Some(index) => {
                let table = self.attribute_corner_table(mesh, index)?;
                generate_point_sequence(mesh, &table, corner_order, method)
            }
        }
    }
}

/// Per pass state of the connectivity traversal.
struct EncoderTraversalState<'t, 'm, E> {
    corner_table: &'t CornerTable,
    traversal_encoder: E,
    attribute_tables: Vec<MeshAttributeCornerTable<'t>>,
    symbols: Vec<EdgebreakerSymbol>,
    visited_faces: Vec<bool>,
    visited_vertex_ids: Vec<bool>,
    vertex_hole_id: Vec<i32>,
    visited_holes: Vec<bool>,
    face_to_split_symbol_map: HashMap<u32, u32>,
    corner_traversal_stack: Vec<CornerIndex>,
    processed_connectivity_corners: Vec<CornerIndex>,
    topology_split_events: Vec<TopologySplitEventData>,
    last_encoded_symbol_id: i32,
    num_split_symbols: usize,
    mesh: &'m Mesh,
}

impl<'t, 'm, E: TraversalEncoder> EncoderTraversalState<'t, 'm, E> {
    fn new(mesh: &'m Mesh, corner_table: &'t CornerTable, traversal_encoder: E) -> Self {
        let num_vertices = corner_table.num_vertices();
        Self {
            corner_table,
            traversal_encoder,
            attribute_tables: Vec::new(),
            symbols: Vec::with_capacity(corner_table.num_faces()),
            visited_faces: vec![false; corner_table.num_faces()],
            visited_vertex_ids: vec![false; num_vertices],
            vertex_hole_id: vec![-1; num_vertices],
            visited_holes: Vec::new(),
            face_to_split_symbol_map: HashMap::new(),
            corner_traversal_stack: Vec::new(),
            processed_connectivity_corners: Vec::with_capacity(corner_table.num_faces()),
            topology_split_events: Vec::new(),
            last_encoded_symbol_id: -1,
            num_split_symbols: 0,
            mesh,
        }
    }

    fn is_face_visited(&self, face: FaceIndex) -> bool {
        if !face.is_valid() {
            return true;
        }
        self.visited_faces
            .get(face.as_usize())
            .copied()
            .unwrap_or(true)
    }

    fn encode_symbol(&mut self, symbol: EdgebreakerSymbol) {
        self.traversal_encoder
            .encode_symbol(symbol, self.corner_table, &self.visited_faces);
        self.symbols.push(symbol);
    }

    /// Walks across opposite corners until the edge opposite to the returned
    /// corner is a boundary edge.
    fn find_boundary_corner(&self, corner: CornerIndex) -> Result<CornerIndex, DracoError> {
        let ct = self.corner_table;
        let mut corner_id = corner;
        for _ in 0..=ct.num_corners() {
            let opp = ct.opposite(corner_id);
            if !opp.is_valid() {
                return Ok(corner_id);
            }
            corner_id = ct.next(opp);
        }
        Err(error_status("Open boundary does not terminate"))
    }

    /// Assigns a hole id to every vertex on an open boundary.
    fn find_holes(&mut self) -> Status {
        let ct = self.corner_table;
        for ci in 0..ct.num_corners() {
            let corner = CornerIndex::from(ci);
            if ct.is_degenerated(ct.face(corner)) || ct.opposite(corner).is_valid() {
                continue;
            }
            let mut boundary_vert_id = ct.vertex(ct.next(corner));
            if self.vertex_hole_id[boundary_vert_id.as_usize()] != -1 {
                continue;
            }
            let boundary_id = self.visited_holes.len() as i32;
            self.visited_holes.push(false);

            let mut corner_id = corner;
            while self.vertex_hole_id[boundary_vert_id.as_usize()] == -1 {
                self.vertex_hole_id[boundary_vert_id.as_usize()] = boundary_id;
                corner_id = self.find_boundary_corner(ct.next(corner_id))?;
                boundary_vert_id = ct.vertex(ct.next(corner_id));
            }
        }
        trace!(holes = self.visited_holes.len(), "found open boundaries");
        Ok(())
    }

    /// Marks every vertex of the hole touching `start_corner`'s vertex as
    /// visited. Returns the number of marked vertices.
    fn encode_hole(
        &mut self,
        start_corner: CornerIndex,
        encode_first_vertex: bool,
    ) -> Result<usize, DracoError> {
        let ct = self.corner_table;
        let mut corner_id = self.find_boundary_corner(ct.previous(start_corner))?;
        let start_vertex_id = ct.vertex(start_corner);

        let mut num_encoded_hole_verts = 0;
        if encode_first_vertex {
            self.visited_vertex_ids[start_vertex_id.as_usize()] = true;
            num_encoded_hole_verts += 1;
        }
        let hole_id = self.vertex_hole_id[start_vertex_id.as_usize()];
        if let Some(visited) = usize::try_from(hole_id)
            .ok()
            .and_then(|id| self.visited_holes.get_mut(id))
        {
            *visited = true;
        }

        let mut act_vertex_id = ct.vertex(ct.previous(corner_id));
        let mut steps = 0;
        while act_vertex_id != start_vertex_id {
            steps += 1;
            if steps > ct.num_vertices() {
                return Err(error_status("Hole boundary does not close"));
            }
            self.visited_vertex_ids[act_vertex_id.as_usize()] = true;
            num_encoded_hole_verts += 1;
            corner_id = self.find_boundary_corner(ct.next(corner_id))?;
            act_vertex_id = ct.vertex(ct.previous(corner_id));
        }
        Ok(num_encoded_hole_verts)
    }

    /// Returns whether `face` is an interior start face together with the
    /// corner the traversal starts from. For boundary configurations the
    /// returned corner is opposite to a boundary edge.
    fn find_init_face_configuration(
        &self,
        face: FaceIndex,
    ) -> Result<(bool, CornerIndex), DracoError> {
        let ct = self.corner_table;
        let mut corner_index = ct.first_corner(face);
        for _ in 0..3 {
            if !ct.opposite(corner_index).is_valid() {
                return Ok((false, corner_index));
            }
            if self.vertex_hole_id[ct.vertex(corner_index).as_usize()] != -1 {
                // Swing to the boundary edge attached to this vertex.
                let mut right_corner = corner_index;
                let mut steps = 0;
                while right_corner.is_valid() {
                    corner_index = right_corner;
                    right_corner = ct.swing_right(right_corner);
                    steps += 1;
                    if steps > ct.num_corners() {
                        return Err(error_status("Boundary vertex without a boundary edge"));
                    }
                }
                return Ok((false, ct.previous(corner_index)));
            }
            corner_index = ct.next(corner_index);
        }
        Ok((true, corner_index))
    }

    fn check_and_store_topology_split_event(
        &mut self,
        source_edge: EdgeFaceName,
        neighbor_face: FaceIndex,
    ) {
        if let Some(&split_symbol_id) = self.face_to_split_symbol_map.get(&neighbor_face.0) {
            self.topology_split_events.push(TopologySplitEventData {
                split_symbol_id,
                source_symbol_id: self.last_encoded_symbol_id as u32,
                source_edge,
            });
        }
    }

    fn encode_connectivity_from_corner(&mut self, corner: CornerIndex) -> Status {
        let ct = self.corner_table;
        let num_faces = ct.num_faces();
        self.corner_traversal_stack.clear();
        self.corner_traversal_stack.push(corner);

        while let Some(&top) = self.corner_traversal_stack.last() {
            let mut corner_id = top;
            if !corner_id.is_valid() || self.is_face_visited(ct.face(corner_id)) {
                self.corner_traversal_stack.pop();
                continue;
            }
            let mut num_visited_faces = 0;
            while num_visited_faces < num_faces {
                if !corner_id.is_valid() || self.is_face_visited(ct.face(corner_id)) {
                    return Err(error_status("Traversal entered a visited face"));
                }
                num_visited_faces += 1;
                self.last_encoded_symbol_id += 1;

                let face_id = ct.face(corner_id);
                self.visited_faces[face_id.as_usize()] = true;
                self.processed_connectivity_corners.push(corner_id);
                self.traversal_encoder.new_corner_reached(corner_id);
                let vert_id = ct.vertex(corner_id);
                let on_boundary = self.vertex_hole_id[vert_id.as_usize()] != -1;
                if !self.visited_vertex_ids[vert_id.as_usize()] {
                    self.visited_vertex_ids[vert_id.as_usize()] = true;
                    if !on_boundary {
                        // Boundary vertices are reached through an S symbol later.
                        self.encode_symbol(EdgebreakerSymbol::C);
                        corner_id = ct.get_right_corner(corner_id);
                        continue;
                    }
                }

                let right_corner_id = ct.get_right_corner(corner_id);
                let left_corner_id = ct.get_left_corner(corner_id);
                let right_face_id = ct.face(right_corner_id);
                let left_face_id = ct.face(left_corner_id);
                if self.is_face_visited(right_face_id) {
                    if right_face_id.is_valid() {
                        self.check_and_store_topology_split_event(
                            EdgeFaceName::RightFaceEdge,
                            right_face_id,
                        );
                    }
                    if self.is_face_visited(left_face_id) {
                        if left_face_id.is_valid() {
                            self.check_and_store_topology_split_event(
                                EdgeFaceName::LeftFaceEdge,
                                left_face_id,
                            );
                        }
                        self.encode_symbol(EdgebreakerSymbol::E);
                        self.corner_traversal_stack.pop();
                        break;
                    }
                    self.encode_symbol(EdgebreakerSymbol::R);
                    corner_id = left_corner_id;
                } else if self.is_face_visited(left_face_id) {
                    if left_face_id.is_valid() {
                        self.check_and_store_topology_split_event(
                            EdgeFaceName::LeftFaceEdge,
                            left_face_id,
                        );
                    }
                    self.encode_symbol(EdgebreakerSymbol::L);
                    corner_id = right_corner_id;
                } else {
                    self.encode_symbol(EdgebreakerSymbol::S);
                    self.num_split_symbols += 1;
                    if on_boundary {
                        let hole_id = self.vertex_hole_id[vert_id.as_usize()] as usize;
                        if !self.visited_holes[hole_id] {
                            self.encode_hole(corner_id, false)?;
                        }
                    }
                    self.face_to_split_symbol_map
                        .insert(face_id.0, self.last_encoded_symbol_id as u32);
                    // The right branch is traversed first, the left one resumes
                    // from the current stack entry.
                    if let Some(slot) = self.corner_traversal_stack.last_mut() {
                        *slot = left_corner_id;
                    }
                    self.corner_traversal_stack.push(right_corner_id);
                    break;
                }
            }
        }
        Ok(())
    }

    fn encode_attribute_connectivities_on_face(&mut self, corner: CornerIndex) {
        let ct = self.corner_table;
        let corners = [corner, ct.next(corner), ct.previous(corner)];
        self.visited_faces[ct.face(corner).as_usize()] = true;
        for c in corners {
            let opp_corner = ct.opposite(c);
            if !opp_corner.is_valid() {
                // Boundary edges are always seams.
                continue;
            }
            if self.is_face_visited(ct.face(opp_corner)) {
                continue;
            }
            for (i, table) in self.attribute_tables.iter().enumerate() {
                self.traversal_encoder
                    .encode_attribute_seam(i, table.is_corner_opposite_to_seam_edge(c));
            }
        }
    }

    fn encode(&mut self, out_buffer: &mut EncoderBuffer, attribute_ids: &[i32]) -> Status {
        let ct = self.corner_table;
        if ct.num_faces() == ct.num_degenerated_faces() {
            return Err(error_status("All triangles are degenerate"));
        }
        if ct.num_degenerated_faces() > 0 {
            warn!(
                count = ct.num_degenerated_faces(),
                "degenerate faces are not encoded"
            );
        }
        if attribute_ids.len() > u8::MAX as usize {
            return Err(DracoError::InvalidParameter(format!(
                "Too many attributes with seams: {}",
                attribute_ids.len()
            )));
        }

        out_buffer.encode_u8(self.traversal_encoder.method() as u8)?;
        let num_vertices_to_be_encoded = ct.num_vertices() - ct.num_isolated_vertices();
        out_buffer.encode_varint(num_vertices_to_be_encoded as u64)?;
        let num_faces = ct.num_faces() - ct.num_degenerated_faces();
        out_buffer.encode_varint(num_faces as u64)?;

        self.find_holes()?;

        for &att_id in attribute_ids {
            let table = MeshAttributeCornerTable::init_from_attribute(
                self.mesh,
                self.corner_table,
                self.mesh.attribute(att_id),
            )?;
            self.attribute_tables.push(table);
        }
        out_buffer.encode_u8(attribute_ids.len() as u8)?;
        self.traversal_encoder.init(ct, attribute_ids.len())?;

        let mut init_face_connectivity_corners = Vec::new();
        for ci in 0..ct.num_corners() {
            let corner = CornerIndex::from(ci);
            let face_id = ct.face(corner);
            if self.visited_faces[face_id.as_usize()] || ct.is_degenerated(face_id) {
                continue;
            }
            let (interior_config, start_corner) = self.find_init_face_configuration(face_id)?;
            self.traversal_encoder
                .encode_start_face_configuration(interior_config);
            trace!(face = face_id.0, interior = interior_config, "new component");

            if interior_config {
                // The start face acts as the C face of the component.
                for c in [start_corner, ct.next(start_corner), ct.previous(start_corner)] {
                    self.visited_vertex_ids[ct.vertex(c).as_usize()] = true;
                }
                self.visited_faces[face_id.as_usize()] = true;
                init_face_connectivity_corners.push(ct.next(start_corner));
                let opp_id = ct.opposite(ct.next(start_corner));
                let opp_face_id = ct.face(opp_id);
                if opp_face_id.is_valid() && !self.is_face_visited(opp_face_id) {
                    self.encode_connectivity_from_corner(opp_id)?;
                }
            } else {
                self.encode_hole(ct.next(start_corner), true)?;
                self.encode_connectivity_from_corner(start_corner)?;
            }
        }

        // The decoder reconstructs faces in reverse and the start faces last.
        self.processed_connectivity_corners.reverse();
        self.processed_connectivity_corners
            .extend_from_slice(&init_face_connectivity_corners);

        if !self.attribute_tables.is_empty() {
            self.visited_faces = vec![false; ct.num_faces()];
            let corners = std::mem::take(&mut self.processed_connectivity_corners);
            for &corner in &corners {
                self.encode_attribute_connectivities_on_face(corner);
            }
            self.processed_connectivity_corners = corners;
        }

        let traversal_buffer = self.traversal_encoder.done(ct)?;
        out_buffer.encode_varint(self.traversal_encoder.num_encoded_symbols() as u64)?;
        out_buffer.encode_varint(self.num_split_symbols as u64)?;
        self.encode_split_data(out_buffer)?;
        out_buffer.encode_data(traversal_buffer.data())?;

        debug!(
            vertices = num_vertices_to_be_encoded,
            faces = num_faces,
            symbols = self.symbols.len(),
            split_symbols = self.num_split_symbols,
            split_events = self.topology_split_events.len(),
            "edgebreaker connectivity encoded"
        );
        Ok(())
    }

    /// Source symbol ids are increasing, so both ids are stored as positive
    /// deltas. The edge sides follow as a bit sequence.
    fn encode_split_data(&self, out_buffer: &mut EncoderBuffer) -> Status {
        let num_events = self.topology_split_events.len();
        out_buffer.encode_varint(num_events as u64)?;
        if num_events == 0 {
            return Ok(());
        }
        let mut last_source_symbol_id = 0u32;
        for event in &self.topology_split_events {
            out_buffer.encode_varint((event.source_symbol_id - last_source_symbol_id) as u64)?;
            out_buffer.encode_varint((event.source_symbol_id - event.split_symbol_id) as u64)?;
            last_source_symbol_id = event.source_symbol_id;
        }
        out_buffer.start_bit_encoding(num_events, false)?;
        for event in &self.topology_split_events {
            out_buffer.encode_least_significant_bits32(1, event.source_edge as u32)?;
        }
        out_buffer.end_bit_encoding()
    }
}

/// Encodes mesh connectivity with the variant selected by [`EncoderOptions`].
#[derive(Debug, Clone, Default)]
pub struct MeshEdgebreakerEncoder {
    options: EncoderOptions,
}

impl MeshEdgebreakerEncoder {
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    pub fn encode_connectivity(
        &self,
        mesh: &Mesh,
        out_buffer: &mut EncoderBuffer,
    ) -> Result<EncodedConnectivity, DracoError> {
        let version = self.options.get_version();
        if version != DEFAULT_MESH_VERSION {
            return Err(DracoError::UnsupportedVersion(format!(
                "Only version {}.{} can be encoded, got {}.{}",
                DEFAULT_MESH_VERSION.0, DEFAULT_MESH_VERSION.1, version.0, version.1
            )));
        }
        match self.options.get_edgebreaker_method()? {
            MeshEdgebreakerConnectivityEncodingMethod::Standard => encode_connectivity_with(
                mesh,
                MeshEdgebreakerTraversalEncoder::<RAnsBitEncoder>::new(),
                out_buffer,
            ),
            MeshEdgebreakerConnectivityEncodingMethod::Valence => encode_connectivity_with(
                mesh,
                MeshEdgebreakerTraversalValenceEncoder::<RAnsBitEncoder>::new(),
                out_buffer,
            ),
        }
    }
}

/// Encodes the connectivity of `mesh` through an explicit traversal encoder.
/// Every non-position attribute gets its own seam stream.
pub fn encode_connectivity_with<E: TraversalEncoder>(
    mesh: &Mesh,
    traversal_encoder: E,
    out_buffer: &mut EncoderBuffer,
) -> Result<EncodedConnectivity, DracoError> {
    let corner_table = create_corner_table_from_position_attribute(mesh)?;
    let attribute_ids: Vec<i32> = (0..mesh.num_attributes())
        .filter(|&i| mesh.attribute(i).attribute_type() != GeometryAttributeType::Position)
        .collect();

    let method = traversal_encoder.method();
    let (symbols, processed_connectivity_corners, topology_split_events, num_split_symbols) = {
        let mut state = EncoderTraversalState::new(mesh, &corner_table, traversal_encoder);
        state.encode(out_buffer, &attribute_ids)?;
        (
            state.symbols,
            state.processed_connectivity_corners,
            state.topology_split_events,
            state.num_split_symbols,
        )
    };
    let num_encoded_vertices = corner_table.num_vertices() - corner_table.num_isolated_vertices();
    let num_encoded_faces = corner_table.num_faces() - corner_table.num_degenerated_faces();
    Ok(EncodedConnectivity {
        method,
        corner_table,
        symbols,
        processed_connectivity_corners,
        topology_split_events,
        num_encoded_vertices,
        num_encoded_faces,
        num_split_symbols,
        attribute_ids,
    })
}
