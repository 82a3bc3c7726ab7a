//! Corner table topology.
//!
//! Every face owns three consecutive corners `3f, 3f + 1, 3f + 2`. A corner
//! stores the vertex it is attached to and the corner opposite to it across
//! the edge that does not touch that vertex.

use tracing::{debug, warn};

use crate::corner_table_iterators::VertexRingIterator;
use crate::geometry_indices::{
    CornerIndex, FaceIndex, VertexIndex, INVALID_CORNER_INDEX, INVALID_FACE_INDEX,
    INVALID_VERTEX_INDEX,
};
use crate::status::{DracoError, Status};

/// Read-only navigation shared by [`CornerTable`] and the seam aware
/// [`MeshAttributeCornerTable`](crate::mesh_attribute_corner_table::MeshAttributeCornerTable).
///
/// All operations accept the invalid corner and return invalid results for it.
pub trait CornerTableView {
    fn num_vertices(&self) -> usize;

    fn num_corners(&self) -> usize;

    fn num_faces(&self) -> usize {
        self.num_corners() / 3
    }

    fn vertex(&self, corner: CornerIndex) -> VertexIndex;

    fn opposite(&self, corner: CornerIndex) -> CornerIndex;

    /// Corner the vertex ring of `v` starts from. For boundary vertices this is
    /// the corner that has the open boundary on its left side.
    fn left_most_corner(&self, v: VertexIndex) -> CornerIndex;

    #[inline]
    fn next(&self, corner: CornerIndex) -> CornerIndex {
        if !corner.is_valid() {
            return corner;
        }
        if (corner.0 + 1) % 3 == 0 {
            CornerIndex(corner.0 - 2)
        } else {
            CornerIndex(corner.0 + 1)
        }
    }

    #[inline]
    fn previous(&self, corner: CornerIndex) -> CornerIndex {
        if !corner.is_valid() {
            return corner;
        }
        if corner.0 % 3 == 0 {
            CornerIndex(corner.0 + 2)
        } else {
            CornerIndex(corner.0 - 1)
        }
    }

    #[inline]
    fn face(&self, corner: CornerIndex) -> FaceIndex {
        if !corner.is_valid() {
            return INVALID_FACE_INDEX;
        }
        FaceIndex(corner.0 / 3)
    }

    #[inline]
    fn first_corner(&self, face: FaceIndex) -> CornerIndex {
        if !face.is_valid() {
            return INVALID_CORNER_INDEX;
        }
        CornerIndex(face.0 * 3)
    }

    /// Rotates counter-clockwise around the vertex of `corner`.
    #[inline]
    fn swing_left(&self, corner: CornerIndex) -> CornerIndex {
        self.next(self.opposite(self.next(corner)))
    }

    /// Rotates clockwise around the vertex of `corner`.
    #[inline]
    fn swing_right(&self, corner: CornerIndex) -> CornerIndex {
        self.previous(self.opposite(self.previous(corner)))
    }

    /// Corner of the face on the left of `corner`'s face, seen from its vertex.
    #[inline]
    fn get_left_corner(&self, corner: CornerIndex) -> CornerIndex {
        if !corner.is_valid() {
            return INVALID_CORNER_INDEX;
        }
        self.opposite(self.previous(corner))
    }

    #[inline]
    fn get_right_corner(&self, corner: CornerIndex) -> CornerIndex {
        if !corner.is_valid() {
            return INVALID_CORNER_INDEX;
        }
        self.opposite(self.next(corner))
    }

    fn is_on_boundary(&self, v: VertexIndex) -> bool {
        let corner = self.left_most_corner(v);
        !self.swing_left(corner).is_valid()
    }

    /// Number of vertices connected to `v` by an edge, or -1 for the invalid
    /// vertex.
    fn valence(&self, v: VertexIndex) -> i32 {
        if !v.is_valid() {
            return -1;
        }
        self.confident_valence(v)
    }

    fn confident_valence(&self, v: VertexIndex) -> i32 {
        VertexRingIterator::new(self, v).count() as i32
    }
}

#[derive(Debug, Default, Clone)]
pub struct CornerTable {
    corner_to_vertex_map: Vec<VertexIndex>,
    opposite_corners: Vec<CornerIndex>,
    vertex_corners: Vec<CornerIndex>,
    num_original_vertices: usize,
    num_degenerated_faces: usize,
    num_isolated_vertices: usize,
    non_manifold_vertex_parents: Vec<VertexIndex>,
}

impl CornerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table for a list of faces. Non-manifold edges are cut and
    /// non-manifold vertices are split into new vertices.
    pub fn create(faces: &[[VertexIndex; 3]]) -> Result<Self, DracoError> {
        let mut table = Self::new();
        table.init(faces)?;
        Ok(table)
    }

    pub fn init(&mut self, faces: &[[VertexIndex; 3]]) -> Status {
        self.corner_to_vertex_map.clear();
        self.corner_to_vertex_map.reserve(faces.len() * 3);
        for face in faces {
            if face.iter().any(|v| !v.is_valid()) {
                return Err(DracoError::InvalidParameter(
                    "Face references an invalid vertex".into(),
                ));
            }
            self.corner_to_vertex_map.extend_from_slice(face);
        }
        self.non_manifold_vertex_parents.clear();

        let num_vertices = self.compute_opposite_corners();
        self.break_non_manifold_edges();
        self.compute_vertex_corners(num_vertices);
        debug!(
            faces = self.num_faces(),
            vertices = self.num_vertices(),
            degenerated = self.num_degenerated_faces,
            isolated = self.num_isolated_vertices,
            "corner table initialized"
        );
        Ok(())
    }

    /// Clears the table and allocates `num_faces` faces with unmapped corners.
    pub fn reset(&mut self, num_faces: usize, num_verts_hint: usize) {
        self.corner_to_vertex_map.clear();
        self.corner_to_vertex_map.resize(num_faces * 3, INVALID_VERTEX_INDEX);
        self.opposite_corners.clear();
        self.opposite_corners.resize(num_faces * 3, INVALID_CORNER_INDEX);
        self.vertex_corners.clear();
        self.vertex_corners.reserve(num_verts_hint);
        self.num_original_vertices = 0;
        self.num_degenerated_faces = 0;
        self.num_isolated_vertices = 0;
        self.non_manifold_vertex_parents.clear();
    }

    pub fn num_original_vertices(&self) -> usize {
        self.num_original_vertices
    }

    /// Vertices created while splitting non-manifold vertices.
    pub fn num_new_vertices(&self) -> usize {
        self.num_vertices() - self.num_original_vertices
    }

    pub fn num_degenerated_faces(&self) -> usize {
        self.num_degenerated_faces
    }

    pub fn num_isolated_vertices(&self) -> usize {
        self.num_isolated_vertices
    }

    pub fn is_degenerated(&self, face: FaceIndex) -> bool {
        if !face.is_valid() {
            return true;
        }
        let c0 = self.first_corner(face);
        let v0 = self.vertex(c0);
        let v1 = self.vertex(self.next(c0));
        let v2 = self.vertex(self.previous(c0));
        v0 == v1 || v0 == v2 || v1 == v2
    }

    /// Vertex of the input a split vertex was created from.
    pub fn vertex_parent(&self, vertex: VertexIndex) -> VertexIndex {
        if vertex.as_usize() < self.num_original_vertices {
            return vertex;
        }
        self.non_manifold_vertex_parents
            .get(vertex.as_usize() - self.num_original_vertices)
            .copied()
            .unwrap_or(INVALID_VERTEX_INDEX)
    }

    pub fn face_vertices(&self, face: FaceIndex) -> [VertexIndex; 3] {
        let c = self.first_corner(face);
        [self.vertex(c), self.vertex(self.next(c)), self.vertex(self.previous(c))]
    }

    pub fn add_new_vertex(&mut self) -> VertexIndex {
        self.vertex_corners.push(INVALID_CORNER_INDEX);
        VertexIndex::from(self.vertex_corners.len() - 1)
    }

    pub fn set_num_vertices(&mut self, num_vertices: usize) {
        self.vertex_corners.resize(num_vertices, INVALID_CORNER_INDEX);
    }

    pub fn map_corner_to_vertex(&mut self, corner: CornerIndex, vertex: VertexIndex) {
        self.corner_to_vertex_map[corner.as_usize()] = vertex;
    }

    /// Sets one direction of an opposite link.
    pub fn set_opposite_corner(&mut self, corner: CornerIndex, opposite: CornerIndex) {
        self.opposite_corners[corner.as_usize()] = opposite;
    }

    pub fn set_opposite_corners(&mut self, corner_0: CornerIndex, corner_1: CornerIndex) {
        if corner_0.is_valid() {
            self.set_opposite_corner(corner_0, corner_1);
        }
        if corner_1.is_valid() {
            self.set_opposite_corner(corner_1, corner_0);
        }
    }

    pub fn set_left_most_corner(&mut self, vertex: VertexIndex, corner: CornerIndex) {
        if vertex.is_valid() {
            self.vertex_corners[vertex.as_usize()] = corner;
        }
    }

    pub fn make_vertex_isolated(&mut self, vertex: VertexIndex) {
        self.vertex_corners[vertex.as_usize()] = INVALID_CORNER_INDEX;
    }

    /// Moves the stored corner of `vertex` to the left-most corner of its fan.
    pub fn update_vertex_to_corner_map(&mut self, vertex: VertexIndex) {
        let first_c = self.vertex_corners[vertex.as_usize()];
        if !first_c.is_valid() {
            return;
        }
        let mut act_c = self.swing_left(first_c);
        let mut c = first_c;
        while act_c.is_valid() && act_c != first_c {
            c = act_c;
            act_c = self.swing_left(act_c);
        }
        if act_c != first_c {
            self.vertex_corners[vertex.as_usize()] = c;
        }
    }

    /// Matches every half-edge with its reversed twin. Returns the number of
    /// vertices referenced by the corners.
    fn compute_opposite_corners(&mut self) -> usize {
        let num_corners = self.num_corners();
        self.opposite_corners.clear();
        self.opposite_corners.resize(num_corners, INVALID_CORNER_INDEX);
        self.num_degenerated_faces = 0;

        let mut num_corners_on_vertices: Vec<usize> = Vec::new();
        for &v in &self.corner_to_vertex_map {
            if v.as_usize() >= num_corners_on_vertices.len() {
                num_corners_on_vertices.resize(v.as_usize() + 1, 0);
            }
            num_corners_on_vertices[v.as_usize()] += 1;
        }

        // Half-edges leaving each vertex, stored as (sink vertex, corner
        // opposite to the edge) in a per-vertex slot range.
        let mut vertex_edges = vec![(INVALID_VERTEX_INDEX, INVALID_CORNER_INDEX); num_corners];
        let mut vertex_offset = Vec::with_capacity(num_corners_on_vertices.len());
        let mut offset = 0;
        for &count in &num_corners_on_vertices {
            vertex_offset.push(offset);
            offset += count;
        }

        let mut c = 0;
        while c < num_corners {
            let corner = CornerIndex::from(c);
            let tip_v = self.vertex(corner);
            let source_v = self.vertex(self.next(corner));
            let sink_v = self.vertex(self.previous(corner));

            if c % 3 == 0 && (tip_v == source_v || tip_v == sink_v || source_v == sink_v) {
                self.num_degenerated_faces += 1;
                c += 3;
                continue;
            }

            let mut opposite_c = INVALID_CORNER_INDEX;
            let sink_start = vertex_offset[sink_v.as_usize()];
            let sink_count = num_corners_on_vertices[sink_v.as_usize()];
            for i in sink_start..sink_start + sink_count {
                let (other_v, edge_corner) = vertex_edges[i];
                if !other_v.is_valid() {
                    break;
                }
                if other_v != source_v {
                    continue;
                }
                // Mirrored faces share the tip and are never opposite.
                if tip_v == self.vertex(edge_corner) {
                    continue;
                }
                opposite_c = edge_corner;
                let end = sink_start + sink_count;
                vertex_edges.copy_within(i + 1..end, i);
                vertex_edges[end - 1] = (INVALID_VERTEX_INDEX, INVALID_CORNER_INDEX);
                break;
            }

            if opposite_c.is_valid() {
                self.opposite_corners[c] = opposite_c;
                self.opposite_corners[opposite_c.as_usize()] = corner;
            } else {
                let source_start = vertex_offset[source_v.as_usize()];
                let source_count = num_corners_on_vertices[source_v.as_usize()];
                if let Some(slot) = vertex_edges[source_start..source_start + source_count]
                    .iter_mut()
                    .find(|(v, _)| !v.is_valid())
                {
                    *slot = (sink_v, corner);
                }
            }
            c += 1;
        }

        if self.num_degenerated_faces > 0 {
            warn!(count = self.num_degenerated_faces, "skipping degenerated faces");
        }
        num_corners_on_vertices.len()
    }

    /// Cuts edges that the 1-ring of a vertex passes more than once, e.g. the
    /// ring |1, 2, 3, 1, 4| around a pivot vertex visits edge <0, 1> twice.
    /// The faces of such edges become boundaries; the disjoint patches get new
    /// vertices later in [`Self::compute_vertex_corners`].
    fn break_non_manifold_edges(&mut self) {
        let mut visited_corners = vec![false; self.num_corners()];
        let mut sink_vertices: Vec<(VertexIndex, CornerIndex)> = Vec::new();
        let mut num_broken_edges = 0usize;

        loop {
            let mut mesh_connectivity_updated = false;
            for c in 0..self.num_corners() {
                if visited_corners[c] {
                    continue;
                }
                sink_vertices.clear();

                let mut current_c = CornerIndex::from(c);
                loop {
                    let next_c = self.swing_left(current_c);
                    if next_c == CornerIndex::from(c)
                        || !next_c.is_valid()
                        || visited_corners[next_c.as_usize()]
                    {
                        break;
                    }
                    current_c = next_c;
                }
                let first_c = current_c;

                loop {
                    visited_corners[current_c.as_usize()] = true;
                    // Each edge around the pivot is identified by its sink vertex.
                    let sink_c = self.next(current_c);
                    let sink_v = self.vertex(sink_c);
                    let edge_corner = self.previous(current_c);

                    let mut vertex_connectivity_updated = false;
                    for &(attached_v, other_edge_corner) in &sink_vertices {
                        if attached_v != sink_v {
                            continue;
                        }
                        let opp_edge_corner = self.opposite(edge_corner);
                        if opp_edge_corner == other_edge_corner {
                            // Closing the loop around the vertex.
                            continue;
                        }
                        let opp_other_edge_corner = self.opposite(other_edge_corner);
                        if opp_edge_corner.is_valid() {
                            self.set_opposite_corner(opp_edge_corner, INVALID_CORNER_INDEX);
                        }
                        if opp_other_edge_corner.is_valid() {
                            self.set_opposite_corner(opp_other_edge_corner, INVALID_CORNER_INDEX);
                        }
                        self.set_opposite_corner(edge_corner, INVALID_CORNER_INDEX);
                        self.set_opposite_corner(other_edge_corner, INVALID_CORNER_INDEX);
                        vertex_connectivity_updated = true;
                        break;
                    }
                    if vertex_connectivity_updated {
                        // Corners of this vertex have to be revisited.
                        num_broken_edges += 1;
                        mesh_connectivity_updated = true;
                        break;
                    }

                    sink_vertices.push((self.vertex(self.previous(current_c)), sink_c));
                    current_c = self.swing_right(current_c);
                    if current_c == first_c || !current_c.is_valid() {
                        break;
                    }
                }
            }
            if !mesh_connectivity_updated {
                break;
            }
        }

        if num_broken_edges > 0 {
            warn!(count = num_broken_edges, "broke non-manifold edges");
        }
    }

    /// Assigns the left-most corner to every vertex. A vertex reached again
    /// through a disconnected fan is duplicated and the fan is remapped.
    fn compute_vertex_corners(&mut self, num_vertices: usize) {
        let mut num_vertices = num_vertices;
        self.num_original_vertices = num_vertices;
        self.vertex_corners.clear();
        self.vertex_corners.resize(num_vertices, INVALID_CORNER_INDEX);

        let mut visited_vertices = vec![false; num_vertices];
        let mut visited_corners = vec![false; self.num_corners()];

        for f in 0..self.num_faces() {
            let face = FaceIndex::from(f);
            if self.is_degenerated(face) {
                continue;
            }
            let first_face_corner = self.first_corner(face);
            for k in 0..3 {
                let c = CornerIndex(first_face_corner.0 + k);
                if visited_corners[c.as_usize()] {
                    continue;
                }
                let mut v = self.vertex(c);
                let mut is_non_manifold_vertex = false;
                if visited_vertices[v.as_usize()] {
                    // Visited vertex behind an unvisited corner: another fan.
                    self.vertex_corners.push(INVALID_CORNER_INDEX);
                    self.non_manifold_vertex_parents.push(v);
                    visited_vertices.push(false);
                    v = VertexIndex::from(num_vertices);
                    num_vertices += 1;
                    is_non_manifold_vertex = true;
                }
                visited_vertices[v.as_usize()] = true;

                let mut act_c = c;
                while act_c.is_valid() {
                    visited_corners[act_c.as_usize()] = true;
                    self.vertex_corners[v.as_usize()] = act_c;
                    if is_non_manifold_vertex {
                        self.corner_to_vertex_map[act_c.as_usize()] = v;
                    }
                    act_c = self.swing_left(act_c);
                    if act_c == c {
                        break;
                    }
                }
                if !act_c.is_valid() {
                    // Open boundary: the corners right of `c` are not marked yet.
                    act_c = self.swing_right(c);
                    while act_c.is_valid() {
                        visited_corners[act_c.as_usize()] = true;
                        if is_non_manifold_vertex {
                            self.corner_to_vertex_map[act_c.as_usize()] = v;
                        }
                        act_c = self.swing_right(act_c);
                    }
                }
            }
        }

        self.num_isolated_vertices = visited_vertices.iter().filter(|&&visited| !visited).count();
        if !self.non_manifold_vertex_parents.is_empty() {
            warn!(
                count = self.non_manifold_vertex_parents.len(),
                "split non-manifold vertices"
            );
        }
    }
}

impl CornerTableView for CornerTable {
    #[inline]
    fn num_vertices(&self) -> usize {
        self.vertex_corners.len()
    }

    #[inline]
    fn num_corners(&self) -> usize {
        self.corner_to_vertex_map.len()
    }

    #[inline]
    fn vertex(&self, corner: CornerIndex) -> VertexIndex {
        if !corner.is_valid() {
            return INVALID_VERTEX_INDEX;
        }
        self.corner_to_vertex_map
            .get(corner.as_usize())
            .copied()
            .unwrap_or(INVALID_VERTEX_INDEX)
    }

    #[inline]
    fn opposite(&self, corner: CornerIndex) -> CornerIndex {
        if !corner.is_valid() {
            return corner;
        }
        self.opposite_corners
            .get(corner.as_usize())
            .copied()
            .unwrap_or(INVALID_CORNER_INDEX)
    }

    #[inline]
    fn left_most_corner(&self, v: VertexIndex) -> CornerIndex {
        if !v.is_valid() {
            return INVALID_CORNER_INDEX;
        }
        self.vertex_corners
            .get(v.as_usize())
            .copied()
            .unwrap_or(INVALID_CORNER_INDEX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faces(list: &[[u32; 3]]) -> Vec<[VertexIndex; 3]> {
        list.iter()
            .map(|f| [VertexIndex(f[0]), VertexIndex(f[1]), VertexIndex(f[2])])
            .collect()
    }

    #[test]
    fn test_next_previous() {
        let table = CornerTable::create(&faces(&[[0, 1, 2]])).unwrap();
        assert_eq!(table.next(CornerIndex(2)), CornerIndex(0));
        assert_eq!(table.previous(CornerIndex(0)), CornerIndex(2));
        assert_eq!(table.next(INVALID_CORNER_INDEX), INVALID_CORNER_INDEX);
    }

    #[test]
    fn test_shared_edge() {
        let table = CornerTable::create(&faces(&[[0, 1, 2], [0, 2, 3]])).unwrap();
        // Edge <0, 2> is opposite to corner 1 (vertex 1) and corner 5 (vertex 3).
        assert_eq!(table.opposite(CornerIndex(1)), CornerIndex(5));
        assert_eq!(table.opposite(CornerIndex(5)), CornerIndex(1));
        let num_pairs = (0..6)
            .filter(|&c| table.opposite(CornerIndex(c)).is_valid())
            .count();
        assert_eq!(num_pairs, 2);
        assert!(table.is_on_boundary(VertexIndex(0)));
        assert_eq!(table.valence(VertexIndex(2)), 3);
        assert_eq!(table.valence(VertexIndex(1)), 2);
    }

    #[test]
    fn test_degenerated_face_is_skipped() {
        let table = CornerTable::create(&faces(&[[0, 1, 2], [2, 2, 3]])).unwrap();
        assert_eq!(table.num_degenerated_faces(), 1);
        assert!(table.is_degenerated(FaceIndex(1)));
        assert!(!table.left_most_corner(VertexIndex(3)).is_valid());
        assert_eq!(table.num_isolated_vertices(), 1);
    }

    #[test]
    fn test_rejects_invalid_vertex() {
        let faces = [[VertexIndex(0), VertexIndex(1), INVALID_VERTEX_INDEX]];
        assert!(CornerTable::create(&faces).is_err());
    }
}
