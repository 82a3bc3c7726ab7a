//! Corner table view of a single attribute.
//!
//! Attribute values may be discontinuous across some edges of the mesh
//! (texture seams, hard normals). Those edges are treated as boundaries and
//! every base vertex is split into one attribute vertex per seam-free wedge.
//! The base topology is never modified.

use crate::corner_table::{CornerTable, CornerTableView};
use crate::geometry_attribute::PointAttribute;
use crate::geometry_indices::{
    AttributeValueIndex, CornerIndex, FaceIndex, PointIndex, VertexIndex, INVALID_CORNER_INDEX,
    INVALID_VERTEX_INDEX,
};
use crate::mesh::Mesh;
use crate::status::{invalid_data, DracoError, Status};

#[derive(Debug, Clone)]
pub struct MeshAttributeCornerTable<'a> {
    corner_table: &'a CornerTable,
    is_edge_on_seam: Vec<bool>,
    is_vertex_on_seam: Vec<bool>,
    no_interior_seams: bool,
    corner_to_vertex_map: Vec<VertexIndex>,
    vertex_to_left_most_corner_map: Vec<CornerIndex>,
    vertex_to_attribute_entry_id_map: Vec<AttributeValueIndex>,
}

fn corner_to_point_id(mesh: &Mesh, corner: CornerIndex) -> PointIndex {
    mesh.face(FaceIndex::from(corner.as_usize() / 3))[corner.as_usize() % 3]
}

impl<'a> MeshAttributeCornerTable<'a> {
    /// Creates a table without seams. Call [`Self::recompute_vertices`] once
    /// all seams are added.
    pub fn init_empty(corner_table: &'a CornerTable) -> Self {
        Self {
            corner_table,
            is_edge_on_seam: vec![false; corner_table.num_corners()],
            is_vertex_on_seam: vec![false; corner_table.num_vertices()],
            no_interior_seams: true,
            corner_to_vertex_map: vec![INVALID_VERTEX_INDEX; corner_table.num_corners()],
            vertex_to_left_most_corner_map: Vec::with_capacity(corner_table.num_vertices()),
            vertex_to_attribute_entry_id_map: Vec::with_capacity(corner_table.num_vertices()),
        }
    }

    /// Derives the seams of `att` from the point mapping of `mesh`. Boundary
    /// edges are always seams.
    pub fn init_from_attribute(
        mesh: &Mesh,
        corner_table: &'a CornerTable,
        att: &PointAttribute,
    ) -> Result<Self, DracoError> {
        let mut table = Self::init_empty(corner_table);
        for ci in 0..corner_table.num_corners() {
            let c = CornerIndex::from(ci);
            if corner_table.is_degenerated(corner_table.face(c)) {
                continue;
            }
            let opp_corner = corner_table.opposite(c);
            if !opp_corner.is_valid() {
                table.is_edge_on_seam[ci] = true;
                table.mark_edge_vertices_on_seam(c);
                continue;
            }
            if opp_corner < c {
                continue;
            }

            // Sibling corners share a vertex but lie on opposite sides of the edge.
            let mut act_c = c;
            let mut act_sibling_c = opp_corner;
            for _ in 0..2 {
                act_c = corner_table.next(act_c);
                act_sibling_c = corner_table.previous(act_sibling_c);
                let point_id = corner_to_point_id(mesh, act_c);
                let sibling_point_id = corner_to_point_id(mesh, act_sibling_c);
                if att.mapped_index(point_id) != att.mapped_index(sibling_point_id) {
                    table.no_interior_seams = false;
                    table.is_edge_on_seam[ci] = true;
                    table.is_edge_on_seam[opp_corner.as_usize()] = true;
                    table.mark_edge_vertices_on_seam(c);
                    table.mark_edge_vertices_on_seam(opp_corner);
                    break;
                }
            }
        }
        table.recompute_vertices(Some((mesh, att)))?;
        Ok(table)
    }

    fn mark_edge_vertices_on_seam(&mut self, c: CornerIndex) {
        for v in [
            self.corner_table.vertex(self.corner_table.next(c)),
            self.corner_table.vertex(self.corner_table.previous(c)),
        ] {
            if let Some(flag) = self.is_vertex_on_seam.get_mut(v.as_usize()) {
                *flag = true;
            }
        }
    }

    /// Marks the edge opposite to `c` as a seam, on both of its sides.
    pub fn add_seam_edge(&mut self, c: CornerIndex) {
        self.is_edge_on_seam[c.as_usize()] = true;
        self.mark_edge_vertices_on_seam(c);
        let opp_corner = self.corner_table.opposite(c);
        if opp_corner.is_valid() {
            self.no_interior_seams = false;
            self.is_edge_on_seam[opp_corner.as_usize()] = true;
            self.mark_edge_vertices_on_seam(opp_corner);
        }
    }

    /// Splits base vertices into attribute vertices along the seams. With a
    /// mesh and attribute the vertices take their attribute value ids from the
    /// point mapping, otherwise attribute vertex ids are used as value ids.
    pub fn recompute_vertices(&mut self, source: Option<(&Mesh, &PointAttribute)>) -> Status {
        self.vertex_to_attribute_entry_id_map.clear();
        self.vertex_to_left_most_corner_map.clear();
        let entry_for = |corner: CornerIndex, new_vertex: usize| match source {
            Some((mesh, att)) => att.mapped_index(corner_to_point_id(mesh, corner)),
            None => AttributeValueIndex::from(new_vertex),
        };

        let mut num_new_vertices = 0usize;
        for vi in 0..self.corner_table.num_vertices() {
            let v = VertexIndex::from(vi);
            let c = self.corner_table.left_most_corner(v);
            if !c.is_valid() {
                continue;
            }
            let mut first_vert_id = num_new_vertices;
            num_new_vertices += 1;
            self.vertex_to_attribute_entry_id_map
                .push(entry_for(c, first_vert_id));

            let mut first_c = c;
            if self.is_vertex_on_seam[vi] {
                // Find the first corner after a seam when swinging left.
                let mut act_c = self.swing_left(first_c);
                while act_c.is_valid() {
                    first_c = act_c;
                    act_c = self.swing_left(act_c);
                    if act_c == c {
                        return Err(invalid_data("Attribute seam does not start on a boundary"));
                    }
                }
            }
            self.corner_to_vertex_map[first_c.as_usize()] = VertexIndex::from(first_vert_id);
            self.vertex_to_left_most_corner_map.push(first_c);

            let mut act_c = self.corner_table.swing_right(first_c);
            while act_c.is_valid() && act_c != first_c {
                if self.is_corner_opposite_to_seam_edge(self.corner_table.next(act_c)) {
                    first_vert_id = num_new_vertices;
                    num_new_vertices += 1;
                    self.vertex_to_attribute_entry_id_map
                        .push(entry_for(act_c, first_vert_id));
                    self.vertex_to_left_most_corner_map.push(act_c);
                }
                self.corner_to_vertex_map[act_c.as_usize()] = VertexIndex::from(first_vert_id);
                act_c = self.corner_table.swing_right(act_c);
            }
        }
        Ok(())
    }

    pub fn is_corner_opposite_to_seam_edge(&self, c: CornerIndex) -> bool {
        self.is_edge_on_seam.get(c.as_usize()).copied().unwrap_or(false)
    }

    /// True when the base vertex of `c` touches a seam or a boundary.
    pub fn is_corner_on_seam(&self, c: CornerIndex) -> bool {
        let v = self.corner_table.vertex(c);
        self.is_vertex_on_seam.get(v.as_usize()).copied().unwrap_or(false)
    }

    pub fn no_interior_seams(&self) -> bool {
        self.no_interior_seams
    }

    pub fn corner_table(&self) -> &'a CornerTable {
        self.corner_table
    }

    pub fn vertex_to_attribute_entry_id(&self, v: VertexIndex) -> AttributeValueIndex {
        self.vertex_to_attribute_entry_id_map[v.as_usize()]
    }
}

impl<'a> CornerTableView for MeshAttributeCornerTable<'a> {
    fn num_vertices(&self) -> usize {
        self.vertex_to_attribute_entry_id_map.len()
    }

    fn num_corners(&self) -> usize {
        self.corner_table.num_corners()
    }

    fn vertex(&self, corner: CornerIndex) -> VertexIndex {
        if !corner.is_valid() {
            return INVALID_VERTEX_INDEX;
        }
        self.corner_to_vertex_map
            .get(corner.as_usize())
            .copied()
            .unwrap_or(INVALID_VERTEX_INDEX)
    }

    fn opposite(&self, corner: CornerIndex) -> CornerIndex {
        if !corner.is_valid() || self.is_corner_opposite_to_seam_edge(corner) {
            return INVALID_CORNER_INDEX;
        }
        self.corner_table.opposite(corner)
    }

    fn left_most_corner(&self, v: VertexIndex) -> CornerIndex {
        if !v.is_valid() {
            return INVALID_CORNER_INDEX;
        }
        self.vertex_to_left_most_corner_map
            .get(v.as_usize())
            .copied()
            .unwrap_or(INVALID_CORNER_INDEX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry_attribute::GeometryAttributeType;

    fn quad() -> (Mesh, CornerTable) {
        let mesh = Mesh::from_faces(&[[0, 1, 2], [0, 2, 3]]);
        let faces: Vec<[VertexIndex; 3]> = mesh
            .faces()
            .iter()
            .map(|f| [VertexIndex(f[0].0), VertexIndex(f[1].0), VertexIndex(f[2].0)])
            .collect();
        let table = CornerTable::create(&faces).unwrap();
        (mesh, table)
    }

    #[test]
    fn test_seam_free_attribute() {
        let (mesh, table) = quad();
        let att = PointAttribute::with_values(GeometryAttributeType::TexCoord, 4);
        let att_table = MeshAttributeCornerTable::init_from_attribute(&mesh, &table, &att).unwrap();
        assert!(att_table.no_interior_seams());
        assert_eq!(att_table.num_vertices(), 4);
        assert_eq!(att_table.opposite(CornerIndex(1)), CornerIndex(5));
    }

    #[test]
    fn test_added_seam_splits_vertices() {
        let (_, table) = quad();
        let mut att_table = MeshAttributeCornerTable::init_empty(&table);
        att_table.add_seam_edge(CornerIndex(1));
        att_table.recompute_vertices(None).unwrap();
        assert!(!att_table.no_interior_seams());
        assert!(!att_table.opposite(CornerIndex(1)).is_valid());
        assert!(!att_table.opposite(CornerIndex(5)).is_valid());
        // Vertices 0 and 2 are cut in two.
        assert_eq!(att_table.num_vertices(), 6);
        assert_ne!(att_table.vertex(CornerIndex(0)), att_table.vertex(CornerIndex(3)));
        assert_eq!(
            att_table.vertex_to_attribute_entry_id(att_table.vertex(CornerIndex(5))),
            AttributeValueIndex(att_table.vertex(CornerIndex(5)).0)
        );
    }
}
