use draco_edgebreaker::{
    AttributeValueIndex, CornerIndex, CornerTableView, FaceAdjacencyIterator, FaceIndex,
    GeometryAttributeType, Mesh, MeshAttributeCornerTable, PointAttribute, PointIndex,
    VertexCornersIterator, VertexIndex, VertexRingIterator,
};
use draco_edgebreaker::mesh_edgebreaker_encoder::create_corner_table_from_position_attribute;

/// Quad made of two triangles that do not share points. Positions are
/// shared along the diagonal, normals are not.
fn create_seam_mesh() -> Mesh {
    let mut mesh = Mesh::from_faces(&[[0, 1, 2], [3, 4, 5]]);
    mesh.add_attribute(PointAttribute::from_point_values(
        GeometryAttributeType::Position,
        &[0, 1, 2, 0, 2, 3],
    ));
    mesh.add_attribute(PointAttribute::from_point_values(
        GeometryAttributeType::Normal,
        &[0, 0, 0, 1, 1, 1],
    ));
    mesh
}

/// 3x3 grid of quads, 16 vertices, vertex 5 is interior.
fn create_grid_mesh() -> Mesh {
    let mut faces = Vec::new();
    for y in 0..3u32 {
        for x in 0..3u32 {
            let v = y * 4 + x;
            faces.push([v, v + 1, v + 5]);
            faces.push([v, v + 5, v + 4]);
        }
    }
    Mesh::from_faces(&faces)
}

#[test]
fn test_position_table_merges_points() {
    let mesh = create_seam_mesh();
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");
    assert_eq!(ct.num_vertices(), 4);
    assert_eq!(ct.opposite(CornerIndex(1)), CornerIndex(5));
}

#[test]
fn test_attribute_seam_from_point_mapping() {
    let mesh = create_seam_mesh();
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");
    let normal = mesh
        .named_attribute(GeometryAttributeType::Normal)
        .expect("Mesh has no normals");
    let att_table = MeshAttributeCornerTable::init_from_attribute(&mesh, &ct, normal)
        .expect("Failed to create attribute corner table");

    assert!(!att_table.no_interior_seams());
    assert!(att_table.is_corner_opposite_to_seam_edge(CornerIndex(1)));
    assert!(att_table.is_corner_opposite_to_seam_edge(CornerIndex(5)));
    // The diagonal is a boundary of the attribute.
    assert!(!att_table.opposite(CornerIndex(1)).is_valid());
    assert_eq!(ct.opposite(CornerIndex(1)), CornerIndex(5));

    assert_eq!(att_table.num_vertices(), 6);
    assert_eq!(att_table.num_faces(), 2);
    assert!(att_table.is_corner_on_seam(CornerIndex(0)));
    assert_ne!(att_table.vertex(CornerIndex(0)), att_table.vertex(CornerIndex(3)));
    assert_ne!(att_table.vertex(CornerIndex(2)), att_table.vertex(CornerIndex(4)));

    for ci in 0..att_table.num_corners() {
        let c = CornerIndex::from(ci);
        let v = att_table.vertex(c);
        let point = mesh.face(FaceIndex::from(ci / 3))[ci % 3];
        assert_eq!(att_table.vertex_to_attribute_entry_id(v), normal.mapped_index(point));
        assert_eq!(att_table.vertex(att_table.left_most_corner(v)), v);
    }
}

#[test]
fn test_attribute_without_seams_matches_positions() {
    let mesh = create_seam_mesh();
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");
    let flat = PointAttribute::from_point_values(GeometryAttributeType::Color, &[0, 1, 2, 0, 2, 3]);
    let att_table = MeshAttributeCornerTable::init_from_attribute(&mesh, &ct, &flat)
        .expect("Failed to create attribute corner table");

    assert!(att_table.no_interior_seams());
    assert_eq!(att_table.num_vertices(), ct.num_vertices());
    // Open edges always count as seams.
    assert!(att_table.is_corner_opposite_to_seam_edge(CornerIndex(0)));
    assert_eq!(att_table.opposite(CornerIndex(1)), CornerIndex(5));
    assert_eq!(
        att_table.vertex_to_attribute_entry_id(att_table.vertex(CornerIndex(5))),
        AttributeValueIndex(3)
    );
}

#[test]
fn test_seams_added_by_hand_match_point_mapping() {
    let mesh = create_seam_mesh();
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");
    let normal = mesh
        .named_attribute(GeometryAttributeType::Normal)
        .expect("Mesh has no normals");
    let from_mapping = MeshAttributeCornerTable::init_from_attribute(&mesh, &ct, normal)
        .expect("Failed to create attribute corner table");

    let mut by_hand = MeshAttributeCornerTable::init_empty(&ct);
    by_hand.add_seam_edge(CornerIndex(5));
    by_hand
        .recompute_vertices(Some((&mesh, normal)))
        .expect("Failed to recompute vertices");

    assert_eq!(by_hand.num_vertices(), from_mapping.num_vertices());
    for ci in 0..ct.num_corners() {
        let c = CornerIndex::from(ci);
        assert_eq!(by_hand.opposite(c), from_mapping.opposite(c));
        assert_eq!(
            by_hand.vertex_to_attribute_entry_id(by_hand.vertex(c)),
            from_mapping.vertex_to_attribute_entry_id(from_mapping.vertex(c))
        );
    }
}

#[test]
fn test_vertex_ring_iterator() {
    let mesh = create_grid_mesh();
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");

    // Interior vertex of the grid: four axis neighbours and two diagonals.
    let mut ring: Vec<u32> = VertexRingIterator::new(&ct, VertexIndex(5)).map(|v| v.0).collect();
    ring.sort_unstable();
    assert_eq!(ring, vec![0, 1, 4, 6, 9, 10]);
    assert!(!ct.is_on_boundary(VertexIndex(5)));

    // Corner vertex with a single face.
    let mut ring: Vec<u32> = VertexRingIterator::new(&ct, VertexIndex(3)).map(|v| v.0).collect();
    ring.sort_unstable();
    assert_eq!(ring, vec![2, 7]);
    assert!(ct.is_on_boundary(VertexIndex(3)));

    for vi in 0..ct.num_vertices() {
        let v = VertexIndex::from(vi);
        assert_eq!(VertexRingIterator::new(&ct, v).count() as i32, ct.valence(v));
    }
}

#[test]
fn test_vertex_corners_iterator() {
    let mesh = create_grid_mesh();
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");

    for vi in 0..ct.num_vertices() {
        let v = VertexIndex::from(vi);
        let corners: Vec<CornerIndex> = VertexCornersIterator::new(&ct, v).collect();
        let expected = (0..ct.num_corners())
            .filter(|&c| ct.vertex(CornerIndex::from(c)) == v)
            .count();
        assert_eq!(corners.len(), expected, "wrong corner count for vertex {vi}");
        assert!(corners.iter().all(|&c| ct.vertex(c) == v));
    }

    // Starting in the middle of a boundary fan still reaches every corner.
    let lm = ct.left_most_corner(VertexIndex(1));
    let middle = ct.swing_right(lm);
    assert!(middle.is_valid());
    let mut from_middle: Vec<CornerIndex> =
        VertexCornersIterator::from_corner(&ct, middle).collect();
    let mut from_left: Vec<CornerIndex> = VertexCornersIterator::new(&ct, VertexIndex(1)).collect();
    from_middle.sort_unstable();
    from_left.sort_unstable();
    assert_eq!(from_middle, from_left);
}

#[test]
fn test_face_adjacency_iterator() {
    let mesh = create_grid_mesh();
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");

    // Face [5, 6, 10] lies in the middle cell and has three neighbours.
    let middle = FaceIndex(8);
    assert_eq!(mesh.face(middle), [PointIndex(5), PointIndex(6), PointIndex(10)]);
    let neighbours: Vec<FaceIndex> = FaceAdjacencyIterator::new(&ct, middle).collect();
    assert_eq!(neighbours.len(), 3);
    assert!(neighbours.contains(&FaceIndex(9)));

    // Face [0, 1, 5] touches the border with one edge.
    let border: Vec<FaceIndex> = FaceAdjacencyIterator::new(&ct, FaceIndex(0)).collect();
    assert!(border.contains(&FaceIndex(1)));
    assert_eq!(border.len(), 2);

    // Seams hide neighbours in an attribute table.
    let seam_mesh = create_seam_mesh();
    let seam_ct = create_corner_table_from_position_attribute(&seam_mesh)
        .expect("Failed to create corner table");
    let normal = seam_mesh
        .named_attribute(GeometryAttributeType::Normal)
        .expect("Mesh has no normals");
    let att_table = MeshAttributeCornerTable::init_from_attribute(&seam_mesh, &seam_ct, normal)
        .expect("Failed to create attribute corner table");
    assert_eq!(FaceAdjacencyIterator::new(&seam_ct, FaceIndex(0)).count(), 1);
    assert_eq!(FaceAdjacencyIterator::new(&att_table, FaceIndex(0)).count(), 0);
}
