use draco_edgebreaker::{
    CornerIndex, CornerTable, CornerTableView, FaceIndex, ValenceCache, VertexCornersIterator,
    VertexIndex, INVALID_CORNER_INDEX,
};
use proptest::prelude::*;

fn to_vertex_faces(faces: &[[u32; 3]]) -> Vec<[VertexIndex; 3]> {
    faces
        .iter()
        .map(|f| [VertexIndex(f[0]), VertexIndex(f[1]), VertexIndex(f[2])])
        .collect()
}

fn create_torus_faces(n: u32, m: u32) -> Vec<[u32; 3]> {
    let mut faces = Vec::new();
    for i in 0..n {
        for j in 0..m {
            let v00 = i * m + j;
            let v10 = ((i + 1) % n) * m + j;
            let v01 = i * m + (j + 1) % m;
            let v11 = ((i + 1) % n) * m + (j + 1) % m;
            faces.push([v00, v10, v01]);
            faces.push([v10, v11, v01]);
        }
    }
    faces
}

/// Checks the relations every corner table has to satisfy.
fn check_table_invariants(ct: &CornerTable) {
    for ci in 0..ct.num_corners() {
        let c = CornerIndex::from(ci);
        assert_eq!(ct.next(ct.next(ct.next(c))), c);
        assert_eq!(ct.previous(ct.next(c)), c);
        assert_eq!(ct.face(c), FaceIndex::from(ci / 3));

        let opp = ct.opposite(c);
        if opp.is_valid() {
            assert_eq!(ct.opposite(opp), c, "opposite of corner {ci} is not symmetric");
            // Twin half-edges run in reverse.
            assert_eq!(ct.vertex(ct.next(c)), ct.vertex(ct.previous(opp)));
            assert_eq!(ct.vertex(ct.previous(c)), ct.vertex(ct.next(opp)));
            assert!(!ct.is_degenerated(ct.face(opp)));
        }
    }
    for vi in 0..ct.num_vertices() {
        let v = VertexIndex::from(vi);
        let c = ct.left_most_corner(v);
        if c.is_valid() {
            assert_eq!(ct.vertex(c), v);
            // The left-most corner has nothing further left.
            if ct.is_on_boundary(v) {
                assert!(!ct.swing_left(c).is_valid());
            }
        }
    }
}

#[test]
fn test_corner_table_torus() {
    let faces = to_vertex_faces(&create_torus_faces(5, 5));
    let ct = CornerTable::create(&faces).expect("Failed to create corner table");

    assert_eq!(ct.num_faces(), 50);
    assert_eq!(ct.num_vertices(), 25);
    assert_eq!(ct.num_corners(), 150);
    assert_eq!(ct.num_new_vertices(), 0);

    let boundary_edges = (0..ct.num_corners())
        .filter(|&c| !ct.opposite(CornerIndex::from(c)).is_valid())
        .count();
    assert_eq!(boundary_edges, 0, "Torus should have no boundary edges");

    check_table_invariants(&ct);

    for vi in 0..ct.num_vertices() {
        let v = VertexIndex::from(vi);
        assert!(!ct.is_on_boundary(v));
        assert_eq!(ct.valence(v), 6);

        // Swinging around a closed fan returns to the start.
        let start = ct.left_most_corner(v);
        let mut c = ct.swing_left(start);
        let mut steps = 1;
        while c != start {
            c = ct.swing_left(c);
            steps += 1;
            assert!(steps <= 6, "swing left does not close around vertex {vi}");
        }
        assert_eq!(steps, 6);
        assert_eq!(ct.swing_right(ct.swing_left(start)), start);
        assert_eq!(VertexCornersIterator::new(&ct, v).count(), 6);
    }
}

#[test]
fn test_quad_valences() {
    let faces = to_vertex_faces(&[[0, 1, 2], [0, 2, 3]]);
    let ct = CornerTable::create(&faces).expect("Failed to create corner table");

    let num_opposites = (0..ct.num_corners())
        .filter(|&c| ct.opposite(CornerIndex::from(c)).is_valid())
        .count();
    assert_eq!(num_opposites, 2);
    assert_eq!(ct.get_right_corner(CornerIndex(0)), CornerIndex(5));
    assert!(!ct.get_left_corner(CornerIndex(0)).is_valid());
    assert_eq!(ct.face_vertices(FaceIndex(1)), [VertexIndex(0), VertexIndex(2), VertexIndex(3)]);

    let mut cache = ValenceCache::new(&ct);
    assert!(cache.is_cache_empty());
    // Uncached lookups fall back to the table.
    assert_eq!(cache.valence_from_cache(VertexIndex(2)), ct.valence(VertexIndex(2)));

    cache.cache_valences();
    cache.cache_valences_inaccurate();
    assert!(!cache.is_cache_empty());
    assert_eq!(cache.valence_from_cache(VertexIndex(0)), 3);
    assert_eq!(cache.valence_from_cache(VertexIndex(2)), 3);
    assert_eq!(cache.valence_from_cache(VertexIndex(1)), 2);
    assert_eq!(cache.valence_from_cache_inaccurate(VertexIndex(3)), 2);
    assert_eq!(cache.valence_from_cache_corner(CornerIndex(4)), 3);
    assert_eq!(cache.valence_from_cache_inaccurate_corner(CornerIndex(5)), 2);
    assert_eq!(cache.valence_from_cache_inaccurate_corner(INVALID_CORNER_INDEX), -1);
    assert_eq!(cache.valence_from_cache(VertexIndex(7)), -1);

    cache.clear_valence_cache();
    cache.clear_valence_cache_inaccurate();
    assert!(cache.is_cache_empty());
    assert_eq!(cache.valence_from_cache(VertexIndex(1)), 2);
}

#[test]
fn test_update_vertex_to_corner_map() {
    let faces = to_vertex_faces(&[[0, 1, 2], [0, 2, 3]]);
    let mut ct = CornerTable::create(&faces).expect("Failed to create corner table");
    assert_eq!(ct.left_most_corner(VertexIndex(0)), CornerIndex(3));

    ct.set_left_most_corner(VertexIndex(0), CornerIndex(0));
    ct.update_vertex_to_corner_map(VertexIndex(0));
    assert_eq!(ct.left_most_corner(VertexIndex(0)), CornerIndex(3));

    // Already left-most corners are kept.
    ct.update_vertex_to_corner_map(VertexIndex(1));
    assert_eq!(ct.left_most_corner(VertexIndex(1)), CornerIndex(1));
}

#[test]
fn test_degenerated_faces_are_counted() {
    let faces = to_vertex_faces(&[[0, 1, 2], [0, 2, 3], [3, 3, 1], [4, 4, 4]]);
    let ct = CornerTable::create(&faces).expect("Failed to create corner table");

    assert_eq!(ct.num_degenerated_faces(), 2);
    assert!(ct.is_degenerated(FaceIndex(2)));
    assert!(ct.is_degenerated(FaceIndex(3)));
    assert!(!ct.is_degenerated(FaceIndex(0)));
    // Vertex 4 is used by the degenerated face only.
    assert_eq!(ct.num_isolated_vertices(), 1);
    for c in 6..12 {
        assert!(!ct.opposite(CornerIndex(c)).is_valid());
    }
    check_table_invariants(&ct);
}

#[test]
fn test_non_manifold_vertex_is_split() {
    // Two triangles touching in vertex 0 only.
    let faces = to_vertex_faces(&[[0, 1, 2], [0, 3, 4]]);
    let ct = CornerTable::create(&faces).expect("Failed to create corner table");

    assert_eq!(ct.num_original_vertices(), 5);
    assert_eq!(ct.num_vertices(), 6);
    assert_eq!(ct.num_new_vertices(), 1);
    assert_eq!(ct.vertex(CornerIndex(3)), VertexIndex(5));
    assert_eq!(ct.vertex_parent(VertexIndex(5)), VertexIndex(0));
    assert_eq!(ct.vertex_parent(VertexIndex(3)), VertexIndex(3));
    assert_eq!(ct.valence(VertexIndex(0)), 2);
    assert_eq!(ct.valence(VertexIndex(5)), 2);
    check_table_invariants(&ct);
}

#[test]
fn test_non_manifold_edge_is_cut() {
    // Three faces share the edge <0, 1>.
    let faces = to_vertex_faces(&[[0, 1, 2], [1, 0, 3], [1, 0, 4]]);
    let ct = CornerTable::create(&faces).expect("Failed to create corner table");

    check_table_invariants(&ct);
    let num_opposites = (0..ct.num_corners())
        .filter(|&c| ct.opposite(CornerIndex::from(c)).is_valid())
        .count();
    assert!(num_opposites <= 2);
}

#[test]
fn test_reset_and_manual_construction() {
    let mut ct = CornerTable::new();
    ct.reset(1, 3);
    assert_eq!(ct.num_faces(), 1);
    assert_eq!(ct.num_vertices(), 0);

    for k in 0..3 {
        let v = ct.add_new_vertex();
        ct.map_corner_to_vertex(CornerIndex(k), v);
        ct.set_left_most_corner(v, CornerIndex(k));
    }
    assert_eq!(ct.num_vertices(), 3);
    assert_eq!(ct.face_vertices(FaceIndex(0)), [VertexIndex(0), VertexIndex(1), VertexIndex(2)]);
    assert!(ct.is_on_boundary(VertexIndex(1)));
    assert_eq!(ct.valence(VertexIndex(1)), 2);

    ct.make_vertex_isolated(VertexIndex(2));
    assert!(!ct.left_most_corner(VertexIndex(2)).is_valid());
    ct.set_num_vertices(2);
    assert_eq!(ct.num_vertices(), 2);
}

proptest! {
    #[test]
    fn prop_random_face_soup_keeps_invariants(
        raw_faces in prop::collection::vec(prop::array::uniform3(0u32..10), 1..40)
    ) {
        let faces = to_vertex_faces(&raw_faces);
        let ct = CornerTable::create(&faces).expect("Failed to create corner table");
        prop_assert_eq!(ct.num_faces(), raw_faces.len());
        prop_assert!(ct.num_vertices() >= ct.num_original_vertices());
        for vi in ct.num_original_vertices()..ct.num_vertices() {
            prop_assert!(ct.vertex_parent(VertexIndex::from(vi)).is_valid());
        }
        check_table_invariants(&ct);
    }
}
