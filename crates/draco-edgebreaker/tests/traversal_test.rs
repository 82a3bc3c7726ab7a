use std::collections::HashSet;

use draco_edgebreaker::depth_first_traverser::DepthFirstTraverser;
use draco_edgebreaker::max_prediction_degree_traverser::MaxPredictionDegreeTraverser;
use draco_edgebreaker::mesh_edgebreaker_encoder::create_corner_table_from_position_attribute;
use draco_edgebreaker::mesh_traversal_sequencer::update_point_to_attribute_index_mapping;
use draco_edgebreaker::traverser::{
    MeshTraverser, NullTraversalObserver, RecordingTraversalObserver,
};
use draco_edgebreaker::{
    generate_point_sequence, AttributeValueIndex, CornerIndex, CornerTable, CornerTableView,
    DracoError, FaceIndex, GeometryAttributeType, Mesh, MeshAttributeCornerTable,
    MeshTraversalMethod, PointAttribute, PointIndex, VertexIndex,
};

fn create_grid_mesh(size: u32) -> Mesh {
    let row = size + 1;
    let mut faces = Vec::new();
    for y in 0..size {
        for x in 0..size {
            let v = y * row + x;
            faces.push([v, v + 1, v + row + 1]);
            faces.push([v, v + row + 1, v + row]);
        }
    }
    Mesh::from_faces(&faces)
}

fn create_torus_mesh(n: u32, m: u32) -> Mesh {
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
    Mesh::from_faces(&faces)
}

fn run_traversal<Tr: MeshTraverser>(mut traverser: Tr) -> Tr::Observer {
    traverser.on_traversal_start();
    let num_faces = traverser.corner_table().num_faces();
    for f in 0..num_faces {
        traverser
            .traverse_from_corner(CornerIndex::from(3 * f))
            .expect("Traversal failed");
    }
    traverser.on_traversal_end();
    traverser.into_observer()
}

fn assert_visits_everything(ct: &CornerTable, observer: &RecordingTraversalObserver) {
    let faces: HashSet<FaceIndex> = observer.faces.iter().copied().collect();
    assert_eq!(observer.faces.len(), ct.num_faces());
    assert_eq!(faces.len(), ct.num_faces(), "a face was visited twice");

    let vertices: HashSet<VertexIndex> = observer.vertices.iter().map(|&(v, _)| v).collect();
    assert_eq!(observer.vertices.len(), ct.num_vertices());
    assert_eq!(vertices.len(), ct.num_vertices(), "a vertex was visited twice");
    for &(v, c) in &observer.vertices {
        assert_eq!(ct.vertex(c), v);
    }
}

#[test]
fn test_depth_first_traversal_of_grid() {
    let mesh = create_grid_mesh(4);
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");
    let observer =
        run_traversal(DepthFirstTraverser::new(&ct, RecordingTraversalObserver::default()));

    assert_visits_everything(&ct, &observer);
    assert_eq!(observer.faces[0], FaceIndex(0));
    // The two far vertices of the start face come first, then its tip.
    let first: Vec<VertexIndex> = observer.vertices.iter().take(3).map(|&(v, _)| v).collect();
    assert_eq!(first, vec![VertexIndex(1), VertexIndex(6), VertexIndex(0)]);
}

#[test]
fn test_max_prediction_degree_traversal() {
    for mesh in [create_grid_mesh(5), create_torus_mesh(6, 4)] {
        let ct = create_corner_table_from_position_attribute(&mesh)
            .expect("Failed to create corner table");
        let observer = run_traversal(MaxPredictionDegreeTraverser::new(
            &ct,
            RecordingTraversalObserver::default(),
        ));
        assert_visits_everything(&ct, &observer);
    }
}

#[test]
fn test_max_prediction_degree_requires_traversal_start() {
    let mesh = create_grid_mesh(2);
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");
    let mut traverser =
        MaxPredictionDegreeTraverser::new(&ct, RecordingTraversalObserver::default());
    assert!(matches!(
        traverser.traverse_from_corner(CornerIndex(0)),
        Err(DracoError::InvalidParameter(_))
    ));
    assert!(traverser.observer().faces.is_empty());

    traverser.on_traversal_start();
    traverser.traverse_from_corner(CornerIndex(0)).expect("Traversal failed");
    assert_eq!(traverser.observer().faces.len(), ct.num_faces());
}

#[test]
fn test_traversal_of_multiple_components() {
    let mesh = Mesh::from_faces(&[[0, 1, 2], [0, 2, 3], [4, 5, 6], [7, 8, 9], [7, 9, 10]]);
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");
    let depth_first =
        run_traversal(DepthFirstTraverser::new(&ct, RecordingTraversalObserver::default()));
    assert_visits_everything(&ct, &depth_first);
    let max_degree = run_traversal(MaxPredictionDegreeTraverser::new(
        &ct,
        RecordingTraversalObserver::default(),
    ));
    assert_visits_everything(&ct, &max_degree);

    // Traversing again from a visited face does nothing.
    let mut traverser = DepthFirstTraverser::new(&ct, NullTraversalObserver);
    traverser.on_traversal_start();
    traverser.traverse_from_corner(CornerIndex(0)).expect("Traversal failed");
    traverser.traverse_from_corner(CornerIndex(3)).expect("Traversal failed");
    traverser.on_traversal_end();
}

#[test]
fn test_point_sequence_is_a_permutation() {
    let mesh = create_grid_mesh(3);
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");

    for method in [MeshTraversalMethod::DepthFirst, MeshTraversalMethod::MaxPredictionDegree] {
        let sequence =
            generate_point_sequence(&mesh, &ct, None, method).expect("Failed to sequence points");
        let data = &sequence.encoding_data;
        assert_eq!(sequence.point_ids.len(), 16);
        assert_eq!(data.num_values, 16);
        let distinct: HashSet<PointIndex> = sequence.point_ids.iter().copied().collect();
        assert_eq!(distinct.len(), 16);

        for (i, &corner) in data.encoded_attribute_value_index_to_corner_map.iter().enumerate() {
            let point = mesh.face(ct.face(corner))[corner.as_usize() % 3];
            assert_eq!(point, sequence.point_ids[i]);
            let vertex = ct.vertex(corner);
            assert_eq!(
                data.vertex_to_encoded_attribute_value_index_map[vertex.as_usize()],
                i as i32
            );
        }
    }
}

#[test]
fn test_point_sequence_follows_corner_order() {
    let mesh = create_grid_mesh(2);
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");
    let order: Vec<CornerIndex> = (0..ct.num_faces())
        .rev()
        .map(|f| CornerIndex::from(3 * f))
        .collect();

    let sequence =
        generate_point_sequence(&mesh, &ct, Some(&order), MeshTraversalMethod::DepthFirst)
            .expect("Failed to sequence points");
    assert_eq!(sequence.point_ids.len(), 9);
    // The last face is [4, 8, 7]: next, previous, then the tip.
    assert_eq!(&sequence.point_ids[..3], &[PointIndex(8), PointIndex(7), PointIndex(4)]);
}

#[test]
fn test_point_sequence_on_attribute_table() {
    let mut mesh = Mesh::from_faces(&[[0, 1, 2], [3, 4, 5]]);
    mesh.add_attribute(PointAttribute::from_point_values(
        GeometryAttributeType::Position,
        &[0, 1, 2, 0, 2, 3],
    ));
    let normal_id = mesh.add_attribute(PointAttribute::from_point_values(
        GeometryAttributeType::Normal,
        &[0, 0, 0, 1, 1, 1],
    ));
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");

    let positions = generate_point_sequence(&mesh, &ct, None, MeshTraversalMethod::DepthFirst)
        .expect("Failed to sequence points");
    assert_eq!(positions.point_ids.len(), 4);

    let att_table =
        MeshAttributeCornerTable::init_from_attribute(&mesh, &ct, mesh.attribute(normal_id))
            .expect("Failed to create attribute corner table");
    let normals = generate_point_sequence(&mesh, &att_table, None, MeshTraversalMethod::DepthFirst)
        .expect("Failed to sequence points");
    assert_eq!(normals.point_ids.len(), 6);
    assert_eq!(normals.encoding_data.num_values, 6);
}

#[test]
fn test_update_point_to_attribute_index_mapping() {
    let mesh = create_grid_mesh(3);
    let ct = create_corner_table_from_position_attribute(&mesh)
        .expect("Failed to create corner table");
    let sequence = generate_point_sequence(&mesh, &ct, None, MeshTraversalMethod::DepthFirst)
        .expect("Failed to sequence points");

    let mut attribute = PointAttribute::with_values(GeometryAttributeType::Generic, 16);
    update_point_to_attribute_index_mapping(&mesh, &ct, &sequence.encoding_data, &mut attribute)
        .expect("Failed to update mapping");

    assert!(!attribute.is_mapping_identity());
    assert_eq!(attribute.size(), 16);
    for (i, &point) in sequence.point_ids.iter().enumerate() {
        assert_eq!(attribute.mapped_index(point), AttributeValueIndex(i as u32));
    }
}
