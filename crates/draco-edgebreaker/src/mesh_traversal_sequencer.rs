//! Turns a mesh traversal into the sequence of points whose attribute values
//! are coded.

use tracing::trace;

use crate::compression_config::MeshTraversalMethod;
use crate::corner_table::CornerTableView;
use crate::depth_first_traverser::DepthFirstTraverser;
use crate::geometry_attribute::PointAttribute;
use crate::geometry_indices::{AttributeValueIndex, CornerIndex, FaceIndex, PointIndex, VertexIndex};
use crate::max_prediction_degree_traverser::MaxPredictionDegreeTraverser;
use crate::mesh::Mesh;
use crate::mesh_attribute_indices_encoding_data::MeshAttributeIndicesEncodingData;
use crate::status::{invalid_data, DracoError, Status};
use crate::traverser::{MeshTraverser, TraversalObserver};

/// Appends the point of every newly visited vertex and records the value
/// order in [`MeshAttributeIndicesEncodingData`].
#[derive(Debug)]
pub struct MeshAttributeIndicesEncodingObserver<'m> {
    mesh: &'m Mesh,
    point_ids: Vec<PointIndex>,
    encoding_data: MeshAttributeIndicesEncodingData,
}

impl<'m> MeshAttributeIndicesEncodingObserver<'m> {
    pub fn new(mesh: &'m Mesh, num_vertices: usize) -> Self {
        Self {
            mesh,
            point_ids: Vec::with_capacity(num_vertices),
            encoding_data: MeshAttributeIndicesEncodingData::new(num_vertices),
        }
    }

    pub fn into_parts(self) -> (Vec<PointIndex>, MeshAttributeIndicesEncodingData) {
        (self.point_ids, self.encoding_data)
    }
}

impl<'m> TraversalObserver for MeshAttributeIndicesEncodingObserver<'m> {
    fn on_new_face_visited(&mut self, _face: FaceIndex) {}

    fn on_new_vertex_visited(&mut self, vertex: VertexIndex, corner: CornerIndex) {
        let point_id = self.mesh.face(FaceIndex(corner.0 / 3))[corner.as_usize() % 3];
        self.point_ids.push(point_id);
        self.encoding_data
            .encoded_attribute_value_index_to_corner_map
            .push(corner);
        if let Some(slot) = self
            .encoding_data
            .vertex_to_encoded_attribute_value_index_map
            .get_mut(vertex.as_usize())
        {
            *slot = self.encoding_data.num_values;
        }
        self.encoding_data.num_values += 1;
    }
}

/// Result of a sequencing pass.
#[derive(Debug, Clone)]
pub struct PointSequence {
    pub point_ids: Vec<PointIndex>,
    pub encoding_data: MeshAttributeIndicesEncodingData,
}

/// Drives a traverser over all faces, or over a recorded corner order.
pub struct MeshTraversalSequencer<'a, Tr> {
    traverser: Tr,
    corner_order: Option<&'a [CornerIndex]>,
}

impl<'a, 'm, Tr> MeshTraversalSequencer<'a, Tr>
where
    Tr: MeshTraverser<Observer = MeshAttributeIndicesEncodingObserver<'m>>,
{
    pub fn new(traverser: Tr) -> Self {
        Self {
            traverser,
            corner_order: None,
        }
    }

    /// Replays the traversal from these corners instead of every face in
    /// order, e.g. the corners processed by the connectivity encoder.
    pub fn set_corner_order(&mut self, corner_order: &'a [CornerIndex]) {
        self.corner_order = Some(corner_order);
    }

    pub fn generate_sequence(mut self) -> Result<PointSequence, DracoError> {
        self.traverser.on_traversal_start();
        match self.corner_order {
            Some(order) => {
                for &corner in order {
                    self.traverser.traverse_from_corner(corner)?;
                }
            }
            None => {
                let num_faces = self.traverser.corner_table().num_faces();
                for f in 0..num_faces {
                    self.traverser
                        .traverse_from_corner(CornerIndex::from(3 * f))?;
                }
            }
        }
        self.traverser.on_traversal_end();
        let (point_ids, encoding_data) = self.traverser.into_observer().into_parts();
        trace!(points = point_ids.len(), "generated point sequence");
        Ok(PointSequence {
            point_ids,
            encoding_data,
        })
    }
}

/// Runs the traversal selected by `method` over `corner_table`.
pub fn generate_point_sequence<T: CornerTableView + ?Sized>(
    mesh: &Mesh,
    corner_table: &T,
    corner_order: Option<&[CornerIndex]>,
    method: MeshTraversalMethod,
) -> Result<PointSequence, DracoError> {
    let observer = MeshAttributeIndicesEncodingObserver::new(mesh, corner_table.num_vertices());
    match method {
        MeshTraversalMethod::DepthFirst => {
            let mut sequencer =
                MeshTraversalSequencer::new(DepthFirstTraverser::new(corner_table, observer));
            if let Some(order) = corner_order {
                sequencer.set_corner_order(order);
            }
            sequencer.generate_sequence()
        }
        MeshTraversalMethod::MaxPredictionDegree => {
            let mut sequencer = MeshTraversalSequencer::new(MaxPredictionDegreeTraverser::new(
                corner_table,
                observer,
            ));
            if let Some(order) = corner_order {
                sequencer.set_corner_order(order);
            }
            sequencer.generate_sequence()
        }
    }
}

/// Writes the value order into an explicit point to value mapping of
/// `attribute`, so that the value of every point is its encoded index.
pub fn update_point_to_attribute_index_mapping<T: CornerTableView + ?Sized>(
    mesh: &Mesh,
    corner_table: &T,
    encoding_data: &MeshAttributeIndicesEncodingData,
    attribute: &mut PointAttribute,
) -> Status {
    let num_points = mesh.num_points();
    attribute.set_explicit_mapping(num_points);
    for (f, face) in mesh.faces().iter().enumerate() {
        for (p, &point_id) in face.iter().enumerate() {
            let vert_id = corner_table.vertex(CornerIndex::from(3 * f + p));
            if !vert_id.is_valid() {
                return Err(invalid_data("Corner without an attribute vertex"));
            }
            let att_entry_id = encoding_data
                .vertex_to_encoded_attribute_value_index_map
                .get(vert_id.as_usize())
                .copied()
                .unwrap_or(-1);
            // There can not be more attribute values than points.
            if point_id.as_usize() >= num_points
                || att_entry_id < 0
                || att_entry_id as usize >= num_points
            {
                return Err(invalid_data("Attribute value index out of range"));
            }
            attribute.set_point_map_entry(point_id, AttributeValueIndex(att_entry_id as u32));
        }
    }
    attribute.set_size(encoding_data.num_values as usize);
    Ok(())
}
