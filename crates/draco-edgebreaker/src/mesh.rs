use crate::geometry_attribute::{GeometryAttributeType, PointAttribute};
use crate::geometry_indices::{FaceIndex, PointIndex};

pub type Face = [PointIndex; 3];

/// Triangle mesh given as a list of point triplets plus the attributes that
/// define how points share values.
#[derive(Debug, Default, Clone)]
pub struct Mesh {
    faces: Vec<Face>,
    attributes: Vec<PointAttribute>,
    num_points: usize,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh from raw point ids; the point count is derived from the
    /// largest id.
    pub fn from_faces(faces: &[[u32; 3]]) -> Self {
        let mut mesh = Self::new();
        for face in faces {
            mesh.add_face([PointIndex(face[0]), PointIndex(face[1]), PointIndex(face[2])]);
        }
        let num_points = faces
            .iter()
            .flat_map(|f| f.iter())
            .map(|&p| p as usize + 1)
            .max()
            .unwrap_or(0);
        mesh.set_num_points(num_points);
        mesh
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn face(&self, face_id: FaceIndex) -> Face {
        self.faces[face_id.as_usize()]
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn set_num_points(&mut self, num_points: usize) {
        self.num_points = num_points;
    }

    pub fn add_attribute(&mut self, mut attribute: PointAttribute) -> i32 {
        let id = self.attributes.len() as i32;
        attribute.set_unique_id(id as u32);
        self.attributes.push(attribute);
        id
    }

    pub fn num_attributes(&self) -> i32 {
        self.attributes.len() as i32
    }

    pub fn attribute(&self, att_id: i32) -> &PointAttribute {
        &self.attributes[att_id as usize]
    }

    pub fn named_attribute(&self, att_type: GeometryAttributeType) -> Option<&PointAttribute> {
        self.attributes.iter().find(|att| att.attribute_type() == att_type)
    }
}
