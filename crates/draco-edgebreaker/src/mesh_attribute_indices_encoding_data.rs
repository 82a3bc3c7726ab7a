use crate::geometry_indices::CornerIndex;

/// Order in which the values of one attribute are encoded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MeshAttributeIndicesEncodingData {
    /// Corner through which each encoded value was first reached.
    pub encoded_attribute_value_index_to_corner_map: Vec<CornerIndex>,
    /// Encoded value index of every vertex of the attribute corner table.
    pub vertex_to_encoded_attribute_value_index_map: Vec<i32>,
    pub num_values: i32,
}

impl MeshAttributeIndicesEncodingData {
    pub fn new(num_vertices: usize) -> Self {
        let mut data = Self::default();
        data.init(num_vertices);
        data
    }

    pub fn init(&mut self, num_vertices: usize) {
        self.vertex_to_encoded_attribute_value_index_map = vec![-1; num_vertices];
        self.encoded_attribute_value_index_to_corner_map = Vec::with_capacity(num_vertices);
        self.num_values = 0;
    }
}
