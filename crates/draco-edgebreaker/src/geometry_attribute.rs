use crate::geometry_indices::{AttributeValueIndex, PointIndex, INVALID_ATTRIBUTE_VALUE_INDEX};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryAttributeType {
    Invalid = -1,
    Position = 0,
    Normal,
    Color,
    TexCoord,
    Generic,
}

/// Connectivity view of a per-point attribute.
///
/// Only the point to attribute value mapping is stored. Two points that map
/// to the same value share that value across every edge they have in common;
/// an edge whose endpoints map to different values on its two sides is a
/// seam of the attribute.
#[derive(Debug, Clone)]
pub struct PointAttribute {
    attribute_type: GeometryAttributeType,
    unique_id: u32,
    num_unique_entries: usize,
    indices_map: Vec<AttributeValueIndex>,
    identity_mapping: bool,
}

impl Default for PointAttribute {
    fn default() -> Self {
        Self {
            attribute_type: GeometryAttributeType::Invalid,
            unique_id: 0,
            num_unique_entries: 0,
            indices_map: Vec::new(),
            identity_mapping: true,
        }
    }
}

impl PointAttribute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an attribute with `num_attribute_values` values and an
    /// identity point mapping.
    pub fn with_values(attribute_type: GeometryAttributeType, num_attribute_values: usize) -> Self {
        Self {
            attribute_type,
            num_unique_entries: num_attribute_values,
            ..Self::default()
        }
    }

    pub fn mapped_index(&self, point_index: PointIndex) -> AttributeValueIndex {
        if self.identity_mapping {
            return AttributeValueIndex(point_index.0);
        }
        self.indices_map
            .get(point_index.as_usize())
            .copied()
            .unwrap_or(INVALID_ATTRIBUTE_VALUE_INDEX)
    }

    /// Number of unique attribute values.
    pub fn size(&self) -> usize {
        self.num_unique_entries
    }

    pub fn set_size(&mut self, num_attribute_values: usize) {
        self.num_unique_entries = num_attribute_values;
    }

    pub fn attribute_type(&self) -> GeometryAttributeType {
        self.attribute_type
    }

    pub fn unique_id(&self) -> u32 {
        self.unique_id
    }

    pub fn set_unique_id(&mut self, id: u32) {
        self.unique_id = id;
    }

    pub fn is_mapping_identity(&self) -> bool {
        self.identity_mapping
    }

    pub fn set_explicit_mapping(&mut self, num_points: usize) {
        self.identity_mapping = false;
        self.indices_map.clear();
        self.indices_map.resize(num_points, INVALID_ATTRIBUTE_VALUE_INDEX);
    }

    /// Sets one entry of an explicit mapping. The map grows to fit
    /// `point_index`; calls on an identity mapping are ignored.
    pub fn set_point_map_entry(
        &mut self,
        point_index: PointIndex,
        entry_index: AttributeValueIndex,
    ) {
        if self.identity_mapping {
            return;
        }
        if point_index.as_usize() >= self.indices_map.len() {
            self.indices_map
                .resize(point_index.as_usize() + 1, INVALID_ATTRIBUTE_VALUE_INDEX);
        }
        self.indices_map[point_index.as_usize()] = entry_index;
    }

    /// Builds an explicit mapping from a per-point value list.
    pub fn from_point_values(attribute_type: GeometryAttributeType, values: &[u32]) -> Self {
        let num_values = values.iter().map(|&v| v as usize + 1).max().unwrap_or(0);
        let mut attribute = Self::with_values(attribute_type, num_values);
        attribute.set_explicit_mapping(values.len());
        for (point, &value) in values.iter().enumerate() {
            attribute.set_point_map_entry(PointIndex::from(point), AttributeValueIndex(value));
        }
        attribute
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_mapping() {
        let att = PointAttribute::from_point_values(GeometryAttributeType::TexCoord, &[0, 1, 1, 3]);
        assert_eq!(att.size(), 4);
        assert!(!att.is_mapping_identity());
        assert_eq!(att.mapped_index(PointIndex(2)), AttributeValueIndex(1));
        assert_eq!(att.mapped_index(PointIndex(9)), INVALID_ATTRIBUTE_VALUE_INDEX);
    }

    #[test]
    fn test_identity_mapping() {
        let att = PointAttribute::with_values(GeometryAttributeType::Position, 3);
        assert_eq!(att.mapped_index(PointIndex(2)), AttributeValueIndex(2));
    }
}
