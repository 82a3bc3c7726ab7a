//! Strongly typed indices used by the corner table and the codec.
//!
//! Every index is a plain `u32` wrapper. `u32::MAX` is reserved as the
//! invalid value of each type.

macro_rules! define_index_type {
    ($(#[$meta:meta])* $name:ident, $invalid:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        pub const $invalid: $name = $name(u32::MAX);

        impl $name {
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }

            /// Index usable for slice access. Only meaningful for valid indices.
            #[inline]
            pub fn as_usize(self) -> usize {
                self.0 as usize
            }
        }

        impl From<u32> for $name {
            fn from(v: u32) -> Self {
                Self(v)
            }
        }

        impl From<$name> for u32 {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self(v as u32)
            }
        }

        impl From<$name> for usize {
            fn from(v: $name) -> Self {
                v.0 as usize
            }
        }
    };
}

define_index_type!(
    /// Index of an attribute value (entry) of a point attribute.
    AttributeValueIndex,
    INVALID_ATTRIBUTE_VALUE_INDEX
);
define_index_type!(
    /// Index of a point of a mesh. A point is a unique combination of attribute values.
    PointIndex,
    INVALID_POINT_INDEX
);
define_index_type!(
    /// Index of a vertex of a corner table.
    VertexIndex,
    INVALID_VERTEX_INDEX
);
define_index_type!(
    /// Index of a corner, `3 * face + local_slot`.
    CornerIndex,
    INVALID_CORNER_INDEX
);
define_index_type!(FaceIndex, INVALID_FACE_INDEX);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_indices() {
        assert!(!INVALID_CORNER_INDEX.is_valid());
        assert!(!INVALID_VERTEX_INDEX.is_valid());
        assert!(CornerIndex(0).is_valid());
        assert_eq!(u32::from(FaceIndex(7)), 7);
        assert_eq!(PointIndex::from(3usize), PointIndex(3));
        assert_eq!(VertexIndex(12).as_usize(), 12);
    }
}
