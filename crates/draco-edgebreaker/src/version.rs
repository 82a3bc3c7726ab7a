// Draco mesh bitstream version constants.
//
// The EdgeBreaker connectivity layout changed several times. The encoder
// always writes the latest layout; the decoder accepts all of them.

/// Latest major version of the Draco Mesh bitstream.
pub const DRACO_MESH_BITSTREAM_VERSION_MAJOR: u8 = 2;

/// Latest minor version of the Draco Mesh bitstream.
pub const DRACO_MESH_BITSTREAM_VERSION_MINOR: u8 = 2;

/// Version written by the encoder and assumed by a fresh `DecoderBuffer`.
pub const DEFAULT_MESH_VERSION: (u8, u8) = (
    DRACO_MESH_BITSTREAM_VERSION_MAJOR,
    DRACO_MESH_BITSTREAM_VERSION_MINOR,
);

// =============================================================================
// Milestone Versions (for feature checks)
// =============================================================================

/// Topology split events are delta coded with varints from v1.2.
pub const VERSION_DELTA_CODED_EVENTS: (u8, u8) = (1, 2);

/// Header counts are varints instead of fixed u32 from v2.0.
pub const VERSION_VARINT_ENCODING: (u8, u8) = (2, 0);

/// Hole events are no longer written from v2.1.
pub const VERSION_NO_HOLE_EVENTS: (u8, u8) = (2, 1);

/// From v2.2 split events precede the traversal, the number of new vertices
/// is dropped, edge flags use one bit and bit sequences carry varint sizes.
pub const VERSION_INLINE_SPLIT_EVENTS: (u8, u8) = (2, 2);

/// Returns true if (major, minor) >= target.
#[inline]
pub fn version_at_least(major: u8, minor: u8, target: (u8, u8)) -> bool {
    major > target.0 || (major == target.0 && minor >= target.1)
}

/// Returns true if (major, minor) < target.
#[inline]
pub fn version_less_than(major: u8, minor: u8, target: (u8, u8)) -> bool {
    !version_at_least(major, minor, target)
}

/// Returns true if the decoder can parse connectivity written with this version.
pub fn is_supported_mesh_version(major: u8, minor: u8) -> bool {
    version_at_least(major, minor, (1, 0)) && !version_less_than(
        DRACO_MESH_BITSTREAM_VERSION_MAJOR,
        DRACO_MESH_BITSTREAM_VERSION_MINOR,
        (major, minor),
    )
}
