//! Draco EdgeBreaker connectivity codec
//!
//! Corner table topology, attribute seam overlays, mesh traversers and the
//! EdgeBreaker connectivity encoder and decoder (standard and valence
//! predictive) of the Draco mesh bitstream.
//!
//! ```
//! use draco_edgebreaker::{
//!     DecoderBuffer, EncoderBuffer, EncoderOptions, Mesh, MeshEdgebreakerDecoder,
//!     MeshEdgebreakerEncoder,
//! };
//!
//! let mesh = Mesh::from_faces(&[[0, 1, 2], [0, 2, 3]]);
//! let mut buffer = EncoderBuffer::new();
//! let encoded = MeshEdgebreakerEncoder::new(EncoderOptions::new())
//!     .encode_connectivity(&mesh, &mut buffer)
//!     .unwrap();
//! assert_eq!(encoded.num_encoded_symbols(), 2);
//!
//! let mut input = DecoderBuffer::new(buffer.data());
//! let decoded = MeshEdgebreakerDecoder::new()
//!     .decode_connectivity(&mut input)
//!     .unwrap();
//! assert_eq!(decoded.num_faces(), 2);
//! assert_eq!(decoded.num_vertices(), 4);
//! ```

// Index loops mirror the corner arithmetic of the bitstream.
#![allow(clippy::needless_range_loop)]

// =============================================================================
// Topology
// =============================================================================

pub mod corner_table;
pub mod corner_table_iterators;
pub mod geometry_attribute;
pub mod geometry_indices;
pub mod mesh;
pub mod mesh_attribute_corner_table;
pub mod valence_cache;

// =============================================================================
// Traversal
// =============================================================================

pub mod depth_first_traverser;
pub mod max_prediction_degree_traverser;
pub mod mesh_attribute_indices_encoding_data;
pub mod mesh_traversal_sequencer;
pub mod traverser;

// =============================================================================
// Buffers and bit coders
// =============================================================================

pub mod ans;
pub mod bit_utils;
pub mod decoder_buffer;
pub mod direct_bit_decoder;
pub mod direct_bit_encoder;
pub mod encoder_buffer;
pub mod rans_bit_decoder;
pub mod rans_bit_encoder;

// =============================================================================
// EdgeBreaker
// =============================================================================

pub mod compression_config;
pub mod encoder_options;
pub mod mesh_edgebreaker_decoder;
pub mod mesh_edgebreaker_encoder;
pub mod mesh_edgebreaker_shared;
pub mod mesh_edgebreaker_traversal_decoder;
pub mod mesh_edgebreaker_traversal_encoder;
pub mod mesh_edgebreaker_traversal_valence_decoder;
pub mod mesh_edgebreaker_traversal_valence_encoder;
pub mod status;
pub mod version;

// =============================================================================
// Re-exports
// =============================================================================

pub use bit_utils::{BinaryDecoder, BinaryEncoder};
pub use compression_config::{MeshEdgebreakerConnectivityEncodingMethod, MeshTraversalMethod};
pub use corner_table::{CornerTable, CornerTableView};
pub use corner_table_iterators::{FaceAdjacencyIterator, VertexCornersIterator, VertexRingIterator};
pub use decoder_buffer::DecoderBuffer;
pub use direct_bit_decoder::DirectBitDecoder;
pub use direct_bit_encoder::DirectBitEncoder;
pub use encoder_buffer::EncoderBuffer;
pub use encoder_options::EncoderOptions;
pub use geometry_attribute::{GeometryAttributeType, PointAttribute};
pub use geometry_indices::{
    AttributeValueIndex, CornerIndex, FaceIndex, PointIndex, VertexIndex, INVALID_CORNER_INDEX,
    INVALID_FACE_INDEX, INVALID_VERTEX_INDEX,
};
pub use mesh::Mesh;
pub use mesh_attribute_corner_table::MeshAttributeCornerTable;
pub use mesh_edgebreaker_decoder::{
    decode_connectivity_with, DecodedConnectivity, MeshEdgebreakerDecoder,
};
pub use mesh_edgebreaker_encoder::{
    encode_connectivity_with, EncodedConnectivity, MeshEdgebreakerEncoder,
};
pub use mesh_edgebreaker_shared::{EdgeFaceName, EdgebreakerSymbol, TopologySplitEventData};
pub use mesh_edgebreaker_traversal_decoder::{MeshEdgebreakerTraversalDecoder, TraversalDecoder};
pub use mesh_edgebreaker_traversal_encoder::{MeshEdgebreakerTraversalEncoder, TraversalEncoder};
pub use mesh_edgebreaker_traversal_valence_decoder::MeshEdgebreakerTraversalValenceDecoder;
pub use mesh_edgebreaker_traversal_valence_encoder::MeshEdgebreakerTraversalValenceEncoder;
pub use mesh_traversal_sequencer::{generate_point_sequence, PointSequence};
pub use rans_bit_decoder::RAnsBitDecoder;
pub use rans_bit_encoder::RAnsBitEncoder;
pub use status::{DracoError, Status};
pub use valence_cache::ValenceCache;
