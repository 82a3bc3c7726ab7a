use crate::status::DracoError;

/// Connectivity coding variant, stored as the first byte of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshEdgebreakerConnectivityEncodingMethod {
    Standard = 0,
    Valence = 2,
}

impl TryFrom<u8> for MeshEdgebreakerConnectivityEncodingMethod {
    type Error = DracoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Standard),
            // 1 was the predictive traversal of older releases.
            2 => Ok(Self::Valence),
            _ => Err(DracoError::UnsupportedFeature(format!(
                "Unknown edgebreaker traversal decoder type: {}",
                value
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshTraversalMethod {
    DepthFirst = 0,
    MaxPredictionDegree = 1,
}

impl TryFrom<i32> for MeshTraversalMethod {
    type Error = DracoError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::DepthFirst),
            1 => Ok(Self::MaxPredictionDegree),
            _ => Err(DracoError::InvalidParameter(format!(
                "Unknown traversal method: {}",
                value
            ))),
        }
    }
}
