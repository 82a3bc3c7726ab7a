//! Symbols and side-channel records shared by the EdgeBreaker encoder and
//! decoder.

use crate::status::{invalid_data, DracoError};

/// CLERS symbol of one traversed face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgebreakerSymbol {
    /// The tip vertex has not been reached yet.
    C,
    /// Both neighbouring faces are unvisited; the boundary is split in two.
    S,
    /// Only the left neighbouring face was visited before.
    L,
    /// Only the right neighbouring face was visited before.
    R,
    /// Both neighbouring faces were visited before.
    E,
}

impl EdgebreakerSymbol {
    pub const ALL: [EdgebreakerSymbol; 5] = [Self::C, Self::S, Self::L, Self::R, Self::E];

    /// Bit pattern written to the symbol stream, least significant bit first.
    pub fn bit_pattern(self) -> u32 {
        match self {
            Self::C => 0x0,
            Self::S => 0x1,
            Self::L => 0x3,
            Self::R => 0x5,
            Self::E => 0x7,
        }
    }

    pub fn bit_pattern_length(self) -> u32 {
        match self {
            Self::C => 1,
            _ => 3,
        }
    }

    pub fn from_bit_pattern(pattern: u32) -> Result<Self, DracoError> {
        match pattern {
            0x0 => Ok(Self::C),
            0x1 => Ok(Self::S),
            0x3 => Ok(Self::L),
            0x5 => Ok(Self::R),
            0x7 => Ok(Self::E),
            _ => Err(invalid_data(format!(
                "Invalid EdgeBreaker topology bit pattern {pattern:#x}"
            ))),
        }
    }

    /// Dense id in `0..5`, used by the legacy symbol tables.
    pub fn symbol_id(self) -> u32 {
        match self {
            Self::C => 0,
            Self::S => 1,
            Self::L => 2,
            Self::R => 3,
            Self::E => 4,
        }
    }

    pub fn from_symbol_id(id: u32) -> Result<Self, DracoError> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or_else(|| invalid_data(format!("Invalid EdgeBreaker symbol id {id}")))
    }
}

impl std::fmt::Display for EdgebreakerSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            Self::C => 'C',
            Self::S => 'S',
            Self::L => 'L',
            Self::R => 'R',
            Self::E => 'E',
        };
        write!(f, "{c}")
    }
}

/// Edge of a face on which a topology split was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeFaceName {
    LeftFaceEdge = 0,
    RightFaceEdge = 1,
}

impl EdgeFaceName {
    pub fn from_bit(bit: u32) -> Self {
        if bit & 1 == 0 {
            EdgeFaceName::LeftFaceEdge
        } else {
            EdgeFaceName::RightFaceEdge
        }
    }
}

/// Records that the traversal returned to a face boundary that was split
/// off earlier. Symbol ids count in encoder (traversal) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologySplitEventData {
    pub split_symbol_id: u32,
    pub source_symbol_id: u32,
    pub source_edge: EdgeFaceName,
}

/// Symbol id at which a hole boundary was closed. Only present in streams
/// older than 2.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleEventData {
    pub symbol_id: i32,
}

/// Valences outside of this range share the prediction of the nearest bound.
pub const MIN_VALENCE: i32 = 2;
pub const MAX_VALENCE: i32 = 7;

/// Valence mode byte of legacy valence streams, the only accepted value.
pub const VALENCE_MODE_2_7: u8 = 0;

pub fn clamp_valence(valence: i32) -> i32 {
    valence.clamp(MIN_VALENCE, MAX_VALENCE)
}

/// Symbol the valence coder expects next for a tip vertex of `valence`.
/// Low valence vertices are likely to be closed soon, high valence vertices
/// are likely to continue the fan.
pub fn predict_symbol(valence: i32) -> EdgebreakerSymbol {
    if clamp_valence(valence) < 6 {
        EdgebreakerSymbol::R
    } else {
        EdgebreakerSymbol::C
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_patterns() {
        for symbol in EdgebreakerSymbol::ALL {
            let pattern = symbol.bit_pattern();
            assert!(pattern < (1 << symbol.bit_pattern_length()));
            assert_eq!(EdgebreakerSymbol::from_bit_pattern(pattern).unwrap(), symbol);
            assert_eq!(
                EdgebreakerSymbol::from_symbol_id(symbol.symbol_id()).unwrap(),
                symbol
            );
        }
        assert!(EdgebreakerSymbol::from_bit_pattern(2).is_err());
        assert!(EdgebreakerSymbol::from_symbol_id(5).is_err());
    }

    #[test]
    fn test_prediction() {
        assert_eq!(predict_symbol(0), EdgebreakerSymbol::R);
        assert_eq!(predict_symbol(5), EdgebreakerSymbol::R);
        assert_eq!(predict_symbol(6), EdgebreakerSymbol::C);
        assert_eq!(predict_symbol(40), EdgebreakerSymbol::C);
    }
}
