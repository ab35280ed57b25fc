//! Rumor values.
//!
//! A rumor is a fixed-width bit string. The all-zero string is the true
//! account of events; every set bit is one detail that has been distorted
//! on the way. Rumors print as their binary string, most significant bit
//! first, so bit index 0 is the leftmost character.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of bits (independent details) in a rumor.
pub const RUMOR_BITS: usize = 5;

/// Number of distinct rumors (2^RUMOR_BITS).
pub const RUMOR_SPACE: usize = 1 << RUMOR_BITS;

/// A single rumor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rumor(u8);

impl Rumor {
    /// The undistorted rumor (`00000`).
    pub const TRUE: Rumor = Rumor(0);

    /// The fully distorted rumor (`11111`).
    pub const FALSE: Rumor = Rumor((RUMOR_SPACE - 1) as u8);

    /// Creates a rumor from its numeric value.
    pub fn new(bits: u8) -> Result<Self, ModelError> {
        if (bits as usize) < RUMOR_SPACE {
            Ok(Self(bits))
        } else {
            Err(ModelError::InvalidRumor(format!(
                "{} does not fit in {} bits",
                bits, RUMOR_BITS
            )))
        }
    }

    /// Numeric value of the rumor.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Index of this rumor in a `RUMOR_SPACE`-sized table.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Rebuilds a rumor from a table index produced by [`Rumor::index`].
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < RUMOR_SPACE);
        Self(index as u8)
    }

    /// Returns a copy with bit `position` flipped (0 = leftmost).
    pub fn flip_bit(self, position: usize) -> Result<Self, ModelError> {
        if position >= RUMOR_BITS {
            return Err(ModelError::InvalidBit(position, RUMOR_BITS));
        }
        let mask = 1u8 << (RUMOR_BITS - 1 - position);
        Ok(Self(self.0 ^ mask))
    }

    /// Number of distorted details (set bits), 0 for the truth.
    pub fn distortion(self) -> u32 {
        self.0.count_ones()
    }

    /// All rumors in numeric order.
    pub fn all() -> impl Iterator<Item = Rumor> {
        (0..RUMOR_SPACE).map(Rumor::from_index)
    }
}

impl fmt::Display for Rumor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.0, width = RUMOR_BITS)
    }
}

impl FromStr for Rumor {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != RUMOR_BITS || !s.chars().all(|c| c == '0' || c == '1') {
            return Err(ModelError::InvalidRumor(format!(
                "'{}' is not a {}-bit binary string",
                s, RUMOR_BITS
            )));
        }
        let bits = u8::from_str_radix(s, 2)
            .map_err(|e| ModelError::InvalidRumor(e.to_string()))?;
        Rumor::new(bits)
    }
}

impl TryFrom<String> for Rumor {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rumor> for String {
    fn from(rumor: Rumor) -> Self {
        rumor.to_string()
    }
}
