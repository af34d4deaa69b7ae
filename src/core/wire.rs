// src/core/wire.rs

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::PhotonError;

/// Identifies an optical wire (mode) of a circuit.
///
/// Wires are numbered from 1 at every public boundary. Engines work with
/// 0-based mode indices internally; [`WireId::index`] performs the shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WireId(pub usize);

impl WireId {
    /// Builds a wire identifier, rejecting the invalid wire `0`.
    pub fn new(number: usize) -> Result<Self, PhotonError> {
        if number == 0 {
            return Err(PhotonError::configuration("Wire indices are 1-based; wire 0 does not exist"));
        }
        Ok(Self(number))
    }

    /// The 1-based wire number.
    pub fn number(&self) -> usize {
        self.0
    }

    /// The 0-based mode index used inside the engines.
    pub fn index(&self) -> usize {
        self.0 - 1
    }

    /// Checks that this wire exists in a circuit of `n_wires` wires.
    pub(crate) fn check_in(&self, n_wires: usize) -> Result<(), PhotonError> {
        if self.0 == 0 || self.0 > n_wires {
            return Err(PhotonError::WireOutOfRange {
                wire: *self,
                message: format!("circuit only has wires 1..={}", n_wires),
            });
        }
        Ok(())
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0)
    }
}
