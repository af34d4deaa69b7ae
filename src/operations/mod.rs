// src/operations/mod.rs

//! Defines the closed set of linear-optical components a circuit is built from.
//!
//! Every component names the wires it acts on (1-based) and carries at most
//! one numeric parameter. Parameters are validated when the component is
//! constructed, so an engine never sees an out-of-range angle or a malformed
//! herald pattern.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::core::constants::photon_constants::{MAX_BEAMSPLITTER_THETA, MAX_PHASE};
use crate::core::{PhotonError, WireId};

/// Discriminant of [`Component`], used for logging and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    BeamSplitter,
    Switch,
    PhaseShift,
    Loss,
    Detector,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::BeamSplitter => "BeamSplitter",
            ComponentKind::Switch => "Switch",
            ComponentKind::PhaseShift => "PhaseShift",
            ComponentKind::Loss => "Loss",
            ComponentKind::Detector => "Detector",
        };
        write!(f, "{}", name)
    }
}

/// A single optical element placed on one or more wires.
///
/// Analogy: the photonic counterpart of a gate in a qubit circuit. All five
/// kinds conserve photon number except `Loss`, and all are unitary except
/// `Loss` and `Detector`.
#[derive(Debug, Clone, PartialEq)] // f64 parameters rule out Eq
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Component {
    /// Mixes the occupation of two wires.
    BeamSplitter {
        /// The two wires being mixed.
        wires: [WireId; 2],
        /// Mixing angle in degrees, within `[0, 180]`. 90 is a balanced (50:50) splitter.
        theta: f64,
    },

    /// Exchanges the occupation of two wires.
    Switch {
        /// The two wires being exchanged.
        wires: [WireId; 2],
    },

    /// Applies `e^(i·phase·n)` to a wire carrying `n` photons.
    PhaseShift {
        /// The wire receiving the phase.
        wire: WireId,
        /// Phase in degrees, within `[0, 360]`.
        phase: f64,
    },

    /// Amplitude-damping channel on one wire; each photon survives with probability `eta`.
    Loss {
        /// The lossy wire.
        wire: WireId,
        /// Transmission within `[0, 1]`.
        eta: f64,
    },

    /// Number-resolving detection that keeps only events matching `herald`.
    Detector {
        /// Detected wires, pairwise distinct.
        wires: Vec<WireId>,
        /// Required photon count on each detected wire.
        herald: Vec<usize>,
    },
}

impl Component {
    /// Beam splitter on wires `a` and `b` with angle `theta` in degrees.
    pub fn beam_splitter(a: usize, b: usize, theta: f64) -> Result<Self, PhotonError> {
        let wires = distinct_pair(a, b, ComponentKind::BeamSplitter)?;
        check_range("Beam splitter angle", theta, 0.0, MAX_BEAMSPLITTER_THETA)?;
        Ok(Component::BeamSplitter { wires, theta })
    }

    /// Switch between wires `a` and `b`.
    pub fn switch(a: usize, b: usize) -> Result<Self, PhotonError> {
        let wires = distinct_pair(a, b, ComponentKind::Switch)?;
        Ok(Component::Switch { wires })
    }

    /// Phase shift of `phase` degrees on `wire`.
    pub fn phase_shift(wire: usize, phase: f64) -> Result<Self, PhotonError> {
        let wire = WireId::new(wire)?;
        check_range("Phase", phase, 0.0, MAX_PHASE)?;
        Ok(Component::PhaseShift { wire, phase })
    }

    /// Loss with transmission `eta` on `wire`.
    pub fn loss(wire: usize, eta: f64) -> Result<Self, PhotonError> {
        let wire = WireId::new(wire)?;
        check_range("Transmission eta", eta, 0.0, 1.0)?;
        Ok(Component::Loss { wire, eta })
    }

    /// Detector on `wires`, post-selecting on `herald`.
    pub fn detector(wires: &[usize], herald: &[usize]) -> Result<Self, PhotonError> {
        if wires.is_empty() {
            return Err(PhotonError::configuration("Detector needs at least one wire"));
        }
        if herald.len() != wires.len() {
            return Err(PhotonError::configuration(format!(
                "Herald pattern has {} entries but the detector watches {} wires",
                herald.len(),
                wires.len()
            )));
        }
        let mut ids = Vec::with_capacity(wires.len());
        for &w in wires {
            let id = WireId::new(w)?;
            if ids.contains(&id) {
                return Err(PhotonError::configuration(format!("Detector lists {} twice", id)));
            }
            ids.push(id);
        }
        Ok(Component::Detector { wires: ids, herald: herald.to_vec() })
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::BeamSplitter { .. } => ComponentKind::BeamSplitter,
            Component::Switch { .. } => ComponentKind::Switch,
            Component::PhaseShift { .. } => ComponentKind::PhaseShift,
            Component::Loss { .. } => ComponentKind::Loss,
            Component::Detector { .. } => ComponentKind::Detector,
        }
    }

    /// Returns every wire the component acts on, in declaration order.
    pub fn involved_wires(&self) -> Vec<WireId> {
        match self {
            Component::BeamSplitter { wires, .. } => wires.to_vec(),
            Component::Switch { wires } => wires.to_vec(),
            Component::PhaseShift { wire, .. } => vec![*wire],
            Component::Loss { wire, .. } => vec![*wire],
            Component::Detector { wires, .. } => wires.clone(),
        }
    }

    /// True for the components that act as a unitary on the Fock space.
    pub fn is_unitary(&self) -> bool {
        matches!(
            self,
            Component::BeamSplitter { .. } | Component::Switch { .. } | Component::PhaseShift { .. }
        )
    }

    /// Re-checks the invariants of the constructors. Needed for components
    /// built literally (or deserialized) rather than through the constructors.
    pub fn validate(&self) -> Result<(), PhotonError> {
        match self {
            Component::BeamSplitter { wires, theta } => {
                distinct_pair(wires[0].0, wires[1].0, ComponentKind::BeamSplitter)?;
                check_range("Beam splitter angle", *theta, 0.0, MAX_BEAMSPLITTER_THETA)
            }
            Component::Switch { wires } => distinct_pair(wires[0].0, wires[1].0, ComponentKind::Switch).map(|_| ()),
            Component::PhaseShift { wire, phase } => {
                WireId::new(wire.0)?;
                check_range("Phase", *phase, 0.0, MAX_PHASE)
            }
            Component::Loss { wire, eta } => {
                WireId::new(wire.0)?;
                check_range("Transmission eta", *eta, 0.0, 1.0)
            }
            Component::Detector { wires, herald } => {
                let numbers: Vec<usize> = wires.iter().map(|w| w.0).collect();
                Component::detector(&numbers, herald).map(|_| ())
            }
        }
    }

    /// Short glyph used when drawing circuits.
    pub(crate) fn symbol(&self) -> &'static str {
        match self {
            Component::BeamSplitter { .. } => "BS",
            Component::Switch { .. } => "SW",
            Component::PhaseShift { .. } => "P",
            Component::Loss { .. } => "L",
            Component::Detector { .. } => "D",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::BeamSplitter { wires, theta } => write!(f, "BeamSplitter({}, {}, θ={}°)", wires[0], wires[1], theta),
            Component::Switch { wires } => write!(f, "Switch({}, {})", wires[0], wires[1]),
            Component::PhaseShift { wire, phase } => write!(f, "PhaseShift({}, φ={}°)", wire, phase),
            Component::Loss { wire, eta } => write!(f, "Loss({}, η={})", wire, eta),
            Component::Detector { wires, herald } => {
                let wires: Vec<String> = wires.iter().map(|w| w.to_string()).collect();
                write!(f, "Detector([{}], herald={:?})", wires.join(", "), herald)
            }
        }
    }
}

fn distinct_pair(a: usize, b: usize, kind: ComponentKind) -> Result<[WireId; 2], PhotonError> {
    let (a, b) = (WireId::new(a)?, WireId::new(b)?);
    if a == b {
        return Err(PhotonError::configuration(format!(
            "{} needs two distinct wires, got {} twice",
            kind, a
        )));
    }
    Ok([a, b])
}

fn check_range(what: &str, value: f64, lo: f64, hi: f64) -> Result<(), PhotonError> {
    // NaN fails both comparisons and is rejected here too
    if !(value >= lo && value <= hi) {
        return Err(PhotonError::configuration(format!(
            "{} {} is outside [{}, {}]",
            what, value, lo, hi
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_accept_valid_parameters() -> Result<(), PhotonError> {
        assert_eq!(Component::beam_splitter(1, 2, 90.0)?.kind(), ComponentKind::BeamSplitter);
        assert_eq!(Component::switch(2, 1)?.involved_wires(), vec![WireId(2), WireId(1)]);
        assert!(Component::phase_shift(1, 360.0)?.is_unitary());
        assert!(!Component::loss(3, 0.0)?.is_unitary());
        assert_eq!(Component::detector(&[1, 3], &[0, 1])?.kind(), ComponentKind::Detector);
        Ok(())
    }

    #[test]
    fn test_out_of_range_parameters_are_rejected() {
        assert!(matches!(Component::beam_splitter(1, 2, 180.5), Err(PhotonError::Configuration { .. })));
        assert!(Component::beam_splitter(1, 2, -1.0).is_err());
        assert!(Component::beam_splitter(1, 2, f64::NAN).is_err());
        assert!(Component::phase_shift(1, 361.0).is_err());
        assert!(Component::loss(1, 1.5).is_err());
    }

    #[test]
    fn test_malformed_wires_are_rejected() {
        assert!(Component::beam_splitter(1, 1, 90.0).is_err());
        assert!(Component::switch(0, 1).is_err());
        assert!(Component::detector(&[], &[]).is_err());
        assert!(Component::detector(&[1, 1], &[0, 0]).is_err());
        match Component::detector(&[1, 2], &[1]) {
            Err(PhotonError::Configuration { message }) => assert!(message.contains("Herald pattern")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_catches_literal_components() {
        let bad = Component::PhaseShift { wire: WireId(1), phase: 400.0 };
        assert!(bad.validate().is_err());
        let good = Component::Switch { wires: [WireId(1), WireId(2)] };
        assert!(good.validate().is_ok());
    }
}
