// src/simulation/engine.rs

//! The capability shared by both engines.
//!
//! A backend never mutates a state in place across components: each step
//! consumes the previous state and returns the next one, so a run is a fold
//! from the prepared input through every component.

use ndarray::Array2;
use num_complex::Complex64;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::circuits::Circuit;
use crate::core::{Occupation, PhotonError};
use crate::operations::Component;

/// Selects which engine evaluates a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EngineKind {
    /// Density matrix over the bosonic Fock space. Supports every component.
    #[default]
    Fock,
    /// Single-particle unitary plus permanents. Probabilities only, no loss.
    Permanent,
}

/// One engine's strategy for turning components into state updates.
pub trait PhotonicBackend {
    /// Evolving state threaded through the components.
    type State;

    /// Rejects components this backend cannot express for a circuit with
    /// `n_wires` wires. Called when a component is added, before any run.
    fn accepts(&self, component: &Component, n_wires: usize) -> Result<(), PhotonError>;

    /// Initial state for the given input occupation.
    fn prepare(&self, input: &Occupation) -> Result<Self::State, PhotonError>;

    /// Matrix the component contributes in this backend's representation, or
    /// `None` when the component is not unitary (or acts as the identity).
    fn unitary(&self, state: &Self::State, component: &Component) -> Result<Option<Array2<Complex64>>, PhotonError>;

    /// Returns the state after `component`.
    fn apply(&self, state: Self::State, component: &Component) -> Result<Self::State, PhotonError>;

    /// Final (occupation, probability) list in rank order, including zeros.
    fn distribution(&self, state: Self::State) -> Result<Vec<(Occupation, f64)>, PhotonError>;
}

/// Runs `circuit` from its input through every component on `backend`.
pub(crate) fn fold_circuit<B: PhotonicBackend>(backend: &B, circuit: &Circuit) -> Result<Vec<(Occupation, f64)>, PhotonError> {
    let input = circuit.input().ok_or_else(|| {
        PhotonError::configuration("set_input_state must be called before running the circuit")
    })?;
    for component in circuit.components() {
        backend.accepts(component, circuit.n_wires())?;
    }
    let state = circuit
        .components()
        .iter()
        .try_fold(backend.prepare(&input)?, |state, component| backend.apply(state, component))?;
    backend.distribution(state)
}
