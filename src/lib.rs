// src/lib.rs

//! `photonq` - A library for simulating linear-optical circuits
//!
//! Photons enter a fixed number of wires, pass through beam splitters,
//! switches, phase shifts, loss and heralded detectors, and the library
//! reports the probability of every output occupation. Two engines are
//! available: a density-matrix engine over the Fock space that supports
//! every component, and a permanent engine that composes the single-photon
//! mode unitary and evaluates matrix permanents.

pub mod core;
pub mod basis;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod validation;

// Re-export the most common types for easier top-level use
pub use crate::core::{DensityMatrix, Occupation, PhotonError, WireId};
pub use basis::{BasisIndexer, FockSpace};
pub use operations::{Component, ComponentKind};
pub use circuits::{Circuit, CircuitBuilder};
pub use simulation::{
    simulate,
    EngineKind,
    PermanentMethod,
    SimulationResult,
    Simulator,
    SimulatorConfig,
};
pub use validation::{check_probability_sum, check_trace, validate_state};

// Example 1: Hong-Ou-Mandel interference
// Two photons meet on a balanced beam splitter and always leave together.
/// ```
/// use photonq::{PhotonError, Simulator};
///
/// fn main() -> Result<(), PhotonError> {
///     let mut sim = Simulator::new(2, 2)?;
///     sim.set_input_state(&[1, 1])?;
///     sim.add_beamsplitter([1, 2], 90.0)?;
///     sim.run()?;
///
///     let output = sim.output()?;
///     println!("{:?}", output);
///     // The coincidence |11> is suppressed entirely.
///     assert_eq!(output, vec![("20".to_string(), 0.5), ("02".to_string(), 0.5)]);
///     Ok(())
/// }
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: Mach-Zehnder interferometer on the permanent engine
// A phase of 180 degrees in one arm routes the photon back to wire 1.
/// ```
/// use photonq::{CircuitBuilder, EngineKind, PhotonError, Simulator, SimulatorConfig};
///
/// fn main() -> Result<(), PhotonError> {
///     let circuit = CircuitBuilder::new(2, 1)
///         .input(&[1, 0])
///         .beam_splitter(1, 2, 90.0)
///         .phase_shift(1, 180.0)
///         .beam_splitter(1, 2, 90.0)
///         .build()?;
///     println!("{}", circuit);
///
///     let config = SimulatorConfig::new().with_engine(EngineKind::Permanent);
///     let mut sim = Simulator::from_circuit(circuit, config)?;
///     sim.run()?;
///     assert_eq!(sim.output()?, vec![("10".to_string(), 1.0)]);
///     Ok(())
/// }
/// ```
#[doc(hidden)]
const _: () = ();
