// src/simulation/mod.rs

//! Simulates the execution of `photonq::circuits::Circuit` on one of two engines.
//!
//! `Simulator` is the single front door: construct it for `(n_wires,
//! n_photons)`, set the input occupation, append components, run, read the
//! output. The engine is chosen through [`SimulatorConfig`]; callers never
//! depend on which one is active.

mod results;
pub(crate) mod engine;
pub mod fock;
pub mod permanent;
pub(crate) mod linalg;

// Re-export the main public interface types
pub use engine::{EngineKind, PhotonicBackend};
pub use fock::{FockEngine, FockState};
pub use permanent::{ModeState, NaivePermanent, PermanentEngine, PermanentMethod, PermanentStrategy, RyserPermanent};
pub use results::{OutputEntry, SimulationResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::circuits::Circuit;
use crate::core::constants::photon_constants::{
    DEFAULT_BEAMSPLITTER_THETA, DEFAULT_DISPLAY_DIGITS, DEFAULT_ETA, DEFAULT_PHASE, DEFAULT_TOLERANCE,
};
use crate::core::PhotonError;
use crate::operations::Component;
use engine::fold_circuit;

/// Options controlling how a circuit is evaluated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulatorConfig {
    /// Which engine evaluates the circuit.
    pub engine: EngineKind,
    /// Entries below this magnitude are treated as zero.
    pub tolerance: f64,
    /// Significant digits kept in reported probabilities.
    pub display_digits: usize,
    /// Permanent algorithm (permanent engine only).
    pub permanent: PermanentMethod,
    /// Check Hermiticity and trace after every Fock-engine step.
    pub validate: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            tolerance: DEFAULT_TOLERANCE,
            display_digits: DEFAULT_DISPLAY_DIGITS,
            permanent: PermanentMethod::default(),
            validate: false,
        }
    }
}

impl SimulatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_display_digits(mut self, digits: usize) -> Self {
        self.display_digits = digits;
        self
    }

    pub fn with_permanent(mut self, method: PermanentMethod) -> Self {
        self.permanent = method;
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    fn fock(&self, circuit: &Circuit) -> Result<FockEngine, PhotonError> {
        Ok(FockEngine::new(circuit.n_wires(), circuit.n_photons())?
            .with_tolerance(self.tolerance)
            .with_validation(self.validate))
    }

    fn permanent_engine(&self, circuit: &Circuit) -> Result<PermanentEngine, PhotonError> {
        Ok(PermanentEngine::new(circuit.n_wires(), circuit.n_photons())?
            .with_tolerance(self.tolerance)
            .with_method(self.permanent))
    }

    /// Rejects a component the configured engine cannot express.
    fn check_supported(&self, circuit: &Circuit, component: &Component) -> Result<(), PhotonError> {
        match self.engine {
            EngineKind::Fock => self.fock(circuit)?.accepts(component, circuit.n_wires()),
            EngineKind::Permanent => self.permanent_engine(circuit)?.accepts(component, circuit.n_wires()),
        }
    }
}

/// Evaluates `circuit` from its input state with the engine chosen by `config`.
///
/// Runs are pure: the circuit is not modified and evaluating it twice gives
/// the same result.
#[tracing::instrument(skip(circuit, config), fields(n_wires = circuit.n_wires(), n_photons = circuit.n_photons(), engine = ?config.engine))]
pub fn simulate(circuit: &Circuit, config: &SimulatorConfig) -> Result<SimulationResult, PhotonError> {
    circuit.validate()?;
    let distribution = match config.engine {
        EngineKind::Fock => fold_circuit(&config.fock(circuit)?, circuit)?,
        EngineKind::Permanent => fold_circuit(&config.permanent_engine(circuit)?, circuit)?,
    };
    let result = SimulationResult::from_distribution(config.engine, distribution, config.tolerance, config.display_digits);
    tracing::debug!(outputs = result.len(), total = result.total_probability(), "simulation finished");
    Ok(result)
}

/// The main simulator: one circuit, one engine choice, one stored result.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimulatorConfig,
    circuit: Circuit,
    result: Option<SimulationResult>,
}

impl Simulator {
    /// Fock engine with default settings. Fails if `n_wires < 1`.
    pub fn new(n_wires: usize, n_photons: usize) -> Result<Self, PhotonError> {
        Self::with_config(n_wires, n_photons, SimulatorConfig::default())
    }

    pub fn with_config(n_wires: usize, n_photons: usize, config: SimulatorConfig) -> Result<Self, PhotonError> {
        Ok(Self {
            config,
            circuit: Circuit::new(n_wires, n_photons)?,
            result: None,
        })
    }

    /// Wraps an already-built circuit, checking every component against the engine.
    pub fn from_circuit(circuit: Circuit, config: SimulatorConfig) -> Result<Self, PhotonError> {
        circuit.validate()?;
        for component in circuit.components() {
            config.check_supported(&circuit, component)?;
        }
        Ok(Self { config, circuit, result: None })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Sets the input occupation; length must equal `n_wires`, sum `n_photons`.
    pub fn set_input_state(&mut self, counts: &[usize]) -> Result<(), PhotonError> {
        self.circuit.set_input(counts)?;
        self.result = None;
        Ok(())
    }

    /// Validates `component` against the circuit and the engine, then appends it.
    pub fn add_component(&mut self, component: Component) -> Result<(), PhotonError> {
        self.config.check_supported(&self.circuit, &component)?;
        self.circuit.add_component(component)?;
        self.result = None;
        Ok(())
    }

    /// Beam splitter on `wires`; `theta` in degrees, 90 when `None`.
    pub fn add_beamsplitter(&mut self, wires: [usize; 2], theta: impl Into<Option<f64>>) -> Result<(), PhotonError> {
        let theta = theta.into().unwrap_or(DEFAULT_BEAMSPLITTER_THETA);
        self.add_component(Component::beam_splitter(wires[0], wires[1], theta)?)
    }

    pub fn add_switch(&mut self, wires: [usize; 2]) -> Result<(), PhotonError> {
        self.add_component(Component::switch(wires[0], wires[1])?)
    }

    /// Phase shift on `wire`; `phase` in degrees, 180 when `None`.
    pub fn add_phaseshift(&mut self, wire: usize, phase: impl Into<Option<f64>>) -> Result<(), PhotonError> {
        let phase = phase.into().unwrap_or(DEFAULT_PHASE);
        self.add_component(Component::phase_shift(wire, phase)?)
    }

    /// Loss on `wire` with transmission `eta`, 1 (lossless) when `None`.
    pub fn add_loss(&mut self, wire: usize, eta: impl Into<Option<f64>>) -> Result<(), PhotonError> {
        let eta = eta.into().unwrap_or(DEFAULT_ETA);
        self.add_component(Component::loss(wire, eta)?)
    }

    pub fn add_detector(&mut self, wires: &[usize], herald: &[usize]) -> Result<(), PhotonError> {
        self.add_component(Component::detector(wires, herald)?)
    }

    /// Evaluates the circuit without touching the stored result.
    pub fn simulate(&self) -> Result<SimulationResult, PhotonError> {
        simulate(&self.circuit, &self.config)
    }

    /// Evaluates the circuit and stores the result for [`Simulator::output`].
    /// Every run starts again from the input state.
    pub fn run(&mut self) -> Result<(), PhotonError> {
        self.result = None;
        self.result = Some(self.simulate()?);
        Ok(())
    }

    /// Result of the last successful run.
    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    /// `(basis-string, probability)` pairs of the last run.
    pub fn output(&self) -> Result<Vec<(String, f64)>, PhotonError> {
        self.result
            .as_ref()
            .map(SimulationResult::to_pairs)
            .ok_or_else(|| PhotonError::configuration("run() must complete before reading output"))
    }
}
