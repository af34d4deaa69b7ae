// src/simulation/permanent.rs

//! Probability-only engine built on the single-particle unitary.
//!
//! Unitary components are composed into an `n_wires × n_wires` mode matrix.
//! Output probabilities follow from the permanent of the submatrix selected
//! by the input and output occupations:
//!
//! `P(s | t) = |perm(U[s, t])|² / (∏ sᵢ! · ∏ tⱼ!)`
//!
//! No Fock-space operator or amplitude vector is ever built.

use ndarray::Array2;
use num_complex::Complex64;
use num_traits::{One, Zero};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::engine::PhotonicBackend;
use super::linalg::identity;
use crate::basis::BasisIndexer;
use crate::core::constants::photon_constants::DEFAULT_TOLERANCE;
use crate::core::{Occupation, PhotonError, WireId};
use crate::operations::Component;

/// Exact algorithm used to evaluate matrix permanents.
pub trait PermanentStrategy {
    fn permanent(&self, m: &Array2<Complex64>) -> Result<Complex64, PhotonError>;
}

/// Sum over all n! permutations. Exponential; fine for a handful of photons.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaivePermanent;

/// Ryser's inclusion–exclusion formula, O(2ⁿ·n²).
#[derive(Debug, Clone, Copy, Default)]
pub struct RyserPermanent;

impl PermanentStrategy for NaivePermanent {
    fn permanent(&self, m: &Array2<Complex64>) -> Result<Complex64, PhotonError> {
        fn expand(m: &Array2<Complex64>, row: usize, used: &mut [bool], partial: Complex64) -> Complex64 {
            if row == m.nrows() {
                return partial;
            }
            let mut total = Complex64::zero();
            for col in 0..m.ncols() {
                if used[col] {
                    continue;
                }
                used[col] = true;
                total += expand(m, row + 1, used, partial * m[[row, col]]);
                used[col] = false;
            }
            total
        }
        let mut used = vec![false; m.ncols()];
        Ok(expand(m, 0, &mut used, Complex64::one()))
    }
}

impl PermanentStrategy for RyserPermanent {
    fn permanent(&self, m: &Array2<Complex64>) -> Result<Complex64, PhotonError> {
        let n = m.nrows();
        if n == 0 {
            return Ok(Complex64::one());
        }
        // Column subsets are enumerated as bitmasks of a usize.
        let subsets = u32::try_from(n)
            .ok()
            .and_then(|bits| 1usize.checked_shl(bits))
            .ok_or_else(|| {
                PhotonError::simulation(format!(
                    "Ryser permanent supports at most {} photons, got {}",
                    usize::BITS - 1,
                    n
                ))
            })?;
        let mut total = Complex64::zero();
        for subset in 1usize..subsets {
            let mut product = Complex64::one();
            for i in 0..n {
                let row_sum: Complex64 = (0..n).filter(|j| subset & (1 << j) != 0).map(|j| m[[i, j]]).sum();
                product *= row_sum;
            }
            if subset.count_ones() % 2 == 0 {
                total += product;
            } else {
                total -= product;
            }
        }
        Ok(if n % 2 == 1 { -total } else { total })
    }
}

/// Selects the [`PermanentStrategy`] used by the permanent engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PermanentMethod {
    #[default]
    Naive,
    Ryser,
}

impl PermanentStrategy for PermanentMethod {
    fn permanent(&self, m: &Array2<Complex64>) -> Result<Complex64, PhotonError> {
        match self {
            PermanentMethod::Naive => NaivePermanent.permanent(m),
            PermanentMethod::Ryser => RyserPermanent.permanent(m),
        }
    }
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

/// Probability of detecting `output` given `input` under the mode unitary `u`.
pub fn output_probability<S: PermanentStrategy + ?Sized>(
    u: &Array2<Complex64>,
    input: &Occupation,
    output: &Occupation,
    strategy: &S,
) -> Result<f64, PhotonError> {
    let n_photons = input.photons();
    // Column j of U repeated input[j] times.
    let columns: Vec<usize> = input
        .counts()
        .iter()
        .enumerate()
        .flat_map(|(j, &count)| std::iter::repeat_n(j, count))
        .collect();
    // Row i repeated output[i] times.
    let rows: Vec<usize> = output
        .counts()
        .iter()
        .enumerate()
        .flat_map(|(i, &count)| std::iter::repeat_n(i, count))
        .collect();
    let ust = Array2::from_shape_fn((n_photons, n_photons), |(r, c)| u[[rows[r], columns[c]]]);

    let norm: f64 = input.counts().iter().chain(output.counts()).map(|&c| factorial(c)).product();
    Ok(strategy.permanent(&ust)?.norm_sqr() / norm)
}

/// Evolving state of the permanent engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeState {
    input: Occupation,
    unitary: Array2<Complex64>,
    /// Detectors in placement order, applied once probabilities exist.
    detectors: Vec<(Vec<usize>, Vec<usize>)>,
}

impl ModeState {
    /// Accumulated single-particle unitary.
    pub fn unitary(&self) -> &Array2<Complex64> {
        &self.unitary
    }

    pub fn input(&self) -> &Occupation {
        &self.input
    }
}

/// The permanent engine for a fixed wire and photon count.
#[derive(Debug, Clone)]
pub struct PermanentEngine {
    n_wires: usize,
    n_photons: usize,
    tolerance: f64,
    method: PermanentMethod,
}

impl PermanentEngine {
    pub fn new(n_wires: usize, n_photons: usize) -> Result<Self, PhotonError> {
        BasisIndexer::new(n_wires, n_photons)?;
        Ok(Self {
            n_wires,
            n_photons,
            tolerance: DEFAULT_TOLERANCE,
            method: PermanentMethod::default(),
        })
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_method(mut self, method: PermanentMethod) -> Self {
        self.method = method;
        self
    }

    fn beam_splitter_matrix(&self, wires: &[WireId; 2], theta_deg: f64) -> Array2<Complex64> {
        let (a, b) = (wires[0].index(), wires[1].index());
        let half = theta_deg.to_radians() / 2.0;
        let (sin, cos) = half.sin_cos();
        let mut u = identity(self.n_wires);
        u[[a, a]] = Complex64::new(cos, 0.0);
        u[[a, b]] = Complex64::new(sin, 0.0);
        u[[b, a]] = Complex64::new(-sin, 0.0);
        u[[b, b]] = Complex64::new(cos, 0.0);
        u
    }

    fn switch_matrix(&self, wires: &[WireId; 2]) -> Array2<Complex64> {
        let (a, b) = (wires[0].index(), wires[1].index());
        let mut u = identity(self.n_wires);
        u[[a, a]] = Complex64::zero();
        u[[b, b]] = Complex64::zero();
        u[[a, b]] = Complex64::one();
        u[[b, a]] = Complex64::one();
        u
    }

    fn phase_matrix(&self, wire: WireId, phase_deg: f64) -> Array2<Complex64> {
        let mut u = identity(self.n_wires);
        u[[wire.index(), wire.index()]] = Complex64::from_polar(1.0, phase_deg.to_radians());
        u
    }
}

impl PhotonicBackend for PermanentEngine {
    type State = ModeState;

    fn accepts(&self, component: &Component, n_wires: usize) -> Result<(), PhotonError> {
        for wire in component.involved_wires() {
            wire.check_in(n_wires.min(self.n_wires))?;
        }
        if let Component::Loss { .. } = component {
            return Err(PhotonError::UnsupportedOperation {
                message: "Loss is not supported by the permanent engine; use the Fock engine".to_string(),
            });
        }
        Ok(())
    }

    fn prepare(&self, input: &Occupation) -> Result<ModeState, PhotonError> {
        BasisIndexer::new(self.n_wires, self.n_photons)?.check(input.counts())?;
        Ok(ModeState {
            input: input.clone(),
            unitary: identity(self.n_wires),
            detectors: Vec::new(),
        })
    }

    fn unitary(&self, _state: &ModeState, component: &Component) -> Result<Option<Array2<Complex64>>, PhotonError> {
        Ok(match component {
            Component::BeamSplitter { wires, theta } => Some(self.beam_splitter_matrix(wires, *theta)),
            Component::Switch { wires } => Some(self.switch_matrix(wires)),
            Component::PhaseShift { wire, phase } => Some(self.phase_matrix(*wire, *phase)),
            Component::Loss { .. } | Component::Detector { .. } => None,
        })
    }

    fn apply(&self, mut state: ModeState, component: &Component) -> Result<ModeState, PhotonError> {
        match component {
            Component::Loss { .. } => {
                self.accepts(component, self.n_wires)?;
            }
            Component::Detector { wires, herald } => {
                let modes = wires.iter().map(|w| w.index()).collect();
                state.detectors.push((modes, herald.clone()));
            }
            _ => {
                if let Some(u) = self.unitary(&state, component)? {
                    state.unitary = u.dot(&state.unitary);
                }
            }
        }
        debug!(component = %component, "composed component into mode unitary");
        Ok(state)
    }

    fn distribution(&self, state: ModeState) -> Result<Vec<(Occupation, f64)>, PhotonError> {
        let indexer = BasisIndexer::new(self.n_wires, self.n_photons)?;
        let mut probabilities: Vec<(Occupation, f64)> = indexer
            .iter()
            .map(|output| {
                let p = output_probability(&state.unitary, &state.input, &output, &self.method)?;
                Ok((output, p))
            })
            .collect::<Result<_, PhotonError>>()?;

        for (modes, herald) in &state.detectors {
            for (output, p) in probabilities.iter_mut() {
                if output.restrict(modes) != *herald {
                    *p = 0.0;
                }
            }
            if probabilities.iter().all(|(_, p)| *p <= self.tolerance) {
                return Err(PhotonError::exhaustion(format!(
                    "No output survives detection with herald {:?}",
                    herald
                )));
            }
        }
        Ok(probabilities)
    }
}
