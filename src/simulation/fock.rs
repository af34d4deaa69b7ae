// src/simulation/fock.rs

//! Density-matrix engine over the bosonic Fock space.
//!
//! The state is a dim×dim density matrix indexed by basis rank. Unitary
//! components are built as full matrices over the current space and applied
//! as `ρ ← UρU†`; loss is a Kraus channel; detection is a projective
//! post-selection that is deliberately left unnormalized.

use ndarray::Array2;
use num_complex::Complex64;
use num_traits::{One, Zero};
use tracing::{debug, trace};

use super::engine::PhotonicBackend;
use super::linalg::{conjugate_by, dagger, expm, identity};
use crate::basis::{binomial, FockSpace};
use crate::core::constants::photon_constants::DEFAULT_TOLERANCE;
use crate::core::{DensityMatrix, Occupation, PhotonError, WireId};
use crate::operations::Component;
use crate::validation;

/// Evolving state of the Fock engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FockState {
    space: FockSpace,
    /// `basis[rank]` is the occupation tuple of `rank` in `space`.
    basis: Vec<Occupation>,
    rho: DensityMatrix,
}

impl FockState {
    pub fn density_matrix(&self) -> &DensityMatrix {
        &self.rho
    }

    pub fn space(&self) -> &FockSpace {
        &self.space
    }

    /// Occupation tuples in rank order.
    pub fn basis(&self) -> &[Occupation] {
        &self.basis
    }

    /// Ranks whose diagonal probability exceeds `tol`.
    fn occupied(&self, tol: f64) -> Vec<usize> {
        (0..self.rho.dim()).filter(|&r| self.rho.probability(r) > tol).collect()
    }

    /// Embeds the state into the space of every photon number down to zero.
    /// The current ranks are kept, so embedding is zero padding.
    fn with_all_photon_numbers(self) -> Result<Self, PhotonError> {
        if self.space.min_photons() == 0 {
            return Ok(self);
        }
        let space = FockSpace::truncated(self.space.n_wires(), self.space.max_photons(), 0)?;
        let basis = space.basis_states()?;
        let rho = self.rho.padded(space.dim());
        Ok(Self { space, basis, rho })
    }
}

/// The density-matrix engine for a fixed wire and photon count.
#[derive(Debug, Clone)]
pub struct FockEngine {
    n_wires: usize,
    n_photons: usize,
    tolerance: f64,
    validate: bool,
}

impl FockEngine {
    /// Fails if `n_wires < 1` or the Fock space is too large to index.
    pub fn new(n_wires: usize, n_photons: usize) -> Result<Self, PhotonError> {
        FockSpace::fixed(n_wires, n_photons)?;
        Ok(Self {
            n_wires,
            n_photons,
            tolerance: DEFAULT_TOLERANCE,
            validate: false,
        })
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Checks Hermiticity (and trace, for unitary steps) after every component.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Block for one two-wire group: `exp(i·(θ/2)·G(k))`, `k = local photons + 1`.
    fn beam_splitter_block(local_photons: usize, theta_rad: f64) -> Array2<Complex64> {
        let k = local_photons + 1;
        let generator = beam_splitter_generator(k);
        let scale = Complex64::new(0.0, theta_rad / 2.0);
        expm(&generator.mapv(|g| scale * g))
    }

    fn beam_splitter_unitary(&self, state: &FockState, a: usize, b: usize, theta_deg: f64) -> Result<Array2<Complex64>, PhotonError> {
        let theta = theta_deg.to_radians();
        let dim = state.space.dim();
        let mut u = identity(dim);
        let mut visited = vec![false; dim];

        for rank in state.occupied(self.tolerance) {
            if visited[rank] {
                continue;
            }
            let occ = &state.basis[rank];
            let local = occ.get(a) + occ.get(b);
            if local == 0 {
                continue;
            }
            // Same two-wire enumeration as the indexer: wire a descending.
            let mut group = Vec::with_capacity(local + 1);
            for p in 0..=local {
                let target = occ.with(a, local - p).with(b, p);
                group.push(state.space.rank_of(target.counts())?);
            }
            let block = Self::beam_splitter_block(local, theta);
            trace!(rank, local, group = ?group, "installing beam splitter block");
            for (p, &row) in group.iter().enumerate() {
                for (q, &col) in group.iter().enumerate() {
                    u[[row, col]] = block[[p, q]];
                }
                visited[row] = true;
            }
        }
        Ok(u)
    }

    fn switch_unitary(&self, state: &FockState, a: usize, b: usize) -> Result<Array2<Complex64>, PhotonError> {
        let dim = state.space.dim();
        let mut u: Array2<Complex64> = Array2::zeros((dim, dim));
        for (rank, occ) in state.basis.iter().enumerate() {
            let target = state.space.rank_of(occ.swapped(a, b).counts())?;
            u[[target, rank]] = Complex64::one();
        }
        Ok(u)
    }

    fn phase_unitary(&self, state: &FockState, a: usize, phase_deg: f64) -> Option<Array2<Complex64>> {
        if phase_deg.rem_euclid(360.0) == 0.0 {
            return None;
        }
        let phase = phase_deg.to_radians();
        let diag: Vec<Complex64> = state
            .basis
            .iter()
            .map(|occ| Complex64::from_polar(1.0, phase * occ.get(a) as f64))
            .collect();
        Some(Array2::from_diag(&ndarray::Array1::from(diag)))
    }

    /// Kraus operators of the loss channel on mode `a`, indexed by lost photon count.
    fn loss_kraus(&self, state: &FockState, a: usize, eta: f64) -> Result<Vec<Array2<Complex64>>, PhotonError> {
        let dim = state.space.dim();
        let occupied = state.occupied(self.tolerance);
        let mut operators = Vec::with_capacity(self.n_photons + 1);
        for lost in 0..=self.n_photons {
            let mut k: Array2<Complex64> = Array2::zeros((dim, dim));
            for &rank in &occupied {
                let occ = &state.basis[rank];
                let q = occ.get(a);
                if q < lost {
                    continue;
                }
                let ways = binomial(q, lost).unwrap_or(0) as f64;
                let amplitude = ways.sqrt() * eta.powf((q - lost) as f64 / 2.0) * (1.0 - eta).powf(lost as f64 / 2.0);
                if amplitude == 0.0 {
                    continue;
                }
                let target = state.space.rank_of(occ.with(a, q - lost).counts())?;
                k[[target, rank]] = Complex64::new(amplitude, 0.0);
            }
            operators.push(k);
        }
        Ok(operators)
    }

    fn apply_loss(&self, state: FockState, wire: WireId, eta: f64) -> Result<FockState, PhotonError> {
        if eta == 1.0 {
            return Ok(state);
        }
        let state = state.with_all_photon_numbers()?;
        let kraus = self.loss_kraus(&state, wire.index(), eta)?;
        let rho = state.rho.matrix();
        let mut next: Array2<Complex64> = Array2::zeros(rho.raw_dim());
        for k in &kraus {
            next = next + k.dot(rho).dot(&dagger(k));
        }
        Ok(FockState { rho: DensityMatrix::from_matrix(next), ..state })
    }

    fn apply_detector(&self, mut state: FockState, wires: &[WireId], herald: &[usize]) -> Result<FockState, PhotonError> {
        self.check_detector(wires, herald)?;
        let modes: Vec<usize> = wires.iter().map(|w| w.index()).collect();
        let rejected: Vec<usize> = state
            .basis
            .iter()
            .enumerate()
            .filter(|(_, occ)| occ.restrict(&modes) != herald)
            .map(|(rank, _)| rank)
            .collect();
        let rho = state.rho.matrix_mut();
        for rank in rejected {
            rho.row_mut(rank).fill(Complex64::zero());
            rho.column_mut(rank).fill(Complex64::zero());
        }
        Ok(state)
    }

    fn check_detector(&self, wires: &[WireId], herald: &[usize]) -> Result<(), PhotonError> {
        if wires.len() >= self.n_wires {
            return Err(PhotonError::exhaustion(format!(
                "Detecting {} of {} wires leaves no undetected wire to carry the output state",
                wires.len(),
                self.n_wires
            )));
        }
        if herald.len() != wires.len() {
            return Err(PhotonError::configuration(format!(
                "Herald pattern has {} entries but the detector watches {} wires",
                herald.len(),
                wires.len()
            )));
        }
        Ok(())
    }
}

/// The k×k bosonic beam-splitter generator,
/// `G[p,q] = i·(𝟙[p=q+1] − 𝟙[p+1=q])·√(((k+1)/2)(p+q+1) − (p+1)(q+1))`.
pub(crate) fn beam_splitter_generator(k: usize) -> Array2<Complex64> {
    let mut g: Array2<Complex64> = Array2::zeros((k, k));
    let half = (k as f64 + 1.0) / 2.0;
    for p in 0..k {
        for q in 0..k {
            let sign = if p == q + 1 {
                1.0
            } else if p + 1 == q {
                -1.0
            } else {
                continue;
            };
            let radicand = half * (p + q + 1) as f64 - ((p + 1) * (q + 1)) as f64;
            g[[p, q]] = Complex64::new(0.0, sign * radicand.max(0.0).sqrt());
        }
    }
    g
}

impl PhotonicBackend for FockEngine {
    type State = FockState;

    fn accepts(&self, component: &Component, n_wires: usize) -> Result<(), PhotonError> {
        for wire in component.involved_wires() {
            wire.check_in(n_wires.min(self.n_wires))?;
        }
        if let Component::Detector { wires, herald } = component {
            self.check_detector(wires, herald)?;
        }
        Ok(())
    }

    fn prepare(&self, input: &Occupation) -> Result<FockState, PhotonError> {
        if input.n_wires() != self.n_wires || input.photons() != self.n_photons {
            return Err(PhotonError::configuration(format!(
                "Input {} does not match {} wires carrying {} photons",
                input, self.n_wires, self.n_photons
            )));
        }
        let space = FockSpace::fixed(self.n_wires, self.n_photons)?;
        let rank = space.rank_of(input.counts())?;
        let basis = space.basis_states()?;
        let rho = DensityMatrix::pure(space.dim(), rank)?;
        debug!(input = %input, dim = space.dim(), "prepared pure Fock input state");
        Ok(FockState { space, basis, rho })
    }

    fn unitary(&self, state: &FockState, component: &Component) -> Result<Option<Array2<Complex64>>, PhotonError> {
        match component {
            Component::BeamSplitter { wires, theta } => {
                Ok(Some(self.beam_splitter_unitary(state, wires[0].index(), wires[1].index(), *theta)?))
            }
            Component::Switch { wires } => Ok(Some(self.switch_unitary(state, wires[0].index(), wires[1].index())?)),
            Component::PhaseShift { wire, phase } => Ok(self.phase_unitary(state, wire.index(), *phase)),
            Component::Loss { .. } | Component::Detector { .. } => Ok(None),
        }
    }

    fn apply(&self, state: FockState, component: &Component) -> Result<FockState, PhotonError> {
        let trace_before = state.rho.trace().re;
        let mut next = match component {
            Component::Loss { wire, eta } => self.apply_loss(state, *wire, *eta)?,
            Component::Detector { wires, herald } => self.apply_detector(state, wires, herald)?,
            _ => match self.unitary(&state, component)? {
                Some(u) => {
                    if self.validate {
                        validation::check_unitarity(&u, None)?;
                    }
                    let rho = conjugate_by(&u, state.rho.matrix());
                    FockState { rho: DensityMatrix::from_matrix(rho), ..state }
                }
                None => state,
            },
        };
        next.rho.eliminate_tolerance(self.tolerance);

        let trace_after = next.rho.trace().re;
        debug!(component = %component, dim = next.rho.dim(), trace = trace_after, "applied component to density matrix");
        if self.validate {
            validation::validate_state(&next.rho, None)?;
            if component.is_unitary() {
                validation::check_trace(&next.rho, trace_before, None)?;
            }
        }
        Ok(next)
    }

    fn distribution(&self, state: FockState) -> Result<Vec<(Occupation, f64)>, PhotonError> {
        let probabilities: Vec<(Occupation, f64)> = state
            .basis
            .iter()
            .enumerate()
            .map(|(rank, occ)| (occ.clone(), state.rho.probability(rank)))
            .collect();
        if probabilities.iter().all(|(_, p)| *p <= self.tolerance) {
            return Err(PhotonError::exhaustion("Post-selection left no surviving probability mass"));
        }
        Ok(probabilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::linalg::unitarity_defect;

    const TEST_TOLERANCE: f64 = 1e-9;

    fn run(engine: &FockEngine, input: &[usize], components: &[Component]) -> Result<FockState, PhotonError> {
        components
            .iter()
            .try_fold(engine.prepare(&Occupation::from(input))?, |s, c| engine.apply(s, c))
    }

    fn prob(state: &FockState, counts: &[usize]) -> f64 {
        state
            .space()
            .rank_of(counts)
            .map(|r| state.density_matrix().probability(r))
            .unwrap_or(0.0)
    }

    #[test]
    fn test_generator_matches_two_mode_ladder() {
        // Off-diagonals of G(k) are ±i·√((p+1)(k-1-p)) on the super/sub diagonal.
        let g = beam_splitter_generator(4);
        for p in 0..3 {
            let expected = (((p + 1) * (3 - p)) as f64).sqrt();
            assert!((g[[p + 1, p]] - Complex64::new(0.0, expected)).norm() < TEST_TOLERANCE);
            assert!((g[[p, p + 1]] - Complex64::new(0.0, -expected)).norm() < TEST_TOLERANCE);
        }
        assert_eq!(g[[0, 0]], Complex64::zero());
        assert_eq!(g[[0, 2]], Complex64::zero());
    }

    #[test]
    fn test_beam_splitter_blocks_are_unitary() {
        for photons in 0..5 {
            let block = FockEngine::beam_splitter_block(photons, 1.1);
            assert!(unitarity_defect(&block) < TEST_TOLERANCE, "block for {} photons not unitary", photons);
        }
    }

    #[test]
    fn test_pure_input_state() -> Result<(), PhotonError> {
        let engine = FockEngine::new(3, 2)?;
        let state = engine.prepare(&Occupation::new(vec![0, 1, 1]))?;
        assert_eq!(state.density_matrix().dim(), 6);
        assert!((state.density_matrix().trace().re - 1.0).abs() < TEST_TOLERANCE);
        assert!((prob(&state, &[0, 1, 1]) - 1.0).abs() < TEST_TOLERANCE);
        assert!(engine.prepare(&Occupation::new(vec![2, 1, 0])).is_err());
        Ok(())
    }

    #[test]
    fn test_hong_ou_mandel_dip() -> Result<(), PhotonError> {
        let engine = FockEngine::new(2, 2)?;
        let state = run(&engine, &[1, 1], &[Component::beam_splitter(1, 2, 90.0)?])?;
        assert!((prob(&state, &[2, 0]) - 0.5).abs() < TEST_TOLERANCE);
        assert!((prob(&state, &[0, 2]) - 0.5).abs() < TEST_TOLERANCE);
        assert!(prob(&state, &[1, 1]).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_switch_moves_photons() -> Result<(), PhotonError> {
        let engine = FockEngine::new(3, 3)?;
        let state = run(&engine, &[2, 0, 1], &[Component::switch(1, 2)?])?;
        assert!((prob(&state, &[0, 2, 1]) - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_phase_shift_of_full_turn_is_identity() -> Result<(), PhotonError> {
        let engine = FockEngine::new(2, 1)?;
        let state = engine.prepare(&Occupation::new(vec![1, 0]))?;
        assert!(engine.unitary(&state, &Component::phase_shift(1, 360.0)?)?.is_none());
        assert!(engine.unitary(&state, &Component::phase_shift(1, 0.0)?)?.is_none());
        assert!(engine.unitary(&state, &Component::phase_shift(1, 90.0)?)?.is_some());
        Ok(())
    }

    #[test]
    fn test_unitaries_preserve_trace() -> Result<(), PhotonError> {
        let engine = FockEngine::new(3, 3)?.with_validation(true);
        let state = run(
            &engine,
            &[1, 1, 1],
            &[
                Component::beam_splitter(1, 2, 60.0)?,
                Component::phase_shift(2, 33.0)?,
                Component::beam_splitter(3, 2, 120.0)?,
                Component::switch(1, 3)?,
                Component::beam_splitter(1, 2, 90.0)?,
            ],
        )?;
        assert!((state.density_matrix().trace().re - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_loss_identity_leaves_state_unchanged() -> Result<(), PhotonError> {
        let engine = FockEngine::new(2, 2)?;
        let before = run(&engine, &[1, 1], &[Component::beam_splitter(1, 2, 70.0)?])?;
        let after = engine.apply(before.clone(), &Component::loss(1, 1.0)?)?;
        assert_eq!(before, after);
        Ok(())
    }

    #[test]
    fn test_total_loss_empties_the_wire() -> Result<(), PhotonError> {
        let engine = FockEngine::new(2, 3)?;
        let state = run(&engine, &[2, 1], &[Component::loss(1, 0.0)?])?;
        assert!((prob(&state, &[0, 1]) - 1.0).abs() < TEST_TOLERANCE);
        assert!((state.density_matrix().trace().re - 1.0).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_partial_loss_is_binomial() -> Result<(), PhotonError> {
        let engine = FockEngine::new(2, 2)?;
        let state = run(&engine, &[2, 0], &[Component::loss(1, 0.25)?])?;
        // Each photon survives independently with probability 0.25.
        assert!((prob(&state, &[2, 0]) - 0.0625).abs() < TEST_TOLERANCE);
        assert!((prob(&state, &[1, 0]) - 0.375).abs() < TEST_TOLERANCE);
        assert!((prob(&state, &[0, 0]) - 0.5625).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_detector_post_selects_without_renormalizing() -> Result<(), PhotonError> {
        let engine = FockEngine::new(2, 1)?;
        let state = run(
            &engine,
            &[1, 0],
            &[Component::beam_splitter(1, 2, 90.0)?, Component::detector(&[2], &[0])?],
        )?;
        assert!((prob(&state, &[1, 0]) - 0.5).abs() < TEST_TOLERANCE);
        assert!(prob(&state, &[0, 1]).abs() < TEST_TOLERANCE);
        assert!((state.density_matrix().trace().re - 0.5).abs() < TEST_TOLERANCE);
        Ok(())
    }

    #[test]
    fn test_detector_on_every_wire_is_rejected() -> Result<(), PhotonError> {
        let engine = FockEngine::new(2, 1)?;
        let detector = Component::detector(&[1, 2], &[1, 0])?;
        assert!(matches!(engine.accepts(&detector, 2), Err(PhotonError::Exhaustion { .. })));
        Ok(())
    }
}
