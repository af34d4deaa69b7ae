// src/validation/mod.rs

//! Consistency checks on engine states and results.
//!
//! Both engines stay valid by construction; these checks exist to catch
//! numerical drift and are run by the Fock engine when validation is enabled.

use crate::core::{DensityMatrix, PhotonError};
use crate::simulation::linalg::{hermiticity_defect, unitarity_defect};
use ndarray::Array2;
use num_complex::Complex64;
use crate::simulation::SimulationResult;

// Default tolerance values (can be overridden by caller)
const DEFAULT_TRACE_TOLERANCE: f64 = 1e-9;
const DEFAULT_HERMITICITY_TOLERANCE: f64 = 1e-9;

/// Checks that `trace(ρ)` equals `expected` within tolerance.
///
/// # Arguments
/// * `rho` - The `DensityMatrix` to check.
/// * `expected` - Target trace, usually 1 or the trace before a unitary step.
/// * `tolerance` - Allowed deviation. Defaults to 1e-9.
///
/// # Returns
/// * `Err(PhotonError::Simulation)` if the trace drifted.
pub fn check_trace(rho: &DensityMatrix, expected: f64, tolerance: Option<f64>) -> Result<(), PhotonError> {
    let tol = tolerance.unwrap_or(DEFAULT_TRACE_TOLERANCE);
    let trace = rho.trace();
    if (trace.re - expected).abs() > tol || trace.im.abs() > tol {
        return Err(PhotonError::simulation(format!(
            "Density matrix trace {} deviates from {} (tolerance {})",
            trace, expected, tol
        )));
    }
    Ok(())
}

/// Checks that `ρ = ρ†` entry-wise within tolerance.
pub fn check_hermiticity(rho: &DensityMatrix, tolerance: Option<f64>) -> Result<(), PhotonError> {
    let tol = tolerance.unwrap_or(DEFAULT_HERMITICITY_TOLERANCE);
    let defect = hermiticity_defect(rho.matrix());
    if defect > tol {
        return Err(PhotonError::simulation(format!(
            "Density matrix is not Hermitian: largest |ρ - ρ†| entry is {:.3e}",
            defect
        )));
    }
    Ok(())
}

/// Checks that `U†U = 𝟙` entry-wise within tolerance.
pub fn check_unitarity(u: &Array2<Complex64>, tolerance: Option<f64>) -> Result<(), PhotonError> {
    let tol = tolerance.unwrap_or(DEFAULT_HERMITICITY_TOLERANCE);
    let defect = unitarity_defect(u);
    if defect > tol {
        return Err(PhotonError::simulation(format!(
            "Component matrix is not unitary: largest |U†U - 1| entry is {:.3e}",
            defect
        )));
    }
    Ok(())
}

/// Checks that no diagonal entry is negative beyond tolerance.
pub fn check_nonnegative_diagonal(rho: &DensityMatrix, tolerance: Option<f64>) -> Result<(), PhotonError> {
    let tol = tolerance.unwrap_or(DEFAULT_TRACE_TOLERANCE);
    for rank in 0..rho.dim() {
        let p = rho.probability(rank);
        if p < -tol {
            return Err(PhotonError::simulation(format!(
                "Negative probability {} at rank {}",
                p, rank
            )));
        }
    }
    Ok(())
}

/// Checks that the reported probabilities sum to `expected`.
pub fn check_probability_sum(result: &SimulationResult, expected: f64, tolerance: Option<f64>) -> Result<(), PhotonError> {
    let tol = tolerance.unwrap_or(DEFAULT_TRACE_TOLERANCE);
    let total = result.total_probability();
    if (total - expected).abs() > tol {
        return Err(PhotonError::simulation(format!(
            "Output probabilities sum to {} instead of {} (tolerance {})",
            total, expected, tol
        )));
    }
    Ok(())
}

/// Runs the structural checks on a density matrix: Hermiticity and a
/// nonnegative diagonal. Trace is not checked since post-selection may lower it.
pub fn validate_state(rho: &DensityMatrix, tolerance: Option<f64>) -> Result<(), PhotonError> {
    check_hermiticity(rho, tolerance)?;
    check_nonnegative_diagonal(rho, tolerance)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_state_passes() -> Result<(), PhotonError> {
        let rho = DensityMatrix::pure(3, 1)?;
        check_trace(&rho, 1.0, None)?;
        validate_state(&rho, None)?;
        Ok(())
    }

    #[test]
    fn test_broken_states_fail() -> Result<(), PhotonError> {
        let mut rho = DensityMatrix::pure(2, 0)?;
        rho.matrix_mut()[[0, 1]] = Complex64::new(0.0, 0.5);
        assert!(check_hermiticity(&rho, None).is_err());
        assert!(check_trace(&DensityMatrix::zeros(2), 1.0, None).is_err());

        let mut negative = DensityMatrix::zeros(2);
        negative.matrix_mut()[[1, 1]] = Complex64::new(-0.1, 0.0);
        assert!(check_nonnegative_diagonal(&negative, None).is_err());

        let mut skewed = Array2::<Complex64>::eye(2);
        skewed[[0, 1]] = Complex64::new(0.3, 0.0);
        assert!(check_unitarity(&skewed, None).is_err());
        check_unitarity(&Array2::<Complex64>::eye(2), None)?;
        Ok(())
    }
}
