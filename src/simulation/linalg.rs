// src/simulation/linalg.rs

//! Small dense complex linear-algebra helpers shared by both engines.

use ndarray::Array2;
use num_complex::Complex64;
use num_traits::{One, Zero};

/// n×n identity.
pub(crate) fn identity(n: usize) -> Array2<Complex64> {
    Array2::from_diag_elem(n, Complex64::one())
}

/// Conjugate transpose.
pub(crate) fn dagger(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// `U ρ U†`
pub(crate) fn conjugate_by(u: &Array2<Complex64>, rho: &Array2<Complex64>) -> Array2<Complex64> {
    u.dot(rho).dot(&dagger(u))
}

/// Maximum absolute row sum (induced ∞-norm).
fn norm_inf(m: &Array2<Complex64>) -> f64 {
    m.rows()
        .into_iter()
        .map(|row| row.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Matrix exponential by scaling and squaring with a truncated Taylor series.
///
/// The argument is scaled until its norm is at most 1/2, where the series
/// converges to machine precision within a few dozen terms.
pub(crate) fn expm(m: &Array2<Complex64>) -> Array2<Complex64> {
    let n = m.nrows();
    let norm = norm_inf(m);
    let squarings = if norm > 0.5 { (norm / 0.5).log2().ceil() as i32 } else { 0 };
    let scaled = m.mapv(|z| z / 2f64.powi(squarings));

    let mut result = identity(n);
    let mut term = identity(n);
    for k in 1..=30 {
        term = term.dot(&scaled).mapv(|z| z / k as f64);
        result = result + &term;
        if norm_inf(&term) < f64::EPSILON {
            break;
        }
    }
    for _ in 0..squarings {
        result = result.dot(&result);
    }
    result
}

/// Largest entry-wise deviation of `m` from `m†`.
pub(crate) fn hermiticity_defect(m: &Array2<Complex64>) -> f64 {
    let mut worst: f64 = 0.0;
    for ((i, j), z) in m.indexed_iter() {
        worst = worst.max((*z - m[[j, i]].conj()).norm());
    }
    worst
}

/// Largest entry-wise deviation of `U†U` from the identity.
pub(crate) fn unitarity_defect(u: &Array2<Complex64>) -> f64 {
    let product = dagger(u).dot(u);
    let mut worst: f64 = 0.0;
    for ((i, j), z) in product.indexed_iter() {
        let expected = if i == j { Complex64::one() } else { Complex64::zero() };
        worst = worst.max((*z - expected).norm());
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    const TEST_TOLERANCE: f64 = 1e-12;

    #[test]
    fn test_expm_of_zero_is_identity() {
        let zero = Array2::<Complex64>::zeros((3, 3));
        assert!(unitarity_defect(&expm(&zero)) < TEST_TOLERANCE);
        assert!((expm(&zero)[[1, 1]] - Complex64::one()).norm() < TEST_TOLERANCE);
    }

    #[test]
    fn test_expm_rotation_generator() {
        // exp([[0, a], [-a, 0]]) = [[cos a, sin a], [-sin a, cos a]]
        let a = 3.0 * FRAC_PI_4;
        let m = Array2::from_shape_vec(
            (2, 2),
            vec![Complex64::zero(), Complex64::new(a, 0.0), Complex64::new(-a, 0.0), Complex64::zero()],
        )
        .unwrap();
        let e = expm(&m);
        assert!((e[[0, 0]].re - a.cos()).abs() < TEST_TOLERANCE);
        assert!((e[[0, 1]].re - a.sin()).abs() < TEST_TOLERANCE);
        assert!((e[[1, 0]].re + a.sin()).abs() < TEST_TOLERANCE);
        assert!(unitarity_defect(&e) < TEST_TOLERANCE);
    }

    #[test]
    fn test_expm_diagonal_phase() {
        let m = Array2::from_diag(&ndarray::arr1(&[Complex64::new(0.0, 2.0), Complex64::new(0.0, -7.0)]));
        let e = expm(&m);
        assert!((e[[0, 0]] - Complex64::from_polar(1.0, 2.0)).norm() < 1e-10);
        assert!((e[[1, 1]] - Complex64::from_polar(1.0, -7.0)).norm() < 1e-10);
    }

    #[test]
    fn test_conjugate_by_preserves_hermiticity() {
        let u = expm(&Array2::from_shape_vec(
            (2, 2),
            vec![Complex64::zero(), Complex64::new(0.3, 0.0), Complex64::new(-0.3, 0.0), Complex64::zero()],
        )
        .unwrap());
        let rho = Array2::from_shape_vec(
            (2, 2),
            vec![Complex64::new(0.7, 0.0), Complex64::new(0.1, 0.2), Complex64::new(0.1, -0.2), Complex64::new(0.3, 0.0)],
        )
        .unwrap();
        assert!(hermiticity_defect(&conjugate_by(&u, &rho)) < TEST_TOLERANCE);
    }
}
