// src/core/state.rs

use ndarray::Array2;
use num_complex::Complex64;
use num_traits::Zero;
use std::fmt;

use super::error::PhotonError;

/// Per-wire photon counts, in wire order.
///
/// An occupation tuple is a basis element of the Fock space. Whether it is
/// *valid* for a given circuit (length and photon total) is checked by the
/// basis indexer, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Occupation(Vec<usize>);

impl Occupation {
    pub fn new(counts: Vec<usize>) -> Self {
        Self(counts)
    }

    /// Photon counts in wire order.
    pub fn counts(&self) -> &[usize] {
        &self.0
    }

    /// Number of wires described.
    pub fn n_wires(&self) -> usize {
        self.0.len()
    }

    /// Total photon number.
    pub fn photons(&self) -> usize {
        self.0.iter().sum()
    }

    /// Photon count on the 0-based mode `index`.
    pub fn get(&self, index: usize) -> usize {
        self.0[index]
    }

    /// Occupation restricted to the given 0-based modes, in the given order.
    pub fn restrict(&self, indices: &[usize]) -> Vec<usize> {
        indices.iter().map(|&i| self.0[i]).collect()
    }

    /// Returns a copy with `count` stored on mode `index`.
    pub fn with(&self, index: usize, count: usize) -> Self {
        let mut counts = self.0.clone();
        counts[index] = count;
        Self(counts)
    }

    /// Returns a copy with modes `a` and `b` exchanged.
    pub fn swapped(&self, a: usize, b: usize) -> Self {
        let mut counts = self.0.clone();
        counts.swap(a, b);
        Self(counts)
    }

    /// Basis label: the occupation digits concatenated in wire order, e.g.
    /// `"201"`. Once any wire holds ten or more photons the counts are
    /// comma-separated (`"1,10"`) so distinct tuples never share a label.
    pub fn label(&self) -> String {
        let counts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        if self.0.iter().any(|&c| c >= 10) {
            counts.join(",")
        } else {
            counts.concat()
        }
    }
}

impl From<Vec<usize>> for Occupation {
    fn from(counts: Vec<usize>) -> Self {
        Self(counts)
    }
}

impl From<&[usize]> for Occupation {
    fn from(counts: &[usize]) -> Self {
        Self(counts.to_vec())
    }
}

impl fmt::Display for Occupation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}>", self.label())
    }
}

/// Density matrix over a finite set of Fock basis states.
///
/// Rows and columns are indexed by rank. The matrix starts as a pure
/// projector, stays Hermitian under every supported component and may lose
/// trace under post-selection.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct DensityMatrix {
    rho: Array2<Complex64>,
}

impl DensityMatrix {
    /// Zero matrix of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        Self { rho: Array2::zeros((dim, dim)) }
    }

    /// Pure projector |rank><rank|.
    pub fn pure(dim: usize, rank: usize) -> Result<Self, PhotonError> {
        if rank >= dim {
            return Err(PhotonError::simulation(format!(
                "Cannot build projector onto rank {} in a space of dimension {}",
                rank, dim
            )));
        }
        let mut state = Self::zeros(dim);
        state.rho[[rank, rank]] = Complex64::new(1.0, 0.0);
        Ok(state)
    }

    pub(crate) fn from_matrix(rho: Array2<Complex64>) -> Self {
        Self { rho }
    }

    /// Read-only access to the underlying matrix.
    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.rho
    }

    pub(crate) fn matrix_mut(&mut self) -> &mut Array2<Complex64> {
        &mut self.rho
    }

    pub fn dim(&self) -> usize {
        self.rho.nrows()
    }

    /// Sum of the diagonal.
    pub fn trace(&self) -> Complex64 {
        self.rho.diag().iter().sum()
    }

    /// Diagonal entry for `rank`, as a real probability.
    pub fn probability(&self, rank: usize) -> f64 {
        self.rho[[rank, rank]].re
    }

    /// Zeroes every entry whose magnitude is below `tol`.
    pub fn eliminate_tolerance(&mut self, tol: f64) {
        self.rho.mapv_inplace(|z| if z.norm() < tol { Complex64::zero() } else { z });
    }

    /// Returns the matrix grown to `dim`, padding new rows and columns with zeros.
    pub(crate) fn padded(&self, dim: usize) -> Self {
        let old = self.dim();
        if dim <= old {
            return self.clone();
        }
        let mut rho = Array2::zeros((dim, dim));
        rho.slice_mut(ndarray::s![..old, ..old]).assign(&self.rho);
        Self { rho }
    }
}

impl fmt::Display for DensityMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DensityMatrix[{}x{}]", self.dim(), self.dim())?;
        for row in self.rho.rows() {
            write!(f, "  ")?;
            for (j, c) in row.iter().enumerate() {
                write!(f, "{}{:.4}", if j > 0 { ", " } else { "" }, c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_concatenates_single_digits() {
        assert_eq!(Occupation::new(vec![2, 0, 1]).label(), "201");
        assert_eq!(Occupation::new(vec![0, 9]).to_string(), "|09>");
    }

    #[test]
    fn test_multi_digit_labels_stay_distinct() {
        let a = Occupation::new(vec![1, 10]);
        let b = Occupation::new(vec![11, 0]);
        assert_eq!(a.label(), "1,10");
        assert_eq!(b.label(), "11,0");
        assert_ne!(a.label(), b.label());
    }
}
