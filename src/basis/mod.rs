// src/basis/mod.rs

//! Bijection between photon occupation tuples and dense integer ranks.
//!
//! Tuples with a fixed number of wires and photons are enumerated in
//! descending lexicographic order: the tuple with every photon on wire 1
//! has rank 0, the tuple with every photon on the last wire has the highest
//! rank. For two wires and two photons the order is `20, 11, 02`.
//!
//! Both directions walk the same per-wire counting rule, so
//! `basis_to_rank(rank_to_basis(r)) == r` holds exactly.

use crate::core::{Occupation, PhotonError};

/// Binomial coefficient C(n, k), or `None` if it does not fit in `usize`.
pub fn binomial(n: usize, k: usize) -> Option<usize> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc * (n - i) is divisible by (i + 1) at every step
        acc = acc.checked_mul((n - i) as u128)? / (i as u128 + 1);
    }
    usize::try_from(acc).ok()
}

/// Number of ways to place `n_photons` indistinguishable photons on `n_wires`
/// wires, C(n_photons + n_wires - 1, n_photons), or `None` on overflow.
pub fn checked_hilbert_dimension(n_wires: usize, n_photons: usize) -> Option<usize> {
    if n_wires == 0 {
        return Some(if n_photons == 0 { 1 } else { 0 });
    }
    binomial(n_photons + n_wires - 1, n_photons)
}

/// Dimension of the fixed-photon-number Fock space.
///
/// Saturates at `usize::MAX` for sizes that cannot be represented; engines
/// use [`checked_hilbert_dimension`] and report the overflow instead.
pub fn hilbert_dimension(n_wires: usize, n_photons: usize) -> usize {
    checked_hilbert_dimension(n_wires, n_photons).unwrap_or(usize::MAX)
}

/// Returns the occupation tuple at position `rank`.
pub fn rank_to_basis(n_wires: usize, n_photons: usize, rank: usize) -> Result<Occupation, PhotonError> {
    BasisIndexer::new(n_wires, n_photons)?.rank_to_basis(rank)
}

/// Returns the rank of `counts` among all tuples with `n_wires` wires and `n_photons` photons.
pub fn basis_to_rank(n_wires: usize, n_photons: usize, counts: &[usize]) -> Result<usize, PhotonError> {
    BasisIndexer::new(n_wires, n_photons)?.basis_to_rank(counts)
}

/// Ranks occupation tuples of one fixed `(n_wires, n_photons)` sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasisIndexer {
    n_wires: usize,
    n_photons: usize,
    dim: usize,
}

impl BasisIndexer {
    pub fn new(n_wires: usize, n_photons: usize) -> Result<Self, PhotonError> {
        if n_wires < 1 {
            return Err(PhotonError::configuration("A circuit needs at least one wire (n_wires >= 1)"));
        }
        let dim = checked_hilbert_dimension(n_wires, n_photons).ok_or_else(|| {
            PhotonError::simulation(format!(
                "Fock space for {} photons on {} wires is too large to index",
                n_photons, n_wires
            ))
        })?;
        Ok(Self { n_wires, n_photons, dim })
    }

    pub fn n_wires(&self) -> usize {
        self.n_wires
    }

    pub fn n_photons(&self) -> usize {
        self.n_photons
    }

    /// Number of tuples in this sector.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Occupation tuple at position `rank`.
    pub fn rank_to_basis(&self, rank: usize) -> Result<Occupation, PhotonError> {
        if rank >= self.dim {
            return Err(PhotonError::configuration(format!(
                "Rank {} is outside [0, {}) for {} photons on {} wires",
                rank, self.dim, self.n_photons, self.n_wires
            )));
        }
        let mut counts = Vec::with_capacity(self.n_wires);
        let mut remaining = self.n_photons;
        let mut rank = rank;
        for wire in 0..self.n_wires - 1 {
            let wires_after = self.n_wires - wire - 1;
            // Larger occupations on this wire come first.
            let mut v = remaining;
            loop {
                let block = completions(remaining - v, wires_after);
                if rank < block {
                    break;
                }
                rank -= block;
                v -= 1;
            }
            counts.push(v);
            remaining -= v;
        }
        counts.push(remaining);
        Ok(Occupation::new(counts))
    }

    /// Rank of `counts`; fails on a wrong length or photon total.
    pub fn basis_to_rank(&self, counts: &[usize]) -> Result<usize, PhotonError> {
        self.check(counts)?;
        let mut rank = 0;
        let mut remaining = self.n_photons;
        for (wire, &occ) in counts.iter().enumerate().take(self.n_wires - 1) {
            let wires_after = self.n_wires - wire - 1;
            for v in (occ + 1..=remaining).rev() {
                rank += completions(remaining - v, wires_after);
            }
            remaining -= occ;
        }
        Ok(rank)
    }

    /// Checks that `counts` belongs to this sector.
    pub fn check(&self, counts: &[usize]) -> Result<(), PhotonError> {
        if counts.len() != self.n_wires {
            return Err(PhotonError::configuration(format!(
                "Occupation tuple has {} entries but the circuit has {} wires",
                counts.len(),
                self.n_wires
            )));
        }
        let total: usize = counts.iter().sum();
        if total != self.n_photons {
            return Err(PhotonError::configuration(format!(
                "Occupation tuple holds {} photons but the circuit carries {}",
                total, self.n_photons
            )));
        }
        Ok(())
    }

    /// Every tuple of the sector, in rank order.
    pub fn iter(&self) -> impl Iterator<Item = Occupation> + '_ {
        (0..self.dim).filter_map(move |rank| self.rank_to_basis(rank).ok())
    }
}

/// Number of ways to spread `photons` over `wires` wires. Only called with
/// sizes bounded by an already-validated sector dimension.
fn completions(photons: usize, wires: usize) -> usize {
    hilbert_dimension(wires, photons)
}

/// Stack of photon-number sectors `max_photons, max_photons - 1, ..., min_photons`.
///
/// The highest sector comes first, so its ranks coincide with those of the
/// plain [`BasisIndexer`] for `max_photons`. Extending the space downwards
/// only appends ranks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FockSpace {
    sectors: Vec<BasisIndexer>,
    offsets: Vec<usize>,
    dim: usize,
}

impl FockSpace {
    /// Fixed-photon-number space.
    pub fn fixed(n_wires: usize, n_photons: usize) -> Result<Self, PhotonError> {
        Self::truncated(n_wires, n_photons, n_photons)
    }

    /// All photon numbers from `max_photons` down to `min_photons`.
    pub fn truncated(n_wires: usize, max_photons: usize, min_photons: usize) -> Result<Self, PhotonError> {
        if min_photons > max_photons {
            return Err(PhotonError::configuration(format!(
                "Empty photon range {}..={}",
                min_photons, max_photons
            )));
        }
        let mut sectors = Vec::with_capacity(max_photons - min_photons + 1);
        let mut offsets = Vec::with_capacity(sectors.capacity());
        let mut dim: usize = 0;
        for photons in (min_photons..=max_photons).rev() {
            let sector = BasisIndexer::new(n_wires, photons)?;
            offsets.push(dim);
            dim = dim.checked_add(sector.dim()).ok_or_else(|| {
                PhotonError::simulation("Truncated Fock space dimension overflows usize")
            })?;
            sectors.push(sector);
        }
        Ok(Self { sectors, offsets, dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn n_wires(&self) -> usize {
        self.sectors[0].n_wires()
    }

    pub fn max_photons(&self) -> usize {
        self.sectors[0].n_photons()
    }

    pub fn min_photons(&self) -> usize {
        self.sectors[self.sectors.len() - 1].n_photons()
    }

    /// Rank of an occupation tuple with any photon number inside the range.
    pub fn rank_of(&self, counts: &[usize]) -> Result<usize, PhotonError> {
        let photons: usize = counts.iter().sum();
        if photons > self.max_photons() || photons < self.min_photons() {
            return Err(PhotonError::configuration(format!(
                "Occupation with {} photons is outside the simulated range {}..={}",
                photons,
                self.min_photons(),
                self.max_photons()
            )));
        }
        let slot = self.max_photons() - photons;
        Ok(self.offsets[slot] + self.sectors[slot].basis_to_rank(counts)?)
    }

    /// Occupation tuple at `rank`.
    pub fn basis(&self, rank: usize) -> Result<Occupation, PhotonError> {
        if rank >= self.dim {
            return Err(PhotonError::configuration(format!(
                "Rank {} is outside [0, {})",
                rank, self.dim
            )));
        }
        // offsets are increasing; pick the last sector starting at or before rank
        let slot = self.offsets.partition_point(|&start| start <= rank) - 1;
        self.sectors[slot].rank_to_basis(rank - self.offsets[slot])
    }

    /// Every basis tuple in rank order.
    pub fn basis_states(&self) -> Result<Vec<Occupation>, PhotonError> {
        (0..self.dim).map(|rank| self.basis(rank)).collect()
    }
}
