// src/simulation/results.rs
use crate::core::{Occupation, PhotonError};
use crate::simulation::EngineKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::fmt;

/// One reported output event.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputEntry {
    /// Detected occupation.
    pub occupation: Occupation,
    /// [`Occupation::label`], e.g. `"20"`.
    pub basis: String,
    /// Probability rounded to the configured number of significant digits.
    pub probability: f64,
}

/// Holds the output of a circuit simulation: every basis state with
/// nonzero probability, in rank order.
///
/// Probabilities are not renormalized after post-selection or loss, so the
/// total may be below one.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    engine: EngineKind,
    entries: Vec<OutputEntry>,
}

impl SimulationResult {
    /// Builds a result from a raw distribution. (Internal visibility)
    pub(crate) fn from_distribution(
        engine: EngineKind,
        distribution: Vec<(Occupation, f64)>,
        tolerance: f64,
        digits: usize,
    ) -> Self {
        let entries = distribution
            .into_iter()
            .filter(|(_, p)| *p > tolerance)
            .map(|(occupation, p)| OutputEntry {
                basis: occupation.label(),
                occupation,
                probability: round_significant(p, digits),
            })
            .collect();
        Self { engine, entries }
    }

    /// Engine that produced this result.
    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    pub fn entries(&self) -> &[OutputEntry] {
        &self.entries
    }

    /// `(basis-string, probability)` pairs in rank order.
    pub fn to_pairs(&self) -> Vec<(String, f64)> {
        self.entries.iter().map(|e| (e.basis.clone(), e.probability)).collect()
    }

    /// Probability of the given basis string; 0.0 if it was not reported.
    pub fn probability_of(&self, basis: &str) -> f64 {
        self.entries
            .iter()
            .find(|e| e.basis == basis)
            .map(|e| e.probability)
            .unwrap_or(0.0)
    }

    /// Sum of every reported probability.
    pub fn total_probability(&self) -> f64 {
        self.entries.iter().map(|e| e.probability).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draws `shots` detection events from the (renormalized) output
    /// distribution. The same seed always yields the same counts.
    pub fn sample_counts(&self, shots: usize, seed: u64) -> Result<BTreeMap<String, usize>, PhotonError> {
        let total = self.total_probability();
        if self.entries.is_empty() || total <= 0.0 {
            return Err(PhotonError::exhaustion("Cannot sample from an empty output distribution"));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = BTreeMap::new();
        for _ in 0..shots {
            let sample = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            // Fall back to the last entry if rounding leaves sample == total.
            let mut chosen = &self.entries[self.entries.len() - 1];
            for entry in &self.entries {
                cumulative += entry.probability;
                if sample < cumulative {
                    chosen = entry;
                    break;
                }
            }
            *counts.entry(chosen.basis.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

/// Rounds `x` to `digits` significant decimal digits.
pub(crate) fn round_significant(x: f64, digits: usize) -> f64 {
    if x == 0.0 || !x.is_finite() || digits == 0 {
        return x;
    }
    let magnitude = x.abs().log10().floor() as i32;
    let factor = 10f64.powi(digits as i32 - 1 - magnitude);
    (x * factor).round() / factor
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Results ({:?} engine):", self.engine)?;
        if self.entries.is_empty() {
            writeln!(f, "  No output has nonzero probability.")?;
        } else {
            for entry in &self.entries {
                writeln!(f, "  |{}>: {}", entry.basis, entry.probability)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> SimulationResult {
        SimulationResult::from_distribution(
            EngineKind::Fock,
            vec![
                (Occupation::new(vec![2, 0]), 0.25),
                (Occupation::new(vec![1, 1]), 1e-14),
                (Occupation::new(vec![0, 2]), 0.75),
            ],
            1e-10,
            10,
        )
    }

    #[test]
    fn test_zero_entries_are_dropped() {
        let r = result();
        assert_eq!(r.len(), 2);
        assert_eq!(r.to_pairs(), vec![("20".to_string(), 0.25), ("02".to_string(), 0.75)]);
        assert_eq!(r.probability_of("11"), 0.0);
    }

    #[test]
    fn test_multi_digit_occupations_are_looked_up_separately() {
        let r = SimulationResult::from_distribution(
            EngineKind::Permanent,
            vec![(Occupation::new(vec![11, 0]), 0.25), (Occupation::new(vec![1, 10]), 0.75)],
            1e-10,
            10,
        );
        assert_eq!(r.probability_of("11,0"), 0.25);
        assert_eq!(r.probability_of("1,10"), 0.75);
        assert_eq!(r.probability_of("110"), 0.0);
    }

    #[test]
    fn test_round_significant() {
        assert_eq!(round_significant(0.123456789012345, 4), 0.1235);
        assert_eq!(round_significant(1.0000000000004, 10), 1.0);
        assert_eq!(round_significant(0.0, 10), 0.0);
    }

    #[test]
    fn test_sampling_is_deterministic() -> Result<(), PhotonError> {
        let r = result();
        let first = r.sample_counts(1000, 7)?;
        let second = r.sample_counts(1000, 7)?;
        assert_eq!(first, second);
        assert_eq!(first.values().sum::<usize>(), 1000);
        assert!(first["02"] > first["20"]);
        Ok(())
    }

    #[test]
    fn test_sampling_empty_result_fails() {
        let empty = SimulationResult::from_distribution(EngineKind::Permanent, vec![], 1e-10, 10);
        assert!(matches!(empty.sample_counts(10, 1), Err(PhotonError::Exhaustion { .. })));
    }
}
