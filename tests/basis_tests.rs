// tests/basis_tests.rs

use photonq::basis::{hilbert_dimension, rank_to_basis, BasisIndexer, FockSpace};
use photonq::{CircuitBuilder, EngineKind, PermanentMethod, SimulatorConfig};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-7;

prop_compose! {
    fn arbitrary_sector()(n_wires in 1usize..6, n_photons in 0usize..5) -> (usize, usize) {
        (n_wires, n_photons)
    }
}

prop_compose! {
    fn arbitrary_sector_and_rank()((n_wires, n_photons) in arbitrary_sector())
        (rank in 0..hilbert_dimension(n_wires, n_photons), n_wires in Just(n_wires), n_photons in Just(n_photons))
        -> (usize, usize, usize) {
        (n_wires, n_photons, rank)
    }
}

/// One unitary element as (kind, first wire, offset to second wire, angle).
/// Kind 0 is a beam splitter, 1 a phase shift, 2 a switch; wires are folded
/// onto the circuit when it is built.
fn arbitrary_element() -> impl Strategy<Value = (u8, usize, usize, f64)> {
    (0u8..3, 0usize..8, 0usize..8, 0.0f64..180.0)
}

prop_compose! {
    /// A multi-wire sector with a random valid input tuple, bunched inputs included.
    fn arbitrary_network_input()(n_wires in 2usize..5, n_photons in 0usize..5)
        (rank in 0..hilbert_dimension(n_wires, n_photons), n_wires in Just(n_wires), n_photons in Just(n_photons))
        -> (usize, usize, Vec<usize>) {
        let input = rank_to_basis(n_wires, n_photons, rank).unwrap();
        (n_wires, n_photons, input.counts().to_vec())
    }
}

proptest! {
    #[test]
    fn rank_round_trip((n_wires, n_photons, rank) in arbitrary_sector_and_rank()) {
        let indexer = BasisIndexer::new(n_wires, n_photons).unwrap();
        let occupation = indexer.rank_to_basis(rank).unwrap();
        prop_assert_eq!(occupation.n_wires(), n_wires);
        prop_assert_eq!(occupation.photons(), n_photons);
        prop_assert_eq!(indexer.basis_to_rank(occupation.counts()).unwrap(), rank);
    }

    #[test]
    fn enumeration_is_strictly_descending((n_wires, n_photons) in arbitrary_sector()) {
        let indexer = BasisIndexer::new(n_wires, n_photons).unwrap();
        let states: Vec<_> = indexer.iter().collect();
        prop_assert_eq!(states.len(), indexer.dim());
        for pair in states.windows(2) {
            prop_assert!(pair[0] > pair[1], "{} should precede {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn truncated_space_keeps_top_sector_ranks((n_wires, n_photons) in arbitrary_sector()) {
        let top = BasisIndexer::new(n_wires, n_photons).unwrap();
        let space = FockSpace::truncated(n_wires, n_photons, 0).unwrap();
        let expected_dim: usize = (0..=n_photons).map(|n| hilbert_dimension(n_wires, n)).sum();
        prop_assert_eq!(space.dim(), expected_dim);
        for rank in 0..top.dim() {
            prop_assert_eq!(space.basis(rank).unwrap(), top.rank_to_basis(rank).unwrap());
        }
        for rank in 0..space.dim() {
            let occupation = space.basis(rank).unwrap();
            prop_assert_eq!(space.rank_of(occupation.counts()).unwrap(), rank);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn engines_agree_on_random_networks(
        (n_wires, n_photons, input) in arbitrary_network_input(),
        elements in prop::collection::vec(arbitrary_element(), 0..6),
    ) {
        let mut builder = CircuitBuilder::new(n_wires, n_photons).input(&input);
        for (kind, first, offset, angle) in elements {
            let a = first % n_wires + 1;
            let b = (a + offset % (n_wires - 1)) % n_wires + 1;
            builder = match kind {
                0 => builder.beam_splitter(a, b, angle),
                1 => builder.phase_shift(a, angle * 2.0),
                _ => builder.switch(a, b),
            };
        }
        let circuit = builder.build().unwrap();

        let fock = photonq::simulate(&circuit, &SimulatorConfig::new()).unwrap();
        let naive = photonq::simulate(&circuit, &SimulatorConfig::new().with_engine(EngineKind::Permanent)).unwrap();
        let ryser = photonq::simulate(
            &circuit,
            &SimulatorConfig::new().with_engine(EngineKind::Permanent).with_permanent(PermanentMethod::Ryser),
        ).unwrap();

        // Up to 35 outputs, each rounded to 10 significant digits.
        for result in [&fock, &naive, &ryser] {
            prop_assert!((result.total_probability() - 1.0).abs() < TOLERANCE);
        }
        for entry in naive.entries() {
            prop_assert!((entry.probability - fock.probability_of(&entry.basis)).abs() < TOLERANCE);
            prop_assert!((entry.probability - ryser.probability_of(&entry.basis)).abs() < TOLERANCE);
        }
        for entry in fock.entries() {
            prop_assert!((entry.probability - naive.probability_of(&entry.basis)).abs() < TOLERANCE);
        }
    }
}
