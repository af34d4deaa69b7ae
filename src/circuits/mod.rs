// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! optical components (`photonq::operations::Component`).
//!
//! A `Circuit` fixes the number of wires and photons up front, owns the
//! components in placement order and optionally the input occupation.

use crate::basis::BasisIndexer;
use crate::core::{Occupation, PhotonError};
use crate::operations::Component;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered sequence of components acting on `n_wires` wires carrying
/// `n_photons` photons.
///
/// Every component is checked against the wire count when appended, so a
/// built circuit only references existing wires. Deserialized circuits go
/// through the same checks.
#[derive(Clone, PartialEq)] // PartialEq useful for testing circuits
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "UncheckedCircuit"))]
pub struct Circuit {
    n_wires: usize,
    n_photons: usize,
    /// Placement order is application order.
    components: Vec<Component>,
    input: Option<Vec<usize>>,
}

/// Wire format of [`Circuit`] before validation.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct UncheckedCircuit {
    n_wires: usize,
    n_photons: usize,
    components: Vec<Component>,
    input: Option<Vec<usize>>,
}

#[cfg(feature = "serde")]
impl TryFrom<UncheckedCircuit> for Circuit {
    type Error = PhotonError;

    fn try_from(raw: UncheckedCircuit) -> Result<Self, Self::Error> {
        let circuit = Circuit {
            n_wires: raw.n_wires,
            n_photons: raw.n_photons,
            components: raw.components,
            input: raw.input,
        };
        circuit.validate()?;
        Ok(circuit)
    }
}

impl Circuit {
    /// Creates an empty circuit. Fails if `n_wires < 1`.
    pub fn new(n_wires: usize, n_photons: usize) -> Result<Self, PhotonError> {
        // Also rejects Fock spaces too large to index.
        BasisIndexer::new(n_wires, n_photons)?;
        Ok(Self {
            n_wires,
            n_photons,
            components: Vec::new(),
            input: None,
        })
    }

    pub fn n_wires(&self) -> usize {
        self.n_wires
    }

    pub fn n_photons(&self) -> usize {
        self.n_photons
    }

    /// Validates `component` against this circuit and appends it.
    ///
    /// # Arguments
    /// * `component` - The `Component` to append to the sequence.
    pub fn add_component(&mut self, component: Component) -> Result<(), PhotonError> {
        component.validate()?;
        for wire in component.involved_wires() {
            wire.check_in(self.n_wires)?;
        }
        self.components.push(component);
        Ok(())
    }

    /// Appends several components, stopping at the first invalid one.
    pub fn add_components<I>(&mut self, components: I) -> Result<(), PhotonError>
    where
        I: IntoIterator<Item = Component>,
    {
        for component in components {
            self.add_component(component)?;
        }
        Ok(())
    }

    /// Sets the input occupation; length must equal `n_wires` and the sum `n_photons`.
    pub fn set_input(&mut self, counts: &[usize]) -> Result<(), PhotonError> {
        BasisIndexer::new(self.n_wires, self.n_photons)?.check(counts)?;
        self.input = Some(counts.to_vec());
        Ok(())
    }

    /// The input occupation, if one was set.
    pub fn input(&self) -> Option<Occupation> {
        self.input.as_deref().map(Occupation::from)
    }

    /// Returns a slice containing the ordered sequence of components in this circuit.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Returns the total number of components defined in the circuit.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the circuit contains no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Re-validates a circuit that did not come through `add_component`
    /// (e.g. one that was deserialized).
    pub fn validate(&self) -> Result<(), PhotonError> {
        let indexer = BasisIndexer::new(self.n_wires, self.n_photons)?;
        if let Some(counts) = &self.input {
            indexer.check(counts)?;
        }
        for component in &self.components {
            component.validate()?;
            for wire in component.involved_wires() {
                wire.check_in(self.n_wires)?;
            }
        }
        Ok(())
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper struct for programmatically constructing `Circuit` instances using method chaining.
///
/// The first failure is remembered and reported by [`CircuitBuilder::build`];
/// later calls are ignored once an error is recorded.
pub struct CircuitBuilder {
    circuit: Result<Circuit, PhotonError>,
}

impl CircuitBuilder {
    /// Creates a builder for `n_wires` wires and `n_photons` photons.
    pub fn new(n_wires: usize, n_photons: usize) -> Self {
        Self { circuit: Circuit::new(n_wires, n_photons) }
    }

    /// Sets the input occupation.
    pub fn input(mut self, counts: &[usize]) -> Self {
        if let Ok(circuit) = &mut self.circuit {
            if let Err(e) = circuit.set_input(counts) {
                self.circuit = Err(e);
            }
        }
        self
    }

    /// Adds a single already-constructed component.
    pub fn add(mut self, component: Component) -> Self {
        if let Ok(circuit) = &mut self.circuit {
            if let Err(e) = circuit.add_component(component) {
                self.circuit = Err(e);
            }
        }
        self
    }

    /// Adds the result of a fallible component constructor.
    pub fn add_checked(self, component: Result<Component, PhotonError>) -> Self {
        match component {
            Ok(component) => self.add(component),
            Err(e) => Self { circuit: self.circuit.and(Err(e)) },
        }
    }

    /// Balanced-or-not beam splitter; `theta` in degrees.
    pub fn beam_splitter(self, a: usize, b: usize, theta: f64) -> Self {
        self.add_checked(Component::beam_splitter(a, b, theta))
    }

    pub fn switch(self, a: usize, b: usize) -> Self {
        self.add_checked(Component::switch(a, b))
    }

    /// Phase shift; `phase` in degrees.
    pub fn phase_shift(self, wire: usize, phase: f64) -> Self {
        self.add_checked(Component::phase_shift(wire, phase))
    }

    pub fn loss(self, wire: usize, eta: f64) -> Self {
        self.add_checked(Component::loss(wire, eta))
    }

    pub fn detector(self, wires: &[usize], herald: &[usize]) -> Self {
        self.add_checked(Component::detector(wires, herald))
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    pub fn build(self) -> Result<Circuit, PhotonError> {
        self.circuit
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let comps = &self.components;
        let num_comps = comps.len();
        let input = self.input.as_deref();

        writeln!(
            f,
            "photonq::Circuit[{} components on {} wires, {} photons]",
            num_comps, self.n_wires, self.n_photons
        )?;
        if num_comps == 0 {
            return Ok(());
        }

        const GATE_WIDTH: usize = 6; // e.g. "──BS──"
        const WIRE: &str = "──────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        let mut grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_comps]; self.n_wires];
        // v_connect[row][t] holds the connector drawn below row `row` at time `t`
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_comps]; self.n_wires];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total = GATE_WIDTH - slen;
                let pre = total / 2;
                let post = total - pre;
                format!("{}{}{}", H_WIRE.to_string().repeat(pre), symbol, H_WIRE.to_string().repeat(post))
            }
        }

        for (t, comp) in comps.iter().enumerate() {
            let rows: Vec<usize> = comp.involved_wires().iter().map(|w| w.index()).collect();
            match comp {
                Component::Detector { herald, .. } => {
                    for (r, h) in rows.iter().zip(herald) {
                        if let Some(cell) = grid.get_mut(*r) {
                            cell[t] = format_gate(&format!("D{}", h));
                        }
                    }
                }
                _ => {
                    for r in &rows {
                        if let Some(cell) = grid.get_mut(*r) {
                            cell[t] = format_gate(comp.symbol());
                        }
                    }
                }
            }
            if let (Component::BeamSplitter { .. } | Component::Switch { .. }, [r1, r2]) = (comp, rows.as_slice()) {
                // take() clamps connectors to the drawn wires
                for row in v_connect.iter_mut().take((*r1).max(*r2)).skip((*r1).min(*r2)) {
                    row[t] = V_WIRE;
                }
            }
        }

        let label_width = format!("W{}", self.n_wires).len() + 8;
        for r in 0..self.n_wires {
            let label = match input.and_then(|counts| counts.get(r)) {
                Some(count) => format!("W{} |{}>: ", r + 1, count),
                None => format!("W{}: ", r + 1),
            };
            write!(f, "{:<width$}", label, width = label_width)?;
            writeln!(f, "{}", grid[r].join(""))?;

            if r < self.n_wires - 1 {
                write!(f, "{}", " ".repeat(label_width))?;
                for t in 0..num_comps {
                    let pad = GATE_WIDTH.saturating_sub(1);
                    let pre = pad / 2;
                    write!(f, "{}{}{}", " ".repeat(pre), v_connect[r][t], " ".repeat(pad - pre))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WireId;

    #[test]
    fn test_builder_collects_components_in_order() -> Result<(), PhotonError> {
        let circuit = CircuitBuilder::new(3, 2)
            .input(&[1, 1, 0])
            .beam_splitter(1, 2, 90.0)
            .phase_shift(3, 45.0)
            .detector(&[3], &[0])
            .build()?;
        assert_eq!(circuit.len(), 3);
        assert_eq!(circuit.input(), Some(Occupation::new(vec![1, 1, 0])));
        assert_eq!(circuit.components()[1], Component::PhaseShift { wire: WireId(3), phase: 45.0 });
        Ok(())
    }

    #[test]
    fn test_builder_reports_first_error() {
        let result = CircuitBuilder::new(2, 1)
            .beam_splitter(1, 3, 90.0)
            .phase_shift(1, 999.0)
            .build();
        match result {
            Err(PhotonError::WireOutOfRange { wire, .. }) => assert_eq!(wire, WireId(3)),
            other => panic!("Expected WireOutOfRange, got {:?}", other.map(|c| c.len())),
        }
    }

    #[test]
    fn test_zero_wires_rejected() {
        assert!(matches!(Circuit::new(0, 1), Err(PhotonError::Configuration { .. })));
    }

    #[test]
    fn test_input_validation() -> Result<(), PhotonError> {
        let mut circuit = Circuit::new(2, 2)?;
        assert!(circuit.set_input(&[1, 0]).is_err());
        assert!(circuit.set_input(&[1, 1, 0]).is_err());
        circuit.set_input(&[0, 2])?;
        Ok(())
    }

    #[test]
    fn test_display_draws_every_wire() -> Result<(), PhotonError> {
        let circuit = CircuitBuilder::new(2, 1)
            .input(&[1, 0])
            .beam_splitter(1, 2, 90.0)
            .detector(&[2], &[0])
            .build()?;
        let drawing = circuit.to_string();
        assert!(drawing.contains("2 components on 2 wires"));
        assert!(drawing.contains("BS"));
        assert!(drawing.contains("D0"));
        assert!(drawing.contains('│'));
        Ok(())
    }

    #[test]
    fn test_display_tolerates_unchecked_wires() {
        // Only reachable by bypassing add_component, as a struct literal does here.
        let circuit = Circuit {
            n_wires: 2,
            n_photons: 1,
            components: vec![
                Component::Switch { wires: [WireId(1), WireId(5)] },
                Component::Detector { wires: vec![WireId(7)], herald: vec![0] },
            ],
            input: Some(vec![1]),
        };
        assert!(circuit.validate().is_err());
        let drawing = format!("{:?}", circuit);
        assert!(drawing.contains("W1 |1>: "));
        assert!(drawing.contains("W2: "));
    }
}
