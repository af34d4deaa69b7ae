//! Mach-Zehnder interferometer with a lossy arm.
//! The phase in one arm steers a single photon between the two outputs;
//! loss in the other arm washes the fringe out.

use photonq::{CircuitBuilder, PhotonError, Simulator, SimulatorConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), PhotonError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("--- photonq Example: Mach-Zehnder fringe ---");

    for eta in [1.0, 0.5] {
        println!("\nTransmission in arm 2: {}", eta);
        println!("  phase   P(10)     P(01)     P(00)");
        for phase in [0.0, 45.0, 90.0, 135.0, 180.0] {
            let circuit = CircuitBuilder::new(2, 1)
                .input(&[1, 0])
                .beam_splitter(1, 2, 90.0)
                .phase_shift(1, phase)
                .loss(2, eta)
                .beam_splitter(1, 2, 90.0)
                .build()?;
            let mut sim = Simulator::from_circuit(circuit, SimulatorConfig::new().with_validation(true))?;
            sim.run()?;
            let Some(result) = sim.result() else { continue };
            println!(
                "  {:>5}   {:<8.4}  {:<8.4}  {:<8.4}",
                phase,
                result.probability_of("10"),
                result.probability_of("01"),
                result.probability_of("00")
            );
        }
    }

    // --- Heralding: keep only events where wire 3 stays dark ---
    let circuit = CircuitBuilder::new(3, 2)
        .input(&[1, 1, 0])
        .beam_splitter(1, 2, 90.0)
        .beam_splitter(2, 3, 90.0)
        .detector(&[3], &[0])
        .build()?;
    println!("\nCircuit Definition:\n{}", circuit);
    let mut sim = Simulator::from_circuit(circuit, SimulatorConfig::new())?;
    sim.run()?;
    if let Some(result) = sim.result() {
        println!("{}", result);
        println!("Heralding success probability: {:.4}", result.total_probability());
    }
    Ok(())
}
