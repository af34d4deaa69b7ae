//! Hong-Ou-Mandel interference: two photons on a beam splitter.
//! Sweeps the splitting angle and shows the coincidence probability
//! vanishing at the balanced point on both engines.

use photonq::{EngineKind, PhotonError, Simulator, SimulatorConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), PhotonError> {
    // RUST_LOG=photonq=debug shows every component as it is applied
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("--- photonq Example: Hong-Ou-Mandel dip ---");

    for engine in [EngineKind::Fock, EngineKind::Permanent] {
        println!("\n{:?} engine", engine);
        println!("  theta   P(20)     P(11)     P(02)");
        for theta in [0.0, 45.0, 90.0, 135.0, 180.0] {
            let mut sim = Simulator::with_config(2, 2, SimulatorConfig::new().with_engine(engine))?;
            sim.set_input_state(&[1, 1])?;
            sim.add_beamsplitter([1, 2], theta)?;
            sim.run()?;
            let Some(result) = sim.result() else { continue };
            println!(
                "  {:>5}   {:<8.4}  {:<8.4}  {:<8.4}",
                theta,
                result.probability_of("20"),
                result.probability_of("11"),
                result.probability_of("02")
            );
        }
    }

    // --- Sampled detection events at the dip ---
    let mut sim = Simulator::new(2, 2)?;
    sim.set_input_state(&[1, 1])?;
    sim.add_beamsplitter([1, 2], None)?;
    println!("\nCircuit Definition:\n{}", sim.circuit());
    sim.run()?;
    if let Some(result) = sim.result() {
        println!("{}", result);
        println!("1000 sampled events: {:?}", result.sample_counts(1000, 42)?);
    }
    Ok(())
}
