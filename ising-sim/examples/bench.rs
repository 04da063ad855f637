use std::time::Instant;

use ising_sim::{SimConfig, Simulation};

const L: usize = 256;
const N_SWEEPS: u64 = 200;
const TEMPERATURES: [f64; 3] = [1.5, 2.269, 3.5];

fn main() {
    println!(
        "Lattice: {}x{}  |  Sweeps: {}  |  Temps: {:?}",
        L, L, N_SWEEPS, TEMPERATURES
    );
    println!("{}", "-".repeat(70));

    for &temperature in &TEMPERATURES {
        let config = SimConfig::new(L, 1.0, temperature);
        let mut sim = Simulation::with_seed(&config, 42).unwrap();

        let t0 = Instant::now();
        sim.advance(N_SWEEPS);
        let elapsed = t0.elapsed().as_secs_f64();

        let per_sweep = elapsed / N_SWEEPS as f64 * 1000.0;
        let flips_per_ns = (N_SWEEPS as f64 * (L * L) as f64) / (elapsed * 1e9);
        println!(
            "T = {:<6} |  {:.3} s  |  {:.3} ms/sweep  |  {:.3} trials/ns  |  E = {:.1}  |  m = {:.4}",
            temperature,
            elapsed,
            per_sweep,
            flips_per_ns,
            sim.energy(),
            sim.magnetization()
        );
    }
}
