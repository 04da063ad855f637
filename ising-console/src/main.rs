//! Watch a 2D Ising lattice evolve in the terminal.
//!
//! Parameters missing from the command line are prompted for on stdin.

use std::fmt::Write as _;
use std::io::{self, Write as _};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use ising_sim::{SimConfig, Simulation};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ising-console", version, about = "Metropolis 2D Ising model in the terminal")]
struct Cli {
    /// Lattice side length
    #[arg(short = 'n', long)]
    size: Option<usize>,

    /// Nearest-neighbor coupling J
    #[arg(short = 'j', long, allow_negative_numbers = true)]
    coupling: Option<f64>,

    /// Temperature (0 freezes every energy-raising flip)
    #[arg(short = 't', long)]
    temperature: Option<f64>,

    /// Stop after this many frames (runs until interrupted when omitted)
    #[arg(long)]
    frames: Option<u64>,

    /// Sweeps between two printed frames
    #[arg(long, default_value_t = 1)]
    sweeps_per_frame: u64,

    /// Print only the observables, not the lattice
    #[arg(long)]
    quiet_grid: bool,

    /// Fixed PRNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn prompt_or<T>(value: Option<T>, prompt: &str) -> Result<T>
where
    T: Clone + ToString + FromStr,
    <T as FromStr>::Err: ToString,
{
    match value {
        Some(v) => Ok(v),
        None => Input::<T>::new()
            .with_prompt(prompt)
            .interact_text()
            .with_context(|| format!("reading {prompt}")),
    }
}

fn render_grid(sim: &Simulation, bits: &mut [i32]) -> Result<String> {
    sim.state_bits(bits)?;
    let size = sim.size();
    let mut out = String::with_capacity(bits.len() + size);
    for row in bits.chunks(size) {
        for &b in row {
            out.push(if b == 1 { '1' } else { '0' });
        }
        out.push('\n');
    }
    Ok(out)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let size = prompt_or(cli.size, "model size")?;
    let coupling = prompt_or(cli.coupling, "interaction")?;
    let temperature = prompt_or(cli.temperature, "temperature")?;

    let config = SimConfig::new(size, coupling, temperature);
    let mut sim = match cli.seed {
        Some(seed) => Simulation::with_seed(&config, seed),
        None => Simulation::new(&config),
    }
    .context("creating simulation")?;
    info!(size, coupling, temperature, "starting");

    let pb = match (cli.quiet_grid, cli.frames) {
        (true, Some(frames)) => {
            let pb = ProgressBar::new(frames * cli.sweeps_per_frame);
            pb.set_style(
                ProgressStyle::with_template(
                    "{msg} [{bar:40}] {pos}/{len} [{elapsed_precise} < {eta_precise}, {per_sec}]",
                )?
                .progress_chars("=> "),
            );
            pb.set_message("sweeps");
            Some(pb)
        }
        _ => None,
    };

    let mut bits = vec![0i32; size * size];
    let stdout = io::stdout();
    let mut frame = 0u64;

    while cli.frames.map_or(true, |max| frame < max) {
        match &pb {
            Some(pb) => sim.advance_with(cli.sweeps_per_frame, &|| pb.inc(1)),
            None => sim.advance(cli.sweeps_per_frame),
        }
        frame += 1;

        if let Some(pb) = &pb {
            pb.set_message(format!(
                "E = {:.1}  m = {:.4}",
                sim.energy(),
                sim.magnetization()
            ));
            continue;
        }

        let mut text = if cli.quiet_grid {
            String::new()
        } else {
            render_grid(&sim, &mut bits)?
        };
        writeln!(text, "Time: {}", sim.sweep_count())?;
        writeln!(text, "Energy: {}", sim.energy())?;
        writeln!(text, "Magnetic: {}", sim.magnetization())?;

        let mut lock = stdout.lock();
        lock.write_all(text.as_bytes())?;
        lock.flush()?;
    }

    if let Some(pb) = pb {
        pb.finish();
        println!(
            "Time: {}\nEnergy: {}\nMagnetic: {}",
            sim.sweep_count(),
            sim.energy(),
            sim.magnetization()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_grid() {
        let sim = Simulation::with_seed(&SimConfig::new(3, 1.0, 0.0), 0).unwrap();
        let mut bits = vec![0i32; 9];
        assert_eq!(render_grid(&sim, &mut bits).unwrap(), "111\n111\n111\n");
    }

    #[test]
    fn test_cli_parses_negative_coupling() {
        let cli = Cli::try_parse_from([
            "ising-console",
            "-n",
            "8",
            "-j",
            "-1.0",
            "-t",
            "2.0",
            "--frames",
            "3",
            "--quiet-grid",
        ])
        .unwrap();
        assert_eq!(cli.size, Some(8));
        assert_eq!(cli.coupling, Some(-1.0));
        assert_eq!(cli.frames, Some(3));
        assert!(cli.quiet_grid);
        assert_eq!(cli.sweeps_per_frame, 1);
    }

    #[test]
    fn test_prompt_skipped_when_given() {
        assert_eq!(prompt_or(Some(5usize), "model size").unwrap(), 5);
    }
}
