use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{debug, trace, warn};

use crate::config::{clamp_temperature, validate_temperature, SimConfig};
use crate::error::{IsingError, IsingResult};
use crate::geometry::Lattice;
use crate::mcmc::{metropolis_sweep, AcceptanceTable};
use crate::spins;

/// All-up configuration of `n_spins` sites; reports allocation failure instead of aborting.
fn aligned_spins(n_spins: usize) -> IsingResult<Vec<i8>> {
    let mut spins = Vec::new();
    spins
        .try_reserve_exact(n_spins)
        .map_err(|_| IsingError::Allocation { cells: n_spins })?;
    spins.resize(n_spins, 1i8);
    Ok(spins)
}

/// One 2D Ising system advanced by random-site Metropolis sweeps.
///
/// Size and coupling are fixed at construction. Energy and magnetization are
/// recomputed from scratch after every completed sweep, so they always
/// describe the current spin configuration.
pub struct Simulation {
    lattice: Lattice,
    coupling: f64,
    /// Always strictly positive; zero is stored as `MIN_TEMPERATURE`.
    temperature: f64,
    /// Spin configuration, length `n_spins` (+1/−1), row-major.
    spins: Vec<i8>,
    energy: f64,
    magnetization: i64,
    sweep_count: u64,
    table: AcceptanceTable,
    rng: Xoshiro256StarStar,
}

impl Simulation {
    /// Create a fully aligned system whose PRNG is seeded from OS entropy.
    pub fn new(config: &SimConfig) -> IsingResult<Self> {
        Self::with_rng(config, Xoshiro256StarStar::from_entropy())
    }

    /// Create a fully aligned system with a reproducible PRNG stream.
    pub fn with_seed(config: &SimConfig, seed: u64) -> IsingResult<Self> {
        Self::with_rng(config, Xoshiro256StarStar::seed_from_u64(seed))
    }

    fn with_rng(config: &SimConfig, rng: Xoshiro256StarStar) -> IsingResult<Self> {
        config.check()?;

        let lattice = Lattice::new(config.size);
        let temperature = clamp_temperature(config.temperature);
        let spins = aligned_spins(lattice.n_spins)?;
        let table = AcceptanceTable::build(config.coupling, temperature);

        let mut sim = Self {
            lattice,
            coupling: config.coupling,
            temperature,
            spins,
            energy: 0.0,
            magnetization: 0,
            sweep_count: 0,
            table,
            rng,
        };
        sim.refresh_observables();

        debug!(
            size = config.size,
            coupling = config.coupling,
            temperature,
            energy = sim.energy,
            "created Ising simulation"
        );
        Ok(sim)
    }

    fn refresh_observables(&mut self) {
        self.energy = spins::compute_energy(&self.lattice, &self.spins, self.coupling);
        self.magnetization = spins::magnetization_sum(&self.spins);
    }

    /// Run one sweep, refresh observables, and return the number of accepted flips.
    pub fn step(&mut self) -> usize {
        let accepted = metropolis_sweep(
            &self.lattice,
            &mut self.spins,
            self.coupling,
            &self.table,
            &mut self.rng,
        );
        self.refresh_observables();
        self.sweep_count += 1;
        accepted
    }

    /// Run `n_sweeps` consecutive sweeps.
    pub fn advance(&mut self, n_sweeps: u64) {
        self.advance_with(n_sweeps, &|| {});
    }

    /// Run `n_sweeps` consecutive sweeps, calling `on_sweep` after each one
    /// (useful for progress bars).
    pub fn advance_with(&mut self, n_sweeps: u64, on_sweep: &dyn Fn()) {
        let mut accepted = 0usize;
        for _ in 0..n_sweeps {
            accepted += self.step();
            on_sweep();
        }
        trace!(
            n_sweeps,
            accepted,
            sweep_count = self.sweep_count,
            energy = self.energy,
            "advanced"
        );
    }

    /// Change the temperature and rebuild the acceptance table.
    ///
    /// Negative or NaN values are rejected and leave the system untouched.
    /// Zero is stored as `MIN_TEMPERATURE`.
    pub fn set_temperature(&mut self, temperature: f64) -> IsingResult<()> {
        if validate_temperature(temperature).is_err() {
            warn!(temperature, "rejected temperature");
            return Err(IsingError::InvalidTemperature(temperature));
        }

        self.temperature = clamp_temperature(temperature);
        self.table = AcceptanceTable::build(self.coupling, self.temperature);
        debug!(
            temperature = self.temperature,
            frozen = self.table.is_frozen(),
            "rebuilt acceptance table"
        );
        Ok(())
    }

    /// Write the lattice as a row-major `{0, 1}` grid (`(s + 1) / 2`).
    ///
    /// `out` must hold exactly `size * size` cells.
    pub fn state_bits(&self, out: &mut [i32]) -> IsingResult<()> {
        if out.len() != self.spins.len() {
            return Err(IsingError::StateBufferLength {
                expected: self.spins.len(),
                got: out.len(),
            });
        }
        for (o, &s) in out.iter_mut().zip(self.spins.iter()) {
            *o = (s as i32 + 1) / 2;
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.lattice.size
    }

    pub fn coupling(&self) -> f64 {
        self.coupling
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Total energy of the configuration after the last completed sweep.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// `|Σ s| / N²`.
    pub fn magnetization(&self) -> f64 {
        spins::normalized_magnetization(self.magnetization, self.lattice.n_spins)
    }

    /// Signed spin sum.
    pub fn magnetization_sum(&self) -> i64 {
        self.magnetization
    }

    pub fn sweep_count(&self) -> u64 {
        self.sweep_count
    }

    pub fn spins(&self) -> &[i8] {
        &self.spins
    }

    pub fn acceptance_table(&self) -> &AcceptanceTable {
        &self.table
    }
}
