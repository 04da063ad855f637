//! Single-spin-flip Metropolis Monte Carlo for the 2D Ising model on a
//! periodic square lattice.
//!
//! The [`Simulation`] type owns one spin configuration, its PRNG and the
//! acceptance-probability table for its current temperature.

pub mod config;
pub mod error;
pub mod geometry;
pub mod mcmc;
pub mod simulation;
pub mod spins;

pub use config::{SimConfig, MAX_SIZE, MIN_TEMPERATURE};
pub use error::{IsingError, IsingResult};
pub use geometry::Lattice;
pub use mcmc::AcceptanceTable;
pub use simulation::Simulation;
