pub mod acceptance;
pub mod sweep;

pub use acceptance::AcceptanceTable;
pub use sweep::metropolis_sweep;
