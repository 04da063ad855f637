pub mod energy;

pub use energy::{compute_energy, magnetization_sum, normalized_magnetization};
