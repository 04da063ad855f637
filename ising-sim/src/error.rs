use thiserror::Error;

/// Failures reported by the simulator core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IsingError {
    /// Lattice side length outside `1..=max`.
    #[error("model size must be between 1 and {max}, got {size}")]
    InvalidSize { size: usize, max: usize },

    /// Negative or NaN temperature.
    #[error("temperature must be non-negative, got {0}")]
    InvalidTemperature(f64),

    /// Caller-provided state buffer does not hold exactly `size * size` cells.
    #[error("state buffer holds {got} cells, lattice needs {expected}")]
    StateBufferLength { expected: usize, got: usize },

    /// The spin storage for `cells` sites could not be reserved.
    #[error("cannot allocate spin storage for {cells} sites")]
    Allocation { cells: usize },

    /// Any other rejected configuration field.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type IsingResult<T> = Result<T, IsingError>;
