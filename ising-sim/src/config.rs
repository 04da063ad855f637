use validator::{Validate, ValidationError};

use crate::error::{IsingError, IsingResult};

/// Largest supported lattice side (1 GiB of spins).
pub const MAX_SIZE: usize = 1 << 15;

/// Temperatures at or below this value are treated as zero.
pub const MIN_TEMPERATURE: f64 = 1e-9;

const CODE_SIZE: &str = "size";
const CODE_COUPLING: &str = "coupling";
const CODE_TEMPERATURE: &str = "temperature";

/// Check that `temperature` is usable for a Metropolis run.
///
/// Zero is accepted (it is clamped later), negative values and NaN are not.
pub fn validate_temperature(temperature: f64) -> Result<(), ValidationError> {
    if temperature.is_nan() || temperature < 0.0 {
        return Err(ValidationError::new(CODE_TEMPERATURE));
    }
    Ok(())
}

/// Map a non-negative temperature onto the strictly positive range.
#[inline]
pub fn clamp_temperature(temperature: f64) -> f64 {
    if temperature == 0.0 {
        MIN_TEMPERATURE
    } else {
        temperature
    }
}

fn validate_sim_config(cfg: &SimConfig) -> Result<(), ValidationError> {
    if cfg.size < 1 || cfg.size > MAX_SIZE {
        return Err(ValidationError::new(CODE_SIZE));
    }
    if !cfg.coupling.is_finite() {
        return Err(ValidationError::new(CODE_COUPLING));
    }
    validate_temperature(cfg.temperature)
}

/// Construction parameters for a [`Simulation`](crate::Simulation).
///
/// `size` and `coupling` are fixed for the lifetime of the instance,
/// `temperature` is only the starting value.
#[derive(Debug, Clone, Copy, PartialEq, Validate)]
#[validate(schema(function = "validate_sim_config"))]
pub struct SimConfig {
    pub size: usize,
    pub coupling: f64,
    pub temperature: f64,
}

impl SimConfig {
    pub fn new(size: usize, coupling: f64, temperature: f64) -> Self {
        Self {
            size,
            coupling,
            temperature,
        }
    }

    /// Run validation and translate the failing rule into an [`IsingError`].
    pub fn check(&self) -> IsingResult<()> {
        self.validate().map_err(|errs| {
            let code = errs
                .field_errors()
                .values()
                .flat_map(|v| v.iter())
                .map(|e| e.code.clone())
                .next();
            match code.as_deref() {
                Some(CODE_SIZE) => IsingError::InvalidSize {
                    size: self.size,
                    max: MAX_SIZE,
                },
                Some(CODE_TEMPERATURE) => IsingError::InvalidTemperature(self.temperature),
                _ => IsingError::Config(errs.to_string()),
            }
        })
    }
}
