use crate::config::MIN_TEMPERATURE;

/// Neighbor-alignment magnitudes `|s·h|` that make a single flip unfavorable.
pub const TABLE_KEYS: [usize; 2] = [2, 4];

const N_SLOTS: usize = 5;

/// Immutable snapshot of Metropolis acceptance probabilities for one
/// `(coupling, temperature)` pair.
///
/// Keyed by `round(ΔE / 2|J|)`. On the square lattice a flip with `ΔE > 0`
/// always has key 2 or 4, whichever sign `J` has, so a populated table
/// answers every unfavorable move. Lookups for other keys fall back to
/// evaluating `exp(-ΔE / T)` directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceTable {
    coupling: f64,
    temperature: f64,
    probs: [Option<f64>; N_SLOTS],
}

impl AcceptanceTable {
    /// Precompute `exp(-2|J|·key / T)` for every key in [`TABLE_KEYS`].
    ///
    /// Left empty when `temperature <= MIN_TEMPERATURE`.
    pub fn build(coupling: f64, temperature: f64) -> Self {
        let mut probs = [None; N_SLOTS];
        if temperature > MIN_TEMPERATURE {
            let j = coupling.abs();
            for key in TABLE_KEYS {
                probs[key] = Some((-2.0 * j * key as f64 / temperature).exp());
            }
        }
        Self {
            coupling,
            temperature,
            probs,
        }
    }

    pub fn coupling(&self) -> f64 {
        self.coupling
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// True when every energy-raising flip must be rejected.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.temperature <= MIN_TEMPERATURE
    }

    pub fn is_populated(&self) -> bool {
        self.probs.iter().any(Option::is_some)
    }

    /// Cached probability for `key`, if present.
    #[inline]
    pub fn lookup(&self, key: i64) -> Option<f64> {
        usize::try_from(key)
            .ok()
            .and_then(|k| self.probs.get(k).copied().flatten())
    }

    /// Acceptance probability of a flip with energy change `delta_e > 0`.
    ///
    /// Returns `None` when frozen.
    #[inline]
    pub fn probability(&self, delta_e: f64) -> Option<f64> {
        if self.is_frozen() {
            return None;
        }
        let key = (delta_e / (2.0 * self.coupling.abs())).round() as i64;
        Some(
            self.lookup(key)
                .unwrap_or_else(|| (-delta_e / self.temperature).exp()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ferromagnetic_entries() {
        let table = AcceptanceTable::build(1.0, 2.0);
        assert!(table.is_populated());
        assert_eq!(table.lookup(2), Some((-4.0f64 / 2.0).exp()));
        assert_eq!(table.lookup(4), Some((-8.0f64 / 2.0).exp()));
        assert_eq!(table.lookup(0), None);
        assert_eq!(table.lookup(3), None);
        assert_eq!(table.lookup(-2), None);
        assert_eq!(table.lookup(99), None);
    }

    #[test]
    fn test_antiferromagnetic_keys_covered() {
        // J < 0: an unfavorable flip has s·h = -2 or -4, ΔE = 2J·s·h = 4|J| or 8|J|.
        let table = AcceptanceTable::build(-1.5, 3.0);
        for sh in [-2.0f64, -4.0] {
            let delta_e = 2.0 * -1.5 * sh;
            let expected = (-delta_e / 3.0).exp();
            let key = (delta_e / 3.0).round() as i64;
            assert_eq!(table.lookup(key), Some(expected));
            assert!((table.probability(delta_e).unwrap() - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn test_fallback_for_missing_key() {
        let table = AcceptanceTable::build(1.0, 2.0);
        // Key 3 is never produced on the square lattice; still answered.
        let p = table.probability(6.0).unwrap();
        assert!((p - (-3.0f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_frozen_table_is_empty() {
        for t in [0.0, MIN_TEMPERATURE, 1e-12] {
            let table = AcceptanceTable::build(1.0, t);
            assert!(table.is_frozen());
            assert!(!table.is_populated());
            assert_eq!(table.probability(4.0), None);
            assert_eq!(table.probability(6.0), None);
        }
    }

    #[test]
    fn test_build_is_pure() {
        assert_eq!(
            AcceptanceTable::build(1.0, 2.27),
            AcceptanceTable::build(1.0, 2.27)
        );
        assert_ne!(
            AcceptanceTable::build(1.0, 2.27),
            AcceptanceTable::build(1.0, 1.5)
        );
    }
}
