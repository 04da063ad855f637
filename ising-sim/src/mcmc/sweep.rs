use crate::geometry::{Lattice, N_DIRECTIONS};
use crate::mcmc::acceptance::AcceptanceTable;
use rand::Rng;
use rand_xoshiro::Xoshiro256StarStar;

/// Sum of the four periodic neighbors of site `i`.
#[inline]
fn neighbor_sum(lattice: &Lattice, spins: &[i8], i: usize) -> i32 {
    let mut h = 0i32;
    for d in 0..N_DIRECTIONS {
        h += spins[lattice.neighbor(i, d, true)] as i32;
        h += spins[lattice.neighbor(i, d, false)] as i32;
    }
    h
}

/// Uniform coordinate in `[0, size)`; a draw that rounds up to `size` is pulled back to `size - 1`.
#[inline]
fn draw_coord(rng: &mut Xoshiro256StarStar, size: usize) -> usize {
    let c = (rng.gen::<f64>() * size as f64) as usize;
    c.min(size - 1)
}

/// Metropolis decision for a flip with energy change `delta_e`.
#[inline]
fn accept(delta_e: f64, table: &AcceptanceTable, rng: &mut Xoshiro256StarStar) -> bool {
    if delta_e <= 0.0 {
        return true;
    }
    match table.probability(delta_e) {
        Some(p) => rng.gen::<f64>() < p,
        None => false,
    }
}

/// Random-site Metropolis sweep: `n_spins` single-spin trial flips.
///
/// Each trial picks a uniformly random site `(k, l)`, computes
/// `ΔE = 2J·s·Σneighbors` and flips the spin if `ΔE <= 0` or, otherwise,
/// with probability `exp(-ΔE/T)` taken from `table`. All randomness comes
/// from `rng`.
///
/// Returns the number of accepted flips.
#[cfg_attr(feature = "profile", inline(never))]
pub fn metropolis_sweep(
    lattice: &Lattice,
    spins: &mut [i8],
    coupling: f64,
    table: &AcceptanceTable,
    rng: &mut Xoshiro256StarStar,
) -> usize {
    let size = lattice.size;
    let mut accepted = 0usize;

    for _ in 0..lattice.n_spins {
        let k = draw_coord(rng, size);
        let l = draw_coord(rng, size);
        let i = lattice.index(k, l);

        let si = spins[i] as f64;
        let h = neighbor_sum(lattice, spins, i) as f64;
        let delta_e = 2.0 * coupling * si * h;

        if accept(delta_e, table, rng) {
            spins[i] = -spins[i];
            accepted += 1;
        }
    }

    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spins::compute_energy;
    use rand::SeedableRng;

    #[test]
    fn test_neighbor_sum() {
        let lat = Lattice::new(4);
        let mut spins = vec![1i8; 16];
        assert_eq!(neighbor_sum(&lat, &spins, 0), 4);
        // Neighbors of 0 are 4, 12, 1, 3.
        spins[12] = -1;
        spins[3] = -1;
        assert_eq!(neighbor_sum(&lat, &spins, 0), 0);
        spins[4] = -1;
        assert_eq!(neighbor_sum(&lat, &spins, 0), -2);
    }

    #[test]
    fn test_draw_coord_in_range() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        for size in [1usize, 2, 3, 17] {
            for _ in 0..1000 {
                assert!(draw_coord(&mut rng, size) < size);
            }
        }
    }

    #[test]
    fn test_ground_state_frozen() {
        let lat = Lattice::new(6);
        let mut spins = vec![1i8; 36];
        let table = AcceptanceTable::build(1.0, 1e-9);
        let mut rng = Xoshiro256StarStar::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(metropolis_sweep(&lat, &mut spins, 1.0, &table, &mut rng), 0);
        }
        assert!(spins.iter().all(|&s| s == 1));
    }

    #[test]
    fn test_zero_temperature_never_raises_energy() {
        let lat = Lattice::new(8);
        let mut rng = Xoshiro256StarStar::seed_from_u64(3);
        let mut spins: Vec<i8> = (0..64)
            .map(|_| if rng.gen::<bool>() { 1 } else { -1 })
            .collect();
        let table = AcceptanceTable::build(1.0, 0.0);
        let mut prev = compute_energy(&lat, &spins, 1.0);
        for _ in 0..50 {
            metropolis_sweep(&lat, &mut spins, 1.0, &table, &mut rng);
            let e = compute_energy(&lat, &spins, 1.0);
            assert!(e <= prev);
            prev = e;
        }
    }

    #[test]
    fn test_infinite_temperature_flips_freely() {
        let lat = Lattice::new(8);
        let mut spins = vec![1i8; 64];
        let table = AcceptanceTable::build(1.0, f64::INFINITY);
        let mut rng = Xoshiro256StarStar::seed_from_u64(11);
        let accepted = metropolis_sweep(&lat, &mut spins, 1.0, &table, &mut rng);
        assert_eq!(accepted, 64);
    }

    #[test]
    fn test_zero_coupling_accepts_everything() {
        let lat = Lattice::new(4);
        let mut spins = vec![1i8; 16];
        let table = AcceptanceTable::build(0.0, 0.0);
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        assert_eq!(metropolis_sweep(&lat, &mut spins, 0.0, &table, &mut rng), 16);
    }
}
