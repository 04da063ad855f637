use crate::geometry::{Lattice, N_DIRECTIONS};

/// Total nearest-neighbor energy `-J Σ s_i s_j`, each bond counted once.
///
/// `spins`: flat (n_spins), i8 values +1/-1
///
/// Only the forward bonds (↓ and →, periodic) of each site are visited, so
/// every bond of the torus contributes exactly one term.
pub fn compute_energy(lattice: &Lattice, spins: &[i8], coupling: f64) -> f64 {
    let mut bond_sum = 0i64;

    for i in 0..lattice.n_spins {
        let si = spins[i] as i64;
        let mut forward = 0i64;
        for d in 0..N_DIRECTIONS {
            forward += spins[lattice.neighbor(i, d, true)] as i64;
        }
        bond_sum += si * forward;
    }

    -coupling * bond_sum as f64
}

/// Signed sum of all spins.
pub fn magnetization_sum(spins: &[i8]) -> i64 {
    spins.iter().map(|&s| s as i64).sum()
}

/// `|Σ s| / n_spins`, in `[0, 1]`.
pub fn normalized_magnetization(sum: i64, n_spins: usize) -> f64 {
    if n_spins == 0 {
        return 0.0;
    }
    sum.unsigned_abs() as f64 / n_spins as f64
}
