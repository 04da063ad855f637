/// Number of forward bond directions per site: dim 0 is ↓ (next row), dim 1 is → (next column).
pub const N_DIRECTIONS: usize = 2;

/// Periodic `size × size` square lattice.
///
/// Sites are indexed in row-major order, so site `(row, col)` has flat index
/// `row * size + col`. Every site has exactly four neighbors: forward and
/// backward along each of the two directions, wrapped modulo `size`.
/// Neighbors are computed on the fly; the lattice itself allocates nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lattice {
    /// Side length `N`.
    pub size: usize,
    /// Total number of sites (`size * size`).
    pub n_spins: usize,
}

impl Lattice {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            n_spins: size * size,
        }
    }

    /// Return the neighbor of site `flat_idx` in direction `dim`.
    /// `forward = true` means +1 along `dim`, `forward = false` means −1.
    #[inline]
    pub fn neighbor(&self, flat_idx: usize, dim: usize, forward: bool) -> usize {
        let size = self.size;
        let (row, col) = (flat_idx / size, flat_idx % size);
        let shift = if forward { 1 } else { size - 1 };
        if dim == 0 {
            ((row + shift) % size) * size + col
        } else {
            row * size + (col + shift) % size
        }
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }
}
