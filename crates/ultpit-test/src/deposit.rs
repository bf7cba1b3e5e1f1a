//! Seeded synthetic block values.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `n` integer-valued numbers drawn uniformly from `lo..=hi`.
///
/// Integer values keep flow capacities exact at any positive precision.
pub fn seeded_values(n: usize, seed: u64, lo: i32, hi: i32) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.random_range(lo..=hi) as f64).collect()
}

/// Waste everywhere except an ore body near the bottom centre of the grid.
///
/// Waste blocks cost 1; ore blocks are worth 1..=12. The top layer is air
/// (zero) so that trailing-air trimming has something to remove.
pub fn ore_body(nx: usize, ny: usize, nz: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (cx, cy) = (nx as f64 / 2.0, ny as f64 / 2.0);
    let radius = (nx.min(ny) as f64 / 3.0).max(1.0);
    let mut values = Vec::with_capacity(nx * ny * nz);
    for iz in 0..nz {
        for iy in 0..ny {
            for ix in 0..nx {
                let dx = ix as f64 + 0.5 - cx;
                let dy = iy as f64 + 0.5 - cy;
                let value = if iz + 1 == nz {
                    0.0
                } else if iz < nz / 2 + 1 && dx * dx + dy * dy <= radius * radius {
                    rng.random_range(1..=12) as f64
                } else {
                    -1.0
                };
                values.push(value);
            }
        }
    }
    values
}
