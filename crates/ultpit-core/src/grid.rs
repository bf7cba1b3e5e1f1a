//! Regular 3D block grid.
//!
//! Blocks are addressed either by an index triple `(ix, iy, iz)` or by a dense
//! 1D index `ix + iy * num_x + iz * num_x * num_y`. The `z` axis points up, so
//! a positive `dz` offset reaches blocks above.

use std::fmt;

/// An axis-aligned lattice of equally sized blocks.
///
/// # Example
///
/// ```
/// use ultpit_core::Grid;
///
/// let grid = Grid::new([4, 3, 2], [0.0; 3], [10.0; 3]);
/// assert_eq!(grid.block_count(), 24);
/// assert_eq!(grid.index(1, 2, 1), 1 + 2 * 4 + 12);
/// assert_eq!(grid.coords(21), (1, 2, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    pub num_x: usize,
    pub num_y: usize,
    pub num_z: usize,

    /// Lower corner of the grid.
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,

    /// Block extents along each axis.
    pub siz_x: f64,
    pub siz_y: f64,
    pub siz_z: f64,
}

impl Grid {
    /// Creates a grid from block counts, minimum corner and block size.
    pub fn new(counts: [usize; 3], min: [f64; 3], size: [f64; 3]) -> Self {
        Self {
            num_x: counts[0],
            num_y: counts[1],
            num_z: counts[2],
            min_x: min[0],
            min_y: min[1],
            min_z: min[2],
            siz_x: size[0],
            siz_y: size[1],
            siz_z: size[2],
        }
    }

    /// Unit-sized blocks with the origin at zero.
    pub fn unit(num_x: usize, num_y: usize, num_z: usize) -> Self {
        Self::new([num_x, num_y, num_z], [0.0; 3], [1.0; 3])
    }

    /// Moves the origin to half a block, the convention of GSLIB block files.
    pub fn with_gslib_origin(mut self) -> Self {
        self.min_x = self.siz_x / 2.0;
        self.min_y = self.siz_y / 2.0;
        self.min_z = self.siz_z / 2.0;
        self
    }

    /// Total number of blocks.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.num_x * self.num_y * self.num_z
    }

    /// Number of blocks in one horizontal layer.
    #[inline]
    pub fn layer_size(&self) -> usize {
        self.num_x * self.num_y
    }

    #[inline]
    pub fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        ix + iy * self.num_x + iz * self.layer_size()
    }

    /// Inverse of [`Grid::index`].
    #[inline]
    pub fn coords(&self, k: usize) -> (usize, usize, usize) {
        let layer = self.layer_size();
        let rem = k % layer;
        (rem % self.num_x, rem / self.num_x, k / layer)
    }

    /// 1D delta between two blocks separated by `(dx, dy, dz)`.
    ///
    /// Valid for any pair of in-bounds blocks; the caller is responsible for
    /// checking that the target exists.
    #[inline]
    pub fn offset(&self, dx: isize, dy: isize, dz: isize) -> isize {
        let nx = self.num_x as isize;
        let ny = self.num_y as isize;
        dx + dy * nx + dz * nx * ny
    }

    /// True if the signed coordinate triple lies inside the grid.
    #[inline]
    pub fn contains(&self, ix: isize, iy: isize, iz: isize) -> bool {
        (0..self.num_x as isize).contains(&ix)
            && (0..self.num_y as isize).contains(&iy)
            && (0..self.num_z as isize).contains(&iz)
    }

    /// Centroid `[x, y, z]` of block `k`.
    pub fn block_centroid(&self, k: usize) -> [f64; 3] {
        let (ix, iy, iz) = self.coords(k);
        [
            ix as f64 * self.siz_x + self.min_x + self.siz_x / 2.0,
            iy as f64 * self.siz_y + self.min_y + self.siz_y / 2.0,
            iz as f64 * self.siz_z + self.min_z + self.siz_z / 2.0,
        ]
    }

    /// Bounding box of block `k` as `[min_x, min_y, min_z, max_x, max_y, max_z]`.
    pub fn block_aabb(&self, k: usize) -> [f64; 6] {
        let [cx, cy, cz] = self.block_centroid(k);
        let (hx, hy, hz) = (self.siz_x / 2.0, self.siz_y / 2.0, self.siz_z / 2.0);
        [cx - hx, cy - hy, cz - hz, cx + hx, cy + hy, cz + hz]
    }

    /// Bounding box of the whole grid.
    pub fn aabb(&self) -> [f64; 6] {
        [
            self.min_x,
            self.min_y,
            self.min_z,
            self.min_x + self.num_x as f64 * self.siz_x,
            self.min_y + self.num_y as f64 * self.siz_y,
            self.min_z + self.num_z as f64 * self.siz_z,
        ]
    }

    /// True if the point falls inside block `k` (lower faces inclusive).
    pub fn point_in_block(&self, k: usize, x: f64, y: f64, z: f64) -> bool {
        let (ix, iy, iz) = self.coords(k);
        let xn = x - (ix as f64 * self.siz_x + self.min_x);
        let yn = y - (iy as f64 * self.siz_y + self.min_y);
        let zn = z - (iz as f64 * self.siz_z + self.min_z);
        (0.0..self.siz_x).contains(&xn)
            && (0.0..self.siz_y).contains(&yn)
            && (0.0..self.siz_z).contains(&zn)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "x ={:7} {:12.1}  {:10.1}", self.num_x, self.min_x, self.siz_x)?;
        writeln!(f, "y ={:7} {:12.1}  {:10.1}", self.num_y, self.min_y, self.siz_y)?;
        write!(f, "z ={:7} {:12.1}  {:10.1}", self.num_z, self.min_z, self.siz_z)
    }
}

#[cfg(test)]
#[path = "grid_tests.rs"]
mod tests;
