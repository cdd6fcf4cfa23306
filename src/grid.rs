//! Structured grid geometry shared by every renderer.
//!
//! The case mesh is an implicit axis-aligned lattice; field dumps store one
//! value per cell in x-fastest order (`index = (k*ny + j)*nx + i`). Nothing
//! here is read from the case: resolution and bounds come from configuration.

/// Axis-aligned physical bounding box, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub z: (f64, f64),
}

/// Fixed-resolution structured lattice over a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub bounds: Bounds,
}

impl Grid {
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Flat index of cell (i, j, k), x-fastest.
    #[inline]
    pub fn flat(&self, i: usize, j: usize, k: usize) -> usize {
        (k * self.ny + j) * self.nx + i
    }

    /// X coordinate of cell column `i`, endpoints on the box faces.
    pub fn x(&self, i: usize) -> f64 {
        axis_coord(self.bounds.x, i, self.nx)
    }

    pub fn y(&self, j: usize) -> f64 {
        axis_coord(self.bounds.y, j, self.ny)
    }

    pub fn z(&self, k: usize) -> f64 {
        axis_coord(self.bounds.z, k, self.nz)
    }

    /// Domain center, used as the orbit camera target.
    pub fn center(&self) -> [f64; 3] {
        [
            (self.bounds.x.0 + self.bounds.x.1) * 0.5,
            (self.bounds.y.0 + self.bounds.y.1) * 0.5,
            (self.bounds.z.0 + self.bounds.z.1) * 0.5,
        ]
    }
}

fn axis_coord(range: (f64, f64), i: usize, n: usize) -> f64 {
    if n < 2 {
        return range.0;
    }
    range.0 + (range.1 - range.0) * i as f64 / (n - 1) as f64
}

/// One scalar field snapshot reshaped onto a grid.
#[derive(Debug, Clone)]
pub struct Field3 {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    data: Vec<f64>,
}

impl Field3 {
    /// Wrap a flat value vector. The length must already match the grid;
    /// the field parser guarantees this.
    pub fn new(grid: &Grid, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), grid.cell_count());
        Self {
            nx: grid.nx,
            ny: grid.ny,
            nz: grid.nz,
            data,
        }
    }

    #[inline]
    pub fn at(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[(k * self.ny + j) * self.nx + i]
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Horizontal slab at layer `k` as a closure-friendly sampler.
    pub fn slab(&self, k: usize) -> Slab<'_> {
        Slab { field: self, k }
    }

    /// Count of cells in layer `k` with `lo < value < hi` (strict).
    pub fn band_count(&self, k: usize, lo: f64, hi: f64) -> usize {
        let mut n = 0;
        for j in 0..self.ny {
            for i in 0..self.nx {
                let v = self.at(i, j, k);
                if v > lo && v < hi {
                    n += 1;
                }
            }
        }
        n
    }
}

/// 2D view of one horizontal layer, indexed (i, j).
#[derive(Clone, Copy)]
pub struct Slab<'a> {
    field: &'a Field3,
    k: usize,
}

impl Slab<'_> {
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.field.at(i, j, self.k)
    }

    pub fn nx(&self) -> usize {
        self.field.nx
    }

    pub fn ny(&self) -> usize {
        self.field.ny
    }

    /// Bilinear sample at fractional cell coordinates, clamped to the layer.
    pub fn sample(&self, fi: f64, fj: f64) -> f64 {
        let fi = fi.clamp(0.0, (self.nx() - 1) as f64);
        let fj = fj.clamp(0.0, (self.ny() - 1) as f64);
        let i0 = fi.floor() as usize;
        let j0 = fj.floor() as usize;
        let i1 = (i0 + 1).min(self.nx() - 1);
        let j1 = (j0 + 1).min(self.ny() - 1);
        let si = fi - i0 as f64;
        let sj = fj - j0 as f64;
        self.at(i0, j0) * (1.0 - si) * (1.0 - sj)
            + self.at(i1, j0) * si * (1.0 - sj)
            + self.at(i0, j1) * (1.0 - si) * sj
            + self.at(i1, j1) * si * sj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid4() -> Grid {
        Grid {
            nx: 4,
            ny: 4,
            nz: 4,
            bounds: Bounds {
                x: (-0.05, 0.05),
                y: (-0.05, 0.05),
                z: (0.0, 0.1),
            },
        }
    }

    #[test]
    fn test_flat_index_x_fastest() {
        let g = grid4();
        assert_eq!(g.flat(0, 0, 0), 0);
        assert_eq!(g.flat(1, 0, 0), 1);
        assert_eq!(g.flat(0, 1, 0), 4);
        assert_eq!(g.flat(0, 0, 1), 16);
        assert_eq!(g.flat(3, 3, 3), 63);
    }

    #[test]
    fn test_axis_coords_hit_bounds() {
        let g = grid4();
        assert!((g.x(0) - -0.05).abs() < 1e-12);
        assert!((g.x(3) - 0.05).abs() < 1e-12);
        assert!((g.z(0) - 0.0).abs() < 1e-12);
        assert!((g.z(3) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_field_at_matches_flat_order() {
        let g = grid4();
        let data: Vec<f64> = (0..g.cell_count()).map(|v| v as f64).collect();
        let f = Field3::new(&g, data);
        assert_eq!(f.at(2, 1, 3), ((3 * 4 + 1) * 4 + 2) as f64);
    }

    #[test]
    fn test_band_count_strict_bounds() {
        let g = grid4();
        let mut data = vec![0.0; g.cell_count()];
        // layer 1: two interface cells, plus values exactly on the thresholds
        data[g.flat(0, 0, 1)] = 0.5;
        data[g.flat(1, 0, 1)] = 0.3;
        data[g.flat(2, 0, 1)] = 0.1;
        data[g.flat(3, 0, 1)] = 0.9;
        let f = Field3::new(&g, data);
        assert_eq!(f.band_count(1, 0.1, 0.9), 2);
        assert_eq!(f.band_count(0, 0.1, 0.9), 0);
    }

    #[test]
    fn test_slab_bilinear_midpoint() {
        let g = grid4();
        let mut data = vec![0.0; g.cell_count()];
        data[g.flat(0, 0, 0)] = 1.0;
        data[g.flat(1, 0, 0)] = 3.0;
        let f = Field3::new(&g, data);
        let s = f.slab(0);
        assert!((s.sample(0.5, 0.0) - 2.0).abs() < 1e-12);
        // clamped outside the layer
        assert!((s.sample(-5.0, 0.0) - 1.0).abs() < 1e-12);
    }
}
