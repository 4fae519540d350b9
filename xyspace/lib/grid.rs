//! Geometry of the discretized domain.
//!
//! Cells are always square: the shorter grid dimension spans one unit of
//! length and the longer one follows the aspect ratio of the grid.

/// Smallest allowed number of cells along either axis.
pub const MIN_CELLS: usize = 8;

/// Grid dimensions and spacings.
///
/// Arrays defined over the grid have shape `(ny, nx)`, so that in standard
/// layout the cell `(i, j)` sits at flat index `j * nx + i`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Grid {
    /// Number of cells along x.
    pub nx: usize,
    /// Number of cells along y.
    pub ny: usize,
    /// Physical extent along x.
    pub lx: f64,
    /// Physical extent along y.
    pub ly: f64,
    /// Cell width.
    pub dx: f64,
    /// Cell height; always equal to `dx`.
    pub dy: f64,
}

impl Grid {
    /// Create a new grid, raising either dimension to [`MIN_CELLS`] if needed.
    pub fn new(nx: usize, ny: usize) -> Self {
        let nx = nx.max(MIN_CELLS);
        let ny = ny.max(MIN_CELLS);
        let cell = (nx.min(ny) as f64).recip();
        Self {
            nx,
            ny,
            lx: nx as f64 * cell,
            ly: ny as f64 * cell,
            dx: cell,
            dy: cell,
        }
    }

    /// Shape of arrays defined over the grid, `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) { (self.ny, self.nx) }

    /// Total number of cells.
    pub fn len(&self) -> usize { self.nx * self.ny }

    /// Always `false`; a grid holds at least `MIN_CELLS²` cells.
    pub fn is_empty(&self) -> bool { false }

    /// Flat row-major index of cell `(i, j)`.
    pub fn idx(&self, i: usize, j: usize) -> usize { j * self.nx + i }

    /// Area element for discrete integrals.
    pub fn cell_area(&self) -> f64 { self.dx * self.dy }

    /// Physical coordinates of the center of cell `(i, j)`.
    pub fn cell_center(&self, i: usize, j: usize) -> (f64, f64) {
        ((i as f64 + 0.5) * self.dx, (j as f64 + 0.5) * self.dy)
    }

    /// Length of the shorter side of the domain.
    pub fn min_length(&self) -> f64 { self.lx.min(self.ly) }
}

impl Default for Grid {
    fn default() -> Self { Self::new(372, 300) }
}
