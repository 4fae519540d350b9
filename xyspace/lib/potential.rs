//! Construction of the complex potential over the grid.
//!
//! The potential is the superposition of three independent contributions:
//! - rectangular boxes, added as constant real offsets over a range of cells;
//! - smooth radial wells, evaluated from closed-form profiles at each cell
//!   center;
//! - a complex absorbing potential (CAP) sponge along all four edges, which
//!   only touches the imaginary part (made negative, i.e. lossy).
//!
//! ```
//! use ndarray as nd;
//! use num_complex::Complex64 as C64;
//! use xyspace::{ grid::Grid, potential::* };
//!
//! let grid = Grid::new(32, 32);
//! let mut pfield = PotentialField::default();
//! pfield.boxes.push(PotentialBox::new(0.25, 0.25, 0.75, 0.75, 10.0));
//! let mut V: nd::Array2<C64> = nd::Array2::zeros((0, 0));
//! pfield.build(&grid, &mut V);
//! assert_eq!(V.dim(), grid.shape());
//! assert_eq!(V[[16, 16]].re, 10.0);
//! ```

use ndarray as nd;
use num_complex::Complex64 as C64;
use serde::{ Deserialize, Serialize };
use crate::{ error::ProfileError, grid::Grid };

/// Lower bound on the physical falloff scale of a radial well.
pub const MIN_WELL_RADIUS: f64 = 1e-4;

/// Axis-aligned rectangle with a constant potential offset.
///
/// Bounds are given in normalized `[0, 1]²` domain coordinates. A positive
/// `height` describes a barrier, a negative one a flat well. Overlapping boxes
/// sum.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PotentialBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub height: f64,
}

impl PotentialBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64, height: f64) -> Self {
        Self { x0, y0, x1, y1, height }
    }

    /// Inclusive cell-index ranges `((ix0, ix1), (iy0, iy1))` covered by the
    /// box, or `None` if the box lies entirely outside the domain along either
    /// axis.
    pub fn cell_range(&self, grid: &Grid)
        -> Option<((usize, usize), (usize, usize))>
    {
        let ix = axis_range(self.x0, self.x1, grid.nx)?;
        let iy = axis_range(self.y0, self.y1, grid.ny)?;
        Some((ix, iy))
    }
}

// map normalized bounds to an inclusive, clamped index range along one axis
fn axis_range(a: f64, b: f64, n: usize) -> Option<(usize, usize)> {
    let last = n as f64 - 1.0;
    let mut lo = (a * n as f64).floor();
    let mut hi = (b * n as f64).floor();
    if hi < lo { std::mem::swap(&mut lo, &mut hi); }
    // NaN bounds fail both comparisons and are rejected here too
    if !(hi >= 0.0 && lo <= last) { return None; }
    Some((lo.clamp(0.0, last) as usize, hi.clamp(0.0, last) as usize))
}

/// Closed family of radially symmetric well shapes.
///
/// Profiles are persisted as integer tags in declaration order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum WellProfile {
    /// `s exp(-r²/r0²)`
    #[default]
    Gaussian,
    /// `s / √(r² + r0²)`
    SoftCoulomb,
    /// `s / (r² + r0²)`
    InverseSquare,
    /// `s (1 - r²/r0²)` inside `r0`, zero outside: a truncated parabola that
    /// is exactly harmonic over its support.
    HarmonicOscillator,
}

impl WellProfile {
    /// All profiles, in tag order.
    pub const ALL: [Self; 4] = [
        Self::Gaussian,
        Self::SoftCoulomb,
        Self::InverseSquare,
        Self::HarmonicOscillator,
    ];

    /// Evaluate the profile with signed `strength` at squared distance `r2`
    /// from the center, for squared falloff scale `r0sq`.
    pub fn eval(self, strength: f64, r2: f64, r0sq: f64) -> f64 {
        match self {
            Self::Gaussian => strength * (-r2 / r0sq).exp(),
            Self::SoftCoulomb => strength / (r2 + r0sq).sqrt(),
            Self::InverseSquare => strength / (r2 + r0sq),
            Self::HarmonicOscillator => {
                let t = r2 / r0sq;
                if t < 1.0 { strength * (1.0 - t) } else { 0.0 }
            },
        }
    }
}

impl From<WellProfile> for i32 {
    fn from(profile: WellProfile) -> Self {
        match profile {
            WellProfile::Gaussian => 0,
            WellProfile::SoftCoulomb => 1,
            WellProfile::InverseSquare => 2,
            WellProfile::HarmonicOscillator => 3,
        }
    }
}

impl TryFrom<i32> for WellProfile {
    type Error = ProfileError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        usize::try_from(tag).ok()
            .and_then(|k| Self::ALL.get(k).copied())
            .ok_or(ProfileError(tag))
    }
}

/// Smooth, radially symmetric feature centered at `(cx, cy)` in normalized
/// domain coordinates.
///
/// `radius` is the falloff scale relative to the shorter side of the domain.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadialWell {
    pub cx: f64,
    pub cy: f64,
    pub strength: f64,
    pub radius: f64,
    pub profile: WellProfile,
}

impl RadialWell {
    pub fn new(
        cx: f64,
        cy: f64,
        strength: f64,
        radius: f64,
        profile: WellProfile,
    ) -> Self
    {
        Self { cx, cy, strength, radius, profile }
    }
}

/// Definition of the full potential: boxes, wells, and CAP sponge parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct PotentialField {
    /// Absorption gain of the boundary sponge; zero disables absorption.
    pub cap_strength: f64,
    /// Fraction of each edge reserved for the sponge, in `(0, 0.5)`.
    pub cap_ratio: f64,
    pub boxes: Vec<PotentialBox>,
    pub wells: Vec<RadialWell>,
}

impl Default for PotentialField {
    fn default() -> Self {
        Self {
            cap_strength: 1.0,
            cap_ratio: 0.1,
            boxes: Vec::new(),
            wells: Vec::new(),
        }
    }
}

impl PotentialField {
    /// Returns `true` if the sponge actually absorbs.
    pub fn cap_enabled(&self) -> bool {
        self.cap_strength > 1e-12 && self.cap_ratio > 0.0
    }

    /// Widths `(wx, wy)` of the sponge band in cells, each at least one cell
    /// and at most the grid dimension.
    pub fn border_widths(&self, grid: &Grid) -> (usize, usize) {
        let width = |n: usize| -> usize {
            let w = (self.cap_ratio.max(0.0) * n as f64).round();
            (w as usize).clamp(1, n)
        };
        (width(grid.nx), width(grid.ny))
    }

    /// Sponge ramp parameter `s ∊ [0, 1]` of cell `(i, j)`: zero outside the
    /// border band, rising linearly to one at the outermost cells.
    pub fn border_depth(&self, grid: &Grid, i: usize, j: usize) -> f64 {
        let (wx, wy) = self.border_widths(grid);
        let depth = |k: usize, n: usize, w: usize| -> f64 {
            let (k, n, w) = (k as f64, n as f64, w as f64);
            if k < w {
                (w - k) / w
            } else if k >= n - w {
                (k - (n - w - 1.0)) / w
            } else {
                0.0
            }
        };
        depth(i, grid.nx, wx).max(depth(j, grid.ny, wy))
    }

    /// Fill `V` with the superposition of all boxes, wells, and the sponge.
    ///
    /// `V` is reallocated if its shape does not match the grid; otherwise it
    /// is overwritten in place.
    pub fn build(&self, grid: &Grid, V: &mut nd::Array2<C64>) {
        if V.dim() != grid.shape() {
            *V = nd::Array2::zeros(grid.shape());
        } else {
            V.fill(C64::from(0.0));
        }
        self.add_boxes(grid, V);
        self.add_wells(grid, V);
        self.add_sponge(grid, V);
    }

    /// Like [`Self::build`], but return a newly allocated array.
    pub fn built(&self, grid: &Grid) -> nd::Array2<C64> {
        let mut V = nd::Array2::zeros(grid.shape());
        self.build(grid, &mut V);
        V
    }

    fn add_boxes(&self, grid: &Grid, V: &mut nd::Array2<C64>) {
        for b in self.boxes.iter() {
            let Some(((ix0, ix1), (iy0, iy1))) = b.cell_range(grid)
                else { continue; };
            V.slice_mut(nd::s![iy0..iy1 + 1, ix0..ix1 + 1])
                .map_inplace(|v| { v.re += b.height; });
        }
    }

    fn add_wells(&self, grid: &Grid, V: &mut nd::Array2<C64>) {
        let min_length = grid.min_length();
        for w in self.wells.iter() {
            let r0 = (w.radius * min_length).max(MIN_WELL_RADIUS);
            let r0sq = r0 * r0;
            let cx = w.cx * grid.lx;
            let cy = w.cy * grid.ly;
            nd::Zip::indexed(&mut *V)
                .for_each(|(j, i), v| {
                    let (x, y) = grid.cell_center(i, j);
                    let r2 = (x - cx).powi(2) + (y - cy).powi(2);
                    v.re += w.profile.eval(w.strength, r2, r0sq);
                });
        }
    }

    // smoothstep ramp w(s) = s² (3 - 2 s), squared again for a stronger edge
    fn add_sponge(&self, grid: &Grid, V: &mut nd::Array2<C64>) {
        nd::Zip::indexed(&mut *V)
            .for_each(|(j, i), v| {
                let s = self.border_depth(grid, i, j);
                if s > 0.0 {
                    let ramp = s * s * (3.0 - 2.0 * s);
                    v.im -= self.cap_strength * ramp * ramp;
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare() -> PotentialField {
        PotentialField { cap_strength: 0.0, ..PotentialField::default() }
    }

    #[test]
    fn box_outside_domain_is_ignored() {
        let grid = Grid::new(40, 30);
        let mut pfield = bare();
        pfield.boxes.push(PotentialBox::new(0.2, 0.2, 0.4, 0.4, 5.0));
        let before = pfield.built(&grid);
        pfield.boxes.push(PotentialBox::new(2.0, 0.1, 2.0, 0.9, 100.0));
        pfield.boxes.push(PotentialBox::new(0.1, -3.0, 0.9, -1.0, 100.0));
        let after = pfield.built(&grid);
        assert_eq!(before, after);
    }

    #[test]
    fn box_bounds_are_swapped_and_clamped() {
        let grid = Grid::new(10, 10);
        let mut pfield = bare();
        pfield.boxes.push(PotentialBox::new(1.5, 0.55, 0.85, -0.2, 2.0));
        let V = pfield.built(&grid);
        // x: cells 8..=9, y: cells 0..=5
        let covered: usize = V.iter().filter(|v| v.re == 2.0).count();
        assert_eq!(covered, 2 * 6);
        assert_eq!(V[[0, 8]].re, 2.0);
        assert_eq!(V[[5, 9]].re, 2.0);
        assert_eq!(V[[6, 9]].re, 0.0);
        assert_eq!(V[[0, 7]].re, 0.0);
    }

    #[test]
    fn overlapping_features_sum() {
        let grid = Grid::new(16, 16);
        let mut pfield = bare();
        pfield.boxes.push(PotentialBox::new(0.0, 0.0, 1.0, 1.0, 1.0));
        pfield.boxes.push(PotentialBox::new(0.0, 0.0, 0.5, 0.5, 2.0));
        let V = pfield.built(&grid);
        assert_eq!(V[[0, 0]].re, 3.0);
        assert_eq!(V[[15, 15]].re, 1.0);
    }

    #[test]
    fn well_profiles_at_center() {
        let grid = Grid::new(33, 33);
        let r0 = 0.1;
        let r0sq = r0 * r0;
        let mut pfield = bare();
        let center = grid.cell_center(16, 16);
        let (cx, cy) = (center.0 / grid.lx, center.1 / grid.ly);
        for profile in WellProfile::ALL {
            pfield.wells = vec![RadialWell::new(cx, cy, -3.0, r0, profile)];
            let v = pfield.built(&grid)[[16, 16]].re;
            let expected = match profile {
                WellProfile::Gaussian => -3.0,
                WellProfile::SoftCoulomb => -3.0 / r0,
                WellProfile::InverseSquare => -3.0 / r0sq,
                WellProfile::HarmonicOscillator => -3.0,
            };
            assert!((v - expected).abs() < 1e-9, "{profile:?}: {v}");
        }
    }

    #[test]
    fn harmonic_profile_is_truncated() {
        let p = WellProfile::HarmonicOscillator;
        assert_eq!(p.eval(-5.0, 4.0, 1.0), 0.0);
        assert!((p.eval(-5.0, 0.25, 1.0) + 3.75).abs() < 1e-12);
    }

    #[test]
    fn profile_tags_round_trip() {
        for profile in WellProfile::ALL {
            let tag: i32 = profile.into();
            assert_eq!(WellProfile::try_from(tag).unwrap(), profile);
        }
        assert!(WellProfile::try_from(4).is_err());
        assert!(WellProfile::try_from(-1).is_err());
    }

    #[test]
    fn sponge_only_absorbs_in_border() {
        let grid = Grid::new(40, 20);
        let pfield = PotentialField {
            cap_strength: 2.0,
            cap_ratio: 0.1,
            ..PotentialField::default()
        };
        assert_eq!(pfield.border_widths(&grid), (4, 2));
        let V = pfield.built(&grid);
        assert!(V.iter().all(|v| v.re == 0.0 && v.im <= 0.0));
        // outermost cells receive the full gain
        assert!((V[[0, 20]].im + 2.0).abs() < 1e-12);
        assert!((V[[10, 39]].im + 2.0).abs() < 1e-12);
        // interior untouched
        assert_eq!(V[[10, 20]].im, 0.0);
        assert_eq!(V[[2, 4]].im, 0.0);
        // ramp grows toward the edge
        assert!(V[[10, 1]].im < V[[10, 2]].im);
    }

    #[test]
    fn border_width_is_at_least_one_cell() {
        let grid = Grid::new(16, 16);
        let pfield = PotentialField { cap_ratio: 0.0, ..bare() };
        assert_eq!(pfield.border_widths(&grid), (1, 1));
        assert!(!pfield.cap_enabled());
    }
}
