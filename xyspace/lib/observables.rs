//! Integrals and expectation values of wavefunctions sampled over a grid.
//!
//! All integrals use the rectangle rule `∑ f · dx dy` over cell centers.

use std::f64::consts::TAU;
use ndarray as nd;
use num_complex::Complex64 as C64;
use rustfft as fft;
use crate::{ Arr2, grid::Grid };

/// Masses below this are treated as zero when renormalizing.
pub const MIN_RENORM_MASS: f64 = 1e-12;

/// Calculate the mass `∑ |ψ|² dx dy` of a wavefunction.
pub fn wf_mass<S>(q: &Arr2<S>, grid: &Grid) -> f64
where S: nd::Data<Elem = C64>
{
    q.iter().map(|qk| qk.norm_sqr()).sum::<f64>() * grid.cell_area()
}

/// Calculate the mass contained in the half-open cell ranges `xs` × `ys`.
pub fn wf_region_mass<S>(
    q: &Arr2<S>,
    grid: &Grid,
    xs: std::ops::Range<usize>,
    ys: std::ops::Range<usize>,
) -> f64
where S: nd::Data<Elem = C64>
{
    q.slice(nd::s![ys, xs]).iter()
        .map(|qk| qk.norm_sqr())
        .sum::<f64>() * grid.cell_area()
}

/// Split the mass of a wavefunction by the vertical midline of the grid,
/// returning `(left, right)`.
///
/// The midline cell index is `nx / 2`; that column counts toward the right.
pub fn wf_mass_split<S>(q: &Arr2<S>, grid: &Grid) -> (f64, f64)
where S: nd::Data<Elem = C64>
{
    let mid = grid.nx / 2;
    let left = wf_region_mass(q, grid, 0..mid, 0..grid.ny);
    let right = wf_region_mass(q, grid, mid..grid.nx, 0..grid.ny);
    (left, right)
}

/// Returns `true` if every value in the wavefunction is finite.
pub fn wf_is_finite<S>(q: &Arr2<S>) -> bool
where S: nd::Data<Elem = C64>
{
    q.iter().all(|qk| qk.re.is_finite() && qk.im.is_finite())
}

/// Renormalize a wavefunction in place to unit mass.
///
/// Returns `false` and leaves `q` untouched if its mass is not above
/// [`MIN_RENORM_MASS`].
pub fn wf_renormalize<S>(q: &mut Arr2<S>, grid: &Grid) -> bool
where S: nd::DataMut<Elem = C64>
{
    let mass = wf_mass(q, grid);
    if !(mass > MIN_RENORM_MASS) { return false; }
    let scale = mass.sqrt().recip();
    q.map_inplace(|qk| { *qk *= scale; });
    true
}

/// Compute the position expectation values `(⟨x⟩, ⟨y⟩)`.
///
/// Returns `None` for a wavefunction with zero mass.
pub fn expectation_position<S>(q: &Arr2<S>, grid: &Grid) -> Option<(f64, f64)>
where S: nd::Data<Elem = C64>
{
    let (mut m, mut mx, mut my) = (0.0, 0.0, 0.0);
    nd::Zip::indexed(q)
        .for_each(|(j, i), qk| {
            let p = qk.norm_sqr();
            let (x, y) = grid.cell_center(i, j);
            m += p;
            mx += p * x;
            my += p * y;
        });
    (m > 0.0).then(|| (mx / m, my / m))
}

/// Generate an array of angular wavenumbers to accompany a FFT of `n` points
/// with spacing `dx`, in FFT order (non-negative wavenumbers first).
pub fn fft_wavenumbers(n: usize, dx: f64) -> nd::Array1<f64> {
    let dk = TAU / (n as f64 * dx);
    let m = if n % 2 == 0 { n / 2 } else { (n + 1) / 2 };
    (0..n)
        .map(|i| if i < m { i as f64 * dk } else { -((n - i) as f64) * dk })
        .collect()
}

/// Perform the two-dimensional, complex-valued FFT in place.
pub fn fft2_inplace<S>(f: &mut Arr2<S>)
where S: nd::DataMut<Elem = C64>
{
    let (ny, nx) = f.dim();
    let mut plan = fft::FftPlanner::new();
    let fft_x = plan.plan_fft_forward(nx);
    let fft_y = plan.plan_fft_forward(ny);
    let mut buf: Vec<C64> = Vec::with_capacity(nx.max(ny));
    for mut row in f.rows_mut() {
        buf.clear();
        buf.extend(row.iter());
        fft_x.process(&mut buf);
        row.iter_mut().zip(&buf).for_each(|(rk, bk)| { *rk = *bk; });
    }
    for mut col in f.columns_mut() {
        buf.clear();
        buf.extend(col.iter());
        fft_y.process(&mut buf);
        col.iter_mut().zip(&buf).for_each(|(ck, bk)| { *ck = *bk; });
    }
}

/// Momentum-space probability density of a wavefunction.
#[derive(Clone, Debug)]
pub struct MomentumDensity {
    /// `|ψ̃(kx, ky)|²` normalized to unit sum, shape `(ny, nx)` in FFT order.
    pub density: nd::Array2<f64>,
    /// Angular wavenumbers along x.
    pub kx: nd::Array1<f64>,
    /// Angular wavenumbers along y.
    pub ky: nd::Array1<f64>,
}

impl MomentumDensity {
    /// Compute the momentum-space density via a 2D FFT.
    ///
    /// Returns `None` for a wavefunction with zero mass.
    pub fn compute<S>(q: &Arr2<S>, grid: &Grid) -> Option<Self>
    where S: nd::Data<Elem = C64>
    {
        let mut qt = q.to_owned();
        fft2_inplace(&mut qt);
        let mut density = qt.mapv(|z| z.norm_sqr());
        let total = density.sum();
        if !(total > 0.0) { return None; }
        density /= total;
        Some(Self {
            density,
            kx: fft_wavenumbers(grid.nx, grid.dx),
            ky: fft_wavenumbers(grid.ny, grid.dy),
        })
    }

    /// Expectation values `(⟨kx⟩, ⟨ky⟩)`.
    pub fn expectation(&self) -> (f64, f64) {
        let mut kx = 0.0;
        let mut ky = 0.0;
        nd::Zip::indexed(&self.density)
            .for_each(|(j, i), p| {
                kx += p * self.kx[i];
                ky += p * self.ky[j];
            });
        (kx, ky)
    }
}

/// Summary of mass-like quantities used by the stability monitor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MassReport {
    pub total: f64,
    pub interior: f64,
    pub left: f64,
    pub right: f64,
    /// Fraction of cells counted as interior.
    pub interior_area_fraction: f64,
    /// `true` if the interior region was degenerate and the whole grid was
    /// used in its place.
    pub interior_fallback: bool,
    pub finite: bool,
}

impl MassReport {
    /// Measure a wavefunction, taking the interior to be the cells strictly
    /// inside a border band of `(wx, wy)` cells.
    pub fn measure<S>(q: &Arr2<S>, grid: &Grid, border: (usize, usize)) -> Self
    where S: nd::Data<Elem = C64>
    {
        let (xs, ys, fallback) = interior_ranges(grid, border);
        let interior_cells = xs.len() * ys.len();
        let (left, right) = wf_mass_split(q, grid);
        Self {
            total: wf_mass(q, grid),
            interior: wf_region_mass(q, grid, xs, ys),
            left,
            right,
            interior_area_fraction: interior_cells as f64 / grid.len() as f64,
            interior_fallback: fallback,
            finite: wf_is_finite(q),
        }
    }
}

/// Cell ranges `(xs, ys, fallback)` strictly inside a border of `(wx, wy)`
/// cells, or the whole grid with `fallback = true` if that region is empty.
pub fn interior_ranges(grid: &Grid, (wx, wy): (usize, usize))
    -> (std::ops::Range<usize>, std::ops::Range<usize>, bool)
{
    if 2 * wx >= grid.nx || 2 * wy >= grid.ny {
        (0..grid.nx, 0..grid.ny, true)
    } else {
        (wx..grid.nx - wx, wy..grid.ny - wy, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(grid: &Grid, cx: f64, cy: f64, kx: f64, ky: f64)
        -> nd::Array2<C64>
    {
        nd::Array2::from_shape_fn(grid.shape(), |(j, i)| {
            let (x, y) = grid.cell_center(i, j);
            let r2 = (x - cx).powi(2) + (y - cy).powi(2);
            C64::cis(kx * x + ky * y) * (-0.5 * r2 / 0.05_f64.powi(2)).exp()
        })
    }

    #[test]
    fn renormalize_guards_zero_mass() {
        let grid = Grid::new(16, 16);
        let mut q: nd::Array2<C64> = nd::Array2::zeros(grid.shape());
        assert!(!wf_renormalize(&mut q, &grid));
        let mut q = packet(&grid, 0.5, 0.5, 0.0, 0.0);
        assert!(wf_renormalize(&mut q, &grid));
        assert!((wf_mass(&q, &grid) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn split_and_region_masses_add_up() {
        let grid = Grid::new(30, 20);
        let q = packet(&grid, 0.7, 0.4, 3.0, 0.0);
        let (l, r) = wf_mass_split(&q, &grid);
        let m = wf_mass(&q, &grid);
        assert!(((l + r) - m).abs() < 1e-12 * m);
        assert!(r > l);
        let report = MassReport::measure(&q, &grid, (3, 2));
        assert!(report.interior < report.total);
        assert!(!report.interior_fallback);
        assert!((report.interior_area_fraction - (24.0 * 16.0) / 600.0).abs() < 1e-12);
        assert!(report.finite);
    }

    #[test]
    fn interior_ranges_strip_border() {
        let grid = Grid::new(30, 20);
        assert_eq!(interior_ranges(&grid, (3, 2)), (3..27, 2..18, false));
        assert_eq!(interior_ranges(&grid, (15, 2)), (0..30, 0..20, true));
    }

    #[test]
    fn degenerate_interior_falls_back_to_grid() {
        let grid = Grid::new(8, 8);
        let q = packet(&grid, 0.5, 0.5, 0.0, 0.0);
        let report = MassReport::measure(&q, &grid, (4, 1));
        assert!(report.interior_fallback);
        assert_eq!(report.interior, report.total);
    }

    #[test]
    fn detects_non_finite_values() {
        let grid = Grid::new(8, 8);
        let mut q = packet(&grid, 0.5, 0.5, 0.0, 0.0);
        assert!(wf_is_finite(&q));
        q[[3, 3]] = C64::new(0.0, f64::INFINITY);
        assert!(!wf_is_finite(&q));
    }

    #[test]
    fn wavenumbers_in_fft_order() {
        let k = fft_wavenumbers(4, 0.25);
        let expected = [0.0, TAU, -2.0 * TAU, -TAU];
        assert!(k.iter().zip(expected).all(|(a, b)| (a - b).abs() < 1e-12));
    }

    #[test]
    fn packet_expectations() {
        let grid = Grid::new(64, 64);
        let q = packet(&grid, 0.4, 0.6, 20.0, -12.0);
        let (x, y) = expectation_position(&q, &grid).unwrap();
        assert!((x - 0.4).abs() < 1e-6 && (y - 0.6).abs() < 1e-6);
        let (kx, ky)
            = MomentumDensity::compute(&q, &grid).unwrap().expectation();
        assert!((kx - 20.0).abs() < 0.2, "kx = {kx}");
        assert!((ky + 12.0).abs() < 0.2, "ky = {ky}");
    }
}
