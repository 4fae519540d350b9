//! Lowest eigenstates of the real, hard-walled Hamiltonian
//! ```text
//! H = -½ ∇² + Re(V)
//! ```
//! on a 2D grid, via Lanczos iteration on the five-point discretization.
//!
//! The full Hamiltonian matrix is never stored; its action on a vector is
//! computed on the fly. The Krylov basis is kept (for reorthogonalization and
//! eigenvector reconstruction), so memory use grows as `max_basis · nx · ny`.
//! See [`docs`][crate::docs#eigenstates].

use std::cmp;
use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    Arr2,
    error::EigenError,
    grid::Grid,
    DEF_EPSILON,
    DEF_MAXBASIS,
    DEF_MAXITERS,
};

pub type EResult<T> = Result<T, EigenError>;

/// Maximum number of implicit QL sweeps spent on a single eigenvalue.
pub const QL_MAXITERS: usize = 60;

/// Reconstructed vectors with norms below this are discarded.
pub const MIN_MODE_NORM: f64 = 1e-12;

// every SEED_STRIDE-th cell of the starting vector is populated
const SEED_STRIDE: usize = 7;
const GOLDEN: f64 = 0.618033988749895;

/// A single eigenpair of the grid Hamiltonian.
///
/// The eigenvector is real, has shape `(ny, nx)`, and is normalized so that
/// `∑ wf² dx dy = 1`.
#[derive(Clone, Debug)]
pub struct EigenState {
    /// Energy
    pub energy: f64,
    /// Eigenvector
    pub wf: nd::Array2<f64>,
}

impl EigenState {
    /// Compare two `EigenState`s by their energy.
    pub fn cmp_energy(&self, other: &Self) -> Option<cmp::Ordering> {
        self.energy.partial_cmp(&other.energy)
    }

    /// Promote the eigenvector to a complex wavefunction.
    pub fn to_complex(&self) -> nd::Array2<C64> { self.wf.mapv(C64::from) }
}

/// Parameters for [`lanczos_lowest`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LanczosParams {
    /// Number of eigenstates requested.
    pub modes: usize,
    /// Maximum size of the Krylov basis.
    pub max_basis: usize,
    /// Maximum number of Lanczos iterations.
    pub max_iter: usize,
    /// Residual norm below which the Krylov space is taken to be invariant.
    pub tol: f64,
}

impl LanczosParams {
    /// Default basis, iteration, and tolerance settings for `modes` states.
    pub fn new(modes: usize) -> Self {
        Self {
            modes,
            max_basis: DEF_MAXBASIS,
            max_iter: DEF_MAXITERS,
            tol: DEF_EPSILON,
        }
    }
}

// discrete inner product ⟨a, b⟩ = ∑ a b dx dy
fn wdot(grid: &Grid, a: &nd::Array2<f64>, b: &nd::Array2<f64>) -> f64 {
    nd::Zip::from(a).and(b)
        .fold(0.0, |acc, &ak, &bk| acc + ak * bk) * grid.cell_area()
}

fn wnorm(grid: &Grid, a: &nd::Array2<f64>) -> f64 { wdot(grid, a, a).sqrt() }

/// Compute the action of `H = -½ ∇² + Vr` on `v`, writing the result to
/// `out`.
///
/// The Laplacian is the five-point stencil with zero values outside the grid.
///
/// *Panics if `Vr`, `v`, and `out` do not all have shape `grid.shape()`*.
pub fn apply_hamiltonian<S, T>(
    grid: &Grid,
    Vr: &Arr2<S>,
    v: &Arr2<T>,
    out: &mut nd::Array2<f64>,
)
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    let (ny, nx) = grid.shape();
    let c = -0.5 / (grid.dx * grid.dy);
    nd::Zip::from(&mut *out).and(v).and(Vr)
        .for_each(|ok, &vk, &Vk| { *ok = (Vk - 4.0 * c) * vk; });
    out.slice_mut(nd::s![1.., ..]).scaled_add(c, &v.slice(nd::s![..ny - 1, ..]));
    out.slice_mut(nd::s![..ny - 1, ..]).scaled_add(c, &v.slice(nd::s![1.., ..]));
    out.slice_mut(nd::s![.., 1..]).scaled_add(c, &v.slice(nd::s![.., ..nx - 1]));
    out.slice_mut(nd::s![.., ..nx - 1]).scaled_add(c, &v.slice(nd::s![.., 1..]));
}

// fixed, sparse, symmetry-breaking starting vector
fn seed_vector(grid: &Grid) -> nd::Array2<f64> {
    let mut q: nd::Array2<f64> = nd::Array2::zeros(grid.shape());
    q.iter_mut().enumerate()
        .filter(|(k, _)| k % SEED_STRIDE == 0)
        .for_each(|(k, qk)| { *qk = ((k as f64 + 1.0) * GOLDEN).fract() - 0.5; });
    q
}

/// Diagonalize a real symmetric tridiagonal matrix in place via implicit-shift
/// QL iteration.
///
/// On entry, `d` holds the diagonal and `e[i]` the off-diagonal element
/// coupling rows `i` and `i + 1` (`e[n - 1]` is ignored); `z` should be the
/// identity (or any orthogonal matrix to be transformed). On exit, `d` holds
/// the (unsorted) eigenvalues, `e` is destroyed, and column `k` of `z` holds
/// the eigenvector belonging to `d[k]`.
///
/// *Panics if `e` is shorter than `d` or `z` has fewer than `d.len()` columns*.
pub fn tridiagonal_ql(
    d: &mut [f64],
    e: &mut [f64],
    z: &mut nd::Array2<f64>,
) -> EResult<()>
{
    let n = d.len();
    if n == 0 { return Ok(()); }
    e[n - 1] = 0.0;
    for l in 0..n {
        let mut iter: usize = 0;
        loop {
            // look for a single small off-diagonal element to split the matrix
            let mut m = l;
            while m + 1 < n {
                let dd = d[m].abs() + d[m + 1].abs();
                if e[m].abs() <= f64::EPSILON * dd { break; }
                m += 1;
            }
            if m == l { break; }
            iter += 1;
            if iter > QL_MAXITERS { return Err(EigenError::QLMaxiters(l)); }

            let mut g = (d[l + 1] - d[l]) / (2.0 * e[l]);
            let mut r = g.hypot(1.0);
            g = d[m] - d[l] + e[l] / (g + r.copysign(g));
            let (mut s, mut c, mut p) = (1.0, 1.0, 0.0);
            let mut underflow = false;
            let mut i = m;
            while i > l {
                i -= 1;
                let f = s * e[i];
                let b = c * e[i];
                r = f.hypot(g);
                e[i + 1] = r;
                if r == 0.0 {
                    d[i + 1] -= p;
                    e[m] = 0.0;
                    underflow = true;
                    break;
                }
                s = f / r;
                c = g / r;
                g = d[i + 1] - p;
                r = (d[i] - g) * s + 2.0 * c * b;
                p = s * r;
                d[i + 1] = g + p;
                g = c * r - b;
                // accumulate the Givens rotation into the eigenvectors
                let (mut zi, mut zi1)
                    = z.multi_slice_mut((nd::s![.., i], nd::s![.., i + 1]));
                nd::Zip::from(&mut zi).and(&mut zi1)
                    .for_each(|zk, zk1| {
                        let f = *zk1;
                        *zk1 = s * *zk + c * f;
                        *zk = c * *zk - s * f;
                    });
            }
            if underflow { continue; }
            d[l] -= p;
            e[l] = g;
            e[m] = 0.0;
        }
    }
    Ok(())
}

/// Find up to `params.modes` lowest-energy eigenstates of `-½ ∇² + Re(V)` with
/// hard-wall boundary conditions, sorted by ascending energy.
///
/// The Lanczos recurrence starts from a fixed seed (so results are
/// reproducible), is fully reorthogonalized against the stored basis, and
/// stops early if the residual norm drops below `params.tol`. Ritz vectors with
/// vanishing norm are skipped, so fewer than `modes` states may be returned;
/// an empty list is returned if the basis collapses immediately.
pub fn lanczos_lowest<S>(grid: &Grid, V: &Arr2<S>, params: LanczosParams)
    -> EResult<Vec<EigenState>>
where S: nd::Data<Elem = C64>
{
    EigenError::check_epsilon(params.tol)?;
    EigenError::check_maxiters(params.max_iter)?;
    EigenError::check_maxiters(params.max_basis)?;
    if params.modes == 0 { return Ok(Vec::new()); }

    let Vr: nd::Array2<f64> = V.mapv(|Vk| Vk.re);
    let m = params.max_basis.min(params.max_iter).min(grid.len());

    let mut q = seed_vector(grid);
    let qnorm = wnorm(grid, &q);
    if !(qnorm > MIN_MODE_NORM) { return Ok(Vec::new()); }
    q /= qnorm;

    let mut basis: Vec<nd::Array2<f64>> = Vec::with_capacity(m);
    let mut alpha: Vec<f64> = Vec::with_capacity(m);
    let mut beta: Vec<f64> = Vec::with_capacity(m);
    basis.push(q);
    let mut w: nd::Array2<f64> = nd::Array2::zeros(grid.shape());
    for j in 0..m {
        apply_hamiltonian(grid, &Vr, &basis[j], &mut w);
        let a = wdot(grid, &basis[j], &w);
        alpha.push(a);
        w.scaled_add(-a, &basis[j]);
        if j > 0 { w.scaled_add(-beta[j - 1], &basis[j - 1]); }
        for qi in basis.iter() {
            let overlap = wdot(grid, qi, &w);
            w.scaled_add(-overlap, qi);
        }
        let b = wnorm(grid, &w);
        if j + 1 == m { break; }
        if b < params.tol {
            debug!(iter = j + 1, residual = b, "lanczos: invariant subspace found");
            break;
        }
        beta.push(b);
        basis.push(&w / b);
    }
    let k = alpha.len();
    debug!(basis = k, modes = params.modes, "lanczos: diagonalizing");

    let mut d = alpha;
    let mut e = beta;
    e.resize(k, 0.0);
    let mut z: nd::Array2<f64> = nd::Array2::eye(k);
    tridiagonal_ql(&mut d, &mut e, &mut z)?;

    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| d[a].total_cmp(&d[b]));
    let states: Vec<EigenState>
        = order.into_iter()
        .take(params.modes.min(k))
        .filter_map(|idx| {
            let mut wf: nd::Array2<f64> = nd::Array2::zeros(grid.shape());
            basis.iter().zip(z.column(idx))
                .for_each(|(qj, &zj)| { wf.scaled_add(zj, qj); });
            let norm = wnorm(grid, &wf);
            (norm >= MIN_MODE_NORM).then(|| {
                wf /= norm;
                EigenState { energy: d[idx], wf }
            })
        })
        .collect();
    Ok(states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn ql_recovers_chain_spectrum() {
        let n = 12;
        let mut d = vec![2.0; n];
        let mut e = vec![-1.0; n];
        let mut z: nd::Array2<f64> = nd::Array2::eye(n);
        tridiagonal_ql(&mut d, &mut e, &mut z).unwrap();
        let mut sorted = d.clone();
        sorted.sort_by(f64::total_cmp);
        for (k, lam) in sorted.iter().enumerate() {
            let exact = 2.0 - 2.0 * (((k + 1) as f64) * PI / (n + 1) as f64).cos();
            assert!((lam - exact).abs() < 1e-12);
        }
        // columns of z are eigenvectors of the original matrix
        for (k, &lam) in d.iter().enumerate() {
            let v = z.column(k);
            for i in 0..n {
                let left = if i > 0 { -v[i - 1] } else { 0.0 };
                let right = if i + 1 < n { -v[i + 1] } else { 0.0 };
                let tv = 2.0 * v[i] + left + right;
                assert!((tv - lam * v[i]).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn ql_trivial_sizes() {
        let mut d: Vec<f64> = Vec::new();
        let mut e: Vec<f64> = Vec::new();
        let mut z: nd::Array2<f64> = nd::Array2::eye(0);
        assert!(tridiagonal_ql(&mut d, &mut e, &mut z).is_ok());
        let mut d = vec![3.5];
        let mut e = vec![0.0];
        let mut z: nd::Array2<f64> = nd::Array2::eye(1);
        tridiagonal_ql(&mut d, &mut e, &mut z).unwrap();
        assert_eq!(d[0], 3.5);
    }

    fn box_energy(grid: &Grid, p: usize, q: usize) -> f64 {
        let h2 = grid.dx * grid.dy;
        let ex = 1.0 - (p as f64 * PI / (grid.nx + 1) as f64).cos();
        let ey = 1.0 - (q as f64 * PI / (grid.ny + 1) as f64).cos();
        (ex + ey) / h2
    }

    #[test]
    fn free_box_spectrum() {
        let grid = Grid::new(16, 16);
        let V: nd::Array2<C64> = nd::Array2::zeros(grid.shape());
        let params = LanczosParams { max_basis: 120, ..LanczosParams::new(3) };
        let states = lanczos_lowest(&grid, &V, params).unwrap();
        assert_eq!(states.len(), 3);
        let e11 = box_energy(&grid, 1, 1);
        let e12 = box_energy(&grid, 1, 2);
        assert!((states[0].energy - e11).abs() < 1e-6 * e11);
        assert!((states[1].energy - e12).abs() < 1e-6 * e12);
        assert!(states.windows(2).all(|w| w[0].energy <= w[1].energy));

        // ground state: normalized, and an eigenvector
        let gs = &states[0];
        assert!((wnorm(&grid, &gs.wf) - 1.0).abs() < 1e-12);
        let mut hv: nd::Array2<f64> = nd::Array2::zeros(grid.shape());
        apply_hamiltonian(&grid, &V.mapv(|z| z.re), &gs.wf, &mut hv);
        hv.scaled_add(-gs.energy, &gs.wf);
        assert!(wnorm(&grid, &hv) < 1e-5 * gs.energy);
    }

    #[test]
    fn invariant_subspace_stops_early() {
        // the Krylov space of the seed is smaller than the grid
        let grid = Grid::new(8, 8);
        let V: nd::Array2<C64> = nd::Array2::zeros(grid.shape());
        let Vr = V.mapv(|z| z.re);
        let params = LanczosParams {
            modes: grid.len(),
            max_basis: 120,
            max_iter: 200,
            tol: 1e-8,
        };
        let states = lanczos_lowest(&grid, &V, params).unwrap();
        assert!(!states.is_empty());
        assert!(states.len() < grid.len(), "{} states", states.len());
        assert!(states.windows(2).all(|w| w[0].energy <= w[1].energy));
        let mut hv: nd::Array2<f64> = nd::Array2::zeros(grid.shape());
        for s in states.iter() {
            assert!((wnorm(&grid, &s.wf) - 1.0).abs() < 1e-10);
            apply_hamiltonian(&grid, &Vr, &s.wf, &mut hv);
            hv.scaled_add(-s.energy, &s.wf);
            let residual = wnorm(&grid, &hv);
            assert!(
                residual < 1e-8 * s.energy.abs().max(1.0),
                "E = {}: residual {residual:e}", s.energy,
            );
        }
    }

    #[test]
    fn potential_offset_shifts_energies() {
        let grid = Grid::new(12, 10);
        let V0: nd::Array2<C64> = nd::Array2::zeros(grid.shape());
        let V1: nd::Array2<C64>
            = nd::Array2::from_elem(grid.shape(), C64::new(25.0, -3.0));
        let params = LanczosParams { max_basis: 120, ..LanczosParams::new(2) };
        let s0 = lanczos_lowest(&grid, &V0, params).unwrap();
        let s1 = lanczos_lowest(&grid, &V1, params).unwrap();
        // only the real part of the potential enters
        assert!((s1[0].energy - s0[0].energy - 25.0).abs() < 1e-6);
    }

    #[test]
    fn parameter_validation() {
        let grid = Grid::new(8, 8);
        let V: nd::Array2<C64> = nd::Array2::zeros(grid.shape());
        let bad_tol = LanczosParams { tol: 0.0, ..LanczosParams::new(1) };
        assert!(matches!(
            lanczos_lowest(&grid, &V, bad_tol),
            Err(EigenError::BadEpsilon(_))
        ));
        let bad_iter = LanczosParams { max_iter: 0, ..LanczosParams::new(1) };
        assert!(matches!(
            lanczos_lowest(&grid, &V, bad_iter),
            Err(EigenError::BadMaxiters(0))
        ));
        let none = lanczos_lowest(&grid, &V, LanczosParams::new(0)).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn seed_is_deterministic_and_sparse() {
        let grid = Grid::new(10, 9);
        let a = seed_vector(&grid);
        let b = seed_vector(&grid);
        assert_eq!(a, b);
        let nonzero = a.iter().filter(|x| **x != 0.0).count();
        assert!(nonzero <= (grid.len() + SEED_STRIDE - 1) / SEED_STRIDE);
        assert!(nonzero > 0);
    }
}
