//! Direct solution of tridiagonal linear systems via the Thomas algorithm.

use ndarray as nd;
use num_traits::NumAssign;
use crate::Arr1;

/// Solve `A x = d` in place for a tridiagonal `A`, overwriting `d` with `x`.
///
/// `a` is the sub-diagonal (`a[0]` is unused), `b` the main diagonal, and `c`
/// the super-diagonal (`c[n - 1]` is unused). `b` is used as scratch space and
/// is left holding the eliminated diagonal. No pivoting is performed, so `A`
/// should be diagonally dominant (or otherwise known to be non-singular under
/// plain elimination).
///
/// *Panics if `a`, `b`, or `c` are shorter than `d`*.
pub fn solve_tridiagonal<SA, SB, SC, SD, A>(
    a: &Arr1<SA>,
    b: &mut Arr1<SB>,
    c: &Arr1<SC>,
    d: &mut Arr1<SD>,
)
where
    SA: nd::Data<Elem = A>,
    SB: nd::DataMut<Elem = A>,
    SC: nd::Data<Elem = A>,
    SD: nd::DataMut<Elem = A>,
    A: NumAssign + Copy,
{
    let n = d.len();
    if n == 0 { return; }
    for i in 1..n {
        let w = a[i] / b[i - 1];
        let ci = c[i - 1];
        let di = d[i - 1];
        b[i] -= w * ci;
        d[i] -= w * di;
    }
    d[n - 1] /= b[n - 1];
    for i in (0..n - 1).rev() {
        let next = d[i + 1];
        d[i] = (d[i] - c[i] * next) / b[i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64 as C64;

    fn c(re: f64, im: f64) -> C64 { C64::new(re, im) }

    #[test]
    fn complex_3x3_known_solution() {
        let a = nd::array![c(0.0, 0.0), c(1.0, -0.5), c(0.25, 1.0)];
        let b0 = nd::array![c(4.0, 1.0), c(5.0, -2.0), c(3.0, 0.5)];
        let cc = nd::array![c(-1.0, 0.5), c(0.5, 0.5), c(0.0, 0.0)];
        let x = nd::array![c(1.0, 2.0), c(-0.5, 0.25), c(3.0, -1.0)];
        // d = A x
        let d0 = nd::array![
            b0[0] * x[0] + cc[0] * x[1],
            a[1] * x[0] + b0[1] * x[1] + cc[1] * x[2],
            a[2] * x[1] + b0[2] * x[2],
        ];
        let mut b = b0.clone();
        let mut d = d0.clone();
        solve_tridiagonal(&a, &mut b, &cc, &mut d);
        let err: f64
            = d.iter().zip(&x).map(|(dk, xk)| (dk - xk).norm()).sum();
        let scale: f64 = x.iter().map(|xk| xk.norm()).sum();
        assert!(err / scale < 1e-10, "relative error {}", err / scale);
    }

    #[test]
    fn real_poisson_system() {
        // -u'' = 1 on 7 interior points of [0, 1] with u(0) = u(1) = 0
        let n = 7;
        let h = 1.0 / (n + 1) as f64;
        let a: nd::Array1<f64> = nd::Array1::from_elem(n, -1.0);
        let mut b: nd::Array1<f64> = nd::Array1::from_elem(n, 2.0);
        let cc: nd::Array1<f64> = nd::Array1::from_elem(n, -1.0);
        let mut d: nd::Array1<f64> = nd::Array1::from_elem(n, h * h);
        solve_tridiagonal(&a, &mut b, &cc, &mut d);
        for (k, uk) in d.iter().enumerate() {
            let x = (k + 1) as f64 * h;
            let exact = 0.5 * x * (1.0 - x);
            assert!((uk - exact).abs() < 1e-12);
        }
    }

    #[test]
    fn single_equation() {
        let a = nd::array![0.0];
        let mut b = nd::array![4.0];
        let cc = nd::array![0.0];
        let mut d = nd::array![2.0];
        solve_tridiagonal(&a, &mut b, &cc, &mut d);
        assert_eq!(d[0], 0.5);
    }
}
