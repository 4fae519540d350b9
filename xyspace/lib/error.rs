//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! Note that numerical instability is *not* an error: it is reported through
//! [`StabilityDiagnostics`][crate::diagnostics::StabilityDiagnostics] so that
//! stepping never fails.
//!
//! [anyhow]: https://crates.io/crates/anyhow

use ndarray as nd;
use thiserror::Error;

/// Returned when an operation requiring equal-length arrays encounters arrays
/// with unequal length.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check<S, A, D>(a: &nd::ArrayBase<S, D>, expected: usize)
        -> Result<(), Self>
    where
        S: nd::Data<Elem = A>,
        D: nd::Dimension,
    {
        let na = a.len();
        (na == expected).then_some(()).ok_or(Self(na, expected))
    }
}

/// Returned when an integer tag does not name a
/// [`WellProfile`][crate::potential::WellProfile].
#[derive(Debug, Error)]
#[error("unknown radial well profile tag {0}; expected 0..=3")]
pub struct ProfileError(pub i32);

/// Returned from the eigenstate solver.
#[derive(Debug, Error)]
pub enum EigenError {
    /// Returned when a non-positive `tol` value is encountered.
    #[error("tolerance values must be greater than 0; got {0}")]
    BadEpsilon(f64),

    /// Returned when a zero `max_iter` or `max_basis` value is encountered.
    #[error("maxiters must be greater than 0; got {0}")]
    BadMaxiters(usize),

    /// Returned when the implicit QL iteration fails to isolate an eigenvalue
    /// of the Lanczos matrix within the allowed number of sweeps.
    #[error("eigen::tridiagonal_ql: FATAL: no convergence for eigenvalue {0}")]
    QLMaxiters(usize),
}

impl EigenError {
    pub(crate) fn check_epsilon(epsilon: f64) -> Result<(), Self> {
        (epsilon > 0.0).then_some(()).ok_or(Self::BadEpsilon(epsilon))
    }

    pub(crate) fn check_maxiters(maxiters: usize) -> Result<(), Self> {
        (maxiters != 0).then_some(()).ok_or(Self::BadMaxiters(maxiters))
    }
}

/// Returned from scene persistence functions.
#[derive(Debug, Error)]
pub enum SceneError {
    /// [`std::io::Error`]
    #[error("scene io error: {0}")]
    Io(#[from] std::io::Error),

    /// [`serde_json::Error`]
    #[error("scene json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Returned when a string does not name a
/// [`Preset`][crate::presets::Preset].
#[derive(Debug, Error)]
#[error("unknown preset '{0}'")]
pub struct PresetError(pub String);
