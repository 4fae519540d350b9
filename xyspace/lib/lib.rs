#![allow(dead_code, non_snake_case)]

//! Provides a numerical engine for a single quantum particle in two
//! dimensions: time evolution under the time-dependent Schrödinger equation on
//! a rectangular grid, and extraction of the lowest-energy stationary states of
//! the same system.
//!
//! Provides implementations for the following numerical routines:
//! - Time-dependent:
//!     - Crank-Nicolson alternating-direction implicit (ADI) integrator with
//!       Strang-split complex potential
//!     - Thomas algorithm for tridiagonal systems
//!     - Mass-drift stability monitoring
//! - Time-independent:
//!     - Lanczos iteration with full reorthogonalization
//!     - Implicit-shift QL diagonalization of symmetric tridiagonal matrices
//!
//! Potentials are built from rectangular boxes, radial wells, and a complex
//! absorbing sponge along the domain edges. Setups can be stored as JSON
//! [`scene`]s or loaded from a set of [`presets`].
//!
//! ```
//! use xyspace::{
//!     potential::{ PotentialBox, RadialWell, WellProfile },
//!     simulation::{ Packet, Simulation },
//! };
//!
//! let mut sim = Simulation::with_size(64, 48);
//! sim.add_box(PotentialBox::new(0.48, 0.0, 0.52, 1.0, 2400.0));
//! sim.add_well(RadialWell::new(0.75, 0.5, -2000.0, 0.08, WellProfile::Gaussian));
//! sim.add_packet(Packet::new(0.25, 0.5, 0.05, 1.0, 24.0, 0.0));
//! sim.running = true;
//! sim.step_n(20);
//! let (left, right) = sim.mass_split();
//! assert!(left > right);
//! assert!(sim.mass() <= sim.diagnostics.initial_mass * (1.0 + 1e-12));
//!
//! let states = sim.compute_eigenstates(2, 64, 64, 1e-8).unwrap();
//! assert!(states[0].energy < 0.0);
//! ```
//!
//! See [`docs`] for theoretical background.

pub mod error;
pub mod grid;
pub mod potential;
pub mod tridiag;
pub mod timedep;
pub mod observables;
pub mod diagnostics;
pub mod eigen;
pub mod simulation;
pub mod scene;
pub mod presets;

pub mod docs;

pub(crate) const DEF_EPSILON: f64 = 1e-10;
pub(crate) const DEF_MAXITERS: usize = 200;
pub(crate) const DEF_MAXBASIS: usize = 120;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;
