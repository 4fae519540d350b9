//! The top-level owner of all simulation state.
//!
//! A [`Simulation`] holds the grid geometry, the wavefunction and potential
//! arrays, the potential and packet definitions, the integrator, and the
//! stability monitor. Every mutator leaves `psi` and `V` valid and consistent
//! with `grid` when it returns.
//!
//! ```
//! use xyspace::simulation::{ Packet, Simulation };
//!
//! let mut sim = Simulation::with_size(48, 48);
//! sim.pfield.cap_strength = 0.0;
//! sim.rebuild_potential();
//! sim.add_packet(Packet::new(0.5, 0.5, 0.06, 1.0, 10.0, 0.0));
//! let m0 = sim.mass();
//! sim.step_n(10);
//! assert!(((sim.mass() - m0) / m0).abs() < 1e-9);
//! assert!(!sim.diagnostics.unstable());
//! ```

use ndarray as nd;
use num_complex::Complex64 as C64;
use serde::{ Deserialize, Serialize };
use tracing::debug;
use crate::{
    error::LengthError,
    grid::Grid,
    potential::{ PotentialBox, PotentialField, RadialWell },
    timedep::CrankNicolsonADI,
    observables::{
        self,
        MassReport,
        MomentumDensity,
    },
    diagnostics::{ StabilityConfig, StabilityDiagnostics },
    eigen::{ self, EResult, EigenState, LanczosParams },
};

/// Default time step.
pub const DEF_DT: f64 = 1e-4;

/// Lower bound on the physical width of an injected packet.
pub const MIN_PACKET_SIGMA: f64 = 1e-12;

/// Gaussian wave packet source.
///
/// The center is given in normalized domain coordinates and the width relative
/// to the shorter side of the domain; the wavevector is in physical units.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub cx: f64,
    pub cy: f64,
    pub sigma: f64,
    pub amplitude: f64,
    pub kx: f64,
    pub ky: f64,
}

impl Packet {
    pub fn new(cx: f64, cy: f64, sigma: f64, amplitude: f64, kx: f64, ky: f64)
        -> Self
    {
        Self { cx, cy, sigma, amplitude, kx, ky }
    }

    /// Add the packet to `psi` in place.
    ///
    /// *Panics if `psi` does not have shape `grid.shape()`*.
    pub fn add_to(&self, grid: &Grid, psi: &mut nd::Array2<C64>) {
        assert_eq!(psi.dim(), grid.shape(), "wavefunction does not match grid");
        let sigma = (self.sigma * grid.min_length()).max(MIN_PACKET_SIGMA);
        let cx = self.cx * grid.lx;
        let cy = self.cy * grid.ly;
        nd::Zip::indexed(psi)
            .for_each(|(j, i), q| {
                let (x, y) = grid.cell_center(i, j);
                let (ddx, ddy) = (x - cx, y - cy);
                let envelope
                    = self.amplitude
                    * (-0.5 * (ddx * ddx + ddy * ddy) / (sigma * sigma)).exp();
                *q += C64::cis(self.kx * ddx + self.ky * ddy) * envelope;
            });
    }
}

/// Grid state, potential and packet definitions, integrator, and stability
/// monitor for a single 2D system.
#[derive(Clone, Debug)]
pub struct Simulation {
    /// Geometry; change only through [`Self::resize`].
    pub grid: Grid,
    /// Time step.
    pub dt: f64,
    /// Playback flag, cleared by the stability monitor when
    /// `stability.auto_pause_on_instability` is set.
    pub running: bool,
    /// Wavefunction, shape `(ny, nx)`.
    pub psi: nd::Array2<C64>,
    /// Potential, shape `(ny, nx)`; rebuilt wholesale from `pfield`.
    pub V: nd::Array2<C64>,
    pub pfield: PotentialField,
    /// Sources used by [`Self::reset`] to regenerate `psi`.
    pub packets: Vec<Packet>,
    pub stability: StabilityConfig,
    pub diagnostics: StabilityDiagnostics,
    solver: CrankNicolsonADI,
}

impl Default for Simulation {
    fn default() -> Self { Self::new() }
}

impl Simulation {
    /// Create a new simulation on the default 372 × 300 grid.
    pub fn new() -> Self {
        let grid = Grid::default();
        Self::with_size(grid.nx, grid.ny)
    }

    /// Create a new, empty simulation on an `nx` × `ny` grid (each raised to
    /// at least [`MIN_CELLS`][crate::grid::MIN_CELLS]).
    pub fn with_size(nx: usize, ny: usize) -> Self {
        let mut sim = Self {
            grid: Grid::new(nx, ny),
            dt: DEF_DT,
            running: false,
            psi: nd::Array2::zeros((0, 0)),
            V: nd::Array2::zeros((0, 0)),
            pfield: PotentialField::default(),
            packets: Vec::new(),
            stability: StabilityConfig::default(),
            diagnostics: StabilityDiagnostics::default(),
            solver: CrankNicolsonADI::new(),
        };
        sim.resize(nx, ny);
        sim
    }

    /// Change the grid dimensions, reallocating all grid-sized arrays, then
    /// rebuild the potential and reset.
    pub fn resize(&mut self, nx: usize, ny: usize) {
        self.grid = Grid::new(nx, ny);
        debug!(nx = self.grid.nx, ny = self.grid.ny, "resize grid");
        self.psi = nd::Array2::zeros(self.grid.shape());
        self.V = nd::Array2::zeros(self.grid.shape());
        self.reset();
    }

    /// Rebuild the potential, regenerate `psi` from the packet list, and
    /// re-baseline the diagnostics.
    ///
    /// Deterministic: identical definitions always give identical `psi`.
    pub fn reset(&mut self) {
        self.rebuild_potential();
        self.psi.fill(C64::from(0.0));
        for packet in self.packets.iter() {
            packet.add_to(&self.grid, &mut self.psi);
        }
        self.refresh_diagnostics_baseline();
    }

    /// Zero the wavefunction and re-baseline, leaving the packet list alone.
    pub fn clear_psi(&mut self) {
        self.psi.fill(C64::from(0.0));
        self.refresh_diagnostics_baseline();
    }

    /// Add a packet to the current wavefunction without recording it.
    pub fn inject_gaussian(&mut self, packet: &Packet) {
        packet.add_to(&self.grid, &mut self.psi);
    }

    /// Record a packet, add it to the current wavefunction, and re-baseline.
    pub fn add_packet(&mut self, packet: Packet) {
        self.inject_gaussian(&packet);
        self.packets.push(packet);
        self.refresh_diagnostics_baseline();
    }

    /// Record a box and rebuild the potential; `psi` is untouched.
    pub fn add_box(&mut self, pbox: PotentialBox) {
        self.pfield.boxes.push(pbox);
        self.rebuild_potential();
    }

    /// Record a radial well and rebuild the potential; `psi` is untouched.
    pub fn add_well(&mut self, well: RadialWell) {
        self.pfield.wells.push(well);
        self.rebuild_potential();
    }

    /// Rebuild `V` from `pfield`, e.g. after editing its fields directly.
    pub fn rebuild_potential(&mut self) {
        self.pfield.build(&self.grid, &mut self.V);
    }

    /// Advance by a single time step and evaluate stability.
    pub fn step(&mut self) {
        self.solver.step(&self.grid, self.dt, &self.V, &mut self.psi);
        let report = self.mass_report();
        self.diagnostics.update(
            &report, &self.stability, self.pfield.cap_enabled(), true);
        if self.diagnostics.unstable()
            && self.stability.auto_pause_on_instability
            && self.running
        {
            self.running = false;
        }
    }

    /// Advance by `n` time steps.
    pub fn step_n(&mut self, n: usize) {
        (0..n).for_each(|_| self.step());
    }

    /// Measure all mass-like quantities of the current wavefunction.
    pub fn mass_report(&self) -> MassReport {
        MassReport::measure(
            &self.psi, &self.grid, self.pfield.border_widths(&self.grid))
    }

    /// Total mass `∑ |ψ|² dx dy`.
    pub fn mass(&self) -> f64 { observables::wf_mass(&self.psi, &self.grid) }

    /// Mass strictly inside the sponge band, or the total mass if that region
    /// is empty.
    pub fn interior_mass(&self) -> f64 {
        let border = self.pfield.border_widths(&self.grid);
        let (xs, ys, _) = observables::interior_ranges(&self.grid, border);
        observables::wf_region_mass(&self.psi, &self.grid, xs, ys)
    }

    /// Mass to the `(left, right)` of the vertical midline.
    pub fn mass_split(&self) -> (f64, f64) {
        observables::wf_mass_split(&self.psi, &self.grid)
    }

    /// Position expectation values, if `psi` is nonzero.
    pub fn expectation_position(&self) -> Option<(f64, f64)> {
        observables::expectation_position(&self.psi, &self.grid)
    }

    /// Momentum-space density of `psi`, if nonzero.
    pub fn momentum_density(&self) -> Option<MomentumDensity> {
        MomentumDensity::compute(&self.psi, &self.grid)
    }

    /// Capture a new diagnostics baseline from the current state, clearing
    /// any instability.
    pub fn refresh_diagnostics_baseline(&mut self) {
        let report = self.mass_report();
        self.diagnostics.rebaseline(
            &report, &self.stability, self.pfield.cap_enabled());
    }

    /// Rescale `psi` to unit mass, unless its mass is at most
    /// [`MIN_RENORM_MASS`][observables::MIN_RENORM_MASS].
    ///
    /// Never called automatically; the baseline is left as-is.
    pub fn renormalize(&mut self) -> bool {
        observables::wf_renormalize(&mut self.psi, &self.grid)
    }

    /// Compute up to `modes` lowest eigenstates of the real part of the current
    /// potential with hard-wall boundaries. `psi` is not involved.
    pub fn compute_eigenstates(
        &self,
        modes: usize,
        max_basis: usize,
        max_iter: usize,
        tol: f64,
    ) -> EResult<Vec<EigenState>>
    {
        let params = LanczosParams { modes, max_basis, max_iter, tol };
        eigen::lanczos_lowest(&self.grid, &self.V, params)
    }

    /// Replace `psi` with an eigenstate, clear the packet list, stop playback,
    /// and re-baseline.
    ///
    /// Nothing is changed if the eigenvector does not have one value per grid
    /// cell.
    pub fn apply_eigenstate(&mut self, state: &EigenState)
        -> Result<(), LengthError>
    {
        LengthError::check(&state.wf, self.grid.len())?;
        self.psi.iter_mut().zip(state.wf.iter())
            .for_each(|(q, &w)| { *q = C64::from(w); });
        self.packets.clear();
        self.running = false;
        self.refresh_diagnostics_baseline();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_and_parameters() {
        let sim = Simulation::new();
        assert_eq!(sim.grid.shape(), (300, 372));
        assert_eq!(sim.psi.dim(), (300, 372));
        assert_eq!(sim.V.dim(), (300, 372));
        assert_eq!(sim.dt, DEF_DT);
        assert!(sim.pfield.cap_enabled());
        assert_eq!(sim.mass(), 0.0);
    }

    #[test]
    fn packet_peaks_at_center() {
        let grid = Grid::new(40, 40);
        let mut psi: nd::Array2<C64> = nd::Array2::zeros(grid.shape());
        Packet::new(0.5125, 0.2625, 0.05, 2.0, 7.0, 3.0).add_to(&grid, &mut psi);
        // (0.5125, 0.2625) is the center of cell (20, 10)
        assert!((psi[[10, 20]] - C64::from(2.0)).norm() < 1e-12);
        assert!(psi[[10, 20]].norm() >= psi[[10, 21]].norm());
        assert!(psi[[10, 20]].norm() >= psi[[11, 20]].norm());
    }

    #[test]
    fn add_box_leaves_psi_alone() {
        let mut sim = Simulation::with_size(32, 32);
        sim.add_packet(Packet::new(0.3, 0.5, 0.05, 1.0, 5.0, 0.0));
        let psi0 = sim.psi.clone();
        sim.add_box(PotentialBox::new(0.6, 0.0, 0.7, 1.0, 500.0));
        assert_eq!(sim.psi, psi0);
        assert_eq!(sim.V[[16, 20]].re, 500.0);
        assert_eq!(sim.packets.len(), 1);
    }

    #[test]
    fn add_packet_rebaselines() {
        let mut sim = Simulation::with_size(32, 32);
        assert_eq!(sim.diagnostics.initial_mass, 0.0);
        sim.add_packet(Packet::new(0.5, 0.5, 0.05, 1.0, 0.0, 0.0));
        assert!(sim.diagnostics.initial_mass > 0.0);
        assert_eq!(sim.diagnostics.initial_mass, sim.mass());
    }

    #[test]
    fn resize_regenerates_from_packets() {
        let mut sim = Simulation::with_size(32, 32);
        sim.add_packet(Packet::new(0.5, 0.5, 0.05, 1.0, 0.0, 0.0));
        sim.resize(4, 64);
        assert_eq!(sim.grid.shape(), (64, 8));
        assert_eq!(sim.psi.dim(), (64, 8));
        assert!(sim.mass() > 0.0);
        assert_eq!(sim.diagnostics.steps_since_baseline, 0);
    }

    #[test]
    fn renormalize_and_clear() {
        let mut sim = Simulation::with_size(32, 32);
        assert!(!sim.renormalize());
        sim.add_packet(Packet::new(0.5, 0.5, 0.05, 3.0, 0.0, 0.0));
        assert!(sim.renormalize());
        assert!((sim.mass() - 1.0).abs() < 1e-12);
        sim.clear_psi();
        assert_eq!(sim.mass(), 0.0);
        assert_eq!(sim.packets.len(), 1);
        sim.reset();
        assert!(sim.mass() > 0.0);
    }

    #[test]
    fn interior_mass_matches_report() {
        let mut sim = Simulation::with_size(40, 30);
        sim.add_packet(Packet::new(0.08, 0.4, 0.06, 1.0, 0.0, 0.0));
        let report = sim.mass_report();
        assert_eq!(sim.interior_mass(), report.interior);
        assert!(sim.interior_mass() < sim.mass());
        sim.pfield.cap_ratio = 0.6;
        assert!(sim.mass_report().interior_fallback);
        assert!((sim.interior_mass() - sim.mass()).abs() < 1e-12 * sim.mass());
    }

    #[test]
    fn mismatched_eigenstate_is_rejected() {
        let mut sim = Simulation::with_size(16, 16);
        sim.add_packet(Packet::new(0.5, 0.5, 0.05, 1.0, 0.0, 0.0));
        sim.running = true;
        let psi0 = sim.psi.clone();
        let state = EigenState { energy: 1.0, wf: nd::Array2::ones((8, 8)) };
        assert!(sim.apply_eigenstate(&state).is_err());
        assert_eq!(sim.psi, psi0);
        assert_eq!(sim.packets.len(), 1);
        assert!(sim.running);
    }
}
