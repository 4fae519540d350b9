//! Mass-drift monitoring to detect numerical instability during stepping.
//!
//! A baseline is captured at every reset; each subsequent evaluation compares
//! the current total and interior masses against it. Once the run is judged
//! unstable it stays that way until the next explicit re-baseline.

use tracing::warn;
use crate::observables::MassReport;

/// Baseline masses below this are treated as zero when computing relative
/// drifts.
pub const MIN_BASELINE_MASS: f64 = 1e-300;

/// Tolerances and policy for the stability monitor.
#[derive(Clone, Debug, PartialEq)]
pub struct StabilityConfig {
    /// Maximum `|M - M₀| / M₀` with the absorbing boundary disabled.
    pub rel_mass_drift_tol: f64,
    /// Maximum `M / M₀ - 1` with the absorbing boundary enabled.
    pub rel_cap_mass_growth_tol: f64,
    /// Maximum `|I - I₀| / I₀` for the interior mass.
    pub rel_interior_mass_drift_tol: f64,
    /// Maximum `|I - I₀| / M₀`; a warning unless `interior_drift_hard_fail`.
    pub interior_mass_drift_vs_total_tol: f64,
    /// Interior checks are disabled if `I₀` is below this fraction of `M₀`.
    pub min_initial_interior_mass_fraction: f64,
    /// Interior checks are disabled if the interior covers less than this
    /// fraction of the grid.
    pub min_interior_area_fraction: f64,
    /// Number of time steps after a baseline during which only finiteness is
    /// checked.
    pub warmup_steps: usize,
    /// Promote excess interior-vs-total drift from a warning to instability.
    pub interior_drift_hard_fail: bool,
    /// Stop playback when the run becomes unstable.
    pub auto_pause_on_instability: bool,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            rel_mass_drift_tol: 0.15,
            rel_cap_mass_growth_tol: 0.01,
            rel_interior_mass_drift_tol: 1.0,
            interior_mass_drift_vs_total_tol: 0.05,
            min_initial_interior_mass_fraction: 0.05,
            min_interior_area_fraction: 0.01,
            warmup_steps: 8,
            interior_drift_hard_fail: false,
            auto_pause_on_instability: true,
        }
    }
}

/// Phase of the stability monitor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StabilityState {
    /// Freshly baselined; no time steps taken yet.
    Baseline,
    /// Within the warmup window; only finiteness is checked.
    Warmup,
    /// All checks active.
    Active,
    /// A check has failed. Left only through a re-baseline.
    Unstable(String),
}

/// Whether the interior checks are in effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteriorGuard {
    Active,
    Disabled(String),
}

impl InteriorGuard {
    pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

// relative drift of `current` from `initial`, zero for a vanishing baseline
fn rel_drift(current: f64, initial: f64, scale: f64) -> f64 {
    if scale > MIN_BASELINE_MASS { (current - initial).abs() / scale } else { 0.0 }
}

/// Running stability assessment of a simulation.
#[derive(Clone, Debug)]
pub struct StabilityDiagnostics {
    pub initial_mass: f64,
    pub initial_interior_mass: f64,
    pub current_mass: f64,
    pub current_interior_mass: f64,
    pub left_mass: f64,
    pub right_mass: f64,
    pub rel_mass_drift: f64,
    pub rel_interior_mass_drift: f64,
    pub rel_interior_mass_drift_vs_total: f64,
    pub steps_since_baseline: usize,
    /// Non-fatal finding of the most recent evaluation, if any.
    pub warning: Option<String>,
    pub interior_guard: InteriorGuard,
    state: StabilityState,
}

impl Default for StabilityDiagnostics {
    fn default() -> Self {
        Self {
            initial_mass: 0.0,
            initial_interior_mass: 0.0,
            current_mass: 0.0,
            current_interior_mass: 0.0,
            left_mass: 0.0,
            right_mass: 0.0,
            rel_mass_drift: 0.0,
            rel_interior_mass_drift: 0.0,
            rel_interior_mass_drift_vs_total: 0.0,
            steps_since_baseline: 0,
            warning: None,
            interior_guard: InteriorGuard::Active,
            state: StabilityState::Baseline,
        }
    }
}

impl StabilityDiagnostics {
    /// Current phase.
    pub fn state(&self) -> &StabilityState { &self.state }

    /// Returns `true` if the run has been judged unstable since the last
    /// baseline.
    pub fn unstable(&self) -> bool {
        matches!(self.state, StabilityState::Unstable(_))
    }

    /// Human-readable reason for instability, if unstable.
    pub fn reason(&self) -> Option<&str> {
        match &self.state {
            StabilityState::Unstable(reason) => Some(reason.as_str()),
            _ => None,
        }
    }

    /// Capture a new baseline from `report`, clearing any instability.
    pub fn rebaseline(
        &mut self,
        report: &MassReport,
        config: &StabilityConfig,
        cap_enabled: bool,
    ) {
        self.initial_mass = report.total;
        self.initial_interior_mass = report.interior;
        self.steps_since_baseline = 0;
        self.state = StabilityState::Baseline;
        self.interior_guard = Self::interior_guard_for(report, config);
        self.update(report, config, cap_enabled, false);
    }

    fn interior_guard_for(report: &MassReport, config: &StabilityConfig)
        -> InteriorGuard
    {
        if report.interior_area_fraction < config.min_interior_area_fraction {
            return InteriorGuard::Disabled(format!(
                "interior region covers {:.2}% of the grid (minimum {:.2}%)",
                100.0 * report.interior_area_fraction,
                100.0 * config.min_interior_area_fraction,
            ));
        }
        let fraction
            = if report.total > MIN_BASELINE_MASS {
                report.interior / report.total
            } else {
                0.0
            };
        if fraction < config.min_initial_interior_mass_fraction {
            return InteriorGuard::Disabled(format!(
                "initial interior mass fraction {:.3} below {:.3}",
                fraction,
                config.min_initial_interior_mass_fraction,
            ));
        }
        InteriorGuard::Active
    }

    /// Evaluate `report` against the baseline.
    ///
    /// Pass `is_time_step = true` when the evaluation follows a time step, so
    /// that it counts toward the warmup window.
    pub fn update(
        &mut self,
        report: &MassReport,
        config: &StabilityConfig,
        cap_enabled: bool,
        is_time_step: bool,
    ) {
        if is_time_step { self.steps_since_baseline += 1; }
        self.current_mass = report.total;
        self.current_interior_mass = report.interior;
        self.left_mass = report.left;
        self.right_mass = report.right;
        self.rel_mass_drift
            = rel_drift(report.total, self.initial_mass, self.initial_mass);
        self.rel_interior_mass_drift
            = rel_drift(
                report.interior,
                self.initial_interior_mass,
                self.initial_interior_mass,
            );
        self.rel_interior_mass_drift_vs_total
            = rel_drift(
                report.interior,
                self.initial_interior_mass,
                self.initial_mass,
            );
        self.warning = None;

        if !report.finite {
            self.fail("psi contains NaN/Inf".into());
            return;
        }
        if self.unstable() { return; }
        if self.steps_since_baseline <= config.warmup_steps {
            self.state
                = if self.steps_since_baseline == 0 {
                    StabilityState::Baseline
                } else {
                    StabilityState::Warmup
                };
            return;
        }
        self.state = StabilityState::Active;
        if let Err(reason) = self.check(config, cap_enabled) {
            self.fail(reason);
        }
    }

    fn check(&mut self, config: &StabilityConfig, cap_enabled: bool)
        -> Result<(), String>
    {
        if cap_enabled {
            let limit = self.initial_mass * (1.0 + config.rel_cap_mass_growth_tol);
            if self.current_mass > limit {
                return Err(format!(
                    "total mass grew by {:.3}% with absorbing boundary active \
                    (tolerance {:.3}%)",
                    100.0 * (self.current_mass / self.initial_mass - 1.0),
                    100.0 * config.rel_cap_mass_growth_tol,
                ));
            }
        } else if self.rel_mass_drift > config.rel_mass_drift_tol {
            return Err(format!(
                "relative mass drift {:.3e} exceeds tolerance {:.3e}",
                self.rel_mass_drift,
                config.rel_mass_drift_tol,
            ));
        }
        if !self.interior_guard.is_active() { return Ok(()); }
        if self.rel_interior_mass_drift > config.rel_interior_mass_drift_tol {
            return Err(format!(
                "relative interior mass drift {:.3e} exceeds tolerance {:.3e}",
                self.rel_interior_mass_drift,
                config.rel_interior_mass_drift_tol,
            ));
        }
        if self.rel_interior_mass_drift_vs_total
            > config.interior_mass_drift_vs_total_tol
        {
            let msg = format!(
                "interior mass drift {:.3e} of total exceeds tolerance {:.3e}",
                self.rel_interior_mass_drift_vs_total,
                config.interior_mass_drift_vs_total_tol,
            );
            if config.interior_drift_hard_fail { return Err(msg); }
            self.warning = Some(msg);
        }
        Ok(())
    }

    // sticky: the first reason is kept
    fn fail(&mut self, reason: String) {
        if self.unstable() { return; }
        warn!(
            steps = self.steps_since_baseline,
            mass = self.current_mass,
            "simulation unstable: {reason}"
        );
        self.state = StabilityState::Unstable(reason);
    }
}
