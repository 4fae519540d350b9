//! Flat, serializable description of a simulation setup.
//!
//! Scenes are stored as JSON. Every member is optional on input; missing ones
//! take the values of [`Scene::default`].
//!
//! ```
//! use xyspace::scene::Scene;
//!
//! let scene: Scene = serde_json::from_str(r#"{ "Nx": 64, "dt": 5e-5 }"#).unwrap();
//! assert_eq!((scene.nx, scene.ny), (64, 128));
//! assert_eq!(scene.steps, 600);
//! let sim = scene.build_simulation();
//! assert_eq!(sim.grid.shape(), (128, 64));
//! ```

use std::{ fs, path::Path };
use serde::{ Deserialize, Serialize };
use crate::{
    error::SceneError,
    diagnostics::StabilityConfig,
    potential::{ PotentialBox, RadialWell },
    simulation::{ Packet, Simulation },
};

pub type SceneResult<T> = Result<T, SceneError>;

/// Default number of steps taken by headless runners.
pub const DEF_STEPS: usize = 600;

/// Every scalar and list needed to rebuild a [`Simulation`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    #[serde(rename = "Nx")]
    pub nx: usize,
    #[serde(rename = "Ny")]
    pub ny: usize,
    pub dt: f64,
    pub cap_strength: f64,
    pub cap_ratio: f64,
    pub rel_mass_drift_tol: f64,
    pub rel_cap_mass_growth_tol: f64,
    pub rel_interior_mass_drift_tol: f64,
    pub interior_mass_drift_vs_total_tol: f64,
    pub min_initial_interior_mass_fraction: f64,
    pub min_interior_area_fraction: f64,
    #[serde(rename = "stability_warmup_steps")]
    pub warmup_steps: usize,
    pub interior_drift_hard_fail: bool,
    pub auto_pause_on_instability: bool,
    /// Number of steps for headless runs; not part of the simulation itself.
    pub steps: usize,
    pub boxes: Vec<PotentialBox>,
    pub wells: Vec<RadialWell>,
    pub packets: Vec<Packet>,
}

impl Default for Scene {
    fn default() -> Self {
        let stability = StabilityConfig::default();
        Self {
            nx: 128,
            ny: 128,
            dt: 1e-3,
            cap_strength: 1.0,
            cap_ratio: 0.1,
            rel_mass_drift_tol: stability.rel_mass_drift_tol,
            rel_cap_mass_growth_tol: stability.rel_cap_mass_growth_tol,
            rel_interior_mass_drift_tol: stability.rel_interior_mass_drift_tol,
            interior_mass_drift_vs_total_tol:
                stability.interior_mass_drift_vs_total_tol,
            min_initial_interior_mass_fraction:
                stability.min_initial_interior_mass_fraction,
            min_interior_area_fraction: stability.min_interior_area_fraction,
            warmup_steps: stability.warmup_steps,
            interior_drift_hard_fail: stability.interior_drift_hard_fail,
            auto_pause_on_instability: stability.auto_pause_on_instability,
            steps: DEF_STEPS,
            boxes: Vec::new(),
            wells: Vec::new(),
            packets: Vec::new(),
        }
    }
}

impl Scene {
    /// Stability settings carried by the scene.
    pub fn stability(&self) -> StabilityConfig {
        StabilityConfig {
            rel_mass_drift_tol: self.rel_mass_drift_tol,
            rel_cap_mass_growth_tol: self.rel_cap_mass_growth_tol,
            rel_interior_mass_drift_tol: self.rel_interior_mass_drift_tol,
            interior_mass_drift_vs_total_tol:
                self.interior_mass_drift_vs_total_tol,
            min_initial_interior_mass_fraction:
                self.min_initial_interior_mass_fraction,
            min_interior_area_fraction: self.min_interior_area_fraction,
            warmup_steps: self.warmup_steps,
            interior_drift_hard_fail: self.interior_drift_hard_fail,
            auto_pause_on_instability: self.auto_pause_on_instability,
        }
    }

    /// Build a fresh [`Simulation`] from the scene.
    pub fn build_simulation(&self) -> Simulation {
        let mut sim = Simulation::with_size(self.nx, self.ny);
        to_simulation(self, &mut sim);
        sim
    }
}

/// Capture the setup of a simulation. `steps` takes its default value.
pub fn from_simulation(sim: &Simulation) -> Scene {
    let s = &sim.stability;
    Scene {
        nx: sim.grid.nx,
        ny: sim.grid.ny,
        dt: sim.dt,
        cap_strength: sim.pfield.cap_strength,
        cap_ratio: sim.pfield.cap_ratio,
        rel_mass_drift_tol: s.rel_mass_drift_tol,
        rel_cap_mass_growth_tol: s.rel_cap_mass_growth_tol,
        rel_interior_mass_drift_tol: s.rel_interior_mass_drift_tol,
        interior_mass_drift_vs_total_tol: s.interior_mass_drift_vs_total_tol,
        min_initial_interior_mass_fraction: s.min_initial_interior_mass_fraction,
        min_interior_area_fraction: s.min_interior_area_fraction,
        warmup_steps: s.warmup_steps,
        interior_drift_hard_fail: s.interior_drift_hard_fail,
        auto_pause_on_instability: s.auto_pause_on_instability,
        steps: DEF_STEPS,
        boxes: sim.pfield.boxes.clone(),
        wells: sim.pfield.wells.clone(),
        packets: sim.packets.clone(),
    }
}

/// Apply a scene to a simulation: copy all scalars and lists, then resize
/// (which rebuilds the potential and resets). Playback is stopped.
pub fn to_simulation(scene: &Scene, sim: &mut Simulation) {
    sim.running = false;
    sim.dt = scene.dt;
    sim.pfield.cap_strength = scene.cap_strength;
    sim.pfield.cap_ratio = scene.cap_ratio;
    sim.pfield.boxes = scene.boxes.clone();
    sim.pfield.wells = scene.wells.clone();
    sim.packets = scene.packets.clone();
    sim.stability = scene.stability();
    sim.resize(scene.nx, scene.ny);
}

/// Read a scene from a JSON file.
pub fn load_scene<P>(path: P) -> SceneResult<Scene>
where P: AsRef<Path>
{
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Write a scene to a JSON file, overwriting it if it exists.
pub fn save_scene<P>(path: P, scene: &Scene) -> SceneResult<()>
where P: AsRef<Path>
{
    let text = serde_json::to_string_pretty(scene)?;
    fs::write(path, text)?;
    Ok(())
}
