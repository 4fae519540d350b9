use std::{ path::PathBuf, process::ExitCode };
use anyhow::Context;
use clap::Parser;
use tracing::info;
use xyspace::{
    diagnostics::InteriorGuard,
    presets::Preset,
    scene::{ self, Scene },
};

/// Run a scene headlessly and report mass and stability diagnostics.
///
/// Exits with status 2 if the scene cannot be loaded and 3 if the run ends
/// unstable.
#[derive(Debug, Parser)]
#[command(name = "run_scene", version)]
struct Cli {
    /// Scene file (JSON); defaults are used if omitted
    #[arg(value_name = "SCENE", conflicts_with = "preset")]
    scene: Option<PathBuf>,

    /// Start from a named preset instead of a scene file
    #[arg(short, long, value_name = "NAME")]
    preset: Option<Preset>,

    /// Override the number of steps
    #[arg(short = 'n', long)]
    steps: Option<usize>,

    /// Override the number of cells along x
    #[arg(long)]
    nx: Option<usize>,

    /// Override the number of cells along y
    #[arg(long)]
    ny: Option<usize>,

    /// Write the effective scene to this file before running
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

fn load(cli: &Cli) -> anyhow::Result<Scene> {
    let mut scene
        = if let Some(path) = cli.scene.as_ref() {
            scene::load_scene(path)
                .with_context(|| format!("failed to load scene {}", path.display()))?
        } else {
            Scene::default()
        };
    if let Some(nx) = cli.nx { scene.nx = nx; }
    if let Some(ny) = cli.ny { scene.ny = ny; }
    if let Some(preset) = cli.preset {
        let mut sim = scene.build_simulation();
        preset.load(&mut sim);
        scene = Scene { steps: scene.steps, ..scene::from_simulation(&sim) };
    }
    if let Some(steps) = cli.steps { scene.steps = steps; }
    Ok(scene)
}

fn run(cli: &Cli, scene: &Scene) -> anyhow::Result<ExitCode> {
    if let Some(path) = cli.save.as_ref() {
        scene::save_scene(path, scene)
            .with_context(|| format!("failed to save scene {}", path.display()))?;
        info!("saved scene to {}", path.display());
    }

    let mut sim = scene.build_simulation();
    info!(
        nx = sim.grid.nx,
        ny = sim.grid.ny,
        packets = sim.packets.len(),
        "running {} steps",
        scene.steps
    );
    sim.step_n(scene.steps);

    let mass = sim.mass();
    let (left, right) = sim.mass_split();
    let diag = &sim.diagnostics;
    println!("Diagnostics");
    println!(
        "Nx={} Ny={} dt={} steps={}",
        sim.grid.nx, sim.grid.ny, sim.dt, scene.steps,
    );
    println!(
        "Mass={:.8} Left={:.8} Right={:.8} Interior={:.8} Drift={:.8e} \
        InteriorDrift={:.8e} InteriorDriftVsTotal={:.8e}",
        mass,
        left,
        right,
        diag.current_interior_mass,
        diag.rel_mass_drift,
        diag.rel_interior_mass_drift,
        diag.rel_interior_mass_drift_vs_total,
    );
    if let Some(warning) = diag.warning.as_ref() {
        println!("Stability=WARNING reason=\"{warning}\"");
    }
    if let InteriorGuard::Disabled(reason) = &diag.interior_guard {
        println!("InteriorGuard=DISABLED reason=\"{reason}\"");
    }
    if let Some(reason) = diag.reason() {
        println!("Stability=UNSTABLE reason=\"{reason}\"");
        return Ok(ExitCode::from(3));
    }
    if diag.warning.is_none() { println!("Stability=OK"); }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let scene
        = match load(&cli) {
            Ok(scene) => scene,
            Err(err) => {
                eprintln!("{err:#}");
                return ExitCode::from(2);
            },
        };
    match run(&cli, &scene) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        },
    }
}
