use std::{ fs, path::PathBuf };
use anyhow::Context;
use clap::Parser;
use ndarray as nd;
use serde::Serialize;
use tracing::info;
use xyspace::{
    observables,
    presets::Preset,
    simulation::Simulation,
};

/// Compute the lowest stationary states of a preset's potential.
#[derive(Debug, Parser)]
#[command(name = "eigenmodes", version)]
struct Cli {
    #[arg(short, long, default_value = "central-well-harmonic")]
    preset: Preset,

    #[arg(long, default_value_t = 96)]
    nx: usize,

    #[arg(long, default_value_t = 96)]
    ny: usize,

    /// Number of modes to keep
    #[arg(short, long, default_value_t = 6)]
    modes: usize,

    #[arg(long, default_value_t = 160)]
    max_basis: usize,

    #[arg(long, default_value_t = 160)]
    max_iter: usize,

    #[arg(long, default_value_t = 1e-10)]
    tol: f64,

    #[arg(short, long, default_value = "output")]
    outdir: PathBuf,
}

#[derive(Serialize)]
struct Mode {
    energy: f64,
    mean_x: f64,
    mean_y: f64,
    /// Marginal probability density along x.
    density_x: Vec<f64>,
    /// Marginal probability density along y.
    density_y: Vec<f64>,
}

#[derive(Serialize)]
struct Output {
    preset: String,
    nx: usize,
    ny: usize,
    dx: f64,
    modes: Vec<Mode>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut sim = Simulation::with_size(cli.nx, cli.ny);
    cli.preset.load(&mut sim);
    let grid = sim.grid;
    info!(preset = %cli.preset, nx = grid.nx, ny = grid.ny, "computing {} modes", cli.modes);
    let states
        = sim.compute_eigenstates(cli.modes, cli.max_basis, cli.max_iter, cli.tol)
        .context("eigensolver failed")?;

    let modes: Vec<Mode>
        = states.iter()
        .map(|state| {
            let rho: nd::Array2<f64> = state.wf.mapv(|w| w * w);
            let density_x = rho.sum_axis(nd::Axis(0)) * grid.dy;
            let density_y = rho.sum_axis(nd::Axis(1)) * grid.dx;
            let (mean_x, mean_y)
                = observables::expectation_position(&state.to_complex(), &grid)
                .unwrap_or((f64::NAN, f64::NAN));
            println!("E = {:+.6e}  <x> = {:.4}  <y> = {:.4}", state.energy, mean_x, mean_y);
            Mode {
                energy: state.energy,
                mean_x,
                mean_y,
                density_x: density_x.to_vec(),
                density_y: density_y.to_vec(),
            }
        })
        .collect();

    let output = Output {
        preset: cli.preset.to_string(),
        nx: grid.nx,
        ny: grid.ny,
        dx: grid.dx,
        modes,
    };
    fs::create_dir_all(&cli.outdir)
        .with_context(|| format!("failed to create {}", cli.outdir.display()))?;
    let path = cli.outdir.join("eigenmodes.json");
    fs::write(&path, serde_json::to_string_pretty(&output)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}
