use std::{ fs, path::PathBuf };
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{ info, warn };
use xyspace::{ presets::Preset, simulation::Simulation };

/// Run the double-slit preset and record how the mass splits across the
/// barrier over time.
#[derive(Debug, Parser)]
#[command(name = "double_slit", version)]
struct Cli {
    /// Use the finer, high-barrier variant
    #[arg(long)]
    fine: bool,

    #[arg(long, default_value_t = 256)]
    nx: usize,

    #[arg(long, default_value_t = 192)]
    ny: usize,

    #[arg(short = 'n', long, default_value_t = 2000)]
    steps: usize,

    /// Record every this many steps
    #[arg(long, default_value_t = 20)]
    every: usize,

    #[arg(short, long, default_value = "output")]
    outdir: PathBuf,
}

#[derive(Default, Serialize)]
struct Series {
    t: Vec<f64>,
    mass: Vec<f64>,
    left: Vec<f64>,
    right: Vec<f64>,
    interior: Vec<f64>,
}

impl Series {
    fn record(&mut self, t: f64, sim: &Simulation) {
        let (left, right) = sim.mass_split();
        self.t.push(t);
        self.mass.push(left + right);
        self.left.push(left);
        self.right.push(right);
        self.interior.push(sim.interior_mass());
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let preset = if cli.fine { Preset::DoubleSlitFine } else { Preset::DoubleSlit };

    let mut sim = Simulation::with_size(cli.nx, cli.ny);
    preset.load(&mut sim);
    let every = cli.every.max(1);
    info!(preset = %preset, dt = sim.dt, "running {} steps", cli.steps);

    let mut series = Series::default();
    series.record(0.0, &sim);
    for k in 1..=cli.steps {
        sim.step();
        if k % every == 0 { series.record(k as f64 * sim.dt, &sim); }
    }
    if let Some(reason) = sim.diagnostics.reason() {
        warn!("run ended unstable: {reason}");
    }
    let m0 = sim.diagnostics.initial_mass;
    if let Some(right) = series.right.last() {
        println!("transmitted fraction: {:.6}", right / m0);
    }

    fs::create_dir_all(&cli.outdir)
        .with_context(|| format!("failed to create {}", cli.outdir.display()))?;
    let path = cli.outdir.join("double_slit.json");
    fs::write(&path, serde_json::to_string(&series)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(())
}
