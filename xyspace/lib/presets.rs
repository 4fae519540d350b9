//! Ready-made demonstration setups.
//!
//! Loading a preset stops playback, replaces all boxes, wells, and packets,
//! sets the time step where the setup needs a finer one, and resets. Grid
//! dimensions and sponge parameters are left alone.

use std::{ f64::consts::TAU, fmt, str::FromStr };
use crate::{
    error::PresetError,
    potential::{ PotentialBox, RadialWell, WellProfile },
    simulation::{ Packet, Simulation },
};

/// Named demonstration setups.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    /// A single vertical wall hit by a slow and a fast packet.
    TwoWall,
    /// Double slit.
    DoubleSlit,
    /// Double slit with a taller barrier, faster packet, and finer time step.
    DoubleSlitFine,
    /// Three packets colliding in free space.
    CounterPropagating,
    /// A channel with two staggered baffles.
    Waveguide,
    /// A closed box with a soft-Coulomb center and a central block.
    Trap,
    /// Gaussian central well.
    CentralWell,
    /// Inverse-square central well.
    CentralWellInverseSquare,
    /// Harmonic central well.
    CentralWellHarmonic,
    /// Checkerboard of attractive and repulsive wells.
    WellLattice,
    /// Ring of repulsive bumps around a harmonic core.
    RingResonator,
    /// Walls, sinks, and an exit well.
    BarrierGauntlet,
}

impl Preset {
    pub const ALL: [Self; 12] = [
        Self::TwoWall,
        Self::DoubleSlit,
        Self::DoubleSlitFine,
        Self::CounterPropagating,
        Self::Waveguide,
        Self::Trap,
        Self::CentralWell,
        Self::CentralWellInverseSquare,
        Self::CentralWellHarmonic,
        Self::WellLattice,
        Self::RingResonator,
        Self::BarrierGauntlet,
    ];

    /// Kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::TwoWall => "two-wall",
            Self::DoubleSlit => "double-slit",
            Self::DoubleSlitFine => "double-slit-fine",
            Self::CounterPropagating => "counter-propagating",
            Self::Waveguide => "waveguide",
            Self::Trap => "trap",
            Self::CentralWell => "central-well",
            Self::CentralWellInverseSquare => "central-well-inverse-square",
            Self::CentralWellHarmonic => "central-well-harmonic",
            Self::WellLattice => "well-lattice",
            Self::RingResonator => "ring-resonator",
            Self::BarrierGauntlet => "barrier-gauntlet",
        }
    }

    /// Load the preset into `sim`.
    pub fn load(self, sim: &mut Simulation) {
        sim.running = false;
        sim.pfield.boxes.clear();
        sim.pfield.wells.clear();
        sim.packets.clear();
        match self {
            Self::TwoWall => two_wall(sim),
            Self::DoubleSlit => double_slit(sim, 2400.0, 24.0),
            Self::DoubleSlitFine => {
                sim.dt = 1e-5;
                double_slit(sim, 100000.0, 192.0);
            },
            Self::CounterPropagating => counter_propagating(sim),
            Self::Waveguide => waveguide(sim),
            Self::Trap => trap(sim),
            Self::CentralWell => {
                sim.dt = 2.5e-5;
                let well = RadialWell::new(
                    0.5, 0.5, -260.0, 0.075, WellProfile::Gaussian);
                sim.pfield.wells.push(well);
                sim.packets.push(Packet::new(0.35, 0.5, 0.035, 0.85, 0.0, 14.0));
                sim.packets.push(Packet::new(0.65, 0.5, 0.035, 0.85, 0.0, -14.0));
            },
            Self::CentralWellInverseSquare => {
                sim.dt = 2.5e-5;
                let well = RadialWell::new(
                    0.5, 0.5, -500.0, 0.075, WellProfile::InverseSquare);
                sim.pfield.wells.push(well);
                sim.packets.push(
                    Packet::new(0.175, 0.5, 0.035, 0.85, 65.0, 25.0));
            },
            Self::CentralWellHarmonic => {
                sim.dt = 2.5e-5;
                let well = RadialWell::new(
                    0.5, 0.5, -4000.0, 0.18, WellProfile::HarmonicOscillator);
                sim.pfield.wells.push(well);
                sim.packets.push(
                    Packet::new(0.425, 0.5, 0.035, 0.85, 15.0, 0.0));
            },
            Self::WellLattice => well_lattice(sim),
            Self::RingResonator => ring_resonator(sim),
            Self::BarrierGauntlet => barrier_gauntlet(sim),
        }
        sim.reset();
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| PresetError(s.to_string()))
    }
}

fn two_wall(sim: &mut Simulation) {
    sim.pfield.boxes.push(PotentialBox::new(0.48, 0.0, 0.52, 1.0, 2400.0));
    sim.packets.push(Packet::new(0.25, 0.75, 0.05, 1.0, 10.0, -1.0));
    sim.packets.push(Packet::new(0.25, 0.25, 0.05, 1.0, 42.0, 4.0));
}

fn double_slit(sim: &mut Simulation, height: f64, kx: f64) {
    let boxes = &mut sim.pfield.boxes;
    boxes.push(PotentialBox::new(0.48, 0.0, 0.52, 0.4, height));
    boxes.push(PotentialBox::new(0.48, 0.6, 0.52, 1.0, height));
    boxes.push(PotentialBox::new(0.48, 0.45, 0.52, 0.55, height));
    sim.packets.push(Packet::new(0.25, 0.5, 0.05, 1.0, kx, 0.0));
}

fn counter_propagating(sim: &mut Simulation) {
    sim.packets.push(Packet::new(0.28, 0.5, 0.045, 0.8, 22.0, 0.0));
    sim.packets.push(Packet::new(0.72, 0.5, 0.045, 0.8, -22.0, 0.0));
    sim.packets.push(Packet::new(0.5, 0.68, 0.035, 0.6, -6.0, -10.0));
}

fn waveguide(sim: &mut Simulation) {
    let boxes = &mut sim.pfield.boxes;
    boxes.push(PotentialBox::new(0.0, 0.0, 1.0, 0.08, 2200.0));
    boxes.push(PotentialBox::new(0.0, 0.92, 1.0, 1.0, 2200.0));
    boxes.push(PotentialBox::new(0.36, 0.0, 0.44, 0.38, 2200.0));
    boxes.push(PotentialBox::new(0.56, 0.62, 0.64, 1.0, 2200.0));
    sim.packets.push(Packet::new(0.12, 0.5, 0.05, 1.0, 28.0, 0.0));
}

fn trap(sim: &mut Simulation) {
    let boxes = &mut sim.pfield.boxes;
    boxes.push(PotentialBox::new(0.1, 0.1, 0.9, 0.12, 3400.0));
    boxes.push(PotentialBox::new(0.1, 0.88, 0.9, 0.9, 3400.0));
    boxes.push(PotentialBox::new(0.1, 0.1, 0.12, 0.9, 3400.0));
    boxes.push(PotentialBox::new(0.88, 0.1, 0.9, 0.9, 3400.0));
    boxes.push(PotentialBox::new(0.43, 0.43, 0.57, 0.57, 2800.0));
    sim.pfield.wells.push(
        RadialWell::new(0.5, 0.5, -320.0, 0.08, WellProfile::SoftCoulomb));
    sim.packets.push(Packet::new(0.3, 0.5, 0.04, 0.7, 12.0, 6.0));
    sim.packets.push(Packet::new(0.7, 0.5, 0.04, 0.7, -12.0, -6.0));
    sim.packets.push(Packet::new(0.5, 0.3, 0.035, 0.6, 0.0, 14.0));
}

fn well_lattice(sim: &mut Simulation) {
    sim.dt = 2e-5;
    // 5 × 4 checkerboard; attractive sites where i + j is even
    for j in 0..4 {
        for i in 0..5 {
            let cx = 0.18 + i as f64 * 0.14;
            let cy = 0.2 + j as f64 * 0.16;
            let well
                = if (i + j) % 2 == 0 {
                    RadialWell::new(cx, cy, -320.0, 0.05, WellProfile::SoftCoulomb)
                } else {
                    RadialWell::new(cx, cy, 320.0, 0.05, WellProfile::Gaussian)
                };
            sim.pfield.wells.push(well);
        }
    }
    sim.packets.push(Packet::new(0.08, 0.25, 0.03, 0.85, 60.0, 2.0));
    sim.packets.push(Packet::new(0.08, 0.75, 0.03, 0.85, 55.0, -2.0));
}

fn ring_resonator(sim: &mut Simulation) {
    sim.dt = 2e-5;
    let segments = 12;
    for k in 0..segments {
        let angle = TAU / segments as f64 * k as f64;
        sim.pfield.wells.push(RadialWell::new(
            0.5 + 0.28 * angle.cos(),
            0.5 + 0.28 * angle.sin(),
            900.0,
            0.045,
            WellProfile::Gaussian,
        ));
    }
    sim.pfield.wells.push(
        RadialWell::new(0.5, 0.5, -450.0, 0.07, WellProfile::HarmonicOscillator));
    sim.packets.push(Packet::new(0.35, 0.5, 0.035, 0.8, 0.0, 24.0));
    sim.packets.push(Packet::new(0.65, 0.5, 0.035, 0.8, 0.0, -24.0));
    sim.packets.push(Packet::new(0.5, 0.65, 0.03, 0.6, -18.0, 0.0));
}

fn barrier_gauntlet(sim: &mut Simulation) {
    sim.dt = 2e-5;
    let boxes = &mut sim.pfield.boxes;
    boxes.push(PotentialBox::new(0.12, 0.1, 0.88, 0.18, 3400.0));
    boxes.push(PotentialBox::new(0.12, 0.82, 0.88, 0.9, 3400.0));
    boxes.push(PotentialBox::new(0.12, 0.28, 0.32, 0.72, 3400.0));
    boxes.push(PotentialBox::new(0.68, 0.28, 0.88, 0.72, 3400.0));
    boxes.push(PotentialBox::new(0.44, 0.44, 0.56, 0.56, 4200.0));
    for k in 0..3 {
        let cy = if k % 2 == 0 { 0.3 } else { 0.7 };
        sim.pfield.wells.push(RadialWell::new(
            0.35 + 0.15 * k as f64,
            cy,
            -380.0,
            0.06,
            WellProfile::InverseSquare,
        ));
    }
    sim.pfield.wells.push(
        RadialWell::new(0.85, 0.5, -520.0, 0.07, WellProfile::SoftCoulomb));
    sim.packets.push(Packet::new(0.18, 0.5, 0.035, 0.9, 48.0, 0.0));
    sim.packets.push(Packet::new(0.22, 0.35, 0.025, 0.7, 60.0, 12.0));
}
