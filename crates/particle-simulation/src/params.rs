//! Simulation parameters for runtime tuning

use std::time::Duration;

use particle_physics::{SpeedRange, DEFAULT_MASS, DEFAULT_RADIUS};

use crate::error::SimulationError;

/// Particles created at initialization
pub const DEFAULT_PARTICLE_COUNT: usize = 50;

/// Handles a quadtree node holds before it splits
pub const DEFAULT_MAX_OBJECTS: usize = 10;

/// Deepest level a quadtree node may split at (root is level 0)
pub const DEFAULT_MAX_LEVELS: usize = 5;

/// Physics stays frozen this long after initialization or reset
pub const DEFAULT_START_DELAY: Duration = Duration::from_millis(100);

pub const DEFAULT_SEED: u64 = 0x00c0_111d;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadTreeParams {
    pub max_objects: usize,
    pub max_levels: usize,
}

impl Default for QuadTreeParams {
    fn default() -> Self {
        Self {
            max_objects: DEFAULT_MAX_OBJECTS,
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }
}

/// How each tick finds the pairs to test for overlap
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BroadPhase {
    /// Candidates come from a quadtree rebuilt every tick. Pairs whose
    /// bounding squares sit on opposite sides of a node's midline may be
    /// missed from one side.
    #[default]
    QuadTree,
    /// Every particle against every later one. Exact, quadratic.
    AllPairs,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParams {
    pub particle_count: usize,
    pub radius: f64,
    pub mass: f64,
    /// Per-axis speed drawn on spawn and on respawn after leaving the playfield
    pub spawn_speed: SpeedRange,
    pub broad_phase: BroadPhase,
    pub quadtree: QuadTreeParams,
    pub start_delay: Duration,
    /// Seed for every random draw the simulation makes
    pub seed: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            radius: DEFAULT_RADIUS,
            mass: DEFAULT_MASS,
            spawn_speed: SpeedRange::default(),
            broad_phase: BroadPhase::default(),
            quadtree: QuadTreeParams::default(),
            start_delay: DEFAULT_START_DELAY,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.particle_count == 0 {
            return Err(SimulationError::invalid(
                "particle_count",
                "at least one particle is required",
            ));
        }
        ensure_positive("radius", self.radius)?;
        ensure_positive("mass", self.mass)?;
        self.validate_shared()
    }

    /// Checks that do not depend on how the particles are created
    pub(crate) fn validate_shared(&self) -> Result<(), SimulationError> {
        if !self.spawn_speed.is_valid() {
            return Err(SimulationError::invalid(
                "spawn_speed",
                format!(
                    "expected 0 <= min <= max, got {}..={}",
                    self.spawn_speed.min, self.spawn_speed.max
                ),
            ));
        }
        if self.quadtree.max_objects == 0 {
            return Err(SimulationError::invalid(
                "quadtree.max_objects",
                "node capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Playfield dimensions must be finite and strictly positive
pub fn validate_playfield(width: f64, height: f64) -> Result<(), SimulationError> {
    ensure_positive("width", width)?;
    ensure_positive("height", height)
}

pub(crate) fn ensure_positive(parameter: &'static str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::invalid(
            parameter,
            format!("must be positive, got {value}"),
        ))
    }
}
