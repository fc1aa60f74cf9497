//! Particle bodies and their per-frame kinematics

use std::time::Duration;

use rand::Rng;

use crate::constants::{DEFAULT_MASS, DEFAULT_RADIUS, MAX_SPAWN_SPEED, MIN_SPAWN_SPEED};
use crate::vector::Vector2D;

/// Playfield edge a respawned particle re-enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Top, Edge::Right, Edge::Bottom];
}

/// Range of per-axis speeds drawn when a particle is (re)spawned.
///
/// Each velocity component gets a magnitude uniform in `[min, max]` and an
/// independent, uniformly chosen sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

impl SpeedRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Finite, non-negative and not inverted
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max
    }

    pub fn sample_component<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let magnitude = rng.random_range(self.min..=self.max);
        if rng.random_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }

    pub fn sample_velocity<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector2D {
        let x = self.sample_component(rng);
        let y = self.sample_component(rng);
        Vector2D::new(x, y)
    }
}

impl Default for SpeedRange {
    fn default() -> Self {
        Self::new(MIN_SPAWN_SPEED, MAX_SPAWN_SPEED)
    }
}

/// A circular body in the playfield.
///
/// Radius and mass are fixed at construction; only position, velocity and
/// the last-update timestamp change over a particle's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Center, in canvas coordinates (y grows downwards)
    pub position: Vector2D,
    /// Displacement applied per frame
    pub velocity: Vector2D,
    radius: f64,
    mass: f64,
    last_update: Duration,
}

impl Particle {
    /// Create a resting particle at the origin
    pub fn new(radius: f64, mass: f64) -> Self {
        Self::with_state(Vector2D::ZERO, Vector2D::ZERO, radius, mass)
    }

    pub fn with_state(position: Vector2D, velocity: Vector2D, radius: f64, mass: f64) -> Self {
        debug_assert!(radius > 0.0, "particle radius must be positive");
        debug_assert!(mass > 0.0, "particle mass must be positive");
        Self {
            position,
            velocity,
            radius,
            mass,
            last_update: Duration::ZERO,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Timestamp of the last frame this particle was integrated on
    pub fn last_update(&self) -> Duration {
        self.last_update
    }

    /// Advance one frame.
    ///
    /// Frames stamped earlier than the previous update are ignored so a clock
    /// that steps backwards cannot replay motion. Returns whether the particle
    /// moved.
    pub fn update(&mut self, now: Duration) -> bool {
        if now < self.last_update {
            return false;
        }
        self.position += self.velocity;
        self.last_update = now;
        true
    }

    /// True when the particle's bounding square lies entirely past any edge
    pub fn is_outside(&self, width: f64, height: f64) -> bool {
        let Vector2D { x, y } = self.position;
        let r = self.radius;
        x + r < 0.0 || x - r > width || y + r < 0.0 || y - r > height
    }

    /// Respawn the particle on a random edge if it has left the playfield.
    ///
    /// Returns whether a respawn happened.
    pub fn handle_boundary_exit<R: Rng + ?Sized>(
        &mut self,
        width: f64,
        height: f64,
        speeds: &SpeedRange,
        rng: &mut R,
    ) -> bool {
        if !self.is_outside(width, height) {
            return false;
        }
        let edge = self.respawn(width, height, speeds, rng);
        log::trace!(
            "particle left the playfield, re-entering from {:?} at ({:.1}, {:.1})",
            edge,
            self.position.x,
            self.position.y
        );
        true
    }

    /// Place the particle just inside a uniformly chosen edge with a fresh
    /// velocity.
    ///
    /// The circle touches the edge from the inside; on a playfield narrower
    /// than the particle it is centred on that axis instead.
    pub fn respawn<R: Rng + ?Sized>(
        &mut self,
        width: f64,
        height: f64,
        speeds: &SpeedRange,
        rng: &mut R,
    ) -> Edge {
        let edge = Edge::ALL[rng.random_range(0..Edge::ALL.len())];
        let inset_x = self.radius.min(width / 2.0);
        let inset_y = self.radius.min(height / 2.0);
        self.velocity = speeds.sample_velocity(rng);
        self.position = match edge {
            Edge::Left => Vector2D::new(inset_x, rng.random_range(0.0..=height)),
            Edge::Top => Vector2D::new(rng.random_range(0.0..=width), inset_y),
            Edge::Right => Vector2D::new(width - inset_x, rng.random_range(0.0..=height)),
            Edge::Bottom => Vector2D::new(rng.random_range(0.0..=width), height - inset_y),
        };
        edge
    }

    /// Scatter the particle uniformly inside the playfield with a fresh velocity
    pub fn randomize<R: Rng + ?Sized>(
        &mut self,
        width: f64,
        height: f64,
        speeds: &SpeedRange,
        rng: &mut R,
    ) {
        let x = rng.random_range(0.0..=width);
        let y = rng.random_range(0.0..=height);
        self.position = Vector2D::new(x, y);
        self.velocity = speeds.sample_velocity(rng);
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    pub fn momentum(&self) -> Vector2D {
        self.velocity * self.mass
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS, DEFAULT_MASS)
    }
}
