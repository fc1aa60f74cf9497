//! Physical defaults for the playfield
//!
//! Distances are in canvas pixels and velocities are displacement per frame,
//! so nothing here is scaled by wall-clock time.

use crate::vector::Vector2D;

/// Radius given to every particle unless configured otherwise
pub const DEFAULT_RADIUS: f64 = 10.0;

/// Mass given to every particle unless configured otherwise
pub const DEFAULT_MASS: f64 = 10.0;

/// Lower bound of the per-axis speed drawn on spawn/respawn
pub const MIN_SPAWN_SPEED: f64 = 0.0;

/// Upper bound of the per-axis speed drawn on spawn/respawn
pub const MAX_SPAWN_SPEED: f64 = 10.0;

/// Coefficient of restitution. 1.0 is a perfectly elastic bounce.
pub const RESTITUTION: f64 = 1.0;

/// Contact normal used when two particles are exactly concentric and the
/// separation vector has no direction.
pub const FALLBACK_NORMAL: Vector2D = Vector2D::X;
