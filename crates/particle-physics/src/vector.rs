//! 2D vector type
//!
//! `Vector2D` is glam's `DVec2`, so `+`, `-`, scalar `*`, `dot` and `length`
//! are plain value operations that return new vectors. What glam leaves to the
//! caller is the zero-length case of normalization, which is handled here.

use crate::error::PhysicsError;
use glam::DVec2;

pub type Vector2D = DVec2;

/// Unit vector pointing the same way as `v`.
///
/// Fails with [`PhysicsError::DegenerateVector`] when `v` has zero (or
/// non-finite) length instead of dividing by zero.
pub fn normalize(v: Vector2D) -> Result<Vector2D, PhysicsError> {
    v.try_normalize()
        .ok_or(PhysicsError::DegenerateVector { x: v.x, y: v.y })
}

/// In-place variant of [`normalize`]. `v` is left untouched on error.
pub fn normalize_in_place(v: &mut Vector2D) -> Result<(), PhysicsError> {
    *v = normalize(*v)?;
    Ok(())
}
