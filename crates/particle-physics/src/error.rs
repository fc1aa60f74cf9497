//! Errors raised by the physics primitives

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PhysicsError {
    /// Normalizing a zero-length vector. Happens when two particles share the
    /// exact same center.
    #[error("cannot normalize degenerate vector ({x}, {y})")]
    DegenerateVector { x: f64, y: f64 },
}
