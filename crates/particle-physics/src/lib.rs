//! # Particle Physics
//!
//! Contact physics for circular particles in a bounded 2D playfield: the
//! vector type, the particle body with its per-frame kinematics, and the
//! elastic impulse resolver used when two particles overlap.

pub mod collision;
pub mod constants;
pub mod error;
pub mod particle;
pub mod vector;

pub use collision::*;
pub use constants::*;
pub use error::*;
pub use particle::*;
pub use vector::Vector2D;
