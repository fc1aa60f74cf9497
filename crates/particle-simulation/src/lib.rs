//! # Particle Simulation Engine
//!
//! Per-frame orchestration of the collision demo: a quadtree rebuilt every
//! frame narrows the pairwise checks, and the physics crate resolves each
//! contact. Hosts drive it through [`Simulation`] or, when the frame loop
//! runs on its own thread, through [`SharedSimulation`].

pub mod error;
pub mod params;
pub mod quadtree;
pub mod rectangle;
pub mod render;
pub mod shared;
pub mod simulation;

pub use error::*;
pub use params::*;
pub use quadtree::*;
pub use rectangle::*;
pub use render::*;
pub use shared::*;
pub use simulation::*;
