//! Simulation shared between a frame-loop thread and the rest of the host
//!
//! Advancing a tick and reading the particles for drawing happen under one
//! lock, so a reader never observes a half-resolved frame. The simulation
//! itself has no interior locking; this handle is the only synchronization.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::SimulationError;
use crate::simulation::Simulation;

#[derive(Clone)]
pub struct SharedSimulation {
    inner: Arc<Mutex<Simulation>>,
}

impl SharedSimulation {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            inner: Arc::new(Mutex::new(simulation)),
        }
    }

    /// Advance one tick and hand the result to `draw` without releasing the
    /// lock in between
    pub fn frame<R>(
        &self,
        now: Duration,
        draw: impl FnOnce(&Simulation) -> R,
    ) -> Result<R, SimulationError> {
        let mut simulation = self.lock()?;
        simulation.advance(now);
        Ok(draw(&simulation))
    }

    pub fn resize(&self, width: f64, height: f64) -> Result<(), SimulationError> {
        self.lock()?.resize(width, height)
    }

    pub fn reset(&self, now: Duration) -> Result<(), SimulationError> {
        self.lock()?.reset(now);
        Ok(())
    }

    /// Read access outside of a frame
    pub fn with<R>(&self, read: impl FnOnce(&Simulation) -> R) -> Result<R, SimulationError> {
        let simulation = self.lock()?;
        Ok(read(&simulation))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Simulation>, SimulationError> {
        self.inner.lock().map_err(|_| SimulationError::LockPoisoned)
    }
}
