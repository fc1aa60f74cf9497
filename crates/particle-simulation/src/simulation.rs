//! Per-frame particle simulation
//!
//! Each tick rebuilds the quadtree from frame-start positions, then walks the
//! particles in index order: integrate, respawn if it left the playfield,
//! collect quadtree candidates and resolve every overlap among them. With
//! [`BroadPhase::AllPairs`] the tree is skipped and each particle is tested
//! against every particle after it.
//!
//! Resolution mutates both particles of a pair immediately, so a particle
//! handled later in the pass sees positions already corrected earlier in the
//! same pass. That order dependence is part of the behavior; particle order is
//! the `Vec` order and candidates come back sorted by handle, so a given seed
//! always replays the same frames.

use std::collections::BTreeSet;
use std::time::Duration;

use particle_physics::{Particle, Resolution};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::SimulationError;
use crate::params::{ensure_positive, validate_playfield, BroadPhase, SimulationParams};
use crate::quadtree::QuadTree;
use crate::rectangle::Rectangle;
use crate::render::{Circle, CircleInstance};

/// Counters for a single tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Candidate pairs tested for overlap
    pub candidate_checks: usize,
    /// Pairs found overlapping and resolved
    pub collisions: usize,
    /// Resolved pairs that exchanged impulse
    pub bounces: usize,
    pub respawns: usize,
    /// Concentric pairs separated along the fallback normal
    pub degenerate_contacts: usize,
}

pub struct Simulation {
    params: SimulationParams,
    width: f64,
    height: f64,
    particles: Vec<Particle>,
    tree: QuadTree,
    rng: StdRng,
    resume_at: Duration,
    frame: u64,
    last_stats: StepStats,
    neighbours: BTreeSet<usize>,
}

impl Simulation {
    /// `particle_count` identical particles scattered over the playfield,
    /// everything else at its default
    pub fn initialize(
        particle_count: usize,
        radius: f64,
        mass: f64,
        width: f64,
        height: f64,
    ) -> Result<Self, SimulationError> {
        let params = SimulationParams {
            particle_count,
            radius,
            mass,
            ..Default::default()
        };
        Self::with_params(params, width, height)
    }

    pub fn with_params(
        params: SimulationParams,
        width: f64,
        height: f64,
    ) -> Result<Self, SimulationError> {
        params.validate()?;
        validate_playfield(width, height)?;

        let mut rng = StdRng::seed_from_u64(params.seed);
        let particles = (0..params.particle_count)
            .map(|_| {
                let mut particle = Particle::new(params.radius, params.mass);
                particle.randomize(width, height, &params.spawn_speed, &mut rng);
                particle
            })
            .collect();

        log::debug!(
            "Initialized {} particles (radius {}, mass {}) on a {}x{} playfield",
            params.particle_count,
            params.radius,
            params.mass,
            width,
            height
        );

        Ok(Self::assemble(params, width, height, particles, rng))
    }

    /// Start from hand-placed particles.
    ///
    /// `params.particle_count`, `radius` and `mass` are ignored in favor of
    /// the particles given; the seed still drives respawns.
    pub fn from_particles(
        params: SimulationParams,
        width: f64,
        height: f64,
        particles: Vec<Particle>,
    ) -> Result<Self, SimulationError> {
        params.validate_shared()?;
        validate_playfield(width, height)?;
        if particles.is_empty() {
            return Err(SimulationError::invalid(
                "particles",
                "at least one particle is required",
            ));
        }
        for particle in &particles {
            ensure_positive("radius", particle.radius())?;
            ensure_positive("mass", particle.mass())?;
        }

        let params = SimulationParams {
            particle_count: particles.len(),
            ..params
        };
        let rng = StdRng::seed_from_u64(params.seed);
        Ok(Self::assemble(params, width, height, particles, rng))
    }

    fn assemble(
        params: SimulationParams,
        width: f64,
        height: f64,
        particles: Vec<Particle>,
        rng: StdRng,
    ) -> Self {
        let tree = QuadTree::new(Rectangle::new(0.0, 0.0, width, height), params.quadtree);
        Self {
            params,
            width,
            height,
            particles,
            tree,
            rng,
            resume_at: params.start_delay,
            frame: 0,
            last_stats: StepStats::default(),
            neighbours: BTreeSet::new(),
        }
    }

    /// New playfield size. Particles are left where they are.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), SimulationError> {
        validate_playfield(width, height)?;
        self.width = width;
        self.height = height;
        self.tree.set_bounds(Rectangle::new(0.0, 0.0, width, height));
        log::debug!("Playfield resized to {}x{}", width, height);
        Ok(())
    }

    /// Scatter every particle again and freeze physics for the start delay
    pub fn reset(&mut self, now: Duration) {
        for particle in &mut self.particles {
            particle.randomize(self.width, self.height, &self.params.spawn_speed, &mut self.rng);
        }
        self.resume_at = now + self.params.start_delay;
        self.last_stats = StepStats::default();
        log::debug!("Simulation reset, resuming at {:?}", self.resume_at);
    }

    /// Run one tick and return the circles to draw, one per particle in a
    /// stable order
    pub fn step(&mut self, now: Duration) -> Vec<Circle> {
        self.advance(now);
        self.circles().collect()
    }

    /// Run one tick. Returns false while physics is still frozen by the
    /// start delay.
    pub fn advance(&mut self, now: Duration) -> bool {
        if now < self.resume_at {
            return false;
        }

        let mut stats = StepStats::default();
        match self.params.broad_phase {
            BroadPhase::QuadTree => self.tick_quadtree(now, &mut stats),
            BroadPhase::AllPairs => self.tick_all_pairs(now, &mut stats),
        }

        self.frame += 1;
        self.last_stats = stats;
        log::trace!("frame {}: {:?}", self.frame, stats);
        true
    }

    fn tick_quadtree(&mut self, now: Duration, stats: &mut StepStats) {
        self.tree.clear();
        for handle in 0..self.particles.len() {
            self.tree.insert(&self.particles, handle);
        }

        for i in 0..self.particles.len() {
            self.integrate(i, now, stats);

            self.neighbours.clear();
            self.tree.retrieve_into(&self.particles[i], &mut self.neighbours);
            for &j in &self.neighbours {
                if j != i {
                    collide_pair(&mut self.particles, i, j, stats);
                }
            }
        }
    }

    /// Each particle is tested against every later one, before the later one
    /// has moved this tick
    fn tick_all_pairs(&mut self, now: Duration, stats: &mut StepStats) {
        for i in 0..self.particles.len() {
            self.integrate(i, now, stats);
            for j in i + 1..self.particles.len() {
                collide_pair(&mut self.particles, i, j, stats);
            }
        }
    }

    fn integrate(&mut self, i: usize, now: Duration, stats: &mut StepStats) {
        let particle = &mut self.particles[i];
        particle.update(now);
        if particle.handle_boundary_exit(
            self.width,
            self.height,
            &self.params.spawn_speed,
            &mut self.rng,
        ) {
            stats.respawns += 1;
        }
    }

    pub fn circles(&self) -> impl ExactSizeIterator<Item = Circle> + '_ {
        self.particles.iter().map(Circle::from)
    }

    /// Circles packed for an instance buffer
    pub fn instances(&self) -> Vec<CircleInstance> {
        self.circles().map(CircleInstance::from).collect()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// The broad-phase tree as built on the last tick. Stays empty under
    /// [`BroadPhase::AllPairs`].
    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Ticks actually simulated (frozen frames excluded)
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn last_stats(&self) -> StepStats {
        self.last_stats
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }
}

fn collide_pair(particles: &mut [Particle], i: usize, j: usize, stats: &mut StepStats) {
    stats.candidate_checks += 1;
    let (a, b) = pair_mut(particles, i, j);
    if let Some(contact) = a.collide_with(b) {
        stats.collisions += 1;
        if contact.resolution == Resolution::Bounced {
            stats.bounces += 1;
        }
        if contact.degenerate {
            stats.degenerate_contacts += 1;
        }
    }
}

/// Mutable borrows of two distinct particles
fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = particles.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = particles.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}
