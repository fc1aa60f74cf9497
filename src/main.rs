//! Particle Collision Simulation
//!
//! Headless host for the collision engine. A dedicated loop thread advances
//! the simulation once per frame and packs the circles into an instance
//! buffer, the way a renderer would; the main thread plays the part of the
//! windowing system, delivering a surface resize and finally stopping the loop.

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use particle_physics::SpeedRange;
use particle_simulation::{
    QuadTreeParams, SharedSimulation, Simulation, SimulationError, SimulationParams, StepStats,
};

const PARTICLE_COUNT: usize = 50;
const PARTICLE_RADIUS: f64 = 10.0;
const PARTICLE_MASS: f64 = 10.0;
const CANVAS_WIDTH: f64 = 320.0;
const CANVAS_HEIGHT: f64 = 320.0;
const RESIZED_WIDTH: f64 = 480.0;
const RESIZED_HEIGHT: f64 = 800.0;

const FRAME_TIME: Duration = Duration::from_millis(16);
const RUN_TIME: Duration = Duration::from_secs(4);
const REPORT_EVERY: u64 = 60;

/// What the loop thread pulls out of the simulation while it holds the lock
struct FrameSummary {
    frame: u64,
    stats: StepStats,
    energy: f64,
    instance_bytes: usize,
}

/// Drive the simulation until `running` is cleared. Returns the number of
/// frames rendered.
fn run_loop(
    simulation: SharedSimulation,
    running: Arc<AtomicBool>,
    epoch: Instant,
) -> Result<u64, SimulationError> {
    let mut rendered = 0;
    let mut last_reported = 0;

    while running.load(Ordering::Acquire) {
        let now = epoch.elapsed();
        let summary = simulation.frame(now, |sim| {
            let instances = sim.instances();
            FrameSummary {
                frame: sim.frame(),
                stats: sim.last_stats(),
                energy: sim.kinetic_energy(),
                instance_bytes: bytemuck::cast_slice::<_, u8>(instances.as_slice()).len(),
            }
        })?;
        rendered += 1;

        if summary.frame >= last_reported + REPORT_EVERY {
            last_reported = summary.frame;
            log::info!(
                "frame {}: {} candidate checks, {} collisions ({} bounces), {} respawns, energy {:.1}, {} bytes uploaded",
                summary.frame,
                summary.stats.candidate_checks,
                summary.stats.collisions,
                summary.stats.bounces,
                summary.stats.respawns,
                summary.energy,
                summary.instance_bytes
            );
        }
        if summary.stats.degenerate_contacts > 0 {
            log::debug!(
                "frame {}: {} concentric contacts separated along the fallback normal",
                summary.frame,
                summary.stats.degenerate_contacts
            );
        }

        thread::sleep(FRAME_TIME);
    }

    Ok(rendered)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting particle collision simulation...");

    let params = SimulationParams {
        particle_count: PARTICLE_COUNT,
        radius: PARTICLE_RADIUS,
        mass: PARTICLE_MASS,
        spawn_speed: SpeedRange::default(),
        quadtree: QuadTreeParams::default(),
        ..Default::default()
    };
    let simulation = Simulation::with_params(params, CANVAS_WIDTH, CANVAS_HEIGHT)?;
    log::info!(
        "✓ Initialized {} particles on a {}x{} canvas",
        PARTICLE_COUNT,
        CANVAS_WIDTH,
        CANVAS_HEIGHT
    );

    let shared = SharedSimulation::new(simulation);
    let running = Arc::new(AtomicBool::new(true));
    let epoch = Instant::now();

    let loop_thread = {
        let shared = shared.clone();
        let running = Arc::clone(&running);
        thread::spawn(move || run_loop(shared, running, epoch))
    };

    thread::sleep(RUN_TIME / 2);
    shared.resize(RESIZED_WIDTH, RESIZED_HEIGHT)?;
    log::info!("✓ Surface resized to {}x{}", RESIZED_WIDTH, RESIZED_HEIGHT);

    thread::sleep(RUN_TIME / 2);
    running.store(false, Ordering::Release);
    let rendered = loop_thread
        .join()
        .map_err(|_| "simulation loop thread panicked")??;

    let (frames, energy) = shared.with(|sim| (sim.frame(), sim.kinetic_energy()))?;
    log::info!(
        "✓ Stopped after {} rendered frames ({} simulated), final energy {:.1}",
        rendered,
        frames,
        energy
    );

    Ok(())
}
