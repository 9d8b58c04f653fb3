//! Tram Rush entry point
//!
//! Headless demo run: seeds a world, drives it at the fixed simulation
//! timestep with a scripted set of lane changes, and prints the final
//! progress snapshot as JSON. Useful for profiling the core and for
//! eyeballing difficulty curves without a renderer attached.

use tram_rush::consts::SIM_DT;
use tram_rush::sim::CollisionEvent;
use tram_rush::{GameConfig, World, WorldEvent};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xC0FFEE);
    let max_seconds: f32 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(120.0);

    let mut world = match World::new(seed, GameConfig::default()) {
        Ok(world) => world,
        Err(err) => {
            log::error!("configuration rejected: {err}");
            std::process::exit(1);
        }
    };

    log::info!("running up to {max_seconds}s of simulation (seed {seed})");

    let lane_count = world.config().lane_count;
    let max_ticks = (max_seconds / SIM_DT) as u64;
    let mut warnings = 0u64;

    for tick in 0..max_ticks {
        world.advance(SIM_DT);

        // Scripted driving: swerve toward a new lane whenever something
        // collidable gets close, cycling deterministically through lanes.
        if world.proximity_alert(12.0) {
            let next = (tick as usize * 7 + 3) % lane_count + 1;
            let _ = world.request_lane_change(next);
            warnings += 1;
        }

        for event in world.drain_events() {
            if let WorldEvent::Collision(collision) = event {
                match collision {
                    CollisionEvent::Pedestrian { id } => {
                        log::debug!("struck pedestrian {id}")
                    }
                    CollisionEvent::Obstacle { id } => {
                        log::info!("hit obstacle {id}, run over")
                    }
                }
            }
        }

        if world.progress().game_over {
            break;
        }
    }

    let progress = world.snapshot();
    log::info!(
        "finished at z {:.1} after {} proximity warnings",
        world.tram().forward,
        warnings
    );
    println!("{}", progress.to_json());

    world.dispose();
}
