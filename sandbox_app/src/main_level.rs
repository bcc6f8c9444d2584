//! Level collision demo
//!
//! Loads a level (or builds a small default one), drops its bodies into it
//! and runs a fixed number of ticks:
//! - Gravity plus each body's desired velocity, with a little seeded jitter
//! - Movement resolved with the slide policy
//! - Final positions, grounded state and line of sight logged at the end
//!
//! Usage: `level_demo [level.ron|level.toml]`

use collision_engine::config::{CollisionConfig, Config, ConfigError};
use collision_engine::debug::BoundsOverlay;
use collision_engine::foundation::math::Vec2;
use collision_engine::level::{BodyDesc, CollisionWorld, LevelDesc, LevelError, LineOfSight, StaticBoxDesc};
use collision_engine::physics::{slide, BoxKey, CollisionError, LayerMask};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Simulation settings
const TICKS: usize = 120;
const GRAVITY: f32 = 0.5;
const MAX_FALL_SPEED: f32 = 8.0;
const JITTER: f32 = 0.75;
const SEED: u64 = 0x5eed;
const SIGHT_RANGE: f32 = 400.0;

/// Errors that end the demo
#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("failed to load level: {0}")]
    Load(#[from] ConfigError),

    #[error("failed to build level: {0}")]
    Level(#[from] LevelError),

    #[error("collision error: {0}")]
    Collision(#[from] CollisionError),
}

/// A body driven by the demo
struct Walker {
    key: BoxKey,
    desired: Vec2,
    fall_speed: f32,
}

struct LevelDemoApp {
    world: CollisionWorld,
    walkers: Vec<Walker>,
    rng: StdRng,
    overlay: BoundsOverlay,
}

/// Floor, two walls, a ledge and a coin; one player and one enemy
fn default_level() -> LevelDesc {
    let solid = |x: f32, y: f32, w: f32, h: f32| StaticBoxDesc {
        position: [x, y],
        size: [w, h],
        origin: [0.0, 0.0],
        layer: LayerMask::SOLID,
    };
    LevelDesc {
        cell_size: Some(16.0),
        statics: vec![
            solid(0.0, 160.0, 320.0, 16.0),
            solid(0.0, 0.0, 16.0, 160.0),
            solid(304.0, 0.0, 16.0, 160.0),
            solid(96.0, 112.0, 64.0, 8.0),
            StaticBoxDesc {
                position: [200.0, 140.0],
                size: [8.0, 8.0],
                origin: [0.0, 0.0],
                layer: LayerMask::PICKUP,
            },
        ],
        bodies: vec![
            BodyDesc {
                position: [32.0, 40.0],
                size: [12.0, 20.0],
                origin: [0.0, 0.0],
                layer: LayerMask::PLAYER,
                velocity: [3.0, 0.0],
            },
            BodyDesc {
                position: [260.0, 20.0],
                size: [14.0, 14.0],
                origin: [0.0, 0.0],
                layer: LayerMask::ENEMY,
                velocity: [-2.0, 0.0],
            },
        ],
    }
}

impl LevelDemoApp {
    fn new(level_path: Option<&str>) -> Result<Self, DemoError> {
        let level = match level_path {
            Some(path) => {
                info!("Loading level from {path}");
                LevelDesc::load_from_file(path)?
            }
            None => {
                info!("No level given, using the built-in one");
                default_level()
            }
        };

        let (world, keys) = CollisionWorld::from_level(&level, CollisionConfig::default())?;
        let walkers = keys
            .into_iter()
            .zip(&level.bodies)
            .map(|(key, desc)| Walker {
                key,
                desired: desc.velocity(),
                fall_speed: 0.0,
            })
            .collect();

        Ok(Self {
            world,
            walkers,
            rng: StdRng::seed_from_u64(SEED),
            overlay: BoundsOverlay::new(),
        })
    }

    fn tick(&mut self, tick: usize) -> Result<(), DemoError> {
        for walker in &mut self.walkers {
            if self.world.is_grounded(walker.key)? {
                walker.fall_speed = 0.0;
            } else {
                walker.fall_speed = (walker.fall_speed + GRAVITY).min(MAX_FALL_SPEED);
            }

            let jitter = Vec2::new(self.rng.gen_range(-JITTER..=JITTER), 0.0);
            let velocity = walker.desired + jitter + Vec2::new(0.0, walker.fall_speed);
            let report = self.world.move_body(walker.key, velocity, &mut slide)?;

            if report.overflowed {
                warn!("tick {tick}: {:?} stopped early after {} resolutions", walker.key, report.iterations);
            }
            // Turn around on walls
            if report.contacts.iter().any(|c| {
                self.world
                    .bounds(*c)
                    .map(|b| b.height() > b.width())
                    .unwrap_or(false)
            }) {
                walker.desired.x = -walker.desired.x;
                debug!("tick {tick}: {:?} turned around at {:?}", walker.key, report.position);
            }

            let touching = self.world.trigger_overlap_filtered(walker.key, LayerMask::PICKUP)?;
            for pickup in touching {
                info!("tick {tick}: {:?} collected {pickup:?}", walker.key);
                self.world.despawn(pickup)?;
            }
        }
        Ok(())
    }

    fn run(mut self) -> Result<(), DemoError> {
        for tick in 0..TICKS {
            self.tick(tick)?;
        }

        for walker in &self.walkers {
            let position = self.world.bounds(walker.key)?.min;
            let grounded = self.world.is_grounded(walker.key)?;
            info!("{:?} ended at ({:.2}, {:.2}), grounded: {grounded}", walker.key, position.x, position.y);
        }

        if let [first, second, ..] = self.walkers.as_slice() {
            match self.world.line_of_sight(first.key, second.key, SIGHT_RANGE)? {
                LineOfSight::Visible { distance } => info!("Bodies see each other at {distance:.1}"),
                LineOfSight::Blocked { by, distance } => info!("Line of sight blocked by {by:?} after {distance:.1}"),
                LineOfSight::OutOfRange { distance } => info!("Bodies out of sight range ({distance:.1})"),
            }
        }

        let rects = self.overlay.collect(&self.world);
        info!("{} boxes left, {} debug rectangles", self.world.len(), rects.len());
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== Level Collision Demo ===");
    println!("Runs {TICKS} ticks of gravity and walking, then reports where everything ended up.");
    println!("Set RUST_LOG=debug for per-contact output.");
    println!();

    let path = std::env::args().nth(1);
    let app = LevelDemoApp::new(path.as_deref())?;
    app.run()?;
    Ok(())
}
