//! Tile Runner headless demo
//!
//! Builds a small level in code and drives the world with a seeded intent
//! script at the fixed timestep. Pass a physics config JSON path as the first
//! argument to override the default tuning.

#[cfg(not(target_arch = "wasm32"))]
use rand::{Rng, SeedableRng};
#[cfg(not(target_arch = "wasm32"))]
use rand_pcg::Pcg32;

#[cfg(not(target_arch = "wasm32"))]
use tile_runner::PhysicsConfig;
#[cfg(not(target_arch = "wasm32"))]
use tile_runner::consts::SIM_DT;
#[cfg(not(target_arch = "wasm32"))]
use tile_runner::sim::{
    ActorKind, ActorSpawn, BehaviorSpec, Level, LevelBuilder, PhysicsEvent, PlayerIntent,
    TileLibrary, World,
};

/// Frames before giving up on reaching the goal
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u64 = 60 * 120;
/// Frames the death sequence plays before the level restarts
#[cfg(not(target_arch = "wasm32"))]
const DEATH_FRAMES: u32 = 150;
#[cfg(not(target_arch = "wasm32"))]
const SEED: u64 = 0x5EED;

#[cfg(not(target_arch = "wasm32"))]
fn demo_level() -> Result<Level, tile_runner::LevelError> {
    let warp = BehaviorSpec::Warp {
        to_screen: Some(2),
        to_zone: Some("a".into()),
    };
    LevelBuilder::new(TileLibrary::standard(), 4, 14)
        .fill((0, 20), (0, 1), "ground")
        .fill((23, 63), (0, 1), "ground")
        .tile(6, 4, "item_box")
        .behavior(6, 4, BehaviorSpec::ItemBox {
            spawn: "coin".into(),
            spawns: 3,
        })
        .fill((8, 10), (4, 4), "brick")
        .behavior(8, 4, BehaviorSpec::Breakable)
        .behavior(9, 4, BehaviorSpec::Breakable)
        .behavior(10, 4, BehaviorSpec::Breakable)
        .tile(12, 4, "item_box")
        .behavior(12, 4, BehaviorSpec::ItemBox {
            spawn: "mushroom".into(),
            spawns: 1,
        })
        .fill((14, 16), (3, 3), "coin")
        .fill((26, 27), (2, 3), "pipe")
        .behavior(26, 3, warp)
        .zone(2, 3, 4, 'a')
        .zone(2, 4, 4, 'a')
        .fill((40, 41), (2, 2), "block")
        .fill((58, 58), (2, 11), "flagpole")
        .behavior(58, 2, BehaviorSpec::Goal)
        .build()
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> Result<PhysicsConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            Ok(PhysicsConfig::from_json(&json)?)
        }
        None => Ok(PhysicsConfig::default()),
    }
}

/// Mostly run right, with held jumps of random length
#[cfg(not(target_arch = "wasm32"))]
struct IntentScript {
    rng: Pcg32,
    jump_frames: u32,
}

#[cfg(not(target_arch = "wasm32"))]
impl IntentScript {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            jump_frames: 0,
        }
    }

    fn next(&mut self, on_ground: bool) -> PlayerIntent {
        if self.jump_frames == 0 && on_ground && self.rng.random_bool(0.04) {
            self.jump_frames = self.rng.random_range(4..30);
        }
        let jump = self.jump_frames > 0;
        self.jump_frames = self.jump_frames.saturating_sub(1);
        PlayerIntent {
            move_left: self.rng.random_bool(0.05),
            move_right: self.rng.random_bool(0.85),
            jump,
            run: self.rng.random_bool(0.5),
            duck: self.rng.random_bool(0.02),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let level = demo_level()?;
    let roster = vec![
        ActorSpawn {
            kind: ActorKind::Goomba,
            pos: glam::Vec2::new(280.0, 32.0),
            direction: -1.0,
        },
        ActorSpawn {
            kind: ActorKind::KoopaTroopa,
            pos: glam::Vec2::new(560.0, 32.0),
            direction: -1.0,
        },
        ActorSpawn {
            kind: ActorKind::Goomba,
            pos: glam::Vec2::new(760.0, 32.0),
            direction: -1.0,
        },
    ];
    let mut world = World::new(level, config).with_actors(roster);
    let mut script = IntentScript::new(SEED);
    let mut dying_frames = 0;
    let mut deaths = 0;

    while world.frame() < MAX_FRAMES {
        if world.player().is_dying {
            dying_frames += 1;
            if dying_frames >= DEATH_FRAMES {
                dying_frames = 0;
                world.restart_level();
            }
        }
        let intent = script.next(world.player().on_ground);
        match world.step(intent, SIM_DT) {
            None => {}
            Some(PhysicsEvent::Death) => deaths += 1,
            Some(PhysicsEvent::Warp(warp)) => {
                world.apply_warp(&warp);
            }
            Some(PhysicsEvent::EndLevel { x, .. }) => {
                log::info!("reached the goal at x={x} on frame {}", world.frame());
                break;
            }
        }
    }

    log::info!(
        "finished after {} frames: score {}, coins {}, deaths {}",
        world.frame(),
        world.score(),
        world.coins(),
        deaths
    );
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Tile Runner (headless) starting...");
    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation library is the wasm surface; there is no wasm binary
}
