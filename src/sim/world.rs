//! World owner
//!
//! Owns every piece of mutable simulation state and advances it one fixed
//! frame at a time. Per frame, in order:
//! 1. the player pipeline on working copies of player and camera
//! 2. commit (or discard, on a terminating event) and apply side effects
//! 3. actor update: own pipelines, culling, actor-vs-actor pass
//! 4. terrain behaviors
//! 5. visual effects

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actors::{ActorManager, ActorSpawn};
use super::camera::Camera;
use super::effects::{EffectManager, EffectRequest, SideEffect};
use super::level::{Level, VisibleTile};
use super::pipeline::{FrameContext, PlayerPipeline};
use super::score::ScoreTracker;
use super::state::{PhysicsEvent, PlayerIntent, PlayerState, WarpEvent};
use crate::consts::{NATIVE_WIDTH, SCREEN_WIDTH_TILES, TILE_SIZE};
use crate::tuning::PhysicsConfig;

/// Serializable view of the dynamic state, for comparisons and tooling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub frame: u64,
    pub player: PlayerState,
    pub camera: Camera,
    pub actors: ActorManager,
    pub score: u32,
    pub coins: u32,
}

#[derive(Debug, Clone)]
pub struct World {
    level: Level,
    config: PhysicsConfig,
    pipeline: PlayerPipeline,
    player: PlayerState,
    camera: Camera,
    actors: ActorManager,
    effects: EffectManager,
    scores: ScoreTracker,
    roster: Vec<ActorSpawn>,
    score: u32,
    coins: u32,
    frame: u64,
}

impl World {
    pub fn new(level: Level, config: PhysicsConfig) -> Self {
        let player = PlayerState::new(level.spawn_point());
        let actors = ActorManager::new(config.actors);
        Self {
            level,
            config,
            pipeline: PlayerPipeline::standard(),
            player,
            camera: Camera::new(),
            actors,
            effects: EffectManager::new(),
            scores: ScoreTracker::new(),
            roster: Vec::new(),
            score: 0,
            coins: 0,
            frame: 0,
        }
    }

    /// Actors placed at level start and on every restart
    pub fn with_actors(mut self, roster: Vec<ActorSpawn>) -> Self {
        for spawn in &roster {
            self.actors.spawn(spawn);
        }
        self.roster = roster;
        self
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn actors(&self) -> &ActorManager {
        &self.actors
    }

    pub fn actors_mut(&mut self) -> &mut ActorManager {
        &mut self.actors
    }

    pub fn effects(&self) -> &EffectManager {
        &self.effects
    }

    pub fn scores(&self) -> &ScoreTracker {
        &self.scores
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Tiles in the current viewport, animated for the current frame
    pub fn visible_tiles(&self) -> Vec<VisibleTile> {
        self.level.get_visible_tiles(self.camera.x, self.frame)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            frame: self.frame,
            player: self.player.clone(),
            camera: self.camera,
            actors: self.actors.clone(),
            score: self.score,
            coins: self.coins,
        }
    }

    /// Advance one frame. Returns the terminating event, if any; on such a
    /// frame the player's working copy and its side effects are discarded.
    pub fn step(&mut self, intent: PlayerIntent, dt: f32) -> Option<PhysicsEvent> {
        self.frame += 1;

        let mut ctx = FrameContext::new(
            self.player.clone(),
            intent,
            self.camera,
            &self.level,
            &mut self.actors,
            &self.config,
            dt,
        );
        let event = self.pipeline.run(&mut ctx);
        let FrameContext {
            player,
            camera,
            effects,
            tile_hits,
            ..
        } = ctx;

        match &event {
            None => {
                self.player = player;
                self.camera = camera;
                if !self.player.is_dying {
                    self.camera
                        .follow(self.player.center_x(), self.level.width_px());
                }
                let mut pending = effects;
                for key in tile_hits {
                    self.level
                        .terrain_mut()
                        .hit_from_below(key, self.player.size, &mut pending);
                }
                self.apply_side_effects(pending);
            }
            Some(PhysicsEvent::Death) => {
                self.player.begin_dying(self.config.death.leap_velocity);
                log::info!("player died at frame {}", self.frame);
            }
            Some(other) => log::info!("frame {}: {other:?}", self.frame),
        }

        if self.player.on_ground {
            self.scores.reset_stomp_chain();
        }

        let actor_frame = self.actors.update(&self.level, self.camera.x, dt);
        for id in actor_frame.removed {
            self.scores.forget(id);
        }
        self.apply_side_effects(actor_frame.effects);

        self.level.terrain_mut().update(dt);
        self.effects.update(dt);
        event
    }

    /// The single point where posted requests mutate the world
    fn apply_side_effects(&mut self, effects: Vec<SideEffect>) {
        for effect in effects {
            match effect {
                SideEffect::SpawnEffect(request) => self.effects.spawn(&request),
                SideEffect::SpawnActor(spawn) => {
                    self.actors.spawn(&spawn);
                }
                SideEffect::ChangeTile(change) => self.level.apply_tile_change(&change),
                SideEffect::AwardScore(points) => self.score += points,
                SideEffect::ActorScore { kind, source, pos } => {
                    let value = self.scores.award(kind, source);
                    self.score += value;
                    self.effects
                        .spawn(&EffectRequest::ScorePopup { pos, value });
                    log::debug!("{kind:?} +{value}");
                }
                SideEffect::CollectCoins(count) => self.coins += count,
                SideEffect::RemoveActor(id) => {
                    self.actors.remove(id);
                    self.scores.forget(id);
                }
            }
        }
    }

    /// Move the player onto a warp's destination zone. Returns false if the
    /// zone cannot be found, which level validation rules out.
    pub fn apply_warp(&mut self, warp: &WarpEvent) -> bool {
        let dest = &warp.destination;
        let Some(zone) = self.level.find_zone_position(dest.to_screen, dest.to_zone) else {
            log::warn!("warp zone {:?} not found", dest);
            return false;
        };
        let column = (dest.to_screen * SCREEN_WIDTH_TILES) as f32 + zone.x;
        self.player.pos = Vec2::new(column * TILE_SIZE, zone.y * TILE_SIZE);
        self.player.vel = Vec2::ZERO;
        self.player.on_ground = false;
        self.player.is_jumping = false;
        let screen_left = (dest.to_screen as f32) * NATIVE_WIDTH;
        self.camera.jump_to(screen_left, self.level.width_px());
        log::info!("warped to screen {} zone '{}'", dest.to_screen, dest.to_zone);
        true
    }

    /// Reset player, camera, actors, effects, and terrain to level start
    pub fn restart_level(&mut self) {
        self.level.reset_terrain();
        self.player = PlayerState::new(self.level.spawn_point());
        self.camera = Camera::new();
        self.actors.clear();
        for spawn in &self.roster {
            self.actors.spawn(spawn);
        }
        self.effects.clear();
        self.scores.reset();
        log::info!("level restarted");
    }
}
