//! Side-effect requests and transient visual effects
//!
//! Pipelines and terrain behaviors never mutate the world directly; they post
//! [`SideEffect`]s that the world owner applies at a well-defined point.
//! Visual effects are simulated here (simple kinematics) and drawn elsewhere.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actors::{ActorId, ActorSpawn};
use super::score::ScoreKind;
use super::terrain::TileChange;
use crate::consts::{QUADRANT_SIZE, TILE_SIZE};

/// Maximum live effects
pub const MAX_EFFECTS: usize = 64;

const COIN_JUMP_VELOCITY: f32 = 260.0;
const COIN_GRAVITY: f32 = 700.0;
/// Coin ends once it falls back to this height above its start
const COIN_END_OFFSET: f32 = 16.0;
const COIN_FRAME_TIME: f32 = 1.0 / 30.0;

const SHARD_HORIZONTAL_VELOCITY: f32 = 60.0;
const SHARD_TOP_VELOCITY: f32 = 220.0;
const SHARD_BOTTOM_VELOCITY: f32 = 160.0;
const SHARD_GRAVITY: f32 = 700.0;
const SHARD_SPIN: f32 = 540.0;
const SHARD_LIFETIME: f32 = 1.2;

const POPUP_RISE_SPEED: f32 = 40.0;
const POPUP_LIFETIME: f32 = 0.8;

/// A visual effect the renderer should show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectRequest {
    /// Coin popping out of a tile; `pos` is the tile's top-left corner
    CoinSparkle { pos: Vec2 },
    /// Four brick shards bursting from the tile whose bottom-left is `tile_origin`
    SmashShards { tile_origin: Vec2 },
    /// Floating score text
    ScorePopup { pos: Vec2, value: u32 },
}

/// A request posted to the world owner
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    SpawnEffect(EffectRequest),
    SpawnActor(ActorSpawn),
    ChangeTile(TileChange),
    /// Flat score award
    AwardScore(u32),
    /// Combo-tracked score for an actor interaction
    ActorScore {
        kind: ScoreKind,
        source: Option<ActorId>,
        pos: Vec2,
    },
    CollectCoins(u32),
    RemoveActor(ActorId),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    Coin { start_y: f32, frame: u8, frame_timer: f32 },
    Shard { corner: ShardCorner, angle: f32, spin: f32 },
    Popup { value: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShardCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A live effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: f32,
    /// Gravity pulling the effect down (pixels/s²)
    pub gravity: f32,
}

impl Effect {
    /// Advance one step; returns false once finished
    fn update(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.pos += self.vel * dt;
        self.vel.y -= self.gravity * dt;

        match &mut self.kind {
            EffectKind::Coin {
                start_y,
                frame,
                frame_timer,
            } => {
                *frame_timer += dt;
                while *frame_timer >= COIN_FRAME_TIME {
                    *frame = (*frame + 1) % 4;
                    *frame_timer -= COIN_FRAME_TIME;
                }
                !(self.vel.y < 0.0 && self.pos.y <= *start_y + COIN_END_OFFSET)
            }
            EffectKind::Shard { angle, spin, .. } => {
                *angle += *spin * dt;
                self.age < SHARD_LIFETIME
            }
            EffectKind::Popup { .. } => self.age < POPUP_LIFETIME,
        }
    }
}

/// Owns and steps all live effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectManager {
    pub effects: Vec<Effect>,
}

impl EffectManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand a request into live effects
    pub fn spawn(&mut self, request: &EffectRequest) {
        match *request {
            EffectRequest::CoinSparkle { pos } => self.push(Effect {
                kind: EffectKind::Coin {
                    start_y: pos.y,
                    frame: 0,
                    frame_timer: 0.0,
                },
                pos,
                vel: Vec2::new(0.0, COIN_JUMP_VELOCITY),
                age: 0.0,
                gravity: COIN_GRAVITY,
            }),
            EffectRequest::SmashShards { tile_origin } => {
                let half = QUADRANT_SIZE / 2.0;
                let left = tile_origin.x + half;
                let right = tile_origin.x + TILE_SIZE - half;
                let top = tile_origin.y + TILE_SIZE - half;
                let bottom = tile_origin.y + half;
                let shards = [
                    (ShardCorner::TopLeft, left, top, -1.0, SHARD_TOP_VELOCITY, 1.0),
                    (ShardCorner::TopRight, right, top, 1.0, SHARD_TOP_VELOCITY, 1.0),
                    (ShardCorner::BottomLeft, left, bottom, -1.0, SHARD_BOTTOM_VELOCITY, 0.8),
                    (ShardCorner::BottomRight, right, bottom, 1.0, SHARD_BOTTOM_VELOCITY, 0.8),
                ];
                for (corner, x, y, dir, vy, scale) in shards {
                    self.push(Effect {
                        kind: EffectKind::Shard {
                            corner,
                            angle: 0.0,
                            spin: dir * SHARD_SPIN * scale,
                        },
                        pos: Vec2::new(x, y),
                        vel: Vec2::new(dir * SHARD_HORIZONTAL_VELOCITY * scale, vy),
                        age: 0.0,
                        gravity: SHARD_GRAVITY,
                    });
                }
            }
            EffectRequest::ScorePopup { pos, value } => self.push(Effect {
                kind: EffectKind::Popup { value },
                pos,
                vel: Vec2::new(0.0, POPUP_RISE_SPEED),
                age: 0.0,
                gravity: 0.0,
            }),
        }
    }

    fn push(&mut self, effect: Effect) {
        if self.effects.len() >= MAX_EFFECTS {
            // Drop the oldest to make room
            self.effects.remove(0);
        }
        self.effects.push(effect);
    }

    pub fn update(&mut self, dt: f32) {
        self.effects.retain_mut(|e| e.update(dt));
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
