//! Terrain behaviors
//!
//! Behaviors are declared as [`BehaviorSpec`] data and built into
//! [`TerrainBehavior`] values. Each reacts to a hit from below or to elapsed
//! time by mutating its own tile's [`TileState`] and posting side effects.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{TileChange, TileKey, TileState};
use crate::sim::actors::{ActorKind, ActorSpawn};
use crate::sim::effects::{EffectRequest, SideEffect};
use crate::sim::state::SizeTier;
use crate::error::BehaviorError;
use crate::sim::tiles::EMPTY_SLUG;
use crate::tuning::TerrainTuning;

/// Scratch keys used in [`TileState::data`]
pub const KEY_BOUNCE_TIMER: &str = "bounce_timer";
pub const KEY_SMASHED: &str = "smashed";
pub const KEY_SPENT: &str = "spent";

/// Slug a depleted item box turns into
pub const USED_ITEM_BOX_SLUG: &str = "item_box_used";

/// Declarative behavior attached to a tile in level data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviorSpec {
    Bounce {
        #[serde(default)]
        one_shot: bool,
    },
    Breakable,
    ItemBox {
        #[serde(default = "default_reward")]
        spawn: String,
        #[serde(default = "default_spawns")]
        spawns: i64,
    },
    Warp {
        to_screen: Option<usize>,
        to_zone: Option<String>,
    },
    Goal,
    CastleExit {
        role: String,
        #[serde(default)]
        offset_x: f32,
        #[serde(default)]
        offset_y: f32,
    },
    #[serde(rename = "none")]
    Inert,
}

fn default_spawns() -> i64 {
    1
}

fn default_reward() -> String {
    "coin".to_string()
}

/// What an item box dispenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reward {
    Coin,
    Mushroom,
}

/// Which part of the castle sequence a marker drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastleRole {
    /// Where the player walks to after the flag
    Walk,
    /// Where the castle flag rises
    Flag,
}

/// Warp destination: a zone marker on another screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarpDestination {
    pub to_screen: usize,
    pub to_zone: char,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TerrainBehavior {
    Bounce { one_shot: bool },
    Breakable,
    ItemBox { reward: Reward, remaining: u32 },
    Warp(WarpDestination),
    Goal,
    CastleExit { role: CastleRole, offset: Vec2 },
    Inert,
}

impl BehaviorSpec {
    /// Validate and build
    pub fn build(&self) -> Result<TerrainBehavior, BehaviorError> {
        Ok(match self {
            BehaviorSpec::Bounce { one_shot } => TerrainBehavior::Bounce {
                one_shot: *one_shot,
            },
            BehaviorSpec::Breakable => TerrainBehavior::Breakable,
            BehaviorSpec::ItemBox { spawn, spawns } => {
                let reward = match spawn.as_str() {
                    "coin" => Reward::Coin,
                    "mushroom" => Reward::Mushroom,
                    other => return Err(BehaviorError::UnknownReward(other.to_string())),
                };
                let remaining = u32::try_from(*spawns)
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or(BehaviorError::SpawnCount(*spawns))?;
                TerrainBehavior::ItemBox { reward, remaining }
            }
            BehaviorSpec::Warp { to_screen, to_zone } => {
                let to_screen = to_screen.ok_or(BehaviorError::MissingWarpField("to_screen"))?;
                let zone = to_zone
                    .as_deref()
                    .ok_or(BehaviorError::MissingWarpField("to_zone"))?;
                let mut chars = zone.chars();
                let (Some(to_zone), None) = (chars.next(), chars.next()) else {
                    return Err(BehaviorError::ZoneName(zone.to_string()));
                };
                TerrainBehavior::Warp(WarpDestination { to_screen, to_zone })
            }
            BehaviorSpec::Goal => TerrainBehavior::Goal,
            BehaviorSpec::CastleExit {
                role,
                offset_x,
                offset_y,
            } => {
                let role = match role.as_str() {
                    "walk" => CastleRole::Walk,
                    "flag" => CastleRole::Flag,
                    other => return Err(BehaviorError::UnknownCastleRole(other.to_string())),
                };
                TerrainBehavior::CastleExit {
                    role,
                    offset: Vec2::new(*offset_x, *offset_y),
                }
            }
            BehaviorSpec::Inert => TerrainBehavior::Inert,
        })
    }
}

/// Bottom-left world position of a tile
pub fn tile_world_origin(key: TileKey) -> Vec2 {
    use crate::consts::{SCREEN_WIDTH_TILES, TILE_SIZE};
    let column = (key.screen * SCREEN_WIDTH_TILES) as i32 + key.x;
    Vec2::new(column as f32 * TILE_SIZE, key.y as f32 * TILE_SIZE)
}

impl TerrainBehavior {
    /// React to the player's head striking this tile
    pub fn on_hit_from_below(
        &mut self,
        key: TileKey,
        state: &mut TileState,
        size: SizeTier,
        tuning: &TerrainTuning,
        out: &mut Vec<SideEffect>,
    ) {
        match self {
            TerrainBehavior::Bounce { one_shot } => {
                if *one_shot && state.flag(KEY_SPENT) {
                    return;
                }
                state.start_bounce(tuning);
                if *one_shot {
                    state.set_flag(KEY_SPENT);
                }
            }
            TerrainBehavior::Breakable => {
                if size == SizeTier::Small {
                    state.start_bounce(tuning);
                    return;
                }
                if state.flag(KEY_SMASHED) {
                    return;
                }
                state.set_flag(KEY_SMASHED);
                let origin = tile_world_origin(key);
                out.push(SideEffect::SpawnEffect(EffectRequest::SmashShards {
                    tile_origin: origin,
                }));
                out.push(SideEffect::SpawnEffect(EffectRequest::ScorePopup {
                    pos: origin + Vec2::new(0.0, crate::consts::TILE_SIZE),
                    value: tuning.smash_score,
                }));
                out.push(SideEffect::AwardScore(tuning.smash_score));
                out.push(SideEffect::ChangeTile(TileChange {
                    key,
                    slug: EMPTY_SLUG.to_string(),
                    behavior: None,
                }));
            }
            TerrainBehavior::ItemBox { reward, remaining } => {
                if *remaining == 0 {
                    return;
                }
                *remaining -= 1;
                state.start_bounce(tuning);

                // Rewards appear on top of the box
                let top = tile_world_origin(key) + Vec2::new(0.0, crate::consts::TILE_SIZE);
                match reward {
                    Reward::Coin => {
                        out.push(SideEffect::SpawnEffect(EffectRequest::CoinSparkle { pos: top }));
                        out.push(SideEffect::CollectCoins(1));
                    }
                    Reward::Mushroom => out.push(SideEffect::SpawnActor(ActorSpawn {
                        kind: ActorKind::Mushroom,
                        pos: top,
                        direction: 1.0,
                    })),
                }

                if *remaining == 0 {
                    out.push(SideEffect::ChangeTile(TileChange {
                        key,
                        slug: USED_ITEM_BOX_SLUG.to_string(),
                        behavior: Some(BehaviorSpec::Bounce { one_shot: true }),
                    }));
                }
            }
            // Metadata only
            TerrainBehavior::Warp(_)
            | TerrainBehavior::Goal
            | TerrainBehavior::CastleExit { .. }
            | TerrainBehavior::Inert => {}
        }
    }

    pub fn is_goal(&self) -> bool {
        matches!(self, TerrainBehavior::Goal)
    }

    pub fn warp_destination(&self) -> Option<&WarpDestination> {
        match self {
            TerrainBehavior::Warp(dest) => Some(dest),
            _ => None,
        }
    }
}
