//! Per-tile runtime records and behavior dispatch
//!
//! Records are created lazily when a behavior is attached and keyed by
//! `(screen, x, y)`. Iteration is ordered by key so updates are deterministic.

pub mod behaviors;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use behaviors::{
    BehaviorSpec, CastleRole, Reward, TerrainBehavior, USED_ITEM_BOX_SLUG, WarpDestination,
    tile_world_origin,
};

use super::effects::SideEffect;
use super::state::SizeTier;
use crate::tuning::TerrainTuning;
use behaviors::KEY_BOUNCE_TIMER;

/// Screen-local tile address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub screen: usize,
    pub x: i32,
    pub y: i32,
}

/// Request to replace a tile (and its behavior)
#[derive(Debug, Clone, PartialEq)]
pub struct TileChange {
    pub key: TileKey,
    pub slug: String,
    pub behavior: Option<BehaviorSpec>,
}

/// Mutable visual and scratch data of one tile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileState {
    /// Vertical draw offset (pixels, up is positive)
    pub offset_y: f32,
    pub data: BTreeMap<&'static str, f32>,
}

impl TileState {
    pub fn flag(&self, key: &str) -> bool {
        self.data.get(key).is_some_and(|v| *v != 0.0)
    }

    pub fn set_flag(&mut self, key: &'static str) {
        self.data.insert(key, 1.0);
    }

    pub fn start_bounce(&mut self, tuning: &TerrainTuning) {
        self.data.insert(KEY_BOUNCE_TIMER, tuning.bounce_duration);
        self.offset_y = 0.0;
    }

    /// Half-sine bounce: 0 → peak → 0 over the bounce duration
    fn advance_bounce(&mut self, dt: f32, tuning: &TerrainTuning) {
        let Some(timer) = self.data.get(KEY_BOUNCE_TIMER).copied() else {
            return;
        };
        let remaining = timer - dt;
        if remaining <= 0.0 {
            self.offset_y = 0.0;
            self.data.remove(KEY_BOUNCE_TIMER);
            return;
        }
        let progress = 1.0 - remaining / tuning.bounce_duration;
        self.offset_y = tuning.bounce_peak * (std::f32::consts::PI * progress).sin();
        self.data.insert(KEY_BOUNCE_TIMER, remaining);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileRecord {
    pub state: TileState,
    pub behavior: Option<TerrainBehavior>,
}

/// Owns every tile's runtime record
#[derive(Debug, Clone, Default)]
pub struct TerrainManager {
    records: BTreeMap<TileKey, TileRecord>,
    tuning: TerrainTuning,
}

impl TerrainManager {
    pub fn new(tuning: TerrainTuning) -> Self {
        Self {
            records: BTreeMap::new(),
            tuning,
        }
    }

    pub fn tuning(&self) -> &TerrainTuning {
        &self.tuning
    }

    /// Attach a behavior, creating a fresh record
    pub fn attach(&mut self, key: TileKey, behavior: TerrainBehavior) {
        self.records.insert(
            key,
            TileRecord {
                state: TileState::default(),
                behavior: Some(behavior),
            },
        );
    }

    /// Swap the behavior after a tile change; `None` clears the record.
    ///
    /// An existing record keeps its bounce animation so it finishes across
    /// the swap. Other scratch data belongs to the old behavior and is dropped
    /// when the kind changes.
    pub fn replace(&mut self, key: TileKey, behavior: Option<TerrainBehavior>) {
        match behavior {
            Some(behavior) => {
                self.records
                    .entry(key)
                    .and_modify(|r| {
                        let same_kind = r.behavior.as_ref().is_some_and(|old| {
                            std::mem::discriminant(old) == std::mem::discriminant(&behavior)
                        });
                        if !same_kind {
                            r.state.data.retain(|k, _| *k == KEY_BOUNCE_TIMER);
                        }
                        r.behavior = Some(behavior.clone());
                    })
                    .or_insert_with(|| TileRecord {
                        state: TileState::default(),
                        behavior: Some(behavior),
                    });
            }
            None => {
                self.records.remove(&key);
            }
        }
    }

    pub fn record(&self, key: TileKey) -> Option<&TileRecord> {
        self.records.get(&key)
    }

    pub fn behavior(&self, key: TileKey) -> Option<&TerrainBehavior> {
        self.records.get(&key).and_then(|r| r.behavior.as_ref())
    }

    pub fn visual_offset(&self, key: TileKey) -> f32 {
        self.records.get(&key).map_or(0.0, |r| r.state.offset_y)
    }

    /// Iterate records in key order
    pub fn records(&self) -> impl Iterator<Item = (&TileKey, &TileRecord)> {
        self.records.iter()
    }

    /// Dispatch a hit from below; tiles without a record ignore it
    pub fn hit_from_below(&mut self, key: TileKey, size: SizeTier, out: &mut Vec<SideEffect>) {
        let Some(record) = self.records.get_mut(&key) else {
            return;
        };
        if let Some(behavior) = record.behavior.as_mut() {
            log::trace!("hit from below at {key:?}");
            behavior.on_hit_from_below(key, &mut record.state, size, &self.tuning, out);
        }
    }

    /// Advance free-running behavior state (bounce animation)
    pub fn update(&mut self, dt: f32) {
        for record in self.records.values_mut() {
            record.state.advance_bounce(dt, &self.tuning);
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
