//! Level grid and terrain ownership
//!
//! A level is a grid of tile slugs split into screens of
//! [`SCREEN_WIDTH_TILES`] columns, plus the terrain manager holding each
//! tile's runtime record. Tile identity changes at runtime only through
//! [`Level::apply_tile_change`].

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

use super::terrain::{
    BehaviorSpec, TerrainBehavior, TerrainManager, TileChange, TileKey, WarpDestination,
};
use super::tiles::{EMPTY_SLUG, TileDefinition, TileLibrary};
use crate::consts::{NATIVE_WIDTH, SCREEN_WIDTH_TILES, TILE_SIZE};
use crate::error::LevelError;
use crate::tuning::TerrainTuning;
use crate::{tile_coord, tile_origin};

/// The single goal column of a level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalColumn {
    pub screen: usize,
    /// Global tile column
    pub column: i32,
    /// Lowest goal tile row
    pub base_row: i32,
}

impl GoalColumn {
    pub fn center_x(&self) -> f32 {
        tile_origin(self.column) + TILE_SIZE / 2.0
    }

    pub fn base_y(&self) -> f32 {
        tile_origin(self.base_row)
    }
}

/// A non-empty tile inside the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleTile {
    /// World position of the bottom-left corner, including bounce offset
    pub pos: Vec2,
    pub slug: String,
    pub sprite: String,
}

#[derive(Debug, Clone)]
pub struct Level {
    library: TileLibrary,
    width: i32,
    height: i32,
    grid: Vec<String>,
    original: Vec<String>,
    behavior_specs: Vec<(TileKey, BehaviorSpec)>,
    terrain: TerrainManager,
    zones: BTreeMap<usize, Vec<(i32, i32, char)>>,
    spawn: Vec2,
    goal: Option<GoalColumn>,
}

impl Level {
    pub fn screen_count(&self) -> usize {
        self.width as usize / SCREEN_WIDTH_TILES
    }

    /// Width in tiles
    pub fn width_tiles(&self) -> i32 {
        self.width
    }

    pub fn height_tiles(&self) -> i32 {
        self.height
    }

    pub fn width_px(&self) -> f32 {
        tile_origin(self.width)
    }

    pub fn spawn_point(&self) -> Vec2 {
        self.spawn
    }

    pub fn library(&self) -> &TileLibrary {
        &self.library
    }

    pub fn terrain(&self) -> &TerrainManager {
        &self.terrain
    }

    pub fn terrain_mut(&mut self) -> &mut TerrainManager {
        &mut self.terrain
    }

    pub fn goal(&self) -> Option<GoalColumn> {
        self.goal
    }

    fn index(&self, column: i32, row: i32) -> Option<usize> {
        if column < 0 || row < 0 || column >= self.width || row >= self.height {
            return None;
        }
        Some((row * self.width + column) as usize)
    }

    /// Slug at a screen-local coordinate; anything outside the level is empty
    pub fn get_terrain_tile(&self, screen: usize, x: i32, y: i32) -> &str {
        self.slug_at(global_column(screen, x), y)
    }

    /// Slug at a global tile coordinate
    pub fn slug_at(&self, column: i32, row: i32) -> &str {
        self.index(column, row)
            .map_or(EMPTY_SLUG, |i| self.grid[i].as_str())
    }

    pub fn get_tile_definition(&self, slug: &str) -> Option<&TileDefinition> {
        self.library.get(slug)
    }

    /// Definition at a global tile coordinate (empty outside the level)
    pub fn tile_at(&self, column: i32, row: i32) -> &TileDefinition {
        self.library
            .get(self.slug_at(column, row))
            .unwrap_or_else(|| self.library.empty())
    }

    /// Definition under a world-space point
    pub fn tile_at_point(&self, x: f32, y: f32) -> &TileDefinition {
        self.tile_at(tile_coord(x), tile_coord(y))
    }

    /// Screen-local key for a global tile coordinate inside the level
    pub fn key_at(&self, column: i32, row: i32) -> Option<TileKey> {
        self.index(column, row)?;
        Some(TileKey {
            screen: column as usize / SCREEN_WIDTH_TILES,
            x: column % SCREEN_WIDTH_TILES as i32,
            y: row,
        })
    }

    /// Screen index containing world x (clamped to the level)
    pub fn screen_at(&self, x: f32) -> usize {
        let column = tile_coord(x).clamp(0, (self.width - 1).max(0));
        column as usize / SCREEN_WIDTH_TILES
    }

    /// Non-empty tiles overlapping the viewport starting at `camera_x`
    pub fn get_visible_tiles(&self, camera_x: f32, frame: u64) -> Vec<VisibleTile> {
        let first = tile_coord(camera_x).max(0);
        let last = tile_coord(camera_x + NATIVE_WIDTH).min(self.width - 1);
        let mut tiles = Vec::new();
        for row in 0..self.height {
            for column in first..=last {
                let def = self.tile_at(column, row);
                if def.slug == EMPTY_SLUG {
                    continue;
                }
                let offset = self
                    .key_at(column, row)
                    .map_or(0.0, |key| self.terrain.visual_offset(key));
                tiles.push(VisibleTile {
                    pos: Vec2::new(tile_origin(column), tile_origin(row) + offset),
                    slug: def.slug.clone(),
                    sprite: def.sprite_at(frame).to_string(),
                });
            }
        }
        tiles
    }

    /// Center of a validated warp zone, in tile units
    pub fn find_zone_position(&self, screen: usize, zone: char) -> Option<Vec2> {
        let positions: Vec<_> = self
            .zones
            .get(&screen)?
            .iter()
            .filter(|(_, _, c)| *c == zone)
            .collect();
        let min_x = positions.iter().map(|(x, _, _)| *x).min()?;
        let max_x = positions.iter().map(|(x, _, _)| *x).max()?;
        let row = positions.first()?.1;
        Some(Vec2::new((min_x + max_x) as f32 / 2.0, row as f32))
    }

    /// The sole runtime path that changes a tile's identity
    pub fn apply_tile_change(&mut self, change: &TileChange) {
        let TileKey { screen, x, y } = change.key;
        let Some(index) = self.index(global_column(screen, x), y) else {
            log::warn!("tile change outside level at {:?}", change.key);
            return;
        };
        if !self.library.contains(&change.slug) {
            log::warn!("tile change to unknown slug `{}` ignored", change.slug);
            return;
        }
        self.grid[index] = change.slug.clone();

        let behavior = match change.behavior.as_ref().map(BehaviorSpec::build) {
            Some(Ok(behavior)) => Some(behavior),
            Some(Err(reason)) => {
                log::warn!("no behavior attached at {:?}: {reason}", change.key);
                None
            }
            None => None,
        };
        self.terrain.replace(change.key, behavior);
        self.goal = find_goal(&self.terrain);
        log::debug!("tile {:?} -> {}", change.key, change.slug);
    }

    /// Restore the tile grid and behaviors as loaded
    pub fn reset_terrain(&mut self) {
        self.grid.clone_from(&self.original);
        self.terrain.clear();
        for (key, spec) in &self.behavior_specs {
            // Specs were validated at load
            if let Ok(behavior) = spec.build() {
                self.terrain.attach(*key, behavior);
            }
        }
        self.goal = find_goal(&self.terrain);
        log::info!("terrain reset ({} behaviors)", self.terrain.len());
    }
}

/// Global column of a screen-local x
pub fn global_column(screen: usize, x: i32) -> i32 {
    (screen * SCREEN_WIDTH_TILES) as i32 + x
}

fn find_goal(terrain: &TerrainManager) -> Option<GoalColumn> {
    terrain
        .records()
        .filter(|(_, r)| r.behavior.as_ref().is_some_and(TerrainBehavior::is_goal))
        .map(|(key, _)| GoalColumn {
            screen: key.screen,
            column: global_column(key.screen, key.x),
            base_row: key.y,
        })
        .min_by_key(|g| (g.column, g.base_row))
}

/// Assembles and validates a [`Level`]
#[derive(Debug, Clone)]
pub struct LevelBuilder {
    library: TileLibrary,
    screens: usize,
    height: i32,
    tiles: Vec<(i32, i32, String)>,
    behaviors: Vec<(i32, i32, BehaviorSpec)>,
    zones: Vec<(usize, i32, i32, char)>,
    spawn: Vec2,
    tuning: TerrainTuning,
}

impl LevelBuilder {
    pub fn new(library: TileLibrary, screens: usize, height: i32) -> Self {
        Self {
            library,
            screens,
            height,
            tiles: Vec::new(),
            behaviors: Vec::new(),
            zones: Vec::new(),
            spawn: Vec2::new(TILE_SIZE * 2.0, TILE_SIZE * 2.0),
            tuning: TerrainTuning::default(),
        }
    }

    pub fn terrain_tuning(mut self, tuning: TerrainTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Place a tile at a global coordinate
    pub fn tile(mut self, column: i32, row: i32, slug: &str) -> Self {
        self.tiles.push((column, row, slug.to_string()));
        self
    }

    /// Fill an inclusive rectangle of global coordinates
    pub fn fill(mut self, columns: (i32, i32), rows: (i32, i32), slug: &str) -> Self {
        for row in rows.0..=rows.1 {
            for column in columns.0..=columns.1 {
                self.tiles.push((column, row, slug.to_string()));
            }
        }
        self
    }

    /// Attach a behavior at a global coordinate
    pub fn behavior(mut self, column: i32, row: i32, spec: BehaviorSpec) -> Self {
        self.behaviors.push((column, row, spec));
        self
    }

    /// Mark a warp destination zone at a screen-local coordinate
    pub fn zone(mut self, screen: usize, x: i32, y: i32, zone: char) -> Self {
        self.zones.push((screen, x, y, zone));
        self
    }

    pub fn spawn(mut self, pos: Vec2) -> Self {
        self.spawn = pos;
        self
    }

    pub fn build(self) -> Result<Level, LevelError> {
        let width = (self.screens * SCREEN_WIDTH_TILES) as i32;
        let height = self.height;
        let mut grid = vec![EMPTY_SLUG.to_string(); (width * height).max(0) as usize];

        for (column, row, slug) in self.tiles {
            let screen = column.max(0) as usize / SCREEN_WIDTH_TILES;
            let x = column.rem_euclid(SCREEN_WIDTH_TILES as i32);
            if column < 0 || row < 0 || column >= width || row >= height {
                return Err(LevelError::OutOfBounds { screen, x, y: row });
            }
            if !self.library.contains(&slug) {
                return Err(LevelError::UnknownSlug {
                    slug,
                    screen,
                    x,
                    y: row,
                });
            }
            grid[(row * width + column) as usize] = slug;
        }

        let mut terrain = TerrainManager::new(self.tuning);
        let mut behavior_specs = Vec::with_capacity(self.behaviors.len());
        for (column, row, spec) in self.behaviors {
            let key = TileKey {
                screen: column.max(0) as usize / SCREEN_WIDTH_TILES,
                x: column.rem_euclid(SCREEN_WIDTH_TILES as i32),
                y: row,
            };
            if column < 0 || row < 0 || column >= width || row >= height {
                return Err(LevelError::OutOfBounds {
                    screen: key.screen,
                    x: key.x,
                    y: key.y,
                });
            }
            let behavior = spec.build().map_err(|source| LevelError::InvalidBehavior {
                screen: key.screen,
                x: key.x,
                y: key.y,
                source,
            })?;
            terrain.attach(key, behavior);
            behavior_specs.push((key, spec));
        }

        let mut zones: BTreeMap<usize, Vec<(i32, i32, char)>> = BTreeMap::new();
        for (screen, x, y, zone) in self.zones {
            if screen >= self.screens || !(0..SCREEN_WIDTH_TILES as i32).contains(&x) || !(0..height).contains(&y) {
                return Err(LevelError::OutOfBounds { screen, x, y });
            }
            zones.entry(screen).or_default().push((x, y, zone));
        }

        let level = Level {
            library: self.library,
            width,
            height,
            original: grid.clone(),
            grid,
            behavior_specs,
            goal: find_goal(&terrain),
            terrain,
            zones,
            spawn: self.spawn,
        };
        validate_markers(&level)?;
        log::info!(
            "Loaded level: {} screens, {}x{} tiles, {} behaviors",
            level.screen_count(),
            width,
            height,
            level.terrain.len()
        );
        Ok(level)
    }
}

/// Post-load geometric checks for warp and goal markers
fn validate_markers(level: &Level) -> Result<(), LevelError> {
    let mut goal_columns = BTreeSet::new();
    for (key, record) in level.terrain.records() {
        match &record.behavior {
            Some(TerrainBehavior::Goal) => {
                goal_columns.insert((key.screen, key.x));
            }
            Some(TerrainBehavior::Warp(dest)) => validate_warp(level, *key, dest)?,
            _ => {}
        }
    }
    if goal_columns.len() > 1 {
        return Err(LevelError::MultipleGoals(goal_columns.len()));
    }
    Ok(())
}

fn validate_warp(level: &Level, key: TileKey, dest: &WarpDestination) -> Result<(), LevelError> {
    let WarpDestination { to_screen, to_zone } = *dest;
    if to_screen >= level.screen_count() {
        return Err(LevelError::WarpScreenMissing {
            screen: key.screen,
            x: key.x,
            y: key.y,
            to_screen,
        });
    }
    let positions: Vec<(i32, i32)> = level
        .zones
        .get(&to_screen)
        .into_iter()
        .flatten()
        .filter(|(_, _, c)| *c == to_zone)
        .map(|(x, y, _)| (*x, *y))
        .collect();
    if positions.is_empty() {
        return Err(LevelError::WarpZoneMissing {
            screen: key.screen,
            x: key.x,
            y: key.y,
            to_screen,
            zone: to_zone,
        });
    }

    let rows: BTreeSet<i32> = positions.iter().map(|(_, y)| *y).collect();
    if rows.len() != 1 {
        return Err(LevelError::WarpZoneNotSingleRow {
            to_screen,
            zone: to_zone,
            rows: rows.into_iter().collect(),
        });
    }

    let columns: BTreeSet<i32> = positions.iter().map(|(x, _)| *x).collect();
    let (Some(min), Some(max)) = (columns.first(), columns.last()) else {
        return Ok(());
    };
    if (max - min + 1) as usize != columns.len() {
        return Err(LevelError::WarpZoneNotContiguous {
            to_screen,
            zone: to_zone,
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 32×14 level with a two-row floor (top surface at y = 32)
    pub(crate) fn flat_level() -> LevelBuilder {
        LevelBuilder::new(TileLibrary::standard(), 2, 14).fill((0, 31), (0, 1), "ground")
    }

    fn warp_to(zone: &str) -> BehaviorSpec {
        BehaviorSpec::Warp {
            to_screen: Some(1),
            to_zone: Some(zone.to_string()),
        }
    }

    #[test]
    fn test_queries() {
        let level = flat_level().tile(5, 4, "brick").build().unwrap();
        assert_eq!(level.screen_count(), 2);
        assert_eq!(level.width_px(), 512.0);
        assert_eq!(level.get_terrain_tile(0, 5, 4), "brick");
        assert_eq!(level.get_terrain_tile(1, 0, 0), "ground");
        assert_eq!(level.get_terrain_tile(0, 5, -1), EMPTY_SLUG);
        assert_eq!(level.get_terrain_tile(9, 0, 0), EMPTY_SLUG);
        assert_eq!(level.tile_at_point(90.0, 70.0).slug, "brick");
        assert_eq!(
            level.key_at(20, 3),
            Some(TileKey {
                screen: 1,
                x: 4,
                y: 3
            })
        );
        assert_eq!(level.screen_at(300.0), 1);
    }

    #[test]
    fn test_unknown_slug_fails_at_load() {
        let err = flat_level().tile(3, 3, "lava").build().unwrap_err();
        assert!(matches!(err, LevelError::UnknownSlug { slug, .. } if slug == "lava"));
    }

    #[test]
    fn test_out_of_bounds_fails_at_load() {
        assert!(matches!(
            flat_level().tile(40, 3, "ground").build(),
            Err(LevelError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_invalid_behavior_fails_at_load() {
        let err = flat_level()
            .tile(4, 5, "item_box")
            .behavior(
                4,
                5,
                BehaviorSpec::ItemBox {
                    spawn: "coin".into(),
                    spawns: 0,
                },
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, LevelError::InvalidBehavior { x: 4, y: 5, .. }));
    }

    #[test]
    fn test_warp_zone_valid() {
        let level = flat_level()
            .behavior(3, 2, warp_to("a"))
            .zone(1, 4, 6, 'a')
            .zone(1, 5, 6, 'a')
            .build()
            .unwrap();
        assert_eq!(level.find_zone_position(1, 'a'), Some(Vec2::new(4.5, 6.0)));
    }

    #[test]
    fn test_warp_zone_two_rows_rejected() {
        let err = flat_level()
            .behavior(3, 2, warp_to("a"))
            .zone(1, 4, 6, 'a')
            .zone(1, 4, 7, 'a')
            .build()
            .unwrap_err();
        match err {
            LevelError::WarpZoneNotSingleRow { to_screen, zone, rows } => {
                assert_eq!(to_screen, 1);
                assert_eq!(zone, 'a');
                assert_eq!(rows, vec![6, 7]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_warp_zone_gap_rejected() {
        let err = flat_level()
            .behavior(3, 2, warp_to("a"))
            .zone(1, 4, 6, 'a')
            .zone(1, 6, 6, 'a')
            .build()
            .unwrap_err();
        assert!(matches!(err, LevelError::WarpZoneNotContiguous { zone: 'a', .. }));
    }

    #[test]
    fn test_warp_missing_targets_rejected() {
        assert!(matches!(
            flat_level().behavior(3, 2, warp_to("a")).build(),
            Err(LevelError::WarpZoneMissing { .. })
        ));
        let far = BehaviorSpec::Warp {
            to_screen: Some(5),
            to_zone: Some("a".into()),
        };
        assert!(matches!(
            flat_level().behavior(3, 2, far).build(),
            Err(LevelError::WarpScreenMissing { to_screen: 5, .. })
        ));
    }

    #[test]
    fn test_goal_columns() {
        let level = flat_level()
            .fill((28, 28), (2, 10), "flagpole")
            .behavior(28, 2, BehaviorSpec::Goal)
            .behavior(28, 3, BehaviorSpec::Goal)
            .build()
            .unwrap();
        let goal = level.goal().unwrap();
        assert_eq!(goal.screen, 1);
        assert_eq!(goal.column, 28);
        assert_eq!(goal.base_y(), 32.0);
        assert_eq!(goal.center_x(), 28.0 * 16.0 + 8.0);

        let err = flat_level()
            .behavior(20, 2, BehaviorSpec::Goal)
            .behavior(28, 2, BehaviorSpec::Goal)
            .build()
            .unwrap_err();
        assert!(matches!(err, LevelError::MultipleGoals(2)));
    }

    #[test]
    fn test_tile_change_and_reset() {
        let mut level = flat_level()
            .tile(6, 5, "brick")
            .behavior(6, 5, BehaviorSpec::Breakable)
            .build()
            .unwrap();
        let key = level.key_at(6, 5).unwrap();

        level.apply_tile_change(&TileChange {
            key,
            slug: EMPTY_SLUG.into(),
            behavior: None,
        });
        assert_eq!(level.slug_at(6, 5), EMPTY_SLUG);
        assert!(level.terrain().record(key).is_none());

        // Unknown slugs never reach the grid
        level.apply_tile_change(&TileChange {
            key,
            slug: "lava".into(),
            behavior: None,
        });
        assert_eq!(level.slug_at(6, 5), EMPTY_SLUG);

        level.reset_terrain();
        assert_eq!(level.slug_at(6, 5), "brick");
        assert_eq!(level.terrain().behavior(key), Some(&TerrainBehavior::Breakable));
    }

    #[test]
    fn test_runtime_behavior_failure_degrades() {
        let mut level = flat_level().build().unwrap();
        let key = level.key_at(3, 3).unwrap();
        level.apply_tile_change(&TileChange {
            key,
            slug: "block".into(),
            behavior: Some(BehaviorSpec::CastleExit {
                role: "moat".into(),
                offset_x: 0.0,
                offset_y: 0.0,
            }),
        });
        assert_eq!(level.slug_at(3, 3), "block");
        assert!(level.terrain().record(key).is_none());
    }

    #[test]
    fn test_visible_tiles_window() {
        let level = flat_level().tile(20, 5, "brick").build().unwrap();
        let at_start = level.get_visible_tiles(0.0, 0);
        // 17 columns (partial right edge) × 2 floor rows
        assert_eq!(at_start.len(), 17 * 2);
        assert!(!at_start.iter().any(|t| t.slug == "brick"));
        let later = level.get_visible_tiles(100.0, 0);
        assert!(later.iter().any(|t| t.slug == "brick" && t.pos == Vec2::new(320.0, 80.0)));
    }
}
