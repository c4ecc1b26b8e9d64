//! Point and footprint sampling against the tile grid
//!
//! Shared by the player pipeline and the actor pipeline. All solidity goes
//! through the quadrant model; slope tiles only ever act as ground.

use super::level::Level;
use super::quadrant::{
    is_solid, offset_in_tile, quadrant_of, quadrant_top, slope_height,
};
use crate::consts::QUADRANT_SIZE;
use crate::{tile_coord, tile_origin};

/// World-space box of one solid quadrant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadrantBox {
    pub column: i32,
    pub row: i32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

/// Solid quadrant under a world point, if any
pub fn solid_quadrant_at(level: &Level, x: f32, y: f32) -> Option<QuadrantBox> {
    let column = tile_coord(x);
    let row = tile_coord(y);
    let def = level.tile_at(column, row);
    if def.shape.is_slope() {
        return None;
    }
    let qx = quadrant_of(offset_in_tile(x));
    let qy = quadrant_of(offset_in_tile(y));
    if !is_solid(def.collision_mask, qx, qy) {
        return None;
    }
    let left = tile_origin(column) + qx as f32 * QUADRANT_SIZE;
    let bottom = tile_origin(row) + qy as f32 * QUADRANT_SIZE;
    Some(QuadrantBox {
        column,
        row,
        left,
        right: left + QUADRANT_SIZE,
        bottom,
        top: bottom + QUADRANT_SIZE,
    })
}

pub fn is_solid_at(level: &Level, x: f32, y: f32) -> bool {
    solid_quadrant_at(level, x, y).is_some()
}

/// Whether a surface at `surface` counts as ground for feet at `y`.
///
/// Both halves of the first clause are kept as-is: the strict `y < surface`
/// lets a foot that has sunk below a surface snap back up.
#[inline]
pub fn qualifies_as_ground(y: f32, surface: f32, tolerance: f32) -> bool {
    ((y - surface).abs() <= tolerance || y < surface) && y <= surface + 1.0
}

/// Highest qualifying ground surface under a footprint
///
/// Samples the left edge, center, and last pixel of the footprint against the
/// tile row at foot level and the row below, both quadrant rows each.
pub fn find_ground(level: &Level, x: f32, y: f32, width: f32, tolerance: f32) -> Option<f32> {
    let samples = [x, x + width / 2.0, x + width - 1.0];
    let base_row = tile_coord(y);
    let mut best: Option<f32> = None;

    for sx in samples {
        let column = tile_coord(sx);
        let offset = offset_in_tile(sx);
        for row in [base_row, base_row - 1] {
            let def = level.tile_at(column, row);
            let bottom = tile_origin(row);

            let mut consider = |surface: f32| {
                if qualifies_as_ground(y, surface, tolerance)
                    && best.is_none_or(|b| surface > b)
                {
                    best = Some(surface);
                }
            };

            if let Some(height) = slope_height(def.shape, offset) {
                consider(bottom + height);
                continue;
            }
            let qx = quadrant_of(offset);
            for qy in [1, 0] {
                if is_solid(def.collision_mask, qx, qy) {
                    consider(bottom + quadrant_top(qy));
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LevelBuilder;
    use crate::sim::level::tests::flat_level;
    use crate::sim::tiles::TileLibrary;
    use proptest::prelude::*;

    #[test]
    fn test_solid_quadrant_box() {
        let level = flat_level().tile(4, 4, "ledge").build().unwrap();
        let quad = solid_quadrant_at(&level, 64.0 + 10.0, 64.0 + 3.0).unwrap();
        assert_eq!(quad.left, 72.0);
        assert_eq!(quad.bottom, 64.0);
        assert_eq!(quad.top, 72.0);
        // Ledge top half is open
        assert!(!is_solid_at(&level, 70.0, 64.0 + 12.0));
    }

    #[test]
    fn test_ground_on_flat_floor() {
        let level = flat_level().build().unwrap();
        assert_eq!(find_ground(&level, 40.0, 32.0, 16.0, 2.0), Some(32.0));
        assert_eq!(find_ground(&level, 40.0, 33.5, 16.0, 2.0), None);
        // Sunk 5px below the surface: snaps back up
        assert_eq!(find_ground(&level, 40.0, 27.0, 16.0, 2.0), Some(32.0));
    }

    #[test]
    fn test_ground_tolerance_boundary() {
        let level = flat_level().build().unwrap();
        // Within one pixel above the surface still lands
        assert_eq!(find_ground(&level, 40.0, 33.0, 16.0, 2.0), Some(32.0));
        // The tolerance band above the surface is cut off by `y <= surface + 1`
        assert_eq!(find_ground(&level, 40.0, 33.01, 16.0, 2.0), None);
        assert!(qualifies_as_ground(31.0, 32.0, 0.0));
        assert!(qualifies_as_ground(33.0, 32.0, 2.0));
        assert!(!qualifies_as_ground(34.0, 32.0, 2.0));
    }

    #[test]
    fn test_ground_picks_highest_sample() {
        // Ledge raises one quadrant at column 3 (bottom half, surface 40)
        let level = flat_level().tile(3, 2, "ledge").build().unwrap();
        assert_eq!(find_ground(&level, 40.0, 39.5, 16.0, 2.0), Some(40.0));
        assert_eq!(find_ground(&level, 40.0, 32.0, 16.0, 2.0), Some(40.0));
    }

    #[test]
    fn test_ground_on_slopes() {
        let level = LevelBuilder::new(TileLibrary::standard(), 1, 8)
            .fill((0, 15), (0, 0), "ground")
            .tile(4, 1, "slope_up")
            .build()
            .unwrap();
        // Footprint covers the slope tile; the right sample is 15px up it
        let g = find_ground(&level, 64.0, 23.0, 16.0, 2.0).unwrap();
        assert!((g - 31.0).abs() < 1e-4, "got {g}");
    }

    #[test]
    fn test_no_ground_over_pit() {
        let level = LevelBuilder::new(TileLibrary::standard(), 1, 8).build().unwrap();
        assert_eq!(find_ground(&level, 40.0, 10.0, 16.0, 2.0), None);
    }

    proptest! {
        #[test]
        fn prop_ground_never_far_below_feet(x in 0.0f32..480.0, y in 0.0f32..100.0) {
            let level = flat_level().build().unwrap();
            if let Some(g) = find_ground(&level, x, y, 16.0, 2.0) {
                prop_assert!(y <= g + 1.0);
            }
        }
    }
}
