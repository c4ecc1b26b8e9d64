//! Quadrant collision model
//!
//! Each 16×16 tile is split into four 8×8 quadrants. Solidity is a 4-bit mask,
//! one bit per quadrant, addressed as `qy * 2 + qx` with `qx` 0 = left and
//! `qy` 0 = bottom:
//!
//! ```text
//!   bit2 | bit3      top-left    | top-right
//!   -----+-----      ------------+-------------
//!   bit0 | bit1      bottom-left | bottom-right
//! ```
//!
//! This layout is shared with tile authoring data and must not change.
//! Slopes cannot be expressed by the mask alone, so they carry a [`TileShape`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{QUADRANT_SIZE, TILE_SIZE};

pub const MASK_EMPTY: u8 = 0b0000;
pub const MASK_FULL: u8 = 0b1111;
pub const MASK_BOTTOM: u8 = 0b0011;
pub const MASK_TOP: u8 = 0b1100;
pub const MASK_LEFT: u8 = 0b0101;
pub const MASK_RIGHT: u8 = 0b1010;

/// Geometric shape of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileShape {
    /// Solidity comes from the quadrant mask only
    #[default]
    Quadrants,
    /// 45° slope rising left to right
    SlopeUp,
    /// 45° slope falling left to right
    SlopeDown,
}

impl TileShape {
    pub fn is_slope(self) -> bool {
        matches!(self, TileShape::SlopeUp | TileShape::SlopeDown)
    }
}

/// Bit index of quadrant (qx, qy)
#[inline]
pub fn quadrant_bit(qx: u8, qy: u8) -> u8 {
    qy * 2 + qx
}

/// Whether quadrant (qx, qy) of a mask is solid
#[inline]
pub fn is_solid(mask: u8, qx: u8, qy: u8) -> bool {
    debug_assert!(qx < 2 && qy < 2);
    mask & (1 << quadrant_bit(qx, qy)) != 0
}

/// Quadrant index (0 or 1) for a pixel offset within a tile
#[inline]
pub fn quadrant_of(offset: f32) -> u8 {
    if offset < QUADRANT_SIZE { 0 } else { 1 }
}

/// Pixel offset of `px` inside its tile, in `[0, TILE_SIZE)`
#[inline]
pub fn offset_in_tile(px: f32) -> f32 {
    px.rem_euclid(TILE_SIZE)
}

/// Whether the quadrant under a world-space point of this tile is solid
#[inline]
pub fn is_point_solid(mask: u8, x: f32, y: f32) -> bool {
    is_solid(
        mask,
        quadrant_of(offset_in_tile(x)),
        quadrant_of(offset_in_tile(y)),
    )
}

/// Top edge (pixels above the tile bottom) of quadrant row `qy`
#[inline]
pub fn quadrant_top(qy: u8) -> f32 {
    (qy as f32 + 1.0) * QUADRANT_SIZE
}

/// Ground height inside a slope tile at horizontal offset `x_offset`
///
/// Returns `None` for non-slope shapes; those are resolved through the mask.
pub fn slope_height(shape: TileShape, x_offset: f32) -> Option<f32> {
    let ratio = (x_offset / TILE_SIZE).clamp(0.0, 1.0);
    match shape {
        TileShape::SlopeUp => Some(ratio * TILE_SIZE),
        TileShape::SlopeDown => Some((1.0 - ratio) * TILE_SIZE),
        TileShape::Quadrants => None,
    }
}

/// Unit surface normal (y up) of a tile's walkable face
pub fn surface_normal(shape: TileShape) -> Vec2 {
    let d = std::f32::consts::FRAC_1_SQRT_2;
    match shape {
        TileShape::SlopeUp => Vec2::new(-d, d),
        TileShape::SlopeDown => Vec2::new(d, d),
        TileShape::Quadrants => Vec2::Y,
    }
}
