//! Tile Runner - deterministic simulation core for a tile-based platformer
//!
//! Core modules:
//! - `sim`: Per-frame simulation (player pipeline, actors, terrain behaviors)
//! - `tuning`: Data-driven physics configuration
//! - `error`: Load-time validation failures

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::{BehaviorError, ConfigError, LevelError};
pub use tuning::PhysicsConfig;

/// Pixel-grid and timing constants
pub mod consts {
    /// Tile edge length in pixels
    pub const TILE_SIZE: f32 = 16.0;
    /// Quadrant (sub-cell) edge length in pixels
    pub const QUADRANT_SIZE: f32 = 8.0;

    /// Native viewport dimensions
    pub const NATIVE_WIDTH: f32 = 256.0;
    pub const NATIVE_HEIGHT: f32 = 224.0;

    /// Columns per level screen
    pub const SCREEN_WIDTH_TILES: usize = 16;

    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
}

/// Pixel coordinate to tile coordinate (floors toward negative infinity)
#[inline]
pub fn tile_coord(px: f32) -> i32 {
    (px / consts::TILE_SIZE).floor() as i32
}

/// Left/bottom pixel edge of a tile coordinate
#[inline]
pub fn tile_origin(tile: i32) -> f32 {
    tile as f32 * consts::TILE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_coord_floors_negative() {
        assert_eq!(tile_coord(0.0), 0);
        assert_eq!(tile_coord(15.99), 0);
        assert_eq!(tile_coord(16.0), 1);
        assert_eq!(tile_coord(-0.5), -1);
        assert_eq!(tile_origin(3), 48.0);
    }
}
