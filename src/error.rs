//! Load-time validation failures
//!
//! Anything malformed in tile, level, or tuning data is rejected here, before
//! the first frame runs. The simulation itself never returns these.

use thiserror::Error;

/// Tile library / level load failure
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("tile definition `{slug}`: {reason}")]
    InvalidTile { slug: String, reason: String },

    #[error("duplicate tile slug `{0}`")]
    DuplicateSlug(String),

    #[error("shorthand `{shorthand}` used by both `{first}` and `{second}`")]
    DuplicateShorthand {
        shorthand: char,
        first: String,
        second: String,
    },

    #[error("tile library has no `empty` definition")]
    MissingEmptyTile,

    #[error("unknown tile slug `{slug}` at screen {screen} ({x}, {y})")]
    UnknownSlug {
        slug: String,
        screen: usize,
        x: i32,
        y: i32,
    },

    #[error("position screen {screen} ({x}, {y}) is outside the level")]
    OutOfBounds { screen: usize, x: i32, y: i32 },

    #[error("invalid behavior at screen {screen} ({x}, {y}): {source}")]
    InvalidBehavior {
        screen: usize,
        x: i32,
        y: i32,
        source: BehaviorError,
    },

    #[error("warp at screen {screen} ({x}, {y}) targets missing screen {to_screen}")]
    WarpScreenMissing {
        screen: usize,
        x: i32,
        y: i32,
        to_screen: usize,
    },

    #[error("warp at screen {screen} ({x}, {y}) targets zone '{zone}' which is not on screen {to_screen}")]
    WarpZoneMissing {
        screen: usize,
        x: i32,
        y: i32,
        to_screen: usize,
        zone: char,
    },

    #[error("warp zone '{zone}' on screen {to_screen} spans rows {rows:?}; it must be exactly one tile high")]
    WarpZoneNotSingleRow {
        to_screen: usize,
        zone: char,
        rows: Vec<i32>,
    },

    #[error("warp zone '{zone}' on screen {to_screen} is not contiguous")]
    WarpZoneNotContiguous { to_screen: usize, zone: char },

    #[error("goal tiles span {0} columns; exactly one is allowed")]
    MultipleGoals(usize),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A behavior declaration that cannot be built
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BehaviorError {
    #[error("item_box spawn `{0}` is not coin or mushroom")]
    UnknownReward(String),

    #[error("item_box spawns must be >= 1 (got {0})")]
    SpawnCount(i64),

    #[error("warp requires `{0}`")]
    MissingWarpField(&'static str),

    #[error("warp to_zone `{0}` must be a single character")]
    ZoneName(String),

    #[error("castle_exit role `{0}` is not walk or flag")]
    UnknownCastleRole(String),
}

/// Physics tuning load failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`{field}` must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = LevelError::WarpZoneNotSingleRow {
            to_screen: 2,
            zone: 'a',
            rows: vec![3, 4],
        };
        let msg = err.to_string();
        assert!(msg.contains("'a'"));
        assert!(msg.contains("exactly one tile high"));

        let err = ConfigError::NonPositive {
            field: "jump.gravity",
            value: 0.0,
        };
        assert!(err.to_string().contains("jump.gravity"));

        let err = LevelError::InvalidBehavior {
            screen: 1,
            x: 4,
            y: 5,
            source: BehaviorError::SpawnCount(0),
        };
        assert!(err.to_string().ends_with("item_box spawns must be >= 1 (got 0)"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
