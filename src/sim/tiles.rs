//! Tile definitions
//!
//! Definitions are immutable once loaded and keyed by slug. Collision is only
//! ever read through [`TileDefinition::collision_mask`] and
//! [`TileDefinition::shape`]; nothing tests a slug for solidity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::quadrant::{MASK_BOTTOM, MASK_EMPTY, MASK_FULL, TileShape};
use crate::error::LevelError;

/// Slug every library must define; unset grid cells resolve to it
pub const EMPTY_SLUG: &str = "empty";

/// Category tag marking tiles the player picks up on contact
pub const CATEGORY_COLLECTABLE: &str = "collectable";

/// One frame of a cyclic tile animation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub sprite: String,
    /// Duration in simulation frames
    pub frames: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDefinition {
    pub slug: String,
    /// Sprite reference, opaque to the simulation
    #[serde(default)]
    pub sprite: String,
    /// 4-bit quadrant mask (see [`super::quadrant`])
    #[serde(default)]
    pub collision_mask: u8,
    #[serde(default)]
    pub shape: TileShape,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub shorthand: Option<char>,
    #[serde(default)]
    pub animation: Option<Vec<AnimationFrame>>,
}

impl TileDefinition {
    pub fn new(slug: &str, collision_mask: u8) -> Self {
        Self {
            slug: slug.to_string(),
            sprite: slug.to_string(),
            collision_mask,
            shape: TileShape::Quadrants,
            category: None,
            shorthand: None,
            animation: None,
        }
    }

    pub fn with_shape(mut self, shape: TileShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_shorthand(mut self, shorthand: char) -> Self {
        self.shorthand = Some(shorthand);
        self
    }

    pub fn with_animation(mut self, frames: Vec<AnimationFrame>) -> Self {
        self.animation = Some(frames);
        self
    }

    pub fn is_collectable(&self) -> bool {
        self.category.as_deref() == Some(CATEGORY_COLLECTABLE)
    }

    /// Sprite to show on global frame `frame`
    pub fn sprite_at(&self, frame: u64) -> &str {
        let Some(animation) = self.animation.as_deref() else {
            return &self.sprite;
        };
        let cycle: u64 = animation.iter().map(|f| f.frames as u64).sum();
        if cycle == 0 {
            return &self.sprite;
        }
        let mut t = frame % cycle;
        for step in animation {
            if t < step.frames as u64 {
                return &step.sprite;
            }
            t -= step.frames as u64;
        }
        &self.sprite
    }

    fn validate(&self) -> Result<(), LevelError> {
        let invalid = |reason: String| LevelError::InvalidTile {
            slug: self.slug.clone(),
            reason,
        };
        if self.slug.is_empty() {
            return Err(invalid("slug is empty".into()));
        }
        if self.collision_mask > MASK_FULL {
            return Err(invalid(format!(
                "collision mask {} exceeds 4 bits",
                self.collision_mask
            )));
        }
        if self.shape.is_slope() && self.collision_mask != MASK_EMPTY {
            return Err(invalid("slope tiles must not carry a quadrant mask".into()));
        }
        if let Some(animation) = &self.animation {
            if animation.is_empty() {
                return Err(invalid("animation has no frames".into()));
            }
            if let Some(frame) = animation.iter().find(|f| f.frames == 0) {
                return Err(invalid(format!(
                    "animation frame `{}` has zero duration",
                    frame.sprite
                )));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct LibraryDocument {
    tiles: Vec<TileDefinition>,
}

/// Validated set of tile definitions
#[derive(Debug, Clone, Default)]
pub struct TileLibrary {
    tiles: BTreeMap<String, TileDefinition>,
    shorthands: BTreeMap<char, String>,
}

impl TileLibrary {
    /// Build from definitions, rejecting duplicates and malformed entries
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = TileDefinition>,
    ) -> Result<Self, LevelError> {
        let mut library = Self::default();
        for def in definitions {
            def.validate()?;
            if library.tiles.contains_key(&def.slug) {
                return Err(LevelError::DuplicateSlug(def.slug));
            }
            if let Some(shorthand) = def.shorthand {
                if let Some(first) = library.shorthands.get(&shorthand) {
                    return Err(LevelError::DuplicateShorthand {
                        shorthand,
                        first: first.clone(),
                        second: def.slug,
                    });
                }
                library.shorthands.insert(shorthand, def.slug.clone());
            }
            library.tiles.insert(def.slug.clone(), def);
        }
        if !library.tiles.contains_key(EMPTY_SLUG) {
            return Err(LevelError::MissingEmptyTile);
        }
        log::info!("Loaded {} tile definitions", library.tiles.len());
        Ok(library)
    }

    /// Parse `{ "tiles": [...] }`
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let doc: LibraryDocument = serde_json::from_str(json)?;
        Self::from_definitions(doc.tiles)
    }

    /// The stock tile set used by the demo and fixtures
    pub fn standard() -> Self {
        let coin_frames = ["coin_0", "coin_1", "coin_2", "coin_1"]
            .into_iter()
            .map(|sprite| AnimationFrame {
                sprite: sprite.to_string(),
                frames: 8,
            })
            .collect();
        let tiles = [
            TileDefinition::new(EMPTY_SLUG, MASK_EMPTY).with_shorthand(' '),
            TileDefinition::new("ground", MASK_FULL).with_shorthand('#'),
            TileDefinition::new("block", MASK_FULL).with_shorthand('X'),
            TileDefinition::new("brick", MASK_FULL).with_shorthand('B'),
            TileDefinition::new("item_box", MASK_FULL).with_shorthand('?'),
            TileDefinition::new("item_box_used", MASK_FULL),
            TileDefinition::new("pipe", MASK_FULL).with_shorthand('P'),
            TileDefinition::new("ledge", MASK_BOTTOM).with_shorthand('_'),
            TileDefinition::new("coin", MASK_EMPTY)
                .with_category(CATEGORY_COLLECTABLE)
                .with_shorthand('o')
                .with_animation(coin_frames),
            TileDefinition::new("flagpole", MASK_EMPTY).with_shorthand('|'),
            TileDefinition::new("slope_up", MASK_EMPTY)
                .with_shape(TileShape::SlopeUp)
                .with_shorthand('/'),
            TileDefinition::new("slope_down", MASK_EMPTY)
                .with_shape(TileShape::SlopeDown)
                .with_shorthand('\\'),
        ];
        let mut library = Self::default();
        for def in tiles {
            if let Some(shorthand) = def.shorthand {
                library.shorthands.insert(shorthand, def.slug.clone());
            }
            library.tiles.insert(def.slug.clone(), def);
        }
        library
    }

    pub fn get(&self, slug: &str) -> Option<&TileDefinition> {
        self.tiles.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.tiles.contains_key(slug)
    }

    pub fn by_shorthand(&self, shorthand: char) -> Option<&TileDefinition> {
        self.shorthands.get(&shorthand).and_then(|slug| self.tiles.get(slug))
    }

    /// The `empty` definition
    pub fn empty(&self) -> &TileDefinition {
        // Both constructors guarantee the entry; fall back to any tile otherwise.
        self.tiles
            .get(EMPTY_SLUG)
            .or_else(|| self.tiles.values().next())
            .unwrap_or(&FALLBACK_EMPTY)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

static FALLBACK_EMPTY: TileDefinition = TileDefinition {
    slug: String::new(),
    sprite: String::new(),
    collision_mask: MASK_EMPTY,
    shape: TileShape::Quadrants,
    category: None,
    shorthand: None,
    animation: None,
};
