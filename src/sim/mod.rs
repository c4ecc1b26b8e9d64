//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep supplied by the caller
//! - Stable iteration order (actors by id, tiles by key)
//! - No rendering, input, or platform dependencies
//! - Terminating outcomes are values ([`PhysicsEvent`]), never panics

pub mod actors;
pub mod camera;
pub mod effects;
pub mod level;
pub mod pipeline;
pub mod player;
pub mod probe;
pub mod quadrant;
pub mod score;
pub mod state;
pub mod terrain;
pub mod tiles;
pub mod world;

pub use actors::{Actor, ActorId, ActorKind, ActorManager, ActorSpawn, Capabilities, CollisionResponse};
pub use camera::Camera;
pub use effects::{EffectManager, EffectRequest, SideEffect};
pub use level::{GoalColumn, Level, LevelBuilder, VisibleTile};
pub use pipeline::{FrameContext, PlayerPipeline, StepResult};
pub use quadrant::{TileShape, is_solid};
pub use score::{ScoreKind, ScoreTracker};
pub use state::{Action, PhysicsEvent, PlayerIntent, PlayerState, SizeTier, WarpEvent};
pub use terrain::{BehaviorSpec, TerrainBehavior, TerrainManager, TileChange, TileKey};
pub use tiles::{TileDefinition, TileLibrary};
pub use world::{World, WorldSnapshot};
