//! Player frame pipeline
//!
//! A fixed, ordered list of named steps over one [`FrameContext`]. Each step
//! either continues or breaks with the frame's terminating [`PhysicsEvent`];
//! the runner stops at the first break, so at most one event exists per frame
//! and later steps never see a terminated frame.

use std::ops::ControlFlow;

use super::actors::ActorManager;
use super::camera::Camera;
use super::effects::SideEffect;
use super::level::Level;
use super::player::{action, collision, contact, movement, triggers};
use super::state::{PhysicsEvent, PlayerIntent, PlayerState};
use super::terrain::TileKey;
use crate::tuning::PhysicsConfig;

/// Outcome of one pipeline step
pub type StepResult = ControlFlow<PhysicsEvent>;

/// A pipeline step
pub type Step = fn(&mut FrameContext<'_>) -> StepResult;

/// Everything one frame of the player pipeline reads and writes.
///
/// `player` and `camera` are working copies; the world commits them only when
/// the frame finishes without an event. Requests for the world go into
/// `effects` and `tile_hits` and are likewise dropped on a terminated frame.
pub struct FrameContext<'a> {
    pub player: PlayerState,
    pub intent: PlayerIntent,
    pub camera: Camera,
    pub level: &'a Level,
    pub actors: &'a mut ActorManager,
    pub config: &'a PhysicsConfig,
    pub dt: f32,
    pub effects: Vec<SideEffect>,
    /// Tiles the player's head struck this frame, in hit order
    pub tile_hits: Vec<TileKey>,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        player: PlayerState,
        intent: PlayerIntent,
        camera: Camera,
        level: &'a Level,
        actors: &'a mut ActorManager,
        config: &'a PhysicsConfig,
        dt: f32,
    ) -> Self {
        Self {
            player,
            intent,
            camera,
            level,
            actors,
            config,
            dt,
            effects: Vec::new(),
            tile_hits: Vec::new(),
        }
    }
}

/// Ordered player steps
#[derive(Clone)]
pub struct PlayerPipeline {
    steps: Vec<(&'static str, Step)>,
}

impl Default for PlayerPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for PlayerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl PlayerPipeline {
    /// The canonical frame order
    pub fn standard() -> Self {
        Self {
            steps: vec![
                ("intent", movement::apply_intent),
                ("end_level", triggers::end_level),
                ("warp", triggers::warp),
                ("death", triggers::death),
                ("friction", movement::apply_friction),
                ("gravity", movement::apply_gravity),
                ("integrate", movement::integrate),
                ("boundaries", collision::clamp_to_boundaries),
                ("left_wall", collision::left_wall),
                ("right_wall", collision::right_wall),
                ("ceiling", collision::ceiling),
                ("ground", collision::ground),
                ("terrain_clamp", collision::goal_clamp),
                ("collectables", collision::collectables),
                ("stomp_lookahead", action::stomp_lookahead),
                ("action", action::classify),
                ("transition", action::advance_transition),
                ("actor_contact", contact::resolve),
            ],
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order, stopping at the first event
    pub fn run(&self, ctx: &mut FrameContext<'_>) -> Option<PhysicsEvent> {
        for (name, step) in &self.steps {
            if let ControlFlow::Break(event) = step(ctx) {
                log::debug!("frame terminated by `{name}`: {event:?}");
                return Some(event);
            }
            log::trace!(
                "{name}: pos={:?} vel={:?} ground={}",
                ctx.player.pos,
                ctx.player.vel,
                ctx.player.on_ground
            );
        }
        None
    }
}
