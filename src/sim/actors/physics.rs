//! Composable actor physics
//!
//! An [`ActorPipeline`] is an ordered list of [`ActorStep`]s built once from
//! an actor's motion config. Steps keep no state of their own; everything
//! lives in [`ActorState`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::level::Level;
use crate::sim::probe::{find_ground, solid_quadrant_at};
use crate::tuning::ActorMotion;

/// Kinematic state of one actor. `pos` is the bottom-left corner, y up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    /// -1 left, 0 still, 1 right
    pub direction: f32,
    pub on_ground: bool,
    pub screen: usize,
}

impl ActorState {
    pub fn new(pos: Vec2, width: f32, height: f32, direction: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            width,
            height,
            direction,
            on_ground: false,
            screen: 0,
        }
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.pos.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    pub fn overlaps(&self, other: &ActorState) -> bool {
        self.pos.x < other.right()
            && self.right() > other.pos.x
            && self.pos.y < other.top()
            && self.top() > other.pos.y
    }
}

/// One composable physics step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActorStep {
    Gravity { gravity: f32 },
    /// vx = direction * speed
    HorizontalVelocity { speed: f32 },
    Integrate,
    /// Reverse on a solid quadrant at the leading edge
    WallBounce { speed: f32 },
    /// Land on the highest surface within tolerance
    GroundSnap { tolerance: f32 },
}

impl ActorStep {
    pub fn apply(&self, state: &mut ActorState, level: &Level, dt: f32) {
        match *self {
            ActorStep::Gravity { gravity } => {
                state.vel.y -= gravity * dt;
            }
            ActorStep::HorizontalVelocity { speed } => {
                state.vel.x = speed * state.direction;
            }
            ActorStep::Integrate => {
                state.pos += state.vel * dt;
            }
            ActorStep::WallBounce { speed } => {
                if state.vel.x == 0.0 {
                    return;
                }
                let edge_x = if state.vel.x > 0.0 {
                    state.right() - 1.0
                } else {
                    state.pos.x
                };
                let sample_y = state.pos.y + state.height / 2.0;
                if let Some(quad) = solid_quadrant_at(level, edge_x, sample_y) {
                    state.direction = -state.direction;
                    state.vel.x = speed * state.direction;
                    if state.direction > 0.0 {
                        state.pos.x = quad.right;
                    } else {
                        state.pos.x = quad.left - state.width;
                    }
                }
            }
            ActorStep::GroundSnap { tolerance } => {
                match find_ground(level, state.pos.x, state.pos.y, state.width, tolerance) {
                    Some(surface) if state.vel.y <= 0.0 => {
                        state.pos.y = surface;
                        state.vel.y = 0.0;
                        state.on_ground = true;
                    }
                    _ => state.on_ground = false,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActorPipeline {
    steps: Vec<ActorStep>,
}

impl ActorPipeline {
    pub fn new(steps: Vec<ActorStep>) -> Self {
        Self { steps }
    }

    /// Gravity → HorizontalVelocity → Integrate → WallBounce → GroundSnap
    pub fn walker(motion: &ActorMotion) -> Self {
        Self::new(vec![
            ActorStep::Gravity {
                gravity: motion.gravity,
            },
            ActorStep::HorizontalVelocity {
                speed: motion.speed,
            },
            ActorStep::Integrate,
            ActorStep::WallBounce {
                speed: motion.speed,
            },
            ActorStep::GroundSnap {
                tolerance: motion.ground_tolerance,
            },
        ])
    }

    /// Append an extra step at the end
    pub fn with_step(mut self, step: ActorStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[ActorStep] {
        &self.steps
    }

    pub fn run(&self, state: &mut ActorState, level: &Level, dt: f32) {
        for step in &self.steps {
            step.apply(state, level, dt);
        }
    }
}
