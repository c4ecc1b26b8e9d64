//! Components held by value inside each actor

use serde::{Deserialize, Serialize};

use super::physics::{ActorPipeline, ActorState};
use crate::sim::level::Level;
use crate::tuning::{ActorMotion, KnockoutTuning};

/// Walks the actor through its physics pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementController {
    pub speed: f32,
    pub pipeline: ActorPipeline,
}

impl MovementController {
    pub fn walker(motion: &ActorMotion) -> Self {
        Self {
            speed: motion.speed,
            pipeline: ActorPipeline::walker(motion),
        }
    }

    pub fn update(&self, state: &mut ActorState, level: &Level, dt: f32) {
        self.pipeline.run(state, level, dt);
    }

    /// Reverse direction, e.g. on meeting a blocking actor
    pub fn turn_around(&self, state: &mut ActorState) {
        state.direction = -state.direction;
        state.vel.x = self.speed * state.direction;
    }

    /// Start moving in `direction` at full speed
    pub fn set_direction(&self, state: &mut ActorState, direction: f32) {
        state.direction = direction;
        state.vel.x = self.speed * direction;
    }
}

/// Ballistic knocked-out flight that overrides normal movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KnockoutController {
    pub settings: KnockoutTuning,
    pub knocked_out: bool,
}

impl KnockoutController {
    pub fn new(settings: KnockoutTuning) -> Self {
        Self {
            settings,
            knocked_out: false,
        }
    }

    /// Launch away from the source. Direction follows the source's velocity,
    /// or the relative position when the source is still.
    pub fn trigger(&mut self, state: &mut ActorState, source_vx: f32, source_center_x: f32) {
        if self.knocked_out {
            return;
        }
        self.knocked_out = true;
        let direction = if source_vx > 0.0 {
            1.0
        } else if source_vx < 0.0 {
            -1.0
        } else if state.center_x() >= source_center_x {
            1.0
        } else {
            -1.0
        };
        state.direction = direction;
        state.vel.x = self.settings.horizontal_velocity * direction;
        state.vel.y = self.settings.vertical_velocity;
        state.on_ground = false;
    }

    /// Advance the flight; `None` when not knocked out, otherwise keep-alive
    pub fn update(&self, state: &mut ActorState, dt: f32) -> Option<bool> {
        if !self.knocked_out {
            return None;
        }
        state.vel.y -= self.settings.gravity * dt;
        state.pos += state.vel * dt;
        Some(state.pos.y >= self.settings.removal_floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_knockout_direction_from_velocity_then_position() {
        let mut state = ActorState::new(Vec2::new(100.0, 32.0), 16.0, 16.0, -1.0);
        let mut ko = KnockoutController::new(KnockoutTuning::default());
        ko.trigger(&mut state, 50.0, 500.0);
        assert!(state.vel.x > 0.0);
        assert!(state.vel.y > 0.0);

        let mut state = ActorState::new(Vec2::new(100.0, 32.0), 16.0, 16.0, 1.0);
        let mut ko = KnockoutController::new(KnockoutTuning::default());
        ko.trigger(&mut state, 0.0, 200.0);
        assert!(state.vel.x < 0.0);
    }

    #[test]
    fn test_knockout_falls_to_removal_floor() {
        let mut state = ActorState::new(Vec2::new(0.0, 32.0), 16.0, 16.0, 1.0);
        let mut ko = KnockoutController::new(KnockoutTuning::default());
        assert_eq!(ko.update(&mut state, 0.1), None);
        ko.trigger(&mut state, 0.0, -10.0);
        let mut frames = 0;
        while ko.update(&mut state, 1.0 / 60.0) == Some(true) {
            frames += 1;
            assert!(frames < 1000);
        }
        assert!(state.pos.y < -100.0);
    }

    #[test]
    fn test_turn_around() {
        let movement = MovementController::walker(&ActorMotion::default());
        let mut state = ActorState::new(Vec2::ZERO, 16.0, 16.0, 1.0);
        movement.turn_around(&mut state);
        assert_eq!(state.direction, -1.0);
        assert_eq!(state.vel.x, -32.0);
    }
}
