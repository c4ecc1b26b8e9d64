//! Player state and per-frame inputs/outputs
//!
//! [`PlayerState`] is owned by the world; the pipeline works on a copy and the
//! copy is committed only when no [`PhysicsEvent`] ends the frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::terrain::{TileKey, WarpDestination};
use crate::consts::TILE_SIZE;
use crate::tuning::TransitionTuning;

/// Player size tier, smallest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum SizeTier {
    #[default]
    Small,
    Big,
}

impl SizeTier {
    /// Collision box (width, height)
    pub fn dimensions(self) -> Vec2 {
        match self {
            SizeTier::Small => Vec2::new(TILE_SIZE, TILE_SIZE),
            SizeTier::Big => Vec2::new(TILE_SIZE, TILE_SIZE * 2.0),
        }
    }
}

/// Discrete action, derived from resolved motion each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Action {
    #[default]
    Idle,
    Walking,
    Running,
    Jumping,
    Skidding,
    Stomping,
    Dying,
}

/// Directional/jump/run/duck requests for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIntent {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub run: bool,
    pub duck: bool,
}

impl PlayerIntent {
    /// -1, 0 or 1; opposing directions cancel
    pub fn direction(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Grow/shrink flicker: the box alternates between sizes until done
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeTransition {
    pub from: SizeTier,
    pub to: SizeTier,
    pub remaining: f32,
    pub toggle_time: f32,
    pub show_target: bool,
}

impl SizeTransition {
    pub fn new(from: SizeTier, to: SizeTier, tuning: &TransitionTuning) -> Self {
        Self {
            from,
            to,
            remaining: tuning.duration,
            toggle_time: 0.0,
            show_target: true,
        }
    }

    /// Size the player should currently have
    pub fn current(&self) -> SizeTier {
        if self.show_target { self.to } else { self.from }
    }

    /// Advance; returns true once the transition has finished
    pub fn advance(&mut self, dt: f32, tuning: &TransitionTuning) -> bool {
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.show_target = true;
            return true;
        }
        self.toggle_time += dt;
        if self.toggle_time >= tuning.toggle_interval {
            self.toggle_time = 0.0;
            self.show_target = !self.show_target;
        }
        false
    }
}

/// Kinematic state of the player. `pos` is the bottom-left corner, y up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    pub facing_right: bool,
    pub on_ground: bool,
    pub action: Action,
    pub size: SizeTier,
    pub is_dying: bool,
    pub is_jumping: bool,
    pub is_stomping: bool,
    pub transition: Option<SizeTransition>,
}

impl PlayerState {
    pub fn new(pos: Vec2) -> Self {
        let dims = SizeTier::Small.dimensions();
        Self {
            pos,
            vel: Vec2::ZERO,
            width: dims.x,
            height: dims.y,
            facing_right: true,
            on_ground: false,
            action: Action::Idle,
            size: SizeTier::Small,
            is_dying: false,
            is_jumping: false,
            is_stomping: false,
            transition: None,
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

    /// Apply a size tier's collision box
    pub fn set_size(&mut self, size: SizeTier) {
        let dims = size.dimensions();
        self.size = size;
        self.width = dims.x;
        self.height = dims.y;
    }

    /// Damage is ignored mid-transition and while stomping
    pub fn is_invincible(&self) -> bool {
        self.transition.is_some() || self.action == Action::Stomping
    }

    /// Start a grow/shrink; no-op if already at `to`
    pub fn start_transition(&mut self, to: SizeTier, tuning: &TransitionTuning) {
        if self.size == to && self.transition.is_none() {
            return;
        }
        let from = self.transition.map_or(self.size, |t| t.from);
        let transition = SizeTransition::new(from, to, tuning);
        self.set_size(transition.current());
        self.transition = Some(transition);
    }

    /// Enter the dying sequence: ignore input, leap, fall through everything
    pub fn begin_dying(&mut self, leap_velocity: f32) {
        self.is_dying = true;
        self.is_jumping = false;
        self.is_stomping = false;
        self.on_ground = false;
        self.transition = None;
        self.vel = Vec2::new(0.0, leap_velocity);
        self.action = Action::Dying;
    }
}

/// Where a warp sends the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarpEvent {
    /// The warp tile the player stood on
    pub from: TileKey,
    pub destination: WarpDestination,
}

/// A terminating outcome of the player pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhysicsEvent {
    Death,
    Warp(WarpEvent),
    /// Reached the goal column; `x` is its center, `base_y` its bottom
    EndLevel { x: f32, base_y: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_cancels() {
        let both = PlayerIntent {
            move_left: true,
            move_right: true,
            ..Default::default()
        };
        assert_eq!(both.direction(), 0.0);
        let left = PlayerIntent {
            move_left: true,
            ..Default::default()
        };
        assert_eq!(left.direction(), -1.0);
    }

    #[test]
    fn test_grow_transition_flickers_then_settles() {
        let tuning = TransitionTuning::default();
        let mut player = PlayerState::new(Vec2::ZERO);
        player.start_transition(SizeTier::Big, &tuning);
        assert_eq!(player.height, 32.0);
        assert!(player.is_invincible());

        let mut seen_small = false;
        let mut t = player.transition.unwrap();
        let dt = 1.0 / 60.0;
        while !t.advance(dt, &tuning) {
            seen_small |= t.current() == SizeTier::Small;
        }
        assert!(seen_small);
        assert_eq!(t.current(), SizeTier::Big);
    }

    #[test]
    fn test_begin_dying_clears_flags() {
        let mut player = PlayerState::new(Vec2::new(10.0, 40.0));
        player.is_jumping = true;
        player.on_ground = true;
        player.begin_dying(200.0);
        assert!(player.is_dying);
        assert_eq!(player.action, Action::Dying);
        assert_eq!(player.vel, Vec2::new(0.0, 200.0));
        assert!(!player.on_ground && !player.is_jumping);
    }

    #[test]
    fn test_start_transition_same_size_is_noop() {
        let mut player = PlayerState::new(Vec2::ZERO);
        player.start_transition(SizeTier::Small, &TransitionTuning::default());
        assert!(player.transition.is_none());
    }
}
