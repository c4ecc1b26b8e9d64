//! Non-player actors
//!
//! Actor kinds are data: a [`ActorKind`], a phase, and a capability set the
//! collision resolver queries. Shared movement and knockout behavior come from
//! the [`MovementController`] and [`KnockoutController`] each actor holds.

pub mod controllers;
pub mod manager;
pub mod physics;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use controllers::{KnockoutController, MovementController};
pub use manager::ActorManager;
pub use physics::{ActorPipeline, ActorState, ActorStep};

use super::level::Level;
use super::score::ScoreKind;
use super::state::PlayerState;
use crate::consts::TILE_SIZE;
use crate::tuning::{ActorTuning, StompTuning};

/// Power-up tag granted by a mushroom
pub const POWER_UP_MUSHROOM: &str = "mushroom";

/// Stable actor identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorKind {
    Goomba,
    KoopaTroopa,
    Shell,
    Mushroom,
}

bitflags! {
    /// What an actor can currently do in collisions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Capabilities: u8 {
        /// Knocks out damageable actors it touches
        const CAN_DAMAGE = 1 << 0;
        const CAN_BE_DAMAGED = 1 << 1;
        /// Walkers turn around on contact
        const BLOCKS = 1 << 2;
        const STOMPABLE = 1 << 3;
    }
}

/// Behavioral sub-state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActorPhase {
    Walking,
    /// Flattened by a stomp, removed when the timer runs out
    Squashed { timer: f32 },
    ShellIdle,
    /// Kicked shell; harmless until the cooldown elapses
    ShellMoving { cooldown: f32 },
}

/// Request to add an actor to the active set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorSpawn {
    pub kind: ActorKind,
    pub pos: Vec2,
    pub direction: f32,
}

/// An actor's reaction to the player touching it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionResponse {
    pub remove: bool,
    pub damage: bool,
    pub power_up: Option<&'static str>,
    /// Raw upward velocity for the player
    pub bounce_velocity: Option<f32>,
    pub spawn: Option<ActorSpawn>,
    pub score: Option<ScoreKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub state: ActorState,
    pub phase: ActorPhase,
    pub movement: MovementController,
    pub knockout: KnockoutController,
}

impl Actor {
    pub fn new(id: ActorId, spawn: &ActorSpawn, tuning: &ActorTuning) -> Self {
        let (motion, phase) = match spawn.kind {
            ActorKind::Goomba => (&tuning.goomba, ActorPhase::Walking),
            ActorKind::KoopaTroopa => (&tuning.koopa, ActorPhase::Walking),
            ActorKind::Shell if spawn.direction != 0.0 => (
                &tuning.shell,
                ActorPhase::ShellMoving {
                    cooldown: tuning.kick_cooldown,
                },
            ),
            ActorKind::Shell => (&tuning.shell, ActorPhase::ShellIdle),
            ActorKind::Mushroom => (&tuning.mushroom, ActorPhase::Walking),
        };
        let movement = MovementController::walker(motion);
        let mut state = ActorState::new(spawn.pos, TILE_SIZE, TILE_SIZE, spawn.direction);
        state.vel.x = movement.speed * spawn.direction;
        Self {
            id,
            kind: spawn.kind,
            state,
            phase,
            movement,
            knockout: KnockoutController::new(tuning.knockout),
        }
    }

    pub fn is_knocked_out(&self) -> bool {
        self.knockout.knocked_out
    }

    pub fn capabilities(&self) -> Capabilities {
        if self.is_knocked_out() {
            return Capabilities::empty();
        }
        match (self.kind, self.phase) {
            (_, ActorPhase::Squashed { .. }) => Capabilities::empty(),
            (ActorKind::Mushroom, _) => Capabilities::empty(),
            (ActorKind::Shell, ActorPhase::ShellIdle) => {
                Capabilities::CAN_BE_DAMAGED | Capabilities::BLOCKS | Capabilities::STOMPABLE
            }
            (ActorKind::Shell, ActorPhase::ShellMoving { cooldown }) => {
                let mut caps = Capabilities::CAN_BE_DAMAGED | Capabilities::STOMPABLE;
                if cooldown <= 0.0 {
                    caps |= Capabilities::CAN_DAMAGE;
                }
                caps
            }
            _ => Capabilities::CAN_BE_DAMAGED | Capabilities::STOMPABLE,
        }
    }

    /// Walkers turn around on blockers; shells and knocked-out actors ignore them
    pub fn responds_to_blockers(&self) -> bool {
        !self.is_knocked_out() && self.phase == ActorPhase::Walking
    }

    /// Advance one frame; returns false when the actor should be removed
    pub fn update(&mut self, level: &Level, dt: f32) -> bool {
        if let Some(alive) = self.knockout.update(&mut self.state, dt) {
            return alive;
        }
        match &mut self.phase {
            ActorPhase::Squashed { timer } => {
                *timer -= dt;
                if *timer <= 0.0 {
                    return false;
                }
            }
            ActorPhase::ShellMoving { cooldown } => {
                *cooldown = (*cooldown - dt).max(0.0);
                self.movement.update(&mut self.state, level, dt);
            }
            ActorPhase::Walking | ActorPhase::ShellIdle => {
                self.movement.update(&mut self.state, level, dt);
            }
        }
        self.state.screen = level.screen_at(self.state.center_x());
        true
    }

    /// Turn around and step out of a blocking actor
    pub fn bounce_off(&mut self, blocker: &ActorState) {
        self.movement.turn_around(&mut self.state);
        if self.state.center_x() < blocker.center_x() {
            self.state.pos.x = blocker.pos.x - self.state.width;
        } else {
            self.state.pos.x = blocker.right();
        }
    }

    /// Whether the player's feet are coming down on this actor's top
    pub fn is_stomped_by(&self, player: &PlayerState, stomp: &StompTuning) -> bool {
        let threshold = self.state.top() - self.state.height * stomp.top_fraction;
        player.vel.y < 0.0 && player.pos.y > threshold
    }

    /// React to the player touching this actor
    pub fn on_player_contact(
        &mut self,
        player: &PlayerState,
        tuning: &ActorTuning,
        stomp: &StompTuning,
    ) -> Option<CollisionResponse> {
        if self.is_knocked_out() {
            return None;
        }
        let stomped = self.is_stomped_by(player, stomp);
        match (self.kind, self.phase) {
            (_, ActorPhase::Squashed { .. }) => None,
            (ActorKind::Mushroom, _) => Some(CollisionResponse {
                remove: true,
                power_up: Some(POWER_UP_MUSHROOM),
                ..Default::default()
            }),
            (ActorKind::Goomba, _) if stomped => {
                self.phase = ActorPhase::Squashed {
                    timer: tuning.death_timer,
                };
                self.state.vel = Vec2::ZERO;
                self.state.direction = 0.0;
                Some(CollisionResponse {
                    bounce_velocity: Some(tuning.stomp_bounce),
                    score: Some(ScoreKind::Stomp),
                    ..Default::default()
                })
            }
            (ActorKind::KoopaTroopa, _) if stomped => Some(CollisionResponse {
                remove: true,
                bounce_velocity: Some(tuning.stomp_bounce),
                spawn: Some(ActorSpawn {
                    kind: ActorKind::Shell,
                    pos: self.state.pos,
                    direction: 0.0,
                }),
                score: Some(ScoreKind::Stomp),
                ..Default::default()
            }),
            // Rising out of a stomp still overlaps the freshly spawned shell
            (ActorKind::Shell, ActorPhase::ShellIdle) if player.vel.y > 0.0 => None,
            (ActorKind::Shell, ActorPhase::ShellIdle) => {
                // Any other touch kicks it away from the player
                let direction = if player.center_x() < self.state.center_x() {
                    1.0
                } else {
                    -1.0
                };
                self.movement.set_direction(&mut self.state, direction);
                self.phase = ActorPhase::ShellMoving {
                    cooldown: tuning.kick_cooldown,
                };
                Some(CollisionResponse {
                    bounce_velocity: stomped.then_some(tuning.stomp_bounce),
                    score: Some(ScoreKind::ShellKick),
                    ..Default::default()
                })
            }
            (ActorKind::Shell, ActorPhase::ShellMoving { .. }) if stomped => {
                self.movement.set_direction(&mut self.state, 0.0);
                self.phase = ActorPhase::ShellIdle;
                Some(CollisionResponse {
                    bounce_velocity: Some(tuning.stomp_bounce),
                    score: Some(ScoreKind::Stomp),
                    ..Default::default()
                })
            }
            (ActorKind::Shell, ActorPhase::ShellMoving { cooldown }) if cooldown > 0.0 => None,
            _ => Some(CollisionResponse {
                damage: true,
                ..Default::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PlayerState;

    fn spawn(kind: ActorKind, x: f32, direction: f32) -> Actor {
        Actor::new(
            ActorId(1),
            &ActorSpawn {
                kind,
                pos: Vec2::new(x, 32.0),
                direction,
            },
            &ActorTuning::default(),
        )
    }

    fn falling_player_on(actor: &Actor) -> PlayerState {
        let mut player = PlayerState::new(Vec2::new(actor.state.pos.x, actor.state.top() - 2.0));
        player.vel.y = -100.0;
        player
    }

    fn walking_player_into(actor: &Actor) -> PlayerState {
        let mut player = PlayerState::new(Vec2::new(actor.state.pos.x - 12.0, actor.state.pos.y));
        player.vel.x = 50.0;
        player
    }

    #[test]
    fn test_capabilities_by_phase() {
        let goomba = spawn(ActorKind::Goomba, 100.0, -1.0);
        assert!(goomba.capabilities().contains(Capabilities::CAN_BE_DAMAGED));
        assert!(!goomba.capabilities().contains(Capabilities::CAN_DAMAGE));

        let idle = spawn(ActorKind::Shell, 100.0, 0.0);
        assert!(idle.capabilities().contains(Capabilities::BLOCKS));
        assert!(!idle.capabilities().contains(Capabilities::CAN_DAMAGE));

        let mut moving = spawn(ActorKind::Shell, 100.0, 1.0);
        assert!(!moving.capabilities().contains(Capabilities::CAN_DAMAGE));
        moving.phase = ActorPhase::ShellMoving { cooldown: 0.0 };
        assert!(moving.capabilities().contains(Capabilities::CAN_DAMAGE));

        assert!(spawn(ActorKind::Mushroom, 0.0, 1.0).capabilities().is_empty());
    }

    #[test]
    fn test_goomba_stomp_and_side_contact() {
        let tuning = ActorTuning::default();
        let stomp = StompTuning::default();
        let mut goomba = spawn(ActorKind::Goomba, 100.0, -1.0);
        let player = walking_player_into(&goomba);
        let response = goomba.on_player_contact(&player, &tuning, &stomp).unwrap();
        assert!(response.damage);

        let player = falling_player_on(&goomba);
        let response = goomba.on_player_contact(&player, &tuning, &stomp).unwrap();
        assert_eq!(response.bounce_velocity, Some(tuning.stomp_bounce));
        assert_eq!(response.score, Some(ScoreKind::Stomp));
        assert!(!response.remove);
        assert!(matches!(goomba.phase, ActorPhase::Squashed { .. }));

        // Squashed goombas are inert, then expire
        assert!(goomba.on_player_contact(&player, &tuning, &stomp).is_none());
        let level = crate::sim::level::tests::flat_level().build().unwrap();
        assert!(goomba.update(&level, 0.25));
        assert!(!goomba.update(&level, 0.3));
    }

    #[test]
    fn test_koopa_stomp_spawns_idle_shell() {
        let mut koopa = spawn(ActorKind::KoopaTroopa, 100.0, -1.0);
        let player = falling_player_on(&koopa);
        let response = koopa
            .on_player_contact(&player, &ActorTuning::default(), &StompTuning::default())
            .unwrap();
        assert!(response.remove);
        let shell = response.spawn.unwrap();
        assert_eq!(shell.kind, ActorKind::Shell);
        assert_eq!(shell.direction, 0.0);
    }

    #[test]
    fn test_shell_kick_stop_and_cooldown() {
        let tuning = ActorTuning::default();
        let stomp = StompTuning::default();
        let mut shell = spawn(ActorKind::Shell, 100.0, 0.0);

        let player = walking_player_into(&shell);
        let response = shell.on_player_contact(&player, &tuning, &stomp).unwrap();
        assert_eq!(response.score, Some(ScoreKind::ShellKick));
        assert!(!response.damage);
        assert!(shell.state.vel.x > 0.0);

        // Within the cooldown the kicker is safe
        assert!(shell.on_player_contact(&player, &tuning, &stomp).is_none());

        shell.phase = ActorPhase::ShellMoving { cooldown: 0.0 };
        assert!(shell.on_player_contact(&player, &tuning, &stomp).unwrap().damage);

        let player = falling_player_on(&shell);
        let response = shell.on_player_contact(&player, &tuning, &stomp).unwrap();
        assert_eq!(response.score, Some(ScoreKind::Stomp));
        assert_eq!(shell.phase, ActorPhase::ShellIdle);
        assert_eq!(shell.state.vel.x, 0.0);
    }

    #[test]
    fn test_rising_player_leaves_idle_shell_alone() {
        let mut shell = spawn(ActorKind::Shell, 100.0, 0.0);
        let mut player = PlayerState::new(Vec2::new(100.0, 40.0));
        player.vel.y = 200.0;
        let response =
            shell.on_player_contact(&player, &ActorTuning::default(), &StompTuning::default());
        assert!(response.is_none());
        assert_eq!(shell.phase, ActorPhase::ShellIdle);
        assert_eq!(shell.state.vel.x, 0.0);
    }

    #[test]
    fn test_mushroom_grants_power_up() {
        let mut mushroom = spawn(ActorKind::Mushroom, 100.0, 1.0);
        let player = walking_player_into(&mushroom);
        let response = mushroom
            .on_player_contact(&player, &ActorTuning::default(), &StompTuning::default())
            .unwrap();
        assert!(response.remove);
        assert_eq!(response.power_up, Some(POWER_UP_MUSHROOM));
        assert!(!response.damage);
    }

    #[test]
    fn test_bounce_off_blocker_steps_out() {
        let mut goomba = spawn(ActorKind::Goomba, 100.0, 1.0);
        let shell = spawn(ActorKind::Shell, 110.0, 0.0);
        goomba.bounce_off(&shell.state);
        assert_eq!(goomba.state.direction, -1.0);
        assert_eq!(goomba.state.right(), 110.0);
        assert!(!goomba.state.overlaps(&shell.state));
    }
}
