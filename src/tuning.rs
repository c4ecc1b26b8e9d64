//! Data-driven physics tuning
//!
//! Every feel parameter of the simulation lives in [`PhysicsConfig`]. The
//! defaults are the canonical tuning; a JSON document may override any subset
//! of fields, section by section.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Horizontal speed caps (pixels/s)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub walk_speed: f32,
    pub run_speed: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            walk_speed: 85.0,
            run_speed: 140.0,
        }
    }
}

/// Horizontal acceleration (pixels/s²) and skid thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelerationTuning {
    pub ground: f32,
    pub air: f32,
    /// Deceleration while reversing against momentum on the ground
    pub skid_deceleration: f32,
    /// Opposing speed above which reversing starts a skid
    pub skid_threshold: f32,
    /// Speed below which a skid ends
    pub skid_clear_speed: f32,
}

impl Default for AccelerationTuning {
    fn default() -> Self {
        Self {
            ground: 180.0,
            air: 120.0,
            skid_deceleration: 600.0,
            skid_threshold: 100.0,
            skid_clear_speed: 10.0,
        }
    }
}

/// Friction applied when there is no directional intent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrictionTuning {
    /// Multiplier applied to vx once per frame
    pub factor: f32,
    /// Below this speed vx snaps to zero
    pub stop_threshold: f32,
}

impl Default for FrictionTuning {
    fn default() -> Self {
        Self {
            factor: 0.85,
            stop_threshold: 1.0,
        }
    }
}

/// Jump launch and gravity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpTuning {
    pub walk_velocity: f32,
    pub run_velocity: f32,
    /// |vx| above which the running launch velocity is used
    pub run_threshold: f32,
    pub gravity: f32,
    /// Gravity multiplier after the jump button is released while rising
    pub early_release_multiplier: f32,
}

impl Default for JumpTuning {
    fn default() -> Self {
        Self {
            walk_velocity: 226.0,
            run_velocity: 277.0,
            run_threshold: 100.0,
            gravity: 400.0,
            early_release_multiplier: 3.0,
        }
    }
}

/// Tile sampling tolerances (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    /// Snap distance for the player's ground probe
    pub ground_tolerance: f32,
    /// Foot-level wall sample sits this far above the feet
    pub wall_foot_dead_zone: f32,
    /// Head-level wall sample sits this far below the head
    pub wall_head_offset: f32,
    /// Head penetration tolerated before a ceiling registers
    pub ceiling_penetration: f32,
    /// Ceiling edge samples are inset this far from the box sides
    pub ceiling_edge_inset: f32,
    /// Player box is narrowed by this much per side against actors
    pub player_contact_inset: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            ground_tolerance: 2.0,
            wall_foot_dead_zone: 4.0,
            wall_head_offset: 2.0,
            ceiling_penetration: 2.0,
            ceiling_edge_inset: 2.0,
            player_contact_inset: 2.0,
        }
    }
}

/// Speed thresholds for action classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionTuning {
    pub walking_speed: f32,
    /// Fraction of run speed above which the action is running
    pub running_fraction: f32,
}

impl Default for ActionTuning {
    fn default() -> Self {
        Self {
            walking_speed: 1.0,
            running_fraction: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeathTuning {
    pub leap_velocity: f32,
    pub gravity: f32,
}

impl Default for DeathTuning {
    fn default() -> Self {
        Self {
            leap_velocity: 200.0,
            gravity: 400.0,
        }
    }
}

/// Stomp detection and rebound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StompTuning {
    /// Applied to an actor's raw bounce velocity
    pub bounce_scale: f32,
    /// How far above an actor the lookahead flags an imminent stomp
    pub lookahead: f32,
    /// Fraction of actor height counted as its top
    pub top_fraction: f32,
}

impl Default for StompTuning {
    fn default() -> Self {
        Self {
            bounce_scale: 0.8,
            lookahead: 8.0,
            top_fraction: 0.33,
        }
    }
}

/// Grow/shrink flicker timing (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTuning {
    pub duration: f32,
    pub toggle_interval: f32,
}

impl Default for TransitionTuning {
    fn default() -> Self {
        Self {
            duration: 1.0,
            toggle_interval: 0.08,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalTuning {
    /// The end-level trigger fires this far before the goal column center
    pub trigger_distance: f32,
}

impl Default for GoalTuning {
    fn default() -> Self {
        Self {
            trigger_distance: 4.0,
        }
    }
}

/// Terrain behavior animation and rewards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainTuning {
    pub bounce_duration: f32,
    pub bounce_peak: f32,
    pub smash_score: u32,
}

impl Default for TerrainTuning {
    fn default() -> Self {
        Self {
            bounce_duration: 0.3,
            bounce_peak: 4.5,
            smash_score: 50,
        }
    }
}

/// Declarative physics for one actor kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorMotion {
    pub gravity: f32,
    pub speed: f32,
    pub ground_tolerance: f32,
}

impl Default for ActorMotion {
    fn default() -> Self {
        Self {
            gravity: 400.0,
            speed: 32.0,
            ground_tolerance: 2.0,
        }
    }
}

/// Ballistic launch used when an actor is knocked out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockoutTuning {
    pub vertical_velocity: f32,
    pub horizontal_velocity: f32,
    pub gravity: f32,
    pub removal_floor: f32,
}

impl Default for KnockoutTuning {
    fn default() -> Self {
        Self {
            vertical_velocity: 180.0,
            horizontal_velocity: 40.0,
            gravity: 400.0,
            removal_floor: -100.0,
        }
    }
}

/// Per-kind actor tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorTuning {
    pub goomba: ActorMotion,
    pub koopa: ActorMotion,
    pub shell: ActorMotion,
    pub mushroom: ActorMotion,
    /// Raw upward velocity handed to the player on a stomp
    pub stomp_bounce: f32,
    /// Seconds a squashed goomba stays before removal
    pub death_timer: f32,
    /// Seconds after a kick before a shell can hurt anything
    pub kick_cooldown: f32,
    pub knockout: KnockoutTuning,
    /// Actors whose right edge is this far left of the camera are culled
    pub cull_margin: f32,
    pub cull_floor: f32,
}

impl Default for ActorTuning {
    fn default() -> Self {
        Self {
            goomba: ActorMotion::default(),
            koopa: ActorMotion::default(),
            shell: ActorMotion {
                speed: 160.0,
                ..ActorMotion::default()
            },
            mushroom: ActorMotion {
                speed: 50.0,
                ..ActorMotion::default()
            },
            stomp_bounce: 250.0,
            death_timer: 0.5,
            kick_cooldown: 0.2,
            knockout: KnockoutTuning::default(),
            cull_margin: 32.0,
            cull_floor: -100.0,
        }
    }
}

/// Complete physics configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub movement: MovementTuning,
    pub acceleration: AccelerationTuning,
    pub friction: FrictionTuning,
    pub jump: JumpTuning,
    pub collision: CollisionTuning,
    pub action: ActionTuning,
    pub death: DeathTuning,
    pub stomp: StompTuning,
    pub transition: TransitionTuning,
    pub goal: GoalTuning,
    pub terrain: TerrainTuning,
    pub actors: ActorTuning,
}

impl PhysicsConfig {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::info!("Loaded physics config");
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positives = [
            ("jump.gravity", self.jump.gravity),
            ("death.gravity", self.death.gravity),
            ("movement.walk_speed", self.movement.walk_speed),
            ("movement.run_speed", self.movement.run_speed),
            ("transition.duration", self.transition.duration),
            ("transition.toggle_interval", self.transition.toggle_interval),
            ("terrain.bounce_duration", self.terrain.bounce_duration),
            ("actors.knockout.gravity", self.actors.knockout.gravity),
            ("actors.goomba.gravity", self.actors.goomba.gravity),
            ("actors.koopa.gravity", self.actors.koopa.gravity),
            ("actors.shell.gravity", self.actors.shell.gravity),
            ("actors.mushroom.gravity", self.actors.mushroom.gravity),
        ];
        for (field, value) in positives {
            if value <= 0.0 || !value.is_finite() {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    /// Serialize for inspection or tooling
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Top horizontal speed for the given run state
    pub fn max_speed(&self, run: bool) -> f32 {
        if run {
            self.movement.run_speed
        } else {
            self.movement.walk_speed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PhysicsConfig::from_json(r#"{ "jump": { "gravity": 500.0 } }"#).unwrap();
        assert_eq!(config.jump.gravity, 500.0);
        assert_eq!(config.jump.walk_velocity, 226.0);
        assert_eq!(config.movement, MovementTuning::default());
        assert_eq!(config.actors.mushroom.speed, 50.0);
    }

    #[test]
    fn test_roundtrip_through_json() {
        let config = PhysicsConfig::default();
        let parsed = PhysicsConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_non_positive_gravity() {
        let err = PhysicsConfig::from_json(r#"{ "jump": { "gravity": 0.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonPositive {
                field: "jump.gravity",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            PhysicsConfig::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_max_speed() {
        let config = PhysicsConfig::default();
        assert_eq!(config.max_speed(false), 85.0);
        assert_eq!(config.max_speed(true), 140.0);
    }
}
