//! Stomp lookahead, action classification, and size transitions

use std::ops::ControlFlow;

use crate::sim::actors::Capabilities;
use crate::sim::pipeline::{FrameContext, StepResult};
use crate::sim::state::Action;

/// Flag an imminent stomp before contact registers: falling, and the feet
/// are within the lookahead above a stompable actor's top third.
pub fn stomp_lookahead(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &ctx.player;
    if player.is_dying || player.on_ground || player.vel.y >= 0.0 {
        return ControlFlow::Continue(());
    }
    let inset = ctx.config.collision.player_contact_inset;
    let stomp = &ctx.config.stomp;
    let (left, right, feet) = (player.pos.x + inset, player.right() - inset, player.pos.y);

    let imminent = ctx.actors.iter().any(|actor| {
        let state = &actor.state;
        actor.capabilities().contains(Capabilities::STOMPABLE)
            && left < state.right()
            && right > state.pos.x
            && feet > state.top() - state.height * stomp.top_fraction
            && feet <= state.top() + stomp.lookahead
    });
    if imminent {
        ctx.player.is_stomping = true;
    }
    ControlFlow::Continue(())
}

/// Derive the action from resolved motion, not raw intent
pub fn classify(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &mut ctx.player;
    if player.is_dying {
        player.action = Action::Dying;
        return ControlFlow::Continue(());
    }
    if player.on_ground {
        player.is_stomping = false;
    }

    let speed = player.vel.x.abs();
    if player.action == Action::Skidding
        && player.on_ground
        && speed >= ctx.config.acceleration.skid_clear_speed
    {
        return ControlFlow::Continue(());
    }

    let tuning = &ctx.config.action;
    player.action = if player.is_stomping {
        Action::Stomping
    } else if !player.on_ground {
        Action::Jumping
    } else if speed > tuning.running_fraction * ctx.config.movement.run_speed {
        Action::Running
    } else if speed > tuning.walking_speed {
        Action::Walking
    } else {
        Action::Idle
    };
    ControlFlow::Continue(())
}

/// Flicker the box between sizes until the transition ends
pub fn advance_transition(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &mut ctx.player;
    let Some(mut transition) = player.transition else {
        return ControlFlow::Continue(());
    };
    if transition.advance(ctx.dt, &ctx.config.transition) {
        player.set_size(transition.to);
        player.transition = None;
        log::debug!("size transition to {:?} finished", transition.to);
    } else {
        player.set_size(transition.current());
        player.transition = Some(transition);
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actors::{ActorKind, ActorSpawn};
    use crate::sim::level::tests::flat_level;
    use crate::sim::player::testing::Rig;
    use crate::sim::state::{PlayerIntent, SizeTier};
    use glam::Vec2;

    fn rig() -> Rig {
        Rig::new(flat_level().build().unwrap(), Vec2::new(100.0, 32.0))
    }

    fn classified(rig: &mut Rig) -> Action {
        let mut ctx = rig.frame(PlayerIntent::default());
        let _ = classify(&mut ctx);
        rig.player = ctx.player;
        rig.player.action
    }

    #[test]
    fn test_classify_by_speed() {
        let mut rig = rig();
        rig.player.on_ground = true;
        assert_eq!(classified(&mut rig), Action::Idle);
        rig.player.vel.x = 50.0;
        assert_eq!(classified(&mut rig), Action::Walking);
        rig.player.vel.x = -120.0;
        assert_eq!(classified(&mut rig), Action::Running);
        rig.player.on_ground = false;
        assert_eq!(classified(&mut rig), Action::Jumping);
        rig.player.is_dying = true;
        assert_eq!(classified(&mut rig), Action::Dying);
    }

    #[test]
    fn test_skid_holds_until_slow() {
        let mut rig = rig();
        rig.player.on_ground = true;
        rig.player.action = Action::Skidding;
        rig.player.vel.x = 60.0;
        assert_eq!(classified(&mut rig), Action::Skidding);
        rig.player.vel.x = 5.0;
        assert_eq!(classified(&mut rig), Action::Walking);
    }

    #[test]
    fn test_stomping_sticky_until_landing() {
        let mut rig = rig();
        rig.player.is_stomping = true;
        rig.player.vel.y = 150.0;
        assert_eq!(classified(&mut rig), Action::Stomping);
        assert!(rig.player.is_invincible());
        rig.player.on_ground = true;
        assert_eq!(classified(&mut rig), Action::Idle);
        assert!(!rig.player.is_stomping);
    }

    #[test]
    fn test_lookahead_flags_falling_player_above_actor() {
        let mut rig = rig();
        rig.actors.spawn(&ActorSpawn {
            kind: ActorKind::Goomba,
            pos: Vec2::new(100.0, 32.0),
            direction: -1.0,
        });
        rig.player.pos.y = 52.0;
        rig.player.vel.y = -80.0;
        let mut ctx = rig.frame(PlayerIntent::default());
        let _ = stomp_lookahead(&mut ctx);
        assert!(ctx.player.is_stomping);

        rig.player.vel.y = 80.0;
        let mut ctx = rig.frame(PlayerIntent::default());
        let _ = stomp_lookahead(&mut ctx);
        assert!(!ctx.player.is_stomping);

        rig.player.vel.y = -80.0;
        rig.player.pos.x = 140.0;
        let mut ctx = rig.frame(PlayerIntent::default());
        let _ = stomp_lookahead(&mut ctx);
        assert!(!ctx.player.is_stomping);
    }

    #[test]
    fn test_transition_settles_on_target() {
        let mut rig = rig();
        rig.player
            .start_transition(SizeTier::Big, &rig.config.transition);
        for _ in 0..120 {
            let mut ctx = rig.frame(PlayerIntent::default());
            let _ = advance_transition(&mut ctx);
            rig.player = ctx.player;
        }
        assert!(rig.player.transition.is_none());
        assert_eq!(rig.player.size, SizeTier::Big);
        assert_eq!(rig.player.height, 32.0);
    }
}
