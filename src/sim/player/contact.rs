//! Player-vs-actor contact
//!
//! Runs last so it sees the fully resolved player box. Actors react through
//! [`Actor::on_player_contact`](crate::sim::actors::Actor::on_player_contact);
//! everything that touches the world is posted as a side effect.

use std::ops::ControlFlow;

use glam::Vec2;

use crate::sim::actors::POWER_UP_MUSHROOM;
use crate::sim::effects::SideEffect;
use crate::sim::pipeline::{FrameContext, StepResult};
use crate::sim::state::{PhysicsEvent, PlayerState, SizeTier};
use crate::tuning::PhysicsConfig;

pub fn resolve(ctx: &mut FrameContext<'_>) -> StepResult {
    if ctx.player.is_dying {
        return ControlFlow::Continue(());
    }
    let FrameContext {
        player,
        actors,
        config,
        effects,
        ..
    } = ctx;
    let inset = config.collision.player_contact_inset;

    for actor in actors.iter_mut() {
        if actor.is_knocked_out() {
            continue;
        }
        let state = &actor.state;
        let overlaps = player.pos.x + inset < state.right()
            && player.right() - inset > state.pos.x
            && player.pos.y < state.top()
            && player.top() > state.pos.y;
        if !overlaps {
            continue;
        }
        let Some(response) = actor.on_player_contact(player, &config.actors, &config.stomp) else {
            continue;
        };
        log::trace!("contact with {:?} #{}: {response:?}", actor.kind, actor.id.0);

        if let Some(kind) = response.score {
            effects.push(SideEffect::ActorScore {
                kind,
                source: Some(actor.id),
                pos: actor.state.pos + Vec2::new(0.0, actor.state.height),
            });
        }
        if let Some(velocity) = response.bounce_velocity {
            player.vel.y = velocity * config.stomp.bounce_scale;
            player.on_ground = false;
        }
        if let Some(spawn) = response.spawn {
            effects.push(SideEffect::SpawnActor(spawn));
        }
        if response.remove {
            effects.push(SideEffect::RemoveActor(actor.id));
        }
        if let Some(tag) = response.power_up {
            grant_power_up(player, tag, config);
        }
        if response.damage && !player.is_invincible() {
            match player.size {
                SizeTier::Small => return ControlFlow::Break(PhysicsEvent::Death),
                SizeTier::Big => player.start_transition(SizeTier::Small, &config.transition),
            }
        }
    }
    ControlFlow::Continue(())
}

fn grant_power_up(player: &mut PlayerState, tag: &str, config: &PhysicsConfig) {
    match tag {
        POWER_UP_MUSHROOM => player.start_transition(SizeTier::Big, &config.transition),
        other => log::warn!("unknown power-up `{other}` ignored"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actors::{ActorKind, ActorPhase, ActorSpawn};
    use crate::sim::level::tests::flat_level;
    use crate::sim::player::testing::Rig;
    use crate::sim::score::ScoreKind;
    use crate::sim::state::PlayerIntent;

    fn rig_with(kind: ActorKind, x: f32) -> Rig {
        let mut rig = Rig::new(flat_level().build().unwrap(), Vec2::new(100.0, 32.0));
        rig.player.on_ground = true;
        rig.actors.spawn(&ActorSpawn {
            kind,
            pos: Vec2::new(x, 32.0),
            direction: -1.0,
        });
        rig
    }

    #[test]
    fn test_small_player_dies_on_side_contact() {
        let mut rig = rig_with(ActorKind::Goomba, 110.0);
        let mut ctx = rig.frame(PlayerIntent::default());
        assert_eq!(resolve(&mut ctx), ControlFlow::Break(PhysicsEvent::Death));
    }

    #[test]
    fn test_big_player_shrinks_instead() {
        let mut rig = rig_with(ActorKind::Goomba, 110.0);
        rig.player.set_size(SizeTier::Big);
        let mut ctx = rig.frame(PlayerIntent::default());
        assert_eq!(resolve(&mut ctx), ControlFlow::Continue(()));
        let transition = ctx.player.transition.unwrap();
        assert_eq!(transition.to, SizeTier::Small);

        // Invulnerable for the rest of the transition
        let player = ctx.player.clone();
        rig.player = player;
        let mut ctx = rig.frame(PlayerIntent::default());
        assert_eq!(resolve(&mut ctx), ControlFlow::Continue(()));
    }

    #[test]
    fn test_inset_box_misses_grazing_contact() {
        let mut rig = rig_with(ActorKind::Goomba, 115.0);
        let mut ctx = rig.frame(PlayerIntent::default());
        assert_eq!(resolve(&mut ctx), ControlFlow::Continue(()));
    }

    #[test]
    fn test_stomp_bounces_and_scores() {
        let mut rig = rig_with(ActorKind::Goomba, 100.0);
        rig.player.on_ground = false;
        rig.player.pos.y = 46.0;
        rig.player.vel.y = -120.0;
        let mut ctx = rig.frame(PlayerIntent::default());
        assert_eq!(resolve(&mut ctx), ControlFlow::Continue(()));
        assert_eq!(ctx.player.vel.y, 250.0 * 0.8);
        assert!(matches!(
            ctx.effects.as_slice(),
            [SideEffect::ActorScore {
                kind: ScoreKind::Stomp,
                ..
            }]
        ));
        let goomba = ctx.actors.iter().next().unwrap();
        assert!(matches!(goomba.phase, ActorPhase::Squashed { .. }));
    }

    #[test]
    fn test_koopa_stomp_requests_shell_and_removal() {
        let mut rig = rig_with(ActorKind::KoopaTroopa, 100.0);
        rig.player.on_ground = false;
        rig.player.pos.y = 46.0;
        rig.player.vel.y = -120.0;
        let mut ctx = rig.frame(PlayerIntent::default());
        let _ = resolve(&mut ctx);
        let id = ctx.actors.iter().next().unwrap().id;
        assert!(ctx.effects.contains(&SideEffect::RemoveActor(id)));
        assert!(ctx.effects.iter().any(|e| matches!(
            e,
            SideEffect::SpawnActor(ActorSpawn {
                kind: ActorKind::Shell,
                direction,
                ..
            }) if *direction == 0.0
        )));
    }

    #[test]
    fn test_mushroom_grows_player() {
        let mut rig = rig_with(ActorKind::Mushroom, 108.0);
        let mut ctx = rig.frame(PlayerIntent::default());
        assert_eq!(resolve(&mut ctx), ControlFlow::Continue(()));
        assert_eq!(ctx.player.transition.unwrap().to, SizeTier::Big);
        assert_eq!(ctx.effects.len(), 1);
    }

    #[test]
    fn test_unknown_power_up_is_ignored() {
        let mut player = PlayerState::new(Vec2::ZERO);
        grant_power_up(&mut player, "star", &PhysicsConfig::default());
        assert!(player.transition.is_none());
        assert_eq!(player.size, SizeTier::Small);
    }
}
