//! Event-producing steps, checked in priority order: end-level, warp, death

use std::ops::ControlFlow;

use crate::sim::pipeline::{FrameContext, StepResult};
use crate::sim::state::{PhysicsEvent, WarpEvent};
use crate::tile_coord;

/// Reaching the goal column on its screen ends the level
pub fn end_level(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &ctx.player;
    if player.is_dying {
        return ControlFlow::Continue(());
    }
    let Some(goal) = ctx.level.goal() else {
        return ControlFlow::Continue(());
    };
    if ctx.level.screen_at(player.center_x()) != goal.screen {
        return ControlFlow::Continue(());
    }
    if player.right() >= goal.center_x() - ctx.config.goal.trigger_distance {
        return ControlFlow::Break(PhysicsEvent::EndLevel {
            x: goal.center_x(),
            base_y: goal.base_y(),
        });
    }
    ControlFlow::Continue(())
}

/// Ducking on a warp tile
pub fn warp(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &ctx.player;
    if player.is_dying || !ctx.intent.duck || !player.on_ground {
        return ControlFlow::Continue(());
    }
    let column = tile_coord(player.center_x());
    let row = tile_coord(player.pos.y) - 1;
    let Some(key) = ctx.level.key_at(column, row) else {
        return ControlFlow::Continue(());
    };
    match ctx
        .level
        .terrain()
        .behavior(key)
        .and_then(|b| b.warp_destination())
    {
        Some(destination) => ControlFlow::Break(PhysicsEvent::Warp(WarpEvent {
            from: key,
            destination: destination.clone(),
        })),
        None => ControlFlow::Continue(()),
    }
}

/// Falling out of the level; never re-fires while already dying
pub fn death(ctx: &mut FrameContext<'_>) -> StepResult {
    if ctx.player.pos.y < 0.0 && !ctx.player.is_dying {
        return ControlFlow::Break(PhysicsEvent::Death);
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::tests::flat_level;
    use crate::sim::player::testing::Rig;
    use crate::sim::state::PlayerIntent;
    use crate::sim::terrain::{BehaviorSpec, TileKey, WarpDestination};
    use glam::Vec2;

    fn duck() -> PlayerIntent {
        PlayerIntent {
            duck: true,
            ..Default::default()
        }
    }

    fn warp_level() -> crate::sim::level::Level {
        flat_level()
            .tile(6, 1, "pipe")
            .behavior(
                6,
                1,
                BehaviorSpec::Warp {
                    to_screen: Some(1),
                    to_zone: Some("a".into()),
                },
            )
            .zone(1, 4, 2, 'a')
            .build()
            .unwrap()
    }

    #[test]
    fn test_death_below_level_only_once() {
        let mut rig = Rig::new(flat_level().build().unwrap(), Vec2::new(100.0, -1.0));
        let mut ctx = rig.frame(PlayerIntent::default());
        assert_eq!(death(&mut ctx), ControlFlow::Break(PhysicsEvent::Death));

        rig.player.is_dying = true;
        let mut ctx = rig.frame(PlayerIntent::default());
        assert_eq!(death(&mut ctx), ControlFlow::Continue(()));
    }

    #[test]
    fn test_warp_requires_duck_on_ground() {
        let mut rig = Rig::new(warp_level(), Vec2::new(96.0, 32.0));
        let mut ctx = rig.frame(duck());
        assert_eq!(warp(&mut ctx), ControlFlow::Continue(()));

        rig.player.on_ground = true;
        let mut ctx = rig.frame(duck());
        let expected = PhysicsEvent::Warp(WarpEvent {
            from: TileKey {
                screen: 0,
                x: 6,
                y: 1,
            },
            destination: WarpDestination {
                to_screen: 1,
                to_zone: 'a',
            },
        });
        assert_eq!(warp(&mut ctx), ControlFlow::Break(expected));

        let mut ctx = rig.frame(PlayerIntent::default());
        assert_eq!(warp(&mut ctx), ControlFlow::Continue(()));
    }

    #[test]
    fn test_end_level_near_goal_column() {
        let level = flat_level()
            .fill((28, 28), (2, 10), "flagpole")
            .behavior(28, 2, BehaviorSpec::Goal)
            .build()
            .unwrap();
        let goal_center = 28.0 * 16.0 + 8.0;

        let mut rig = Rig::new(level, Vec2::new(goal_center - 16.0 - 10.0, 32.0));
        let mut ctx = rig.frame(PlayerIntent::default());
        assert_eq!(end_level(&mut ctx), ControlFlow::Continue(()));

        rig.player.pos.x = goal_center - 16.0 - 4.0;
        let mut ctx = rig.frame(PlayerIntent::default());
        assert_eq!(
            end_level(&mut ctx),
            ControlFlow::Break(PhysicsEvent::EndLevel {
                x: goal_center,
                base_y: 32.0
            })
        );
    }
}
