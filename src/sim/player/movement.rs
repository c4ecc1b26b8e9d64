//! Intent, friction, gravity, and integration

use std::ops::ControlFlow;

use crate::sim::pipeline::{FrameContext, StepResult};
use crate::sim::state::Action;

/// Move `value` toward `target` by at most `max_delta`
fn approach(value: f32, target: f32, max_delta: f32) -> f32 {
    if value < target {
        (value + max_delta).min(target)
    } else {
        (value - max_delta).max(target)
    }
}

/// Accelerate toward the intended speed; reversing hard on the ground skids
pub fn apply_intent(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &mut ctx.player;
    let direction = ctx.intent.direction();
    if player.is_dying || direction == 0.0 {
        return ControlFlow::Continue(());
    }

    let accel = &ctx.config.acceleration;
    let target = direction * ctx.config.max_speed(ctx.intent.run);
    let opposing = player.vel.x * direction < 0.0;
    let rate = if player.on_ground && opposing && player.vel.x.abs() > accel.skid_threshold {
        player.action = Action::Skidding;
        accel.skid_deceleration
    } else if player.on_ground {
        accel.ground
    } else {
        accel.air
    };
    player.vel.x = approach(player.vel.x, target, rate * ctx.dt);

    if player.action != Action::Skidding {
        player.facing_right = direction > 0.0;
    }
    ControlFlow::Continue(())
}

/// Constant-factor decay with no directional intent
pub fn apply_friction(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &mut ctx.player;
    if player.is_dying || ctx.intent.direction() != 0.0 {
        return ControlFlow::Continue(());
    }
    let friction = &ctx.config.friction;
    player.vel.x *= friction.factor;
    if player.vel.x.abs() < friction.stop_threshold {
        player.vel.x = 0.0;
    }
    ControlFlow::Continue(())
}

/// Jump launch, variable-height gravity, and death fall
pub fn apply_gravity(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &mut ctx.player;
    let dt = ctx.dt;

    if player.is_dying {
        player.vel.x = 0.0;
        player.vel.y -= ctx.config.death.gravity * dt;
        return ControlFlow::Continue(());
    }

    let jump = &ctx.config.jump;
    if player.on_ground {
        player.is_jumping = false;
        if ctx.intent.jump {
            player.vel.y = if player.vel.x.abs() > jump.run_threshold {
                jump.run_velocity
            } else {
                jump.walk_velocity
            };
            player.is_jumping = true;
            player.on_ground = false;
        }
        return ControlFlow::Continue(());
    }

    let mut gravity = jump.gravity;
    if player.is_jumping && !ctx.intent.jump && player.vel.y > 0.0 {
        gravity *= jump.early_release_multiplier;
    }
    player.vel.y -= gravity * dt;
    ControlFlow::Continue(())
}

pub fn integrate(ctx: &mut FrameContext<'_>) -> StepResult {
    let dt = ctx.dt;
    ctx.player.pos += ctx.player.vel * dt;
    ControlFlow::Continue(())
}
