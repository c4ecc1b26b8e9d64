//! Boundary, tile, and goal resolution for the player box
//!
//! Every solidity test goes through [`solid_quadrant_at`] or [`find_ground`].
//! All of these steps are skipped while dying so the player falls through
//! everything.

use std::ops::ControlFlow;

use glam::Vec2;

use crate::consts::TILE_SIZE;
use crate::sim::effects::{EffectRequest, SideEffect};
use crate::sim::pipeline::{FrameContext, StepResult};
use crate::sim::probe::{QuadrantBox, find_ground, solid_quadrant_at};
use crate::sim::state::PlayerState;
use crate::sim::terrain::TileChange;
use crate::sim::tiles::EMPTY_SLUG;
use crate::tuning::CollisionTuning;
use crate::{tile_coord, tile_origin};

/// Camera ratchet on the left, level edge on the right
pub fn clamp_to_boundaries(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &mut ctx.player;
    if player.is_dying {
        return ControlFlow::Continue(());
    }
    let left = ctx.camera.x;
    let right = ctx.level.width_px() - player.width;
    if player.pos.x < left {
        player.pos.x = left;
        player.vel.x = player.vel.x.max(0.0);
    }
    if player.pos.x > right {
        player.pos.x = right;
        player.vel.x = player.vel.x.min(0.0);
    }
    ControlFlow::Continue(())
}

/// Near-feet, mid, and near-head sample heights for the wall probes
fn wall_sample_heights(player: &PlayerState, tuning: &CollisionTuning) -> [f32; 3] {
    [
        player.pos.y + tuning.wall_foot_dead_zone,
        player.pos.y + player.height / 2.0,
        player.top() - tuning.wall_head_offset,
    ]
}

fn first_wall_hit(ctx: &FrameContext<'_>, x: f32) -> Option<QuadrantBox> {
    wall_sample_heights(&ctx.player, &ctx.config.collision)
        .into_iter()
        .find_map(|y| solid_quadrant_at(ctx.level, x, y))
}

pub fn left_wall(ctx: &mut FrameContext<'_>) -> StepResult {
    if ctx.player.is_dying || ctx.player.vel.x >= 0.0 {
        return ControlFlow::Continue(());
    }
    if let Some(quad) = first_wall_hit(ctx, ctx.player.pos.x) {
        ctx.player.pos.x = quad.right;
        ctx.player.vel.x = 0.0;
    }
    ControlFlow::Continue(())
}

pub fn right_wall(ctx: &mut FrameContext<'_>) -> StepResult {
    if ctx.player.is_dying || ctx.player.vel.x <= 0.0 {
        return ControlFlow::Continue(());
    }
    if let Some(quad) = first_wall_hit(ctx, ctx.player.right()) {
        ctx.player.pos.x = quad.left - ctx.player.width;
        ctx.player.vel.x = 0.0;
    }
    ControlFlow::Continue(())
}

/// Head bump while rising. The struck tile is recorded for hit-from-below
/// dispatch when the frame commits.
pub fn ceiling(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &ctx.player;
    if player.is_dying || player.vel.y <= 0.0 {
        return ControlFlow::Continue(());
    }
    let tuning = &ctx.config.collision;
    let head_y = player.top() - tuning.ceiling_penetration;
    let samples = [
        player.center_x(),
        player.pos.x + tuning.ceiling_edge_inset,
        player.right() - tuning.ceiling_edge_inset,
    ];
    let Some(quad) = samples
        .into_iter()
        .find_map(|x| solid_quadrant_at(ctx.level, x, head_y))
    else {
        return ControlFlow::Continue(());
    };

    ctx.player.pos.y = quad.bottom - ctx.player.height;
    ctx.player.vel.y = 0.0;
    if let Some(key) = ctx.level.key_at(quad.column, quad.row) {
        ctx.tile_hits.push(key);
    }
    ControlFlow::Continue(())
}

/// Snap to the highest surface under the feet unless rising
pub fn ground(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &mut ctx.player;
    if player.is_dying {
        return ControlFlow::Continue(());
    }
    let surface = find_ground(
        ctx.level,
        player.pos.x,
        player.pos.y,
        player.width,
        ctx.config.collision.ground_tolerance,
    );
    match surface {
        Some(y) if player.vel.y <= 0.0 => {
            player.pos.y = y;
            player.vel.y = 0.0;
            player.on_ground = true;
        }
        _ => player.on_ground = false,
    }
    ControlFlow::Continue(())
}

/// Keep the player from walking through the goal column
pub fn goal_clamp(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &mut ctx.player;
    if player.is_dying {
        return ControlFlow::Continue(());
    }
    let Some(goal) = ctx.level.goal() else {
        return ControlFlow::Continue(());
    };
    if ctx.level.screen_at(player.center_x()) != goal.screen {
        return ControlFlow::Continue(());
    }
    let clamp_x = goal.center_x() - player.width;
    if player.pos.x > clamp_x {
        player.pos.x = clamp_x;
        player.vel.x = player.vel.x.min(0.0);
    }
    ControlFlow::Continue(())
}

/// Pick up every collectable tile the box overlaps
pub fn collectables(ctx: &mut FrameContext<'_>) -> StepResult {
    let player = &ctx.player;
    if player.is_dying {
        return ControlFlow::Continue(());
    }
    let columns = tile_coord(player.pos.x)..=tile_coord(player.right() - 1.0);
    let rows = tile_coord(player.pos.y)..=tile_coord(player.top() - 1.0);

    for row in rows {
        for column in columns.clone() {
            if !ctx.level.tile_at(column, row).is_collectable() {
                continue;
            }
            let Some(key) = ctx.level.key_at(column, row) else {
                continue;
            };
            ctx.effects.push(SideEffect::ChangeTile(TileChange {
                key,
                slug: EMPTY_SLUG.to_string(),
                behavior: None,
            }));
            ctx.effects.push(SideEffect::CollectCoins(1));
            ctx.effects
                .push(SideEffect::SpawnEffect(EffectRequest::CoinSparkle {
                    pos: Vec2::new(tile_origin(column), tile_origin(row) + TILE_SIZE),
                }));
        }
    }
    ControlFlow::Continue(())
}
