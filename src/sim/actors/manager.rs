//! Active actor set
//!
//! Actors are kept in spawn (id) order. Spawning and pruning happen only
//! between passes, never while a collision pass is iterating.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{Actor, ActorId, ActorSpawn, Capabilities};
use crate::sim::effects::SideEffect;
use crate::sim::level::Level;
use crate::sim::score::ScoreKind;
use crate::tuning::ActorTuning;

/// What the actor update produced
#[derive(Debug, Default)]
pub struct ActorFrame {
    pub removed: Vec<ActorId>,
    pub effects: Vec<SideEffect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorManager {
    actors: Vec<Actor>,
    next_id: u32,
    tuning: ActorTuning,
}

impl ActorManager {
    pub fn new(tuning: ActorTuning) -> Self {
        Self {
            actors: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    pub fn tuning(&self) -> &ActorTuning {
        &self.tuning
    }

    pub fn spawn(&mut self, spawn: &ActorSpawn) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        self.actors.push(Actor::new(id, spawn, &self.tuning));
        log::debug!("spawned {:?} #{} at {:?}", spawn.kind, id.0, spawn.pos);
        id
    }

    pub fn remove(&mut self, id: ActorId) -> bool {
        let before = self.actors.len();
        self.actors.retain(|a| a.id != id);
        self.actors.len() != before
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn clear(&mut self) {
        self.actors.clear();
    }

    /// Step every actor, cull the dead and off-screen, then resolve
    /// actor-vs-actor contacts
    pub fn update(&mut self, level: &Level, camera_x: f32, dt: f32) -> ActorFrame {
        let mut frame = ActorFrame::default();
        let cull_left = camera_x - self.tuning.cull_margin;
        let cull_floor = self.tuning.cull_floor;

        for actor in self.actors.iter_mut() {
            let alive = actor.update(level, dt);
            let off_screen = actor.state.right() < cull_left || actor.state.pos.y < cull_floor;
            if !alive || off_screen {
                frame.removed.push(actor.id);
            }
        }
        if !frame.removed.is_empty() {
            self.actors.retain(|a| !frame.removed.contains(&a.id));
            log::trace!("culled actors {:?}", frame.removed);
        }

        frame.effects = self.resolve_actor_collisions();
        frame
    }

    /// Damage and blocking between actors.
    ///
    /// Source capabilities are captured before the pass, so two shells that
    /// meet knock each other out even though the first hit disarms the second.
    /// A source knocked out during the pass only hits back at its attacker.
    pub fn resolve_actor_collisions(&mut self) -> Vec<SideEffect> {
        let caps: Vec<Capabilities> = self.actors.iter().map(Actor::capabilities).collect();
        let mut knocked_by: Vec<Option<usize>> = vec![None; self.actors.len()];
        let mut effects = Vec::new();

        for i in 0..self.actors.len() {
            if !caps[i].intersects(Capabilities::CAN_DAMAGE | Capabilities::BLOCKS) {
                continue;
            }
            for j in 0..self.actors.len() {
                if i == j {
                    continue;
                }
                if self.actors[i].is_knocked_out() && knocked_by[i] != Some(j) {
                    continue;
                }
                let (source, target) = pair_mut(&mut self.actors, i, j);
                if target.is_knocked_out() || !source.state.overlaps(&target.state) {
                    continue;
                }
                if caps[i].contains(Capabilities::CAN_DAMAGE)
                    && target.capabilities().contains(Capabilities::CAN_BE_DAMAGED)
                {
                    target.knockout.trigger(
                        &mut target.state,
                        source.state.vel.x,
                        source.state.center_x(),
                    );
                    knocked_by[j] = Some(i);
                    effects.push(SideEffect::ActorScore {
                        kind: ScoreKind::ShellChain,
                        source: Some(source.id),
                        pos: target.state.pos + Vec2::new(0.0, target.state.height),
                    });
                    log::debug!("#{} knocked out #{}", source.id.0, target.id.0);
                } else if caps[i].contains(Capabilities::BLOCKS) && target.responds_to_blockers() {
                    target.bounce_off(&source.state);
                }
            }
        }
        effects
    }
}

/// Two distinct mutable elements
fn pair_mut(actors: &mut [Actor], i: usize, j: usize) -> (&mut Actor, &mut Actor) {
    if i < j {
        let (head, tail) = actors.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = actors.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}
