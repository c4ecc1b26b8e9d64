//! Combo score tracking
//!
//! Stomps share one global chain; each shell keeps its own chain keyed by
//! actor id. Entries are dropped explicitly when the actor is destroyed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::actors::ActorId;

/// Points for consecutive stomps without landing
pub const STOMP_LADDER: [u32; 10] = [100, 200, 400, 500, 800, 1000, 2000, 4000, 5000, 8000];
/// Points for consecutive knockouts by a single shell
pub const SHELL_LADDER: [u32; 7] = [500, 800, 1000, 2000, 4000, 5000, 8000];
/// Flat points for kicking a shell
pub const SHELL_KICK_SCORE: u32 = 400;

/// How a score was earned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreKind {
    Stomp,
    ShellKick,
    ShellChain,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreTracker {
    stomp_index: usize,
    shell_chains: BTreeMap<ActorId, usize>,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Award points for `kind`, advancing the relevant chain
    pub fn award(&mut self, kind: ScoreKind, source: Option<ActorId>) -> u32 {
        match kind {
            ScoreKind::Stomp => advance(&STOMP_LADDER, &mut self.stomp_index),
            ScoreKind::ShellKick => {
                // A fresh kick starts that shell's chain over
                if let Some(id) = source {
                    self.shell_chains.remove(&id);
                }
                SHELL_KICK_SCORE
            }
            ScoreKind::ShellChain => match source {
                Some(id) => advance(&SHELL_LADDER, self.shell_chains.entry(id).or_insert(0)),
                None => SHELL_LADDER[0],
            },
        }
    }

    /// Landing breaks the stomp chain
    pub fn reset_stomp_chain(&mut self) {
        self.stomp_index = 0;
    }

    /// Drop an actor's chain when it is destroyed
    pub fn forget(&mut self, id: ActorId) {
        self.shell_chains.remove(&id);
    }

    pub fn stomp_index(&self) -> usize {
        self.stomp_index
    }

    pub fn tracked_shells(&self) -> usize {
        self.shell_chains.len()
    }

    pub fn reset(&mut self) {
        self.stomp_index = 0;
        self.shell_chains.clear();
    }
}

/// Return the ladder value at `index` and step it, saturating at the top
fn advance(ladder: &[u32], index: &mut usize) -> u32 {
    let last = ladder.len() - 1;
    let value = ladder[(*index).min(last)];
    *index = (*index + 1).min(last);
    value
}
