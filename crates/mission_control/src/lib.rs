//! Players and a sandbox host for driving a mission end to end.
//!
//! [`SandboxWorld`] stands in for the game: it answers the engine's world
//! queries and applies its effects. An [`EventSource`] decides what the
//! player does each step, and [`Session`] wires the three together.

mod sandbox;
mod session;

pub use sandbox::{PlayerAction, SandboxWorld};
pub use session::{RunReport, Session};

use mission_core::{LabelId, MissionContent, MissionState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub trait EventSource {
    fn next_actions(
        &mut self,
        now_ms: u64,
        state: &MissionState,
        content: &MissionContent,
        world: &SandboxWorld,
    ) -> Vec<PlayerAction>;
}

// ---------------------------------------------------------------------------
// Scripted player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: PlayerAction,
}

/// Replays a fixed list of timed actions.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    steps: Vec<ScriptStep>,
    cursor: usize,
}

#[derive(Deserialize)]
struct ScriptFile {
    steps: Vec<ScriptStep>,
}

impl ScriptedPlayer {
    /// Steps sharing a timestamp keep their listed order.
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by_key(|s| s.at_ms);
        Self { steps, cursor: 0 }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let file: ScriptFile = serde_json::from_str(text)?;
        Ok(Self::new(file.steps))
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }
}

impl EventSource for ScriptedPlayer {
    fn next_actions(
        &mut self,
        now_ms: u64,
        _state: &MissionState,
        _content: &MissionContent,
        _world: &SandboxWorld,
    ) -> Vec<PlayerAction> {
        let mut actions = Vec::new();
        while let Some(step) = self.steps.get(self.cursor) {
            if step.at_ms > now_ms {
                break;
            }
            actions.push(step.action.clone());
            self.cursor += 1;
        }
        actions
    }
}

// ---------------------------------------------------------------------------
// Skirmish player
// ---------------------------------------------------------------------------

/// Plays the mission with a seeded random policy:
/// 1. Trigger the scavenger launch before anything else.
/// 2. Pick up the artifact on the map.
/// 3. Destroy the lowest revealed base, now and then one out of order.
/// 4. Scout the next unrevealed base.
/// 5. Hunt down stragglers once every base is gone.
///
/// Hostile fire on the player's units and structures is sprinkled in.
pub struct SkirmishPlayer {
    rng: ChaCha8Rng,
}

const ATTACK_CHANCE: f64 = 0.15;
const PICKUP_CHANCE: f64 = 0.6;
const DESTROY_CHANCE: f64 = 0.5;
const SCOUT_CHANCE: f64 = 0.7;
const OUT_OF_ORDER_CHANCE: f64 = 0.05;

impl SkirmishPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn base_action(
        &mut self,
        state: &MissionState,
        content: &MissionContent,
    ) -> Option<PlayerAction> {
        let standing: Vec<usize> = (0..content.bases.len())
            .filter(|&i| !state.bases[i].destroyed)
            .collect();
        let &lowest = standing.first()?;

        if self.rng.gen_bool(OUT_OF_ORDER_CHANCE) {
            let pick = standing[self.rng.gen_range(0..standing.len())];
            return Some(destroy(&content.bases[pick].group));
        }
        let status = state.bases[lowest];
        if status.revealed {
            return self
                .rng
                .gen_bool(DESTROY_CHANCE)
                .then(|| destroy(&content.bases[lowest].group));
        }
        if status.reveal_pending {
            return None;
        }
        self.rng
            .gen_bool(SCOUT_CHANCE)
            .then(|| PlayerAction::SightScout {
                scout: content.bases[lowest].scout.clone(),
            })
    }
}

fn destroy(group: &LabelId) -> PlayerAction {
    PlayerAction::DestroyGroup {
        group: group.clone(),
    }
}

impl EventSource for SkirmishPlayer {
    fn next_actions(
        &mut self,
        _now_ms: u64,
        state: &MissionState,
        content: &MissionContent,
        world: &SandboxWorld,
    ) -> Vec<PlayerAction> {
        let mut actions = Vec::new();
        if world.ended.is_some() {
            return actions;
        }
        if self.rng.gen_bool(ATTACK_CHANCE) {
            actions.push(PlayerAction::Attack {
                structure: self.rng.gen_bool(0.5),
            });
        }
        if !state.launched {
            actions.push(PlayerAction::EnterArea {
                area: content.launch.area.clone(),
            });
            return actions;
        }
        if world.artifact_on_map().is_some() && self.rng.gen_bool(PICKUP_CHANCE) {
            actions.push(PlayerAction::PickUpArtifact);
        }
        match self.base_action(state, content) {
            Some(action) => actions.push(action),
            None if state.bases.iter().all(|b| b.destroyed) => {
                actions.push(PlayerAction::ClearStragglers);
            }
            None => {}
        }
        actions
    }
}
