//! Win/loss evaluation, polled once per tick.
//!
//! Both outcomes are scheduled through the delayed action queue so in-flight
//! cues can finish; once one is pending, nothing else is scheduled.

use serde::{Deserialize, Serialize};

use crate::{
    DroidFilter, Effect, EffectEnvelope, MissionAction, MissionContent, MissionState, Outcome,
    Resolution, Stage, WorldView,
};

/// Inputs of one outcome evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCheck {
    pub hostile_units: u32,
    pub hostile_factories: u32,
    pub player_factories: u32,
    pub player_constructors: u32,
    pub artifacts: u32,
    pub stage: Stage,
}

impl OutcomeCheck {
    pub fn gather(state: &MissionState, world: &impl WorldView, content: &MissionContent) -> Self {
        let players = &content.players;
        let hostile_units = players
            .hostile
            .iter()
            .map(|&player| world.count_droids(player, DroidFilter::Any))
            .sum();
        let hostile_factories = players
            .hostile
            .iter()
            .flat_map(|&player| {
                content
                    .outcome
                    .hostile_factories
                    .iter()
                    .map(move |structure| (player, structure))
            })
            .map(|(player, structure)| world.count_structures(player, structure))
            .sum();
        let player_factories = content
            .outcome
            .player_factories
            .iter()
            .map(|structure| world.count_structures(players.human, structure))
            .sum();
        Self {
            hostile_units,
            hostile_factories,
            player_factories,
            player_constructors: world.count_droids(players.human, DroidFilter::Construct),
            artifacts: state.artifacts.count,
            stage: state.stage,
        }
    }

    /// No way left to rebuild: no construction droids and no factories.
    pub fn is_lost(&self) -> bool {
        self.player_constructors == 0 && self.player_factories == 0
    }

    /// Strict conjunction of hostiles gone, artifacts collected and stage reached.
    pub fn is_won(&self, content: &MissionContent) -> bool {
        self.hostile_units == 0
            && self.hostile_factories == 0
            && self.artifacts >= content.constants.required_artifacts
            && self.stage.value() >= content.constants.required_stage
    }
}

/// Decide the outcome for the current world, if any. Loss takes precedence.
pub fn evaluate(
    state: &MissionState,
    world: &impl WorldView,
    content: &MissionContent,
) -> Option<Outcome> {
    let check = OutcomeCheck::gather(state, world, content);
    if check.is_lost() {
        Some(Outcome::Lost)
    } else if check.is_won(content) {
        Some(Outcome::Won)
    } else {
        None
    }
}

/// Tick body: schedule a resolution the first time one is decided.
pub(crate) fn on_tick(state: &mut MissionState, world: &impl WorldView, content: &MissionContent) {
    if state.resolution != Resolution::Unresolved {
        return;
    }
    let Some(outcome) = evaluate(state, world, content) else {
        return;
    };
    let delay = match outcome {
        Outcome::Won => content.constants.win_delay_ms,
        Outcome::Lost => content.constants.loss_delay_ms,
    };
    schedule_resolution(state, outcome, delay);
}

/// Queue `outcome` unless a resolution is already pending or done.
pub(crate) fn schedule_resolution(state: &mut MissionState, outcome: Outcome, delay_ms: i64) -> bool {
    if state.resolution != Resolution::Unresolved {
        return false;
    }
    tracing::debug!(?outcome, delay_ms, "scheduling mission resolution");
    state.resolution = Resolution::Pending(outcome);
    state
        .queue
        .schedule(state.clock.now_ms, MissionAction::Resolve(outcome), delay_ms);
    true
}

/// Fired from the queue: hand the mission back to the level loader.
pub(crate) fn resolve(
    state: &mut MissionState,
    content: &MissionContent,
    outcome: Outcome,
    effects: &mut Vec<EffectEnvelope>,
) {
    if matches!(state.resolution, Resolution::Resolved(_)) {
        return;
    }
    state.resolution = Resolution::Resolved(outcome);
    let effect = match outcome {
        Outcome::Won => Effect::LoadLevel {
            level: content.outcome.next_level.clone(),
        },
        Outcome::Lost => Effect::GameOver { won: false },
    };
    tracing::debug!(?outcome, "mission resolved");
    effects.push(crate::emit(&mut state.counters, state.clock.now_ms, effect));
}
