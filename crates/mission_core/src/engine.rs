use crate::queue::ScheduledAction;
use crate::{
    outcome, stage, EffectEnvelope, MissionAction, MissionContent, MissionState, Resolution,
    WorldView,
};

/// Move the mission clock forward to `now_ms`.
///
/// Order of operations, repeated until caught up:
/// 1. Fire the earliest due action if it is due no later than the next tick.
/// 2. Otherwise run the tick (outcome evaluation) if its boundary is reached.
///
/// Actions due in the same instant as a tick fire first. Ticks are never
/// skipped. Once the mission is resolved nothing further happens.
///
/// Returns all effects produced while catching up.
pub fn advance(
    state: &mut MissionState,
    world: &impl WorldView,
    content: &MissionContent,
    now_ms: u64,
) -> Vec<EffectEnvelope> {
    let mut effects = Vec::new();
    if is_resolved(state) {
        return effects;
    }
    if now_ms < state.clock.now_ms {
        tracing::warn!(
            now_ms,
            clock_ms = state.clock.now_ms,
            "mission clock cannot run backwards; advance ignored"
        );
        return effects;
    }

    while !is_resolved(state) {
        let next_tick = state.clock.next_tick_ms;
        let action_due = state
            .queue
            .next_due()
            .filter(|&due| due <= next_tick && due <= now_ms);
        if let Some(due) = action_due {
            state.clock.now_ms = state.clock.now_ms.max(due);
            if let Some(scheduled) = state.queue.pop_due(state.clock.now_ms) {
                fire(state, content, scheduled, &mut effects);
            }
        } else if next_tick <= now_ms {
            state.clock.now_ms = next_tick;
            run_tick(state, world, content);
        } else {
            break;
        }
    }

    if !is_resolved(state) {
        state.clock.now_ms = now_ms;
    }
    effects
}

fn is_resolved(state: &MissionState) -> bool {
    matches!(state.resolution, Resolution::Resolved(_))
}

fn run_tick(state: &mut MissionState, world: &impl WorldView, content: &MissionContent) {
    state.clock.ticks += 1;
    state.clock.next_tick_ms += content.constants.tick_interval_ms;
    outcome::on_tick(state, world, content);
}

fn fire(
    state: &mut MissionState,
    content: &MissionContent,
    scheduled: ScheduledAction,
    effects: &mut Vec<EffectEnvelope>,
) {
    tracing::debug!(
        id = scheduled.id,
        due_ms = scheduled.due_ms,
        action = ?scheduled.action,
        "firing delayed action"
    );
    match scheduled.action {
        MissionAction::RemoveLaunchObjective => {
            stage::remove_launch_objective(state, content, effects);
        }
        MissionAction::RevealBase(base) => stage::reveal_base(state, content, base, effects),
        MissionAction::Resolve(result) => outcome::resolve(state, content, result, effects),
    }
}
