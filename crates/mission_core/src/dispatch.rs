use crate::collectibles::{grant_remaining, pickup};
use crate::outcome::schedule_resolution;
use crate::stage::{base_destroyed, launch, request_reveal, sync_highlights};
use crate::{
    BaseIndex, Effect, EffectEnvelope, GroupId, LabelId, MissionContent, MissionState, ObjectRef,
    Outcome, PlayerId, Resolution, WorldView, WorldEvent,
};

/// Chat commands understood while cheat mode is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheatCommand {
    LetMeWin,
    Status,
    Unhandled(String),
}

impl CheatCommand {
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "let me win" => CheatCommand::LetMeWin,
            "status" => CheatCommand::Status,
            other => CheatCommand::Unhandled(other.to_string()),
        }
    }
}

/// Apply one world event to the mission.
///
/// Handlers run to completion; anything deferred goes through the delayed
/// action queue and fires on a later `advance`. Events arriving after the
/// mission resolved are ignored.
pub fn handle_event(
    state: &mut MissionState,
    world: &impl WorldView,
    content: &MissionContent,
    event: WorldEvent,
) -> Vec<EffectEnvelope> {
    let mut effects = Vec::new();
    if matches!(state.resolution, Resolution::Resolved(_)) {
        tracing::debug!(?event, "event after resolution ignored");
        return effects;
    }

    match event {
        WorldEvent::AreaEntered { droid, area } => {
            on_area_entered(state, world, content, &droid, &area, &mut effects);
        }
        WorldEvent::GroupSizeChanged { group, new_size } => {
            on_group_size_changed(state, world, content, group, new_size, &mut effects);
        }
        WorldEvent::ObjectSeen { viewer, seen } => {
            on_object_seen(state, content, &viewer, &seen);
        }
        WorldEvent::ObjectAttacked { victim, attacker } => {
            on_object_attacked(state, content, &victim, attacker.as_ref(), &mut effects);
        }
        WorldEvent::ItemPickedUp { feature, droid } => {
            tracing::debug!(feature = %feature.id, droid = %droid.id, "item picked up");
            pickup(state, content, &feature, &mut effects);
        }
        WorldEvent::ChatReceived { from, to, text } => {
            on_chat(state, world, content, from, to, &text, &mut effects);
        }
        WorldEvent::CheatModeToggled { enabled } => {
            tracing::debug!(enabled, "cheat mode toggled");
            state.cheat_mode = enabled;
            sync_highlights(state, content, &mut effects);
        }
        WorldEvent::StructureCompleted { structure } => {
            on_structure_completed(state, world, content, &structure, &mut effects);
        }
    }
    effects
}

fn on_area_entered(
    state: &mut MissionState,
    world: &impl WorldView,
    content: &MissionContent,
    droid: &ObjectRef,
    area: &LabelId,
    effects: &mut Vec<EffectEnvelope>,
) {
    if *area != content.launch.area {
        return;
    }
    if !droid.is_droid() || droid.player != content.players.human {
        return;
    }
    launch(state, world, content, effects);
}

fn on_group_size_changed(
    state: &mut MissionState,
    world: &impl WorldView,
    content: &MissionContent,
    group: GroupId,
    new_size: u32,
    effects: &mut Vec<EffectEnvelope>,
) {
    let Some(index) = state.refs.bases.iter().position(|base| base.group == group) else {
        return;
    };
    let base = BaseIndex(index);
    if new_size > 0 {
        tracing::debug!(%base, new_size, "hostile group shrank");
        return;
    }
    base_destroyed(state, world, content, base, effects);
}

fn on_object_seen(
    state: &mut MissionState,
    content: &MissionContent,
    viewer: &ObjectRef,
    seen: &ObjectRef,
) {
    if viewer.player != content.players.human {
        return;
    }
    let Some(index) = state.refs.bases.iter().position(|base| base.scout == seen.id) else {
        return;
    };
    let base = BaseIndex(index);
    if request_reveal(state, base, content.bases[index].sighting_delay_ms) {
        tracing::debug!(%base, viewer = %viewer.id, "scout point sighted");
    }
}

fn on_object_attacked(
    state: &mut MissionState,
    content: &MissionContent,
    victim: &ObjectRef,
    attacker: Option<&ObjectRef>,
    effects: &mut Vec<EffectEnvelope>,
) {
    if victim.player != content.players.human {
        return;
    }
    let now = state.clock.now_ms;
    let cooled_down = state
        .last_attack_alert_ms
        .map_or(true, |last| now > last + content.constants.attack_alert_cooldown_ms);
    if !cooled_down {
        return;
    }
    let sound = if victim.is_structure() {
        content.alerts.structure_sound.clone()
    } else {
        content.alerts.unit_sound.clone()
    };
    tracing::debug!(
        victim = %victim.id,
        attacker = ?attacker.map(|a| a.id),
        "player under attack"
    );
    state.last_attack_alert_ms = Some(now);
    effects.push(crate::emit(
        &mut state.counters,
        now,
        Effect::PlaySound {
            sound,
            position: Some(victim.position),
        },
    ));
}

fn on_chat(
    state: &mut MissionState,
    world: &impl WorldView,
    content: &MissionContent,
    from: PlayerId,
    to: PlayerId,
    text: &str,
    effects: &mut Vec<EffectEnvelope>,
) {
    if !state.cheat_mode {
        return;
    }
    match CheatCommand::parse(text) {
        CheatCommand::LetMeWin => {
            if state.resolution != Resolution::Unresolved {
                tracing::debug!(resolution = ?state.resolution, "let me win ignored");
                return;
            }
            tracing::debug!("let me win");
            grant_remaining(state, world, content, effects);
            schedule_resolution(state, Outcome::Won, 0);
        }
        CheatCommand::Status => {
            let text = status_report(state);
            effects.push(crate::emit(
                &mut state.counters,
                state.clock.now_ms,
                Effect::DebugPrint { text },
            ));
        }
        CheatCommand::Unhandled(text) => {
            tracing::debug!(%from, %to, %text, "unhandled cheat command");
        }
    }
}

fn status_report(state: &MissionState) -> String {
    let bases: Vec<String> = state
        .bases
        .iter()
        .enumerate()
        .map(|(i, base)| {
            let flag = if base.destroyed {
                "destroyed"
            } else if base.revealed {
                "revealed"
            } else if base.reveal_pending {
                "pending"
            } else {
                "hidden"
            };
            format!("{}={flag}", BaseIndex(i))
        })
        .collect();
    format!(
        "stage: {} ({}), artifacts: {}/{}, bases: [{}], pending actions: {}",
        state.stage.value(),
        state.stage,
        state.artifacts.count,
        state.artifacts.collected.len(),
        bases.join(", "),
        state.queue.len(),
    )
}

fn on_structure_completed(
    state: &mut MissionState,
    world: &impl WorldView,
    content: &MissionContent,
    structure: &ObjectRef,
    effects: &mut Vec<EffectEnvelope>,
) {
    let Some(timer) = &content.timer else {
        return;
    };
    if state.timer_started || structure.player != content.players.human {
        return;
    }
    let human = content.players.human;
    let has_power = world.count_structures(human, &timer.power_generator) > 0;
    let has_extractor = world.count_structures(human, &timer.resource_extractor) > 0;
    if !(has_power && has_extractor) {
        return;
    }
    tracing::debug!(limit_secs = timer.limit_secs, "starting mission timer");
    state.timer_started = true;
    effects.push(crate::emit(
        &mut state.counters,
        state.clock.now_ms,
        Effect::SetMissionTimer {
            secs: Some(timer.limit_secs),
        },
    ));
}
