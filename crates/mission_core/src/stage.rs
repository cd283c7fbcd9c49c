//! Stage state machine: launch, per-base destruction and base reveals.
//!
//! Every transition is guarded by a flag on `MissionState` so duplicate or
//! out-of-order deliveries never move `stage` twice or repeat a message.
//! Base N's destruction always targets base N+1 for the follow-up reveal,
//! whatever the global stage happens to be.

use crate::{
    BaseIndex, Effect, EffectEnvelope, FeatureKind, LabelId, MessageKind, MissionAction,
    MissionContent, MissionState, Stage, WorldView,
};

impl Stage {
    pub const IDLE: Stage = Stage(0);
    pub const LAUNCHED: Stage = Stage(1);

    pub fn value(self) -> u8 {
        self.0
    }

    /// Number of bases destroyed so far.
    pub fn bases_destroyed(self) -> u8 {
        self.0.saturating_sub(1)
    }

    pub(crate) fn advance(&mut self) {
        self.0 = self.0.saturating_add(1);
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            0 => f.write_str("idle"),
            1 => f.write_str("launched"),
            n => write!(f, "{} bases destroyed", n - 1),
        }
    }
}

/// Launch the hostile attack. Fires at most once.
pub(crate) fn launch(
    state: &mut MissionState,
    world: &impl WorldView,
    content: &MissionContent,
    effects: &mut Vec<EffectEnvelope>,
) {
    if state.launched {
        return;
    }
    tracing::debug!("launching hostile attack");
    state.launched = true;
    state.stage.advance();

    let now = state.clock.now_ms;
    let player = content.players.human;
    let launch = &content.launch;
    let mut directives = vec![
        Effect::PlaySound {
            sound: launch.positioned_sound.clone(),
            position: Some(state.refs.launch_sound_position),
        },
        Effect::PlaySound {
            sound: launch.global_sound.clone(),
            position: None,
        },
        Effect::AddMessage {
            message: launch.mission_message.clone(),
            kind: MessageKind::Mission,
            player,
            immediate: true,
        },
        Effect::AddMessage {
            message: launch.objective_message.clone(),
            kind: MessageKind::Proximity,
            player,
            immediate: false,
        },
    ];

    // Hostiles waiting at the trigger go on the war path toward the player.
    for object in world.objects_in_area(&state.refs.launch_area) {
        if object.is_droid() && content.players.is_hostile(object.player) {
            tracing::debug!(droid = %object.id, name = %object.name, "sending droid to attack player");
            directives.push(Effect::OrderDroid {
                droid: object.id,
                order: crate::DroidOrder::Scout,
                target: state.refs.player_base,
            });
        }
    }
    for effect in directives {
        effects.push(crate::emit(&mut state.counters, now, effect));
    }

    state.queue.schedule(
        now,
        MissionAction::RemoveLaunchObjective,
        content.constants.launch_objective_lifetime_ms,
    );
    sync_highlights(state, content, effects);
}

pub(crate) fn remove_launch_objective(
    state: &mut MissionState,
    content: &MissionContent,
    effects: &mut Vec<EffectEnvelope>,
) {
    effects.push(crate::emit(
        &mut state.counters,
        state.clock.now_ms,
        Effect::RemoveMessage {
            message: content.launch.objective_message.clone(),
            kind: MessageKind::Proximity,
            player: content.players.human,
        },
    ));
}

/// Handle a hostile group reaching zero members.
pub(crate) fn base_destroyed(
    state: &mut MissionState,
    world: &impl WorldView,
    content: &MissionContent,
    base: BaseIndex,
    effects: &mut Vec<EffectEnvelope>,
) {
    let Some(status) = state.bases.get(base.0).copied() else {
        tracing::warn!(%base, "destroyed event for unknown base ignored");
        return;
    };
    if status.destroyed {
        tracing::debug!(%base, "duplicate destroyed event ignored");
        return;
    }
    // A base cannot fall before the attack was launched.
    if !state.launched {
        launch(state, world, content, effects);
    }
    tracing::debug!(%base, "hostile base eliminated");

    let now = state.clock.now_ms;
    let def = &content.bases[base.0];
    let refs = state.refs.bases[base.0].clone();
    let mut directives = Vec::new();

    if status.message_shown {
        directives.push(Effect::RemoveMessage {
            message: def.message.clone(),
            kind: MessageKind::Proximity,
            player: content.players.human,
        });
    }
    directives.push(Effect::PlaySound {
        sound: def.destroyed_sound.clone(),
        position: Some(refs.sound_position),
    });
    // Nuke leftovers such as walls, with the special removal effect.
    for object in world.objects_in_area(&refs.area) {
        let hostile_structure = object.is_structure() && content.players.is_hostile(object.player);
        if hostile_structure || object.feature_kind() == Some(FeatureKind::Building) {
            directives.push(Effect::RemoveObject {
                object: object.id,
                special_effect: true,
            });
        }
    }
    for effect in directives {
        effects.push(crate::emit(&mut state.counters, now, effect));
    }

    let status = &mut state.bases[base.0];
    status.destroyed = true;
    status.message_shown = false;
    // Found by force; no message for a base that is already gone.
    status.revealed = true;

    let next = base.next();
    if next.0 < state.bases.len() {
        request_reveal(state, next, content.constants.reveal_next_base_delay_ms);
    }
    state.stage.advance();
    sync_highlights(state, content, effects);
}

/// Queue a reveal of `base` unless it is already revealed, pending or gone.
pub(crate) fn request_reveal(state: &mut MissionState, base: BaseIndex, delay_ms: i64) -> bool {
    let now = state.clock.now_ms;
    let Some(status) = state.bases.get_mut(base.0) else {
        return false;
    };
    if status.revealed || status.reveal_pending || status.destroyed {
        return false;
    }
    status.reveal_pending = true;
    state
        .queue
        .schedule(now, MissionAction::RevealBase(base), delay_ms);
    true
}

/// Fired from the queue: show the base's proximity message and cue.
pub(crate) fn reveal_base(
    state: &mut MissionState,
    content: &MissionContent,
    base: BaseIndex,
    effects: &mut Vec<EffectEnvelope>,
) {
    let Some(status) = state.bases.get_mut(base.0) else {
        tracing::warn!(%base, "reveal for unknown base ignored");
        return;
    };
    status.reveal_pending = false;
    // Extra safety: adding the same message twice breaks the message list.
    if status.revealed || status.destroyed {
        return;
    }
    status.revealed = true;
    status.message_shown = true;
    tracing::debug!(%base, "revealing base");

    let now = state.clock.now_ms;
    let def = &content.bases[base.0];
    effects.push(crate::emit(
        &mut state.counters,
        now,
        Effect::AddMessage {
            message: def.message.clone(),
            kind: MessageKind::Proximity,
            player: content.players.human,
            immediate: false,
        },
    ));
    if let Some(sound) = &def.reveal_sound {
        effects.push(crate::emit(
            &mut state.counters,
            now,
            Effect::PlaySound {
                sound: sound.clone(),
                position: Some(state.refs.bases[base.0].sound_position),
            },
        ));
    }
    sync_highlights(state, content, effects);
}

/// Trigger areas worth highlighting at the current stage.
fn trigger_areas(state: &MissionState, content: &MissionContent) -> Vec<LabelId> {
    if !state.cheat_mode {
        return Vec::new();
    }
    let mut areas = Vec::new();
    if !state.launched {
        areas.push(content.launch.area.clone());
    }
    areas.extend(
        content
            .bases
            .iter()
            .zip(&state.bases)
            .filter(|(_, status)| status.revealed && !status.destroyed)
            .map(|(def, _)| def.area.clone()),
    );
    areas
}

/// Bring the debug overlay in line with the current stage and cheat flag.
pub(crate) fn sync_highlights(
    state: &mut MissionState,
    content: &MissionContent,
    effects: &mut Vec<EffectEnvelope>,
) {
    let wanted = trigger_areas(state, content);
    let now = state.clock.now_ms;
    let stale: Vec<LabelId> = state
        .highlighted
        .iter()
        .filter(|label| !wanted.contains(label))
        .cloned()
        .collect();
    let fresh: Vec<LabelId> = wanted
        .iter()
        .filter(|label| !state.highlighted.contains(label))
        .cloned()
        .collect();
    for label in stale {
        effects.push(crate::emit(&mut state.counters, now, Effect::UnmarkArea { label }));
    }
    for label in fresh {
        effects.push(crate::emit(&mut state.counters, now, Effect::MarkArea { label }));
    }
    state.highlighted = wanted;
}
