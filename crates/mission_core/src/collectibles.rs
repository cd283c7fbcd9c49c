//! Artifact provisioning, pickup accounting and tech unlocks.

use crate::{
    ArtifactProvisioning, Effect, EffectEnvelope, FeatureKind, LabelId, LabelTarget,
    MissionContent, MissionState, ObjectRef, WorldView,
};

/// Label carried by the artifact with zero-based `ordinal`.
pub(crate) fn spawn_label(content: &MissionContent, ordinal: usize) -> LabelId {
    let label = &content.artifacts.label;
    match content.artifacts.provisioning {
        ArtifactProvisioning::Progressive => label.clone(),
        ArtifactProvisioning::PrePlaced => LabelId(format!("{label}{}", ordinal + 1)),
    }
}

fn spawn(
    state: &mut MissionState,
    content: &MissionContent,
    ordinal: usize,
    effects: &mut Vec<EffectEnvelope>,
) {
    let effect = Effect::SpawnFeature {
        feature_type: content.artifacts.feature_type.clone(),
        position: state.refs.artifact_spawns[ordinal],
        label: spawn_label(content, ordinal),
    };
    effects.push(crate::emit(&mut state.counters, state.clock.now_ms, effect));
}

pub(crate) fn spawn_initial_artifacts(
    state: &mut MissionState,
    content: &MissionContent,
    effects: &mut Vec<EffectEnvelope>,
) {
    match content.artifacts.provisioning {
        ArtifactProvisioning::Progressive => {
            if !content.artifacts.items.is_empty() {
                spawn(state, content, 0, effects);
            }
        }
        ArtifactProvisioning::PrePlaced => {
            for ordinal in 0..content.artifacts.items.len() {
                spawn(state, content, ordinal, effects);
            }
        }
    }
}

fn next_uncollected(state: &MissionState) -> Option<usize> {
    state.artifacts.collected.iter().position(|done| !done)
}

/// Work out which artifact a picked-up feature was: by its label when it
/// carries a per-ordinal one, otherwise by pickup sequence.
fn identify(state: &MissionState, content: &MissionContent, feature: &ObjectRef) -> Option<usize> {
    if content.artifacts.provisioning == ArtifactProvisioning::PrePlaced {
        if let Some(label) = &feature.label {
            let by_label = (0..content.artifacts.items.len())
                .find(|&ordinal| spawn_label(content, ordinal) == *label);
            if let Some(ordinal) = by_label {
                return (!state.artifacts.collected[ordinal]).then_some(ordinal);
            }
        }
    }
    next_uncollected(state)
}

/// Handle a droid picking up a feature.
pub(crate) fn pickup(
    state: &mut MissionState,
    content: &MissionContent,
    feature: &ObjectRef,
    effects: &mut Vec<EffectEnvelope>,
) {
    if feature.feature_kind() != Some(FeatureKind::Artifact) {
        return;
    }
    if !state.artifacts.picked_objects.insert(feature.id) {
        tracing::debug!(feature = %feature.id, "duplicate pickup ignored");
        return;
    }

    let now = state.clock.now_ms;
    effects.push(crate::emit(
        &mut state.counters,
        now,
        Effect::PlaySound {
            sound: content.artifacts.pickup_sound.clone(),
            position: Some(feature.position),
        },
    ));
    // Artifacts are not self-removing.
    effects.push(crate::emit(
        &mut state.counters,
        now,
        Effect::RemoveObject {
            object: feature.id,
            special_effect: false,
        },
    ));

    let Some(ordinal) = identify(state, content, feature) else {
        tracing::warn!(
            feature = %feature.id,
            label = ?feature.label,
            "pickup of unrecognised artifact ignored"
        );
        return;
    };

    state.artifacts.collected[ordinal] = true;
    state.artifacts.count += 1;
    tracing::debug!(ordinal = ordinal + 1, count = state.artifacts.count, "artifact collected");
    effects.push(crate::emit(
        &mut state.counters,
        now,
        Effect::EnableResearch {
            tech: content.artifacts.items[ordinal].tech.clone(),
            player: content.players.human,
        },
    ));

    if content.artifacts.provisioning == ArtifactProvisioning::Progressive {
        if let Some(next) = next_uncollected(state) {
            spawn(state, content, next, effects);
        }
    }
}

/// Cheat path: unlock every artifact tech not yet collected and clear the
/// artifacts still lying on the map. Granted items are marked collected so a
/// late pickup cannot unlock them again; the count itself is left alone.
pub(crate) fn grant_remaining(
    state: &mut MissionState,
    world: &impl WorldView,
    content: &MissionContent,
    effects: &mut Vec<EffectEnvelope>,
) {
    let now = state.clock.now_ms;
    let remaining: Vec<usize> = (0..content.artifacts.items.len())
        .filter(|&ordinal| !state.artifacts.collected[ordinal])
        .collect();

    let mut labels: Vec<LabelId> = Vec::new();
    for &ordinal in &remaining {
        state.artifacts.collected[ordinal] = true;
        effects.push(crate::emit(
            &mut state.counters,
            now,
            Effect::EnableResearch {
                tech: content.artifacts.items[ordinal].tech.clone(),
                player: content.players.human,
            },
        ));
        let label = spawn_label(content, ordinal);
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    for label in labels {
        if let Some(LabelTarget::Object { object, .. }) = world.resolve_label(&label) {
            effects.push(crate::emit(
                &mut state.counters,
                now,
                Effect::RemoveObject {
                    object,
                    special_effect: false,
                },
            ));
        }
    }
}
