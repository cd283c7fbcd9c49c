use crate::collectibles::spawn_initial_artifacts;
use crate::queue::DelayedActionQueue;
use crate::{
    Area, ArtifactState, BaseRefs, BaseStatus, ClockState, Counters, Effect, EffectEnvelope,
    GroupId, LabelId, LabelTarget, MessageKind, MetaState, MissionContent, MissionState,
    ObjectId, Position, ResolvedRefs, Resolution, SetupError, Stage, WorldView,
};

const SCHEMA_VERSION: u32 = 1;

/// Initialize a mission at `now_ms`.
///
/// Resolves every label the mission will ever need, builds the initial
/// `MissionState` and returns the setup effects (camera, limits, starting
/// research, briefing, first artifacts). The first outcome tick is one
/// tick interval after `now_ms`.
pub fn start_mission(
    world: &impl WorldView,
    content: &MissionContent,
    now_ms: u64,
) -> Result<(MissionState, Vec<EffectEnvelope>), SetupError> {
    check_content(content)?;
    let refs = resolve_refs(world, content)?;

    let mut state = MissionState {
        meta: MetaState {
            mission: content.mission.clone(),
            content_version: content.content_version.clone(),
            schema_version: SCHEMA_VERSION,
        },
        clock: ClockState {
            now_ms,
            next_tick_ms: now_ms + content.constants.tick_interval_ms,
            ticks: 0,
        },
        stage: Stage::IDLE,
        launched: false,
        bases: vec![BaseStatus::default(); content.bases.len()],
        artifacts: ArtifactState {
            collected: vec![false; content.artifacts.items.len()],
            ..ArtifactState::default()
        },
        last_attack_alert_ms: None,
        cheat_mode: false,
        highlighted: Vec::new(),
        timer_started: false,
        resolution: Resolution::Unresolved,
        queue: DelayedActionQueue::new(),
        refs,
        counters: Counters::default(),
    };

    let mut effects = Vec::new();
    emit_setup_effects(&mut state, content, &mut effects);
    spawn_initial_artifacts(&mut state, content, &mut effects);

    tracing::debug!(
        mission = %content.mission,
        bases = content.bases.len(),
        artifacts = content.artifacts.items.len(),
        "mission initialized"
    );
    Ok((state, effects))
}

fn check_content(content: &MissionContent) -> Result<(), SetupError> {
    let invalid = |reason: String| Err(SetupError::InvalidContent { reason });
    if content.constants.tick_interval_ms == 0 {
        return invalid("tick_interval_ms must be > 0".to_string());
    }
    if content.bases.is_empty() {
        return invalid("mission defines no hostile bases".to_string());
    }
    let artifacts = content.artifacts.items.len();
    if usize::try_from(content.constants.required_artifacts).map_or(true, |n| n > artifacts) {
        return invalid(format!(
            "required_artifacts {} exceeds the {artifacts} artifacts defined",
            content.constants.required_artifacts
        ));
    }
    Ok(())
}

fn resolve_refs(
    world: &impl WorldView,
    content: &MissionContent,
) -> Result<ResolvedRefs, SetupError> {
    let labels = &content.labels;
    let bases = content
        .bases
        .iter()
        .map(|base| {
            let context = format!("base '{}'", base.name);
            Ok(BaseRefs {
                group: group_of(world, &base.group, &context)?,
                scout: object_of(world, &base.scout, &context)?,
                area: area_of(world, &base.area, &context)?,
                sound_position: position_of(world, &base.sound_position, &context)?,
            })
        })
        .collect::<Result<Vec<_>, SetupError>>()?;
    let artifact_spawns = content
        .artifacts
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| position_of(world, &item.spawn, &format!("artifact {}", i + 1)))
        .collect::<Result<Vec<_>, SetupError>>()?;

    Ok(ResolvedRefs {
        start_position: position_of(world, &labels.start_position, "start position")?,
        landing_zone: area_of(world, &labels.landing_zone, "landing zone")?,
        player_base: position_of(world, &labels.player_base, "player base")?,
        launch_area: area_of(world, &content.launch.area, "launch trigger")?,
        launch_sound_position: position_of(world, &content.launch.sound_position, "launch cue")?,
        bases,
        artifact_spawns,
    })
}

fn emit_setup_effects(
    state: &mut MissionState,
    content: &MissionContent,
    effects: &mut Vec<EffectEnvelope>,
) {
    let now = state.clock.now_ms;
    let player = content.players.human;
    let setup = &content.setup;

    let mut directives = vec![
        Effect::CenterView {
            position: state.refs.start_position,
        },
        Effect::SetNoGoArea {
            area: state.refs.landing_zone,
            player,
        },
        Effect::SetPower {
            player,
            amount: setup.power,
        },
    ];
    directives.extend(setup.structure_limits.iter().map(|def| Effect::SetStructureLimit {
        structure: def.structure.clone(),
        limit: def.limit,
        player,
    }));
    directives.extend(setup.enabled_structures.iter().map(|structure| {
        Effect::EnableStructure {
            structure: structure.clone(),
            player,
        }
    }));
    // Components one by one so the rest of the tree stays locked.
    directives.extend(setup.components.iter().map(|component| {
        Effect::MakeComponentAvailable {
            component: component.clone(),
            player,
        }
    }));
    directives.extend(setup.completed_research.iter().map(|tech| Effect::CompleteResearch {
        tech: tech.clone(),
        player,
    }));
    directives.push(Effect::AddMessage {
        message: setup.briefing_message.clone(),
        kind: MessageKind::Campaign,
        player,
        immediate: false,
    });
    directives.push(Effect::SetReinforcementTime {
        secs: setup.reinforcement_time_secs,
    });
    directives.push(Effect::SetMissionTimer { secs: None });

    for effect in directives {
        effects.push(crate::emit(&mut state.counters, now, effect));
    }
}

// ---------------------------------------------------------------------------
// Label resolution
// ---------------------------------------------------------------------------

fn resolve(
    world: &impl WorldView,
    label: &LabelId,
    context: &str,
) -> Result<LabelTarget, SetupError> {
    world
        .resolve_label(label)
        .ok_or_else(|| SetupError::MissingLabel {
            label: label.clone(),
            context: context.to_string(),
        })
}

fn wrong_kind(
    label: &LabelId,
    context: &str,
    expected: &'static str,
    found: &LabelTarget,
) -> SetupError {
    SetupError::WrongLabelKind {
        label: label.clone(),
        context: context.to_string(),
        expected,
        found: found.kind_name(),
    }
}

/// Positions may come from point labels, objects, or the centre of an area.
fn position_of(
    world: &impl WorldView,
    label: &LabelId,
    context: &str,
) -> Result<Position, SetupError> {
    match resolve(world, label, context)? {
        LabelTarget::Position { position } | LabelTarget::Object { position, .. } => Ok(position),
        LabelTarget::Area { area } => Ok(area.center()),
        other @ LabelTarget::Group { .. } => Err(wrong_kind(label, context, "position", &other)),
    }
}

fn area_of(world: &impl WorldView, label: &LabelId, context: &str) -> Result<Area, SetupError> {
    match resolve(world, label, context)? {
        LabelTarget::Area { area } => Ok(area),
        other => Err(wrong_kind(label, context, "area", &other)),
    }
}

fn group_of(world: &impl WorldView, label: &LabelId, context: &str) -> Result<GroupId, SetupError> {
    match resolve(world, label, context)? {
        LabelTarget::Group { group } => Ok(group),
        other => Err(wrong_kind(label, context, "group", &other)),
    }
}

fn object_of(
    world: &impl WorldView,
    label: &LabelId,
    context: &str,
) -> Result<ObjectId, SetupError> {
    match resolve(world, label, context)? {
        LabelTarget::Object { object, .. } => Ok(object),
        other => Err(wrong_kind(label, context, "object", &other)),
    }
}
