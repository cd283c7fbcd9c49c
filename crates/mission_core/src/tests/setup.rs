use super::*;
use crate::test_fixtures::{artifact_spawn, HUMAN};

#[test]
fn start_mission_emits_setup_in_order() {
    let content = base_content();
    let world = FixtureWorld::new();
    let (_, envelopes) = start(&content, &world);
    let effects = effects_of(envelopes);

    assert_eq!(
        effects[0],
        Effect::CenterView {
            position: Position::new(100, 2000)
        }
    );
    assert!(matches!(effects[1], Effect::SetNoGoArea { player, .. } if player == HUMAN));
    assert_eq!(
        effects[2],
        Effect::SetPower {
            player: HUMAN,
            amount: 1300
        }
    );
    let limits = effects
        .iter()
        .filter(|e| matches!(e, Effect::SetStructureLimit { .. }))
        .count();
    assert_eq!(limits, 5);
    assert!(effects.contains(&Effect::CompleteResearch {
        tech: TechId::new("R-Sys-Spade1Mk1"),
        player: HUMAN,
    }));
    assert!(effects.contains(&Effect::SetReinforcementTime { secs: -1 }));
    assert!(effects.contains(&Effect::SetMissionTimer { secs: None }));
    assert_eq!(messages_added(&effects), vec![MessageId::new("CMB1_MSG")]);
}

#[test]
fn progressive_mission_spawns_only_first_artifact() {
    let content = base_content();
    let world = FixtureWorld::new();
    let (_, envelopes) = start(&content, &world);

    let spawns: Vec<Effect> = effects_of(envelopes)
        .into_iter()
        .filter(|e| matches!(e, Effect::SpawnFeature { .. }))
        .collect();
    assert_eq!(
        spawns,
        vec![Effect::SpawnFeature {
            feature_type: FeatureType::new("Crate"),
            position: artifact_spawn(0),
            label: LabelId::new("artifact"),
        }]
    );
}

#[test]
fn pre_placed_mission_spawns_every_artifact_with_own_label() {
    let content = test_fixtures::pre_placed_content();
    let world = FixtureWorld::new();
    let (_, envelopes) = start(&content, &world);

    let labels: Vec<LabelId> = effects_of(envelopes)
        .into_iter()
        .filter_map(|e| match e {
            Effect::SpawnFeature { label, .. } => Some(label),
            _ => None,
        })
        .collect();
    assert_eq!(
        labels,
        vec![
            LabelId::new("artifact1"),
            LabelId::new("artifact2"),
            LabelId::new("artifact3"),
            LabelId::new("artifact4"),
        ]
    );
}

#[test]
fn initial_state_is_idle_and_unresolved() {
    let content = base_content();
    let world = FixtureWorld::new();
    let (state, _) = start(&content, &world);

    assert_eq!(state.stage, Stage::IDLE);
    assert!(!state.launched);
    assert_eq!(state.artifacts.count, 0);
    assert_eq!(state.resolution, Resolution::Unresolved);
    assert_eq!(state.clock.next_tick_ms, 1000);
    assert_eq!(state.bases.len(), 4);
    assert!(state.queue.is_empty());
}

#[test]
fn effect_ids_are_sequential() {
    let content = base_content();
    let world = FixtureWorld::new();
    let (_, envelopes) = start(&content, &world);

    assert_eq!(envelopes[0].id, EffectId::new("eff_000000"));
    assert_eq!(envelopes[1].id, EffectId::new("eff_000001"));
    assert!(envelopes.iter().all(|e| e.time_ms == 0));
}

#[test]
fn missing_label_aborts_setup() {
    let content = base_content();
    let mut world = FixtureWorld::new();
    world.labels.remove(&LabelId::new("seenbase3"));

    let err = start_mission(&world, &content, 0).unwrap_err();
    assert!(
        matches!(&err, SetupError::MissingLabel { label, .. } if label.0 == "seenbase3"),
        "unexpected error: {err}"
    );
    assert!(err.to_string().contains("base 'scav base 3'"));
}

#[test]
fn wrong_label_kind_aborts_setup() {
    let content = base_content();
    let mut world = FixtureWorld::new();
    world.labels.insert(
        LabelId::new("scavgroup2"),
        LabelTarget::Position {
            position: Position::new(0, 0),
        },
    );

    let err = start_mission(&world, &content, 0).unwrap_err();
    assert!(matches!(
        err,
        SetupError::WrongLabelKind {
            expected: "group",
            found: "position",
            ..
        }
    ));
}

#[test]
fn area_label_accepted_as_sound_position() {
    let mut content = base_content();
    content.bases[0].sound_position = LabelId::new("scavbase1area");
    let world = FixtureWorld::new();

    let (state, _) = start(&content, &world);
    assert_eq!(
        state.refs.bases[0].sound_position,
        test_fixtures::base_area(0).center()
    );
}

#[test]
fn too_many_required_artifacts_rejected() {
    let mut content = base_content();
    content.constants.required_artifacts = 5;
    let world = FixtureWorld::new();

    let err = start_mission(&world, &content, 0).unwrap_err();
    assert!(matches!(err, SetupError::InvalidContent { .. }));
}

#[test]
fn zero_tick_interval_rejected() {
    let mut content = base_content();
    content.constants.tick_interval_ms = 0;
    let world = FixtureWorld::new();

    assert!(start_mission(&world, &content, 0).is_err());
}
