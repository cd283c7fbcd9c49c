use super::*;
use crate::test_fixtures::{
    artifact_crate, artifact_spawn, feature, pre_placed_content, ARTIFACT_TECHS,
};

#[test]
fn pickup_unlocks_tech_and_spawns_next() {
    let mut h = Harness::new();
    let effects = h.pick_up(artifact_crate(600));

    assert_eq!(
        effects,
        vec![
            Effect::PlaySound {
                sound: SoundId::new("pcv352.ogg"),
                position: Some(artifact_spawn(0)),
            },
            Effect::RemoveObject {
                object: ObjectId(600),
                special_effect: false,
            },
            Effect::EnableResearch {
                tech: TechId::new(ARTIFACT_TECHS[0]),
                player: test_fixtures::HUMAN,
            },
            Effect::SpawnFeature {
                feature_type: FeatureType::new("Crate"),
                position: artifact_spawn(1),
                label: LabelId::new("artifact"),
            },
        ]
    );
    assert_eq!(h.state.artifacts.count, 1);
}

#[test]
fn techs_unlock_in_pickup_order() {
    let mut h = Harness::new();
    let mut unlocked = Vec::new();
    let mut spawned = 0;
    for id in 600..604 {
        let effects = h.pick_up(artifact_crate(id));
        unlocked.extend(researched(&effects));
        spawned += effects
            .iter()
            .filter(|e| matches!(e, Effect::SpawnFeature { .. }))
            .count();
    }

    let expected: Vec<TechId> = ARTIFACT_TECHS.iter().map(|t| TechId::new(*t)).collect();
    assert_eq!(unlocked, expected);
    // Three follow-up spawns; the final pickup spawns nothing.
    assert_eq!(spawned, 3);
    assert_eq!(h.state.artifacts.count, 4);
}

#[test]
fn duplicate_pickup_is_ignored() {
    let mut h = Harness::new();
    h.pick_up(artifact_crate(600));
    let again = h.pick_up(artifact_crate(600));

    assert!(again.is_empty());
    assert_eq!(h.state.artifacts.count, 1);
}

#[test]
fn extra_artifact_never_exceeds_defined_count() {
    let mut h = Harness::new();
    for id in 600..606 {
        h.pick_up(artifact_crate(id));
    }

    assert_eq!(h.state.artifacts.count, 4);
    assert!(h.state.artifacts.collected.iter().all(|done| *done));
}

#[test]
fn non_artifact_features_are_ignored() {
    let mut h = Harness::new();
    let oil = feature(700, FeatureKind::Other, Position::new(10, 10), None);
    let wall = feature(701, FeatureKind::Building, Position::new(10, 10), None);

    assert!(h.pick_up(oil).is_empty());
    assert!(h.pick_up(wall).is_empty());
    assert_eq!(h.state.artifacts.count, 0);
}

#[test]
fn pre_placed_artifact_identified_by_label() {
    let mut h = Harness::with_content(pre_placed_content());
    let third = feature(
        650,
        FeatureKind::Artifact,
        artifact_spawn(2),
        Some("artifact3"),
    );
    let effects = h.pick_up(third);

    assert_eq!(researched(&effects), vec![TechId::new(ARTIFACT_TECHS[2])]);
    assert!(!effects
        .iter()
        .any(|e| matches!(e, Effect::SpawnFeature { .. })));
    assert_eq!(h.state.artifacts.collected, vec![false, false, true, false]);
}

#[test]
fn pre_placed_unlabelled_artifact_falls_back_to_sequence() {
    let mut h = Harness::with_content(pre_placed_content());
    h.pick_up(feature(
        650,
        FeatureKind::Artifact,
        artifact_spawn(0),
        Some("artifact1"),
    ));
    let effects = h.pick_up(feature(651, FeatureKind::Artifact, artifact_spawn(3), None));

    assert_eq!(researched(&effects), vec![TechId::new(ARTIFACT_TECHS[1])]);
    assert_eq!(h.state.artifacts.count, 2);
}
