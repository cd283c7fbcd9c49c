//! Mission content and map loading shared between mission_cli and mission_control.
//!
//! A content directory holds three files:
//! - `mission.json`: players, labels, setup, bases, artifacts, outcome.
//! - `constants.json`: tick interval, delays, cooldowns, thresholds.
//! - `map.json`: label targets and the objects present at mission start.

use anyhow::{Context, Result};
use mission_core::{
    AttackAlertDef, ArtifactsDef, BaseDef, Constants, GroupId, LabelId, LabelTarget, LaunchDef,
    MapLabelsDef, MissionContent, MissionTimerDef, ObjectId, ObjectRef, OutcomeDef, PlayersDef,
    SetupDef,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Deserialize)]
struct MissionFile {
    content_version: String,
    mission: String,
    players: PlayersDef,
    labels: MapLabelsDef,
    setup: SetupDef,
    launch: LaunchDef,
    bases: Vec<BaseDef>,
    artifacts: ArtifactsDef,
    alerts: AttackAlertDef,
    outcome: OutcomeDef,
    #[serde(default)]
    timer: Option<MissionTimerDef>,
}

/// Initial world layout for the sandbox host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDef {
    pub labels: BTreeMap<LabelId, LabelTarget>,
    pub objects: Vec<MapObject>,
}

/// An object present at mission start, optionally a member of a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapObject {
    #[serde(flatten)]
    pub object: ObjectRef,
    #[serde(default)]
    pub group: Option<GroupId>,
}

fn read_json<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let text = std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {file}"))
}

/// Validates cross-references inside mission content, panicking on any authoring error.
///
/// Catches mistakes like: no hostile bases, the human listed as hostile, two
/// bases sharing a group label, or a win threshold no playthrough can reach.
pub fn validate_content(content: &MissionContent) {
    let constants = &content.constants;
    assert!(constants.tick_interval_ms > 0, "tick_interval_ms must be > 0");
    assert!(!content.bases.is_empty(), "mission defines no hostile bases");
    assert!(
        !content.players.hostile.is_empty(),
        "mission defines no hostile players"
    );
    assert!(
        !content.players.is_hostile(content.players.human),
        "human player {} is also listed as hostile",
        content.players.human,
    );

    let mut groups = HashSet::new();
    let mut scouts = HashSet::new();
    for base in &content.bases {
        assert!(
            groups.insert(&base.group),
            "base '{}' group label '{}' is shared with another base",
            base.name,
            base.group,
        );
        assert!(
            scouts.insert(&base.scout),
            "base '{}' scout label '{}' is shared with another base",
            base.name,
            base.scout,
        );
    }

    let artifacts = content.artifacts.items.len();
    assert!(
        usize::try_from(constants.required_artifacts).is_ok_and(|n| n <= artifacts),
        "required_artifacts {} exceeds the {} artifacts defined",
        constants.required_artifacts,
        artifacts,
    );
    let final_stage = content.bases.len() + 1;
    assert!(
        usize::from(constants.required_stage) <= final_stage,
        "required_stage {} is unreachable with {} bases (final stage {})",
        constants.required_stage,
        content.bases.len(),
        final_stage,
    );
    assert!(
        !content.outcome.player_factories.is_empty(),
        "outcome lists no player factory types"
    );
}

/// Validates that every label the mission uses exists in the map with the
/// right kind, and that object labels point at objects the map places.
pub fn validate_map(content: &MissionContent, map: &MapDef) {
    let object_ids: HashSet<ObjectId> = map.objects.iter().map(|o| o.object.id).collect();
    let mut seen = HashSet::new();
    for o in &map.objects {
        assert!(
            seen.insert(o.object.id),
            "map places object {} twice",
            o.object.id
        );
    }

    let expect = |label: &LabelId, context: &str, kinds: &[&str]| {
        expect_label(map, &object_ids, label, context, kinds);
    };
    let point: &[&str] = &["position", "object", "area"];
    let area: &[&str] = &["area"];

    expect(&content.labels.start_position, "start position", point);
    expect(&content.labels.landing_zone, "landing zone", area);
    expect(&content.labels.player_base, "player base", point);
    expect(&content.launch.area, "launch trigger", area);
    expect(&content.launch.sound_position, "launch cue", point);
    for base in &content.bases {
        let context = format!("base '{}'", base.name);
        expect(&base.group, &context, &["group"][..]);
        expect(&base.scout, &context, &["object"][..]);
        expect(&base.area, &context, area);
        expect(&base.sound_position, &context, point);
        if let Some(LabelTarget::Group { group }) = map.labels.get(&base.group) {
            assert!(
                map.objects.iter().any(|o| o.group == Some(*group)),
                "{context} group {group} has no members in the map",
            );
        }
    }
    for (i, item) in content.artifacts.items.iter().enumerate() {
        expect(&item.spawn, &format!("artifact {}", i + 1), point);
    }
}

fn expect_label(
    map: &MapDef,
    object_ids: &HashSet<ObjectId>,
    label: &LabelId,
    context: &str,
    kinds: &[&str],
) {
    let target = map
        .labels
        .get(label)
        .unwrap_or_else(|| panic!("{context} label '{label}' is not defined in the map"));
    assert!(
        kinds.contains(&target.kind_name()),
        "{context} label '{label}' is a {}, expected one of {kinds:?}",
        target.kind_name(),
    );
    if let LabelTarget::Object { object, .. } = target {
        assert!(
            object_ids.contains(object),
            "{context} label '{label}' refers to unknown object {object}",
        );
    }
}

pub fn load_content(content_dir: &str) -> Result<MissionContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = read_json(dir, "constants.json")?;
    let mission: MissionFile = read_json(dir, "mission.json")?;
    let content = MissionContent {
        content_version: mission.content_version,
        mission: mission.mission,
        players: mission.players,
        labels: mission.labels,
        setup: mission.setup,
        launch: mission.launch,
        bases: mission.bases,
        artifacts: mission.artifacts,
        alerts: mission.alerts,
        outcome: mission.outcome,
        timer: mission.timer,
        constants,
    };
    validate_content(&content);
    Ok(content)
}

/// Load `map.json` from the content directory and check it against `content`.
pub fn load_map(content_dir: &str, content: &MissionContent) -> Result<MapDef> {
    let map: MapDef = read_json(Path::new(content_dir), "map.json")?;
    validate_map(content, &map);
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_core::test_fixtures::{base_content, FixtureWorld};
    use mission_core::{ObjectKind, PlayerId};
    use std::io::Write;

    /// Map mirroring the fixture world, with base droids assigned to groups.
    fn fixture_map() -> MapDef {
        let world = FixtureWorld::new();
        let objects = world
            .objects
            .iter()
            .map(|object| {
                let group = match object.kind {
                    ObjectKind::Droid { .. } if object.id.0 >= 200 && object.id.0 < 300 => {
                        Some(mission_core::test_fixtures::base_group(
                            usize::try_from(object.id.0 - 200).unwrap(),
                        ))
                    }
                    _ => None,
                };
                MapObject {
                    object: object.clone(),
                    group,
                }
            })
            .collect();
        MapDef {
            labels: world.labels.into_iter().collect(),
            objects,
        }
    }

    fn write(dir: &Path, file: &str, value: &impl Serialize) {
        let mut f = std::fs::File::create(dir.join(file)).unwrap();
        f.write_all(serde_json::to_string_pretty(value).unwrap().as_bytes())
            .unwrap();
    }

    fn write_content_dir(content: &MissionContent) -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        let mut mission = serde_json::to_value(content).unwrap();
        mission.as_object_mut().unwrap().remove("constants");
        write(dir.path(), "mission.json", &mission);
        write(dir.path(), "constants.json", &content.constants);
        write(dir.path(), "map.json", &fixture_map());
        dir
    }

    #[test]
    fn test_fixture_content_passes_validation() {
        validate_content(&base_content());
        validate_map(&base_content(), &fixture_map());
    }

    #[test]
    fn test_load_round_trips_written_files() {
        let content = base_content();
        let dir = write_content_dir(&content);
        let path = dir.path().to_str().unwrap();

        let loaded = load_content(path).unwrap();
        assert_eq!(loaded.mission, "CAM_1A");
        assert_eq!(loaded.bases.len(), 4);
        assert_eq!(loaded.constants.win_delay_ms, 4000);

        let map = load_map(path, &loaded).unwrap();
        assert_eq!(map.objects.len(), fixture_map().objects.len());
    }

    #[test]
    fn test_missing_file_names_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load_content(dir.path().to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("constants.json"), "{err:#}");
    }

    #[test]
    fn test_malformed_json_names_the_file() {
        let content = base_content();
        let dir = write_content_dir(&content);
        std::fs::write(dir.path().join("mission.json"), "{ not json").unwrap();

        let err = load_content(dir.path().to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing mission.json"), "{err:#}");
    }

    #[test]
    #[should_panic(expected = "also listed as hostile")]
    fn test_human_listed_as_hostile_panics() {
        let mut content = base_content();
        content.players.hostile.push(PlayerId(0));
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "shared with another base")]
    fn test_shared_group_label_panics() {
        let mut content = base_content();
        content.bases[2].group = content.bases[1].group.clone();
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "exceeds the 4 artifacts")]
    fn test_unreachable_artifact_threshold_panics() {
        let mut content = base_content();
        content.constants.required_artifacts = 6;
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "is unreachable")]
    fn test_unreachable_stage_panics() {
        let mut content = base_content();
        content.constants.required_stage = 6;
        validate_content(&content);
    }

    #[test]
    #[should_panic(expected = "is not defined in the map")]
    fn test_missing_map_label_panics() {
        let mut map = fixture_map();
        map.labels.remove(&LabelId::new("scavbase3area"));
        validate_map(&base_content(), &map);
    }

    #[test]
    #[should_panic(expected = "expected one of")]
    fn test_wrong_map_label_kind_panics() {
        let mut map = fixture_map();
        map.labels.insert(
            LabelId::new("landingZone"),
            LabelTarget::Position {
                position: mission_core::Position::new(0, 0),
            },
        );
        validate_map(&base_content(), &map);
    }

    #[test]
    #[should_panic(expected = "has no members")]
    fn test_empty_group_panics() {
        let mut map = fixture_map();
        map.objects.retain(|o| o.group != Some(GroupId(12)));
        validate_map(&base_content(), &map);
    }
}
