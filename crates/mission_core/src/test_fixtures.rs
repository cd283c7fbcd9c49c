//! Shared test fixtures for mission_core and downstream crates.
//!
//! `base_content()` is a four-base mission with progressive artifacts laid out
//! on a simple grid. `FixtureWorld` is a hand-editable [`WorldView`] whose
//! labels match that layout and whose counts derive from a flat object list.

use std::collections::HashMap;

use crate::{
    Area, ArtifactDef, ArtifactProvisioning, ArtifactsDef, AttackAlertDef, BaseDef, ComponentId,
    Constants, DroidFilter, DroidType, EffectEnvelope, FeatureKind, FeatureType, GroupId, LabelId,
    LabelTarget, LaunchDef, LevelId, MapLabelsDef, MessageId, MissionContent, MissionState,
    MissionTimerDef, ObjectId, ObjectKind, ObjectRef, OutcomeDef, PlayerId, PlayersDef, Position,
    SetupDef, SoundId, StructureLimitDef, StructureType, TechId, WorldView,
};

pub const HUMAN: PlayerId = PlayerId(0);
pub const SCAV_A: PlayerId = PlayerId(6);
pub const SCAV_B: PlayerId = PlayerId(7);

pub const CONSTRUCTOR: ObjectId = ObjectId(1);
pub const PLAYER_FACTORY: ObjectId = ObjectId(2);
pub const LAUNCH_RAIDER: ObjectId = ObjectId(500);

pub const BASE_COUNT: usize = 4;

/// Techs in pickup order.
pub const ARTIFACT_TECHS: [&str; 4] = [
    "R-Wpn-MG-Damage01",
    "R-Wpn-Flamer01Mk1",
    "R-Defense-Tower01",
    "R-Sys-Engineering01",
];

/// Spawn labels in pickup order.
const ARTIFACT_SPAWNS: [&str; 4] = ["artifact4pos", "artifact1pos", "artifact3pos", "artifact2pos"];
const BASE_SOUNDS: [&str; 4] = ["scav1soundpos", "scav2soundpos", "scav3soundpos", "retreat4"];
const BASE_SCOUTS: [&str; 4] = ["seen1", "seenbase2", "seenbase3", "seenbase4"];

fn label(value: &str) -> LabelId {
    LabelId::new(value)
}

/// Four bases and progressive artifacts, with the real mission delays.
pub fn base_content() -> MissionContent {
    let bases = (0..BASE_COUNT)
        .map(|i| BaseDef {
            name: format!("scav base {}", i + 1),
            group: LabelId(format!("scavgroup{}", i + 1)),
            scout: label(BASE_SCOUTS[i]),
            area: LabelId(format!("scavbase{}area", i + 1)),
            sound_position: label(BASE_SOUNDS[i]),
            message: MessageId(format!("C1A_BASE{i}")),
            reveal_sound: (i != 0).then(|| SoundId::new("pcv374.ogg")),
            destroyed_sound: SoundId::new(if i == 0 { "pcv391.ogg" } else { "pcv392.ogg" }),
            sighting_delay_ms: if i == 1 || i == 2 { 1000 } else { 0 },
        })
        .collect();
    let structures = [
        "A0PowerGenerator",
        "A0ResourceExtractor",
        "A0ResearchFacility",
        "A0LightFactory",
        "A0CommandCentre",
    ];
    let limits = [5, 200, 5, 5, 1];

    MissionContent {
        content_version: "test".to_string(),
        mission: "CAM_1A".to_string(),
        players: PlayersDef {
            human: HUMAN,
            hostile: vec![SCAV_A, SCAV_B],
        },
        labels: MapLabelsDef {
            start_position: label("startPosition"),
            landing_zone: label("landingZone"),
            player_base: label("playerBase"),
        },
        setup: SetupDef {
            power: 1300,
            structure_limits: structures
                .iter()
                .zip(limits)
                .map(|(structure, limit)| StructureLimitDef {
                    structure: StructureType::new(*structure),
                    limit,
                })
                .collect(),
            enabled_structures: structures.iter().map(|s| StructureType::new(*s)).collect(),
            components: vec![ComponentId::new("MG1Mk1")],
            completed_research: vec![
                TechId::new("R-Vehicle-Body01"),
                TechId::new("R-Sys-Spade1Mk1"),
                TechId::new("R-Vehicle-Prop-Wheels"),
            ],
            briefing_message: MessageId::new("CMB1_MSG"),
            reinforcement_time_secs: -1,
        },
        launch: LaunchDef {
            area: label("launchScavAttack"),
            sound_position: label("scav1soundpos"),
            positioned_sound: SoundId::new("pcv375.ogg"),
            global_sound: SoundId::new("pcv456.ogg"),
            mission_message: MessageId::new("MB1A_MSG"),
            objective_message: MessageId::new("C1A_OBJ1"),
        },
        bases,
        artifacts: ArtifactsDef {
            provisioning: ArtifactProvisioning::Progressive,
            feature_type: FeatureType::new("Crate"),
            label: label("artifact"),
            pickup_sound: SoundId::new("pcv352.ogg"),
            items: ARTIFACT_SPAWNS
                .iter()
                .zip(ARTIFACT_TECHS)
                .map(|(spawn, tech)| ArtifactDef {
                    spawn: label(spawn),
                    tech: TechId::new(tech),
                })
                .collect(),
        },
        alerts: AttackAlertDef {
            structure_sound: SoundId::new("pcv337.ogg"),
            unit_sound: SoundId::new("pcv399.ogg"),
        },
        outcome: OutcomeDef {
            player_factories: vec![
                StructureType::new("A0LightFactory"),
                StructureType::new("A0CyborgFactory"),
            ],
            hostile_factories: vec![StructureType::new("A0BaBaFactory")],
            next_level: LevelId::new("CAM_1B"),
        },
        timer: None,
        constants: Constants {
            tick_interval_ms: 1000,
            launch_objective_lifetime_ms: 12_000,
            reveal_next_base_delay_ms: 2000,
            attack_alert_cooldown_ms: 5000,
            loss_delay_ms: 2000,
            win_delay_ms: 4000,
            required_artifacts: 4,
            required_stage: 5,
        },
    }
}

/// `base_content()` with every artifact placed up front under its own label.
pub fn pre_placed_content() -> MissionContent {
    let mut content = base_content();
    content.artifacts.provisioning = ArtifactProvisioning::PrePlaced;
    content
}

/// `base_content()` with a mission timer started by power plus derrick.
pub fn timed_content() -> MissionContent {
    let mut content = base_content();
    content.timer = Some(MissionTimerDef {
        power_generator: StructureType::new("A0PowerGenerator"),
        resource_extractor: StructureType::new("A0ResourceExtractor"),
        limit_secs: 3600,
    });
    content
}

pub fn base_area(index: usize) -> Area {
    let x = 1000 * (i32::try_from(index).unwrap() + 1);
    Area {
        x,
        y: 0,
        x2: x + 500,
        y2: 500,
    }
}

pub fn launch_area() -> Area {
    Area {
        x: 0,
        y: 1000,
        x2: 500,
        y2: 1500,
    }
}

pub fn base_group(index: usize) -> GroupId {
    GroupId(10 + index as u64)
}

pub fn scout_id(index: usize) -> ObjectId {
    ObjectId(100 + index as u64)
}

pub fn artifact_spawn(ordinal: usize) -> Position {
    let area = base_area(ordinal);
    Position::new(area.x + 400, area.y + 400)
}

pub fn droid(id: u64, player: PlayerId, droid_type: DroidType, position: Position) -> ObjectRef {
    ObjectRef {
        id: ObjectId(id),
        player,
        kind: ObjectKind::Droid { droid_type },
        position,
        label: None,
        name: format!("droid {id}"),
    }
}

pub fn structure(id: u64, player: PlayerId, kind: &str, position: Position) -> ObjectRef {
    ObjectRef {
        id: ObjectId(id),
        player,
        kind: ObjectKind::Structure {
            structure: StructureType::new(kind),
        },
        position,
        label: None,
        name: kind.to_string(),
    }
}

pub fn feature(id: u64, feature: FeatureKind, position: Position, label: Option<&str>) -> ObjectRef {
    ObjectRef {
        id: ObjectId(id),
        player: PlayerId(99),
        kind: ObjectKind::Feature { feature },
        position,
        label: label.map(LabelId::new),
        name: format!("feature {id}"),
    }
}

/// The constructor droid parked at the player base.
pub fn human_droid() -> ObjectRef {
    droid(CONSTRUCTOR.0, HUMAN, DroidType::Construct, Position::new(200, 2100))
}

/// A crate carrying the shared progressive label.
pub fn artifact_crate(id: u64) -> ObjectRef {
    feature(id, FeatureKind::Artifact, artifact_spawn(0), Some("artifact"))
}

/// In-memory world for engine tests.
#[derive(Debug, Clone)]
pub struct FixtureWorld {
    pub labels: HashMap<LabelId, LabelTarget>,
    pub objects: Vec<ObjectRef>,
}

impl FixtureWorld {
    /// Labels for `base_content()`, one human constructor and factory, and
    /// per base a raider, a factory, a wall and the scout point.
    pub fn new() -> Self {
        let mut labels = HashMap::new();
        let mut insert = |name: &str, target: LabelTarget| {
            labels.insert(label(name), target);
        };
        insert(
            "startPosition",
            LabelTarget::Position {
                position: Position::new(100, 2000),
            },
        );
        insert(
            "landingZone",
            LabelTarget::Area {
                area: Area {
                    x: 0,
                    y: 1900,
                    x2: 300,
                    y2: 2200,
                },
            },
        );
        insert(
            "playerBase",
            LabelTarget::Position {
                position: Position::new(200, 2100),
            },
        );
        insert("launchScavAttack", LabelTarget::Area { area: launch_area() });

        let mut objects = vec![
            human_droid(),
            structure(PLAYER_FACTORY.0, HUMAN, "A0LightFactory", Position::new(250, 2150)),
            droid(LAUNCH_RAIDER.0, SCAV_A, DroidType::Weapon, Position::new(250, 1250)),
        ];

        for i in 0..BASE_COUNT {
            let area = base_area(i);
            let center = area.center();
            let n = i as u64;
            insert(
                &format!("scavgroup{}", i + 1),
                LabelTarget::Group {
                    group: base_group(i),
                },
            );
            insert(&format!("scavbase{}area", i + 1), LabelTarget::Area { area });
            insert(BASE_SOUNDS[i], LabelTarget::Position { position: center });
            insert(
                BASE_SCOUTS[i],
                LabelTarget::Object {
                    object: scout_id(i),
                    position: center,
                },
            );
            insert(
                ARTIFACT_SPAWNS[i],
                LabelTarget::Position {
                    position: artifact_spawn(i),
                },
            );
            let player = if i % 2 == 0 { SCAV_A } else { SCAV_B };
            objects.push(feature(scout_id(i).0, FeatureKind::Other, center, None));
            objects.push(droid(200 + n, player, DroidType::Weapon, center));
            objects.push(structure(300 + n, player, "A0BaBaFactory", center));
            let wall = Position::new(area.x, area.y);
            objects.push(feature(400 + n, FeatureKind::Building, wall, None));
        }

        Self { labels, objects }
    }

    pub fn add(&mut self, object: ObjectRef) {
        self.objects.push(object);
    }

    pub fn remove(&mut self, id: ObjectId) {
        self.objects.retain(|object| object.id != id);
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectRef> {
        self.objects.iter().find(|object| object.id == id)
    }

    /// Drop every droid and structure owned by `player`.
    pub fn clear_player(&mut self, player: PlayerId) {
        self.objects
            .retain(|object| object.player != player || object.feature_kind().is_some());
    }

    /// Drop everything owned by the hostile players.
    pub fn clear_hostiles(&mut self) {
        self.clear_player(SCAV_A);
        self.clear_player(SCAV_B);
    }
}

impl Default for FixtureWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldView for FixtureWorld {
    fn resolve_label(&self, name: &LabelId) -> Option<LabelTarget> {
        if let Some(target) = self.labels.get(name) {
            return Some(target.clone());
        }
        self.objects
            .iter()
            .find(|object| object.label.as_ref() == Some(name))
            .map(|object| LabelTarget::Object {
                object: object.id,
                position: object.position,
            })
    }

    fn count_droids(&self, player: PlayerId, filter: DroidFilter) -> u32 {
        let count = self
            .objects
            .iter()
            .filter(|object| object.player == player)
            .filter(|object| match object.kind {
                ObjectKind::Droid { droid_type } => filter.matches(droid_type),
                _ => false,
            })
            .count();
        u32::try_from(count).unwrap()
    }

    fn count_structures(&self, player: PlayerId, kind: &StructureType) -> u32 {
        let count = self
            .objects
            .iter()
            .filter(|object| object.player == player)
            .filter(|object| {
                matches!(&object.kind, ObjectKind::Structure { structure } if structure == kind)
            })
            .count();
        u32::try_from(count).unwrap()
    }

    fn objects_in_area(&self, area: &Area) -> Vec<ObjectRef> {
        self.objects
            .iter()
            .filter(|object| area.contains(object.position))
            .cloned()
            .collect()
    }
}

/// Start `base_content()`-shaped missions at time zero.
pub fn start(content: &MissionContent, world: &FixtureWorld) -> (MissionState, Vec<EffectEnvelope>) {
    crate::start_mission(world, content, 0).unwrap()
}
