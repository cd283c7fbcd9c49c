//! Type definitions for `mission_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the engine:
//! world references, inbound events, outbound effects, mission content and
//! mission state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::queue::DelayedActionQueue;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

macro_rules! numeric_id {
    ($name:ident, $inner:ty) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub $inner);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(LabelId);
string_id!(TechId);
string_id!(SoundId);
string_id!(MessageId);
string_id!(StructureType);
string_id!(ComponentId);
string_id!(FeatureType);
string_id!(LevelId);
string_id!(EffectId);

numeric_id!(ObjectId, u64);
numeric_id!(GroupId, u64);
numeric_id!(PlayerId, u8);

/// Zero-based index into the mission's hostile bases. Displays one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BaseIndex(pub usize);

impl BaseIndex {
    pub fn next(self) -> BaseIndex {
        BaseIndex(self.0 + 1)
    }
}

impl std::fmt::Display for BaseIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "base {}", self.0 + 1)
    }
}

// ---------------------------------------------------------------------------
// World geometry and object references
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub z: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }
}

/// Axis-aligned rectangle in world coordinates, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub x: i32,
    pub y: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Area {
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x.min(self.x2)
            && pos.x <= self.x.max(self.x2)
            && pos.y >= self.y.min(self.y2)
            && pos.y <= self.y.max(self.y2)
    }

    pub fn center(&self) -> Position {
        Position::new(
            self.x + (self.x2 - self.x) / 2,
            self.y + (self.y2 - self.y) / 2,
        )
    }
}

/// What a map label refers to, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LabelTarget {
    Position { position: Position },
    Area { area: Area },
    Group { group: GroupId },
    Object { object: ObjectId, position: Position },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DroidType {
    Construct,
    Weapon,
}

/// Droid filter for population queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DroidFilter {
    Any,
    Construct,
}

impl DroidFilter {
    pub fn matches(self, droid_type: DroidType) -> bool {
        match self {
            DroidFilter::Any => true,
            DroidFilter::Construct => droid_type == DroidType::Construct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Mission collectible crate.
    Artifact,
    /// Scenery building (huts, walls) that counts as base leftovers.
    Building,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectKind {
    Droid { droid_type: DroidType },
    Structure { structure: StructureType },
    Feature { feature: FeatureKind },
}

/// Snapshot of a world object as delivered with an event or area query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: ObjectId,
    pub player: PlayerId,
    pub kind: ObjectKind,
    pub position: Position,
    #[serde(default)]
    pub label: Option<LabelId>,
    #[serde(default)]
    pub name: String,
}

impl ObjectRef {
    pub fn is_droid(&self) -> bool {
        matches!(self.kind, ObjectKind::Droid { .. })
    }

    pub fn is_structure(&self) -> bool {
        matches!(self.kind, ObjectKind::Structure { .. })
    }

    pub fn feature_kind(&self) -> Option<FeatureKind> {
        match self.kind {
            ObjectKind::Feature { feature } => Some(feature),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound world events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorldEvent {
    AreaEntered {
        droid: ObjectRef,
        area: LabelId,
    },
    GroupSizeChanged {
        group: GroupId,
        new_size: u32,
    },
    ObjectSeen {
        viewer: ObjectRef,
        seen: ObjectRef,
    },
    ObjectAttacked {
        victim: ObjectRef,
        attacker: Option<ObjectRef>,
    },
    ItemPickedUp {
        feature: ObjectRef,
        droid: ObjectRef,
    },
    ChatReceived {
        from: PlayerId,
        to: PlayerId,
        text: String,
    },
    CheatModeToggled {
        enabled: bool,
    },
    StructureCompleted {
        structure: ObjectRef,
    },
}

// ---------------------------------------------------------------------------
// Outbound effects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Proximity,
    Mission,
    Campaign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DroidOrder {
    Scout,
}

/// A command directive for the host simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Effect {
    CenterView {
        position: Position,
    },
    SetNoGoArea {
        area: Area,
        player: PlayerId,
    },
    SetPower {
        player: PlayerId,
        amount: u32,
    },
    SetStructureLimit {
        structure: StructureType,
        limit: u32,
        player: PlayerId,
    },
    EnableStructure {
        structure: StructureType,
        player: PlayerId,
    },
    MakeComponentAvailable {
        component: ComponentId,
        player: PlayerId,
    },
    CompleteResearch {
        tech: TechId,
        player: PlayerId,
    },
    EnableResearch {
        tech: TechId,
        player: PlayerId,
    },
    SetReinforcementTime {
        secs: i32,
    },
    /// `None` disables the mission countdown.
    SetMissionTimer {
        secs: Option<u32>,
    },
    OrderDroid {
        droid: ObjectId,
        order: DroidOrder,
        target: Position,
    },
    SpawnFeature {
        feature_type: FeatureType,
        position: Position,
        label: LabelId,
    },
    RemoveObject {
        object: ObjectId,
        special_effect: bool,
    },
    /// `position: None` plays the cue globally.
    PlaySound {
        sound: SoundId,
        position: Option<Position>,
    },
    AddMessage {
        message: MessageId,
        kind: MessageKind,
        player: PlayerId,
        immediate: bool,
    },
    RemoveMessage {
        message: MessageId,
        kind: MessageKind,
        player: PlayerId,
    },
    MarkArea {
        label: LabelId,
    },
    UnmarkArea {
        label: LabelId,
    },
    DebugPrint {
        text: String,
    },
    LoadLevel {
        level: LevelId,
    },
    GameOver {
        won: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectEnvelope {
    pub id: EffectId,
    pub time_ms: u64,
    pub effect: Effect,
}

// ---------------------------------------------------------------------------
// Deferred actions and outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

/// Everything the engine may defer through the delayed action queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionAction {
    RemoveLaunchObjective,
    RevealBase(BaseIndex),
    Resolve(Outcome),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    Unresolved,
    /// A `Resolve` action is queued; no further resolution may be scheduled.
    Pending(Outcome),
    Resolved(Outcome),
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionContent {
    pub content_version: String,
    pub mission: String,
    pub players: PlayersDef,
    pub labels: MapLabelsDef,
    pub setup: SetupDef,
    pub launch: LaunchDef,
    /// Canonical elimination order; base N's destruction reveals base N+1.
    pub bases: Vec<BaseDef>,
    pub artifacts: ArtifactsDef,
    pub alerts: AttackAlertDef,
    pub outcome: OutcomeDef,
    #[serde(default)]
    pub timer: Option<MissionTimerDef>,
    pub constants: Constants,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayersDef {
    pub human: PlayerId,
    pub hostile: Vec<PlayerId>,
}

impl PlayersDef {
    pub fn is_hostile(&self, player: PlayerId) -> bool {
        self.hostile.contains(&player)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapLabelsDef {
    pub start_position: LabelId,
    pub landing_zone: LabelId,
    pub player_base: LabelId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureLimitDef {
    pub structure: StructureType,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupDef {
    pub power: u32,
    pub structure_limits: Vec<StructureLimitDef>,
    pub enabled_structures: Vec<StructureType>,
    pub components: Vec<ComponentId>,
    pub completed_research: Vec<TechId>,
    pub briefing_message: MessageId,
    /// Negative disables reinforcements.
    pub reinforcement_time_secs: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchDef {
    pub area: LabelId,
    pub sound_position: LabelId,
    pub positioned_sound: SoundId,
    pub global_sound: SoundId,
    pub mission_message: MessageId,
    pub objective_message: MessageId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseDef {
    pub name: String,
    pub group: LabelId,
    pub scout: LabelId,
    pub area: LabelId,
    pub sound_position: LabelId,
    pub message: MessageId,
    #[serde(default)]
    pub reveal_sound: Option<SoundId>,
    pub destroyed_sound: SoundId,
    /// Delay between spotting the scout point and showing the base message.
    #[serde(default)]
    pub sighting_delay_ms: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactProvisioning {
    /// One artifact on the map at a time; each pickup spawns the next.
    #[default]
    Progressive,
    /// All artifacts spawned at mission start, each with its own label.
    PrePlaced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDef {
    pub spawn: LabelId,
    pub tech: TechId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsDef {
    #[serde(default)]
    pub provisioning: ArtifactProvisioning,
    pub feature_type: FeatureType,
    /// Label attached to spawned artifacts. Pre-placed artifacts get the
    /// ordinal appended (`artifact1`, `artifact2`, ...).
    pub label: LabelId,
    pub pickup_sound: SoundId,
    /// Pickup order; item N unlocks `tech` when it is the Nth collected.
    pub items: Vec<ArtifactDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackAlertDef {
    pub structure_sound: SoundId,
    pub unit_sound: SoundId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeDef {
    pub player_factories: Vec<StructureType>,
    pub hostile_factories: Vec<StructureType>,
    pub next_level: LevelId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionTimerDef {
    pub power_generator: StructureType,
    pub resource_extractor: StructureType,
    pub limit_secs: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    pub tick_interval_ms: u64,
    // Delays are signed; the queue clamps negative values to zero.
    pub launch_objective_lifetime_ms: i64,
    pub reveal_next_base_delay_ms: i64,
    /// Global (not per-object) cooldown between attack alerts.
    pub attack_alert_cooldown_ms: u64,
    pub loss_delay_ms: i64,
    pub win_delay_ms: i64,
    pub required_artifacts: u32,
    pub required_stage: u8,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

/// Monotonic mission progress: 0 idle, 1 launched, then +1 per destroyed base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Stage(pub u8);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionState {
    pub meta: MetaState,
    pub clock: ClockState,
    pub stage: Stage,
    pub launched: bool,
    pub bases: Vec<BaseStatus>,
    pub artifacts: ArtifactState,
    pub last_attack_alert_ms: Option<u64>,
    pub cheat_mode: bool,
    /// Areas currently marked by the cheat-mode debug overlay.
    pub highlighted: Vec<LabelId>,
    pub timer_started: bool,
    pub resolution: Resolution,
    pub queue: DelayedActionQueue,
    pub refs: ResolvedRefs,
    pub counters: Counters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub mission: String,
    pub content_version: String,
    pub schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockState {
    pub now_ms: u64,
    pub next_tick_ms: u64,
    pub ticks: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStatus {
    pub revealed: bool,
    pub reveal_pending: bool,
    pub message_shown: bool,
    pub destroyed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactState {
    /// Per ordinal, in content order.
    pub collected: Vec<bool>,
    pub count: u32,
    /// Features already processed; duplicate pickups of these are ignored.
    pub picked_objects: BTreeSet<ObjectId>,
}

/// Map references resolved once at mission start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRefs {
    pub start_position: Position,
    pub landing_zone: Area,
    pub player_base: Position,
    pub launch_area: Area,
    pub launch_sound_position: Position,
    pub bases: Vec<BaseRefs>,
    pub artifact_spawns: Vec<Position>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseRefs {
    pub group: GroupId,
    pub scout: ObjectId,
    pub area: Area,
    pub sound_position: Position,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_effect_id: u64,
}
