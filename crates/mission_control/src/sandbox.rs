//! In-memory host world built from a `MapDef`.
//!
//! Answers the engine's queries, applies the effects it returns and turns
//! player actions into world events the way the game would report them.

use std::collections::{BTreeMap, BTreeSet};

use mission_content::MapDef;
use mission_core::{
    Area, DroidFilter, DroidType, Effect, EffectEnvelope, FeatureKind, FeatureType, GroupId,
    LabelId, LabelTarget, MessageId, MissionContent, ObjectId, ObjectKind, ObjectRef, PlayerId,
    Position, StructureType, TechId, WorldEvent, WorldView,
};
use serde::{Deserialize, Serialize};

/// What the player can do in the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Drive a human droid into a labelled area.
    EnterArea { area: LabelId },
    /// Kill every member of a labelled group, one at a time.
    DestroyGroup { group: LabelId },
    /// A human droid spots a labelled object.
    SightScout { scout: LabelId },
    /// A human droid drives over the artifact currently on the map.
    PickUpArtifact,
    Chat { text: String },
    ToggleCheats { enabled: bool },
    /// A hostile droid shoots at a human structure or unit.
    Attack { structure: bool },
    /// The human finishes building a structure next to its first droid.
    Build { structure: StructureType },
    /// Every human constructor and structure is destroyed.
    LoseProduction,
    /// Hostile droids outside any group are hunted down.
    ClearStragglers,
}

#[derive(Debug, Clone)]
struct SandboxObject {
    object: ObjectRef,
    group: Option<GroupId>,
}

#[derive(Debug, Clone)]
pub struct SandboxWorld {
    labels: BTreeMap<LabelId, LabelTarget>,
    objects: BTreeMap<ObjectId, SandboxObject>,
    next_object_id: u64,
    human: PlayerId,
    hostile: Vec<PlayerId>,
    artifact_feature: FeatureType,
    /// Messages currently on screen.
    pub messages: Vec<MessageId>,
    pub sounds_played: usize,
    pub researchable: BTreeSet<TechId>,
    pub researched: BTreeSet<TechId>,
    pub marked: BTreeSet<LabelId>,
    pub power: u32,
    pub mission_timer_secs: Option<u32>,
    /// Terminal directive, once the mission hands control back.
    pub ended: Option<Effect>,
}

impl SandboxWorld {
    pub fn from_map(content: &MissionContent, map: &MapDef) -> Self {
        let objects: BTreeMap<ObjectId, SandboxObject> = map
            .objects
            .iter()
            .map(|o| {
                (
                    o.object.id,
                    SandboxObject {
                        object: o.object.clone(),
                        group: o.group,
                    },
                )
            })
            .collect();
        let next_object_id = objects.keys().next_back().map_or(1, |id| id.0 + 1);
        Self {
            labels: map.labels.clone(),
            objects,
            next_object_id,
            human: content.players.human,
            hostile: content.players.hostile.clone(),
            artifact_feature: content.artifacts.feature_type.clone(),
            messages: Vec::new(),
            sounds_played: 0,
            researchable: BTreeSet::new(),
            researched: BTreeSet::new(),
            marked: BTreeSet::new(),
            power: 0,
            mission_timer_secs: None,
            ended: None,
        }
    }

    pub fn object(&self, id: ObjectId) -> Option<&ObjectRef> {
        self.objects.get(&id).map(|o| &o.object)
    }

    pub fn objects(&self) -> impl Iterator<Item = &ObjectRef> {
        self.objects.values().map(|o| &o.object)
    }

    /// Members still alive in `group`, in id order.
    pub fn group_members(&self, group: GroupId) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.group == Some(group))
            .map(|o| o.object.id)
            .collect()
    }

    /// The artifact lying on the map with the lowest id, if any.
    pub fn artifact_on_map(&self) -> Option<&ObjectRef> {
        self.objects()
            .find(|o| o.feature_kind() == Some(FeatureKind::Artifact))
    }

    fn first_human_droid(&self) -> Option<ObjectRef> {
        self.objects()
            .find(|o| o.player == self.human && o.is_droid())
            .cloned()
    }

    fn is_hostile(&self, player: PlayerId) -> bool {
        self.hostile.contains(&player)
    }

    // -----------------------------------------------------------------------
    // Player actions
    // -----------------------------------------------------------------------

    /// Carry out `action` and report what the game would observe.
    pub fn perform(&mut self, action: &PlayerAction) -> Vec<WorldEvent> {
        match action {
            PlayerAction::EnterArea { area } => self.enter_area(area),
            PlayerAction::DestroyGroup { group } => self.destroy_group(group),
            PlayerAction::SightScout { scout } => self.sight(scout),
            PlayerAction::PickUpArtifact => self.pick_up_artifact(),
            PlayerAction::Chat { text } => vec![WorldEvent::ChatReceived {
                from: self.human,
                to: self.human,
                text: text.clone(),
            }],
            PlayerAction::ToggleCheats { enabled } => {
                vec![WorldEvent::CheatModeToggled { enabled: *enabled }]
            }
            PlayerAction::Attack { structure } => self.attack(*structure),
            PlayerAction::Build { structure } => self.build(structure),
            PlayerAction::LoseProduction => {
                let human = self.human;
                self.objects.retain(|_, o| {
                    let production = o.object.is_structure()
                        || matches!(
                            o.object.kind,
                            ObjectKind::Droid {
                                droid_type: DroidType::Construct
                            }
                        );
                    o.object.player != human || !production
                });
                Vec::new()
            }
            PlayerAction::ClearStragglers => {
                let hostile = self.hostile.clone();
                self.objects.retain(|_, o| {
                    let straggler = o.group.is_none() && o.object.is_droid();
                    !(straggler && hostile.contains(&o.object.player))
                });
                Vec::new()
            }
        }
    }

    fn enter_area(&mut self, label: &LabelId) -> Vec<WorldEvent> {
        let Some(LabelTarget::Area { area }) = self.labels.get(label).cloned() else {
            tracing::warn!(%label, "enter_area: not an area label");
            return Vec::new();
        };
        let Some(droid) = self
            .first_human_droid()
            .and_then(|d| self.move_object(d.id, area.center()))
        else {
            tracing::warn!("enter_area: no human droid left");
            return Vec::new();
        };
        vec![WorldEvent::AreaEntered {
            droid,
            area: label.clone(),
        }]
    }

    fn destroy_group(&mut self, label: &LabelId) -> Vec<WorldEvent> {
        let Some(LabelTarget::Group { group }) = self.labels.get(label).cloned() else {
            tracing::warn!(%label, "destroy_group: not a group label");
            return Vec::new();
        };
        let members = self.group_members(group);
        let mut remaining = u32::try_from(members.len()).unwrap_or(u32::MAX);
        let mut events = Vec::with_capacity(members.len());
        for id in members {
            self.objects.remove(&id);
            remaining -= 1;
            events.push(WorldEvent::GroupSizeChanged {
                group,
                new_size: remaining,
            });
        }
        events
    }

    fn sight(&self, label: &LabelId) -> Vec<WorldEvent> {
        let Some(LabelTarget::Object { object, .. }) = self.labels.get(label) else {
            tracing::warn!(%label, "sight: not an object label");
            return Vec::new();
        };
        let (Some(seen), Some(viewer)) = (self.object(*object).cloned(), self.first_human_droid())
        else {
            return Vec::new();
        };
        vec![WorldEvent::ObjectSeen { viewer, seen }]
    }

    fn pick_up_artifact(&mut self) -> Vec<WorldEvent> {
        let Some(feature) = self.artifact_on_map().cloned() else {
            return Vec::new();
        };
        let Some(droid) = self
            .first_human_droid()
            .and_then(|d| self.move_object(d.id, feature.position))
        else {
            return Vec::new();
        };
        vec![WorldEvent::ItemPickedUp { feature, droid }]
    }

    fn attack(&self, structure: bool) -> Vec<WorldEvent> {
        let victim = self
            .objects()
            .filter(|o| o.player == self.human)
            .find(|o| if structure { o.is_structure() } else { o.is_droid() })
            .cloned();
        let Some(victim) = victim else {
            return Vec::new();
        };
        let attacker = self
            .objects()
            .find(|o| o.is_droid() && self.is_hostile(o.player))
            .cloned();
        vec![WorldEvent::ObjectAttacked { victim, attacker }]
    }

    fn build(&mut self, structure: &StructureType) -> Vec<WorldEvent> {
        let Some(builder) = self.first_human_droid() else {
            return Vec::new();
        };
        let id = self.alloc_id();
        let built = ObjectRef {
            id,
            player: self.human,
            kind: ObjectKind::Structure {
                structure: structure.clone(),
            },
            position: Position::new(builder.position.x + 128, builder.position.y),
            label: None,
            name: structure.to_string(),
        };
        self.insert(built.clone(), None);
        vec![WorldEvent::StructureCompleted { structure: built }]
    }

    // -----------------------------------------------------------------------
    // Effects
    // -----------------------------------------------------------------------

    /// Apply engine effects in order.
    pub fn apply_effects(&mut self, effects: &[EffectEnvelope]) {
        for envelope in effects {
            self.apply(&envelope.effect);
        }
    }

    fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::SpawnFeature {
                feature_type,
                position,
                label,
            } => {
                let feature = if *feature_type == self.artifact_feature {
                    FeatureKind::Artifact
                } else {
                    FeatureKind::Other
                };
                let id = self.alloc_id();
                self.insert(
                    ObjectRef {
                        id,
                        player: PlayerId(u8::MAX),
                        kind: ObjectKind::Feature { feature },
                        position: *position,
                        label: Some(label.clone()),
                        name: feature_type.to_string(),
                    },
                    None,
                );
            }
            Effect::RemoveObject { object, .. } => {
                self.objects.remove(object);
            }
            Effect::OrderDroid { droid, target, .. } => {
                if self.move_object(*droid, *target).is_none() {
                    tracing::warn!(droid = %droid, "order for unknown droid ignored");
                }
            }
            Effect::AddMessage { message, .. } => {
                if !self.messages.contains(message) {
                    self.messages.push(message.clone());
                }
            }
            Effect::RemoveMessage { message, .. } => self.messages.retain(|m| m != message),
            Effect::PlaySound { .. } => self.sounds_played += 1,
            Effect::EnableResearch { tech, .. } => {
                self.researchable.insert(tech.clone());
            }
            Effect::CompleteResearch { tech, .. } => {
                self.researched.insert(tech.clone());
            }
            Effect::MarkArea { label } => {
                self.marked.insert(label.clone());
            }
            Effect::UnmarkArea { label } => {
                self.marked.remove(label);
            }
            Effect::SetPower { amount, .. } => self.power = *amount,
            Effect::SetMissionTimer { secs } => self.mission_timer_secs = *secs,
            Effect::DebugPrint { text } => tracing::info!(target: "mission", "{text}"),
            Effect::LoadLevel { .. } | Effect::GameOver { .. } => self.ended = Some(effect.clone()),
            Effect::CenterView { .. }
            | Effect::SetNoGoArea { .. }
            | Effect::SetStructureLimit { .. }
            | Effect::EnableStructure { .. }
            | Effect::MakeComponentAvailable { .. }
            | Effect::SetReinforcementTime { .. } => {}
        }
    }

    fn alloc_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_object_id);
        self.next_object_id += 1;
        id
    }

    fn insert(&mut self, object: ObjectRef, group: Option<GroupId>) {
        self.objects.insert(object.id, SandboxObject { object, group });
    }

    /// Move an object and return its updated snapshot.
    fn move_object(&mut self, id: ObjectId, position: Position) -> Option<ObjectRef> {
        let entry = self.objects.get_mut(&id)?;
        entry.object.position = position;
        Some(entry.object.clone())
    }
}

impl WorldView for SandboxWorld {
    fn resolve_label(&self, label: &LabelId) -> Option<LabelTarget> {
        if let Some(target) = self.labels.get(label) {
            return Some(target.clone());
        }
        self.objects()
            .find(|o| o.label.as_ref() == Some(label))
            .map(|o| LabelTarget::Object {
                object: o.id,
                position: o.position,
            })
    }

    fn count_droids(&self, player: PlayerId, filter: DroidFilter) -> u32 {
        let count = self
            .objects()
            .filter(|o| o.player == player)
            .filter(|o| match o.kind {
                ObjectKind::Droid { droid_type } => filter.matches(droid_type),
                _ => false,
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn count_structures(&self, player: PlayerId, structure: &StructureType) -> u32 {
        let count = self
            .objects()
            .filter(|o| o.player == player)
            .filter(|o| matches!(&o.kind, ObjectKind::Structure { structure: s } if s == structure))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn objects_in_area(&self, area: &Area) -> Vec<ObjectRef> {
        self.objects()
            .filter(|o| area.contains(o.position))
            .cloned()
            .collect()
    }
}
