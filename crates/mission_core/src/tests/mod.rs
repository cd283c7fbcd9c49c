use super::*;
use crate::test_fixtures::{base_content, human_droid, start, FixtureWorld};

mod collectibles;
mod outcome;
mod setup;

// --- Shared test helpers ------------------------------------------------

struct Harness {
    content: MissionContent,
    world: FixtureWorld,
    state: MissionState,
}

impl Harness {
    fn new() -> Self {
        Self::with_content(base_content())
    }

    fn with_content(content: MissionContent) -> Self {
        let world = FixtureWorld::new();
        let (state, _) = start(&content, &world);
        Self {
            content,
            world,
            state,
        }
    }

    fn event(&mut self, event: WorldEvent) -> Vec<Effect> {
        effects_of(handle_event(
            &mut self.state,
            &self.world,
            &self.content,
            event,
        ))
    }

    fn advance_to(&mut self, now_ms: u64) -> Vec<Effect> {
        effects_of(advance(&mut self.state, &self.world, &self.content, now_ms))
    }

    /// Advance by `delta_ms` past the current clock.
    fn advance_by(&mut self, delta_ms: u64) -> Vec<Effect> {
        let now = self.state.clock.now_ms + delta_ms;
        self.advance_to(now)
    }

    fn enter_launch_area(&mut self) -> Vec<Effect> {
        self.event(WorldEvent::AreaEntered {
            droid: human_droid(),
            area: self.content.launch.area.clone(),
        })
    }

    fn destroy_base(&mut self, index: usize) -> Vec<Effect> {
        self.event(WorldEvent::GroupSizeChanged {
            group: test_fixtures::base_group(index),
            new_size: 0,
        })
    }

    fn sight_scout(&mut self, index: usize) -> Vec<Effect> {
        let seen = self
            .world
            .object(test_fixtures::scout_id(index))
            .cloned()
            .unwrap();
        self.event(WorldEvent::ObjectSeen {
            viewer: human_droid(),
            seen,
        })
    }

    fn pick_up(&mut self, feature: ObjectRef) -> Vec<Effect> {
        self.event(WorldEvent::ItemPickedUp {
            feature,
            droid: human_droid(),
        })
    }

    fn chat(&mut self, text: &str) -> Vec<Effect> {
        let human = self.content.players.human;
        self.event(WorldEvent::ChatReceived {
            from: human,
            to: human,
            text: text.to_string(),
        })
    }
}

fn effects_of(envelopes: Vec<EffectEnvelope>) -> Vec<Effect> {
    envelopes.into_iter().map(|envelope| envelope.effect).collect()
}

fn messages_added(effects: &[Effect]) -> Vec<MessageId> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::AddMessage { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

fn messages_removed(effects: &[Effect]) -> Vec<MessageId> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::RemoveMessage { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

fn sounds(effects: &[Effect]) -> Vec<SoundId> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::PlaySound { sound, .. } => Some(sound.clone()),
            _ => None,
        })
        .collect()
}

fn researched(effects: &[Effect]) -> Vec<TechId> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::EnableResearch { tech, .. } => Some(tech.clone()),
            _ => None,
        })
        .collect()
}

fn base_message(index: usize) -> MessageId {
    MessageId(format!("C1A_BASE{index}"))
}
