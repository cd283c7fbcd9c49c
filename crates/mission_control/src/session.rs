use mission_content::MapDef;
use mission_core::{
    advance, handle_event, start_mission, EffectEnvelope, MissionContent, MissionState, Outcome,
    Resolution, SetupError, WorldEvent,
};
use serde::Serialize;

use crate::{EventSource, SandboxWorld};

/// Summary of a finished (or abandoned) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// `None` when the time limit ran out first.
    pub outcome: Option<Outcome>,
    pub ended_ms: Option<u64>,
    pub stage: u8,
    pub artifacts: u32,
    pub effects_emitted: usize,
    pub ticks: u64,
}

/// One mission running against a sandbox world.
pub struct Session {
    pub content: MissionContent,
    pub world: SandboxWorld,
    pub state: MissionState,
    /// Every effect emitted so far, in order.
    pub log: Vec<EffectEnvelope>,
}

impl Session {
    pub fn start(content: MissionContent, map: &MapDef) -> Result<Self, SetupError> {
        let mut world = SandboxWorld::from_map(&content, map);
        let (state, effects) = start_mission(&world, &content, 0)?;
        world.apply_effects(&effects);
        tracing::info!(
            mission = %content.mission,
            effects = effects.len(),
            "mission started"
        );
        Ok(Self {
            content,
            world,
            state,
            log: effects,
        })
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state.resolution, Resolution::Resolved(_))
    }

    /// Deliver world events to the mission and apply what comes back.
    pub fn handle(&mut self, events: Vec<WorldEvent>) {
        for event in events {
            let effects = handle_event(&mut self.state, &self.world, &self.content, event);
            self.record(effects);
        }
    }

    /// Advance the clock to `now_ms`, then let `source` act.
    pub fn step(&mut self, source: &mut impl EventSource, now_ms: u64) {
        let effects = advance(&mut self.state, &self.world, &self.content, now_ms);
        self.record(effects);
        if self.is_resolved() {
            return;
        }
        let actions = source.next_actions(now_ms, &self.state, &self.content, &self.world);
        for action in actions {
            tracing::debug!(now_ms, ?action, "player action");
            let events = self.world.perform(&action);
            self.handle(events);
        }
    }

    /// Step every `step_ms` until the mission resolves or `max_ms` passes.
    pub fn run(&mut self, source: &mut impl EventSource, step_ms: u64, max_ms: u64) -> RunReport {
        self.run_with(source, step_ms, max_ms, |_| {})
    }

    /// [`Session::run`], handing `on_step` the effects each step emitted.
    pub fn run_with(
        &mut self,
        source: &mut impl EventSource,
        step_ms: u64,
        max_ms: u64,
        mut on_step: impl FnMut(&[EffectEnvelope]),
    ) -> RunReport {
        let step_ms = step_ms.max(1);
        let mut now = self.state.clock.now_ms;
        while !self.is_resolved() && now < max_ms {
            now = (now + step_ms).min(max_ms);
            let seen = self.log.len();
            self.step(source, now);
            on_step(&self.log[seen..]);
        }
        let report = self.report();
        tracing::info!(
            outcome = ?report.outcome,
            stage = report.stage,
            artifacts = report.artifacts,
            "run finished"
        );
        report
    }

    pub fn report(&self) -> RunReport {
        let outcome = match self.state.resolution {
            Resolution::Resolved(outcome) => Some(outcome),
            Resolution::Unresolved | Resolution::Pending(_) => None,
        };
        RunReport {
            outcome,
            ended_ms: outcome.map(|_| self.state.clock.now_ms),
            stage: self.state.stage.0,
            artifacts: self.state.artifacts.count,
            effects_emitted: self.log.len(),
            ticks: self.state.clock.ticks,
        }
    }

    fn record(&mut self, effects: Vec<EffectEnvelope>) {
        self.world.apply_effects(&effects);
        self.log.extend(effects);
    }
}
