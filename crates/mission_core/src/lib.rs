//! `mission_core`: campaign mission progression engine.
//!
//! No IO. The host resolves labels and answers population queries through
//! [`WorldView`], delivers world events through [`handle_event`] and moves the
//! mission clock forward through [`advance`]. Every entry point returns the
//! effects the host must apply, in order.

mod collectibles;
mod dispatch;
mod engine;
mod error;
mod outcome;
pub mod queue;
mod setup;
mod stage;
#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;
mod types;
mod world;

pub use dispatch::{handle_event, CheatCommand};
pub use engine::advance;
pub use error::SetupError;
pub use outcome::{evaluate, OutcomeCheck};
pub use setup::start_mission;
pub use types::*;
pub use world::WorldView;

pub(crate) fn emit(counters: &mut Counters, time_ms: u64, effect: Effect) -> EffectEnvelope {
    let id = EffectId(format!("eff_{:06}", counters.next_effect_id));
    counters.next_effect_id += 1;
    EffectEnvelope {
        id,
        time_ms,
        effect,
    }
}

#[cfg(test)]
mod tests;
