use super::*;
use crate::test_fixtures::{artifact_crate, structure, CONSTRUCTOR, HUMAN, PLAYER_FACTORY};

/// Launch, destroy every base and collect every artifact. Hostiles stay.
fn complete_objectives(h: &mut Harness) {
    h.enter_launch_area();
    for base in 0..test_fixtures::BASE_COUNT {
        h.destroy_base(base);
    }
    for id in 600..604 {
        h.pick_up(artifact_crate(id));
    }
}

fn pending_resolutions(h: &Harness) -> usize {
    h.state
        .queue
        .pending()
        .iter()
        .filter(|a| matches!(a.action, MissionAction::Resolve(_)))
        .count()
}

#[test]
fn losing_production_schedules_loss_once() {
    let mut h = Harness::new();
    h.world.remove(CONSTRUCTOR);
    h.world.remove(PLAYER_FACTORY);

    h.advance_to(1000);
    assert_eq!(h.state.resolution, Resolution::Pending(Outcome::Lost));
    assert_eq!(pending_resolutions(&h), 1);

    h.advance_to(2500);
    assert_eq!(pending_resolutions(&h), 1);

    assert!(h.advance_to(2999).is_empty());
    assert_eq!(
        h.advance_to(3000),
        vec![Effect::GameOver { won: false }]
    );
    assert_eq!(h.state.resolution, Resolution::Resolved(Outcome::Lost));
}

#[test]
fn any_factory_or_constructor_keeps_player_alive() {
    let mut h = Harness::new();
    h.world.remove(CONSTRUCTOR);
    assert_eq!(evaluate(&h.state, &h.world, &h.content), None);

    h.world.remove(PLAYER_FACTORY);
    h.world.add(structure(9, HUMAN, "A0CyborgFactory", Position::new(0, 2000)));
    assert_eq!(evaluate(&h.state, &h.world, &h.content), None);
}

#[test]
fn gather_counts_world_and_progress() {
    let mut h = Harness::new();
    h.pick_up(artifact_crate(600));
    let check = OutcomeCheck::gather(&h.state, &h.world, &h.content);

    assert_eq!(
        check,
        OutcomeCheck {
            hostile_units: 5,
            hostile_factories: 4,
            player_factories: 1,
            player_constructors: 1,
            artifacts: 1,
            stage: Stage::IDLE,
        }
    );
}

#[test]
fn zero_pickups_with_zero_hostiles_never_wins() {
    let mut h = Harness::new();
    h.enter_launch_area();
    for base in 0..test_fixtures::BASE_COUNT {
        h.destroy_base(base);
    }
    h.world.clear_hostiles();

    h.advance_to(60_000);
    assert_eq!(h.state.resolution, Resolution::Unresolved);
}

#[test]
fn hostiles_remaining_block_win() {
    let mut h = Harness::new();
    complete_objectives(&mut h);

    h.advance_to(30_000);
    assert_eq!(h.state.resolution, Resolution::Unresolved);
}

#[test]
fn stage_short_of_target_blocks_win() {
    let mut h = Harness::new();
    h.enter_launch_area();
    for base in 0..3 {
        h.destroy_base(base);
    }
    for id in 600..604 {
        h.pick_up(artifact_crate(id));
    }
    h.world.clear_hostiles();

    assert_eq!(h.state.stage, Stage(4));
    assert_eq!(evaluate(&h.state, &h.world, &h.content), None);
}

#[test]
fn win_waits_for_delay_then_loads_next_level() {
    let mut h = Harness::new();
    complete_objectives(&mut h);
    h.world.clear_hostiles();

    h.advance_to(1000);
    assert_eq!(h.state.resolution, Resolution::Pending(Outcome::Won));
    assert!(!h
        .advance_to(4999)
        .iter()
        .any(|e| matches!(e, Effect::LoadLevel { .. })));

    let effects = h.advance_to(5000);
    assert!(effects.contains(&Effect::LoadLevel {
        level: LevelId::new("CAM_1B")
    }));
    assert_eq!(h.state.resolution, Resolution::Resolved(Outcome::Won));
}

#[test]
fn loss_takes_precedence_over_win() {
    let mut h = Harness::new();
    complete_objectives(&mut h);
    h.world.clear_hostiles();
    h.world.clear_player(HUMAN);

    assert_eq!(evaluate(&h.state, &h.world, &h.content), Some(Outcome::Lost));
}

#[test]
fn pending_win_is_not_overturned() {
    let mut h = Harness::new();
    complete_objectives(&mut h);
    h.world.clear_hostiles();
    h.advance_to(1000);

    h.world.clear_player(HUMAN);
    let effects = h.advance_to(10_000);
    assert!(effects.contains(&Effect::LoadLevel {
        level: LevelId::new("CAM_1B")
    }));
    assert!(!effects.contains(&Effect::GameOver { won: false }));
}
