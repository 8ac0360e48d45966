#![cfg(feature = "serde")]

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use seabattle::{
    codec, Coordinate, FleetSpec, GameError, Match, MatchConfig, MatchId, MatchState, MatchStatus,
    Orientation, PlacementError, PlayerId, ShipClass, ShipId, ShipState, StateError,
};

fn players() -> [PlayerId; 2] {
    [PlayerId::from("north"), PlayerId::from("south")]
}

/// A battle with a random number of shots already fired.
fn battle_in_progress(rng: &mut SmallRng) -> Match {
    let mut m = Match::new(MatchId(3), MatchConfig::default(), players()).unwrap();
    for p in &players() {
        m.random_placement(p, rng).unwrap();
        m.mark_ready(p).unwrap();
    }
    let shots = rng.random_range(0..60);
    for _ in 0..shots {
        let attacker = m.current_turn().cloned().unwrap();
        let defender = m.opponent_of(&attacker).cloned().unwrap();
        let target = *m
            .board(&defender)
            .unwrap()
            .unfired_cells()
            .choose(rng)
            .unwrap();
        m.fire_shot(&attacker, target).unwrap();
        if m.status() != MatchStatus::Battle {
            break;
        }
    }
    m.take_events();
    m
}

fn roundtrip(state: &MatchState) -> MatchState {
    let bytes = codec::encode(state).unwrap();
    codec::decode(&bytes).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn match_state_roundtrip(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let m = battle_in_progress(&mut rng);
        let decoded = roundtrip(&m.state());
        prop_assert_eq!(&decoded, &m.state());
        let restored = Match::from_state(decoded).unwrap();
        prop_assert_eq!(restored, m);
    }

    #[test]
    fn restored_match_behaves_identically(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut original = battle_in_progress(&mut rng);
        prop_assume!(original.status() == MatchStatus::Battle);
        let mut restored = Match::from_state(roundtrip(&original.state())).unwrap();

        for _ in 0..10 {
            if original.status() != MatchStatus::Battle {
                break;
            }
            let attacker = original.current_turn().cloned().unwrap();
            let defender = original.opponent_of(&attacker).cloned().unwrap();
            let target = *original
                .board(&defender)
                .unwrap()
                .unfired_cells()
                .choose(&mut rng)
                .unwrap();
            let a = original.fire_shot(&attacker, target);
            let b = restored.fire_shot(&attacker, target);
            prop_assert_eq!(a, b);
            prop_assert_eq!(
                original.fire_shot(&attacker, target),
                restored.fire_shot(&attacker, target)
            );
        }
        prop_assert_eq!(original.state(), restored.state());
        prop_assert_eq!(original.take_events(), restored.take_events());
    }
}

#[test]
fn json_state_is_readable_too() {
    let mut rng = SmallRng::seed_from_u64(11);
    let m = battle_in_progress(&mut rng);
    let text = serde_json::to_string(&m.state()).unwrap();
    let state: MatchState = serde_json::from_str(&text).unwrap();
    assert_eq!(Match::from_state(state).unwrap(), m);
}

#[test]
fn garbage_bytes_do_not_decode() {
    assert!(codec::decode(&[0xff, 0x01]).is_err());
}

fn placement_state(buffer_rule: bool) -> MatchState {
    let config = MatchConfig::new(
        5,
        FleetSpec::new(vec![ShipClass::new(2, 1), ShipClass::new(1, 1)]),
    )
    .with_buffer_rule(buffer_rule);
    let mut state = Match::new(MatchId(9), config, players()).unwrap().state();
    state.seats[0].board.ships = vec![
        ShipState {
            id: ShipId(0),
            orientation: Orientation::Horizontal,
            cells: vec![Coordinate::new(1, 1), Coordinate::new(1, 2)],
        },
        ShipState {
            id: ShipId(1),
            orientation: Orientation::Horizontal,
            cells: vec![Coordinate::new(2, 3)],
        },
    ];
    state
}

#[test]
fn buffer_rule_is_checked_on_restore() {
    let err = Match::from_state(placement_state(true)).unwrap_err();
    assert!(matches!(
        err,
        GameError::InvalidState(StateError::IllegalPlacement {
            reason: PlacementError::AdjacencyViolation(_),
            ..
        })
    ));
    let relaxed = Match::from_state(placement_state(false)).unwrap();
    assert!(relaxed.is_fleet_complete(&players()[0]));
}

#[test]
fn fleet_mismatch_is_rejected() {
    let mut state = placement_state(false);
    state.seats[0].board.ships[1].id = ShipId(5);
    assert_eq!(
        Match::from_state(state).unwrap_err(),
        GameError::InvalidState(StateError::FleetMismatch(ShipId(5)))
    );
}

#[test]
fn corrupt_battle_states_are_rejected() {
    let mut rng = SmallRng::seed_from_u64(5);
    let good = battle_in_progress(&mut SmallRng::seed_from_u64(5)).state();
    assert_eq!(good.status, MatchStatus::Battle);

    let mut phantom_hit = good.clone();
    let defender = seabattle::Board::try_from(good.seats[1].board.clone()).unwrap();
    let empties: Vec<Coordinate> = defender
        .unfired_cells()
        .into_iter()
        .filter(|c| !defender.is_occupied(*c))
        .collect();
    let empty = *empties.choose(&mut rng).unwrap();
    phantom_hit.seats[1].board.hits.push(empty);
    assert_eq!(
        Match::from_state(phantom_hit).unwrap_err(),
        GameError::InvalidState(StateError::HitOnEmptyCell(empty))
    );

    let mut no_turn = good.clone();
    no_turn.current_turn = None;
    assert!(matches!(
        Match::from_state(no_turn),
        Err(GameError::InvalidState(StateError::Inconsistent(_)))
    ));

    let mut early_winner = good.clone();
    early_winner.winner = Some(players()[0].clone());
    assert!(matches!(
        Match::from_state(early_winner),
        Err(GameError::InvalidState(StateError::Inconsistent(_)))
    ));

    let mut stranger = good.clone();
    stranger.current_turn = Some(PlayerId::from("east"));
    assert_eq!(
        Match::from_state(stranger).unwrap_err(),
        GameError::UnknownPlayer(PlayerId::from("east"))
    );

    let mut resized = good.clone();
    resized.seats[0].board.size = 9;
    assert_eq!(
        Match::from_state(resized).unwrap_err(),
        GameError::InvalidState(StateError::BoardSizeMismatch {
            expected: 10,
            found: 9,
        })
    );

    let mut finished_without_turn = good.clone();
    finished_without_turn.status = MatchStatus::Finished;
    finished_without_turn.winner = Some(players()[0].clone());
    finished_without_turn.finish_cause = Some(seabattle::FinishCause::Forfeit);
    Match::from_state(finished_without_turn.clone()).unwrap();
    finished_without_turn.current_turn = None;
    assert!(matches!(
        Match::from_state(finished_without_turn),
        Err(GameError::InvalidState(StateError::Inconsistent(_)))
    ));

    let mut back_to_placement = good;
    back_to_placement.status = MatchStatus::Placement;
    back_to_placement.current_turn = None;
    assert!(Match::from_state(back_to_placement).is_err());
}

#[test]
fn finished_by_fleet_needs_a_destroyed_fleet() {
    let mut state = placement_state(true);
    state.seats[0].board.ships[1].cells = vec![Coordinate::new(3, 3)];
    let m = Match::from_state(state.clone()).unwrap();
    assert_eq!(m.status(), MatchStatus::Placement);

    state.status = MatchStatus::Finished;
    state.winner = Some(players()[1].clone());
    state.finish_cause = Some(seabattle::FinishCause::FleetDestroyed);
    assert!(matches!(
        Match::from_state(state.clone()),
        Err(GameError::InvalidState(StateError::Inconsistent(_)))
    ));

    state.finish_cause = Some(seabattle::FinishCause::Forfeit);
    let mut turn_without_battle = state.clone();
    turn_without_battle.current_turn = Some(players()[0].clone());
    assert!(matches!(
        Match::from_state(turn_without_battle),
        Err(GameError::InvalidState(StateError::Inconsistent(_)))
    ));
    let forfeited = Match::from_state(state).unwrap();
    assert_eq!(forfeited.winner(), Some(&players()[1]));
}
