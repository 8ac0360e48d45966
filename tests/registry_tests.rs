use seabattle::{
    Command, Coordinate, Event, FinishCause, GameError, MatchConfig, MatchId, MatchRegistry,
    MatchStatus, Orientation, PlacementError, PlayerId, Reply, ShipId,
};

fn players() -> [PlayerId; 2] {
    [PlayerId::from("red"), PlayerId::from("blue")]
}

fn create(registry: &mut MatchRegistry) -> MatchId {
    let out = registry.dispatch(Command::CreateMatch {
        config: MatchConfig::default(),
        players: players(),
    });
    match out.reply {
        Ok(Reply::Created(id)) => id,
        other => panic!("unexpected reply {other:?}"),
    }
}

#[test]
fn create_assigns_increasing_ids() {
    let mut registry = MatchRegistry::seeded(1);
    assert!(registry.is_empty());

    let dup = registry.dispatch(Command::CreateMatch {
        config: MatchConfig::default(),
        players: [PlayerId::from("red"), PlayerId::from("red")],
    });
    assert_eq!(dup.reply, Err(GameError::DuplicatePlayer));
    assert_eq!(dup.match_id, None);
    assert!(dup.state.is_none());

    let first = registry.dispatch(Command::CreateMatch {
        config: MatchConfig::default(),
        players: players(),
    });
    assert_eq!(first.reply, Ok(Reply::Created(MatchId(1))));
    assert_eq!(first.match_id, Some(MatchId(1)));
    assert_eq!(first.state.map(|s| s.status), Some(MatchStatus::Placement));
    assert!(first.events.is_empty());

    assert_eq!(create(&mut registry), MatchId(2));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.ids(), vec![MatchId(1), MatchId(2)]);
}

#[test]
fn unknown_match_is_rejected() {
    let mut registry = MatchRegistry::seeded(1);
    let cmd = Command::FireShot {
        match_id: MatchId(99),
        player: players()[0].clone(),
        target: Coordinate::new(1, 1),
    };
    assert_eq!(cmd.match_id(), Some(MatchId(99)));
    let out = registry.dispatch(cmd);
    assert_eq!(out.reply, Err(GameError::UnknownMatch(MatchId(99))));
    assert!(out.state.is_none());
    assert!(out.events.is_empty());
    assert_eq!(
        registry.mark_ready(MatchId(99), &players()[0]).unwrap_err(),
        GameError::UnknownMatch(MatchId(99))
    );
}

#[test]
fn rejection_events_come_back_with_the_error() {
    let mut registry = MatchRegistry::seeded(1);
    let id = create(&mut registry);
    let red = players()[0].clone();
    let place = |ship, row, col| Command::PlaceShip {
        match_id: id,
        player: red.clone(),
        ship: ShipId(ship),
        anchor: Coordinate::new(row, col),
        orientation: Orientation::Vertical,
    };

    let ok = registry.dispatch(place(0, 1, 1));
    assert!(matches!(ok.reply, Ok(Reply::Board(ref b)) if b.ships.len() == 1));
    assert!(matches!(ok.events.as_slice(), [Event::PlacementAccepted { .. }]));

    let bad = registry.dispatch(place(1, 1, 2));
    assert_eq!(bad.reply, Err(GameError::AdjacencyViolation(ShipId(0))));
    assert_eq!(
        bad.events,
        vec![Event::PlacementRejected {
            player: red.clone(),
            ship: ShipId(1),
            reason: PlacementError::AdjacencyViolation(ShipId(0)),
        }]
    );
    let state = bad.state.unwrap();
    assert_eq!(state.seats[0].board.ships.len(), 1);

    let removed = registry.dispatch(Command::RemoveShip {
        match_id: id,
        player: red.clone(),
        ship: ShipId(0),
    });
    assert!(matches!(removed.reply, Ok(Reply::Board(ref b)) if b.ships.is_empty()));
    assert!(registry.take_events(id).unwrap().is_empty());
}

#[test]
fn full_match_through_dispatch() {
    let mut registry = MatchRegistry::seeded(2024);
    let id = create(&mut registry);
    let [red, blue] = players();

    for p in [&red, &blue] {
        let placed = registry.dispatch(Command::RequestRandomPlacement {
            match_id: id,
            player: p.clone(),
        });
        assert!(matches!(placed.reply, Ok(Reply::Board(ref b)) if b.ships.len() == 10));
        assert_eq!(
            placed.events,
            vec![Event::PlacementComplete { player: p.clone() }]
        );
    }
    registry
        .dispatch(Command::MarkReady {
            match_id: id,
            player: red.clone(),
        })
        .reply
        .unwrap();
    let started = registry.dispatch(Command::MarkReady {
        match_id: id,
        player: blue.clone(),
    });
    match started.reply {
        Ok(Reply::Match(state)) => {
            assert_eq!(state.status, MatchStatus::Battle);
            assert_eq!(state.current_turn, Some(red.clone()));
        }
        other => panic!("unexpected reply {other:?}"),
    }
    assert!(started.events.contains(&Event::BattleStarted {
        first_turn: red.clone()
    }));

    let wrong_turn = registry.dispatch(Command::FireShot {
        match_id: id,
        player: blue.clone(),
        target: Coordinate::new(1, 1),
    });
    assert_eq!(wrong_turn.reply, Err(GameError::NotYourTurn));

    let shot = registry.dispatch(Command::FireShot {
        match_id: id,
        player: red.clone(),
        target: Coordinate::new(1, 1),
    });
    assert!(matches!(shot.reply, Ok(Reply::Shot(ref s)) if s.attacker == red));
    assert!(matches!(shot.events.first(), Some(Event::ShotFired(_))));

    let forfeit = registry.dispatch(Command::Forfeit {
        match_id: id,
        player: red.clone(),
    });
    match forfeit.reply {
        Ok(Reply::Match(state)) => {
            assert_eq!(state.status, MatchStatus::Finished);
            assert_eq!(state.winner, Some(blue.clone()));
            assert_eq!(state.finish_cause, Some(FinishCause::Forfeit));
        }
        other => panic!("unexpected reply {other:?}"),
    }
    assert_eq!(
        registry.forfeit(id, &blue).unwrap_err(),
        GameError::GameNotInProgress
    );

    let done = registry.remove(id).unwrap();
    assert_eq!(done.winner(), Some(&blue));
    assert!(registry.get(id).is_none());
}

#[test]
fn restore_moves_a_match_between_registries() {
    let mut source = MatchRegistry::seeded(3);
    let id = create(&mut source);
    let red = players()[0].clone();
    source.request_random_placement(id, &red).unwrap();
    source.mark_ready(id, &red).unwrap();
    let state = source.get(id).unwrap().state();

    let mut target = MatchRegistry::seeded(4);
    for _ in 0..3 {
        create(&mut target);
    }
    let mut moved = state.clone();
    moved.id = MatchId(10);
    assert_eq!(target.restore(moved), Ok(MatchId(10)));
    assert!(target.get(MatchId(10)).unwrap().is_ready(&red));
    assert_eq!(create(&mut target), MatchId(11));

    assert_eq!(
        target.mark_ready(MatchId(10), &red).unwrap_err(),
        GameError::AlreadyReady
    );
}

#[test]
fn seeded_registries_place_identically() {
    let mut a = MatchRegistry::seeded(77);
    let mut b = MatchRegistry::seeded(77);
    let red = players()[0].clone();
    let ia = create(&mut a);
    let ib = create(&mut b);
    let board_a = a.request_random_placement(ia, &red).unwrap().clone();
    let board_b = b.request_random_placement(ib, &red).unwrap().clone();
    assert_eq!(board_a, board_b);
}
