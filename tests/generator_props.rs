use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use seabattle::{
    Board, FleetSpec, GameError, MatchConfig, PlacementValidator, RandomPlacementGenerator,
    ShipClass, ShipPlacement,
};

fn assert_legal(board: &Board, fleet: &FleetSpec, buffer_rule: bool) {
    assert_eq!(board.occupied_cells(), fleet.total_cells());
    assert_eq!(board.ship_count(), fleet.ship_count());
    let validator = PlacementValidator::new(buffer_rule);
    for ship in board.ships() {
        assert_eq!(fleet.size_of(ship.id()), Some(ship.size()));
        let proposal = ShipPlacement::new(ship.id(), ship.size(), ship.anchor(), ship.orientation());
        assert!(validator.validate(board, &proposal).is_ok(), "{ship} is illegal");
    }
    if buffer_rule {
        let ships: Vec<_> = board.ships().collect();
        for (i, a) in ships.iter().enumerate() {
            for b in &ships[i + 1..] {
                assert!(!a.touches(b), "{a} touches {b}");
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn reference_fleet_always_fits(seed in any::<u64>()) {
        let config = MatchConfig::default();
        let mut rng = SmallRng::seed_from_u64(seed);
        let board = config
            .generator()
            .generate(&config.fleet, config.board_size, &mut rng)
            .unwrap();
        assert_legal(&board, &config.fleet, true);
    }

    #[test]
    fn same_seed_same_layout(seed in any::<u64>()) {
        let config = MatchConfig::default();
        let a = config
            .generator()
            .generate(&config.fleet, 10, &mut SmallRng::seed_from_u64(seed))
            .unwrap();
        let b = config
            .generator()
            .generate(&config.fleet, 10, &mut SmallRng::seed_from_u64(seed))
            .unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn dense_fleet_without_buffer(seed in any::<u64>()) {
        let fleet = FleetSpec::new(vec![ShipClass::new(3, 3)]);
        let generator = RandomPlacementGenerator::default().with_buffer_rule(false);
        let mut rng = SmallRng::seed_from_u64(seed);
        let board = generator.generate(&fleet, 3, &mut rng).unwrap();
        assert_legal(&board, &fleet, false);
        prop_assert_eq!(board.unfired_cells().len(), 9);
    }
}

#[test]
fn impossible_fleet_fails_after_resets() {
    // at most two full lines of a 3x3 board can be kept apart
    let fleet = FleetSpec::new(vec![ShipClass::new(3, 3)]);
    let generator = RandomPlacementGenerator::new(50, 3);
    let mut rng = SmallRng::seed_from_u64(7);
    assert_eq!(
        generator.generate(&fleet, 3, &mut rng),
        Err(GameError::PlacementInfeasible { resets: 3 })
    );
    assert!(generator.generate_once(&fleet, 3, &mut rng).is_err());
}

#[test]
fn larger_board_custom_fleet() {
    let fleet = FleetSpec::new(vec![
        ShipClass::named(5, 1, "Carrier"),
        ShipClass::new(4, 2),
        ShipClass::new(3, 3),
        ShipClass::new(2, 4),
    ]);
    fleet.validate(15, true).unwrap();
    let generator = MatchConfig::new(15, fleet.clone()).generator();
    for seed in 0..20 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let board = generator.generate(&fleet, 15, &mut rng).unwrap();
        assert_legal(&board, &fleet, true);
    }
}
