use girder_engine::core::geometry::Footprint;
use girder_engine::{
    EntityType, EntityView, LevelRecord, Movement, Outcome, PowerUpKind, ShapeKind, World, WorldBuilder,
    WorldConfig,
};
use proptest::prelude::*;

fn level() -> Vec<LevelRecord> {
    let rect = |t, x, y, w, h| LevelRecord::new(t, ShapeKind::Rectangle, x, y, w, h);
    vec![
        rect(EntityType::Platform, 4.0, 0.5, 8.0, 0.1),
        rect(EntityType::Platform, 2.5, 1.5, 3.0, 0.1),
        rect(EntityType::Ladder, 1.5, 1.05, 0.2, 1.0),
        rect(EntityType::Player, 0.5, 0.8, 0.2, 0.3),
        rect(EntityType::WalkingEnemy, 3.0, 0.65, 0.2, 0.2),
        rect(EntityType::WalkingEnemy, 2.5, 1.65, 0.2, 0.2),
        LevelRecord::new(EntityType::PowerUp, ShapeKind::Circle, 2.0, 0.7, 0.2, 0.2)
            .with_power_up(PowerUpKind::Bonus),
        LevelRecord::new(EntityType::PowerUp, ShapeKind::Circle, 3.5, 1.7, 0.2, 0.2)
            .with_power_up(PowerUpKind::Invincibility),
        rect(EntityType::EnemyGenerator, 3.8, 2.5, 0.3, 0.3),
        rect(EntityType::PowerUp, 7.5, 0.8, 0.3, 0.5),
    ]
}

fn build() -> World {
    let config = WorldConfig {
        generator_period: 25,
        ..WorldConfig::default()
    };
    WorldBuilder::new(config).init_level(&level()).unwrap().0
}

fn footprint(view: &EntityView) -> Footprint {
    Footprint::new(view.pos, view.size, view.angle)
}

fn resting_on_platform(world: &World) -> bool {
    let Some(player) = world.player() else {
        return false;
    };
    let feet = footprint(&player);
    world
        .alive_entities()
        .iter()
        .filter(|e| e.entity_type == EntityType::Platform)
        .any(|p| feet.rests_on(&footprint(p), world.config().edge_tolerance))
}

fn movement() -> impl Strategy<Value = Option<Movement>> {
    prop_oneof![
        2 => Just(None),
        1 => Just(Some(Movement::Jump)),
        2 => Just(Some(Movement::MoveLeft)),
        3 => Just(Some(Movement::MoveRight)),
        1 => Just(Some(Movement::ClimbUp)),
        1 => Just(Some(Movement::ClimbDown)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn entity_accounting_balances(inputs in prop::collection::vec(movement(), 1..400)) {
        let mut world = build();
        for input in inputs {
            if let Some(m) = input {
                world.move_player(m);
            }
            world.update();
            let stats = world.stats();
            prop_assert_eq!(
                world.alive_entities().len() + stats.removed,
                stats.created + stats.spawned
            );
        }
    }

    #[test]
    fn outcome_never_leaves_a_terminal_state(inputs in prop::collection::vec(movement(), 1..400)) {
        let mut world = build();
        let mut terminal: Option<Outcome> = None;
        for input in inputs {
            if let Some(m) = input {
                world.move_player(m);
            }
            world.update();
            match terminal {
                Some(outcome) => prop_assert_eq!(world.outcome(), outcome),
                None if world.outcome() != Outcome::IsGoing => terminal = Some(world.outcome()),
                None => {}
            }
        }
    }

    #[test]
    fn jump_needs_a_platform_underfoot(inputs in prop::collection::vec(movement(), 1..300)) {
        let mut world = build();
        for input in inputs {
            match input {
                Some(Movement::Jump) => {
                    let resting = resting_on_platform(&world);
                    let honored = world.move_player(Movement::Jump);
                    prop_assert!(!honored || resting);
                }
                Some(m) => {
                    world.move_player(m);
                }
                None => {}
            }
            world.update();
        }
    }
}
