use girder_engine::{
    EntityType, LevelRecord, Movement, PowerUpKind, ShapeKind, SnapshotError, World, WorldBuilder,
    WorldSnapshot,
};

fn level() -> Vec<LevelRecord> {
    vec![
        LevelRecord::new(EntityType::Platform, ShapeKind::Rectangle, 4.0, 0.5, 8.0, 0.1),
        LevelRecord::new(EntityType::Platform, ShapeKind::Rectangle, 5.0, 2.0, 3.0, 0.1).with_angle(0.1),
        LevelRecord::new(EntityType::Ladder, ShapeKind::Rectangle, 6.0, 1.25, 0.2, 1.4),
        LevelRecord::new(EntityType::Player, ShapeKind::Rectangle, 1.0, 3.0, 0.2, 0.3),
        LevelRecord::new(EntityType::WalkingEnemy, ShapeKind::Rectangle, 3.0, 0.65, 0.2, 0.2),
        LevelRecord::new(EntityType::PowerUp, ShapeKind::Circle, 7.5, 0.7, 0.2, 0.2)
            .with_power_up(PowerUpKind::Bonus),
        LevelRecord::new(EntityType::EnemyGenerator, ShapeKind::Rectangle, 7.5, 4.0, 0.3, 0.3),
    ]
}

fn build() -> World {
    WorldBuilder::default().init_level(&level()).unwrap().0
}

fn round_trip(world: &World) -> World {
    let bytes = world.snapshot().encode().unwrap();
    let snapshot = WorldSnapshot::decode(&bytes).unwrap();
    WorldBuilder::default().restore(&snapshot).unwrap()
}

#[test]
fn restore_preserves_every_alive_entity() {
    let mut original = build();
    for _ in 0..15 {
        original.update();
    }
    let restored = round_trip(&original);

    assert_eq!(restored.dimensions(), original.dimensions());
    assert_eq!(restored.score(), original.score());
    assert_eq!(restored.outcome(), original.outcome());
    assert_eq!(restored.player_lives(), original.player_lives());

    let mut before = original.alive_entities();
    let mut after = restored.alive_entities();
    before.sort_by_key(|e| e.id);
    after.sort_by_key(|e| e.id);
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.entity_type, b.entity_type);
        assert_eq!(a.shape, b.shape);
        assert_eq!(a.kind, b.kind);
        assert!((a.pos - b.pos).length() < 1e-5, "{:?} vs {:?}", a, b);
        assert!((a.angle - b.angle).abs() < 1e-5, "{:?} vs {:?}", a, b);
        assert!((a.size - b.size).length() < 1e-5, "{:?} vs {:?}", a, b);
    }
}

#[test]
fn restored_world_follows_the_same_trajectory() {
    let mut original = build();
    for _ in 0..10 {
        original.update();
    }
    let mut restored = round_trip(&original);
    let player = original.player_id();
    assert_eq!(restored.player_id(), player);

    for _ in 0..40 {
        original.move_player(Movement::MoveRight);
        restored.move_player(Movement::MoveRight);
        original.update();
        restored.update();

        let a = original.player().unwrap().pos;
        let b = restored.player().unwrap().pos;
        assert!((a - b).length() < 1e-2, "diverged: {a} vs {b}");
    }
}

#[test]
fn new_entities_after_restore_get_fresh_ids() {
    let mut original = build();
    for _ in 0..5 {
        original.update();
    }
    let mut restored = round_trip(&original);
    let highest = restored.alive_entities().iter().map(|e| e.id).max().unwrap();

    // The generator keeps producing rollers after the restore.
    let mut spawned = Vec::new();
    for _ in 0..400 {
        restored.update();
        spawned.extend(
            restored
                .alive_entities()
                .into_iter()
                .filter(|e| e.entity_type == EntityType::RollingEnemy)
                .map(|e| e.id),
        );
        if !spawned.is_empty() {
            break;
        }
    }
    assert!(!spawned.is_empty());
    assert!(spawned.iter().all(|id| *id > highest));
}

#[test]
fn corrupt_bytes_are_incompatible() {
    let world = build();
    let mut bytes = world.snapshot().encode().unwrap();
    bytes.truncate(bytes.len() - 3);
    let err = WorldSnapshot::decode(&bytes).unwrap_err();
    assert!(err.is_incompatible());

    let mut snapshot = world.snapshot();
    snapshot.bodies[0].is_infinite = true;
    snapshot.bodies[0].is_fixed_angular = true;
    let result = WorldBuilder::default().restore(&snapshot);
    assert!(matches!(result, Err(SnapshotError::Incompatible(_))));
}
