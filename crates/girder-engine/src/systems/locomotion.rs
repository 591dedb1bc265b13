use glam::Vec2;

use crate::api::config::WorldConfig;
use crate::api::types::EntityType;
use crate::components::entity::{EntityKind, RollerData, WalkerData};
use crate::core::geometry::Footprint;
use crate::core::physics::PhysicsAdapter;
use crate::core::registry::EntityRegistry;

/// How far past its leading edge a walker looks for ground or walls.
const LOOKAHEAD: f32 = 0.02;

/// Whether a walker at `body` moving along `direction` has to turn around.
pub fn walker_must_turn(body: &Footprint, direction: f32, platforms: &[Footprint], world_width: f32, tolerance: f32) -> bool {
    if (direction < 0.0 && body.left() <= 0.0) || (direction > 0.0 && body.right() >= world_width) {
        return true;
    }
    let ahead_x = body.center.x + direction * (body.size.x * 0.5 + LOOKAHEAD);

    let blocked = platforms.iter().any(|p| {
        p.spans_x(ahead_x) && p.bottom() < body.top() - tolerance && p.top() > body.bottom() + tolerance
    });
    if blocked {
        return true;
    }

    // Only turn at a platform end while actually standing on it.
    match platforms.iter().find(|p| body.rests_on(p, tolerance)) {
        Some(ground) => !ground.spans_x(ahead_x),
        None => false,
    }
}

fn steer_walker(data: &mut WalkerData, body: &Footprint, platforms: &[Footprint], world_width: f32, tolerance: f32) {
    if walker_must_turn(body, data.direction, platforms, world_width, tolerance) {
        data.direction = -data.direction;
    }
}

fn steer_roller(data: &mut RollerData, body: &Footprint, platforms: &[Footprint], tolerance: f32) {
    let resting = platforms.iter().any(|p| body.rests_on(p, tolerance));
    match (resting, data.landed, data.airborne) {
        (true, false, _) => data.landed = true,
        (true, true, true) => {
            data.direction = -data.direction;
            data.airborne = false;
        }
        (false, true, false) => data.airborne = true,
        _ => {}
    }
}

/// Set the horizontal velocity of every enemy for the coming step, turning
/// walkers around at obstacles and rollers around after a fall. The world
/// edge is the adapter's bounds, which a restored world takes from its save.
pub fn drive_enemies(registry: &mut EntityRegistry, physics: &mut PhysicsAdapter, config: &WorldConfig) {
    let world_width = physics.bounds().x;
    let platforms: Vec<Footprint> = registry
        .of_type(EntityType::Platform)
        .map(|p| p.footprint())
        .collect();

    for entity_type in [EntityType::WalkingEnemy, EntityType::RollingEnemy] {
        for entity in registry.of_type_mut(entity_type) {
            if !entity.alive {
                continue;
            }
            let footprint = entity.footprint();
            let speed = match &mut entity.kind {
                EntityKind::WalkingEnemy(data) => {
                    steer_walker(data, &footprint, &platforms, world_width, config.edge_tolerance);
                    data.direction * config.walker_speed
                }
                EntityKind::RollingEnemy(data) => {
                    steer_roller(data, &footprint, &platforms, config.edge_tolerance);
                    data.direction * config.roller_speed
                }
                _ => continue,
            };
            let vel = physics.velocity(entity.body());
            physics.set_velocity(entity.body(), Vec2::new(speed, vel.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f32 = 0.03;

    fn ground() -> Footprint {
        Footprint::new(Vec2::new(2.0, 0.5), Vec2::new(2.0, 0.1), 0.0)
    }

    fn walker_at(x: f32) -> Footprint {
        Footprint::new(Vec2::new(x, 0.65), Vec2::new(0.2, 0.2), 0.0)
    }

    #[test]
    fn walker_keeps_going_mid_platform() {
        assert!(!walker_must_turn(&walker_at(2.0), 1.0, &[ground()], 8.0, TOL));
    }

    #[test]
    fn walker_turns_at_platform_end() {
        assert!(walker_must_turn(&walker_at(2.95), 1.0, &[ground()], 8.0, TOL));
        assert!(!walker_must_turn(&walker_at(2.95), -1.0, &[ground()], 8.0, TOL));
    }

    #[test]
    fn walker_turns_at_world_edge() {
        let wide = Footprint::new(Vec2::new(4.0, 0.5), Vec2::new(8.0, 0.1), 0.0);
        assert!(walker_must_turn(&walker_at(7.9), 1.0, &[wide], 8.0, TOL));
        assert!(walker_must_turn(&walker_at(0.1), -1.0, &[wide], 8.0, TOL));
    }

    #[test]
    fn walker_turns_at_wall() {
        let wall = Footprint::new(Vec2::new(2.25, 1.0), Vec2::new(0.1, 1.0), 0.0);
        assert!(walker_must_turn(&walker_at(2.1), 1.0, &[ground(), wall], 8.0, TOL));
    }

    #[test]
    fn falling_walker_does_not_turn() {
        let falling = Footprint::new(Vec2::new(5.0, 2.0), Vec2::new(0.2, 0.2), 0.0);
        assert!(!walker_must_turn(&falling, 1.0, &[ground()], 8.0, TOL));
    }

    #[test]
    fn walkers_turn_at_the_adapter_bounds() {
        use crate::api::types::{PowerUpKind, ShapeKind};
        use crate::components::template::{initial_kind, EntitySpec};

        // Config says 8 wide; the world itself is 4 wide.
        let config = WorldConfig::default();
        let mut physics = PhysicsAdapter::new(config.gravity, config.fixed_dt, Vec2::new(4.0, 4.5));
        let mut registry = EntityRegistry::new();
        let floor = Footprint::new(Vec2::new(4.0, 0.5), Vec2::new(8.0, 0.1), 0.0);
        let floor_kind = initial_kind(EntityType::Platform, PowerUpKind::Goal, floor.center, &config);
        registry.insert(&mut physics, EntitySpec::new(floor_kind, ShapeKind::Rectangle, floor));
        let pos = Vec2::new(3.95, 0.65);
        let mut kind = initial_kind(EntityType::WalkingEnemy, PowerUpKind::Goal, pos, &config);
        if let EntityKind::WalkingEnemy(data) = &mut kind {
            data.direction = 1.0;
        }
        let walker = registry.insert(
            &mut physics,
            EntitySpec::new(kind, ShapeKind::Rectangle, Footprint::new(pos, Vec2::splat(0.2), 0.0)),
        );

        drive_enemies(&mut registry, &mut physics, &config);
        let entity = registry.get(walker).unwrap();
        assert!(matches!(&entity.kind, EntityKind::WalkingEnemy(d) if d.direction < 0.0));
        assert!(physics.velocity(entity.body()).x < 0.0);
    }

    #[test]
    fn roller_flips_only_after_falling_off() {
        let mut data = RollerData { direction: -1.0, landed: false, airborne: false };
        let on_ground = Footprint::new(Vec2::new(2.0, 0.65), Vec2::splat(0.2), 0.0);
        let in_air = Footprint::new(Vec2::new(0.5, 0.4), Vec2::splat(0.2), 0.0);
        let platforms = [ground()];

        // Dropped from a generator: first landing keeps direction.
        steer_roller(&mut data, &in_air, &platforms, TOL);
        steer_roller(&mut data, &on_ground, &platforms, TOL);
        assert_eq!(data.direction, -1.0);
        assert!(data.landed);

        // Rolls off, lands again: reversed.
        steer_roller(&mut data, &in_air, &platforms, TOL);
        assert!(data.airborne);
        steer_roller(&mut data, &on_ground, &platforms, TOL);
        assert_eq!(data.direction, 1.0);
        assert!(!data.airborne);
    }
}
