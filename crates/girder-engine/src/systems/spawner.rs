use glam::Vec2;

use crate::api::config::WorldConfig;
use crate::api::types::{EntityType, ShapeKind};
use crate::components::entity::{EntityKind, GeneratorData, RollerData};
use crate::components::template::EntitySpec;
use crate::core::geometry::Footprint;
use crate::core::registry::EntityRegistry;

/// Add-only view handed to enemy generators.
pub trait Spawner {
    fn spawn(&mut self, spec: EntitySpec);
}

impl Spawner for Vec<EntitySpec> {
    fn spawn(&mut self, spec: EntitySpec) {
        self.push(spec);
    }
}

/// Count one generator down by a tick. Returns the rolling enemy to release
/// when the countdown runs out, and restarts it.
pub fn tick_generator(data: &mut GeneratorData, origin: Vec2, config: &WorldConfig) -> Option<EntitySpec> {
    data.countdown = data.countdown.saturating_sub(1);
    if data.countdown > 0 {
        return None;
    }
    data.countdown = data.period.max(1);

    let diameter = config.roller_radius * 2.0;
    let roller = EntityKind::RollingEnemy(RollerData {
        direction: data.direction,
        landed: false,
        airborne: false,
    });
    Some(
        EntitySpec::new(roller, ShapeKind::Circle, Footprint::new(origin, Vec2::splat(diameter), 0.0))
            .with_velocity(Vec2::new(data.direction * config.roller_speed, 0.0)),
    )
}

/// Advance every generator by one tick, handing produced enemies to `spawner`.
pub fn advance_generators(registry: &mut EntityRegistry, config: &WorldConfig, spawner: &mut dyn Spawner) {
    for generator in registry.of_type_mut(EntityType::EnemyGenerator) {
        let origin = generator.pos;
        if let EntityKind::EnemyGenerator(data) = &mut generator.kind {
            if let Some(spec) = tick_generator(data, origin, config) {
                spawner.spawn(spec);
            }
        }
    }
}
