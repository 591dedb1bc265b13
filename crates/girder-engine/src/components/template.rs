use glam::Vec2;

use crate::api::config::WorldConfig;
use crate::api::types::{EntityType, PlayerState, PowerUpKind, ShapeKind};
use crate::components::entity::{EntityKind, GeneratorData, PlayerData, RollerData, WalkerData};
use crate::core::geometry::Footprint;
use crate::core::physics::{category, BodyDesc, ColliderDesc, ColliderMaterial, CollisionFilter, MassKind};

/// Physical defaults shared by every entity of one type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTemplate {
    pub mass: MassKind,
    pub filter: CollisionFilter,
    pub sensor: bool,
    pub material: ColliderMaterial,
}

const SMOOTH: ColliderMaterial = ColliderMaterial {
    restitution: 0.0,
    friction: 0.0,
    density: 1.0,
};

const ROLLING: ColliderMaterial = ColliderMaterial {
    restitution: 0.0,
    friction: 0.3,
    density: 1.0,
};

/// Body template for each entity type.
pub fn template_for(entity_type: EntityType) -> BodyTemplate {
    use category::*;
    let (mass, filter, sensor, material) = match entity_type {
        EntityType::Player => (
            MassKind::FixedAngular,
            CollisionFilter::new(PLAYER, PLATFORM | LADDER | ENEMY | POWER_UP),
            false,
            SMOOTH,
        ),
        EntityType::Platform => (
            MassKind::Infinite,
            CollisionFilter::new(PLATFORM, PLAYER | ENEMY),
            false,
            SMOOTH,
        ),
        EntityType::Ladder => (
            MassKind::Infinite,
            CollisionFilter::new(LADDER, PLAYER),
            true,
            SMOOTH,
        ),
        EntityType::WalkingEnemy => (
            MassKind::FixedAngular,
            CollisionFilter::new(ENEMY, PLATFORM | PLAYER),
            false,
            SMOOTH,
        ),
        EntityType::RollingEnemy => (
            MassKind::Normal,
            CollisionFilter::new(ENEMY, PLATFORM | PLAYER),
            false,
            ROLLING,
        ),
        EntityType::PowerUp => (
            MassKind::Infinite,
            CollisionFilter::new(POWER_UP, PLAYER),
            true,
            SMOOTH,
        ),
        EntityType::EnemyGenerator => (
            MassKind::Infinite,
            CollisionFilter::new(GENERATOR, NONE),
            true,
            SMOOTH,
        ),
    };
    BodyTemplate { mass, filter, sensor, material }
}

/// Initial per-type state for a freshly created entity.
pub fn initial_kind(
    entity_type: EntityType,
    power_up: PowerUpKind,
    pos: Vec2,
    config: &WorldConfig,
) -> EntityKind {
    match entity_type {
        EntityType::Player => EntityKind::Player(PlayerData {
            state: PlayerState::Standing,
            lives: config.player_lives,
            invincible_ticks: 0,
            grace_ticks: 0,
            spawn: pos,
        }),
        EntityType::Platform => EntityKind::Platform,
        EntityType::Ladder => EntityKind::Ladder,
        EntityType::WalkingEnemy => EntityKind::WalkingEnemy(WalkerData { direction: 1.0 }),
        EntityType::RollingEnemy => EntityKind::RollingEnemy(RollerData {
            direction: 1.0,
            landed: false,
            airborne: false,
        }),
        EntityType::PowerUp => EntityKind::PowerUp(power_up),
        EntityType::EnemyGenerator => EntityKind::EnemyGenerator(GeneratorData {
            period: config.generator_period,
            countdown: config.generator_period,
            // Spawn toward the middle of the world.
            direction: if pos.x > config.world_width * 0.5 { -1.0 } else { 1.0 },
        }),
    }
}

pub fn collider_for(shape: ShapeKind, size: Vec2) -> ColliderDesc {
    match shape {
        ShapeKind::Rectangle => ColliderDesc::Cuboid {
            half_width: size.x * 0.5,
            half_height: size.y * 0.5,
        },
        ShapeKind::Circle => ColliderDesc::Ball { radius: size.x * 0.5 },
    }
}

pub fn shape_of(collider: &ColliderDesc) -> ShapeKind {
    match collider {
        ColliderDesc::Cuboid { .. } => ShapeKind::Rectangle,
        ColliderDesc::Ball { .. } => ShapeKind::Circle,
    }
}

/// A request to create one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpec {
    pub kind: EntityKind,
    pub shape: ShapeKind,
    pub footprint: Footprint,
    pub velocity: Vec2,
}

impl EntitySpec {
    pub fn new(kind: EntityKind, shape: ShapeKind, footprint: Footprint) -> Self {
        Self {
            kind,
            shape,
            footprint,
            velocity: Vec2::ZERO,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Body description from the type's template.
    pub fn body_desc(&self) -> BodyDesc {
        let template = template_for(self.kind.entity_type());
        BodyDesc::new(template.mass, collider_for(self.shape, self.footprint.size))
            .with_position(self.footprint.center)
            .with_rotation(self.footprint.angle)
            .with_velocity(self.velocity)
            .with_filter(template.filter)
            .with_sensor(template.sensor)
            .with_material(template.material)
    }
}
