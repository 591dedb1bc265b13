use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::{EntityId, EntityType, PlayerState, PowerUpKind, ShapeKind};
use crate::core::geometry::Footprint;
use crate::core::physics::PhysicsBody;

/// Mutable player data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub state: PlayerState,
    pub lives: u32,
    /// Remaining ticks during which enemy contacts kill the enemy.
    pub invincible_ticks: u32,
    /// Remaining ticks during which enemy contacts are ignored.
    pub grace_ticks: u32,
    /// Where the player reappears after losing a life.
    pub spawn: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkerData {
    /// +1 walks right, -1 walks left.
    pub direction: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollerData {
    pub direction: f32,
    /// Has touched a platform at least once.
    pub landed: bool,
    /// Rolled off a platform and has not landed since; the next landing
    /// flips `direction`.
    pub airborne: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorData {
    /// Ticks between spawns.
    pub period: u32,
    /// Ticks until the next spawn.
    pub countdown: u32,
    /// Initial roll direction of spawned enemies.
    pub direction: f32,
}

/// Type tag plus the per-type state that goes with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Player(PlayerData),
    Platform,
    Ladder,
    WalkingEnemy(WalkerData),
    RollingEnemy(RollerData),
    PowerUp(PowerUpKind),
    EnemyGenerator(GeneratorData),
}

impl EntityKind {
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityKind::Player(_) => EntityType::Player,
            EntityKind::Platform => EntityType::Platform,
            EntityKind::Ladder => EntityType::Ladder,
            EntityKind::WalkingEnemy(_) => EntityType::WalkingEnemy,
            EntityKind::RollingEnemy(_) => EntityType::RollingEnemy,
            EntityKind::PowerUp(_) => EntityType::PowerUp,
            EntityKind::EnemyGenerator(_) => EntityType::EnemyGenerator,
        }
    }
}

/// A logical game object backed by exactly one physics body.
///
/// Entities are created and destroyed only through
/// [`EntityRegistry`](crate::core::registry::EntityRegistry), which keeps the
/// body and the registry entry in step.
#[derive(Debug)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub shape: ShapeKind,
    /// Center in world space, synced from the body after each step.
    pub pos: Vec2,
    /// Full width and height.
    pub size: Vec2,
    /// Rotation in radians.
    pub angle: f32,
    /// Cleared by the rules; the entity is removed at the end of the tick.
    pub alive: bool,
    is_static: bool,
    body: PhysicsBody,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        kind: EntityKind,
        shape: ShapeKind,
        footprint: Footprint,
        is_static: bool,
        body: PhysicsBody,
    ) -> Self {
        Self {
            id,
            kind,
            shape,
            pos: footprint.center,
            size: footprint.size,
            angle: footprint.angle,
            alive: true,
            is_static,
            body,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.kind.entity_type()
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.pos, self.size, self.angle)
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn player(&self) -> Option<&PlayerData> {
        match &self.kind {
            EntityKind::Player(data) => Some(data),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.kind {
            EntityKind::Player(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn body(&self) -> &PhysicsBody {
        &self.body
    }

    pub(crate) fn into_body(self) -> PhysicsBody {
        self.body
    }

    /// Read-only projection for callers outside the simulation.
    pub fn view(&self) -> EntityView {
        EntityView {
            id: self.id,
            entity_type: self.entity_type(),
            kind: self.kind.clone(),
            shape: self.shape,
            pos: self.pos,
            size: self.size,
            angle: self.angle,
            is_static: self.is_static,
        }
    }
}

/// What the outside world sees of an entity. Carries no physics handle.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub id: EntityId,
    pub entity_type: EntityType,
    /// Per-type state (player state, enemy direction, power-up subtype...).
    pub kind: EntityKind,
    pub shape: ShapeKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub angle: f32,
    /// `true` for bodies that never move.
    pub is_static: bool,
}

impl EntityView {
    /// Player state, if this is the player.
    pub fn player_state(&self) -> Option<PlayerState> {
        match &self.kind {
            EntityKind::Player(data) => Some(data.state),
            _ => None,
        }
    }
}
