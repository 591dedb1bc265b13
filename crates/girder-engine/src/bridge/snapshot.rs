//! Restorable byte form of a [`World`].
//!
//! The snapshot types are plain data, independent of rapier. Field order is
//! the on-disk order: world size, rule payload, then one record per body.

use glam::Vec2;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::{EntityId, EntityType, Outcome};
use crate::api::world::World;
use crate::components::entity::{Entity, EntityKind};
use crate::core::physics::{BodyDesc, ColliderDesc, CollisionFilter, MassKind, PhysicsAdapter};

/// Errors that can occur while encoding, decoding or checking a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// Decodes fine but describes a world that cannot exist.
    #[error("incompatible snapshot: {0}")]
    Incompatible(String),
}

impl SnapshotError {
    /// Whether the bytes are unusable as a save (as opposed to a failure to
    /// produce bytes in the first place).
    pub fn is_incompatible(&self) -> bool {
        matches!(self, SnapshotError::Decode(_) | SnapshotError::Incompatible(_))
    }
}

fn incompatible(msg: impl Into<String>) -> SnapshotError {
    SnapshotError::Incompatible(msg.into())
}

/// World-level state that is not attached to any body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePayload {
    pub score: u32,
    pub tick: u64,
    pub next_id: u32,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeSnapshot {
    Rectangle { width: f32, height: f32 },
    Circle { radius: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSnapshot {
    pub shape: ShapeSnapshot,
    pub category: u32,
    pub mask: u32,
    pub sensor: bool,
}

/// Links a body back to its entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTag {
    pub id: EntityId,
    pub kind: EntityKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub fixtures: Vec<FixtureSnapshot>,
    pub center: Vec2,
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub is_infinite: bool,
    pub is_fixed_angular: bool,
    pub tag: EntityTag,
}

impl BodySnapshot {
    fn capture(entity: &Entity, physics: &PhysicsAdapter) -> Option<Self> {
        let desc = physics.describe_body(entity.body())?;
        let shape = match desc.collider {
            ColliderDesc::Cuboid { half_width, half_height } => ShapeSnapshot::Rectangle {
                width: half_width * 2.0,
                height: half_height * 2.0,
            },
            ColliderDesc::Ball { radius } => ShapeSnapshot::Circle { radius },
        };
        let (is_infinite, is_fixed_angular) = desc.mass.flags();
        Some(Self {
            fixtures: vec![FixtureSnapshot {
                shape,
                category: desc.filter.category,
                mask: desc.filter.mask,
                sensor: desc.sensor,
            }],
            center: desc.position,
            angle: desc.rotation,
            linear_velocity: desc.velocity,
            angular_velocity: desc.angular_velocity,
            is_infinite,
            is_fixed_angular,
            tag: EntityTag {
                id: entity.id,
                kind: entity.kind.clone(),
            },
        })
    }

    /// The body description to recreate this body with. Material and
    /// gravity scale are left at their defaults for the caller to fill in.
    pub fn body_desc(&self) -> Result<BodyDesc, SnapshotError> {
        let id = self.tag.id.0;
        let mass = MassKind::from_flags(self.is_infinite, self.is_fixed_angular)
            .ok_or_else(|| incompatible(format!("body {id}: both infinite and fixed-angular")))?;

        let [fixture] = self.fixtures.as_slice() else {
            return Err(incompatible(format!(
                "body {id}: expected one fixture, found {}",
                self.fixtures.len()
            )));
        };

        let collider = match fixture.shape {
            ShapeSnapshot::Rectangle { width, height } if width > 0.0 && height > 0.0 => ColliderDesc::Cuboid {
                half_width: width * 0.5,
                half_height: height * 0.5,
            },
            ShapeSnapshot::Circle { radius } if radius > 0.0 => ColliderDesc::Ball { radius },
            _ => return Err(incompatible(format!("body {id}: shape has no area"))),
        };

        let numbers = [
            self.center.x,
            self.center.y,
            self.angle,
            self.linear_velocity.x,
            self.linear_velocity.y,
            self.angular_velocity,
        ];
        if numbers.iter().any(|n| !n.is_finite()) {
            return Err(incompatible(format!("body {id}: non-finite state")));
        }

        Ok(BodyDesc::new(mass, collider)
            .with_position(self.center)
            .with_rotation(self.angle)
            .with_velocity(self.linear_velocity)
            .with_angular_velocity(self.angular_velocity)
            .with_filter(CollisionFilter::new(fixture.category, fixture.mask))
            .with_sensor(fixture.sensor))
    }
}

/// Full simulated state of a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub width: f32,
    pub height: f32,
    pub rules: RulePayload,
    pub bodies: Vec<BodySnapshot>,
}

impl WorldSnapshot {
    /// Capture every registered entity with its body.
    pub fn capture(world: &World) -> Self {
        let registry = world.registry();
        let bodies = registry
            .iter()
            .filter_map(|e| BodySnapshot::capture(e, world.physics()))
            .collect();
        let dims = world.dimensions();
        Self {
            width: dims.x,
            height: dims.y,
            rules: RulePayload {
                score: world.score(),
                tick: world.tick(),
                next_id: registry.next_id(),
                outcome: world.outcome(),
            },
            bodies,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serde::encode_to_vec(self, bincode::config::standard())?)
    }

    /// Decode and validate. Trailing bytes are rejected.
    pub fn decode(data: &[u8]) -> Result<Self, SnapshotError> {
        let (snapshot, read): (Self, usize) =
            bincode::serde::decode_from_slice(data, bincode::config::standard())?;
        if read != data.len() {
            return Err(incompatible(format!("{} trailing bytes", data.len() - read)));
        }
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check everything that restoring relies on.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let result = self.check();
        if let Err(err) = &result {
            warn!("rejecting snapshot: {}", err);
        }
        result
    }

    fn check(&self) -> Result<(), SnapshotError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(incompatible("world size is not positive"));
        }

        let mut ids = std::collections::HashSet::new();
        let mut players = 0;
        for body in &self.bodies {
            body.body_desc()?;
            if !ids.insert(body.tag.id) {
                return Err(incompatible(format!("duplicate entity id {}", body.tag.id.0)));
            }
            if body.tag.id.0 == 0 || body.tag.id.0 >= self.rules.next_id {
                return Err(incompatible(format!("entity id {} out of range", body.tag.id.0)));
            }
            if body.tag.kind.entity_type() == EntityType::Player {
                players += 1;
            }
        }

        match (self.rules.outcome, players) {
            (Outcome::IsGoing, 1) => Ok(()),
            (Outcome::IsGoing, n) => Err(incompatible(format!("running world with {n} players"))),
            (_, 0 | 1) => Ok(()),
            (_, n) => Err(incompatible(format!("{n} players"))),
        }
    }
}
