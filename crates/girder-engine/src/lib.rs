pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod bridge;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::config::WorldConfig;
pub use api::level::{LevelError, LevelLoadError, LevelRecord, LevelReport};
pub use api::types::{
    EntityId, EntityType, GameEvent, Movement, Outcome, PlayerState, PowerUpKind, ShapeKind,
};
pub use api::world::{World, WorldBuilder, WorldStats};
pub use components::entity::{EntityKind, EntityView};
pub use core::physics::{MassKind, PhysicsAdapter};
pub use core::registry::EntityRegistry;
pub use bridge::snapshot::{SnapshotError, WorldSnapshot};
pub use input::keys::{InputError, KeyCode};
pub use systems::collision::{CollisionRuleEngine, CollisionSink};
pub use systems::spawner::Spawner;
