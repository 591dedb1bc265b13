pub mod collision;
pub mod locomotion;
pub mod spawner;

pub use collision::{CollisionRuleEngine, CollisionSink};
pub use spawner::Spawner;
