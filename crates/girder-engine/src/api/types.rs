use serde::{Deserialize, Serialize};

/// Unique identifier for an entity in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// The logical kind of an entity. Fieldless tag; per-type state lives in
/// [`EntityKind`](crate::components::entity::EntityKind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Player,
    Platform,
    Ladder,
    WalkingEnemy,
    RollingEnemy,
    PowerUp,
    EnemyGenerator,
}

impl EntityType {
    pub const ALL: [EntityType; 7] = [
        EntityType::Player,
        EntityType::Platform,
        EntityType::Ladder,
        EntityType::WalkingEnemy,
        EntityType::RollingEnemy,
        EntityType::PowerUp,
        EntityType::EnemyGenerator,
    ];

    pub fn is_enemy(self) -> bool {
        matches!(self, EntityType::WalkingEnemy | EntityType::RollingEnemy)
    }
}

/// Outline of an entity's collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Circle,
}

/// Player movement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Standing,
    Jumping,
    ClimbingUp,
    ClimbingDown,
    Dead,
}

impl PlayerState {
    pub fn is_climbing(self) -> bool {
        matches!(self, PlayerState::ClimbingUp | PlayerState::ClimbingDown)
    }
}

/// Power-up subtypes. A level holds at most one `Goal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerUpKind {
    #[default]
    Goal,
    Bonus,
    Invincibility,
}

/// Commands accepted by [`World::move_player`](crate::World::move_player).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    Jump,
    MoveLeft,
    MoveRight,
    ClimbUp,
    ClimbDown,
}

/// Game outcome. `GameOver` and `PlayerWon` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    IsGoing,
    GameOver,
    PlayerWon,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::IsGoing
    }
}

/// Domain-level classification of a physical contact, queued per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The player lost a life; `by` is the enemy responsible, if any.
    PlayerKilled { by: Option<EntityId> },
    WalkingEnemyKilled { enemy: EntityId },
    RollingEnemyKilled { enemy: EntityId },
    GoalHit { goal: EntityId },
    PowerUpHit { power_up: EntityId },
    InvincibilityHit { power_up: EntityId },
}

impl GameEvent {
    /// Points awarded when the event is applied.
    pub fn points(&self) -> u32 {
        match self {
            GameEvent::WalkingEnemyKilled { .. } => 100,
            GameEvent::RollingEnemyKilled { .. } => 200,
            GameEvent::PowerUpHit { .. } => 300,
            GameEvent::PlayerKilled { .. }
            | GameEvent::GoalHit { .. }
            | GameEvent::InvincibilityHit { .. } => 0,
        }
    }
}
