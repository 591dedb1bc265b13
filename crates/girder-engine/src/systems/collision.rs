use std::collections::HashMap;

use glam::Vec2;

use crate::api::types::{EntityId, EntityType, GameEvent, PlayerState, PowerUpKind};
use crate::components::entity::{Entity, EntityKind};
use crate::core::geometry::Footprint;
use crate::core::physics::{Contact, ContactFilter};
use crate::core::registry::EntityRegistry;

/// A contact normal within this cosine of straight down (from the player)
/// counts as landing on top. cos(45°).
const STOMP_COS: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Notify-only view handed to the classifier.
pub trait CollisionSink {
    fn notify(&mut self, event: GameEvent);
}

impl CollisionSink for Vec<GameEvent> {
    fn notify(&mut self, event: GameEvent) {
        self.push(event);
    }
}

// ---------------------------------------------------------------------------
// Pre-step filter
// ---------------------------------------------------------------------------

/// Vertical extent of the ladder the player is on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderSpan {
    pub bottom: f32,
    pub top: f32,
}

impl LadderSpan {
    pub fn of(ladder: &Footprint) -> Self {
        Self {
            bottom: ladder.bottom(),
            top: ladder.top(),
        }
    }

    pub fn mid(&self) -> f32 {
        (self.bottom + self.top) * 0.5
    }

    /// Both halves include the midpoint.
    pub fn in_bottom_half(&self, y: f32) -> bool {
        y <= self.mid()
    }

    pub fn in_top_half(&self, y: f32) -> bool {
        y >= self.mid()
    }
}

/// Whether a player–platform contact point should be dropped before solving.
///
/// Only a climbing player on a ladder passes through platforms. The contact
/// is kept when the player's feet are at the platform's top edge and the
/// player is on the half of the ladder it is heading toward, so the climb
/// ends standing on that platform. The edge test uses the feet, not the
/// contact point: a head poking into the underside yields points inside the
/// platform that can sit within `tolerance` of its top.
pub fn suppress_platform_contact(
    state: PlayerState,
    player_y: f32,
    player_bottom: f32,
    ladder: Option<LadderSpan>,
    point: Vec2,
    platform: &Footprint,
    tolerance: f32,
) -> bool {
    let Some(ladder) = ladder else {
        return false;
    };
    let heading_half = match state {
        PlayerState::ClimbingDown => ladder.in_bottom_half(player_y),
        PlayerState::ClimbingUp => ladder.in_top_half(player_y),
        PlayerState::Standing | PlayerState::Jumping | PlayerState::Dead => return false,
    };
    let at_top_edge = platform
        .top_at(point.x)
        .map(|top| player_bottom >= top - tolerance)
        .unwrap_or(false);
    !(at_top_edge && heading_half)
}

/// Player data captured before a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimbContext {
    pub player: EntityId,
    pub state: PlayerState,
    pub player_y: f32,
    pub player_bottom: f32,
    pub ladder: Option<LadderSpan>,
}

/// [`ContactFilter`] applying [`suppress_platform_contact`] to player–platform
/// pairs. Everything else is kept.
pub struct LadderPassFilter {
    climb: Option<ClimbContext>,
    platforms: HashMap<EntityId, Footprint>,
    tolerance: f32,
}

impl LadderPassFilter {
    pub fn new(climb: Option<ClimbContext>, tolerance: f32) -> Self {
        Self {
            climb,
            platforms: HashMap::new(),
            tolerance,
        }
    }

    pub fn with_platform(mut self, id: EntityId, footprint: Footprint) -> Self {
        self.platforms.insert(id, footprint);
        self
    }
}

impl ContactFilter for LadderPassFilter {
    fn keep_contact(&self, a: EntityId, b: EntityId, point: Vec2) -> bool {
        let Some(climb) = &self.climb else {
            return true;
        };
        let other = if a == climb.player {
            b
        } else if b == climb.player {
            a
        } else {
            return true;
        };
        match self.platforms.get(&other) {
            Some(platform) => !suppress_platform_contact(
                climb.state,
                climb.player_y,
                climb.player_bottom,
                climb.ladder,
                point,
                platform,
                self.tolerance,
            ),
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// CollisionRuleEngine
// ---------------------------------------------------------------------------

/// Turns physical contacts into game events.
#[derive(Debug, Clone)]
pub struct CollisionRuleEngine {
    edge_tolerance: f32,
}

impl CollisionRuleEngine {
    pub fn new(edge_tolerance: f32) -> Self {
        Self { edge_tolerance }
    }

    /// The ladder (if any) whose span the player overlaps.
    pub fn ladder_under(&self, registry: &EntityRegistry, player: &Footprint) -> Option<Footprint> {
        registry
            .of_type(EntityType::Ladder)
            .map(Entity::footprint)
            .find(|ladder| {
                ladder.spans_x(player.center.x) && player.overlaps_y(ladder, self.edge_tolerance)
            })
    }

    /// Build the pre-step filter for the current player state.
    pub fn contact_filter(&self, registry: &EntityRegistry, player: EntityId) -> LadderPassFilter {
        let climb = registry.get(player).and_then(|entity| {
            let data = entity.player()?;
            if !data.state.is_climbing() {
                return None;
            }
            let footprint = entity.footprint();
            Some(ClimbContext {
                player,
                state: data.state,
                player_y: footprint.center.y,
                player_bottom: footprint.bottom(),
                ladder: self.ladder_under(registry, &footprint).map(|l| LadderSpan::of(&l)),
            })
        });

        let mut filter = LadderPassFilter::new(climb, self.edge_tolerance);
        if climb.is_some() {
            for platform in registry.of_type(EntityType::Platform) {
                filter = filter.with_platform(platform.id, platform.footprint());
            }
        }
        filter
    }

    /// Classify the contacts of the last step, in order, into `sink`.
    /// Contacts not involving the player produce nothing.
    pub fn classify(
        &self,
        contacts: &[Contact],
        registry: &EntityRegistry,
        player: EntityId,
        sink: &mut dyn CollisionSink,
    ) {
        let Some(player_data) = registry.get(player).filter(|e| e.alive).and_then(Entity::player) else {
            return;
        };

        for contact in contacts {
            let (other, normal) = if contact.entity_a == player {
                (contact.entity_b, contact.normal)
            } else if contact.entity_b == player {
                (contact.entity_a, -contact.normal)
            } else {
                continue;
            };
            let Some(entity) = registry.get(other).filter(|e| e.alive) else {
                continue;
            };

            match &entity.kind {
                EntityKind::WalkingEnemy(_) | EntityKind::RollingEnemy(_) if !contact.sensor => {
                    let stomped = normal.y <= -STOMP_COS;
                    if player_data.invincible_ticks > 0 || stomped {
                        sink.notify(enemy_killed(entity));
                    } else if player_data.grace_ticks == 0 {
                        sink.notify(GameEvent::PlayerKilled { by: Some(other) });
                    }
                }
                EntityKind::PowerUp(kind) => sink.notify(match kind {
                    PowerUpKind::Goal => GameEvent::GoalHit { goal: other },
                    PowerUpKind::Bonus => GameEvent::PowerUpHit { power_up: other },
                    PowerUpKind::Invincibility => GameEvent::InvincibilityHit { power_up: other },
                }),
                _ => {}
            }
        }
    }
}

fn enemy_killed(entity: &Entity) -> GameEvent {
    match entity.entity_type() {
        EntityType::RollingEnemy => GameEvent::RollingEnemyKilled { enemy: entity.id },
        _ => GameEvent::WalkingEnemyKilled { enemy: entity.id },
    }
}
