use glam::Vec2;
use log::{debug, info, warn};

use crate::api::config::WorldConfig;
use crate::api::level::{LevelError, LevelLoadError, LevelRecord, LevelReport};
use crate::api::types::{EntityId, EntityType, GameEvent, Movement, Outcome, PlayerState, PowerUpKind};
use crate::bridge::snapshot::{SnapshotError, WorldSnapshot};
use crate::components::entity::{Entity, EntityKind, EntityView};
use crate::components::template::{initial_kind, template_for, EntitySpec};
use crate::core::geometry::Footprint;
use crate::core::physics::PhysicsAdapter;
use crate::core::registry::EntityRegistry;
use crate::systems::collision::CollisionRuleEngine;
use crate::systems::locomotion;
use crate::systems::spawner;

/// Upward speed below which a jumping player touching a platform has landed.
const LANDING_SPEED: f32 = 0.1;

/// Lifetime entity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Entities created from the level or the snapshot.
    pub created: usize,
    /// Entities released by generators.
    pub spawned: usize,
    /// Entities purged after dying.
    pub removed: usize,
}

/// One-shot construction path for a [`World`]. Consumed by whichever of
/// [`init_level`](Self::init_level) or [`restore`](Self::restore) is called,
/// so each builder produces at most one world and one physics adapter.
#[derive(Debug, Clone, Default)]
pub struct WorldBuilder {
    config: WorldConfig,
}

impl WorldBuilder {
    pub fn new(config: WorldConfig) -> Self {
        Self { config }
    }

    /// Build a world from an ordered list of level records.
    ///
    /// Malformed records are skipped and reported. The first player wins;
    /// a level without any player is rejected.
    pub fn init_level(self, records: &[LevelRecord]) -> Result<(World, LevelReport), LevelError> {
        let dimensions = self.config.dimensions();
        let mut world = World::empty(self.config, dimensions, EntityRegistry::new());
        let mut report = LevelReport::default();
        let mut player = None;
        let mut goal_placed = false;

        for (index, record) in records.iter().enumerate() {
            let checked = record.validate(index).and_then(|()| {
                if record.entity_type == EntityType::Player && player.is_some() {
                    Err(LevelLoadError::ExtraPlayer { index })
                } else if record.is_goal() && goal_placed {
                    Err(LevelLoadError::ExtraGoal { index })
                } else {
                    Ok(())
                }
            });
            if let Err(err) = checked {
                warn!("level: skipping {}", err);
                report.skipped.push(err);
                continue;
            }

            let footprint = record.footprint();
            let kind = initial_kind(record.entity_type, record.power_up, footprint.center, &world.config);
            let id = world
                .registry
                .insert(&mut world.physics, EntitySpec::new(kind, record.shape, footprint));
            if record.entity_type == EntityType::Player {
                player = Some(id);
            }
            goal_placed |= record.is_goal();
            report.loaded += 1;
        }

        world.player = player.ok_or(LevelError::NoPlayer)?;
        world.stats.created = report.loaded;
        info!(
            "level loaded: {} entities, {} records skipped",
            report.loaded,
            report.skipped.len()
        );
        Ok((world, report))
    }

    /// Build a world from a snapshot. The snapshot is fully validated first,
    /// and nothing is returned unless every body was recreated.
    pub fn restore(self, snapshot: &WorldSnapshot) -> Result<World, SnapshotError> {
        snapshot.validate()?;

        let dimensions = Vec2::new(snapshot.width, snapshot.height);
        let mut world = World::empty(self.config, dimensions, EntityRegistry::with_next_id(snapshot.rules.next_id));
        let mut player = None;

        for body in &snapshot.bodies {
            let mut desc = body.body_desc()?;
            let kind = body.tag.kind.clone();
            if let EntityKind::Player(data) = &kind {
                if data.state.is_climbing() {
                    desc = desc.with_gravity_scale(0.0);
                }
                player = Some(body.tag.id);
            }
            desc = desc.with_material(template_for(kind.entity_type()).material);
            if !world.registry.insert_with_desc(&mut world.physics, body.tag.id, kind, &desc) {
                return Err(SnapshotError::Incompatible(format!("duplicate entity id {}", body.tag.id.0)));
            }
        }

        // Ids start at 1, so 0 never names a live entity.
        world.player = match player {
            Some(id) => id,
            None if snapshot.rules.outcome.is_terminal() => EntityId(0),
            None => return Err(SnapshotError::Incompatible("no player".into())),
        };
        world.score = snapshot.rules.score;
        world.tick = snapshot.rules.tick;
        world.outcome = snapshot.rules.outcome;
        world.stats.created = snapshot.bodies.len();
        info!(
            "world restored: {} bodies at tick {}",
            snapshot.bodies.len(),
            world.tick
        );
        Ok(world)
    }
}

/// The simulated game world: entities, physics, rules and outcome.
///
/// Only [`update`](Self::update) and [`move_player`](Self::move_player)
/// mutate it. Dead entities and events describe the latest tick only.
pub struct World {
    config: WorldConfig,
    dimensions: Vec2,
    physics: PhysicsAdapter,
    registry: EntityRegistry,
    rules: CollisionRuleEngine,
    player: EntityId,
    outcome: Outcome,
    score: u32,
    tick: u64,
    events: Vec<GameEvent>,
    dead: Vec<EntityView>,
    /// Horizontal input arrived since the last update.
    moved: bool,
    stats: WorldStats,
}

impl World {
    fn empty(config: WorldConfig, dimensions: Vec2, registry: EntityRegistry) -> Self {
        let physics = PhysicsAdapter::new(config.gravity, config.fixed_dt, dimensions);
        let rules = CollisionRuleEngine::new(config.edge_tolerance);
        Self {
            config,
            dimensions,
            physics,
            registry,
            rules,
            player: EntityId(0),
            outcome: Outcome::IsGoing,
            score: 0,
            tick: 0,
            events: Vec::new(),
            dead: Vec::new(),
            moved: false,
            stats: WorldStats::default(),
        }
    }

    // -- Tick --

    /// Advance the world by one fixed timestep. Does nothing once the
    /// outcome is terminal.
    pub fn update(&mut self) {
        if self.outcome.is_terminal() {
            return;
        }
        self.tick += 1;
        self.events.clear();
        self.dead.clear();

        if !std::mem::take(&mut self.moved) {
            self.stop_player_horizontally();
        }
        locomotion::drive_enemies(&mut self.registry, &mut self.physics, &self.config);

        let filter = self.rules.contact_filter(&self.registry, self.player);
        self.physics.step(&filter);
        self.sync_positions();

        let contacts = self.physics.contacts();
        let mut events = Vec::new();
        self.rules.classify(&contacts, &self.registry, self.player, &mut events);

        let mut player_hit = false;
        for event in &events {
            self.apply(event, &mut player_hit);
        }
        self.events = events;
        self.sweep_out_of_bounds(&mut player_hit);

        self.check_outcome();
        self.settle_player();

        let removed = self.registry.remove_dead(&mut self.physics);
        self.stats.removed += removed.len();
        self.dead = removed;

        let mut released: Vec<EntitySpec> = Vec::new();
        spawner::advance_generators(&mut self.registry, &self.config, &mut released);
        for spec in released {
            self.registry.insert(&mut self.physics, spec);
            self.stats.spawned += 1;
        }

        if !self.events.is_empty() {
            debug!("tick {}: {:?}", self.tick, self.events);
        }
    }

    fn stop_player_horizontally(&mut self) {
        if let Some(player) = self.registry.get(self.player) {
            let vel = self.physics.velocity(player.body());
            self.physics.set_velocity(player.body(), Vec2::new(0.0, vel.y));
        }
    }

    fn sync_positions(&mut self) {
        for entity in self.registry.iter_mut() {
            if entity.is_static() {
                continue;
            }
            let (pos, angle) = self.physics.body_position(entity.body());
            entity.pos = pos;
            entity.angle = angle;
        }
    }

    fn apply(&mut self, event: &GameEvent, player_hit: &mut bool) {
        match *event {
            GameEvent::WalkingEnemyKilled { enemy } | GameEvent::RollingEnemyKilled { enemy } => {
                if self.kill(enemy) {
                    self.score += event.points();
                    self.bounce_off(enemy);
                }
            }
            GameEvent::PlayerKilled { .. } => {
                if !*player_hit {
                    *player_hit = true;
                    self.lose_life();
                }
            }
            GameEvent::PowerUpHit { power_up } => {
                if self.kill(power_up) {
                    self.score += event.points();
                }
            }
            GameEvent::InvincibilityHit { power_up } => {
                if self.kill(power_up) {
                    let ticks = self.config.invincibility_ticks;
                    if let Some(data) = self.registry.get_mut(self.player).and_then(Entity::player_mut) {
                        data.invincible_ticks = ticks;
                    }
                }
            }
            // Winning is decided by the outcome check.
            GameEvent::GoalHit { .. } => {}
        }
    }

    /// Clear an entity's alive flag. Returns `false` if it was already dead.
    fn kill(&mut self, id: EntityId) -> bool {
        match self.registry.get_mut(id) {
            Some(entity) if entity.alive => {
                entity.alive = false;
                true
            }
            _ => false,
        }
    }

    /// Push the player up after landing on `enemy`.
    fn bounce_off(&mut self, enemy: EntityId) {
        let Some(enemy_y) = self.registry.get(enemy).map(|e| e.pos.y) else {
            return;
        };
        let Some(player) = self.registry.get_mut(self.player) else {
            return;
        };
        if player.footprint().bottom() < enemy_y {
            return;
        }
        let vel = self.physics.velocity(player.body());
        self.physics
            .set_velocity(player.body(), Vec2::new(vel.x, self.config.stomp_bounce));
        if let Some(data) = player.player_mut() {
            data.state = PlayerState::Jumping;
        }
    }

    /// Take a life from the player: respawn with a grace period, or die on the last one.
    fn lose_life(&mut self) {
        let grace = self.config.hit_grace_ticks;
        let Some(player) = self.registry.get_mut(self.player) else {
            return;
        };
        let Some(data) = player.player_mut() else {
            return;
        };
        data.lives = data.lives.saturating_sub(1);
        if data.lives == 0 {
            data.state = PlayerState::Dead;
            player.alive = false;
            info!("player lost the last life");
            return;
        }
        data.state = PlayerState::Standing;
        data.grace_ticks = grace;
        let spawn = data.spawn;
        info!("player lost a life, {} left", data.lives);

        self.physics.teleport(player.body(), spawn);
        self.physics.set_gravity_scale(player.body(), 1.0);
        player.pos = spawn;
    }

    fn sweep_out_of_bounds(&mut self, player_hit: &mut bool) {
        let margin = self.config.bounds_margin;
        let escaped: Vec<EntityId> = self
            .registry
            .iter()
            .filter(|e| e.alive && !e.is_static() && self.physics.out_of_bounds(e.body(), margin))
            .map(|e| e.id)
            .collect();

        for id in escaped {
            if id == self.player {
                self.events.push(GameEvent::PlayerKilled { by: None });
                if !*player_hit {
                    *player_hit = true;
                    self.lose_life();
                }
            } else {
                self.kill(id);
            }
        }
    }

    /// Death check first, then the goal overlap.
    fn check_outcome(&mut self) {
        let Some(player) = self.registry.get(self.player).filter(|p| p.alive) else {
            self.set_outcome(Outcome::GameOver);
            return;
        };
        let won = self
            .registry
            .of_type(EntityType::PowerUp)
            .filter(|e| matches!(e.kind, EntityKind::PowerUp(PowerUpKind::Goal)))
            .any(|goal| self.physics.intersecting(player.body(), goal.body()));
        if won {
            self.set_outcome(Outcome::PlayerWon);
        }
    }

    fn set_outcome(&mut self, outcome: Outcome) {
        if self.outcome.is_terminal() {
            return;
        }
        self.outcome = outcome;
        info!("outcome: {:?} at tick {} with score {}", outcome, self.tick, self.score);
    }

    /// Post-step player state: count down timers, finish climbs and jumps.
    fn settle_player(&mut self) {
        let tolerance = self.config.edge_tolerance;
        let Some(player) = self.registry.get(self.player).filter(|p| p.alive) else {
            return;
        };
        let Some(state) = player.player().map(|d| d.state) else {
            return;
        };
        let footprint = player.footprint();
        let on_platform = self.rests_on_platform(&footprint);
        let ladder = self.rules.ladder_under(&self.registry, &footprint);
        let vel = self.physics.velocity(player.body());

        let next = match state {
            PlayerState::ClimbingUp => match ladder {
                Some(l) if footprint.bottom() < l.top() - tolerance => state,
                _ => PlayerState::Standing,
            },
            PlayerState::ClimbingDown => match ladder {
                Some(l) if !(on_platform && footprint.bottom() <= l.bottom() + tolerance) => state,
                _ => PlayerState::Standing,
            },
            PlayerState::Jumping if on_platform && vel.y < LANDING_SPEED => PlayerState::Standing,
            other => other,
        };

        if next.is_climbing() {
            // Climbing only moves while the key is held.
            self.physics.set_velocity(player.body(), Vec2::ZERO);
        } else if state.is_climbing() {
            self.physics.set_gravity_scale(player.body(), 1.0);
        }

        if let Some(data) = self.registry.get_mut(self.player).and_then(Entity::player_mut) {
            data.state = next;
            data.invincible_ticks = data.invincible_ticks.saturating_sub(1);
            data.grace_ticks = data.grace_ticks.saturating_sub(1);
        }
    }

    fn rests_on_platform(&self, footprint: &Footprint) -> bool {
        self.registry
            .of_type(EntityType::Platform)
            .any(|p| footprint.rests_on(&p.footprint(), self.config.edge_tolerance))
    }

    // -- Commands --

    /// Apply a movement command to the player. Returns whether it was honored.
    pub fn move_player(&mut self, movement: Movement) -> bool {
        if self.outcome.is_terminal() {
            return false;
        }
        let Some(player) = self.registry.get(self.player).filter(|p| p.alive) else {
            return false;
        };
        let Some(state) = player.player().map(|d| d.state) else {
            return false;
        };
        let footprint = player.footprint();
        let on_platform = self.rests_on_platform(&footprint);
        let vel = self.physics.velocity(player.body());
        let tolerance = self.config.edge_tolerance;

        let (next, velocity, gravity_scale) = match movement {
            Movement::Jump => {
                if !on_platform {
                    return false;
                }
                (PlayerState::Jumping, Vec2::new(vel.x, self.config.jump_speed), 1.0)
            }
            Movement::MoveLeft | Movement::MoveRight => {
                if state.is_climbing() && !on_platform {
                    return false;
                }
                let direction = if movement == Movement::MoveLeft { -1.0 } else { 1.0 };
                let next = if state.is_climbing() { PlayerState::Standing } else { state };
                (next, Vec2::new(direction * self.config.player_speed, vel.y), 1.0)
            }
            Movement::ClimbUp | Movement::ClimbDown => {
                let Some(ladder) = self.rules.ladder_under(&self.registry, &footprint) else {
                    return false;
                };
                let up = movement == Movement::ClimbUp;
                let extends = if up {
                    ladder.top() > footprint.bottom() + tolerance
                } else {
                    ladder.bottom() < footprint.bottom() - tolerance
                };
                if !extends {
                    return false;
                }
                let (next, direction) = if up {
                    (PlayerState::ClimbingUp, 1.0)
                } else {
                    (PlayerState::ClimbingDown, -1.0)
                };
                (next, Vec2::new(0.0, direction * self.config.climb_speed), 0.0)
            }
        };

        self.physics.set_velocity(player.body(), velocity);
        self.physics.set_gravity_scale(player.body(), gravity_scale);
        self.moved |= matches!(movement, Movement::MoveLeft | Movement::MoveRight);
        if let Some(data) = self.registry.get_mut(self.player).and_then(Entity::player_mut) {
            data.state = next;
        }
        true
    }

    // -- Queries --

    pub fn dimensions(&self) -> Vec2 {
        self.dimensions
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Read-only views of every live entity.
    pub fn alive_entities(&self) -> Vec<EntityView> {
        self.registry
            .iter()
            .filter(|e| e.alive)
            .map(Entity::view)
            .collect()
    }

    /// Entities removed during the latest tick.
    pub fn dead_entities(&self) -> &[EntityView] {
        &self.dead
    }

    /// Take the events of the latest tick.
    pub fn current_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events of the latest tick, without draining them.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Remaining lives; zero once the player is gone.
    pub fn player_lives(&self) -> u32 {
        self.registry
            .get(self.player)
            .and_then(Entity::player)
            .map_or(0, |d| d.lives)
    }

    pub fn player_id(&self) -> EntityId {
        self.player
    }

    pub fn player(&self) -> Option<EntityView> {
        self.registry.get(self.player).map(Entity::view)
    }

    pub fn entity(&self, id: EntityId) -> Option<EntityView> {
        self.registry.get(id).map(Entity::view)
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome == Outcome::GameOver
    }

    pub fn has_player_won(&self) -> bool {
        self.outcome == Outcome::PlayerWon
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> WorldStats {
        self.stats
    }

    /// Current velocity of an entity's body.
    pub fn velocity(&self, id: EntityId) -> Option<Vec2> {
        self.registry.get(id).map(|e| self.physics.velocity(e.body()))
    }

    /// Capture the full simulated state.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self)
    }

    pub(crate) fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub(crate) fn physics(&self) -> &PhysicsAdapter {
        &self.physics
    }
}
