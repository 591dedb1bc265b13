use glam::Vec2;
use serde::{Deserialize, Serialize};

/// World tuning, provided once when the world is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Fixed timestep in seconds (default: 0.015, one 15 ms tick).
    pub fixed_dt: f32,
    /// World width in world units.
    pub world_width: f32,
    /// World height in world units.
    pub world_height: f32,
    /// Gravity vector. Y points up, so the default pulls toward negative Y.
    pub gravity: Vec2,
    /// Lives the player starts with.
    pub player_lives: u32,
    /// Horizontal walking speed of the player.
    pub player_speed: f32,
    /// Vertical launch speed of a jump.
    pub jump_speed: f32,
    /// Ladder climbing speed.
    pub climb_speed: f32,
    /// Upward speed given to the player after stomping an enemy.
    pub stomp_bounce: f32,
    pub walker_speed: f32,
    pub roller_speed: f32,
    /// Radius of rolling enemies produced by generators.
    pub roller_radius: f32,
    /// Ticks between two rolling enemies of one generator.
    pub generator_period: u32,
    /// Ticks of invincibility granted by an invincibility power-up.
    pub invincibility_ticks: u32,
    /// Ticks during which a freshly respawned player ignores enemies.
    pub hit_grace_ticks: u32,
    /// Distance beyond the world edges after which entities are discarded.
    pub bounds_margin: f32,
    /// Tolerance used when matching edges (resting, ladder ends, top-edge contacts).
    pub edge_tolerance: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 0.015,
            world_width: 8.0,
            world_height: 4.5,
            gravity: Vec2::new(0.0, -9.81),
            player_lives: 3,
            player_speed: 1.5,
            jump_speed: 3.2,
            climb_speed: 1.0,
            stomp_bounce: 2.0,
            walker_speed: 0.6,
            roller_speed: 1.2,
            roller_radius: 0.1,
            generator_period: 200,
            invincibility_ticks: 400,
            hit_grace_ticks: 60,
            bounds_margin: 0.5,
            edge_tolerance: 0.03,
        }
    }
}

impl WorldConfig {
    /// Parse a config from JSON. Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn dimensions(&self) -> Vec2 {
        Vec2::new(self.world_width, self.world_height)
    }
}
