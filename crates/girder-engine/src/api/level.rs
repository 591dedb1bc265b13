use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::{EntityType, PowerUpKind, ShapeKind};
use crate::core::geometry::Footprint;

/// One entity in a level description. The encoding the records came from
/// (text file, JSON, hand-built list) does not matter here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub entity_type: EntityType,
    pub shape: ShapeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub angle: f32,
    /// Subtype for `PowerUp` records; ignored otherwise.
    #[serde(default)]
    pub power_up: PowerUpKind,
}

impl LevelRecord {
    pub fn new(entity_type: EntityType, shape: ShapeKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            entity_type,
            shape,
            x,
            y,
            width,
            height,
            angle: 0.0,
            power_up: PowerUpKind::Goal,
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_power_up(mut self, kind: PowerUpKind) -> Self {
        self.power_up = kind;
        self
    }

    pub fn footprint(&self) -> Footprint {
        Footprint::new(Vec2::new(self.x, self.y), Vec2::new(self.width, self.height), self.angle)
    }

    pub fn is_goal(&self) -> bool {
        self.entity_type == EntityType::PowerUp && self.power_up == PowerUpKind::Goal
    }

    /// Check the record on its own. Cross-record rules (one player, one goal)
    /// are checked by the builder.
    pub fn validate(&self, index: usize) -> Result<(), LevelLoadError> {
        let numbers = [self.x, self.y, self.width, self.height, self.angle];
        if numbers.iter().any(|n| !n.is_finite()) {
            return Err(LevelLoadError::NonFinite { index });
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(LevelLoadError::NonPositiveSize {
                index,
                width: self.width,
                height: self.height,
            });
        }
        if self.shape == ShapeKind::Circle && (self.width - self.height).abs() > f32::EPSILON {
            return Err(LevelLoadError::UnevenCircle { index });
        }
        Ok(())
    }
}

/// Why a single level record was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelLoadError {
    #[error("record {index}: non-finite coordinate or size")]
    NonFinite { index: usize },
    #[error("record {index}: size {width}x{height} is not positive")]
    NonPositiveSize { index: usize, width: f32, height: f32 },
    #[error("record {index}: circle width and height differ")]
    UnevenCircle { index: usize },
    #[error("record {index}: a player was already placed")]
    ExtraPlayer { index: usize },
    #[error("record {index}: a goal was already placed")]
    ExtraGoal { index: usize },
}

/// A level that cannot be played at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("level has no player")]
    NoPlayer,
}

/// What `init_level` did with the records it was given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelReport {
    pub loaded: usize,
    pub skipped: Vec<LevelLoadError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_record_passes() {
        let r = LevelRecord::new(EntityType::Platform, ShapeKind::Rectangle, 4.0, 0.5, 8.0, 0.1);
        assert_eq!(r.validate(0), Ok(()));
    }

    #[test]
    fn rejects_bad_numbers() {
        let nan = LevelRecord::new(EntityType::Platform, ShapeKind::Rectangle, f32::NAN, 0.5, 8.0, 0.1);
        assert_eq!(nan.validate(2), Err(LevelLoadError::NonFinite { index: 2 }));

        let flat = LevelRecord::new(EntityType::Ladder, ShapeKind::Rectangle, 1.0, 1.0, 0.2, 0.0);
        assert!(matches!(flat.validate(0), Err(LevelLoadError::NonPositiveSize { .. })));

        let egg = LevelRecord::new(EntityType::PowerUp, ShapeKind::Circle, 1.0, 1.0, 0.2, 0.3);
        assert_eq!(egg.validate(5), Err(LevelLoadError::UnevenCircle { index: 5 }));
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{"entity_type":"PowerUp","shape":"Circle","x":7.0,"y":1.0,"width":0.3,"height":0.3}"#;
        let r: LevelRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.angle, 0.0);
        assert!(r.is_goal());
    }
}
