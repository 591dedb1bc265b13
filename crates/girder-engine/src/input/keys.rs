use thiserror::Error;

use crate::api::types::Movement;

/// A raw key code as delivered by the host (DOM `keyCode` numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const SPACE: KeyCode = KeyCode(32);
    pub const LEFT: KeyCode = KeyCode(37);
    pub const UP: KeyCode = KeyCode(38);
    pub const RIGHT: KeyCode = KeyCode(39);
    pub const DOWN: KeyCode = KeyCode(40);
    pub const A: KeyCode = KeyCode(65);
    pub const D: KeyCode = KeyCode(68);
    pub const S: KeyCode = KeyCode(83);
    pub const W: KeyCode = KeyCode(87);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("key code {0} is not mapped to a movement")]
    Unmapped(u32),
}

impl TryFrom<KeyCode> for Movement {
    type Error = InputError;

    fn try_from(key: KeyCode) -> Result<Self, Self::Error> {
        match key {
            KeyCode::SPACE => Ok(Movement::Jump),
            KeyCode::LEFT | KeyCode::A => Ok(Movement::MoveLeft),
            KeyCode::RIGHT | KeyCode::D => Ok(Movement::MoveRight),
            KeyCode::UP | KeyCode::W => Ok(Movement::ClimbUp),
            KeyCode::DOWN | KeyCode::S => Ok(Movement::ClimbDown),
            KeyCode(other) => Err(InputError::Unmapped(other)),
        }
    }
}
