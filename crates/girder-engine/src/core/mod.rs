pub mod geometry;
pub mod physics;
pub mod registry;
