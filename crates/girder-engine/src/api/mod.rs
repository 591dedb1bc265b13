pub mod config;
pub mod level;
pub mod types;
pub mod world;
