pub mod keys;

pub use keys::{InputError, KeyCode};
