pub mod snapshot;

pub use snapshot::{SnapshotError, WorldSnapshot};
