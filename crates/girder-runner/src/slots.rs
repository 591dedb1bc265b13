use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use girder_engine::SnapshotError;
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file i/o: {0}")]
    Io(#[from] io::Error),

    /// The file is there but does not describe a world we can rebuild.
    #[error("incompatible save file: {0}")]
    Incompatible(#[source] SnapshotError),

    #[error("no save slot {index} (slots 0..{count})")]
    InvalidSlot { index: usize, count: usize },

    #[error("the game loop must be paused to save or load")]
    NotPaused,
}

impl From<SnapshotError> for SaveError {
    fn from(err: SnapshotError) -> Self {
        if err.is_incompatible() {
            SaveError::Incompatible(err)
        } else {
            SaveError::Io(io::Error::new(io::ErrorKind::InvalidData, err))
        }
    }
}

/// A fixed number of save files in one directory, `slot_<n>.sav`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSlots {
    dir: PathBuf,
    count: usize,
}

impl SaveSlots {
    pub fn new(dir: impl Into<PathBuf>, count: usize) -> Self {
        Self {
            dir: dir.into(),
            count,
        }
    }

    /// Slots under the user's data directory (`<data_dir>/girder/saves`).
    pub fn user_default(count: usize) -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("girder")
            .join("saves");
        Self::new(dir, count)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn path(&self, index: usize) -> Result<PathBuf, SaveError> {
        if index >= self.count {
            return Err(SaveError::InvalidSlot {
                index,
                count: self.count,
            });
        }
        Ok(self.dir.join(format!("slot_{index}.sav")))
    }

    pub fn exists(&self, index: usize) -> bool {
        self.path(index).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Write a slot through a temporary file, so a failed write never
    /// leaves a truncated save behind.
    pub fn write(&self, index: usize, bytes: &[u8]) -> Result<(), SaveError> {
        let path = self.path(index)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("sav.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        info!("saved slot {} ({} bytes)", index, bytes.len());
        Ok(())
    }

    pub fn read(&self, index: usize) -> Result<Vec<u8>, SaveError> {
        let path = self.path(index)?;
        Ok(fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> SaveSlots {
        let dir = std::env::temp_dir().join(format!("girder-slots-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        SaveSlots::new(dir, 3)
    }

    #[test]
    fn slot_paths_are_bounded() {
        let slots = SaveSlots::new("/saves", 3);
        assert_eq!(slots.path(2).unwrap(), PathBuf::from("/saves/slot_2.sav"));
        assert!(matches!(
            slots.path(3),
            Err(SaveError::InvalidSlot { index: 3, count: 3 })
        ));
    }

    #[test]
    fn write_then_read() {
        let slots = scratch("rw");
        assert!(!slots.exists(1));
        slots.write(1, b"abc").unwrap();
        assert!(slots.exists(1));
        assert_eq!(slots.read(1).unwrap(), b"abc");
        assert!(!slots.dir().join("slot_1.sav.tmp").exists());
        let _ = fs::remove_dir_all(slots.dir());
    }

    #[test]
    fn missing_slot_is_io() {
        let slots = scratch("missing");
        assert!(matches!(slots.read(0), Err(SaveError::Io(_))));
    }

    #[test]
    fn user_default_lives_under_girder() {
        let slots = SaveSlots::user_default(3);
        assert!(slots.dir().ends_with("girder/saves"));
        assert_eq!(slots.count(), 3);
    }
}
