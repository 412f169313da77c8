//! On-disk profile document.
//!
//! The profile is one pretty-printed JSON file, replaced by rename on every
//! write. All access takes `profile.json.lock`, and `modify` keeps the
//! exclusive lock from the read until the replacement lands.

use crate::lock::FileLock;
use crate::{Error, Profile, Result};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The profile file at a fixed path
#[derive(Clone, Debug)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored profile, or the default when the file is missing or
    /// unreadable as a profile
    pub fn load(&self) -> Result<Profile> {
        let _lock = FileLock::shared(&self.path)?;
        self.read()
    }

    /// Replace the stored profile
    pub fn save(&self, profile: &Profile) -> Result<()> {
        let _lock = FileLock::exclusive(&self.path)?;
        self.write(profile)
    }

    /// Load, apply `f` and save without letting another writer in between
    pub fn modify<F>(&self, f: F) -> Result<Profile>
    where
        F: FnOnce(&mut Profile),
    {
        let _lock = FileLock::exclusive(&self.path)?;
        let mut profile = self.read()?;
        f(&mut profile);
        self.write(&profile)?;
        Ok(profile)
    }

    fn read(&self) -> Result<Profile> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No profile at {:?}, using default profile", self.path);
                return Ok(Profile::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(profile) => Ok(profile),
            Err(e) => {
                tracing::warn!("Unreadable profile {:?}: {}. Using defaults.", self.path, e);
                Ok(Profile::default())
            }
        }
    }

    fn write(&self, profile: &Profile) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::Store(format!("profile path {:?} has no parent", self.path)))?;

        let mut temp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(temp.as_file_mut(), profile)?;
        temp.as_file_mut().flush()?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote profile to {:?}", self.path);
        Ok(())
    }
}
