//! Advisory locks on sibling `.lock` files.
//!
//! The profile and the journal are replaced by rename, so their readers and
//! writers lock a stable sibling path instead of the file itself.

use crate::Result;
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Held lock on `<target>.lock`, released on drop
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Block until no other holder has any lock on `target`
    pub fn exclusive(target: &Path) -> Result<Self> {
        let lock = Self::open(target)?;
        lock.file.lock_exclusive()?;
        Ok(lock)
    }

    /// Block until no other holder has an exclusive lock on `target`
    pub fn shared(target: &Path) -> Result<Self> {
        let lock = Self::open(target)?;
        lock.file.lock_shared()?;
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(target: &Path) -> Result<Self> {
        let path = lock_path(target);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        Ok(Self { file, path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to release lock {:?}: {}", self.path, e);
        }
    }
}

/// `daily_logs.wal` → `daily_logs.wal.lock`
pub fn lock_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}
