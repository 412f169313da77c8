//! Profile and daily-log repositories.
//!
//! The tracker reads and writes through these traits; the metabolic engine
//! never sees them. Writes are delivered to subscribed listeners
//! synchronously, after they succeed.

use crate::journal::{self, JournalOp, JournalSink, JsonlJournal};
use crate::profile_store::ProfileStore;
use crate::{DailyLog, Profile, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A change made through a repository
#[derive(Clone, Debug, PartialEq)]
pub enum StoreEvent {
    LogSaved(DailyLog),
    LogDeleted(NaiveDate),
    ProfileSaved(Profile),
}

/// Callback invoked for every store event
pub type Listener = Box<dyn Fn(&StoreEvent) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registered listeners for a repository
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub fn add(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| *existing != id);
        self.entries.len() != before
    }

    pub fn notify(&self, event: &StoreEvent) {
        for (_, listener) in &self.entries {
            listener(event);
        }
    }
}

/// Change notification capability
pub trait ChangeFeed {
    fn subscribe(&mut self, listener: Listener) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// Storage for daily logs, keyed by date
pub trait LogRepository {
    fn get_log(&self, date: NaiveDate) -> Result<Option<DailyLog>>;
    /// Insert or overwrite the log for its date
    fn put_log(&mut self, log: DailyLog) -> Result<()>;
    /// Returns whether a log existed for the date
    fn delete_log(&mut self, date: NaiveDate) -> Result<bool>;
    /// All logs, in no particular order
    fn list_logs(&self) -> Result<Vec<DailyLog>>;
}

/// Storage for the single user profile
pub trait ProfileRepository {
    /// The stored profile, or the default profile if none was saved
    fn load_profile(&self) -> Result<Profile>;
    fn save_profile(&mut self, profile: &Profile) -> Result<()>;
    /// Load, apply `f` and save as one step, returning the saved profile
    fn modify_profile<F>(&mut self, f: F) -> Result<Profile>
    where
        F: FnOnce(&mut Profile);
}

// ============================================================================
// In-memory repository
// ============================================================================

/// Repository held entirely in memory
#[derive(Default)]
pub struct MemoryRepository {
    profile: Option<Profile>,
    logs: BTreeMap<NaiveDate, DailyLog>,
    listeners: Listeners,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: Profile) -> Self {
        Self {
            profile: Some(profile),
            ..Self::default()
        }
    }
}

impl LogRepository for MemoryRepository {
    fn get_log(&self, date: NaiveDate) -> Result<Option<DailyLog>> {
        Ok(self.logs.get(&date).cloned())
    }

    fn put_log(&mut self, log: DailyLog) -> Result<()> {
        self.logs.insert(log.date, log.clone());
        self.listeners.notify(&StoreEvent::LogSaved(log));
        Ok(())
    }

    fn delete_log(&mut self, date: NaiveDate) -> Result<bool> {
        let existed = self.logs.remove(&date).is_some();
        if existed {
            self.listeners.notify(&StoreEvent::LogDeleted(date));
        }
        Ok(existed)
    }

    fn list_logs(&self) -> Result<Vec<DailyLog>> {
        Ok(self.logs.values().cloned().collect())
    }
}

impl ProfileRepository for MemoryRepository {
    fn load_profile(&self) -> Result<Profile> {
        Ok(self.profile.clone().unwrap_or_default())
    }

    fn save_profile(&mut self, profile: &Profile) -> Result<()> {
        self.profile = Some(profile.clone());
        self.listeners
            .notify(&StoreEvent::ProfileSaved(profile.clone()));
        Ok(())
    }

    fn modify_profile<F>(&mut self, f: F) -> Result<Profile>
    where
        F: FnOnce(&mut Profile),
    {
        let mut profile = self.load_profile()?;
        f(&mut profile);
        self.save_profile(&profile)?;
        Ok(profile)
    }
}

impl ChangeFeed for MemoryRepository {
    fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }
}

// ============================================================================
// File-backed repository
// ============================================================================

/// Repository stored under a data directory
///
/// Layout:
/// - `profile.json`: the profile, replaced atomically
/// - `journal/daily_logs.wal`: JSONL journal of log writes
///
/// Each file has a sibling `.lock` that serializes access across processes.
pub struct FileRepository {
    data_dir: PathBuf,
    profile: ProfileStore,
    journal: JsonlJournal,
    listeners: Listeners,
}

impl FileRepository {
    /// Open (and create if needed) a repository rooted at `data_dir`
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(data_dir.join("journal"))?;

        let journal = JsonlJournal::new(data_dir.join("journal").join("daily_logs.wal"));
        tracing::debug!("Opened repository at {:?}", data_dir);

        Ok(Self {
            profile: ProfileStore::new(data_dir.join("profile.json")),
            data_dir,
            journal,
            listeners: Listeners::default(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn profile_path(&self) -> &Path {
        self.profile.path()
    }

    pub fn journal_dir(&self) -> PathBuf {
        self.data_dir.join("journal")
    }

    pub fn journal_path(&self) -> &Path {
        self.journal.path()
    }

    /// Compact the log journal, returning the number of live logs
    pub fn compact(&self) -> Result<usize> {
        if !self.journal_path().exists() {
            return Ok(0);
        }
        journal::compact(self.journal_path())
    }

    /// Remove journals archived by earlier compactions
    pub fn cleanup_processed(&self) -> Result<usize> {
        journal::cleanup_processed(&self.journal_dir())
    }
}

impl LogRepository for FileRepository {
    fn get_log(&self, date: NaiveDate) -> Result<Option<DailyLog>> {
        Ok(journal::load_logs(self.journal_path())?.remove(&date))
    }

    fn put_log(&mut self, log: DailyLog) -> Result<()> {
        self.journal.append(JournalOp::Put { log: log.clone() })?;
        tracing::info!("Saved log for {}", log.date);
        self.listeners.notify(&StoreEvent::LogSaved(log));
        Ok(())
    }

    fn delete_log(&mut self, date: NaiveDate) -> Result<bool> {
        if self.get_log(date)?.is_none() {
            tracing::debug!("No log for {} to delete", date);
            return Ok(false);
        }

        self.journal.append(JournalOp::Delete { date })?;
        tracing::info!("Deleted log for {}", date);
        self.listeners.notify(&StoreEvent::LogDeleted(date));
        Ok(true)
    }

    fn list_logs(&self) -> Result<Vec<DailyLog>> {
        Ok(journal::load_logs(self.journal_path())?
            .into_values()
            .collect())
    }
}

impl ProfileRepository for FileRepository {
    fn load_profile(&self) -> Result<Profile> {
        self.profile.load()
    }

    fn save_profile(&mut self, profile: &Profile) -> Result<()> {
        self.profile.save(profile)?;
        tracing::info!("Saved profile");
        self.listeners
            .notify(&StoreEvent::ProfileSaved(profile.clone()));
        Ok(())
    }

    fn modify_profile<F>(&mut self, f: F) -> Result<Profile>
    where
        F: FnOnce(&mut Profile),
    {
        let profile = self.profile.modify(f)?;
        tracing::info!("Updated profile");
        self.listeners
            .notify(&StoreEvent::ProfileSaved(profile.clone()));
        Ok(profile)
    }
}

impl ChangeFeed for FileRepository {
    fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }
}
