//! Append-only journal of daily-log writes.
//!
//! Every save or delete is appended to a JSONL (JSON Lines) file. The
//! current set of logs is rebuilt by replaying the journal, last write per
//! date wins. Appends, reads and compaction all go through the sibling
//! `.lock` file, so a compaction never races a concurrent append.

use crate::lock::FileLock;
use crate::{DailyLog, Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// A single journaled write
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub op: JournalOp,
}

/// What a journal entry does to the log collection
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalOp {
    Put { log: DailyLog },
    Delete { date: NaiveDate },
}

impl JournalEntry {
    pub fn new(op: JournalOp) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            op,
        }
    }
}

/// Journal sink trait for persisting log writes
pub trait JournalSink {
    fn append(&mut self, op: JournalOp) -> Result<JournalEntry>;
}

/// JSONL-based journal with file locking
#[derive(Clone, Debug)]
pub struct JsonlJournal {
    path: PathBuf,
}

impl JsonlJournal {
    /// Create a new journal for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JournalSink for JsonlJournal {
    fn append(&mut self, op: JournalOp) -> Result<JournalEntry> {
        let entry = JournalEntry::new(op);
        let line = serde_json::to_string(&entry)?;

        // Open only once locked: compaction may have swapped the file
        let _lock = FileLock::exclusive(&self.path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        let mut record = Vec::with_capacity(line.len() + 2);
        if ends_mid_line(&mut file)? {
            tracing::warn!("Journal {:?} ends in a partial line, terminating it", self.path);
            record.push(b'\n');
        }
        record.extend_from_slice(line.as_bytes());
        record.push(b'\n');

        file.write_all(&record)?;
        file.flush()?;

        tracing::debug!("Appended journal entry {} to {:?}", entry.id, self.path);
        Ok(entry)
    }
}

/// Whether a non-empty file lacks a trailing newline
fn ends_mid_line(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Read all entries from a journal file
///
/// Unparseable lines (a torn final write, stray bytes that aren't UTF-8)
/// are skipped with a warning.
pub fn read_entries(path: &Path) -> Result<Vec<JournalEntry>> {
    let _lock = FileLock::shared(path)?;
    read_entries_locked(path)
}

/// Read entries while the caller already holds the journal lock
fn read_entries_locked(path: &Path) -> Result<Vec<JournalEntry>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = BufReader::new(file);
    let mut entries = Vec::new();
    let mut line = Vec::new();
    let mut line_num = 0;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        line_num += 1;

        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<JournalEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Skipping journal line {}: {}", line_num, e);
            }
        }
    }

    tracing::debug!("Read {} journal entries", entries.len());
    Ok(entries)
}

/// Fold entries into the live log set keyed by date
pub fn replay(entries: &[JournalEntry]) -> BTreeMap<NaiveDate, DailyLog> {
    let mut logs = BTreeMap::new();
    for entry in entries {
        match &entry.op {
            JournalOp::Put { log } => {
                logs.insert(log.date, log.clone());
            }
            JournalOp::Delete { date } => {
                logs.remove(date);
            }
        }
    }
    logs
}

/// Read and replay a journal file
pub fn load_logs(path: &Path) -> Result<BTreeMap<NaiveDate, DailyLog>> {
    Ok(replay(&read_entries(path)?))
}

/// Rewrite the journal to a single `put` per live date
///
/// Holds the journal lock throughout. The new journal is fully written and
/// synced before the old one is archived under a timestamped
/// `.processed` name. Returns the number of live logs kept.
pub fn compact(path: &Path) -> Result<usize> {
    let _lock = FileLock::exclusive(path)?;

    let entries = read_entries_locked(path)?;
    if entries.is_empty() {
        tracing::info!("Journal is empty, nothing to compact");
        return Ok(0);
    }

    let live = replay(&entries);
    let parent = path
        .parent()
        .ok_or_else(|| Error::Store(format!("journal path {:?} has no parent", path)))?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        for log in live.values() {
            let entry = JournalEntry::new(JournalOp::Put { log: log.clone() });
            writer.write_all(serde_json::to_string(&entry)?.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;

    let archive_path = archive_path(path);
    std::fs::rename(path, &archive_path)?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!(
        "Compacted journal from {} entries to {} logs, archived to {:?}",
        entries.len(),
        live.len(),
        archive_path
    );

    Ok(live.len())
}

/// `daily_logs.wal` → `daily_logs.wal.20240701T101500123456.processed`
fn archive_path(path: &Path) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%6f");
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "journal".to_string());
    path.with_file_name(format!("{}.{}.processed", name, stamp))
}

/// Remove archived `.processed` journals from a directory
pub fn cleanup_processed(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed journal: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed journal files", count);
    }

    Ok(count)
}
