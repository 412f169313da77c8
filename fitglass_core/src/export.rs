//! CSV export of daily logs.

use crate::{DailyLog, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    calories: u32,
    protein: u32,
    steps: u32,
    hiit: bool,
    score: u32,
    fat_lost_kg: f64,
    fat_lost_grams: u32,
    deficit: u32,
    tdee: i64,
}

impl From<&DailyLog> for CsvRow {
    fn from(log: &DailyLog) -> Self {
        CsvRow {
            date: log.date.format("%Y-%m-%d").to_string(),
            calories: log.calories,
            protein: log.protein,
            steps: log.steps,
            hiit: log.hiit,
            score: log.score,
            fat_lost_kg: log.fat_lost,
            fat_lost_grams: log.fat_lost_grams,
            deficit: log.deficit,
            tdee: log.tdee,
        }
    }
}

/// Write logs to a CSV file, oldest first, replacing any existing file
///
/// The file is synced to disk before returning. Returns the number of rows.
pub fn export_csv(logs: &[DailyLog], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut sorted: Vec<&DailyLog> = logs.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    for log in &sorted {
        writer.serialize(CsvRow::from(*log))?;
    }

    // Header row is only emitted with the first record
    if sorted.is_empty() {
        writer.write_record([
            "date",
            "calories",
            "protein",
            "steps",
            "hiit",
            "score",
            "fat_lost_kg",
            "fat_lost_grams",
            "deficit",
            "tdee",
        ])?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} logs to {:?}", sorted.len(), path);
    Ok(sorted.len())
}
