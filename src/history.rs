use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::calculator::{CompletedCalculation, format_number};
use crate::error::StorageError;
use crate::saving;

/// One completed calculation belonging to a user
///
/// Records are appended and never changed afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryRecord {
    pub username: String,
    /// Left-to-right expression, e.g. `5 + 3`
    pub expression: String,
    pub result: f64,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    /// Tag a finished calculation with its owner and the current time
    pub fn new(username: &str, calculation: &CompletedCalculation) -> Self {
        Self::at(username, calculation, Utc::now())
    }

    pub fn at(username: &str, calculation: &CompletedCalculation, timestamp: DateTime<Utc>) -> Self {
        HistoryRecord {
            username: username.to_string(),
            expression: calculation.expression.clone(),
            result: calculation.result,
            timestamp,
        }
    }

    /// Readable form, e.g. `5 + 3 = 8`
    pub fn format_line(&self) -> String {
        format!("{} = {}", self.expression, format_number(self.result))
    }
}

/// Append-only JSON log of every user's calculations
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Open the log at `path`, creating an empty file if it is missing
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Err(e) = saving::ensure_store_file(&path) {
            log::error!("History store unavailable: {}", e);
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a record to the end of the log
    ///
    /// The whole file is rewritten through an atomic rename, so a reader
    /// never observes a half-written append.
    pub fn append(&self, record: HistoryRecord) -> Result<(), StorageError> {
        let mut records: Vec<HistoryRecord> = saving::load_records_for_update(&self.path)?;
        log::debug!("Appending '{}' for {}", record.format_line(), record.username);
        records.push(record);

        saving::save_records(&records, &self.path).inspect_err(|e| {
            log::error!("Could not save history: {}", e);
        })
    }

    /// Every record owned by `username`, most recent first
    ///
    /// Records with the same timestamp come back in reverse append order.
    pub fn list_for(&self, username: &str) -> Vec<HistoryRecord> {
        let records: Vec<HistoryRecord> = saving::load_records_or_empty(&self.path);

        let mut owned: Vec<HistoryRecord> = records
            .into_iter()
            .rev()
            .filter(|record| record.username == username)
            .collect();
        owned.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        owned
    }
}
