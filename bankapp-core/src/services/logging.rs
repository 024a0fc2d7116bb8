//! Logging service - structured event logging
//!
//! Provides a privacy-safe event log stored as JSON lines in `logs.jsonl`.
//! No user data (PINs, names, amounts, rates) is ever logged; events carry
//! only their name, the command and error kinds.
//!
//! This service is designed to be used by the CLI and any embedding app.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

const LOG_FILE: &str = "logs.jsonl";

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    let timestamp = now_ms() as u64;

    // Lower 16 bits hold the counter (65536 unique IDs per millisecond)
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

/// Current unix timestamp in milliseconds
fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Detect the current platform
fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else if cfg!(target_os = "ios") {
        "ios"
    } else {
        "unknown"
    }
}

/// Entry point for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Mobile,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Mobile => "mobile",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LogEvent {
    /// Create a new log event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            command: None,
            error_message: None,
        }
    }

    /// Set the command context (for CLI events)
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set error information
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

}

/// A log entry as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Summary of the log file
#[derive(Debug, Clone, Serialize)]
pub struct LogStats {
    pub total_entries: usize,
    pub error_entries: usize,
    pub oldest_timestamp: Option<i64>,
    pub newest_timestamp: Option<i64>,
    pub file_size_bytes: u64,
    pub path: String,
}

/// Service for structured event logging
///
/// Appends one JSON object per line; the mutex keeps concurrent writers
/// from interleaving lines.
pub struct LoggingService {
    file: Mutex<File>,
    path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Create a new logging service
    ///
    /// Opens or creates `logs.jsonl` in the data directory.
    pub fn new(
        data_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        let path = data_dir.join(LOG_FILE);
        let file = Self::open_log(&path)?;

        Ok(Self {
            file: Mutex::new(file),
            path,
            entry_point,
            app_version: app_version.into(),
            platform: detect_platform(),
        })
    }

    fn open_log(path: &Path) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))
    }

    /// Log an event
    ///
    /// The entry point, app version and platform are filled in from the
    /// service configuration.
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let entry = LogEntry {
            id: generate_id(),
            timestamp: now_ms(),
            entry_point: self.entry_point.as_str().to_string(),
            app_version: self.app_version.clone(),
            platform: self.platform.to_string(),
            event: event.event,
            command: event.command,
            error_message: event.error_message,
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let mut file = self.lock()?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, File>> {
        self.file.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    /// Read every entry; lines that fail to parse are skipped
    fn read_all(&self) -> Result<Vec<LogEntry>> {
        // Hold the lock so we never read a half-written line
        let _file = self.lock()?;
        self.read_entries()
    }

    /// Caller must hold the file lock
    fn read_entries(&self) -> Result<Vec<LogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(entry) = serde_json::from_str::<LogEntry>(&line) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Most recent entries first, up to `limit`
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let mut entries = self.read_all()?;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Most recent error entries first, up to `limit`
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        let mut entries: Vec<LogEntry> = self
            .read_all()?
            .into_iter()
            .filter(|e| e.error_message.is_some())
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Drop entries older than the given number of days
    ///
    /// Returns the number of entries removed. The lock is held from the read
    /// to the reopen, so concurrent appends wait for the rewrite.
    pub fn clear_older_than(&self, days: u64) -> Result<usize> {
        let age_ms = i64::try_from(days)
            .ok()
            .and_then(|d| d.checked_mul(MS_PER_DAY))
            .unwrap_or(i64::MAX);
        let cutoff = now_ms().saturating_sub(age_ms);

        let mut file = self.lock()?;
        let entries = self.read_entries()?;
        let before = entries.len();
        let kept: Vec<LogEntry> = entries.into_iter().filter(|e| e.timestamp >= cutoff).collect();

        let dir = self
            .path
            .parent()
            .ok_or_else(|| anyhow!("Log file {} has no parent directory", self.path.display()))?;
        let mut temp = NamedTempFile::new_in(dir)?;
        for entry in &kept {
            serde_json::to_writer(&mut temp, entry)?;
            temp.write_all(b"\n")?;
        }
        temp.flush()?;
        temp.persist(&self.path)
            .with_context(|| format!("Failed to replace log file {}", self.path.display()))?;
        // Reopen so later appends go to the rewritten file
        *file = Self::open_log(&self.path)?;

        Ok(before - kept.len())
    }

    /// Entry counts, time span and file size
    pub fn stats(&self) -> Result<LogStats> {
        let entries = self.read_all()?;
        let file_size_bytes = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        Ok(LogStats {
            total_entries: entries.len(),
            error_entries: entries.iter().filter(|e| e.error_message.is_some()).count(),
            oldest_timestamp: entries.iter().map(|e| e.timestamp).min(),
            newest_timestamp: entries.iter().map(|e| e.timestamp).max(),
            file_size_bytes,
            path: self.path.display().to_string(),
        })
    }

    /// Path to the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
