//! Evaluation reports and their on-disk form.
//!
//! A [`LoomReport`] is the complete result of evaluating a story at one
//! chapter. Reports are appended to `loom_reports.jsonl` (JSON Lines) so a
//! host can tail them as chapters are written.

use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use loom_events::{
    StatusChange, ThreadHealth, ThreadPhysics, ThreadSelectionResult, ThreadStatus,
};

/// File name used inside a report directory.
pub const REPORTS_FILE: &str = "loom_reports.jsonl";

/// Physics and health for one thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadReport {
    pub thread_id: String,
    pub status: ThreadStatus,
    pub physics: ThreadPhysics,
    pub health: ThreadHealth,
}

/// Complete result of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoomReport {
    /// Chapter the report describes
    pub chapter: u32,
    /// Every thread, in input order
    pub threads: Vec<ThreadReport>,
    /// Threads chosen for the next chapter
    pub selection: ThreadSelectionResult,
    /// Category-weighted story health in [0, 100]
    pub overall_health: f32,
    /// Closed and abandoned threads
    pub terminal_count: usize,
    /// Lifecycle changes made while advancing into this chapter
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status_changes: Vec<StatusChange>,
}

impl LoomReport {
    /// Attaches the changes produced by a chapter advance.
    pub fn with_changes(mut self, changes: Vec<StatusChange>) -> Self {
        self.status_changes = changes;
        self
    }

    /// Looks up one thread's entry.
    pub fn thread(&self, thread_id: &str) -> Option<&ThreadReport> {
        self.threads.iter().find(|t| t.thread_id == thread_id)
    }

    /// Serializes the report to JSON.
    pub fn to_json(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self).map_err(ReportError::Json)
    }

    /// Serializes the report to compact JSON (single line).
    pub fn to_json_compact(&self) -> Result<String, ReportError> {
        serde_json::to_string(self).map_err(ReportError::Json)
    }
}

/// Errors that can occur while writing or reading reports.
#[derive(Debug)]
pub enum ReportError {
    /// I/O error (file operations)
    Io(std::io::Error),
    /// JSON serialization error
    Json(serde_json::Error),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "I/O error: {}", e),
            ReportError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Io(e) => Some(e),
            ReportError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        ReportError::Io(e)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        ReportError::Json(e)
    }
}

/// Appends reports to `loom_reports.jsonl` in a directory.
///
/// Existing content is kept, so successive runs build up a chapter history.
#[derive(Debug)]
pub struct ReportWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    reports_written: u64,
}

impl ReportWriter {
    /// Opens (or creates) the report file in `output_dir`.
    pub fn new(output_dir: &Path) -> Result<Self, ReportError> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(REPORTS_FILE);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            reports_written: 0,
        })
    }

    /// Writes one report as a single line.
    pub fn write(&mut self, report: &LoomReport) -> Result<(), ReportError> {
        let json = serde_json::to_string(report)?;
        writeln!(self.writer, "{}", json)?;
        self.reports_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ReportError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Reports written by this writer (not counting earlier runs).
    pub fn reports_written(&self) -> u64 {
        self.reports_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads reports back from a JSON Lines file.
#[derive(Debug)]
pub struct ReportReader {
    path: PathBuf,
}

impl ReportReader {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Creates a reader for `loom_reports.jsonl` in a directory.
    pub fn from_dir(output_dir: &Path) -> Self {
        Self::new(&output_dir.join(REPORTS_FILE))
    }

    /// Reads every report, skipping blank lines.
    pub fn read_all(&self) -> Result<Vec<LoomReport>, ReportError> {
        let content = fs::read_to_string(&self.path)?;
        let mut reports = Vec::new();

        for line in content.lines() {
            if !line.trim().is_empty() {
                reports.push(serde_json::from_str(line)?);
            }
        }

        Ok(reports)
    }

    /// Most recent report for `chapter`, if any.
    pub fn read_chapter(&self, chapter: u32) -> Result<Option<LoomReport>, ReportError> {
        Ok(self
            .read_all()?
            .into_iter()
            .rev()
            .find(|report| report.chapter == chapter))
    }
}
