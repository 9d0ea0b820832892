//! Core data structures for SUNA processing.
//!
//! Defines decoded records, per-file outcomes, the batch report that
//! replaces printed diagnostics, and run statistics.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One decoded log row: a timestamp plus the numeric value of every
/// non-source layout column, in layout order. `None` marks an empty field.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub timestamp: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

/// Why a syntactically valid row was left out of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Decimal hour outside (0, 24)
    HourOutOfRange,
    /// Nonzero packed date whose year part is zero
    UndatedYear,
}

/// Row counters for a single log file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCounts {
    pub decoded: usize,
    pub skipped: usize,
    pub malformed: usize,
}

impl RowCounts {
    pub fn total(&self) -> usize {
        self.decoded + self.skipped + self.malformed
    }
}

/// Result of reading one file in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FileOutcome {
    Loaded(RowCounts),
    /// File was readable but held no usable rows
    Empty(RowCounts),
    Failed { reason: String },
}

impl FileOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn rows(&self) -> usize {
        match self {
            Self::Loaded(counts) => counts.decoded,
            _ => 0,
        }
    }
}

/// Per-batch record of what happened to every matched file, in read order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub files: Vec<(PathBuf, FileOutcome)>,
}

impl BatchReport {
    pub fn push(&mut self, path: PathBuf, outcome: FileOutcome) {
        self.files.push((path, outcome));
    }

    pub fn files_loaded(&self) -> usize {
        self.files
            .iter()
            .filter(|(_, outcome)| matches!(outcome, FileOutcome::Loaded(_)))
            .count()
    }

    pub fn files_failed(&self) -> usize {
        self.files.iter().filter(|(_, outcome)| outcome.is_failed()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &str)> {
        self.files.iter().filter_map(|(path, outcome)| match outcome {
            FileOutcome::Failed { reason } => Some((path, reason.as_str())),
            _ => None,
        })
    }

    pub fn total_rows(&self) -> usize {
        self.files.iter().map(|(_, outcome)| outcome.rows()).sum()
    }

    /// Combined row counters across loaded and empty files
    pub fn row_counts(&self) -> RowCounts {
        self.files
            .iter()
            .fold(RowCounts::default(), |mut acc, (_, outcome)| {
                if let FileOutcome::Loaded(counts) | FileOutcome::Empty(counts) = outcome {
                    acc.decoded += counts.decoded;
                    acc.skipped += counts.skipped;
                    acc.malformed += counts.malformed;
                }
                acc
            })
    }
}

/// Processing statistics for a complete run
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub report: BatchReport,
    pub windows: usize,
    pub screened_missing: usize,
    pub screened_kept: usize,
    pub outputs: Vec<PathBuf>,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    pub fn files_processed(&self) -> usize {
        self.report.files_loaded()
    }

    pub fn files_failed(&self) -> usize {
        self.report.files_failed()
    }

    pub fn total_rows(&self) -> usize {
        self.report.total_rows()
    }
}
