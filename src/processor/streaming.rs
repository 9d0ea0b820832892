//! Concurrent corpus assembly for SUNA log directories
//!
//! Reads every discovered file on the blocking pool with bounded
//! concurrency, records a per-file outcome and stacks the surviving tables
//! in file-list order.

use super::discovery::FileDiscovery;
use super::reader::LogFileReader;

use crate::config::SunaConfig;
use crate::error::{Result, SunaError};
use crate::header::LayoutVersion;
use crate::models::{BatchReport, FileOutcome};
use crate::table::Table;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, info, warn};

/// Builds one table from all matching log files in a directory
#[derive(Debug)]
pub struct CorpusAssembler {
    config: SunaConfig,
}

impl CorpusAssembler {
    pub fn new(config: SunaConfig) -> Self {
        Self { config }
    }

    /// Discover and read the directory's log files
    pub async fn assemble(&self, directory: &Path) -> Result<(Table, BatchReport)> {
        let files = FileDiscovery::new(directory.to_path_buf(), &self.config.file_pattern)
            .discover()
            .await?;
        info!(
            "Assembling {} files from {}",
            files.len(),
            directory.display()
        );
        self.read_files(&files).await
    }

    /// Read the given files, in order, into a single table
    pub async fn read_files(&self, files: &[PathBuf]) -> Result<(Table, BatchReport)> {
        let version = self.config.layout_version;
        let index_label = self.config.index_label();
        let reader = Arc::new(LogFileReader::new(version, self.config.utc_offset_hours)?);

        let pb = self.progress_bar(files.len());
        let concurrent_limit = self.config.max_concurrent_files.clamp(1, files.len().max(1));
        debug!("Reading files with concurrency {}", concurrent_limit);

        let results: Vec<_> = stream::iter(files.iter().cloned())
            .map(|path| {
                let reader = Arc::clone(&reader);
                let pb = pb.clone();
                async move {
                    if let Some(name) = path.file_name() {
                        pb.set_message(format!("Reading: {}", name.to_string_lossy()));
                    }

                    let task_path = path.clone();
                    let result = task::spawn_blocking(move || reader.read(&task_path))
                        .await
                        .unwrap_or_else(|e| {
                            Err(SunaError::file_read(&path, format!("read task failed: {}", e)))
                        });
                    pb.inc(1);
                    (path, result)
                }
            })
            .buffered(concurrent_limit)
            .collect()
            .await;

        pb.finish_with_message("All log files read");

        let mut report = BatchReport::default();
        let mut tables = Vec::new();

        for (path, result) in results {
            match result {
                Ok((table, counts)) if counts.decoded > 0 => {
                    tables.push(table);
                    report.push(path, FileOutcome::Loaded(counts));
                }
                Ok((_, counts)) => {
                    info!("No usable rows in {}", path.display());
                    report.push(path, FileOutcome::Empty(counts));
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report.push(
                        path,
                        FileOutcome::Failed {
                            reason: e.to_string(),
                        },
                    );
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "{} files loaded, {} failed, {} rows",
            report.files_loaded(),
            report.files_failed(),
            report.total_rows()
        );

        let table = Table::concat(version, &index_label, tables)?;
        Ok((table, report))
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb.set_message("Reading log files");
        pb
    }
}

/// Assemble one directory's logs with default settings for everything
/// except the arguments given
pub async fn assemble(
    directory: &Path,
    pattern: &str,
    version: LayoutVersion,
    utc_offset_hours: f64,
    index_label: &str,
) -> Result<(Table, BatchReport)> {
    let config = SunaConfig::default()
        .with_file_pattern(pattern)
        .with_layout_version(version)
        .with_utc_offset(utc_offset_hours)
        .with_index_label(index_label);
    CorpusAssembler::new(config).assemble(directory).await
}
