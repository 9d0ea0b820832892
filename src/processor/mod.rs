//! Main processing engine for SUNA log directories.
//!
//! Orchestrates the complete workflow: file discovery and concurrent
//! reading, fixed-window aggregation, per-window MAD screening of nitrate,
//! the final range filter and CSV output.

pub mod discovery;
pub mod reader;
pub mod streaming;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::streaming::CorpusAssembler;
use self::writer::{CsvOutputWriter, OutputPaths};

use crate::aggregate::IntervalAggregator;
use crate::config::SunaConfig;
use crate::error::{Result, SunaError};
use crate::models::ProcessingStats;
use crate::screen::{RangeFilter, RobustScreen};

use colored::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, trace, warn};

/// Main processor for one directory of SUNA logs
#[derive(Debug)]
pub struct SunaProcessor {
    source_dir: PathBuf,
    output_dir: Option<PathBuf>,
    config: SunaConfig,
    writer: CsvOutputWriter,
}

impl SunaProcessor {
    /// Create a processor; outputs default to the source directory
    pub fn new(source_dir: PathBuf, output_dir: Option<PathBuf>) -> Result<Self> {
        if !source_dir.is_dir() {
            return Err(SunaError::DirectoryNotFound { path: source_dir });
        }

        let config = SunaConfig::default();
        let writer = CsvOutputWriter::new(&source_dir, output_dir.clone(), &config);

        Ok(Self {
            source_dir,
            output_dir,
            config,
            writer,
        })
    }

    /// Configure the processor
    pub fn with_config(mut self, config: SunaConfig) -> Self {
        self.writer = CsvOutputWriter::new(&self.source_dir, self.output_dir.clone(), &config);
        self.config = config;
        self
    }

    pub fn config(&self) -> &SunaConfig {
        &self.config
    }

    pub fn output_paths(&self) -> &OutputPaths {
        self.writer.paths()
    }

    fn announce(&self, message: &str) {
        if self.config.show_progress {
            println!("\n{}", message.bright_yellow());
        }
    }

    /// Main processing entry point
    pub async fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        self.config.validate()?;
        let aggregator = IntervalAggregator::new(self.config.interval_minutes)?;
        let nitrate = self.config.layout_version.nitrate_column();

        if self.config.show_progress {
            println!("{}", "Starting SUNA log processing".bright_green().bold());
            println!(
                "  {} {}",
                "Source:".bright_cyan(),
                self.source_dir.display()
            );
            println!(
                "  {} {} ({})",
                "Layout:".bright_cyan(),
                self.config.layout_version,
                self.config.file_pattern
            );
        }

        // Step 1: Read every matching log into one table
        self.announce("Reading log files...");
        let (table, report) = CorpusAssembler::new(self.config.clone())
            .assemble(&self.source_dir)
            .await?;
        if table.is_empty() {
            warn!("No rows decoded from {}", self.source_dir.display());
        }

        // Step 2: Window means and medians of every column
        self.announce("Aggregating windows...");
        let windowed = aggregator.aggregate(&table)?;
        let mut mean = windowed.mean()?;
        let mut median = windowed.median()?;
        info!(
            "{} rows grouped into {} {}-minute windows",
            table.height(),
            mean.height(),
            self.config.interval_minutes
        );

        // Step 3: Robust nitrate series
        self.announce("Screening nitrate...");
        let screen = RobustScreen::new(self.config.screen);
        let mut screened = windowed.custom(nitrate, |values| match screen.screen(values) {
            Ok(value) => Some(value),
            Err(e) => {
                trace!("Window left empty: {}", e);
                None
            }
        })?;
        let screened_missing = screened.column(nitrate)?.null_count();
        if screened_missing > 0 {
            warn!(
                "{} of {} windows had no nitrate values survive screening",
                screened_missing,
                screened.height()
            );
        }

        // Step 4: Plausible range only
        let mut filtered = RangeFilter::new(self.config.range).filter(&screened, nitrate)?;

        // Step 5: Write outputs
        self.announce("Writing outputs...");
        let paths = self.writer.paths().clone();
        let mut outputs = vec![
            self.writer.write(&mut mean, &paths.mean)?,
            self.writer.write(&mut median, &paths.median)?,
            self.writer.write(&mut filtered, &paths.mad)?,
        ];
        if let Some(raw) = &paths.mad_raw {
            outputs.push(self.writer.write(&mut screened, raw)?);
        }

        let stats = ProcessingStats {
            windows: mean.height(),
            screened_missing,
            screened_kept: filtered.height(),
            outputs,
            report,
            processing_time_ms: start_time.elapsed().as_millis(),
        };
        info!(
            "Processed {} files ({} failed) in {}ms",
            stats.files_processed(),
            stats.files_failed(),
            stats.processing_time_ms
        );
        Ok(stats)
    }
}
