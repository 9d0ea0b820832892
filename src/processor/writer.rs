//! CSV output for aggregated SUNA series
//!
//! Resolves output file names from the source directory and writes frames
//! with a fixed timestamp format so repeated runs are byte-identical.

use crate::config::SunaConfig;
use crate::constants::{
    MAD_OUTPUT_NAME, MAD_RAW_OUTPUT_NAME, MEAN_SUFFIX, MEDIAN_SUFFIX, OUTPUT_DATETIME_FORMAT,
};
use crate::error::Result;

use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output file locations for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub mean: PathBuf,
    pub median: PathBuf,
    pub mad: PathBuf,
    pub mad_raw: Option<PathBuf>,
}

#[derive(Debug)]
pub struct CsvOutputWriter {
    output_dir: PathBuf,
    paths: OutputPaths,
}

impl CsvOutputWriter {
    /// Outputs go to `output_dir`, or next to the logs when unset
    pub fn new(source_dir: &Path, output_dir: Option<PathBuf>, config: &SunaConfig) -> Self {
        let output_dir = output_dir.unwrap_or_else(|| source_dir.to_path_buf());
        let basename = directory_basename(source_dir);

        let mad_name = if config.prefix_mad_output {
            format!("{}_{}", basename, MAD_OUTPUT_NAME)
        } else {
            MAD_OUTPUT_NAME.to_string()
        };

        let paths = OutputPaths {
            mean: output_dir.join(format!("{}{}", basename, MEAN_SUFFIX)),
            median: output_dir.join(format!("{}{}", basename, MEDIAN_SUFFIX)),
            mad: output_dir.join(mad_name),
            mad_raw: config
                .write_raw_mad
                .then(|| output_dir.join(format!("{}_{}", basename, MAD_RAW_OUTPUT_NAME))),
        };

        Self { output_dir, paths }
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    /// Write a frame as comma-separated text with a header row
    pub fn write(&self, frame: &mut DataFrame, path: &Path) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let mut file = File::create(path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_datetime_format(Some(OUTPUT_DATETIME_FORMAT.to_string()))
            .finish(frame)?;

        debug!(
            "Wrote {} rows x {} columns to {}",
            frame.height(),
            frame.width(),
            path.display()
        );
        Ok(path.to_path_buf())
    }
}

/// Final component of the source directory, resolving `.` and similar
pub fn directory_basename(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .or_else(|| {
            fs::canonicalize(dir)
                .ok()
                .and_then(|full| full.file_name().map(|name| name.to_string_lossy().to_string()))
        })
        .unwrap_or_else(|| "suna".to_string())
}
