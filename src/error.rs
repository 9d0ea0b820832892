//! Error handling for SUNA log processing.
//!
//! Separates fatal configuration failures from the recoverable row, file and
//! window level conditions that the pipeline absorbs into its batch report.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SunaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Source directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("No files matching '{pattern}' found in {directory}")]
    NoFilesFound { directory: PathBuf, pattern: String },

    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("Could not read log file {path}: {reason}")]
    FileRead { path: PathBuf, reason: String },

    #[error("No values survived outlier screening ({survivors} after pre-screen)")]
    InsufficientData { survivors: usize },
}

impl SunaError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    pub fn file_read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileRead {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for conditions the batch recovers from instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedRow { .. } | Self::FileRead { .. } | Self::InsufficientData { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SunaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(SunaError::malformed(15, "bad date").is_recoverable());
        assert!(SunaError::file_read("D2016213.CSV", "truncated").is_recoverable());
        assert!(SunaError::InsufficientData { survivors: 0 }.is_recoverable());
        assert!(!SunaError::configuration("unknown layout").is_recoverable());
        assert!(
            !SunaError::NoFilesFound {
                directory: PathBuf::from("data"),
                pattern: "D*.csv".to_string(),
            }
            .is_recoverable()
        );
    }

    #[test]
    fn test_error_messages_name_the_file() {
        let err = SunaError::file_read("/data/D2016213.CSV", "only 3 lines");
        let message = err.to_string();
        assert!(message.contains("D2016213.CSV"));
        assert!(message.contains("only 3 lines"));
    }
}
