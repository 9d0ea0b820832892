//! Configuration management and validation.
//!
//! Provides the processing parameters for a SUNA run, the typed thresholds
//! for the MAD screen and the final range filter, and validation rules that
//! turn bad parameters into configuration errors before any file is read.

use crate::constants::*;
use crate::error::{Result, SunaError};
use crate::header::LayoutVersion;
use serde::{Deserialize, Serialize};
use std::path::MAIN_SEPARATOR;
use tracing::debug;

/// Thresholds for the two-pass MAD outlier screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Values at or above this are dropped before the MAD is computed
    pub upper_limit: f64,

    /// Values at or below this are dropped before the MAD is computed
    pub lower_limit: f64,

    /// Number of scaled MADs a value may sit from the median
    pub criteria: f64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            upper_limit: DEFAULT_SCREEN_UPPER_LIMIT,
            lower_limit: DEFAULT_SCREEN_LOWER_LIMIT,
            criteria: DEFAULT_MAD_CRITERIA,
        }
    }
}

impl ScreenConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.lower_limit.is_finite() && self.upper_limit.is_finite()) {
            return Err(SunaError::configuration("Screen limits must be finite"));
        }
        if self.lower_limit >= self.upper_limit {
            return Err(SunaError::configuration(format!(
                "Screen lower limit {} must be below upper limit {}",
                self.lower_limit, self.upper_limit
            )));
        }
        if !self.criteria.is_finite() || self.criteria < 0.0 {
            return Err(SunaError::configuration(format!(
                "MAD criteria must be a non-negative number, got {}",
                self.criteria
            )));
        }
        Ok(())
    }
}

/// Exclusive bounds of the physically plausible concentration range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub low: f64,
    pub high: f64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            low: DEFAULT_RANGE_LOW,
            high: DEFAULT_RANGE_HIGH,
        }
    }
}

impl RangeConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.low.is_finite() && self.high.is_finite()) || self.low >= self.high {
            return Err(SunaError::configuration(format!(
                "Range filter bounds ({}, {}) are not a valid interval",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// Global configuration for SUNA processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SunaConfig {
    /// Glob matched against file names in the source directory
    pub file_pattern: String,

    /// Record layout of the instrument firmware
    pub layout_version: LayoutVersion,

    /// Aggregation window in minutes
    pub interval_minutes: u32,

    /// Hours added to instrument timestamps (signed)
    pub utc_offset_hours: f64,

    /// Name of the timestamp column; derived from the offset when unset
    pub index_label: Option<String>,

    pub screen: ScreenConfig,

    pub range: RangeConfig,

    /// Prefix the MAD output with the directory name
    pub prefix_mad_output: bool,

    /// Also write the screened series before the range filter
    pub write_raw_mad: bool,

    /// Maximum concurrent file reads
    pub max_concurrent_files: usize,

    /// Draw a progress bar while reading files
    pub show_progress: bool,
}

impl Default for SunaConfig {
    fn default() -> Self {
        Self {
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            layout_version: LayoutVersion::V2,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            index_label: None,
            screen: ScreenConfig::default(),
            range: RangeConfig::default(),
            prefix_mad_output: false,
            write_raw_mad: false,
            max_concurrent_files: num_cpus::get().clamp(1, MAX_CONCURRENT_FILES),
            show_progress: false,
        }
    }
}

impl SunaConfig {
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    pub fn with_layout_version(mut self, version: LayoutVersion) -> Self {
        self.layout_version = version;
        self
    }

    pub fn with_interval_minutes(mut self, minutes: u32) -> Self {
        self.interval_minutes = minutes;
        self
    }

    pub fn with_utc_offset(mut self, hours: f64) -> Self {
        self.utc_offset_hours = hours;
        self
    }

    pub fn with_index_label(mut self, label: impl Into<String>) -> Self {
        self.index_label = Some(label.into());
        self
    }

    pub fn with_screen(mut self, screen: ScreenConfig) -> Self {
        self.screen = screen;
        self
    }

    pub fn with_range(mut self, range: RangeConfig) -> Self {
        self.range = range;
        self
    }

    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Timestamp column name for this run
    pub fn index_label(&self) -> String {
        self.index_label
            .clone()
            .unwrap_or_else(|| timezone_label(self.utc_offset_hours))
    }

    pub fn validate(&self) -> Result<()> {
        if self.file_pattern.trim().is_empty() {
            return Err(SunaError::configuration("File pattern must not be empty"));
        }
        if self.file_pattern.contains('/') || self.file_pattern.contains(MAIN_SEPARATOR) {
            return Err(SunaError::configuration(format!(
                "File pattern '{}' must match names within the source directory",
                self.file_pattern
            )));
        }
        if self.interval_minutes == 0 {
            return Err(SunaError::configuration(
                "Aggregation window must be at least one minute",
            ));
        }
        if !self.utc_offset_hours.is_finite() || self.utc_offset_hours.abs() > 24.0 {
            return Err(SunaError::configuration(format!(
                "UTC offset {} is outside [-24, 24] hours",
                self.utc_offset_hours
            )));
        }
        if self.max_concurrent_files == 0 {
            return Err(SunaError::configuration(
                "At least one concurrent file read is required",
            ));
        }
        self.screen.validate()?;
        self.range.validate()?;

        debug!("Configuration validated: {:?}", self);
        Ok(())
    }
}

/// Timestamp column label for a UTC offset, e.g. `Datetime (EST)` for -5
pub fn timezone_label(utc_offset_hours: f64) -> String {
    let minutes = (utc_offset_hours * 60.0).round() as i64;
    let zone = match minutes {
        0 => "UTC".to_string(),
        -300 => "EST".to_string(),
        -360 => "CST".to_string(),
        -420 => "MST".to_string(),
        -480 => "PST".to_string(),
        -540 => "AKST".to_string(),
        -600 => "HST".to_string(),
        other => {
            let sign = if other < 0 { '-' } else { '+' };
            let abs = other.abs();
            format!("UTC{}{:02}:{:02}", sign, abs / 60, abs % 60)
        }
    };
    format!("Datetime ({})", zone)
}
