//! Column layouts for SUNA log records.
//!
//! Each firmware generation writes a fixed set of scalar fields with the
//! spectrometer channels spliced in at a fixed position. The catalog rebuilds
//! those names so data fields can be aligned by position.

use crate::constants::layout::*;
use crate::error::{Result, SunaError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record layout produced by a given instrument firmware generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutVersion {
    /// Legacy firmware: 15 fixed fields and 226 channels
    V1,
    /// Current firmware: 29 fixed fields and 256 channels
    V2,
}

impl LayoutVersion {
    /// Resolve a user-supplied version number
    pub fn from_number(version: u8) -> Result<Self> {
        match version {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(SunaError::configuration(format!(
                "Unsupported SUNA layout version {} (expected 1 or 2)",
                other
            ))),
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    fn fixed_columns(&self) -> &'static [&'static str] {
        match self {
            Self::V1 => V1_FIXED_COLUMNS,
            Self::V2 => V2_FIXED_COLUMNS,
        }
    }

    /// Number of generated spectrometer channel columns
    pub fn channel_count(&self) -> usize {
        match self {
            Self::V1 => V1_CHANNEL_COUNT,
            Self::V2 => V2_CHANNEL_COUNT,
        }
    }

    /// Position of the first channel column
    pub fn channel_offset(&self) -> usize {
        match self {
            Self::V1 => V1_CHANNEL_OFFSET,
            Self::V2 => V2_CHANNEL_OFFSET,
        }
    }

    /// Name of the n-th (1-based) spectrometer channel
    pub fn channel_name(&self, channel: usize) -> String {
        match self {
            Self::V1 => format!("CHANNEL({})", channel),
            Self::V2 => format!("Spectrum channel {}", channel),
        }
    }

    /// Number of data fields following the identifier on each row
    pub fn field_count(&self) -> usize {
        self.fixed_columns().len() + self.channel_count()
    }

    /// Column carrying the packed YYYYDDD date. V1 firmware writes it under
    /// the `INSTRUMENT` header name.
    pub fn date_column(&self) -> &'static str {
        self.fixed_columns()[0]
    }

    /// Column carrying the decimal hour of day (`TIMEFIELD` in V1)
    pub fn time_column(&self) -> &'static str {
        self.fixed_columns()[1]
    }

    /// Column carrying nitrate concentration in mg/L
    pub fn nitrate_column(&self) -> &'static str {
        match self {
            Self::V1 => V1_NITRATE_COLUMN,
            Self::V2 => V2_NITRATE_COLUMN,
        }
    }
}

impl TryFrom<u8> for LayoutVersion {
    type Error = SunaError;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_number(value)
    }
}

impl fmt::Display for LayoutVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SUNA v{}", self.number())
    }
}

/// Ordered column names for every data field after the row identifier
pub fn get_header(version: LayoutVersion) -> Vec<String> {
    let fixed = version.fixed_columns();
    let offset = version.channel_offset();

    let mut header = Vec::with_capacity(version.field_count());
    header.extend(fixed[..offset].iter().map(|name| name.to_string()));
    header.extend((1..=version.channel_count()).map(|i| version.channel_name(i)));
    header.extend(fixed[offset..].iter().map(|name| name.to_string()));
    header
}

/// Column names that survive decoding: the header minus the date and time
/// source fields, which are folded into the timestamp
pub fn value_columns(version: LayoutVersion) -> Vec<String> {
    get_header(version).into_iter().skip(2).collect()
}
