//! SUNA Processor Library
//!
//! Turns directories of daily SUNA nitrate sensor logs into fixed-interval
//! time series.
//!
//! This library provides tools for:
//! - Decoding both instrument record layouts, including packed dates and
//!   decimal hours
//! - Reading a directory of logs concurrently with per-file failure isolation
//! - Window means and medians of every column
//! - A two-pass MAD outlier screen and plausibility filter for nitrate
//! - Deterministic CSV output

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod header;
pub mod models;
pub mod processor;
pub mod screen;
pub mod table;

pub use aggregate::{IntervalAggregator, Reduction, WindowedTable};
pub use config::{RangeConfig, ScreenConfig, SunaConfig};
pub use error::{Result, SunaError};
pub use header::{LayoutVersion, get_header};
pub use models::{BatchReport, FileOutcome, ProcessingStats};
pub use processor::SunaProcessor;
pub use screen::{RangeFilter, RobustScreen};
pub use table::Table;
