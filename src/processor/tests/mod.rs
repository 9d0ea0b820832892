//! Integration tests for the processor module
//!
//! Tests the complete processing pipeline against synthetic SUNA log
//! directories written to temporary locations.

pub mod basic_processing;

use crate::constants::PREAMBLE_LINES;
use crate::header::LayoutVersion;
use std::fs;
use std::path::{Path, PathBuf};

/// Data line for `version` with the given date, hour and nitrate fields;
/// every other value column is `1.0`
pub fn log_line(version: LayoutVersion, date: &str, hour: &str, nitrate: &str) -> String {
    let mut fields = vec![
        "SATSLF1234".to_string(),
        date.to_string(),
        hour.to_string(),
        "80.5".to_string(),
        nitrate.to_string(),
    ];
    while fields.len() < 1 + version.field_count() {
        fields.push("1.0".to_string());
    }
    fields.join(",")
}

pub fn v2_line(date: &str, hour: &str, nitrate: &str) -> String {
    log_line(LayoutVersion::V2, date, hour, nitrate)
}

/// Write a log file with the instrument preamble followed by `lines`
pub fn write_log(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let mut text = String::new();
    for i in 0..PREAMBLE_LINES {
        text.push_str(&format!("SATSLF1234,preamble line {}\n", i + 1));
    }
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }

    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}
