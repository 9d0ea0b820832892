//! Single-file reading for SUNA logs
//!
//! Skips the instrument preamble, decodes each data line and builds the
//! file's table. Bad rows are dropped and counted; problems with the file
//! as a whole surface as a `FileRead` error for the caller to isolate.

use crate::constants::{DEFAULT_INDEX_LABEL, PREAMBLE_LINES};
use crate::decoder::{Decoded, RawRow, RecordDecoder};
use crate::error::{Result, SunaError};
use crate::header::LayoutVersion;
use crate::models::RowCounts;
use crate::table::Table;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct LogFileReader {
    decoder: RecordDecoder,
    index_label: String,
}

impl LogFileReader {
    pub fn new(version: LayoutVersion, utc_offset_hours: f64) -> Result<Self> {
        Ok(Self {
            decoder: RecordDecoder::new(version, utc_offset_hours)?,
            index_label: DEFAULT_INDEX_LABEL.to_string(),
        })
    }

    pub fn with_index_label(mut self, label: impl Into<String>) -> Self {
        self.index_label = label.into();
        self
    }

    pub fn version(&self) -> LayoutVersion {
        self.decoder.version()
    }

    /// Read one log file into a table plus its row counters
    pub fn read(&self, path: &Path) -> Result<(Table, RowCounts)> {
        let file = File::open(path).map_err(|e| SunaError::file_read(path, e.to_string()))?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        let mut counts = RowCounts::default();
        let mut lines_seen = 0;

        for (index, chunk) in reader.split(b'\n').enumerate() {
            let bytes = chunk.map_err(|e| SunaError::file_read(path, e.to_string()))?;
            lines_seen = index + 1;
            if index < PREAMBLE_LINES {
                continue;
            }

            let text = String::from_utf8_lossy(&bytes);
            let text = text.trim_end_matches('\r');
            if text.trim().is_empty() {
                continue;
            }

            match self.decoder.decode(&RawRow::from_line(index + 1, text)) {
                Ok(Decoded::Record(record)) => {
                    records.push(record);
                    counts.decoded += 1;
                }
                Ok(Decoded::Skipped(reason)) => {
                    trace!("{}: line {} skipped ({:?})", path.display(), index + 1, reason);
                    counts.skipped += 1;
                }
                Err(e @ SunaError::MalformedRow { .. }) => {
                    debug!("{}: {}", path.display(), e);
                    counts.malformed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if lines_seen < PREAMBLE_LINES {
            return Err(SunaError::file_read(
                path,
                format!(
                    "{} lines is shorter than the {}-line preamble",
                    lines_seen, PREAMBLE_LINES
                ),
            ));
        }

        if counts.malformed > 0 && counts.malformed == counts.total() {
            return Err(SunaError::file_read(
                path,
                format!("all {} data rows are malformed", counts.malformed),
            ));
        }

        debug!(
            "{}: {} rows decoded, {} skipped, {} malformed",
            path.display(),
            counts.decoded,
            counts.skipped,
            counts.malformed
        );

        let table = Table::from_records(self.version(), &self.index_label, &records)?;
        Ok((table, counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::tests::{v2_line, write_log};
    use tempfile::TempDir;

    fn reader() -> LogFileReader {
        LogFileReader::new(LayoutVersion::V2, 0.0).unwrap()
    }

    #[test]
    fn test_read_counts_rows() {
        let temp_dir = TempDir::new().unwrap();
        let lines = vec![
            v2_line("2016213", "10.0", "1.5"),
            String::new(),
            v2_line("2016213", "24.0", "1.5"),
            v2_line("2016213", "10.5", "abc"),
            v2_line("2016213", "11.0", ""),
        ];
        let path = write_log(temp_dir.path(), "D2016213.csv", &lines);

        let (table, counts) = reader().read(&path).unwrap();
        assert_eq!(
            counts,
            RowCounts {
                decoded: 2,
                skipped: 1,
                malformed: 1,
            }
        );
        assert_eq!(table.height(), 2);
        assert_eq!(table.index_label(), DEFAULT_INDEX_LABEL);
    }

    #[test]
    fn test_preamble_only_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_log(temp_dir.path(), "D2016214.csv", &[]);

        let (table, counts) = reader().read(&path).unwrap();
        assert!(table.is_empty());
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_truncated_preamble_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("D2016215.csv");
        std::fs::write(&path, "SATSLF,header\nSATSLF,header\n").unwrap();

        match reader().read(&path) {
            Err(SunaError::FileRead { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("Expected FileRead, got {:?}", other),
        }
    }

    #[test]
    fn test_all_malformed_fails() {
        let temp_dir = TempDir::new().unwrap();
        let lines = vec!["SATSLF1234,garbage".to_string(), "SATSLF1234,1,2,3".to_string()];
        let path = write_log(temp_dir.path(), "D2016216.csv", &lines);

        assert!(matches!(
            reader().read(&path),
            Err(SunaError::FileRead { .. })
        ));
    }

    #[test]
    fn test_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = reader().read(&temp_dir.path().join("absent.csv"));
        assert!(matches!(result, Err(SunaError::FileRead { .. })));
    }

    #[test]
    fn test_crlf_and_invalid_utf8_tolerated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("D2016217.csv");

        let mut bytes = Vec::new();
        for _ in 0..PREAMBLE_LINES {
            bytes.extend_from_slice(b"SATSLF,\xff\xfe preamble\r\n");
        }
        bytes.extend_from_slice(v2_line("2016217", "12.0", "2.5").as_bytes());
        bytes.extend_from_slice(b"\r\n");
        std::fs::write(&path, bytes).unwrap();

        let (table, counts) = reader().read(&path).unwrap();
        assert_eq!(counts.decoded, 1);
        assert_eq!(table.height(), 1);
    }
}
