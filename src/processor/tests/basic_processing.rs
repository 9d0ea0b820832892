//! Basic processing integration tests

use super::{log_line, v2_line, write_log};
use crate::config::SunaConfig;
use crate::header::LayoutVersion;
use crate::processor::SunaProcessor;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Two files covering three 15-minute windows (10:00, 10:15, 10:30 EST)
fn create_log_directory(temp_dir: &TempDir) -> PathBuf {
    let dir = temp_dir.path().join("SUNA_2016");
    fs::create_dir_all(&dir).unwrap();

    write_log(
        &dir,
        "D2016213.csv",
        &[
            v2_line("2016213", "15.0", "1.5"),
            v2_line("2016213", "15.125", "1.7"),
            v2_line("2016213", "15.25", "2.0"),
        ],
    );
    write_log(
        &dir,
        "D2016214.csv",
        &[
            v2_line("2016213", "15.5", "2.2"),
            v2_line("2016213", "15.625", "2.4"),
        ],
    );
    dir
}

fn data_lines(path: &PathBuf) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .skip(1)
        .map(|line| line.to_string())
        .collect()
}

#[tokio::test]
async fn test_basic_processing_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_log_directory(&temp_dir);

    let processor = SunaProcessor::new(dir.clone(), None).unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.files_processed(), 2);
    assert_eq!(stats.files_failed(), 0);
    assert_eq!(stats.total_rows(), 5);
    assert_eq!(stats.windows, 3);
    assert_eq!(stats.screened_missing, 0);
    assert_eq!(stats.screened_kept, 3);
    assert_eq!(stats.outputs.len(), 3);

    let mean = dir.join("SUNA_2016_mean.csv");
    let median = dir.join("SUNA_2016_median.csv");
    let mad = dir.join("SUNA_NO3_mad.csv");

    let header = fs::read_to_string(&mean).unwrap();
    assert!(header.starts_with("Datetime (EST),"));

    for path in [&mean, &median] {
        let rows = data_lines(path);
        assert_eq!(rows.len(), 3, "{}", path.display());
        for row in &rows {
            assert!(!row.contains(",,") && !row.ends_with(','), "missing value in {}", row);
        }
    }

    let rows = data_lines(&mad);
    let starts: Vec<&str> = rows.iter().map(|row| &row[..19]).collect();
    assert_eq!(
        starts,
        vec![
            "2016-07-31 10:00:00",
            "2016-07-31 10:15:00",
            "2016-07-31 10:30:00"
        ]
    );
    assert!(rows[1].ends_with(",2.0") || rows[1].ends_with(",2"));
}

#[tokio::test]
async fn test_processing_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_log_directory(&temp_dir);
    let processor = SunaProcessor::new(dir, None).unwrap();

    let first = processor.process().await.unwrap();
    let snapshot: Vec<Vec<u8>> = first
        .outputs
        .iter()
        .map(|path| fs::read(path).unwrap())
        .collect();

    let second = processor.process().await.unwrap();
    assert_eq!(first.outputs, second.outputs);
    for (path, before) in second.outputs.iter().zip(snapshot) {
        assert_eq!(fs::read(path).unwrap(), before, "{} changed", path.display());
    }
}

#[tokio::test]
async fn test_screened_out_window_is_dropped_from_mad_output() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_log_directory(&temp_dir);
    // Fault codes only at 10:45 EST
    write_log(
        &dir,
        "D2016215.csv",
        &[
            v2_line("2016213", "15.75", "-1"),
            v2_line("2016213", "15.8", "-1"),
        ],
    );

    let mut config = SunaConfig::default();
    config.write_raw_mad = true;
    config.prefix_mad_output = true;
    let processor = SunaProcessor::new(dir.clone(), None)
        .unwrap()
        .with_config(config);

    let stats = processor.process().await.unwrap();
    assert_eq!(stats.windows, 4);
    assert_eq!(stats.screened_missing, 1);
    assert_eq!(stats.screened_kept, 3);

    assert_eq!(data_lines(&dir.join("SUNA_2016_SUNA_NO3_mad.csv")).len(), 3);

    let raw = data_lines(&dir.join("SUNA_2016_SUNA_NO3_mad_raw.csv"));
    assert_eq!(raw.len(), 4);
    assert_eq!(raw[3], "2016-07-31 10:45:00,");
}

#[tokio::test]
async fn test_v1_layout_processing() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("SUNA_V1");
    fs::create_dir_all(&dir).unwrap();
    write_log(
        &dir,
        "D2012100.csv",
        &[
            log_line(LayoutVersion::V1, "2012100", "8.0", "0.9"),
            log_line(LayoutVersion::V1, "2012100", "8.1", "1.1"),
        ],
    );

    let output_dir = temp_dir.path().join("out");
    let config = SunaConfig::default()
        .with_layout_version(LayoutVersion::V1)
        .with_utc_offset(0.0)
        .with_interval_minutes(60);
    let processor = SunaProcessor::new(dir, Some(output_dir.clone()))
        .unwrap()
        .with_config(config);

    let stats = processor.process().await.unwrap();
    assert_eq!(stats.windows, 1);

    let mad = fs::read_to_string(output_dir.join("SUNA_NO3_mad.csv")).unwrap();
    let mut lines = mad.lines();
    assert_eq!(lines.next(), Some("Datetime (UTC),NITRATE_MG"));
    assert!(lines.next().unwrap().starts_with("2012-04-09 08:00:00,"));

    let mean = fs::read_to_string(output_dir.join("SUNA_V1_mean.csv")).unwrap();
    let header = mean.lines().next().unwrap();
    assert_eq!(header.split(',').count(), 240);
    assert!(header.contains("CHANNEL(226)"));
}
