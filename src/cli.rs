//! Command-line interface components.

use crate::config::{RangeConfig, ScreenConfig, SunaConfig};
use crate::constants::*;
use crate::error::Result;
use crate::header::LayoutVersion;
use crate::models::ProcessingStats;

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "suna")]
#[command(about = "Aggregate SUNA nitrate sensor logs into screened time series")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory holding the daily SUNA log files
    #[arg(value_name = "LOG_DIR")]
    pub directory: PathBuf,

    /// Glob matched against file names in LOG_DIR
    #[arg(short, long, default_value = DEFAULT_FILE_PATTERN)]
    pub pattern: String,

    /// Instrument record layout (1 = legacy firmware, 2 = current)
    #[arg(long = "suna-version", default_value_t = 2)]
    pub suna_version: u8,

    /// Aggregation window in minutes
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MINUTES)]
    pub interval: u32,

    /// Hours added to instrument UTC timestamps
    #[arg(long, default_value_t = DEFAULT_UTC_OFFSET_HOURS, allow_negative_numbers = true)]
    pub utc_offset: f64,

    /// Timestamp column name (default derived from the UTC offset)
    #[arg(long)]
    pub index_label: Option<String>,

    /// Scaled MADs a value may sit from the window median
    #[arg(long, default_value_t = DEFAULT_MAD_CRITERIA)]
    pub criteria: f64,

    /// Values at or above this are dropped before screening
    #[arg(long, default_value_t = DEFAULT_SCREEN_UPPER_LIMIT)]
    pub upper_limit: f64,

    /// Values at or below this are dropped before screening
    #[arg(long, default_value_t = DEFAULT_SCREEN_LOWER_LIMIT, allow_negative_numbers = true)]
    pub lower_limit: f64,

    /// Exclusive lower bound of the final nitrate range
    #[arg(long, default_value_t = DEFAULT_RANGE_LOW, allow_negative_numbers = true)]
    pub range_low: f64,

    /// Exclusive upper bound of the final nitrate range
    #[arg(long, default_value_t = DEFAULT_RANGE_HIGH)]
    pub range_high: f64,

    /// Output directory (default: LOG_DIR)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Prefix the MAD output file with the directory name
    #[arg(long)]
    pub prefix_mad_output: bool,

    /// Also write the screened nitrate series before range filtering
    #[arg(long)]
    pub write_raw_mad: bool,

    /// Maximum number of files read at once
    #[arg(long)]
    pub max_concurrent_files: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors, no progress output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Build and validate the processing configuration
    pub fn to_config(&self) -> Result<SunaConfig> {
        let mut config = SunaConfig::default()
            .with_file_pattern(self.pattern.clone())
            .with_layout_version(LayoutVersion::from_number(self.suna_version)?)
            .with_interval_minutes(self.interval)
            .with_utc_offset(self.utc_offset)
            .with_screen(ScreenConfig {
                upper_limit: self.upper_limit,
                lower_limit: self.lower_limit,
                criteria: self.criteria,
            })
            .with_range(RangeConfig {
                low: self.range_low,
                high: self.range_high,
            });

        if let Some(label) = &self.index_label {
            config = config.with_index_label(label.clone());
        }
        if let Some(max_files) = self.max_concurrent_files {
            config = config.with_max_concurrent_files(max_files);
        }
        if !self.quiet {
            config = config.with_progress();
        }
        config.prefix_mad_output = self.prefix_mad_output;
        config.write_raw_mad = self.write_raw_mad;

        config.validate()?;
        Ok(config)
    }
}

/// Set up structured logging to stderr; `RUST_LOG` overrides the level
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("suna_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Print the end-of-run summary
pub fn report_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed().to_string().bright_white()
    );
    if stats.files_failed() > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed().to_string().bright_red().bold()
        );
        for (path, reason) in stats.report.failures() {
            println!("    {} {}", path.display().to_string().red(), reason);
        }
    }

    let counts = stats.report.row_counts();
    println!(
        "  {} {} ({} skipped, {} malformed)",
        "Rows decoded:".bright_cyan(),
        counts.decoded.to_string().bright_white().bold(),
        counts.skipped,
        counts.malformed
    );
    println!(
        "  {} {} ({} kept after screening, {} empty)",
        "Windows:".bright_cyan(),
        stats.windows.to_string().bright_white().bold(),
        stats.screened_kept,
        stats.screened_missing
    );
    for output in &stats.outputs {
        println!("  {} {}", "Wrote".bright_green(), output.display());
    }
}
