//! Application constants for the SUNA processor
//!
//! Instrument file format facts, default screening thresholds and output
//! naming used throughout the crate.

// =============================================================================
// Log File Format
// =============================================================================

/// Non-data lines written by the instrument at the top of every log file
pub const PREAMBLE_LINES: usize = 14;

/// Field delimiter used by internally logged SUNA files
pub const FIELD_DELIMITER: char = ',';

/// Date substituted when the packed date field is exactly zero
pub const FALLBACK_DATE: (i32, u32, u32) = (2000, 1, 1);

/// Multiplier separating year from day-of-year in the packed date (YYYYDDD)
pub const PACKED_DATE_YEAR_FACTOR: i64 = 1000;

/// Exclusive bounds for the decimal hour field
pub const HOUR_OF_DAY_MIN: f64 = 0.0;
pub const HOUR_OF_DAY_MAX: f64 = 24.0;

// =============================================================================
// Layout Definitions
// =============================================================================

pub mod layout {
    /// Spectrometer channels recorded by legacy firmware
    pub const V1_CHANNEL_COUNT: usize = 226;

    /// Index of the first channel column in the legacy layout
    pub const V1_CHANNEL_OFFSET: usize = 14;

    /// Spectrometer channels recorded by current firmware
    pub const V2_CHANNEL_COUNT: usize = 256;

    /// Index of the first channel column in the current layout
    pub const V2_CHANNEL_OFFSET: usize = 10;

    pub const V1_FIXED_COLUMNS: &[&str] = &[
        "INSTRUMENT",
        "TIMEFIELD",
        "NITRATE_UM",
        "NITRATE_MG",
        "ERROR",
        "T_LAMP",
        "T_SPEC",
        "LAMP_TIME",
        "HUMIDITY",
        "VOLT_12",
        "VOLT_REG",
        "VOLT_MAIN",
        "SPEC_AVG",
        "DARK_AVG",
        "CHECK SUM",
    ];

    pub const V2_FIXED_COLUMNS: &[&str] = &[
        "Date year and day-of-year",
        "Time, hours of day",
        "Nitrate concentration [uM]",
        "Nitrogen in nitrate [mg/L]",
        "Absorbance at 254 nm",
        "Absorbance at 350 nm",
        "Bromide trace [mg/L]",
        "Spectrum average",
        "Dark value used for fit",
        "Integration time factor",
        "Internal temperature [C]",
        "Spectrometer temperature [C]",
        "Lamp temperature [C]",
        "Cumulative lamp on-time [s]",
        "Relative Humidity [%]",
        "Main Voltage [V]",
        "Lamp Voltage [V]",
        "Internal Voltage [V]",
        "Main current [mA]",
        "Fit Aux 1",
        "Fit Aux 2",
        "Fit Base 1",
        "Fit Base 2",
        "Fit RMSE",
        "CTD Time [seconds since 1970]",
        "CTD Salinity [PSU]",
        "CTD Temperature [C]",
        "CTD Pressure [dBar]",
        "Check Sum",
    ];

    /// Nitrate concentration in mg/L, the series that gets MAD screened
    pub const V1_NITRATE_COLUMN: &str = "NITRATE_MG";
    pub const V2_NITRATE_COLUMN: &str = "Nitrogen in nitrate [mg/L]";
}

// =============================================================================
// Screening Defaults
// =============================================================================

/// Pre-screen upper limit in mg/L (sensor saturation)
pub const DEFAULT_SCREEN_UPPER_LIMIT: f64 = 58.0;

/// Pre-screen lower limit in mg/L
pub const DEFAULT_SCREEN_LOWER_LIMIT: f64 = 0.001;

/// Number of scaled MADs a value may sit from the window median
pub const DEFAULT_MAD_CRITERIA: f64 = 2.5;

/// Inverse normal CDF at 0.75; dividing the raw MAD by this makes it a
/// consistent estimator of the standard deviation for normal data
pub const MAD_NORMAL_CONSISTENCY: f64 = 0.674_489_750_196_081_7;

/// Final range filter bounds in mg/L (below: sensor in air, above: saturation)
pub const DEFAULT_RANGE_LOW: f64 = 0.1;
pub const DEFAULT_RANGE_HIGH: f64 = 58.0;

// =============================================================================
// Processing Defaults
// =============================================================================

/// Daily log files written by the instrument
pub const DEFAULT_FILE_PATTERN: &str = "D*.csv";

/// Aggregation window in minutes
pub const DEFAULT_INTERVAL_MINUTES: u32 = 15;

/// Offset applied to instrument UTC timestamps, in hours
pub const DEFAULT_UTC_OFFSET_HOURS: f64 = -5.0;

/// Upper bound on concurrent file reads
pub const MAX_CONCURRENT_FILES: usize = 8;

/// Timestamp column name used by a single file's table before assembly
pub const DEFAULT_INDEX_LABEL: &str = "Datetime";

// =============================================================================
// Output
// =============================================================================

pub const MEAN_SUFFIX: &str = "_mean.csv";
pub const MEDIAN_SUFFIX: &str = "_median.csv";
pub const MAD_OUTPUT_NAME: &str = "SUNA_NO3_mad.csv";
pub const MAD_RAW_OUTPUT_NAME: &str = "SUNA_NO3_mad_raw.csv";

/// Timestamp format for CSV output
pub const OUTPUT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
