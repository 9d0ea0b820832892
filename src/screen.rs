//! Outlier screening for nitrate concentrations.
//!
//! [`RobustScreen`] reduces one window of readings to a single value with a
//! two-pass median absolute deviation test; [`RangeFilter`] then removes
//! screened values outside the sensor's plausible concentration range.

use crate::config::{RangeConfig, ScreenConfig};
use crate::constants::MAD_NORMAL_CONSISTENCY;
use crate::error::{Result, SunaError};
use polars::prelude::*;
use std::cmp::Ordering;
use tracing::trace;

/// Median of finite values; averages the two middle values for even counts
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) * 0.5)
    }
}

/// Median absolute deviation about the median, scaled to estimate the
/// standard deviation of normally distributed data
pub fn scaled_mad(values: &[f64]) -> Option<f64> {
    let center = median(values)?;
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations).map(|mad| mad / MAD_NORMAL_CONSISTENCY)
}

/// Two-pass MAD outlier screen
#[derive(Debug, Clone, Copy, Default)]
pub struct RobustScreen {
    config: ScreenConfig,
}

impl RobustScreen {
    pub fn new(config: ScreenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Values strictly inside the pre-screen limits
    pub fn prescreen(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .copied()
            .filter(|v| *v > self.config.lower_limit && *v < self.config.upper_limit)
            .collect()
    }

    /// Closed acceptance interval `[M - k, M + k]` with `k = MAD * criteria`
    pub fn bounds(&self, values: &[f64]) -> Option<(f64, f64)> {
        let center = median(values)?;
        let k = scaled_mad(values)? * self.config.criteria;
        Some((center - k, center + k))
    }

    /// Median of the values that pass both screening passes
    pub fn screen(&self, values: &[f64]) -> Result<f64> {
        let candidates = self.prescreen(values);
        let (low, high) = self
            .bounds(&candidates)
            .ok_or(SunaError::InsufficientData { survivors: 0 })?;

        let survivors: Vec<f64> = candidates
            .iter()
            .copied()
            .filter(|v| *v >= low && *v <= high)
            .collect();

        trace!(
            "MAD screen kept {}/{} values within [{:.4}, {:.4}]",
            survivors.len(),
            candidates.len(),
            low,
            high
        );

        median(&survivors).ok_or(SunaError::InsufficientData {
            survivors: candidates.len(),
        })
    }
}

/// Final plausibility filter with exclusive bounds
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeFilter {
    config: RangeConfig,
}

impl RangeFilter {
    pub fn new(config: RangeConfig) -> Self {
        Self { config }
    }

    pub fn accepts(&self, value: f64) -> bool {
        value > self.config.low && value < self.config.high
    }

    /// Keep rows whose `column` lies strictly inside the range; missing
    /// values are dropped
    pub fn filter(&self, frame: &DataFrame, column: &str) -> Result<DataFrame> {
        let value = col(column);
        let in_range = value
            .clone()
            .gt(lit(self.config.low))
            .and(value.lt(lit(self.config.high)));
        Ok(frame.clone().lazy().filter(in_range).collect()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burst() -> Vec<f64> {
        vec![1.50, 1.52, 1.48, 1.51, 1.49, 1.50, 1.53, 1.47, 1.50]
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[f64::NAN, 1.0]), Some(1.0));
    }

    #[test]
    fn test_scaled_mad() {
        // |x - 2| = [1, 0, 1] -> raw MAD 1
        let mad = scaled_mad(&[1.0, 2.0, 3.0]).unwrap();
        assert!((mad - 1.482_602_218_505_602).abs() < 1e-12);
        assert_eq!(scaled_mad(&[5.0, 5.0, 5.0]), Some(0.0));
    }

    #[test]
    fn test_outlier_removed_regardless_of_magnitude() {
        let screen = RobustScreen::default();
        let clean = screen.screen(&burst()).unwrap();

        for outlier in [5.0, 20.0, 57.0] {
            let mut values = burst();
            values.push(outlier);
            let screened = screen.screen(&values).unwrap();
            assert_eq!(screened, clean, "outlier {} leaked into result", outlier);
        }
        assert!((clean - 1.50).abs() < 1e-12);
    }

    #[test]
    fn test_prescreen_is_exclusive() {
        let screen = RobustScreen::default();
        let kept = screen.prescreen(&[0.001, 0.002, 57.9, 58.0, -1.0, 60.0]);
        assert_eq!(kept, vec![0.002, 57.9]);
    }

    #[test]
    fn test_acceptance_interval_is_closed() {
        // Median 2, raw MAD 1: one scaled MAD times the consistency constant
        // puts the bounds on 1 and 3
        let screen = RobustScreen::new(ScreenConfig {
            criteria: MAD_NORMAL_CONSISTENCY,
            ..Default::default()
        });
        let (low, high) = screen.bounds(&[1.0, 2.0, 3.0]).unwrap();
        assert!((low - 1.0).abs() < 1e-12);
        assert!((high - 3.0).abs() < 1e-12);

        let screened = screen.screen(&[1.0, 2.0, 2.0, 3.0, 9.0]).unwrap();
        assert_eq!(screened, 2.0);

        // With a zero MAD the interval collapses to the median itself
        let strict = RobustScreen::new(ScreenConfig {
            criteria: 0.0,
            ..Default::default()
        });
        assert_eq!(strict.screen(&[4.0, 4.0, 4.0, 5.0]).unwrap(), 4.0);
    }

    #[test]
    fn test_zero_mad_keeps_only_the_mode() {
        let screen = RobustScreen::default();
        assert_eq!(screen.screen(&[2.0, 2.0, 2.0, 2.1, 7.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_insufficient_data() {
        let screen = RobustScreen::default();
        assert!(matches!(
            screen.screen(&[]),
            Err(SunaError::InsufficientData { survivors: 0 })
        ));
        assert!(matches!(
            screen.screen(&[-1.0, -1.0, 0.0]),
            Err(SunaError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_custom_limits() {
        let screen = RobustScreen::new(ScreenConfig {
            upper_limit: 10.0,
            lower_limit: 1.0,
            criteria: 3.0,
        });
        assert_eq!(screen.screen(&[0.5, 2.0, 2.2, 2.4, 12.0]).unwrap(), 2.2);
    }

    #[test]
    fn test_range_filter_accepts() {
        let filter = RangeFilter::default();
        assert!(filter.accepts(1.0));
        assert!(!filter.accepts(-1.0));
        assert!(!filter.accepts(60.0));
        assert!(!filter.accepts(0.1));
        assert!(!filter.accepts(58.0));
    }

    #[test]
    fn test_range_filter_on_frame() {
        let frame = df!(
            "Datetime" => [1i64, 2, 3, 4],
            "no3" => [Some(1.0), Some(-1.0), Some(60.0), None]
        )
        .unwrap();

        let filtered = RangeFilter::default().filter(&frame, "no3").unwrap();
        assert_eq!(filtered.height(), 1);
        let kept: Vec<Option<f64>> = filtered
            .column("no3")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(kept, vec![Some(1.0)]);
    }
}
