//! Fixed-width time window aggregation.
//!
//! Windows are left-closed, non-overlapping and anchored at the Unix epoch,
//! so any width that divides a day also lines up with midnight. Each row is
//! keyed by the start of its window; empty windows never appear.

use crate::error::{Result, SunaError};
use crate::table::{Table, index_dtype};
use polars::prelude::*;
use tracing::debug;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Per-column reduction applied within each window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Mean,
    Median,
}

impl Reduction {
    fn expr(&self) -> Expr {
        match self {
            Self::Mean => col("*").mean(),
            Self::Median => col("*").median(),
        }
    }
}

/// Buckets a table into fixed-width windows
#[derive(Debug, Clone, Copy)]
pub struct IntervalAggregator {
    window_ms: i64,
}

impl IntervalAggregator {
    pub fn new(window_minutes: u32) -> Result<Self> {
        if window_minutes == 0 {
            return Err(SunaError::configuration(
                "Aggregation window must be at least one minute",
            ));
        }
        Ok(Self {
            window_ms: i64::from(window_minutes) * MILLIS_PER_MINUTE,
        })
    }

    /// Start of the window containing `timestamp_ms`
    pub fn window_start(&self, timestamp_ms: i64) -> i64 {
        timestamp_ms.div_euclid(self.window_ms) * self.window_ms
    }

    /// Replace each row's timestamp with its window start
    pub fn aggregate(&self, table: &Table) -> Result<WindowedTable> {
        let label = table.index_label();
        let starts: Vec<i64> = table
            .timestamps_ms()?
            .into_iter()
            .map(|ms| self.window_start(ms))
            .collect();

        let keys = Series::new(label.into(), starts).cast(&index_dtype())?;
        let mut keyed = table.frame().clone();
        keyed.with_column(keys)?;

        debug!(
            "Keyed {} rows into {}-minute windows",
            keyed.height(),
            self.window_ms / MILLIS_PER_MINUTE
        );

        Ok(WindowedTable {
            keyed,
            index_label: label.to_string(),
        })
    }
}

/// A table whose timestamp column holds window starts, ready for reduction
#[derive(Debug, Clone)]
pub struct WindowedTable {
    keyed: DataFrame,
    index_label: String,
}

impl WindowedTable {
    pub fn index_label(&self) -> &str {
        &self.index_label
    }

    fn grouped(&self) -> LazyGroupBy {
        self.keyed
            .clone()
            .lazy()
            .group_by_stable([col(self.index_label.as_str())])
    }

    fn sort_by_window(&self, frame: LazyFrame) -> LazyFrame {
        frame.sort_by_exprs(
            [col(self.index_label.as_str())],
            SortMultipleOptions::default(),
        )
    }

    /// Reduce every value column per window
    pub fn reduce(&self, reduction: Reduction) -> Result<DataFrame> {
        let reduced = self.grouped().agg([reduction.expr()]);
        Ok(self.sort_by_window(reduced).collect()?)
    }

    pub fn mean(&self) -> Result<DataFrame> {
        self.reduce(Reduction::Mean)
    }

    pub fn median(&self) -> Result<DataFrame> {
        self.reduce(Reduction::Median)
    }

    /// Reduce one column per window with an arbitrary function of its
    /// non-missing values. `None` becomes a missing value for that window.
    pub fn custom<F>(&self, column: &str, reduce: F) -> Result<DataFrame>
    where
        F: Fn(&[f64]) -> Option<f64>,
    {
        let grouped = self.grouped().agg([col(column)]);
        let grouped = self.sort_by_window(grouped).collect()?;

        let keys = grouped.column(&self.index_label)?.clone();
        let lists = grouped.column(column)?.as_materialized_series().list()?;

        let reduced = lists
            .into_iter()
            .map(|window| -> Result<Option<f64>> {
                let Some(series) = window else {
                    return Ok(None);
                };
                let values: Vec<f64> = series.f64()?.into_iter().flatten().collect();
                Ok(reduce(&values))
            })
            .collect::<Result<Vec<Option<f64>>>>()?;

        Ok(DataFrame::new(vec![
            keys,
            Column::new(column.into(), reduced),
        ])?)
    }
}
