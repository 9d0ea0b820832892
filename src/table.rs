//! Time-indexed table of decoded SUNA records.
//!
//! Wraps a polars `DataFrame` whose first column is the timestamp axis
//! (`Datetime[ms]`, named by the caller's label) followed by one `Float64`
//! column per layout value column.

use crate::error::Result;
use crate::header::{LayoutVersion, value_columns};
use crate::models::Record;
use polars::prelude::*;
use tracing::debug;

/// Polars type of the timestamp axis
pub fn index_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Milliseconds, None)
}

#[derive(Debug, Clone)]
pub struct Table {
    frame: DataFrame,
    index_label: String,
    version: LayoutVersion,
}

impl Table {
    /// Polars schema for a layout under the given timestamp label
    pub fn schema(version: LayoutVersion, index_label: &str) -> Schema {
        let mut fields = vec![Field::new(index_label.into(), index_dtype())];
        fields.extend(
            value_columns(version)
                .into_iter()
                .map(|name| Field::new(name.into(), DataType::Float64)),
        );
        Schema::from_iter(fields)
    }

    pub fn empty(version: LayoutVersion, index_label: &str) -> Self {
        Self {
            frame: DataFrame::empty_with_schema(&Self::schema(version, index_label)),
            index_label: index_label.to_string(),
            version,
        }
    }

    /// Build a table from decoded records, keeping their order
    pub fn from_records(
        version: LayoutVersion,
        index_label: &str,
        records: &[Record],
    ) -> Result<Self> {
        let names = value_columns(version);

        let millis: Vec<i64> = records
            .iter()
            .map(|record| record.timestamp.and_utc().timestamp_millis())
            .collect();
        let index = Series::new(index_label.into(), millis).cast(&index_dtype())?;

        let mut columns = Vec::with_capacity(names.len() + 1);
        columns.push(index.into_column());
        for (i, name) in names.iter().enumerate() {
            let values: Vec<Option<f64>> = records
                .iter()
                .map(|record| record.values.get(i).copied().flatten())
                .collect();
            columns.push(Column::new(name.as_str().into(), values));
        }

        Ok(Self {
            frame: DataFrame::new(columns)?,
            index_label: index_label.to_string(),
            version,
        })
    }

    /// Stack tables in the given order without re-sorting
    pub fn concat(version: LayoutVersion, index_label: &str, tables: Vec<Table>) -> Result<Self> {
        if tables.is_empty() {
            return Ok(Self::empty(version, index_label));
        }

        debug!("Concatenating {} file tables", tables.len());
        let frames: Vec<LazyFrame> = tables
            .into_iter()
            .map(|mut table| {
                table.relabel(index_label)?;
                Ok(table.frame.lazy())
            })
            .collect::<Result<_>>()?;

        let frame = concat(frames, UnionArgs::default())?.collect()?;

        Ok(Self {
            frame,
            index_label: index_label.to_string(),
            version,
        })
    }

    /// Rename the timestamp axis
    pub fn relabel(&mut self, index_label: &str) -> Result<()> {
        if self.index_label != index_label {
            self.frame.rename(&self.index_label, index_label.into())?;
            self.index_label = index_label.to_string();
        }
        Ok(())
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn index_label(&self) -> &str {
        &self.index_label
    }

    pub fn version(&self) -> LayoutVersion {
        self.version
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Timestamps as milliseconds since the Unix epoch, in row order
    pub fn timestamps_ms(&self) -> Result<Vec<i64>> {
        let index = self
            .frame
            .column(&self.index_label)?
            .as_materialized_series()
            .cast(&DataType::Int64)?;
        Ok(index.i64()?.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(day: u32, hour: u32, nitrate: f64) -> Record {
        let mut values = vec![Some(1.0); value_columns(LayoutVersion::V2).len()];
        values[1] = Some(nitrate);
        Record {
            timestamp: NaiveDate::from_ymd_opt(2016, 8, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            values,
        }
    }

    #[test]
    fn test_from_records_layout() {
        let records = vec![record(1, 10, 1.5), record(1, 11, 1.7)];
        let table = Table::from_records(LayoutVersion::V2, "Datetime (EST)", &records).unwrap();

        assert_eq!(table.height(), 2);
        assert_eq!(table.frame().width(), 284);
        assert_eq!(table.frame().get_column_names()[0].as_str(), "Datetime (EST)");
        assert_eq!(
            table.frame().column("Datetime (EST)").unwrap().dtype(),
            &index_dtype()
        );
    }

    #[test]
    fn test_empty_table_has_schema() {
        let table = Table::empty(LayoutVersion::V1, "Datetime");
        assert!(table.is_empty());
        assert_eq!(table.frame().width(), 240);
    }

    #[test]
    fn test_concat_preserves_file_order() {
        let later = Table::from_records(LayoutVersion::V2, "a", &[record(2, 9, 2.0)]).unwrap();
        let earlier = Table::from_records(
            LayoutVersion::V2,
            "a",
            &[record(1, 12, 1.0), record(1, 8, 1.1)],
        )
        .unwrap();

        let merged =
            Table::concat(LayoutVersion::V2, "Datetime (PST)", vec![later, earlier]).unwrap();
        assert_eq!(merged.index_label(), "Datetime (PST)");

        let hours: Vec<i64> = merged
            .timestamps_ms()
            .unwrap()
            .into_iter()
            .map(|ms| ms / 3_600_000 % 24)
            .collect();
        assert_eq!(hours, vec![9, 12, 8]);
    }

    #[test]
    fn test_concat_of_nothing_is_empty() {
        let merged = Table::concat(LayoutVersion::V2, "Datetime", Vec::new()).unwrap();
        assert!(merged.is_empty());
        assert_eq!(merged.frame().width(), 284);
    }
}
