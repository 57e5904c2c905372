//! Polars `DataFrame` query source.
//!
//! Pages are zero-copy slices of the frame; only one page of records is
//! materialized at a time.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader, TimeUnit};

use crate::error::{ExportError, Result};
use crate::record::Record;
use crate::source::QuerySource;
use crate::spec::EnumCellValue;

/// Days from 0001-01-01 (CE) to 1970-01-01.
const N_DAYS_CE_TO_UNIX_EPOCH: i32 = 719_163;

/// One DataFrame row as an ordered key/value record.
///
/// Cells whose dtype has no scalar counterpart keep the failure text and
/// surface it as a serialization error.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecFrameRecord {
    l_names: Arc<[String]>,
    l_cells: Vec<std::result::Result<EnumCellValue, String>>,
}

impl SpecFrameRecord {
    /// Column names shared by every record of the frame.
    pub fn column_names(&self) -> &[String] {
        &self.l_names
    }
}

impl Record for SpecFrameRecord {
    fn fields(&self) -> Result<Vec<(String, EnumCellValue)>> {
        self.l_names
            .iter()
            .zip(&self.l_cells)
            .map(|(name, cell)| match cell {
                Ok(value) => Ok((name.clone(), value.clone())),
                Err(msg) => Err(ExportError::Serialization(format!(
                    "column `{name}`: {msg}"
                ))),
            })
            .collect()
    }
}

/// Query source over an in-memory or IPC-loaded `DataFrame`.
#[derive(Debug, Clone)]
pub struct DataFrameQuery {
    df: DataFrame,
    l_names: Arc<[String]>,
}

impl DataFrameQuery {
    /// Wrap an existing frame.
    pub fn new(df: DataFrame) -> Self {
        let l_names: Arc<[String]> = df
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        Self { df, l_names }
    }

    /// Load a frame from an Arrow IPC file.
    pub fn from_ipc_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            ExportError::SourceFetch(format!("Failed to open IPC file {}: {err}", path.display()))
        })?;
        let df = IpcReader::new(file)
            .finish()
            .map_err(|err| ExportError::SourceFetch(format!("Failed to read IPC file: {err}")))?;
        Ok(Self::new(df))
    }

    /// Load a frame from IPC-serialized bytes.
    pub fn from_ipc_bytes(v_ipc_df: &[u8]) -> Result<Self> {
        let df = IpcReader::new(Cursor::new(v_ipc_df))
            .finish()
            .map_err(|err| {
                ExportError::SourceFetch(format!("Failed to read IPC DataFrame bytes: {err}"))
            })?;
        Ok(Self::new(df))
    }

    /// Total row count.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    fn derive_records(&self, df: &DataFrame) -> Result<Vec<SpecFrameRecord>> {
        let l_cols = df.get_columns();
        let mut l_records = Vec::with_capacity(df.height());
        for n_idx_row in 0..df.height() {
            let mut l_cells = Vec::with_capacity(l_cols.len());
            for col in l_cols {
                let value = col.get(n_idx_row).map_err(|err| {
                    ExportError::SourceFetch(format!("Failed to access cell value: {err}"))
                })?;
                l_cells.push(derive_cell_value_from_any_value(value));
            }
            l_records.push(SpecFrameRecord {
                l_names: Arc::clone(&self.l_names),
                l_cells,
            });
        }
        Ok(l_records)
    }
}

impl QuerySource<SpecFrameRecord> for DataFrameQuery {
    fn fetch_all(&self) -> Result<Vec<SpecFrameRecord>> {
        self.derive_records(&self.df)
    }

    fn fetch_page(&self, n_offset: usize, n_limit: usize) -> Result<Vec<SpecFrameRecord>> {
        if n_offset >= self.df.height() {
            return Ok(vec![]);
        }
        let n_offset = i64::try_from(n_offset)
            .map_err(|_| ExportError::SourceFetch(format!("row offset overflow: {n_offset}")))?;
        self.derive_records(&self.df.slice(n_offset, n_limit))
    }
}

fn derive_cell_value_from_any_value(
    value: AnyValue<'_>,
) -> std::result::Result<EnumCellValue, String> {
    let cell = match value {
        AnyValue::Null => EnumCellValue::Null,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::UInt8(val) => EnumCellValue::Integer(val as i64),
        AnyValue::UInt16(val) => EnumCellValue::Integer(val as i64),
        AnyValue::UInt32(val) => EnumCellValue::Integer(val as i64),
        AnyValue::UInt64(val) => match i64::try_from(val) {
            Ok(val) => EnumCellValue::Integer(val),
            Err(_) => EnumCellValue::Number(val as f64),
        },
        AnyValue::Int8(val) => EnumCellValue::Integer(val as i64),
        AnyValue::Int16(val) => EnumCellValue::Integer(val as i64),
        AnyValue::Int32(val) => EnumCellValue::Integer(val as i64),
        AnyValue::Int64(val) => EnumCellValue::Integer(val),
        AnyValue::Int128(val) => match i64::try_from(val) {
            Ok(val) => EnumCellValue::Integer(val),
            Err(_) => EnumCellValue::Number(val as f64),
        },
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        AnyValue::Date(n_days) => EnumCellValue::Date(derive_date_from_epoch_days(n_days)?),
        AnyValue::Datetime(val, time_unit, _) => {
            EnumCellValue::DateTime(derive_datetime_from_epoch(val, time_unit)?)
        }
        AnyValue::DatetimeOwned(val, time_unit, _) => {
            EnumCellValue::DateTime(derive_datetime_from_epoch(val, time_unit)?)
        }
        other => return Err(format!("unsupported dtype {}", other.dtype())),
    };
    Ok(cell)
}

fn derive_date_from_epoch_days(n_days: i32) -> std::result::Result<NaiveDate, String> {
    n_days
        .checked_add(N_DAYS_CE_TO_UNIX_EPOCH)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| format!("date out of range: {n_days} days"))
}

fn derive_datetime_from_epoch(
    val: i64,
    time_unit: TimeUnit,
) -> std::result::Result<NaiveDateTime, String> {
    let dt = match time_unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(val)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(val),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(val),
    };
    dt.map(|dt| dt.naive_utc())
        .ok_or_else(|| format!("datetime out of range: {val}"))
}
