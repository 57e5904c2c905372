//! Row serializer contract and the default key/value serializer.

use crate::error::{ExportError, Result};
use crate::record::Record;
use crate::spec::{EnumCellValue, Row};

/// Convert records into rows, and optionally supply a header row.
///
/// Both methods must be deterministic: the same input yields the same row, with
/// no shared mutable state that affects output across calls.
pub trait RowSerializer<R> {
    /// Column labels, or an empty row when no header should be written.
    ///
    /// `record_first` is the first record of the export when one exists.
    fn header_row(&self, record_first: Option<&R>) -> Result<Row>;

    /// Convert one record into a row.
    fn data_row(&self, record: &R) -> Result<Row>;
}

impl<R, S: RowSerializer<R> + ?Sized> RowSerializer<R> for Box<S> {
    fn header_row(&self, record_first: Option<&R>) -> Result<Row> {
        (**self).header_row(record_first)
    }

    fn data_row(&self, record: &R) -> Result<Row> {
        (**self).data_row(record)
    }
}

/// Default serializer over the [`Record`] key/value view.
///
/// Header is the first record's field names; each row is the record's values,
/// both in the record's own field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicSerializer {
    if_emit_header: bool,
}

impl Default for BasicSerializer {
    fn default() -> Self {
        Self {
            if_emit_header: true,
        }
    }
}

impl BasicSerializer {
    /// Serializer emitting a header derived from field names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializer emitting data rows only.
    pub fn without_header() -> Self {
        Self {
            if_emit_header: false,
        }
    }
}

impl<R: Record> RowSerializer<R> for BasicSerializer {
    fn header_row(&self, record_first: Option<&R>) -> Result<Row> {
        if !self.if_emit_header {
            return Ok(vec![]);
        }
        let Some(record) = record_first else {
            return Ok(vec![]);
        };
        Ok(record
            .fields()?
            .into_iter()
            .map(|(name, _)| EnumCellValue::String(name))
            .collect())
    }

    fn data_row(&self, record: &R) -> Result<Row> {
        Ok(record
            .fields()?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }
}

/// Serializer built from a fixed header and a per-record closure.
pub struct FnSerializer<F> {
    l_header: Row,
    fn_row: F,
}

impl<F> FnSerializer<F> {
    /// Header labels are written as text cells; pass an empty list to omit the header.
    pub fn new<I, S>(header: I, fn_row: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            l_header: header
                .into_iter()
                .map(|label| EnumCellValue::String(label.into()))
                .collect(),
            fn_row,
        }
    }
}

impl<R, F> RowSerializer<R> for FnSerializer<F>
where
    F: Fn(&R) -> Result<Row>,
{
    fn header_row(&self, _record_first: Option<&R>) -> Result<Row> {
        Ok(self.l_header.clone())
    }

    fn data_row(&self, record: &R) -> Result<Row> {
        (self.fn_row)(record)
    }
}

/// Check a data row against the header width.
///
/// An empty header disables the check.
pub fn validate_row_width(
    header: &[EnumCellValue],
    row: &[EnumCellValue],
    n_idx_record: usize,
) -> Result<()> {
    if header.is_empty() || header.len() == row.len() {
        return Ok(());
    }
    Err(ExportError::Serialization(format!(
        "record #{n_idx_record} produced {} cells but header has {}.",
        row.len(),
        header.len()
    )))
}
