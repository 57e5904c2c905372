//! `sheetkit_export` v1:
//! Format-agnostic streaming export pipeline.
//!
//! Module layout:
//! - `spec`       : cells/rows, writer options, destinations, reports
//! - `error`      : export error kinds
//! - `record`     : ordered key/value record view
//! - `serializer` : record -> row contract and defaults
//! - `writer`     : writer adapter contract and option registry checks
//! - `source`     : materialized and paged query sources
//! - `frame`      : polars `DataFrame` query source
//! - `exporter`   : the export pipeline
pub mod error;
pub mod exporter;
pub mod frame;
pub mod record;
pub mod serializer;
pub mod source;
pub mod spec;
pub mod writer;

pub use error::{ExportError, Result};
pub use exporter::Exporter;
pub use frame::{DataFrameQuery, SpecFrameRecord};
pub use record::{Record, SpecRecord};
pub use serializer::{BasicSerializer, FnSerializer, RowSerializer, validate_row_width};
pub use source::{EnumDataSource, QuerySource, VecQuery};
pub use spec::{
    EnumCellValue, EnumDestination, EnumOptionKind, EnumOptionValue, Row, SpecExportReport,
    SpecOptionDescriptor, SpecWriterOption,
};
pub use writer::{RowWriter, WriterFactory, derive_unknown_option_error, validate_writer_option};
