//! `sheetkit_io_csv` v1:
//! Delimited-text writer adapter for the `sheetkit_export` pipeline.
//!
//! - `conf`   : option registry and constants
//! - `spec`   : writer options
//! - `util`   : option parsing and cell rendering
//! - `writer` : row writer and factory
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::L_CSV_OPTION_REGISTRY;
pub use spec::{EnumCsvQuoteStyle, EnumCsvTerminator, SpecCsvWriteOptions};
pub use writer::{CsvRowWriter, CsvWriterFactory};

use sheetkit_export::{Exporter, Record};

/// Pipeline writing CSV with the basic serializer.
pub fn csv_exporter<R: Record>() -> Exporter<R, CsvWriterFactory> {
    Exporter::new(CsvWriterFactory::default())
}
