//! `sheetkit_io_xlsx` v1:
//! Workbook writer adapter for the `sheetkit_export` pipeline.
//!
//! - `conf`   : Excel limits, default format presets, option registry
//! - `spec`   : formats, write options, sheet report
//! - `util`   : pure helper functions
//! - `writer` : streaming row writer and factory
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    L_XLSX_OPTION_REGISTRY, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL,
};
pub use spec::{
    SpecAutofitCellsPolicy, SpecCellFormat, SpecSheetSlice, SpecXlsxFormats, SpecXlsxReport,
    SpecXlsxValuePolicy, SpecXlsxWriteOptions,
};
pub use util::{
    convert_date_to_excel_serial, convert_datetime_to_excel_serial, convert_nan_inf_to_str,
    create_sheet_identifier, sanitize_sheet_name,
};
pub use writer::{XlsxRowWriter, XlsxWriterFactory, derive_unique_sheet_name};

use sheetkit_export::{Exporter, Record};

/// Pipeline writing XLSX with the basic serializer.
pub fn xlsx_exporter<R: Record>() -> Exporter<R, XlsxWriterFactory> {
    Exporter::new(XlsxWriterFactory::default())
}
