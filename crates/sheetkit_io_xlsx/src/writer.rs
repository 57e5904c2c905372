//! XLSX row writer that streams pipeline rows into workbook sheets.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::PathBuf;

use log::debug;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use sheetkit_export::{
    EnumCellValue, EnumDestination, ExportError, Result, RowWriter, SpecOptionDescriptor,
    SpecWriterOption, WriterFactory, derive_unknown_option_error,
};

use crate::conf::{
    L_XLSX_OPTION_REGISTRY, N_IDX_BORDER_STYLE_MAX, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, N_WIDTH_EXCEL_COLUMN_MAX,
};
use crate::spec::{
    SpecCellFormat, SpecSheetSlice, SpecXlsxFormats, SpecXlsxReport, SpecXlsxValuePolicy,
    SpecXlsxWriteOptions,
};
use crate::util::{
    calculate_autofit_width, convert_date_to_excel_serial, convert_datetime_to_excel_serial,
    convert_nan_inf_to_str, create_sheet_identifier, estimate_width_len, sanitize_sheet_name,
};

////////////////////////////////////////////////////////////////////////////////
// #region Factory

/// Factory for [`XlsxRowWriter`].
#[derive(Debug, Clone, Default)]
pub struct XlsxWriterFactory {
    /// Starting options before pending options are replayed.
    pub write_options: SpecXlsxWriteOptions,
}

impl WriterFactory for XlsxWriterFactory {
    type Writer = XlsxRowWriter;

    fn format_name(&self) -> &'static str {
        "xlsx"
    }

    fn option_registry(&self) -> &'static [SpecOptionDescriptor] {
        L_XLSX_OPTION_REGISTRY
    }

    fn create_writer(&self) -> Result<XlsxRowWriter> {
        Ok(XlsxRowWriter::new(self.write_options.clone()))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Writer

enum EnumXlsxTarget {
    Path(PathBuf),
    Stream {
        name: String,
        sink: Box<dyn Write + Send>,
        spool: File,
    },
}

struct XlsxFormatSet {
    fmt_text: Format,
    fmt_integer: Format,
    fmt_decimal: Format,
    fmt_date: Format,
    fmt_datetime: Format,
    fmt_header: Format,
}

impl XlsxFormatSet {
    fn new(formats: &SpecXlsxFormats) -> Self {
        Self {
            fmt_text: derive_rust_xlsx_format(&formats.fmt_text),
            fmt_integer: derive_rust_xlsx_format(&formats.fmt_integer),
            fmt_decimal: derive_rust_xlsx_format(&formats.fmt_decimal),
            fmt_date: derive_rust_xlsx_format(&formats.fmt_date),
            fmt_datetime: derive_rust_xlsx_format(&formats.fmt_datetime),
            fmt_header: derive_rust_xlsx_format(&formats.fmt_header),
        }
    }

    fn select(&self, value: &EnumCellValue) -> &Format {
        match value {
            EnumCellValue::Integer(_) => &self.fmt_integer,
            EnumCellValue::Number(_) => &self.fmt_decimal,
            EnumCellValue::Date(_) => &self.fmt_date,
            EnumCellValue::DateTime(_) => &self.fmt_datetime,
            _ => &self.fmt_text,
        }
    }
}

/// Open-workbook state.
struct XlsxSession {
    workbook: Workbook,
    target: EnumXlsxTarget,
    formats: XlsxFormatSet,
    sheet_name_base: String,
    n_idx_sheet: usize,
    n_row_sheet: usize,
}

/// Stateful workbook row sink.
///
/// Rows are written top-down into the current sheet; a full sheet rolls over
/// to `<name>_2`, `<name>_3`, ... The workbook is flushed on [`RowWriter::close`].
pub struct XlsxRowWriter {
    write_options: SpecXlsxWriteOptions,
    session: Option<XlsxSession>,
    l_header: Option<Vec<EnumCellValue>>,
    n_rows_data: usize,
    set_sheet_names_existing: BTreeSet<String>,
    report: SpecXlsxReport,
    if_closed: bool,
}

impl XlsxRowWriter {
    /// Create an unopened writer.
    pub fn new(write_options: SpecXlsxWriteOptions) -> Self {
        Self {
            write_options,
            session: None,
            l_header: None,
            n_rows_data: 0,
            set_sheet_names_existing: BTreeSet::new(),
            report: SpecXlsxReport::default(),
            if_closed: false,
        }
    }

    /// Current options.
    pub fn write_options(&self) -> &SpecXlsxWriteOptions {
        &self.write_options
    }

    /// Sheets written so far and non-fatal warnings.
    pub fn report(&self) -> &SpecXlsxReport {
        &self.report
    }

    fn start_sheet(&mut self) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(derive_not_open_error());
        };

        let n_idx_part = self.report.sheets.len() + 1;
        let c_sheet_name = if n_idx_part == 1 {
            session.sheet_name_base.clone()
        } else {
            create_sheet_identifier(&session.sheet_name_base, n_idx_part)
        };
        let c_sheet_name_unique =
            derive_unique_sheet_name(&mut self.set_sheet_names_existing, &c_sheet_name);

        let worksheet = if self.write_options.if_constant_memory {
            session.workbook.add_worksheet_with_constant_memory()
        } else {
            session.workbook.add_worksheet()
        };
        worksheet
            .set_name(&c_sheet_name_unique)
            .map_err(derive_xlsx_error)?;
        for (n_idx_col, n_width) in &self.write_options.dict_col_widths {
            worksheet
                .set_column_width(*n_idx_col, *n_width)
                .map_err(derive_xlsx_error)?;
        }

        session.n_idx_sheet = n_idx_part - 1;
        session.n_row_sheet = 0;
        debug!("xlsx writer started sheet {c_sheet_name_unique}");

        self.report.sheets.push(SpecSheetSlice {
            sheet_name: c_sheet_name_unique,
            row_start_inclusive: self.n_rows_data,
            row_end_exclusive: self.n_rows_data,
        });

        if n_idx_part > 1
            && self.write_options.if_repeat_header
            && let Some(l_header) = self.l_header.clone()
        {
            self.write_header_cells(&l_header)?;
        }
        Ok(())
    }

    fn roll_over_if_full(&mut self) -> Result<()> {
        let Some(session) = self.session.as_ref() else {
            return Err(derive_not_open_error());
        };
        if session.n_row_sheet < self.write_options.n_rows_per_sheet_max {
            return Ok(());
        }
        self.report.warn(format!(
            "Sheet row limit reached: rolled over after {} data rows.",
            self.n_rows_data
        ));
        self.start_sheet()
    }

    fn write_header_cells(&mut self, row: &[EnumCellValue]) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(derive_not_open_error());
        };
        let worksheet = session
            .workbook
            .worksheet_from_index(session.n_idx_sheet)
            .map_err(derive_xlsx_error)?;
        let n_row = cast_row_num(session.n_row_sheet)?;

        for (n_idx_col, value) in row.iter().enumerate() {
            let n_col = cast_col_num(n_idx_col)?;
            write_cell_with_format(
                worksheet,
                n_row,
                n_col,
                value,
                &session.formats.fmt_header,
                &self.write_options.value_policy,
            )?;

            if self.write_options.policy_autofit.if_enabled
                && !self.write_options.dict_col_widths.contains_key(&n_col)
            {
                let n_width = calculate_autofit_width(
                    estimate_width_len(value),
                    &self.write_options.policy_autofit,
                );
                worksheet
                    .set_column_width(n_col, n_width)
                    .map_err(derive_xlsx_error)?;
            }
        }

        if self.write_options.if_freeze_header && session.n_row_sheet == 0 {
            worksheet
                .set_freeze_panes(1, 0)
                .map_err(derive_xlsx_error)?;
        }
        session.n_row_sheet += 1;
        Ok(())
    }

    fn write_data_cells(&mut self, row: &[EnumCellValue]) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(derive_not_open_error());
        };
        let worksheet = session
            .workbook
            .worksheet_from_index(session.n_idx_sheet)
            .map_err(derive_xlsx_error)?;
        let n_row = cast_row_num(session.n_row_sheet)?;

        for (n_idx_col, value) in row.iter().enumerate() {
            write_cell_with_format(
                worksheet,
                n_row,
                cast_col_num(n_idx_col)?,
                value,
                session.formats.select(value),
                &self.write_options.value_policy,
            )?;
        }
        session.n_row_sheet += 1;
        Ok(())
    }
}

impl RowWriter for XlsxRowWriter {
    fn apply_option(&mut self, option: &SpecWriterOption) -> Result<()> {
        if self.session.is_some() {
            return Err(ExportError::Configuration(format!(
                "Cannot apply option `{}` after open().",
                option.name
            )));
        }
        let arg_str = |idx: usize| option.arg(idx).and_then(|val| val.as_str()).unwrap_or("");
        let arg_bool = |idx: usize| option.arg(idx).and_then(|val| val.as_bool()).unwrap_or(false);
        let arg_i64 = |idx: usize| option.arg(idx).and_then(|val| val.as_i64()).unwrap_or(0);

        match option.name.as_str() {
            "sheet_name" => {
                self.write_options.sheet_name = arg_str(0).to_string();
            }
            "freeze_header" => {
                self.write_options.if_freeze_header = arg_bool(0);
            }
            "autofit_header" => {
                self.write_options.policy_autofit.if_enabled = arg_bool(0);
            }
            "constant_memory" => {
                self.write_options.if_constant_memory = arg_bool(0);
            }
            "repeat_header" => {
                self.write_options.if_repeat_header = arg_bool(0);
            }
            "column_width" => {
                let n_idx_col = arg_i64(0);
                let n_width = option.arg(1).and_then(|val| val.as_f64()).unwrap_or(0.0);
                let n_idx_col = u16::try_from(n_idx_col)
                    .ok()
                    .filter(|val| (*val as usize) < N_NCOLS_EXCEL_MAX)
                    .ok_or_else(|| {
                        ExportError::Configuration(format!(
                            "column_width column must be in [0, {N_NCOLS_EXCEL_MAX}), got {n_idx_col}."
                        ))
                    })?;
                if !(0.0..=N_WIDTH_EXCEL_COLUMN_MAX as f64).contains(&n_width) {
                    return Err(ExportError::Configuration(format!(
                        "column_width width must be in [0, {N_WIDTH_EXCEL_COLUMN_MAX}], got {n_width}."
                    )));
                }
                self.write_options.dict_col_widths.insert(n_idx_col, n_width);
            }
            "font_name" => {
                if arg_str(0).trim().is_empty() {
                    return Err(ExportError::Configuration(
                        "font_name must not be empty.".to_string(),
                    ));
                }
                self.write_options.formats.merge_all(&SpecCellFormat {
                    font_name: Some(arg_str(0).to_string()),
                    ..Default::default()
                });
            }
            "font_size" => {
                let n_size = arg_i64(0);
                if !(1..=409).contains(&n_size) {
                    return Err(ExportError::Configuration(format!(
                        "font_size must be in [1, 409], got {n_size}."
                    )));
                }
                self.write_options.formats.merge_all(&SpecCellFormat {
                    font_size: Some(n_size),
                    ..Default::default()
                });
            }
            "header_bold" => {
                self.write_options.formats.fmt_header.bold = Some(arg_bool(0));
            }
            "header_bg_color" => {
                self.write_options.formats.fmt_header.bg_color =
                    Some(parse_hex_color("header_bg_color", arg_str(0))?);
            }
            "header_font_color" => {
                self.write_options.formats.fmt_header.font_color =
                    Some(parse_hex_color("header_font_color", arg_str(0))?);
            }
            "border" => {
                let n_border = arg_i64(0);
                if !(0..=N_IDX_BORDER_STYLE_MAX).contains(&n_border) {
                    return Err(ExportError::Configuration(format!(
                        "border must be in [0, {N_IDX_BORDER_STYLE_MAX}], got {n_border}."
                    )));
                }
                self.write_options.formats.merge_all(&SpecCellFormat {
                    border: Some(n_border),
                    ..Default::default()
                });
            }
            "text_wrap" => {
                self.write_options.formats.merge_all(&SpecCellFormat {
                    text_wrap: Some(arg_bool(0)),
                    ..Default::default()
                });
            }
            "date_format" => {
                self.write_options.formats.fmt_date.num_format =
                    Some(parse_num_format("date_format", arg_str(0))?);
            }
            "datetime_format" => {
                self.write_options.formats.fmt_datetime.num_format =
                    Some(parse_num_format("datetime_format", arg_str(0))?);
            }
            "decimal_format" => {
                self.write_options.formats.fmt_decimal.num_format =
                    Some(parse_num_format("decimal_format", arg_str(0))?);
            }
            "max_rows_per_sheet" => {
                let n_rows = arg_i64(0);
                self.write_options.n_rows_per_sheet_max = usize::try_from(n_rows)
                    .ok()
                    .filter(|val| (2..=N_NROWS_EXCEL_MAX).contains(val))
                    .ok_or_else(|| {
                        ExportError::Configuration(format!(
                            "max_rows_per_sheet must be in [2, {N_NROWS_EXCEL_MAX}], got {n_rows}."
                        ))
                    })?;
            }
            _ => return Err(derive_unknown_option_error(option)),
        }
        Ok(())
    }

    fn open(&mut self, destination: EnumDestination) -> Result<()> {
        if self.session.is_some() || self.if_closed {
            return Err(ExportError::Write(
                "XLSX writer is already opened.".to_string(),
            ));
        }
        let target = match destination {
            EnumDestination::Path(path) => {
                File::create(&path).map_err(|err| {
                    ExportError::Configuration(format!(
                        "Cannot open destination {}: {err}",
                        path.display()
                    ))
                })?;
                debug!("xlsx writer opened file {}", path.display());
                EnumXlsxTarget::Path(path)
            }
            EnumDestination::Stream { name, sink } => {
                let spool = tempfile::tempfile().map_err(|err| {
                    ExportError::Write(format!(
                        "Cannot create spool file for stream {name}: {err}"
                    ))
                })?;
                debug!("xlsx writer opened stream {name}");
                EnumXlsxTarget::Stream { name, sink, spool }
            }
        };

        self.session = Some(XlsxSession {
            workbook: Workbook::new(),
            target,
            formats: XlsxFormatSet::new(&self.write_options.formats),
            sheet_name_base: sanitize_sheet_name(&self.write_options.sheet_name, "_"),
            n_idx_sheet: 0,
            n_row_sheet: 0,
        });
        self.start_sheet()
    }

    fn add_header_row(&mut self, row: &[EnumCellValue]) -> Result<()> {
        validate_row_width_excel(row)?;
        self.roll_over_if_full()?;
        self.l_header = Some(row.to_vec());
        self.write_header_cells(row)
    }

    fn add_row(&mut self, row: &[EnumCellValue]) -> Result<()> {
        validate_row_width_excel(row)?;
        self.roll_over_if_full()?;
        self.write_data_cells(row)?;

        self.n_rows_data += 1;
        if let Some(sheet_slice) = self.report.sheets.last_mut() {
            sheet_slice.row_end_exclusive = self.n_rows_data;
        }
        Ok(())
    }

    /// Save the workbook to its destination. Idempotent.
    fn close(&mut self) -> Result<()> {
        if self.if_closed {
            return Ok(());
        }
        self.if_closed = true;
        let Some(XlsxSession {
            mut workbook,
            target,
            ..
        }) = self.session.take()
        else {
            return Ok(());
        };

        match target {
            EnumXlsxTarget::Path(path) => {
                workbook.save(&path).map_err(derive_xlsx_error)?;
                debug!(
                    "xlsx writer saved {} sheet(s) to {}",
                    self.report.sheets.len(),
                    path.display()
                );
            }
            EnumXlsxTarget::Stream {
                name,
                mut sink,
                mut spool,
            } => {
                // The zip container is assembled on disk, then copied out in
                // bounded chunks.
                workbook
                    .save_to_writer(&mut spool)
                    .map_err(derive_xlsx_error)?;
                spool.seek(SeekFrom::Start(0))?;
                let n_bytes = io::copy(&mut spool, &mut sink)?;
                sink.flush()?;
                debug!("xlsx writer streamed {n_bytes} bytes to {name}");
            }
        }
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Helpers

/// Reserve a workbook-unique sheet name (`name`, `name__2`, `name__3`, ...).
pub fn derive_unique_sheet_name(
    set_sheet_names_existing: &mut BTreeSet<String>,
    name: &str,
) -> String {
    if !set_sheet_names_existing.contains(name) {
        set_sheet_names_existing.insert(name.to_string());
        return name.to_string();
    }

    let base_name: String = name
        .chars()
        .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
        .collect();

    let mut n_idx = 2usize;
    loop {
        let candidate: String = format!("{base_name}__{n_idx}")
            .chars()
            .take(N_LEN_EXCEL_SHEET_NAME_MAX)
            .collect();
        if !set_sheet_names_existing.contains(&candidate) {
            set_sheet_names_existing.insert(candidate.clone());
            return candidate;
        }
        n_idx += 1;
    }
}

fn validate_row_width_excel(row: &[EnumCellValue]) -> Result<()> {
    if row.len() > N_NCOLS_EXCEL_MAX {
        return Err(ExportError::Write(format!(
            "Row has {} cells; Excel allows at most {N_NCOLS_EXCEL_MAX}.",
            row.len()
        )));
    }
    Ok(())
}

fn parse_num_format(name: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(ExportError::Configuration(format!(
            "{name} must not be empty."
        )));
    }
    Ok(value.to_string())
}

/// Accept `#RRGGBB` only.
fn parse_hex_color(name: &str, value: &str) -> Result<String> {
    let c_hex = value.trim();
    let if_valid = c_hex.len() == 7
        && c_hex.starts_with('#')
        && c_hex[1..].chars().all(|ch| ch.is_ascii_hexdigit());
    if !if_valid {
        return Err(ExportError::Configuration(format!(
            "{name} must be a #RRGGBB color, got {value:?}."
        )));
    }
    Ok(c_hex.to_ascii_uppercase())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    n_row: u32,
    n_col: u16,
    value: &EnumCellValue,
    format: &Format,
    value_policy: &SpecXlsxValuePolicy,
) -> Result<()> {
    match value {
        EnumCellValue::Null => {
            worksheet
                .write_blank(n_row, n_col, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(n_row, n_col, val, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet
                .write_boolean_with_format(n_row, n_col, *val, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::Integer(val) => {
            worksheet
                .write_number_with_format(n_row, n_col, *val as f64, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::Number(val) => match convert_nan_inf_to_str(*val, value_policy) {
            Some(c_text) => {
                worksheet
                    .write_string_with_format(n_row, n_col, &c_text, format)
                    .map_err(derive_xlsx_error)?;
            }
            None => {
                worksheet
                    .write_number_with_format(n_row, n_col, *val, format)
                    .map_err(derive_xlsx_error)?;
            }
        },
        EnumCellValue::Date(val) => {
            write_serial_or_text(
                worksheet,
                n_row,
                n_col,
                convert_date_to_excel_serial(*val),
                &val.to_string(),
                format,
            )?;
        }
        EnumCellValue::DateTime(val) => {
            write_serial_or_text(
                worksheet,
                n_row,
                n_col,
                convert_datetime_to_excel_serial(*val),
                &val.to_string(),
                format,
            )?;
        }
    }
    Ok(())
}

/// Dates Excel cannot represent fall back to ISO text.
fn write_serial_or_text(
    worksheet: &mut Worksheet,
    n_row: u32,
    n_col: u16,
    n_serial: Option<f64>,
    c_text: &str,
    format: &Format,
) -> Result<()> {
    match n_serial {
        Some(n_serial) => worksheet
            .write_number_with_format(n_row, n_col, n_serial, format)
            .map_err(derive_xlsx_error)?,
        None => worksheet
            .write_string_with_format(n_row, n_col, c_text, format)
            .map_err(derive_xlsx_error)?,
    };
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        8 => FormatBorder::MediumDashed,
        9 => FormatBorder::DashDot,
        10 => FormatBorder::MediumDashDot,
        11 => FormatBorder::DashDotDot,
        12 => FormatBorder::MediumDashDotDot,
        13 => FormatBorder::SlantDashDot,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| ExportError::Write(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16> {
    u16::try_from(value)
        .map_err(|_| ExportError::Write(format!("column index overflow: {value}")))
}

fn derive_not_open_error() -> ExportError {
    ExportError::Write("Cannot add rows before open() or after close().".to_string())
}

fn derive_xlsx_error(err: XlsxError) -> ExportError {
    ExportError::Write(format!("xlsx write error: {err}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;
    use sheetkit_export::{
        EnumCellValue, EnumDestination, EnumOptionValue, ExportError, RowWriter,
        SpecWriterOption,
    };

    use super::{XlsxRowWriter, derive_unique_sheet_name};
    use crate::spec::SpecXlsxWriteOptions;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn option(name: &str, args: Vec<EnumOptionValue>) -> SpecWriterOption {
        SpecWriterOption::new(name, args)
    }

    fn header() -> Vec<EnumCellValue> {
        vec![EnumCellValue::from("id"), EnumCellValue::from("name")]
    }

    fn data_row(n_id: i64) -> Vec<EnumCellValue> {
        vec![EnumCellValue::Integer(n_id), EnumCellValue::from(format!("n{n_id}"))]
    }

    #[test]
    fn save_writes_workbook_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.xlsx");

        let mut writer = XlsxRowWriter::new(SpecXlsxWriteOptions::default());
        writer
            .apply_option(&option("freeze_header", vec![true.into()]))
            .expect("freeze");
        writer
            .open(EnumDestination::Path(path.clone()))
            .expect("open");
        writer.add_header_row(&header()).expect("header");
        writer.add_row(&data_row(1)).expect("row");
        writer
            .add_row(&[
                EnumCellValue::Number(f64::NAN),
                EnumCellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).expect("date")),
            ])
            .expect("row");
        writer.close().expect("close");

        let v_bytes = std::fs::read(&path).expect("read");
        assert!(v_bytes.starts_with(b"PK"));
        let report = writer.report();
        assert_eq!(report.sheets.len(), 1);
        assert_eq!(report.sheets[0].sheet_name, "Sheet1");
        assert_eq!(report.sheets[0].row_end_exclusive, 2);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn full_sheet_rolls_over_and_repeats_header() {
        let mut writer = XlsxRowWriter::new(SpecXlsxWriteOptions::default());
        writer
            .apply_option(&option("sheet_name", vec!["Data".into()]))
            .expect("sheet_name");
        writer
            .apply_option(&option("max_rows_per_sheet", vec![3i64.into()]))
            .expect("max rows");
        let buf = SharedBuf::default();
        writer
            .open(EnumDestination::Stream {
                name: "out.xlsx".to_string(),
                sink: Box::new(buf.clone()),
            })
            .expect("open");

        writer.add_header_row(&header()).expect("header");
        for n_id in 0..5 {
            writer.add_row(&data_row(n_id)).expect("row");
        }
        writer.close().expect("close");

        let l_slices: Vec<(String, usize, usize)> = writer
            .report()
            .sheets
            .iter()
            .map(|slice| {
                (
                    slice.sheet_name.clone(),
                    slice.row_start_inclusive,
                    slice.row_end_exclusive,
                )
            })
            .collect();
        assert_eq!(
            l_slices,
            vec![
                ("Data".to_string(), 0, 2),
                ("Data_2".to_string(), 2, 4),
                ("Data_3".to_string(), 4, 5),
            ]
        );
        assert_eq!(writer.report().warnings.len(), 2);
        assert!(buf.0.lock().expect("lock").starts_with(b"PK"));
    }

    #[test]
    fn too_wide_row_is_write_error() {
        let mut writer = XlsxRowWriter::new(SpecXlsxWriteOptions::default());
        writer
            .open(EnumDestination::Stream {
                name: "wide".to_string(),
                sink: Box::new(SharedBuf::default()),
            })
            .expect("open");
        let row = vec![EnumCellValue::Integer(0); 16_385];
        let err = writer.add_row(&row).expect_err("too wide");
        assert!(matches!(err, ExportError::Write(_)));
        writer.close().expect("close");
    }

    #[test]
    fn invalid_options_are_configuration_errors() {
        let mut writer = XlsxRowWriter::new(SpecXlsxWriteOptions::default());
        for opt in [
            option("max_rows_per_sheet", vec![1i64.into()]),
            option("column_width", vec![20_000i64.into(), 10.0.into()]),
            option("font_size", vec![0i64.into()]),
            option("date_format", vec!["".into()]),
            option("header_bg_color", vec!["navy".into()]),
            option("header_font_color", vec!["#12345".into()]),
            option("border", vec![14i64.into()]),
        ] {
            let err = writer.apply_option(&opt).expect_err("invalid option");
            assert!(matches!(err, ExportError::Configuration(_)), "{opt}");
        }

        writer
            .open(EnumDestination::Stream {
                name: "late".to_string(),
                sink: Box::new(SharedBuf::default()),
            })
            .expect("open");
        let err = writer
            .apply_option(&option("freeze_header", vec![true.into()]))
            .expect_err("after open");
        assert!(matches!(err, ExportError::Configuration(_)));
    }

    #[test]
    fn style_options_land_in_write_options() {
        let mut writer = XlsxRowWriter::new(SpecXlsxWriteOptions::default());
        for opt in [
            option("header_bg_color", vec!["#ddebf7".into()]),
            option("header_font_color", vec!["#1F4E78".into()]),
            option("border", vec![1i64.into()]),
            option("text_wrap", vec![true.into()]),
        ] {
            writer.apply_option(&opt).expect("style option");
        }

        let formats = &writer.write_options().formats;
        assert_eq!(formats.fmt_header.bg_color.as_deref(), Some("#DDEBF7"));
        assert_eq!(formats.fmt_header.font_color.as_deref(), Some("#1F4E78"));
        assert_eq!(formats.fmt_text.bg_color, None);
        for fmt in [&formats.fmt_text, &formats.fmt_date, &formats.fmt_header] {
            assert_eq!(fmt.border, Some(1));
            assert_eq!(fmt.text_wrap, Some(true));
        }

        let buf = SharedBuf::default();
        writer
            .open(EnumDestination::Stream {
                name: "styled.xlsx".to_string(),
                sink: Box::new(buf.clone()),
            })
            .expect("open");
        writer.add_header_row(&header()).expect("header");
        writer.add_row(&data_row(1)).expect("row");
        writer.close().expect("close");
        assert!(buf.0.lock().expect("lock").starts_with(b"PK"));
    }

    #[test]
    fn unopenable_path_is_configuration_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("out.xlsx");
        let mut writer = XlsxRowWriter::new(SpecXlsxWriteOptions::default());
        let err = writer
            .open(EnumDestination::Path(path))
            .expect_err("missing parent dir");
        assert!(matches!(err, ExportError::Configuration(_)));
    }

    #[test]
    fn unique_sheet_names_get_suffixes() {
        let mut set_names = BTreeSet::new();
        assert_eq!(derive_unique_sheet_name(&mut set_names, "Data"), "Data");
        assert_eq!(derive_unique_sheet_name(&mut set_names, "Data"), "Data__2");
        assert_eq!(derive_unique_sheet_name(&mut set_names, "Data"), "Data__3");
    }
}
