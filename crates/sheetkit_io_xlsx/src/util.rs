//! Stateless helper utilities used by the XLSX row writer.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use sheetkit_export::EnumCellValue;

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_WIDTH_EXCEL_COLUMN_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{SpecAutofitCellsPolicy, SpecXlsxValuePolicy};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Convert `NaN`/`Inf` to policy string; return `None` for finite values.
pub fn convert_nan_inf_to_str(x: f64, value_policy: &SpecXlsxValuePolicy) -> Option<String> {
    if x.is_nan() {
        return Some(value_policy.nan_str.clone());
    }
    if x.is_infinite() {
        return Some(if x.is_sign_positive() {
            value_policy.posinf_str.clone()
        } else {
            value_policy.neginf_str.clone()
        });
    }
    None
}

/// Excel 1900-system serial day number for `date`.
///
/// Returns `None` before 1900-01-01, which Excel cannot represent. Serials
/// before 1900-03-01 are shifted to match Excel's phantom 1900-02-29.
pub fn convert_date_to_excel_serial(date: NaiveDate) -> Option<f64> {
    let date_epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let n_days = (date - date_epoch).num_days();
    if n_days < 2 {
        return None;
    }
    let n_serial = if n_days < 61 { n_days - 1 } else { n_days };
    Some(n_serial as f64)
}

/// Excel serial day number with the time of day as fraction.
pub fn convert_datetime_to_excel_serial(datetime: NaiveDateTime) -> Option<f64> {
    let n_day_serial = convert_date_to_excel_serial(datetime.date())?;
    let time = datetime.time();
    let n_secs = time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1e9;
    Some(n_day_serial + n_secs / 86_400.0)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WidthEstimation

/// Estimate displayed width units for one cell value.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::Null => 0,
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::Date(_) => 10,
        EnumCellValue::DateTime(_) => 19,
        other => other.to_string().len(),
    }
}

/// ASCII counts one unit, other characters about 1.6.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Clamp an inferred width into the autofit policy bounds.
pub fn calculate_autofit_width(n_width_recorded: usize, policy: &SpecAutofitCellsPolicy) -> f64 {
    let n_min = usize::max(1, policy.width_cell_min);
    let n_max = usize::min(
        N_WIDTH_EXCEL_COLUMN_MAX,
        usize::max(n_min, policy.width_cell_max),
    );
    usize::min(
        n_max,
        usize::max(n_min, n_width_recorded + policy.width_cell_padding),
    ) as f64
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Create suffixed sheet name (`base_1`, `base_2`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, part_idx_1based: usize) -> String {
    let c_sheet_name_suffix = format!("_{part_idx_1based}");
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
