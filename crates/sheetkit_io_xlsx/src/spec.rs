//! Shared XLSX specification models.

use std::collections::BTreeMap;

use crate::conf::{EnumFmtKey, N_NROWS_EXCEL_MAX, derive_default_xlsx_formats};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides (`0` none ... `13` slant dash-dot).
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color, `#RRGGBB`.
    pub bg_color: Option<String>,
    /// Font color, `#RRGGBB`.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Per-kind cell formats used by one writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxFormats {
    /// Text and null cells.
    pub fmt_text: SpecCellFormat,
    /// Integer cells.
    pub fmt_integer: SpecCellFormat,
    /// Float cells.
    pub fmt_decimal: SpecCellFormat,
    /// Date cells.
    pub fmt_date: SpecCellFormat,
    /// Date-time cells.
    pub fmt_datetime: SpecCellFormat,
    /// Header row cells.
    pub fmt_header: SpecCellFormat,
}

impl Default for SpecXlsxFormats {
    fn default() -> Self {
        let dict_fmt = derive_default_xlsx_formats();
        let take = |key: EnumFmtKey| dict_fmt.get(key.as_str()).cloned().unwrap_or_default();
        Self {
            fmt_text: take(EnumFmtKey::Text),
            fmt_integer: take(EnumFmtKey::Integer),
            fmt_decimal: take(EnumFmtKey::Decimal),
            fmt_date: take(EnumFmtKey::Date),
            fmt_datetime: take(EnumFmtKey::DateTime),
            fmt_header: take(EnumFmtKey::Header),
        }
    }
}

impl SpecXlsxFormats {
    /// Overlay `patch` onto every format.
    pub fn merge_all(&mut self, patch: &SpecCellFormat) {
        for fmt in [
            &mut self.fmt_text,
            &mut self.fmt_integer,
            &mut self.fmt_decimal,
            &mut self.fmt_date,
            &mut self.fmt_datetime,
            &mut self.fmt_header,
        ] {
            *fmt = fmt.merge(patch);
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Replacement text for float values Excel cannot store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxValuePolicy {
    /// Replacement text for NaN.
    pub nan_str: String,
    /// Replacement text for positive infinity.
    pub posinf_str: String,
    /// Replacement text for negative infinity.
    pub neginf_str: String,
}

impl Default for SpecXlsxValuePolicy {
    fn default() -> Self {
        Self {
            nan_str: "NaN".to_string(),
            posinf_str: "Inf".to_string(),
            neginf_str: "-Inf".to_string(),
        }
    }
}

/// Header-based column autofit policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Size columns from header labels.
    pub if_enabled: bool,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            if_enabled: true,
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Writer-wide options populated by replayed pending options.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecXlsxWriteOptions {
    /// Base sheet name (sanitized at open).
    pub sheet_name: String,
    /// Freeze the header row on each sheet.
    pub if_freeze_header: bool,
    /// Stream rows through temp files instead of holding the sheet in memory.
    pub if_constant_memory: bool,
    /// Repeat the header on rollover sheets.
    pub if_repeat_header: bool,
    /// Row cap per sheet, header included.
    pub n_rows_per_sheet_max: usize,
    /// Explicit column widths by zero-based column index.
    pub dict_col_widths: BTreeMap<u16, f64>,
    /// Autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
    /// Non-finite float replacement policy.
    pub value_policy: SpecXlsxValuePolicy,
    /// Cell formats.
    pub formats: SpecXlsxFormats,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            if_freeze_header: false,
            if_constant_memory: true,
            if_repeat_header: true,
            n_rows_per_sheet_max: N_NROWS_EXCEL_MAX,
            dict_col_widths: BTreeMap::new(),
            policy_autofit: SpecAutofitCellsPolicy::default(),
            value_policy: SpecXlsxValuePolicy::default(),
            formats: SpecXlsxFormats::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Sheet emitted to the workbook, with its data-row range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSlice {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Inclusive data-row start (export-wide numbering).
    pub row_start_inclusive: usize,
    /// Exclusive data-row end (export-wide numbering).
    pub row_end_exclusive: usize,
}

/// Per-export writer report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheets produced by the export.
    pub sheets: Vec<SpecSheetSlice>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{SpecCellFormat, SpecXlsxFormats};

    #[test]
    fn merge_overwrites_only_set_fields() {
        let base = SpecCellFormat {
            font_name: Some("Calibri".to_string()),
            font_size: Some(11),
            ..Default::default()
        };
        let merged = base.with_(SpecCellFormat {
            font_size: Some(14),
            bold: Some(true),
            ..Default::default()
        });
        assert_eq!(merged.font_name.as_deref(), Some("Calibri"));
        assert_eq!(merged.font_size, Some(14));
        assert_eq!(merged.bold, Some(true));
    }

    #[test]
    fn default_formats_use_presets_and_merge_all_applies_everywhere() {
        let mut formats = SpecXlsxFormats::default();
        assert_eq!(formats.fmt_integer.num_format.as_deref(), Some("0"));
        assert_eq!(formats.fmt_header.bold, Some(true));

        formats.merge_all(&SpecCellFormat {
            font_name: Some("Arial".to_string()),
            ..Default::default()
        });
        assert_eq!(formats.fmt_date.font_name.as_deref(), Some("Arial"));
        assert_eq!(formats.fmt_header.font_name.as_deref(), Some("Arial"));
        assert_eq!(formats.fmt_date.num_format.as_deref(), Some("yyyy-mm-dd"));
    }

    #[test]
    fn merge_keeps_colors_border_and_wrap_from_either_side() {
        let base = SpecCellFormat {
            bg_color: Some("#DDEBF7".to_string()),
            border: Some(1),
            ..Default::default()
        };
        let merged = base.merge(&SpecCellFormat {
            font_color: Some("#1F4E78".to_string()),
            border: Some(0),
            text_wrap: Some(true),
            ..Default::default()
        });
        assert_eq!(merged.bg_color.as_deref(), Some("#DDEBF7"));
        assert_eq!(merged.font_color.as_deref(), Some("#1F4E78"));
        assert_eq!(merged.border, Some(0));
        assert_eq!(merged.text_wrap, Some(true));
    }
}
