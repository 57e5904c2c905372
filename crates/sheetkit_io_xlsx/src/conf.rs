//! XLSX constants, default format presets, and the writer option registry.

use std::collections::BTreeMap;

use sheetkit_export::{EnumOptionKind, SpecOptionDescriptor};

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Highest border style index accepted by the `border` option.
pub const N_IDX_BORDER_STYLE_MAX: i64 = 13;
/// Excel maximum column width in character units.
pub const N_WIDTH_EXCEL_COLUMN_MAX: usize = 255;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFmtKey {
    /// Generic text cell format.
    Text,
    /// Integer number format.
    Integer,
    /// Decimal number format.
    Decimal,
    /// Calendar date format.
    Date,
    /// Date-time format.
    DateTime,
    /// Header cell format.
    Header,
}

impl EnumFmtKey {
    /// Preset map key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Header => "header",
        }
    }
}

/// Build default named format presets used by [`crate::writer::XlsxRowWriter`].
pub fn derive_default_xlsx_formats() -> BTreeMap<String, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(EnumFmtKey::Text.as_str().to_string(), cfg_base_fmt_spec.clone());
    dict_fmt.insert(
        EnumFmtKey::Header.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            align: Some("center".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Integer.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("0".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Decimal.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("General".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Date.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("yyyy-mm-dd".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::DateTime.as_str().to_string(),
        cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some("yyyy-mm-dd hh:mm:ss".to_string()),
            ..Default::default()
        }),
    );

    dict_fmt
}

/// Options accepted by [`crate::writer::XlsxRowWriter`].
pub const L_XLSX_OPTION_REGISTRY: &[SpecOptionDescriptor] = &[
    SpecOptionDescriptor {
        name: "sheet_name",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "freeze_header",
        kinds: &[EnumOptionKind::Boolean],
    },
    SpecOptionDescriptor {
        name: "autofit_header",
        kinds: &[EnumOptionKind::Boolean],
    },
    SpecOptionDescriptor {
        name: "column_width",
        kinds: &[EnumOptionKind::Integer, EnumOptionKind::Float],
    },
    SpecOptionDescriptor {
        name: "constant_memory",
        kinds: &[EnumOptionKind::Boolean],
    },
    SpecOptionDescriptor {
        name: "font_name",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "font_size",
        kinds: &[EnumOptionKind::Integer],
    },
    SpecOptionDescriptor {
        name: "header_bold",
        kinds: &[EnumOptionKind::Boolean],
    },
    SpecOptionDescriptor {
        name: "header_bg_color",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "header_font_color",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "border",
        kinds: &[EnumOptionKind::Integer],
    },
    SpecOptionDescriptor {
        name: "text_wrap",
        kinds: &[EnumOptionKind::Boolean],
    },
    SpecOptionDescriptor {
        name: "date_format",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "datetime_format",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "decimal_format",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "repeat_header",
        kinds: &[EnumOptionKind::Boolean],
    },
    SpecOptionDescriptor {
        name: "max_rows_per_sheet",
        kinds: &[EnumOptionKind::Integer],
    },
];
