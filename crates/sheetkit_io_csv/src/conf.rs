//! CSV option registry.

use sheetkit_export::{EnumOptionKind, SpecOptionDescriptor};

/// UTF-8 byte order mark.
pub const V_UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Options accepted by [`crate::writer::CsvRowWriter`].
pub const L_CSV_OPTION_REGISTRY: &[SpecOptionDescriptor] = &[
    SpecOptionDescriptor {
        name: "delimiter",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "quote",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "quote_style",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "terminator",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "write_bom",
        kinds: &[EnumOptionKind::Boolean],
    },
    SpecOptionDescriptor {
        name: "null_text",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "bool_text",
        kinds: &[EnumOptionKind::String, EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "date_format",
        kinds: &[EnumOptionKind::String],
    },
    SpecOptionDescriptor {
        name: "datetime_format",
        kinds: &[EnumOptionKind::String],
    },
];
