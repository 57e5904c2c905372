//! Stateless helpers for option parsing and cell rendering.

use chrono::format::{Item, StrftimeItems};
use sheetkit_export::{EnumCellValue, ExportError, Result};

use crate::spec::{EnumCsvQuoteStyle, EnumCsvTerminator, SpecCsvWriteOptions};

/// Parse a one-byte ASCII delimiter/quote option.
pub fn parse_single_byte(name: &str, value: &str) -> Result<u8> {
    let v_bytes = value.as_bytes();
    if v_bytes.len() != 1 || !v_bytes[0].is_ascii() {
        return Err(ExportError::Configuration(format!(
            "`{name}` must be a single ASCII character, got {value:?}."
        )));
    }
    Ok(v_bytes[0])
}

/// Parse a quote policy name.
pub fn parse_quote_style(value: &str) -> Result<EnumCsvQuoteStyle> {
    match value.trim().to_ascii_lowercase().as_str() {
        "necessary" => Ok(EnumCsvQuoteStyle::Necessary),
        "always" => Ok(EnumCsvQuoteStyle::Always),
        "never" => Ok(EnumCsvQuoteStyle::Never),
        "non_numeric" | "nonnumeric" => Ok(EnumCsvQuoteStyle::NonNumeric),
        _ => Err(ExportError::Configuration(format!(
            "Unknown quote_style {value:?}; expected necessary, always, never or non_numeric."
        ))),
    }
}

/// Parse a record terminator name.
pub fn parse_terminator(value: &str) -> Result<EnumCsvTerminator> {
    match value.trim().to_ascii_lowercase().as_str() {
        "lf" | "\n" => Ok(EnumCsvTerminator::Lf),
        "crlf" | "\r\n" => Ok(EnumCsvTerminator::Crlf),
        _ => Err(ExportError::Configuration(format!(
            "Unknown terminator {value:?}; expected lf or crlf."
        ))),
    }
}

/// Reject `strftime` patterns chrono cannot render.
pub fn validate_strftime(name: &str, pattern: &str) -> Result<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ExportError::Configuration(format!(
            "`{name}` is not a valid strftime pattern: {pattern:?}."
        )));
    }
    Ok(())
}

/// Render one cell as text.
pub fn render_cell(value: &EnumCellValue, options: &SpecCsvWriteOptions) -> String {
    match value {
        EnumCellValue::Null => options.null_text.clone(),
        EnumCellValue::String(val) => val.clone(),
        EnumCellValue::Integer(val) => val.to_string(),
        EnumCellValue::Number(val) => val.to_string(),
        EnumCellValue::Boolean(true) => options.true_text.clone(),
        EnumCellValue::Boolean(false) => options.false_text.clone(),
        EnumCellValue::Date(val) => val.format(&options.date_format).to_string(),
        EnumCellValue::DateTime(val) => val.format(&options.datetime_format).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sheetkit_export::EnumCellValue;

    use super::{parse_single_byte, parse_terminator, render_cell, validate_strftime};
    use crate::spec::{EnumCsvTerminator, SpecCsvWriteOptions};

    #[test]
    fn single_byte_rejects_multi_char() {
        assert_eq!(parse_single_byte("delimiter", ";").expect("ok"), b';');
        assert!(parse_single_byte("delimiter", "::").is_err());
        assert!(parse_single_byte("delimiter", "").is_err());
    }

    #[test]
    fn terminator_names_parse() {
        assert_eq!(parse_terminator("CRLF").expect("ok"), EnumCsvTerminator::Crlf);
        assert!(parse_terminator("cr").is_err());
    }

    #[test]
    fn strftime_validation_catches_bad_specifier() {
        assert!(validate_strftime("date_format", "%d/%m/%Y").is_ok());
        assert!(validate_strftime("date_format", "%Q").is_err());
    }

    #[test]
    fn render_cell_uses_option_texts() {
        let options = SpecCsvWriteOptions {
            null_text: "NA".to_string(),
            true_text: "Y".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            ..SpecCsvWriteOptions::default()
        };
        assert_eq!(render_cell(&EnumCellValue::Null, &options), "NA");
        assert_eq!(render_cell(&EnumCellValue::Boolean(true), &options), "Y");
        assert_eq!(render_cell(&EnumCellValue::Number(1.5), &options), "1.5");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("date");
        assert_eq!(render_cell(&EnumCellValue::Date(date), &options), "09/03/2024");
    }
}
