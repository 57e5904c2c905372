//! Delimited-text writer options.

/// Field quoting policy, mirroring `csv::QuoteStyle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumCsvQuoteStyle {
    /// Quote only fields that need it (default).
    #[default]
    Necessary,
    /// Quote every field.
    Always,
    /// Never quote.
    Never,
    /// Quote every field that is not numeric.
    NonNumeric,
}

/// Record terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumCsvTerminator {
    /// `\n` (default).
    #[default]
    Lf,
    /// `\r\n`.
    Crlf,
}

/// Writer-wide options populated by replayed pending options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCsvWriteOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Quote byte.
    pub quote: u8,
    /// Quoting policy.
    pub rule_quote: EnumCsvQuoteStyle,
    /// Record terminator.
    pub rule_terminator: EnumCsvTerminator,
    /// Prefix output with a UTF-8 byte order mark.
    pub if_write_bom: bool,
    /// Text written for null cells.
    pub null_text: String,
    /// Text written for `true`.
    pub true_text: String,
    /// Text written for `false`.
    pub false_text: String,
    /// `strftime` pattern for dates.
    pub date_format: String,
    /// `strftime` pattern for datetimes.
    pub datetime_format: String,
}

impl Default for SpecCsvWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            rule_quote: EnumCsvQuoteStyle::Necessary,
            rule_terminator: EnumCsvTerminator::Lf,
            if_write_bom: false,
            null_text: String::new(),
            true_text: "true".to_string(),
            false_text: "false".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}
