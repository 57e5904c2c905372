//! Delimited-text writer adapter.

use std::fs::File;
use std::io::{BufWriter, Write};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::debug;
use sheetkit_export::{
    EnumCellValue, EnumDestination, ExportError, Result, RowWriter, SpecOptionDescriptor,
    SpecWriterOption, WriterFactory, derive_unknown_option_error,
};

use crate::conf::{L_CSV_OPTION_REGISTRY, V_UTF8_BOM};
use crate::spec::{EnumCsvQuoteStyle, EnumCsvTerminator, SpecCsvWriteOptions};
use crate::util::{
    parse_quote_style, parse_single_byte, parse_terminator, render_cell, validate_strftime,
};

type CsvSink = Box<dyn Write + Send>;

/// Factory for [`CsvRowWriter`].
#[derive(Debug, Clone, Default)]
pub struct CsvWriterFactory {
    /// Starting options before pending options are replayed.
    pub write_options: SpecCsvWriteOptions,
}

impl WriterFactory for CsvWriterFactory {
    type Writer = CsvRowWriter;

    fn format_name(&self) -> &'static str {
        "csv"
    }

    fn option_registry(&self) -> &'static [SpecOptionDescriptor] {
        L_CSV_OPTION_REGISTRY
    }

    fn create_writer(&self) -> Result<CsvRowWriter> {
        Ok(CsvRowWriter::new(self.write_options.clone()))
    }
}

/// Stateful CSV row sink.
pub struct CsvRowWriter {
    write_options: SpecCsvWriteOptions,
    csv_writer: Option<csv::Writer<CsvSink>>,
    l_cells_buf: Vec<String>,
    if_closed: bool,
}

impl CsvRowWriter {
    /// Create an unopened writer.
    pub fn new(write_options: SpecCsvWriteOptions) -> Self {
        Self {
            write_options,
            csv_writer: None,
            l_cells_buf: Vec::new(),
            if_closed: false,
        }
    }

    /// Current options.
    pub fn write_options(&self) -> &SpecCsvWriteOptions {
        &self.write_options
    }

    fn derive_csv_writer(&self, mut sink: CsvSink) -> Result<csv::Writer<CsvSink>> {
        if self.write_options.if_write_bom {
            sink.write_all(V_UTF8_BOM)?;
        }
        let rule_quote = match self.write_options.rule_quote {
            EnumCsvQuoteStyle::Necessary => QuoteStyle::Necessary,
            EnumCsvQuoteStyle::Always => QuoteStyle::Always,
            EnumCsvQuoteStyle::Never => QuoteStyle::Never,
            EnumCsvQuoteStyle::NonNumeric => QuoteStyle::NonNumeric,
        };
        let rule_terminator = match self.write_options.rule_terminator {
            EnumCsvTerminator::Lf => Terminator::Any(b'\n'),
            EnumCsvTerminator::Crlf => Terminator::CRLF,
        };
        Ok(WriterBuilder::new()
            .delimiter(self.write_options.delimiter)
            .quote(self.write_options.quote)
            .quote_style(rule_quote)
            .terminator(rule_terminator)
            .flexible(true)
            .from_writer(sink))
    }
}

impl RowWriter for CsvRowWriter {
    fn apply_option(&mut self, option: &SpecWriterOption) -> Result<()> {
        if self.csv_writer.is_some() {
            return Err(ExportError::Configuration(format!(
                "Cannot apply option `{}` after open().",
                option.name
            )));
        }
        let arg_str = |idx: usize| option.arg(idx).and_then(|val| val.as_str()).unwrap_or("");

        match option.name.as_str() {
            "delimiter" => {
                self.write_options.delimiter = parse_single_byte("delimiter", arg_str(0))?;
            }
            "quote" => {
                self.write_options.quote = parse_single_byte("quote", arg_str(0))?;
            }
            "quote_style" => {
                self.write_options.rule_quote = parse_quote_style(arg_str(0))?;
            }
            "terminator" => {
                self.write_options.rule_terminator = parse_terminator(arg_str(0))?;
            }
            "write_bom" => {
                self.write_options.if_write_bom =
                    option.arg(0).and_then(|val| val.as_bool()).unwrap_or(false);
            }
            "null_text" => {
                self.write_options.null_text = arg_str(0).to_string();
            }
            "bool_text" => {
                self.write_options.true_text = arg_str(0).to_string();
                self.write_options.false_text = arg_str(1).to_string();
            }
            "date_format" => {
                validate_strftime("date_format", arg_str(0))?;
                self.write_options.date_format = arg_str(0).to_string();
            }
            "datetime_format" => {
                validate_strftime("datetime_format", arg_str(0))?;
                self.write_options.datetime_format = arg_str(0).to_string();
            }
            _ => return Err(derive_unknown_option_error(option)),
        }
        Ok(())
    }

    fn open(&mut self, destination: EnumDestination) -> Result<()> {
        if self.csv_writer.is_some() || self.if_closed {
            return Err(ExportError::Write("CSV writer is already opened.".to_string()));
        }
        let sink: CsvSink = match destination {
            EnumDestination::Path(path) => {
                let file = File::create(&path).map_err(|err| {
                    ExportError::Configuration(format!(
                        "Cannot open destination {}: {err}",
                        path.display()
                    ))
                })?;
                debug!("csv writer opened file {}", path.display());
                Box::new(BufWriter::new(file))
            }
            EnumDestination::Stream { name, sink } => {
                debug!("csv writer opened stream {name}");
                sink
            }
        };
        self.csv_writer = Some(self.derive_csv_writer(sink)?);
        Ok(())
    }

    fn add_row(&mut self, row: &[EnumCellValue]) -> Result<()> {
        let Some(csv_writer) = self.csv_writer.as_mut() else {
            return Err(ExportError::Write(
                "Cannot add rows before open() or after close().".to_string(),
            ));
        };
        self.l_cells_buf.clear();
        self.l_cells_buf
            .extend(row.iter().map(|value| render_cell(value, &self.write_options)));
        csv_writer
            .write_record(&self.l_cells_buf)
            .map_err(derive_csv_error)
    }

    /// Flush and release the sink. Idempotent.
    fn close(&mut self) -> Result<()> {
        if self.if_closed {
            return Ok(());
        }
        self.if_closed = true;
        if let Some(mut csv_writer) = self.csv_writer.take() {
            csv_writer.flush()?;
        }
        Ok(())
    }
}

fn derive_csv_error(err: csv::Error) -> ExportError {
    ExportError::Write(format!("csv write error: {err}"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use sheetkit_export::{
        EnumCellValue, EnumDestination, EnumOptionValue, ExportError, RowWriter,
        SpecWriterOption,
    };

    use super::CsvRowWriter;
    use crate::spec::{EnumCsvQuoteStyle, SpecCsvWriteOptions};

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

    fn open_stream(writer: &mut CsvRowWriter) -> SharedBuf {
        let buf = SharedBuf::default();
        writer
            .open(EnumDestination::Stream {
                name: "out.csv".to_string(),
                sink: Box::new(buf.clone()),
            })
            .expect("open");
        buf
    }

    fn text_of(buf: &SharedBuf) -> String {
        String::from_utf8(buf.0.lock().expect("lock").clone()).expect("utf8")
    }

    #[test]
    fn options_change_delimiter_and_quoting() {
        let mut writer = CsvRowWriter::new(SpecCsvWriteOptions::default());
        writer
            .apply_option(&SpecWriterOption::new("delimiter", vec![";".into()]))
            .expect("delimiter");
        writer
            .apply_option(&SpecWriterOption::new("quote_style", vec!["always".into()]))
            .expect("quote_style");
        assert_eq!(writer.write_options().delimiter, b';');
        assert_eq!(writer.write_options().rule_quote, EnumCsvQuoteStyle::Always);
        let buf = open_stream(&mut writer);

        writer
            .add_row(&[EnumCellValue::from("a"), EnumCellValue::Integer(1)])
            .expect("row");
        writer.close().expect("close");

        assert_eq!(text_of(&buf), "\"a\";\"1\"\n");
    }

    #[test]
    fn bom_and_crlf_are_written() {
        let mut writer = CsvRowWriter::new(SpecCsvWriteOptions::default());
        writer
            .apply_option(&SpecWriterOption::new("write_bom", vec![true.into()]))
            .expect("bom");
        writer
            .apply_option(&SpecWriterOption::new("terminator", vec!["crlf".into()]))
            .expect("terminator");
        let buf = open_stream(&mut writer);
        writer.add_row(&[EnumCellValue::Null]).expect("row");
        writer.close().expect("close");

        let v_bytes = buf.0.lock().expect("lock").clone();
        assert!(v_bytes.starts_with(b"\xEF\xBB\xBF"));
        assert!(v_bytes.ends_with(b"\r\n"));
    }

    #[test]
    fn add_row_after_close_fails() {
        let mut writer = CsvRowWriter::new(SpecCsvWriteOptions::default());
        let _buf = open_stream(&mut writer);
        writer.close().expect("close");
        writer.close().expect("close is idempotent");
        let err = writer
            .add_row(&[EnumCellValue::Integer(1)])
            .expect_err("closed");
        assert!(matches!(err, ExportError::Write(_)));
    }

    #[test]
    fn invalid_option_argument_is_rejected() {
        let mut writer = CsvRowWriter::new(SpecCsvWriteOptions::default());
        let err = writer
            .apply_option(&SpecWriterOption::new(
                "quote_style",
                vec![EnumOptionValue::from("sometimes")],
            ))
            .expect_err("bad quote style");
        assert!(matches!(err, ExportError::Configuration(_)));
    }
}
