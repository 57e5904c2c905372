//! Export pipeline: source resolution, serialization, and writer orchestration.

use std::io::Write;
use std::path::Path;

use log::{debug, info, warn};

use crate::error::{ExportError, Result};
use crate::record::Record;
use crate::serializer::{BasicSerializer, RowSerializer, validate_row_width};
use crate::source::{EnumDataSource, QuerySource};
use crate::spec::{EnumDestination, EnumOptionValue, Row, SpecExportReport, SpecWriterOption};
use crate::writer::{RowWriter, WriterFactory, validate_writer_option};

/// Configurable, reusable export of records into one writer format.
///
/// Configuration is not consumed by [`Self::save`]/[`Self::stream`]; each call
/// creates, drives, and closes its own writer. Exports run synchronously on the
/// caller's thread.
///
/// The header row is resolved once the first record is available: after the
/// first page, or after the full fetch when no chunk size is set. A source
/// that fails before then leaves an opened writer with no header.
pub struct Exporter<R, F: WriterFactory> {
    factory: F,
    data_source: Option<EnumDataSource<R>>,
    serializer: Box<dyn RowSerializer<R>>,
    n_size_chunk: Option<usize>,
    l_options_pending: Vec<SpecWriterOption>,
}

impl<R: Record, F: WriterFactory> Exporter<R, F> {
    /// Create a pipeline using [`BasicSerializer`].
    pub fn new(factory: F) -> Self {
        Self::with_serializer(factory, BasicSerializer::new())
    }
}

impl<R, F: WriterFactory> Exporter<R, F> {
    /// Create a pipeline with a custom serializer.
    pub fn with_serializer(factory: F, serializer: impl RowSerializer<R> + 'static) -> Self {
        Self {
            factory,
            data_source: None,
            serializer: Box::new(serializer),
            n_size_chunk: None,
            l_options_pending: Vec::new(),
        }
    }

    /// Export a materialized record list. Replaces any previous source.
    pub fn load(&mut self, l_records: Vec<R>) -> &mut Self {
        self.data_source = Some(EnumDataSource::Materialized(l_records));
        self
    }

    /// Export a query result. Replaces any previous source.
    pub fn load_query(&mut self, query: impl QuerySource<R> + 'static) -> &mut Self {
        self.data_source = Some(EnumDataSource::Queryable(Box::new(query)));
        self
    }

    /// Fetch query sources in pages of `n_size` records.
    pub fn set_chunk_size(&mut self, n_size: usize) -> Result<&mut Self> {
        if n_size == 0 {
            return Err(ExportError::Configuration(
                "Chunk size must be >= 1.".to_string(),
            ));
        }
        self.n_size_chunk = Some(n_size);
        Ok(self)
    }

    /// Fetch query sources eagerly again.
    pub fn clear_chunk_size(&mut self) -> &mut Self {
        self.n_size_chunk = None;
        self
    }

    /// Replace the active serializer.
    pub fn set_serializer(&mut self, serializer: impl RowSerializer<R> + 'static) -> &mut Self {
        self.serializer = Box::new(serializer);
        self
    }

    /// Record a writer option for replay at writer creation.
    ///
    /// Names are not checked here; unknown names or bad arguments fail the
    /// export before the destination is opened.
    pub fn option(&mut self, name: impl Into<String>, args: Vec<EnumOptionValue>) -> &mut Self {
        self.l_options_pending.push(SpecWriterOption::new(name, args));
        self
    }

    /// Recorded writer options, in replay order.
    pub fn pending_options(&self) -> &[SpecWriterOption] {
        &self.l_options_pending
    }

    /// Configured chunk size.
    pub fn chunk_size(&self) -> Option<usize> {
        self.n_size_chunk
    }

    /// Writer factory of this pipeline.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Export to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<SpecExportReport> {
        self.export(EnumDestination::Path(path.as_ref().to_path_buf()))
    }

    /// Export to an outbound stream announced as `name`.
    pub fn stream(
        &self,
        name: &str,
        sink: impl Write + Send + 'static,
    ) -> Result<SpecExportReport> {
        self.export(EnumDestination::Stream {
            name: name.to_string(),
            sink: Box::new(sink),
        })
    }

    /// Run one export against `destination`.
    ///
    /// Once the writer is open it is closed exactly once, also when a later
    /// step fails; the first failure is returned.
    pub fn export(&self, destination: EnumDestination) -> Result<SpecExportReport> {
        let Some(data_source) = &self.data_source else {
            return Err(ExportError::Configuration(
                "No data source loaded; call load() or load_query() first.".to_string(),
            ));
        };

        let mut report = SpecExportReport {
            destination: destination.label(),
            n_options_applied: self.l_options_pending.len(),
            ..SpecExportReport::default()
        };

        let mut writer = self.create()?;
        writer.open(destination)?;
        debug!(
            "opened {} writer: destination={} source={}",
            self.factory.format_name(),
            report.destination,
            data_source.kind()
        );

        match self.make_rows(&mut writer, data_source, &mut report) {
            Ok(()) => {
                writer.close()?;
                info!("{}", report.format(&format!("[{}]", self.factory.format_name())));
                Ok(report)
            }
            Err(err) => {
                if let Err(err_close) = writer.close() {
                    warn!(
                        "close after failed export also failed: destination={} error={err_close}",
                        report.destination
                    );
                }
                warn!(
                    "export aborted: destination={} kind={} rows_written={}",
                    report.destination,
                    err.kind(),
                    report.n_rows_total()
                );
                Err(err)
            }
        }
    }

    fn create(&self) -> Result<F::Writer> {
        let mut writer = self.factory.create_writer()?;
        let registry = self.factory.option_registry();
        for option in &self.l_options_pending {
            validate_writer_option(registry, option)?;
            debug!("applying {} option {option}", self.factory.format_name());
            writer.apply_option(option)?;
        }
        Ok(writer)
    }

    fn make_rows(
        &self,
        writer: &mut F::Writer,
        data_source: &EnumDataSource<R>,
        report: &mut SpecExportReport,
    ) -> Result<()> {
        let mut emitter = RowEmitter {
            writer,
            serializer: self.serializer.as_ref(),
            report,
            l_header: None,
        };

        match data_source {
            EnumDataSource::Materialized(l_records) => {
                emitter.emit_records(l_records)?;
            }
            EnumDataSource::Queryable(query) => match self.n_size_chunk {
                Some(n_size_chunk) => {
                    let n_fetches = query
                        .for_each_page(n_size_chunk, &mut |l_page| emitter.emit_records(&l_page))?;
                    emitter.report.n_pages_fetched = n_fetches;
                }
                None => {
                    let l_records = query.fetch_all()?;
                    emitter.report.n_pages_fetched = 1;
                    emitter.emit_records(&l_records)?;
                }
            },
        }

        emitter.emit_header(None)
    }
}

/// Per-export row writing state.
///
/// The header is resolved lazily from the first record so that paged sources
/// need no extra fetch; it is still written before any data row.
struct RowEmitter<'a, R, W> {
    writer: &'a mut W,
    serializer: &'a dyn RowSerializer<R>,
    report: &'a mut SpecExportReport,
    l_header: Option<Row>,
}

impl<R, W: RowWriter> RowEmitter<'_, R, W> {
    fn emit_header(&mut self, record_first: Option<&R>) -> Result<()> {
        if self.l_header.is_some() {
            return Ok(());
        }
        let l_header = self.serializer.header_row(record_first)?;
        if !l_header.is_empty() {
            self.writer.add_header_row(&l_header)?;
            self.report.n_rows_header = 1;
        }
        self.l_header = Some(l_header);
        Ok(())
    }

    fn emit_records(&mut self, l_records: &[R]) -> Result<()> {
        self.emit_header(l_records.first())?;
        for record in l_records {
            let row = self.serializer.data_row(record)?;
            if let Some(l_header) = &self.l_header {
                validate_row_width(l_header, &row, self.report.n_rows_data)?;
            }
            self.writer.add_row(&row)?;
            self.report.n_rows_data += 1;
        }
        Ok(())
    }
}
