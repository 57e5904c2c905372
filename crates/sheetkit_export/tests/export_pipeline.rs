use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::{Arc, Mutex};

use polars::prelude::{DataFrame, IntoColumn, IpcWriter, NamedFrom, SerWriter, Series};
use sheetkit_export::{
    DataFrameQuery, EnumCellValue, EnumDestination, EnumOptionKind, ExportError, Exporter,
    FnSerializer, Result, Row, RowWriter, SpecOptionDescriptor, SpecRecord, SpecWriterOption,
    VecQuery, WriterFactory,
};

/// Pipe-separated text writer used to observe pipeline output end to end.
struct PipeWriter {
    separator: String,
    sink: Option<Box<dyn Write + Send>>,
}

impl RowWriter for PipeWriter {
    fn apply_option(&mut self, option: &SpecWriterOption) -> Result<()> {
        self.separator = option
            .arg(0)
            .and_then(|val| val.as_str())
            .unwrap_or("|")
            .to_string();
        Ok(())
    }

    fn open(&mut self, destination: EnumDestination) -> Result<()> {
        self.sink = Some(match destination {
            EnumDestination::Path(path) => Box::new(BufWriter::new(File::create(path)?)),
            EnumDestination::Stream { sink, .. } => sink,
        });
        Ok(())
    }

    fn add_row(&mut self, row: &[EnumCellValue]) -> Result<()> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(ExportError::Write("not open".to_string()));
        };
        let l_cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        writeln!(sink, "{}", l_cells.join(&self.separator))?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut sink) = self.sink.take() {
            sink.flush()?;
        }
        Ok(())
    }
}

struct PipeFactory;

impl WriterFactory for PipeFactory {
    type Writer = PipeWriter;

    fn format_name(&self) -> &'static str {
        "pipe"
    }

    fn option_registry(&self) -> &'static [SpecOptionDescriptor] {
        &[SpecOptionDescriptor {
            name: "separator",
            kinds: &[EnumOptionKind::String],
        }]
    }

    fn create_writer(&self) -> Result<PipeWriter> {
        Ok(PipeWriter {
            separator: "|".to_string(),
            sink: None,
        })
    }
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().expect("lock").clone()).expect("utf8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn person(n_id: i64, name: &str) -> SpecRecord {
    SpecRecord::new().with("id", n_id).with("name", name)
}

#[test]
fn save_writes_header_and_rows_to_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("people.txt");

    let mut exporter = Exporter::new(PipeFactory);
    exporter.load(vec![person(1, "ann"), person(2, "bob")]);
    let report = exporter.save(&path).expect("save");

    assert_eq!(
        std::fs::read_to_string(&path).expect("read"),
        "id|name\n1|ann\n2|bob\n"
    );
    assert_eq!(report.n_rows_header, 1);
    assert_eq!(report.n_rows_data, 2);
    assert_eq!(report.destination, path.to_string_lossy());
}

#[test]
fn same_configuration_exports_twice() {
    let mut exporter = Exporter::new(PipeFactory);
    exporter
        .load(vec![person(1, "ann")])
        .option("separator", vec![";".into()]);

    let buf_first = SharedBuf::default();
    let buf_second = SharedBuf::default();
    exporter.stream("a.txt", buf_first.clone()).expect("first");
    let report = exporter.stream("b.txt", buf_second.clone()).expect("second");

    assert_eq!(buf_first.text(), "id;name\n1;ann\n");
    assert_eq!(buf_first.text(), buf_second.text());
    assert_eq!(report.destination, "stream:b.txt");
    assert_eq!(report.n_options_applied, 1);
}

#[test]
fn chunked_ipc_frame_matches_eager_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path_ipc = dir.path().join("people.arrow");
    let mut df = polars::df!(
        "id" => [1i64, 2, 3, 4, 5],
        "name" => ["a", "b", "c", "d", "e"]
    )
    .expect("df");
    let file = File::create(&path_ipc).expect("create ipc");
    IpcWriter::new(file).finish(&mut df).expect("write ipc");

    let mut exporter = Exporter::new(PipeFactory);
    exporter.load_query(DataFrameQuery::from_ipc_file(&path_ipc).expect("read ipc"));

    let buf_eager = SharedBuf::default();
    let report_eager = exporter.stream("eager", buf_eager.clone()).expect("eager");

    exporter.set_chunk_size(2).expect("chunk");
    let buf_chunked = SharedBuf::default();
    let report_chunked = exporter
        .stream("chunked", buf_chunked.clone())
        .expect("chunked");

    assert_eq!(buf_eager.text(), "id|name\n1|a\n2|b\n3|c\n4|d\n5|e\n");
    assert_eq!(buf_eager.text(), buf_chunked.text());
    assert_eq!(report_eager.n_pages_fetched, 1);
    assert_eq!(report_chunked.n_pages_fetched, 3);
    assert_eq!(report_chunked.n_rows_data, 5);
}

#[test]
fn failing_record_keeps_rows_written_before_it() {
    let buf = SharedBuf::default();
    let mut exporter = Exporter::with_serializer(
        PipeFactory,
        FnSerializer::new(["n"], |n_value: &i64| -> Result<Row> {
            if *n_value < 0 {
                return Err(ExportError::Serialization(format!(
                    "negative value {n_value}"
                )));
            }
            Ok(vec![EnumCellValue::Integer(*n_value)])
        }),
    );
    exporter.load_query(VecQuery::new(vec![1i64, 2, -3, 4]));
    exporter.set_chunk_size(2).expect("chunk");

    let err = exporter.stream("partial", buf.clone()).expect_err("fails");

    assert!(matches!(err, ExportError::Serialization(_)));
    assert_eq!(buf.text(), "n\n1\n2\n");
}

#[test]
fn unsupported_frame_column_aborts_export() {
    let s_ids = Series::new("id".into(), &[1i64, 2]);
    let s_tags = Series::new(
        "tags".into(),
        &[Series::new("".into(), &["a"]), Series::new("".into(), &["b", "c"])],
    );
    let df = DataFrame::new(vec![s_ids.into_column(), s_tags.into_column()]).expect("df");

    let buf = SharedBuf::default();
    let mut exporter = Exporter::new(PipeFactory);
    exporter.load_query(DataFrameQuery::new(df));
    exporter.set_chunk_size(1).expect("chunk");
    let err = exporter.stream("tags", buf.clone()).expect_err("list column");

    assert!(matches!(err, ExportError::Serialization(_)));
    assert_eq!(buf.text(), "");
}

#[test]
fn unknown_option_fails_before_destination_is_touched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("never.txt");

    let mut exporter = Exporter::new(PipeFactory);
    exporter
        .load(vec![person(1, "ann")])
        .option("sepparator", vec![";".into()]);
    let err = exporter.save(&path).expect_err("typo");

    assert!(matches!(err, ExportError::Configuration(_)));
    assert!(!path.exists());
}
