//! Shared export specification models: cells, rows, options, destinations, reports.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// Scalar cell value handed from serializer to writer.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    Null,
    /// Text value.
    String(String),
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without timezone.
    DateTime(NaiveDateTime),
}

/// One ordered row of cells.
pub type Row = Vec<EnumCellValue>;

impl EnumCellValue {
    /// Whether this cell is [`EnumCellValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Type label used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
        }
    }
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::String(val) => write!(f, "{val}"),
            Self::Integer(val) => write!(f, "{val}"),
            Self::Number(val) => write!(f, "{val}"),
            Self::Boolean(val) => write!(f, "{val}"),
            Self::Date(val) => write!(f, "{}", val.format("%Y-%m-%d")),
            Self::DateTime(val) => write!(f, "{}", val.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for EnumCellValue {
    fn from(val: &str) -> Self {
        Self::String(val.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(val: String) -> Self {
        Self::String(val)
    }
}

impl From<bool> for EnumCellValue {
    fn from(val: bool) -> Self {
        Self::Boolean(val)
    }
}

impl From<f32> for EnumCellValue {
    fn from(val: f32) -> Self {
        Self::Number(val as f64)
    }
}

impl From<f64> for EnumCellValue {
    fn from(val: f64) -> Self {
        Self::Number(val)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for EnumCellValue {
                fn from(val: $ty) -> Self {
                    Self::Integer(val as i64)
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<NaiveDate> for EnumCellValue {
    fn from(val: NaiveDate) -> Self {
        Self::Date(val)
    }
}

impl From<NaiveDateTime> for EnumCellValue {
    fn from(val: NaiveDateTime) -> Self {
        Self::DateTime(val)
    }
}

impl<T: Into<EnumCellValue>> From<Option<T>> for EnumCellValue {
    fn from(val: Option<T>) -> Self {
        val.map_or(Self::Null, Into::into)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriterOptions

/// Typed argument of one pending writer option.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumOptionValue {
    /// Text argument.
    String(String),
    /// Integer argument.
    Integer(i64),
    /// Float argument.
    Float(f64),
    /// Boolean argument.
    Boolean(bool),
}

/// Argument kind declared by a format's option registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumOptionKind {
    /// Expects [`EnumOptionValue::String`].
    String,
    /// Expects [`EnumOptionValue::Integer`].
    Integer,
    /// Expects [`EnumOptionValue::Float`]; integers are accepted too.
    Float,
    /// Expects [`EnumOptionValue::Boolean`].
    Boolean,
}

impl EnumOptionValue {
    /// Kind of this argument.
    pub fn kind(&self) -> EnumOptionKind {
        match self {
            Self::String(_) => EnumOptionKind::String,
            Self::Integer(_) => EnumOptionKind::Integer,
            Self::Float(_) => EnumOptionKind::Float,
            Self::Boolean(_) => EnumOptionKind::Boolean,
        }
    }

    /// Borrow text argument.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(val) => Some(val),
            _ => None,
        }
    }

    /// Integer argument.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(val) => Some(*val),
            _ => None,
        }
    }

    /// Float argument (integers widen).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(val) => Some(*val),
            Self::Integer(val) => Some(*val as f64),
            _ => None,
        }
    }

    /// Boolean argument.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(val) => Some(*val),
            _ => None,
        }
    }
}

impl From<&str> for EnumOptionValue {
    fn from(val: &str) -> Self {
        Self::String(val.to_string())
    }
}

impl From<String> for EnumOptionValue {
    fn from(val: String) -> Self {
        Self::String(val)
    }
}

impl From<i64> for EnumOptionValue {
    fn from(val: i64) -> Self {
        Self::Integer(val)
    }
}

impl From<i32> for EnumOptionValue {
    fn from(val: i32) -> Self {
        Self::Integer(val as i64)
    }
}

impl From<usize> for EnumOptionValue {
    fn from(val: usize) -> Self {
        Self::Integer(val as i64)
    }
}

impl From<f64> for EnumOptionValue {
    fn from(val: f64) -> Self {
        Self::Float(val)
    }
}

impl From<bool> for EnumOptionValue {
    fn from(val: bool) -> Self {
        Self::Boolean(val)
    }
}

impl fmt::Display for EnumOptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(val) => write!(f, "{val:?}"),
            Self::Integer(val) => write!(f, "{val}"),
            Self::Float(val) => write!(f, "{val}"),
            Self::Boolean(val) => write!(f, "{val}"),
        }
    }
}

/// One recorded, deferred writer configuration call.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecWriterOption {
    /// Option name as recorded.
    pub name: String,
    /// Arguments in call order.
    pub args: Vec<EnumOptionValue>,
}

impl SpecWriterOption {
    /// Build an option record.
    pub fn new(name: impl Into<String>, args: Vec<EnumOptionValue>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Argument at `idx`; present after registry validation.
    pub fn arg(&self, idx: usize) -> Option<&EnumOptionValue> {
        self.args.get(idx)
    }
}

impl fmt::Display for SpecWriterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l_args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
        write!(f, "{}({})", self.name, l_args.join(", "))
    }
}

/// Registry entry: option name and its positional argument kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecOptionDescriptor {
    /// Recognized option name.
    pub name: &'static str,
    /// Positional argument kinds.
    pub kinds: &'static [EnumOptionKind],
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Destination

/// Where a writer adapter sends its output.
pub enum EnumDestination {
    /// Persist to a filesystem path.
    Path(PathBuf),
    /// Deliver to an outbound byte stream.
    Stream {
        /// Download/attachment name announced for the stream.
        name: String,
        /// Outbound sink.
        sink: Box<dyn Write + Send>,
    },
}

impl EnumDestination {
    /// Label used in logs and reports.
    pub fn label(&self) -> String {
        match self {
            Self::Path(path) => path.to_string_lossy().to_string(),
            Self::Stream { name, .. } => format!("stream:{name}"),
        }
    }
}

impl fmt::Debug for EnumDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Stream { name, .. } => f.debug_struct("Stream").field("name", name).finish(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-export call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecExportReport {
    /// Destination label (path or `stream:<name>`).
    pub destination: String,
    /// Header rows written (0 or 1).
    pub n_rows_header: usize,
    /// Data rows written.
    pub n_rows_data: usize,
    /// Fetch calls issued against a query source.
    pub n_pages_fetched: usize,
    /// Pending options replayed against the writer.
    pub n_options_applied: usize,
}

impl SpecExportReport {
    /// Header plus data rows.
    pub fn n_rows_total(&self) -> usize {
        self.n_rows_header + self.n_rows_data
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} destination={} header={} rows={} pages={} options={}",
            self.destination,
            self.n_rows_header,
            self.n_rows_data,
            self.n_pages_fetched,
            self.n_options_applied
        )
    }
}

impl fmt::Display for SpecExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[EXPORT]"))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
