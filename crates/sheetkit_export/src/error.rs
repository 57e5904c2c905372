//! Export error kinds shared by the pipeline and every writer format.

use thiserror::Error;

/// "Export call failed" errors. Every variant aborts the running export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Invalid pipeline/writer configuration or unopenable destination.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A record could not be converted into a row.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Writer adapter failed during open/add-row/close.
    #[error("write error: {0}")]
    Write(String),

    /// Query source failed to fetch a page or the full result set.
    #[error("source fetch error: {0}")]
    SourceFetch(String),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Write(format!("io error: {err}"))
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ExportError>;

impl ExportError {
    /// Short kind label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Serialization(_) => "serialization",
            Self::Write(_) => "write",
            Self::SourceFetch(_) => "source_fetch",
        }
    }
}
