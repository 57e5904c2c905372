//! Writer adapter contract, format factory, and pending-option registry checks.

use crate::error::{ExportError, Result};
use crate::spec::{
    EnumCellValue, EnumDestination, EnumOptionKind, SpecOptionDescriptor, SpecWriterOption,
};

/// Row sink driven by the export pipeline.
///
/// Call order is fixed: `apply_option`* -> `open` -> `add_header_row`? ->
/// `add_row`* -> `close`. Rows land in the sink in call order.
pub trait RowWriter {
    /// Apply one registry-validated option. Only called before [`Self::open`].
    fn apply_option(&mut self, option: &SpecWriterOption) -> Result<()>;

    /// Open the sink against a path or an outbound stream.
    fn open(&mut self, destination: EnumDestination) -> Result<()>;

    /// Append the header row. Formats may style it differently.
    fn add_header_row(&mut self, row: &[EnumCellValue]) -> Result<()> {
        self.add_row(row)
    }

    /// Append one data row.
    fn add_row(&mut self, row: &[EnumCellValue]) -> Result<()>;

    /// Finalize and flush the sink.
    fn close(&mut self) -> Result<()>;
}

impl<W: RowWriter + ?Sized> RowWriter for Box<W> {
    fn apply_option(&mut self, option: &SpecWriterOption) -> Result<()> {
        (**self).apply_option(option)
    }

    fn open(&mut self, destination: EnumDestination) -> Result<()> {
        (**self).open(destination)
    }

    fn add_header_row(&mut self, row: &[EnumCellValue]) -> Result<()> {
        (**self).add_header_row(row)
    }

    fn add_row(&mut self, row: &[EnumCellValue]) -> Result<()> {
        (**self).add_row(row)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// One concrete export format: creates fresh writers and declares its options.
pub trait WriterFactory {
    /// Writer type produced per export call.
    type Writer: RowWriter;

    /// Format label for logs.
    fn format_name(&self) -> &'static str;

    /// Recognized writer options.
    fn option_registry(&self) -> &'static [SpecOptionDescriptor];

    /// Create an unopened writer.
    fn create_writer(&self) -> Result<Self::Writer>;
}

/// Validate one pending option against a format registry.
///
/// Unknown names and mismatched argument kinds are configuration errors.
pub fn validate_writer_option(
    registry: &[SpecOptionDescriptor],
    option: &SpecWriterOption,
) -> Result<()> {
    let Some(descriptor) = registry.iter().find(|desc| desc.name == option.name) else {
        let l_names: Vec<&str> = registry.iter().map(|desc| desc.name).collect();
        return Err(ExportError::Configuration(format!(
            "Unknown writer option `{}`; expected one of: {}.",
            option.name,
            l_names.join(", ")
        )));
    };

    if descriptor.kinds.len() != option.args.len() {
        return Err(ExportError::Configuration(format!(
            "Writer option `{}` takes {} argument(s), got {}.",
            option.name,
            descriptor.kinds.len(),
            option.args.len()
        )));
    }

    for (n_idx_arg, (kind, value)) in descriptor.kinds.iter().zip(&option.args).enumerate() {
        let if_accepted = match kind {
            EnumOptionKind::Float => value.as_f64().is_some(),
            _ => value.kind() == *kind,
        };
        if !if_accepted {
            return Err(ExportError::Configuration(format!(
                "Writer option `{}` argument #{n_idx_arg} expects {kind:?}, got {:?}.",
                option.name,
                value.kind()
            )));
        }
    }
    Ok(())
}

/// Reject option names outside the registry when a writer dispatches on them.
pub fn derive_unknown_option_error(option: &SpecWriterOption) -> ExportError {
    ExportError::Configuration(format!("Unsupported writer option `{}`.", option.name))
}
