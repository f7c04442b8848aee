use std::fmt;

use super::model::Table;
use super::xlsx;
use crate::error::ExportError;

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ---------------------------------------------------------------------------
// Export format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Excel];

    /// Canonical file extension, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_MIME,
            ExportFormat::Excel => XLSX_MIME,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "Excel",
        })
    }
}

// ---------------------------------------------------------------------------
// Download payload
// ---------------------------------------------------------------------------

/// A converted file ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
}

/// Serialize `table` in `format` and derive the download name from `source_name`.
pub fn export(
    table: &Table,
    format: ExportFormat,
    source_name: &str,
) -> Result<Download, ExportError> {
    let bytes = match format {
        ExportFormat::Csv => write_csv(table)?,
        ExportFormat::Excel => xlsx::write_workbook(table)?,
    };
    let file_name = output_file_name(source_name, format);
    log::info!("Exported '{source_name}' as '{file_name}' ({} bytes)", bytes.len());
    Ok(Download {
        bytes,
        file_name,
        mime_type: format.mime_type(),
    })
}

/// Swap the final extension of `source_name` for the format's extension.
/// A name without an extension gets one appended.
pub fn output_file_name(source_name: &str, format: ExportFormat) -> String {
    let stem = match source_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => source_name,
    };
    format!("{stem}.{}", format.extension())
}

/// Comma-separated UTF-8 with a header row and no index column.
pub fn write_csv(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if table.width() > 0 {
        writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
        for row in 0..table.len() {
            writer.write_record(table.row(row).iter().map(|v| v.to_field()))?;
        }
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}
