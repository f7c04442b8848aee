use std::fmt;

use thiserror::Error;

use crate::data::model::TableError;

/// Failure to turn an uploaded file into a [`crate::data::model::Table`].
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("unsupported file extension '.{0}' (expected csv or xlsx)")]
    UnsupportedExtension(String),

    #[error("file has no header row")]
    MissingHeader,

    #[error("workbook contains no worksheet")]
    NoWorksheet,

    #[error("row {row} has {actual} fields but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("{0}")]
    Table(#[from] TableError),
}

/// A column selection that cannot be applied to the current table.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("column '{0}' does not exist")]
    UnknownColumn(String),

    #[error("column '{0}' is selected more than once")]
    DuplicateColumn(String),
}

/// Failure while serializing a table for download.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("workbook packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("cell at {position} contains a character that cannot be stored in a workbook")]
    IllegalCharacter { position: String },
}

// ---------------------------------------------------------------------------
// Per-file error reported to the user
// ---------------------------------------------------------------------------

/// The step of a file's processing that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Select,
    Export,
    Save,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Load => "loading",
            Operation::Select => "column selection",
            Operation::Export => "conversion",
            Operation::Save => "saving",
        })
    }
}

/// An error scoped to one uploaded file, naming the file and the failing step.
#[derive(Error, Debug)]
#[error("{file}: {operation} failed: {cause:#}")]
pub struct FileError {
    pub file: String,
    pub operation: Operation,
    pub cause: anyhow::Error,
}

impl FileError {
    pub fn new(
        file: impl Into<String>,
        operation: Operation,
        cause: impl Into<anyhow::Error>,
    ) -> Self {
        FileError {
            file: file.into(),
            operation,
            cause: cause.into(),
        }
    }
}
