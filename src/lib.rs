//! Tidy Panda core: load CSV / Excel tables, clean them, convert them.
//!
//! The desktop shell in `main.rs` drives [`pipeline::run`] and
//! [`pipeline::export`] once per uploaded file and user interaction.

pub mod data;
pub mod error;
pub mod pipeline;

pub use data::export::{Download, ExportFormat};
pub use data::model::{CellValue, Column, ColumnKind, Table};
pub use error::{ExportError, FileError, LoadError, Operation, SelectionError};
pub use pipeline::{PipelineOptions, PipelineRun};
