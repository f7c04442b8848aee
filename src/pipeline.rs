use std::fmt;

use crate::data::chart::{self, ChartData};
use crate::data::export::{self, Download, ExportFormat};
use crate::data::select::{self, ColumnSelection};
use crate::data::{clean, model::Table};
use crate::error::{ExportError, SelectionError};

/// Rows shown in each stage preview.
pub const PREVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Options: everything the per-file controls decide
// ---------------------------------------------------------------------------

/// Per-file settings, read fresh on every run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineOptions {
    pub remove_duplicates: bool,
    pub fill_missing_mean: bool,
    pub columns: ColumnSelection,
    pub show_chart: bool,
    pub export_format: ExportFormat,
}

// ---------------------------------------------------------------------------
// Run result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Loaded,
    Deduplicated,
    MeanFilled,
    Projected,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Loaded => "Preview",
            Stage::Deduplicated => "Duplicates removed",
            Stage::MeanFilled => "Missing values filled with mean",
            Stage::Projected => "Selected columns",
        })
    }
}

/// The first rows of the table as it left one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSnapshot {
    pub stage: Stage,
    pub preview: Table,
    pub rows: usize,
}

impl StageSnapshot {
    fn of(stage: Stage, table: &Table) -> Self {
        StageSnapshot {
            stage,
            preview: table.head(PREVIEW_ROWS),
            rows: table.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunReport {
    pub rows_loaded: usize,
    pub duplicates_removed: usize,
    pub cells_filled: usize,
    pub columns_kept: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    /// The cleaned, projected table that gets exported.
    pub table: Table,
    /// Present only when requested and a numeric column survived projection.
    pub chart: Option<ChartData>,
    pub stages: Vec<StageSnapshot>,
    pub report: RunReport,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the whole chain against the loaded table:
/// `Loaded → (Deduplicated) → (MeanFilled) → Projected → (Charted)`.
///
/// The result depends only on `loaded` and `options`, so re-running after any
/// control change is always safe.
pub fn run(loaded: &Table, options: &PipelineOptions) -> Result<PipelineRun, SelectionError> {
    let mut report = RunReport {
        rows_loaded: loaded.len(),
        ..RunReport::default()
    };
    let mut stages = vec![StageSnapshot::of(Stage::Loaded, loaded)];

    let mut table = loaded.clone();

    if options.remove_duplicates {
        table = clean::drop_duplicates(&table);
        report.duplicates_removed = loaded.len() - table.len();
        stages.push(StageSnapshot::of(Stage::Deduplicated, &table));
    }

    if options.fill_missing_mean {
        let before = table.null_count();
        table = clean::fill_missing_mean(&table);
        report.cells_filled = before - table.null_count();
        stages.push(StageSnapshot::of(Stage::MeanFilled, &table));
    }

    let names = options.columns.names(&table);
    table = select::project(&table, &names)?;
    report.columns_kept = table.width();
    stages.push(StageSnapshot::of(Stage::Projected, &table));

    let chart = if options.show_chart {
        chart::summarize(&table)
    } else {
        None
    };

    log::debug!("Pipeline run: {report:?}");
    Ok(PipelineRun {
        table,
        chart,
        stages,
        report,
    })
}

/// Convert the result of a run into the chosen download format.
pub fn export(
    run: &PipelineRun,
    options: &PipelineOptions,
    source_name: &str,
) -> Result<Download, ExportError> {
    export::export(&run.table, options.export_format, source_name)
}
