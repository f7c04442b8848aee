use super::model::Table;

/// At most this many numeric columns are charted.
pub const MAX_CHART_COLUMNS: usize = 2;

/// One bar series: `(row index, value)` pairs of a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub column: String,
    pub points: Vec<(usize, f64)>,
}

/// Bar-chart-ready data for the first numeric columns of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub series: Vec<ChartSeries>,
    /// Number of row slots along the x axis.
    pub rows: usize,
}

/// Summarize the first [`MAX_CHART_COLUMNS`] numeric columns, in table order.
/// Missing cells are skipped. Returns `None` when no column is numeric.
pub fn summarize(table: &Table) -> Option<ChartData> {
    let series: Vec<ChartSeries> = table
        .columns()
        .iter()
        .filter(|c| c.kind.is_numeric())
        .take(MAX_CHART_COLUMNS)
        .map(|c| ChartSeries {
            column: c.name.clone(),
            points: c
                .values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.as_f64().map(|y| (i, y)))
                .collect(),
        })
        .collect();

    if series.is_empty() {
        return None;
    }
    Some(ChartData {
        series,
        rows: table.len(),
    })
}
