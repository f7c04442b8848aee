use std::collections::HashSet;

use super::model::{CellValue, Column, ColumnKind, Table};

// ---------------------------------------------------------------------------
// Deduplication
// ---------------------------------------------------------------------------

/// Drop rows identical to an earlier row, keeping first occurrences in order.
/// Missing cells compare equal to each other.
pub fn drop_duplicates(table: &Table) -> Table {
    let mut seen = HashSet::with_capacity(table.len());
    let keep: Vec<usize> = (0..table.len())
        .filter(|&i| seen.insert(table.row(i)))
        .collect();
    if keep.len() == table.len() {
        return table.clone();
    }
    table.take_rows(&keep)
}

// ---------------------------------------------------------------------------
// Mean-fill
// ---------------------------------------------------------------------------

/// Replace missing cells of every numeric column with that column's mean.
///
/// * Non-numeric columns are returned unchanged.
/// * A column whose cells are all missing has no mean and stays missing.
/// * An integer column that receives a fill becomes a float column.
pub fn fill_missing_mean(table: &Table) -> Table {
    table.map_columns(fill_column)
}

/// Arithmetic mean of the non-missing numeric cells, if there are any.
pub fn column_mean(column: &Column) -> Option<f64> {
    let (sum, count) = column
        .values
        .iter()
        .filter_map(CellValue::as_f64)
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

fn fill_column(column: &Column) -> Column {
    if !column.kind.is_numeric() || column.null_count() == 0 {
        return column.clone();
    }
    let Some(mean) = column_mean(column) else {
        return column.clone();
    };
    let values = column
        .values
        .iter()
        .map(|v| match v {
            CellValue::Null => CellValue::Float(mean),
            CellValue::Integer(i) => CellValue::Float(*i as f64),
            other => other.clone(),
        })
        .collect();
    Column {
        name: column.name.clone(),
        kind: ColumnKind::Float,
        values,
    }
}
