use std::collections::HashSet;

use super::model::Table;
use crate::error::SelectionError;

// ---------------------------------------------------------------------------
// Column projection
// ---------------------------------------------------------------------------

/// Restrict `table` to exactly `names`, in the order given.
///
/// Row count and row order are preserved. An empty selection yields a table
/// with rows but no columns. Unknown or repeated names are rejected rather
/// than silently dropped.
pub fn project(table: &Table, names: &[String]) -> Result<Table, SelectionError> {
    let mut seen = HashSet::with_capacity(names.len());
    let positions = names
        .iter()
        .map(|name| {
            if !seen.insert(name.as_str()) {
                return Err(SelectionError::DuplicateColumn(name.clone()));
            }
            table
                .columns()
                .iter()
                .position(|c| &c.name == name)
                .ok_or_else(|| SelectionError::UnknownColumn(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(table.pick_columns(&positions))
}

// ---------------------------------------------------------------------------
// Selection state kept by the UI
// ---------------------------------------------------------------------------

/// The user's ordered column choice. `All` follows whatever columns the
/// table has; `Columns` is an explicit list that must be re-validated when
/// the table's column set changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnSelection {
    #[default]
    All,
    Columns(Vec<String>),
}

impl ColumnSelection {
    /// Resolve to concrete column names for `table`.
    pub fn names(&self, table: &Table) -> Vec<String> {
        match self {
            ColumnSelection::All => table.column_names(),
            ColumnSelection::Columns(names) => names.clone(),
        }
    }

    /// Drop names `table` no longer has. Returns the names removed.
    pub fn revalidate(&mut self, table: &Table) -> Vec<String> {
        let ColumnSelection::Columns(names) = self else {
            return Vec::new();
        };
        let (kept, dropped): (Vec<String>, Vec<String>) =
            names.drain(..).partition(|n| table.has_column(n));
        *names = kept;
        dropped
    }

    pub fn contains(&self, table: &Table, name: &str) -> bool {
        match self {
            ColumnSelection::All => table.has_column(name),
            ColumnSelection::Columns(names) => names.iter().any(|n| n == name),
        }
    }

    /// Add or remove one column. Added columns keep the table's column order.
    pub fn toggle(&mut self, table: &Table, name: &str) {
        let mut names = self.names(table);
        if let Some(pos) = names.iter().position(|n| n == name) {
            names.remove(pos);
        } else if table.has_column(name) {
            names.push(name.to_string());
            let order = table.column_names();
            names.sort_by_key(|n| order.iter().position(|o| o == n));
        }
        *self = ColumnSelection::Columns(names);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn sample() -> Table {
        let col = |name: &str, base: i64| {
            Column::new(
                name,
                (0..4).map(|i| CellValue::Integer(base + i)).collect(),
            )
        };
        Table::from_columns(vec![col("id", 0), col("a", 10), col("b", 20)]).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selecting_one_column_keeps_every_row() {
        let table = sample();
        let out = project(&table, &names(&["id"])).unwrap();
        assert_eq!(out.width(), 1);
        assert_eq!(out.len(), 4);
        assert_eq!(out.column("id"), table.column("id"));
    }

    #[test]
    fn projection_follows_requested_order() {
        let out = project(&sample(), &names(&["b", "id"])).unwrap();
        assert_eq!(out.column_names(), ["b", "id"]);
    }

    #[test]
    fn unknown_and_repeated_columns_are_errors() {
        let table = sample();
        assert_eq!(
            project(&table, &names(&["zzz"])),
            Err(SelectionError::UnknownColumn("zzz".into()))
        );
        assert_eq!(
            project(&table, &names(&["a", "a"])),
            Err(SelectionError::DuplicateColumn("a".into()))
        );
    }

    #[test]
    fn empty_selection_keeps_row_count() {
        let out = project(&sample(), &[]).unwrap();
        assert_eq!(out.width(), 0);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn revalidate_drops_vanished_columns() {
        let mut selection = ColumnSelection::Columns(names(&["a", "gone", "id"]));
        let dropped = selection.revalidate(&sample());
        assert_eq!(dropped, ["gone"]);
        assert_eq!(selection, ColumnSelection::Columns(names(&["a", "id"])));
    }

    #[test]
    fn toggle_keeps_table_order() {
        let table = sample();
        let mut selection = ColumnSelection::All;
        selection.toggle(&table, "a");
        assert_eq!(selection, ColumnSelection::Columns(names(&["id", "b"])));
        selection.toggle(&table, "a");
        assert_eq!(selection.names(&table), ["id", "a", "b"]);
    }
}
