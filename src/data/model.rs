use std::collections::HashSet;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a table column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes a CSV or a spreadsheet
/// can carry. Rows are hashed and compared when deduplicating, so
/// `CellValue` must be `Eq + Hash`.
#[derive(Debug, Clone, Default)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// Spreadsheet date/time rendered as ISO-8601 text.
    DateTime(String),
    #[default]
    Null,
}

// -- Manual Eq/Ord so rows can live in hash sets and sort deterministically --

/// `-0.0` is the same value as `0.0` for equality, ordering and hashing.
fn float_key(f: f64) -> f64 {
    if f == 0.0 {
        0.0
    } else {
        f
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                DateTime(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => float_key(*a).total_cmp(&float_key(*b)),
            (Text(a), Text(b)) | (DateTime(a), DateTime(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) | CellValue::DateTime(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => float_key(*f).to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

/// Preview rendering. Export uses [`CellValue::to_field`] instead.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Text(s) | CellValue::DateTime(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for mean computation and charting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Lossless text form written to CSV; missing cells become an empty field.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => v.to_string(),
            CellValue::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
            CellValue::Text(s) | CellValue::DateTime(s) => s.clone(),
            CellValue::Null => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – per-column type tag assigned at load time
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
    DateTime,
    /// Every cell is missing.
    Empty,
    /// Heterogeneous non-numeric content (e.g. numbers mixed with text).
    Mixed,
}

impl ColumnKind {
    /// Infer the tag from the non-missing cells of a column.
    pub fn infer(values: &[CellValue]) -> Self {
        let mut kind: Option<ColumnKind> = None;
        for value in values {
            let cell_kind = match value {
                CellValue::Null => continue,
                CellValue::Integer(_) => ColumnKind::Integer,
                CellValue::Float(_) => ColumnKind::Float,
                CellValue::Bool(_) => ColumnKind::Bool,
                CellValue::Text(_) => ColumnKind::Text,
                CellValue::DateTime(_) => ColumnKind::DateTime,
            };
            kind = Some(match kind {
                None => cell_kind,
                Some(k) if k == cell_kind => k,
                Some(k) if k.is_numeric() && cell_kind.is_numeric() => ColumnKind::Float,
                Some(_) => return ColumnKind::Mixed,
            });
        }
        kind.unwrap_or(ColumnKind::Empty)
    }

    /// Whether the column takes part in mean-fill and charting.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ColumnKind::Integer => "int",
            ColumnKind::Float => "float",
            ColumnKind::Bool => "bool",
            ColumnKind::Text => "text",
            ColumnKind::DateTime => "datetime",
            ColumnKind::Empty => "empty",
            ColumnKind::Mixed => "mixed",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Column – a named, typed sequence of cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    /// Build a column and tag it. Integer cells of a `Float` column are widened
    /// so that equal numbers compare equal.
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let kind = ColumnKind::infer(&values);
        let values = if kind == ColumnKind::Float {
            values
                .into_iter()
                .map(|v| match v {
                    CellValue::Integer(i) => CellValue::Float(i as f64),
                    other => other,
                })
                .collect()
        } else {
            values
        };
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An ordered set of equally long columns. The row count is kept explicitly
/// so a zero-column table still knows how many rows it has.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

/// Errors raised while assembling a [`Table`] from columns.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    #[error("column '{name}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

impl Table {
    /// Assemble a table; every column must have the same length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        let n_rows = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(TableError::LengthMismatch {
                name: bad.name.clone(),
                expected: n_rows,
                actual: bad.len(),
            });
        }
        Ok(Table { columns, n_rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Names of the columns tagged numeric, in table order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    /// Keep only the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Table {
            columns,
            n_rows: indices.len(),
        }
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        let indices: Vec<usize> = (0..n.min(self.n_rows)).collect();
        self.take_rows(&indices)
    }

    /// Replace the columns of the table, keeping its row count.
    pub(crate) fn map_columns(&self, f: impl FnMut(&Column) -> Column) -> Table {
        Table {
            columns: self.columns.iter().map(f).collect(),
            n_rows: self.n_rows,
        }
    }

    /// Keep the columns at `positions`, in that order.
    pub(crate) fn pick_columns(&self, positions: &[usize]) -> Table {
        Table {
            columns: positions.iter().map(|&i| self.columns[i].clone()).collect(),
            n_rows: self.n_rows,
        }
    }

    /// Total number of missing cells.
    pub fn null_count(&self) -> usize {
        self.columns.iter().map(Column::null_count).sum()
    }

    /// Number of distinct rows.
    pub fn distinct_rows(&self) -> usize {
        (0..self.n_rows)
            .map(|i| self.row(i))
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_numeric_kinds() {
        let ints = vec![CellValue::Integer(1), CellValue::Null, CellValue::Integer(3)];
        assert_eq!(ColumnKind::infer(&ints), ColumnKind::Integer);

        let mixed_numbers = vec![CellValue::Integer(1), CellValue::Float(2.5)];
        assert_eq!(ColumnKind::infer(&mixed_numbers), ColumnKind::Float);

        let mixed = vec![CellValue::Integer(1), CellValue::Text("a".into())];
        assert_eq!(ColumnKind::infer(&mixed), ColumnKind::Mixed);

        assert_eq!(ColumnKind::infer(&[CellValue::Null]), ColumnKind::Empty);
        assert!(!ColumnKind::Bool.is_numeric());
    }

    #[test]
    fn float_columns_widen_integers() {
        let col = Column::new("x", vec![CellValue::Integer(1), CellValue::Float(1.5)]);
        assert_eq!(col.kind, ColumnKind::Float);
        assert_eq!(col.values[0], CellValue::Float(1.0));
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Table::from_columns(vec![
            Column::new("a", vec![CellValue::Integer(1)]),
            Column::new("b", vec![]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            TableError::LengthMismatch {
                name: "b".into(),
                expected: 1,
                actual: 0
            }
        );
    }

    #[test]
    fn head_clamps_to_length() {
        let table =
            Table::from_columns(vec![Column::new("a", vec![CellValue::Integer(1)])]).unwrap();
        assert_eq!(table.head(5).len(), 1);
        assert_eq!(table.head(0).len(), 0);
    }

    #[test]
    fn csv_field_rendering() {
        assert_eq!(CellValue::Float(10.0).to_field(), "10");
        assert_eq!(CellValue::Float(2.5).to_field(), "2.5");
        assert_eq!(CellValue::Null.to_field(), "");
        assert_eq!(CellValue::Bool(true).to_field(), "True");
    }

    #[test]
    fn signed_zeros_are_one_value() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let hash = |v: &CellValue| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        let (pos, neg) = (CellValue::Float(0.0), CellValue::Float(-0.0));
        assert_eq!(pos, neg);
        assert_eq!(hash(&pos), hash(&neg));
        assert_ne!(CellValue::Float(1.0), CellValue::Integer(1));
    }
}
