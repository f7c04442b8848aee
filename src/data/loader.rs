use std::collections::HashSet;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::model::{CellValue, Column, ColumnKind, Table};
use crate::error::LoadError;

/// Field values read as missing, matching the usual dataframe defaults.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None",
    "n/a", "nan", "null",
];

/// Largest magnitude at which every integer is exactly representable in `f64`.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Spreadsheet extensions handed to the workbook reader.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Lower-cased suffix after the last `.`, or an empty string.
pub fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Load an uploaded file into a [`Table`]. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – comma-separated text, first line is the header
/// * `.xlsx` (also `.xlsm`, `.xls`, `.ods`) – first worksheet, first row is the header
pub fn load(file_name: &str, bytes: &[u8]) -> Result<Table, LoadError> {
    let ext = extension_of(file_name);
    let table = match ext.as_str() {
        "csv" => load_csv(bytes)?,
        e if SPREADSHEET_EXTENSIONS.contains(&e) => load_spreadsheet(bytes)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };
    log::info!(
        "Loaded '{file_name}': {} rows, columns {:?}",
        table.len(),
        table.column_names()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(LoadError::MissingHeader);
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        rows.push(fit_row(fields, headers.len(), row_no + 1, |f: &String| {
            is_na_marker(f)
        })?);
    }

    let columns = transpose(headers.len(), rows)
        .into_iter()
        .map(type_csv_column)
        .collect();
    build_table(headers, columns)
}

fn is_na_marker(field: &str) -> bool {
    NA_MARKERS.contains(&field)
}

/// Type a whole CSV column. A column whose fields do not agree on one kind
/// keeps every field as the text it was read from.
fn type_csv_column(fields: Vec<String>) -> Vec<CellValue> {
    let guessed: Vec<CellValue> = fields.iter().map(|f| guess_cell_type(f)).collect();
    if ColumnKind::infer(&guessed) != ColumnKind::Mixed {
        return guessed;
    }
    fields
        .into_iter()
        .map(|f| {
            if is_na_marker(&f) {
                CellValue::Null
            } else {
                CellValue::Text(f)
            }
        })
        .collect()
}

/// Type a CSV field: missing, integer, float, boolean, or text.
fn guess_cell_type(s: &str) -> CellValue {
    if is_na_marker(s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return if f.is_nan() {
            CellValue::Null
        } else {
            CellValue::Float(f)
        };
    }
    if s.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first worksheet; its first row is the header.
fn load_spreadsheet(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                other => other.to_string(),
            })
            .collect(),
        None => return Err(LoadError::MissingHeader),
    };

    let mut body = Vec::new();
    for (row_no, row) in rows.enumerate() {
        let cells: Vec<CellValue> = row.iter().map(spreadsheet_cell).collect();
        body.push(fit_row(cells, headers.len(), row_no + 1, CellValue::is_null)?);
    }

    let width = headers.len();
    build_table(headers, transpose(width, body))
}

fn spreadsheet_cell(value: &Data) -> CellValue {
    match value {
        Data::Int(i) => CellValue::Integer(*i),
        // Workbooks store every number as a double; whole values read back as integers.
        Data::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT_INT => {
            CellValue::Integer(*f as i64)
        }
        Data::Float(f) if f.is_nan() => CellValue::Null,
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => CellValue::DateTime(datetime.to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::DateTime(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// -- Shared helpers --

/// Pad a short row with missing cells; reject a row wider than the header.
fn fit_row<T: Clone + Default>(
    mut cells: Vec<T>,
    width: usize,
    row: usize,
    is_missing: impl Fn(&T) -> bool,
) -> Result<Vec<T>, LoadError> {
    if cells.len() > width {
        // Trailing empty fields are tolerated.
        while cells.len() > width && cells.last().is_some_and(&is_missing) {
            cells.pop();
        }
        if cells.len() > width {
            return Err(LoadError::RaggedRow {
                row,
                expected: width,
                actual: cells.len(),
            });
        }
    }
    cells.resize(width, T::default());
    Ok(cells)
}

/// Name blank headers `Unnamed: i` and suffix repeated ones with `.1`, `.2`, …
fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            };
            let mut candidate = base.clone();
            let mut n = 1;
            while seen.contains(&candidate) {
                candidate = format!("{base}.{n}");
                n += 1;
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

/// Turn row-major cells into `width` columns.
fn transpose<T>(width: usize, rows: Vec<Vec<T>>) -> Vec<Vec<T>> {
    let mut columns: Vec<Vec<T>> = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();
    for row in rows {
        for (col, value) in columns.iter_mut().zip(row) {
            col.push(value);
        }
    }
    columns
}

/// Name and tag the loaded columns.
fn build_table(headers: Vec<String>, columns: Vec<Vec<CellValue>>) -> Result<Table, LoadError> {
    let columns = unique_headers(headers)
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Ok(Table::from_columns(columns)?)
}
