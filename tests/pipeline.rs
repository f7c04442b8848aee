use tidy_panda::data::export::export;
use tidy_panda::data::loader::load;
use tidy_panda::data::select::ColumnSelection;
use tidy_panda::pipeline::{self, PipelineOptions};
use tidy_panda::{CellValue, Column, ColumnKind, ExportFormat, Table};

const SALES_CSV: &[u8] = b"\
id,value,label,ratio
1,10,alpha,0.5
1,10,alpha,0.5
2,,beta,
3,7,\"gamma, delta\",1.25
";

/// One column of every kind a CSV upload can produce.
const ALL_KINDS_CSV: &[u8] = b"\
int,float,flag,code,mixed,empty,name
1,0.5,True,007,+5,,alpha
2,,False,A12,x,,beta
3,1.25,True,1e3,true,,gamma
";

fn values(table: &Table, column: &str) -> Vec<CellValue> {
    table.column(column).unwrap().values.clone()
}

fn fields(table: &Table, column: &str) -> Vec<String> {
    table
        .column(column)
        .unwrap()
        .values
        .iter()
        .map(CellValue::to_field)
        .collect()
}

fn convert(table: &Table, format: ExportFormat) -> Table {
    let download = export(table, format, "upload.csv").unwrap();
    load(&download.file_name, &download.bytes).unwrap()
}

/// Same names, kinds and rendered cells.
fn assert_same_content(back: &Table, original: &Table) {
    assert_eq!(back.column_names(), original.column_names());
    assert_eq!(back.len(), original.len());
    for name in original.column_names() {
        assert_eq!(
            back.column(&name).unwrap().kind,
            original.column(&name).unwrap().kind,
            "kind of {name}"
        );
        assert_eq!(fields(back, &name), fields(original, &name), "cells of {name}");
    }
}

#[test]
fn cleaning_example_from_upload_to_download() {
    let loaded = load("sales.csv", SALES_CSV).unwrap();
    let options = PipelineOptions {
        remove_duplicates: true,
        fill_missing_mean: true,
        columns: ColumnSelection::Columns(vec!["id".into(), "value".into()]),
        ..PipelineOptions::default()
    };

    let run = pipeline::run(&loaded, &options).unwrap();
    assert_eq!(run.table.column_names(), ["id", "value"]);
    assert_eq!(
        values(&run.table, "id"),
        [CellValue::Integer(1), CellValue::Integer(2), CellValue::Integer(3)]
    );
    // mean of 10 and 7
    assert_eq!(
        values(&run.table, "value"),
        [CellValue::Float(10.0), CellValue::Float(8.5), CellValue::Float(7.0)]
    );

    let download = pipeline::export(&run, &options, "sales.csv").unwrap();
    assert_eq!(download.file_name, "sales.csv");
    assert_eq!(
        String::from_utf8(download.bytes).unwrap(),
        "id,value\n1,10\n2,8.5\n3,7\n"
    );
}

#[test]
fn csv_round_trip_keeps_names_and_values() {
    let loaded = load("sales.csv", SALES_CSV).unwrap();
    let run = pipeline::run(&loaded, &PipelineOptions::default()).unwrap();
    let download = pipeline::export(&run, &PipelineOptions::default(), "sales.csv").unwrap();

    let reloaded = load(&download.file_name, &download.bytes).unwrap();
    assert_eq!(reloaded, loaded);
}

#[test]
fn spreadsheet_round_trip_keeps_names_and_values() {
    let loaded = load("sales.csv", SALES_CSV).unwrap();
    let options = PipelineOptions {
        export_format: ExportFormat::Excel,
        ..PipelineOptions::default()
    };
    let run = pipeline::run(&loaded, &options).unwrap();
    let download = pipeline::export(&run, &options, "sales.csv").unwrap();
    assert_eq!(download.file_name, "sales.xlsx");

    let reloaded = load(&download.file_name, &download.bytes).unwrap();
    assert_eq!(reloaded.column_names(), loaded.column_names());
    assert_eq!(reloaded.len(), loaded.len());
    for name in loaded.column_names() {
        let original = loaded.column(&name).unwrap();
        let back = reloaded.column(&name).unwrap();
        for (a, b) in original.values.iter().zip(&back.values) {
            assert_eq!(a.as_f64(), b.as_f64(), "column {name}");
            assert_eq!(a.to_field(), b.to_field(), "column {name}");
        }
    }
    assert_eq!(reloaded.column("ratio").unwrap().kind, ColumnKind::Float);
}

#[test]
fn uppercase_csv_exported_as_excel() {
    let loaded = load("data.CSV", b"id,value\n1,2\n").unwrap();
    let options = PipelineOptions {
        export_format: ExportFormat::Excel,
        ..PipelineOptions::default()
    };
    let run = pipeline::run(&loaded, &options).unwrap();
    let download = pipeline::export(&run, &options, "data.CSV").unwrap();
    assert_eq!(download.file_name, "data.xlsx");
    assert_eq!(
        download.mime_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
}

#[test]
fn projection_keeps_rows_in_order() {
    let loaded = load("sales.csv", SALES_CSV).unwrap();
    let options = PipelineOptions {
        columns: ColumnSelection::Columns(vec!["label".into()]),
        ..PipelineOptions::default()
    };
    let run = pipeline::run(&loaded, &options).unwrap();
    assert_eq!(run.table.width(), 1);
    assert_eq!(run.table.len(), loaded.len());
    assert_eq!(values(&run.table, "label"), values(&loaded, "label"));
}

#[test]
fn mixed_columns_export_unchanged() {
    let source = "code,label\n007,x\nA12,y\n1e3,z\n+5,w\n";
    let loaded = load("codes.csv", source.as_bytes()).unwrap();
    let run = pipeline::run(&loaded, &PipelineOptions::default()).unwrap();
    let download = pipeline::export(&run, &PipelineOptions::default(), "codes.csv").unwrap();
    assert_eq!(String::from_utf8(download.bytes).unwrap(), source);

    let options = PipelineOptions {
        export_format: ExportFormat::Excel,
        ..PipelineOptions::default()
    };
    let download = pipeline::export(&run, &options, "codes.csv").unwrap();
    let reloaded = load(&download.file_name, &download.bytes).unwrap();
    assert_eq!(
        values(&reloaded, "code"),
        ["007", "A12", "1e3", "+5"].map(|s| CellValue::Text(s.into()))
    );
}

#[test]
fn every_column_kind_survives_csv() {
    let loaded = load("kinds.csv", ALL_KINDS_CSV).unwrap();
    let kinds: Vec<ColumnKind> = loaded.columns().iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        [
            ColumnKind::Integer,
            ColumnKind::Float,
            ColumnKind::Bool,
            ColumnKind::Text,
            ColumnKind::Text,
            ColumnKind::Empty,
            ColumnKind::Text,
        ]
    );
    assert_eq!(fields(&loaded, "mixed"), ["+5", "x", "true"]);

    let back = convert(&loaded, ExportFormat::Csv);
    assert_eq!(back, loaded);
}

#[test]
fn every_column_kind_survives_excel() {
    let loaded = load("kinds.csv", ALL_KINDS_CSV).unwrap();
    let back = convert(&loaded, ExportFormat::Excel);
    assert_same_content(&back, &loaded);
}

#[test]
fn dates_and_mixed_cells_survive_excel() {
    let table = Table::from_columns(vec![
        Column::new(
            "when",
            vec![
                CellValue::DateTime("2024-03-15 08:30:00".into()),
                CellValue::Null,
                CellValue::DateTime("1999-12-31 23:59:59".into()),
            ],
        ),
        Column::new(
            "mixed",
            vec![
                CellValue::Integer(7),
                CellValue::Text("seven".into()),
                CellValue::Bool(false),
            ],
        ),
    ])
    .unwrap();
    assert_eq!(table.column("mixed").unwrap().kind, ColumnKind::Mixed);

    let back = convert(&table, ExportFormat::Excel);
    assert_same_content(&back, &table);
    assert_eq!(values(&back, "mixed"), values(&table, "mixed"));
}

#[test]
fn dates_keep_their_text_in_csv() {
    let table = Table::from_columns(vec![Column::new(
        "when",
        vec![CellValue::DateTime("2024-03-15 08:30:00".into())],
    )])
    .unwrap();
    let back = convert(&table, ExportFormat::Csv);
    assert_eq!(fields(&back, "when"), ["2024-03-15 08:30:00"]);
}
