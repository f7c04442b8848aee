//! Single-sheet Office Open XML workbook writer.
//!
//! Writes the smallest package spreadsheet readers accept: content types,
//! package and workbook relationships, a workbook with one `Sheet1`, and the
//! worksheet itself, plus a stylesheet carrying one date format. Text is
//! stored as inline strings so no shared-string table is needed. Dates are
//! stored as serial day numbers in that date style.

use std::io::{Cursor, Write};

use chrono::{NaiveDate, NaiveDateTime};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::model::{CellValue, Table};
use crate::error::ExportError;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const CONTENT_TYPES: &[(&str, &str)] = &[
    (
        "/xl/workbook.xml",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
    ),
    (
        "/xl/worksheets/sheet1.xml",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
    ),
    (
        "/xl/styles.xml",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml",
    ),
];

/// Custom number format id for date cells; ids below 164 are built in.
const DATE_FORMAT_ID: &str = "164";
const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
/// Index of the date entry in `cellXfs`.
const DATE_STYLE: &str = "1";

pub const SHEET_NAME: &str = "Sheet1";

/// Serialize `table` as an `.xlsx` package: header row, then one row per record.
pub fn write_workbook(table: &Table) -> Result<Vec<u8>, ExportError> {
    let sheet = worksheet_xml(table)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, part) in [
        ("[Content_Types].xml", content_types_xml()?),
        ("_rels/.rels", package_rels_xml()?),
        ("xl/workbook.xml", workbook_xml()?),
        ("xl/_rels/workbook.xml.rels", workbook_rels_xml()?),
        ("xl/styles.xml", styles_xml()?),
        ("xl/worksheets/sheet1.xml", sheet),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(&part)?;
    }

    Ok(zip.finish()?.into_inner())
}

// ---------------------------------------------------------------------------
// Package parts
// ---------------------------------------------------------------------------

struct XmlPart {
    writer: Writer<Vec<u8>>,
}

impl XmlPart {
    fn new() -> Result<Self, ExportError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(XmlPart { writer })
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), ExportError> {
        let mut start = BytesStart::new(name);
        start.extend_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), ExportError> {
        let mut start = BytesStart::new(name);
        start.extend_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), ExportError> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), ExportError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn content_types_xml() -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlPart::new()?;
    xml.open("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    xml.empty(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    xml.empty(
        "Default",
        &[("Extension", "xml"), ("ContentType", "application/xml")],
    )?;
    for &(part, content_type) in CONTENT_TYPES {
        xml.empty(
            "Override",
            &[("PartName", part), ("ContentType", content_type)],
        )?;
    }
    xml.close("Types")?;
    Ok(xml.finish())
}

fn workbook_rels_xml() -> Result<Vec<u8>, ExportError> {
    let worksheet = format!("{NS_REL}/worksheet");
    let styles = format!("{NS_REL}/styles");
    relationships_xml(&[
        (worksheet.as_str(), "worksheets/sheet1.xml"),
        (styles.as_str(), "styles.xml"),
    ])
}

fn package_rels_xml() -> Result<Vec<u8>, ExportError> {
    let office_document = format!("{NS_REL}/officeDocument");
    relationships_xml(&[(office_document.as_str(), "xl/workbook.xml")])
}

/// One `Relationship` per `(type, target)`, numbered `rId1`, `rId2`, …
fn relationships_xml(links: &[(&str, &str)]) -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlPart::new()?;
    xml.open("Relationships", &[("xmlns", NS_PKG_REL)])?;
    for (i, &(kind, target)) in links.iter().enumerate() {
        let id = format!("rId{}", i + 1);
        xml.empty(
            "Relationship",
            &[("Id", id.as_str()), ("Type", kind), ("Target", target)],
        )?;
    }
    xml.close("Relationships")?;
    Ok(xml.finish())
}

/// Minimal stylesheet: the default cell format and one date format.
fn styles_xml() -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlPart::new()?;
    xml.open("styleSheet", &[("xmlns", NS_MAIN)])?;

    xml.open("numFmts", &[("count", "1")])?;
    xml.empty(
        "numFmt",
        &[("numFmtId", DATE_FORMAT_ID), ("formatCode", DATE_FORMAT)],
    )?;
    xml.close("numFmts")?;

    xml.open("fonts", &[("count", "1")])?;
    xml.open("font", &[])?;
    xml.empty("sz", &[("val", "11")])?;
    xml.empty("name", &[("val", "Calibri")])?;
    xml.close("font")?;
    xml.close("fonts")?;

    xml.open("fills", &[("count", "2")])?;
    for pattern in ["none", "gray125"] {
        xml.open("fill", &[])?;
        xml.empty("patternFill", &[("patternType", pattern)])?;
        xml.close("fill")?;
    }
    xml.close("fills")?;

    xml.open("borders", &[("count", "1")])?;
    xml.empty("border", &[])?;
    xml.close("borders")?;

    let base = [("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0")];
    xml.open("cellStyleXfs", &[("count", "1")])?;
    xml.empty("xf", &base)?;
    xml.close("cellStyleXfs")?;

    xml.open("cellXfs", &[("count", "2")])?;
    xml.empty(
        "xf",
        &[
            ("numFmtId", "0"),
            ("fontId", "0"),
            ("fillId", "0"),
            ("borderId", "0"),
            ("xfId", "0"),
        ],
    )?;
    xml.empty(
        "xf",
        &[
            ("numFmtId", DATE_FORMAT_ID),
            ("fontId", "0"),
            ("fillId", "0"),
            ("borderId", "0"),
            ("xfId", "0"),
            ("applyNumberFormat", "1"),
        ],
    )?;
    xml.close("cellXfs")?;

    xml.close("styleSheet")?;
    Ok(xml.finish())
}

fn workbook_xml() -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlPart::new()?;
    xml.open("workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_REL)])?;
    xml.open("sheets", &[])?;
    xml.empty(
        "sheet",
        &[("name", SHEET_NAME), ("sheetId", "1"), ("r:id", "rId1")],
    )?;
    xml.close("sheets")?;
    xml.close("workbook")?;
    Ok(xml.finish())
}

fn worksheet_xml(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut xml = XmlPart::new()?;
    xml.open("worksheet", &[("xmlns", NS_MAIN)])?;
    xml.open("sheetData", &[])?;

    let row_ref = 1.to_string();
    xml.open("row", &[("r", row_ref.as_str())])?;
    for (col, column) in table.columns().iter().enumerate() {
        inline_string(&mut xml, &cell_position(0, col), &column.name)?;
    }
    xml.close("row")?;

    for row in 0..table.len() {
        let row_ref = (row + 2).to_string();
        xml.open("row", &[("r", row_ref.as_str())])?;
        for (col, value) in table.row(row).into_iter().enumerate() {
            let position = cell_position(row + 1, col);
            match value {
                CellValue::Null => {}
                CellValue::Integer(i) => number(&mut xml, &position, &i.to_string())?,
                CellValue::Float(f) if f.is_finite() => {
                    number(&mut xml, &position, &f.to_string())?
                }
                CellValue::Bool(b) => {
                    xml.open("c", &[("r", position.as_str()), ("t", "b")])?;
                    xml.open("v", &[])?;
                    xml.text(if *b { "1" } else { "0" })?;
                    xml.close("v")?;
                    xml.close("c")?;
                }
                CellValue::DateTime(text) => match excel_serial(text) {
                    Some(serial) => {
                        xml.open("c", &[("r", position.as_str()), ("s", DATE_STYLE)])?;
                        xml.open("v", &[])?;
                        xml.text(&serial.to_string())?;
                        xml.close("v")?;
                        xml.close("c")?;
                    }
                    None => inline_string(&mut xml, &position, text)?,
                },
                other => inline_string(&mut xml, &position, &other.to_field())?,
            }
        }
        xml.close("row")?;
    }

    xml.close("sheetData")?;
    xml.close("worksheet")?;
    Ok(xml.finish())
}

fn number(xml: &mut XmlPart, position: &str, literal: &str) -> Result<(), ExportError> {
    xml.open("c", &[("r", position)])?;
    xml.open("v", &[])?;
    xml.text(literal)?;
    xml.close("v")?;
    xml.close("c")
}

fn inline_string(xml: &mut XmlPart, position: &str, text: &str) -> Result<(), ExportError> {
    if text.chars().any(is_illegal_xml_char) {
        return Err(ExportError::IllegalCharacter {
            position: position.to_string(),
        });
    }
    xml.open("c", &[("r", position), ("t", "inlineStr")])?;
    xml.open("is", &[])?;
    xml.open("t", &[("xml:space", "preserve")])?;
    xml.text(text)?;
    xml.close("t")?;
    xml.close("is")?;
    xml.close("c")
}

/// Day number of a date/time in the 1900 date system, counting the phantom
/// 1900-02-29. Dates before 1900-03-01 and unparseable text have none.
fn excel_serial(text: &str) -> Option<f64> {
    let datetime = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let first_real_day = NaiveDate::from_ymd_opt(1900, 3, 1)?.and_hms_opt(0, 0, 0)?;
    if datetime < first_real_day {
        return None;
    }
    let millis = (datetime - epoch).num_milliseconds();
    Some(millis as f64 / 86_400_000.0)
}

/// Control characters XML 1.0 cannot carry, even escaped.
fn is_illegal_xml_char(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

/// Convert 0-based row & column indices to an A1-style reference.
pub fn cell_position(row: usize, column: usize) -> String {
    let mut letters = String::new();
    let mut n = column + 1;
    while n > 0 {
        n -= 1;
        letters.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    format!("{letters}{}", row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    #[test]
    fn cell_positions_use_a1_notation() {
        assert_eq!(cell_position(0, 0), "A1");
        assert_eq!(cell_position(9, 25), "Z10");
        assert_eq!(cell_position(0, 26), "AA1");
        assert_eq!(cell_position(1, 701), "ZZ2");
        assert_eq!(cell_position(1, 702), "AAA2");
    }

    #[test]
    fn workbook_is_a_zip_package() {
        let table = Table::from_columns(vec![Column::new("a", vec![CellValue::Integer(1)])]).unwrap();
        let bytes = write_workbook(&table).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn worksheet_escapes_text_and_skips_missing_cells() {
        let table = Table::from_columns(vec![
            Column::new("name", vec![CellValue::Text("a<b & c".into()), CellValue::Null]),
            Column::new("n", vec![CellValue::Float(2.5), CellValue::Bool(true)]),
        ])
        .unwrap();
        let xml = String::from_utf8(worksheet_xml(&table).unwrap()).unwrap();
        assert!(xml.contains("a&lt;b &amp; c"));
        assert!(xml.contains(r#"<c r="B2"><v>2.5</v></c>"#));
        assert!(xml.contains(r#"<c r="B3" t="b"><v>1</v></c>"#));
        assert!(!xml.contains(r#"r="A3""#));
    }

    #[test]
    fn dates_are_serial_numbers_in_date_style() {
        assert_eq!(excel_serial("1900-03-01"), Some(61.0));
        assert_eq!(excel_serial("2024-03-15 12:00:00"), Some(45366.5));
        assert_eq!(excel_serial("2024-03-15T12:00:00"), Some(45366.5));
        assert_eq!(excel_serial("1899-06-01"), None);
        assert_eq!(excel_serial("PT5M"), None);

        let table = Table::from_columns(vec![Column::new(
            "when",
            vec![
                CellValue::DateTime("2024-03-15 12:00:00".into()),
                CellValue::DateTime("PT5M".into()),
            ],
        )])
        .unwrap();
        let xml = String::from_utf8(worksheet_xml(&table).unwrap()).unwrap();
        assert!(xml.contains(r#"<c r="A2" s="1"><v>45366.5</v></c>"#));
        assert!(xml.contains("PT5M"));

        let styles = String::from_utf8(styles_xml().unwrap()).unwrap();
        assert!(styles.contains(r#"numFmtId="164""#));
    }

    #[test]
    fn control_characters_are_rejected() {
        let table =
            Table::from_columns(vec![Column::new("x", vec![CellValue::Text("bell\u{7}".into())])])
                .unwrap();
        let err = write_workbook(&table).unwrap_err();
        assert!(matches!(err, ExportError::IllegalCharacter { position } if position == "A2"));
    }
}
