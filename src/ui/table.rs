use eframe::egui::{RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use tidy_panda::{CellValue, Table};

use crate::color::kind_color;

const ROW_HEIGHT: f32 = 18.0;

/// Render a small read-only grid of `table`, headers tagged with column kinds.
pub fn preview_table(ui: &mut Ui, id_salt: impl std::hash::Hash, table: &Table) {
    if table.width() == 0 {
        ui.weak(format!("No columns selected ({} rows)", table.len()));
        return;
    }

    ui.push_id(id_salt, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .columns(TableColumn::auto().at_least(60.0), table.width())
            .header(ROW_HEIGHT * 2.0, |mut header| {
                for column in table.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&column.name);
                        ui.label(
                            RichText::new(column.kind.as_str())
                                .small()
                                .color(kind_color(column.kind)),
                        );
                    });
                }
            })
            .body(|mut body| {
                for row in 0..table.len() {
                    body.row(ROW_HEIGHT, |mut cells| {
                        for value in table.row(row) {
                            cells.col(|ui: &mut Ui| match value {
                                CellValue::Null => {
                                    ui.weak(value.to_string());
                                }
                                _ => {
                                    ui.label(value.to_string());
                                }
                            });
                        }
                    });
                }
            });
    });
}
