use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use tidy_panda::data::loader::SPREADSHEET_EXTENSIONS;
use tidy_panda::data::select::ColumnSelection;
use tidy_panda::pipeline::{Stage, StageSnapshot, PREVIEW_ROWS};
use tidy_panda::ExportFormat;

use crate::state::{AppState, FileSession};
use crate::ui::{plot, table::preview_table};

const SUCCESS: Color32 = Color32::from_rgb(60, 170, 90);

fn success(ui: &mut Ui, text: impl Into<String>) {
    ui.label(RichText::new(text).color(SUCCESS));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.files.is_empty(), egui::Button::new("Close all"))
                .clicked()
            {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!("{} file(s) loaded", state.files.len()));
        let failed = state.files.iter().filter(|f| f.error.is_some()).count();
        if failed > 0 {
            ui.label(RichText::new(format!("{failed} with errors")).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central page: one card per uploaded file
// ---------------------------------------------------------------------------

/// Render the scrolling page of file cards.
pub fn file_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("File Converter and Cleaner");
    ui.label("Upload CSV or Excel files, clean data, and convert to different formats.");
    ui.separator();

    if state.files.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open or drop CSV / Excel files  (File → Open…)");
        });
        return;
    }

    let mut removed = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for session in &mut state.files {
                ui.push_id(session.id, |ui: &mut Ui| {
                    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
                        ui.set_width(ui.available_width());
                        if file_card(ui, session) {
                            removed = Some(session.id);
                        }
                    });
                });
                ui.add_space(8.0);
            }
        });

    if let Some(id) = removed {
        state.remove_file(id);
    }
}

fn stage_preview(ui: &mut Ui, snapshot: &StageSnapshot) {
    ui.label(
        RichText::new(format!("{} ({} rows)", snapshot.stage, snapshot.rows)).strong(),
    );
    preview_table(ui, snapshot.stage, &snapshot.preview);
}

/// Render one file's controls and previews. Returns `true` when the user
/// asked to remove the file.
fn file_card(ui: &mut Ui, session: &mut FileSession) -> bool {
    let mut remove = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.heading(&session.name);
        if ui.small_button("Remove").clicked() {
            remove = true;
        }
    });

    if let Some(err) = &session.error {
        ui.label(RichText::new(err.to_string()).color(Color32::RED));
    }

    let Some(loaded) = &session.loaded else {
        return remove;
    };

    // Snapshot the last run so controls can mutate the options below.
    let stages: Vec<StageSnapshot> = session
        .run
        .as_ref()
        .map(|r| r.stages.clone())
        .unwrap_or_default();
    let report = session.run.as_ref().map(|r| r.report).unwrap_or_default();
    let chart = session.run.as_ref().and_then(|r| r.chart.clone());
    let snapshot = |stage: Stage| stages.iter().find(|s| s.stage == stage);

    let mut changed = false;

    // ---- Preview ----
    match snapshot(Stage::Loaded) {
        Some(s) => stage_preview(ui, s),
        None => preview_table(ui, Stage::Loaded, &loaded.head(PREVIEW_ROWS)),
    }

    // ---- Remove duplicates ----
    changed |= ui
        .checkbox(&mut session.options.remove_duplicates, "Remove duplicates")
        .changed();
    if let Some(s) = snapshot(Stage::Deduplicated) {
        success(ui, format!("{} duplicate row(s) removed", report.duplicates_removed));
        stage_preview(ui, s);
    }

    // ---- Fill missing values ----
    changed |= ui
        .checkbox(
            &mut session.options.fill_missing_mean,
            "Fill missing values with mean",
        )
        .changed();
    if let Some(s) = snapshot(Stage::MeanFilled) {
        success(ui, format!("{} missing value(s) filled with mean", report.cells_filled));
        stage_preview(ui, s);
    }

    // ---- Column selection ----
    let all_columns = loaded.column_names();
    let n_selected = session.options.columns.names(loaded).len();
    egui::CollapsingHeader::new(
        RichText::new(format!("Select columns  ({n_selected}/{})", all_columns.len())).strong(),
    )
    .id_salt("select_columns")
    .default_open(false)
    .show(ui, |ui: &mut Ui| {
        ui.horizontal(|ui: &mut Ui| {
            if ui.small_button("All").clicked() {
                session.options.columns = ColumnSelection::All;
                changed = true;
            }
            if ui.small_button("None").clicked() {
                session.options.columns = ColumnSelection::Columns(Vec::new());
                changed = true;
            }
        });
        for col in &all_columns {
            let mut checked = session.options.columns.contains(loaded, col);
            if ui.checkbox(&mut checked, col.as_str()).changed() {
                session.options.columns.toggle(loaded, col);
                changed = true;
            }
        }
    });
    if let Some(s) = snapshot(Stage::Projected) {
        stage_preview(ui, s);
    }

    // ---- Chart ----
    changed |= ui
        .checkbox(&mut session.options.show_chart, "Show chart")
        .changed();
    if session.options.show_chart {
        match &chart {
            Some(chart) => plot::bar_chart(ui, session.id, chart),
            None => {
                ui.weak("No numeric columns to chart.");
            }
        }
    }

    // ---- Conversion ----
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Convert to:");
        for format in ExportFormat::ALL {
            changed |= ui
                .radio_value(&mut session.options.export_format, format, format.to_string())
                .changed();
        }
    });

    let format = session.options.export_format;
    if ui
        .add_enabled(
            session.run.is_some(),
            egui::Button::new(format!("Convert {} to {format}", session.name)),
        )
        .clicked()
    {
        session.convert();
    }

    let mut save = false;
    if let Some(download) = &session.download {
        ui.horizontal(|ui: &mut Ui| {
            if ui.button(format!("Save {}", download.file_name)).clicked() {
                save = true;
            }
            success(ui, "Processing completed!");
        });
    }
    if let Some(path) = &session.saved_to {
        success(ui, format!("Saved to {}", path.display()));
    }

    if save {
        save_file_dialog(session);
    }
    if changed {
        log::debug!("'{}': options changed, re-running", session.name);
        session.rerun();
        ui.ctx().request_repaint();
    }

    remove
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let mut supported = vec!["csv"];
    supported.extend_from_slice(SPREADSHEET_EXTENSIONS);

    let files = rfd::FileDialog::new()
        .set_title("Upload CSV or Excel files")
        .add_filter("Supported files", supported.as_slice())
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", SPREADSHEET_EXTENSIONS)
        .pick_files();

    if let Some(paths) = files {
        for path in paths {
            state.open_path(&path);
        }
    }
}

fn save_file_dialog(session: &mut FileSession) {
    let Some(download) = &session.download else {
        return;
    };
    let format = session.options.export_format;

    let target = rfd::FileDialog::new()
        .set_title("Save converted file")
        .set_file_name(download.file_name.as_str())
        .add_filter(format.to_string(), &[format.extension()])
        .save_file();

    if let Some(path) = target {
        session.save_to(&path);
    }
}
