use eframe::egui;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct TidyPandaApp {
    pub state: AppState,
}

impl TidyPandaApp {
    /// Start with the files given on the command line already uploaded.
    pub fn with_files(paths: &[std::path::PathBuf]) -> Self {
        let mut app = Self::default();
        for path in paths {
            app.state.open_path(path);
        }
        app
    }

    /// Treat files dropped onto the window as uploads.
    fn receive_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(bytes) = &file.bytes {
                self.state.add_file(file.name.clone(), bytes);
            } else if let Some(path) = &file.path {
                self.state.open_path(path);
            }
        }
    }
}

impl eframe::App for TidyPandaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.receive_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: one card per file ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::file_page(ui, &mut self.state);
        });
    }
}
