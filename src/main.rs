mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::TidyPandaApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Any arguments are files to upload at startup.
    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 850.0])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Tidy Panda – File Converter and Cleaner",
        options,
        Box::new(move |_cc| Ok(Box::new(TidyPandaApp::with_files(&paths)))),
    )
}
