mod analysis;
mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::EdaApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty EDA – Exploratory Data Analysis",
        options,
        Box::new(|_cc| Ok(Box::new(EdaApp::default()))),
    )
}
