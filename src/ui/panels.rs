use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::{FileFormat, UploadedFile};
use crate::state::{AppState, Phase};

// ---------------------------------------------------------------------------
// Left side panel – input and settings
// ---------------------------------------------------------------------------

/// Render the left input panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Upload your data");
            ui.separator();

            if ui.button("Open file…").clicked() {
                open_file_dialog(state);
            }
            ui.label(
                RichText::new(format!(
                    "Accepted: {}  (or drop a file on the window)",
                    state
                        .config
                        .extensions()
                        .iter()
                        .map(|e| format!(".{e}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
                .small(),
            );

            if let Some(file) = &state.upload {
                ui.label(format!("Current file: {}", file.name));
            }

            sheet_selector(ui, state);

            ui.add_space(8.0);
            ui.separator();
            settings(ui, state);
        });
}

/// Sheet choice for multi-sheet workbooks. No sheet is preselected; once
/// one is shown the box stays so another can be picked.
fn sheet_selector(ui: &mut Ui, state: &mut AppState) {
    let Some(sheets) = state.sheet_choices().map(<[String]>::to_vec) else {
        return;
    };
    let current = state.current_sheet().map(str::to_owned);

    ui.add_space(8.0);
    ui.strong("Select the sheet to analyse");
    let mut chosen: Option<String> = None;
    egui::ComboBox::from_id_salt("sheet_select")
        .selected_text(current.as_deref().unwrap_or("Choose a sheet…"))
        .show_ui(ui, |ui: &mut Ui| {
            for sheet in &sheets {
                let selected = current.as_deref() == Some(sheet.as_str());
                if ui.selectable_label(selected, sheet).clicked() && !selected {
                    chosen = Some(sheet.clone());
                }
            }
        });

    if let Some(sheet) = chosen {
        state.select_sheet(&sheet);
    }
}

fn settings(ui: &mut Ui, state: &mut AppState) {
    egui::CollapsingHeader::new(RichText::new("Settings").strong())
        .id_salt("settings")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let mut changed = false;
            let config = &mut state.config;

            ui.horizontal(|ui: &mut Ui| {
                ui.label("Max categories charted");
                changed |= ui
                    .add(egui::DragValue::new(&mut config.max_categories).range(1..=500))
                    .changed();
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Preview rows");
                changed |= ui
                    .add(egui::DragValue::new(&mut config.preview_rows).range(0..=100))
                    .changed();
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Density points");
                changed |= ui
                    .add(egui::DragValue::new(&mut config.kde_grid_points).range(10..=2000))
                    .changed();
            });

            ui.label("Accepted formats");
            for format in FileFormat::ALL {
                let mut enabled = config.format_enabled(format);
                if ui.checkbox(&mut enabled, format.label()).changed() {
                    config.set_format(format, enabled);
                }
            }

            if changed {
                state.rebuild_report();
            }
        });
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
            if ui.button("Use example dataset").clicked() {
                state.use_example(false);
                ui.close_menu();
            }
            if let Some(report) = state.report() {
                if ui.button("Copy report as JSON").clicked() {
                    match report.to_json() {
                        Ok(json) => ui.ctx().copy_text(json),
                        Err(e) => log::error!("Failed to serialize report: {e}"),
                    }
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        match &state.phase {
            Phase::Ready { report, .. } => {
                let (rows, cols) = report.shape;
                ui.label(format!("{}: {rows} rows × {cols} columns", report.source));
            }
            Phase::SelectingSheet { sheets } => {
                ui.label(format!("{} sheets – pick one in the side panel", sheets.len()));
            }
            Phase::AwaitingInput => {
                ui.label("No data loaded");
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File input
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Open a dataset")
        .add_filter("Supported files", &state.config.extensions());
    for format in &state.config.formats {
        dialog = dialog.add_filter(format.label(), format.extensions());
    }

    if let Some(path) = dialog.pick_file() {
        match UploadedFile::from_path(&path) {
            Ok(file) => state.open_upload(file),
            Err(e) => {
                log::error!("Failed to read {}: {e}", path.display());
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

/// Accept the first file dropped onto the window.
pub fn handle_dropped_files(ctx: &egui::Context, state: &mut AppState) {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    let Some(file) = dropped.into_iter().next() else {
        return;
    };

    let upload = if let Some(bytes) = file.bytes {
        Ok(UploadedFile::new(file.name, bytes))
    } else if let Some(path) = file.path {
        UploadedFile::from_path(&path)
    } else {
        return;
    };

    match upload {
        Ok(upload) => state.open_upload(upload),
        Err(e) => {
            log::error!("Failed to read dropped file: {e}");
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}
