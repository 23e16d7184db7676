use eframe::egui::{self, RichText, Ui};

use crate::state::{AppState, Phase};
use crate::ui::{panels, report};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct EdaApp {
    pub state: AppState,
}

impl eframe::App for EdaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        panels::handle_dropped_files(ctx, &mut self.state);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: input + settings ----
        egui::SidePanel::left("input_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: report ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    if matches!(self.state.phase, Phase::AwaitingInput) {
                        awaiting_view(ui, &mut self.state);
                        return;
                    }
                    match &self.state.phase {
                        Phase::Ready { report: current, .. } => report::report_view(ui, current),
                        Phase::SelectingSheet { sheets } => {
                            ui.heading(format!(
                                "This workbook has {} sheets. Select one in the side panel.",
                                sheets.len()
                            ));
                        }
                        Phase::AwaitingInput => {}
                    }
                });
        });
    }
}

fn awaiting_view(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.heading("Awaiting for CSV/Excel file to be uploaded.");
        ui.label(RichText::new("Open a file (File → Open…) or drop one on the window.").weak());
        ui.add_space(12.0);
        if ui.button("Use example dataset").clicked() {
            state.use_example(false);
        }
        if ui.small_button("Refetch example").clicked() {
            state.use_example(true);
        }
    });
}
