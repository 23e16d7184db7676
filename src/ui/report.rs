use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::analysis::distribution::CategoricalFigure;
use crate::analysis::report::{Report, Section};
use crate::data::model::format_float;
use crate::ui::plot;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Report view (central panel)
// ---------------------------------------------------------------------------

/// Render every report section in its fixed order.
pub fn report_view(ui: &mut Ui, report: &Report) {
    for (i, &section) in report.sections().iter().enumerate() {
        if i > 0 {
            ui.separator();
        }
        ui.heading(section.title());
        ui.push_id(section.title(), |ui: &mut Ui| match section {
            Section::Preview => preview(ui, report),
            Section::Overview => overview(ui, report),
            Section::ColumnProfiles => column_profiles(ui, report),
            Section::Structure => {
                ui.label(RichText::new(&report.structure).monospace());
            }
            Section::Summary => summary(ui, report),
            Section::NumericDistributions => numeric_distributions(ui, report),
            Section::CategoricalDistributions => categorical_distributions(ui, report),
            Section::Correlation => correlation(ui, report),
        });
        ui.add_space(8.0);
    }
}

/// Simple header + rows grid.
fn string_table(ui: &mut Ui, headers: &[String], rows: &[Vec<String>]) {
    if headers.is_empty() {
        ui.label("(no columns)");
        return;
    }
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .columns(TableColumn::auto().at_least(60.0), headers.len())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for h in headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|mut body| {
            for row in rows {
                body.row(ROW_HEIGHT, |mut table_row| {
                    for cell in row {
                        table_row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            }
        });
}

fn preview(ui: &mut Ui, report: &Report) {
    ui.label(format!("Source: {}", report.source));
    if report.preview.rows.is_empty() {
        ui.label(RichText::new("The table has no rows.").italics());
    }
    egui::ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            string_table(ui, &report.preview.headers, &report.preview.rows);
        });
}

fn overview(ui: &mut Ui, report: &Report) {
    ui.label(format!("Columns: {}", report.column_names.join(", ")));
    let (rows, cols) = report.shape;
    ui.label(format!("Shape: ({rows}, {cols})"));
}

fn column_profiles(ui: &mut Ui, report: &Report) {
    let headers = ["Column", "Data Type", "Missing Values", "Missing %"].map(String::from);
    let rows: Vec<Vec<String>> = report
        .profiles
        .iter()
        .map(|p| {
            vec![
                p.name.clone(),
                p.kind.dtype().to_string(),
                p.missing_count.to_string(),
                format!("{:.2}", p.missing_pct),
            ]
        })
        .collect();
    string_table(ui, &headers, &rows);
}

/// Statistic labels down the side, one column per numeric column.
fn summary(ui: &mut Ui, report: &Report) {
    let columns = &report.summary.columns;
    if columns.is_empty() {
        ui.label("No numeric columns to summarize.");
        return;
    }

    let headers: Vec<String> = std::iter::once(String::new())
        .chain(columns.iter().map(|c| c.column.clone()))
        .collect();
    let stat_rows: Vec<_> = columns.iter().map(|c| c.rows()).collect();
    let rows: Vec<Vec<String>> = (0..stat_rows[0].len())
        .map(|i| {
            std::iter::once(stat_rows[0][i].0.to_string())
                .chain(stat_rows.iter().map(|r| format_float(r[i].1)))
                .collect()
        })
        .collect();

    egui::ScrollArea::horizontal()
        .id_salt("summary_scroll")
        .show(ui, |ui: &mut Ui| string_table(ui, &headers, &rows));
}

fn numeric_distributions(ui: &mut Ui, report: &Report) {
    if report.numeric.is_empty() {
        ui.label("No numeric columns.");
        return;
    }
    for fig in &report.numeric {
        ui.push_id(&fig.column, |ui: &mut Ui| plot::numeric_pair(ui, fig));
        ui.add_space(6.0);
    }
}

fn correlation(ui: &mut Ui, report: &Report) {
    if report.correlation.is_empty() {
        ui.label("No numeric columns to correlate.");
        return;
    }
    plot::heatmap_plot(ui, &report.heatmap);
}

fn categorical_distributions(ui: &mut Ui, report: &Report) {
    if report.categorical.is_empty() {
        ui.label("No categorical columns.");
        return;
    }
    for fig in &report.categorical {
        ui.push_id(fig.column(), |ui: &mut Ui| categorical_figure(ui, fig));
        ui.add_space(6.0);
    }
}

fn categorical_figure(ui: &mut Ui, fig: &CategoricalFigure) {
    match fig {
        CategoricalFigure::Frequencies { column, bars } => {
            ui.label(format!("Frequency of {column}"));
            plot::frequency_chart(ui, column, bars);
        }
        CategoricalFigure::TooManyValues { column, distinct } => {
            ui.label(
                RichText::new(format!(
                    "{column} has too many unique values ({distinct}) to display."
                ))
                .italics(),
            );
        }
    }
}
