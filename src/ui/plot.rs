use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoint, PlotPoints, Polygon, Text};

use crate::analysis::correlation::Heatmap;
use crate::analysis::distribution::{FrequencyBar, NumericFigure};
use crate::color::{generate_palette, is_dark};

const PLOT_HEIGHT: f32 = 240.0;
const HIST_COLOR: Color32 = Color32::from_rgb(76, 114, 176);

// ---------------------------------------------------------------------------
// Numeric columns: histogram + density side by side
// ---------------------------------------------------------------------------

pub fn numeric_pair(ui: &mut Ui, fig: &NumericFigure) {
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].label(format!("Histogram of {}", fig.column));
        histogram_plot(&mut cols[0], fig);
        cols[1].label(format!("Density of {}", fig.column));
        density_plot(&mut cols[1], fig);
    });
}

fn histogram_plot(ui: &mut Ui, fig: &NumericFigure) {
    let bars: Vec<Bar> = fig
        .bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .name(format!("{:.3} – {:.3}", b.start, b.end))
        })
        .collect();

    Plot::new(("histogram", &fig.column))
        .height(PLOT_HEIGHT)
        .x_axis_label(fig.column.as_str())
        .y_axis_label("Count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(HIST_COLOR).name("count"));
            if !fig.overlay.is_empty() {
                let points: PlotPoints = fig.overlay.iter().copied().collect();
                plot_ui.line(Line::new(points).color(HIST_COLOR).width(2.0).name("density"));
            }
        });
}

fn density_plot(ui: &mut Ui, fig: &NumericFigure) {
    Plot::new(("density", &fig.column))
        .height(PLOT_HEIGHT)
        .x_axis_label(fig.column.as_str())
        .y_axis_label("Density")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let points: PlotPoints = fig.density.iter().copied().collect();
            plot_ui.line(Line::new(points).color(HIST_COLOR).width(2.0));
        });
    if fig.density.is_empty() {
        ui.label(RichText::new("Not enough variation to estimate a density.").italics());
    }
}

// ---------------------------------------------------------------------------
// Categorical columns: ranked horizontal bars
// ---------------------------------------------------------------------------

/// Most frequent value on top, each bar labelled with its value and count.
pub fn frequency_chart(ui: &mut Ui, column: &str, bars: &[FrequencyBar]) {
    let n = bars.len();
    let colors = generate_palette(n);
    let chart_bars: Vec<Bar> = bars
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, (bar, color))| {
            Bar::new((n - 1 - i) as f64, bar.count as f64)
                .width(0.8)
                .fill(color)
                .name(&bar.label)
        })
        .collect();
    let max_count = bars.iter().map(|b| b.count).max().unwrap_or(0) as f64;

    Plot::new(("frequency", column))
        .height((n as f32 * 22.0).clamp(80.0, 600.0))
        .x_axis_label("Count")
        .show_axes([true, false])
        .allow_scroll(false)
        .include_x(0.0)
        .include_x(max_count * 1.3)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(chart_bars).horizontal());
            for (i, bar) in bars.iter().enumerate() {
                let label = format!("{} ({})", bar.label, bar.count);
                plot_ui.text(
                    Text::new(PlotPoint::new(bar.count as f64, (n - 1 - i) as f64), label)
                        .anchor(Align2::LEFT_CENTER),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Cell (row, col) is drawn as a unit square centred on (col, -row).
pub fn heatmap_plot(ui: &mut Ui, heatmap: &Heatmap) {
    let n = heatmap.labels.len();
    let size = (n as f32 * 60.0 + 160.0).clamp(240.0, 800.0);
    Plot::new("correlation_heatmap")
        .height(size)
        .width(size)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-2.5)
        .include_x(n as f64 - 0.5)
        .include_y(0.5)
        .include_y(-(n as f64) - 1.0)
        .show(ui, |plot_ui| {
            for cell in &heatmap.cells {
                let (x, y) = (cell.col as f64, -(cell.row as f64));
                let square: PlotPoints = vec![
                    [x - 0.5, y - 0.5],
                    [x + 0.5, y - 0.5],
                    [x + 0.5, y + 0.5],
                    [x - 0.5, y + 0.5],
                ]
                .into();
                let fill = cell
                    .fill
                    .map(|[r, g, b]| Color32::from_rgb(r, g, b))
                    .unwrap_or(Color32::TRANSPARENT);
                plot_ui.polygon(
                    Polygon::new(square)
                        .fill_color(fill)
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                );

                if let Some(rgb) = cell.fill {
                    let text_color = if is_dark(rgb) {
                        Color32::WHITE
                    } else {
                        Color32::BLACK
                    };
                    plot_ui.text(Text::new(
                        PlotPoint::new(x, y),
                        RichText::new(&cell.annotation).color(text_color),
                    ));
                }
            }

            for (i, label) in heatmap.labels.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(-0.6, -(i as f64)), label.as_str())
                        .anchor(Align2::RIGHT_CENTER),
                );
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, -(n as f64) + 0.4), label.as_str())
                        .anchor(Align2::CENTER_TOP),
                );
            }
        });

    ui.label(format!(
        "Colour scale: {:.2} (blue) to {:.2} (red)",
        heatmap.vmin, heatmap.vmax
    ));
}
