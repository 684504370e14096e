use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::{correlation_color, label_color, share_color};
use crate::data::model::CellValue;
use crate::state::{AppState, ChartView, LoadedAnalysis};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the chart selected in the top bar.
pub fn central_view(ui: &mut Ui, state: &AppState) {
    let analysis = match &state.analysis {
        Some(a) => a,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a cleaned survey file  (File → Open…)");
            });
            return;
        }
    };

    match state.view {
        ChartView::ValueShares => value_share_heatmap(ui, analysis),
        ChartView::Correlation => correlation_heatmap(ui, analysis),
        ChartView::FieldBars => field_bar_chart(ui, state, analysis),
    }
}

fn heat_cell(ui: &mut Ui, text: String, fill: Color32) {
    ui.label(
        RichText::new(format!(" {text:>6} "))
            .monospace()
            .background_color(fill)
            .color(label_color(fill)),
    );
}

// ---------------------------------------------------------------------------
// Value shares of the important fields
// ---------------------------------------------------------------------------

/// Rows: value codes; columns: important fields; cells: share of the code
/// over all rows, missing ones included.
fn value_share_heatmap(ui: &mut Ui, analysis: &LoadedAnalysis) {
    ui.heading("Share of each value in the important fields");
    if analysis.important.is_empty() {
        ui.label("No important fields were selected.");
        return;
    }

    let columns: Vec<_> = analysis
        .important
        .iter()
        .filter_map(|f| analysis.report.get(f))
        .collect();
    let mut codes: Vec<&CellValue> = columns
        .iter()
        .flat_map(|c| c.shares.iter().map(|s| &s.value))
        .collect();
    codes.sort();
    codes.dedup();

    ScrollArea::both().show(ui, |ui: &mut Ui| {
        egui::Grid::new("value_shares")
            .spacing([2.0, 2.0])
            .show(ui, |ui: &mut Ui| {
                ui.label("");
                for column in &columns {
                    ui.label(RichText::new(&column.name).small().strong());
                }
                ui.end_row();

                for code in &codes {
                    ui.label(RichText::new(code.to_string()).strong());
                    for column in &columns {
                        match column.shares.iter().find(|s| &s.value == *code) {
                            Some(share) => {
                                let fraction = column.row_share(share);
                                heat_cell(ui, format!("{fraction:.2}"), share_color(fraction))
                            }
                            None => heat_cell(ui, String::new(), Color32::TRANSPARENT),
                        }
                    }
                    ui.end_row();
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Correlation heatmap (lower triangle)
// ---------------------------------------------------------------------------

fn correlation_heatmap(ui: &mut Ui, analysis: &LoadedAnalysis) {
    ui.heading("Correlation between numeric fields");
    let matrix = &analysis.correlation;
    if matrix.columns.is_empty() {
        ui.label("No numeric fields to correlate.");
        return;
    }

    ScrollArea::both().show(ui, |ui: &mut Ui| {
        egui::Grid::new("correlation")
            .spacing([2.0, 2.0])
            .show(ui, |ui: &mut Ui| {
                ui.label("");
                for name in &matrix.columns {
                    ui.label(RichText::new(name).small());
                }
                ui.end_row();

                for (i, name) in matrix.columns.iter().enumerate() {
                    ui.label(RichText::new(name).small());
                    for j in 0..matrix.columns.len() {
                        if j < i {
                            let r = matrix.values[i][j];
                            heat_cell(ui, format!("{r:.3}"), correlation_color(r));
                        } else {
                            ui.label("");
                        }
                    }
                    ui.end_row();
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Per-field bar chart
// ---------------------------------------------------------------------------

fn field_bar_chart(ui: &mut Ui, state: &AppState, analysis: &LoadedAnalysis) {
    let Some(stats) = state
        .bar_field
        .as_deref()
        .and_then(|field| analysis.report.get(field))
    else {
        ui.label("Select an important field in the side panel.");
        return;
    };

    ui.heading(format!("Count of each value in {}", stats.name));

    let mut shares: Vec<_> = stats.shares.iter().collect();
    shares.sort_by(|a, b| a.value.cmp(&b.value));

    let bars: Vec<Bar> = shares
        .iter()
        .enumerate()
        .map(|(i, share)| {
            let color = state
                .color_map
                .as_ref()
                .map_or(Color32::LIGHT_BLUE, |cm| cm.color_for(&share.value));
            Bar::new(i as f64, share.count as f64)
                .name(share.value.to_string())
                .fill(color)
                .width(0.43)
        })
        .collect();

    Plot::new("field_bars")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Value")
        .y_axis_label("Count")
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&stats.name));
        });
}
