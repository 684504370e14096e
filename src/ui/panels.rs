use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, ChartView};

// ---------------------------------------------------------------------------
// Left side panel – column statistics
// ---------------------------------------------------------------------------

/// Render the left panel: important fields and per-column statistics.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Important fields");
    ui.label(RichText::new("heuristic: peak share > column mean").small().italics());
    ui.separator();

    let analysis = match &state.analysis {
        Some(a) => a,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the loop.
    let important = analysis.important.fields.clone();
    let report = analysis.report.clone();

    for field in &important {
        let selected = state.bar_field.as_deref() == Some(field.as_str());
        if ui.selectable_label(selected, field).clicked() {
            state.set_bar_field(field.clone());
            state.view = ChartView::FieldBars;
        }
    }
    ui.separator();

    ui.strong("Columns");
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("Field");
            });
            header.col(|ui| {
                ui.strong("Mean");
            });
            header.col(|ui| {
                ui.strong("Top share");
            });
        })
        .body(|mut body| {
            for stats in &report.columns {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        let mut text = RichText::new(&stats.name);
                        if important.contains(&stats.name) {
                            text = text.strong();
                        }
                        ui.label(text);
                    });
                    row.col(|ui| {
                        match stats.mean() {
                            Some(mean) => ui.label(format!("{mean:.3}")),
                            None => ui.label("–"),
                        };
                    });
                    row.col(|ui| {
                        if let Some(peak) = stats.peak() {
                            ui.label(format!(
                                "{} ({:.1}%)",
                                peak.value,
                                peak.frequency * 100.0
                            ));
                        }
                    });
                });
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
        });

        ui.separator();

        if let Some(analysis) = &state.analysis {
            ui.label(format!(
                "{} rows, {} important fields",
                analysis.table.row_count(),
                analysis.important.len()
            ));
        }

        ui.separator();

        for (view, label) in [
            (ChartView::ValueShares, "Value shares"),
            (ChartView::Correlation, "Correlation"),
            (ChartView::FieldBars, "Field bars"),
        ] {
            if ui.selectable_label(state.view == view, label).clicked() {
                state.view = view;
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open cleaned survey data")
        .add_filter("Supported files", &["csv", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
