use eframe::egui::{self, Color32, RichText, Ui};

use crate::charts::ViewMode;
use crate::data::kpi::Kpis;
use crate::state::{AppState, UiEvent};

pub const TITLE_COLOR: Color32 = Color32::from_rgb(0x1e, 0x3a, 0x8a);
const TILE_FILL: Color32 = Color32::from_rgb(0xb6, 0xc3, 0xfd);
const TILE_VALUE: Color32 = Color32::from_rgb(0x1e, 0x1b, 0x4b);
const CARD_FILL: Color32 = Color32::from_rgba_premultiplied(140, 140, 140, 140);

const INSIGHTS: [&str; 3] = [
    "High gaps growing over time = systems asleep.",
    "Correlations = symptom buddies. Useful for predictions.",
    "Outlier entities = interesting or broken.",
];

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the sidebar and apply whatever the user changed.
pub fn side_panel(ui: &mut Ui, state: &mut AppState<'_>) {
    ui.heading("Filters");
    ui.separator();

    let mut events = Vec::new();

    // ---- Dataset selector ----
    ui.strong("Pick Dataset");
    let current = state.filters().source.clone();
    egui::ComboBox::from_id_salt("source_file")
        .selected_text(current.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for source in state.sources() {
                if ui
                    .selectable_label(*source == current, source.to_string())
                    .clicked()
                {
                    events.push(UiEvent::SelectSource(source.clone()));
                }
            }
        });
    ui.add_space(8.0);

    // ---- Chart mode ----
    ui.strong("Choose a chart to display");
    let mut mode = state.mode();
    for m in ViewMode::ALL {
        ui.radio_value(&mut mode, m, m.label());
    }
    if mode != state.mode() {
        events.push(UiEvent::SelectMode(mode));
    }

    // ---- Year range (only when the data has a year column) ----
    if let (Some((min, max)), Some((lo, hi))) = (state.year_span(), state.filters().years) {
        ui.add_space(8.0);
        ui.strong("Year Range");
        let (mut from, mut to) = (lo, hi);
        let from_changed = ui
            .add(egui::Slider::new(&mut from, min..=max).text("from"))
            .changed();
        let to_changed = ui
            .add(egui::Slider::new(&mut to, min..=max).text("to"))
            .changed();
        if from_changed || to_changed {
            // Dragging one handle past the other pushes it along.
            if from_changed && from > to {
                to = from;
            } else if to_changed && to < from {
                from = to;
            }
            events.push(UiEvent::SetYearRange(from, to));
        }
    }

    ui.separator();

    if let Some(msg) = &state.status_message {
        ui.label(RichText::new(msg).color(Color32::RED));
    }

    for event in events {
        state.apply(event);
    }
}

// ---------------------------------------------------------------------------
// Central page sections
// ---------------------------------------------------------------------------

pub fn header(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(
            RichText::new("Mental Health Analytics")
                .size(32.0)
                .strong()
                .color(TITLE_COLOR),
        );
        ui.label("Sort. Filter. Analyze. Judge society responsibly.");
    });
    ui.add_space(12.0);
}

/// The three summary tiles.
pub fn kpi_tiles(ui: &mut Ui, kpis: Kpis) {
    let tiles = [
        ("Rows", kpis.rows),
        ("Numeric Columns", kpis.numeric_columns),
        ("Entities", kpis.entities),
    ];
    ui.columns(tiles.len(), |cols: &mut [Ui]| {
        for (ui, (label, value)) in cols.iter_mut().zip(tiles) {
            egui::Frame::new()
                .fill(TILE_FILL)
                .corner_radius(16)
                .inner_margin(20)
                .show(ui, |ui: &mut Ui| {
                    ui.vertical_centered(|ui: &mut Ui| {
                        ui.strong(label);
                        ui.label(
                            RichText::new(value.to_string())
                                .size(32.0)
                                .strong()
                                .color(TILE_VALUE),
                        );
                    });
                });
        }
    });
    ui.add_space(16.0);
}

/// Translucent rounded container used for the chart and the insights block.
pub fn card<R>(ui: &mut Ui, add_contents: impl FnOnce(&mut Ui) -> R) -> R {
    let response = egui::Frame::new()
        .fill(CARD_FILL)
        .corner_radius(18)
        .inner_margin(25)
        .show(ui, add_contents);
    ui.add_space(20.0);
    response.inner
}

/// Fixed closing text block.
pub fn insights(ui: &mut Ui) {
    card(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.heading("Insights");
        for line in INSIGHTS {
            ui.label(format!("• {line}"));
        }
    });
}
