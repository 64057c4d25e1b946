use std::f64::consts::TAU;

use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Stroke, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};

use crate::charts::{
    ChartOutput, CorrelationMatrix, PieSlices, PreviewTable, RankedBars, SortOrder, TrendLine,
    ViewMode, bar,
};
use crate::color::{CategoryColors, diverging};
use crate::config::TOP_N_RANGE;
use crate::data::model::YEAR_COLUMN;
use crate::state::{AppState, UiEvent};
use crate::ui::panels;

const WARNING_COLOR: Color32 = Color32::from_rgb(0xb4, 0x53, 0x09);

// ---------------------------------------------------------------------------
// Chart area (central panel)
// ---------------------------------------------------------------------------

/// Mode-specific controls followed by the active chart.
pub fn chart_card(ui: &mut Ui, state: &mut AppState<'_>) {
    panels::card(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        for event in chart_controls(ui, state) {
            state.apply(event);
        }
        draw_output(ui, state.output());
    });
}

fn metric_selector(
    ui: &mut Ui,
    id: &str,
    label: &str,
    numeric_columns: &[String],
    current: Option<&str>,
) -> Option<String> {
    let mut picked = None;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(current.unwrap_or("—"))
            .show_ui(ui, |ui: &mut Ui| {
                for col in numeric_columns {
                    if ui
                        .selectable_label(current == Some(col.as_str()), col.as_str())
                        .clicked()
                    {
                        picked = Some(col.clone());
                    }
                }
            });
    });
    picked
}

fn chart_controls(ui: &mut Ui, state: &AppState<'_>) -> Vec<UiEvent> {
    let mut events = Vec::new();
    let params = state.params();

    match state.mode() {
        ViewMode::BarChart => {
            if let Some(m) = metric_selector(
                ui,
                "bar_metric",
                "Metric",
                state.numeric_columns(),
                params.bar_metric.as_deref(),
            ) {
                events.push(UiEvent::SetBarMetric(m));
            }

            let mut top_n = params.top_n;
            if ui
                .add(egui::Slider::new(&mut top_n, TOP_N_RANGE).text("Top N"))
                .changed()
            {
                events.push(UiEvent::SetTopN(top_n));
            }

            let mut order = params.order;
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Order");
                for o in SortOrder::ALL {
                    ui.radio_value(&mut order, o, o.label());
                }
            });
            if order != params.order {
                events.push(UiEvent::SetSortOrder(order));
            }
        }
        ViewMode::TrendOverTime if state.view().has_column(YEAR_COLUMN) => {
            if let Some(m) = metric_selector(
                ui,
                "trend_metric",
                "Trend Metric",
                state.numeric_columns(),
                params.trend_metric.as_deref(),
            ) {
                events.push(UiEvent::SetTrendMetric(m));
            }
        }
        _ => {}
    }
    events
}

pub fn draw_output(ui: &mut Ui, output: &ChartOutput) {
    match output {
        ChartOutput::Preview(table) => preview_table(ui, table),
        ChartOutput::Bars(bars) => bar_chart(ui, bars),
        ChartOutput::Trend(line) => trend_plot(ui, line),
        ChartOutput::Pie(pie) => pie_chart(ui, pie),
        ChartOutput::Heatmap(matrix) => heatmap(ui, matrix),
        ChartOutput::Warning(msg) => {
            ui.label(RichText::new(format!("⚠ {msg}")).color(WARNING_COLOR));
        }
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

fn preview_table(ui: &mut Ui, table: &PreviewTable) {
    ui.heading("Sample of Filtered Data");
    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::auto().resizable(true), table.columns.len())
            .header(22.0, |mut header| {
                for name in &table.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, table.rows.len(), |mut row| {
                    let cells = &table.rows[row.index()];
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.as_str());
                        });
                    }
                });
            });
    });
}

fn bar_chart(ui: &mut Ui, ranked: &RankedBars) {
    ui.heading(bar::TITLE);
    let colors = CategoryColors::new(ranked.bars.iter().map(|g| g.key.as_str()));
    let bars: Vec<Bar> = ranked
        .bars
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64, g.mean)
                .name(&g.key)
                .fill(colors.color_for(&g.key))
        })
        .collect();
    let labels: Vec<String> = ranked.bars.iter().map(|g| g.key.clone()).collect();

    Plot::new("bar_chart")
        .height(360.0)
        .x_axis_label(ranked.category.clone())
        .y_axis_label(ranked.metric.clone())
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.7).name(&ranked.metric));
        });
}

fn trend_plot(ui: &mut Ui, trend: &TrendLine) {
    Plot::new("trend_plot")
        .height(320.0)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label(trend.metric.clone())
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(trend.points.clone()))
                    .name(&trend.metric)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(trend.points.clone()))
                    .radius(4.0)
                    .name(&trend.metric),
            );
        });
}

/// Outline of one pie slice between two angles, split into pieces of at most a
/// quarter turn so every polygon stays convex.
fn slice_pieces(from: f64, to: f64) -> Vec<Vec<[f64; 2]>> {
    let pieces = ((to - from) / (TAU / 4.0)).ceil().max(1.0) as usize;
    let span = (to - from) / pieces as f64;
    (0..pieces)
        .map(|p| {
            let a0 = from + span * p as f64;
            let steps = 16;
            std::iter::once([0.0, 0.0])
                .chain((0..=steps).map(|i| {
                    let a = a0 + span * i as f64 / steps as f64;
                    [a.cos(), a.sin()]
                }))
                .collect()
        })
        .collect()
}

fn pie_chart(ui: &mut Ui, pie: &PieSlices) {
    if pie.slices.is_empty() {
        ui.label(format!("No values of '{}' to show.", pie.metric));
        return;
    }
    let colors = CategoryColors::new(pie.slices.iter().map(|s| s.key.as_str()));
    let shares = pie.shares();

    Plot::new("gap_pie")
        .height(380.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = TAU / 4.0;
            for (slice, share) in pie.slices.iter().zip(&shares) {
                let end = start - share / 100.0 * TAU;
                for piece in slice_pieces(end, start) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(piece))
                            .fill_color(colors.color_for(&slice.key))
                            .stroke(Stroke::new(1.0, Color32::WHITE))
                            .name(&slice.key),
                    );
                }
                let mid = (start + end) / 2.0;
                plot_ui.text(Text::new(
                    PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                    format!("{share:.1}%"),
                ));
                start = end;
            }
        });
}

fn heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.columns.len();
    if n == 0 {
        ui.label("No numeric columns to correlate.");
        return;
    }

    let label_width = 140.0;
    let cell = ((ui.available_width() - label_width) / n as f32).clamp(24.0, 80.0);
    let size = Vec2::new(label_width + cell * n as f32, label_width + cell * n as f32);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min + Vec2::splat(label_width);
    let font = FontId::proportional(11.0);
    let text_color = ui.visuals().text_color();

    for (i, name) in matrix.columns.iter().enumerate() {
        let offset = cell * (i as f32 + 0.5);
        painter.text(
            origin + Vec2::new(-6.0, offset),
            Align2::RIGHT_CENTER,
            name,
            font.clone(),
            text_color,
        );
        painter.text(
            origin + Vec2::new(offset, -6.0),
            Align2::CENTER_BOTTOM,
            truncate(name, 10),
            font.clone(),
            text_color,
        );
    }

    for (i, row) in matrix.values.iter().enumerate() {
        for (j, &r) in row.iter().enumerate() {
            let min = origin + Vec2::new(cell * j as f32, cell * i as f32);
            let rect = egui::Rect::from_min_size(min, Vec2::splat(cell));
            painter.rect_filled(rect.shrink(1.0), 2.0, diverging(r));
            if !r.is_nan() {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    format!("{r:.2}"),
                    font.clone(),
                    Color32::BLACK,
                );
            }
        }
    }

    if let Some(pos) = response.hover_pos() {
        let rel = pos - origin;
        let (i, j) = ((rel.y / cell).floor(), (rel.x / cell).floor());
        if i >= 0.0 && j >= 0.0 && (i as usize) < n && (j as usize) < n {
            let (i, j) = (i as usize, j as usize);
            response.on_hover_text(format!(
                "{} × {}: {:.3}",
                matrix.columns[i], matrix.columns[j], matrix.values[i][j]
            ));
        }
    }
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        format!("{}…", name.chars().take(max - 1).collect::<String>())
    }
}
