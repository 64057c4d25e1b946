use eframe::egui::{self, Color32, Mesh, Shape};

use crate::data::model::SurveyTable;
use crate::state::AppState;
use crate::ui::{panels, plot};

const BACKDROP_START: Color32 = Color32::from_rgb(0xe0, 0xe7, 0xff);
const BACKDROP_END: Color32 = Color32::from_rgb(0xf0, 0xfd, 0xf4);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MindscopeApp {
    pub state: AppState<'static>,
}

impl MindscopeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, table: &'static SurveyTable) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        Self {
            state: AppState::new(table),
        }
    }
}

/// Diagonal two-tone gradient behind the transparent central panel.
fn paint_backdrop(ctx: &egui::Context) {
    let rect = ctx.screen_rect();
    let mid = BACKDROP_START.lerp_to_gamma(BACKDROP_END, 0.5);

    let mut mesh = Mesh::default();
    mesh.colored_vertex(rect.left_top(), BACKDROP_START);
    mesh.colored_vertex(rect.right_top(), mid);
    mesh.colored_vertex(rect.right_bottom(), BACKDROP_END);
    mesh.colored_vertex(rect.left_bottom(), mid);
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);

    ctx.layer_painter(egui::LayerId::background())
        .add(Shape::mesh(mesh));
}

impl eframe::App for MindscopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        paint_backdrop(ctx);

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: header, KPIs, chart, insights ----
        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(Color32::TRANSPARENT))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        panels::header(ui);
                        panels::kpi_tiles(ui, self.state.kpis());
                        plot::chart_card(ui, &mut self.state);
                        panels::insights(ui);
                    });
            });
    }
}
