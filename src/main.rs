mod app;
mod charts;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::process::ExitCode;

use app::MindscopeApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> ExitCode {
    env_logger::init();

    let config = match DashboardConfig::from_args(std::env::args()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    // The table is built exactly once; the UI only ever borrows it.
    let table = match data::loader::load_cached(&config.data_dir) {
        Ok(table) => table,
        Err(e) => {
            log::error!("Cannot build the dataset: {e}");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Mental Health Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(MindscopeApp::new(cc, table)))),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("UI terminated: {e}");
            ExitCode::FAILURE
        }
    }
}
