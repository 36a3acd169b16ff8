mod analysis;
mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::RustyChurnApp;
use config::AppConfig;
use data::source::DataSource;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_env();
    log::info!("using data file {}", config.data_path.display());
    let source = DataSource::new(config.data_path.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Churn – Bank Customer Churn Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyChurnApp::new(&source, &config)))),
    )
}
