use eframe::egui;

use crate::config::AppConfig;
use crate::data::source::DataSource;
use crate::state::AppState;
use crate::ui::{dashboard, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub enum RustyChurnApp {
    Ready(Box<AppState>),
    /// The dataset could not be loaded; nothing else is rendered.
    Failed { path: String, message: String },
}

impl RustyChurnApp {
    pub fn new(source: &DataSource, config: &AppConfig) -> Self {
        match source.load() {
            Ok(table) => Self::Ready(Box::new(AppState::new(table, config))),
            Err(e) => {
                log::error!("failed to load {}: {e}", source.path().display());
                Self::Failed {
                    path: source.path().display().to_string(),
                    message: e.to_string(),
                }
            }
        }
    }
}

impl eframe::App for RustyChurnApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let state = match self {
            Self::Ready(state) => state,
            Self::Failed { path, message } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Could not load the customer data");
                    ui.separator();
                    ui.label(format!("File: {path}"));
                    ui.colored_label(egui::Color32::LIGHT_RED, message.as_str());
                    ui.add_space(8.0);
                    ui.label(
                        "Pass a .csv, .json or .parquet file as the first argument, \
                         or set RUSTY_CHURN_DATA.",
                    );
                });
                return;
            }
        };

        // ---- Top panel: title bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard::central_panel(ui, state);
        });
    }
}
