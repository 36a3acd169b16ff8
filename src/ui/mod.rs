pub mod calculator;
pub mod charts;
pub mod dashboard;
pub mod panels;

use eframe::egui::{RichText, Ui};

/// `"16.1%"` for a 0–100 percentage, `"n/a"` when undefined.
pub fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}%"))
}

/// `"16.1%"` for a 0–1 rate, `"n/a"` when undefined.
pub fn rate(value: Option<f64>) -> String {
    percent(value.map(|r| r * 100.0))
}

/// A labelled headline number.
pub fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.heading(value);
    });
}

/// A headline number with a small delta line underneath.
pub fn metric_with_delta(ui: &mut Ui, label: &str, value: String, delta: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.heading(value);
        ui.small(delta);
    });
}
