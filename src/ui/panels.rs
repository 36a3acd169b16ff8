use eframe::egui::{self, RichText, ScrollArea, Ui};

use super::{metric, rate};
use crate::analysis::calculator::ValueRange;
use crate::data::model::Column;
use crate::state::{AppState, SIDEBAR_CATEGORIES};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Demographic Filters");
            age_slider(ui, state);
            for column in [Column::IncomeCategory, Column::MaritalStatus] {
                category_filter(ui, state, column);
            }
            ui.separator();

            ui.strong("Behavioral Filters");
            for column in SIDEBAR_CATEGORIES
                .into_iter()
                .filter(|c| !matches!(c, Column::IncomeCategory | Column::MaritalStatus))
            {
                category_filter(ui, state, column);
            }
            ui.separator();

            dataset_overview(ui, state);
        });
}

fn age_slider(ui: &mut Ui, state: &mut AppState) {
    let bounds = state.age_bounds;
    let mut range = state.age_range;
    ui.label("Age Range");
    let min_changed = ui
        .add(egui::Slider::new(&mut range.min, bounds.min..=bounds.max).step_by(1.0).text("from"))
        .changed();
    let max_changed = ui
        .add(egui::Slider::new(&mut range.max, bounds.min..=bounds.max).step_by(1.0).text("to"))
        .changed();
    if min_changed || max_changed {
        state.set_age_range(ValueRange::new(range.min, range.max));
    }
}

/// Collapsible checkbox list for one categorical column.
fn category_filter(ui: &mut Ui, state: &mut AppState, column: Column) {
    let all_values = state.base.unique_values(column);
    if all_values.is_empty() {
        return;
    }
    let selected = state.selections.get(&column).cloned().unwrap_or_default();

    // Show count of selected / total in the header
    let header_text = format!("{}  ({}/{})", column.label(), selected.len(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(column.name())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(column);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(column);
                }
            });

            for value in &all_values {
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    state.toggle_filter_value(column, value);
                }
            }
        });
}

fn dataset_overview(ui: &mut Ui, state: &AppState) {
    ui.strong("Dataset Overview");
    let base = &state.base_summary;
    metric(ui, "Total Customers", base.count.to_string());
    metric(ui, "Churned Customers", base.churned.to_string());
    metric(ui, "Overall Churn Rate", rate(base.churn_rate));
    ui.add_space(4.0);
    ui.label(format!("Filtered Records: {}", state.view.summary.count));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top title bar.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong("Bank Customer Churn Analysis");
        ui.separator();
        ui.label(format!(
            "{} customers loaded, {} visible",
            state.base.len(),
            state.view.filtered.len()
        ));
    });
}
