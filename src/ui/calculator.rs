use eframe::egui::{self, RichText, Ui};

use super::{metric, metric_with_delta, percent};
use crate::analysis::calculator::{GenderChoice, SegmentReport};
use crate::color::band_color;
use crate::data::model::Column;
use crate::state::AppState;

/// Slider step per column; matches the granularity of the source data.
fn slider_step(column: Column) -> f64 {
    match column {
        Column::AvgUtilizationRatio => 0.01,
        Column::TotalTransAmt => 100.0,
        Column::CreditLimit => 500.0,
        _ => 1.0,
    }
}

/// The what-if churn calculator. Always runs against the unfiltered table.
pub fn calculator_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Bank Customer Churn Analyzer");
    ui.label("Adjust the sliders to describe a segment and see its churn percentage.");
    ui.add_space(6.0);

    let base = &state.base;
    let mut inputs = state.calculator.clone();
    let calculator = &mut inputs;
    egui::Grid::new("calculator_inputs")
        .num_columns(3)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for (column, range) in calculator.ranges_mut() {
                let (lo, hi) = match column {
                    Column::AvgUtilizationRatio => (0.0, 1.0),
                    _ => base.numeric_bounds(column).unwrap_or((0.0, 0.0)),
                };
                let step = slider_step(column);
                ui.label(column.label());
                ui.add(egui::Slider::new(&mut range.min, lo..=hi).step_by(step).text("from"));
                ui.add(egui::Slider::new(&mut range.max, lo..=hi).step_by(step).text("to"));
                ui.end_row();
            }

            ui.label("Gender");
            egui::ComboBox::from_id_salt("calculator_gender")
                .selected_text(calculator.gender.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for choice in GenderChoice::ALL {
                        ui.selectable_value(&mut calculator.gender, choice, choice.label());
                    }
                });
            ui.end_row();
        });
    state.set_calculator_inputs(inputs);

    ui.add_space(6.0);
    ui.horizontal(|ui: &mut Ui| {
        if ui
            .button(RichText::new("Calculate Churn Percentage").strong())
            .clicked()
        {
            state.run_calculator();
        }
        if ui.button("Reset").clicked() {
            state.reset_calculator();
        }
    });

    if let Some(report) = &state.calculator_report {
        ui.separator();
        report_view(ui, report);
    }

    egui::CollapsingHeader::new("How to interpret results")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.label("The churn percentage is measured only within the selected segment.");
            ui.label("Compare it with the overall rate: more than 5 points either side moves the segment out of the average band.");
            ui.label("Start broad, then narrow the ranges to find high-risk combinations.");
        });
}

fn report_view(ui: &mut Ui, report: &SegmentReport) {
    ui.heading("Results");
    let (Some(churn_pct), Some(band)) = (report.churn_pct, report.band) else {
        ui.colored_label(
            egui::Color32::from_rgb(220, 160, 0),
            "No customers match the selected filters. Please adjust your criteria.",
        );
        return;
    };

    ui.columns(3, |cols: &mut [Ui]| {
        metric_with_delta(
            &mut cols[0],
            "Segment Size",
            report.segment_size.to_string(),
            format!("{} of total", percent(report.share_of_total_pct)),
        );
        metric(&mut cols[1], "Churn Count", report.churn_count.to_string());
        metric_with_delta(
            &mut cols[2],
            "Churn Percentage",
            percent(Some(churn_pct)),
            report
                .diff_vs_overall()
                .map_or_else(String::new, |d| format!("{d:+.1} pts vs overall")),
        );
    });

    ui.add_space(4.0);
    ui.strong("Risk Assessment");
    ui.colored_label(
        band_color(band),
        format!(
            "{} (overall churn rate {})",
            band.label(),
            percent(report.overall_churn_pct)
        ),
    );

    egui::CollapsingHeader::new("View Filter Summary")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for line in &report.filters {
                ui.label(format!("- {line}"));
            }
            ui.label(format!(
                "Segment represents {} of total customers",
                percent(report.share_of_total_pct)
            ));
        });
}
