use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot};

use crate::analysis::aggregate::{GroupBox, GroupMean};
use crate::analysis::segment::{RiskSegment, SegmentCounts, SegmentProfile};
use crate::color::{churn_rate_color, generate_palette, segment_color};
use crate::data::model::Column;

const CHART_HEIGHT: f32 = 220.0;

fn no_data(ui: &mut Ui) {
    ui.weak("No customers match the current filters.");
}

/// Legend name for a `churn` group key.
fn churn_label(group: &str) -> &str {
    match group {
        "0" => "Retained",
        "1" => "Attrited",
        other => other,
    }
}

/// One bar per group, one chart item per bar so the legend names the groups.
fn bars(ui: &mut Ui, id: &str, y_label: &str, bars: Vec<(String, f64, Color32)>) {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label(y_label)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, (name, value, color)) in bars.into_iter().enumerate() {
                let bar = Bar::new(i as f64, value).width(0.7).name(&name).fill(color);
                plot_ui.bar_chart(BarChart::new(vec![bar]).color(color).name(&name));
            }
        });
}

// ---------------------------------------------------------------------------
// Churn rate by category
// ---------------------------------------------------------------------------

/// Bar chart of the mean churn per group, coloured on the churn ramp.
pub fn churn_rate_chart(ui: &mut Ui, column: Column, groups: &[GroupMean]) {
    ui.strong(format!("Churn Rate by {}", column.label()));
    if groups.is_empty() {
        no_data(ui);
        return;
    }
    let items = groups
        .iter()
        .filter_map(|g| g.mean.map(|m| (g.group.clone(), m, churn_rate_color(m))))
        .collect();
    bars(ui, &format!("churn_by_{}", column.name()), "Churn Rate", items);
}

// ---------------------------------------------------------------------------
// Behavioural distributions
// ---------------------------------------------------------------------------

/// Box plot of `column`, one box per churn group.
pub fn behaviour_box_plot(ui: &mut Ui, column: Column, groups: &[GroupBox]) {
    ui.strong(format!("{} vs Churn Status", column.label()));
    if groups.is_empty() {
        no_data(ui);
        return;
    }
    let colors = generate_palette(groups.len());
    Plot::new(format!("box_{}", column.name()))
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label(column.label())
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for ((i, group), color) in groups.iter().enumerate().zip(colors) {
                let s = group.stats;
                let name = churn_label(&group.group);
                let elem = BoxElem::new(i as f64, BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max))
                    .box_width(0.5)
                    .name(name);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).color(color).name(name));
            }
        });
}

// ---------------------------------------------------------------------------
// Segmentation
// ---------------------------------------------------------------------------

pub fn segment_distribution_chart(ui: &mut Ui, counts: &SegmentCounts) {
    ui.strong("Customer Risk Segmentation Distribution");
    if counts.total() == 0 {
        no_data(ui);
        return;
    }
    let items = RiskSegment::ALL
        .iter()
        .map(|&s| (s.to_string(), counts.get(s) as f64, segment_color(s)))
        .collect();
    bars(ui, "segment_distribution", "Customers", items);
}

pub fn segment_churn_chart(ui: &mut Ui, profiles: &[SegmentProfile]) {
    ui.strong("Churn Rate by Risk Segment");
    let items: Vec<_> = profiles
        .iter()
        .filter_map(|p| p.churn_rate.map(|r| (p.segment.to_string(), r, segment_color(p.segment))))
        .collect();
    if items.is_empty() {
        no_data(ui);
        return;
    }
    bars(ui, "segment_churn", "Churn Rate", items);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn churn_groups_get_readable_names() {
        assert_eq!(churn_label("0"), "Retained");
        assert_eq!(churn_label("1"), "Attrited");
        assert_eq!(churn_label("Blue"), "Blue");
    }
}
