use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use super::{calculator, charts, metric, rate};
use crate::analysis::segment::{RiskSegment, SegmentProfile};
use crate::color::segment_color;
use crate::state::{AppState, Tab};

/// Render the central panel: headline metrics, analysis tabs, segmentation.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            key_metrics(ui, state);
            ui.separator();

            ui.horizontal(|ui: &mut Ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut state.tab, tab, tab.label());
                }
            });
            ui.separator();

            match state.tab {
                Tab::ChurnOverview => chart_pair(ui, state, 0),
                Tab::Demographics => chart_pair(ui, state, 2),
                Tab::Behaviour => behaviour(ui, state),
                Tab::Calculator => calculator::calculator_tab(ui, state),
                Tab::Report => report(ui, state),
            }
            ui.separator();

            segmentation(ui, state);
            ui.separator();

            retention_strategies(ui, &state.view.profiles);
        });
}

fn key_metrics(ui: &mut Ui, state: &AppState) {
    let summary = &state.view.summary;
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total Customers", summary.count.to_string());
        metric(&mut cols[1], "Churn Rate", rate(summary.churn_rate));
        metric(
            &mut cols[2],
            "Average Age",
            summary
                .mean_age
                .map_or_else(|| "n/a".to_string(), |a| format!("{a:.1} years")),
        );
        metric(&mut cols[3], "Avg Utilization", rate(summary.mean_utilization));
    });
    if summary.count == 0 {
        ui.colored_label(
            segment_color(RiskSegment::Medium),
            "No customers match the selected filters.",
        );
    }
}

/// Two churn-rate charts side by side, starting at `first` in the breakdown list.
fn chart_pair(ui: &mut Ui, state: &AppState, first: usize) {
    let breakdowns = &state.view.churn_by[first..first + 2];
    ui.columns(2, |cols: &mut [Ui]| {
        for (col, (column, groups)) in cols.iter_mut().zip(breakdowns) {
            charts::churn_rate_chart(col, *column, groups);
        }
    });
}

fn behaviour(ui: &mut Ui, state: &AppState) {
    for pair in state.view.behaviour.chunks(2) {
        ui.columns(2, |cols: &mut [Ui]| {
            for (col, (column, groups)) in cols.iter_mut().zip(pair) {
                charts::behaviour_box_plot(col, *column, groups);
            }
        });
    }
}

fn report(ui: &mut Ui, state: &AppState) {
    ui.heading("External Report");
    match &state.report_url {
        Some(url) => {
            ui.hyperlink_to("Open the churn report in your browser", url);
        }
        None => {
            ui.weak("No report configured. Set \"report_url\" in the config file.");
        }
    }
}

// ---------------------------------------------------------------------------
// Segmentation
// ---------------------------------------------------------------------------

fn segmentation(ui: &mut Ui, state: &AppState) {
    ui.heading("Customer Segmentation");
    ui.columns(2, |cols: &mut [Ui]| {
        charts::segment_distribution_chart(&mut cols[0], &state.view.segments);
        charts::segment_churn_chart(&mut cols[1], &state.view.profiles);
    });

    ui.strong("Segmentation Insights");
    ui.columns(3, |cols: &mut [Ui]| {
        for (col, segment) in cols.iter_mut().zip(RiskSegment::ALL) {
            metric(
                col,
                &format!("{segment} Risk Customers"),
                state.view.segments.get(segment).to_string(),
            );
        }
    });
    ui.add_space(6.0);
    profile_table(ui, &state.view.profiles);
}

fn profile_table(ui: &mut Ui, profiles: &[SegmentProfile]) {
    let mean = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |m| format!("{m:.1}"));

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(TableColumn::auto().at_least(80.0))
        .columns(TableColumn::remainder(), 4)
        .header(20.0, |mut header| {
            for title in ["Segment", "Customers", "Churn Rate", "Avg Utilization", "Avg Products"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for p in profiles {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.colored_label(segment_color(p.segment), p.segment.label());
                    });
                    row.col(|ui| {
                        ui.label(p.count.to_string());
                    });
                    row.col(|ui| {
                        ui.label(rate(p.churn_rate));
                    });
                    row.col(|ui| {
                        ui.label(rate(p.mean_utilization));
                    });
                    row.col(|ui| {
                        ui.label(mean(p.mean_products));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Retention strategies
// ---------------------------------------------------------------------------

const HIGH_RISK_ACTIONS: &[&str] = &[
    "Proactive outreach by a relationship manager",
    "Personalised retention offers: fee waivers, rate reductions",
    "Product bundle recommendations",
    "Credit limit review for qualified customers",
    "Loyalty programme enrolment with immediate benefits",
];

const MEDIUM_RISK_ACTIONS: &[&str] = &[
    "Regular engagement communications",
    "Targeted cross-selling based on usage patterns",
    "Satisfaction surveys to surface pain points early",
    "Periodic account reviews",
    "Monitor for changes in risk factors",
];

const LOW_RISK_ACTIONS: &[&str] = &[
    "Upsell premium products",
    "Referral programme invitations",
    "Exclusive offers and early access",
    "Long-term loyalty rewards",
];

fn strategy_text(segment: RiskSegment) -> (&'static str, &'static [&'static str]) {
    match segment {
        RiskSegment::High => ("Immediate Intervention", HIGH_RISK_ACTIONS),
        RiskSegment::Medium => ("Preventive Care", MEDIUM_RISK_ACTIONS),
        RiskSegment::Low => ("Retention & Growth", LOW_RISK_ACTIONS),
    }
}

fn retention_strategies(ui: &mut Ui, profiles: &[SegmentProfile]) {
    ui.heading("Data-Driven Retention Strategies");
    for profile in profiles {
        let (title, actions) = strategy_text(profile.segment);
        let header = RichText::new(format!("{} Risk Customers - {title}", profile.segment))
            .color(segment_color(profile.segment))
            .strong();
        egui::CollapsingHeader::new(header)
            .id_salt(("strategy", profile.segment.label()))
            .default_open(profile.segment == RiskSegment::High)
            .show(ui, |ui: &mut Ui| {
                for action in actions {
                    ui.label(format!("• {action}"));
                }
                if profile.count > 0 {
                    ui.add_space(4.0);
                    ui.label(format!(
                        "{} customers · churn {} · utilization {} · products {}",
                        profile.count,
                        rate(profile.churn_rate),
                        rate(profile.mean_utilization),
                        profile
                            .mean_products
                            .map_or_else(|| "n/a".to_string(), |m| format!("{m:.1}")),
                    ));
                }
            });
    }
}
