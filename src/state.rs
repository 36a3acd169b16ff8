use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::analysis::aggregate::{box_stats, group_mean, summary_stats, GroupBox, GroupMean, SummaryStats};
use crate::analysis::calculator::{calculate, CalculatorInputs, SegmentReport, ValueRange};
use crate::analysis::segment::{SegmentClassifier, SegmentCounts, SegmentProfile};
use crate::config::AppConfig;
use crate::data::filter::{apply, Constraint, FilterSpec};
use crate::data::model::{Column, CustomerTable};

/// Categorical columns offered as multi-select filters in the sidebar.
pub const SIDEBAR_CATEGORIES: [Column; 4] = [
    Column::IncomeCategory,
    Column::MaritalStatus,
    Column::UtilizationCat,
    Column::CardCategory,
];

/// Churn-rate bar charts, by grouping column.
pub const CHURN_BREAKDOWNS: [Column; 4] = [
    Column::IncomeCategory,
    Column::AgeBracket,
    Column::EducationLevel,
    Column::MaritalStatus,
];

/// Behavioural box plots, each split by churn.
pub const BEHAVIOUR_COLUMNS: [Column; 4] = [
    Column::AvgUtilizationRatio,
    Column::MonthsInactive,
    Column::TotalTransCt,
    Column::NoOfProducts,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    ChurnOverview,
    Demographics,
    Behaviour,
    Calculator,
    Report,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::ChurnOverview,
        Tab::Demographics,
        Tab::Behaviour,
        Tab::Calculator,
        Tab::Report,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::ChurnOverview => "Churn Overview",
            Tab::Demographics => "Demographic Analysis",
            Tab::Behaviour => "Behavioral Patterns",
            Tab::Calculator => "Churn Calculator",
            Tab::Report => "Report",
        }
    }
}

// ---------------------------------------------------------------------------
// Derived view of the sidebar-filtered table
// ---------------------------------------------------------------------------

/// Everything the dashboard draws, recomputed in one pass per filter change.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub filtered: CustomerTable,
    pub summary: SummaryStats,
    pub churn_by: Vec<(Column, Vec<GroupMean>)>,
    pub behaviour: Vec<(Column, Vec<GroupBox>)>,
    pub segments: SegmentCounts,
    pub profiles: Vec<SegmentProfile>,
}

impl DashboardView {
    pub fn compute(base: &CustomerTable, spec: &FilterSpec, classifier: &SegmentClassifier) -> Self {
        let filtered = apply(base, spec);
        let churn_by = CHURN_BREAKDOWNS
            .iter()
            .map(|&column| (column, group_mean(&filtered, column, Column::Churn)))
            .collect();
        let behaviour = BEHAVIOUR_COLUMNS
            .iter()
            .map(|&column| (column, box_stats(&filtered, Column::Churn, column)))
            .collect();
        DashboardView {
            summary: summary_stats(&filtered),
            churn_by,
            behaviour,
            segments: classifier.segment_counts(&filtered),
            profiles: classifier.segment_profiles(&filtered),
            filtered,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full per-session UI state, independent of rendering.
///
/// Only `base` is shared; every derived table lives here.
pub struct AppState {
    pub base: Arc<CustomerTable>,
    pub base_summary: SummaryStats,
    pub classifier: SegmentClassifier,

    /// Full age span of the base table, for the sidebar slider.
    pub age_bounds: ValueRange,
    pub age_range: ValueRange,
    /// Per-column selected values for [`SIDEBAR_CATEGORIES`].
    pub selections: BTreeMap<Column, BTreeSet<String>>,

    pub view: DashboardView,

    pub calculator: CalculatorInputs,
    pub calculator_report: Option<SegmentReport>,

    pub tab: Tab,
    pub report_url: Option<String>,
}

impl AppState {
    pub fn new(base: Arc<CustomerTable>, config: &AppConfig) -> Self {
        let classifier = SegmentClassifier::new(config.thresholds.clone());
        let (lo, hi) = base.numeric_bounds(Column::Age).unwrap_or((0.0, 0.0));
        let age_bounds = ValueRange::new(lo, hi);
        let selections: BTreeMap<Column, BTreeSet<String>> = SIDEBAR_CATEGORIES
            .iter()
            .map(|&column| (column, base.unique_values(column)))
            .collect();
        let spec = sidebar_spec(&base, age_bounds, &selections);

        Self {
            view: DashboardView::compute(&base, &spec, &classifier),
            base_summary: summary_stats(&base),
            calculator: CalculatorInputs::spanning(&base),
            base,
            classifier,
            age_bounds,
            age_range: age_bounds,
            selections,
            calculator_report: None,
            tab: Tab::default(),
            report_url: config.report_url.clone(),
        }
    }

    pub fn sidebar_spec(&self) -> FilterSpec {
        sidebar_spec(&self.base, self.age_range, &self.selections)
    }

    /// Recompute the dashboard view after a filter change.
    pub fn refilter(&mut self) {
        self.view = DashboardView::compute(&self.base, &self.sidebar_spec(), &self.classifier);
    }

    pub fn set_age_range(&mut self, range: ValueRange) {
        self.age_range = range;
        self.refilter();
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: Column, value: &str) {
        let selected = self.selections.entry(column).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: Column) {
        self.selections.insert(column, self.base.unique_values(column));
        self.refilter();
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: Column) {
        self.selections.insert(column, BTreeSet::new());
        self.refilter();
    }

    /// Run the what-if calculator against the unfiltered base table.
    pub fn run_calculator(&mut self) {
        self.calculator_report = Some(calculate(&self.base, &self.calculator));
    }

    /// Replace the calculator inputs. A changed input discards the last report,
    /// which described the previous segment.
    pub fn set_calculator_inputs(&mut self, inputs: CalculatorInputs) {
        if inputs != self.calculator {
            self.calculator = inputs;
            self.calculator_report = None;
        }
    }

    pub fn reset_calculator(&mut self) {
        self.calculator = CalculatorInputs::spanning(&self.base);
        self.calculator_report = None;
    }
}

/// The sidebar selections as a filter specification.
///
/// A column with every value selected is left unconstrained, so rows with a
/// blank optional value stay visible until the user narrows that column.
fn sidebar_spec(
    base: &CustomerTable,
    age_range: ValueRange,
    selections: &BTreeMap<Column, BTreeSet<String>>,
) -> FilterSpec {
    let mut spec = FilterSpec::new().with_range(Column::Age, age_range.min, age_range.max);
    for (&column, selected) in selections {
        if *selected == base.unique_values(column) {
            continue;
        }
        spec.set(column, Constraint::OneOf(selected.clone()));
    }
    spec
}
