use crate::data::filter::{apply, FilterSpec};
use crate::data::model::{Column, CustomerTable};

/// Distance from the overall churn rate, in percentage points, inside which a
/// segment counts as average risk.
pub const RISK_BAND_WIDTH_PP: f64 = 5.0;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenderChoice {
    #[default]
    All,
    Male,
    Female,
}

impl GenderChoice {
    pub const ALL: [GenderChoice; 3] = [GenderChoice::All, GenderChoice::Male, GenderChoice::Female];

    pub fn label(self) -> &'static str {
        match self {
            GenderChoice::All => "All",
            GenderChoice::Male => "Male",
            GenderChoice::Female => "Female",
        }
    }

    /// Value stored in the `gender` column, `None` for no constraint.
    pub fn stored_value(self) -> Option<&'static str> {
        match self {
            GenderChoice::All => None,
            GenderChoice::Male => Some("M"),
            GenderChoice::Female => Some("F"),
        }
    }
}

/// Inclusive `[min, max]` slider value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// The what-if segment definition, independent of the sidebar filters.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorInputs {
    pub utilization: ValueRange,
    pub months_inactive: ValueRange,
    pub contacts: ValueRange,
    pub products: ValueRange,
    pub transaction_count: ValueRange,
    pub transaction_amount: ValueRange,
    pub age: ValueRange,
    pub credit_limit: ValueRange,
    pub gender: GenderChoice,
}

impl CalculatorInputs {
    /// Ranges covering every row of `table`. Utilization always spans [0, 1].
    pub fn spanning(table: &CustomerTable) -> Self {
        let bounds = |column: Column| {
            let (min, max) = table.numeric_bounds(column).unwrap_or((0.0, 0.0));
            ValueRange::new(min, max)
        };
        Self {
            utilization: ValueRange::new(0.0, 1.0),
            months_inactive: bounds(Column::MonthsInactive),
            contacts: bounds(Column::ContactsCount),
            products: bounds(Column::NoOfProducts),
            transaction_count: bounds(Column::TotalTransCt),
            transaction_amount: bounds(Column::TotalTransAmt),
            age: bounds(Column::Age),
            credit_limit: bounds(Column::CreditLimit),
            gender: GenderChoice::All,
        }
    }

    pub fn ranges(&self) -> [(Column, ValueRange); 8] {
        [
            (Column::AvgUtilizationRatio, self.utilization),
            (Column::MonthsInactive, self.months_inactive),
            (Column::ContactsCount, self.contacts),
            (Column::NoOfProducts, self.products),
            (Column::TotalTransCt, self.transaction_count),
            (Column::TotalTransAmt, self.transaction_amount),
            (Column::Age, self.age),
            (Column::CreditLimit, self.credit_limit),
        ]
    }

    pub fn ranges_mut(&mut self) -> [(Column, &mut ValueRange); 8] {
        [
            (Column::AvgUtilizationRatio, &mut self.utilization),
            (Column::MonthsInactive, &mut self.months_inactive),
            (Column::ContactsCount, &mut self.contacts),
            (Column::NoOfProducts, &mut self.products),
            (Column::TotalTransCt, &mut self.transaction_count),
            (Column::TotalTransAmt, &mut self.transaction_amount),
            (Column::Age, &mut self.age),
            (Column::CreditLimit, &mut self.credit_limit),
        ]
    }

    pub fn to_filter_spec(&self) -> FilterSpec {
        let mut spec = self
            .ranges()
            .into_iter()
            .fold(FilterSpec::new(), |spec, (column, r)| spec.with_range(column, r.min, r.max));
        if let Some(gender) = self.gender.stored_value() {
            spec = spec.with_members(Column::Gender, [gender]);
        }
        spec
    }

    /// One line per applied constraint, e.g. `"Age: 26 to 73"`.
    pub fn applied_filters(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .ranges()
            .into_iter()
            .map(|(column, r)| format!("{}: {} to {}", column.label(), r.min, r.max))
            .collect();
        if self.gender != GenderChoice::All {
            lines.push(format!("Gender: {}", self.gender.label()));
        }
        lines
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    BelowAverage,
    Average,
    AboveAverage,
}

impl RiskBand {
    /// Band a segment churn percentage against the overall percentage.
    pub fn classify(segment_pct: f64, overall_pct: f64) -> RiskBand {
        if segment_pct < overall_pct - RISK_BAND_WIDTH_PP {
            RiskBand::BelowAverage
        } else if segment_pct > overall_pct + RISK_BAND_WIDTH_PP {
            RiskBand::AboveAverage
        } else {
            RiskBand::Average
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskBand::BelowAverage => "Below Average Risk",
            RiskBand::Average => "Average Risk",
            RiskBand::AboveAverage => "Above Average Risk",
        }
    }
}

/// Outcome of a calculator run. Percentages are 0–100; `None` where the
/// denominator is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentReport {
    pub segment_size: usize,
    pub total_customers: usize,
    pub churn_count: usize,
    pub churn_pct: Option<f64>,
    pub overall_churn_pct: Option<f64>,
    pub share_of_total_pct: Option<f64>,
    pub band: Option<RiskBand>,
    /// `applied_filters()` of the inputs this report was computed from.
    pub filters: Vec<String>,
}

impl SegmentReport {
    pub fn is_empty(&self) -> bool {
        self.segment_size == 0
    }

    /// Segment churn minus overall churn, in percentage points.
    pub fn diff_vs_overall(&self) -> Option<f64> {
        Some(self.churn_pct? - self.overall_churn_pct?)
    }
}

fn pct(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| part as f64 * 100.0 / whole as f64)
}

/// Apply `inputs` to the unfiltered `base` table and compare the segment's
/// churn against the whole population.
pub fn calculate(base: &CustomerTable, inputs: &CalculatorInputs) -> SegmentReport {
    let segment = apply(base, &inputs.to_filter_spec());

    let total_customers = base.len();
    let segment_size = segment.len();
    let churn_count = segment.churned_count();
    let churn_pct = pct(churn_count, segment_size);
    let overall_churn_pct = pct(base.churned_count(), total_customers);
    let band = churn_pct
        .zip(overall_churn_pct)
        .map(|(segment_pct, overall_pct)| RiskBand::classify(segment_pct, overall_pct));

    log::debug!(
        "calculator segment: {segment_size} of {total_customers} rows, churn {churn_pct:?}%, band {band:?}"
    );

    SegmentReport {
        segment_size,
        total_customers,
        churn_count,
        churn_pct,
        overall_churn_pct,
        share_of_total_pct: pct(segment_size, total_customers),
        band,
        filters: inputs.applied_filters(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::customer;
    use crate::data::model::CustomerRecord;

    /// 10 men (3 attrited) and 10 women (none attrited): overall 15%.
    fn base() -> CustomerTable {
        let mut records = Vec::new();
        for i in 0..10 {
            records.push(CustomerRecord {
                gender: "M".into(),
                age: 30 + i,
                customer_status: if i < 3 { "Attrited Customer" } else { "Existing Customer" }.into(),
                ..customer()
            });
        }
        for i in 0..10 {
            records.push(CustomerRecord {
                gender: "F".into(),
                age: 50 + i,
                ..customer()
            });
        }
        CustomerTable::from_records(records)
    }

    #[test]
    fn band_uses_five_point_margin() {
        assert_eq!(RiskBand::classify(22.0, 16.0), RiskBand::AboveAverage);
        assert_eq!(RiskBand::classify(10.0, 16.0), RiskBand::BelowAverage);
        assert_eq!(RiskBand::classify(20.0, 16.0), RiskBand::Average);
        assert_eq!(RiskBand::classify(21.0, 16.0), RiskBand::Average);
        assert_eq!(RiskBand::classify(11.0, 16.0), RiskBand::Average);
    }

    #[test]
    fn spanning_inputs_select_everyone() {
        let table = base();
        let inputs = CalculatorInputs::spanning(&table);
        assert_eq!(inputs.age, ValueRange::new(30.0, 59.0));
        assert_eq!(inputs.utilization, ValueRange::new(0.0, 1.0));

        let report = calculate(&table, &inputs);
        assert_eq!(report.segment_size, 20);
        assert_eq!(report.share_of_total_pct, Some(100.0));
        assert_eq!(report.churn_pct, Some(15.0));
        assert_eq!(report.band, Some(RiskBand::Average));
        assert_eq!(report.diff_vs_overall(), Some(0.0));
    }

    #[test]
    fn gender_choice_maps_to_stored_codes() {
        let table = base();
        let mut inputs = CalculatorInputs::spanning(&table);

        inputs.gender = GenderChoice::Male;
        let men = calculate(&table, &inputs);
        assert_eq!(men.segment_size, 10);
        assert_eq!(men.churn_count, 3);
        assert_eq!(men.churn_pct, Some(30.0));
        assert_eq!(men.band, Some(RiskBand::AboveAverage));

        inputs.gender = GenderChoice::Female;
        let women = calculate(&table, &inputs);
        assert_eq!(women.churn_pct, Some(0.0));
        assert_eq!(women.band, Some(RiskBand::BelowAverage));
    }

    #[test]
    fn empty_segment_has_no_rate_or_band() {
        let table = base();
        let mut inputs = CalculatorInputs::spanning(&table);
        inputs.age = ValueRange::new(99.0, 18.0);

        let report = calculate(&table, &inputs);
        assert!(report.is_empty());
        assert_eq!(report.churn_pct, None);
        assert_eq!(report.band, None);
        assert_eq!(report.overall_churn_pct, Some(15.0));
        assert_eq!(report.share_of_total_pct, Some(0.0));
    }

    #[test]
    fn narrow_age_range_isolates_attrited_men() {
        let table = base();
        let mut inputs = CalculatorInputs::spanning(&table);
        inputs.age = ValueRange::new(30.0, 32.0);
        let report = calculate(&table, &inputs);
        assert_eq!(report.segment_size, 3);
        assert_eq!(report.churn_pct, Some(100.0));
    }

    #[test]
    fn applied_filters_list_gender_only_when_set() {
        let mut inputs = CalculatorInputs::spanning(&base());
        assert_eq!(inputs.applied_filters().len(), 8);
        assert!(inputs.applied_filters().contains(&"Age: 30 to 59".to_string()));
        inputs.gender = GenderChoice::Female;
        assert_eq!(inputs.applied_filters().last().map(String::as_str), Some("Gender: Female"));
    }
}
