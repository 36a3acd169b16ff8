use std::fmt;

use serde::{Deserialize, Serialize};

use super::aggregate::mean_of;
use crate::data::model::{Column, CustomerRecord, CustomerTable};

// ---------------------------------------------------------------------------
// Risk segment labels
// ---------------------------------------------------------------------------

/// View-time risk label. Not stored on the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskSegment {
    High,
    Medium,
    Low,
}

impl RiskSegment {
    pub const ALL: [RiskSegment; 3] = [RiskSegment::High, RiskSegment::Medium, RiskSegment::Low];

    pub fn label(self) -> &'static str {
        match self {
            RiskSegment::High => "High",
            RiskSegment::Medium => "Medium",
            RiskSegment::Low => "Low",
        }
    }
}

impl fmt::Display for RiskSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Cut-offs for the segmentation rules. All comparisons are strict.
///
/// High risk when ANY of the `high_*` conditions holds; otherwise low risk when
/// ALL of the `low_*` conditions hold; otherwise medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentThresholds {
    /// utilization > this
    pub high_utilization_above: f64,
    /// months inactive > this
    pub high_inactive_months_above: i64,
    /// products < this
    pub high_products_below: i64,
    /// transaction count < this
    pub high_transactions_below: i64,
    /// utilization < this
    pub low_utilization_below: f64,
    /// months inactive < this
    pub low_inactive_months_below: i64,
    /// products > this
    pub low_products_above: i64,
    /// transaction count > this
    pub low_transactions_above: i64,
}

impl Default for SegmentThresholds {
    fn default() -> Self {
        Self {
            high_utilization_above: 0.7,
            high_inactive_months_above: 2,
            high_products_below: 2,
            high_transactions_below: 20,
            low_utilization_below: 0.3,
            low_inactive_months_below: 2,
            low_products_above: 2,
            low_transactions_above: 40,
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SegmentClassifier {
    thresholds: SegmentThresholds,
}

impl SegmentClassifier {
    pub fn new(thresholds: SegmentThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &SegmentThresholds {
        &self.thresholds
    }

    fn is_high(&self, r: &CustomerRecord) -> bool {
        let t = &self.thresholds;
        r.avg_utilization_ratio > t.high_utilization_above
            || r.months_inactive_12_mon > t.high_inactive_months_above
            || r.no_of_products < t.high_products_below
            || r.total_trans_ct < t.high_transactions_below
    }

    fn is_low(&self, r: &CustomerRecord) -> bool {
        let t = &self.thresholds;
        r.avg_utilization_ratio < t.low_utilization_below
            && r.months_inactive_12_mon < t.low_inactive_months_below
            && r.no_of_products > t.low_products_above
            && r.total_trans_ct > t.low_transactions_above
    }

    /// First matching rule wins: High, then Low, else Medium.
    pub fn classify(&self, record: &CustomerRecord) -> RiskSegment {
        if self.is_high(record) {
            RiskSegment::High
        } else if self.is_low(record) {
            RiskSegment::Low
        } else {
            RiskSegment::Medium
        }
    }

    /// One label per row, in table order.
    pub fn classify_table(&self, table: &CustomerTable) -> Vec<RiskSegment> {
        table.iter().map(|r| self.classify(r)).collect()
    }

    pub fn segment_counts(&self, table: &CustomerTable) -> SegmentCounts {
        let mut counts = SegmentCounts::default();
        for record in table.iter() {
            counts.add(self.classify(record));
        }
        counts
    }

    /// Rows of `table` that fall into `segment`.
    pub fn members(&self, table: &CustomerTable, segment: RiskSegment) -> CustomerTable {
        let indices: Vec<usize> = table
            .iter()
            .enumerate()
            .filter(|(_, r)| self.classify(r) == segment)
            .map(|(i, _)| i)
            .collect();
        table.select(&indices)
    }

    /// Per-segment figures, always in High, Medium, Low order.
    pub fn segment_profiles(&self, table: &CustomerTable) -> Vec<SegmentProfile> {
        RiskSegment::ALL
            .into_iter()
            .map(|segment| {
                let members = self.members(table, segment);
                SegmentProfile {
                    segment,
                    count: members.len(),
                    churn_rate: mean_of(&members, Column::Churn),
                    mean_utilization: mean_of(&members, Column::AvgUtilizationRatio),
                    mean_products: mean_of(&members, Column::NoOfProducts),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SegmentCounts {
    fn add(&mut self, segment: RiskSegment) {
        match segment {
            RiskSegment::High => self.high += 1,
            RiskSegment::Medium => self.medium += 1,
            RiskSegment::Low => self.low += 1,
        }
    }

    pub fn get(&self, segment: RiskSegment) -> usize {
        match segment {
            RiskSegment::High => self.high,
            RiskSegment::Medium => self.medium,
            RiskSegment::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Figures for one segment. Means are `None` when the segment is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentProfile {
    pub segment: RiskSegment,
    pub count: usize,
    pub churn_rate: Option<f64>,
    pub mean_utilization: Option<f64>,
    pub mean_products: Option<f64>,
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::tests::customer;

    fn row(utilization: f64, inactive: i64, products: i64, transactions: i64) -> CustomerRecord {
        CustomerRecord {
            avg_utilization_ratio: utilization,
            months_inactive_12_mon: inactive,
            no_of_products: products,
            total_trans_ct: transactions,
            ..customer()
        }
    }

    #[test]
    fn any_high_condition_marks_high() {
        let c = SegmentClassifier::default();
        assert_eq!(c.classify(&row(0.71, 1, 3, 50)), RiskSegment::High);
        assert_eq!(c.classify(&row(0.1, 3, 3, 50)), RiskSegment::High);
        assert_eq!(c.classify(&row(0.1, 1, 1, 50)), RiskSegment::High);
        assert_eq!(c.classify(&row(0.1, 1, 3, 19)), RiskSegment::High);
    }

    #[test]
    fn low_needs_every_condition() {
        let c = SegmentClassifier::default();
        assert_eq!(c.classify(&row(0.69, 1, 3, 41)), RiskSegment::Medium);
        assert_eq!(c.classify(&row(0.29, 1, 3, 41)), RiskSegment::Low);
        assert_eq!(c.classify(&row(0.29, 2, 3, 41)), RiskSegment::Medium);
        assert_eq!(c.classify(&row(0.29, 1, 2, 41)), RiskSegment::Medium);
        assert_eq!(c.classify(&row(0.29, 1, 3, 40)), RiskSegment::Medium);
    }

    #[test]
    fn boundary_values_fall_through_to_next_rule() {
        let c = SegmentClassifier::default();
        // Exactly at the high cut-offs: not high.
        assert_eq!(c.classify(&row(0.70, 1, 3, 41)), RiskSegment::Medium);
        assert_eq!(c.classify(&row(0.5, 2, 2, 20)), RiskSegment::Medium);
        // Exactly at the low cut-offs: not low.
        assert_eq!(c.classify(&row(0.3, 1, 3, 41)), RiskSegment::Medium);
    }

    #[test]
    fn high_takes_priority_over_low() {
        // Low conditions hold except products, which is also a high trigger.
        let c = SegmentClassifier::default();
        assert_eq!(c.classify(&row(0.1, 0, 1, 100)), RiskSegment::High);
    }

    #[test]
    fn thresholds_are_configurable() {
        let c = SegmentClassifier::new(SegmentThresholds {
            high_utilization_above: 0.5,
            ..SegmentThresholds::default()
        });
        assert_eq!(c.classify(&row(0.6, 1, 3, 41)), RiskSegment::High);
        assert_eq!(SegmentClassifier::default().classify(&row(0.6, 1, 3, 41)), RiskSegment::Medium);
    }

    #[test]
    fn thresholds_deserialize_with_defaults() {
        let t: SegmentThresholds = serde_json::from_str(r#"{"low_transactions_above": 60}"#).unwrap();
        assert_eq!(t.low_transactions_above, 60);
        assert_eq!(t.high_utilization_above, 0.7);
    }

    #[test]
    fn counts_and_profiles_cover_every_row() {
        let table = CustomerTable::from_records(vec![
            row(0.9, 1, 3, 50),
            CustomerRecord { customer_status: "Attrited Customer".into(), ..row(0.8, 1, 1, 50) },
            row(0.1, 1, 4, 60),
            row(0.5, 1, 3, 30),
        ]);
        let c = SegmentClassifier::default();

        assert_eq!(
            c.classify_table(&table),
            vec![RiskSegment::High, RiskSegment::High, RiskSegment::Low, RiskSegment::Medium]
        );
        let counts = c.segment_counts(&table);
        assert_eq!(counts, SegmentCounts { high: 2, medium: 1, low: 1 });
        assert_eq!(counts.total(), table.len());

        let profiles = c.segment_profiles(&table);
        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].segment, RiskSegment::High);
        assert_eq!(profiles[0].churn_rate, Some(0.5));
        assert_eq!(profiles[0].mean_products, Some(2.0));
        assert_eq!(profiles[2].count, 1);
    }

    #[test]
    fn profiles_of_empty_table_have_no_means() {
        let profiles = SegmentClassifier::default().segment_profiles(&CustomerTable::default());
        assert!(profiles.iter().all(|p| p.count == 0 && p.churn_rate.is_none()));
    }

    proptest! {
        #[test]
        fn classify_agrees_with_rules(
            utilization in 0.0f64..=1.0,
            inactive in 0i64..7,
            products in 0i64..7,
            transactions in 0i64..150
        ) {
            let record = row(utilization, inactive, products, transactions);
            let high = utilization > 0.7 || inactive > 2 || products < 2 || transactions < 20;
            let low = utilization < 0.3 && inactive < 2 && products > 2 && transactions > 40;
            let expected = if high {
                RiskSegment::High
            } else if low {
                RiskSegment::Low
            } else {
                RiskSegment::Medium
            };
            prop_assert_eq!(SegmentClassifier::default().classify(&record), expected);
        }
    }
}
