use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::data::model::{Column, CustomerTable};

// ---------------------------------------------------------------------------
// Group-wise means
// ---------------------------------------------------------------------------

/// Mean of a value column within one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub group: String,
    /// Rows in the group.
    pub count: usize,
    /// `None` when no row in the group carries a numeric value.
    pub mean: Option<f64>,
}

/// Partition rows by `group` and average `value` within each partition.
///
/// Rows without a group value are skipped. Groups come out ordered by key:
/// numeric keys first in numeric order, then the rest lexically. An empty
/// table gives no groups.
pub fn group_mean(table: &CustomerTable, group: Column, value: Column) -> Vec<GroupMean> {
    let mut acc: BTreeMap<String, (usize, f64, usize)> = BTreeMap::new();
    for record in table.iter() {
        let Some(key) = record.value(group).group_key() else {
            continue;
        };
        let (rows, sum, n) = acc.entry(key).or_insert((0, 0.0, 0));
        *rows += 1;
        if let Some(v) = record.value(value).as_f64() {
            *sum += v;
            *n += 1;
        }
    }

    let mut out: Vec<GroupMean> = acc
        .into_iter()
        .map(|(group, (count, sum, n))| GroupMean {
            group,
            count,
            mean: (n > 0).then(|| sum / n as f64),
        })
        .collect();
    out.sort_by(|a, b| compare_keys(&a.group, &b.group));
    out
}

/// Numeric keys in numeric order, then text keys in lexical order.
fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Mean of the numeric values of `column`; `None` for an empty sample.
pub fn mean_of(table: &CustomerTable, column: Column) -> Option<f64> {
    let (sum, n) = table
        .iter()
        .filter_map(|r| r.value(column).as_f64())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

// ---------------------------------------------------------------------------
// Headline numbers
// ---------------------------------------------------------------------------

/// Scalar summary of a (possibly filtered) table.
///
/// Means are `None` when `count == 0`, which keeps "no churners" (`Some(0.0)`)
/// apart from "no sample".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    pub count: usize,
    pub churned: usize,
    pub churn_rate: Option<f64>,
    pub mean_age: Option<f64>,
    pub mean_utilization: Option<f64>,
}

impl SummaryStats {
    pub fn churn_pct(&self) -> Option<f64> {
        self.churn_rate.map(|r| r * 100.0)
    }
}

pub fn summary_stats(table: &CustomerTable) -> SummaryStats {
    SummaryStats {
        count: table.len(),
        churned: table.churned_count(),
        churn_rate: mean_of(table, Column::Churn),
        mean_age: mean_of(table, Column::Age),
        mean_utilization: mean_of(table, Column::AvgUtilizationRatio),
    }
}

// ---------------------------------------------------------------------------
// Box-plot statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxStats {
    pub fn from_values(mut values: Vec<f64>) -> Option<BoxStats> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        Some(BoxStats {
            min: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values[values.len() - 1],
        })
    }
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupBox {
    pub group: String,
    pub count: usize,
    pub stats: BoxStats,
}

/// Five-number summary of `value` per distinct `group` value.
pub fn box_stats(table: &CustomerTable, group: Column, value: Column) -> Vec<GroupBox> {
    let mut acc: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for record in table.iter() {
        let Some(key) = record.value(group).group_key() else {
            continue;
        };
        if let Some(v) = record.value(value).as_f64() {
            acc.entry(key).or_default().push(v);
        }
    }

    let mut out: Vec<GroupBox> = acc
        .into_iter()
        .filter_map(|(group, values)| {
            let count = values.len();
            BoxStats::from_values(values).map(|stats| GroupBox { group, count, stats })
        })
        .collect();
    out.sort_by(|a, b| compare_keys(&a.group, &b.group));
    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::tests::{customer, with_status};
    use crate::data::model::CustomerRecord;

    fn attrited(churn: bool) -> CustomerRecord {
        with_status(if churn { "Attrited Customer" } else { "Existing Customer" })
    }

    #[test]
    fn group_mean_of_empty_table_is_empty() {
        let out = group_mean(&CustomerTable::default(), Column::IncomeCategory, Column::Churn);
        assert!(out.is_empty());
    }

    #[test]
    fn group_mean_averages_churn_within_group() {
        let table = CustomerTable::from_records(
            [true, false, true]
                .into_iter()
                .map(|c| CustomerRecord { card_category: "A".into(), ..attrited(c) })
                .collect(),
        );
        let out = group_mean(&table, Column::CardCategory, Column::Churn);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].group, "A");
        assert_eq!(out[0].count, 3);
        assert!((out[0].mean.unwrap() - 0.667).abs() < 1e-3);
    }

    #[test]
    fn numeric_groups_sort_numerically() {
        let table = CustomerTable::from_records(
            [10, 2, 1, 2]
                .into_iter()
                .map(|p| CustomerRecord { no_of_products: p, ..customer() })
                .collect(),
        );
        let groups: Vec<String> = group_mean(&table, Column::NoOfProducts, Column::Churn)
            .into_iter()
            .map(|g| g.group)
            .collect();
        assert_eq!(groups, vec!["1", "2", "10"]);
    }

    #[test]
    fn mixed_keys_put_numbers_before_text() {
        let table = CustomerTable::from_records(
            ["1a", "10", "66+", "9", "2"]
                .into_iter()
                .map(|b| CustomerRecord { age_bracket: Some(b.to_string()), ..customer() })
                .collect(),
        );
        let groups: Vec<String> = group_mean(&table, Column::AgeBracket, Column::Churn)
            .into_iter()
            .map(|g| g.group)
            .collect();
        assert_eq!(groups, vec!["2", "9", "10", "1a", "66+"]);
    }

    proptest! {
        #[test]
        fn key_order_is_transitive(
            a in "[0-9]{1,2}[a-z]?",
            b in "[0-9]{1,2}[a-z]?",
            c in "[0-9]{1,2}[a-z]?",
        ) {
            if compare_keys(&a, &b).is_le() && compare_keys(&b, &c).is_le() {
                prop_assert!(compare_keys(&a, &c).is_le());
            }
            prop_assert_eq!(compare_keys(&a, &b), compare_keys(&b, &a).reverse());
        }
    }

    #[test]
    fn rows_without_group_value_are_skipped() {
        let table = CustomerTable::from_records(vec![
            CustomerRecord { age_bracket: None, ..attrited(true) },
            CustomerRecord { age_bracket: Some("30-39".into()), ..attrited(false) },
        ]);
        let out = group_mean(&table, Column::AgeBracket, Column::Churn);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].mean, Some(0.0));
    }

    #[test]
    fn summary_of_ten_rows_with_three_attrited() {
        let table = CustomerTable::from_records((0..10).map(|i| attrited(i < 3)).collect());
        let stats = summary_stats(&table);
        assert_eq!(stats.count, 10);
        assert_eq!(stats.churned, 3);
        assert!((stats.churn_rate.unwrap() - 0.3).abs() < 1e-12);
        assert_eq!(stats.mean_age, Some(45.0));
    }

    #[test]
    fn summary_of_empty_table_has_no_means() {
        let stats = summary_stats(&CustomerTable::default());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.churn_rate, None);
        assert_eq!(stats.churn_pct(), None);
        assert_eq!(stats.mean_utilization, None);
    }

    #[test]
    fn no_churners_is_zero_not_undefined() {
        let table = CustomerTable::from_records(vec![attrited(false), attrited(false)]);
        assert_eq!(summary_stats(&table).churn_rate, Some(0.0));
    }

    #[test]
    fn box_stats_interpolate_quartiles() {
        let stats = BoxStats::from_values(vec![5.0, 1.0, 4.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            stats,
            BoxStats { min: 1.0, q1: 2.0, median: 3.0, q3: 4.0, max: 5.0 }
        );
        let even = BoxStats::from_values(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((even.median - 2.5).abs() < 1e-12);
        assert!((even.q1 - 1.75).abs() < 1e-12);
        assert_eq!(BoxStats::from_values(Vec::new()), None);
    }

    #[test]
    fn box_stats_split_by_churn() {
        let table = CustomerTable::from_records(vec![
            CustomerRecord { total_trans_ct: 80, ..attrited(false) },
            CustomerRecord { total_trans_ct: 60, ..attrited(false) },
            CustomerRecord { total_trans_ct: 20, ..attrited(true) },
        ]);
        let out = box_stats(&table, Column::Churn, Column::TotalTransCt);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].group, "0");
        assert_eq!(out[0].count, 2);
        assert_eq!(out[0].stats.median, 70.0);
        assert_eq!(out[1].group, "1");
        assert_eq!(out[1].stats.max, 20.0);
    }
}
