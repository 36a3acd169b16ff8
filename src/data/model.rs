use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Status value that marks a customer as churned.
pub const ATTRITED_STATUS: &str = "Attrited Customer";

// ---------------------------------------------------------------------------
// Column – every addressable field of a customer row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// A named column of the customer table.
///
/// `Churn` is derived from `CustomerStatus` and reads as 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    CustomerStatus,
    Age,
    Gender,
    EducationLevel,
    MaritalStatus,
    IncomeCategory,
    CardCategory,
    AgeBracket,
    UtilizationCat,
    NoOfProducts,
    MonthsInactive,
    ContactsCount,
    CreditLimit,
    TotalTransAmt,
    TotalTransCt,
    AvgUtilizationRatio,
    Churn,
}

impl Column {
    pub const ALL: [Column; 17] = [
        Column::CustomerStatus,
        Column::Age,
        Column::Gender,
        Column::EducationLevel,
        Column::MaritalStatus,
        Column::IncomeCategory,
        Column::CardCategory,
        Column::AgeBracket,
        Column::UtilizationCat,
        Column::NoOfProducts,
        Column::MonthsInactive,
        Column::ContactsCount,
        Column::CreditLimit,
        Column::TotalTransAmt,
        Column::TotalTransCt,
        Column::AvgUtilizationRatio,
        Column::Churn,
    ];

    /// Columns the source file must carry.
    pub const REQUIRED: [Column; 13] = [
        Column::CustomerStatus,
        Column::Age,
        Column::Gender,
        Column::MaritalStatus,
        Column::IncomeCategory,
        Column::CardCategory,
        Column::NoOfProducts,
        Column::MonthsInactive,
        Column::ContactsCount,
        Column::CreditLimit,
        Column::TotalTransAmt,
        Column::TotalTransCt,
        Column::AvgUtilizationRatio,
    ];

    /// Header name in the source file.
    pub fn name(self) -> &'static str {
        match self {
            Column::CustomerStatus => "customer_status",
            Column::Age => "age",
            Column::Gender => "gender",
            Column::EducationLevel => "education_level",
            Column::MaritalStatus => "marital_status",
            Column::IncomeCategory => "income_category",
            Column::CardCategory => "card_category",
            Column::AgeBracket => "age_bracket",
            Column::UtilizationCat => "utilization_cat",
            Column::NoOfProducts => "no_of_products",
            Column::MonthsInactive => "months_inactive_12_mon",
            Column::ContactsCount => "contacts_count_12_mon",
            Column::CreditLimit => "credit_limit",
            Column::TotalTransAmt => "total_trans_amt",
            Column::TotalTransCt => "total_trans_ct",
            Column::AvgUtilizationRatio => "avg_utilization_ratio",
            Column::Churn => "churn",
        }
    }

    /// Human-readable label for widgets and chart titles.
    pub fn label(self) -> &'static str {
        match self {
            Column::CustomerStatus => "Customer Status",
            Column::Age => "Age",
            Column::Gender => "Gender",
            Column::EducationLevel => "Education Level",
            Column::MaritalStatus => "Marital Status",
            Column::IncomeCategory => "Income Category",
            Column::CardCategory => "Card Category",
            Column::AgeBracket => "Age Bracket",
            Column::UtilizationCat => "Utilization Category",
            Column::NoOfProducts => "Number of Products",
            Column::MonthsInactive => "Months Inactive (12 months)",
            Column::ContactsCount => "Contacts Count (12 months)",
            Column::CreditLimit => "Credit Limit ($)",
            Column::TotalTransAmt => "Total Transaction Amount ($)",
            Column::TotalTransCt => "Transaction Count",
            Column::AvgUtilizationRatio => "Average Utilization Ratio",
            Column::Churn => "Churn",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::CustomerStatus
            | Column::Gender
            | Column::EducationLevel
            | Column::MaritalStatus
            | Column::IncomeCategory
            | Column::CardCategory
            | Column::AgeBracket
            | Column::UtilizationCat => ColumnKind::Categorical,
            _ => ColumnKind::Numeric,
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Cell – a borrowed view of one value in a row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

impl<'a> Cell<'a> {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Cell::Text(s) => Some(*s),
            _ => None,
        }
    }

    /// Key used when partitioning rows by this value. Missing values form no group.
    pub fn group_key(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some((*s).to_string()),
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => Some(format!("{}", *v as i64)),
            Cell::Number(v) => Some(format!("{v}")),
            Cell::Missing => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CustomerRecord – one row of the source table
// ---------------------------------------------------------------------------

/// One bank customer. Field names match the source headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_status: String,
    pub age: i64,
    pub gender: String,
    #[serde(default)]
    pub education_level: Option<String>,
    pub marital_status: String,
    pub income_category: String,
    pub card_category: String,
    pub no_of_products: i64,
    pub months_inactive_12_mon: i64,
    pub contacts_count_12_mon: i64,
    pub credit_limit: f64,
    pub total_trans_amt: f64,
    pub total_trans_ct: i64,
    pub avg_utilization_ratio: f64,
    #[serde(default)]
    pub utilization_cat: Option<String>,
    #[serde(default)]
    pub age_bracket: Option<String>,
}

impl CustomerRecord {
    /// Whether this customer has churned. Derived from the status alone.
    pub fn churn(&self) -> bool {
        self.customer_status == ATTRITED_STATUS
    }

    pub fn value(&self, column: Column) -> Cell<'_> {
        fn text(s: &Option<String>) -> Cell<'_> {
            s.as_deref().map_or(Cell::Missing, Cell::Text)
        }
        match column {
            Column::CustomerStatus => Cell::Text(&self.customer_status),
            Column::Age => Cell::Number(self.age as f64),
            Column::Gender => Cell::Text(&self.gender),
            Column::EducationLevel => text(&self.education_level),
            Column::MaritalStatus => Cell::Text(&self.marital_status),
            Column::IncomeCategory => Cell::Text(&self.income_category),
            Column::CardCategory => Cell::Text(&self.card_category),
            Column::AgeBracket => text(&self.age_bracket),
            Column::UtilizationCat => text(&self.utilization_cat),
            Column::NoOfProducts => Cell::Number(self.no_of_products as f64),
            Column::MonthsInactive => Cell::Number(self.months_inactive_12_mon as f64),
            Column::ContactsCount => Cell::Number(self.contacts_count_12_mon as f64),
            Column::CreditLimit => Cell::Number(self.credit_limit),
            Column::TotalTransAmt => Cell::Number(self.total_trans_amt),
            Column::TotalTransCt => Cell::Number(self.total_trans_ct as f64),
            Column::AvgUtilizationRatio => Cell::Number(self.avg_utilization_ratio),
            Column::Churn => Cell::Number(if self.churn() { 1.0 } else { 0.0 }),
        }
    }
}

// ---------------------------------------------------------------------------
// CustomerTable – an immutable set of rows
// ---------------------------------------------------------------------------

/// Loaded (or filtered) customer rows with pre-computed category indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerTable {
    records: Vec<CustomerRecord>,
    /// For each categorical column the sorted set of values present.
    unique_values: BTreeMap<Column, BTreeSet<String>>,
}

impl CustomerTable {
    pub fn from_records(records: Vec<CustomerRecord>) -> Self {
        let mut unique_values: BTreeMap<Column, BTreeSet<String>> = BTreeMap::new();
        for column in Column::ALL {
            if column.kind() != ColumnKind::Categorical {
                continue;
            }
            let values: BTreeSet<String> = records
                .iter()
                .filter_map(|r| r.value(column).as_str().map(str::to_string))
                .collect();
            if !values.is_empty() {
                unique_values.insert(column, values);
            }
        }
        CustomerTable {
            records,
            unique_values,
        }
    }

    /// Build a new table from the rows at `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> CustomerTable {
        CustomerTable::from_records(indices.iter().map(|&i| self.records[i].clone()).collect())
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CustomerRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn churned_count(&self) -> usize {
        self.records.iter().filter(|r| r.churn()).count()
    }

    /// Distinct values of a categorical column (empty for numeric or absent columns).
    pub fn unique_values(&self, column: Column) -> BTreeSet<String> {
        self.unique_values.get(&column).cloned().unwrap_or_default()
    }

    /// `(min, max)` of a numeric column, `None` when the table is empty.
    pub fn numeric_bounds(&self, column: Column) -> Option<(f64, f64)> {
        self.records
            .iter()
            .filter_map(|r| r.value(column).as_f64())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A medium-risk, retained customer; tests override the fields they care about.
    pub(crate) fn customer() -> CustomerRecord {
        CustomerRecord {
            customer_status: "Existing Customer".to_string(),
            age: 45,
            gender: "F".to_string(),
            education_level: Some("Graduate".to_string()),
            marital_status: "Married".to_string(),
            income_category: "$40K - $60K".to_string(),
            card_category: "Blue".to_string(),
            no_of_products: 3,
            months_inactive_12_mon: 2,
            contacts_count_12_mon: 2,
            credit_limit: 5000.0,
            total_trans_amt: 4000.0,
            total_trans_ct: 60,
            avg_utilization_ratio: 0.5,
            utilization_cat: Some("Medium".to_string()),
            age_bracket: Some("40-49".to_string()),
        }
    }

    pub(crate) fn with_status(status: &str) -> CustomerRecord {
        CustomerRecord {
            customer_status: status.to_string(),
            ..customer()
        }
    }

    #[test]
    fn churn_follows_status() {
        for status in ["Existing Customer", "Attrited Customer", "attrited customer", ""] {
            let record = with_status(status);
            assert_eq!(record.churn(), status == ATTRITED_STATUS, "status {status:?}");
            let expected = if status == ATTRITED_STATUS { 1.0 } else { 0.0 };
            assert_eq!(record.value(Column::Churn), Cell::Number(expected));
        }
    }

    #[test]
    fn column_names_round_trip() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.name()), Some(column));
        }
        assert_eq!(Column::from_name("clientnum"), None);
    }

    #[test]
    fn missing_optional_values_read_as_missing() {
        let record = CustomerRecord {
            education_level: None,
            ..customer()
        };
        assert_eq!(record.value(Column::EducationLevel), Cell::Missing);
        assert_eq!(record.value(Column::EducationLevel).group_key(), None);
    }

    #[test]
    fn numeric_group_keys_drop_trailing_zero() {
        assert_eq!(Cell::Number(3.0).group_key().as_deref(), Some("3"));
        assert_eq!(Cell::Number(0.25).group_key().as_deref(), Some("0.25"));
    }

    #[test]
    fn table_indexes_categories_and_bounds() {
        let table = CustomerTable::from_records(vec![
            CustomerRecord { age: 30, card_category: "Gold".into(), ..customer() },
            CustomerRecord { age: 60, ..customer() },
        ]);
        assert_eq!(
            table.unique_values(Column::CardCategory).into_iter().collect::<Vec<_>>(),
            vec!["Blue".to_string(), "Gold".to_string()]
        );
        assert!(table.unique_values(Column::Age).is_empty());
        assert_eq!(table.numeric_bounds(Column::Age), Some((30.0, 60.0)));
        assert_eq!(CustomerTable::default().numeric_bounds(Column::Age), None);
    }
}
