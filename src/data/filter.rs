use std::collections::{BTreeMap, BTreeSet};

use super::model::{Cell, Column, CustomerRecord, CustomerTable};

// ---------------------------------------------------------------------------
// Constraint: what a single column must satisfy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Inclusive on both ends. `min > max` admits nothing.
    Range { min: f64, max: f64 },
    /// Categorical membership. An empty set admits nothing.
    OneOf(BTreeSet<String>),
}

impl Constraint {
    pub fn range(min: f64, max: f64) -> Self {
        Constraint::Range { min, max }
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// A range only admits numbers and a set only admits text; missing values never pass.
    pub fn admits(&self, cell: Cell<'_>) -> bool {
        match (self, cell) {
            (Constraint::Range { min, max }, Cell::Number(v)) => *min <= v && v <= *max,
            (Constraint::OneOf(allowed), Cell::Text(s)) => allowed.contains(s),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSpec: per-column constraints combined with AND
// ---------------------------------------------------------------------------

/// Columns absent from the spec are unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    constraints: BTreeMap<Column, Constraint>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: Column, constraint: Constraint) -> Self {
        self.set(column, constraint);
        self
    }

    pub fn with_range(self, column: Column, min: f64, max: f64) -> Self {
        self.with(column, Constraint::range(min, max))
    }

    pub fn with_members<I, S>(self, column: Column, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(column, Constraint::one_of(values))
    }

    /// Replace any existing constraint on `column`.
    pub fn set(&mut self, column: Column, constraint: Constraint) {
        self.constraints.insert(column, constraint);
    }

    pub fn remove(&mut self, column: Column) -> Option<Constraint> {
        self.constraints.remove(&column)
    }

    pub fn get(&self, column: Column) -> Option<&Constraint> {
        self.constraints.get(&column)
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &Constraint)> {
        self.constraints.iter().map(|(c, k)| (*c, k))
    }

    pub fn matches(&self, record: &CustomerRecord) -> bool {
        self.constraints
            .iter()
            .all(|(column, constraint)| constraint.admits(record.value(*column)))
    }
}

/// Return indices of rows that pass every constraint, in table order.
pub fn matching_indices(table: &CustomerTable, spec: &FilterSpec) -> Vec<usize> {
    table
        .iter()
        .enumerate()
        .filter(|(_, record)| spec.matches(record))
        .map(|(i, _)| i)
        .collect()
}

/// Produce the subset of `table` satisfying `spec`. The input is left untouched;
/// an empty result is a normal outcome.
pub fn apply(table: &CustomerTable, spec: &FilterSpec) -> CustomerTable {
    if spec.is_empty() {
        return table.clone();
    }
    let indices = matching_indices(table, spec);
    log::debug!("filter kept {} of {} rows", indices.len(), table.len());
    table.select(&indices)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::tests::customer;

    fn sample_table() -> CustomerTable {
        CustomerTable::from_records(vec![
            CustomerRecord { age: 25, card_category: "Blue".into(), ..customer() },
            CustomerRecord { age: 40, card_category: "Gold".into(), ..customer() },
            CustomerRecord { age: 55, card_category: "Blue".into(), ..customer() },
            CustomerRecord { age: 70, card_category: "Silver".into(), ..customer() },
        ])
    }

    fn ages(table: &CustomerTable) -> Vec<i64> {
        table.iter().map(|r| r.age).collect()
    }

    #[test]
    fn empty_spec_keeps_every_row() {
        let table = sample_table();
        assert_eq!(apply(&table, &FilterSpec::new()), table);
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let spec = FilterSpec::new().with_range(Column::Age, 40.0, 55.0);
        assert_eq!(ages(&apply(&sample_table(), &spec)), vec![40, 55]);
    }

    #[test]
    fn inverted_range_yields_no_rows() {
        let spec = FilterSpec::new().with_range(Column::Age, 99.0, 18.0);
        let out = apply(&sample_table(), &spec);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_member_set_yields_no_rows() {
        let spec = FilterSpec::new().with_members(Column::CardCategory, Vec::<String>::new());
        assert!(apply(&sample_table(), &spec).is_empty());
    }

    #[test]
    fn unknown_category_yields_no_rows() {
        let spec = FilterSpec::new().with_members(Column::CardCategory, ["Platinum"]);
        assert!(apply(&sample_table(), &spec).is_empty());
    }

    #[test]
    fn constraints_combine_conjunctively_and_keep_order() {
        let spec = FilterSpec::new()
            .with_members(Column::CardCategory, ["Blue", "Silver"])
            .with_range(Column::Age, 30.0, 100.0);
        assert_eq!(matching_indices(&sample_table(), &spec), vec![2, 3]);
        assert_eq!(ages(&apply(&sample_table(), &spec)), vec![55, 70]);
    }

    #[test]
    fn mismatched_constraint_kind_never_matches() {
        let table = sample_table();
        let on_text = FilterSpec::new().with_range(Column::CardCategory, 0.0, 100.0);
        let on_number = FilterSpec::new().with_members(Column::Age, ["25"]);
        assert!(apply(&table, &on_text).is_empty());
        assert!(apply(&table, &on_number).is_empty());
    }

    #[test]
    fn missing_optional_value_fails_membership() {
        let table = CustomerTable::from_records(vec![
            CustomerRecord { education_level: None, ..customer() },
            customer(),
        ]);
        let spec = FilterSpec::new().with_members(Column::EducationLevel, ["Graduate"]);
        assert_eq!(matching_indices(&table, &spec), vec![1]);
    }

    #[test]
    fn churn_column_filters_as_zero_one() {
        let table = CustomerTable::from_records(vec![
            customer(),
            CustomerRecord { customer_status: "Attrited Customer".into(), ..customer() },
        ]);
        let spec = FilterSpec::new().with_range(Column::Churn, 1.0, 1.0);
        assert_eq!(matching_indices(&table, &spec), vec![1]);
    }

    #[test]
    fn apply_does_not_mutate_input() {
        let table = sample_table();
        let before = table.clone();
        let _ = apply(&table, &FilterSpec::new().with_range(Column::Age, 0.0, 30.0));
        assert_eq!(table, before);
    }

    fn record_strategy() -> impl Strategy<Value = CustomerRecord> {
        (
            18i64..80,
            prop::sample::select(vec!["Blue", "Gold", "Silver"]),
            prop::bool::ANY,
        )
            .prop_map(|(age, card, attrited)| CustomerRecord {
                age,
                card_category: card.to_string(),
                customer_status: if attrited { "Attrited Customer" } else { "Existing Customer" }
                    .to_string(),
                ..customer()
            })
    }

    fn spec_strategy() -> impl Strategy<Value = FilterSpec> {
        (
            prop::option::of((0i64..100, 0i64..100)),
            prop::option::of(prop::collection::btree_set(
                prop::sample::select(vec!["Blue", "Gold", "Silver", "Platinum"]),
                0..3,
            )),
        )
            .prop_map(|(age, cards)| {
                let mut spec = FilterSpec::new();
                if let Some((lo, hi)) = age {
                    spec.set(Column::Age, Constraint::range(lo as f64, hi as f64));
                }
                if let Some(cards) = cards {
                    spec.set(Column::CardCategory, Constraint::one_of(cards));
                }
                spec
            })
    }

    proptest! {
        #[test]
        fn apply_is_idempotent(
            records in prop::collection::vec(record_strategy(), 0..40),
            spec in spec_strategy()
        ) {
            let table = CustomerTable::from_records(records);
            let once = apply(&table, &spec);
            let twice = apply(&once, &spec);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.iter().all(|r| spec.matches(r)));
        }
    }
}
