use crate::types::{Record, Schema};
use std::collections::BTreeSet;

/// One inclusion set per filterable dimension.
///
/// An empty set means "no constraint on that dimension". This mirrors the
/// dashboard multiselects, where clearing a selection widens the result to
/// everything instead of matching nothing.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub years: Vec<i32>,
    pub operators: Vec<String>,
    pub packages: Vec<String>,
    pub departments: Vec<String>,
}

/// Apply the selection as a conjunction of membership tests and return the
/// matching view, or `None` when the combination matches nothing. Callers
/// must treat `None` as "no data for this combination" and skip aggregation.
///
/// Package and department constraints are ignored outright when the loaded
/// file does not carry the column.
pub fn apply_filters<'a>(
    records: &'a [Record],
    schema: &Schema,
    sel: &FilterSelection,
) -> Option<Vec<&'a Record>> {
    let rows: Vec<&Record> = records
        .iter()
        .filter(|r| sel.years.is_empty() || sel.years.contains(&r.year))
        .filter(|r| matches_set(&sel.operators, r.operator.as_deref()))
        .filter(|r| !schema.has_package || matches_set(&sel.packages, r.package.as_deref()))
        .filter(|r| !schema.has_department || matches_set(&sel.departments, r.department.as_deref()))
        .collect();
    if rows.is_empty() {
        None
    } else {
        Some(rows)
    }
}

fn matches_set(selection: &[String], value: Option<&str>) -> bool {
    if selection.is_empty() {
        return true;
    }
    // A row with no value on the dimension cannot match an applied filter.
    value.is_some_and(|v| selection.iter().any(|s| s == v))
}

pub fn available_years(records: &[Record]) -> Vec<i32> {
    let mut years: Vec<i32> = records.iter().map(|r| r.year).collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// Sorted distinct non-null operators, for selection prompts.
pub fn available_operators(records: &[Record]) -> Vec<String> {
    let set: BTreeSet<&str> = records.iter().filter_map(|r| r.operator.as_deref()).collect();
    set.into_iter().map(str::to_string).collect()
}

pub fn available_packages(records: &[Record]) -> Vec<String> {
    let set: BTreeSet<&str> = records.iter().filter_map(|r| r.package.as_deref()).collect();
    set.into_iter().map(str::to_string).collect()
}

pub fn available_departments(records: &[Record]) -> Vec<String> {
    let set: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.department.as_deref())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, operator: &str, package: Option<&str>, department: Option<&str>) -> Record {
        Record {
            year,
            quarter: Some(1),
            operator: Some(operator.to_string()),
            package: package.map(str::to_string),
            department: department.map(str::to_string),
            segment: None,
            downstream_speed: None,
            upstream_speed: None,
            billed_amount: 10.0,
            other_billed: 0.0,
            lines_count: Some(1.0),
            value_per_line: Some(10.0),
        }
    }

    fn full_schema() -> Schema {
        Schema {
            has_package: true,
            has_department: true,
            has_segment: true,
            has_quarter: true,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            rec(2023, "A", Some("Internet"), Some("ANTIOQUIA")),
            rec(2023, "B", Some("Duo"), Some("BOGOTA D.C.")),
            rec(2024, "A", Some("Trio"), Some("ANTIOQUIA")),
        ]
    }

    #[test]
    fn empty_selection_filters_nothing() {
        let data = sample();
        let view = apply_filters(&data, &full_schema(), &FilterSelection::default()).unwrap();
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn dimensions_combine_as_a_conjunction() {
        let data = sample();
        let sel = FilterSelection {
            years: vec![2023],
            operators: vec!["A".to_string()],
            ..Default::default()
        };
        let view = apply_filters(&data, &full_schema(), &sel).unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].department.as_deref(), Some("ANTIOQUIA"));
    }

    #[test]
    fn zero_matches_signal_no_data() {
        let data = sample();
        let sel = FilterSelection {
            years: vec![2024],
            operators: vec!["B".to_string()],
            ..Default::default()
        };
        assert!(apply_filters(&data, &full_schema(), &sel).is_none());
    }

    #[test]
    fn absent_columns_disable_their_filters() {
        let data = sample();
        let schema = Schema::default();
        // A package selection that matches nothing is ignored because the
        // loaded file has no package column.
        let sel = FilterSelection {
            packages: vec!["NoExiste".to_string()],
            ..Default::default()
        };
        let view = apply_filters(&data, &schema, &sel).unwrap();
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn filtering_is_idempotent() {
        let data = sample();
        let sel = FilterSelection {
            years: vec![2023],
            ..Default::default()
        };
        let first = apply_filters(&data, &full_schema(), &sel).unwrap();
        let second = apply_filters(&data, &full_schema(), &sel).unwrap();
        assert_eq!(first.len(), second.len());
        assert!(first
            .iter()
            .zip(&second)
            .all(|(a, b)| std::ptr::eq(*a, *b)));
    }

    #[test]
    fn distinct_values_are_sorted_and_deduplicated() {
        let data = sample();
        assert_eq!(available_years(&data), vec![2023, 2024]);
        assert_eq!(available_operators(&data), vec!["A", "B"]);
        assert_eq!(
            available_departments(&data),
            vec!["ANTIOQUIA", "BOGOTA D.C."]
        );
    }
}
