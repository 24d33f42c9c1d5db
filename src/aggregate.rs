//! Group-by-and-summarize operations over a filtered view.
//!
//! Every function here is a pure transformation of `&[&Record]`: no state,
//! no ordering dependency between calls. Grouped series come back with keys
//! ascending; `top_n` re-orders by value on demand.

use crate::types::{PerLineStats, Record, SummaryMetrics};
use crate::util::{average, median};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy)]
pub enum Dimension {
    Year,
    Operator,
    Package,
    Department,
    Segment,
}

#[derive(Debug, Clone, Copy)]
pub enum Measure {
    BilledAmount,
    LinesCount,
}

fn key_of(r: &Record, dim: Dimension) -> Option<String> {
    match dim {
        Dimension::Year => Some(r.year.to_string()),
        Dimension::Operator => r.operator.clone(),
        Dimension::Package => r.package.clone(),
        Dimension::Department => r.department.clone(),
        Dimension::Segment => r.segment.clone(),
    }
}

fn measure_of(r: &Record, measure: Measure) -> Option<f64> {
    match measure {
        Measure::BilledAmount => Some(r.billed_amount),
        Measure::LinesCount => r.lines_count,
    }
}

/// Rows per distinct value of `dim`. Rows with no value on the dimension are
/// left out of the grouping.
pub fn count_by(rows: &[&Record], dim: Dimension) -> Vec<(String, u64)> {
    let mut groups: BTreeMap<String, u64> = BTreeMap::new();
    for r in rows {
        if let Some(key) = key_of(r, dim) {
            *groups.entry(key).or_insert(0) += 1;
        }
    }
    groups.into_iter().collect()
}

/// Sum of `measure` per distinct value of `dim`, skipping null measures.
pub fn sum_by(rows: &[&Record], dim: Dimension, measure: Measure) -> Vec<(String, f64)> {
    let mut groups: BTreeMap<String, f64> = BTreeMap::new();
    for r in rows {
        let Some(key) = key_of(r, dim) else { continue };
        let entry = groups.entry(key).or_insert(0.0);
        if let Some(v) = measure_of(r, measure) {
            *entry += v;
        }
    }
    groups.into_iter().collect()
}

/// Sort a grouped series descending by value and keep the first `n` entries.
/// The sort is stable, so ties keep the incoming key order.
pub fn top_n<T: PartialOrd + Copy>(mut series: Vec<(String, T)>, n: usize) -> Vec<(String, T)> {
    series.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    series.truncate(n);
    series
}

/// Billed-amount totals by (year, quarter), ascending, labelled `"2023-T1"`.
/// Rows without a quarter are left out.
pub fn quarterly_trend(rows: &[&Record]) -> Vec<(String, f64)> {
    let mut groups: BTreeMap<(i32, i32), f64> = BTreeMap::new();
    for r in rows {
        let Some(q) = r.quarter else { continue };
        *groups.entry((r.year, q)).or_insert(0.0) += r.billed_amount;
    }
    groups
        .into_iter()
        .map(|((year, quarter), total)| (format!("{}-T{}", year, quarter), total))
        .collect()
}

pub fn summary_metrics(rows: &[&Record]) -> SummaryMetrics {
    let operators: HashSet<&str> = rows.iter().filter_map(|r| r.operator.as_deref()).collect();
    SummaryMetrics {
        total_records: rows.len(),
        total_lines: nullable_sum(rows.iter().map(|r| r.lines_count)),
        total_billed: nullable_sum(rows.iter().map(|r| Some(r.billed_amount))),
        distinct_operators: operators.len(),
    }
}

/// Sum that keeps "no data" distinct from zero: `None` when every input is
/// null, the null-skipping sum otherwise.
fn nullable_sum<I>(values: I) -> Option<f64>
where
    I: Iterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut seen = false;
    for v in values.flatten() {
        sum += v;
        seen = true;
    }
    seen.then_some(sum)
}

/// Distribution of the derived per-line value, or `None` when no row in the
/// view has one.
pub fn value_per_line_stats(rows: &[&Record]) -> Option<PerLineStats> {
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.value_per_line)
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return None;
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in &values {
        min = min.min(*v);
        max = max.max(*v);
    }
    Some(PerLineStats {
        count: values.len(),
        mean: average(&values),
        median: median(values.clone()),
        min,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, quarter: Option<i32>, operator: Option<&str>, billed: f64) -> Record {
        Record {
            year,
            quarter,
            operator: operator.map(str::to_string),
            package: None,
            department: None,
            segment: None,
            downstream_speed: None,
            upstream_speed: None,
            billed_amount: billed,
            other_billed: 0.0,
            lines_count: None,
            value_per_line: None,
        }
    }

    fn view(records: &[Record]) -> Vec<&Record> {
        records.iter().collect()
    }

    #[test]
    fn sums_billed_amount_by_operator() {
        let data = vec![
            rec(2023, Some(1), Some("A"), 100.0),
            rec(2024, Some(1), Some("B"), 50.0),
        ];
        let series = sum_by(&view(&data), Dimension::Operator, Measure::BilledAmount);
        assert_eq!(
            series,
            vec![("A".to_string(), 100.0), ("B".to_string(), 50.0)]
        );
    }

    #[test]
    fn rows_without_a_dimension_value_are_excluded() {
        let data = vec![
            rec(2023, Some(1), Some("A"), 1.0),
            rec(2023, Some(1), None, 1.0),
        ];
        let counts = count_by(&view(&data), Dimension::Operator);
        assert_eq!(counts, vec![("A".to_string(), 1)]);
        // The year dimension is never null: both rows group.
        let by_year = count_by(&view(&data), Dimension::Year);
        assert_eq!(by_year, vec![("2023".to_string(), 2)]);
    }

    #[test]
    fn top_n_sorts_descending_truncates_and_keeps_tie_order() {
        let series = vec![
            ("a".to_string(), 1.0),
            ("b".to_string(), 3.0),
            ("c".to_string(), 3.0),
            ("d".to_string(), 2.0),
        ];
        let top = top_n(series.clone(), 2);
        assert_eq!(top, vec![("b".to_string(), 3.0), ("c".to_string(), 3.0)]);
        // Idempotent: re-sorting sorted input changes nothing.
        assert_eq!(top_n(top.clone(), 2), top);
        // n larger than the series is a no-op truncation.
        assert_eq!(top_n(series, 10).len(), 4);
    }

    #[test]
    fn quarterly_trend_labels_sorted_by_year_then_quarter() {
        let data = vec![
            rec(2024, Some(1), Some("A"), 5.0),
            rec(2023, Some(2), Some("A"), 3.0),
            rec(2023, Some(1), Some("A"), 2.0),
            rec(2023, Some(1), Some("B"), 1.0),
            rec(2023, None, Some("B"), 99.0),
        ];
        let trend = quarterly_trend(&view(&data));
        assert_eq!(
            trend,
            vec![
                ("2023-T1".to_string(), 3.0),
                ("2023-T2".to_string(), 3.0),
                ("2024-T1".to_string(), 5.0),
            ]
        );
    }

    #[test]
    fn summary_keeps_no_data_distinct_from_zero() {
        let data = vec![
            rec(2023, Some(1), Some("A"), 10.0),
            rec(2023, Some(1), Some("A"), 5.0),
        ];
        let metrics = summary_metrics(&view(&data));
        assert_eq!(metrics.total_records, 2);
        assert_eq!(metrics.distinct_operators, 1);
        assert_eq!(metrics.total_billed, Some(15.0));
        // lines_count is null on every row: N/A, not zero.
        assert_eq!(metrics.total_lines, None);

        let mut with_zero = rec(2023, Some(1), Some("A"), 0.0);
        with_zero.lines_count = Some(0.0);
        let data = vec![with_zero];
        assert_eq!(summary_metrics(&view(&data)).total_lines, Some(0.0));
    }

    #[test]
    fn per_line_stats_absent_when_no_values() {
        let data = vec![rec(2023, Some(1), Some("A"), 10.0)];
        assert!(value_per_line_stats(&view(&data)).is_none());

        let mut r = rec(2023, Some(1), Some("A"), 10.0);
        r.value_per_line = Some(5.0);
        let mut r2 = rec(2023, Some(1), Some("A"), 10.0);
        r2.value_per_line = Some(15.0);
        let data = vec![r, r2];
        let stats = value_per_line_stats(&view(&data)).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 10.0);
        assert_eq!(stats.median, 10.0);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 15.0);
    }
}
