//! The concrete series behind each dashboard chart, composed from the
//! generic aggregation operations and rendered as typed, pre-formatted rows.

use crate::aggregate::{self, Dimension, Measure};
use crate::types::{
    DepartmentValueRow, OperatorValueRow, PackageCountRow, PackageLinesRow, PreviewRow,
    QuarterTrendRow, Record, SegmentLinesRow, YearCountRow,
};
use crate::util::{format_int, format_number};

/// Record counts per year.
pub fn records_by_year(rows: &[&Record]) -> Vec<YearCountRow> {
    aggregate::count_by(rows, Dimension::Year)
        .into_iter()
        .map(|(year, count)| YearCountRow {
            year,
            records: format_int(count),
        })
        .collect()
}

/// Billed value per department, top 15 by total.
pub fn billed_by_department(rows: &[&Record]) -> Vec<DepartmentValueRow> {
    let series = aggregate::sum_by(rows, Dimension::Department, Measure::BilledAmount);
    aggregate::top_n(series, 15)
        .into_iter()
        .map(|(department, total)| DepartmentValueRow {
            department,
            billed: format_number(total, 2),
        })
        .collect()
}

/// Record frequency per service/package, top 20.
pub fn package_frequency(rows: &[&Record]) -> Vec<PackageCountRow> {
    let series = aggregate::count_by(rows, Dimension::Package);
    aggregate::top_n(series, 20)
        .into_iter()
        .map(|(package, count)| PackageCountRow {
            package,
            records: format_int(count),
        })
        .collect()
}

/// Billed value per (year, quarter), ascending, labelled `"2023-T1"`.
pub fn quarterly_billed(rows: &[&Record]) -> Vec<QuarterTrendRow> {
    aggregate::quarterly_trend(rows)
        .into_iter()
        .map(|(period, total)| QuarterTrendRow {
            period,
            billed: format_number(total, 2),
        })
        .collect()
}

/// Top 10 operators by billed value, ranked.
pub fn top_operators(rows: &[&Record]) -> Vec<OperatorValueRow> {
    let series = aggregate::sum_by(rows, Dimension::Operator, Measure::BilledAmount);
    aggregate::top_n(series, 10)
        .into_iter()
        .enumerate()
        .map(|(idx, (operator, total))| OperatorValueRow {
            rank: idx + 1,
            operator,
            billed: format_number(total, 2),
        })
        .collect()
}

/// Line/access counts per segment, descending.
pub fn lines_by_segment(rows: &[&Record]) -> Vec<SegmentLinesRow> {
    let series = aggregate::sum_by(rows, Dimension::Segment, Measure::LinesCount);
    let len = series.len();
    aggregate::top_n(series, len)
        .into_iter()
        .map(|(segment, total)| SegmentLinesRow {
            segment,
            lines: format_number(total, 0),
        })
        .collect()
}

/// Line/access counts per service/package, top 15.
pub fn lines_by_package(rows: &[&Record]) -> Vec<PackageLinesRow> {
    let series = aggregate::sum_by(rows, Dimension::Package, Measure::LinesCount);
    aggregate::top_n(series, 15)
        .into_iter()
        .map(|(package, total)| PackageLinesRow {
            package,
            lines: format_number(total, 0),
        })
        .collect()
}

/// First `limit` rows of the filtered view, for the console preview.
pub fn preview_rows(rows: &[&Record], limit: usize) -> Vec<PreviewRow> {
    rows.iter()
        .take(limit)
        .map(|r| PreviewRow {
            year: r.year,
            quarter: r.quarter.map(|q| q.to_string()).unwrap_or_default(),
            operator: r.operator.clone().unwrap_or_default(),
            package: r.package.clone().unwrap_or_default(),
            department: r.department.clone().unwrap_or_default(),
            segment: r.segment.clone().unwrap_or_default(),
            downstream_speed: r
                .downstream_speed
                .map(|v| format_number(v, 1))
                .unwrap_or_default(),
            upstream_speed: r
                .upstream_speed
                .map(|v| format_number(v, 1))
                .unwrap_or_default(),
            billed: format_number(r.billed_amount, 2),
            other_billed: format_number(r.other_billed, 2),
            lines: r
                .lines_count
                .map(|l| format_number(l, 0))
                .unwrap_or_default(),
            value_per_line: r
                .value_per_line
                .map(|v| format_number(v, 2))
                .unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(
        year: i32,
        operator: &str,
        department: Option<&str>,
        billed: f64,
        lines: Option<f64>,
    ) -> Record {
        Record {
            year,
            quarter: Some(1),
            operator: Some(operator.to_string()),
            package: None,
            department: department.map(str::to_string),
            segment: None,
            downstream_speed: None,
            upstream_speed: None,
            billed_amount: billed,
            other_billed: 0.0,
            lines_count: lines,
            value_per_line: lines.and_then(|l| (l != 0.0).then(|| billed / l)),
        }
    }

    #[test]
    fn top_operators_ranked_descending_and_capped_at_ten() {
        let records: Vec<Record> = (0..12)
            .map(|i| rec(2023, &format!("OP{:02}", i), None, i as f64, Some(1.0)))
            .collect();
        let view: Vec<&Record> = records.iter().collect();
        let rows = top_operators(&view);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].operator, "OP11");
        assert_eq!(rows[0].billed, "11.00");
        assert_eq!(rows[9].operator, "OP02");
    }

    #[test]
    fn billed_by_department_keeps_top_fifteen() {
        let records: Vec<Record> = (0..20)
            .map(|i| rec(2023, "A", Some(&format!("D{:02}", i)), i as f64, None))
            .collect();
        let view: Vec<&Record> = records.iter().collect();
        let rows = billed_by_department(&view);
        assert_eq!(rows.len(), 15);
        assert_eq!(rows[0].department, "D19");
    }

    #[test]
    fn records_by_year_counts_in_year_order() {
        let records = vec![
            rec(2024, "A", None, 1.0, None),
            rec(2023, "A", None, 1.0, None),
            rec(2023, "B", None, 1.0, None),
        ];
        let view: Vec<&Record> = records.iter().collect();
        let rows = records_by_year(&view);
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].year.as_str(), rows[0].records.as_str()), ("2023", "2"));
        assert_eq!((rows[1].year.as_str(), rows[1].records.as_str()), ("2024", "1"));
    }

    #[test]
    fn preview_renders_missing_values_as_blank() {
        let records = vec![rec(2023, "A", None, 100.0, Some(0.0))];
        let view: Vec<&Record> = records.iter().collect();
        let rows = preview_rows(&view, 50);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].department, "");
        assert_eq!(rows[0].value_per_line, "");
        assert_eq!(rows[0].billed, "100.00");
    }
}
