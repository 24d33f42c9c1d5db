use crate::error::LoadError;
use crate::types::{Dataset, RawRow, Record, Schema};
use crate::util::{parse_i32_safe, parse_locale_f64};
use csv::ReaderBuilder;

/// Years the analysis covers; everything else is dropped at load time.
pub const ADMISSIBLE_YEARS: [i32; 2] = [2023, 2024];

/// Columns the cleaning pipeline cannot run without. The second monetary
/// column is included: the negative-value filter reads both.
const REQUIRED_COLUMNS: [&str; 5] = [
    "ANNO",
    "EMPRESA",
    "VALOR_FACTURADO_O_COBRADO",
    "OTROS_VALORES_FACTURADOS",
    "CANTIDAD_LINEAS_ACCESOS",
];

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub parse_failures: usize,
    pub dropped_negative: usize,
}

/// Load the semicolon-delimited extract and clean it:
///
/// 1. keep only rows whose `ANNO` is in `years`,
/// 2. normalize the speed and monetary columns (decimal comma, empty = null),
/// 3. drop rows whose billed amounts are negative or did not parse,
/// 4. derive `value_per_line`, null when the line count is zero or missing.
///
/// Individual bad values never fail the load; they are counted in the
/// `LoadReport`. An empty cleaned set is a valid result.
pub fn load_and_clean(path: &str, years: &[i32]) -> Result<(Dataset, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)?;

    let headers = rdr.headers()?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(LoadError::MissingColumn(col));
        }
    }
    let schema = Schema {
        has_package: headers.iter().any(|h| h == "SERVICIO_PAQUETE"),
        has_department: headers.iter().any(|h| h == "DEPARTAMENTO"),
        has_segment: headers.iter().any(|h| h == "SEGMENTO"),
        has_quarter: headers.iter().any(|h| h == "TRIMESTRE"),
    };

    let mut total_rows = 0usize;
    let mut parse_failures = 0usize;
    let mut dropped_negative = 0usize;
    let mut records: Vec<Record> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_failures += 1;
                continue;
            }
        };

        // Step 1: admissible-year filter.
        let year = match parse_i32_safe(row.year.as_deref()) {
            Some(y) if years.contains(&y) => y,
            _ => continue,
        };

        // Step 2: normalize the four locale-formatted numeric columns.
        let downstream_speed = normalize(row.downstream_speed.as_deref(), &mut parse_failures);
        let upstream_speed = normalize(row.upstream_speed.as_deref(), &mut parse_failures);
        let billed = normalize(row.billed_amount.as_deref(), &mut parse_failures);
        let other = normalize(row.other_billed.as_deref(), &mut parse_failures);

        // Step 3: a negative billed amount on either column disqualifies the
        // row. A null amount fails the `>= 0` test the same way.
        let (billed_amount, other_billed) = match (billed, other) {
            (Some(b), Some(o)) if b >= 0.0 && o >= 0.0 => (b, o),
            _ => {
                dropped_negative += 1;
                continue;
            }
        };

        // Step 4: per-line value; division by zero yields a missing value.
        let lines_count = parse_locale_f64(row.lines_count.as_deref());
        let value_per_line = match lines_count {
            Some(l) if l != 0.0 => Some(billed_amount / l),
            _ => None,
        };

        records.push(Record {
            year,
            quarter: parse_i32_safe(row.quarter.as_deref()),
            operator: clean_text(row.operator),
            package: clean_text(row.package),
            department: clean_text(row.department),
            segment: clean_text(row.segment),
            downstream_speed,
            upstream_speed,
            billed_amount,
            other_billed,
            lines_count,
            value_per_line,
        });
    }

    let report = LoadReport {
        total_rows,
        filtered_rows: records.len(),
        parse_failures,
        dropped_negative,
    };
    Ok((Dataset { records, schema }, report))
}

/// Normalize one numeric value, counting values that were present but failed
/// to parse. Empty or missing cells are nulls, not failures.
fn normalize(raw: Option<&str>, failures: &mut usize) -> Option<f64> {
    let value = parse_locale_f64(raw);
    if value.is_none() && raw.is_some_and(|s| !s.trim().is_empty()) {
        *failures += 1;
    }
    value
}

fn clean_text(s: Option<String>) -> Option<String> {
    let s = s?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
