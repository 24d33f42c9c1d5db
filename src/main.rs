// Entry point and high-level CLI flow.
//
// The console front mirrors the interactive dashboard it replaces:
// - Option [1] loads and cleans the CSV once, printing diagnostics.
// - Option [2] asks for filter selections, then prints the summary metrics
//   and every chart-backing series as markdown tables, exporting each one
//   to CSV and the summary to JSON.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit.
mod aggregate;
mod error;
mod filter;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use filter::FilterSelection;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use types::Dataset;

// Simple in-memory app state so we only load/clean the CSV once but can
// generate filtered reports multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Dataset>,
}

const DEFAULT_CSV: &str = "EMPAQUETAMIENTO_FIJO_11.csv";

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// Ask the user whether to go back to the main menu after generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line("Back to Menu (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load and clean the CSV file.
///
/// On success the cleaned `Dataset` is stored in `APP_STATE` and a short
/// summary of the cleaning pass is printed, including the parse-failure and
/// negative-value diagnostics the pipeline counts but never fails on.
fn handle_load() {
    let input = read_line(&format!("CSV path [{}]: ", DEFAULT_CSV));
    let path = if input.is_empty() {
        DEFAULT_CSV.to_string()
    } else {
        input
    };
    match loader::load_and_clean(&path, &loader::ADMISSIBLE_YEARS) {
        Ok((data, report)) => {
            println!(
                "Processing dataset... ({} rows read, {} retained for 2023-2024)",
                util::format_int(report.total_rows as i64),
                util::format_int(report.filtered_rows as i64)
            );
            println!(
                "Note: {} values failed numeric normalization, {} rows dropped for negative billed amounts.",
                util::format_int(report.parse_failures as i64),
                util::format_int(report.dropped_negative as i64)
            );
            println!("");
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(data);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Prompt one multi-value selection. Blank input means "no filter on this
/// dimension", exactly like leaving a dashboard multiselect untouched.
fn prompt_selection(label: &str, available: &[String]) -> Vec<String> {
    println!("{} {} available", available.len(), label);
    let input = read_line(&format!(
        "Select {} (comma-separated, blank = all): ",
        label
    ));
    if input.is_empty() {
        return Vec::new();
    }
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn prompt_filters(data: &Dataset) -> FilterSelection {
    let years = filter::available_years(&data.records);
    let year_input = read_line(&format!(
        "Select year(s) {:?} (comma-separated, blank = all): ",
        years
    ));
    let sel_years: Vec<i32> = year_input
        .split(',')
        .filter_map(|s| s.trim().parse::<i32>().ok())
        .collect();

    let operators = prompt_selection("operator(s)", &filter::available_operators(&data.records));
    let packages = if data.schema.has_package {
        prompt_selection(
            "service/package(s)",
            &filter::available_packages(&data.records),
        )
    } else {
        Vec::new()
    };
    let departments = if data.schema.has_department {
        prompt_selection(
            "department(s)",
            &filter::available_departments(&data.records),
        )
    } else {
        Vec::new()
    };

    FilterSelection {
        years: sel_years,
        operators,
        packages,
        departments,
    }
}

/// Handle option [2]: filter the cleaned table and generate every report.
///
/// This function is intentionally side-effectful:
/// - writes one CSV per series,
/// - writes a JSON summary,
/// - and prints markdown previews of each report to the console.
fn handle_dashboard() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };

    let sel = prompt_filters(&data);
    let Some(view) = filter::apply_filters(&data.records, &data.schema, &sel) else {
        println!("Warning: no data for the selected filter combination.\n");
        return;
    };

    let summary = aggregate::summary_metrics(&view);
    println!("\nSummary");
    println!(
        "Filtered records: {}",
        util::format_int(summary.total_records as i64)
    );
    println!("Total lines/accesses: {}", format_metric(summary.total_lines));
    println!(
        "Total billed value: {}",
        summary
            .total_billed
            .map(|v| format!("${}", util::format_number(v, 0)))
            .unwrap_or_else(|| "N/A".to_string())
    );
    println!("Operators reported: {}\n", summary.distinct_operators);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }

    println!("--- General analysis ---\n");
    output::emit_report(
        "Records by year",
        None,
        "report_records_by_year.csv",
        &reports::records_by_year(&view),
        5,
    );
    if data.schema.has_department {
        output::emit_report(
            "Billed value by department",
            Some("Top 15 by total"),
            "report_billed_by_department.csv",
            &reports::billed_by_department(&view),
            5,
        );
    }
    if data.schema.has_package {
        output::emit_report(
            "Service/package frequency",
            Some("Top 20 by record count"),
            "report_package_frequency.csv",
            &reports::package_frequency(&view),
            5,
        );
    }
    println!("Preview of the filtered data");
    println!("");
    output::preview_table_rows(&reports::preview_rows(&view, 10), 10);

    println!("--- Quarterly trends ---\n");
    if data.schema.has_quarter {
        output::emit_report(
            "Billed value by quarter",
            None,
            "report_quarterly_trend.csv",
            &reports::quarterly_billed(&view),
            8,
        );
    }
    output::emit_report(
        "Top operators by billed value",
        Some("Top 10"),
        "report_top_operators.csv",
        &reports::top_operators(&view),
        10,
    );

    println!("--- Line counts ---\n");
    if data.schema.has_segment {
        output::emit_report(
            "Lines/accesses by segment",
            None,
            "report_lines_by_segment.csv",
            &reports::lines_by_segment(&view),
            5,
        );
    }
    if data.schema.has_package {
        output::emit_report(
            "Lines/accesses by service/package",
            Some("Top 15 by total"),
            "report_lines_by_package.csv",
            &reports::lines_by_package(&view),
            5,
        );
    }
    match aggregate::value_per_line_stats(&view) {
        Some(stats) => {
            println!("Value per line (anomaly screening)");
            println!(
                "count={} mean={} median={} min={} max={}\n",
                util::format_int(stats.count as i64),
                util::format_number(stats.mean, 2),
                util::format_number(stats.median, 2),
                util::format_number(stats.min, 2),
                util::format_number(stats.max, 2)
            );
        }
        None => println!("Not enough data to compute value per line.\n"),
    }
}

fn format_metric(value: Option<f64>) -> String {
    value
        .map(|v| util::format_int(v as i64))
        .unwrap_or_else(|| "N/A".to_string())
}

fn main() {
    loop {
        println!("Fixed-service bundling report (2023-2024)");
        println!("[1] Load the file");
        println!("[2] Generate Dashboard Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!("");
                handle_dashboard();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
