use serde::Serialize;
use std::error::Error;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Print a titled markdown preview of a report and export the full table to
/// `file`. Used for every dashboard series so they all render the same way.
pub fn emit_report<T>(title: &str, note: Option<&str>, file: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Serialize + Clone,
{
    if let Err(e) = write_csv(file, rows) {
        eprintln!("Write error: {}", e);
    }
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!("");
    preview_table_rows(rows, max_rows);
    println!("(Full table exported to {})\n", file);
}
