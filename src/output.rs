use crate::currency::format_brl;
use crate::error::{AppError, FormatError};
use crate::pivot::PivotGrid;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), AppError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Writes a grid with the row axis in the first column and one column per
/// column key. Values are plain numbers, not currency strings.
pub fn write_pivot_csv(path: impl AsRef<Path>, grid: &PivotGrid) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec![String::new()];
    header.extend(grid.col_keys().iter().map(ToString::to_string));
    wtr.write_record(&header)?;
    for (key, values) in grid.rows() {
        let mut record = vec![key.to_string()];
        record.extend(values.iter().map(|v| format!("{:.2}", v)));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows of a grid, values as
/// currency.
pub fn pivot_table(grid: &PivotGrid, max_rows: usize) -> Result<String, FormatError> {
    let mut builder = Builder::default();
    let mut header = vec![String::new()];
    header.extend(grid.col_keys().iter().map(ToString::to_string));
    builder.push_record(header);
    for (key, values) in grid.rows().into_iter().take(max_rows) {
        let mut record = vec![key.to_string()];
        for v in values {
            record.push(format_brl(v)?);
        }
        builder.push_record(record);
    }
    Ok(builder.build().with(Style::markdown()).to_string())
}

pub fn preview_pivot(grid: &PivotGrid, max_rows: usize) -> Result<(), FormatError> {
    if grid.is_empty() {
        println!("(no rows)\n");
        return Ok(());
    }
    println!("{}\n", pivot_table(grid, max_rows)?);
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
