use crate::types::{RawTable, RawValue};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

/// Read a CSV export of the warehouse result into a raw table. Cells stay
/// text; empty cells become `Null`. Rows are not validated here, ragged rows
/// are reported by the normalizer.
pub fn load_raw_table(path: impl AsRef<Path>) -> Result<RawTable, csv::Error> {
    let path = path.as_ref();
    let rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let table = read_table(rdr)?;
    tracing::info!(rows = table.len(), "loaded {}", path.display());
    Ok(table)
}

pub fn read_raw_table<R: Read>(reader: R) -> Result<RawTable, csv::Error> {
    read_table(ReaderBuilder::new().flexible(true).from_reader(reader))
}

fn read_table<R: Read>(mut rdr: csv::Reader<R>) -> Result<RawTable, csv::Error> {
    // strip a leading BOM
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    let mut table = RawTable::new(headers);
    for result in rdr.records() {
        let record = result?;
        let row = record
            .iter()
            .map(|cell| match cell.trim() {
                "" => RawValue::Null,
                s => RawValue::Text(s.to_string()),
            })
            .collect();
        table.push_row(row);
    }
    Ok(table)
}
