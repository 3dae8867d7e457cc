//! CSV Export
//!
//! One column per field seen in the page, in first-seen order.

use std::io::Write;
use std::path::Path;

use crate::domain::table::{columns, format_cell, Row};

/// Write rows to a CSV file
pub fn write_rows(path: &Path, rows: &[Row]) -> Result<usize, Box<dyn std::error::Error>> {
    let file = std::fs::File::create(path)?;
    write_rows_to(file, rows)
}

pub fn write_rows_to<W: Write>(writer: W, rows: &[Row]) -> Result<usize, Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(writer);
    let header = columns(rows);

    wtr.write_record(&header)?;

    for row in rows {
        wtr.write_record(
            header
                .iter()
                .map(|column| row.get(column).map(format_cell).unwrap_or_default()),
        )?;
    }

    wtr.flush()?;
    Ok(rows.len())
}
