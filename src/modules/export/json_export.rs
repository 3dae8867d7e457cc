//! JSON Export
//!
//! Rows are written as-is, wrapped with where they came from.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::table::Row;

#[derive(Serialize)]
struct ExportablePage<'a> {
    location: &'a str,
    page: usize,
    rows: &'a [Row],
}

/// Write rows to a JSON file
pub fn write_rows(
    path: &Path,
    location: &str,
    page: usize,
    rows: &[Row],
) -> Result<usize, Box<dyn std::error::Error>> {
    let json = to_json(location, page, rows)?;

    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;

    Ok(rows.len())
}

fn to_json(location: &str, page: usize, rows: &[Row]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExportablePage {
        location,
        page,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_field_order_is_kept() {
        let row = json!({"zeta": 1, "alpha": 2}).as_object().cloned().unwrap();
        let text = to_json("/mainnet/dex/tables/orders/dex", 0, &[row]).unwrap();
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["location"], "/mainnet/dex/tables/orders/dex");
        assert_eq!(value["rows"][0]["alpha"], 2);
    }
}
