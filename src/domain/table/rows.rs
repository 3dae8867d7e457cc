use serde_json::{Map, Value};

use crate::domain::symbol::display_scope;

/// One decoded table row, keys in chain order
pub type Row = Map<String, Value>;

/// Fields a point lookup can key on, in preference order
pub const SEARCH_FIELDS: [&str; 4] = ["account", "id", "from", "to"];

/// The first searchable field present on the first row
pub fn searchable_field(rows: &[Row]) -> Option<&'static str> {
    let first = rows.first()?;
    SEARCH_FIELDS.iter().copied().find(|field| first.contains_key(*field))
}

/// Union of row keys in first-seen order
pub fn columns(rows: &[Row]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !out.iter().any(|k| k == key) {
                out.push(key.clone());
            }
        }
    }
    out
}

/// Single-line rendering of a cell
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Scope label; `stat` scopes are symbol codes rendered as "SYM (raw)"
pub fn scope_label(scope: &str, currency_stats: bool) -> String {
    if currency_stats {
        display_scope(scope)
    } else {
        scope.to_string()
    }
}
