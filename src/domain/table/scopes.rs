//! Scope discovery
//!
//! `get_table_by_scope` reports every physical table a contract owns,
//! including the numbered secondary-index tables (`orders....1`) that share
//! the logical name. These helpers fold that raw index into the list the
//! scope picker shows.

use std::collections::HashMap;

use super::service::ScopeIndexRow;

/// One selectable scope of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeDescriptor {
    pub scope: String,
    pub table: String,
    pub payer: String,
    pub row_count: u64,
}

/// Table name with a trailing `.<digits>` index suffix removed
///
/// `orders...2` and `orders.1` both map to `orders`; a name without dots
/// before the digits is left alone.
pub fn logical_table_name(name: &str) -> &str {
    let without_digits = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() == name.len() {
        return name;
    }
    let base = without_digits.trim_end_matches('.');
    if base.len() == without_digits.len() || base.is_empty() {
        return name;
    }
    base
}

/// Fold raw index rows into the scope list for `table`.
///
/// Rows belonging to other logical tables are dropped, duplicate scopes
/// keep the largest row count, the contract's own scope is always present
/// and the result is ordered by row count (desc) then scope (asc).
pub fn collect_scopes(contract: &str, table: &str, rows: Vec<ScopeIndexRow>) -> Vec<ScopeDescriptor> {
    let wanted = logical_table_name(table);
    let mut by_scope: HashMap<String, ScopeDescriptor> = HashMap::new();
    for row in rows {
        if logical_table_name(&row.table) != wanted {
            continue;
        }
        match by_scope.get_mut(&row.scope) {
            Some(existing) => {
                if row.count > existing.row_count {
                    existing.row_count = row.count;
                    existing.payer = row.payer;
                }
            }
            None => {
                by_scope.insert(
                    row.scope.clone(),
                    ScopeDescriptor {
                        scope: row.scope,
                        table: table.to_string(),
                        payer: row.payer,
                        row_count: row.count,
                    },
                );
            }
        }
    }

    by_scope.entry(contract.to_string()).or_insert_with(|| ScopeDescriptor {
        scope: contract.to_string(),
        table: table.to_string(),
        payer: contract.to_string(),
        row_count: 0,
    });

    let mut scopes: Vec<ScopeDescriptor> = by_scope.into_values().collect();
    scopes.sort_by(|a, b| {
        b.row_count
            .cmp(&a.row_count)
            .then_with(|| a.scope.cmp(&b.scope))
    });
    scopes
}

/// Scope chosen after discovery.
///
/// A preferred scope (carried by a location) wins; otherwise the first
/// scope with rows, otherwise the contract itself.
pub fn default_scope(scopes: &[ScopeDescriptor], preferred: Option<&str>, contract: &str) -> String {
    if let Some(preferred) = preferred.filter(|p| !p.is_empty()) {
        return preferred.to_string();
    }
    scopes
        .iter()
        .find(|s| s.row_count > 0)
        .map(|s| s.scope.clone())
        .unwrap_or_else(|| contract.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_row(scope: &str, table: &str, count: u64) -> ScopeIndexRow {
        ScopeIndexRow {
            code: "dex".to_string(),
            scope: scope.to_string(),
            table: table.to_string(),
            payer: "payer".to_string(),
            count,
        }
    }

    #[test]
    fn test_logical_table_name() {
        assert_eq!(logical_table_name("orders"), "orders");
        assert_eq!(logical_table_name("orders.1"), "orders");
        assert_eq!(logical_table_name("orders....2"), "orders");
        assert_eq!(logical_table_name("orders2"), "orders2");
        assert_eq!(logical_table_name("orders."), "orders.");
        assert_eq!(logical_table_name("...1"), "...1");
    }

    #[test]
    fn test_dedupes_and_keeps_max_count() {
        let rows = vec![
            index_row("alice", "orders", 3),
            index_row("alice", "orders...1", 9),
            index_row("bob", "orders", 9),
            index_row("carol", "trades", 50),
        ];
        let scopes = collect_scopes("dex", "orders", rows);
        let listed: Vec<_> = scopes.iter().map(|s| (s.scope.as_str(), s.row_count)).collect();
        assert_eq!(listed, vec![("alice", 9), ("bob", 9), ("dex", 0)]);
    }

    #[test]
    fn test_contract_scope_added_once() {
        let scopes = collect_scopes("dex", "orders", vec![index_row("dex", "orders", 4)]);
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].row_count, 4);

        let scopes = collect_scopes("dex", "orders", Vec::new());
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].scope, "dex");
        assert_eq!(scopes[0].payer, "dex");
        assert_eq!(scopes[0].row_count, 0);
    }

    #[test]
    fn test_default_scope_choice() {
        let scopes = collect_scopes(
            "dex",
            "orders",
            vec![index_row("bob", "orders", 2), index_row("zed", "orders", 0)],
        );
        assert_eq!(default_scope(&scopes, None, "dex"), "bob");
        assert_eq!(default_scope(&scopes, Some("zed"), "dex"), "zed");
        assert_eq!(default_scope(&scopes, Some(""), "dex"), "bob");

        let empty = collect_scopes("dex", "orders", vec![index_row("zed", "orders", 0)]);
        assert_eq!(default_scope(&empty, None, "dex"), "dex");
    }
}
