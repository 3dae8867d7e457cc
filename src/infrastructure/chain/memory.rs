//! In-memory chain that backs the session and runtime tests
//!
//! Rows are keyed by their 64-bit primary key. Bounds are parsed the way
//! nodeos parses them for `i64` indexes: decimal first, then account name.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::domain::abi::AbiDocument;
use crate::domain::error::{ExplorerError, ExplorerResult};
use crate::domain::symbol::name_to_u64;
use crate::domain::table::{
    logical_table_name, ChainInfo, ChainService, Row, RowPage, RowQuery, ScopeIndexPage,
    ScopeIndexRow,
};

type TableKey = (String, String, String);

#[derive(Debug, Default)]
pub struct MemoryChainService {
    abis: HashMap<String, AbiDocument>,
    rows: BTreeMap<TableKey, BTreeMap<u64, Row>>,
    extra_index: Vec<ScopeIndexRow>,
    info: ChainInfo,
    failing: HashMap<String, ExplorerError>,
    queries: Mutex<Vec<RowQuery>>,
}

impl MemoryChainService {
    pub fn new() -> Self {
        Self {
            info: ChainInfo {
                chain_id: "memory".to_string(),
                head_block_num: 1,
                server_version: "memory".to_string(),
            },
            ..Self::default()
        }
    }

    pub fn with_abi(mut self, account: &str, abi: AbiDocument) -> Self {
        self.abis.insert(account.to_string(), abi);
        self
    }

    /// Insert one row; `row` must be a JSON object
    pub fn with_row(mut self, code: &str, table: &str, scope: &str, key: u64, row: Value) -> Self {
        let row = match row {
            Value::Object(map) => map,
            other => {
                let mut map = Row::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        self.rows
            .entry((code.to_string(), table.to_string(), scope.to_string()))
            .or_default()
            .insert(key, row);
        self
    }

    /// Scope index entry with no backing rows (e.g. secondary index tables)
    pub fn with_index_row(mut self, code: &str, table: &str, scope: &str, count: u64) -> Self {
        self.extra_index.push(ScopeIndexRow {
            code: code.to_string(),
            scope: scope.to_string(),
            table: table.to_string(),
            payer: scope.to_string(),
            count,
        });
        self
    }

    /// Make every call touching `account` fail with `error`
    pub fn with_failure(mut self, account: &str, error: ExplorerError) -> Self {
        self.failing.insert(account.to_string(), error);
        self
    }

    /// Row queries received so far
    pub fn row_queries(&self) -> Vec<RowQuery> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }

    fn check(&self, account: &str) -> ExplorerResult<()> {
        match self.failing.get(account) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn parse_bound(bound: &str) -> ExplorerResult<u64> {
    bound
        .parse::<u64>()
        .ok()
        .or_else(|| name_to_u64(bound))
        .ok_or_else(|| ExplorerError::remote(Some(500), format!("invalid bound {}", bound)))
}

#[async_trait::async_trait]
impl ChainService for MemoryChainService {
    async fn get_abi(&self, account: &str) -> ExplorerResult<Option<AbiDocument>> {
        self.check(account)?;
        Ok(self.abis.get(account).cloned())
    }

    async fn get_table_by_scope(
        &self,
        code: &str,
        table: &str,
        limit: u32,
    ) -> ExplorerResult<ScopeIndexPage> {
        self.check(code)?;
        let wanted = logical_table_name(table);
        let mut rows: Vec<ScopeIndexRow> = self
            .rows
            .iter()
            .filter(|((c, t, _), _)| c == code && logical_table_name(t) == wanted)
            .map(|((c, t, s), rows)| ScopeIndexRow {
                code: c.clone(),
                scope: s.clone(),
                table: t.clone(),
                payer: s.clone(),
                count: rows.len() as u64,
            })
            .collect();
        rows.extend(
            self.extra_index
                .iter()
                .filter(|row| row.code == code && logical_table_name(&row.table) == wanted)
                .cloned(),
        );
        let more = rows.len() > limit as usize;
        rows.truncate(limit as usize);
        Ok(ScopeIndexPage {
            rows,
            more: json!(if more { "more" } else { "" }),
        })
    }

    async fn get_table_rows(&self, query: &RowQuery) -> ExplorerResult<RowPage> {
        self.check(&query.code)?;
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }

        let lower = query.lower_bound.as_deref().map(parse_bound).transpose()?;
        let upper = query.upper_bound.as_deref().map(parse_bound).transpose()?;
        let key = (query.code.clone(), query.table.clone(), query.scope.clone());
        let Some(table) = self.rows.get(&key) else {
            return Ok(RowPage::default());
        };

        let in_range = table
            .iter()
            .filter(|(k, _)| lower.map_or(true, |l| **k >= l) && upper.map_or(true, |u| **k <= u));
        let ordered: Vec<(&u64, &Row)> = if query.reverse {
            in_range.rev().collect()
        } else {
            in_range.collect()
        };

        let limit = query.limit.max(1) as usize;
        let rows = ordered.iter().take(limit).map(|(_, row)| (*row).clone()).collect();
        let (next_key, more) = match ordered.get(limit) {
            Some((key, _)) => (key.to_string(), true),
            None => (String::new(), false),
        };
        Ok(RowPage {
            rows,
            next_key,
            more: Value::Bool(more),
        })
    }

    async fn get_info(&self) -> ExplorerResult<ChainInfo> {
        Ok(self.info.clone())
    }
}
