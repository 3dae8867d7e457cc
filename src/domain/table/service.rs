//! Chain service contract and the JSON shapes it exchanges

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rows::Row;
use crate::domain::abi::AbiDocument;
use crate::domain::error::ExplorerResult;

/// Body of `get_table_rows`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowQuery {
    pub code: String,
    pub scope: String,
    pub table: String,
    pub limit: u32,
    pub json: bool,
    pub reverse: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<String>,
}

/// One page of `get_table_rows`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RowPage {
    #[serde(default, deserialize_with = "rows_as_objects")]
    pub rows: Vec<Row>,
    #[serde(default, deserialize_with = "key_as_string")]
    pub next_key: String,
    #[serde(default)]
    pub more: Value,
}

impl RowPage {
    /// More rows exist in the requested direction.
    ///
    /// An empty `next_key` always ends the data, whatever `more` says.
    pub fn has_more(&self) -> bool {
        !self.next_key.is_empty() && more_flag(&self.more).unwrap_or(true)
    }
}

/// One entry of `get_table_by_scope`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScopeIndexRow {
    #[serde(default)]
    pub code: String,
    pub scope: String,
    pub table: String,
    #[serde(default)]
    pub payer: String,
    #[serde(default)]
    pub count: u64,
}

/// Response of `get_table_by_scope`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScopeIndexPage {
    #[serde(default)]
    pub rows: Vec<ScopeIndexRow>,
    #[serde(default)]
    pub more: Value,
}

/// Subset of `get_info` shown in the header
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChainInfo {
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub head_block_num: u64,
    #[serde(default)]
    pub server_version: String,
}

/// Read-only chain API used by the browsing and form engines
///
/// Implementations are bound to one endpoint.
#[async_trait::async_trait]
pub trait ChainService: Send + Sync {
    /// `get_abi`; `Ok(None)` when the account has no ABI
    async fn get_abi(&self, account: &str) -> ExplorerResult<Option<AbiDocument>>;

    /// `get_table_by_scope`
    async fn get_table_by_scope(
        &self,
        code: &str,
        table: &str,
        limit: u32,
    ) -> ExplorerResult<ScopeIndexPage>;

    /// `get_table_rows`
    async fn get_table_rows(&self, query: &RowQuery) -> ExplorerResult<RowPage>;

    /// `get_info`
    async fn get_info(&self) -> ExplorerResult<ChainInfo>;
}

/// `more` is a bool for rows and a resume key string for scopes
fn more_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(key) => Some(!key.is_empty()),
        _ => None,
    }
}

fn rows_as_objects<'de, D>(deserializer: D) -> Result<Vec<Row>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values
        .into_iter()
        .map(|value| match value {
            Value::Object(map) => map,
            other => {
                let mut map = Row::new();
                map.insert("data".to_string(), other);
                map
            }
        })
        .collect())
}

fn key_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(key)) => key,
        Some(other) => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_next_key_ends_data() {
        let page: RowPage =
            serde_json::from_str(r#"{"rows": [{"id": 1}], "next_key": "", "more": false}"#).unwrap();
        assert!(!page.has_more());

        let page: RowPage = serde_json::from_str(r#"{"rows": [], "more": true}"#).unwrap();
        assert!(!page.has_more());
    }

    #[test]
    fn test_next_key_with_more() {
        let page: RowPage =
            serde_json::from_str(r#"{"rows": [], "next_key": "42", "more": true}"#).unwrap();
        assert!(page.has_more());
        let page: RowPage =
            serde_json::from_str(r#"{"rows": [], "next_key": "42", "more": false}"#).unwrap();
        assert!(!page.has_more());
        let page: RowPage = serde_json::from_str(r#"{"rows": [], "next_key": 42}"#).unwrap();
        assert_eq!(page.next_key, "42");
        assert!(page.has_more());
    }

    #[test]
    fn test_non_object_rows_are_wrapped() {
        let page: RowPage = serde_json::from_str(r#"{"rows": ["0a0b", {"id": 2}]}"#).unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0]["data"], Value::String("0a0b".to_string()));
        assert_eq!(page.rows[1]["id"], Value::from(2));
    }

    #[test]
    fn test_query_omits_missing_bounds() {
        let query = RowQuery {
            code: "eosio.token".to_string(),
            scope: "alice".to_string(),
            table: "accounts".to_string(),
            limit: 20,
            json: true,
            reverse: true,
            lower_bound: None,
            upper_bound: Some("5".to_string()),
        };
        let body = serde_json::to_value(&query).unwrap();
        assert!(body.get("lower_bound").is_none());
        assert_eq!(body["upper_bound"], "5");
        assert_eq!(body["reverse"], true);
    }
}
