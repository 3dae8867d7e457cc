//! Contract interface - tables, actions and parameter structs from the ABI

use serde::{Deserialize, Serialize};

/// A struct field or action parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name
    pub name: String,
    /// ABI type name (e.g., "name", "asset", "uint64")
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// A named parameter/row struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: String,
    /// Parent struct whose fields come first (may be empty)
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

/// An action and the struct describing its parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub struct_type: String,
}

/// A table and the struct describing its rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub row_type: String,
}

impl TableDecl {
    /// Token contracts keep supply/issuer per symbol in `stat` rows
    pub fn is_currency_stats(&self) -> bool {
        self.name == "stat" || self.row_type == "currency_stats"
    }
}

/// `new_type_name` alias declared by the ABI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAlias {
    pub new_type_name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// The `abi` object returned by `get_abi`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiDocument {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub types: Vec<TypeAlias>,
    #[serde(default)]
    pub structs: Vec<StructDecl>,
    #[serde(default)]
    pub actions: Vec<ActionDecl>,
    #[serde(default)]
    pub tables: Vec<TableDecl>,
}

/// Interface of one contract account on one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInterface {
    pub account: String,
    pub tables: Vec<TableDecl>,
    pub actions: Vec<ActionDecl>,
    pub structs: Vec<StructDecl>,
    pub types: Vec<TypeAlias>,
}

// Guards against self-referencing aliases and base chains
const MAX_RESOLVE_DEPTH: usize = 16;

impl ContractInterface {
    pub fn from_abi(account: impl Into<String>, abi: AbiDocument) -> Self {
        Self {
            account: account.into(),
            tables: abi.tables,
            actions: abi.actions,
            structs: abi.structs,
            types: abi.types,
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableDecl> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn action(&self, name: &str) -> Option<&ActionDecl> {
        self.actions.iter().find(|action| action.name == name)
    }

    /// Parameter fields of an action; empty when the action or its struct is missing
    pub fn fields_for_action(&self, name: &str) -> Vec<FieldDecl> {
        self.action(name)
            .map(|action| fields_for(action, &self.structs))
            .unwrap_or_default()
    }

    /// Follow `types` aliases down to the underlying type name
    pub fn resolve_type<'a>(&'a self, kind: &'a str) -> &'a str {
        let mut current = kind;
        for _ in 0..MAX_RESOLVE_DEPTH {
            match self.types.iter().find(|alias| alias.new_type_name == current) {
                Some(alias) => current = alias.kind.as_str(),
                None => break,
            }
        }
        current
    }
}

/// Resolve an action's parameter fields by exact struct-name match.
///
/// Fields of the base struct (if declared and present) come first. A
/// missing struct yields no fields so the action is still usable.
pub fn fields_for(action: &ActionDecl, structs: &[StructDecl]) -> Vec<FieldDecl> {
    let mut chain = Vec::new();
    let mut name = action.struct_type.as_str();
    while chain.len() < MAX_RESOLVE_DEPTH {
        let Some(decl) = structs.iter().find(|s| s.name == name) else {
            break;
        };
        chain.push(decl);
        if decl.base.is_empty() {
            break;
        }
        name = decl.base.as_str();
    }
    chain
        .iter()
        .rev()
        .flat_map(|decl| decl.fields.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer_abi() -> AbiDocument {
        serde_json::from_str(
            r#"{
                "version": "eosio::abi/1.1",
                "types": [{"new_type_name": "account_name", "type": "name"}],
                "structs": [
                    {"name": "transfer_args", "base": "", "fields": [
                        {"name": "to", "type": "name"},
                        {"name": "quantity", "type": "asset"}
                    ]},
                    {"name": "memo_transfer", "base": "transfer_args", "fields": [
                        {"name": "memo", "type": "string"}
                    ]}
                ],
                "actions": [
                    {"name": "transfer", "type": "transfer_args", "ricardian_contract": ""},
                    {"name": "memoxfer", "type": "memo_transfer"},
                    {"name": "ghost", "type": "missing_struct"}
                ],
                "tables": [
                    {"name": "accounts", "type": "account", "index_type": "i64"},
                    {"name": "stat", "type": "currency_stats"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_fields_by_exact_struct_name() {
        let iface = ContractInterface::from_abi("eosio.token", transfer_abi());
        let fields = iface.fields_for_action("transfer");
        assert_eq!(
            fields,
            vec![FieldDecl::new("to", "name"), FieldDecl::new("quantity", "asset")]
        );
    }

    #[test]
    fn test_missing_struct_yields_no_fields() {
        let iface = ContractInterface::from_abi("eosio.token", transfer_abi());
        assert!(iface.fields_for_action("ghost").is_empty());
        assert!(iface.fields_for_action("nope").is_empty());
    }

    #[test]
    fn test_base_fields_come_first() {
        let iface = ContractInterface::from_abi("eosio.token", transfer_abi());
        let names: Vec<_> = iface
            .fields_for_action("memoxfer")
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["to", "quantity", "memo"]);
    }

    #[test]
    fn test_alias_resolution_and_stat_table() {
        let iface = ContractInterface::from_abi("eosio.token", transfer_abi());
        assert_eq!(iface.resolve_type("account_name"), "name");
        assert_eq!(iface.resolve_type("asset"), "asset");
        assert!(iface.table("stat").unwrap().is_currency_stats());
        assert!(!iface.table("accounts").unwrap().is_currency_stats());
    }
}
