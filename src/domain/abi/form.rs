//! Action form - field values, per-field errors and command templates

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::interface::{ContractInterface, FieldDecl};
use super::validate::{validate, InvalidValue};
use crate::domain::error::{ExplorerError, ExplorerResult};

pub const DEFAULT_SIGNER_CLI: &str = "cleos";

/// Input state for one action of a contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionForm {
    pub action: String,
    pub fields: Vec<FieldDecl>,
    /// Raw input per field, same order as `fields`
    values: Vec<String>,
    /// Current validation error per field name
    errors: BTreeMap<String, InvalidValue>,
    /// ABI alias resolved to the validated type, per field
    resolved: Vec<String>,
}

impl ActionForm {
    /// Build an empty form for `action`; unknown actions give a form with no fields
    pub fn for_action(interface: &ContractInterface, action: &str) -> Self {
        let fields = interface.fields_for_action(action);
        let resolved = fields
            .iter()
            .map(|field| interface.resolve_type(&field.kind).to_string())
            .collect();
        Self::with_fields(action, fields, resolved)
    }

    pub fn from_fields(action: impl Into<String>, fields: Vec<FieldDecl>) -> Self {
        let resolved = fields.iter().map(|field| field.kind.clone()).collect();
        Self::with_fields(action, fields, resolved)
    }

    fn with_fields(action: impl Into<String>, fields: Vec<FieldDecl>, resolved: Vec<String>) -> Self {
        Self {
            action: action.into(),
            values: vec![String::new(); fields.len()],
            fields,
            errors: BTreeMap::new(),
            resolved,
        }
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.index_of(field).map(|i| self.values[i].as_str())
    }

    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Update one field and revalidate only that field
    pub fn set_value(&mut self, field: &str, raw: impl Into<String>) -> Option<&InvalidValue> {
        let index = self.index_of(field)?;
        let raw = raw.into();
        match validate(&self.resolved[index], &raw) {
            Ok(()) => {
                self.errors.remove(field);
            }
            Err(reason) => {
                self.errors.insert(field.to_string(), reason);
            }
        }
        self.values[index] = raw;
        self.errors.get(field)
    }

    pub fn error(&self, field: &str) -> Option<&InvalidValue> {
        self.errors.get(field)
    }

    /// Validation errors keyed by field name
    pub fn errors(&self) -> &BTreeMap<String, InvalidValue> {
        &self.errors
    }

    pub fn can_submit(&self) -> bool {
        self.errors.is_empty()
    }

    /// Parameter object in field order, raw values as strings
    pub fn params(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .zip(&self.values)
            .map(|(field, value)| (field.name.clone(), Value::String(value.trim().to_string())))
            .collect()
    }

    /// Command template for an external signer
    pub fn command(&self, cli: &str, contract: &str, endpoint: &str) -> ExplorerResult<String> {
        if let Some((field, reason)) = self.errors.iter().next() {
            return Err(ExplorerError::Validation {
                field: field.clone(),
                reason: reason.clone(),
            });
        }
        Ok(build_command(cli, contract, &self.action, &self.params(), endpoint))
    }

    fn index_of(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }
}

/// `<cli> -u <endpoint> push action <contract> <action> '<json>' -p <contract>@active`
pub fn build_command(
    cli: &str,
    contract: &str,
    action: &str,
    params: &Map<String, Value>,
    endpoint: &str,
) -> String {
    let json = Value::Object(params.clone()).to_string();
    format!(
        "{} -u {} push action {} {} '{}' -p {}@active",
        cli,
        endpoint,
        contract,
        action,
        shell_single_quote_escape(&json),
        contract
    )
}

fn shell_single_quote_escape(value: &str) -> String {
    value.replace('\'', "'\\''")
}
