//! ABI-driven action forms
//!
//! This module turns a contract's runtime-fetched ABI into typed input
//! forms: struct resolution, per-type validation and the command template
//! handed to an external signer.

mod form;
mod interface;
mod validate;

pub use form::{build_command, ActionForm, DEFAULT_SIGNER_CLI};
pub use interface::{
    fields_for, AbiDocument, ActionDecl, ContractInterface, FieldDecl, StructDecl, TableDecl,
    TypeAlias,
};
pub use validate::{validate, validate_account_name, InvalidValue};
