//! Generic table browsing: scope discovery, cursor pagination, point lookups

mod browser;
mod pager;
mod rows;
mod scopes;
mod service;

pub use browser::{BrowseLimits, TableBrowser, TableTarget, DEFAULT_PAGE_LIMIT, DEFAULT_SCOPE_LIMIT};
pub use pager::{Direction, PageRequest, Pager};
pub use rows::{columns, format_cell, scope_label, searchable_field, Row, SEARCH_FIELDS};
pub use scopes::{collect_scopes, default_scope, logical_table_name, ScopeDescriptor};
pub use service::{ChainInfo, ChainService, RowPage, RowQuery, ScopeIndexPage, ScopeIndexRow};
