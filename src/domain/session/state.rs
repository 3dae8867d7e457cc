//! Selection state machine
//!
//! The session owns the (network, contract, view, table, scope) tuple and
//! everything derived from it. Transitions never perform I/O: they return
//! the [`Request`]s to run, and [`Session::apply`] folds the responses back
//! in. Every issued request bumps the generation, so a response that was
//! overtaken by a newer selection is dropped instead of applied. Scope
//! discovery carries its own ticket: picking a scope by hand while it runs
//! must not lose the table's scope list.

use crate::domain::abi::{
    validate_account_name, ActionForm, ContractInterface, InvalidValue, DEFAULT_SIGNER_CLI,
};
use crate::domain::error::{ExplorerError, ExplorerResult};
use crate::domain::network::{normalize_endpoint, KnownHosts, Network};
use crate::domain::table::{
    default_scope, searchable_field, BrowseLimits, ChainInfo, Direction, PageRequest, Pager, Row,
    RowPage, ScopeDescriptor, TableTarget,
};

use super::location::{Location, View};
use super::request::{Outcome, Request, RequestKind, Response, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InterfaceLoading,
    InterfaceLoaded,
    /// Table chosen, scope discovery running
    TableSelected,
    /// Scope chosen, first page running
    ScopeSelected,
    RowsLoaded,
    Error,
}

/// What the row pane should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowsState {
    NotLoaded,
    Loading,
    Empty,
    Loaded,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub network: Network,
    pub custom_endpoint: Option<String>,
    pub contract: Option<String>,
    pub view: Option<View>,
    pub table: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub hosts: KnownHosts,
    pub limits: BrowseLimits,
    pub signer_cli: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            hosts: KnownHosts::default(),
            limits: BrowseLimits::default(),
            signer_cli: DEFAULT_SIGNER_CLI.to_string(),
        }
    }
}

/// Location segments waiting for the interface or scope list to arrive
#[derive(Debug, Clone, Default)]
struct Intent {
    view: Option<View>,
    item: Option<String>,
    scope: Option<String>,
}

#[derive(Debug)]
pub struct Session {
    settings: SessionSettings,
    selection: Selection,
    phase: Phase,
    generation: u64,
    /// Generation of the discovery request for the current table
    scopes_ticket: Option<u64>,
    interface: Option<ContractInterface>,
    chain_info: Option<ChainInfo>,
    scopes: Vec<ScopeDescriptor>,
    custom_scope: bool,
    pager: Pager,
    rows: Vec<Row>,
    rows_pending: bool,
    search_field: Option<&'static str>,
    form: Option<ActionForm>,
    intent: Option<Intent>,
    seeded: bool,
    error: Option<ExplorerError>,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            selection: Selection::default(),
            phase: Phase::Idle,
            generation: 0,
            scopes_ticket: None,
            interface: None,
            chain_info: None,
            scopes: Vec::new(),
            custom_scope: false,
            pager: Pager::new(),
            rows: Vec::new(),
            rows_pending: false,
            search_field: None,
            form: None,
            intent: None,
            seeded: false,
            error: None,
        }
    }

    // ---- accessors ----

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn ticket(&self) -> Ticket {
        Ticket {
            generation: self.generation,
        }
    }

    pub fn interface(&self) -> Option<&ContractInterface> {
        self.interface.as_ref()
    }

    pub fn chain_info(&self) -> Option<&ChainInfo> {
        self.chain_info.as_ref()
    }

    pub fn scopes(&self) -> &[ScopeDescriptor] {
        &self.scopes
    }

    pub fn is_custom_scope(&self) -> bool {
        self.custom_scope
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_state(&self) -> RowsState {
        if self.rows_pending || self.phase == Phase::ScopeSelected {
            RowsState::Loading
        } else if self.phase == Phase::RowsLoaded && self.rows.is_empty() {
            RowsState::Empty
        } else if self.rows.is_empty() {
            RowsState::NotLoaded
        } else {
            RowsState::Loaded
        }
    }

    pub fn page_index(&self) -> usize {
        self.pager.page_index()
    }

    pub fn has_more(&self) -> bool {
        self.pager.has_more()
    }

    pub fn can_go_back(&self) -> bool {
        self.pager.can_go_back()
    }

    pub fn search_field(&self) -> Option<&'static str> {
        self.search_field
    }

    pub fn search_key(&self) -> Option<&str> {
        self.pager.lookup_key()
    }

    pub fn form(&self) -> Option<&ActionForm> {
        self.form.as_ref()
    }

    pub fn error(&self) -> Option<&ExplorerError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.rows_pending
            || matches!(
                self.phase,
                Phase::InterfaceLoading | Phase::TableSelected | Phase::ScopeSelected
            )
    }

    /// Selected table is a token `stat` table (scopes are symbol codes)
    pub fn is_currency_stats(&self) -> bool {
        match (&self.interface, &self.selection.table) {
            (Some(interface), Some(table)) => interface
                .table(table)
                .map_or(false, |decl| decl.is_currency_stats()),
            _ => false,
        }
    }

    pub fn endpoint(&self) -> ExplorerResult<String> {
        self.settings
            .hosts
            .resolve(self.selection.network, self.selection.custom_endpoint.as_deref())
    }

    // ---- selection transitions ----

    /// Switch network; the contract (if any) is reloaded from the new endpoint
    pub fn set_network(
        &mut self,
        network: Network,
        custom_endpoint: Option<String>,
    ) -> ExplorerResult<Vec<Request>> {
        self.settings.hosts.resolve(network, custom_endpoint.as_deref())?;
        self.intent = None;
        self.apply_network(network, custom_endpoint);
        Ok(self.reload_contract())
    }

    pub fn set_contract(&mut self, account: &str) -> ExplorerResult<Vec<Request>> {
        let account = account.trim();
        check_account(account)?;
        self.intent = None;
        self.selection.contract = Some(account.to_string());
        Ok(self.reload_contract())
    }

    pub fn set_view(&mut self, view: View) {
        if self.interface.is_some() {
            self.selection.view = Some(view);
        }
    }

    pub fn set_table(&mut self, table: &str) -> ExplorerResult<Vec<Request>> {
        let requests = self.open_table(table)?;
        self.intent = None;
        Ok(requests)
    }

    /// Select a scope from the discovered list
    pub fn set_scope(&mut self, scope: &str) -> ExplorerResult<Vec<Request>> {
        if !self.scopes.iter().any(|s| s.scope == scope) {
            return Err(ExplorerError::UnknownScope(scope.to_string()));
        }
        self.intent = None;
        Ok(self.open_scope(scope.to_string()))
    }

    /// Select a scope that discovery did not report
    pub fn set_custom_scope(&mut self, scope: &str) -> ExplorerResult<Vec<Request>> {
        let scope = scope.trim();
        if scope.is_empty() || self.selection.table.is_none() {
            return Ok(Vec::new());
        }
        self.intent = None;
        Ok(self.open_scope(scope.to_string()))
    }

    // ---- rows ----

    pub fn next_page(&mut self) -> Vec<Request> {
        self.load_rows(Direction::Forward)
    }

    pub fn prev_page(&mut self) -> Vec<Request> {
        self.load_rows(Direction::Backward)
    }

    pub fn load_more(&mut self) -> Vec<Request> {
        self.load_rows(Direction::Append)
    }

    /// Re-run the deepest step of the current selection
    pub fn refresh(&mut self) -> Vec<Request> {
        if self.selection.scope.is_some() {
            self.rows_pending = false;
            return self.load_rows(Direction::Refresh);
        }
        if let Some(table) = self.selection.table.clone() {
            return self.open_table(&table).unwrap_or_default();
        }
        self.reload_contract()
    }

    /// Point lookup on the searchable field; an empty key clears the search
    pub fn search(&mut self, key: &str) -> ExplorerResult<Vec<Request>> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(self.clear_search());
        }
        if self.search_field.is_none() || self.selection.scope.is_none() {
            return Err(ExplorerError::NotSearchable);
        }
        self.pager.begin_lookup(key);
        self.rows_pending = false;
        Ok(self.load_rows(Direction::Initial))
    }

    pub fn clear_search(&mut self) -> Vec<Request> {
        if self.pager.lookup_key().is_none() {
            return Vec::new();
        }
        self.pager.clear_lookup();
        self.rows_pending = false;
        self.load_rows(Direction::Initial)
    }

    // ---- actions ----

    pub fn select_action(&mut self, action: &str) -> ExplorerResult<()> {
        let interface = self.interface.as_ref().ok_or_else(|| {
            ExplorerError::InterfaceUnavailable {
                account: self.selection.contract.clone().unwrap_or_default(),
            }
        })?;
        if interface.action(action).is_none() {
            return Err(ExplorerError::UnknownAction(action.to_string()));
        }
        self.form = Some(ActionForm::for_action(interface, action));
        self.selection.view = Some(View::Actions);
        Ok(())
    }

    /// Update one parameter; returns that field's validation error, if any
    pub fn set_param(&mut self, field: &str, raw: &str) -> Option<InvalidValue> {
        self.form.as_mut()?.set_value(field, raw).cloned()
    }

    pub fn command(&self) -> ExplorerResult<String> {
        let form = self.form.as_ref().ok_or(ExplorerError::NoActionSelected)?;
        let contract = self
            .selection
            .contract
            .as_deref()
            .ok_or(ExplorerError::NoActionSelected)?;
        form.command(&self.settings.signer_cli, contract, &self.endpoint()?)
    }

    // ---- locations ----

    pub fn location(&self) -> Location {
        let view = self.selection.contract.as_ref().and(self.selection.view);
        let (item, scope) = match view {
            Some(View::Actions) => (self.form.as_ref().map(|f| f.action.clone()), None),
            Some(View::Tables) => (self.selection.table.clone(), self.selection.scope.clone()),
            None => (None, None),
        };
        Location {
            network: self.selection.network,
            endpoint: self.selection.custom_endpoint.clone(),
            contract: self.selection.contract.clone(),
            view,
            table: item,
            scope,
        }
    }

    /// Apply the launch location. Only the first call with a contract counts.
    pub fn seed(&mut self, location: &Location) -> ExplorerResult<Vec<Request>> {
        if self.seeded || location.contract.is_none() {
            return Ok(Vec::new());
        }
        self.seeded = true;
        self.navigate(location)
    }

    /// Navigate to `location` on explicit user request
    pub fn open(&mut self, location: &Location) -> ExplorerResult<Vec<Request>> {
        self.seeded = true;
        self.navigate(location)
    }

    fn navigate(&mut self, location: &Location) -> ExplorerResult<Vec<Request>> {
        self.settings
            .hosts
            .resolve(location.network, location.endpoint.as_deref())?;
        if let Some(contract) = location.contract.as_deref() {
            check_account(contract)?;
        }
        self.apply_network(location.network, location.endpoint.clone());
        self.selection.contract = location.contract.clone();
        self.intent = location.contract.as_ref().map(|_| Intent {
            view: location.view,
            item: location.table.clone(),
            scope: location.scope.clone(),
        });
        Ok(self.reload_contract())
    }

    // ---- responses ----

    /// Fold a response in; stale tickets are ignored
    pub fn apply(&mut self, response: Response) -> Vec<Request> {
        if !self.is_current(&response) {
            log::debug!(
                "discarding stale response (generation {}, current {})",
                response.ticket.generation,
                self.generation
            );
            return Vec::new();
        }
        match response.outcome {
            Outcome::Interface { interface, info } => {
                if info.is_some() {
                    self.chain_info = info;
                }
                match interface {
                    Ok(interface) => self.interface_loaded(interface),
                    Err(error) => self.fail(error),
                }
            }
            Outcome::Scopes(result) => {
                self.scopes_ticket = None;
                match result {
                    Ok(scopes) => self.scopes_loaded(scopes),
                    Err(error) if self.selection.scope.is_some() => {
                        log::warn!("scope discovery failed: {}", error);
                        Vec::new()
                    }
                    Err(error) => self.fail(error),
                }
            }
            Outcome::Rows { page, result } => {
                self.rows_pending = false;
                match result {
                    Ok(rows) => {
                        self.rows_loaded(&page, rows);
                        Vec::new()
                    }
                    Err(error) => self.fail(error),
                }
            }
        }
    }

    fn is_current(&self, response: &Response) -> bool {
        match response.outcome {
            Outcome::Scopes(_) => self.scopes_ticket == Some(response.ticket.generation),
            _ => response.ticket.generation == self.generation,
        }
    }

    fn interface_loaded(&mut self, interface: ContractInterface) -> Vec<Request> {
        log::info!(
            "loaded {}: {} tables, {} actions",
            interface.account,
            interface.tables.len(),
            interface.actions.len()
        );
        self.interface = Some(interface);
        self.phase = Phase::InterfaceLoaded;
        self.error = None;

        let intent = self.intent.clone().unwrap_or_default();
        let view = intent.view.unwrap_or_default();
        self.selection.view = Some(view);
        let Some(item) = intent.item else {
            self.intent = None;
            return Vec::new();
        };

        match view {
            View::Tables => match self.open_table(&item) {
                Ok(requests) => requests,
                Err(error) => {
                    log::warn!("ignoring location table: {}", error);
                    self.intent = None;
                    Vec::new()
                }
            },
            View::Actions => {
                if let Err(error) = self.select_action(&item) {
                    log::warn!("ignoring location action: {}", error);
                }
                self.intent = None;
                Vec::new()
            }
        }
    }

    fn scopes_loaded(&mut self, scopes: Vec<ScopeDescriptor>) -> Vec<Request> {
        // a scope entered by hand while discovery ran stays selected
        if let Some(current) = self.selection.scope.as_deref() {
            self.custom_scope = !scopes.iter().any(|s| s.scope == current);
            self.scopes = scopes;
            self.intent = None;
            return Vec::new();
        }
        let contract = self.selection.contract.clone().unwrap_or_default();
        let preferred = self.intent.take().and_then(|intent| intent.scope);
        let scope = default_scope(&scopes, preferred.as_deref(), &contract);
        self.scopes = scopes;
        self.open_scope(scope)
    }

    fn rows_loaded(&mut self, request: &PageRequest, page: RowPage) {
        self.pager.commit(request, &page.next_key, page.has_more());
        match request.direction {
            Direction::Append => self.rows.extend(page.rows),
            _ => self.rows = page.rows,
        }
        let first_page = match request.direction {
            Direction::Initial => true,
            Direction::Refresh => self.pager.lookup_key().is_none() && self.pager.page_index() == 0,
            _ => false,
        };
        if first_page {
            self.search_field = searchable_field(&self.rows);
        }
        self.error = None;
        self.phase = Phase::RowsLoaded;
    }

    // ---- internals ----

    fn apply_network(&mut self, network: Network, custom_endpoint: Option<String>) {
        self.selection.network = network;
        self.selection.custom_endpoint = match network {
            Network::Custom => custom_endpoint.map(|e| normalize_endpoint(&e)),
            _ => None,
        };
        self.chain_info = None;
    }

    fn reset_contract_state(&mut self) {
        // invalidates anything still in flight
        self.generation += 1;
        self.scopes_ticket = None;
        self.interface = None;
        self.selection.view = None;
        self.selection.table = None;
        self.selection.scope = None;
        self.scopes.clear();
        self.custom_scope = false;
        self.clear_rows();
        self.form = None;
        self.error = None;
        self.phase = Phase::Idle;
    }

    fn reload_contract(&mut self) -> Vec<Request> {
        self.reset_contract_state();
        match self.selection.contract.clone() {
            Some(contract) => {
                self.phase = Phase::InterfaceLoading;
                self.issue(RequestKind::LoadInterface { contract })
            }
            None => Vec::new(),
        }
    }

    fn open_table(&mut self, table: &str) -> ExplorerResult<Vec<Request>> {
        let declared = self
            .interface
            .as_ref()
            .map_or(false, |interface| interface.table(table).is_some());
        let Some(contract) = self.selection.contract.clone().filter(|_| declared) else {
            return Err(ExplorerError::UnknownTable(table.to_string()));
        };
        self.selection.view = Some(View::Tables);
        self.selection.table = Some(table.to_string());
        self.selection.scope = None;
        self.scopes.clear();
        self.custom_scope = false;
        self.clear_rows();
        self.error = None;
        self.phase = Phase::TableSelected;
        let requests = self.issue(RequestKind::LoadScopes {
            contract,
            table: table.to_string(),
        });
        self.scopes_ticket = requests.first().map(|r| r.ticket.generation);
        Ok(requests)
    }

    fn open_scope(&mut self, scope: String) -> Vec<Request> {
        self.custom_scope = !self.scopes.iter().any(|s| s.scope == scope);
        self.selection.scope = Some(scope);
        self.clear_rows();
        self.error = None;
        self.phase = Phase::ScopeSelected;
        self.load_rows(Direction::Initial)
    }

    fn clear_rows(&mut self) {
        self.pager.reset();
        self.rows.clear();
        self.rows_pending = false;
        self.search_field = None;
    }

    fn load_rows(&mut self, direction: Direction) -> Vec<Request> {
        if self.rows_pending {
            log::debug!("ignoring {:?} while rows are loading", direction);
            return Vec::new();
        }
        let (Some(contract), Some(table), Some(scope)) = (
            self.selection.contract.clone(),
            self.selection.table.clone(),
            self.selection.scope.clone(),
        ) else {
            return Vec::new();
        };
        let Some(page) = self.pager.plan(direction) else {
            return Vec::new();
        };
        let requests = self.issue(RequestKind::LoadRows {
            target: TableTarget::new(contract, table, scope),
            page,
        });
        self.rows_pending = !requests.is_empty();
        requests
    }

    fn issue(&mut self, kind: RequestKind) -> Vec<Request> {
        match self.endpoint() {
            Ok(endpoint) => {
                self.generation += 1;
                let request = Request {
                    ticket: self.ticket(),
                    endpoint,
                    limits: self.settings.limits,
                    kind,
                };
                log::debug!("issuing {} (generation {})", request.describe(), self.generation);
                vec![request]
            }
            Err(error) => self.fail(error),
        }
    }

    fn fail(&mut self, error: ExplorerError) -> Vec<Request> {
        log::warn!("{}", error);
        self.error = Some(error);
        self.phase = Phase::Error;
        self.rows_pending = false;
        Vec::new()
    }
}

fn check_account(account: &str) -> ExplorerResult<()> {
    validate_account_name(account).map_err(|_| ExplorerError::InvalidAccount(account.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::AbiDocument;
    use crate::domain::session::settle;
    use crate::infrastructure::chain::MemoryChainService;
    use serde_json::json;

    fn token_chain() -> MemoryChainService {
        let abi: AbiDocument = serde_json::from_value(json!({
            "structs": [{"name": "transfer", "base": "", "fields": [
                {"name": "from", "type": "name"},
                {"name": "to", "type": "name"},
                {"name": "quantity", "type": "asset"},
                {"name": "memo", "type": "string"}
            ]}],
            "actions": [{"name": "transfer", "type": "transfer"}],
            "tables": [
                {"name": "accounts", "type": "account"},
                {"name": "stat", "type": "currency_stats"}
            ]
        }))
        .unwrap();
        let mut chain = MemoryChainService::new().with_abi("eosio.token", abi);
        for i in 0..3u64 {
            chain = chain.with_row(
                "eosio.token",
                "accounts",
                "alice",
                i,
                json!({"balance": format!("{}.0000 EOS", i)}),
            );
        }
        chain
    }

    #[tokio::test]
    async fn test_contract_to_rows_flow() {
        let chain = token_chain();
        let mut session = Session::new(SessionSettings::default());
        let requests = session.set_contract("eosio.token").unwrap();
        assert_eq!(session.phase(), Phase::InterfaceLoading);
        settle(&mut session, &chain, requests).await;
        assert_eq!(session.phase(), Phase::InterfaceLoaded);
        assert_eq!(session.selection().view, Some(View::Tables));

        let requests = session.set_table("accounts").unwrap();
        settle(&mut session, &chain, requests).await;
        assert_eq!(session.selection().scope.as_deref(), Some("alice"));
        assert_eq!(session.phase(), Phase::RowsLoaded);
        assert_eq!(session.rows().len(), 3);
        assert_eq!(session.search_field(), None);
        assert_eq!(
            session.location().to_path(),
            "/mainnet/eosio.token/tables/accounts/alice"
        );
    }

    #[tokio::test]
    async fn test_invalid_contract_is_rejected_without_request() {
        let mut session = Session::new(SessionSettings::default());
        let err = session.set_contract("Bad..Name").unwrap_err();
        assert!(matches!(err, ExplorerError::InvalidAccount(_)));
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.ticket().generation, 0);
    }

    #[tokio::test]
    async fn test_missing_abi_enters_error_and_recovers() {
        let chain = token_chain();
        let mut session = Session::new(SessionSettings::default());
        let requests = session.set_contract("alice").unwrap();
        settle(&mut session, &chain, requests).await;
        assert_eq!(session.phase(), Phase::Error);
        assert!(matches!(
            session.error(),
            Some(ExplorerError::InterfaceUnavailable { .. })
        ));

        let requests = session.set_contract("eosio.token").unwrap();
        settle(&mut session, &chain, requests).await;
        assert_eq!(session.phase(), Phase::InterfaceLoaded);
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let chain = token_chain();
        let mut session = Session::new(SessionSettings::default());
        let first = session.set_contract("eosio.token").unwrap();
        let second = session.set_contract("eosio").unwrap();

        let late = first[0].execute(&chain).await;
        assert!(session.apply(late).is_empty());
        assert!(session.interface().is_none());
        assert_eq!(session.phase(), Phase::InterfaceLoading);

        settle(&mut session, &chain, second).await;
        assert_eq!(session.phase(), Phase::Error);
    }

    #[tokio::test]
    async fn test_navigation_ignored_while_rows_pending() {
        let chain = token_chain();
        let mut session = Session::new(SessionSettings::default());
        let requests = session.set_contract("eosio.token").unwrap();
        settle(&mut session, &chain, requests).await;
        let requests = session.set_table("accounts").unwrap();
        let scopes = requests[0].execute(&chain).await;
        let rows = session.apply(scopes);
        assert_eq!(rows.len(), 1);
        assert!(session.next_page().is_empty());
        assert!(session.prev_page().is_empty());
        assert!(session.load_more().is_empty());
        assert_eq!(session.rows_state(), RowsState::Loading);
    }

    #[tokio::test]
    async fn test_custom_scope_keeps_discovery_running() {
        let chain = token_chain();
        let mut session = Session::new(SessionSettings::default());
        let requests = session.set_contract("eosio.token").unwrap();
        settle(&mut session, &chain, requests).await;

        let discovery = session.set_table("accounts").unwrap();
        let rows = session.set_custom_scope("bob").unwrap();
        assert_eq!(rows.len(), 1);
        assert!(session.is_custom_scope());

        let scopes = discovery[0].execute(&chain).await;
        assert!(session.apply(scopes).is_empty());
        let listed: Vec<&str> = session.scopes().iter().map(|s| s.scope.as_str()).collect();
        assert_eq!(listed, vec!["alice", "eosio.token"]);
        assert_eq!(session.selection().scope.as_deref(), Some("bob"));
        assert!(session.is_custom_scope());

        // the hand-picked scope's rows still land
        settle(&mut session, &chain, rows).await;
        assert_eq!(session.phase(), Phase::RowsLoaded);
        assert_eq!(session.rows_state(), RowsState::Empty);
    }

    #[tokio::test]
    async fn test_discovery_for_previous_table_is_discarded() {
        let chain = token_chain();
        let mut session = Session::new(SessionSettings::default());
        let requests = session.set_contract("eosio.token").unwrap();
        settle(&mut session, &chain, requests).await;

        let first = session.set_table("accounts").unwrap();
        let second = session.set_table("stat").unwrap();
        let late = first[0].execute(&chain).await;
        assert!(session.apply(late).is_empty());
        assert!(session.scopes().is_empty());

        settle(&mut session, &chain, second).await;
        assert_eq!(session.selection().table.as_deref(), Some("stat"));
        assert_eq!(session.selection().scope.as_deref(), Some("eosio.token"));
    }

    #[tokio::test]
    async fn test_action_form_and_command() {
        let chain = token_chain();
        let mut session = Session::new(SessionSettings::default());
        let requests = session.set_contract("eosio.token").unwrap();
        settle(&mut session, &chain, requests).await;

        assert!(session.select_action("issue").is_err());
        session.select_action("transfer").unwrap();
        assert_eq!(session.selection().view, Some(View::Actions));
        assert!(session.set_param("to", "Bob").is_some());
        assert!(session.command().is_err());
        assert!(session.set_param("to", "bob").is_none());
        session.set_param("from", "alice");
        session.set_param("quantity", "1.0000 EOS");
        let command = session.command().unwrap();
        assert!(command.starts_with("cleos -u https://lb.libre.org push action eosio.token transfer"));
        assert_eq!(
            session.location().to_path(),
            "/mainnet/eosio.token/actions/transfer"
        );
    }

    #[tokio::test]
    async fn test_seed_applies_once() {
        let chain = token_chain();
        let mut session = Session::new(SessionSettings::default());
        let location = Location::parse("/mainnet/eosio.token/tables/accounts/alice").unwrap();
        let requests = session.seed(&location).unwrap();
        settle(&mut session, &chain, requests).await;
        assert_eq!(session.selection().table.as_deref(), Some("accounts"));
        assert_eq!(session.selection().scope.as_deref(), Some("alice"));

        let other = Location::parse("/testnet/eosio").unwrap();
        assert!(session.seed(&other).unwrap().is_empty());
        assert_eq!(session.selection().network, Network::Mainnet);
    }
}
