use std::time::{Duration, Instant};

use chrono::Utc;

use crate::core::{parse_command, Action, Command, ExportFormat, NotifyLevel};
use crate::domain::error::{ExplorerError, ExplorerResult};
use crate::domain::network::Network;
use crate::domain::session::{Location, Phase, Request, Response, Session, View};
use crate::domain::table::scope_label;
use crate::store::{HistoryEntry, HistoryStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Tables or actions of the contract
    Sidebar,
    Scopes,
    Rows,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
    Prompt(PromptKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Contract,
    Endpoint,
    CustomScope,
    Search,
    /// Value for the selected form field
    Param,
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::Contract => "contract",
            PromptKind::Endpoint => "endpoint",
            PromptKind::CustomScope => "scope",
            PromptKind::Search => "search",
            PromptKind::Param => "value",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Help,
    Networks,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Default, Clone)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

const STATUS_TTL: Duration = Duration::from_secs(4);

#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub command: CommandBar,
    pub prompt_context: Option<String>,
    pub status: Option<StatusMessage>,
    pub overlay: Option<Overlay>,
    pub selected_item: usize,
    pub selected_scope: usize,
    pub selected_row: usize,
    pub selected_field: usize,
    pub selected_network: usize,
    pub selected_history: usize,
    pub history: Vec<HistoryEntry>,
    pub history_store: Option<HistoryStore>,
    pub pending_requests: Vec<Request>,
    pub pending_copy: Option<String>,
    pub should_quit: bool,
    last_recorded: Option<String>,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            focus: Focus::Sidebar,
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            prompt_context: None,
            status: None,
            overlay: None,
            selected_item: 0,
            selected_scope: 0,
            selected_row: 0,
            selected_field: 0,
            selected_network: 0,
            selected_history: 0,
            history: Vec::new(),
            history_store: None,
            pending_requests: Vec::new(),
            pending_copy: None,
            should_quit: false,
            last_recorded: None,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.level != StatusLevel::Error && status.since.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
    }

    pub fn view(&self) -> View {
        self.session.selection().view.unwrap_or_default()
    }

    pub fn focus_label(&self) -> &'static str {
        match self.focus {
            Focus::Sidebar => match self.view() {
                View::Tables => "Tables",
                View::Actions => "Actions",
            },
            Focus::Scopes => "Scopes",
            Focus::Rows => "Rows",
            Focus::Form => "Form",
        }
    }

    // ---- session plumbing ----

    /// Queue the requests of a transition, or report why it was refused
    pub fn dispatch(&mut self, result: ExplorerResult<Vec<Request>>) {
        match result {
            Ok(requests) => self.pending_requests.extend(requests),
            Err(error) => self.set_status(error.to_string(), StatusLevel::Error),
        }
    }

    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.pending_requests)
    }

    pub fn take_copy_request(&mut self) -> Option<String> {
        self.pending_copy.take()
    }

    pub fn apply_response(&mut self, response: Response) {
        let follow_up = self.session.apply(response);
        self.pending_requests.extend(follow_up);
        self.sync_selection();

        if self.session.phase() == Phase::Error {
            if let Some(error) = self.session.error() {
                let text = error.to_string();
                self.set_status(text, StatusLevel::Error);
            }
        } else if self.status.as_ref().map_or(false, |s| s.level == StatusLevel::Error) {
            self.status = None;
        }
        self.record_history();
    }

    pub fn apply_runtime_error(&mut self, message: String) {
        self.set_status(message, StatusLevel::Error);
    }

    /// Keep list cursors inside their lists and on the active entries
    fn sync_selection(&mut self) {
        let selection = self.session.selection();
        if let Some(scope) = selection.scope.as_deref() {
            if let Some(index) = self.session.scopes().iter().position(|s| s.scope == scope) {
                self.selected_scope = index;
            }
        }
        if let Some(table) = selection.table.as_deref() {
            if self.view() == View::Tables {
                if let Some(index) = self.sidebar_items().iter().position(|t| t == table) {
                    self.selected_item = index;
                }
            }
        }
        self.selected_item = clamp(self.selected_item, self.sidebar_items().len());
        self.selected_scope = clamp(self.selected_scope, self.session.scopes().len());
        self.selected_row = clamp(self.selected_row, self.session.rows().len());
        let fields = self.session.form().map_or(0, |f| f.fields.len());
        self.selected_field = clamp(self.selected_field, fields);
    }

    fn record_history(&mut self) {
        if !matches!(self.session.phase(), Phase::InterfaceLoaded | Phase::RowsLoaded) {
            return;
        }
        let path = self.session.location().to_path();
        if self.last_recorded.as_deref() == Some(path.as_str()) {
            return;
        }
        if let Some(store) = self.history_store.as_ref() {
            if let Err(err) = store.record(&path, Utc::now()) {
                log::warn!("history not recorded: {:#}", err);
            }
        }
        self.last_recorded = Some(path);
    }

    pub fn load_history(&mut self) {
        let Some(store) = self.history_store.as_ref() else {
            self.history.clear();
            return;
        };
        match store.recent() {
            Ok(entries) => self.history = entries,
            Err(err) => {
                self.set_status(format!("History unavailable: {err}"), StatusLevel::Warn);
            }
        }
        self.selected_history = clamp(self.selected_history, self.history.len());
    }

    // ---- lists ----

    /// Names listed in the sidebar for the current view
    pub fn sidebar_items(&self) -> Vec<String> {
        let Some(interface) = self.session.interface() else {
            return Vec::new();
        };
        match self.view() {
            View::Tables => interface.tables.iter().map(|t| t.name.clone()).collect(),
            View::Actions => interface.actions.iter().map(|a| a.name.clone()).collect(),
        }
    }

    pub fn scope_labels(&self) -> Vec<String> {
        let stats = self.session.is_currency_stats();
        self.session
            .scopes()
            .iter()
            .map(|s| format!("{} ({})", scope_label(&s.scope, stats), s.row_count))
            .collect()
    }

    fn focus_order(&self) -> &'static [Focus] {
        match self.view() {
            View::Tables => &[Focus::Sidebar, Focus::Scopes, Focus::Rows],
            View::Actions => &[Focus::Sidebar, Focus::Form],
        }
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let index = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (index + 1) % order.len()
        } else {
            (index + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }

    pub fn set_view(&mut self, view: View) {
        if self.session.interface().is_none() {
            self.set_status("Open a contract first", StatusLevel::Warn);
            return;
        }
        self.session.set_view(view);
        self.selected_item = 0;
        self.focus = Focus::Sidebar;
    }

    pub fn move_selection(&mut self, down: bool) {
        if let Some(overlay) = self.overlay {
            let (index, len) = match overlay {
                Overlay::Networks => (&mut self.selected_network, Network::ALL.len()),
                Overlay::History => (&mut self.selected_history, self.history.len()),
                Overlay::Help => return,
            };
            *index = step(*index, len, down);
            return;
        }
        match self.focus {
            Focus::Sidebar => {
                self.selected_item = step(self.selected_item, self.sidebar_items().len(), down)
            }
            Focus::Scopes => {
                self.selected_scope = step(self.selected_scope, self.session.scopes().len(), down)
            }
            Focus::Rows => {
                self.selected_row = step(self.selected_row, self.session.rows().len(), down)
            }
            Focus::Form => {
                let len = self.session.form().map_or(0, |f| f.fields.len());
                self.selected_field = step(self.selected_field, len, down);
            }
        }
    }

    /// Enter on the focused list
    pub fn activate(&mut self) {
        if let Some(overlay) = self.overlay {
            self.activate_overlay(overlay);
            return;
        }
        match self.focus {
            Focus::Sidebar => {
                let Some(name) = self.sidebar_items().get(self.selected_item).cloned() else {
                    return;
                };
                match self.view() {
                    View::Tables => {
                        let result = self.session.set_table(&name);
                        self.dispatch(result);
                        self.selected_scope = 0;
                        self.selected_row = 0;
                        self.focus = Focus::Scopes;
                    }
                    View::Actions => self.select_action(&name),
                }
            }
            Focus::Scopes => {
                let Some(scope) = self
                    .session
                    .scopes()
                    .get(self.selected_scope)
                    .map(|s| s.scope.clone())
                else {
                    return;
                };
                let result = self.session.set_scope(&scope);
                self.dispatch(result);
                self.selected_row = 0;
                self.focus = Focus::Rows;
            }
            Focus::Rows => {}
            Focus::Form => self.edit_selected_field(),
        }
    }

    fn activate_overlay(&mut self, overlay: Overlay) {
        match overlay {
            Overlay::Help => self.overlay = None,
            Overlay::Networks => {
                let network = Network::ALL[self.selected_network.min(Network::ALL.len() - 1)];
                self.overlay = None;
                if network == Network::Custom {
                    self.enter_prompt(PromptKind::Endpoint, None);
                } else {
                    let result = self.session.set_network(network, None);
                    self.dispatch(result);
                    self.reset_cursors();
                }
            }
            Overlay::History => {
                let entry = self.history.get(self.selected_history).cloned();
                self.overlay = None;
                if let Some(entry) = entry {
                    match Location::parse(&entry.path) {
                        Some(location) => self.apply_action(Action::Navigate(location)),
                        None => self.set_status("Unreadable history entry", StatusLevel::Warn),
                    }
                }
            }
        }
    }

    pub fn open_overlay(&mut self, overlay: Overlay) {
        match overlay {
            Overlay::History => self.load_history(),
            Overlay::Networks => {
                let current = self.session.selection().network;
                self.selected_network = Network::ALL.iter().position(|n| *n == current).unwrap_or(0);
            }
            Overlay::Help => {}
        }
        self.overlay = Some(overlay);
    }

    fn select_action(&mut self, name: &str) {
        match self.session.select_action(name) {
            Ok(()) => {
                self.selected_field = 0;
                self.focus = Focus::Form;
            }
            Err(error) => self.set_status(error.to_string(), StatusLevel::Error),
        }
    }

    fn edit_selected_field(&mut self) {
        let Some(form) = self.session.form() else {
            return;
        };
        let Some(field) = form.fields.get(self.selected_field) else {
            self.set_status("This action takes no parameters", StatusLevel::Info);
            return;
        };
        let name = field.name.clone();
        let current = form.value(&name).unwrap_or_default().to_string();
        self.enter_prompt(PromptKind::Param, Some(name));
        self.command.input = current;
    }

    fn reset_cursors(&mut self) {
        self.selected_item = 0;
        self.selected_scope = 0;
        self.selected_row = 0;
        self.selected_field = 0;
        self.focus = Focus::Sidebar;
    }

    // ---- rows ----

    pub fn next_page(&mut self) {
        if !self.session.has_more() {
            self.set_status("Last page", StatusLevel::Info);
            return;
        }
        let requests = self.session.next_page();
        self.pending_requests.extend(requests);
        self.selected_row = 0;
    }

    pub fn prev_page(&mut self) {
        if !self.session.can_go_back() {
            self.set_status("First page", StatusLevel::Info);
            return;
        }
        let requests = self.session.prev_page();
        self.pending_requests.extend(requests);
        self.selected_row = 0;
    }

    pub fn load_more(&mut self) {
        if !self.session.has_more() {
            self.set_status("No more rows", StatusLevel::Info);
            return;
        }
        let requests = self.session.load_more();
        self.pending_requests.extend(requests);
    }

    pub fn refresh(&mut self) {
        let requests = self.session.refresh();
        self.pending_requests.extend(requests);
    }

    pub fn search(&mut self, key: &str) {
        let result = self.session.search(key);
        self.dispatch(result);
        self.selected_row = 0;
    }

    pub fn clear_search(&mut self) {
        let requests = self.session.clear_search();
        self.pending_requests.extend(requests);
        self.selected_row = 0;
    }

    pub fn copy_location(&mut self) {
        let path = self.session.location().to_path();
        self.apply_action(Action::Copy(path));
    }

    pub fn copy_command(&mut self) {
        let action = match self.session.command() {
            Ok(command) => Action::Copy(command),
            Err(error) => Action::Notify(error.to_string(), NotifyLevel::Error),
        };
        self.apply_action(action);
    }

    pub fn export(&mut self, format: ExportFormat) {
        let action = crate::modules::export::export_rows(&self.session, format);
        self.apply_action(action);
    }

    // ---- command line and prompts ----

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn enter_prompt(&mut self, kind: PromptKind, context: Option<String>) {
        if kind == PromptKind::Search {
            if let Some(field) = self.session.search_field() {
                self.prompt_context = Some(field.to_string());
            } else {
                self.set_status(ExplorerError::NotSearchable.to_string(), StatusLevel::Warn);
                return;
            }
        } else {
            self.prompt_context = context;
        }
        self.input_mode = InputMode::Prompt(kind);
        self.command.input.clear();
    }

    pub fn exit_prompt(&mut self) {
        self.input_mode = InputMode::Normal;
        self.prompt_context = None;
        self.command.input.clear();
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        self.exit_command();
        if input.is_empty() {
            return;
        }
        let cmd = parse_command(&input);
        let action = self.execute_command(&cmd);
        self.apply_action(action);
        self.command.last = Some(input);
    }

    pub fn apply_prompt(&mut self, kind: PromptKind) {
        let input = self.command.input.trim().to_string();
        let context = self.prompt_context.clone();
        self.exit_prompt();
        match kind {
            PromptKind::Contract => {
                if input.is_empty() {
                    return;
                }
                let result = self.session.set_contract(&input);
                self.dispatch(result);
                self.reset_cursors();
            }
            PromptKind::Endpoint => {
                let result = self.session.set_network(Network::Custom, Some(input));
                self.dispatch(result);
                self.reset_cursors();
            }
            PromptKind::CustomScope => {
                let result = self.session.set_custom_scope(&input);
                self.dispatch(result);
                self.selected_row = 0;
                self.focus = Focus::Rows;
            }
            PromptKind::Search => self.search(&input),
            PromptKind::Param => {
                let Some(field) = context else {
                    return;
                };
                match self.session.set_param(&field, &input) {
                    Some(reason) => self.set_status(format!("{field}: {reason}"), StatusLevel::Warn),
                    None => self.status = None,
                }
            }
        }
    }

    /// Execute a parsed command
    pub fn execute_command(&mut self, cmd: &Command) -> Action {
        match cmd {
            Command::Network(network, url) => {
                let result = self.session.set_network(*network, url.clone());
                self.dispatch(result);
                self.reset_cursors();
                Action::None
            }
            Command::Endpoint(url) => {
                let result = self.session.set_network(Network::Custom, Some(url.clone()));
                self.dispatch(result);
                self.reset_cursors();
                Action::None
            }
            Command::Contract(account) => {
                let result = self.session.set_contract(account);
                self.dispatch(result);
                self.reset_cursors();
                Action::None
            }
            Command::Tables => {
                self.set_view(View::Tables);
                Action::None
            }
            Command::Actions => {
                self.set_view(View::Actions);
                Action::None
            }
            Command::Table(table) => {
                let result = self.session.set_table(table);
                self.dispatch(result);
                self.selected_row = 0;
                self.focus = Focus::Scopes;
                Action::None
            }
            Command::Scope(scope) => {
                let result = self.session.set_scope(scope);
                self.dispatch(result);
                self.selected_row = 0;
                self.focus = Focus::Rows;
                Action::None
            }
            Command::CustomScope(scope) => {
                let result = self.session.set_custom_scope(scope);
                self.dispatch(result);
                self.focus = Focus::Rows;
                Action::None
            }
            Command::Search(key) => {
                self.search(key);
                Action::None
            }
            Command::ClearSearch => {
                self.clear_search();
                Action::None
            }
            Command::Next => {
                self.next_page();
                Action::None
            }
            Command::Prev => {
                self.prev_page();
                Action::None
            }
            Command::More => {
                self.load_more();
                Action::None
            }
            Command::Refresh => {
                self.refresh();
                Action::None
            }
            Command::Action(name) => {
                self.select_action(name);
                Action::None
            }
            Command::Set { field, value } => match self.session.set_param(field, value) {
                Some(reason) => Action::Notify(format!("{field}: {reason}"), NotifyLevel::Warn),
                None if self.session.form().and_then(|f| f.value(field)).is_none() => {
                    Action::Notify(format!("No field named {field}"), NotifyLevel::Warn)
                }
                None => Action::None,
            },
            Command::CopyCommand => match self.session.command() {
                Ok(command) => Action::Copy(command),
                Err(error) => Action::Notify(error.to_string(), NotifyLevel::Error),
            },
            Command::Go(path) => match Location::parse(path) {
                Some(location) => Action::Navigate(location),
                None => Action::Notify(format!("Not a location: {path}"), NotifyLevel::Warn),
            },
            Command::CopyLocation => Action::Copy(self.session.location().to_path()),
            Command::Recent => {
                self.open_overlay(Overlay::History);
                Action::None
            }
            Command::Export(format) => crate::modules::export::export_rows(&self.session, *format),
            Command::Help => {
                self.open_overlay(Overlay::Help);
                Action::None
            }
            Command::Quit => Action::Quit,
            Command::Unknown(s) => Action::Notify(format!("Unknown command: {}", s), NotifyLevel::Warn),
        }
    }

    /// Apply an action returned by a command or module
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Navigate(location) => {
                let result = self.session.open(&location);
                self.dispatch(result);
                self.reset_cursors();
            }
            Action::Copy(text) => self.pending_copy = Some(text),
            Action::Notify(msg, level) => {
                let level = match level {
                    NotifyLevel::Info => StatusLevel::Info,
                    NotifyLevel::Warn => StatusLevel::Warn,
                    NotifyLevel::Error => StatusLevel::Error,
                };
                self.set_status(msg, level);
            }
            Action::Quit => self.should_quit = true,
        }
    }
}

fn clamp(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

fn step(index: usize, len: usize, down: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if down {
        (index + 1).min(len - 1)
    } else {
        index.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionSettings;
    use crate::infrastructure::chain::MemoryChainService;
    use serde_json::json;

    async fn drain(app: &mut App, chain: &MemoryChainService) {
        loop {
            let requests = app.take_requests();
            if requests.is_empty() {
                break;
            }
            for request in requests {
                let response = request.execute(chain).await;
                app.apply_response(response);
            }
        }
    }

    #[test]
    fn test_step_and_clamp() {
        assert_eq!(step(0, 0, true), 0);
        assert_eq!(step(2, 3, true), 2);
        assert_eq!(step(0, 3, false), 0);
        assert_eq!(clamp(5, 2), 1);
        assert_eq!(clamp(5, 0), 0);
    }

    #[test]
    fn test_contract_prompt_queues_interface_request() {
        let mut app = App::new(Session::new(SessionSettings::default()));
        app.enter_prompt(PromptKind::Contract, None);
        app.command.input = "eosio.token".to_string();
        app.apply_prompt(PromptKind::Contract);
        let requests = app.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_invalid_contract_sets_error_status() {
        let mut app = App::new(Session::new(SessionSettings::default()));
        let action = app.execute_command(&parse_command("contract NOT..VALID"));
        app.apply_action(action);
        assert!(app.take_requests().is_empty());
        assert_eq!(app.status_text().map(|(_, level)| level), Some(StatusLevel::Error));
    }

    #[test]
    fn test_go_and_quit_commands_apply() {
        let mut app = App::new(Session::new(SessionSettings::default()));
        let action = app.execute_command(&parse_command("go /testnet/eosio.token"));
        assert!(matches!(action, Action::Navigate(_)));
        app.apply_action(action);
        assert_eq!(app.take_requests().len(), 1);
        assert_eq!(app.session.selection().network, Network::Testnet);

        let action = app.execute_command(&parse_command("q"));
        assert_eq!(action, Action::Quit);
        app.apply_action(action);
        assert!(app.should_quit);
    }

    #[test]
    fn test_copy_location_goes_to_pending_copy() {
        let mut app = App::new(Session::new(SessionSettings::default()));
        app.copy_location();
        assert_eq!(app.take_copy_request().as_deref(), Some("/mainnet"));
    }

    #[test]
    fn test_search_prompt_requires_searchable_rows() {
        let mut app = App::new(Session::new(SessionSettings::default()));
        app.enter_prompt(PromptKind::Search, None);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.status_text().map(|(_, level)| level), Some(StatusLevel::Warn));
    }

    #[tokio::test]
    async fn test_activate_walks_table_to_rows_and_records_history() {
        let abi = serde_json::from_value(json!({"tables": [{"name": "orders", "type": "order"}]}))
            .unwrap();
        let chain = MemoryChainService::new()
            .with_abi("dex", abi)
            .with_row("dex", "orders", "alice", 1, json!({"id": 1}));
        let mut app = App::new(Session::new(SessionSettings::default()));
        app.history_store = Some(HistoryStore::in_memory(10).unwrap());

        let action = app.execute_command(&parse_command("contract dex"));
        app.apply_action(action);
        drain(&mut app, &chain).await;
        assert_eq!(app.sidebar_items(), vec!["orders".to_string()]);

        app.activate();
        drain(&mut app, &chain).await;
        assert_eq!(app.focus, Focus::Scopes);
        assert_eq!(app.scope_labels(), vec!["alice (1)", "dex (0)"]);
        assert_eq!(app.session.rows().len(), 1);

        app.load_history();
        let paths: Vec<&str> = app.history.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"/mainnet/dex/tables/orders/alice"));
    }
}
