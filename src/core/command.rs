//! Command parser for the : command line

use crate::domain::network::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Selection
    Network(Network, Option<String>),
    Endpoint(String),
    Contract(String),
    Tables,
    Actions,
    Table(String),
    Scope(String),
    CustomScope(String),

    // Rows
    Search(String),
    ClearSearch,
    Next,
    Prev,
    More,
    Refresh,

    // Action forms
    Action(String),
    Set { field: String, value: String },
    CopyCommand,

    // Locations
    Go(String),
    CopyLocation,
    Recent,

    Export(ExportFormat),
    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let unknown = || Command::Unknown(input.to_string());

    match cmd.to_lowercase().as_str() {
        "network" | "net" => {
            let Some(args) = args else {
                return unknown();
            };
            let mut words = args.splitn(2, ' ');
            let network = words.next().and_then(Network::from_slug);
            let url = words.next().map(|s| s.trim().to_string());
            match network {
                Some(network) => Command::Network(network, url),
                None => unknown(),
            }
        }
        "endpoint" | "ep" => args.map(Command::Endpoint).unwrap_or_else(unknown),
        "contract" | "c" => args.map(Command::Contract).unwrap_or_else(unknown),
        "tables" => Command::Tables,
        "actions" => Command::Actions,
        "table" | "t" => args.map(Command::Table).unwrap_or_else(unknown),
        "scope" | "s" => args.map(Command::Scope).unwrap_or_else(unknown),
        "cscope" | "custom-scope" => args.map(Command::CustomScope).unwrap_or_else(unknown),

        "search" | "find" | "/" => match args {
            Some(key) => Command::Search(key),
            None => Command::ClearSearch,
        },
        "clear" => Command::ClearSearch,
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "more" => Command::More,
        "refresh" | "r" => Command::Refresh,

        "action" | "act" => args.map(Command::Action).unwrap_or_else(unknown),
        "set" => {
            let Some(args) = args else {
                return unknown();
            };
            match args.split_once(' ') {
                Some((field, value)) => Command::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                },
                None => Command::Set {
                    field: args,
                    value: String::new(),
                },
            }
        }
        "cmd" | "command" => Command::CopyCommand,

        "go" | "open" => args.map(Command::Go).unwrap_or_else(unknown),
        "copy" | "yank" => Command::CopyLocation,
        "recent" | "history" => Command::Recent,

        "export" => match args.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("csv") => Command::Export(ExportFormat::Csv),
            Some("json") => Command::Export(ExportFormat::Json),
            Some(_) => unknown(),
        },
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" => Command::Quit,

        _ => unknown(),
    }
}
