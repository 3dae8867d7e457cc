use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row as TableRow, Table,
    TableState, Wrap,
};
use ratatui::Frame;

pub mod layout;

use crate::app::{App, Focus, InputMode, Overlay, PromptKind, StatusLevel};
use crate::config;
use crate::domain::network::Network;
use crate::domain::session::{RowsState, View};
use crate::domain::table::{columns, format_cell};

// Widest a row cell is drawn before truncation
const MAX_CELL_WIDTH: usize = 32;

pub fn draw(f: &mut Frame, app: &mut App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_sidebar(f, areas.sidebar, app);
    match app.view() {
        View::Tables => {
            draw_scopes(f, areas.scopes, app);
            draw_rows(f, areas.rows, app);
        }
        View::Actions => draw_form(f, areas.content, app),
    }
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    match app.overlay {
        Some(Overlay::Help) => draw_help_popup(f, areas.size),
        Some(Overlay::Networks) => draw_network_popup(f, areas.size, app),
        Some(Overlay::History) => draw_history_popup(f, areas.size, app),
        None => {}
    }
}

fn border_style(app: &App, focus: Focus) -> Style {
    if app.focus == focus && app.overlay.is_none() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn highlight_style(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let session = &app.session;
    let endpoint = session
        .endpoint()
        .unwrap_or_else(|_| "(no endpoint)".to_string());
    let title = Line::from(vec![
        Span::styled(
            "tablescope",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Net", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {} ", session.selection().network.title())),
        Span::styled("API", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {} ", truncate_str(&endpoint, 40))),
        Span::styled("Focus", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {}", app.focus_label())),
    ]);

    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let right_line = match session.chain_info() {
        Some(info) => Line::from(vec![
            Span::styled("Chain ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{}  ", short_id(&info.chain_id))),
            Span::styled("Head ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{}  ", info.head_block_num)),
            Span::styled("Node ", Style::default().fg(Color::DarkGray)),
            Span::raw(info.server_version.clone()),
        ]),
        None if session.is_loading() => Line::from(Span::styled(
            "loading…",
            Style::default().fg(Color::DarkGray),
        )),
        None => Line::from(Span::styled("--", Style::default().fg(Color::DarkGray))),
    };
    let right = Paragraph::new(right_line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let selection = app.session.selection();
    let view = app.view();
    let active = match view {
        View::Tables => selection.table.clone(),
        View::Actions => app.session.form().map(|form| form.action.clone()),
    };
    let names = app.sidebar_items();

    let items: Vec<ListItem> = if names.is_empty() {
        let text = match selection.contract.as_deref() {
            None => "No contract".to_string(),
            Some(_) if app.session.interface().is_none() => "No interface".to_string(),
            Some(_) => match view {
                View::Tables => "No tables".to_string(),
                View::Actions => "No actions".to_string(),
            },
        };
        vec![ListItem::new(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        names
            .iter()
            .map(|name| {
                let is_active = active.as_deref() == Some(name.as_str());
                let style = if is_active {
                    Style::default()
                        .fg(Color::LightCyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                let mut spans = vec![Span::raw(name.clone())];
                if is_active {
                    spans.push(Span::raw(" *"));
                }
                ListItem::new(Line::from(spans)).style(style)
            })
            .collect()
    };

    let title = format!(
        "{} [{}]",
        selection.contract.as_deref().unwrap_or("--"),
        match view {
            View::Tables => "tables",
            View::Actions => "actions",
        }
    );
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style(app, Focus::Sidebar)),
        )
        .highlight_style(highlight_style(app, Focus::Sidebar))
        .highlight_symbol("-> ");

    let mut state = ListState::default();
    if !names.is_empty() {
        state.select(Some(app.selected_item));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_scopes(f: &mut Frame, area: Rect, app: &App) {
    let labels = app.scope_labels();
    let current = app.session.selection().scope.as_deref();

    let mut items: Vec<ListItem> = app
        .session
        .scopes()
        .iter()
        .zip(labels)
        .map(|(scope, label)| {
            let style = if current == Some(scope.scope.as_str()) {
                Style::default().fg(Color::LightCyan)
            } else {
                Style::default()
            };
            ListItem::new(label).style(style)
        })
        .collect();
    let empty = items.is_empty();
    if empty {
        let text = if app.session.selection().table.is_none() {
            "Select a table"
        } else if app.session.is_loading() {
            "loading…"
        } else {
            "No scopes"
        };
        items.push(ListItem::new(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        )));
    }

    let mut title = "Scopes".to_string();
    if app.session.is_custom_scope() {
        if let Some(scope) = current {
            title = format!("Scopes (custom: {scope})");
        }
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style(app, Focus::Scopes)),
        )
        .highlight_style(highlight_style(app, Focus::Scopes))
        .highlight_symbol(">> ");

    let mut state = ListState::default();
    if !empty {
        state.select(Some(app.selected_scope));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn rows_title(app: &App) -> String {
    let session = &app.session;
    let mut title = format!("Rows  page {}", session.page_index() + 1);
    if session.has_more() {
        title.push_str(" (more)");
    }
    if let (Some(field), Some(key)) = (session.search_field(), session.search_key()) {
        title.push_str(&format!("  {field} = {key}"));
    }
    title
}

fn draw_rows(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(rows_title(app))
        .border_style(border_style(app, Focus::Rows));

    let rows = app.session.rows();
    let placeholder = match app.session.rows_state() {
        RowsState::Loading if rows.is_empty() => Some("loading…"),
        RowsState::Empty => Some("No rows in this scope"),
        RowsState::NotLoaded => Some("Select a scope"),
        _ => None,
    };
    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let header_names = columns(rows);
    let header = TableRow::new(header_names.iter().map(|name| {
        Cell::from(name.clone()).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    }));
    let body: Vec<TableRow> = rows
        .iter()
        .map(|row| {
            TableRow::new(header_names.iter().map(|name| {
                let text = row.get(name).map(format_cell).unwrap_or_default();
                Cell::from(truncate_str(&text, MAX_CELL_WIDTH))
            }))
        })
        .collect();
    let widths: Vec<Constraint> = header_names
        .iter()
        .map(|name| {
            let widest = rows
                .iter()
                .filter_map(|row| row.get(name))
                .map(|value| format_cell(value).chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(4);
            Constraint::Min(widest.min(MAX_CELL_WIDTH) as u16)
        })
        .collect();

    let table = Table::new(body, widths)
        .header(header)
        .block(block)
        .column_spacing(2)
        .highlight_style(highlight_style(app, Focus::Rows))
        .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(Some(app.selected_row));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_form(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(6)])
        .split(area);

    let Some(form) = app.session.form() else {
        let paragraph = Paragraph::new(Span::styled(
            "Select an action",
            Style::default().fg(Color::DarkGray),
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Action")
                .border_style(border_style(app, Focus::Form)),
        );
        f.render_widget(paragraph, area);
        return;
    };

    let mut items: Vec<ListItem> = form
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let value = form.value_at(index).unwrap_or_default();
            let mut lines = vec![Line::from(vec![
                Span::styled(
                    format!("{} ", field.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("({}) ", field.kind), Style::default().fg(Color::DarkGray)),
                Span::raw(if value.is_empty() { "--" } else { value }.to_string()),
            ])];
            if let Some(error) = form.error(&field.name) {
                lines.push(Line::from(Span::styled(
                    format!("   {error}"),
                    Style::default().fg(Color::LightRed),
                )));
            }
            ListItem::new(Text::from(lines))
        })
        .collect();
    let empty = items.is_empty();
    if empty {
        items.push(ListItem::new(Span::styled(
            "No parameters",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Action {}", form.action))
                .border_style(border_style(app, Focus::Form)),
        )
        .highlight_style(highlight_style(app, Focus::Form))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !empty {
        state.select(Some(app.selected_field));
    }
    f.render_stateful_widget(list, chunks[0], &mut state);

    let preview = match app.session.command() {
        Ok(command) => Span::raw(command),
        Err(err) => Span::styled(err.to_string(), Style::default().fg(Color::LightYellow)),
    };
    let paragraph = Paragraph::new(Line::from(preview))
        .block(Block::default().borders(Borders::ALL).title("Command (c to copy)"))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, chunks[1]);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let location = app.session.location().to_path();
    let mut spans = vec![
        Span::styled("At ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", location)),
        Span::styled("Rows ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.session.rows().len().to_string()),
    ];
    if let Some(field) = app.session.search_field() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("Search ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(field));
    }
    if app.session.is_loading() {
        spans.push(Span::styled("  loading…", Style::default().fg(Color::Yellow)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("contract", "Open a contract account"),
        ("network", "mainnet | testnet | custom <url>"),
        ("endpoint", "Use a custom chain API"),
        ("tables", "List tables"),
        ("actions", "List actions"),
        ("table", "Open a table"),
        ("scope", "Open a discovered scope"),
        ("cscope", "Open any scope"),
        ("search", "Look up a row by key"),
        ("clear", "Clear the search"),
        ("next", "Next page"),
        ("prev", "Previous page"),
        ("more", "Append the next page"),
        ("refresh", "Reload"),
        ("action", "Open an action form"),
        ("set", "set <field> <value>"),
        ("cmd", "Copy the signer command"),
        ("go", "Open a location path"),
        ("copy", "Copy the location"),
        ("recent", "Recently visited"),
        ("export", "export [csv|json]"),
        ("help", "Key bindings"),
        ("quit", "Quit"),
    ];

    for (cmd, desc) in commands {
        if cmd.starts_with(&input) {
            return Some(desc);
        }
    }
    None
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint = command_hint(&app.command.input);
            let hint_text = hint.unwrap_or("contract <account> | table <name> | help");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(&app.command.input),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Prompt(kind) => {
            let label = match (kind, app.prompt_context.as_deref()) {
                (PromptKind::Search, Some(field)) => format!("> {field} "),
                (PromptKind::Param, Some(field)) => format!("> {field} "),
                _ => format!("> {} ", kind.label()),
            };
            Line::from(vec![
                Span::styled(label, Style::default().fg(Color::LightCyan)),
                Span::raw(&app.command.input),
                Span::styled("  (Enter=ok Esc=cancel)", Style::default().fg(Color::DarkGray)),
            ])
        }
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text, Style::default().fg(color)),
                ])
            } else {
                key_hints(app)
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn key_hints(app: &App) -> Line<'static> {
    let hints: &[(&str, &str)] = match (app.view(), app.focus) {
        (View::Actions, Focus::Form) => &[("Enter", "edit"), ("c", "copy cmd"), ("t", "tables")],
        (View::Actions, _) => &[("Enter", "open"), ("t", "tables"), ("c", "contract")],
        (View::Tables, Focus::Rows) => &[
            ("[ ]", "page"),
            ("m", "more"),
            ("/", "search"),
            ("e", "export"),
            ("y", "copy"),
        ],
        (View::Tables, _) => &[("Enter", "open"), ("s", "scope"), ("a", "actions"), ("N", "network")],
    };
    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(
            key.to_string(),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::styled(
            format!(" {label}  "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(Span::styled("? help", Style::default().fg(Color::DarkGray)));
    Line::from(spans)
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = layout::centered_rect(64, 70, area);
    f.render_widget(Clear, popup_area);

    let config_path = config::config_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "(unknown)".to_string());

    let lines = vec![
        Line::from("Navigation"),
        Line::from("  Tab / S-Tab Cycle focus"),
        Line::from("  j / k      Move selection"),
        Line::from("  Enter      Open / edit"),
        Line::from("  t / a      Tables / actions"),
        Line::from("  c          Open contract"),
        Line::from("  N          Switch network"),
        Line::from("  H          Recent locations"),
        Line::from(""),
        Line::from("Rows"),
        Line::from("  ] / [      Next / previous page"),
        Line::from("  m          Load more"),
        Line::from("  /          Search by key"),
        Line::from("  x          Clear search"),
        Line::from("  s          Custom scope"),
        Line::from("  r          Refresh"),
        Line::from("  e / E      Export CSV / JSON"),
        Line::from(""),
        Line::from("Other"),
        Line::from("  y          Copy location"),
        Line::from("  C          Copy action command (c in the form)"),
        Line::from("  :          Command line"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from(format!("Config: {config_path}")),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn draw_network_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = layout::centered_rect(50, 30, area);
    f.render_widget(Clear, popup_area);

    let settings = app.session.settings();
    let current = app.session.selection().network;
    let items: Vec<ListItem> = Network::ALL
        .iter()
        .map(|network| {
            let host = match network {
                Network::Mainnet => settings.hosts.mainnet.clone(),
                Network::Testnet => settings.hosts.testnet.clone(),
                Network::Custom => app
                    .session
                    .selection()
                    .custom_endpoint
                    .clone()
                    .unwrap_or_else(|| "enter a URL".to_string()),
            };
            let marker = if *network == current { " *" } else { "" };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{}{}  ", network.title(), marker)),
                Span::styled(host, Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title("Network").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.selected_network));
    f.render_stateful_widget(list, popup_area, &mut state);
}

fn draw_history_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = layout::centered_rect(70, 60, area);
    f.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = if app.history.is_empty() {
        vec![ListItem::new(Span::styled(
            "Nothing visited yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.history
            .iter()
            .map(|entry| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{}  ", entry.visited_at.format("%Y-%m-%d %H:%M")),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(entry.path.clone()),
                ]))
            })
            .collect()
    };

    let list = List::new(items)
        .block(Block::default().title("Recent").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !app.history.is_empty() {
        state.select(Some(app.selected_history));
    }
    f.render_stateful_widget(list, popup_area, &mut state);
}

fn short_id(value: &str) -> String {
    if value.len() <= 12 {
        return value.to_string();
    }
    let start: String = value.chars().take(8).collect();
    format!("{start}…")
}

fn truncate_str(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    value.chars().take(max).collect::<String>() + "…"
}
