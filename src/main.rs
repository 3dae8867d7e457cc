use std::fs;
use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use tablescope::app::{App, Focus, InputMode, Overlay, PromptKind, StatusLevel};
use tablescope::config::{self, Config};
use tablescope::core::ExportFormat;
use tablescope::domain::network::Network;
use tablescope::domain::session::{Location, Session, View};
use tablescope::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
use tablescope::store::HistoryStore;
use tablescope::ui;

#[derive(Debug, Parser)]
#[command(
    name = "tablescope",
    version,
    about = "Browse Antelope contract tables and build action commands"
)]
struct Args {
    /// Network to start on (mainnet, testnet, custom)
    #[arg(long)]
    network: Option<String>,

    /// Chain API endpoint; implies the custom network
    #[arg(long)]
    endpoint: Option<String>,

    /// Contract account to open
    #[arg(long, short)]
    contract: Option<String>,

    /// Location to open, e.g. /mainnet/eosio.token/tables/accounts/alice
    location: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    // before config so load warnings reach the log file
    init_logging();
    let config = config::load();

    let start = start_location(&args, &config)?;
    log::info!("starting at {}", start);

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runtime = RuntimeBridge::new(config.request_timeout())?;

    let mut app = App::new(Session::new(config.session_settings()));
    if let Some(db_path) = config::history_db_path() {
        if let Some(parent) = db_path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match HistoryStore::open(&db_path, config.history_limit) {
            Ok(store) => app.history_store = Some(store),
            Err(err) => app.set_status(format!("History disabled: {err}"), StatusLevel::Warn),
        }
    }

    if start.contract.is_some() {
        let seeded = app.session.seed(&start);
        app.dispatch(seeded);
    } else {
        let switched = app.session.set_network(start.network, start.endpoint.clone());
        app.dispatch(switched);
        if app.status.is_none() {
            app.set_status("Press c to open a contract", StatusLevel::Info);
        }
    }

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

/// Logs go to a file so they never draw over the terminal UI
fn init_logging() {
    let env = env_logger::Env::new()
        .filter_or("TABLESCOPE_LOG", "info")
        .write_style("TABLESCOPE_LOG_STYLE");
    let mut builder = env_logger::Builder::from_env(env);

    let file = config::log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });
    match file {
        Some(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

/// A location argument wins; flags fill in what it leaves out
fn start_location(args: &Args, config: &Config) -> Result<Location> {
    let mut location = match args.location.as_deref() {
        Some(raw) => Location::parse(raw)
            .ok_or_else(|| anyhow::anyhow!("not a tablescope location: {raw}"))?,
        None => Location::new(config.default_network),
    };

    if args.location.is_none() {
        if let Some(network) = args.network.as_deref() {
            location.network = Network::from_slug(network)
                .ok_or_else(|| anyhow::anyhow!("unknown network: {network}"))?;
        }
        if location.network == Network::Custom && location.endpoint.is_none() {
            location.endpoint = config.custom_url.clone();
        }
    }
    if let Some(endpoint) = args.endpoint.as_ref() {
        location.network = Network::Custom;
        location.endpoint = Some(endpoint.clone());
    }
    if let Some(contract) = args.contract.as_ref() {
        location.contract = Some(contract.clone());
        location.view = None;
        location.table = None;
        location.scope = None;
    }
    Ok(location)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &mut app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, &runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::Completed(response) => app.apply_response(response),
            RuntimeEvent::Error { message } => app.apply_runtime_error(message),
        }
    }

    let requests = app.take_requests();
    if !requests.is_empty() {
        if let Err(err) = runtime.execute_all(requests) {
            app.set_status(format!("Runtime unavailable: {err}"), StatusLevel::Error);
        }
    }

    if let Some(text) = app.take_copy_request() {
        copy_to_clipboard(app, text);
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Command => handle_command_mode(app, key),
        InputMode::Prompt(kind) => handle_prompt_mode(app, key, kind),
        InputMode::Normal if app.overlay.is_some() => handle_overlay(app, key),
        InputMode::Normal => handle_normal_mode(app, key),
    }
}

fn handle_overlay(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.overlay = None,
        KeyCode::Char('?') if app.overlay == Some(Overlay::Help) => app.overlay = None,
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(true),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(false),
        KeyCode::Enter => app.activate(),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.open_overlay(Overlay::Help),
        KeyCode::Char(':') => app.enter_command(),
        KeyCode::Char('c') if app.focus == Focus::Form => app.copy_command(),
        KeyCode::Char('c') => app.enter_prompt(PromptKind::Contract, None),
        KeyCode::Char('N') => app.open_overlay(Overlay::Networks),
        KeyCode::Char('H') => app.open_overlay(Overlay::History),
        KeyCode::Tab => app.cycle_focus(true),
        KeyCode::BackTab => app.cycle_focus(false),
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(true),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(false),
        KeyCode::Enter => app.activate(),
        KeyCode::Esc => {
            if app.focus != Focus::Sidebar {
                app.cycle_focus(false);
            }
        }
        KeyCode::Char(']') | KeyCode::Right => app.next_page(),
        KeyCode::Char('[') | KeyCode::Left => app.prev_page(),
        KeyCode::Char('m') => app.load_more(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('/') => app.enter_prompt(PromptKind::Search, None),
        KeyCode::Char('x') => app.clear_search(),
        KeyCode::Char('s') => app.enter_prompt(PromptKind::CustomScope, None),
        KeyCode::Char('t') => app.set_view(View::Tables),
        KeyCode::Char('a') => app.set_view(View::Actions),
        KeyCode::Char('y') => app.copy_location(),
        KeyCode::Char('C') => app.copy_command(),
        KeyCode::Char('e') => app.export(ExportFormat::Csv),
        KeyCode::Char('E') => app.export(ExportFormat::Json),
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Up => {
            if let Some(last) = app.command.last.clone() {
                app.command.input = last;
            }
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}

fn handle_prompt_mode(app: &mut App, key: KeyEvent, kind: PromptKind) {
    match key.code {
        KeyCode::Esc => app.exit_prompt(),
        KeyCode::Enter => app.apply_prompt(kind),
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}

fn copy_to_clipboard(app: &mut App, text: String) {
    use arboard::Clipboard;

    match Clipboard::new() {
        Ok(mut clipboard) => {
            if clipboard.set_text(&text).is_ok() {
                let shown = if text.chars().count() > 40 {
                    format!("{}...", text.chars().take(40).collect::<String>())
                } else {
                    text
                };
                app.set_status(format!("Copied: {shown}"), StatusLevel::Info);
            } else {
                app.set_status("Failed to copy to clipboard", StatusLevel::Error);
            }
        }
        Err(err) => {
            log::warn!("clipboard unavailable: {}", err);
            app.set_status(format!("No clipboard; {text}"), StatusLevel::Warn);
        }
    }
}
