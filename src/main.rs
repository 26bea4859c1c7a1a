//! user-dashboard binary entry point.
//!
//! Parses options, sets up file logging and the fetch runtime, runs the TUI
//! event loop, and restores the terminal state on exit.
//!
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;
use tracing_subscriber::EnvFilter;

use user_dashboard::api::{CachingSource, HttpUserSource, UserSource};
use user_dashboard::app::keymap::Keymap;
use user_dashboard::app::{self, AppState, Theme};
use user_dashboard::config::Cli;
use user_dashboard::model::User;
use user_dashboard::store::UserStore;

/// Log to a file; the terminal belongs to the TUI.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();
    Ok(())
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn build_app(cli: &Cli, runtime: &tokio::runtime::Runtime) -> Result<AppState> {
    let http = HttpUserSource::new(&cli.api_url, cli.timeout()).context("create HTTP client")?;
    let (initial, source): (Vec<User>, Arc<dyn UserSource>) = match cli.cache() {
        Some(cache) => {
            let initial = cache.load_fresh(cli.cache_ttl()).unwrap_or_default();
            let source: Arc<dyn UserSource> = Arc::new(CachingSource::new(http, cache));
            (initial, source)
        }
        None => {
            let source: Arc<dyn UserSource> = Arc::new(http);
            (Vec::new(), source)
        }
    };
    let store = UserStore::initialize(initial, source.clone(), runtime.handle(), cli.debounce());
    Ok(AppState::new(store, source, runtime.handle().clone())
        .with_theme(Theme::load_or_init(&cli.config_file("theme.conf")))
        .with_keymap(Keymap::load_or_init(&cli.config_file("keybinds.conf"))))
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file())?;
    info!(api_url = %cli.api_url, "starting user-dashboard");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    let mut app = build_app(&cli, &runtime)?;

    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    drop(app);
    runtime.shutdown_timeout(Duration::from_millis(200));

    if let Err(err) = res {
        eprintln!("application error: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}
