//! VMR Observatory TUI: read-only signal dashboard.
//!
//! Pages:
//! 1. Observatory: HUD summary of the whole signal table, strategy blurb, disclaimer
//! 2. Stock Scanner: ticker list, scorecards, signal chart, signal history
//!
//! Logs go to `vmr-tui.log` next to the persisted state so they never
//! touch the terminal.

mod app;
mod input;
mod panels;
mod persistence;
mod theme;
mod ui;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use vmr_core::cache::SystemClock;
use vmr_core::config::{self, DashboardConfig};
use vmr_core::query::QueryService;

use crate::app::AppState;

#[derive(Parser)]
#[command(name = "vmr-tui", version)]
#[command(about = "Terminal dashboard for VMR momentum signals", long_about = None)]
struct Cli {
    /// Config file path (falls back to $VMR_CONFIG, then vmr.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_logging() {
    let dir = persistence::app_dir();
    let file = std::fs::create_dir_all(&dir).and_then(|_| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("vmr-tui.log"))
    });
    // No log file, no logging: stderr belongs to the terminal UI.
    let Ok(file) = file else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    // Restore the terminal before printing a panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let config_path = config::resolve_path(cli.config.as_deref());
    let config = DashboardConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let source = config.build_source().context("building table source")?;

    let state_path = persistence::state_path();
    let persisted = persistence::load(&state_path);
    let telemetry = config.telemetry(&persisted.client_id);
    tracing::info!(
        config = %config_path.display(),
        source = source.name(),
        telemetry = telemetry.is_enabled(),
        "starting dashboard"
    );

    let service = QueryService::new(source, config.query_settings(), Arc::new(SystemClock));
    let mut app = AppState::new(service, telemetry, config.display.clone());
    persistence::apply(&mut app, &persisted);
    app.track_page_view();

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    if let Err(e) = persistence::save(&state_path, &persistence::extract(&app, &persisted.client_id)) {
        tracing::warn!(error = %e, "failed to save state");
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let AppState { telemetry, .. } = app;
    let stats = telemetry.shutdown();
    tracing::info!(
        delivered = stats.delivered,
        failed = stats.failed,
        dropped = stats.dropped,
        "telemetry drained"
    );

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        app.sync();
        terminal.draw(|f| ui::draw(f, app))?;

        // 50ms poll keeps the loop responsive without spinning.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}
