// services/log-viewer/src/main.rs
//
// Terminal log viewer for the proxy's /api/logs and /api/health endpoints
//
// Run with: cargo run --bin log-viewer -- --demo

use std::fs::OpenOptions;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use log_viewer::api::{HttpLogSource, LogSource};
use log_viewer::app::{App, Command};
use log_viewer::clipboard::SystemClipboard;
use log_viewer::config::{load_config, Overrides, ViewerConfig};
use log_viewer::filter::LogFilter;
use log_viewer::mock::MockLogSource;
use log_viewer::poller::{PollEvent, Poller};
use log_viewer::state::ViewState;
use log_viewer::ui::draw_ui;

/// Upper bound on how long a frame waits for input before redrawing.
const FRAME_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "log-viewer")]
#[command(about = "Terminal viewer for the proxy's structured logs and health")]
#[command(version)]
struct Args {
    /// Config file (TOML/YAML/JSON)
    #[arg(long, short)]
    config: Option<String>,

    /// Run in demo mode with simulated traffic (no proxy required)
    #[arg(long, short)]
    demo: bool,

    /// Proxy base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long)]
    refresh_ms: Option<u64>,

    /// Name of the upstream service, used in flow labels
    #[arg(long)]
    upstream: Option<String>,

    /// Initial level filter (ALL, ERROR, WARN, INFO, DEBUG)
    #[arg(long)]
    level: Option<String>,

    /// Directory for downloaded log files
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// File receiving the viewer's own diagnostics
    #[arg(long)]
    log_file: Option<String>,

    /// Start with auto-refresh off
    #[arg(long)]
    paused: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            refresh_ms: self.refresh_ms,
            upstream: self.upstream.clone(),
            level: self.level.clone(),
            export_dir: self.export_dir.clone(),
            log_file: self.log_file.clone(),
            paused: self.paused,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref(), args.overrides())?;

    init_tracing(&config)?;
    info!("Starting log viewer");
    info!("Config: {:?}", config);

    let runtime = tokio::runtime::Runtime::new()?;

    let source: Arc<dyn LogSource> = if args.demo {
        Arc::new(MockLogSource::new(config.view.upstream_name.clone()))
    } else {
        Arc::new(HttpLogSource::new(&config.api)?)
    };
    let source_label = source.describe();

    let (tx, rx) = mpsc::unbounded_channel();
    let mut poller = Poller::new(
        runtime.handle().clone(),
        source,
        config.api.poll_interval(),
        tx,
    );

    let state = ViewState::new(
        config.view.upstream_name.clone(),
        LogFilter::new(config.view.level_filter()?, ""),
        config.view.auto_refresh,
    );
    poller.launch(state.auto_refresh);

    let mut app = App::new(
        state,
        Box::new(SystemClipboard::new()),
        config.view.export_dir.clone(),
        args.demo,
        source_label,
    );

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_app(&mut terminal, &mut app, &mut poller, rx);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    poller.set_enabled(false);
    info!("Log viewer stopped");
    result
}

/// The terminal is owned by the UI, so diagnostics go to a file.
fn init_tracing(config: &ViewerConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.observability.log_file)
        .with_context(|| format!("opening log file {}", config.observability.log_file))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "log_viewer={},svckit={}",
            config.observability.log_level, config.observability.log_level
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .init();

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    poller: &mut Poller,
    mut events: UnboundedReceiver<PollEvent>,
) -> Result<()> {
    loop {
        while let Ok(event) = events.try_recv() {
            app.state.apply_poll(event);
        }

        terminal.draw(|frame| draw_ui(frame, app))?;

        if event::poll(FRAME_TIMEOUT)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.handle_key(key) {
                        Command::Quit => return Ok(()),
                        Command::SetPolling(enabled) => poller.set_enabled(enabled),
                        Command::RefreshLogs => poller.refresh_logs_now(),
                        Command::None => {}
                    }
                }
            }
        }
    }
}
