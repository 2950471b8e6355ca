use anyhow::{Context, Result};
use clap::Parser;
use common::{ServiceKind, DEFAULT_FALLBACK_URL, DEFAULT_SERVICE_URL};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use terminal::app::{App, AppCommand, TerminalConfig};

const LOG_FILE: &str = "pablo-terminal.log";

#[derive(Parser, Debug)]
#[command(author, version, about = "Pablo el Devorador in the terminal", long_about = None)]
struct Args {
    /// Leaderboard service base URL
    #[arg(long, default_value = DEFAULT_SERVICE_URL)]
    service_url: String,

    /// Which service speaks at that URL: proxy or direct
    #[arg(long, default_value = "proxy")]
    service_kind: ServiceKind,

    /// Static leaderboard document used when the service is down
    #[arg(long, default_value = DEFAULT_FALLBACK_URL)]
    fallback_url: String,

    /// Where local scores and preferences are kept
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Never talk to a leaderboard service
    #[arg(long)]
    offline: bool,
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".pablo-devorador"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    // The terminal belongs to the UI, so logs go to a file
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))
        .context("Failed to open log file")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let config = TerminalConfig {
        service_url: args.service_url,
        service_kind: args.service_kind,
        fallback_url: Some(args.fallback_url).filter(|url| !url.trim().is_empty()),
        data_dir,
        offline: args.offline,
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let mut app = App::new(&config, runtime.handle().clone())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Let in-flight submissions finish
    runtime.shutdown_timeout(Duration::from_secs(2));

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut last_update = Instant::now();

    loop {
        let now = Instant::now();
        let dt = now.duration_since(last_update);
        last_update = now;

        app.update(dt);

        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(command) = app.handle_input(key) {
                    match command {
                        AppCommand::Quit => return Ok(()),
                        _ => app.handle_command(command)?,
                    }
                }
            }
        }
    }
}
