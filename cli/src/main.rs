use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use snooze_tui::{config::load_config, App, Event, EventHandler};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Browse, post and favorite Hack or Snooze stories from the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// SQLite file holding the saved login
    #[arg(long, default_value = "snooze.db")]
    db: PathBuf,

    /// Config file; defaults to config.toml next to the database
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the API base URL from the config file
    #[arg(long)]
    api_url: Option<String>,

    /// Log file (the terminal is taken by the UI)
    #[arg(long, default_value = "snooze.log")]
    log: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = File::create(&args.log)
        .with_context(|| format!("Failed to create log file {}", args.log.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let config_path = args.config.clone().unwrap_or_else(|| {
        args.db
            .parent()
            .map(|dir| dir.join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    });
    let mut config = load_config(&config_path)?;
    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }
    info!("Starting with database {}", args.db.display());

    let mut app = App::new(&args.db, config)?;
    if let Err(err) = app.startup().await {
        app.report(err);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let event_handler = EventHandler::new(250);
    let result = run_app(&mut terminal, &mut app, &event_handler).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!("{:#}", err);
        eprintln!("Error: {:?}", err);
    }
    info!("Bye");

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|f| snooze_tui::ui::render(f, app))?;

        match event_handler.next()? {
            Event::Key(key) => snooze_tui::event::handle_key_event(key, app).await,
            Event::Tick => app.tick(),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
