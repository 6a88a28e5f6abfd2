use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use taskboard::app::App;
use taskboard::config::Config;
use taskboard::notify::Toasts;
use taskboard::record::{HttpTransport, RecordClient, RecordTransport};
use taskboard::routes::Route;
use taskboard::services::Services;
use taskboard::{demo, logging, ui};

#[derive(Parser, Debug)]
#[command(name = "taskboard", about = "Projects, tasks and team in the terminal")]
struct Cli {
    /// Page to open first, e.g. `/board` or `/projects/3`.
    #[arg(long, default_value = "/")]
    route: Route,

    /// Use a seeded in-memory store instead of the record service.
    #[arg(long)]
    demo: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err).context("reading .env");
        }
    }
    let config = Config::from_env()?;
    let _log_guard = logging::init(&config.log_dir)?;

    let transport: Arc<dyn RecordTransport> = if cli.demo {
        tracing::info!("running against the demo store");
        Arc::new(demo::transport(Duration::from_millis(300)))
    } else {
        Arc::new(HttpTransport::from_config(&config)?)
    };
    let toasts = Toasts::default();
    let client = RecordClient::new(transport, Arc::new(toasts.clone()));
    let services = Services::new(client, config.delete_policy);

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let mut app = App::new(services, toasts, tx);
    app.navigate(cli.route);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app, rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(%err, "terminal loop failed");
    }
    result.context("running terminal UI")
}
