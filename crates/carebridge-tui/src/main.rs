use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use carebridge_core::{Config, LoginMode};

mod app;
mod clipboard;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "carebridge")]
#[command(version, about = "Nurse dashboard and patient chat for the CareBridge discharge portal")]
struct Cli {
    /// Backend base URL (overrides CAREBRIDGE_URL and the config file)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in as the nurse and open the dashboard
    Nurse,
    /// Open the patient login prompt
    Patient {
        /// Sign in with the one-time token from the welcome email
        #[arg(long)]
        token: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init()?;

    let config = Config::load()?;
    let base_url = config.resolve_base_url(cli.url.as_deref());
    info!(base_url = %base_url, "Starting CareBridge");

    let mut app = App::new(config, &base_url)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(app.config.health_interval());

    // Subcommands jump straight past the login picker
    match cli.command {
        Some(Commands::Nurse) => app.choose_login_mode(LoginMode::Nurse),
        Some(Commands::Patient { token: true }) => app.choose_login_mode(LoginMode::PatientToken),
        Some(Commands::Patient { token: false }) => app.choose_login_mode(LoginMode::PatientPassword),
        None => {}
    }

    let result = run(&mut app, &mut terminal, &mut events).await;

    tui::restore()?;
    info!("CareBridge closed");
    result
}

async fn run(app: &mut App, terminal: &mut tui::Tui, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
