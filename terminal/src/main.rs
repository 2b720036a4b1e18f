use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use common::{SessionController, TilePalette};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::warn;
use url::Url;

use terminal::app::{App, AppCommand};
use terminal::presenter::TerminalPresenter;
use terminal::relay_client;
use terminal::scores::{utc_date_stamp, ScoreApi};
use terminal::storage::LocalStore;
use terminal::ui::{self, UiState};

#[derive(Parser, Debug)]
#[command(name = "echotiles", about = "Repeat the growing tile pattern")]
struct Args {
    /// Base HTTP URL of the score/relay server
    #[arg(long, default_value = "http://localhost:8080")]
    url: String,

    /// Display name; defaults to the last-used name, then "Guest"
    #[arg(long)]
    name: Option<String>,

    /// Path of the local cache file
    #[arg(long, default_value = "echotiles_data.json")]
    data_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; keep them quiet unless RUST_LOG says otherwise, the
    // alternate screen owns stdout.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let base_url = Url::parse(&args.url).context("invalid --url")?;

    let store = LocalStore::new(args.data_file);
    let player_name = args
        .name
        .or_else(|| store.player_name())
        .unwrap_or_else(|| "Guest".to_string());
    store.save_player_name(&player_name)?;

    let ui_state = UiState::shared(player_name.clone());
    let score_api = ScoreApi::new(base_url.clone(), store);

    let ws_url = relay_client::websocket_url(&base_url)?;
    let relay = relay_client::connect(ws_url, ui_state.clone()).await;

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut session = SessionController::new(
        TilePalette::standard(),
        seed,
        player_name,
        utc_date_stamp,
        TerminalPresenter::new(ui_state.clone()),
        score_api.clone(),
        relay,
    );

    let (input_tx, mut input_rx) = mpsc::channel(8);
    let session_task = tokio::spawn(async move {
        while let Some(tile) = input_rx.recv().await {
            if let Err(e) = session.press_tile(tile).await {
                warn!("session error: {:#}", e);
            }
            // Anything queued while playback ran is stale input.
            while input_rx.try_recv().is_ok() {}
        }
    });

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(ui_state, input_tx, score_api);
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    session_task.abort();

    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> Result<()> {
    let palette = TilePalette::standard();
    loop {
        let snapshot = app.ui_snapshot();
        terminal.draw(|frame| ui::render(frame, &snapshot, &palette))?;

        // Drain pending key events without blocking the async tasks.
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(AppCommand::Quit) = app.handle_key(key) {
                        return Ok(());
                    }
                }
            }
        }

        tokio::time::sleep(Duration::from_millis(33)).await;
    }
}
