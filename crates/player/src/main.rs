//! Phantom Log Player - terminal composition root.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phantomlog_domain::SessionId;
use phantomlog_player::infrastructure::clock::SystemClock;
use phantomlog_player::infrastructure::http_client::EngineHttpClient;
use phantomlog_player::ports::outbound::{ClockPort, EnginePort};
use phantomlog_player::ui::{parse_command, render, Command, HELP};
use phantomlog_player::{ClientConfig, GameClient, ViewState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Logs go to stderr so they do not interleave with the game transcript.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phantomlog_player=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(engine_url = %config.engine_url, "Starting Phantom Log Player");

    let engine: Arc<dyn EnginePort> = Arc::new(EngineHttpClient::from_config(&config)?);
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
    let client = GameClient::new(engine, clock, config.client_options());

    let printer = tokio::spawn(print_views(client.subscribe()));

    println!("{}\n", HELP);
    if let Err(e) = client.start(&config.player_name).await {
        println!("Could not start a game: {}", e);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = parse_command(&line) else {
            continue;
        };

        match command {
            Command::Act(intent) => {
                if let Err(e) = client.dispatch(intent).await {
                    println!("{}", e);
                }
            }
            Command::Refresh => {
                if let Err(e) = client.refresh().await {
                    println!("{}", e);
                }
            }
            Command::Restart => match client.restart().await {
                Ok(id) => tracing::info!(session_id = %id, "Restarted"),
                Err(e) => println!("Could not restart: {}", e),
            },
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    printer.abort();
    Ok(())
}

/// Print every published view, showing only transcript lines not yet seen.
async fn print_views(mut views: watch::Receiver<ViewState>) {
    let mut shown: Option<(SessionId, usize)> = None;

    while views.changed().await.is_ok() {
        let state = views.borrow_and_update().clone();
        if let Some(line) = render::failure_line(&state) {
            println!("{}", line);
            continue;
        }
        let ViewState::Live(view) = state else {
            continue;
        };

        let from = match shown {
            Some((id, count)) if id == view.session_id() => count,
            _ => 0,
        };
        for line in render::transcript_since(&view, from) {
            println!("{}", line);
        }
        print!("{}", render::status_block(&view));
        shown = Some((view.session_id(), view.state.messages().len()));
    }
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
