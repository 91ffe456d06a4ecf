use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, normalize_backend_url, ControllerEvent, RoundOutcome, SessionController,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::{dispatch, parse_command, UiCommand, HELP_TEXT};

#[derive(Parser, Debug)]
#[command(name = "song-genie", about = "Think of a song; the genie will guess it")]
struct Args {
    /// Backend address, overriding genie.toml and the environment.
    #[arg(long)]
    backend_url: Option<String>,
    /// Pause between the genie's reaction and the backend call.
    #[arg(long)]
    pacing_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.backend_url {
        settings.backend_url = url;
    }
    if let Some(pacing_ms) = args.pacing_ms {
        settings.pacing_delay_ms = pacing_ms;
    }
    settings.backend_url = normalize_backend_url(&settings.backend_url)?;
    tracing::info!(backend_url = %settings.backend_url, "song genie starting");

    let controller =
        SessionController::from_settings(&settings).context("failed to build backend client")?;

    let mut events = controller.subscribe();
    let renderer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ControllerEvent::StateChanged(snapshot)) => {
                    println!("{}\n", render::render_snapshot(&snapshot));
                }
                Ok(ControllerEvent::RoundFinished(RoundOutcome::Solved {
                    title,
                    confidence_percent,
                })) => {
                    tracing::info!(%title, confidence_percent, "round finished with a guess");
                }
                Ok(ControllerEvent::RoundFinished(outcome)) => {
                    tracing::debug!(?outcome, "round finished");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "renderer fell behind controller events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("{}", HELP_TEXT);
    println!("{}\n", render::render_snapshot(&controller.snapshot().await));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(notice) => {
                println!("{notice}");
                continue;
            }
        };
        if command == UiCommand::Quit {
            break;
        }
        if let Some(notice) = dispatch(&controller, command).await {
            println!("{notice}");
        }
    }

    controller.shutdown().await;
    renderer.abort();
    Ok(())
}
