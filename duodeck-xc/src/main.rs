//! Crossfade controller (duodeck-xc) - Main entry point
//!
//! Loads configuration and the playlist, waits for the audio server, then
//! runs the crossfade scheduler against two MPD decks until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use duodeck_common::config::{Config, CONFIG_ENV_VAR};
use duodeck_common::deck::MpcPort;
use duodeck_common::shutdown::shutdown_signal;
use duodeck_common::{logging, PlaybackPort};
use duodeck_xc::scheduler::{CrossfadeScheduler, DeckPair, SchedulerSettings};
use duodeck_xc::{api, readiness, signals, Playlist, SharedState, SkipSignal};
use tracing::{error, info};

/// Command-line arguments for duodeck-xc
#[derive(Parser, Debug)]
#[command(name = "duodeck-xc")]
#[command(about = "Dual-deck crossfade controller")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Playlist file (overrides `playlist.file`)
    #[arg(short, long)]
    playlist: Option<PathBuf>,

    /// Control API listen address (overrides `control.listen`)
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Disable the control API (SIGUSR1 still requests a skip)
    #[arg(long)]
    no_api: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) =
        Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(playlist) = args.playlist {
        config.playlist.file = playlist;
    }
    if let Some(listen) = args.listen {
        config.control.listen = listen;
    }
    if args.no_api {
        config.control.enabled = false;
    }

    logging::init(&config.logging, "duodeck_xc").context("Failed to initialize logging")?;

    info!(
        "Starting duodeck-xc v{} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );
    info!("Configuration: {}", source);

    let playlist = Playlist::load(&config.playlist.file).context("Failed to load playlist")?;
    info!(
        "Loaded {} tracks from {}",
        playlist.len(),
        config.playlist.file.display()
    );
    if let Some(root) = &config.playlist.music_root {
        playlist.check_against(root);
    }

    if let Some(socket) = &config.crossfade.audio_socket {
        readiness::wait_for_socket(
            socket,
            config.crossfade.audio_socket_wait(),
            config.crossfade.audio_socket_retry(),
        )
        .await;
    }

    let [a, b] = MpcPort::pair(&config.decks);
    let active: Arc<dyn PlaybackPort> = Arc::new(a);
    let standby: Arc<dyn PlaybackPort> = Arc::new(b);

    let skip = SkipSignal::new();
    let state = Arc::new(SharedState::new(
        active.id(),
        standby.id(),
        playlist.len(),
        skip.clone(),
    ));

    if config.control.enabled {
        let listen = config.control.listen;
        let api_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = api::serve(listen, api_state).await {
                error!("Control API stopped: {}", e);
            }
        });
    } else {
        info!("Control API disabled");
    }
    tokio::spawn(signals::forward_skip_signals(skip.clone()));

    let mut scheduler = CrossfadeScheduler::new(
        DeckPair::new(active, standby),
        playlist,
        skip,
        SchedulerSettings::from(&config.crossfade),
        state,
    );

    tokio::select! {
        _ = scheduler.run() => {},
        _ = shutdown_signal() => {},
    }

    info!("Stopping decks");
    scheduler.stop_all().await;
    info!("Shutdown complete");
    Ok(())
}
