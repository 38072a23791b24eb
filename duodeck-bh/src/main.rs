//! Button handler (duodeck-bh) - Main entry point
//!
//! Wires the GPIO sampler, the gesture classifier and the action
//! dispatcher together and runs until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use duodeck_bh::actions::{self, ActionHandler, ActionSettings};
use duodeck_bh::gesture::GestureClassifier;
use duodeck_bh::gpio::SysfsButton;
use duodeck_bh::system::{self, Systemctl, SystemctlPower};
use duodeck_common::config::{Config, CONFIG_ENV_VAR};
use duodeck_common::deck::MpcPort;
use duodeck_common::shutdown::shutdown_signal;
use duodeck_common::{logging, FadeCurve, PlaybackPort};
use tokio::sync::mpsc;
use tracing::info;

/// Command-line arguments for duodeck-bh
#[derive(Parser, Debug)]
#[command(name = "duodeck-bh")]
#[command(about = "Single-button control for the duodeck jukebox")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// GPIO line, BCM numbering (overrides `button.pin`)
    #[arg(long)]
    pin: Option<u32>,

    /// Pause/resume fade curve: linear, s_curve or equal_power
    /// (overrides `button.fade_curve`)
    #[arg(long, value_parser = parse_curve)]
    fade_curve: Option<FadeCurve>,
}

fn parse_curve(s: &str) -> std::result::Result<FadeCurve, String> {
    FadeCurve::from_str(s).ok_or_else(|| format!("unknown fade curve: {}", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) =
        Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(pin) = args.pin {
        config.button.pin = pin;
    }
    if let Some(curve) = args.fade_curve {
        config.button.fade_curve = curve;
    }

    logging::init(&config.logging, "duodeck_bh").context("Failed to initialize logging")?;
    info!("Starting duodeck-bh v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", source);

    let decks: Vec<Arc<dyn PlaybackPort>> = MpcPort::pair(&config.decks)
        .into_iter()
        .map(|deck| Arc::new(deck) as Arc<dyn PlaybackPort>)
        .collect();
    let skip = system::skip_trigger(&config.control).context("Failed to set up skip requests")?;
    let power = Arc::new(SystemctlPower::new(Systemctl::new(config.control.use_sudo)));
    let handler = Arc::new(ActionHandler::new(
        decks,
        skip,
        power,
        ActionSettings::from(&config.button),
    ));

    let button = SysfsButton::from_config(&config.button);
    button
        .open()
        .await
        .with_context(|| format!("Failed to open GPIO{}", config.button.pin))?;

    let (edge_tx, edge_rx) = mpsc::channel(32);
    let (gesture_tx, gesture_rx) = mpsc::unbounded_channel();
    let classifier = GestureClassifier::new(config.button.double_press_window(), edge_rx, gesture_tx);

    tokio::spawn(button.run(edge_tx));
    tokio::spawn(classifier.run());
    tokio::spawn(actions::dispatch(handler, gesture_rx));

    info!(
        "Listening on GPIO{} (single/double/long). hold={}s double_window={}s",
        config.button.pin, config.button.hold_seconds, config.button.double_press_window_seconds
    );
    info!(
        "Pause/resume fade: {}s, {} steps, {}",
        config.button.fade_seconds, config.button.fade_steps, config.button.fade_curve
    );

    shutdown_signal().await;
    info!("Exiting");
    Ok(())
}
