//! Tracing subscriber setup shared by both services
//!
//! `RUST_LOG` takes precedence; otherwise the configured level applies to
//! the service crate and to `duodeck_common`.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the default filter directive for a service crate
///
/// ```
/// assert_eq!(
///     duodeck_common::logging::default_directive("duodeck_xc", "debug"),
///     "duodeck_xc=debug,duodeck_common=debug"
/// );
/// ```
pub fn default_directive(crate_name: &str, level: &str) -> String {
    format!("{crate_name}={level},duodeck_common={level}")
}

/// Install the global tracing subscriber
///
/// Logs go to stderr, or are appended to `config.file` when set.
pub fn init(config: &LoggingConfig, crate_name: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(crate_name, &config.level).into());

    let (stderr_layer, file_layer) = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    Error::Config(format!("Failed to open log file {}: {}", path.display(), e))
                })?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to install tracing subscriber: {}", e)))
}
