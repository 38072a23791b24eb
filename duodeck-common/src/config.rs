//! Configuration loading for both duodeck services
//!
//! One TOML file configures both the crossfade controller and the button
//! handler. Every field has a built-in default, so a missing file (or a
//! missing section) still yields a complete configuration.
//!
//! # Config file resolution
//!
//! 1. Command-line argument / `DUODECK_CONFIG` (highest priority)
//! 2. `~/.config/duodeck/config.toml`
//! 3. `/etc/duodeck/config.toml`
//! 4. Built-in defaults (no file)
//!
//! An explicitly requested file that does not exist is an error; the
//! implicit locations are optional.

use crate::fade_curves::FadeCurve;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file (read by the CLI parsers)
pub const CONFIG_ENV_VAR: &str = "DUODECK_CONFIG";

/// Complete configuration shared by both services
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub decks: DeckConfig,
    pub playlist: PlaylistConfig,
    pub crossfade: CrossfadeConfig,
    pub button: ButtonConfig,
    pub control: ControlConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// The two playback decks (MPD instances)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckConfig {
    /// MPD host; `None` lets mpc use its own default (localhost / MPD_HOST)
    pub host: Option<String>,

    /// TCP ports of deck A and deck B
    pub ports: [u16; 2],

    /// mpc executable
    pub mpc_program: String,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            host: None,
            ports: [6601, 6602],
            mpc_program: "mpc".to_string(),
        }
    }
}

/// Playlist source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// Newline-delimited list of track paths
    pub file: PathBuf,

    /// Music root the track paths are relative to (used for sanity checks only)
    pub music_root: Option<PathBuf>,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("/var/lib/duodeck/playlist.txt"),
            music_root: None,
        }
    }
}

/// Crossfade scheduler timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossfadeConfig {
    /// Seconds before track end at which the next track starts
    pub overlap_seconds: f64,

    /// Crossfade duration for a regular transition
    pub fade_seconds: f64,

    /// Crossfade duration for a skip-triggered transition
    pub immediate_fade_seconds: f64,

    /// Number of volume steps per crossfade
    pub fade_steps: u32,

    /// Full volume level (0-100)
    pub base_volume: u8,

    /// Seek offset applied to the incoming track
    pub incoming_offset_seconds: u64,

    /// Audio server socket whose existence gates startup
    pub audio_socket: Option<PathBuf>,

    /// Maximum wait for the audio server socket
    pub audio_socket_wait_seconds: f64,

    /// Poll interval while waiting for the audio server socket
    pub audio_socket_retry_seconds: f64,
}

impl Default for CrossfadeConfig {
    fn default() -> Self {
        Self {
            overlap_seconds: 15.0,
            fade_seconds: 5.0,
            immediate_fade_seconds: 3.0,
            fade_steps: 50,
            base_volume: 100,
            incoming_offset_seconds: 5,
            audio_socket: Some(PathBuf::from("/run/user/1000/pulse/native")),
            audio_socket_wait_seconds: 10.0,
            audio_socket_retry_seconds: 0.5,
        }
    }
}

impl CrossfadeConfig {
    pub fn overlap(&self) -> Duration {
        secs(self.overlap_seconds)
    }

    pub fn fade(&self) -> Duration {
        secs(self.fade_seconds)
    }

    pub fn immediate_fade(&self) -> Duration {
        secs(self.immediate_fade_seconds)
    }

    pub fn incoming_offset(&self) -> Duration {
        Duration::from_secs(self.incoming_offset_seconds)
    }

    pub fn audio_socket_wait(&self) -> Duration {
        secs(self.audio_socket_wait_seconds)
    }

    pub fn audio_socket_retry(&self) -> Duration {
        secs(self.audio_socket_retry_seconds)
    }
}

/// Physical button and pause/resume fade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    /// GPIO line (BCM numbering)
    pub pin: u32,

    /// Button wired to ground with a pull-up: pressed reads low
    pub pull_up: bool,

    /// Sysfs GPIO root
    pub gpio_root: PathBuf,

    /// Level must be stable this long to count as an edge
    pub bounce_seconds: f64,

    /// Continuous press duration that counts as a long press
    pub hold_seconds: f64,

    /// Window after a release in which a second release makes a double press
    pub double_press_window_seconds: f64,

    /// GPIO sampling interval
    pub sample_interval_ms: u64,

    /// Pause/resume fade duration
    pub fade_seconds: f64,

    /// Pause/resume fade steps
    pub fade_steps: u32,

    /// Pause/resume fade curve
    pub fade_curve: FadeCurve,

    /// Volume restored on resume (0-100)
    pub base_volume: u8,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            pin: 17,
            pull_up: true,
            gpio_root: PathBuf::from("/sys/class/gpio"),
            bounce_seconds: 0.05,
            hold_seconds: 2.0,
            double_press_window_seconds: 0.4,
            sample_interval_ms: 10,
            fade_seconds: 5.0,
            fade_steps: 50,
            fade_curve: FadeCurve::Linear,
            base_volume: 100,
        }
    }
}

impl ButtonConfig {
    pub fn bounce(&self) -> Duration {
        secs(self.bounce_seconds)
    }

    pub fn hold(&self) -> Duration {
        secs(self.hold_seconds)
    }

    pub fn double_press_window(&self) -> Duration {
        secs(self.double_press_window_seconds)
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn fade(&self) -> Duration {
        secs(self.fade_seconds)
    }
}

/// How the button handler asks the crossfade controller to skip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipTransport {
    /// `POST /skip` on the controller's HTTP control API
    Http,
    /// Deliver a signal to the controller's systemd unit
    Signal,
}

/// Control plane between the two services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Serve the HTTP control API from the crossfade controller
    pub enabled: bool,

    /// Listen address of the crossfade controller's control API
    pub listen: SocketAddr,

    /// Base URL the button handler uses to reach the control API
    pub controller_url: String,

    /// Skip delivery used by the button handler
    pub skip_transport: SkipTransport,

    /// systemd unit of the crossfade controller (signal transport)
    pub service_name: String,

    /// Signal delivered to the unit (signal transport)
    pub skip_signal: String,

    /// Prefix systemctl invocations with sudo
    pub use_sudo: bool,

    /// Timeout for control-plane requests
    pub request_timeout_ms: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen: SocketAddr::from(([127, 0, 0, 1], 5750)),
            controller_url: "http://127.0.0.1:5750".to_string(),
            skip_transport: SkipTransport::Http,
            service_name: "crossfade-controller.service".to_string(),
            skip_signal: "USR1".to_string(),
            use_sudo: true,
            request_timeout_ms: 2000,
        }
    }
}

impl ControlConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

impl Config {
    /// Parse a TOML document (missing fields take defaults)
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Read and validate one config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration following the resolution order in the module docs
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok((Self::from_file(path)?, ConfigSource::File(path.to_path_buf())));
        }

        match default_config_candidates().into_iter().find(|p| p.exists()) {
            Some(path) => Ok((Self::from_file(&path)?, ConfigSource::File(path))),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok((config, ConfigSource::Defaults))
            }
        }
    }

    /// Reject configurations the services cannot run with
    pub fn validate(&self) -> Result<()> {
        let [a, b] = self.decks.ports;
        if a == 0 || b == 0 {
            return Err(Error::Config("Deck ports must be non-zero".to_string()));
        }
        if a == b {
            return Err(Error::Config(format!("Both decks use port {}", a)));
        }

        let xf = &self.crossfade;
        for (name, value) in [
            ("crossfade.overlap_seconds", xf.overlap_seconds),
            ("crossfade.fade_seconds", xf.fade_seconds),
            ("crossfade.immediate_fade_seconds", xf.immediate_fade_seconds),
            ("crossfade.audio_socket_wait_seconds", xf.audio_socket_wait_seconds),
            ("crossfade.audio_socket_retry_seconds", xf.audio_socket_retry_seconds),
            ("button.bounce_seconds", self.button.bounce_seconds),
            ("button.fade_seconds", self.button.fade_seconds),
        ] {
            check_seconds(name, value)?;
        }
        for (name, value) in [
            ("button.hold_seconds", self.button.hold_seconds),
            ("button.double_press_window_seconds", self.button.double_press_window_seconds),
        ] {
            check_seconds(name, value)?;
            if value == 0.0 {
                return Err(Error::Config(format!("{} must be greater than zero", name)));
            }
        }

        if xf.fade_seconds > xf.overlap_seconds {
            return Err(Error::Config(format!(
                "crossfade.fade_seconds ({}) exceeds crossfade.overlap_seconds ({})",
                xf.fade_seconds, xf.overlap_seconds
            )));
        }
        if xf.fade_steps == 0 || self.button.fade_steps == 0 {
            return Err(Error::Config("Fade steps must be at least 1".to_string()));
        }
        if xf.base_volume > 100 || self.button.base_volume > 100 {
            return Err(Error::Config("Base volume must be within 0-100".to_string()));
        }
        if self.button.sample_interval_ms == 0 {
            return Err(Error::Config("button.sample_interval_ms must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Implicit config file locations, in priority order
pub fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("duodeck").join("config.toml"));
    }
    candidates.push(PathBuf::from("/etc/duodeck/config.toml"));
    candidates
}

/// Longest accepted duration setting (one day)
const MAX_SECONDS: f64 = 86_400.0;

fn check_seconds(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Config(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, value
        )));
    }
    if value > MAX_SECONDS {
        return Err(Error::Config(format!(
            "{} must be at most {} seconds, got {}",
            name, MAX_SECONDS, value
        )));
    }
    Ok(())
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::MAX)
}
