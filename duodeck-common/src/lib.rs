//! # duodeck Common Library
//!
//! Shared code for both duodeck services:
//! - Configuration loading (TOML + built-in defaults)
//! - Logging initialization
//! - Deck identifiers, volume and track position types
//! - Playback port adapter (trait + `mpc` implementation)
//! - Fade curve definitions and the volume fade engine
//! - Control-plane request/response types
//! - Graceful shutdown signal

pub mod config;
pub mod control;
pub mod deck;
pub mod error;
pub mod fade;
pub mod fade_curves;
pub mod human_time;
pub mod logging;
pub mod shutdown;

pub use deck::{DeckId, PlaybackPort, Track, TrackPosition, Volume};
pub use error::{Error, Result};
pub use fade_curves::FadeCurve;
