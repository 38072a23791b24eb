//! Playback port adapter
//!
//! A deck is one external playback engine instance (an MPD server) addressed
//! by its TCP port. Both services talk to decks only through the
//! [`PlaybackPort`] trait; [`MpcPort`] is the production implementation.

mod mpc;
pub mod status;

pub use mpc::MpcPort;
pub use status::{OutputInfo, OutputState};

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Logical deck identifier (the MPD TCP port)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(pub u16);

impl DeckId {
    pub fn port(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mpd{}", self.0)
    }
}

/// Playable track path, relative to the playback engine's music root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track(String);

impl Track {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deck volume on the engine's 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(u8);

impl Volume {
    pub const MUTED: Volume = Volume(0);
    pub const FULL: Volume = Volume(100);

    /// Clamp to [0, 100]
    pub fn new(level: u8) -> Self {
        Self(level.min(100))
    }

    /// Convert a computed gain to a volume: clamped to [0, 100], then rounded
    pub fn from_gain(gain: f64) -> Self {
        if gain.is_nan() {
            return Self::MUTED;
        }
        Self(gain.clamp(0.0, 100.0).round() as u8)
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    pub fn is_muted(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Elapsed/total time of the current track, in whole seconds
///
/// Only constructed for a known track length (`total > 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPosition {
    pub elapsed: u64,
    pub total: u64,
}

impl TrackPosition {
    /// Returns `None` for an unknown (zero) total
    pub fn new(elapsed: u64, total: u64) -> Option<Self> {
        (total > 0).then_some(Self { elapsed, total })
    }

    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.elapsed)
    }
}

/// One logical playback deck
///
/// Every command is issued to the engine immediately; the engine is trusted
/// to apply volume and transport changes as soon as they are acknowledged.
#[async_trait]
pub trait PlaybackPort: Send + Sync {
    /// Deck identifier (used in logs and status)
    fn id(&self) -> DeckId;

    /// Replace the deck's queue with `track` and start playing it
    ///
    /// Disabled audio outputs are re-enabled first.
    async fn play(&self, track: &Track) -> Result<()>;

    /// Stop playback and clear the queue
    async fn stop(&self) -> Result<()>;

    /// Resume the transport (play whatever is queued)
    async fn resume(&self) -> Result<()>;

    /// Pause, but only when currently playing
    async fn pause_if_playing(&self) -> Result<()>;

    async fn set_volume(&self, volume: Volume) -> Result<()>;

    /// Current volume; an unreported volume reads as muted
    async fn volume(&self) -> Result<Volume>;

    /// Elapsed/total of the current track; `None` while the engine is not
    /// (yet) reporting a track length
    async fn position(&self) -> Result<Option<TrackPosition>>;

    /// Seek the current track to an absolute offset
    async fn seek(&self, offset: Duration) -> Result<()>;

    /// Enable every audio output that is currently disabled
    async fn ensure_outputs_enabled(&self) -> Result<()>;
}
