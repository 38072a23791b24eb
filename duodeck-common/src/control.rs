//! Control-plane wire types
//!
//! The crossfade controller serves these over HTTP; the button handler
//! consumes them. Paths are relative to the controller's base URL.

use crate::deck::{DeckId, TrackPosition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request an immediate crossfade
pub const SKIP_PATH: &str = "/skip";
/// Scheduler snapshot
pub const STATUS_PATH: &str = "/status";
/// Liveness
pub const HEALTH_PATH: &str = "/health";

/// Scheduler state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    Priming,
    SteadyWait,
    OverlapTransition,
    OverlapHold,
    RoleSwap,
}

impl std::fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SchedulerPhase::Priming => "priming",
            SchedulerPhase::SteadyWait => "steady-wait",
            SchedulerPhase::OverlapTransition => "overlap-transition",
            SchedulerPhase::OverlapHold => "overlap-hold",
            SchedulerPhase::RoleSwap => "role-swap",
        };
        f.write_str(name)
    }
}

/// Response to `POST /skip`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipResponse {
    pub accepted: bool,
    /// Skip credits waiting to be consumed after this request
    pub pending: u64,
}

/// Response to `GET /status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub phase: SchedulerPhase,
    pub active_deck: DeckId,
    pub standby_deck: DeckId,
    pub playlist_index: usize,
    pub playlist_len: usize,
    pub track: Option<String>,
    pub position: Option<TrackPosition>,
    pub transitions: u64,
    pub pending_skips: u64,
    pub skips_received: u64,
    pub started_at: DateTime<Utc>,
    pub last_transition_at: Option<DateTime<Utc>>,
}

/// Response to `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    /// `<git hash> <build timestamp>`
    pub build: String,
}
