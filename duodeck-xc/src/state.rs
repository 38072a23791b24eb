//! Shared scheduler state
//!
//! The scheduler is the only writer; the control API reads snapshots.

use crate::skip::SkipSignal;
use chrono::{DateTime, Utc};
use duodeck_common::control::{SchedulerPhase, StatusResponse};
use duodeck_common::{DeckId, TrackPosition};
use tokio::sync::RwLock;

/// What the scheduler last published about itself
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSnapshot {
    pub phase: SchedulerPhase,
    pub active: DeckId,
    pub standby: DeckId,
    pub index: usize,
    pub playlist_len: usize,
    pub track: Option<String>,
    pub position: Option<TrackPosition>,
    pub transitions: u64,
    pub last_transition_at: Option<DateTime<Utc>>,
}

/// State shared between the scheduler and the control API
pub struct SharedState {
    snapshot: RwLock<SchedulerSnapshot>,
    skip: SkipSignal,
    started_at: DateTime<Utc>,
}

impl SharedState {
    pub fn new(active: DeckId, standby: DeckId, playlist_len: usize, skip: SkipSignal) -> Self {
        Self {
            snapshot: RwLock::new(SchedulerSnapshot {
                phase: SchedulerPhase::Priming,
                active,
                standby,
                index: 0,
                playlist_len,
                track: None,
                position: None,
                transitions: 0,
                last_transition_at: None,
            }),
            skip,
            started_at: Utc::now(),
        }
    }

    pub fn skip(&self) -> &SkipSignal {
        &self.skip
    }

    pub async fn snapshot(&self) -> SchedulerSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Apply `f` to the published snapshot
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut SchedulerSnapshot),
    {
        let mut snapshot = self.snapshot.write().await;
        f(&mut snapshot);
    }

    pub async fn set_phase(&self, phase: SchedulerPhase) {
        self.update(|s| s.phase = phase).await;
    }

    /// Build the `/status` response
    pub async fn status(&self) -> StatusResponse {
        let s = self.snapshot().await;
        StatusResponse {
            phase: s.phase,
            active_deck: s.active,
            standby_deck: s.standby,
            playlist_index: s.index,
            playlist_len: s.playlist_len,
            track: s.track,
            position: s.position,
            transitions: s.transitions,
            pending_skips: self.skip.pending(),
            skips_received: self.skip.received(),
            started_at: self.started_at,
            last_transition_at: s.last_transition_at,
        }
    }
}
