//! Test doubles for scheduler tests
//!
//! `FakeDeck` plays tracks against the (paused) tokio clock: elapsed time is
//! derived from when the track started plus any seek offset, so scheduler
//! timing can be checked without a real playback engine.

#![allow(dead_code)]

use async_trait::async_trait;
use duodeck_common::{DeckId, Error, PlaybackPort, Result, Track, TrackPosition, Volume};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Something the scheduler did to a deck, stamped with clock time since
/// the deck was created
#[derive(Debug, Clone, PartialEq)]
pub enum DeckEvent {
    Play(Duration, String),
    Stop(Duration),
    Seek(Duration, Duration),
    Volume(Duration, u8),
}

struct Playing {
    track: Track,
    started: Instant,
    offset: Duration,
}

struct FakeState {
    playing: Option<Playing>,
    volume: Volume,
    events: Vec<DeckEvent>,
    status_reads: Vec<Duration>,
    unknown_reads: u32,
}

pub struct FakeDeck {
    id: DeckId,
    track_secs: u64,
    origin: Instant,
    /// Position reads return unknown once this much clock time has passed
    vanish_after: Option<Duration>,
    fail_volume: bool,
    state: Mutex<FakeState>,
}

impl FakeDeck {
    pub fn new(port: u16, track_secs: u64) -> Self {
        Self {
            id: DeckId(port),
            track_secs,
            origin: Instant::now(),
            vanish_after: None,
            fail_volume: false,
            state: Mutex::new(FakeState {
                playing: None,
                volume: Volume::MUTED,
                events: Vec::new(),
                status_reads: Vec::new(),
                unknown_reads: 0,
            }),
        }
    }

    /// The first `n` position reads report an unknown length
    pub fn with_unknown_reads(self, n: u32) -> Self {
        self.state.lock().unwrap().unknown_reads = n;
        self
    }

    pub fn vanishing_after(mut self, after: Duration) -> Self {
        self.vanish_after = Some(after);
        self
    }

    pub fn failing_volume(mut self) -> Self {
        self.fail_volume = true;
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn now(&self) -> Duration {
        Instant::now() - self.origin
    }

    pub fn events(&self) -> Vec<DeckEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn status_reads(&self) -> Vec<Duration> {
        self.state.lock().unwrap().status_reads.clone()
    }

    pub fn current_volume(&self) -> Volume {
        self.state.lock().unwrap().volume
    }

    pub fn current_track(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .playing
            .as_ref()
            .map(|p| p.track.path().to_string())
    }

    pub fn plays(&self) -> Vec<(Duration, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DeckEvent::Play(at, track) => Some((at, track)),
                _ => None,
            })
            .collect()
    }

    pub fn stops(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DeckEvent::Stop(at) => Some(at),
                _ => None,
            })
            .collect()
    }

    pub fn seeks(&self) -> Vec<(Duration, Duration)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DeckEvent::Seek(at, offset) => Some((at, offset)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PlaybackPort for FakeDeck {
    fn id(&self) -> DeckId {
        self.id
    }

    async fn play(&self, track: &Track) -> Result<()> {
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        state.playing = Some(Playing {
            track: track.clone(),
            started: Instant::now(),
            offset: Duration::ZERO,
        });
        state.events.push(DeckEvent::Play(now, track.path().to_string()));
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        state.playing = None;
        state.events.push(DeckEvent::Stop(now));
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        Ok(())
    }

    async fn pause_if_playing(&self) -> Result<()> {
        Ok(())
    }

    async fn set_volume(&self, volume: Volume) -> Result<()> {
        if self.fail_volume {
            return Err(Error::Internal("volume rejected".to_string()));
        }
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        state.volume = volume;
        state.events.push(DeckEvent::Volume(now, volume.level()));
        Ok(())
    }

    async fn volume(&self) -> Result<Volume> {
        Ok(self.state.lock().unwrap().volume)
    }

    async fn position(&self) -> Result<Option<TrackPosition>> {
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        state.status_reads.push(now);

        if state.unknown_reads > 0 {
            state.unknown_reads -= 1;
            return Ok(None);
        }
        if self.vanish_after.is_some_and(|after| now >= after) {
            return Ok(None);
        }

        Ok(state.playing.as_ref().and_then(|p| {
            let elapsed = (p.offset + (Instant::now() - p.started)).as_secs();
            if elapsed >= self.track_secs {
                None
            } else {
                TrackPosition::new(elapsed, self.track_secs)
            }
        }))
    }

    async fn seek(&self, offset: Duration) -> Result<()> {
        let now = self.now();
        let mut state = self.state.lock().unwrap();
        if let Some(playing) = state.playing.as_mut() {
            playing.started = Instant::now();
            playing.offset = offset;
        }
        state.events.push(DeckEvent::Seek(now, offset));
        Ok(())
    }

    async fn ensure_outputs_enabled(&self) -> Result<()> {
        Ok(())
    }
}

/// Approximate clock comparison (fades tick in 100 ms steps)
pub fn near(actual: Duration, expected_secs: f64) -> bool {
    (actual.as_secs_f64() - expected_secs).abs() < 0.25
}
