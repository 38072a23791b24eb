//! Dual-deck crossfade scheduler
//!
//! Keeps one deck audible (active) while the other (standby) waits for the
//! next track. Each cycle runs through:
//!
//! ```text
//! SteadyWait ──(remaining <= overlap | skip)──► OverlapTransition
//!     ▲                                              │ equal-power fade
//!     │                                              ▼
//! RoleSwap ◄──(hold elapsed | skip, carried)──── OverlapHold
//! ```
//!
//! `Priming` runs once at startup. All waits are measured against the
//! monotonic clock and re-read the active deck's position on every wake,
//! so the schedule corrects itself for drift.
//!
//! Deck command failures are logged and never stop the loop.

use crate::playlist::Playlist;
use crate::skip::SkipSignal;
use crate::state::SharedState;
use chrono::Utc;
use duodeck_common::config::CrossfadeConfig;
use duodeck_common::control::SchedulerPhase;
use duodeck_common::fade::{fade, FadeLane, FadeReport, FadeSpec};
use duodeck_common::human_time::format_clock;
use duodeck_common::{DeckId, FadeCurve, PlaybackPort, Track, TrackPosition, Volume};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Delay before seeking a freshly started track (lets the engine load it)
const SEEK_SETTLE: Duration = Duration::from_millis(100);
/// Backoff while the engine is not reporting a track length
const UNKNOWN_LENGTH_BACKOFF: Duration = Duration::from_secs(1);
/// Shortest steady-wait increment (close to the overlap point)
const MIN_WAIT_STEP: Duration = Duration::from_secs(1);
/// Longest steady-wait increment (far from the overlap point)
const MAX_WAIT_STEP: Duration = Duration::from_secs(5);
/// Progress is logged every wake once within this distance of the overlap point
const NEAR_OVERLAP: Duration = Duration::from_secs(5);
/// Progress log interval while far from the overlap point
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Scheduler timing and levels
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSettings {
    pub overlap: Duration,
    pub fade: Duration,
    pub immediate_fade: Duration,
    pub fade_steps: u32,
    pub base_volume: Volume,
    pub incoming_offset: Duration,
}

impl From<&CrossfadeConfig> for SchedulerSettings {
    fn from(config: &CrossfadeConfig) -> Self {
        Self {
            overlap: config.overlap(),
            fade: config.fade(),
            immediate_fade: config.immediate_fade(),
            fade_steps: config.fade_steps,
            base_volume: Volume::new(config.base_volume),
            incoming_offset: config.incoming_offset(),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from(&CrossfadeConfig::default())
    }
}

/// The two decks in their current roles
pub struct DeckPair {
    active: Arc<dyn PlaybackPort>,
    standby: Arc<dyn PlaybackPort>,
}

impl DeckPair {
    pub fn new(active: Arc<dyn PlaybackPort>, standby: Arc<dyn PlaybackPort>) -> Self {
        Self { active, standby }
    }

    pub fn active(&self) -> &dyn PlaybackPort {
        self.active.as_ref()
    }

    pub fn standby(&self) -> &dyn PlaybackPort {
        self.standby.as_ref()
    }

    /// Exchange roles: the standby deck becomes active and vice versa
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.active, &mut self.standby);
    }

    pub fn ids(&self) -> (DeckId, DeckId) {
        (self.active.id(), self.standby.id())
    }
}

/// What ended the steady wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapTrigger {
    /// The active track reached the overlap window
    TrackEnding,
    /// A skip was requested; `coalesced` requests collapsed into it
    Skip { coalesced: u64 },
    /// The active deck stopped reporting a position mid-wait (track gone)
    PositionLost,
}

impl OverlapTrigger {
    pub fn is_skip(&self) -> bool {
        matches!(self, OverlapTrigger::Skip { .. })
    }
}

/// How the overlap hold ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldOutcome {
    /// Ran for its full length (possibly zero)
    Elapsed,
    /// A skip cut it short; that skip is carried forward to the next cycle
    Interrupted,
}

/// Summary of one completed transition
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub trigger: OverlapTrigger,
    pub index: usize,
    pub track: Track,
    pub outgoing: DeckId,
    pub incoming: DeckId,
    pub fade_duration: Duration,
    pub hold: Duration,
    pub hold_outcome: HoldOutcome,
    pub fade: FadeReport,
}

/// The crossfade scheduler; owns both decks for its whole lifetime
pub struct CrossfadeScheduler {
    decks: DeckPair,
    playlist: Playlist,
    skip: SkipSignal,
    settings: SchedulerSettings,
    state: Arc<SharedState>,
    index: usize,
    transitions: u64,
    /// Track length from the last good position read
    last_total: u64,
}

impl CrossfadeScheduler {
    pub fn new(
        decks: DeckPair,
        playlist: Playlist,
        skip: SkipSignal,
        settings: SchedulerSettings,
        state: Arc<SharedState>,
    ) -> Self {
        Self {
            decks,
            playlist,
            skip,
            settings,
            state,
            index: 0,
            transitions: 0,
            last_total: 0,
        }
    }

    /// Playlist index of the active track
    pub fn index(&self) -> usize {
        self.index
    }

    /// Completed transitions since startup
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// `(active, standby)` deck ids
    pub fn roles(&self) -> (DeckId, DeckId) {
        self.decks.ids()
    }

    /// Prime, then run transitions forever
    pub async fn run(&mut self) {
        self.prime().await;
        loop {
            self.run_cycle().await;
        }
    }

    /// Startup: silence both decks, then start track 0 at full volume on
    /// the active deck
    pub async fn prime(&mut self) {
        self.state.set_phase(SchedulerPhase::Priming).await;
        info!("Initializing decks {} and {}", self.decks.active().id(), self.decks.standby().id());

        for deck in [self.decks.active(), self.decks.standby()] {
            if let Err(e) = deck.stop().await {
                warn!("[{}] stop failed: {}", deck.id(), e.diagnostic());
            }
        }

        let active = self.decks.active();
        if let Err(e) = active.set_volume(self.settings.base_volume).await {
            warn!("[{}] volume failed: {}", active.id(), e.diagnostic());
        }
        let track = self.playlist.get(self.index).clone();
        if let Err(e) = active.play(&track).await {
            warn!("[{}] play failed: {}", active.id(), e.diagnostic());
        }

        let index = self.index;
        self.state
            .update(|s| {
                s.index = index;
                s.track = Some(track.path().to_string());
            })
            .await;
    }

    /// One full cycle: steady wait, transition, hold, role swap
    pub async fn run_cycle(&mut self) -> CycleReport {
        let trigger = self.wait_for_overlap().await;
        let (track, fade_duration, fade_report) = self.begin_transition(trigger).await;
        let (outgoing, incoming) = self.decks.ids();
        let (hold, hold_outcome) = self.hold_overlap(trigger, fade_duration).await;
        self.swap_roles(trigger, hold_outcome).await;

        CycleReport {
            trigger,
            index: self.index,
            track,
            outgoing,
            incoming,
            fade_duration,
            hold,
            hold_outcome,
            fade: fade_report,
        }
    }

    /// Read the active deck's position; failures read as unknown
    async fn measure(&self) -> Option<TrackPosition> {
        let active = self.decks.active();
        match active.position().await {
            Ok(position) => position,
            Err(e) => {
                debug!("[{}] status failed: {}", active.id(), e.diagnostic());
                None
            }
        }
    }

    async fn publish_position(&self, position: Option<TrackPosition>) {
        self.state.update(|s| s.position = position).await;
    }

    fn until_overlap(&self, position: &TrackPosition) -> Duration {
        Duration::from_secs(position.remaining()).saturating_sub(self.settings.overlap)
    }

    /// Steady-wait: sleep until the active track is within the overlap
    /// window, or a skip is requested
    async fn wait_for_overlap(&mut self) -> OverlapTrigger {
        self.state.set_phase(SchedulerPhase::SteadyWait).await;
        let active = self.decks.active().id();

        let mut position = loop {
            match self.measure().await {
                Some(position) => break position,
                None => {
                    info!("[{}] unknown track length; retrying", active);
                    sleep(UNKNOWN_LENGTH_BACKOFF).await;
                }
            }
        };
        self.last_total = position.total;
        self.publish_position(Some(position)).await;

        info!(
            "[{}] elapsed {} / {}; {}s until overlap",
            active,
            format_clock(position.elapsed),
            format_clock(position.total),
            self.until_overlap(&position).as_secs()
        );

        let mut last_log = Instant::now();
        while Duration::from_secs(position.remaining()) > self.settings.overlap {
            if let Some(claim) = self.skip.claim() {
                info!(
                    "[{}] skip requested; starting overlap now ({} request(s))",
                    active, claim.coalesced
                );
                return OverlapTrigger::Skip {
                    coalesced: claim.coalesced,
                };
            }

            let until = self.until_overlap(&position);
            let step = if until <= NEAR_OVERLAP {
                MIN_WAIT_STEP
            } else {
                until.min(MAX_WAIT_STEP)
            };
            self.skip.wait(step).await;

            position = match self.measure().await {
                Some(position) => position,
                None => {
                    warn!("[{}] lost track position; advancing to next track", active);
                    self.publish_position(None).await;
                    return OverlapTrigger::PositionLost;
                }
            };
            self.last_total = position.total;
            self.publish_position(Some(position)).await;

            let until = self.until_overlap(&position);
            if until <= NEAR_OVERLAP || last_log.elapsed() >= PROGRESS_LOG_INTERVAL {
                info!("[{}] {}s to overlap", active, until.as_secs());
                last_log = Instant::now();
            }
        }

        OverlapTrigger::TrackEnding
    }

    /// Overlap-transition: start the next track muted on the standby deck
    /// and crossfade into it
    async fn begin_transition(&mut self, trigger: OverlapTrigger) -> (Track, Duration, FadeReport) {
        self.state.set_phase(SchedulerPhase::OverlapTransition).await;

        self.index = self.playlist.next_index(self.index);
        let track = self.playlist.get(self.index).clone();
        let active = self.decks.active();
        let standby = self.decks.standby();

        if let Err(e) = standby.set_volume(Volume::MUTED).await {
            warn!("[{}] volume failed: {}", standby.id(), e.diagnostic());
        }
        if let Err(e) = standby.play(&track).await {
            warn!("[{}] play failed: {}", standby.id(), e.diagnostic());
        }

        // The very first transition starts the incoming track from the top
        if self.transitions > 0 && !self.settings.incoming_offset.is_zero() {
            sleep(SEEK_SETTLE).await;
            if let Err(e) = standby.seek(self.settings.incoming_offset).await {
                warn!("[{}] seek failed: {}", standby.id(), e.diagnostic());
            }
        }

        let fade_duration = if trigger.is_skip() {
            self.settings.immediate_fade
        } else {
            self.settings.fade
        };
        info!("[{}] fading out over {:.1}s", active.id(), fade_duration.as_secs_f64());
        info!("[{}] fading in over {:.1}s", standby.id(), fade_duration.as_secs_f64());

        let base = self.settings.base_volume;
        let spec = FadeSpec::new(fade_duration, self.settings.fade_steps, FadeCurve::EqualPower);
        let report = fade(
            &[
                FadeLane::new(active, base, Volume::MUTED),
                FadeLane::new(standby, Volume::MUTED, base),
            ],
            &spec,
        )
        .await;

        let index = self.index;
        let path = track.path().to_string();
        self.state
            .update(|s| {
                s.index = index;
                s.track = Some(path);
            })
            .await;

        (track, fade_duration, report)
    }

    /// Overlap-hold: both decks keep playing (outgoing silent) for the rest
    /// of the overlap window
    async fn hold_overlap(
        &mut self,
        trigger: OverlapTrigger,
        fade_duration: Duration,
    ) -> (Duration, HoldOutcome) {
        self.state.set_phase(SchedulerPhase::OverlapHold).await;
        let active = self.decks.active().id();

        let total = Duration::from_secs(self.last_total);
        let window = if trigger.is_skip() {
            fade_duration.min(total)
        } else {
            self.settings.overlap.min(total)
        };
        let hold = window.saturating_sub(fade_duration);
        info!("[{}] overlapping for {:.1}s", active, hold.as_secs_f64());

        let deadline = Instant::now() + hold;
        while Instant::now() < deadline {
            if self.skip.claim().is_some() {
                info!("[{}] skip requested during overlap", active);
                return (hold, HoldOutcome::Interrupted);
            }
            self.skip.wait_until(deadline).await;
        }
        (hold, HoldOutcome::Elapsed)
    }

    /// Role-swap: stop the silent outgoing deck and exchange roles
    async fn swap_roles(&mut self, trigger: OverlapTrigger, hold: HoldOutcome) {
        self.state.set_phase(SchedulerPhase::RoleSwap).await;

        let outgoing = self.decks.active();
        if let Err(e) = outgoing.stop().await {
            warn!("[{}] stop failed: {}", outgoing.id(), e.diagnostic());
        }

        self.decks.swap();
        self.transitions += 1;

        if hold == HoldOutcome::Interrupted {
            self.skip.carry_forward();
            info!("skip deferred to the next track");
        }
        if trigger.is_skip() {
            info!("immediate crossfade complete");
        }

        let (active, standby) = self.decks.ids();
        let transitions = self.transitions;
        self.state
            .update(|s| {
                s.active = active;
                s.standby = standby;
                s.transitions = transitions;
                s.position = None;
                s.last_transition_at = Some(Utc::now());
            })
            .await;
    }

    /// Stop both decks (used on shutdown)
    pub async fn stop_all(&self) {
        for deck in [self.decks.active(), self.decks.standby()] {
            if let Err(e) = deck.stop().await {
                warn!("[{}] stop failed: {}", deck.id(), e.diagnostic());
            }
        }
    }
}
