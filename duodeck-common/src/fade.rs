//! Volume fade engine
//!
//! Drives a fixed-step interpolation over one or more decks' volume
//! controls. A fade with `steps = N` issues `N + 1` volume updates evenly
//! spaced across the fade duration: the first at the start gain, the last at
//! the end gain. The caller is blocked for the whole fade; there is no
//! cancellation once a fade has started.

use crate::deck::{DeckId, PlaybackPort, Volume};
use crate::fade_curves::FadeCurve;
use std::time::Duration;
use tracing::{debug, warn};

/// One deck's ramp within a fade
#[derive(Clone, Copy)]
pub struct FadeLane<'a> {
    pub deck: &'a dyn PlaybackPort,
    pub from: Volume,
    pub to: Volume,
}

impl<'a> FadeLane<'a> {
    pub fn new(deck: &'a dyn PlaybackPort, from: Volume, to: Volume) -> Self {
        Self { deck, from, to }
    }

    /// Volume this lane is set to at `step` of `steps`
    pub fn volume_at(&self, curve: FadeCurve, step: u32, steps: u32) -> Volume {
        let t = if steps == 0 {
            1.0
        } else {
            step as f64 / steps as f64
        };
        Volume::from_gain(curve.gain(self.from.level() as f64, self.to.level() as f64, t))
    }
}

/// Shape and timing of a fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSpec {
    pub duration: Duration,
    pub steps: u32,
    pub curve: FadeCurve,
}

impl FadeSpec {
    pub fn new(duration: Duration, steps: u32, curve: FadeCurve) -> Self {
        Self {
            duration,
            steps,
            curve,
        }
    }

    /// Sleep between consecutive volume updates
    pub fn step_interval(&self) -> Duration {
        if self.steps == 0 {
            Duration::ZERO
        } else {
            self.duration / self.steps
        }
    }
}

/// Outcome of a completed fade
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FadeReport {
    /// Volume commands issued
    pub commands: u32,
    /// Volume commands the deck rejected
    pub failures: u32,
    /// Decks that rejected at least one command
    pub failed_decks: Vec<DeckId>,
}

/// Run a fade across all `lanes`
///
/// Every lane is updated at every tick. A rejected volume command is logged
/// and counted, and the fade carries on with the next command.
pub async fn fade(lanes: &[FadeLane<'_>], spec: &FadeSpec) -> FadeReport {
    let mut report = FadeReport::default();
    let interval = spec.step_interval();

    debug!(
        lanes = lanes.len(),
        steps = spec.steps,
        duration_ms = spec.duration.as_millis() as u64,
        curve = %spec.curve,
        "fade start"
    );

    for step in 0..=spec.steps {
        for lane in lanes {
            let volume = lane.volume_at(spec.curve, step, spec.steps);
            report.commands += 1;
            if let Err(e) = lane.deck.set_volume(volume).await {
                report.failures += 1;
                let id = lane.deck.id();
                if !report.failed_decks.contains(&id) {
                    warn!("[{}] volume command failed during fade: {}", id, e.diagnostic());
                    report.failed_decks.push(id);
                }
            }
        }
        if step < spec.steps {
            tokio::time::sleep(interval).await;
        }
    }

    if report.failures > 0 {
        warn!(
            "fade finished with {} of {} volume commands failed",
            report.failures, report.commands
        );
    }
    report
}
