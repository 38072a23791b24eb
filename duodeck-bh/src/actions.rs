//! Gesture actions
//!
//! - single: pause (fade down, then pause) or resume (play, then fade up)
//! - double: ask the crossfade controller to skip, unless everything is muted
//! - long: power the system off
//!
//! Actions are best effort. A deck command that fails is logged and the
//! action carries on with the remaining decks; only an unreadable volume
//! aborts an action, since it decides what the action does.

use async_trait::async_trait;
use duodeck_common::config::ButtonConfig;
use duodeck_common::fade::{fade, FadeLane, FadeSpec};
use duodeck_common::{FadeCurve, PlaybackPort, Result, Volume};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::gesture::Gesture;

/// Delivers a skip request to the crossfade controller
#[async_trait]
pub trait SkipTrigger: Send + Sync {
    async fn request_skip(&self) -> Result<()>;
}

/// System power control
#[async_trait]
pub trait PowerControl: Send + Sync {
    async fn power_off(&self) -> Result<()>;
}

/// Pause/resume fade parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSettings {
    pub fade: Duration,
    pub fade_steps: u32,
    pub fade_curve: FadeCurve,
    pub base_volume: Volume,
}

impl From<&ButtonConfig> for ActionSettings {
    fn from(config: &ButtonConfig) -> Self {
        Self {
            fade: config.fade(),
            fade_steps: config.fade_steps,
            fade_curve: config.fade_curve,
            base_volume: Volume::new(config.base_volume),
        }
    }
}

/// What an action ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Paused,
    Resumed,
    SkipRequested,
    /// Double press while everything is muted
    SkipIgnored,
    PowerOffRequested,
    Failed,
}

pub struct ActionHandler {
    decks: Vec<Arc<dyn PlaybackPort>>,
    skip: Arc<dyn SkipTrigger>,
    power: Arc<dyn PowerControl>,
    settings: ActionSettings,
}

impl ActionHandler {
    pub fn new(
        decks: Vec<Arc<dyn PlaybackPort>>,
        skip: Arc<dyn SkipTrigger>,
        power: Arc<dyn PowerControl>,
        settings: ActionSettings,
    ) -> Self {
        Self {
            decks,
            skip,
            power,
            settings,
        }
    }

    pub async fn handle(&self, gesture: Gesture) -> ActionOutcome {
        match gesture {
            Gesture::Single => self.single().await,
            Gesture::Double => self.double().await,
            Gesture::Long => self.long().await,
        }
    }

    /// Toggle pause
    pub async fn single(&self) -> ActionOutcome {
        match self.toggle_pause().await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("mpc error: {}", e.diagnostic());
                ActionOutcome::Failed
            }
        }
    }

    /// Request an immediate crossfade
    pub async fn double(&self) -> ActionOutcome {
        let volumes = match self.volumes().await {
            Ok(volumes) => volumes,
            Err(e) => {
                error!("mpc error: {}", e.diagnostic());
                return ActionOutcome::Failed;
            }
        };
        if volumes.iter().all(Volume::is_muted) {
            info!("double press ignored (volume is 0)");
            return ActionOutcome::SkipIgnored;
        }

        match self.skip.request_skip().await {
            Ok(()) => {
                info!("requested immediate crossfade");
                ActionOutcome::SkipRequested
            }
            Err(e) => {
                error!("crossfade request error: {}", e.diagnostic());
                ActionOutcome::Failed
            }
        }
    }

    /// Power off
    pub async fn long(&self) -> ActionOutcome {
        match self.power.power_off().await {
            Ok(()) => {
                info!("shutdown requested");
                ActionOutcome::PowerOffRequested
            }
            Err(e) => {
                error!("shutdown error: {}", e.diagnostic());
                ActionOutcome::Failed
            }
        }
    }

    async fn volumes(&self) -> Result<Vec<Volume>> {
        let mut volumes = Vec::with_capacity(self.decks.len());
        for deck in &self.decks {
            volumes.push(deck.volume().await?);
        }
        Ok(volumes)
    }

    async fn toggle_pause(&self) -> Result<ActionOutcome> {
        let volumes = self.volumes().await?;

        if volumes.iter().any(|v| !v.is_muted()) {
            info!("fading down and pausing");
            self.fade_all(&volumes, Volume::MUTED).await;
            for deck in &self.decks {
                if let Err(e) = deck.pause_if_playing().await {
                    warn!("[{}] pause failed: {}", deck.id(), e.diagnostic());
                }
            }
            info!("playback paused");
            return Ok(ActionOutcome::Paused);
        }

        info!("resuming and fading up");
        for deck in &self.decks {
            if let Err(e) = deck.resume().await {
                warn!("[{}] resume failed: {}", deck.id(), e.diagnostic());
            }
        }
        self.fade_all(&volumes, self.settings.base_volume).await;
        info!("playback resumed");
        Ok(ActionOutcome::Resumed)
    }

    /// Fade every deck from its `starts` volume to `target`
    async fn fade_all(&self, starts: &[Volume], target: Volume) {
        let lanes: Vec<FadeLane<'_>> = self
            .decks
            .iter()
            .zip(starts)
            .map(|(deck, &from)| FadeLane::new(deck.as_ref(), from, target))
            .collect();
        let spec = FadeSpec::new(
            self.settings.fade,
            self.settings.fade_steps,
            self.settings.fade_curve,
        );
        fade(&lanes, &spec).await;
        info!("fade complete: target={}%", target.level());
    }
}

/// Run actions for incoming gestures
///
/// Long presses run immediately on their own task so power-off is never
/// queued behind a fade; single and double presses run one at a time in
/// arrival order on a worker task. Returns once the gesture source closes
/// and queued actions have finished.
pub async fn dispatch(handler: Arc<ActionHandler>, mut gestures: mpsc::UnboundedReceiver<Gesture>) {
    let (queue_tx, mut queue_rx) = mpsc::unbounded_channel();
    let worker = {
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            while let Some(gesture) = queue_rx.recv().await {
                handler.handle(gesture).await;
            }
        })
    };

    while let Some(gesture) = gestures.recv().await {
        match gesture {
            Gesture::Long => {
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    handler.long().await;
                });
            }
            other => {
                if queue_tx.send(other).is_err() {
                    break;
                }
            }
        }
    }

    drop(queue_tx);
    if let Err(e) = worker.await {
        error!("action worker failed: {}", e);
    }
}
