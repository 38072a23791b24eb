//! GPIO button edge source
//!
//! The button is sampled through the sysfs GPIO interface on a fixed
//! interval. [`EdgeDebouncer`] turns raw levels into clean edges:
//!
//! - `Pressed` / `Released` once the new level has been stable for `bounce`
//! - `Held` once per press, after it has been stable-pressed for `hold`
//!
//! Pull resistors cannot be configured through sysfs; wire them (or set
//! them in the device tree) separately. `pull_up` only selects which level
//! means pressed.

use duodeck_common::config::ButtonConfig;
use duodeck_common::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Debounced button transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEdge {
    Pressed,
    Released,
    /// Continuously pressed for the hold time
    Held,
}

/// Pure debouncer fed with timestamped raw samples
#[derive(Debug, Clone)]
pub struct EdgeDebouncer {
    bounce: Duration,
    hold: Duration,
    /// Debounced state
    pressed: bool,
    /// Raw level that differs from the debounced state, and since when
    candidate: Option<(bool, Instant)>,
    pressed_since: Option<Instant>,
    held_reported: bool,
}

impl EdgeDebouncer {
    pub fn new(bounce: Duration, hold: Duration) -> Self {
        Self {
            bounce,
            hold,
            pressed: false,
            candidate: None,
            pressed_since: None,
            held_reported: false,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feed one raw sample; returns at most one edge
    pub fn sample(&mut self, raw_pressed: bool, now: Instant) -> Option<ButtonEdge> {
        if raw_pressed == self.pressed {
            self.candidate = None;
        } else {
            let since = match self.candidate {
                Some((level, since)) if level == raw_pressed => since,
                _ => {
                    self.candidate = Some((raw_pressed, now));
                    now
                }
            };
            if now.duration_since(since) >= self.bounce {
                return Some(self.commit(raw_pressed, now));
            }
        }

        match self.pressed_since {
            Some(since) if !self.held_reported && now.duration_since(since) >= self.hold => {
                self.held_reported = true;
                Some(ButtonEdge::Held)
            }
            _ => None,
        }
    }

    fn commit(&mut self, pressed: bool, now: Instant) -> ButtonEdge {
        self.pressed = pressed;
        self.candidate = None;
        if pressed {
            self.pressed_since = Some(now);
            self.held_reported = false;
            ButtonEdge::Pressed
        } else {
            self.pressed_since = None;
            ButtonEdge::Released
        }
    }
}

/// A button on one sysfs GPIO line
pub struct SysfsButton {
    pin: u32,
    root: PathBuf,
    pull_up: bool,
    sample_interval: Duration,
    debouncer: EdgeDebouncer,
}

impl SysfsButton {
    pub fn from_config(config: &ButtonConfig) -> Self {
        Self {
            pin: config.pin,
            root: config.gpio_root.clone(),
            pull_up: config.pull_up,
            sample_interval: config.sample_interval(),
            debouncer: EdgeDebouncer::new(config.bounce(), config.hold()),
        }
    }

    fn pin_dir(&self) -> PathBuf {
        self.root.join(format!("gpio{}", self.pin))
    }

    /// Export the pin (if needed) and configure it as an input
    pub async fn open(&self) -> Result<()> {
        let dir = self.pin_dir();
        if !dir.exists() {
            debug!("Exporting GPIO{}", self.pin);
            tokio::fs::write(self.root.join("export"), self.pin.to_string())
                .await
                .map_err(|e| Error::Config(format!("Failed to export GPIO{}: {}", self.pin, e)))?;

            // udev may take a moment to create the pin directory
            let deadline = Instant::now() + Duration::from_secs(1);
            while !dir.exists() && Instant::now() < deadline {
                sleep(Duration::from_millis(20)).await;
            }
        }

        tokio::fs::write(dir.join("direction"), "in")
            .await
            .map_err(|e| {
                Error::Config(format!("Failed to configure GPIO{} as input: {}", self.pin, e))
            })?;
        Ok(())
    }

    /// Read the raw pin level (`true` = high)
    async fn read_level(&self) -> Result<bool> {
        let text = tokio::fs::read_to_string(self.pin_dir().join("value")).await?;
        match text.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(Error::Parse(format!(
                "Unexpected GPIO{} value: {:?}",
                self.pin, other
            ))),
        }
    }

    fn level_is_pressed(&self, high: bool) -> bool {
        if self.pull_up {
            !high
        } else {
            high
        }
    }

    /// Sample the pin forever, forwarding edges to `edges`
    ///
    /// Returns once the receiving side is gone.
    pub async fn run(mut self, edges: mpsc::Sender<ButtonEdge>) {
        info!(
            "Sampling GPIO{} every {}ms ({})",
            self.pin,
            self.sample_interval.as_millis(),
            if self.pull_up { "active low" } else { "active high" }
        );

        let mut ticker = interval(self.sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut read_failing = false;

        loop {
            ticker.tick().await;
            let high = match self.read_level().await {
                Ok(high) => {
                    if read_failing {
                        info!("GPIO{} readable again", self.pin);
                        read_failing = false;
                    }
                    high
                }
                Err(e) => {
                    if !read_failing {
                        warn!("Failed to read GPIO{}: {}", self.pin, e);
                        read_failing = true;
                    }
                    continue;
                }
            };

            let pressed = self.level_is_pressed(high);
            if let Some(edge) = self.debouncer.sample(pressed, Instant::now()) {
                debug!("GPIO{} edge: {:?}", self.pin, edge);
                if edges.send(edge).await.is_err() {
                    return;
                }
            }
        }
    }
}
