//! Gesture classifier
//!
//! Turns debounced button edges into exactly one of `Single`, `Double` or
//! `Long` per gesture:
//!
//! ```text
//! Idle ──press──► Pressed ──release──► PendingSingle ──window──► Idle  [Single]
//!                    │                     │
//!                    │                   press
//!                    │                     ▼
//!                    │             Pressed (pending) ──release──► Idle [Double]
//!                    │
//!                    └──hold──► LongPress [Long] ──release──► Idle (silent)
//! ```
//!
//! [`PressDetector`] is the pure state machine. [`GestureClassifier`] owns
//! one and is the only task that touches it: edges arrive over an mpsc
//! inbox, the double-press window is a `select!` on the pending deadline,
//! and gestures leave over an unbounded channel so the classifier never
//! waits on a slow action.

use crate::gpio::ButtonEdge;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

/// Classified button gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Single,
    Double,
    Long,
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gesture::Single => "single press",
            Gesture::Double => "double press",
            Gesture::Long => "long press",
        };
        f.write_str(name)
    }
}

/// Classifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressState {
    Idle,
    /// Button down; `pending` is the single-press deadline of an earlier
    /// release when this is the second press of a possible double
    Pressed { pending: Option<Instant> },
    /// Released once; a single press is emitted at `deadline` unless a
    /// second release comes first
    PendingSingle { deadline: Instant },
    /// Long press already emitted; the release is swallowed
    LongPress,
}

/// Pure press/release/hold state machine
#[derive(Debug, Clone)]
pub struct PressDetector {
    window: Duration,
    state: PressState,
}

impl PressDetector {
    pub fn new(double_press_window: Duration) -> Self {
        Self {
            window: double_press_window,
            state: PressState::Idle,
        }
    }

    pub fn state(&self) -> PressState {
        self.state
    }

    /// When the pending single press falls due, if one is pending
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            PressState::PendingSingle { deadline } => Some(deadline),
            PressState::Pressed { pending } => pending,
            PressState::Idle | PressState::LongPress => None,
        }
    }

    pub fn on_press(&mut self) -> Option<Gesture> {
        self.state = match self.state {
            PressState::Idle | PressState::LongPress => PressState::Pressed { pending: None },
            PressState::PendingSingle { deadline } => PressState::Pressed {
                pending: Some(deadline),
            },
            pressed @ PressState::Pressed { .. } => pressed,
        };
        None
    }

    pub fn on_release(&mut self, now: Instant) -> Option<Gesture> {
        let (next, gesture) = match self.state {
            PressState::Pressed {
                pending: Some(deadline),
            } if deadline > now => (PressState::Idle, Some(Gesture::Double)),
            // Window ran out before this release was seen: the first press
            // stands alone and this one starts its own window
            PressState::Pressed { pending: Some(_) } => (
                PressState::PendingSingle {
                    deadline: now + self.window,
                },
                Some(Gesture::Single),
            ),
            PressState::Pressed { pending: None } => (
                PressState::PendingSingle {
                    deadline: now + self.window,
                },
                None,
            ),
            PressState::LongPress => (PressState::Idle, None),
            other => (other, None),
        };
        self.state = next;
        gesture
    }

    /// Hold threshold reached; also cancels a pending single press
    pub fn on_hold(&mut self) -> Option<Gesture> {
        match self.state {
            PressState::Pressed { .. } => {
                self.state = PressState::LongPress;
                Some(Gesture::Long)
            }
            _ => None,
        }
    }

    /// Emit the pending single press if its deadline has passed
    pub fn on_window_elapsed(&mut self, now: Instant) -> Option<Gesture> {
        match self.state {
            PressState::PendingSingle { deadline } if deadline <= now => {
                self.state = PressState::Idle;
                Some(Gesture::Single)
            }
            PressState::Pressed {
                pending: Some(deadline),
            } if deadline <= now => {
                // The second press outlasted the window: the first one
                // stands alone and this press starts a new gesture
                self.state = PressState::Pressed { pending: None };
                Some(Gesture::Single)
            }
            _ => None,
        }
    }

    /// Apply one edge
    pub fn on_edge(&mut self, edge: ButtonEdge, now: Instant) -> Option<Gesture> {
        match edge {
            ButtonEdge::Pressed => self.on_press(),
            ButtonEdge::Released => self.on_release(now),
            ButtonEdge::Held => self.on_hold(),
        }
    }
}

/// Actor owning the [`PressDetector`]
pub struct GestureClassifier {
    detector: PressDetector,
    edges: mpsc::Receiver<ButtonEdge>,
    gestures: mpsc::UnboundedSender<Gesture>,
}

impl GestureClassifier {
    pub fn new(
        double_press_window: Duration,
        edges: mpsc::Receiver<ButtonEdge>,
        gestures: mpsc::UnboundedSender<Gesture>,
    ) -> Self {
        Self {
            detector: PressDetector::new(double_press_window),
            edges,
            gestures,
        }
    }

    /// Classify edges until the edge source or the gesture consumer goes away
    pub async fn run(mut self) {
        loop {
            let deadline = self.detector.deadline();
            let gesture = tokio::select! {
                edge = self.edges.recv() => match edge {
                    Some(edge) => {
                        debug!("edge: {:?} in {:?}", edge, self.detector.state());
                        self.detector.on_edge(edge, Instant::now())
                    }
                    None => return,
                },
                _ = wait_for(deadline) => self.detector.on_window_elapsed(Instant::now()),
            };

            if let Some(gesture) = gesture {
                info!("{}", gesture);
                if self.gestures.send(gesture).is_err() {
                    return;
                }
            }
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
