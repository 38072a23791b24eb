//! Crossfade controller (duodeck-xc)
//!
//! Plays a playlist continuously across two playback decks, overlapping
//! consecutive tracks with an equal-power crossfade. Skip requests arrive
//! over the local control API or SIGUSR1.

pub mod api;
pub mod playlist;
pub mod readiness;
pub mod scheduler;
pub mod signals;
pub mod skip;
pub mod state;

pub use playlist::Playlist;
pub use scheduler::{CrossfadeScheduler, CycleReport, DeckPair, SchedulerSettings};
pub use skip::SkipSignal;
pub use state::SharedState;
