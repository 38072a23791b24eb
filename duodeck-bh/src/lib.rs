//! Button handler (duodeck-bh)
//!
//! Reads one GPIO button, classifies presses into single, double and long
//! gestures, and acts on them: pause/resume both decks, request a skip from
//! the crossfade controller, or power the system off.

pub mod actions;
pub mod gesture;
pub mod gpio;
pub mod system;

pub use actions::{ActionHandler, ActionOutcome, ActionSettings, PowerControl, SkipTrigger};
pub use gesture::{Gesture, GestureClassifier, PressDetector, PressState};
pub use gpio::{ButtonEdge, EdgeDebouncer, SysfsButton};
