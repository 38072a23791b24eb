//! Parsers for `mpc` text output
//!
//! Typical `mpc status` output:
//!
//! ```text
//! Artist - Title
//! [playing] #1/1   0:26/0:40 (65%)
//! volume:100%   repeat: off   random: off   single: off   consume: off
//! ```
//!
//! Anything that does not match is reported as "unknown" rather than as an
//! error: the engine may simply not be reporting yet.

use super::TrackPosition;
use crate::human_time::parse_clock;

/// Extract the `elapsed/total` field from status output
pub fn parse_position(status: &str) -> Option<TrackPosition> {
    status
        .split_whitespace()
        .filter_map(|token| {
            let (elapsed, total) = token.split_once('/')?;
            Some((parse_clock(elapsed)?, parse_clock(total)?))
        })
        .next()
        .and_then(|(elapsed, total)| TrackPosition::new(elapsed, total))
}

/// Extract the volume percentage from status output
///
/// `volume: n/a` (no mixer) and a missing field both read as 0.
pub fn parse_volume(status: &str) -> u8 {
    let Some(idx) = status.find("volume:") else {
        return 0;
    };
    let digits: String = status[idx + "volume:".len()..]
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u16>().map(|v| v.min(100) as u8).unwrap_or(0)
}

/// Audio output enable state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    Enabled,
    Disabled,
}

/// One line of `mpc outputs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    pub id: u32,
    pub name: String,
    pub state: OutputState,
}

/// Parse `mpc outputs` lines of the form
/// `Output 1 (My Pulse Output) is enabled`
pub fn parse_outputs(text: &str) -> Vec<OutputInfo> {
    text.lines().filter_map(parse_output_line).collect()
}

fn parse_output_line(line: &str) -> Option<OutputInfo> {
    let rest = line.trim().strip_prefix("Output")?;
    let rest = rest.trim_start();
    let (id, rest) = rest.split_once(char::is_whitespace)?;
    let id = id.parse::<u32>().ok()?;

    let (name, state) = rest.trim().rsplit_once(" is ")?;
    let state = match state.trim() {
        "enabled" => OutputState::Enabled,
        "disabled" => OutputState::Disabled,
        _ => return None,
    };
    let name = name
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .to_string();

    Some(OutputInfo { id, name, state })
}
