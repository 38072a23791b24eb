//! Fade curve implementations for deck volume ramps
//!
//! Provides the curve shapes used by the fade engine:
//! - Linear for the pause/resume fade driven by the button
//! - Equal-power for the deck-to-deck crossfade
//! - S-Curve as a gentler alternative for the pause/resume fade

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Fade curve types
///
/// Each curve type provides a different perceptual quality:
/// - Linear: Constant rate of change (precise, predictable)
/// - SCurve: Smooth acceleration and deceleration
/// - EqualPower: Constant combined loudness across a crossfade
///
/// Fade-in curves increase gain from 0.0 to 1.0, fade-out curves decrease
/// it from 1.0 to 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeCurve {
    /// Linear: v(t) = t
    Linear,

    /// S-Curve: v(t) = 0.5 × (1 - cos(π × t))
    #[serde(alias = "cosine", alias = "s-curve", alias = "scurve")]
    SCurve,

    /// Equal-Power: fade-in v(t) = sin(t × π/2), fade-out v(t) = cos(t × π/2)
    ///
    /// For every t, fade_in(t)² + fade_out(t)² = 1, so a crossfade between
    /// two decks has no loudness dip at the midpoint.
    #[serde(alias = "equalpower")]
    EqualPower,
}

impl FadeCurve {
    /// Calculate fade-in multiplier at given position
    ///
    /// # Arguments
    /// * `position` - Normalized position through fade (0.0 to 1.0)
    ///
    /// # Returns
    /// Gain multiplier (0.0 = silence, 1.0 = full volume)
    pub fn calculate_fade_in(&self, position: f64) -> f64 {
        let t = position.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => t,
            FadeCurve::SCurve => 0.5 * (1.0 - (PI * t).cos()),
            FadeCurve::EqualPower => (t * FRAC_PI_2).sin(),
        }
    }

    /// Calculate fade-out multiplier at given position
    ///
    /// # Arguments
    /// * `position` - Normalized position through fade (0.0 to 1.0)
    ///
    /// # Returns
    /// Gain multiplier (1.0 at start of fade, 0.0 at end)
    pub fn calculate_fade_out(&self, position: f64) -> f64 {
        let t = position.clamp(0.0, 1.0);

        match self {
            FadeCurve::Linear => 1.0 - t,
            FadeCurve::SCurve => 0.5 * (1.0 + (PI * t).cos()),
            FadeCurve::EqualPower => (t * FRAC_PI_2).cos(),
        }
    }

    /// Interpolate between two gain levels at `position`
    ///
    /// Rising ramps follow the fade-in shape, falling ramps the fade-out
    /// shape, both scaled between `from` and `to`. Linear reduces to
    /// `from + (to - from) × t` in both directions.
    pub fn gain(&self, from: f64, to: f64, position: f64) -> f64 {
        if to >= from {
            from + (to - from) * self.calculate_fade_in(position)
        } else {
            to + (from - to) * self.calculate_fade_out(position)
        }
    }

    /// Parse curve from a configuration string
    ///
    /// Accepts `linear`, `cosine` / `s_curve` / `scurve` / `s-curve`,
    /// `equal_power` / `equalpower` (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linear" => Some(FadeCurve::Linear),
            "cosine" | "scurve" | "s-curve" | "s_curve" => Some(FadeCurve::SCurve),
            "equal_power" | "equalpower" => Some(FadeCurve::EqualPower),
            _ => None,
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            FadeCurve::Linear => "Linear",
            FadeCurve::SCurve => "S-Curve",
            FadeCurve::EqualPower => "Equal Power",
        }
    }

    /// Get all available fade curve variants
    pub fn all_variants() -> &'static [FadeCurve] {
        &[FadeCurve::Linear, FadeCurve::SCurve, FadeCurve::EqualPower]
    }
}

impl Default for FadeCurve {
    fn default() -> Self {
        FadeCurve::Linear
    }
}

impl std::fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_in_bounds() {
        for curve in FadeCurve::all_variants() {
            let start_val = curve.calculate_fade_in(0.0);
            let end_val = curve.calculate_fade_in(1.0);
            assert!(
                start_val.abs() < 0.01,
                "{:?} fade-in at 0.0 should be ~0.0, got {}",
                curve,
                start_val
            );
            assert!(
                (end_val - 1.0).abs() < 0.01,
                "{:?} fade-in at 1.0 should be ~1.0, got {}",
                curve,
                end_val
            );
        }
    }

    #[test]
    fn test_fade_out_bounds() {
        for curve in FadeCurve::all_variants() {
            let start_val = curve.calculate_fade_out(0.0);
            let end_val = curve.calculate_fade_out(1.0);
            assert!((start_val - 1.0).abs() < 0.01, "{:?} got {}", curve, start_val);
            assert!(end_val.abs() < 0.01, "{:?} got {}", curve, end_val);
        }
    }

    #[test]
    fn test_equal_power_preserves_power() {
        for i in 0..=50 {
            let t = i as f64 / 50.0;
            let fade_in = FadeCurve::EqualPower.calculate_fade_in(t);
            let fade_out = FadeCurve::EqualPower.calculate_fade_out(t);
            let power = fade_in * fade_in + fade_out * fade_out;
            assert!((power - 1.0).abs() < 1e-9, "power at t={} was {}", t, power);
        }
    }

    #[test]
    fn test_linear_crossfade_dips_at_midpoint() {
        let fade_in = FadeCurve::Linear.calculate_fade_in(0.5);
        let fade_out = FadeCurve::Linear.calculate_fade_out(0.5);
        assert!(fade_in * fade_in + fade_out * fade_out < 0.75);
    }

    #[test]
    fn test_gain_direction() {
        let curve = FadeCurve::EqualPower;
        assert_eq!(curve.gain(100.0, 0.0, 0.0), 100.0);
        assert!(curve.gain(100.0, 0.0, 1.0).abs() < 1e-9);
        assert_eq!(curve.gain(0.0, 100.0, 0.0), 0.0);
        assert!((curve.gain(0.0, 100.0, 1.0) - 100.0).abs() < 1e-9);

        // Linear from a partial level
        assert!((FadeCurve::Linear.gain(60.0, 0.0, 0.5) - 30.0).abs() < 1e-9);
        assert!((FadeCurve::Linear.gain(20.0, 100.0, 0.25) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_position_is_clamped() {
        assert_eq!(FadeCurve::Linear.calculate_fade_in(-1.0), 0.0);
        assert_eq!(FadeCurve::Linear.calculate_fade_in(2.0), 1.0);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(FadeCurve::from_str("linear"), Some(FadeCurve::Linear));
        assert_eq!(FadeCurve::from_str("cosine"), Some(FadeCurve::SCurve));
        assert_eq!(FadeCurve::from_str("s-curve"), Some(FadeCurve::SCurve));
        assert_eq!(FadeCurve::from_str("EQUAL_POWER"), Some(FadeCurve::EqualPower));
        assert_eq!(FadeCurve::from_str("invalid"), None);
        assert_eq!(FadeCurve::from_str(""), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", FadeCurve::Linear), "Linear");
        assert_eq!(format!("{}", FadeCurve::EqualPower), "Equal Power");
    }
}
