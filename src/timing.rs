//! Element timing derived from operator speed and weighting.
//!
//! PARIS standard: 50 dot-units per word, so the inter-element space is
//! `1200 / WPM` milliseconds. Weighting stretches or shrinks the dot
//! relative to dash and space to match an operator's fist; 3.0 is the
//! unweighted nominal and reduces to the classic 1:3:1 dot:dash:space.

/// Dot, dash and inter-element space durations in milliseconds.
///
/// Derived once per speed/weight change and cached; immutable otherwise.
/// For every legal input (`speed_wpm > 0`, `weight > 1`) the invariants
/// `dash_ms > dot_ms > 0` and `space_ms > 0` hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementTiming {
    /// Dot (dit) key-down time.
    pub dot_ms: u32,
    /// Dash (dah) key-down time.
    pub dash_ms: u32,
    /// Silence between elements.
    pub space_ms: u32,
}

impl ElementTiming {
    /// Derive element durations for `speed_wpm` words per minute at the
    /// given `weight`.
    ///
    /// Callers must have validated `speed_wpm > 0` and `weight > 1.0`;
    /// the config setters are that boundary, so the division below cannot
    /// hit the `weight == 1` singularity.
    pub fn derive(speed_wpm: u16, weight: f32) -> Self {
        let space = 1200 / u32::from(speed_wpm);
        let w = (1.0 + weight) / (weight - 1.0);

        // Floor of 1 ms keeps extreme legal weights from collapsing an
        // element to zero.
        let dot = ((space as f32 * (w - 1.0)) as u32).max(1);
        let dash = (((1.0 + w) * space as f32) as u32).max(1);

        Self {
            dot_ms: dot,
            dash_ms: dash,
            space_ms: space.max(1),
        }
    }
}
