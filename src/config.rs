//! Module: config
//!
//! Purpose: operator-settable keyer parameters. Speed and weight are
//! validated here, at the setter boundary, so illegal values can never
//! reach the timing division. Line assignments take effect on the next
//! output edge; set them before keying begins so a previously assigned
//! line is not left stuck asserted.

use thiserror::Error;

use crate::hal::LineId;

/// Slowest supported send speed.
pub const MIN_WPM: u16 = 5;

/// Fastest supported send speed.
pub const MAX_WPM: u16 = 100;

/// Unweighted nominal weight, the classic 1:3:1 ratio.
pub const NOMINAL_WEIGHT: f32 = 3.0;

/// Invalid-configuration conditions, rejected before use.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Speed outside the supported 5..=100 WPM range.
    #[error("speed {0} WPM outside supported range {MIN_WPM}..={MAX_WPM}")]
    SpeedOutOfRange(u16),

    /// Weight at or below the `weight = 1` division singularity.
    /// Working range is roughly 2.5..=3.5 with 3.0 nominal.
    #[error("weight {0} not above 1")]
    WeightOutOfRange(f32),
}

/// Keying discipline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyMode {
    /// No timing logic: outputs follow the contacts directly.
    Straight,
    /// Iambic A: paddles sampled only during the inter-element space.
    IambicA,
    /// Iambic B: paddles also sampled mid-element, so an opposite press
    /// during the final element is remembered and auto-sent.
    IambicB,
}

impl Default for KeyMode {
    fn default() -> Self {
        KeyMode::IambicA
    }
}

/// Current keyer settings.
///
/// Owned by the [`Keyer`](crate::keyer::Keyer); mutated only through its
/// setters, which keep the derived timing in sync.
#[derive(Clone, Copy, Debug)]
pub struct KeyerConfig {
    /// Send speed, words per minute.
    pub speed_wpm: u16,
    /// Dot weighting. Hard constraint: greater than 1.
    pub weight: f32,
    /// Keying discipline.
    pub mode: KeyMode,
    /// Physical line driven as the CW key output.
    pub cw_line: LineId,
    /// Physical line driven as the PTT output. May equal `cw_line`.
    pub ptt_line: LineId,
    /// Invert which physical contact reads as the dit paddle.
    pub paddle_swap: bool,
}

impl KeyerConfig {
    /// Build a validated configuration with default mode and lines.
    pub fn new(speed_wpm: u16, weight: f32) -> Result<Self, ConfigError> {
        Self::validate_wpm(speed_wpm)?;
        Self::validate_weight(weight)?;
        Ok(Self {
            speed_wpm,
            weight,
            mode: KeyMode::default(),
            cw_line: LineId::new(0),
            ptt_line: LineId::new(1),
            paddle_swap: false,
        })
    }

    /// Reject speeds outside the supported range.
    pub fn validate_wpm(speed_wpm: u16) -> Result<(), ConfigError> {
        if !(MIN_WPM..=MAX_WPM).contains(&speed_wpm) {
            return Err(ConfigError::SpeedOutOfRange(speed_wpm));
        }
        Ok(())
    }

    /// Reject weights at or below the division singularity.
    pub fn validate_weight(weight: f32) -> Result<(), ConfigError> {
        if !(weight > 1.0) {
            return Err(ConfigError::WeightOutOfRange(weight));
        }
        Ok(())
    }
}
