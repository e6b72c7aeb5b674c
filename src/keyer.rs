//! Iambic keyer finite state machine.
//!
//! Pure logic, no hardware dependencies. Reads paddle contacts and drives
//! the CW and PTT lines through the [`KeyerHal`] seam. Fully testable on
//! host.
//!
//! # Polling contract
//!
//! An external scheduler calls [`Keyer::poll_once`] once per tick, fast
//! relative to the shortest element (sub-millisecond to low-millisecond at
//! top speed). Each poll advances at most one state transition and returns
//! immediately; element lengths come from absolute deadlines compared
//! against the monotonic clock, never from sleeping.
//!
//! # Keying disciplines
//!
//! - **Straight**: outputs follow the contacts directly, no timing logic.
//! - **Iambic A**: paddles sampled only during the inter-element space.
//! - **Iambic B**: paddles also sampled mid-element, so a squeeze released
//!   during the final element still yields one more opposite element.

use log::{debug, trace};

use crate::config::{ConfigError, KeyMode, KeyerConfig};
use crate::hal::{KeyerHal, LineId, Paddle};
use crate::latch::PaddleLatch;
use crate::timing::ElementTiming;

/// FSM state.
///
/// A closed enum: an out-of-range state value is unrepresentable, so the
/// transition match below is exhaustive with no default arm to fall
/// through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    CheckDit,
    CheckDah,
    KeyPrep,
    Keyed,
    InterElement,
}

/// Iambic paddle keyer engine.
///
/// Owns its timing, latch and state exclusively; one instance per key
/// line. Construct once at startup, then poll for the life of the
/// controller.
///
/// # Example
///
/// ```
/// use paddle_keyer::{Keyer, KeyerHal, LineId, Paddle};
///
/// struct Bench {
///     now_ms: u64,
///     dit: bool,
///     dah: bool,
/// }
///
/// impl KeyerHal for Bench {
///     fn read_paddle(&mut self, paddle: Paddle) -> bool {
///         match paddle {
///             Paddle::Dit => self.dit,
///             Paddle::Dah => self.dah,
///         }
///     }
///     fn write_line(&mut self, _line: LineId, _asserted: bool) {}
///     fn now_ms(&mut self) -> u64 {
///         self.now_ms
///     }
/// }
///
/// let mut hal = Bench { now_ms: 0, dit: false, dah: false };
/// let mut keyer = Keyer::new(20, 3.0).unwrap();
///
/// // Nothing pressed: not busy
/// assert!(!keyer.poll_once(&mut hal));
///
/// // Dit paddle closed: the engine goes busy this same poll
/// hal.dit = true;
/// assert!(keyer.poll_once(&mut hal));
/// ```
pub struct Keyer {
    config: KeyerConfig,
    timing: ElementTiming,
    latch: PaddleLatch,
    state: State,

    /// Absolute end time of the element or space in flight.
    deadline_ms: u64,
}

impl Keyer {
    /// Create a keyer at the given speed and weight.
    ///
    /// Timing is derived here and on every later speed/weight change.
    pub fn new(speed_wpm: u16, weight: f32) -> Result<Self, ConfigError> {
        let config = KeyerConfig::new(speed_wpm, weight)?;
        Ok(Self {
            timing: ElementTiming::derive(speed_wpm, weight),
            config,
            latch: PaddleLatch::empty(),
            state: State::Idle,
            deadline_ms: 0,
        })
    }

    /// Set send speed in words per minute (5..=100).
    ///
    /// Recomputes timing synchronously before returning. An element
    /// already in flight keeps its original deadline; the new timing
    /// applies from the next element.
    pub fn set_wpm(&mut self, speed_wpm: u16) -> Result<(), ConfigError> {
        KeyerConfig::validate_wpm(speed_wpm)?;
        self.config.speed_wpm = speed_wpm;
        self.timing = ElementTiming::derive(speed_wpm, self.config.weight);
        debug!("speed {} WPM, dot {} ms", speed_wpm, self.timing.dot_ms);
        Ok(())
    }

    /// Set dot weighting (must be greater than 1; 3.0 nominal).
    pub fn set_weight(&mut self, weight: f32) -> Result<(), ConfigError> {
        KeyerConfig::validate_weight(weight)?;
        self.config.weight = weight;
        self.timing = ElementTiming::derive(self.config.speed_wpm, weight);
        debug!("weight {}, dot {} ms", weight, self.timing.dot_ms);
        Ok(())
    }

    /// Set the keying discipline.
    pub fn set_mode(&mut self, mode: KeyMode) {
        self.config.mode = mode;
        debug!("key mode {:?}", mode);
    }

    /// Get the keying discipline.
    pub fn mode(&self) -> KeyMode {
        self.config.mode
    }

    /// Assign the physical line driven as the CW key output.
    ///
    /// Takes effect on the next output edge; assign before keying begins
    /// so the previous line is not left asserted.
    pub fn set_cw_line(&mut self, line: LineId) {
        self.config.cw_line = line;
    }

    /// Assign the physical line driven as the PTT output. May be the same
    /// line as CW on hardware that keys both together.
    pub fn set_ptt_line(&mut self, line: LineId) {
        self.config.ptt_line = line;
    }

    /// Invert which physical contact reads as the dit paddle.
    pub fn set_paddle_swap(&mut self, swap: bool) {
        self.config.paddle_swap = swap;
    }

    /// Current settings.
    pub fn config(&self) -> &KeyerConfig {
        &self.config
    }

    /// Current derived element timing.
    pub fn timing(&self) -> &ElementTiming {
        &self.timing
    }

    /// True when no element, space or pending latch is in flight.
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle && self.latch.is_empty()
    }

    /// Advance the keyer by one poll. Returns `true` while busy.
    ///
    /// Never blocks; at most one state transition per call (the
    /// check-dit → check-dah fallthrough happens within one poll).
    pub fn poll_once<H: KeyerHal>(&mut self, hal: &mut H) -> bool {
        if self.config.mode == KeyMode::Straight {
            return self.poll_straight(hal);
        }

        match self.state {
            State::Idle => self.poll_idle(hal),
            State::CheckDit => self.poll_check_dit(hal),
            State::CheckDah => self.poll_check_dah(hal),
            State::KeyPrep => self.poll_key_prep(hal),
            State::Keyed => self.poll_keyed(hal),
            State::InterElement => self.poll_inter_element(hal),
        }
    }

    /// Operator abort: force idle and release both outputs, regardless of
    /// current state. Safe to call between any two polls.
    pub fn reset<H: KeyerHal>(&mut self, hal: &mut H) {
        self.state = State::Idle;
        self.latch = PaddleLatch::empty();
        self.deadline_ms = 0;
        hal.write_line(self.config.cw_line, false);
        hal.write_line(self.config.ptt_line, false);
        debug!("keyer reset, outputs released");
    }

    // --- Straight key bypass ---

    fn poll_straight<H: KeyerHal>(&mut self, hal: &mut H) -> bool {
        let (dit, dah) = self.read_contacts(hal);
        let closed = dit || dah;
        if closed {
            hal.write_line(self.config.ptt_line, true);
            hal.write_line(self.config.cw_line, true);
        } else {
            hal.write_line(self.config.cw_line, false);
            hal.write_line(self.config.ptt_line, false);
        }
        closed
    }

    // --- One handler per state ---

    fn poll_idle<H: KeyerHal>(&mut self, hal: &mut H) -> bool {
        let (dit, dah) = self.read_contacts(hal);
        if dit || dah || self.latch.any_latched() {
            self.latch.latch(dit, dah);
            self.state = State::CheckDit;
            return true;
        }
        false
    }

    fn poll_check_dit<H: KeyerHal>(&mut self, hal: &mut H) -> bool {
        if self.latch.dit_latched() {
            self.latch.insert(PaddleLatch::DIT_IN_PROGRESS);
            self.deadline_ms = hal.now_ms() + u64::from(self.timing.dot_ms);
            self.state = State::KeyPrep;
            trace!("dit, {} ms", self.timing.dot_ms);
            return true;
        }

        // No dit latched: check the dah side within this same poll. An
        // explicit call, not a match fallthrough, so one poll can fall
        // from check-dit through check-dah to idle with nothing sent.
        self.state = State::CheckDah;
        self.poll_check_dah(hal)
    }

    fn poll_check_dah<H: KeyerHal>(&mut self, hal: &mut H) -> bool {
        if self.latch.dah_latched() {
            self.deadline_ms = hal.now_ms() + u64::from(self.timing.dash_ms);
            self.state = State::KeyPrep;
            trace!("dah, {} ms", self.timing.dash_ms);
            return true;
        }
        self.state = State::Idle;
        false
    }

    fn poll_key_prep<H: KeyerHal>(&mut self, hal: &mut H) -> bool {
        // PTT before CW on the way up; both latch bits consumed here.
        hal.write_line(self.config.ptt_line, true);
        hal.write_line(self.config.cw_line, true);
        self.latch
            .remove(PaddleLatch::DIT_LATCHED | PaddleLatch::DAH_LATCHED);
        self.state = State::Keyed;
        true
    }

    fn poll_keyed<H: KeyerHal>(&mut self, hal: &mut H) -> bool {
        let now = hal.now_ms();
        if now >= self.deadline_ms {
            // CW before PTT on the way down
            hal.write_line(self.config.cw_line, false);
            hal.write_line(self.config.ptt_line, false);
            self.deadline_ms = now + u64::from(self.timing.space_ms);
            self.state = State::InterElement;
        } else if self.config.mode == KeyMode::IambicB {
            // Mode B's early memory: an opposite-paddle press during the
            // element itself is latched and auto-sent afterwards.
            self.sample(hal);
        }
        true
    }

    fn poll_inter_element<H: KeyerHal>(&mut self, hal: &mut H) -> bool {
        // Both modes watch the paddles across the inter-element space.
        self.sample(hal);

        if hal.now_ms() < self.deadline_ms {
            return true;
        }

        if self.latch.dit_in_progress() {
            // Dit done: its latch is consumed, dah gets the next look.
            self.latch
                .remove(PaddleLatch::DIT_LATCHED | PaddleLatch::DIT_IN_PROGRESS);
            self.state = State::CheckDah;
            true
        } else {
            self.latch.remove(PaddleLatch::DAH_LATCHED);
            self.state = State::Idle;
            false
        }
    }

    // --- Contact sampling ---

    /// Merge a fresh contact sample into the latch.
    fn sample<H: KeyerHal>(&mut self, hal: &mut H) {
        let (dit, dah) = self.read_contacts(hal);
        self.latch.latch(dit, dah);
    }

    /// Read both contacts as (dit, dah), honoring the paddle-swap flag.
    fn read_contacts<H: KeyerHal>(&mut self, hal: &mut H) -> (bool, bool) {
        if self.config.paddle_swap {
            (hal.read_paddle(Paddle::Dah), hal.read_paddle(Paddle::Dit))
        } else {
            (hal.read_paddle(Paddle::Dit), hal.read_paddle(Paddle::Dah))
        }
    }
}
