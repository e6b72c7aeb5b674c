//! Module: latch
//!
//! Purpose: paddle-press memory between polls. A press that lands while
//! the engine is mid-element (and therefore not watching the raw contacts)
//! survives here until the state machine consumes it.
//!
//! Ownership: sampling only ever ORs bits in; clearing is exclusively the
//! state machine's job, at its defined transition points.

use bitflags::bitflags;

bitflags! {
    /// Paddle latch word.
    ///
    /// All flags start clear. `latch()` sets `DIT_LATCHED`/`DAH_LATCHED`
    /// from the current contact sample and never clears anything;
    /// `DIT_IN_PROGRESS` marks the element being timed as a dit so the
    /// machine knows where to resume after the inter-element space.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PaddleLatch: u8 {
        /// Dit contact closure seen since the machine last cleared it.
        const DIT_LATCHED = 0x01;
        /// Dah contact closure seen since the machine last cleared it.
        const DAH_LATCHED = 0x02;
        /// The element currently in flight is a dit.
        const DIT_IN_PROGRESS = 0x04;
    }
}

impl Default for PaddleLatch {
    fn default() -> Self {
        Self::empty()
    }
}

impl PaddleLatch {
    /// OR the current contact sample into the latch. Set-only.
    pub fn latch(&mut self, dit_closed: bool, dah_closed: bool) {
        if dit_closed {
            self.insert(Self::DIT_LATCHED);
        }
        if dah_closed {
            self.insert(Self::DAH_LATCHED);
        }
    }

    /// True if the dit paddle has been latched.
    #[inline]
    pub fn dit_latched(&self) -> bool {
        self.contains(Self::DIT_LATCHED)
    }

    /// True if the dah paddle has been latched.
    #[inline]
    pub fn dah_latched(&self) -> bool {
        self.contains(Self::DAH_LATCHED)
    }

    /// True if either paddle has been latched.
    #[inline]
    pub fn any_latched(&self) -> bool {
        self.intersects(Self::DIT_LATCHED.union(Self::DAH_LATCHED))
    }

    /// True if the in-flight element is a dit.
    #[inline]
    pub fn dit_in_progress(&self) -> bool {
        self.contains(Self::DIT_IN_PROGRESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_all_clear() {
        let latch = PaddleLatch::default();
        assert!(!latch.dit_latched());
        assert!(!latch.dah_latched());
        assert!(!latch.dit_in_progress());
        assert!(!latch.any_latched());
    }

    #[test]
    fn test_latch_is_set_only() {
        let mut latch = PaddleLatch::default();

        latch.latch(true, false);
        assert!(latch.dit_latched());
        assert!(!latch.dah_latched());

        // A later sample with the paddle released must not clear the bit
        latch.latch(false, false);
        assert!(latch.dit_latched());

        latch.latch(false, true);
        assert!(latch.dit_latched());
        assert!(latch.dah_latched());
        assert!(latch.any_latched());
    }

    #[test]
    fn test_in_progress_independent_of_latches() {
        let mut latch = PaddleLatch::DIT_IN_PROGRESS;
        assert!(latch.dit_in_progress());
        assert!(!latch.any_latched());

        latch.remove(PaddleLatch::DIT_LATCHED | PaddleLatch::DIT_IN_PROGRESS);
        assert!(!latch.dit_in_progress());
    }
}
