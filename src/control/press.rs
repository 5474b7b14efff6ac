//! Button press latch + short/long classification.
//!
//! ## Two-context handoff
//!
//! The GPIO ISR runs [`PressLatch::record`] on each rising edge: a single
//! compare-and-set-if-absent of the timestamp, nothing else.  The control
//! loop reads and clears the latch once per iteration through
//! [`PressClassifier::classify`].  While a timestamp is latched, further
//! edges are ignored — that IS the debounce policy, there is no separate
//! debounce window.
//!
//! ## Classification
//!
//! | Gesture     | Condition                      | Action          |
//! |-------------|--------------------------------|-----------------|
//! | Short press | released, held < threshold     | toggle motor    |
//! | Long press  | released, held >= threshold    | toggle mode     |
//!
//! Classification is deferred to release: nothing happens while the line
//! still reads pressed.  A press that never releases stays latched forever
//! and produces no action — preserved behavior, not a bug.

use core::sync::atomic::{AtomicU32, Ordering};

/// One-slot timestamp latch shared between the ISR and the control loop.
///
/// Zero is the "absent" sentinel.  A legitimate press at `now_ms == 0` is
/// stamped as 1 so it can never collide with the sentinel; the 1 ms skew is
/// far below the classification threshold.
pub struct PressLatch(AtomicU32);

impl PressLatch {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Record a rising edge.  Only the first edge after a clear wins;
    /// all later edges are ignored until the loop re-arms the latch.
    /// Lock-free — safe to call from ISR context.
    pub fn record(&self, now_ms: u32) {
        let stamp = now_ms.max(1);
        let _ = self
            .0
            .compare_exchange(0, stamp, Ordering::AcqRel, Ordering::Relaxed);
    }

    /// The latched press timestamp, if any.
    pub fn pressed_at(&self) -> Option<u32> {
        match self.0.load(Ordering::Acquire) {
            0 => None,
            t => Some(t),
        }
    }

    /// Clear the latch, re-arming edge detection.
    pub fn clear(&self) {
        self.0.store(0, Ordering::Release);
    }

    /// True when no press is latched (edge detection armed).
    pub fn is_armed(&self) -> bool {
        self.0.load(Ordering::Acquire) == 0
    }
}

impl Default for PressLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Action requested by a classified press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressAction {
    /// Short press: flip the vent motor on/off.
    ToggleMotor,
    /// Long press: flip manual/automatic mode.
    ToggleMode,
}

/// Release-time press classifier.  Call once per loop iteration.
pub struct PressClassifier {
    long_press_ms: u32,
}

impl PressClassifier {
    pub fn new(long_press_ms: u32) -> Self {
        Self { long_press_ms }
    }

    /// Classify a completed press, if one is ready.
    ///
    /// * `now_ms` — current monotonic time.
    /// * `line_pressed` — current physical button level.
    ///
    /// Returns `None` while the button is still held or no press is
    /// latched.  On a release with a latched timestamp, clears the latch
    /// and returns the classified action.
    pub fn classify(
        &self,
        latch: &PressLatch,
        now_ms: u32,
        line_pressed: bool,
    ) -> Option<PressAction> {
        if line_pressed {
            return None;
        }
        let pressed_at = latch.pressed_at()?;
        latch.clear();

        let held_ms = now_ms.wrapping_sub(pressed_at);
        if held_ms < self.long_press_ms {
            Some(PressAction::ToggleMotor)
        } else {
            Some(PressAction::ToggleMode)
        }
    }
}
