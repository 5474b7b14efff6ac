//! Indicator blink scheduler.
//!
//! Toggles the indicator at a fixed interval while the vent motor runs,
//! independent of the oscillation step rate: the sweep advances every
//! active iteration (~5 ms) but the indicator flips only when the blink
//! interval has elapsed.  When the motor stops, the indicator is forced
//! off within one iteration.

/// Fixed-interval square-wave generator with injected time.
#[derive(Debug, Clone)]
pub struct BlinkScheduler {
    interval_ms: u32,
    indicator_on: bool,
    last_toggle_ms: u32,
}

impl BlinkScheduler {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            indicator_on: false,
            last_toggle_ms: 0,
        }
    }

    /// Advance the scheduler; call once per active iteration.
    /// Returns the indicator state after any toggle.
    pub fn tick(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_toggle_ms) >= self.interval_ms {
            self.indicator_on = !self.indicator_on;
            self.last_toggle_ms = now_ms;
        }
        self.indicator_on
    }

    /// Force the indicator off (motor inactive).
    pub fn force_off(&mut self) {
        self.indicator_on = false;
    }

    /// Current indicator state.
    pub fn is_on(&self) -> bool {
        self.indicator_on
    }
}
