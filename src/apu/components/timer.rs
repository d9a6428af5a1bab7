//! Timer for controlling the frequency of waveforms

use crate::apu::constants::MAX_TIMER_PERIOD;

/// Cycle countdown that paces a channel's waveform
///
/// Each channel decides its own reload length from `period` (pulse doubles
/// it, noise looks it up), so the reload is passed in on every clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    /// Period (11-bit value, or noise table index)
    pub(crate) period: u16,
    /// Cycles left until the next waveform step
    pub(crate) counter: u32,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            period: 0,
            counter: 1,
        }
    }

    /// Clock the timer
    /// Returns true on underflow, after reloading with `reload` cycles
    pub fn clock(&mut self, reload: u32) -> bool {
        self.counter = self.counter.saturating_sub(1);
        if self.counter == 0 {
            self.counter = reload.max(1);
            true
        } else {
            false
        }
    }

    /// Replace the low 8 bits of the period
    pub fn set_period_low(&mut self, low: u8) {
        self.period = (self.period & 0x700) | u16::from(low);
    }

    /// Replace the high 3 bits of the period
    pub fn set_period_high(&mut self, high: u8) {
        self.period = (self.period & 0x0FF) | ((u16::from(high) & 0x07) << 8);
    }

    /// Set the period directly
    pub fn set_period_direct(&mut self, period: u16) {
        self.period = period & MAX_TIMER_PERIOD;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
