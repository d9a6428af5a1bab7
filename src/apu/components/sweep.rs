//! Sweep unit for pitch bending

use crate::apu::constants::{MAX_TIMER_PERIOD, PULSE_MIN_PERIOD};
use crate::apu::registers::SweepControl;

/// How a sweep unit negates its period change
///
/// The two pulse channels differ here: pulse 0 adds the one's complement of
/// the change (subtracting one extra), pulse 1 adds the two's complement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepNegate {
    OnesComplement,
    TwosComplement,
}

/// Sweep unit for pitch bending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sweep {
    /// Enabled flag
    pub(crate) enabled: bool,
    /// Divider counter, reloaded with `period + 1`
    pub(crate) divider: u8,
    /// Period for the divider
    pub(crate) period: u8,
    /// Negate flag (pitch bend direction)
    pub(crate) negate: bool,
    /// Shift amount
    pub(crate) shift: u8,
    /// Reload armed by a register 1 write; consumed by the next half frame
    pub(crate) reload: bool,
    /// Negation polarity of the owning channel
    pub(crate) polarity: SweepNegate,
}

impl Sweep {
    pub fn new(polarity: SweepNegate) -> Self {
        Self {
            enabled: false,
            divider: 1,
            period: 0,
            negate: false,
            shift: 0,
            reload: false,
            polarity,
        }
    }

    /// Calculate the target period for the sweep
    ///
    /// Signed so that a negated change running below zero stays visible.
    pub fn target_period(&self, current_period: u16) -> i32 {
        let current = i32::from(current_period);
        let change = current >> self.shift;
        if self.negate {
            match self.polarity {
                SweepNegate::OnesComplement => current + !change,
                SweepNegate::TwosComplement => current - change,
            }
        } else {
            current + change
        }
    }

    /// Whether the channel may sound at `current_period` with the current settings
    pub fn is_valid(&self, current_period: u16) -> bool {
        let target = self.target_period(current_period);
        current_period >= PULSE_MIN_PERIOD
            && (0..=i32::from(MAX_TIMER_PERIOD)).contains(&target)
    }

    /// Clock the sweep unit (half frame)
    /// Returns Some(new_period) if the period should be updated
    pub fn clock(&mut self, current_period: u16) -> Option<u16> {
        let mut update_period = None;

        self.divider = self.divider.saturating_sub(1);
        if self.divider == 0 {
            self.divider = self.period + 1;
            if self.enabled && self.shift > 0 && self.is_valid(current_period) {
                // is_valid bounds the target to 0..=0x7FF
                update_period = Some(self.target_period(current_period) as u16);
            }
        }

        if self.reload {
            self.divider = self.period + 1;
            self.reload = false;
        }

        update_period
    }

    /// Apply a decoded register 1 write and arm a divider reload
    pub fn write_control(&mut self, control: &SweepControl) {
        self.enabled = control.enabled;
        self.period = control.period;
        self.negate = control.negate;
        self.shift = control.shift;
        self.reload = true;
    }
}
