//! Envelope generator for controlling volume over time

use crate::apu::registers::VolumeControl;

/// Envelope generator for controlling volume over time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Reload armed by a length load; consumed by the next quarter frame
    pub(crate) start: bool,
    /// Divider counter, reloaded with `period + 1`
    pub(crate) divider: u8,
    /// Decay level counter (0-15)
    pub(crate) decay_level: u8,
    /// Constant volume, or divider period when decaying
    pub(crate) period: u8,
    /// Loop flag (from register bit 5)
    pub(crate) loop_flag: bool,
    /// Constant volume flag (from register bit 4)
    pub(crate) constant_volume: bool,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            start: false,
            divider: 1,
            decay_level: 0,
            period: 0,
            loop_flag: false,
            constant_volume: false,
        }
    }

    /// Clock the envelope generator (quarter frame)
    pub fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.decay_level = 15;
            self.divider = self.period + 1;
            return;
        }

        self.divider = self.divider.saturating_sub(1);
        if self.divider == 0 {
            self.divider = self.period + 1;
            if self.decay_level > 0 {
                self.decay_level -= 1;
            } else if self.loop_flag {
                self.decay_level = 15;
            }
        }
    }

    /// Get the current volume (0-15)
    pub fn volume(&self) -> u8 {
        if self.constant_volume {
            self.period
        } else {
            self.decay_level
        }
    }

    /// Apply a decoded register 0 write
    pub fn write_control(&mut self, control: &VolumeControl) {
        self.loop_flag = control.halt;
        self.constant_volume = control.constant_volume;
        self.period = control.volume;
    }

    /// Arm a reload for the next quarter frame
    pub fn restart(&mut self) {
        self.start = true;
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
