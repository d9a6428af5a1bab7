//! Pulse wave channel implementation

use crate::apu::components::{Envelope, LengthCounter, Sweep, SweepNegate, Timer};
use crate::apu::constants::DUTY_PATTERNS;
use crate::apu::registers::{decode_length_load, decode_register0, decode_sweep};

/// Pulse wave channel (used for both Pulse 0 and Pulse 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseChannel {
    /// Enabled flag (from $4015)
    pub(crate) enabled: bool,
    /// Duty cycle (0-3)
    pub(crate) duty: u8,
    /// Duty cycle sequence position (0-7)
    pub(crate) duty_position: u8,
    /// Envelope generator
    pub(crate) envelope: Envelope,
    /// Sweep unit
    pub(crate) sweep: Sweep,
    /// Length counter
    pub(crate) length_counter: LengthCounter,
    /// Timer
    pub(crate) timer: Timer,
    /// Length counter running and sweep target in range
    active: bool,
}

impl PulseChannel {
    /// Create a new pulse channel
    /// `polarity` selects how the sweep unit negates (pulse 0: one's complement)
    pub fn new(polarity: SweepNegate) -> Self {
        Self {
            enabled: false,
            duty: 0,
            duty_position: 0,
            envelope: Envelope::new(),
            sweep: Sweep::new(polarity),
            length_counter: LengthCounter::new(),
            timer: Timer::new(),
            active: false,
        }
    }

    /// Write one of the four channel registers
    pub fn write_register(&mut self, offset: u8, data: u8) {
        match offset & 0x03 {
            0 => {
                let control = decode_register0(data);
                self.duty = control.duty;
                self.length_counter.set_halt(control.halt);
                self.envelope.write_control(&control);
            }
            1 => self.sweep.write_control(&decode_sweep(data)),
            2 => self.timer.set_period_low(data),
            _ => {
                let load = decode_length_load(data);
                self.timer.set_period_high(load.period_high);
                if self.enabled {
                    self.length_counter.load(load.length_index);
                }
                self.envelope.restart();
                self.duty_position = 0;
            }
        }
        self.check_active();
    }

    /// Set the enabled flag (from $4015)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length_counter.clear();
        }
        self.check_active();
    }

    fn check_active(&mut self) {
        self.active = self.length_counter.is_active() && self.sweep.is_valid(self.timer.period);
    }

    /// Check if the channel is producing sound
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Length counter status bit for $4015 reads
    pub fn length_active(&self) -> bool {
        self.length_counter.is_active()
    }

    /// Clock the timer and update duty position
    pub fn clock_timer(&mut self) {
        let reload = (u32::from(self.timer.period) + 1) << 1;
        if self.timer.clock(reload) {
            self.duty_position = (self.duty_position + 1) & 0x07;
        }
    }

    /// Quarter frame: envelope
    pub fn quarter_frame(&mut self) {
        self.envelope.clock();
    }

    /// Half frame: sweep and length counter
    pub fn half_frame(&mut self) {
        if let Some(new_period) = self.sweep.clock(self.timer.period) {
            self.timer.set_period_direct(new_period);
        }
        self.length_counter.clock();
        self.check_active();
    }

    /// Get the current output sample
    pub fn output(&self) -> i16 {
        if !self.active {
            return 0;
        }
        let level = DUTY_PATTERNS[self.duty as usize][self.duty_position as usize];
        i16::from(level) * i16::from(self.envelope.volume())
    }
}
