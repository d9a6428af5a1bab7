//! Triangle wave channel implementation

use crate::apu::components::{LengthCounter, LinearCounter, Timer};
use crate::apu::constants::{TRIANGLE_MIN_PERIOD, TRIANGLE_SEQUENCE, TRIANGLE_STEP_SCALE};
use crate::apu::registers::{decode_length_load, decode_linear_control};

/// Triangle wave channel for bass and melody sounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriangleChannel {
    /// Enabled flag (from $4015)
    pub(crate) enabled: bool,
    /// Linear counter
    pub(crate) linear_counter: LinearCounter,
    /// Length counter
    pub(crate) length_counter: LengthCounter,
    /// Timer
    pub(crate) timer: Timer,
    /// Sequencer position (0-31)
    pub(crate) sequence_position: u8,
}

impl Default for TriangleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl TriangleChannel {
    /// Create a new triangle channel
    pub fn new() -> Self {
        Self {
            enabled: false,
            linear_counter: LinearCounter::new(),
            length_counter: LengthCounter::new(),
            timer: Timer::new(),
            sequence_position: 0,
        }
    }

    /// Write one of the four channel registers (register 1 is unused)
    pub fn write_register(&mut self, offset: u8, data: u8) {
        match offset & 0x03 {
            0 => {
                let control = decode_linear_control(data);
                // The control flag doubles as the length counter halt
                self.length_counter.set_halt(control.control);
                self.linear_counter.write_control(&control);
            }
            1 => {}
            2 => self.timer.set_period_low(data),
            _ => {
                let load = decode_length_load(data);
                self.timer.set_period_high(load.period_high);
                if self.enabled {
                    self.length_counter.load(load.length_index);
                }
                self.linear_counter.set_reload_flag();
            }
        }
    }

    /// Set the enabled flag (from $4015)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length_counter.clear();
        }
    }

    /// Check if the channel is producing sound
    /// Triangle channel requires both linear counter and length counter to be active
    pub fn is_active(&self) -> bool {
        self.linear_counter.is_active() && self.length_counter.is_active()
    }

    /// Length counter status bit for $4015 reads
    pub fn length_active(&self) -> bool {
        self.length_counter.is_active()
    }

    /// Clock the timer and update sequence position
    pub fn clock_timer(&mut self) {
        let reload = u32::from(self.timer.period) + 1;
        // The sequencer only advances while both counters are non-zero
        if self.timer.clock(reload) && self.is_active() {
            self.sequence_position = (self.sequence_position + 1) & 0x1F;
        }
    }

    /// Quarter frame: linear counter
    pub fn quarter_frame(&mut self) {
        self.linear_counter.clock();
    }

    /// Half frame: length counter
    pub fn half_frame(&mut self) {
        self.length_counter.clock();
    }

    /// Get the current output sample
    /// Periods below 4 are ultrasonic and render as silence
    pub fn output(&self) -> i16 {
        if !self.is_active() || self.timer.period < TRIANGLE_MIN_PERIOD {
            return 0;
        }
        i16::from(TRIANGLE_SEQUENCE[self.sequence_position as usize]) * TRIANGLE_STEP_SCALE
    }
}
