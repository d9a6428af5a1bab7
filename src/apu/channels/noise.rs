//! Noise channel implementation for percussion and sound effects

use crate::apu::components::{Envelope, LengthCounter, Timer};
use crate::apu::constants::NOISE_PERIOD_TABLE;
use crate::apu::registers::{decode_length_load, decode_noise_control, decode_register0};

const LFSR_MASK: u16 = 0x7FFF;
const LFSR_OUTPUT_BIT: u16 = 14;
const MODE_1_TAP: u16 = 13;
const MODE_0_TAP: u16 = 8;

/// Noise channel for percussion and sound effects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseChannel {
    /// Enabled flag (from $4015)
    pub(crate) enabled: bool,
    /// Envelope generator
    pub(crate) envelope: Envelope,
    /// Length counter
    pub(crate) length_counter: LengthCounter,
    /// Timer, with `period` holding the noise table index
    pub(crate) timer: Timer,
    /// Linear Feedback Shift Register (15-bit, shifts left)
    pub(crate) lfsr: u16,
    /// Mode flag (false = mode 0, true = mode 1)
    pub(crate) mode: bool,
}

impl Default for NoiseChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseChannel {
    /// Create a new noise channel
    pub fn new() -> Self {
        Self {
            enabled: false,
            envelope: Envelope::new(),
            length_counter: LengthCounter::new(),
            timer: Timer::new(),
            lfsr: 1,
            mode: false,
        }
    }

    /// Write one of the four channel registers (register 1 is unused)
    pub fn write_register(&mut self, offset: u8, data: u8) {
        match offset & 0x03 {
            0 => {
                let control = decode_register0(data);
                self.length_counter.set_halt(control.halt);
                self.envelope.write_control(&control);
            }
            1 => {}
            2 => {
                let control = decode_noise_control(data);
                self.mode = control.mode;
                self.timer.set_period_direct(u16::from(control.period_index));
            }
            _ => {
                if self.enabled {
                    self.length_counter.load(decode_length_load(data).length_index);
                }
                self.envelope.restart();
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
    pub fn is_active(&self) -> bool {
        self.length_counter.is_active()
    }

    /// Length counter status bit for $4015 reads
    pub fn length_active(&self) -> bool {
        self.length_counter.is_active()
    }

    /// Clock the timer and update LFSR
    pub fn clock_timer(&mut self) {
        let reload = u32::from(NOISE_PERIOD_TABLE[(self.timer.period & 0x0F) as usize]);
        if self.timer.clock(reload) {
            let tap = if self.mode { MODE_1_TAP } else { MODE_0_TAP };
            let feedback = ((self.lfsr >> LFSR_OUTPUT_BIT) ^ (self.lfsr >> tap)) & 0x01;
            self.lfsr = ((self.lfsr << 1) | feedback) & LFSR_MASK;
        }
    }

    /// Quarter frame: envelope
    pub fn quarter_frame(&mut self) {
        self.envelope.clock();
    }

    /// Half frame: length counter
    pub fn half_frame(&mut self) {
        self.length_counter.clock();
    }

    /// Get the current output sample
    pub fn output(&self) -> i16 {
        if !self.is_active() {
            return 0;
        }
        let sign = if self.lfsr & (1 << LFSR_OUTPUT_BIT) != 0 {
            -2
        } else {
            2
        };
        sign * i16::from(self.envelope.volume())
    }
}
