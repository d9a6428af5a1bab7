// APU module - Audio Processing Unit implementation
//
// Two pulse channels, a triangle channel and a noise channel, clocked once per
// CPU cycle and paced by the frame counter. Channel outputs are summed
// directly, without the non-linear mixing curve of the real hardware.

pub mod channels;
pub mod components;
pub mod constants;
pub mod registers;

use channels::{NoiseChannel, PulseChannel, TriangleChannel};
use components::{FrameCounter, SweepNegate};
use constants::registers::STATUS;

/// Number of register addresses covered by the register latch ($4000-$4015)
pub const REGISTER_COUNT: usize = STATUS as usize + 1;

/// Channel bits used by $4015 and the sequencer's channel masks
pub mod channel_bits {
    pub const PULSE0: u8 = 0x01;
    pub const PULSE1: u8 = 0x02;
    pub const TRIANGLE: u8 = 0x04;
    pub const NOISE: u8 = 0x08;
    pub const ALL: u8 = 0x0F;
}

/// APU structure representing the Audio Processing Unit state
#[derive(Debug, Clone)]
pub struct Apu {
    pub(crate) pulse0: PulseChannel,
    pub(crate) pulse1: PulseChannel,
    pub(crate) triangle: TriangleChannel,
    pub(crate) noise: NoiseChannel,
    pub(crate) frame_counter: FrameCounter,
    /// Last value written to each register address
    latches: [u8; REGISTER_COUNT],
}

impl Apu {
    /// Create a new APU instance
    pub fn new() -> Self {
        Apu {
            pulse0: PulseChannel::new(SweepNegate::OnesComplement),
            pulse1: PulseChannel::new(SweepNegate::TwosComplement),
            triangle: TriangleChannel::new(),
            noise: NoiseChannel::new(),
            frame_counter: FrameCounter::new(),
            latches: [0; REGISTER_COUNT],
        }
    }

    /// Return every channel and the frame counter to power-on state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Write a register at `addr` (offset from $4000)
    ///
    /// $00-$0F address the four channels, $15 enables and disables them.
    /// Any other address is latched and otherwise ignored.
    pub fn write_register(&mut self, addr: u8, value: u8) {
        if let Some(latch) = self.latches.get_mut(addr as usize) {
            *latch = value;
        }

        let offset = addr & 0x03;
        match addr {
            0x00..=0x03 => self.pulse0.write_register(offset, value),
            0x04..=0x07 => self.pulse1.write_register(offset, value),
            0x08..=0x0B => self.triangle.write_register(offset, value),
            0x0C..=0x0F => self.noise.write_register(offset, value),
            STATUS => {
                self.pulse0.set_enabled(value & channel_bits::PULSE0 != 0);
                self.pulse1.set_enabled(value & channel_bits::PULSE1 != 0);
                self.triangle.set_enabled(value & channel_bits::TRIANGLE != 0);
                self.noise.set_enabled(value & channel_bits::NOISE != 0);
            }
            _ => {}
        }
    }

    /// Length counter status, one bit per channel
    ///
    /// Frame and DMC interrupt flags are not modelled.
    pub fn read_status(&self) -> u8 {
        let mut status = 0;
        if self.pulse0.length_active() {
            status |= channel_bits::PULSE0;
        }
        if self.pulse1.length_active() {
            status |= channel_bits::PULSE1;
        }
        if self.triangle.length_active() {
            status |= channel_bits::TRIANGLE;
        }
        if self.noise.length_active() {
            status |= channel_bits::NOISE;
        }
        status
    }

    /// Channels currently enabled through $4015
    pub fn enabled_channels(&self) -> u8 {
        let mut mask = 0;
        if self.pulse0.enabled {
            mask |= channel_bits::PULSE0;
        }
        if self.pulse1.enabled {
            mask |= channel_bits::PULSE1;
        }
        if self.triangle.enabled {
            mask |= channel_bits::TRIANGLE;
        }
        if self.noise.enabled {
            mask |= channel_bits::NOISE;
        }
        mask
    }

    /// Last value written to `addr`
    pub fn latched(&self, addr: u8) -> u8 {
        self.latches.get(addr as usize).copied().unwrap_or(0)
    }

    /// Advance the APU by one CPU cycle
    pub fn clock(&mut self) {
        if let Some(event) = self.frame_counter.clock() {
            self.clock_quarter_frame();
            if event.is_half_frame() {
                self.clock_half_frame();
            }
        }

        self.pulse0.clock_timer();
        self.pulse1.clock_timer();
        self.triangle.clock_timer();
        self.noise.clock_timer();
    }

    /// Clock envelopes and the linear counter
    pub fn clock_quarter_frame(&mut self) {
        self.pulse0.quarter_frame();
        self.pulse1.quarter_frame();
        self.triangle.quarter_frame();
        self.noise.quarter_frame();
    }

    /// Clock sweep units and length counters
    pub fn clock_half_frame(&mut self) {
        self.pulse0.half_frame();
        self.pulse1.half_frame();
        self.triangle.half_frame();
        self.noise.half_frame();
    }

    /// Sum of the four channel outputs
    pub fn output(&self) -> i16 {
        self.pulse0.output() + self.pulse1.output() + self.triangle.output() + self.noise.output()
    }

    /// Advance one cycle and return the mixed output
    pub fn produce_next_sample(&mut self) -> i16 {
        self.clock();
        self.output()
    }

    /// Get pulse channel 0 output
    pub fn pulse0_output(&self) -> i16 {
        self.pulse0.output()
    }

    /// Get pulse channel 1 output
    pub fn pulse1_output(&self) -> i16 {
        self.pulse1.output()
    }

    /// Get triangle channel output
    pub fn triangle_output(&self) -> i16 {
        self.triangle.output()
    }

    /// Get noise channel output
    pub fn noise_output(&self) -> i16 {
        self.noise.output()
    }

    /// Get the frame counter state
    pub fn frame_counter(&self) -> &FrameCounter {
        &self.frame_counter
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
