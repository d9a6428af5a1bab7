//! Frame counter for the APU
//!
//! The frame counter is a divider that generates low-frequency clock signals
//! to drive the APU's envelope, sweep, and length counter units.
//!
//! It runs a fixed five-step sequence. Every step expires after 7457 CPU
//! cycles, odd steps one cycle later, and fires a quarter frame; steps 1 and 3
//! fire a half frame as well. The sequence has no terminal state.

use crate::apu::constants::{FRAME_STEP_COUNT, FRAME_STEP_CYCLES};

/// CPU cycles in one full pass over the five steps
pub const FRAME_SEQUENCE_CYCLES: u32 = FRAME_STEP_CYCLES * FRAME_STEP_COUNT as u32 + 2;

/// Events that the frame counter can generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// Quarter frame event - clock envelopes and linear counters
    QuarterFrame,
    /// Half frame event - clock envelopes, linear counters, length counters, and sweep units
    HalfFrame,
}

impl FrameEvent {
    pub fn is_half_frame(self) -> bool {
        self == FrameEvent::HalfFrame
    }
}

/// Frame counter for clocking APU components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCounter {
    /// Cycles left in the current step
    cycles_left: u32,
    /// Current step in the sequence (0-4)
    step: u8,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self {
            cycles_left: FRAME_STEP_CYCLES,
            step: 0,
        }
    }

    /// Reset the frame counter to its initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Clock the frame counter (called every CPU cycle)
    ///
    /// # Returns
    ///
    /// The event fired when the current step expires
    pub fn clock(&mut self) -> Option<FrameEvent> {
        self.cycles_left -= 1;
        if self.cycles_left > 0 {
            return None;
        }

        let event = match self.step {
            1 | 3 => FrameEvent::HalfFrame,
            _ => FrameEvent::QuarterFrame,
        };

        self.step = (self.step + 1) % FRAME_STEP_COUNT;
        self.cycles_left = FRAME_STEP_CYCLES + u32::from(self.step & 1);

        Some(event)
    }

    /// Get the current step
    pub fn step(&self) -> u8 {
        self.step
    }

    /// Get the cycles left before the current step fires
    pub fn cycles_left(&self) -> u32 {
        self.cycles_left
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}
