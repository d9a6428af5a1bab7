//! APU behaviour tests
//!
//! Register-level scenarios driven through `Apu::write_register`, organized
//! by channel.

use super::*;

// ========================================
// Test Constants (APU Register Offsets)
// ========================================

pub(crate) const PULSE0_CONTROL: u8 = 0x00;
pub(crate) const PULSE0_SWEEP: u8 = 0x01;
pub(crate) const PULSE0_TIMER_LOW: u8 = 0x02;
pub(crate) const PULSE0_LENGTH: u8 = 0x03;
pub(crate) const PULSE1_CONTROL: u8 = 0x04;
pub(crate) const PULSE1_SWEEP: u8 = 0x05;
pub(crate) const PULSE1_TIMER_LOW: u8 = 0x06;
pub(crate) const PULSE1_LENGTH: u8 = 0x07;
pub(crate) const TRIANGLE_CONTROL: u8 = 0x08;
pub(crate) const TRIANGLE_TIMER_LOW: u8 = 0x0A;
pub(crate) const TRIANGLE_LENGTH: u8 = 0x0B;
pub(crate) const NOISE_CONTROL: u8 = 0x0C;
pub(crate) const NOISE_PERIOD: u8 = 0x0E;
pub(crate) const NOISE_LENGTH: u8 = 0x0F;
pub(crate) const STATUS_REGISTER: u8 = 0x15;

// ========================================
// Test Helper Functions
// ========================================

/// APU with every channel enabled and sounding at constant volume 15
pub(crate) fn apu_with_all_channels_sounding() -> Apu {
    let mut apu = Apu::new();
    apu.write_register(STATUS_REGISTER, 0x0F);

    apu.write_register(PULSE0_CONTROL, 0xBF);
    apu.write_register(PULSE0_TIMER_LOW, 0x80);
    apu.write_register(PULSE0_LENGTH, 0x08);

    apu.write_register(PULSE1_CONTROL, 0xBF);
    apu.write_register(PULSE1_TIMER_LOW, 0x90);
    apu.write_register(PULSE1_LENGTH, 0x08);

    apu.write_register(TRIANGLE_CONTROL, 0xFF);
    apu.write_register(TRIANGLE_TIMER_LOW, 0x40);
    apu.write_register(TRIANGLE_LENGTH, 0x08);

    apu.write_register(NOISE_CONTROL, 0x3F);
    apu.write_register(NOISE_PERIOD, 0x04);
    apu.write_register(NOISE_LENGTH, 0x08);

    // Load the triangle linear counter
    apu.clock_quarter_frame();
    apu
}

// ========================================
// Test Modules
// ========================================

mod pulse_tests;
