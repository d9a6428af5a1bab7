//! APU constants and lookup tables

/// NTSC CPU clock rate in Hz; the APU core advances once per CPU cycle
pub const CPU_CLOCK_HZ: u32 = 1_789_773;

/// Length counter lookup table
/// Maps the 5-bit length counter load value to the actual counter value
pub const LENGTH_COUNTER_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

/// Duty cycle patterns for pulse channels
/// Each pattern is 8 bipolar steps, representing one full cycle of the square wave
pub const DUTY_PATTERNS: [[i8; 8]; 4] = [
    [-4, 4, -4, -4, -4, -4, -4, -4], // 12.5% duty cycle
    [-4, 4, 4, -4, -4, -4, -4, -4],  // 25% duty cycle
    [-4, 4, 4, 4, 4, -4, -4, -4],    // 50% duty cycle
    [4, -4, -4, 4, 4, 4, 4, 4],      // 75% duty cycle (inverted 25%)
];

/// Triangle wave sequence for triangle channel
/// 32-step bipolar ramp from -8 up to +7 and back down
pub const TRIANGLE_SEQUENCE: [i8; 32] = [
    -8, -7, -6, -5, -4, -3, -2, -1, 0, 1, 2, 3, 4, 5, 6, 7, 7, 6, 5, 4, 3, 2, 1, 0, -1, -2, -3, -4,
    -5, -6, -7, -8,
];

/// Scale applied to each triangle step
pub const TRIANGLE_STEP_SCALE: i16 = 8;

/// Noise channel period lookup table
/// Maps the 4-bit period value to the actual timer period (in CPU cycles)
/// NTSC values
pub const NOISE_PERIOD_TABLE: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

/// Cycles between frame sequencer steps
pub const FRAME_STEP_CYCLES: u32 = 7457;

/// Number of steps in one frame sequencer cycle
pub const FRAME_STEP_COUNT: u8 = 5;

/// Lowest timer period a pulse channel can sound at
pub const PULSE_MIN_PERIOD: u16 = 8;

/// Largest 11-bit timer period
pub const MAX_TIMER_PERIOD: u16 = 0x7FF;

/// Triangle periods below this are ultrasonic and rendered as silence
pub const TRIANGLE_MIN_PERIOD: u16 = 4;

/// APU register addresses (offsets from $4000)
pub mod registers {
    pub const PULSE0_BASE: u8 = 0x00;
    pub const PULSE1_BASE: u8 = 0x04;
    pub const TRIANGLE_BASE: u8 = 0x08;
    pub const NOISE_BASE: u8 = 0x0C;
    pub const STATUS: u8 = 0x15;
}
