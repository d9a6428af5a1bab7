//! Decoding of the bit-packed channel registers
//!
//! Channel registers pack several fields into one byte. Each write is decoded
//! into a small struct with named fields before it reaches the channel, so the
//! channels never shift or mask raw register values themselves.

/// Bits 7-6: duty cycle selector (pulse only)
pub const DUTY_MASK: u8 = 0xC0;
pub const DUTY_SHIFT: u8 = 6;
/// Bit 5: length counter halt / envelope loop
pub const HALT_FLAG: u8 = 0x20;
/// Bit 4: constant volume
pub const CONSTANT_VOLUME_FLAG: u8 = 0x10;
/// Bits 3-0: volume or envelope period
pub const VOLUME_MASK: u8 = 0x0F;

/// Bit 7 of the triangle control register: linear counter control / length halt
pub const LINEAR_CONTROL_FLAG: u8 = 0x80;
/// Bits 6-0 of the triangle control register
pub const LINEAR_RELOAD_MASK: u8 = 0x7F;

/// Bit 7 of the sweep register
pub const SWEEP_ENABLE_FLAG: u8 = 0x80;
/// Bits 6-4 of the sweep register
pub const SWEEP_PERIOD_MASK: u8 = 0x70;
pub const SWEEP_PERIOD_SHIFT: u8 = 4;
/// Bit 3 of the sweep register
pub const SWEEP_NEGATE_FLAG: u8 = 0x08;
/// Bits 2-0 of the sweep register
pub const SWEEP_SHIFT_MASK: u8 = 0x07;

/// Bit 7 of the noise period register
pub const NOISE_MODE_FLAG: u8 = 0x80;
/// Bits 3-0 of the noise period register
pub const NOISE_PERIOD_MASK: u8 = 0x0F;

/// Bits 2-0 of the high period register
pub const PERIOD_HIGH_MASK: u8 = 0x07;
/// Bits 7-3 of the high period register select the length table entry
pub const LENGTH_INDEX_SHIFT: u8 = 3;

/// Register 0 of a pulse or noise channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeControl {
    /// Duty cycle selector (0-3), ignored by the noise channel
    pub duty: u8,
    /// Halts the length counter and loops the envelope
    pub halt: bool,
    /// Constant volume instead of a decaying envelope
    pub constant_volume: bool,
    /// Volume, or envelope period when decaying
    pub volume: u8,
}

/// Register 0 of the triangle channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearControl {
    /// Halts the length counter and keeps the linear counter reloading
    pub control: bool,
    /// Linear counter reload value (0-127)
    pub reload: u8,
}

/// Register 1 of a pulse channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepControl {
    pub enabled: bool,
    /// Divider period (0-7)
    pub period: u8,
    pub negate: bool,
    /// Shift count (0-7)
    pub shift: u8,
}

/// Register 2 of the noise channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseControl {
    /// Selects the short-period feedback tap
    pub mode: bool,
    /// Index into the noise period table
    pub period_index: u8,
}

/// Register 3 of a tone channel, or of the noise channel (period bits unused)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthLoad {
    /// Bits 10-8 of the timer period
    pub period_high: u8,
    /// Index into the length counter table
    pub length_index: u8,
}

pub fn decode_register0(value: u8) -> VolumeControl {
    VolumeControl {
        duty: (value & DUTY_MASK) >> DUTY_SHIFT,
        halt: value & HALT_FLAG != 0,
        constant_volume: value & CONSTANT_VOLUME_FLAG != 0,
        volume: value & VOLUME_MASK,
    }
}

pub fn decode_linear_control(value: u8) -> LinearControl {
    LinearControl {
        control: value & LINEAR_CONTROL_FLAG != 0,
        reload: value & LINEAR_RELOAD_MASK,
    }
}

pub fn decode_sweep(value: u8) -> SweepControl {
    SweepControl {
        enabled: value & SWEEP_ENABLE_FLAG != 0,
        period: (value & SWEEP_PERIOD_MASK) >> SWEEP_PERIOD_SHIFT,
        negate: value & SWEEP_NEGATE_FLAG != 0,
        shift: value & SWEEP_SHIFT_MASK,
    }
}

pub fn decode_noise_control(value: u8) -> NoiseControl {
    NoiseControl {
        mode: value & NOISE_MODE_FLAG != 0,
        period_index: value & NOISE_PERIOD_MASK,
    }
}

pub fn decode_length_load(value: u8) -> LengthLoad {
    LengthLoad {
        period_high: value & PERIOD_HIGH_MASK,
        length_index: value >> LENGTH_INDEX_SHIFT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_register0() {
        // Duty = 2, halt, constant volume, volume = 5
        let control = decode_register0(0b1011_0101);
        assert_eq!(control.duty, 2);
        assert!(control.halt);
        assert!(control.constant_volume);
        assert_eq!(control.volume, 5);

        let control = decode_register0(0x0F);
        assert_eq!(control.duty, 0);
        assert!(!control.halt);
        assert!(!control.constant_volume);
        assert_eq!(control.volume, 15);
    }

    #[test]
    fn test_decode_linear_control() {
        let control = decode_linear_control(0b1011_1111);
        assert!(control.control);
        assert_eq!(control.reload, 0x3F);
    }

    #[test]
    fn test_decode_sweep() {
        // Enabled, period = 3, negate, shift = 2
        let sweep = decode_sweep(0b1011_1010);
        assert!(sweep.enabled);
        assert_eq!(sweep.period, 3);
        assert!(sweep.negate);
        assert_eq!(sweep.shift, 2);
    }

    #[test]
    fn test_decode_noise_control() {
        let noise = decode_noise_control(0x85);
        assert!(noise.mode);
        assert_eq!(noise.period_index, 5);
    }

    #[test]
    fn test_decode_length_load() {
        let load = decode_length_load(0b1111_0101);
        assert_eq!(load.period_high, 5);
        assert_eq!(load.length_index, 30);
    }
}
