//! Register/control façade between the byte-code driver and the APU

use crate::apu::channel_bits;
use crate::apu::constants::registers::STATUS;
use crate::apu::Apu;

/// Symbolic access to the four sound channels
///
/// The driver never computes global register addresses itself; it names a
/// channel (0-3) and one of its four registers.
pub trait SoundPort {
    /// Write register `offset` (0-3) of `channel` (0-3)
    fn write_channel(&mut self, channel: u8, offset: u8, value: u8);

    /// Write the channel-enable mask
    fn write_control(&mut self, mask: u8);

    /// Length counter status, one bit per channel
    fn read_status(&self) -> u8;
}

/// Global register address of a channel register
pub fn channel_register(channel: u8, offset: u8) -> u8 {
    ((channel & 0x03) << 2) | (offset & 0x03)
}

impl SoundPort for Apu {
    fn write_channel(&mut self, channel: u8, offset: u8, value: u8) {
        self.write_register(channel_register(channel, offset), value);
    }

    fn write_control(&mut self, mask: u8) {
        self.write_register(STATUS, mask & channel_bits::ALL);
    }

    fn read_status(&self) -> u8 {
        Apu::read_status(self)
    }
}
