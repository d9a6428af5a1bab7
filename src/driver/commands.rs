//! Fixed tables of the music command machine
//!
//! Every music channel runs a small chain of commands: a start command when a
//! note begins, a release command when it ends. Each command performs one
//! behaviour, then hands over to its successor after a fixed delay.
//!
//! The tables below are placeholders with the right shape (28 commands,
//! 16 instruments, 64 pitches), not the data of any shipped game's driver.
//! Replace `COMMANDS`, `START_COMMANDS`, `RELEASE_COMMANDS`,
//! `INSTRUMENT_CHANNEL` and `FREQ_TABLE` byte for byte to reproduce a
//! particular soundtrack; the interpreter only relies on the properties the
//! tests in this module check.

/// Highest internal volume of a music channel
///
/// The volume register receives `volume >> 3`, so this maps to 13.
pub const MAX_VOLUME: u8 = 0x6F;

/// Length-load bits written with every frequency high byte (length index 1)
pub const LENGTH_LOAD: u8 = 0x08;

/// What a command does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Nothing; the current volume slide continues
    Idle,
    /// Start the note: full volume, no slide, new envelope flags, frequency written
    Attack { flags: u8, pitch_offset: u8 },
    /// Write the sweep register
    Sweep { value: u8 },
    /// Rewrite the frequency at an offset from the note's pitch
    Vibrato { pitch_offset: u8 },
    /// Set the per-frame volume slide
    Decay { delta: i8 },
    /// Set the per-frame volume slide and clear the envelope flags
    Release { delta: i8 },
}

/// One entry of the command table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub behavior: Behavior,
    /// Command that runs next
    pub next: u8,
    /// Frames before `next` runs
    pub delay: u8,
}

const fn cmd(behavior: Behavior, next: u8, delay: u8) -> Command {
    Command {
        behavior,
        next,
        delay,
    }
}

use Behavior::*;

/// Command table, indexed by command number
pub const COMMANDS: [Command; 28] = [
    cmd(Idle, 0, 0),
    // Lead: 50% duty, two-stage decay
    cmd(Attack { flags: 0xB0, pitch_offset: 0 }, 2, 4),
    cmd(Decay { delta: -2 }, 3, 20),
    cmd(Decay { delta: -1 }, 0, 0),
    // Harmony: 25% duty with vibrato
    cmd(Attack { flags: 0x70, pitch_offset: 0 }, 5, 2),
    cmd(Vibrato { pitch_offset: 0x04 }, 6, 3),
    cmd(Vibrato { pitch_offset: 0 }, 5, 3),
    // Rising sweep
    cmd(Attack { flags: 0x30, pitch_offset: 0 }, 8, 1),
    cmd(Sweep { value: 0x9A }, 9, 6),
    cmd(Sweep { value: 0x00 }, 3, 0),
    // Triangle: held until released
    cmd(Attack { flags: 0x80, pitch_offset: 0 }, 0, 0),
    // Noise: snare
    cmd(Attack { flags: 0x30, pitch_offset: 0 }, 12, 1),
    cmd(Decay { delta: -10 }, 0, 0),
    // Release, held
    cmd(Release { delta: -10 }, 13, 0),
    cmd(Decay { delta: -4 }, 0, 0),
    // Pad: 75% duty, slow decay
    cmd(Attack { flags: 0xF0, pitch_offset: 0 }, 16, 8),
    cmd(Decay { delta: -3 }, 0, 0),
    // Detuned lead
    cmd(Attack { flags: 0xB0, pitch_offset: 0x18 }, 2, 4),
    // Noise: hi-hat
    cmd(Attack { flags: 0x30, pitch_offset: 0 }, 14, 0),
    // Triangle: short bass
    cmd(Attack { flags: 0x80, pitch_offset: 0 }, 20, 12),
    cmd(Release { delta: -6 }, 20, 0),
    // Wide vibrato
    cmd(Attack { flags: 0x70, pitch_offset: 0x18 }, 22, 2),
    cmd(Vibrato { pitch_offset: 0x18 }, 23, 4),
    cmd(Vibrato { pitch_offset: 0 }, 22, 4),
    // Pluck
    cmd(Attack { flags: 0xB0, pitch_offset: 0 }, 25, 1),
    cmd(Decay { delta: -6 }, 14, 6),
    // Soft release
    cmd(Release { delta: -3 }, 26, 0),
    // Sustain without slide
    cmd(Decay { delta: 0 }, 0, 0),
];

/// Hardware channel each instrument plays on
pub const INSTRUMENT_CHANNEL: [u8; 16] = [0, 1, 2, 3, 0, 1, 3, 2, 0, 1, 0, 1, 0, 1, 2, 3];

/// Command run when an instrument's note starts
pub const START_COMMANDS: [u8; 16] = [1, 4, 10, 11, 7, 15, 18, 19, 17, 1, 21, 7, 24, 24, 10, 11];

/// Command run when an instrument's note is released
pub const RELEASE_COMMANDS: [u8; 16] = [13, 13, 20, 13, 13, 26, 13, 20, 26, 13, 26, 13, 13, 13, 20, 13];

/// Pulse/triangle timer periods for the 64 pitches, from C3 upward in semitones
pub const FREQ_TABLE: [u16; 64] = [
    0x356, 0x326, 0x2F9, 0x2CE, 0x2A6, 0x280, 0x25C, 0x23A,
    0x21A, 0x1FB, 0x1DF, 0x1C4, 0x1AB, 0x193, 0x17C, 0x167,
    0x152, 0x13F, 0x12D, 0x11C, 0x10C, 0x0FD, 0x0EF, 0x0E1,
    0x0D5, 0x0C9, 0x0BD, 0x0B3, 0x0A9, 0x09F, 0x096, 0x08E,
    0x086, 0x07E, 0x077, 0x070, 0x06A, 0x064, 0x05E, 0x059,
    0x054, 0x04F, 0x04B, 0x046, 0x042, 0x03F, 0x03B, 0x038,
    0x034, 0x031, 0x02F, 0x02C, 0x029, 0x027, 0x025, 0x023,
    0x021, 0x01F, 0x01D, 0x01B, 0x01A, 0x018, 0x017, 0x015,
];

/// Look up a command; numbers past the table wrap
pub fn command(number: u8) -> &'static Command {
    &COMMANDS[number as usize % COMMANDS.len()]
}

/// Timer period for a pitch index; indices past the table wrap
pub fn pitch_period(pitch: u8) -> u16 {
    FREQ_TABLE[pitch as usize % FREQ_TABLE.len()]
}
