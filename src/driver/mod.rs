// Driver module - byte-code sound driver on top of the APU
//
// Sound effects and music are byte-code streams. Once per game frame the
// slot manager interprets the next opcodes of every playing stream and
// turns them into register writes through the `SoundPort` façade.
//
// Stream header (2 bytes):
// - byte 0: slot target (2 = music, 4 = background effect, otherwise effect slot `target & 1`)
// - byte 1: priority; a lower priority never evicts a higher one

pub mod commands;
pub mod control;
pub mod music;
pub mod port;
pub mod sfx;
pub mod slots;

use std::sync::Arc;

pub use control::{Request, SoundController, SoundError};
pub use music::{ChannelRuntime, MusicSequencer};
pub use port::SoundPort;
pub use slots::{header_is_valid, Playback, SlotManager};

/// Identifier a game assigns to a sound
pub type SoundId = u32;

/// Shared, read-only byte-code buffer
pub type SoundData = Arc<[u8]>;

/// Game frames per second; the driver advances once per game frame
pub const GAME_FRAME_RATE: u32 = 60;

/// Length of the stream header
pub const HEADER_LEN: usize = 2;

/// Slot target byte selecting the music slot
pub const MUSIC_TARGET: u8 = 2;

/// Slot target byte for effects that only play while no music is playing
pub const BACKGROUND_SFX_TARGET: u8 = 4;

/// End-of-stream opcode
pub const END_OF_STREAM: u8 = 0xFF;

/// Loop opcode
pub const LOOP_STREAM: u8 = 0xFE;

/// Upper bound on opcodes interpreted per stream per frame
///
/// Keeps a stream that loops without a delay from stalling the audio thread.
pub(crate) const MAX_OPCODES_PER_FRAME: usize = 64;

/// Hardware channel indices as used by the façade
pub mod channel {
    pub const PULSE0: u8 = 0;
    pub const PULSE1: u8 = 1;
    pub const TRIANGLE: u8 = 2;
    pub const NOISE: u8 = 3;
    pub const COUNT: usize = 4;
}

/// Result of advancing a stream by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Waiting on a delay
    Playing,
    /// End-of-stream opcode reached
    Finished,
}
