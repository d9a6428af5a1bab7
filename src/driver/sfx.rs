//! Sound-effect stream interpreter
//!
//! Opcodes:
//! - `0x00-0x0F`: play on channel `opcode >> 2`; the next four bytes go to its registers
//! - `0xFE`: loop back to the first opcode
//! - `0xFF`: end of stream
//! - anything else: wait that many frames

use super::port::SoundPort;
use super::slots::Playback;
use super::{StreamState, END_OF_STREAM, HEADER_LEN, LOOP_STREAM, MAX_OPCODES_PER_FRAME};

/// Opcodes below this value play a note
const NOTE_OPCODE_LIMIT: u8 = 16;

/// Advance an effect stream by one game frame
///
/// `mask` is the channel-enable mask currently written to the hardware; a
/// channel the stream plays on is enabled before its registers are written
/// so the length counter loads.
pub fn advance<P: SoundPort>(playback: &mut Playback, port: &mut P, mask: &mut u8) -> StreamState {
    if playback.frames_left > 0 {
        playback.frames_left -= 1;
        if playback.frames_left > 0 {
            return StreamState::Playing;
        }
    }

    for _ in 0..MAX_OPCODES_PER_FRAME {
        match playback.next_byte() {
            END_OF_STREAM => return StreamState::Finished,
            LOOP_STREAM => playback.cursor = HEADER_LEN,
            opcode if opcode < NOTE_OPCODE_LIMIT => {
                let channel = opcode >> 2;
                let bit = 1 << channel;
                playback.channels |= bit;
                if *mask & bit == 0 {
                    *mask |= bit;
                    port.write_control(*mask);
                }
                for offset in 0..4 {
                    let value = playback.next_byte();
                    port.write_channel(channel, offset, value);
                }
            }
            delay => {
                playback.frames_left = delay;
                return StreamState::Playing;
            }
        }
    }

    playback.frames_left = 1;
    StreamState::Playing
}
