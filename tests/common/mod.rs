// Common test utilities for byte-code integration tests
//
// Builders for sound-effect and music buffers, so tests read as a list of
// events instead of raw bytes.

#![allow(dead_code)]

use nes_sound::driver::{END_OF_STREAM, MUSIC_TARGET};
use nes_sound::{SoundConfig, SoundData};
use std::sync::Arc;

/// Effect opcode playing on `channel` with four register values
pub fn sfx_note(channel: u8, registers: [u8; 4]) -> Vec<u8> {
    let mut bytes = vec![channel << 2];
    bytes.extend_from_slice(&registers);
    bytes
}

/// Effect buffer: header followed by `body`
pub fn sfx(target: u8, priority: u8, body: &[u8]) -> SoundData {
    let mut bytes = vec![target, priority];
    bytes.extend_from_slice(body);
    Arc::from(bytes)
}

/// Effect that holds a square tone on `channel` for `frames` frames
pub fn sfx_tone(target: u8, priority: u8, channel: u8, frames: u8) -> SoundData {
    let mut body = sfx_note(channel, [0xBF, 0x00, 0x40, 0x08]);
    body.push(frames.max(16));
    body.push(END_OF_STREAM);
    sfx(target, priority, &body)
}

/// Music buffer: note table of (instrument, pitch) pairs followed by `body`
pub fn music(priority: u8, notes: &[(u8, u8)], body: &[u8]) -> SoundData {
    let mut bytes = vec![MUSIC_TARGET, priority, notes.len() as u8];
    bytes.extend(notes.iter().map(|(instrument, _)| *instrument));
    bytes.extend(notes.iter().map(|(_, pitch)| *pitch));
    bytes.extend_from_slice(body);
    Arc::from(bytes)
}

/// Music delay opcode for a stream with `note_count` notes
pub fn music_delay(note_count: usize, frames: u8) -> u8 {
    (note_count + 16) as u8 + frames
}

/// Music note-off opcode for `instrument`
pub fn music_release(note_count: usize, instrument: u8) -> u8 {
    note_count as u8 + instrument
}

/// Test configuration: 6 kHz so one game frame is 100 samples
pub fn test_config() -> SoundConfig {
    SoundConfig::default()
        .with_sample_rate(6000)
        .with_master_volume(255)
}
