//! Music stream interpreter and per-channel command machines
//!
//! A music stream starts with a note table after the 2-byte header:
//! `N`, then `N` instrument ids, then `N` pitches, then the opcodes.
//!
//! Opcodes (0xFF and 0xFE are checked first):
//! - `0xFF`: end of stream
//! - `0xFE`: loop back to the first opcode
//! - `v < N`: start note `v`
//! - `N <= v < N + 16`: release instrument `v - N`
//! - otherwise: wait `v - N - 16` frames

use super::commands::{self, Behavior, LENGTH_LOAD, MAX_VOLUME, RELEASE_COMMANDS, START_COMMANDS};
use super::port::SoundPort;
use super::slots::Playback;
use super::{channel, StreamState, END_OF_STREAM, HEADER_LEN, LOOP_STREAM, MAX_OPCODES_PER_FRAME};

/// Number of instruments addressable by note-off opcodes
const INSTRUMENT_COUNT: usize = 16;

/// Offset of the note count byte
const NOTE_COUNT_OFFSET: usize = HEADER_LEN;

/// Offset of the first opcode in a stream with `note_count` notes
pub fn stream_start(note_count: usize) -> usize {
    NOTE_COUNT_OFFSET + 1 + 2 * note_count
}

/// Command machine state of one music channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRuntime {
    /// Command that fires when `frames_until` runs out
    pub(crate) command: u8,
    /// Start command of the held note, restarted after an effect releases the channel
    pub(crate) locked: Option<u8>,
    pub(crate) frames_until: u8,
    /// Pitch index of the current note
    pub(crate) pitch: u8,
    /// Internal volume (0-0x6F)
    pub(crate) volume: u8,
    /// Volume change per frame
    pub(crate) delta: i8,
    /// Upper bits of the volume register
    pub(crate) flags: u8,
    /// An effect owns the hardware channel
    pub(crate) suppressed: bool,
}

impl ChannelRuntime {
    pub fn new() -> Self {
        Self {
            command: 0,
            locked: None,
            frames_until: 0,
            pitch: 0,
            volume: 0,
            delta: 0,
            flags: 0,
            suppressed: false,
        }
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn locked_command(&self) -> Option<u8> {
        self.locked
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    fn start_note(&mut self, instrument: usize, pitch: u8) {
        let start = START_COMMANDS[instrument];
        self.pitch = pitch;
        self.command = start;
        self.locked = Some(start);
        self.frames_until = 0;
    }

    fn release_note(&mut self, instrument: usize) {
        self.command = RELEASE_COMMANDS[instrument];
        self.locked = None;
        self.frames_until = 0;
    }

    /// No note has played on this channel since the last reset
    fn is_idle(&self) -> bool {
        self.command == 0 && self.locked.is_none() && self.volume == 0
    }

    /// Run one game frame on hardware channel `index`
    ///
    /// An idle channel writes nothing, so an effect's last note on a channel
    /// the music never used keeps sounding as the effect left it.
    fn tick<P: SoundPort>(&mut self, index: u8, port: &mut P) {
        if self.suppressed || self.is_idle() {
            return;
        }

        if self.frames_until > 0 {
            self.frames_until -= 1;
        }
        if self.frames_until == 0 {
            self.dispatch(index, port);
        }

        let volume = i16::from(self.volume) + i16::from(self.delta);
        self.volume = volume.clamp(0, i16::from(MAX_VOLUME)) as u8;
        port.write_channel(index, 0, (self.volume >> 3) | self.flags);
    }

    fn dispatch<P: SoundPort>(&mut self, index: u8, port: &mut P) {
        let entry = commands::command(self.command);
        match entry.behavior {
            Behavior::Idle => {}
            Behavior::Attack {
                flags,
                pitch_offset,
            } => {
                self.flags = flags;
                self.volume = MAX_VOLUME;
                self.delta = 0;
                if index == channel::PULSE0 || index == channel::PULSE1 {
                    port.write_channel(index, 1, 0x00);
                }
                self.write_pitch(index, pitch_offset, port);
            }
            Behavior::Sweep { value } => port.write_channel(index, 1, value),
            Behavior::Vibrato { pitch_offset } => self.write_pitch(index, pitch_offset, port),
            Behavior::Decay { delta } => self.delta = delta,
            Behavior::Release { delta } => {
                self.delta = delta;
                self.flags = 0;
            }
        }
        self.command = entry.next;
        self.frames_until = entry.delay;
    }

    fn write_pitch<P: SoundPort>(&self, index: u8, pitch_offset: u8, port: &mut P) {
        if index == channel::NOISE {
            port.write_channel(index, 2, self.pitch & 0x0F);
            port.write_channel(index, 3, LENGTH_LOAD);
            return;
        }
        let period = commands::pitch_period(self.pitch) + u16::from(pitch_offset);
        port.write_channel(index, 2, (period & 0xFF) as u8);
        port.write_channel(index, 3, ((period >> 8) as u8 & 0x07) | LENGTH_LOAD);
    }
}

impl Default for ChannelRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// The music slot's four channel runtimes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MusicSequencer {
    runtimes: [ChannelRuntime; channel::COUNT],
}

impl MusicSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every note, lock and volume
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn runtime(&self, index: u8) -> &ChannelRuntime {
        &self.runtimes[index as usize % channel::COUNT]
    }

    /// Interpret the music stream for one game frame
    pub fn advance_stream(&mut self, playback: &mut Playback) -> StreamState {
        if playback.frames_left > 0 {
            playback.frames_left -= 1;
            if playback.frames_left > 0 {
                return StreamState::Playing;
            }
        }

        let note_count = usize::from(playback.byte_at(NOTE_COUNT_OFFSET));
        for _ in 0..MAX_OPCODES_PER_FRAME {
            let opcode = playback.next_byte();
            let value = usize::from(opcode);
            match opcode {
                END_OF_STREAM => return StreamState::Finished,
                LOOP_STREAM => playback.cursor = stream_start(note_count),
                _ if value < note_count => {
                    let instrument = usize::from(playback.byte_at(NOTE_COUNT_OFFSET + 1 + value))
                        % INSTRUMENT_COUNT;
                    let pitch = playback.byte_at(NOTE_COUNT_OFFSET + 1 + note_count + value);
                    self.instrument_runtime(instrument).start_note(instrument, pitch);
                }
                _ if value < note_count + INSTRUMENT_COUNT => {
                    let instrument = value - note_count;
                    self.instrument_runtime(instrument).release_note(instrument);
                }
                _ => {
                    playback.frames_left = (value - note_count - INSTRUMENT_COUNT) as u8;
                    return StreamState::Playing;
                }
            }
        }

        playback.frames_left = 1;
        StreamState::Playing
    }

    /// Run every unsuppressed channel's command machine for one game frame
    pub fn tick_channels<P: SoundPort>(&mut self, port: &mut P) {
        for (index, runtime) in self.runtimes.iter_mut().enumerate() {
            runtime.tick(index as u8, port);
        }
    }

    /// Hand hardware channel `index` to a sound effect
    ///
    /// The channel's volume drops to zero and its command timer stops until
    /// `restore_channel`.
    pub fn suppress_channel(&mut self, index: u8) {
        let runtime = &mut self.runtimes[index as usize % channel::COUNT];
        if !runtime.suppressed {
            runtime.suppressed = true;
            runtime.volume = 0;
        }
    }

    /// Take hardware channel `index` back from a sound effect
    ///
    /// A held note restarts from its start command on the next tick.
    pub fn restore_channel(&mut self, index: u8) {
        let runtime = &mut self.runtimes[index as usize % channel::COUNT];
        if runtime.suppressed {
            runtime.suppressed = false;
            if let Some(start) = runtime.locked {
                runtime.command = start;
                runtime.frames_until = 0;
            }
        }
    }

    fn instrument_runtime(&mut self, instrument: usize) -> &mut ChannelRuntime {
        let index = commands::INSTRUMENT_CHANNEL[instrument];
        &mut self.runtimes[usize::from(index)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apu::Apu;
    use crate::driver::commands::{COMMANDS, INSTRUMENT_CHANNEL};
    use std::sync::Arc;

    /// Music stream with notes (instrument, pitch) followed by `opcodes`
    fn music(notes: &[(u8, u8)], opcodes: &[u8]) -> Playback {
        let mut bytes = vec![2, 0, notes.len() as u8];
        bytes.extend(notes.iter().map(|(instrument, _)| *instrument));
        bytes.extend(notes.iter().map(|(_, pitch)| *pitch));
        bytes.extend_from_slice(opcodes);
        let start = stream_start(notes.len());
        Playback::new(1, Arc::from(bytes), start, 0)
    }

    fn frame(sequencer: &mut MusicSequencer, playback: &mut Playback, apu: &mut Apu) -> StreamState {
        let state = sequencer.advance_stream(playback);
        sequencer.tick_channels(apu);
        state
    }

    #[test]
    fn test_stream_start_offset() {
        assert_eq!(stream_start(0), 3);
        assert_eq!(stream_start(4), 11);
    }

    #[test]
    fn test_note_arms_start_command() {
        let mut sequencer = MusicSequencer::new();
        let mut playback = music(&[(1, 12)], &[0x00, 0x20]);

        sequencer.advance_stream(&mut playback);

        let runtime = sequencer.runtime(INSTRUMENT_CHANNEL[1]);
        assert_eq!(runtime.command(), START_COMMANDS[1]);
        assert_eq!(runtime.locked_command(), Some(START_COMMANDS[1]));
        assert_eq!(runtime.pitch, 12);
        assert_eq!(runtime.frames_until, 0);
        // 0x20 - 1 - 16
        assert_eq!(playback.frames_left, 15);
    }

    #[test]
    fn test_attack_writes_frequency_and_volume() {
        let mut apu = Apu::new();
        apu.write_register(0x15, 0x0F);
        let mut sequencer = MusicSequencer::new();
        let mut playback = music(&[(0, 5)], &[0x00, 0x30]);

        frame(&mut sequencer, &mut playback, &mut apu);

        let period = commands::pitch_period(5);
        assert_eq!(apu.latched(0x02), (period & 0xFF) as u8);
        assert_eq!(apu.latched(0x03), (period >> 8) as u8 | LENGTH_LOAD);
        assert_eq!(apu.latched(0x00), (MAX_VOLUME >> 3) | 0xB0);
        assert_eq!(sequencer.runtime(0).volume(), MAX_VOLUME);
        assert_eq!(sequencer.runtime(0).command(), COMMANDS[1].next);
        assert!(apu.pulse0.is_active());
    }

    #[test]
    fn test_noise_attack_writes_period_index() {
        let mut apu = Apu::new();
        apu.write_register(0x15, 0x0F);
        let mut sequencer = MusicSequencer::new();
        let mut playback = music(&[(3, 0x17)], &[0x00, 0x30]);

        frame(&mut sequencer, &mut playback, &mut apu);

        assert_eq!(apu.latched(0x0E), 0x07);
        assert_eq!(apu.latched(0x0F), LENGTH_LOAD);
        assert!(apu.noise.is_active());
    }

    #[test]
    fn test_release_decreases_volume_to_zero() {
        let mut apu = Apu::new();
        apu.write_register(0x15, 0x0F);
        let mut sequencer = MusicSequencer::new();
        // Note 0 on instrument 0, wait 2 frames, release, wait forever
        let mut playback = music(&[(0, 20)], &[0x00, 0x13, 0x01, 0xFD]);

        frame(&mut sequencer, &mut playback, &mut apu);
        frame(&mut sequencer, &mut playback, &mut apu);
        let held = sequencer.runtime(0).volume();

        frame(&mut sequencer, &mut playback, &mut apu);
        assert_eq!(sequencer.runtime(0).command(), RELEASE_COMMANDS[0]);
        assert_eq!(sequencer.runtime(0).locked_command(), None);

        let mut previous = held;
        while previous > 0 {
            let volume = sequencer.runtime(0).volume();
            assert!(volume < previous);
            previous = volume;
            frame(&mut sequencer, &mut playback, &mut apu);
        }
        assert_eq!(sequencer.runtime(0).volume(), 0);
        assert_eq!(apu.latched(0x00), 0);
    }

    #[test]
    fn test_delay_opcode_waits() {
        let mut sequencer = MusicSequencer::new();
        // Wait 3 frames, then note 0
        let mut playback = music(&[(2, 0)], &[0x14, 0x00, 0xFF]);

        assert_eq!(sequencer.advance_stream(&mut playback), StreamState::Playing);
        assert_eq!(sequencer.advance_stream(&mut playback), StreamState::Playing);
        assert_eq!(sequencer.advance_stream(&mut playback), StreamState::Playing);
        assert_eq!(sequencer.runtime(2).locked_command(), None);

        assert_eq!(sequencer.advance_stream(&mut playback), StreamState::Finished);
        assert_eq!(sequencer.runtime(2).locked_command(), Some(START_COMMANDS[2]));
    }

    #[test]
    fn test_loop_returns_to_first_opcode() {
        let mut sequencer = MusicSequencer::new();
        let mut playback = music(&[(0, 0), (1, 0)], &[0x00, 0x13, 0xFE]);
        let start = stream_start(2);

        sequencer.advance_stream(&mut playback);
        assert_eq!(playback.cursor, start + 2);
        sequencer.advance_stream(&mut playback);

        assert_eq!(playback.cursor, start + 2);
    }

    #[test]
    fn test_suppressed_channel_is_frozen_and_silent() {
        let mut apu = Apu::new();
        apu.write_register(0x15, 0x0F);
        let mut sequencer = MusicSequencer::new();
        let mut playback = music(&[(0, 20)], &[0x00, 0xFD]);
        frame(&mut sequencer, &mut playback, &mut apu);
        let frozen = sequencer.runtime(0).clone();

        sequencer.suppress_channel(0);
        apu.write_register(0x00, 0xAA);
        for _ in 0..10 {
            frame(&mut sequencer, &mut playback, &mut apu);
        }

        let runtime = sequencer.runtime(0);
        assert!(runtime.is_suppressed());
        assert_eq!(runtime.volume(), 0);
        assert_eq!(runtime.command(), frozen.command());
        assert_eq!(runtime.frames_until, frozen.frames_until);
        assert_eq!(apu.latched(0x00), 0xAA);
    }

    #[test]
    fn test_restore_restarts_locked_command() {
        let mut apu = Apu::new();
        apu.write_register(0x15, 0x0F);
        let mut sequencer = MusicSequencer::new();
        let mut playback = music(&[(0, 20)], &[0x00, 0xFD]);
        for _ in 0..8 {
            frame(&mut sequencer, &mut playback, &mut apu);
        }
        assert_ne!(sequencer.runtime(0).command(), START_COMMANDS[0]);

        sequencer.suppress_channel(0);
        sequencer.restore_channel(0);
        assert_eq!(sequencer.runtime(0).command(), START_COMMANDS[0]);

        frame(&mut sequencer, &mut playback, &mut apu);
        assert_eq!(sequencer.runtime(0).volume(), MAX_VOLUME);
    }

    #[test]
    fn test_restore_without_lock_keeps_release() {
        let mut sequencer = MusicSequencer::new();
        let mut playback = music(&[(0, 20)], &[0x00, 0x01, 0xFD]);
        sequencer.advance_stream(&mut playback);

        sequencer.suppress_channel(0);
        sequencer.restore_channel(0);

        assert_eq!(sequencer.runtime(0).command(), RELEASE_COMMANDS[0]);
        assert_eq!(sequencer.runtime(0).locked_command(), None);
    }

    #[test]
    fn test_idle_channel_leaves_registers_alone() {
        let mut apu = Apu::new();
        let mut sequencer = MusicSequencer::new();
        // Only instrument 2 (triangle) plays
        let mut playback = music(&[(2, 20)], &[0x00, 0xFD]);
        apu.write_register(0x00, 0x9F);
        apu.write_register(0x0C, 0x3A);

        for _ in 0..5 {
            frame(&mut sequencer, &mut playback, &mut apu);
        }

        assert_eq!(apu.latched(0x00), 0x9F);
        assert_eq!(apu.latched(0x0C), 0x3A);
        assert_ne!(apu.latched(0x08), 0);
    }

    #[test]
    fn test_reset_clears_runtimes() {
        let mut sequencer = MusicSequencer::new();
        let mut playback = music(&[(0, 20)], &[0x00, 0xFD]);
        sequencer.advance_stream(&mut playback);
        sequencer.suppress_channel(1);

        sequencer.reset();

        assert_eq!(sequencer, MusicSequencer::new());
    }
}
