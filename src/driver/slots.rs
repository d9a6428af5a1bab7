//! Slot manager: two sound-effect slots and one music slot
//!
//! Effects preempt music on the hardware channels they play on. While an
//! effect drives a channel the music sequencer's writes to it are
//! suppressed; once the effect lets go the held music note restarts.
//!
//! Everything here runs on the audio thread inside `fill_buffer` and never
//! logs. Slot changes are reported through the ids the engine publishes, and
//! the `SoundController` ledger holds the last reference to every buffer.

use super::control::Request;
use super::music::{self, MusicSequencer};
use super::port::SoundPort;
use super::{
    channel, SoundData, SoundId, StreamState, BACKGROUND_SFX_TARGET, END_OF_STREAM, HEADER_LEN,
    MUSIC_TARGET,
};
use crate::apu::channel_bits;

/// Number of sound-effect slots
pub const SFX_SLOTS: usize = 2;

/// Total number of slots (effects first, then music)
pub const SLOT_COUNT: usize = SFX_SLOTS + 1;

/// Check that a buffer has a header and, for music, a complete note table
pub fn header_is_valid(data: &[u8]) -> bool {
    match data {
        [MUSIC_TARGET, _, notes, ..] => data.len() >= music::stream_start(usize::from(*notes)),
        [MUSIC_TARGET, ..] => false,
        [_, _, ..] => true,
        _ => false,
    }
}

/// A byte-code stream being played in a slot
#[derive(Debug, Clone)]
pub struct Playback {
    pub(crate) id: SoundId,
    pub(crate) priority: u8,
    pub(crate) data: SoundData,
    /// Read position in `data`
    pub(crate) cursor: usize,
    /// Frames until the next opcodes are read
    pub(crate) frames_left: u8,
    /// Channels this stream has played on
    pub(crate) channels: u8,
}

impl Playback {
    /// Start reading `data` at `cursor` on the next frame
    pub fn new(id: SoundId, data: SoundData, cursor: usize, priority: u8) -> Self {
        Self {
            id,
            priority,
            data,
            cursor,
            frames_left: 1,
            channels: 0,
        }
    }

    pub fn id(&self) -> SoundId {
        self.id
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Byte at `index`; reads past the end see the end-of-stream opcode
    pub(crate) fn byte_at(&self, index: usize) -> u8 {
        self.data.get(index).copied().unwrap_or(END_OF_STREAM)
    }

    pub(crate) fn next_byte(&mut self) -> u8 {
        let value = self.byte_at(self.cursor);
        self.cursor += 1;
        value
    }
}

/// Owner of the three playback slots and the music channel runtimes
#[derive(Debug, Clone, Default)]
pub struct SlotManager {
    sfx: [Option<Playback>; SFX_SLOTS],
    music: Option<Playback>,
    sequencer: MusicSequencer,
    /// Channel-enable mask last written to the hardware
    mask: u8,
}

impl SlotManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a request from the control surface
    pub fn apply<P: SoundPort>(&mut self, request: Request, port: &mut P) {
        match request {
            Request::Start { id, data } => {
                self.start(id, data);
            }
            Request::Stop { id } => {
                self.stop(id, port);
            }
            Request::StopAll => self.stop_all(port),
        }
    }

    /// Start `data` as sound `id`
    ///
    /// Returns false when the request was dropped: a malformed header, a
    /// lower priority than the occupant, or a background effect while music
    /// plays.
    pub fn start(&mut self, id: SoundId, data: SoundData) -> bool {
        if !header_is_valid(&data) {
            return false;
        }
        let target = data[0];
        let priority = data[1];

        if target == MUSIC_TARGET {
            let start = music::stream_start(usize::from(data[HEADER_LEN]));
            let mut playback = Playback::new(id, data, start, priority);
            playback.channels = channel_bits::ALL;
            self.music = Some(playback);
            self.sequencer.reset();
            return true;
        }

        let index = if target == BACKGROUND_SFX_TARGET {
            if self.music.is_some() {
                return false;
            }
            0
        } else {
            usize::from(target & 1)
        };

        if let Some(current) = &self.sfx[index] {
            if priority < current.priority {
                return false;
            }
        }

        self.sfx[index] = Some(Playback::new(id, data, HEADER_LEN, priority));
        true
    }

    /// Stop every slot playing `id` and update the channel-enable mask
    ///
    /// Returns false if nothing was playing `id`.
    pub fn stop<P: SoundPort>(&mut self, id: SoundId, port: &mut P) -> bool {
        let mut stopped = false;
        for slot in self.sfx.iter_mut().chain(std::iter::once(&mut self.music)) {
            if slot.as_ref().is_some_and(|playback| playback.id == id) {
                *slot = None;
                stopped = true;
            }
        }

        if stopped {
            self.update_channel_mask(port);
        }
        stopped
    }

    /// Empty every slot and disable all channels
    pub fn stop_all<P: SoundPort>(&mut self, port: &mut P) {
        self.sfx = Default::default();
        self.music = None;
        self.sequencer.reset();
        self.mask = 0;
        port.write_control(0);
    }

    /// Run one game frame: effect slots in order, then music
    pub fn advance_one_game_frame<P: SoundPort>(&mut self, port: &mut P) {
        self.update_channel_mask(port);

        for slot in self.sfx.iter_mut() {
            if let Some(playback) = slot {
                if super::sfx::advance(playback, port, &mut self.mask) == StreamState::Finished {
                    *slot = None;
                }
            }
        }

        let sfx_channels = self.sfx_channels();
        for index in 0..channel::COUNT as u8 {
            if sfx_channels & (1 << index) != 0 {
                self.sequencer.suppress_channel(index);
            } else {
                self.sequencer.restore_channel(index);
            }
        }

        let Some(playback) = &mut self.music else {
            return;
        };
        let state = self.sequencer.advance_stream(playback);
        self.sequencer.tick_channels(port);
        if state == StreamState::Finished {
            self.music = None;
        }
    }

    /// Sound id in effect slot `index`
    pub fn sfx_occupant(&self, index: usize) -> Option<SoundId> {
        self.sfx.get(index)?.as_ref().map(Playback::id)
    }

    /// Sound id in the music slot
    pub fn music_occupant(&self) -> Option<SoundId> {
        self.music.as_ref().map(Playback::id)
    }

    /// Occupants of every slot, effects first
    pub fn playing_ids(&self) -> [Option<SoundId>; SLOT_COUNT] {
        [
            self.sfx_occupant(0),
            self.sfx_occupant(1),
            self.music_occupant(),
        ]
    }

    pub fn is_playing(&self, id: SoundId) -> bool {
        self.playing_ids().contains(&Some(id))
    }

    /// Channel-enable mask last written to the hardware
    pub fn channel_mask(&self) -> u8 {
        self.mask
    }

    pub fn sequencer(&self) -> &MusicSequencer {
        &self.sequencer
    }

    /// Channels driven by a playing effect
    fn sfx_channels(&self) -> u8 {
        self.sfx
            .iter()
            .flatten()
            .fold(0, |mask, playback| mask | playback.channels)
    }

    /// Channels needed by any playing slot
    fn required_channels(&self) -> u8 {
        let music = self.music.as_ref().map_or(0, |playback| playback.channels);
        self.sfx_channels() | music
    }

    fn update_channel_mask<P: SoundPort>(&mut self, port: &mut P) {
        let mask = self.required_channels();
        if mask != self.mask {
            self.mask = mask;
            port.write_control(mask);
        }
    }
}
