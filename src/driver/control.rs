//! Cross-thread control surface
//!
//! The game thread holds a `SoundController`; the audio thread owns the
//! engine. Requests travel through a bounded lock-free queue and are applied
//! whole at the next game-frame boundary.
//!
//! The controllers keep every started buffer in a ledger until the audio
//! thread has applied the start and the sound has left its slot, so byte-code
//! buffers are freed on the game thread and the audio thread never
//! deallocates.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam::queue::ArrayQueue;
use log::{debug, warn};

use super::slots::{header_is_valid, SLOT_COUNT};
use super::{SoundData, SoundId};

/// Published value of an empty slot
const NO_SOUND: u64 = u64::MAX;

/// A control request queued for the audio thread
#[derive(Debug, Clone)]
pub enum Request {
    Start { id: SoundId, data: SoundData },
    Stop { id: SoundId },
    StopAll,
}

/// Errors reported to the game thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundError {
    /// Buffer too short for its header or note table
    InvalidBuffer { id: SoundId, len: usize },

    /// The audio thread has not drained earlier requests yet
    QueueFull,
}

impl fmt::Display for SoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundError::InvalidBuffer { id, len } => {
                write!(f, "Invalid byte-code buffer for sound {} ({} bytes)", id, len)
            }
            SoundError::QueueFull => write!(f, "Sound request queue is full"),
        }
    }
}

impl std::error::Error for SoundError {}

/// State shared between the controller and the engine
#[derive(Debug)]
pub(crate) struct Shared {
    requests: ArrayQueue<Request>,
    master_volume: AtomicU8,
    playing: [AtomicU64; SLOT_COUNT],
    /// Requests the audio thread has applied and published
    applied: AtomicU64,
}

impl Shared {
    pub(crate) fn new(queue_capacity: usize, master_volume: u8) -> Self {
        Self {
            requests: ArrayQueue::new(queue_capacity.max(1)),
            master_volume: AtomicU8::new(master_volume),
            playing: [
                AtomicU64::new(NO_SOUND),
                AtomicU64::new(NO_SOUND),
                AtomicU64::new(NO_SOUND),
            ],
            applied: AtomicU64::new(0),
        }
    }

    pub(crate) fn pop_request(&self) -> Option<Request> {
        self.requests.pop()
    }

    pub(crate) fn queue_capacity(&self) -> usize {
        self.requests.capacity()
    }

    pub(crate) fn master_volume(&self) -> u8 {
        self.master_volume.load(Ordering::Relaxed)
    }

    /// Publish slot occupants for `is_sound_playing`
    pub(crate) fn publish(&self, ids: [Option<SoundId>; SLOT_COUNT]) {
        for (slot, id) in self.playing.iter().zip(ids) {
            slot.store(id.map_or(NO_SOUND, u64::from), Ordering::Release);
        }
    }

    /// Count `count` more requests as applied
    ///
    /// Called after `publish`, so a reader that sees the new count also sees
    /// the slot occupants that resulted from those requests.
    pub(crate) fn mark_applied(&self, count: u64) {
        if count > 0 {
            self.applied.fetch_add(count, Ordering::Release);
        }
    }

    fn applied(&self) -> u64 {
        self.applied.load(Ordering::Acquire)
    }

    fn playing_ids(&self) -> [u64; SLOT_COUNT] {
        std::array::from_fn(|slot| self.playing[slot].load(Ordering::Acquire))
    }
}

/// A start request whose buffer the game thread still holds
#[derive(Debug)]
struct Started {
    id: SoundId,
    /// Position of the request in queue order, starting at 1
    ticket: u64,
    data: SoundData,
}

/// Game-thread record of queued requests and started buffers
#[derive(Debug, Default)]
struct Ledger {
    /// Requests pushed by every controller clone
    pushed: u64,
    started: Vec<Started>,
}

/// Game-thread handle for starting and stopping sounds
///
/// Cheap to clone; every clone talks to the same engine and shares one
/// ledger. Once the last controller is dropped, buffers still playing are
/// freed by the audio thread when they finish.
#[derive(Debug, Clone)]
pub struct SoundController {
    shared: Arc<Shared>,
    ledger: Arc<Mutex<Ledger>>,
}

impl SoundController {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            ledger: Arc::default(),
        }
    }

    /// Queue `data` to start as sound `id` at the next game frame
    ///
    /// The buffer is checked here, so a malformed buffer never reaches the
    /// audio thread. Priority drops happen later and are not reported.
    pub fn start_sound(&self, id: SoundId, data: impl Into<SoundData>) -> Result<(), SoundError> {
        let data = data.into();
        if !header_is_valid(&data) {
            warn!("Rejected sound {}: malformed {}-byte buffer", id, data.len());
            return Err(SoundError::InvalidBuffer {
                id,
                len: data.len(),
            });
        }

        let mut ledger = self.ledger();
        self.release_finished(&mut ledger);
        let ticket = self.push(
            &mut ledger,
            Request::Start {
                id,
                data: Arc::clone(&data),
            },
        )?;
        ledger.started.push(Started { id, ticket, data });
        Ok(())
    }

    /// Queue a stop for every slot playing `id`
    pub fn stop_sound(&self, id: SoundId) -> Result<(), SoundError> {
        let mut ledger = self.ledger();
        self.release_finished(&mut ledger);
        self.push(&mut ledger, Request::Stop { id }).map(drop)
    }

    /// Queue a stop for every slot
    pub fn stop_all_sounds(&self) -> Result<(), SoundError> {
        let mut ledger = self.ledger();
        self.release_finished(&mut ledger);
        self.push(&mut ledger, Request::StopAll).map(drop)
    }

    /// Whether `id` is queued to start or still occupies a slot
    ///
    /// True from a successful `start_sound` until the audio thread has run the
    /// request and the sound has finished, been stopped or lost its slot.
    pub fn is_sound_playing(&self, id: SoundId) -> bool {
        let mut ledger = self.ledger();
        self.release_finished(&mut ledger);
        ledger.started.iter().any(|started| started.id == id)
            || self.shared.playing_ids().contains(&u64::from(id))
    }

    /// Set the output volume (0 = mute, 255 = full)
    pub fn set_master_volume(&self, volume: u8) {
        self.shared.master_volume.store(volume, Ordering::Relaxed);
    }

    pub fn master_volume(&self) -> u8 {
        self.shared.master_volume()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push under the ledger lock so tickets follow queue order
    fn push(&self, ledger: &mut Ledger, request: Request) -> Result<u64, SoundError> {
        self.shared.requests.push(request).map_err(|_| {
            warn!("Sound request queue full, request dropped");
            SoundError::QueueFull
        })?;
        ledger.pushed += 1;
        Ok(ledger.pushed)
    }

    /// Drop buffers of applied starts whose sound left every slot
    fn release_finished(&self, ledger: &mut Ledger) {
        let applied = self.shared.applied();
        let playing = self.shared.playing_ids();
        ledger.started.retain(|started| {
            let keep = started.ticket > applied || playing.contains(&u64::from(started.id));
            if !keep {
                debug!("sound {}: no longer playing", started.id);
            }
            keep
        });
    }
}
