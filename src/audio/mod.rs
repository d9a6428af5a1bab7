// Audio module - sample generation loop
//
// This module provides:
// - `SoundEngine`, which runs the APU and the byte-code driver on the audio thread
// - Cross-platform audio output using cpal (feature `audio`)
//
// # Usage
//
// ```no_run
// use nes_sound::audio::SoundEngine;
// use nes_sound::SoundConfig;
//
// let (mut engine, controller) = SoundEngine::new(&SoundConfig::default());
//
// // Game thread:
// controller.start_sound(1, vec![0, 5, 0x00, 0xBF, 0x00, 0x40, 0x08, 0x20, 0xFF]).unwrap();
//
// // Audio thread:
// let mut samples = [0i16; 800];
// engine.fill_buffer(&mut samples);
// ```

#[cfg(feature = "audio")]
pub mod output;

#[cfg(feature = "audio")]
pub use output::{AudioConfig, AudioOutput};

use std::sync::Arc;

use log::info;

use crate::apu::constants::CPU_CLOCK_HZ;
use crate::apu::Apu;
use crate::config::SoundConfig;
use crate::driver::control::Shared;
use crate::driver::{SlotManager, SoundController, GAME_FRAME_RATE};

/// Gain from the summed channel output to 16-bit samples
pub const OUTPUT_GAIN: i32 = 64;

/// Full-scale master volume
pub const MAX_MASTER_VOLUME: i32 = 255;

/// APU, slot manager and request intake, driven by the host audio callback
pub struct SoundEngine {
    apu: Apu,
    slots: SlotManager,
    shared: Arc<Shared>,
    sample_rate: u32,
    /// Samples per game frame
    samples_per_frame: u32,
    /// Samples produced since the last game frame
    sample_counter: u32,
    /// Fractional CPU cycles carried between samples, in units of 1/sample_rate
    cycle_phase: u32,
}

impl SoundEngine {
    /// Create an engine and the controller that feeds it
    pub fn new(config: &SoundConfig) -> (Self, SoundController) {
        let sample_rate = config.sample_rate.clamp(GAME_FRAME_RATE, CPU_CLOCK_HZ);
        let shared = Arc::new(Shared::new(
            config.request_queue_capacity,
            config.master_volume,
        ));

        info!(
            "Sound engine: {} Hz, {} samples per game frame",
            sample_rate,
            sample_rate / GAME_FRAME_RATE
        );

        let engine = Self {
            apu: Apu::new(),
            slots: SlotManager::new(),
            shared: Arc::clone(&shared),
            sample_rate,
            samples_per_frame: sample_rate / GAME_FRAME_RATE,
            sample_counter: 0,
            cycle_phase: 0,
        };
        (engine, SoundController::new(shared))
    }

    /// Fill `out` with mono samples
    ///
    /// Runs in time proportional to `out.len()`; never blocks or allocates.
    pub fn fill_buffer(&mut self, out: &mut [i16]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Fill an interleaved float buffer with `channels` copies of each sample
    pub fn fill_buffer_f32(&mut self, out: &mut [f32], channels: usize) {
        for frame in out.chunks_mut(channels.max(1)) {
            let value = f32::from(self.next_sample()) / 32768.0;
            frame.fill(value);
        }
    }

    /// Apply queued requests and run one game frame
    ///
    /// `fill_buffer` calls this every `sample_rate / 60` samples.
    pub fn advance_game_frame(&mut self) {
        let mut applied = 0;
        for _ in 0..self.shared.queue_capacity() {
            let Some(request) = self.shared.pop_request() else {
                break;
            };
            self.slots.apply(request, &mut self.apu);
            applied += 1;
        }
        self.slots.advance_one_game_frame(&mut self.apu);
        self.shared.publish(self.slots.playing_ids());
        self.shared.mark_applied(applied);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples_per_frame(&self) -> u32 {
        self.samples_per_frame
    }

    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    pub fn slots(&self) -> &SlotManager {
        &self.slots
    }

    /// Whether any slot is occupied
    pub fn is_idle(&self) -> bool {
        self.slots.playing_ids().iter().all(Option::is_none)
    }

    fn next_sample(&mut self) -> i16 {
        let raw = self.next_raw_sample();
        let volume = i32::from(self.shared.master_volume());
        let scaled = raw * OUTPUT_GAIN * volume / MAX_MASTER_VOLUME;

        self.sample_counter += 1;
        if self.sample_counter >= self.samples_per_frame {
            self.sample_counter = 0;
            self.advance_game_frame();
        }

        scaled.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
    }

    /// Average APU output over the CPU cycles covering one sample
    fn next_raw_sample(&mut self) -> i32 {
        self.cycle_phase += CPU_CLOCK_HZ;
        let cycles = self.cycle_phase / self.sample_rate;
        self.cycle_phase %= self.sample_rate;

        let mut sum = 0i32;
        for _ in 0..cycles {
            sum += i32::from(self.apu.produce_next_sample());
        }
        sum / cycles.max(1) as i32
    }
}
