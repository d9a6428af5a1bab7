// Audio output - Streams a SoundEngine to the default cpal device
//
// The engine moves into the device callback and renders straight into the
// device buffer, so game frames advance on the audio thread.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, Stream, StreamConfig};
use log::{error, info, warn};

use super::SoundEngine;
use crate::config::SoundConfig;

/// Device parameters derived from a [`SoundConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConfig {
    /// Sample rate in Hz, shared with the engine
    pub sample_rate: u32,
    /// Interleaved output channels, at least 1
    pub channels: u16,
    /// Requested device buffer length
    pub buffer_duration_ms: u32,
}

impl AudioConfig {
    /// Device buffer length in frames
    pub fn buffer_frames(&self) -> u32 {
        (u64::from(self.sample_rate) * u64::from(self.buffer_duration_ms) / 1000) as u32
    }

    /// Use the rate the engine actually runs at
    ///
    /// `SoundEngine::new` clamps the configured rate, so the device must
    /// follow the engine rather than the raw configuration.
    pub fn for_engine(self, engine: &SoundEngine) -> Self {
        if self.sample_rate != engine.sample_rate() {
            warn!(
                "Requested {} Hz, engine runs at {} Hz",
                self.sample_rate,
                engine.sample_rate()
            );
        }
        Self {
            sample_rate: engine.sample_rate(),
            ..self
        }
    }

    fn stream_config(&self, buffer_size: BufferSize) -> StreamConfig {
        StreamConfig {
            channels: self.channels,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self::from(&SoundConfig::default())
    }
}

impl From<&SoundConfig> for AudioConfig {
    fn from(config: &SoundConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            channels: config.output.channels.max(1),
            buffer_duration_ms: config.output.buffer_duration_ms,
        }
    }
}

/// Running output stream; playback stops when it is dropped
pub struct AudioOutput {
    config: AudioConfig,
    _device: Device,
    stream: Stream,
}

impl AudioOutput {
    /// Open the default output device and start rendering `engine`
    ///
    /// The device runs at the engine's sample rate, whatever
    /// `config.sample_rate` says.
    pub fn new(config: AudioConfig, mut engine: SoundEngine) -> Result<Self, String> {
        let config = config.for_engine(&engine);
        let device = cpal::default_host()
            .default_output_device()
            .ok_or("No output device available")?;

        info!("Audio device: {}", device.name().unwrap_or_default());

        let stream_config = Self::negotiate(&device, &config);
        let channels = usize::from(config.channels);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    engine.fill_buffer_f32(data, channels);
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| format!("Failed to build audio stream: {}", e))?;

        stream
            .play()
            .map_err(|e| format!("Failed to start audio stream: {}", e))?;

        info!(
            "Audio output started: {} Hz, {} channel(s), {} frame buffer",
            config.sample_rate,
            config.channels,
            config.buffer_frames()
        );

        Ok(Self {
            config,
            _device: device,
            stream,
        })
    }

    /// Use the requested buffer length when the device accepts it
    fn negotiate(device: &Device, config: &AudioConfig) -> StreamConfig {
        let fixed = config.stream_config(BufferSize::Fixed(config.buffer_frames()));
        let trial = device.build_output_stream(
            &fixed,
            |_: &mut [f32], _: &cpal::OutputCallbackInfo| {},
            |_| {},
            None,
        );
        match trial {
            Ok(_) => fixed,
            Err(e) => {
                warn!("Fixed buffer size rejected ({}), using device default", e);
                config.stream_config(BufferSize::Default)
            }
        }
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Pause audio playback
    pub fn pause(&self) -> Result<(), String> {
        self.stream
            .pause()
            .map_err(|e| format!("Failed to pause audio: {}", e))
    }

    /// Resume audio playback
    pub fn resume(&self) -> Result<(), String> {
        self.stream
            .play()
            .map_err(|e| format!("Failed to resume audio: {}", e))
    }
}
