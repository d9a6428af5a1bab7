// Configuration management
//
// Sound engine settings, persisted as TOML.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Default configuration file path
pub const CONFIG_FILE: &str = "nes_sound.toml";

/// Sound engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    /// Host sample rate in Hz, fixed for the lifetime of an engine
    pub sample_rate: u32,

    /// Master volume (0 = mute, 255 = full)
    pub master_volume: u8,

    /// Pending start/stop requests the control queue can hold
    pub request_queue_capacity: usize,

    /// Host output settings
    pub output: OutputConfig,
}

/// Host audio output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Device buffer length in milliseconds (affects latency)
    pub buffer_duration_ms: u32,

    /// Output channels; the mono signal is copied to each
    pub channels: u16,
}

impl Default for SoundConfig {
    fn default() -> Self {
        SoundConfig {
            sample_rate: 48000,
            master_volume: 192,
            request_queue_capacity: 32,
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            buffer_duration_ms: 50,
            channels: 1,
        }
    }
}

impl SoundConfig {
    /// Set the sample rate
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the master volume
    pub fn with_master_volume(mut self, volume: u8) -> Self {
        self.master_volume = volume;
        self
    }

    /// Set the request queue capacity
    pub fn with_request_queue_capacity(mut self, capacity: usize) -> Self {
        self.request_queue_capacity = capacity;
        self
    }

    /// Set the number of output channels
    pub fn with_channels(mut self, channels: u16) -> Self {
        self.output.channels = channels;
        self
    }

    /// Set the output buffer duration in milliseconds
    pub fn with_buffer_duration(mut self, duration_ms: u32) -> Self {
        self.output.buffer_duration_ms = duration_ms;
        self
    }

    /// Load configuration from `path`, falling back to the defaults
    ///
    /// A missing or malformed file yields the default configuration. A
    /// missing file is created with the defaults if possible; a malformed
    /// one is left untouched.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                let config = Self::default();
                if let Err(e) = config.save(&path) {
                    warn!("Could not write default config: {}", e);
                }
                config
            }
            Err(e) => {
                warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error
    Io(io::Error),

    /// TOML parse error
    Parse(toml::de::Error),

    /// TOML serialization error
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Serialize(e)
    }
}
