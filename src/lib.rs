// NES Sound Library
// NES APU emulation and the byte-code music/sound-effect driver that plays on it

// Public modules
pub mod apu;
pub mod audio;
pub mod config;
pub mod driver;

// Re-export main types for convenience
pub use apu::Apu;
#[cfg(feature = "audio")]
pub use audio::{AudioConfig, AudioOutput};
pub use audio::SoundEngine;
pub use config::{ConfigError, OutputConfig, SoundConfig};
pub use driver::{
    Request, SlotManager, SoundController, SoundData, SoundError, SoundId, SoundPort,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_components() {
        // Test that all components can be instantiated
        let _apu = Apu::new();
        let _slots = SlotManager::new();
        let (_engine, _controller) = SoundEngine::new(&SoundConfig::default());
    }

    #[test]
    fn test_engine_and_controller_cross_threads() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SoundEngine>();
        assert_send::<SoundController>();
        assert_sync::<SoundController>();
    }
}
