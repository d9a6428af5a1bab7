// NES Sound - Demo player
//
// Plays one byte-code file through the sound engine:
//
//     nes-sound <bytecode-file> [config.toml]

use nes_sound::config::CONFIG_FILE;
use nes_sound::{SoundConfig, SoundController, SoundEngine, SoundId};

/// Id the demo assigns to the loaded sound
const DEMO_SOUND_ID: SoundId = 1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("NES Sound (nes-sound) v0.1.0");
    println!("============================");
    println!();

    let mut args = std::env::args().skip(1);
    let Some(sound_path) = args.next() else {
        eprintln!("Usage: nes-sound <bytecode-file> [config.toml]");
        std::process::exit(2);
    };
    let config_path = args.next().unwrap_or_else(|| CONFIG_FILE.to_string());

    let config = SoundConfig::load_or_default(&config_path);
    println!("Configuration loaded from '{}'", config_path);
    println!(
        "  {} Hz, master volume {}/255",
        config.sample_rate, config.master_volume
    );

    let data = std::fs::read(&sound_path)?;
    println!("Loaded '{}' ({} bytes)", sound_path, data.len());
    println!();

    let (engine, controller) = SoundEngine::new(&config);
    controller.start_sound(DEMO_SOUND_ID, data)?;

    play(engine, &controller, &config)
}

#[cfg(feature = "audio")]
fn play(
    engine: SoundEngine,
    controller: &SoundController,
    config: &SoundConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    use nes_sound::{AudioConfig, AudioOutput};
    use std::thread;
    use std::time::{Duration, Instant};

    /// Longest time the demo plays a sound
    const MAX_PLAY_TIME: Duration = Duration::from_secs(30);

    let output = AudioOutput::new(AudioConfig::from(config), engine)?;
    println!(
        "Playing on the default device ({} channel(s)), Ctrl+C to stop",
        output.config().channels
    );

    let started = Instant::now();
    while controller.is_sound_playing(DEMO_SOUND_ID) && started.elapsed() < MAX_PLAY_TIME {
        thread::sleep(Duration::from_millis(50));
    }
    controller.stop_all_sounds()?;

    println!(
        "Playback finished after {:.1} s",
        started.elapsed().as_secs_f32()
    );
    Ok(())
}

#[cfg(not(feature = "audio"))]
fn play(
    mut engine: SoundEngine,
    controller: &SoundController,
    _config: &SoundConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut samples = vec![0i16; engine.sample_rate() as usize];
    engine.fill_buffer(&mut samples);

    let peak = samples
        .iter()
        .map(|sample| i32::from(*sample).abs())
        .max()
        .unwrap_or(0);
    println!("Rendered one second offline, peak sample {}", peak);
    if controller.is_sound_playing(DEMO_SOUND_ID) {
        println!("Sound still playing after one second");
    }
    Ok(())
}
