use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for nes-sound")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build with and without audio, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the library and demo player
    Build {
        #[arg(long)]
        release: bool,
        /// Leave out the cpal output backend
        #[arg(long)]
        no_audio: bool,
    },
    /// Run tests
    Test {
        #[arg(long)]
        doc: bool,
        /// Restrict unit tests to one or more modules
        #[arg(long, value_enum)]
        module: Vec<Module>,
    },
    /// Run benchmarks
    Bench {
        /// Run a single benchmark (apu_bench, engine_bench)
        #[arg(long)]
        name: Option<String>,
    },
    /// Play a byte-code file through the demo player
    Play {
        /// Path to the byte-code file
        sound_path: String,
        /// Configuration file (defaults to nes_sound.toml)
        #[arg(short, long)]
        config: Option<String>,
        /// Render offline instead of opening an audio device
        #[arg(long)]
        offline: bool,
        #[arg(long)]
        release: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Module {
    Apu,
    Driver,
    Audio,
    Config,
}

impl Module {
    fn filter(self) -> &'static str {
        match self {
            Module::Apu => "apu::",
            Module::Driver => "driver::",
            Module::Audio => "audio::",
            Module::Config => "config::",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_ci(verbose),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release, no_audio } => run_build(release, no_audio),
        Commands::Test { doc, module } => run_test(doc, &module),
        Commands::Bench { name } => run_bench(name.as_deref()),
        Commands::Play {
            sound_path,
            config,
            offline,
            release,
        } => run_play(&sound_path, config.as_deref(), offline, release),
    }
}

fn run_ci(verbose: bool) -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;
    run_task("Build (no audio)", || run_build(false, true), verbose)?;
    if !headless() {
        run_task("Build", || run_build(false, false), verbose)?;
    }
    run_task("Test", || run_test(false, &[]), verbose)?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

/// CI runners have no ALSA headers, so cpal is left out there
fn headless() -> bool {
    std::env::var("CI").is_ok()
}

/// `cargo <subcommand>` with the feature set for this machine
fn cargo(subcommand: &str) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg(subcommand);
    if headless() {
        cmd.arg("--no-default-features");
    } else {
        cmd.arg("--all-features");
    }
    cmd
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("fmt").arg("--all");

    if check {
        cmd.arg("--").arg("--check");
    }

    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = cargo("clippy");
    cmd.arg("--all-targets");

    if fix {
        cmd.arg("--fix");
    } else {
        cmd.arg("--").arg("-D").arg("warnings");
    }

    execute_command(&mut cmd)
}

fn run_build(release: bool, no_audio: bool) -> Result<()> {
    let mut cmd = if no_audio {
        let mut cmd = Command::new("cargo");
        cmd.arg("build").arg("--no-default-features");
        cmd
    } else {
        cargo("build")
    };

    if release {
        cmd.arg("--release");
    }

    execute_command(&mut cmd)
}

fn run_test(doc: bool, modules: &[Module]) -> Result<()> {
    if doc {
        let mut cmd = cargo("test");
        cmd.arg("--doc");
        return execute_command(&mut cmd);
    }

    if modules.is_empty() {
        return execute_command(&mut cargo("test"));
    }

    let mut failed = Vec::new();
    for module in modules {
        let filter = module.filter();
        println!("{} Running {} tests...", "→".blue(), filter.bold());

        let mut cmd = cargo("test");
        cmd.arg("--lib").arg(filter);

        match execute_command(&mut cmd) {
            Ok(_) => println!("{} {} tests passed\n", "✓".green(), filter),
            Err(_) => {
                println!("{} {} tests failed\n", "✗".red(), filter);
                failed.push(filter);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Module tests failed: {}", failed.join(", "))
    }
}

fn run_bench(name: Option<&str>) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("bench");

    if let Some(name) = name {
        cmd.arg("--bench").arg(name);
    }

    execute_command(&mut cmd)
}

fn run_play(sound_path: &str, config: Option<&str>, offline: bool, release: bool) -> Result<()> {
    println!("{}", "=== Play ===".bold().blue());

    if !Path::new(sound_path).exists() {
        println!(
            "{} Byte-code file not found: {}",
            "✗".red().bold(),
            sound_path.yellow()
        );
        anyhow::bail!("Byte-code file not found");
    }

    let size = std::fs::metadata(sound_path)?.len();
    println!("{} Sound: {} ({} bytes)", "✓".green(), sound_path.cyan(), size);
    if size < 2 {
        println!(
            "{} File is shorter than the 2-byte header, the engine will reject it",
            "⚠".yellow().bold()
        );
    }
    println!(
        "{} Output: {}",
        "→".blue(),
        if offline {
            "offline render".yellow().bold()
        } else {
            "audio device".green().bold()
        }
    );
    println!();

    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.arg("run");
    if release {
        cmd.arg("--release");
    }
    if offline {
        cmd.arg("--no-default-features");
    }
    cmd.arg("--").arg(sound_path);
    if let Some(config) = config {
        cmd.arg(config);
    }

    execute_command(&mut cmd)?;

    println!(
        "\n{} Playback completed in {}",
        "✓".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );

    Ok(())
}

fn run_task<F>(name: &str, task: F, verbose: bool) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();

    match task() {
        Ok(_) => {
            let elapsed = start.elapsed();
            println!(
                "{} {}",
                "✓".green().bold(),
                if verbose {
                    format!("({:.2}s)", elapsed.as_secs_f64())
                } else {
                    String::new()
                }
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}
