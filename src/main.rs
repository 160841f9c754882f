//! DMG PPU - Entry Point
//!
//! Loads a video memory dump and renders it with the PPU, either headless
//! or in an SDL2 window when built with the `sdl` feature.

use dmgppu::emu::Emulator;
use dmgppu::ppu::frame::LatestFrame;
use log::{debug, info, LevelFilter, Log, Metadata, Record};
use std::env;
use std::process;

/// Frames rendered when `--frames` is not given
const DEFAULT_FRAMES: u32 = 60;

/// Minimal logger that writes records to stderr
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Command line options
#[derive(Debug, Clone, PartialEq, Eq)]
struct Config {
    /// Video dump to load; power-on VRAM if absent
    dump_path: Option<String>,
    /// Frames to render before exiting
    frames: u32,
    /// Run without a window
    headless: bool,
    /// Window scale factor
    scale: u32,
    /// Log verbosity (number of -v flags)
    verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dump_path: None,
            frames: DEFAULT_FRAMES,
            headless: !cfg!(feature = "sdl"),
            scale: 4,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Parse arguments (without the program name)
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut config = Config::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--frames" => config.frames = parse_number(iter.next(), "--frames")?,
                "--scale" => config.scale = parse_number(iter.next(), "--scale")?.max(1),
                "--headless" => config.headless = true,
                "-v" => config.verbosity += 1,
                "-vv" => config.verbosity += 2,
                other if other.starts_with('-') => {
                    return Err(format!("Unknown option: {}", other));
                }
                path => {
                    if config.dump_path.is_some() {
                        return Err(format!("Unexpected argument: {}", path));
                    }
                    config.dump_path = Some(path.to_string());
                }
            }
        }

        Ok(config)
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn parse_number(value: Option<&String>, option: &str) -> Result<u32, String> {
    let value = value.ok_or_else(|| format!("{} needs a value", option))?;
    value
        .parse()
        .map_err(|e| format!("Invalid value for {}: {} ({})", option, value, e))
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} [dump_file] [--frames N] [--headless] [--scale N] [-v|-vv]",
        program
    )
}

fn run(config: &Config) -> Result<(), String> {
    let mut emulator = match &config.dump_path {
        Some(path) => Emulator::from_dump(path)?,
        None => Emulator::new(),
    };

    if config.headless {
        let mut sink = LatestFrame::default();
        emulator.run(config.frames, &mut sink)?;
        info!("Presented {} frame(s)", sink.presented);
        return Ok(());
    }

    run_windowed(&mut emulator, config)
}

#[cfg(feature = "sdl")]
fn run_windowed(emulator: &mut Emulator, config: &Config) -> Result<(), String> {
    let mut ui = dmgppu::ui::Ui::new(config.scale)?;
    ui.run(emulator, Some(config.frames).filter(|&n| n > 0))
}

#[cfg(not(feature = "sdl"))]
fn run_windowed(_emulator: &mut Emulator, _config: &Config) -> Result<(), String> {
    Err("Built without the `sdl` feature; use --headless".to_string())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("dmg-ppu");

    let config = match Config::parse(args.get(1..).unwrap_or_default()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", usage(program));
            process::exit(1);
        }
    };

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(config.log_level());
    }
    debug!("{:?}", config);

    if let Err(e) = run(&config) {
        eprintln!("Emulator error: {}", e);
        process::exit(1);
    }
}
