//! Emulator Core
//!
//! This module contains the driver that owns the PPU together with the IF
//! register it raises interrupts into, and clocks it dot by dot.

use log::info;

use crate::bus::MemoryBus;
use crate::common::{Byte, Word};
use crate::dump::VideoDump;
use crate::interrupts::InterruptFlags;
use crate::ppu::frame::FrameSink;
use crate::ppu::modes::DOTS_PER_FRAME;
use crate::ppu::Ppu;

/// Address of the IF register
const IF_ADDR: Word = 0xFF0F;

/// Emulator context state
#[derive(Debug, Clone)]
pub struct EmulatorContext {
    /// Emulator is paused
    pub paused: bool,
    /// Emulator is running
    pub running: bool,
    /// Request to terminate
    pub die: bool,
    /// Total dots executed
    pub ticks: u64,
}

impl Default for EmulatorContext {
    fn default() -> Self {
        Self {
            paused: false,
            running: true,
            die: false,
            ticks: 0,
        }
    }
}

/// Main Emulator structure
#[derive(Debug, Default)]
pub struct Emulator {
    /// Emulator context/state
    pub ctx: EmulatorContext,
    /// PPU
    pub ppu: Ppu,
    /// Interrupt flags register (0xFF0F)
    pub int_flags: InterruptFlags,
}

impl Emulator {
    /// Create an emulator with a PPU in its power-on state
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an emulator whose video memory comes from a dump file
    pub fn from_dump(path: &str) -> Result<Self, String> {
        let dump = VideoDump::load(path)?;
        info!(
            "Loaded video dump: {} (registers: {})",
            path,
            if dump.registers.is_some() { "yes" } else { "no" }
        );

        let mut emu = Self::new();
        dump.apply(&mut emu.ppu);
        Ok(emu)
    }

    /// Advance by one dot
    ///
    /// Returns false once the emulator has been stopped.
    pub fn step(&mut self, display: &mut impl FrameSink) -> bool {
        if self.ctx.paused || !self.ctx.running {
            return !self.ctx.die;
        }

        self.ppu.step(&mut self.int_flags, display);
        self.ctx.ticks += 1;

        !self.ctx.die
    }

    /// Run until the PPU completes a frame
    ///
    /// With the LCD off no frame is ever completed, so this gives up after
    /// one frame's worth of dots.
    pub fn run_frame(&mut self, display: &mut impl FrameSink) {
        let start_frame = self.ppu.current_frame;
        let start_ticks = self.ctx.ticks;

        while self.ppu.current_frame == start_frame && !self.ctx.die && !self.ctx.paused {
            self.step(display);
            if self.ctx.ticks - start_ticks >= DOTS_PER_FRAME as u64 {
                break;
            }
        }
    }

    /// Run a fixed number of frames without a UI
    pub fn run(&mut self, frames: u32, display: &mut impl FrameSink) -> Result<(), String> {
        info!("Starting emulation for {} frame(s)", frames);

        let start_frame = self.current_frame();
        while self.is_running() && self.current_frame() - start_frame < frames {
            if self.ctx.paused {
                return Err("Emulator is paused".to_string());
            }
            let before = self.current_frame();
            self.run_frame(display);
            if self.current_frame() == before && self.is_running() {
                return Err("No frame completed: the LCD is off".to_string());
            }
        }

        info!("Emulation completed. Frames: {}", self.current_frame());
        Ok(())
    }

    /// Pause the emulator
    pub fn pause(&mut self) {
        self.ctx.paused = true;
    }

    /// Resume the emulator
    pub fn resume(&mut self) {
        self.ctx.paused = false;
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.ctx.paused = !self.ctx.paused;
    }

    /// Stop the emulator
    pub fn stop(&mut self) {
        self.ctx.die = true;
        self.ctx.running = false;
    }

    /// Check if emulator is running
    pub fn is_running(&self) -> bool {
        self.ctx.running && !self.ctx.die
    }

    /// Check if emulator is paused
    pub fn is_paused(&self) -> bool {
        self.ctx.paused
    }

    /// Get current frame number
    pub fn current_frame(&self) -> u32 {
        self.ppu.current_frame
    }
}

/// The PPU map plus IF at 0xFF0F
impl MemoryBus for Emulator {
    fn read(&self, address: Word) -> Byte {
        match address {
            IF_ADDR => self.int_flags.read(),
            _ => self.ppu.read(address),
        }
    }

    fn write(&mut self, address: Word, value: Byte) {
        match address {
            IF_ADDR => self.int_flags.write(value),
            _ => self.ppu.write(address, value),
        }
    }
}
