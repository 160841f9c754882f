//! DMG PPU Library
//!
//! A dot-accurate implementation of the Game Boy (DMG) picture processing
//! unit: the LCD register file, video memory with CPU access gating, the
//! OAM scan, the background/window and sprite fetchers, the pixel mixer and
//! the mode sequencer that drives them one dot at a time.

pub mod bus;
pub mod common;
pub mod dump;
pub mod emu;
pub mod interrupts;
pub mod lcd;
pub mod ppu;
#[cfg(feature = "sdl")]
pub mod ui;
