//! PPU Modes
//!
//! Mode numbering and line timing.
//!
//! - OAM Search (mode 2): 80 dots
//! - Pixel Transfer (mode 3): variable, ends on the 160th pixel
//! - HBlank (mode 0): until 456 dots per line
//! - VBlank (mode 1): scanlines 144-153

use std::fmt;

/// Dots per scanline
pub const DOTS_PER_LINE: u32 = 456;

/// Length of the OAM search phase
pub const OAM_SEARCH_DOTS: u32 = 80;

/// First scanline of vertical blank
pub const VBLANK_START_LINE: u8 = 144;

/// Scanlines per frame, including vertical blank
pub const LINES_PER_FRAME: u8 = 154;

/// Dots per full frame (70224)
pub const DOTS_PER_FRAME: u32 = DOTS_PER_LINE * LINES_PER_FRAME as u32;

/// PPU modes as reported in STAT bits 0-1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpuMode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Transfer = 3,
}

impl From<u8> for PpuMode {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => PpuMode::HBlank,
            1 => PpuMode::VBlank,
            2 => PpuMode::OamScan,
            _ => PpuMode::Transfer,
        }
    }
}

impl PpuMode {
    /// STAT bit enabling the interrupt raised on entry to this mode
    ///
    /// Pixel transfer has no interrupt source.
    pub fn stat_enable_bit(self) -> Option<u8> {
        match self {
            PpuMode::HBlank => Some(3),
            PpuMode::VBlank => Some(4),
            PpuMode::OamScan => Some(5),
            PpuMode::Transfer => None,
        }
    }

    /// Whether the CPU is locked out of VRAM in this mode
    pub fn blocks_vram(self) -> bool {
        self == PpuMode::Transfer
    }

    /// Whether the CPU is locked out of OAM in this mode
    pub fn blocks_oam(self) -> bool {
        matches!(self, PpuMode::OamScan | PpuMode::Transfer)
    }
}

impl fmt::Display for PpuMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PpuMode::HBlank => write!(f, "HBlank"),
            PpuMode::VBlank => write!(f, "VBlank"),
            PpuMode::OamScan => write!(f, "OAM Search"),
            PpuMode::Transfer => write!(f, "Pixel Transfer"),
        }
    }
}
