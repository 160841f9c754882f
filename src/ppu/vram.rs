//! Video Memory
//!
//! Tile/map storage (VRAM, 0x8000-0x9FFF) and the object attribute table
//! (OAM, 0xFE00-0xFE9F).
//!
//! The CPU-facing `read`/`write` accessors are gated by the current PPU mode:
//! VRAM is unreachable during pixel transfer and OAM during both OAM search
//! and pixel transfer. Blocked reads return `0xFF`, blocked writes are
//! dropped. The PPU itself goes through the ungated `*_byte` accessors.

use crate::common::{Byte, Word};
use crate::ppu::modes::PpuMode;

/// VRAM size: 8KB
pub const VRAM_SIZE: usize = 0x2000;

/// OAM size: 40 sprites * 4 bytes
pub const OAM_SIZE: usize = 0xA0;

/// Absolute base address of VRAM on the bus
pub const VRAM_BASE: Word = 0x8000;

/// Absolute base address of OAM on the bus
pub const OAM_BASE: Word = 0xFE00;

/// Value returned by a blocked read (open bus)
const BLOCKED_READ: Byte = 0xFF;

/// Which 32x32 tile map a layer reads (LCDC bits 3 and 6)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileMapArea {
    /// 0x9800-0x9BFF
    Low,
    /// 0x9C00-0x9FFF
    High,
}

impl TileMapArea {
    /// Start of the map, relative to VRAM
    pub fn base(self) -> Word {
        match self {
            TileMapArea::Low => 0x1800,
            TileMapArea::High => 0x1C00,
        }
    }

    /// VRAM-relative address of the map entry at tile coordinates (x, y)
    ///
    /// Both coordinates wrap at 32 tiles like the hardware's counters.
    pub fn entry_address(self, tile_x: u8, tile_y: u8) -> Word {
        self.base() + ((tile_y as Word & 0x1F) << 5) + (tile_x as Word & 0x1F)
    }
}

/// How background/window tile indices address tile data (LCDC bit 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileDataArea {
    /// "8000 mode": unsigned index from 0x8000
    Unsigned,
    /// "8800 mode": signed index around 0x9000
    Signed,
}

impl TileDataArea {
    /// VRAM-relative address of the first byte of tile `index`
    ///
    /// In signed mode indices 0-127 land in 0x9000-0x97FF and 128-255 in
    /// 0x8800-0x8FFF, so the second bank starts exactly at index 128.
    pub fn tile_address(self, index: Byte) -> Word {
        match self {
            TileDataArea::Unsigned => index as Word * 16,
            TileDataArea::Signed => {
                let offset = (index as i8 as i16) * 16;
                (0x1000i16 + offset) as Word
            }
        }
    }

    /// VRAM-relative address of the low bit-plane of row `row` (0-7)
    pub fn row_address(self, index: Byte, row: u8) -> Word {
        self.tile_address(index) + (row as Word & 0x07) * 2
    }
}

/// Tile/map storage plus the attribute table
#[derive(Debug, Clone)]
pub struct VideoMemory {
    /// Video RAM (8KB)
    vram: [Byte; VRAM_SIZE],
    /// Object Attribute Memory (40 sprites * 4 bytes)
    oam: [Byte; OAM_SIZE],
}

impl Default for VideoMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoMemory {
    /// Create zeroed video memory
    pub fn new() -> Self {
        Self {
            vram: [0; VRAM_SIZE],
            oam: [0; OAM_SIZE],
        }
    }

    /// CPU read from VRAM (absolute address)
    pub fn vram_read(&self, address: Word, mode: PpuMode) -> Byte {
        if mode.blocks_vram() {
            return BLOCKED_READ;
        }
        self.vram_byte(address.wrapping_sub(VRAM_BASE))
    }

    /// CPU write to VRAM (absolute address)
    pub fn vram_write(&mut self, address: Word, value: Byte, mode: PpuMode) {
        if mode.blocks_vram() {
            return;
        }
        self.set_vram_byte(address.wrapping_sub(VRAM_BASE), value);
    }

    /// CPU read from OAM (absolute address)
    pub fn oam_read(&self, address: Word, mode: PpuMode) -> Byte {
        if mode.blocks_oam() {
            return BLOCKED_READ;
        }
        let offset = address.wrapping_sub(OAM_BASE) as usize;
        self.oam.get(offset).copied().unwrap_or(BLOCKED_READ)
    }

    /// CPU write to OAM (absolute address)
    pub fn oam_write(&mut self, address: Word, value: Byte, mode: PpuMode) {
        if mode.blocks_oam() {
            return;
        }
        let offset = address.wrapping_sub(OAM_BASE) as usize;
        if let Some(slot) = self.oam.get_mut(offset) {
            *slot = value;
        }
    }

    /// PPU-side VRAM read; the offset wraps into the 8KB window
    #[inline]
    pub fn vram_byte(&self, offset: Word) -> Byte {
        self.vram[offset as usize & (VRAM_SIZE - 1)]
    }

    /// Ungated VRAM store, used by loaders and tests
    #[inline]
    pub fn set_vram_byte(&mut self, offset: Word, value: Byte) {
        self.vram[offset as usize & (VRAM_SIZE - 1)] = value;
    }

    /// The raw attribute table
    pub fn oam(&self) -> &[Byte; OAM_SIZE] {
        &self.oam
    }

    /// Ungated OAM store, used by loaders, DMA collaborators and tests
    pub fn set_oam_byte(&mut self, offset: usize, value: Byte) {
        self.oam[offset % OAM_SIZE] = value;
    }

    /// Replace all of VRAM at once
    pub fn load_vram(&mut self, data: &[Byte; VRAM_SIZE]) {
        self.vram.copy_from_slice(data);
    }

    /// Replace all of OAM at once
    pub fn load_oam(&mut self, data: &[Byte; OAM_SIZE]) {
        self.oam.copy_from_slice(data);
    }
}
