//! LCD Control
//!
//! This module implements the PPU's register file.
//!
//! LCD Registers:
//! - LCDC (0xFF40): LCD Control
//! - STAT (0xFF41): LCD Status
//! - SCY (0xFF42): Scroll Y
//! - SCX (0xFF43): Scroll X
//! - LY (0xFF44): Current scanline (read-only)
//! - LYC (0xFF45): LY Compare
//! - DMA (0xFF46): owned by the DMA controller, reads 0xFF here
//! - BGP (0xFF47): Background Palette
//! - OBP0 (0xFF48): Object Palette 0
//! - OBP1 (0xFF49): Object Palette 1
//! - WY (0xFF4A): Window Y Position
//! - WX (0xFF4B): Window X Position

use log::info;

use crate::common::{bit, bit_set, palette_shade, Byte, Word};
use crate::ppu::modes::PpuMode;
use crate::ppu::vram::{TileDataArea, TileMapArea};

/// First register address of the PPU block
pub const LCDC_ADDR: Word = 0xFF40;

/// Last register address of the PPU block
pub const WX_ADDR: Word = 0xFF4B;

/// STAT bits the CPU may write (interrupt source enables)
const STAT_WRITABLE: Byte = 0x78;

/// LCD Controller
#[derive(Debug, Clone)]
pub struct Lcd {
    /// LCDC - LCD Control (0xFF40)
    pub lcdc: Byte,
    /// STAT - LCD Status (0xFF41), bit 7 is not stored
    pub stat: Byte,
    /// SCY - Scroll Y (0xFF42)
    pub scy: Byte,
    /// SCX - Scroll X (0xFF43)
    pub scx: Byte,
    /// LY - Current scanline (0xFF44)
    pub ly: Byte,
    /// LYC - LY Compare (0xFF45)
    pub lyc: Byte,
    /// BGP - Background Palette (0xFF47)
    pub bgp: Byte,
    /// OBP0 - Object Palette 0 (0xFF48)
    pub obp0: Byte,
    /// OBP1 - Object Palette 1 (0xFF49)
    pub obp1: Byte,
    /// WY - Window Y Position (0xFF4A)
    pub wy: Byte,
    /// WX - Window X Position (0xFF4B)
    pub wx: Byte,
    /// STAT interrupt requested
    pub stat_interrupt: bool,
}

impl Default for Lcd {
    fn default() -> Self {
        Self::new()
    }
}

impl Lcd {
    /// Create the register file in its power-on state
    ///
    /// The display is on with the background enabled, LY is 0 and the mode
    /// bits report vertical blank.
    pub fn new() -> Self {
        let mut lcd = Self {
            lcdc: 0x91,
            stat: PpuMode::VBlank as Byte,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0xFC,
            obp0: 0xFF,
            obp1: 0xFF,
            wy: 0,
            wx: 0,
            stat_interrupt: false,
        };
        lcd.set_lyc_flag(lcd.ly == lcd.lyc);
        lcd
    }

    /// Reset to the power-on state
    pub fn init(&mut self) {
        *self = Self::new();
    }

    /// Read LCD register
    pub fn read(&self, address: Word) -> Byte {
        match address {
            0xFF40 => self.lcdc,
            0xFF41 => self.stat | 0x80, // Bit 7 always reads as 1
            0xFF42 => self.scy,
            0xFF43 => self.scx,
            0xFF44 => self.ly,
            0xFF45 => self.lyc,
            0xFF47 => self.bgp,
            0xFF48 => self.obp0,
            0xFF49 => self.obp1,
            0xFF4A => self.wy,
            0xFF4B => self.wx,
            _ => 0xFF,
        }
    }

    /// Write LCD register
    ///
    /// Switching the display off zeroes LY and the mode bits as part of the
    /// same write.
    pub fn write(&mut self, address: Word, value: Byte) {
        match address {
            0xFF40 => {
                let was_enabled = self.lcd_enabled();
                self.lcdc = value;
                match (was_enabled, self.lcd_enabled()) {
                    (true, false) => {
                        info!("LCD disabled at LY={}", self.ly);
                        self.stat &= !0x03;
                        self.set_ly(0);
                    }
                    (false, true) => info!("LCD enabled"),
                    _ => {}
                }
            }
            0xFF41 => {
                // Lower 3 bits are read-only (mode and LYC flag)
                self.stat = (self.stat & !STAT_WRITABLE) | (value & STAT_WRITABLE);
            }
            0xFF42 => self.scy = value,
            0xFF43 => self.scx = value,
            0xFF44 => {} // LY is read-only
            0xFF45 => {
                self.lyc = value;
                self.check_lyc();
            }
            0xFF47 => self.bgp = value,
            0xFF48 => self.obp0 = value,
            0xFF49 => self.obp1 = value,
            0xFF4A => self.wy = value,
            0xFF4B => self.wx = value,
            _ => {}
        }
    }

    // ========== LCDC Bit Accessors ==========

    /// LCD Display Enable (bit 7)
    pub fn lcd_enabled(&self) -> bool {
        bit(self.lcdc, 7)
    }

    /// Window Tile Map Select (bit 6)
    pub fn window_tile_map(&self) -> TileMapArea {
        if bit(self.lcdc, 6) { TileMapArea::High } else { TileMapArea::Low }
    }

    /// Window Enable (bit 5)
    pub fn window_enabled(&self) -> bool {
        bit(self.lcdc, 5)
    }

    /// BG & Window Tile Data Select (bit 4)
    pub fn bg_tile_data(&self) -> TileDataArea {
        if bit(self.lcdc, 4) { TileDataArea::Unsigned } else { TileDataArea::Signed }
    }

    /// BG Tile Map Select (bit 3)
    pub fn bg_tile_map(&self) -> TileMapArea {
        if bit(self.lcdc, 3) { TileMapArea::High } else { TileMapArea::Low }
    }

    /// Sprite Size (bit 2)
    /// false = 8x8, true = 8x16
    pub fn sprite_height(&self) -> u8 {
        if bit(self.lcdc, 2) { 16 } else { 8 }
    }

    /// Sprite Enable (bit 1)
    pub fn sprites_enabled(&self) -> bool {
        bit(self.lcdc, 1)
    }

    /// BG & Window Enable (bit 0)
    pub fn bg_window_enabled(&self) -> bool {
        bit(self.lcdc, 0)
    }

    // ========== STAT Bit Accessors ==========

    /// Get current PPU mode (bits 0-1)
    pub fn mode(&self) -> PpuMode {
        PpuMode::from(self.stat)
    }

    /// Set current PPU mode (bits 0-1) and raise its STAT source if enabled
    pub fn set_mode(&mut self, mode: PpuMode) {
        self.stat = (self.stat & 0xFC) | (mode as Byte);
        self.check_stat_interrupt();
    }

    /// LYC=LY Coincidence Flag (bit 2)
    pub fn lyc_flag(&self) -> bool {
        bit(self.stat, 2)
    }

    /// Set LYC=LY Coincidence Flag (bit 2)
    fn set_lyc_flag(&mut self, value: bool) {
        bit_set(&mut self.stat, 2, value);
    }

    /// Mode 0 HBlank Interrupt Enable (bit 3)
    pub fn hblank_int_enabled(&self) -> bool {
        bit(self.stat, 3)
    }

    /// Mode 1 VBlank Interrupt Enable (bit 4)
    pub fn vblank_int_enabled(&self) -> bool {
        bit(self.stat, 4)
    }

    /// Mode 2 OAM Interrupt Enable (bit 5)
    pub fn oam_int_enabled(&self) -> bool {
        bit(self.stat, 5)
    }

    /// LYC=LY Coincidence Interrupt Enable (bit 6)
    pub fn lyc_int_enabled(&self) -> bool {
        bit(self.stat, 6)
    }

    // ========== LY/LYC Handling ==========

    /// Set current scanline (LY)
    pub fn set_ly(&mut self, value: Byte) {
        self.ly = value;
        self.check_lyc();
    }

    /// Advance LY, wrapping after the last vertical blank line
    pub fn inc_ly(&mut self) {
        self.ly = self.ly.wrapping_add(1);
        if self.ly > 153 {
            self.ly = 0;
        }
        self.check_lyc();
    }

    /// Refresh the coincidence flag and raise the LYC source if enabled
    fn check_lyc(&mut self) {
        let coincidence = self.ly == self.lyc;
        self.set_lyc_flag(coincidence);

        if coincidence && self.lyc_int_enabled() && self.lcd_enabled() {
            self.stat_interrupt = true;
        }
    }

    /// Raise the STAT interrupt if the current mode's source is enabled
    fn check_stat_interrupt(&mut self) {
        let should_interrupt = self
            .mode()
            .stat_enable_bit()
            .is_some_and(|n| bit(self.stat, n));

        if should_interrupt && self.lcd_enabled() {
            self.stat_interrupt = true;
        }
    }

    /// Take and clear the pending STAT request
    pub fn take_stat_interrupt(&mut self) -> bool {
        std::mem::take(&mut self.stat_interrupt)
    }

    // ========== Palette Helpers ==========

    /// Get color from background palette
    pub fn bg_color(&self, color_id: u8) -> u8 {
        palette_shade(self.bgp, color_id)
    }

    /// Get color from sprite palette 0 or 1
    pub fn sprite_color(&self, palette_1: bool, color_id: u8) -> u8 {
        let palette = if palette_1 { self.obp1 } else { self.obp0 };
        palette_shade(palette, color_id)
    }
}
