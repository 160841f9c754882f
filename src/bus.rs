//! Memory Bus
//!
//! This module routes CPU-side memory accesses to the PPU's address
//! ranges. Anything the PPU does not own reads as an open bus (0xFF).

use crate::common::{Byte, Word};
use crate::lcd::{LCDC_ADDR, WX_ADDR};
use crate::ppu::Ppu;

/// Memory bus trait for reading and writing memory
pub trait MemoryBus {
    /// Read a byte from the given address
    fn read(&self, address: Word) -> Byte;

    /// Write a byte to the given address
    fn write(&mut self, address: Word, value: Byte);

    /// Read a 16-bit word from the given address (little-endian)
    fn read16(&self, address: Word) -> Word {
        let lo = self.read(address) as Word;
        let hi = self.read(address.wrapping_add(1)) as Word;
        lo | (hi << 8)
    }

    /// Write a 16-bit word to the given address (little-endian)
    fn write16(&mut self, address: Word, value: Word) {
        self.write(address, (value & 0xFF) as Byte);
        self.write(address.wrapping_add(1), ((value >> 8) & 0xFF) as Byte);
    }
}

/// PPU address map
///
/// - 0x8000-0x9FFF: VRAM (blocked during pixel transfer)
/// - 0xFE00-0xFE9F: OAM (blocked during OAM search and pixel transfer)
/// - 0xFF40-0xFF4B: LCD registers
impl MemoryBus for Ppu {
    fn read(&self, address: Word) -> Byte {
        match address {
            0x8000..=0x9FFF => self.vram_read(address),
            0xFE00..=0xFE9F => self.oam_read(address),
            LCDC_ADDR..=WX_ADDR => self.read_register(address),
            _ => 0xFF,
        }
    }

    fn write(&mut self, address: Word, value: Byte) {
        match address {
            0x8000..=0x9FFF => self.vram_write(address, value),
            0xFE00..=0xFE9F => self.oam_write(address, value),
            LCDC_ADDR..=WX_ADDR => self.write_register(address, value),
            _ => {}
        }
    }
}
