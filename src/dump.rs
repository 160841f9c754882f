//! Video Dump Loader
//!
//! Loads a raw snapshot of video memory so a scene can be rendered without
//! a CPU driving the PPU.
//!
//! File layout:
//! - 0x0000-0x1FFF: VRAM (8KB)
//! - 0x2000-0x209F: OAM (160 bytes)
//! - 0x20A0-0x20AB: optional, registers 0xFF40-0xFF4B in address order

use std::fs;

use crate::common::{Byte, Word};
use crate::lcd::{LCDC_ADDR, WX_ADDR};
use crate::ppu::vram::{OAM_SIZE, VRAM_SIZE};
use crate::ppu::Ppu;

/// Number of register bytes in a dump
pub const REGISTER_COUNT: usize = (WX_ADDR - LCDC_ADDR + 1) as usize;

/// Dump size without registers
pub const MEMORY_DUMP_SIZE: usize = VRAM_SIZE + OAM_SIZE;

/// Dump size with registers
pub const FULL_DUMP_SIZE: usize = MEMORY_DUMP_SIZE + REGISTER_COUNT;

/// LY and DMA are not restored from a dump
const SKIPPED_REGISTERS: [Word; 2] = [0xFF44, 0xFF46];

/// A decoded video memory snapshot
#[derive(Debug, Clone)]
pub struct VideoDump {
    pub vram: Box<[Byte; VRAM_SIZE]>,
    pub oam: [Byte; OAM_SIZE],
    /// 0xFF40-0xFF4B, if the dump carries them
    pub registers: Option<[Byte; REGISTER_COUNT]>,
}

impl VideoDump {
    /// Read and decode a dump file
    pub fn load(path: &str) -> Result<Self, String> {
        let data = fs::read(path).map_err(|e| format!("Failed to read dump {}: {}", path, e))?;
        Self::from_bytes(&data)
    }

    /// Decode a dump from raw bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, String> {
        if data.len() != MEMORY_DUMP_SIZE && data.len() != FULL_DUMP_SIZE {
            return Err(format!(
                "Invalid dump size: {} bytes (expected {} or {})",
                data.len(),
                MEMORY_DUMP_SIZE,
                FULL_DUMP_SIZE
            ));
        }

        let mut vram = Box::new([0; VRAM_SIZE]);
        vram.copy_from_slice(&data[..VRAM_SIZE]);

        let mut oam = [0; OAM_SIZE];
        oam.copy_from_slice(&data[VRAM_SIZE..MEMORY_DUMP_SIZE]);

        let registers = if data.len() == FULL_DUMP_SIZE {
            let mut registers = [0; REGISTER_COUNT];
            registers.copy_from_slice(&data[MEMORY_DUMP_SIZE..]);
            Some(registers)
        } else {
            None
        };

        Ok(Self { vram, oam, registers })
    }

    /// Copy the snapshot into the PPU
    ///
    /// Memory is stored directly, bypassing mode gating. Registers go
    /// through the normal write path with LCDC last, so a dump taken with
    /// the display off also leaves it off.
    pub fn apply(&self, ppu: &mut Ppu) {
        ppu.vram.load_vram(&self.vram);
        ppu.vram.load_oam(&self.oam);

        let Some(registers) = self.registers else {
            return;
        };

        for (address, &value) in (LCDC_ADDR..=WX_ADDR).zip(registers.iter()).skip(1) {
            if !SKIPPED_REGISTERS.contains(&address) {
                ppu.write_register(address, value);
            }
        }
        ppu.write_register(LCDC_ADDR, registers[0]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump_bytes(with_registers: bool) -> Vec<u8> {
        let mut data = vec![0; MEMORY_DUMP_SIZE];
        data[0] = 0x3C;
        data[VRAM_SIZE - 1] = 0x7E;
        data[VRAM_SIZE] = 16;
        data[MEMORY_DUMP_SIZE - 1] = 0x80;
        if with_registers {
            // LCDC STAT SCY SCX LY LYC DMA BGP OBP0 OBP1 WY WX
            data.extend_from_slice(&[0x93, 0x48, 3, 5, 77, 9, 0xC0, 0xE4, 0xD2, 0x1B, 40, 87]);
        }
        data
    }

    #[test]
    fn test_memory_only_dump() {
        let dump = VideoDump::from_bytes(&dump_bytes(false)).unwrap();
        assert!(dump.registers.is_none());

        let mut ppu = Ppu::new();
        dump.apply(&mut ppu);
        assert_eq!(ppu.vram.vram_byte(0x0000), 0x3C);
        assert_eq!(ppu.vram.vram_byte(0x1FFF), 0x7E);
        assert_eq!(ppu.vram.oam()[0], 16);
        assert_eq!(ppu.vram.oam()[OAM_SIZE - 1], 0x80);
        // Registers untouched
        assert_eq!(ppu.lcd.lcdc, 0x91);
    }

    #[test]
    fn test_dump_with_registers() {
        let dump = VideoDump::from_bytes(&dump_bytes(true)).unwrap();
        let mut ppu = Ppu::new();
        dump.apply(&mut ppu);

        assert_eq!(ppu.lcd.lcdc, 0x93);
        assert_eq!(ppu.lcd.stat & 0x78, 0x48);
        assert_eq!(ppu.lcd.scy, 3);
        assert_eq!(ppu.lcd.scx, 5);
        assert_eq!(ppu.lcd.ly, 0);
        assert_eq!(ppu.lcd.lyc, 9);
        assert_eq!(ppu.lcd.bgp, 0xE4);
        assert_eq!(ppu.lcd.obp0, 0xD2);
        assert_eq!(ppu.lcd.obp1, 0x1B);
        assert_eq!(ppu.lcd.wy, 40);
        assert_eq!(ppu.lcd.wx, 87);
    }

    #[test]
    fn test_display_off_dump() {
        let mut data = dump_bytes(true);
        data[MEMORY_DUMP_SIZE] = 0x11;
        let dump = VideoDump::from_bytes(&data).unwrap();
        let mut ppu = Ppu::new();
        dump.apply(&mut ppu);
        assert!(!ppu.lcd.lcd_enabled());
    }

    #[test]
    fn test_bad_size_rejected() {
        assert!(VideoDump::from_bytes(&[0; 100]).is_err());
        assert!(VideoDump::from_bytes(&vec![0; FULL_DUMP_SIZE + 1]).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = VideoDump::load("/nonexistent/path/scene.bin").unwrap_err();
        assert!(err.contains("Failed to read dump"));
    }
}
