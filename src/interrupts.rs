//! Interrupts
//!
//! The interrupt-flag side of the interrupt system.
//!
//! The PPU only ever *requests* interrupts. Enable masking (IE at 0xFFFF),
//! the master enable and vector dispatch belong to the CPU. This module
//! provides the `InterruptSink` seam the PPU raises through, and
//! `InterruptFlags`, a plain IF register (0xFF0F) implementing it.

use crate::common::Byte;

/// IF bits that are not wired and always read as 1
const IF_UNUSED_BITS: Byte = 0xE0;

/// Interrupt sources, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptType {
    /// VBlank interrupt (highest priority)
    VBlank,
    /// LCD STAT interrupt
    LcdStat,
    /// Timer interrupt
    Timer,
    /// Serial interrupt
    Serial,
    /// Joypad interrupt (lowest priority)
    Joypad,
}

impl InterruptType {
    /// Get the bit for this interrupt in the IE/IF registers
    pub fn bit(&self) -> Byte {
        match self {
            InterruptType::VBlank => 0x01,
            InterruptType::LcdStat => 0x02,
            InterruptType::Timer => 0x04,
            InterruptType::Serial => 0x08,
            InterruptType::Joypad => 0x10,
        }
    }
}

/// Anything that can latch an interrupt request
pub trait InterruptSink {
    /// Set the flag bit for `interrupt`
    fn request(&mut self, interrupt: InterruptType);
}

/// Interrupt Flags register (0xFF0F)
///
/// Bits are level-set by peripherals and stay set until cleared by the CPU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterruptFlags {
    flags: Byte,
}

impl InterruptFlags {
    /// Create an empty flag register
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `interrupt` is currently flagged
    pub fn is_set(&self, interrupt: InterruptType) -> bool {
        self.flags & interrupt.bit() != 0
    }

    /// Clear an interrupt flag (CPU acknowledge)
    pub fn clear(&mut self, interrupt: InterruptType) {
        self.flags &= !interrupt.bit();
    }

    /// Read IF as the bus sees it
    pub fn read(&self) -> Byte {
        self.flags | IF_UNUSED_BITS
    }

    /// Write IF from the bus
    pub fn write(&mut self, value: Byte) {
        self.flags = value & !IF_UNUSED_BITS;
    }
}

impl InterruptSink for InterruptFlags {
    fn request(&mut self, interrupt: InterruptType) {
        self.flags |= interrupt.bit();
    }
}
