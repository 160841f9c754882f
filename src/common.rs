//! Common types and utilities for the PPU
//!
//! This module defines type aliases matching the hardware's bus widths
//! and provides the bit manipulation helpers used by the packed registers.

/// 8-bit unsigned integer (register / memory byte)
pub type Byte = u8;

/// 16-bit unsigned integer (bus address)
pub type Word = u16;

/// Check if a specific bit is set in a byte value
///
/// # Arguments
/// * `value` - The byte value to check
/// * `n` - The bit position (0-7)
///
/// # Returns
/// `true` if the bit at position `n` is set, `false` otherwise
#[inline]
pub fn bit(value: Byte, n: u8) -> bool {
    (value & (1 << n)) != 0
}

/// Set or clear a specific bit in a byte value
///
/// # Arguments
/// * `value` - Mutable reference to the byte value
/// * `n` - The bit position (0-7)
/// * `on` - `true` to set the bit, `false` to clear it
#[inline]
pub fn bit_set(value: &mut Byte, n: u8, on: bool) {
    if on {
        *value |= 1 << n;
    } else {
        *value &= !(1 << n);
    }
}

/// Combine one column of a tile row into a 2-bit color index
///
/// `low` and `high` are the two bit-planes of a tile row; `n` is the bit
/// position (7 = leftmost pixel).
#[inline]
pub fn color_index(low: Byte, high: Byte, n: u8) -> u8 {
    ((high >> n) & 1) << 1 | ((low >> n) & 1)
}

/// Look up a 2-bit color index in a packed palette register
///
/// Palette registers hold four 2-bit shades, index 0 in bits 0-1.
#[inline]
pub fn palette_shade(palette: Byte, index: u8) -> u8 {
    (palette >> ((index & 0x03) * 2)) & 0x03
}
