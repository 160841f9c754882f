//! Pixel Mixer
//!
//! Resolves one output shade from the background/window pixel and the
//! sprite slots covering the current column.

use crate::lcd::Lcd;
use crate::ppu::sprite_fetch::SpriteSlot;

/// Where a resolved pixel came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelSource {
    Background,
    Sprite { slot: usize },
}

/// Pick the source for the current column
///
/// Among active slots the first one in queue order with an opaque pixel is
/// the candidate. It loses to the background only when it asks to sit behind
/// the background and the background index is non-zero.
pub fn select(lcd: &Lcd, bg_index: u8, slots: &[SpriteSlot]) -> PixelSource {
    if !lcd.sprites_enabled() {
        return PixelSource::Background;
    }

    let candidate = slots
        .iter()
        .enumerate()
        .find(|(_, slot)| slot.is_active() && slot.pixels.peek() != 0);

    match candidate {
        Some((_, slot)) if slot.attrs.bg_priority() && bg_index != 0 => PixelSource::Background,
        Some((slot, _)) => PixelSource::Sprite { slot },
        None => PixelSource::Background,
    }
}

/// Resolve the shade for the current column
///
/// With LCDC bit 0 clear the background/window is blank: its index reads as
/// 0 for priority purposes and it shows shade 0.
pub fn resolve(lcd: &Lcd, bg_index: u8, slots: &[SpriteSlot]) -> u8 {
    let bg_index = if lcd.bg_window_enabled() { bg_index } else { 0 };

    match select(lcd, bg_index, slots) {
        PixelSource::Sprite { slot } => {
            let slot = &slots[slot];
            lcd.sprite_color(slot.attrs.palette_number(), slot.pixels.peek())
        }
        PixelSource::Background if lcd.bg_window_enabled() => lcd.bg_color(bg_index),
        PixelSource::Background => 0,
    }
}

/// Move every active sprite register on by one column
pub fn shift_sprites(slots: &mut [SpriteSlot]) {
    for slot in slots.iter_mut().filter(|slot| slot.is_active()) {
        slot.pixels.shift();
    }
}
