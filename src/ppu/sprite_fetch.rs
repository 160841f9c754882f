//! Sprite Fetcher
//!
//! Loads the row of a queued sprite into that sprite's own shift register
//! pair, pausing the background fetcher while it runs. Every fetch costs a
//! fixed number of dots during which no pixel is output.

use crate::common::{Byte, Word};
use crate::lcd::Lcd;
use crate::ppu::oam::{OamEntry, MAX_SPRITES_PER_LINE};
use crate::ppu::pipeline::{BackgroundFetcher, FetchPhase, ShiftRegister};
use crate::ppu::vram::{TileDataArea, VideoMemory};

/// Dots spent in each sprite fetch step
const DOTS_PER_STEP: u8 = 2;

/// Dots a single sprite fetch stalls the pipeline for
pub const SPRITE_FETCH_DOTS: u32 = 3 * DOTS_PER_STEP as u32;

/// A sprite's shift register pair plus the attributes it was fetched with
#[derive(Debug, Clone, Copy, Default)]
pub struct SpriteSlot {
    pub pixels: ShiftRegister,
    pub attrs: OamEntry,
}

impl SpriteSlot {
    /// Whether this sprite still covers upcoming columns
    pub fn is_active(&self) -> bool {
        !self.pixels.is_empty()
    }
}

/// Sprite fetch steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteFetchPhase {
    /// Latch tile number and attributes
    TileIndex,
    /// Read the low bit-plane
    LowPlane,
    /// Read the high bit-plane and load the slot
    HighPlane,
}

/// An in-progress sprite fetch
#[derive(Debug, Clone, Copy)]
struct SpriteFetch {
    /// Queue index of the sprite, also its slot number
    slot: usize,
    entry: OamEntry,
    phase: SpriteFetchPhase,
    dot_in_phase: u8,
    low: Byte,
    /// Background fetcher phase to restore afterwards
    resume: FetchPhase,
}

/// Sprite fetch state machine
#[derive(Debug, Clone, Default)]
pub struct SpriteFetcher {
    active: Option<SpriteFetch>,
    /// First queue entry not yet fetched on this line
    next: usize,
}

impl SpriteFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all progress for a new scanline
    pub fn reset_for_line(&mut self) {
        self.active = None;
        self.next = 0;
    }

    pub fn is_fetching(&self) -> bool {
        self.active.is_some()
    }

    /// Queue entries consumed so far on this line
    pub fn consumed(&self) -> usize {
        self.next
    }

    /// Start a fetch if the next queued sprite begins at or before `cursor`
    ///
    /// Saves the background fetcher's phase for the resume. Returns whether
    /// a fetch was started.
    pub fn try_start(&mut self, queue: &[OamEntry], cursor: u8, bg: &BackgroundFetcher) -> bool {
        if self.active.is_some() || self.next >= queue.len().min(MAX_SPRITES_PER_LINE) {
            return false;
        }

        let entry = queue[self.next];
        if entry.screen_x() > cursor as i16 {
            return false;
        }

        self.active = Some(SpriteFetch {
            slot: self.next,
            entry,
            phase: SpriteFetchPhase::TileIndex,
            dot_in_phase: 0,
            low: 0,
            resume: bg.phase(),
        });
        self.next += 1;
        true
    }

    /// Advance the in-progress fetch by one dot
    ///
    /// On the final dot the sprite row is stored in its slot, aligned so its
    /// next pixel lands on `cursor`, and the background fetcher resumes.
    pub fn step(
        &mut self,
        lcd: &Lcd,
        vram: &VideoMemory,
        cursor: u8,
        slots: &mut [SpriteSlot; MAX_SPRITES_PER_LINE],
        bg: &mut BackgroundFetcher,
    ) {
        let Some(fetch) = self.active.as_mut() else {
            return;
        };

        fetch.dot_in_phase += 1;
        if fetch.dot_in_phase < DOTS_PER_STEP {
            return;
        }
        fetch.dot_in_phase = 0;

        match fetch.phase {
            SpriteFetchPhase::TileIndex => fetch.phase = SpriteFetchPhase::LowPlane,
            SpriteFetchPhase::LowPlane => {
                fetch.low = vram.vram_byte(sprite_row_address(&fetch.entry, lcd));
                fetch.phase = SpriteFetchPhase::HighPlane;
            }
            SpriteFetchPhase::HighPlane => {
                let high = vram.vram_byte(sprite_row_address(&fetch.entry, lcd) + 1);
                let (low, high) = if fetch.entry.x_flip() {
                    (fetch.low.reverse_bits(), high.reverse_bits())
                } else {
                    (fetch.low, high)
                };

                let slot = &mut slots[fetch.slot];
                slot.attrs = fetch.entry;
                slot.pixels.load(low, high);
                // Columns already behind the cursor (left-edge clipping)
                let behind = (cursor as i16 - fetch.entry.screen_x()).clamp(0, 8) as u8;
                slot.pixels.skip(behind);

                bg.resume(fetch.resume);
                self.active = None;
            }
        }
    }
}

/// VRAM-relative address of the low plane of the sprite row on LY
///
/// Tall sprites span two consecutive tiles; bit 0 of the tile number is
/// ignored so the row index (0-15) runs straight into the second tile.
pub fn sprite_row_address(entry: &OamEntry, lcd: &Lcd) -> Word {
    let height = lcd.sprite_height();
    let mut row = (lcd.ly as i16 - entry.screen_y()) as u8 & (height - 1);
    if entry.y_flip() {
        row = height - 1 - row;
    }

    let tile = if height == 16 { entry.tile & 0xFE } else { entry.tile };
    TileDataArea::Unsigned.tile_address(tile) + row as Word * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(y: u8, x: u8, tile: u8, flags: u8) -> OamEntry {
        OamEntry { y, x, tile, flags }
    }

    fn run_fetch(
        fetcher: &mut SpriteFetcher,
        lcd: &Lcd,
        vram: &VideoMemory,
        cursor: u8,
        slots: &mut [SpriteSlot; MAX_SPRITES_PER_LINE],
        bg: &mut BackgroundFetcher,
    ) -> u32 {
        let mut dots = 0;
        while fetcher.is_fetching() {
            fetcher.step(lcd, vram, cursor, slots, bg);
            dots += 1;
        }
        dots
    }

    #[test]
    fn test_row_address_8x8() {
        let mut lcd = Lcd::new();
        lcd.ly = 5;
        let e = sprite(16, 8, 2, 0);
        assert_eq!(sprite_row_address(&e, &lcd), 0x0020 + 10);

        let flipped = sprite(16, 8, 2, 0x40);
        assert_eq!(sprite_row_address(&flipped, &lcd), 0x0020 + 4);
    }

    #[test]
    fn test_row_address_8x16_split() {
        let mut lcd = Lcd::new();
        lcd.lcdc |= 0x04; // 8x16
        let e = sprite(16, 8, 5, 0); // bit 0 ignored -> tiles 4 and 5

        lcd.ly = 3;
        assert_eq!(sprite_row_address(&e, &lcd), 0x0040 + 6);

        lcd.ly = 12;
        assert_eq!(sprite_row_address(&e, &lcd), 0x0050 + 8);

        // Flipped: line 0 reads the last row of the second tile
        let flipped = sprite(16, 8, 5, 0x40);
        lcd.ly = 0;
        assert_eq!(sprite_row_address(&flipped, &lcd), 0x0050 + 14);
    }

    #[test]
    fn test_trigger_waits_for_cursor() {
        let queue = [sprite(16, 20, 0, 0)];
        let bg = BackgroundFetcher::new();
        let mut fetcher = SpriteFetcher::new();

        assert!(!fetcher.try_start(&queue, 11, &bg));
        assert!(fetcher.try_start(&queue, 12, &bg));
        assert!(fetcher.is_fetching());
        // Already fetching
        assert!(!fetcher.try_start(&queue, 12, &bg));
    }

    #[test]
    fn test_fetch_costs_fixed_stall_and_restores_phase() {
        let lcd = Lcd::new();
        let mut vram = VideoMemory::new();
        vram.set_vram_byte(0x0010, 0xF0);
        vram.set_vram_byte(0x0011, 0x00);

        let queue = [sprite(16, 8, 1, 0)];
        let mut bg = BackgroundFetcher::new();
        bg.resume(FetchPhase::HighPlane);
        let mut slots = [SpriteSlot::default(); MAX_SPRITES_PER_LINE];
        let mut fetcher = SpriteFetcher::new();

        assert!(fetcher.try_start(&queue, 0, &bg));
        bg.resume(FetchPhase::TileIndex);
        let dots = run_fetch(&mut fetcher, &lcd, &vram, 0, &mut slots, &mut bg);

        assert_eq!(dots, SPRITE_FETCH_DOTS);
        assert_eq!(bg.phase(), FetchPhase::HighPlane);
        assert_eq!(slots[0].pixels.len(), 8);
        assert_eq!(slots[0].pixels.peek(), 1);
        assert_eq!(fetcher.consumed(), 1);
    }

    #[test]
    fn test_x_flip_reverses_row() {
        let lcd = Lcd::new();
        let mut vram = VideoMemory::new();
        vram.set_vram_byte(0x0000, 0x01);
        vram.set_vram_byte(0x0001, 0x01);

        let queue = [sprite(16, 8, 0, 0x20)];
        let mut bg = BackgroundFetcher::new();
        let mut slots = [SpriteSlot::default(); MAX_SPRITES_PER_LINE];
        let mut fetcher = SpriteFetcher::new();

        fetcher.try_start(&queue, 0, &bg);
        run_fetch(&mut fetcher, &lcd, &vram, 0, &mut slots, &mut bg);

        assert_eq!(slots[0].pixels.shift(), 3);
        assert_eq!(slots[0].pixels.shift(), 0);
    }

    #[test]
    fn test_left_edge_clipping() {
        let lcd = Lcd::new();
        let mut vram = VideoMemory::new();
        vram.set_vram_byte(0x0000, 0b0000_0111);

        // x = 3 -> only the rightmost 3 columns are on screen
        let queue = [sprite(16, 3, 0, 0)];
        let mut bg = BackgroundFetcher::new();
        let mut slots = [SpriteSlot::default(); MAX_SPRITES_PER_LINE];
        let mut fetcher = SpriteFetcher::new();

        assert!(fetcher.try_start(&queue, 0, &bg));
        run_fetch(&mut fetcher, &lcd, &vram, 0, &mut slots, &mut bg);

        assert_eq!(slots[0].pixels.len(), 3);
        assert_eq!(slots[0].pixels.peek(), 1);
    }

    #[test]
    fn test_same_column_sprites_fetch_in_queue_order() {
        let lcd = Lcd::new();
        let vram = VideoMemory::new();
        let queue = [sprite(16, 30, 7, 0), sprite(16, 30, 9, 0)];
        let mut bg = BackgroundFetcher::new();
        let mut slots = [SpriteSlot::default(); MAX_SPRITES_PER_LINE];
        let mut fetcher = SpriteFetcher::new();

        let mut total = 0;
        while fetcher.try_start(&queue, 22, &bg) {
            total += run_fetch(&mut fetcher, &lcd, &vram, 22, &mut slots, &mut bg);
        }

        assert_eq!(total, 2 * SPRITE_FETCH_DOTS);
        assert_eq!(slots[0].attrs.tile, 7);
        assert_eq!(slots[1].attrs.tile, 9);
    }
}
