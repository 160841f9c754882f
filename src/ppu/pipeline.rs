//! Pixel Pipeline
//!
//! The background/window half of the pixel pipeline: an 8-pixel shift
//! register pair and the fetch state machine that keeps it filled.
//!
//! The fetcher walks TileIndex -> LowPlane -> HighPlane -> Push. The three
//! read phases take two dots each and perform their read on the second dot.
//! Push only succeeds when the shift register is empty, so the fetcher idles
//! there until the mixer has drained the previous tile.

use crate::common::{color_index, Byte, Word};
use crate::lcd::Lcd;
use crate::ppu::vram::VideoMemory;

/// Dots spent in each read phase
const DOTS_PER_PHASE: u8 = 2;

/// A pair of 8-bit shift registers, one per bit-plane
///
/// Pixels leave from the MSB end, one per shift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftRegister {
    low: Byte,
    high: Byte,
    len: u8,
}

impl ShiftRegister {
    /// Create an empty register pair
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pixels still queued
    pub fn len(&self) -> u8 {
        self.len
    }

    /// Drop everything queued
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Load a full tile row
    pub fn load(&mut self, low: Byte, high: Byte) {
        self.low = low;
        self.high = high;
        self.len = 8;
    }

    /// Color index of the next pixel without consuming it (0 if empty)
    pub fn peek(&self) -> u8 {
        if self.is_empty() {
            return 0;
        }
        color_index(self.low, self.high, 7)
    }

    /// Shift out the next pixel's color index (0 if empty)
    pub fn shift(&mut self) -> u8 {
        if self.is_empty() {
            return 0;
        }
        let index = self.peek();
        self.low <<= 1;
        self.high <<= 1;
        self.len -= 1;
        index
    }

    /// Discard up to `count` pixels
    pub fn skip(&mut self, count: u8) {
        for _ in 0..count.min(self.len) {
            self.shift();
        }
    }
}

/// Background fetcher phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// Read the tile number from the active tile map
    TileIndex,
    /// Read the low bit-plane of the tile row
    LowPlane,
    /// Read the high bit-plane of the tile row
    HighPlane,
    /// Hand the row to the shift register once it is empty
    Push,
}

/// Which layer the fetcher is reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchLayer {
    Background,
    Window,
}

/// Background/window tile fetcher
#[derive(Debug, Clone)]
pub struct BackgroundFetcher {
    phase: FetchPhase,
    /// Dots spent in the current read phase
    dot_in_phase: u8,
    layer: FetchLayer,
    /// Tiles pushed on this line for the current layer
    tile_x: u8,
    /// Window row being drawn (window internal line counter)
    window_line: u8,
    tile_index: Byte,
    low: Byte,
    high: Byte,
}

impl Default for BackgroundFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundFetcher {
    pub fn new() -> Self {
        Self {
            phase: FetchPhase::TileIndex,
            dot_in_phase: 0,
            layer: FetchLayer::Background,
            tile_x: 0,
            window_line: 0,
            tile_index: 0,
            low: 0,
            high: 0,
        }
    }

    /// Restart on the background layer for a new scanline
    pub fn reset_for_line(&mut self) {
        *self = Self::new();
    }

    /// Abandon the background and start fetching window row `window_line`
    pub fn start_window(&mut self, window_line: u8) {
        *self = Self {
            layer: FetchLayer::Window,
            window_line,
            ..Self::new()
        };
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn layer(&self) -> FetchLayer {
        self.layer
    }

    /// Tiles pushed so far on this line for the current layer
    pub fn tiles_pushed(&self) -> u8 {
        self.tile_x
    }

    /// Resume at `phase` after a sprite fetch
    ///
    /// The phase restarts from its first dot, so a byte that was in flight
    /// when the fetcher was interrupted is read again.
    pub fn resume(&mut self, phase: FetchPhase) {
        self.phase = phase;
        self.dot_in_phase = 0;
    }

    /// Advance the fetcher by one dot
    pub fn step(&mut self, lcd: &Lcd, vram: &VideoMemory, fifo: &mut ShiftRegister) {
        match self.phase {
            FetchPhase::TileIndex => {
                if self.advance_dot() {
                    self.tile_index = vram.vram_byte(self.map_address(lcd));
                    self.phase = FetchPhase::LowPlane;
                }
            }
            FetchPhase::LowPlane => {
                if self.advance_dot() {
                    self.low = vram.vram_byte(self.data_address(lcd));
                    self.phase = FetchPhase::HighPlane;
                }
            }
            FetchPhase::HighPlane => {
                if self.advance_dot() {
                    self.high = vram.vram_byte(self.data_address(lcd) + 1);
                    self.phase = FetchPhase::Push;
                }
            }
            FetchPhase::Push => {
                if fifo.is_empty() {
                    fifo.load(self.low, self.high);
                    self.tile_x = self.tile_x.wrapping_add(1);
                    self.phase = FetchPhase::TileIndex;
                }
            }
        }
    }

    /// Count a dot in the current read phase; true when the read happens
    fn advance_dot(&mut self) -> bool {
        self.dot_in_phase += 1;
        if self.dot_in_phase == DOTS_PER_PHASE {
            self.dot_in_phase = 0;
            true
        } else {
            false
        }
    }

    /// Row within the tile (0-7) for the current layer
    fn fine_y(&self, lcd: &Lcd) -> u8 {
        match self.layer {
            FetchLayer::Background => lcd.ly.wrapping_add(lcd.scy) & 0x07,
            FetchLayer::Window => self.window_line & 0x07,
        }
    }

    /// VRAM-relative address of the tile map entry being fetched
    fn map_address(&self, lcd: &Lcd) -> Word {
        match self.layer {
            FetchLayer::Background => {
                let y = lcd.ly.wrapping_add(lcd.scy);
                let x = (lcd.scx / 8).wrapping_add(self.tile_x);
                lcd.bg_tile_map().entry_address(x, y / 8)
            }
            FetchLayer::Window => lcd
                .window_tile_map()
                .entry_address(self.tile_x, self.window_line / 8),
        }
    }

    /// VRAM-relative address of the low plane of the fetched tile row
    ///
    /// LCDC bit 4 is sampled here, at read time.
    fn data_address(&self, lcd: &Lcd) -> Word {
        lcd.bg_tile_data().row_address(self.tile_index, self.fine_y(lcd))
    }
}
