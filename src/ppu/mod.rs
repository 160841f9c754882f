//! PPU Module
//!
//! This module implements the Pixel Processing Unit (PPU).
//!
//! `Ppu::step` advances the unit by exactly one dot. Each scanline is 456
//! dots: 80 of OAM search, a variable-length pixel transfer that ends on the
//! 160th pixel, and HBlank for the rest. Lines 144-153 are vertical blank.

pub mod frame;
pub mod mixer;
pub mod modes;
pub mod oam;
pub mod pipeline;
pub mod sprite_fetch;
pub mod vram;

use log::debug;

use crate::common::{Byte, Word};
use crate::interrupts::{InterruptSink, InterruptType};
use crate::lcd::Lcd;
pub use frame::{FrameBuffer, FrameSink, SCREEN_HEIGHT, SCREEN_WIDTH};
use modes::{PpuMode, DOTS_PER_LINE, OAM_SEARCH_DOTS, VBLANK_START_LINE};
use oam::{scan_oam, OamEntry, MAX_SPRITES_PER_LINE};
use pipeline::{BackgroundFetcher, ShiftRegister};
use sprite_fetch::{SpriteFetcher, SpriteSlot};
use vram::VideoMemory;

/// Largest WX that still shows the window
const WINDOW_X_MAX: Byte = 166;

/// WX is stored 7 columns right of the window's screen column
const WINDOW_X_OFFSET: u16 = 7;

/// Pixel Processing Unit
#[derive(Debug)]
pub struct Ppu {
    /// Register file
    pub lcd: Lcd,
    /// VRAM and OAM
    pub vram: VideoMemory,
    /// Frame being drawn
    frame: FrameBuffer,
    /// Frames completed since power-on
    pub current_frame: u32,
    /// Dots elapsed within the current line (0-455)
    line_ticks: u32,
    /// Sprites on current line (max 10), sorted by X
    line_sprites: Vec<OamEntry>,
    /// Next screen column to output (0-160)
    pixel_x: u8,
    /// Pixels still to be thrown away for fine scrolling
    discard: u8,
    /// Background/window shift register pair
    bg_fifo: ShiftRegister,
    fetcher: BackgroundFetcher,
    sprite_fetcher: SpriteFetcher,
    /// One shift register pair per queued sprite
    sprite_slots: [SpriteSlot; MAX_SPRITES_PER_LINE],
    /// Window internal line counter
    window_line: u8,
    /// WY matched LY at some line of this frame
    window_y_reached: bool,
    /// The window has started on the current line
    window_active: bool,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    /// Create a PPU in its power-on state
    pub fn new() -> Self {
        Self {
            lcd: Lcd::new(),
            vram: VideoMemory::new(),
            frame: FrameBuffer::new(),
            current_frame: 0,
            line_ticks: 0,
            line_sprites: Vec::with_capacity(MAX_SPRITES_PER_LINE),
            pixel_x: 0,
            discard: 0,
            bg_fifo: ShiftRegister::new(),
            fetcher: BackgroundFetcher::new(),
            sprite_fetcher: SpriteFetcher::new(),
            sprite_slots: [SpriteSlot::default(); MAX_SPRITES_PER_LINE],
            window_line: 0,
            window_y_reached: false,
            window_active: false,
        }
    }

    /// Return to the power-on state
    pub fn init(&mut self) {
        *self = Self::new();
    }

    // ========== Bus-facing access ==========

    /// Read a PPU register (0xFF40-0xFF4B)
    pub fn read_register(&self, address: Word) -> Byte {
        self.lcd.read(address)
    }

    /// Write a PPU register (0xFF40-0xFF4B)
    ///
    /// Turning the display off also stops the sequencer at the start of
    /// line 0, all within this write.
    pub fn write_register(&mut self, address: Word, value: Byte) {
        let was_enabled = self.lcd.lcd_enabled();
        self.lcd.write(address, value);

        if was_enabled && !self.lcd.lcd_enabled() {
            self.line_ticks = 0;
            self.line_sprites.clear();
            self.reset_transfer();
            self.window_line = 0;
            self.window_y_reached = false;
        }
    }

    /// CPU read from VRAM, blocked during pixel transfer
    pub fn vram_read(&self, address: Word) -> Byte {
        self.vram.vram_read(address, self.lcd.mode())
    }

    /// CPU write to VRAM, dropped during pixel transfer
    pub fn vram_write(&mut self, address: Word, value: Byte) {
        self.vram.vram_write(address, value, self.lcd.mode());
    }

    /// CPU read from OAM, blocked during OAM search and pixel transfer
    pub fn oam_read(&self, address: Word) -> Byte {
        self.vram.oam_read(address, self.lcd.mode())
    }

    /// CPU write to OAM, dropped during OAM search and pixel transfer
    pub fn oam_write(&mut self, address: Word, value: Byte) {
        self.vram.oam_write(address, value, self.lcd.mode());
    }

    // ========== Observation ==========

    /// The frame buffer (partially drawn while the frame is in progress)
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Dots elapsed within the current line
    pub fn line_ticks(&self) -> u32 {
        self.line_ticks
    }

    /// Current PPU mode
    pub fn mode(&self) -> PpuMode {
        self.lcd.mode()
    }

    /// Next column the mixer will write
    pub fn pixel_x(&self) -> u8 {
        self.pixel_x
    }

    /// Sprites selected for the current line
    pub fn line_sprites(&self) -> &[OamEntry] {
        &self.line_sprites
    }

    // ========== Sequencer ==========

    /// Tick the PPU by one dot
    pub fn step(&mut self, interrupts: &mut impl InterruptSink, display: &mut impl FrameSink) {
        if !self.lcd.lcd_enabled() {
            return;
        }

        // Power-on and LCD re-enable both leave us at dot 0 of a visible
        // line without having entered OAM search.
        if self.line_ticks == 0
            && self.lcd.ly < VBLANK_START_LINE
            && self.lcd.mode() != PpuMode::OamScan
        {
            self.enter_oam_scan();
        }

        if self.lcd.mode() == PpuMode::Transfer {
            self.mode_transfer();
        }

        self.line_ticks += 1;

        if self.lcd.mode() == PpuMode::OamScan && self.line_ticks == OAM_SEARCH_DOTS {
            self.enter_transfer();
        }

        if self.line_ticks == DOTS_PER_LINE {
            self.line_ticks = 0;
            self.end_line(interrupts, display);
        }

        if self.lcd.take_stat_interrupt() {
            interrupts.request(InterruptType::LcdStat);
        }
    }

    /// Mode 2 entry: select this line's sprites
    fn enter_oam_scan(&mut self) {
        if self.lcd.ly == 0 {
            self.window_line = 0;
            self.window_y_reached = false;
        }
        if self.lcd.ly == self.lcd.wy {
            self.window_y_reached = true;
        }

        self.lcd.set_mode(PpuMode::OamScan);
        scan_oam(
            self.vram.oam(),
            self.lcd.ly,
            self.lcd.sprite_height(),
            &mut self.line_sprites,
        );
    }

    /// Mode 3 entry: prime the pipeline for a fresh line
    fn enter_transfer(&mut self) {
        self.lcd.set_mode(PpuMode::Transfer);
        self.reset_transfer();
        self.discard = self.lcd.scx & 0x07;
    }

    fn reset_transfer(&mut self) {
        self.pixel_x = 0;
        self.discard = 0;
        self.bg_fifo.clear();
        self.fetcher.reset_for_line();
        self.sprite_fetcher.reset_for_line();
        self.sprite_slots = [SpriteSlot::default(); MAX_SPRITES_PER_LINE];
        self.window_active = false;
    }

    /// Mode 0 entry: the line is fully drawn
    fn enter_hblank(&mut self) {
        self.lcd.set_mode(PpuMode::HBlank);
        if self.window_active {
            self.window_line = self.window_line.wrapping_add(1);
        }
    }

    /// Mode 1 entry: raise VBlank and present the finished frame
    fn enter_vblank(&mut self, interrupts: &mut impl InterruptSink, display: &mut impl FrameSink) {
        self.lcd.set_mode(PpuMode::VBlank);
        interrupts.request(InterruptType::VBlank);

        self.current_frame = self.current_frame.wrapping_add(1);
        debug!("Frame {} complete", self.current_frame);
        display.present(&self.frame);
    }

    /// Dot 455 has elapsed: move on to the next line
    fn end_line(&mut self, interrupts: &mut impl InterruptSink, display: &mut impl FrameSink) {
        self.lcd.inc_ly();

        if self.lcd.ly == VBLANK_START_LINE {
            self.enter_vblank(interrupts, display);
        } else if self.lcd.ly < VBLANK_START_LINE {
            self.enter_oam_scan();
        }
    }

    /// One dot of pixel transfer
    fn mode_transfer(&mut self) {
        if self.sprite_fetcher.is_fetching() {
            self.step_sprite_fetch();
            return;
        }

        self.check_window_trigger();

        let sprite_queue = &self.line_sprites[..];
        if self.lcd.sprites_enabled()
            && self.sprite_fetcher.try_start(sprite_queue, self.pixel_x, &self.fetcher)
        {
            self.step_sprite_fetch();
            return;
        }

        self.fetcher.step(&self.lcd, &self.vram, &mut self.bg_fifo);
        self.push_pixel();
    }

    fn step_sprite_fetch(&mut self) {
        self.sprite_fetcher.step(
            &self.lcd,
            &self.vram,
            self.pixel_x,
            &mut self.sprite_slots,
            &mut self.fetcher,
        );
    }

    /// Start the window when the cursor reaches WX - 7
    fn check_window_trigger(&mut self) {
        if self.window_active
            || !self.window_y_reached
            || !self.lcd.window_enabled()
            || !self.lcd.bg_window_enabled()
            || self.lcd.wx > WINDOW_X_MAX
        {
            return;
        }
        if (self.pixel_x as u16) + WINDOW_X_OFFSET < self.lcd.wx as u16 {
            return;
        }

        self.window_active = true;
        self.bg_fifo.clear();
        self.fetcher.start_window(self.window_line);
        // WX < 7 hides the window's first columns off the left edge
        self.discard = if self.pixel_x == 0 {
            (WINDOW_X_OFFSET as u8).saturating_sub(self.lcd.wx)
        } else {
            0
        };
    }

    /// Mixer: output at most one pixel this dot
    fn push_pixel(&mut self) {
        if self.bg_fifo.is_empty() {
            return;
        }

        let bg_index = self.bg_fifo.shift();
        if self.discard > 0 {
            self.discard -= 1;
            return;
        }

        let count = self.line_sprites.len();
        let shade = mixer::resolve(&self.lcd, bg_index, &self.sprite_slots[..count]);
        mixer::shift_sprites(&mut self.sprite_slots[..count]);

        self.frame.set(self.pixel_x as usize, self.lcd.ly as usize, shade);
        self.pixel_x += 1;

        if self.pixel_x as usize == SCREEN_WIDTH {
            self.enter_hblank();
        }
    }

    /// Whether the current line has switched to the window layer
    pub fn window_active(&self) -> bool {
        self.window_active
    }
}
