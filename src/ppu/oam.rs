//! OAM Scan
//!
//! Sprite attribute entries and the once-per-line selection of the sprites
//! that intersect the current scanline.

use log::trace;

use crate::common::{bit, Byte};
use crate::ppu::vram::OAM_SIZE;

/// Number of entries in the attribute table
pub const OAM_ENTRIES: usize = 40;

/// Hardware limit on sprites per scanline
pub const MAX_SPRITES_PER_LINE: usize = 10;

/// Sprites are stored with their top edge 16 rows below the screen origin
pub const SPRITE_Y_OFFSET: i16 = 16;

/// Sprites are stored with their left edge 8 columns right of the origin
pub const SPRITE_X_OFFSET: i16 = 8;

/// OAM Entry (sprite attributes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OamEntry {
    /// Y position (plus 16)
    pub y: Byte,
    /// X position (plus 8)
    pub x: Byte,
    /// Tile index
    pub tile: Byte,
    /// Flags (priority, flip, palette)
    pub flags: Byte,
}

impl OamEntry {
    /// Decode entry `index` from the raw attribute table
    pub fn from_table(oam: &[Byte; OAM_SIZE], index: usize) -> Self {
        if index >= OAM_ENTRIES {
            return OamEntry::default();
        }
        let offset = index * 4;
        OamEntry {
            y: oam[offset],
            x: oam[offset + 1],
            tile: oam[offset + 2],
            flags: oam[offset + 3],
        }
    }

    /// DMG palette number (bit 4)
    pub fn palette_number(&self) -> bool {
        bit(self.flags, 4)
    }

    /// X flip (bit 5)
    pub fn x_flip(&self) -> bool {
        bit(self.flags, 5)
    }

    /// Y flip (bit 6)
    pub fn y_flip(&self) -> bool {
        bit(self.flags, 6)
    }

    /// BG/Window over OBJ priority (bit 7)
    pub fn bg_priority(&self) -> bool {
        bit(self.flags, 7)
    }

    /// Screen column of the sprite's left edge (may be negative)
    pub fn screen_x(&self) -> i16 {
        self.x as i16 - SPRITE_X_OFFSET
    }

    /// Screen row of the sprite's top edge (may be negative)
    pub fn screen_y(&self) -> i16 {
        self.y as i16 - SPRITE_Y_OFFSET
    }

    /// Whether scanline `ly` falls inside this sprite's vertical extent
    pub fn covers_line(&self, ly: u8, height: u8) -> bool {
        let top = self.screen_y();
        let ly = ly as i16;
        ly >= top && ly < top + height as i16
    }
}

/// Select the sprites drawn on scanline `ly`
///
/// Clears `queue`, then walks the table in order keeping the first ten
/// visible entries. The result is stable-sorted by X, so entries sharing a
/// column stay in table order. That order is the sprite-to-sprite priority.
pub fn scan_oam(oam: &[Byte; OAM_SIZE], ly: u8, height: u8, queue: &mut Vec<OamEntry>) {
    queue.clear();

    for index in 0..OAM_ENTRIES {
        if queue.len() >= MAX_SPRITES_PER_LINE {
            break;
        }

        let entry = OamEntry::from_table(oam, index);
        if entry.covers_line(ly, height) {
            queue.push(entry);
        }
    }

    // Vec::sort_by_key is stable
    queue.sort_by_key(|entry| entry.x);

    if !queue.is_empty() {
        trace!("LY={} selected {} sprite(s)", ly, queue.len());
    }
}
