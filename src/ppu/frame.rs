//! Frame Buffer
//!
//! The 160x144 grid of resolved shades the pixel mixer writes into, and the
//! presentation seam frames are handed to once per frame.

/// Screen dimensions
pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

/// Resolved pixels, one shade (0 = lightest, 3 = darkest) per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<u8>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Create a frame filled with shade 0
    pub fn new() -> Self {
        Self {
            pixels: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    /// Shade at (x, y), or `None` outside the screen
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return None;
        }
        Some(self.pixels[y * SCREEN_WIDTH + x])
    }

    /// Store a shade at (x, y); writes outside the screen are ignored
    pub fn set(&mut self, x: usize, y: usize, shade: u8) {
        if x < SCREEN_WIDTH && y < SCREEN_HEIGHT {
            self.pixels[y * SCREEN_WIDTH + x] = shade & 0x03;
        }
    }

    /// One scanline of shades
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y.min(SCREEN_HEIGHT - 1) * SCREEN_WIDTH;
        &self.pixels[start..start + SCREEN_WIDTH]
    }

    /// All shades, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Convert the frame to ARGB8888 using the classic green palette
    pub fn to_argb(&self) -> Vec<u32> {
        self.pixels.iter().map(|&shade| shade_to_argb(shade)).collect()
    }
}

/// Convert a shade to ARGB
pub fn shade_to_argb(shade: u8) -> u32 {
    match shade & 0x03 {
        0 => 0xFF9BBC0F, // Lightest
        1 => 0xFF8BAC0F,
        2 => 0xFF306230,
        _ => 0xFF0F380F, // Darkest
    }
}

/// The presentation collaborator that receives finished frames
pub trait FrameSink {
    /// Called once per frame, at vertical blank entry
    fn present(&mut self, frame: &FrameBuffer);
}

/// A sink that drops every frame, for headless runs
#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _frame: &FrameBuffer) {}
}

/// A sink that keeps a copy of the most recent frame
#[derive(Debug, Default)]
pub struct LatestFrame {
    pub frame: Option<FrameBuffer>,
    pub presented: u32,
}

impl FrameSink for LatestFrame {
    fn present(&mut self, frame: &FrameBuffer) {
        self.frame = Some(frame.clone());
        self.presented += 1;
    }
}
