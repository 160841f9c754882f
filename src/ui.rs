//! SDL2 User Interface
//!
//! This module implements the SDL2 window frames are presented in.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::emu::Emulator;
use crate::ppu::frame::{FrameBuffer, FrameSink};
use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Default scale factor for the window
pub const DEFAULT_SCALE: u32 = 4;

/// Latest presented frame, already converted to ARGB8888 bytes
#[derive(Debug, Default)]
struct ScreenBuffer {
    bytes: Vec<u8>,
    dirty: bool,
}

impl FrameSink for ScreenBuffer {
    fn present(&mut self, frame: &FrameBuffer) {
        self.bytes = frame
            .to_argb()
            .into_iter()
            .flat_map(u32::to_ne_bytes)
            .collect();
        self.dirty = true;
    }
}

/// SDL2 UI wrapper
pub struct Ui {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    texture_creator: TextureCreator<WindowContext>,
}

impl Ui {
    /// Create a new UI instance
    pub fn new(scale: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(
                "dmg-ppu",
                SCREEN_WIDTH as u32 * scale,
                SCREEN_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        // Software renderer: accelerated backends are not always available
        let canvas = window
            .into_canvas()
            .software()
            .build()
            .map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        info!("Opened {}x{} window", SCREEN_WIDTH as u32 * scale, SCREEN_HEIGHT as u32 * scale);

        Ok(Self {
            canvas,
            event_pump,
            texture_creator,
        })
    }

    /// Run the emulator with UI
    ///
    /// Stops after `max_frames` frames if given, or when the window closes.
    pub fn run(&mut self, emulator: &mut Emulator, max_frames: Option<u32>) -> Result<(), String> {
        let mut texture = self
            .texture_creator
            .create_texture_streaming(
                PixelFormatEnum::ARGB8888,
                SCREEN_WIDTH as u32,
                SCREEN_HEIGHT as u32,
            )
            .map_err(|e| e.to_string())?;

        let frame_duration = Duration::from_secs_f64(1.0 / 60.0);
        let mut screen = ScreenBuffer::default();
        let start_frame = emulator.current_frame();

        'running: loop {
            let frame_start = Instant::now();

            for event in self.event_pump.poll_iter() {
                match event {
                    Event::Quit { .. } => break 'running,
                    Event::KeyDown { keycode: Some(Keycode::Escape), .. } => break 'running,
                    Event::KeyDown { keycode: Some(Keycode::P), .. } => {
                        emulator.toggle_pause();
                        debug!("Paused: {}", emulator.is_paused());
                    }
                    _ => {}
                }
            }

            if !emulator.is_running() {
                break;
            }
            emulator.run_frame(&mut screen);

            if screen.dirty {
                texture
                    .update(None, &screen.bytes, SCREEN_WIDTH * 4)
                    .map_err(|e| e.to_string())?;
                screen.dirty = false;
            }

            self.canvas.clear();
            self.canvas.copy(&texture, None, None)?;
            self.canvas.present();

            if let Some(limit) = max_frames {
                if emulator.current_frame() - start_frame >= limit {
                    break;
                }
            }

            // Frame timing
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }

        Ok(())
    }
}
