//! Whole-frame rendering through the public API

use dmgppu::bus::MemoryBus;
use dmgppu::emu::Emulator;
use dmgppu::interrupts::InterruptFlags;
use dmgppu::ppu::frame::{FrameBuffer, LatestFrame, NullSink};
use dmgppu::ppu::{Ppu, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Identity palette: index n shows shade n
const IDENTITY_PALETTE: u8 = 0xE4;

/// Fill every row of tile `tile` (unsigned addressing) with one plane pair
fn fill_tile(emu: &mut Emulator, tile: u16, low: u8, high: u8) {
    for row in 0..8 {
        emu.ppu.vram.set_vram_byte(tile * 16 + row * 2, low);
        emu.ppu.vram.set_vram_byte(tile * 16 + row * 2 + 1, high);
    }
}

fn set_sprite(emu: &mut Emulator, index: usize, y: u8, x: u8, tile: u8, flags: u8) {
    for (i, value) in [y, x, tile, flags].into_iter().enumerate() {
        emu.ppu.vram.set_oam_byte(index * 4 + i, value);
    }
}

fn render(emu: &mut Emulator) -> FrameBuffer {
    let mut sink = LatestFrame::default();
    emu.run_frame(&mut sink);
    assert_eq!(sink.presented, 1);
    sink.frame.unwrap()
}

fn shade(frame: &FrameBuffer, x: usize, y: usize) -> u8 {
    frame.get(x, y).unwrap()
}

#[test]
fn test_power_on_frame_is_blank() {
    let mut emu = Emulator::new();
    let frame = render(&mut emu);
    assert!(frame.pixels().iter().all(|&p| p == 0));
}

#[test]
fn test_solid_background() {
    let mut emu = Emulator::new();
    fill_tile(&mut emu, 0, 0xFF, 0xFF);
    emu.write(0xFF47, IDENTITY_PALETTE);

    let frame = render(&mut emu);
    assert_eq!(frame.pixels().len(), SCREEN_WIDTH * SCREEN_HEIGHT);
    assert!(frame.pixels().iter().all(|&p| p == 3));
}

#[test]
fn test_palette_applies_to_background() {
    let mut emu = Emulator::new();
    fill_tile(&mut emu, 0, 0xFF, 0x00); // index 1
    emu.write(0xFF47, 0b00_00_10_00); // index 1 -> shade 2

    let frame = render(&mut emu);
    assert!(frame.pixels().iter().all(|&p| p == 2));
}

#[test]
fn test_fine_horizontal_scroll() {
    let mut emu = Emulator::new();
    fill_tile(&mut emu, 1, 0xFF, 0xFF);
    // Map row 0, column 1
    emu.ppu.vram.set_vram_byte(0x1801, 1);
    emu.write(0xFF47, IDENTITY_PALETTE);
    emu.write(0xFF43, 3);

    let frame = render(&mut emu);
    for y in 0..8 {
        for x in 0..SCREEN_WIDTH {
            let expected = if (5..13).contains(&x) { 3 } else { 0 };
            assert_eq!(shade(&frame, x, y), expected, "x={} y={}", x, y);
        }
    }
    assert!(frame.row(8).iter().all(|&p| p == 0));
}

#[test]
fn test_vertical_scroll() {
    let mut emu = Emulator::new();
    fill_tile(&mut emu, 1, 0xFF, 0xFF);
    // Map row 1 (background rows 8-15)
    for col in 0..32 {
        emu.ppu.vram.set_vram_byte(0x1800 + 32 + col, 1);
    }
    emu.write(0xFF47, IDENTITY_PALETTE);
    emu.write(0xFF42, 4);

    let frame = render(&mut emu);
    assert!(frame.row(3).iter().all(|&p| p == 0));
    assert!(frame.row(4).iter().all(|&p| p == 3));
    assert!(frame.row(11).iter().all(|&p| p == 3));
    assert!(frame.row(12).iter().all(|&p| p == 0));
}

#[test]
fn test_window_covers_lower_right() {
    let mut emu = Emulator::new();
    fill_tile(&mut emu, 1, 0xFF, 0xFF);
    // Window map at 0x9C00 points at the solid tile everywhere
    for entry in 0..0x400 {
        emu.ppu.vram.set_vram_byte(0x1C00 + entry, 1);
    }
    emu.write(0xFF47, IDENTITY_PALETTE);
    emu.write(0xFF4A, 72);
    emu.write(0xFF4B, 87);
    emu.write(0xFF40, 0xF1);

    let frame = render(&mut emu);
    for y in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            let expected = if y >= 72 && x >= 80 { 3 } else { 0 };
            assert_eq!(shade(&frame, x, y), expected, "x={} y={}", x, y);
        }
    }
}

#[test]
fn test_sprite_overlap_and_priority() {
    let mut emu = Emulator::new();
    fill_tile(&mut emu, 2, 0xFF, 0x00); // index 1
    fill_tile(&mut emu, 3, 0x00, 0xFF); // index 2
    fill_tile(&mut emu, 4, 0xF0, 0x00); // left half index 1
    // Background map row 2, column 5
    emu.ppu.vram.set_vram_byte(0x1800 + 2 * 32 + 5, 4);

    // A: columns 12-19, B: columns 8-15, B has the smaller X and wins
    set_sprite(&mut emu, 0, 16, 20, 2, 0x00);
    set_sprite(&mut emu, 1, 16, 16, 3, 0x00);
    // C: rows 20-27, columns 40-47, behind non-zero background
    set_sprite(&mut emu, 2, 36, 48, 3, 0x80);

    emu.write(0xFF47, IDENTITY_PALETTE);
    emu.write(0xFF48, IDENTITY_PALETTE);
    emu.write(0xFF40, 0x93);

    let frame = render(&mut emu);
    for y in 0..8 {
        assert_eq!(shade(&frame, 7, y), 0);
        for x in 8..16 {
            assert_eq!(shade(&frame, x, y), 2, "x={} y={}", x, y);
        }
        for x in 16..20 {
            assert_eq!(shade(&frame, x, y), 1, "x={} y={}", x, y);
        }
        assert_eq!(shade(&frame, 20, y), 0);
    }
    assert!(frame.row(8).iter().all(|&p| p == 0));

    for y in 20..24 {
        for x in 40..44 {
            assert_eq!(shade(&frame, x, y), 1, "x={} y={}", x, y);
        }
        for x in 44..48 {
            assert_eq!(shade(&frame, x, y), 2, "x={} y={}", x, y);
        }
    }
    for y in 24..28 {
        for x in 40..48 {
            assert_eq!(shade(&frame, x, y), 2, "x={} y={}", x, y);
        }
    }
}

#[test]
fn test_same_column_sprites_lower_oam_index_wins() {
    let mut emu = Emulator::new();
    fill_tile(&mut emu, 2, 0xFF, 0x00); // index 1
    fill_tile(&mut emu, 3, 0x00, 0xFF); // index 2
    set_sprite(&mut emu, 0, 16, 40, 2, 0x00);
    set_sprite(&mut emu, 1, 16, 40, 3, 0x00);
    emu.write(0xFF48, IDENTITY_PALETTE);
    emu.write(0xFF40, 0x93);

    let frame = render(&mut emu);
    for x in 32..40 {
        assert_eq!(shade(&frame, x, 0), 1, "x={}", x);
    }
}

#[test]
fn test_sprite_flips_and_palette() {
    let mut emu = Emulator::new();
    // Tile 5: only the top row, left pixel index 3
    emu.ppu.vram.set_vram_byte(5 * 16, 0x80);
    emu.ppu.vram.set_vram_byte(5 * 16 + 1, 0x80);

    // X and Y flipped, OBP1: the dot moves to the bottom-right corner
    set_sprite(&mut emu, 0, 16, 8, 5, 0x70);
    emu.write(0xFF49, 0b01_00_00_00); // index 3 -> shade 1
    emu.write(0xFF40, 0x93);

    let frame = render(&mut emu);
    assert_eq!(shade(&frame, 7, 7), 1);
    assert_eq!(shade(&frame, 0, 0), 0);
    assert_eq!(frame.pixels().iter().filter(|&&p| p != 0).count(), 1);
}

#[test]
fn test_ten_sprite_limit() {
    let mut emu = Emulator::new();
    fill_tile(&mut emu, 1, 0xFF, 0xFF);
    for i in 0..12 {
        set_sprite(&mut emu, i, 16, 8 + 8 * i as u8, 1, 0);
    }
    emu.write(0xFF48, IDENTITY_PALETTE);
    emu.write(0xFF40, 0x93);

    let frame = render(&mut emu);
    let lit = frame.row(0).iter().filter(|&&p| p == 3).count();
    assert_eq!(lit, 80);
    assert_eq!(shade(&frame, 80, 0), 0);
}

#[test]
fn test_mid_line_tile_data_switch() {
    let mut ppu = Ppu::new();
    let mut flags = InterruptFlags::new();
    // Unsigned tile 0 is solid, signed tile 0 (0x9000) is blank
    for offset in 0..16 {
        ppu.vram.set_vram_byte(offset, 0xFF);
    }
    ppu.lcd.bgp = IDENTITY_PALETTE;

    while !(ppu.lcd.ly == 0 && ppu.pixel_x() >= 80) {
        ppu.step(&mut flags, &mut NullSink);
    }
    ppu.write_register(0xFF40, 0x81);

    let mut sink = LatestFrame::default();
    while sink.presented == 0 {
        ppu.step(&mut flags, &mut sink);
    }
    let frame = sink.frame.unwrap();

    // Pixels already drawn keep their shade
    assert!(frame.row(0)[..80].iter().all(|&p| p == 3));
    assert_eq!(frame.row(0)[159], 0);
    assert!(frame.row(1).iter().all(|&p| p == 0));
}

#[test]
fn test_lcd_off_freezes_frame_count() {
    let mut emu = Emulator::new();
    emu.run_frame(&mut NullSink);
    emu.write(0xFF40, 0x11);
    assert_eq!(emu.read(0xFF44), 0);

    emu.run_frame(&mut NullSink);
    assert_eq!(emu.current_frame(), 1);

    emu.write(0xFF40, 0x91);
    emu.run_frame(&mut NullSink);
    assert_eq!(emu.current_frame(), 2);
}
