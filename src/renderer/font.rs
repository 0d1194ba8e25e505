//! Tiny 3x5 bitmap font for the score and banners

use super::frame::{FrameBuffer, Rgba};

const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

/// Row bitmaps, most significant of the low three bits is the left column
fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        _ => [0; 5],
    }
}

/// Width in pixels of `text` at `scale` (one blank column between glyphs)
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        0
    } else {
        (n * (GLYPH_W + 1) - 1) * scale
    }
}

/// Height in pixels of one line at `scale`
pub fn text_height(scale: u32) -> u32 {
    GLYPH_H * scale
}

/// Draw `text` horizontally centered on `center_x`, top edge at `top`
pub fn draw_text_centered(frame: &mut FrameBuffer, text: &str, center_x: f32, top: f32, scale: u32, color: Rgba) {
    let left = center_x - text_width(text, scale) as f32 / 2.0;
    draw_text(frame, text, left.round(), top, scale, color);
}

/// Draw `text` with its top-left corner at (`left`, `top`)
pub fn draw_text(frame: &mut FrameBuffer, text: &str, left: f32, top: f32, scale: u32, color: Rgba) {
    let s = scale as f32;
    for (i, c) in text.chars().enumerate() {
        let gx = left + (i as u32 * (GLYPH_W + 1) * scale) as f32;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (0b100 >> col) != 0 {
                    let x = gx + col as f32 * s;
                    let y = top + row as f32 * s;
                    frame.fill_rect(x, y, x + s, y + s, color);
                }
            }
        }
    }
}
