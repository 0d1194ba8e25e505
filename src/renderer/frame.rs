//! Off-screen RGBA frame buffer
//!
//! All drawing lands here first; a surface only ever sees a finished buffer.

use glam::Vec2;

/// One pixel, `[r, g, b, a]`
pub type Rgba = [u8; 4];

/// CPU-side frame, row-major, origin top-left
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Clip a float span to whole pixel indices `[start, end)`
    fn clip(lo: f32, hi: f32, limit: u32) -> (u32, u32) {
        let start = lo.floor().clamp(0.0, limit as f32) as u32;
        let end = hi.ceil().clamp(0.0, limit as f32) as u32;
        (start, end.max(start))
    }

    /// Fill `[x0, x1) × [y0, y1)`, clipped to the frame
    pub fn fill_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
        let (xs, xe) = Self::clip(x0, x1, self.width);
        let (ys, ye) = Self::clip(y0, y1, self.height);
        for y in ys..ye {
            let row = (y * self.width) as usize;
            self.pixels[row + xs as usize..row + xe as usize].fill(color);
        }
    }

    /// Blend `color` over `[x0, x1) × [y0, y1)` with the given opacity
    pub fn blend_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba, alpha: f32) {
        let a = alpha.clamp(0.0, 1.0);
        let (xs, xe) = Self::clip(x0, x1, self.width);
        let (ys, ye) = Self::clip(y0, y1, self.height);
        for y in ys..ye {
            let row = (y * self.width) as usize;
            for px in &mut self.pixels[row + xs as usize..row + xe as usize] {
                for c in 0..3 {
                    let blended = px[c] as f32 * (1.0 - a) + color[c] as f32 * a;
                    px[c] = blended.round() as u8;
                }
            }
        }
    }

    /// Fill an axis-aligned ellipse (pixel centers inside are painted)
    pub fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Rgba) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let (xs, xe) = Self::clip(center.x - radii.x, center.x + radii.x, self.width);
        let (ys, ye) = Self::clip(center.y - radii.y, center.y + radii.y, self.height);
        for y in ys..ye {
            let dy = (y as f32 + 0.5 - center.y) / radii.y;
            let row = (y * self.width) as usize;
            for x in xs..xe {
                let dx = (x as f32 + 0.5 - center.x) / radii.x;
                if dx * dx + dy * dy <= 1.0 {
                    self.pixels[row + x as usize] = color;
                }
            }
        }
    }
}
