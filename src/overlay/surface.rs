//! Software RGBA drawing surface
//!
//! A plain pixel buffer with the handful of primitives the overlay needs.
//! The host presents the buffer however it likes; this module never touches
//! a GPU or a window.

use crate::Rgba;

/// An owned width*height RGBA8 pixel buffer
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width as usize) * (height as usize) * 4];
    }

    /// Fill the whole surface with one color
    pub fn clear(&mut self, color: Rgba) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Alpha-blend one pixel. `additive` uses saturating add per channel
    /// (the "lighter" composite used for particles).
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba, alpha: f32, additive: bool) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        if additive {
            for c in 0..3 {
                let add = (color[c] as f32 * alpha) as u16;
                self.pixels[i + c] = (self.pixels[i + c] as u16 + add).min(255) as u8;
            }
            self.pixels[i + 3] = (self.pixels[i + 3] as u16 + (alpha * 255.0) as u16).min(255) as u8;
        } else {
            for c in 0..3 {
                let src = color[c] as f32 * alpha;
                let dst = self.pixels[i + c] as f32 * (1.0 - alpha);
                self.pixels[i + c] = (src + dst) as u8;
            }
            let a = alpha * 255.0 + self.pixels[i + 3] as f32 * (1.0 - alpha);
            self.pixels[i + 3] = a as u8;
        }
    }

    /// Filled circle
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba, alpha: f32, additive: bool) {
        let r = radius.max(0.5);
        let min_x = (cx - r).floor() as i32;
        let max_x = (cx + r).ceil() as i32;
        let min_y = (cy - r).floor() as i32;
        let max_y = (cy + r).ceil() as i32;
        let r2 = r * r;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_pixel(x, y, color, alpha, additive);
                }
            }
        }
    }

    /// Circle outline of ~1px thickness
    pub fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba, alpha: f32) {
        let steps = (radius * std::f32::consts::TAU).ceil().max(8.0) as u32;
        for i in 0..steps {
            let theta = i as f32 / steps as f32 * std::f32::consts::TAU;
            let x = (cx + radius * theta.cos()).round() as i32;
            let y = (cy + radius * theta.sin()).round() as i32;
            self.blend_pixel(x, y, color, alpha, false);
        }
    }

    /// Line segment (integer DDA)
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba, alpha: f32) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (x0 + dx * t).round() as i32;
            let y = (y0 + dy * t).round() as i32;
            self.blend_pixel(x, y, color, alpha, false);
        }
    }

    /// Filled triangle via edge functions
    pub fn fill_triangle(
        &mut self,
        a: (f32, f32),
        b: (f32, f32),
        c: (f32, f32),
        color: Rgba,
        alpha: f32,
    ) {
        let min_x = a.0.min(b.0).min(c.0).floor() as i32;
        let max_x = a.0.max(b.0).max(c.0).ceil() as i32;
        let min_y = a.1.min(b.1).min(c.1).floor() as i32;
        let max_y = a.1.max(b.1).max(c.1).ceil() as i32;

        let edge = |p: (f32, f32), q: (f32, f32), x: f32, y: f32| {
            (q.0 - p.0) * (y - p.1) - (q.1 - p.1) * (x - p.0)
        };
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                let e0 = edge(a, b, px, py);
                let e1 = edge(b, c, px, py);
                let e2 = edge(c, a, px, py);
                if (e0 >= 0.0 && e1 >= 0.0 && e2 >= 0.0) || (e0 <= 0.0 && e1 <= 0.0 && e2 <= 0.0) {
                    self.blend_pixel(x, y, color, alpha, false);
                }
            }
        }
    }
}

/// Memoized minimap geometry: circular clip mask and radial background
/// gradient. Both are expensive to build, so they are rebuilt only on
/// init/resize, never per frame.
#[derive(Debug, Clone)]
pub struct MapMask {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    size: i32,
    /// Row-major over the (2r+1)^2 bounding square
    inside: Vec<bool>,
    /// Background alpha per pixel, stronger toward the rim
    gradient: Vec<f32>,
}

impl MapMask {
    pub fn build(center_x: f32, center_y: f32, radius: f32) -> Self {
        let size = (radius.ceil() as i32) * 2 + 1;
        let mut inside = vec![false; (size * size) as usize];
        let mut gradient = vec![0.0; (size * size) as usize];
        let r = radius;
        for y in 0..size {
            for x in 0..size {
                let dx = (x - size / 2) as f32;
                let dy = (y - size / 2) as f32;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist <= r {
                    let i = (y * size + x) as usize;
                    inside[i] = true;
                    gradient[i] = 0.55 + 0.3 * (dist / r);
                }
            }
        }
        Self {
            center_x,
            center_y,
            radius,
            size,
            inside,
            gradient,
        }
    }

    /// Whether a surface pixel falls inside the circular viewport
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let lx = x - (self.center_x as i32 - self.size / 2);
        let ly = y - (self.center_y as i32 - self.size / 2);
        if lx < 0 || ly < 0 || lx >= self.size || ly >= self.size {
            return false;
        }
        self.inside[(ly * self.size + lx) as usize]
    }

    /// Background gradient alpha at a surface pixel, 0 outside the clip
    pub fn gradient_at(&self, x: i32, y: i32) -> f32 {
        let lx = x - (self.center_x as i32 - self.size / 2);
        let ly = y - (self.center_y as i32 - self.size / 2);
        if lx < 0 || ly < 0 || lx >= self.size || ly >= self.size {
            return 0.0;
        }
        self.gradient[(ly * self.size + lx) as usize]
    }
}
