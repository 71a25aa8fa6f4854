//! Braille dot canvas.
//!
//! Every terminal cell holds a 2x4 grid of dots (Unicode U+2800-U+28FF),
//! which gives effects a sub-cell drawing surface the way a device pixel
//! ratio does for a browser canvas. Each dot carries a colour and an alpha;
//! a separate per-cell glow layer becomes the cell background.

use crate::colors::Rgb;
use crate::geometry::{Projection, Vec3};
use crate::terminal::{Buffer, Rect};

/// Dots per cell horizontally
pub const DOTS_X: usize = 2;
/// Dots per cell vertically
pub const DOTS_Y: usize = 4;

const BRAILLE_BASE: u32 = 0x2800;
/// Dots fainter than this are not drawn
const MIN_ALPHA: f32 = 0.04;
/// Glow dimmer than this leaves the background untouched
const MIN_GLOW: f32 = 0.02;

/// Size of an effect's drawing area in cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    /// Drawing resolution in dots
    pub fn dots(&self) -> (usize, usize) {
        (self.cols as usize * DOTS_X, self.rows as usize * DOTS_Y)
    }
}

impl From<Rect> for Viewport {
    fn from(rect: Rect) -> Self {
        Viewport::new(rect.width, rect.height)
    }
}

#[derive(Clone, Copy, Default)]
struct Dot {
    color: Rgb,
    alpha: f32,
}

/// Line style for projected 3D paths
#[derive(Clone, Copy, Debug)]
pub struct Stroke {
    pub color: Rgb,
    /// Alpha for segments on the near hemisphere (`z >= 0`)
    pub alpha: f32,
    /// Alpha for segments behind the sphere centre
    pub back_alpha: f32,
}

impl Stroke {
    pub const fn new(color: Rgb, alpha: f32, back_alpha: f32) -> Self {
        Self { color, alpha, back_alpha }
    }

    fn alpha_for(&self, z: f32) -> f32 {
        if z >= 0.0 {
            self.alpha
        } else {
            self.back_alpha
        }
    }
}

pub struct DotCanvas {
    cols: usize,
    rows: usize,
    width: usize,
    height: usize,
    dots: Vec<Dot>,
    glow: Vec<Rgb>,
}

impl DotCanvas {
    pub fn new(viewport: Viewport) -> Self {
        let (width, height) = viewport.dots();
        let cols = viewport.cols as usize;
        let rows = viewport.rows as usize;
        Self {
            cols,
            rows,
            width,
            height,
            dots: vec![Dot::default(); width * height],
            glow: vec![Rgb::BLACK; cols * rows],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn projection(&self) -> Projection {
        Projection::new(self.width, self.height)
    }

    /// Light a dot, keeping whichever of old and new is stronger
    pub fn plot(&mut self, x: f32, y: f32, color: Rgb, alpha: f32) {
        let (xi, yi) = (x.round() as i64, y.round() as i64);
        if xi < 0 || yi < 0 || xi >= self.width as i64 || yi >= self.height as i64 {
            return;
        }
        let dot = &mut self.dots[yi as usize * self.width + xi as usize];
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha > dot.alpha {
            *dot = Dot { color, alpha };
        }
    }

    pub fn alpha_at(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.dots[y * self.width + x].alpha
        } else {
            0.0
        }
    }

    /// Number of dots bright enough to be drawn
    pub fn lit_dots(&self) -> usize {
        self.dots.iter().filter(|d| d.alpha >= MIN_ALPHA).count()
    }

    /// Filled circle of dots, clipped to the canvas
    pub fn disc(&mut self, x: f32, y: f32, radius: f32, color: Rgb, alpha: f32) {
        if !(x.is_finite() && y.is_finite() && radius.is_finite()) {
            return;
        }
        if radius < 0.75 {
            self.plot(x, y, color, alpha);
            return;
        }
        let r = radius.ceil();
        let span = |centre: f32, extent: usize| {
            let lo = (-r).max(-centre.floor() - 1.0);
            let hi = r.min(extent as f32 - centre.floor() + 1.0);
            (lo as i64, hi as i64)
        };
        let (x_lo, x_hi) = span(x, self.width);
        let (y_lo, y_hi) = span(y, self.height);
        for dy in y_lo..=y_hi {
            for dx in x_lo..=x_hi {
                if (dx as f32).hypot(dy as f32) <= radius {
                    self.plot(x + dx as f32, y + dy as f32, color, alpha);
                }
            }
        }
    }

    /// Draw a line using Bresenham's algorithm
    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgb, alpha: f32) {
        let (mut x, mut y) = (x0.round() as i32, y0.round() as i32);
        let (x1, y1) = (x1.round() as i32, y1.round() as i32);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        // Bounded so a wild projection can never spin here
        let max_steps = (self.width + self.height) * 4;
        for _ in 0..max_steps {
            self.plot(x as f32, y as f32, color, alpha);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Line whose alpha fades linearly from `alpha_start` to `alpha_end`
    pub fn fade_line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb, alpha_start: f32, alpha_end: f32) {
        let len = ((to.0 - from.0).powi(2) + (to.1 - from.1).powi(2)).sqrt();
        let steps = (len.ceil() as usize).clamp(1, self.width + self.height);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let alpha = alpha_start + (alpha_end - alpha_start) * t;
            self.plot(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t, color, alpha);
        }
    }

    /// Radial glow into the background layer, fading to nothing at `radius`
    pub fn glow(&mut self, x: f32, y: f32, radius: f32, color: Rgb, strength: f32) {
        if radius <= 0.0 || self.cols == 0 || self.rows == 0 {
            return;
        }
        let cell_x = x / DOTS_X as f32;
        let cell_y = y / DOTS_Y as f32;
        let reach_x = (radius / DOTS_X as f32).ceil() as i64;
        let reach_y = (radius / DOTS_Y as f32).ceil() as i64;
        let (cx0, cy0) = (cell_x.floor() as i64, cell_y.floor() as i64);

        for cy in (cy0 - reach_y).max(0)..=(cy0 + reach_y).min(self.rows as i64 - 1) {
            for cx in (cx0 - reach_x).max(0)..=(cx0 + reach_x).min(self.cols as i64 - 1) {
                let px = (cx as f32 + 0.5) * DOTS_X as f32;
                let py = (cy as f32 + 0.5) * DOTS_Y as f32;
                let d = ((px - x).powi(2) + (py - y).powi(2)).sqrt();
                if d < radius {
                    let k = (1.0 - d / radius) * strength;
                    let idx = cy as usize * self.cols + cx as usize;
                    self.glow[idx] = self.glow[idx].add(color.scale(k));
                }
            }
        }
    }

    /// Project and draw a connected 3D path
    pub fn stroke<I>(&mut self, projection: &Projection, points: I, style: Stroke)
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut prev: Option<(f32, f32, f32)> = None;
        for p in points {
            let Some(screen) = projection.project(p) else {
                prev = None;
                continue;
            };
            if let Some((px, py, pz)) = prev {
                let alpha = style.alpha_for((pz + p.z) * 0.5);
                self.line(px, py, screen.x, screen.y, style.color, alpha);
            }
            prev = Some((screen.x, screen.y, p.z));
        }
    }

    /// Project a point and draw it as a disc sized by perspective
    pub fn splat(&mut self, projection: &Projection, p: Vec3, radius: f32, color: Rgb, alpha: f32) {
        if let Some(screen) = projection.project(p) {
            let r = radius * projection.scale_at(screen.depth);
            self.disc(screen.x, screen.y, r, color, alpha);
        }
    }

    /// Compose the dots into braille cells inside `region`
    pub fn blit(&self, buf: &mut Buffer, region: Rect) {
        // Row 0-2 are sequential bits, row 3 jumps to bits 6,7
        const BITS: [[u8; 2]; 4] = [[0x01, 0x08], [0x02, 0x10], [0x04, 0x20], [0x40, 0x80]];

        let rows = self.rows.min(region.height as usize);
        let cols = self.cols.min(region.width as usize);
        for cy in 0..rows {
            for cx in 0..cols {
                let x = region.x as i32 + cx as i32;
                let y = region.y as i32 + cy as i32;

                let glow = self.glow[cy * self.cols + cx].clamped();
                if glow.max_channel() >= MIN_GLOW {
                    buf.set_bg(x, y, Some(glow.to_color()));
                }

                let mut pattern: u8 = 0;
                let mut strongest = Dot::default();
                for (row, bits) in BITS.iter().enumerate() {
                    for (col, bit) in bits.iter().enumerate() {
                        let dot = self.dots[(cy * DOTS_Y + row) * self.width + cx * DOTS_X + col];
                        if dot.alpha >= MIN_ALPHA {
                            pattern |= bit;
                            if dot.alpha > strongest.alpha {
                                strongest = dot;
                            }
                        }
                    }
                }

                if pattern != 0 {
                    let ch = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
                    let fg = strongest.color.scale(0.15 + 0.85 * strongest.alpha);
                    buf.set(x, y, ch, Some(fg.to_color()), strongest.alpha > 0.85);
                }
            }
        }
    }
}
