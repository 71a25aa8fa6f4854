//! Slow floating motes that wander on a repeating keyframe path.

use crate::canvas::{DotCanvas, Viewport};
use crate::colors::Theme;
use crate::config::ParticlesConfig;
use crate::stage::Effect;
use crate::terminal::{Buffer, Rect};
use rand::{Rng, RngCore};
use tracing::debug;

const PATH_Y: [f32; 5] = [0.0, -30.0, 10.0, -20.0, 0.0];
const PATH_X: [f32; 5] = [0.0, 15.0, -10.0, 5.0, 0.0];
const OPACITY: [f32; 5] = [0.2, 0.6, 0.3, 0.5, 0.2];
/// Path offsets are authored in browser pixels
const PX_TO_DOTS: f32 = 0.25;

/// Linear interpolation across evenly spaced keyframes; `progress` wraps.
pub fn keyframe<const N: usize>(values: &[f32; N], progress: f32) -> f32 {
    if N == 1 {
        return values[0];
    }
    let p = progress.rem_euclid(1.0) * (N - 1) as f32;
    let i = (p.floor() as usize).min(N - 2);
    let t = p - i as f32;
    values[i] + (values[i + 1] - values[i]) * t
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mote {
    /// Home position as a fraction of the region
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Seconds per loop of the path
    pub duration: f32,
    /// Seconds before the mote starts moving
    pub delay: f32,
}

impl Mote {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            x: rng.gen(),
            y: rng.gen(),
            size: rng.gen_range(1.0..3.0),
            duration: rng.gen_range(15.0..35.0),
            delay: rng.gen_range(0.0..5.0),
        }
    }

    /// Position along the path at `time`, 0 until the delay has passed
    pub fn progress(&self, time: f32) -> f32 {
        if time <= self.delay {
            0.0
        } else {
            ((time - self.delay) / self.duration).fract()
        }
    }

    /// Offset in dots and opacity at `time`
    pub fn sample(&self, time: f32) -> (f32, f32, f32) {
        let p = self.progress(time);
        (
            keyframe(&PATH_X, p) * PX_TO_DOTS,
            keyframe(&PATH_Y, p) * PX_TO_DOTS,
            keyframe(&OPACITY, p),
        )
    }
}

pub struct FloatingParticles {
    count: usize,
    theme: Theme,
    motes: Vec<Mote>,
    viewport: Option<Viewport>,
    time: f32,
}

impl FloatingParticles {
    pub fn new(config: &ParticlesConfig, theme: Theme) -> Self {
        Self {
            count: config.count,
            theme,
            motes: Vec::new(),
            viewport: None,
            time: 0.0,
        }
    }

    pub fn motes(&self) -> &[Mote] {
        &self.motes
    }

    pub fn draw(&self, canvas: &mut DotCanvas) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        for (i, mote) in self.motes.iter().enumerate() {
            let (dx, dy, alpha) = mote.sample(self.time);
            let (x, y) = (mote.x * w + dx, mote.y * h + dy);
            let color = if i % 3 == 0 { self.theme.secondary } else { self.theme.primary };
            canvas.glow(x, y, mote.size * 2.5, color, alpha * 0.25);
            canvas.disc(x, y, mote.size * 0.4, color, alpha);
        }
    }
}

impl Effect for FloatingParticles {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn resize(&mut self, viewport: Viewport, rng: &mut dyn RngCore) {
        self.viewport = (!viewport.is_empty()).then_some(viewport);
        // Positions are relative, so motes survive a resize
        if self.motes.is_empty() {
            self.motes = (0..self.count).map(|_| Mote::random(rng)).collect();
            debug!(count = self.count, "motes placed");
        }
    }

    fn update(&mut self, dt: f32, _rng: &mut dyn RngCore) {
        self.time += dt;
    }

    fn render(&self, buf: &mut Buffer, region: Rect) {
        if self.viewport.is_none() {
            return;
        }
        let mut canvas = DotCanvas::new(Viewport::from(region));
        self.draw(&mut canvas);
        canvas.blit(buf, region);
    }

    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}
