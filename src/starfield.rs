//! Layered starfield with nebula glows, pointer parallax and shooting stars.
//!
//! Stars live in dot coordinates. Nearer layers hold fewer, larger, brighter
//! stars that drift faster, which sells the depth. Stars that leave the
//! field wrap to the opposite edge in their own layer, so layer populations
//! never change between resizes.

use crate::canvas::{DotCanvas, Viewport};
use crate::colors::Rgb;
use crate::config::StarfieldConfig;
use crate::stage::{Effect, Pointer, PointerKind};
use crate::terminal::{Buffer, Rect};
use rand::{Rng, RngCore};
use std::f32::consts::TAU;
use tracing::{debug, trace};

pub struct StarLayer {
    pub count: usize,
    pub min_size: f32,
    pub max_size: f32,
    /// Upward drift in dots per 60 Hz frame
    pub speed: f32,
    pub opacity: f32,
}

pub const STAR_LAYERS: [StarLayer; 3] = [
    StarLayer { count: 180, min_size: 0.3, max_size: 1.0, speed: 0.08, opacity: 0.4 },
    StarLayer { count: 120, min_size: 0.8, max_size: 1.8, speed: 0.15, opacity: 0.6 },
    StarLayer { count: 60, min_size: 1.2, max_size: 2.5, speed: 0.25, opacity: 0.85 },
];

pub const STAR_COLORS: [Rgb; 6] = [
    Rgb::new(1.0, 1.0, 1.0),
    Rgb::new(0.784, 0.839, 1.0),
    Rgb::new(0.667, 0.733, 1.0),
    Rgb::new(0.910, 0.878, 1.0),
    Rgb::new(1.0, 0.894, 0.769),
    Rgb::new(1.0, 0.824, 0.631),
];

struct Nebula {
    x: f32,
    y: f32,
    /// Radius as a fraction of the larger field side
    radius: f32,
    color: Rgb,
    alpha: f32,
}

const NEBULAE: [Nebula; 4] = [
    Nebula { x: 0.2, y: 0.3, radius: 0.23, color: Rgb::new(0.545, 0.361, 0.965), alpha: 0.06 },
    Nebula { x: 0.75, y: 0.6, radius: 0.27, color: Rgb::new(0.024, 0.714, 0.831), alpha: 0.04 },
    Nebula { x: 0.5, y: 0.8, radius: 0.20, color: Rgb::new(0.486, 0.227, 0.929), alpha: 0.05 },
    Nebula { x: 0.85, y: 0.15, radius: 0.16, color: Rgb::new(0.576, 0.200, 0.918), alpha: 0.04 },
];

// Terminal backgrounds need far more than a browser's 4-6 % tint to show
const NEBULA_GAIN: f32 = 4.0;
const NEBULA_PARALLAX: f32 = 4.0;
const STAR_PARALLAX: f32 = 2.0;
const EDGE_MARGIN: f32 = 5.0;
const REFERENCE_FPS: f32 = 60.0;
const SWAY_FREQUENCY: f32 = 0.1;
const SWAY_AMPLITUDE: f32 = 0.03;
const GLOW_MIN_SIZE: f32 = 1.5;

// Shooting stars move in dots per frame; browser pixels are much finer
const SHOOTING_VELOCITY_SCALE: f32 = 0.3;
const SHOOTING_TAIL: f32 = 30.0 * 0.3;
const SHOOTING_FADE_IN: f32 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub layer: usize,
    pub size: f32,
    pub base_opacity: f32,
    pub twinkle_speed: f32,
    pub twinkle_offset: f32,
    pub color: Rgb,
}

impl Star {
    fn random<R: Rng + ?Sized>(rng: &mut R, layer: usize, width: f32, height: f32) -> Self {
        let tier = &STAR_LAYERS[layer];
        Self {
            x: rng.gen::<f32>() * width,
            y: rng.gen::<f32>() * height,
            layer,
            size: tier.min_size + rng.gen::<f32>() * (tier.max_size - tier.min_size),
            base_opacity: tier.opacity * (0.5 + rng.gen::<f32>() * 0.5),
            twinkle_speed: 0.5 + rng.gen::<f32>() * 2.5,
            twinkle_offset: rng.gen::<f32>() * TAU,
            color: STAR_COLORS[rng.gen_range(0..STAR_COLORS.len())],
        }
    }

    /// Opacity after the twinkle oscillation at `time` seconds
    pub fn opacity(&self, time: f32) -> f32 {
        let twinkle = 0.5 + 0.5 * (time * self.twinkle_speed + self.twinkle_offset).sin();
        self.base_opacity * (0.3 + twinkle * 0.7)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShootingStar {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Frames lived so far
    pub life: u32,
    pub max_life: f32,
    pub size: f32,
}

impl ShootingStar {
    pub fn new(x: f32, y: f32, vx: f32, vy: f32, max_life: f32, size: f32) -> Self {
        Self { x, y, vx, vy, life: 0, max_life, size }
    }

    /// Fraction of the lifetime used, 0..=1 while the star is alive
    pub fn progress(&self) -> f32 {
        (self.life as f32 / self.max_life).clamp(0.0, 1.0)
    }

    /// Fast fade in over the first tenth, then a long fade out
    pub fn opacity(&self) -> f32 {
        let p = self.progress();
        if p < SHOOTING_FADE_IN {
            p / SHOOTING_FADE_IN
        } else {
            1.0 - (p - SHOOTING_FADE_IN) / (1.0 - SHOOTING_FADE_IN)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.life as f32 > self.max_life
    }

    fn step(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.life += 1;
    }
}

pub struct Starfield {
    config: StarfieldConfig,
    width: f32,
    height: f32,
    stars: Vec<Star>,
    shooting: Vec<ShootingStar>,
    mouse: (f32, f32),
    time: f32,
    ready: bool,
}

impl Starfield {
    pub fn new(config: StarfieldConfig) -> Self {
        Self {
            config,
            width: 0.0,
            height: 0.0,
            stars: Vec::new(),
            shooting: Vec::new(),
            mouse: (0.5, 0.5),
            time: 0.0,
            ready: false,
        }
    }

    /// Throw away every star and build a fresh field for the given size
    pub fn regenerate<R: Rng + ?Sized>(&mut self, width: f32, height: f32, rng: &mut R) {
        self.width = width;
        self.height = height;
        self.stars.clear();
        for (layer, tier) in STAR_LAYERS.iter().enumerate() {
            for _ in 0..self.layer_target(tier) {
                self.stars.push(Star::random(rng, layer, width, height));
            }
        }
        self.ready = width > 0.0 && height > 0.0;
        debug!(width, height, stars = self.stars.len(), "starfield regenerated");
    }

    fn layer_target(&self, tier: &StarLayer) -> usize {
        (tier.count as f32 * self.config.density.max(0.0)).round() as usize
    }

    /// One frame: drift and twinkle the stars, then run the shooting stars
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.time += dt;
        self.drift_stars(dt, rng);
        if self.ready {
            self.maybe_spawn(rng);
        }
        self.advance_shooting_stars();
    }

    fn drift_stars<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        let (w, h, time) = (self.width, self.height, self.time);
        let frames = dt * REFERENCE_FPS;
        for star in &mut self.stars {
            star.y -= STAR_LAYERS[star.layer].speed * frames;
            star.x += (time * SWAY_FREQUENCY + star.twinkle_offset).sin() * SWAY_AMPLITUDE * frames;

            if star.y < -EDGE_MARGIN {
                star.y = h + EDGE_MARGIN;
                star.x = rng.gen::<f32>() * w;
            }
            if star.x < -EDGE_MARGIN {
                star.x = w + EDGE_MARGIN;
            } else if star.x > w + EDGE_MARGIN {
                star.x = -EDGE_MARGIN;
            }
        }
    }

    /// Roll the per-frame spawn chance; returns true if a star was spawned
    pub fn maybe_spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let chance = self.config.shooting_star_chance.clamp(0.0, 1.0);
        if chance > 0.0 && rng.gen_bool(chance) {
            self.spawn_shooting_star(rng);
            true
        } else {
            false
        }
    }

    /// Launch a shooting star from the upper left or upper right
    pub fn spawn_shooting_star<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (w, h) = (self.width, self.height);
        let from_left = rng.gen_bool(0.5);
        let x = if from_left {
            rng.gen::<f32>() * w * 0.3
        } else {
            w * 0.7 + rng.gen::<f32>() * w * 0.3
        };
        let y = rng.gen::<f32>() * h * 0.4;
        let speed = (6.0 + rng.gen::<f32>() * 4.0) * SHOOTING_VELOCITY_SCALE;
        let vx = if from_left { speed } else { -speed };
        let vy = (3.0 + rng.gen::<f32>() * 3.0) * SHOOTING_VELOCITY_SCALE;
        let max_life = 40.0 + rng.gen::<f32>() * 30.0;
        let size = 1.5 + rng.gen::<f32>();

        trace!(x, y, vx, vy, max_life, "shooting star");
        self.shooting.push(ShootingStar::new(x, y, vx, vy, max_life, size));
    }

    pub fn push_shooting_star(&mut self, star: ShootingStar) {
        self.shooting.push(star);
    }

    /// Integrate every shooting star one frame and drop the expired ones
    pub fn advance_shooting_stars(&mut self) {
        self.shooting.retain_mut(|star| {
            star.step();
            !star.is_expired()
        });
    }

    /// Pointer position normalized to the field
    pub fn set_pointer(&mut self, nx: f32, ny: f32) {
        self.mouse = (nx, ny);
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn shooting_stars(&self) -> &[ShootingStar] {
        &self.shooting
    }

    pub fn layer_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for star in &self.stars {
            counts[star.layer] += 1;
        }
        counts
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Pointer offset in -1..1 around the centre
    fn parallax(&self) -> (f32, f32) {
        ((self.mouse.0 - 0.5) * 2.0, (self.mouse.1 - 0.5) * 2.0)
    }

    pub fn draw(&self, canvas: &mut DotCanvas) {
        let (w, h) = (self.width, self.height);
        let (mx, my) = self.parallax();

        let extent = w.max(h);
        for neb in &NEBULAE {
            canvas.glow(
                neb.x * w + mx * NEBULA_PARALLAX,
                neb.y * h + my * NEBULA_PARALLAX,
                neb.radius * extent,
                neb.color,
                neb.alpha * NEBULA_GAIN,
            );
        }

        for star in &self.stars {
            let depth = (star.layer + 1) as f32;
            let x = star.x + mx * depth * STAR_PARALLAX;
            let y = star.y + my * depth * STAR_PARALLAX;
            let opacity = star.opacity(self.time);
            if star.size > GLOW_MIN_SIZE {
                canvas.glow(x, y, star.size * 3.0, star.color, opacity * 0.3);
            }
            canvas.disc(x, y, star.size / 2.0, star.color, opacity);
        }

        for star in &self.shooting {
            let alpha = star.opacity();
            let tail = (star.x - star.vx * SHOOTING_TAIL, star.y - star.vy * SHOOTING_TAIL);
            canvas.fade_line((star.x, star.y), tail, Rgb::WHITE, alpha * 0.9, 0.0);
            canvas.disc(star.x, star.y, star.size * 0.4, Rgb::WHITE, alpha);
        }
    }
}

impl Effect for Starfield {
    fn name(&self) -> &'static str {
        "starfield"
    }

    fn resize(&mut self, viewport: Viewport, rng: &mut dyn RngCore) {
        let (w, h) = viewport.dots();
        self.regenerate(w as f32, h as f32, rng);
    }

    fn update(&mut self, dt: f32, rng: &mut dyn RngCore) {
        self.advance(dt, rng);
    }

    fn render(&self, buf: &mut Buffer, region: Rect) {
        if !self.ready {
            return;
        }
        let mut canvas = DotCanvas::new(Viewport::from(region));
        self.draw(&mut canvas);
        canvas.blit(buf, region);
    }

    fn wants_pointer(&self) -> bool {
        true
    }

    fn pointer(&mut self, event: Pointer) {
        if event.kind == PointerKind::Move {
            self.set_pointer(event.nx, event.ny);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field(seed: u64) -> (Starfield, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sf = Starfield::new(StarfieldConfig::default());
        sf.regenerate(160.0, 96.0, &mut rng);
        (sf, rng)
    }

    #[test]
    fn layers_are_populated_on_resize() {
        let (sf, _) = field(1);
        assert_eq!(sf.layer_counts(), [180, 120, 60]);
        for star in sf.stars() {
            let tier = &STAR_LAYERS[star.layer];
            assert!(star.size >= tier.min_size && star.size <= tier.max_size);
            assert!(star.base_opacity <= tier.opacity);
        }
    }

    #[test]
    fn wrap_around_preserves_layer_counts() {
        let (mut sf, mut rng) = field(2);
        let layers: Vec<usize> = sf.stars().iter().map(|s| s.layer).collect();
        for i in 0..5000 {
            let dt = if i % 100 == 0 { 0.25 } else { 1.0 / 60.0 };
            sf.advance(dt, &mut rng);
            assert_eq!(sf.layer_counts(), [180, 120, 60]);
        }
        let after: Vec<usize> = sf.stars().iter().map(|s| s.layer).collect();
        assert_eq!(layers, after);
        for star in sf.stars() {
            assert!(star.y >= -EDGE_MARGIN - 1.0 && star.y <= 96.0 + EDGE_MARGIN);
            assert!(star.x >= -EDGE_MARGIN - 1.0 && star.x <= 160.0 + EDGE_MARGIN + 1.0);
        }
    }

    #[test]
    fn shooting_star_lives_until_it_exceeds_max_life() {
        let mut sf = Starfield::new(StarfieldConfig { shooting_star_chance: 0.0, ..Default::default() });
        sf.push_shooting_star(ShootingStar::new(10.0, 10.0, 2.0, 1.0, 40.0, 2.0));

        for _ in 0..39 {
            sf.advance_shooting_stars();
        }
        assert_eq!(sf.shooting_stars().len(), 1);
        assert_eq!(sf.shooting_stars()[0].life, 39);

        sf.advance_shooting_stars();
        sf.advance_shooting_stars();
        assert!(sf.shooting_stars().is_empty());
    }

    #[test]
    fn shooting_star_is_removed_on_the_first_frame_past_max_life() {
        let mut sf = Starfield::new(StarfieldConfig { shooting_star_chance: 0.0, ..Default::default() });
        sf.push_shooting_star(ShootingStar::new(0.0, 0.0, 1.0, 1.0, 52.5, 2.0));
        let mut frames = 0;
        let mut last_life = 0;
        while let Some(star) = sf.shooting_stars().first() {
            assert!(frames == 0 || star.life > last_life);
            assert!((0.0..=1.0).contains(&star.progress()));
            assert!(star.life as f32 <= star.max_life);
            last_life = star.life;
            sf.advance_shooting_stars();
            frames += 1;
        }
        assert_eq!(frames, 53);
    }

    #[test]
    fn shooting_star_opacity_ramps_up_then_down() {
        let mut star = ShootingStar::new(0.0, 0.0, 1.0, 1.0, 100.0, 2.0);
        assert_eq!(star.opacity(), 0.0);
        star.life = 5;
        assert!((star.opacity() - 0.5).abs() < 1e-5);
        star.life = 10;
        assert!((star.opacity() - 1.0).abs() < 1e-5);
        star.life = 55;
        assert!((star.opacity() - 0.5).abs() < 1e-5);
        star.life = 100;
        assert!(star.opacity().abs() < 1e-5);
    }

    #[test]
    fn spawned_stars_enter_from_the_upper_edges() {
        let (mut sf, mut rng) = field(3);
        for _ in 0..200 {
            sf.spawn_shooting_star(&mut rng);
        }
        for star in sf.shooting_stars() {
            assert!(star.y <= 96.0 * 0.4);
            assert!(star.vy > 0.0);
            if star.vx > 0.0 {
                assert!(star.x <= 160.0 * 0.3);
            } else {
                assert!(star.x >= 160.0 * 0.7);
            }
            assert!((40.0..=70.0).contains(&star.max_life));
        }
    }

    #[test]
    fn shooting_stars_stay_self_limiting() {
        let (mut sf, mut rng) = field(4);
        let mut peak = 0;
        for _ in 0..20_000 {
            sf.advance(1.0 / 60.0, &mut rng);
            peak = peak.max(sf.shooting_stars().len());
        }
        // 0.003 spawns per frame times at most 71 frames of life
        assert!(peak < 10, "peak {}", peak);
    }

    #[test]
    fn pointer_does_not_touch_the_simulation() {
        let (mut a, mut rng_a) = field(5);
        let (mut b, mut rng_b) = field(5);
        b.set_pointer(0.9, 0.1);
        for _ in 0..300 {
            a.advance(1.0 / 60.0, &mut rng_a);
            b.advance(1.0 / 60.0, &mut rng_b);
        }
        assert_eq!(a.stars(), b.stars());
        assert_eq!(a.shooting_stars(), b.shooting_stars());
    }

    #[test]
    fn nothing_renders_before_the_first_resize() {
        let sf = Starfield::new(StarfieldConfig::default());
        let mut buf = Buffer::new(20, 10);
        let area = buf.area();
        sf.render(&mut buf, area);
        assert_eq!(buf.non_blank_cells(), 0);
    }

    #[test]
    fn renders_after_resize() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut sf = Starfield::new(StarfieldConfig::default());
        Effect::resize(&mut sf, Viewport::new(40, 12), &mut rng);
        let mut buf = Buffer::new(40, 12);
        let area = buf.area();
        sf.render(&mut buf, area);
        assert!(buf.non_blank_cells() > 0);
    }

    #[test]
    fn density_scales_every_layer() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut sf = Starfield::new(StarfieldConfig { density: 0.5, ..Default::default() });
        sf.regenerate(100.0, 100.0, &mut rng);
        assert_eq!(sf.layer_counts(), [90, 60, 30]);
    }
}
