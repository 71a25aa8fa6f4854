//! Rotating globe effect with five interchangeable renderers.
//!
//! Every variant draws the same [`GlobeScene`] (markers, arcs, palette) in
//! its own style. The [`Globe`] effect owns one renderer, built the first
//! time the stage hands it a usable viewport.

pub mod cobe;
pub mod holo;
pub mod land;
pub mod markers;
pub mod particles;
pub mod pulse;
pub mod wireframe;

use crate::arc::build_arc_with;
use crate::canvas::{DotCanvas, Viewport};
use crate::colors::{Rgb, Theme};
use crate::config::GlobeConfig;
use crate::geometry::{spherical_to_cartesian, Vec3};
use crate::stage::{Effect, Pointer};
use crate::terminal::{Buffer, Rect};
use markers::{valid_arcs, ArcPair, Marker};
use rand::RngCore;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Radius every variant's sphere is built around
pub const GLOBE_RADIUS: f32 = 2.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GlobeVariant {
    #[default]
    Wireframe,
    Pulse,
    Particles,
    Holo,
    Cobe,
}

impl GlobeVariant {
    pub const ALL: [GlobeVariant; 5] = [
        GlobeVariant::Wireframe,
        GlobeVariant::Pulse,
        GlobeVariant::Particles,
        GlobeVariant::Holo,
        GlobeVariant::Cobe,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GlobeVariant::Wireframe => "wireframe",
            GlobeVariant::Pulse => "pulse",
            GlobeVariant::Particles => "particles",
            GlobeVariant::Holo => "holo",
            GlobeVariant::Cobe => "cobe",
        }
    }

    /// The variant after this one, wrapping around
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for GlobeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GlobeVariant {
    type Err = String;

    /// Accepts a variant name or its 1-based number
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<usize>() {
            return match n {
                1..=5 => Ok(Self::ALL[n - 1]),
                _ => Err(format!("globe variant number must be 1-5, got {}", n)),
            };
        }
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|v| v.name()).collect();
                format!("unknown globe variant '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// Data shared by every variant
#[derive(Clone, Debug)]
pub struct GlobeScene {
    pub markers: Vec<Marker>,
    pub arcs: Vec<ArcPair>,
    pub theme: Theme,
    /// Gradient used by the point-cloud globe
    pub color_a: Rgb,
    pub color_b: Rgb,
    /// Multiplier on every rotation rate
    pub speed: f32,
    custom_colors: bool,
}

impl GlobeScene {
    pub fn new(config: &GlobeConfig, theme: Theme) -> Self {
        let arcs = valid_arcs(&config.markers, &config.arcs);
        Self {
            markers: config.markers.clone(),
            arcs,
            theme,
            color_a: config.color_a.unwrap_or(theme.primary),
            color_b: config.color_b.unwrap_or(theme.secondary),
            speed: config.rotation_speed,
            custom_colors: config.color_a.is_some() || config.color_b.is_some(),
        }
    }

    /// Swap the palette; returns true when the point-cloud gradient changed
    pub fn set_theme(&mut self, theme: Theme) -> bool {
        self.theme = theme;
        if self.custom_colors {
            return false;
        }
        self.color_a = theme.primary;
        self.color_b = theme.secondary;
        true
    }

    /// Marker positions on a sphere of `radius`
    pub fn marker_points(&self, radius: f32) -> Vec<Vec3> {
        self.markers
            .iter()
            .map(|m| spherical_to_cartesian(m.lat, m.lon, radius))
            .collect()
    }

    /// Arc polylines between marker pairs, in object space
    pub fn arc_paths(&self, radius: f32, lift: f32, segments: usize) -> Vec<Vec<Vec3>> {
        let points = self.marker_points(radius);
        self.arcs
            .iter()
            .filter_map(|pair| Some((*points.get(pair.from)?, *points.get(pair.to)?)))
            .map(|(a, b)| build_arc_with(a, b, lift, segments))
            .collect()
    }
}

/// One drawing style for the globe
pub trait GlobeRenderer {
    /// `dt` and `elapsed` are already scaled by the scene speed
    fn update(&mut self, dt: f32, elapsed: f32);

    fn render(&self, canvas: &mut DotCanvas, scene: &GlobeScene);

    fn pointer(&mut self, _event: Pointer) {}
}

pub fn renderer_for(variant: GlobeVariant, scene: &GlobeScene, rng: &mut dyn RngCore) -> Box<dyn GlobeRenderer> {
    match variant {
        GlobeVariant::Wireframe => Box::new(wireframe::WireframeGlobe::new(scene, rng)),
        GlobeVariant::Pulse => Box::new(pulse::PulseGlobe::new(scene)),
        GlobeVariant::Particles => Box::new(particles::ParticleGlobe::new(scene, rng)),
        GlobeVariant::Holo => Box::new(holo::HoloGlobe::new(scene)),
        GlobeVariant::Cobe => Box::new(cobe::CobeGlobe::new()),
    }
}

/// Alpha for a point given which hemisphere it sits on
pub(crate) fn side_alpha(p: Vec3, front: f32, back: f32) -> f32 {
    if p.z >= 0.0 {
        front
    } else {
        back
    }
}

pub struct Globe {
    variant: GlobeVariant,
    scene: GlobeScene,
    renderer: Option<Box<dyn GlobeRenderer>>,
    viewport: Option<Viewport>,
    elapsed: f32,
    stale: bool,
}

impl Globe {
    pub fn new(variant: GlobeVariant, scene: GlobeScene) -> Self {
        Self {
            variant,
            scene,
            renderer: None,
            viewport: None,
            elapsed: 0.0,
            stale: false,
        }
    }

    pub fn variant(&self) -> GlobeVariant {
        self.variant
    }

    pub fn scene(&self) -> &GlobeScene {
        &self.scene
    }

    /// True once a renderer exists, i.e. after the first usable viewport
    pub fn is_ready(&self) -> bool {
        self.renderer.is_some() && self.viewport.is_some()
    }
}

impl Effect for Globe {
    fn name(&self) -> &'static str {
        "globe"
    }

    fn resize(&mut self, viewport: Viewport, rng: &mut dyn RngCore) {
        if viewport.is_empty() {
            self.viewport = None;
            return;
        }
        self.viewport = Some(viewport);
        if self.renderer.is_none() {
            debug!(variant = self.variant.name(), "building globe renderer");
            self.renderer = Some(renderer_for(self.variant, &self.scene, rng));
        }
    }

    fn update(&mut self, dt: f32, rng: &mut dyn RngCore) {
        if self.stale && self.renderer.is_some() {
            self.renderer = Some(renderer_for(self.variant, &self.scene, rng));
            self.stale = false;
        }
        let dt = dt * self.scene.speed;
        self.elapsed += dt;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.update(dt, self.elapsed);
        }
    }

    fn render(&self, buf: &mut Buffer, region: Rect) {
        let (Some(renderer), Some(_)) = (self.renderer.as_ref(), self.viewport) else {
            return;
        };
        let mut canvas = DotCanvas::new(Viewport::from(region));
        renderer.render(&mut canvas, &self.scene);
        canvas.blit(buf, region);
    }

    fn wants_pointer(&self) -> bool {
        self.variant == GlobeVariant::Cobe
    }

    fn pointer(&mut self, event: Pointer) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.pointer(event);
        }
    }

    fn set_theme(&mut self, theme: Theme) {
        // Only the point cloud bakes colours in at build time
        if self.scene.set_theme(theme) && self.variant == GlobeVariant::Particles {
            self.stale = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::THEMES;
    use crate::stage::PointerKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene() -> GlobeScene {
        GlobeScene::new(&GlobeConfig::default(), THEMES[0])
    }

    #[test]
    fn variants_parse_by_name_and_number() {
        assert_eq!("holo".parse::<GlobeVariant>(), Ok(GlobeVariant::Holo));
        assert_eq!("COBE".parse::<GlobeVariant>(), Ok(GlobeVariant::Cobe));
        assert_eq!("3".parse::<GlobeVariant>(), Ok(GlobeVariant::Particles));
        assert!("6".parse::<GlobeVariant>().is_err());
        assert!("spinning".parse::<GlobeVariant>().is_err());
    }

    #[test]
    fn next_cycles_through_every_variant() {
        let mut v = GlobeVariant::Wireframe;
        let mut seen = Vec::new();
        for _ in 0..GlobeVariant::ALL.len() {
            seen.push(v);
            v = v.next();
        }
        assert_eq!(v, GlobeVariant::Wireframe);
        assert_eq!(seen, GlobeVariant::ALL.to_vec());
    }

    #[test]
    fn default_scene_has_every_arc() {
        let scene = scene();
        assert_eq!(scene.arc_paths(2.02, crate::arc::DEFAULT_LIFT, 50).len(), 8);
    }

    #[test]
    fn nothing_renders_without_a_viewport() {
        for variant in GlobeVariant::ALL {
            let mut rng = StdRng::seed_from_u64(1);
            let mut globe = Globe::new(variant, scene());
            globe.update(0.1, &mut rng);
            let mut buf = Buffer::new(30, 12);
            let area = buf.area();
            globe.render(&mut buf, area);
            assert_eq!(buf.non_blank_cells(), 0, "{}", variant);

            globe.resize(Viewport::new(0, 12), &mut rng);
            let area = buf.area();
            globe.render(&mut buf, area);
            assert!(!globe.is_ready());
            assert_eq!(buf.non_blank_cells(), 0, "{}", variant);
        }
    }

    #[test]
    fn every_variant_draws_once_sized() {
        for variant in GlobeVariant::ALL {
            let mut rng = StdRng::seed_from_u64(2);
            let mut globe = Globe::new(variant, scene());
            globe.resize(Viewport::new(40, 20), &mut rng);
            globe.update(0.0, &mut rng);
            globe.update(0.5, &mut rng);
            let mut buf = Buffer::new(40, 20);
            let area = buf.area();
            globe.render(&mut buf, area);
            assert!(buf.non_blank_cells() > 20, "{} drew {}", variant, buf.non_blank_cells());
        }
    }

    #[test]
    fn only_the_cobe_globe_listens_to_the_pointer() {
        for variant in GlobeVariant::ALL {
            let globe = Globe::new(variant, scene());
            assert_eq!(globe.wants_pointer(), variant == GlobeVariant::Cobe);
        }
    }

    #[test]
    fn pointer_before_resize_is_harmless() {
        let mut globe = Globe::new(GlobeVariant::Cobe, scene());
        globe.pointer(Pointer { kind: PointerKind::Down, x: 1.0, y: 1.0, nx: 0.1, ny: 0.1 });
        assert!(!globe.is_ready());
    }

    #[test]
    fn theme_switch_recolours_the_point_cloud() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut globe = Globe::new(GlobeVariant::Particles, scene());
        globe.resize(Viewport::new(20, 10), &mut rng);
        globe.set_theme(THEMES[1]);
        assert_eq!(globe.scene().color_a, THEMES[1].primary);
        globe.update(0.1, &mut rng);
        assert!(globe.is_ready());
    }

    #[test]
    fn custom_colours_survive_a_theme_switch() {
        let config = GlobeConfig { color_a: Some(Rgb::WHITE), ..GlobeConfig::default() };
        let mut scene = GlobeScene::new(&config, THEMES[0]);
        assert!(!scene.set_theme(THEMES[2]));
        assert_eq!(scene.color_a, Rgb::WHITE);
    }
}
