//! Holographic globe: latitude rings, meridians and marker dots turning in
//! lockstep around a faint inner sphere.

use super::{side_alpha, GlobeRenderer, GlobeScene, GLOBE_RADIUS};
use crate::canvas::{DotCanvas, Stroke};
use crate::geometry::{latitude_ring, meridian, ComposedTransform, Float, Rotation, Transform, Vec3};

const LATITUDE_RINGS: usize = 8;
const MERIDIANS: usize = 12;
const SAMPLES: usize = 64;
const DOT_RADIUS: f32 = 2.03;
const INNER_RADIUS: f32 = 1.98;
const SPIN_Y: f32 = 0.1;
const FLOAT: Float = Float::new(1.2, 0.15, 0.2);

/// Latitudes of the rings, evenly spaced over -70..70
pub fn ring_latitudes() -> impl Iterator<Item = f32> {
    (0..LATITUDE_RINGS).map(|i| -70.0 + i as f32 * 140.0 / (LATITUDE_RINGS - 1) as f32)
}

pub struct HoloGlobe {
    rings: Vec<Vec<Vec3>>,
    meridians: Vec<Vec<Vec3>>,
    dots: Vec<Vec3>,
    rotation: Rotation,
    elapsed: f32,
}

impl HoloGlobe {
    pub fn new(scene: &GlobeScene) -> Self {
        Self {
            rings: ring_latitudes().map(|lat| latitude_ring(lat, GLOBE_RADIUS, SAMPLES)).collect(),
            meridians: (0..MERIDIANS)
                .map(|i| meridian(i as f32 * 360.0 / MERIDIANS as f32, GLOBE_RADIUS, SAMPLES))
                .collect(),
            dots: scene.marker_points(DOT_RADIUS),
            rotation: Rotation::default(),
            elapsed: 0.0,
        }
    }
}

impl GlobeRenderer for HoloGlobe {
    fn update(&mut self, dt: f32, elapsed: f32) {
        self.elapsed = elapsed;
        self.rotation.spin(0.0, SPIN_Y * dt, 0.0);
    }

    fn render(&self, canvas: &mut DotCanvas, scene: &GlobeScene) {
        let theme = scene.theme;
        let projection = canvas.projection();
        let float = FLOAT.transform(self.elapsed);
        // Rings, meridians and dots share one rotation
        let group = ComposedTransform::new(Transform::new(self.rotation), float);

        if let Some(centre) = projection.project(float.offset) {
            let r = INNER_RADIUS * projection.scale_at(centre.depth);
            canvas.glow(centre.x, centre.y, r, theme.deep, 0.25);
        }

        let rings = Stroke::new(theme.accent, 0.55, 0.12);
        for line in self.rings.iter().chain(&self.meridians) {
            canvas.stroke(&projection, line.iter().map(|&p| group.apply(p)), rings);
        }

        for &dot in &self.dots {
            let p = group.apply(dot);
            canvas.splat(&projection, p, 0.05, theme.accent, side_alpha(p, 1.0, 0.2));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::THEMES;
    use crate::config::GlobeConfig;

    #[test]
    fn rings_span_seventy_degrees_each_way() {
        let lats: Vec<f32> = ring_latitudes().collect();
        assert_eq!(lats.len(), 8);
        assert!((lats[0] + 70.0).abs() < 1e-4);
        assert!((lats[7] - 70.0).abs() < 1e-4);
        assert!((lats[1] - lats[0] - 20.0).abs() < 1e-4);
    }

    #[test]
    fn every_line_has_sixty_five_samples() {
        let scene = GlobeScene::new(&GlobeConfig::default(), THEMES[0]);
        let globe = HoloGlobe::new(&scene);
        assert_eq!(globe.rings.len(), LATITUDE_RINGS);
        assert_eq!(globe.meridians.len(), MERIDIANS);
        assert!(globe.rings.iter().chain(&globe.meridians).all(|l| l.len() == 65));
    }
}
