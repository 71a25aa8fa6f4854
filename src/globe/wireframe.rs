//! Wireframe globe with marker dots, lifted arcs, a wobbling ring and a
//! slow halo of background points.

use super::{side_alpha, GlobeRenderer, GlobeScene, GLOBE_RADIUS};
use crate::arc::{ARC_SEGMENTS, DEFAULT_LIFT};
use crate::canvas::{DotCanvas, Stroke};
use crate::geometry::{circle, sphere_wireframe, ComposedTransform, Float, Rotation, Transform, Vec3};
use crate::pointcloud::{generate_point_cloud, PointCloud};
use rand::RngCore;
use std::f32::consts::FRAC_PI_2;

const WIRE_SEGMENTS: (usize, usize) = (16, 12);
const DOT_RADIUS: f32 = 2.02;
const RING_RADIUS: f32 = 2.8;
const HALO_POINTS: usize = 200;
const HALO_SPIN: f32 = 0.02;
const SPIN_Y: f32 = 0.15;
const SPIN_X: f32 = 0.03;
const FLOAT: Float = Float::new(1.5, 0.2, 0.3);

pub struct WireframeGlobe {
    wire: Vec<Vec<Vec3>>,
    dots: Vec<Vec3>,
    arcs: Vec<Vec<Vec3>>,
    ring: Vec<Vec3>,
    halo: PointCloud,
    rotation: Rotation,
    halo_rotation: Rotation,
    elapsed: f32,
}

impl WireframeGlobe {
    pub fn new(scene: &GlobeScene, rng: &mut dyn RngCore) -> Self {
        let theme = scene.theme;
        Self {
            wire: sphere_wireframe(GLOBE_RADIUS, WIRE_SEGMENTS.0, WIRE_SEGMENTS.1),
            dots: scene.marker_points(DOT_RADIUS),
            arcs: scene.arc_paths(DOT_RADIUS, DEFAULT_LIFT, ARC_SEGMENTS),
            ring: circle(RING_RADIUS, 96),
            halo: generate_point_cloud(rng, HALO_POINTS, 3.0..=5.0, theme.primary, theme.accent),
            rotation: Rotation::default(),
            halo_rotation: Rotation::default(),
            elapsed: 0.0,
        }
    }

    fn ring_transform(&self) -> Transform {
        let t = self.elapsed;
        Transform::new(Rotation::new(FRAC_PI_2 + (t * 0.3).sin() * 0.1, 0.0, t * 0.1))
    }
}

impl GlobeRenderer for WireframeGlobe {
    fn update(&mut self, dt: f32, elapsed: f32) {
        self.elapsed = elapsed;
        self.rotation.spin(SPIN_X * dt, SPIN_Y * dt, 0.0);
        self.halo_rotation.spin(0.0, HALO_SPIN * dt, 0.0);
    }

    fn render(&self, canvas: &mut DotCanvas, scene: &GlobeScene) {
        let theme = scene.theme;
        let projection = canvas.projection();
        let float = FLOAT.transform(self.elapsed);
        let globe = ComposedTransform::new(Transform::new(self.rotation), float);

        for (p, color) in self.halo.rotated(self.halo_rotation) {
            if let Some(s) = projection.project(p) {
                canvas.plot(s.x, s.y, color, 0.35);
            }
        }

        if let Some(centre) = projection.project(float.offset) {
            let r = GLOBE_RADIUS * projection.scale_at(centre.depth);
            canvas.glow(centre.x, centre.y, r * 1.2, theme.deep, 0.3);
        }

        let wire = Stroke::new(theme.primary, 0.35, 0.1);
        for line in &self.wire {
            canvas.stroke(&projection, line.iter().map(|&p| globe.apply(p)), wire);
        }

        let arc = Stroke::new(theme.primary.lerp(theme.accent, 0.5), 0.6, 0.15);
        for path in &self.arcs {
            canvas.stroke(&projection, path.iter().map(|&p| globe.apply(p)), arc);
        }

        for &dot in &self.dots {
            let p = globe.apply(dot);
            canvas.splat(&projection, p, 0.04, theme.accent, side_alpha(p, 1.0, 0.25));
        }

        let ring = ComposedTransform::new(self.ring_transform(), float);
        canvas.stroke(
            &projection,
            self.ring.iter().map(|&p| ring.apply(p)),
            Stroke::new(theme.secondary, 0.45, 0.2),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Viewport;
    use crate::colors::THEMES;
    use crate::config::GlobeConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn halo_sits_outside_the_globe() {
        let scene = GlobeScene::new(&GlobeConfig::default(), THEMES[0]);
        let globe = WireframeGlobe::new(&scene, &mut StdRng::seed_from_u64(1));
        assert_eq!(globe.halo.len(), HALO_POINTS);
        assert!(globe.halo.positions().iter().all(|p| p.length() >= 3.0 - 1e-4));
        assert_eq!(globe.dots.len(), scene.markers.len());
        assert_eq!(globe.arcs.len(), scene.arcs.len());
    }

    #[test]
    fn spins_at_the_configured_rates() {
        let scene = GlobeScene::new(&GlobeConfig::default(), THEMES[0]);
        let mut globe = WireframeGlobe::new(&scene, &mut StdRng::seed_from_u64(1));
        globe.update(2.0, 2.0);
        assert!((globe.rotation.y - 0.3).abs() < 1e-5);
        assert!((globe.rotation.x - 0.06).abs() < 1e-5);
        assert!((globe.halo_rotation.y - 0.04).abs() < 1e-5);
    }

    #[test]
    fn ring_wobbles_around_a_quarter_turn() {
        let scene = GlobeScene::new(&GlobeConfig::default(), THEMES[0]);
        let mut globe = WireframeGlobe::new(&scene, &mut StdRng::seed_from_u64(1));
        for t in [0.0, 1.0, 5.0, 20.0] {
            globe.update(0.0, t);
            let tilt = globe.ring_transform().rotation.x;
            assert!((tilt - FRAC_PI_2).abs() <= 0.1 + 1e-6);
        }
        let mut canvas = DotCanvas::new(Viewport::new(30, 15));
        globe.render(&mut canvas, &scene);
        assert!(canvas.lit_dots() > 0);
    }
}
