//! Sparse globe with haloed markers and bright arcs carrying a travelling
//! pulse, wrapped in a thin atmosphere.

use super::{side_alpha, GlobeRenderer, GlobeScene, GLOBE_RADIUS};
use crate::arc::{DEFAULT_LIFT, PULSE_ARC_SEGMENTS};
use crate::canvas::{DotCanvas, Stroke};
use crate::geometry::{circle, sphere_wireframe, Rotation, Vec3};

const WIRE_SEGMENTS: (usize, usize) = (12, 8);
const DOT_RADIUS: f32 = 2.03;
const HALO_RADIUS: f32 = 0.12;
const ATMOSPHERE_RADIUS: f32 = 2.2;
const SPIN_Y: f32 = 0.12;
/// Arc lengths per second travelled by the pulse head
const PULSE_RATE: f32 = 0.4;

pub struct PulseGlobe {
    wire: Vec<Vec<Vec3>>,
    dots: Vec<Vec3>,
    arcs: Vec<Vec<Vec3>>,
    atmosphere: Vec<Vec3>,
    rotation: Rotation,
    elapsed: f32,
}

impl PulseGlobe {
    pub fn new(scene: &GlobeScene) -> Self {
        Self {
            wire: sphere_wireframe(GLOBE_RADIUS, WIRE_SEGMENTS.0, WIRE_SEGMENTS.1),
            dots: scene.marker_points(DOT_RADIUS),
            arcs: scene.arc_paths(DOT_RADIUS, DEFAULT_LIFT, PULSE_ARC_SEGMENTS),
            atmosphere: circle(ATMOSPHERE_RADIUS, 120),
            rotation: Rotation::default(),
            elapsed: 0.0,
        }
    }

    /// Sample index of the pulse head on arc `i`, staggered per arc
    fn pulse_index(&self, i: usize, samples: usize) -> usize {
        let phase = (self.elapsed * PULSE_RATE + i as f32 * 0.137).fract();
        ((phase * samples as f32) as usize).min(samples.saturating_sub(1))
    }
}

impl GlobeRenderer for PulseGlobe {
    fn update(&mut self, dt: f32, elapsed: f32) {
        self.elapsed = elapsed;
        self.rotation.spin(0.0, SPIN_Y * dt, 0.0);
    }

    fn render(&self, canvas: &mut DotCanvas, scene: &GlobeScene) {
        let theme = scene.theme;
        let projection = canvas.projection();
        let rot = self.rotation;

        if let Some(centre) = projection.project(Vec3::ZERO) {
            let r = ATMOSPHERE_RADIUS * projection.scale_at(centre.depth);
            canvas.glow(centre.x, centre.y, r * 1.15, theme.secondary, 0.18);
        }
        canvas.stroke(&projection, self.atmosphere.iter().copied(), Stroke::new(theme.secondary, 0.3, 0.3));

        let wire = Stroke::new(theme.primary, 0.2, 0.06);
        for line in &self.wire {
            canvas.stroke(&projection, line.iter().map(|&p| rot.apply(p)), wire);
        }

        let arc = Stroke::new(theme.secondary, 0.9, 0.25);
        for (i, path) in self.arcs.iter().enumerate() {
            canvas.stroke(&projection, path.iter().map(|&p| rot.apply(p)), arc);
            if path.is_empty() {
                continue;
            }
            let head = rot.apply(path[self.pulse_index(i, path.len())]);
            canvas.splat(&projection, head, 0.05, theme.accent, side_alpha(head, 1.0, 0.3));
        }

        for &dot in &self.dots {
            let p = rot.apply(dot);
            canvas.splat(&projection, p, HALO_RADIUS, theme.primary, side_alpha(p, 0.2, 0.06));
            canvas.splat(&projection, p, 0.04, theme.accent, side_alpha(p, 1.0, 0.3));
        }
    }
}
