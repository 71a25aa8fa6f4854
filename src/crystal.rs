//! Floating crystal: two nested wireframe octahedra inside a pair of
//! tilted rings, bobbing while the camera orbits.

use crate::canvas::{DotCanvas, Stroke, Viewport};
use crate::colors::{Rgb, Theme};
use crate::config::CrystalConfig;
use crate::geometry::{circle, ComposedTransform, Float, Projection, Rotation, Transform, Vec3};
use crate::stage::Effect;
use crate::terminal::{Buffer, Rect};
use rand::RngCore;
use std::f32::consts::{FRAC_PI_4, TAU};

const OUTER_RADIUS: f32 = 1.5;
const INNER_RADIUS: f32 = 0.8;
const CAMERA_DISTANCE: f32 = 5.0;
/// One full orbit every thirty seconds
const ORBIT_SPEED: f32 = TAU / 30.0;
const FLOAT: Float = Float::new(2.0, 0.5, 0.5);
const GROUP_TILT: Rotation = Rotation::new(FRAC_PI_4, FRAC_PI_4, 0.0);

/// Which local axis a ring spins about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RingAxis {
    X,
    Y,
}

struct Ring {
    radius: f32,
    speed: f32,
    axis: RingAxis,
}

const RINGS: [Ring; 2] = [
    Ring { radius: 2.2, speed: 0.2, axis: RingAxis::Y },
    Ring { radius: 2.6, speed: -0.15, axis: RingAxis::X },
];

/// Vertices of an octahedron with the given circumradius
pub fn octahedron(radius: f32) -> [Vec3; 6] {
    [
        Vec3::new(radius, 0.0, 0.0),
        Vec3::new(-radius, 0.0, 0.0),
        Vec3::new(0.0, radius, 0.0),
        Vec3::new(0.0, -radius, 0.0),
        Vec3::new(0.0, 0.0, radius),
        Vec3::new(0.0, 0.0, -radius),
    ]
}

/// The twelve edges: every vertex pair except opposite ones
pub fn octahedron_edges() -> impl Iterator<Item = (usize, usize)> {
    (0..6).flat_map(|a| ((a + 1)..6).map(move |b| (a, b))).filter(|&(a, b)| a / 2 != b / 2)
}

pub struct Crystal {
    speed: f32,
    theme: Theme,
    viewport: Option<Viewport>,
    elapsed: f32,
    outer: Rotation,
    ring_spin: [f32; 2],
    ring_path: [Vec<Vec3>; 2],
}

impl Crystal {
    pub fn new(config: &CrystalConfig, theme: Theme) -> Self {
        Self {
            speed: config.speed,
            theme,
            viewport: None,
            elapsed: 0.0,
            outer: Rotation::default(),
            ring_spin: [0.0; 2],
            ring_path: [circle(RINGS[0].radius, 96), circle(RINGS[1].radius, 96)],
        }
    }

    /// Inner octahedron sways instead of spinning
    pub fn inner_rotation(&self) -> Rotation {
        let t = self.elapsed * 0.5;
        Rotation::new(t.sin() * 0.5, t.cos() * 0.5, 0.0)
    }

    pub fn outer_rotation(&self) -> Rotation {
        self.outer
    }

    fn ring_rotation(&self, i: usize) -> Rotation {
        match RINGS[i].axis {
            RingAxis::X => Rotation::new(self.ring_spin[i], 0.0, 0.0),
            RingAxis::Y => Rotation::new(0.0, self.ring_spin[i], 0.0),
        }
    }

    fn orbit(&self) -> Transform {
        Transform::new(Rotation::new(0.0, -self.elapsed * ORBIT_SPEED, 0.0))
    }

    fn draw_octahedron(&self, canvas: &mut DotCanvas, projection: &Projection, radius: f32, t: ComposedTransform, style: Stroke) {
        let verts = octahedron(radius).map(|v| self.orbit().apply(t.apply(v)));
        for (a, b) in octahedron_edges() {
            canvas.stroke(projection, [verts[a], verts[b]], style);
        }
    }

    pub fn draw(&self, canvas: &mut DotCanvas) {
        let theme = self.theme;
        let projection = Projection::with_camera(canvas.width(), canvas.height(), CAMERA_DISTANCE, Projection::FOV_DEGREES);
        let float = FLOAT.transform(self.elapsed);

        if let Some(centre) = projection.project(float.offset) {
            let r = OUTER_RADIUS * projection.scale_at(centre.depth);
            canvas.glow(centre.x, centre.y, r * 1.4, theme.deep, 0.35);
        }

        for i in 0..RINGS.len() {
            let local = ComposedTransform::new(Transform::new(self.ring_rotation(i)), Transform::new(GROUP_TILT));
            let color = if i == 0 { theme.secondary } else { theme.accent };
            let points = self.ring_path[i]
                .iter()
                .map(|&p| self.orbit().apply(float.apply(local.apply(p))));
            canvas.stroke(&projection, points, Stroke::new(color, 0.5, 0.18));
        }

        let outer = ComposedTransform::new(Transform::new(self.outer), float);
        self.draw_octahedron(canvas, &projection, OUTER_RADIUS, outer, Stroke::new(theme.primary, 0.95, 0.35));

        let inner = ComposedTransform::new(Transform::new(self.inner_rotation()), float);
        let pale = theme.primary.lerp(Rgb::WHITE, 0.5);
        self.draw_octahedron(canvas, &projection, INNER_RADIUS, inner, Stroke::new(pale, 0.8, 0.5));
    }
}

impl Effect for Crystal {
    fn name(&self) -> &'static str {
        "crystal"
    }

    fn resize(&mut self, viewport: Viewport, _rng: &mut dyn RngCore) {
        self.viewport = (!viewport.is_empty()).then_some(viewport);
    }

    fn update(&mut self, dt: f32, _rng: &mut dyn RngCore) {
        let dt = dt * self.speed;
        self.elapsed += dt;
        self.outer.spin(0.0, 0.2 * dt, 0.1 * dt);
        for (spin, ring) in self.ring_spin.iter_mut().zip(&RINGS) {
            *spin = (*spin + ring.speed * dt).rem_euclid(TAU);
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::THEMES;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn octahedron_has_twelve_equal_edges() {
        let verts = octahedron(1.5);
        let edges: Vec<_> = octahedron_edges().collect();
        assert_eq!(edges.len(), 12);
        for (a, b) in edges {
            assert!((verts[a].distance(verts[b]) - 1.5 * 2.0_f32.sqrt()).abs() < 1e-5);
        }
    }

    #[test]
    fn outer_spins_and_inner_sways() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut crystal = Crystal::new(&CrystalConfig::default(), THEMES[0]);
        for _ in 0..100 {
            crystal.update(0.1, &mut rng);
        }
        assert!((crystal.outer_rotation().y - 2.0).abs() < 1e-3);
        assert!((crystal.outer_rotation().z - 1.0).abs() < 1e-3);
        let inner = crystal.inner_rotation();
        assert!(inner.x.abs() <= 0.5 && inner.y.abs() <= 0.5);
    }

    #[test]
    fn rings_turn_in_opposite_directions() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut crystal = Crystal::new(&CrystalConfig::default(), THEMES[0]);
        crystal.update(1.0, &mut rng);
        assert!((crystal.ring_spin[0] - 0.2).abs() < 1e-5);
        assert!((crystal.ring_spin[1] - (TAU - 0.15)).abs() < 1e-4);
    }

    #[test]
    fn draws_only_after_resize() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut crystal = Crystal::new(&CrystalConfig::default(), THEMES[0]);
        let mut buf = Buffer::new(40, 20);
        let area = buf.area();
        crystal.render(&mut buf, area);
        assert_eq!(buf.non_blank_cells(), 0);

        crystal.resize(Viewport::new(40, 20), &mut rng);
        crystal.update(0.3, &mut rng);
        let area = buf.area();
        crystal.render(&mut buf, area);
        assert!(buf.non_blank_cells() > 20);
    }
}
