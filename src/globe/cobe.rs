//! Dotted-map globe: land drawn as a lattice of dots, sized city markers,
//! auto-rotation that pauses while the pointer drags it.

use super::land::land_points;
use super::{GlobeRenderer, GlobeScene, GLOBE_RADIUS};
use crate::canvas::DotCanvas;
use crate::colors::Rgb;
use crate::geometry::{spherical_to_cartesian, Rotation, Vec3};
use crate::stage::{Pointer, PointerKind};

/// Lattice samples over the whole sphere before the land test
pub const MAP_SAMPLES: usize = 6000;
/// Radians per second while nobody is dragging
pub const AUTO_ROTATE: f32 = 0.18;
/// Horizontal drag distance, in dots, that turns the globe one radian
pub const DRAG_DOTS_PER_RADIAN: f32 = 60.0;
const THETA: f32 = 0.25;
const DIFFUSE: f32 = 1.2;

/// Pointer drag bookkeeping
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Drag {
    anchor: Option<f32>,
    movement: f32,
}

impl Drag {
    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn press(&mut self, x: f32) {
        self.anchor = Some(x - self.movement);
    }

    pub fn motion(&mut self, x: f32) {
        if let Some(anchor) = self.anchor {
            self.movement = x - anchor;
        }
    }

    pub fn release(&mut self) {
        self.anchor = None;
    }

    /// Extra rotation contributed by dragging so far
    pub fn offset(&self) -> f32 {
        self.movement / DRAG_DOTS_PER_RADIAN
    }
}

pub struct CobeGlobe {
    land: Vec<Vec3>,
    phi: f32,
    drag: Drag,
}

impl Default for CobeGlobe {
    fn default() -> Self {
        Self::new()
    }
}

impl CobeGlobe {
    pub fn new() -> Self {
        Self {
            land: land_points(MAP_SAMPLES),
            phi: 0.0,
            drag: Drag::default(),
        }
    }

    /// Current spin including the drag offset
    pub fn phi(&self) -> f32 {
        self.phi + self.drag.offset()
    }

    pub fn drag(&self) -> &Drag {
        &self.drag
    }

    pub fn land_dots(&self) -> usize {
        self.land.len()
    }

    fn rotation(&self) -> Rotation {
        Rotation::new(THETA, self.phi(), 0.0)
    }
}

/// Lambert-ish shading for a point on the visible hemisphere
fn shade(p: Vec3) -> f32 {
    let facing = (p.z / GLOBE_RADIUS).clamp(0.0, 1.0);
    (0.15 + 0.85 * facing.powf(1.0 / DIFFUSE)).min(1.0)
}

impl GlobeRenderer for CobeGlobe {
    fn update(&mut self, dt: f32, _elapsed: f32) {
        if !self.drag.is_dragging() {
            self.phi += AUTO_ROTATE * dt;
        }
    }

    fn render(&self, canvas: &mut DotCanvas, scene: &GlobeScene) {
        let theme = scene.theme;
        let projection = canvas.projection();
        let rot = self.rotation();
        let land = theme.deep.lerp(theme.primary, 0.5);
        let marker = theme.primary.lerp(Rgb::WHITE, 0.35);

        if let Some(centre) = projection.project(Vec3::ZERO) {
            let r = GLOBE_RADIUS * projection.scale_at(centre.depth);
            canvas.glow(centre.x, centre.y, r * 1.3, theme.primary.lerp(theme.deep, 0.5), 0.3);
        }

        for &unit in &self.land {
            let p = rot.apply(unit * GLOBE_RADIUS);
            if p.z < 0.0 {
                continue;
            }
            if let Some(s) = projection.project(p) {
                canvas.plot(s.x, s.y, land, shade(p));
            }
        }

        for m in &scene.markers {
            let p = rot.apply(spherical_to_cartesian(m.lat, m.lon, GLOBE_RADIUS));
            if p.z >= 0.0 {
                canvas.splat(&projection, p, m.size * GLOBE_RADIUS, marker, 1.0);
            }
        }
    }

    fn pointer(&mut self, event: Pointer) {
        match event.kind {
            PointerKind::Down => self.drag.press(event.x),
            PointerKind::Move => self.drag.motion(event.x),
            PointerKind::Up | PointerKind::Leave => self.drag.release(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(kind: PointerKind, x: f32) -> Pointer {
        Pointer { kind, x, y: 10.0, nx: 0.5, ny: 0.5 }
    }

    #[test]
    fn auto_rotation_runs_when_idle() {
        let mut globe = CobeGlobe::new();
        globe.update(1.0, 1.0);
        assert!((globe.phi() - AUTO_ROTATE).abs() < 1e-6);
    }

    #[test]
    fn dragging_pauses_rotation_and_adds_an_offset() {
        let mut globe = CobeGlobe::new();
        globe.pointer(at(PointerKind::Down, 10.0));
        globe.update(1.0, 1.0);
        assert_eq!(globe.phi(), 0.0);

        globe.pointer(at(PointerKind::Move, 10.0 + DRAG_DOTS_PER_RADIAN));
        assert!((globe.phi() - 1.0).abs() < 1e-5);

        globe.pointer(at(PointerKind::Up, 0.0));
        assert!(!globe.drag().is_dragging());
        globe.update(1.0, 2.0);
        assert!((globe.phi() - 1.0 - AUTO_ROTATE).abs() < 1e-5);
    }

    #[test]
    fn a_second_drag_continues_from_the_first() {
        let mut drag = Drag::default();
        drag.press(0.0);
        drag.motion(30.0);
        drag.release();
        drag.press(100.0);
        drag.motion(130.0);
        assert!((drag.offset() - 60.0 / DRAG_DOTS_PER_RADIAN).abs() < 1e-6);
    }

    #[test]
    fn moves_without_a_press_do_nothing() {
        let mut globe = CobeGlobe::new();
        globe.pointer(at(PointerKind::Move, 500.0));
        assert_eq!(globe.phi(), 0.0);
        globe.pointer(at(PointerKind::Down, 5.0));
        globe.pointer(at(PointerKind::Leave, 50.0));
        assert!(!globe.drag().is_dragging());
    }

    #[test]
    fn lattice_keeps_only_land() {
        let globe = CobeGlobe::new();
        assert!(globe.land_dots() > 0 && globe.land_dots() < MAP_SAMPLES);
    }
}
