//! Raised connection arcs between two points on a sphere.

use crate::geometry::Vec3;

/// Segment count for regular arcs (51 samples)
pub const ARC_SEGMENTS: usize = 50;
/// Segment count for the brighter pulse arcs
pub const PULSE_ARC_SEGMENTS: usize = 60;
/// Control point radius as a multiple of the endpoint radius
pub const DEFAULT_LIFT: f32 = 3.2 / 2.02;

/// Build an arc from `a` to `b` sampled at [`ARC_SEGMENTS`] segments.
pub fn build_arc(a: Vec3, b: Vec3, lift: f32) -> Vec<Vec3> {
    build_arc_with(a, b, lift, ARC_SEGMENTS)
}

/// Least height of the middle sample above the higher endpoint, as a
/// fraction of that endpoint's radius
const MIN_CLEARANCE: f32 = 0.05;

/// Quadratic Bézier from `a` through a lifted midpoint to `b`.
///
/// The control point sits on the chord midpoint's direction at `|a| * lift`,
/// pushed further out when the endpoints are far apart so the middle sample
/// always clears both of them. Antipodal endpoints lift perpendicular to
/// the chord.
pub fn build_arc_with(a: Vec3, b: Vec3, lift: f32, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(1);
    let mid = (a + b) * 0.5;
    let reach = a.length().max(b.length());
    let up = lift_direction(a, b, mid, reach);
    // The t = 0.5 sample is (mid + control) / 2
    let radius = (a.length() * lift).max(2.0 * reach * (1.0 + MIN_CLEARANCE) - mid.dot(up));
    let control = up * radius;

    (0..=segments)
        .map(|i| quadratic_bezier(a, control, b, i as f32 / segments as f32))
        .collect()
}

fn lift_direction(a: Vec3, b: Vec3, mid: Vec3, reach: f32) -> Vec3 {
    if mid.length() > reach * 1e-3 {
        return mid.normalized();
    }
    let chord = b - a;
    let side = if chord.x.abs() < 0.9 * chord.length() {
        Vec3::new(1.0, 0.0, 0.0)
    } else {
        Vec3::new(0.0, 1.0, 0.0)
    };
    chord.cross(side).normalized()
}

fn quadratic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::spherical_to_cartesian;
    use crate::globe::markers::{ARC_PAIRS, MARKERS};

    const SURFACE: f32 = 2.02;

    #[test]
    fn arcs_start_and_end_on_their_markers() {
        for pair in ARC_PAIRS {
            let (from, to) = (&MARKERS[pair.from], &MARKERS[pair.to]);
            let a = spherical_to_cartesian(from.lat, from.lon, SURFACE);
            let b = spherical_to_cartesian(to.lat, to.lon, SURFACE);
            let arc = build_arc(a, b, DEFAULT_LIFT);
            assert_eq!(arc.len(), ARC_SEGMENTS + 1);
            assert!(arc[0].distance(a) < 1e-5);
            assert!(arc[ARC_SEGMENTS].distance(b) < 1e-5);
        }
    }

    #[test]
    fn arc_midpoint_is_lifted() {
        for pair in ARC_PAIRS {
            let (from, to) = (&MARKERS[pair.from], &MARKERS[pair.to]);
            let a = spherical_to_cartesian(from.lat, from.lon, SURFACE);
            let b = spherical_to_cartesian(to.lat, to.lon, SURFACE);
            let arc = build_arc_with(a, b, DEFAULT_LIFT, PULSE_ARC_SEGMENTS);
            let mid = arc[PULSE_ARC_SEGMENTS / 2].length();
            assert!(mid > a.length(), "{} -> {} not lifted", from.name, to.name);
            assert!(mid > b.length());
        }
    }

    #[test]
    fn degenerate_arcs_do_not_produce_nan() {
        let a = spherical_to_cartesian(10.0, 20.0, 2.0);
        let same = build_arc(a, a, DEFAULT_LIFT);
        assert!(same.iter().all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite()));

        let opposite = build_arc(a, -a, DEFAULT_LIFT);
        assert!(opposite.iter().all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite()));
        assert!(opposite[ARC_SEGMENTS / 2].length() > a.length());
        assert!(build_arc(Vec3::ZERO, Vec3::ZERO, DEFAULT_LIFT).iter().all(|p| *p == Vec3::ZERO));
    }

    #[test]
    fn far_apart_endpoints_still_arc_outward() {
        let a = spherical_to_cartesian(0.0, 0.0, SURFACE);
        let b = spherical_to_cartesian(0.0, 170.0, SURFACE);
        let arc = build_arc(a, b, DEFAULT_LIFT);
        assert!(arc[ARC_SEGMENTS / 2].length() > SURFACE * 1.04);
        assert!(arc[0].distance(a) < 1e-5);
        assert!(arc[ARC_SEGMENTS].distance(b) < 1e-5);
    }

    #[test]
    fn any_marker_pair_is_lifted() {
        for lat_a in (-80..=80).step_by(40) {
            for lon_b in (-180..180).step_by(15) {
                let a = spherical_to_cartesian(lat_a as f32, 0.0, SURFACE);
                let b = spherical_to_cartesian(-lat_a as f32 / 2.0, lon_b as f32, SURFACE);
                let arc = build_arc(a, b, DEFAULT_LIFT);
                let mid = arc[ARC_SEGMENTS / 2].length();
                assert!(mid > SURFACE, "({}, 0) -> ({}, {}) sags to {}", lat_a, -lat_a / 2, lon_b, mid);
            }
        }
    }
}
