//! Sphere geometry shared by every globe and the crystal.
//!
//! Axis convention (used everywhere, never redefined locally): `y` is up,
//! `+z` points towards the viewer, and the frame is right-handed.

use std::f32::consts::{PI, TAU};
use std::ops::{Add, Mul, Neg, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len <= f32::EPSILON {
            Vec3::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (self - other).length()
    }

    pub fn rotate_x(self, angle: f32) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(self.x, self.y * c - self.z * s, self.y * s + self.z * c)
    }

    pub fn rotate_y(self, angle: f32) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(self.x * c + self.z * s, self.y, -self.x * s + self.z * c)
    }

    pub fn rotate_z(self, angle: f32) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(self.x * c - self.y * s, self.x * s + self.y * c, self.z)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, k: f32) -> Vec3 {
        Vec3::new(self.x * k, self.y * k, self.z * k)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Place a geographic coordinate on a sphere centred at the origin.
///
/// Latitude runs from +90 (north pole, `+y`) to -90; longitude is measured
/// from the reference meridian, which lands on `+x`. `lon = -90` faces the
/// viewer (`+z`).
pub fn spherical_to_cartesian(lat_deg: f32, lon_deg: f32, radius: f32) -> Vec3 {
    let phi = (90.0 - lat_deg).to_radians();
    let theta = (lon_deg + 180.0).to_radians();
    Vec3::new(
        -(radius * phi.sin() * theta.cos()),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Inverse of [`spherical_to_cartesian`], returning `(lat_deg, lon_deg)`
/// with longitude in -180..180.
pub fn cartesian_to_spherical(v: Vec3) -> (f32, f32) {
    let r = v.length();
    if r <= f32::EPSILON {
        return (0.0, 0.0);
    }
    let lat = 90.0 - (v.y / r).clamp(-1.0, 1.0).acos().to_degrees();
    let theta = v.z.atan2(-v.x).to_degrees();
    let mut lon = theta - 180.0;
    if lon < -180.0 {
        lon += 360.0;
    }
    (lat, lon)
}

/// Euler rotation applied z first, then y, then x.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Rotation {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn apply(&self, p: Vec3) -> Vec3 {
        p.rotate_z(self.z).rotate_y(self.y).rotate_x(self.x)
    }

    /// Advance each axis, keeping angles bounded.
    pub fn spin(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x = (self.x + dx).rem_euclid(TAU);
        self.y = (self.y + dy).rem_euclid(TAU);
        self.z = (self.z + dz).rem_euclid(TAU);
    }
}

/// A rigid transform: rotate about the origin, then translate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub rotation: Rotation,
    pub offset: Vec3,
}

impl Transform {
    pub fn new(rotation: Rotation) -> Self {
        Self { rotation, offset: Vec3::ZERO }
    }

    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.rotation.apply(p) + self.offset
    }
}

/// Two transforms applied in sequence, for nested groups.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ComposedTransform {
    pub inner: Transform,
    pub outer: Transform,
}

impl ComposedTransform {
    pub fn new(inner: Transform, outer: Transform) -> Self {
        Self { inner, outer }
    }

    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.outer.apply(self.inner.apply(p))
    }
}

/// Gentle bob and sway for a floating group.
#[derive(Clone, Copy, Debug)]
pub struct Float {
    pub speed: f32,
    pub rotation_intensity: f32,
    pub float_intensity: f32,
}

impl Float {
    pub const fn new(speed: f32, rotation_intensity: f32, float_intensity: f32) -> Self {
        Self { speed, rotation_intensity, float_intensity }
    }

    pub fn transform(&self, elapsed: f32) -> Transform {
        let t = elapsed / 4.0 * self.speed;
        Transform {
            rotation: Rotation::new(
                t.cos() / 8.0 * self.rotation_intensity,
                t.sin() / 8.0 * self.rotation_intensity,
                t.sin() / 20.0 * self.rotation_intensity,
            ),
            offset: Vec3::new(0.0, t.sin() / 10.0 * self.float_intensity, 0.0),
        }
    }
}

/// A projected point in dot coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

/// Perspective camera on the `+z` axis looking at the origin.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    cx: f32,
    cy: f32,
    half_extent: f32,
    focal: f32,
    distance: f32,
}

const NEAR_PLANE: f32 = 0.1;

impl Projection {
    pub const CAMERA_DISTANCE: f32 = 6.0;
    pub const FOV_DEGREES: f32 = 45.0;

    pub fn new(width_dots: usize, height_dots: usize) -> Self {
        Self::with_camera(width_dots, height_dots, Self::CAMERA_DISTANCE, Self::FOV_DEGREES)
    }

    pub fn with_camera(width_dots: usize, height_dots: usize, distance: f32, fov_deg: f32) -> Self {
        let half_extent = width_dots.min(height_dots) as f32 / 2.0;
        Self {
            cx: width_dots as f32 / 2.0,
            cy: height_dots as f32 / 2.0,
            half_extent,
            focal: 1.0 / (fov_deg.to_radians() / 2.0).tan(),
            distance,
        }
    }

    pub fn project(&self, p: Vec3) -> Option<Projected> {
        let depth = self.distance - p.z;
        if depth < NEAR_PLANE {
            return None;
        }
        let k = self.scale_at(depth);
        Some(Projected {
            x: self.cx + p.x * k,
            y: self.cy - p.y * k,
            depth,
        })
    }

    /// Dots per world unit at `depth` from the camera
    pub fn scale_at(&self, depth: f32) -> f32 {
        self.focal / depth.max(NEAR_PLANE) * self.half_extent
    }

    pub fn camera_distance(&self) -> f32 {
        self.distance
    }
}

/// Closed circle of `samples + 1` points in the xy plane.
pub fn circle(radius: f32, samples: usize) -> Vec<Vec3> {
    (0..=samples)
        .map(|i| {
            let a = i as f32 / samples as f32 * TAU;
            Vec3::new(radius * a.cos(), radius * a.sin(), 0.0)
        })
        .collect()
}

/// Latitude ring as a closed polyline.
pub fn latitude_ring(lat_deg: f32, radius: f32, samples: usize) -> Vec<Vec3> {
    (0..=samples)
        .map(|j| {
            let lon = j as f32 / samples as f32 * 360.0 - 180.0;
            spherical_to_cartesian(lat_deg, lon, radius)
        })
        .collect()
}

/// Pole-to-pole meridian as a polyline.
pub fn meridian(lon_deg: f32, radius: f32, samples: usize) -> Vec<Vec3> {
    (0..=samples)
        .map(|j| {
            let lat = 90.0 - j as f32 / samples as f32 * 180.0;
            spherical_to_cartesian(lat, lon_deg, radius)
        })
        .collect()
}

/// Polylines of a UV sphere wireframe with the given segment counts.
pub fn sphere_wireframe(radius: f32, width_segments: usize, height_segments: usize) -> Vec<Vec<Vec3>> {
    const SAMPLES: usize = 48;
    let mut lines = Vec::with_capacity(width_segments + height_segments);
    for i in 1..height_segments {
        let lat = 90.0 - i as f32 / height_segments as f32 * 180.0;
        lines.push(latitude_ring(lat, radius, SAMPLES));
    }
    for i in 0..width_segments {
        let lon = i as f32 / width_segments as f32 * 360.0 - 180.0;
        lines.push(meridian(lon, radius, SAMPLES / 2));
    }
    lines
}

/// Points of a Fibonacci lattice on the unit sphere.
pub fn fibonacci_sphere(count: usize) -> impl Iterator<Item = Vec3> {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    (0..count).map(move |i| {
        let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
        let r = (1.0 - y * y).max(0.0).sqrt();
        let a = i as f32 * golden_angle;
        Vec3::new(a.cos() * r, y, a.sin() * r)
    })
}
