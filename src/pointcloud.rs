//! Random point clouds on a sphere surface or shell, coloured along a
//! two-stop gradient.

use crate::colors::Rgb;
use crate::geometry::{Rotation, Vec3};
use rand::Rng;
use std::f32::consts::TAU;
use std::ops::RangeInclusive;

/// Positions and colours generated once at mount time
#[derive(Clone, Debug, Default)]
pub struct PointCloud {
    positions: Vec<Vec3>,
    colors: Vec<Rgb>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Iterate the cloud under a rigid rotation; the stored samples never change.
    pub fn rotated(&self, rotation: Rotation) -> impl Iterator<Item = (Vec3, Rgb)> + '_ {
        self.positions
            .iter()
            .zip(&self.colors)
            .map(move |(&p, &c)| (rotation.apply(p), c))
    }
}

/// Sample `count` points uniformly over a sphere (or a shell when the
/// radius range is not a single value).
///
/// Longitude is uniform in `[0, 2π)` and the polar angle is `acos(2u - 1)`
/// so the poles are not over-sampled. Each point's colour blends
/// `color_a` into `color_b` by its own uniform `t` in `[0, 1)`.
pub fn generate_point_cloud<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    radius: RangeInclusive<f32>,
    color_a: Rgb,
    color_b: Rgb,
) -> PointCloud {
    let (r_min, r_max) = (*radius.start(), *radius.end());
    let mut positions = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);

    for _ in 0..count {
        let r = if r_max > r_min { rng.gen_range(r_min..r_max) } else { r_min };
        let theta = rng.gen_range(0.0..TAU);
        let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
        positions.push(Vec3::new(
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        ));

        let t: f32 = rng.gen();
        colors.push(color_a.lerp(color_b, t));
    }

    PointCloud { positions, colors }
}
