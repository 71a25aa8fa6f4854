//! Globe made only of coloured points.

use super::{GlobeRenderer, GlobeScene, GLOBE_RADIUS};
use crate::canvas::DotCanvas;
use crate::geometry::Rotation;
use crate::pointcloud::{generate_point_cloud, PointCloud};
use rand::RngCore;

pub const PARTICLE_COUNT: usize = 3000;
const SPIN_Y: f32 = 0.1;
const SPIN_X: f32 = 0.02;

pub struct ParticleGlobe {
    cloud: PointCloud,
    rotation: Rotation,
}

impl ParticleGlobe {
    pub fn new(scene: &GlobeScene, rng: &mut dyn RngCore) -> Self {
        Self {
            cloud: generate_point_cloud(rng, PARTICLE_COUNT, GLOBE_RADIUS..=GLOBE_RADIUS, scene.color_a, scene.color_b),
            rotation: Rotation::default(),
        }
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }
}

impl GlobeRenderer for ParticleGlobe {
    fn update(&mut self, dt: f32, _elapsed: f32) {
        self.rotation.spin(SPIN_X * dt, SPIN_Y * dt, 0.0);
    }

    fn render(&self, canvas: &mut DotCanvas, _scene: &GlobeScene) {
        let projection = canvas.projection();
        for (p, color) in self.cloud.rotated(self.rotation) {
            let Some(s) = projection.project(p) else {
                continue;
            };
            // Fade with depth so the far side reads as a haze
            let facing = (p.z / GLOBE_RADIUS + 1.0) * 0.5;
            canvas.plot(s.x, s.y, color, 0.2 + 0.7 * facing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::THEMES;
    use crate::config::GlobeConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn builds_three_thousand_points_on_the_surface() {
        let scene = GlobeScene::new(&GlobeConfig::default(), THEMES[0]);
        let globe = ParticleGlobe::new(&scene, &mut StdRng::seed_from_u64(42));
        assert_eq!(globe.cloud().len(), PARTICLE_COUNT);
        assert!(globe.cloud().positions().iter().all(|p| (p.length() - 2.0).abs() < 1e-4));
    }
}
