use glam::Vec3;
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::scene::{Entity, Geometry, Material, SceneGraph};

/// Scatters small spheres uniformly through a cube centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProceduralStarField {
    /// Half-extent of the cube; every coordinate lands in `[-bound, bound]`.
    pub bound: f32,
    pub radius: f32,
    pub color: u32,
}

impl Default for ProceduralStarField {
    fn default() -> Self {
        Self {
            bound: 50.0,
            radius: 0.25,
            color: 0xffffff,
        }
    }
}

impl ProceduralStarField {
    /// Adds `count` stars using the thread-local random source.
    pub fn populate(&self, scene: &mut SceneGraph, count: usize) {
        self.populate_with(scene, count, &mut rand::rng());
    }

    /// Adds `count` stars drawing positions from `rng`. Calling this twice
    /// adds twice as many stars. A non-finite bound adds none.
    pub fn populate_with<R: Rng + ?Sized>(
        &self,
        scene: &mut SceneGraph,
        count: usize,
        rng: &mut R,
    ) {
        let bound = self.bound.abs();
        if !bound.is_finite() {
            warn!("star field bound {} is not finite, skipping {count} stars", self.bound);
            return;
        }
        for _ in 0..count {
            let position = Vec3::new(
                rng.random_range(-bound..=bound),
                rng.random_range(-bound..=bound),
                rng.random_range(-bound..=bound),
            );
            scene.add(self.star().at(position));
        }
        debug!("added {count} stars within ±{bound}");
    }

    fn star(&self) -> Entity {
        Entity::new(
            "star",
            Geometry::Sphere {
                radius: self.radius,
                width_segments: 24,
                height_segments: 24,
            },
            Material::from_hex(self.color),
        )
    }
}
