use glam::{Mat4, Vec3};

use crate::error::PresentError;
use crate::scene::{Camera, LightKind, SceneGraph};

/// Drawable target for scene snapshots.
pub trait RenderSurface {
    /// One-time sizing of the backing surface in physical pixels.
    fn configure_surface(&mut self, pixel_density: f64, width: u32, height: u32);

    /// Draws one frame of `scene` as seen from `camera`.
    fn present(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<FrameStatus, PresentError>;
}

/// Outcome of a successful [`RenderSurface::present`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// The surface had no image ready this frame; the next tick retries.
    Skipped,
}

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Debug)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

/// Lighting state consumed by the renderer's uniform buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct LightParams {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub ambient: Vec3,
}

/// Collapses the scene's lights into one point light plus summed ambient.
pub fn light_params(scene: &SceneGraph) -> LightParams {
    let point = scene
        .lights()
        .iter()
        .find(|light| light.kind == LightKind::Point);
    let ambient = scene
        .lights()
        .iter()
        .filter(|light| light.kind == LightKind::Ambient)
        .fold(Vec3::ZERO, |sum, light| sum + light.color * light.intensity);

    match point {
        Some(light) => LightParams {
            position: light.position().unwrap_or(Vec3::ZERO),
            color: light.color,
            intensity: light.intensity.max(0.1),
            ambient,
        },
        None => LightParams {
            position: Vec3::new(3.0, 5.0, -3.0),
            color: Vec3::ZERO,
            intensity: 0.0,
            ambient,
        },
    }
}
