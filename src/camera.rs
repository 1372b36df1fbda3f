use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::render::CameraParams;
use crate::scene::Camera;

/// Maps the document scroll offset linearly onto the camera position.
///
/// The host reports scroll as the body's top edge, which becomes more
/// negative as the page scrolls down; negative gains turn that into forward
/// motion along +z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollCameraController {
    pub gain: Vec3,
}

impl Default for ScrollCameraController {
    fn default() -> Self {
        Self {
            gain: Vec3::new(-0.0002, -0.0002, -0.01),
        }
    }
}

impl ScrollCameraController {
    pub const fn new(gain: Vec3) -> Self {
        Self { gain }
    }

    /// Assigns the camera position from `scroll_offset` alone. No clamping.
    pub fn update(&self, camera: &mut Camera, scroll_offset: f32) {
        camera.transform.position = self.gain * scroll_offset;
    }
}

/// Builds the view-projection uniform for a camera. The camera looks down
/// its local -z axis after applying its Euler rotation.
pub fn camera_params(camera: &Camera) -> CameraParams {
    let view = camera.transform.matrix().inverse();
    let projection = Mat4::perspective_rh(
        camera.fov.to_radians(),
        camera.aspect.max(0.01),
        camera.near,
        camera.far,
    );
    CameraParams {
        view_proj: projection * view,
        position: camera.transform.position,
    }
}
