use glam::Vec3;
use log::debug;

use super::{FrameStatus, RenderSurface};
use crate::error::PresentError;
use crate::scene::{Camera, SceneGraph};

/// Surface that draws nothing and records what it was asked to present.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    frames: u64,
    size: Option<(u32, u32)>,
    last_camera: Option<Vec3>,
    last_entity_count: usize,
    fail_at: Option<u64>,
    skip_next: bool,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface whose `frame`-th present call (1-based) fails.
    pub fn failing_at(frame: u64) -> Self {
        Self {
            fail_at: Some(frame),
            ..Self::default()
        }
    }

    /// Makes the next present report [`FrameStatus::Skipped`].
    pub fn skip_next(&mut self) {
        self.skip_next = true;
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    pub fn last_camera_position(&self) -> Option<Vec3> {
        self.last_camera
    }

    pub fn last_entity_count(&self) -> usize {
        self.last_entity_count
    }
}

impl RenderSurface for HeadlessSurface {
    fn configure_surface(&mut self, pixel_density: f64, width: u32, height: u32) {
        let width = (width as f64 * pixel_density).round() as u32;
        let height = (height as f64 * pixel_density).round() as u32;
        self.size = Some((width.max(1), height.max(1)));
    }

    fn present(
        &mut self,
        scene: &SceneGraph,
        camera: &Camera,
    ) -> Result<FrameStatus, PresentError> {
        let attempt = self.frames + 1;
        if self.fail_at == Some(attempt) {
            return Err(PresentError::new(format!("surface lost at frame {attempt}")));
        }
        if std::mem::take(&mut self.skip_next) {
            return Ok(FrameStatus::Skipped);
        }
        self.frames = attempt;
        self.last_camera = Some(camera.transform.position);
        self.last_entity_count = scene.entities().len();
        debug!(
            "headless frame {attempt}: {} entities, camera at {}",
            self.last_entity_count, camera.transform.position
        );
        Ok(FrameStatus::Presented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_applies_pixel_density() {
        let mut surface = HeadlessSurface::new();
        surface.configure_surface(2.0, 640, 360);
        assert_eq!(surface.size(), Some((1280, 720)));
    }

    #[test]
    fn records_presented_frames() {
        let scene = SceneGraph::default();
        let mut surface = HeadlessSurface::new();
        surface.present(&scene, scene.camera()).unwrap();
        surface.present(&scene, scene.camera()).unwrap();
        assert_eq!(surface.frames_presented(), 2);
        assert_eq!(surface.last_camera_position(), Some(Vec3::ZERO));
    }

    #[test]
    fn fails_on_requested_frame_only() {
        let scene = SceneGraph::default();
        let mut surface = HeadlessSurface::failing_at(2);
        assert!(surface.present(&scene, scene.camera()).is_ok());
        assert!(surface.present(&scene, scene.camera()).is_err());
        assert_eq!(surface.frames_presented(), 1);
    }
}
