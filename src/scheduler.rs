use log::{debug, error, info};

use crate::camera::ScrollCameraController;
use crate::error::SchedulerError;
use crate::input::ScrollSource;
use crate::render::{FrameStatus, RenderSurface};
use crate::scene::SceneGraph;

/// Host hook that arranges for the next tick to run, e.g.
/// `requestAnimationFrame` or a window redraw request.
pub trait FrameHost {
    fn request_frame(&mut self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
    /// Terminal: a frame failed and no further ticks are requested.
    Faulted,
}

/// Single-threaded per-frame driver: animate, move the camera, present,
/// then ask the host for the next frame.
#[derive(Debug)]
pub struct AnimationScheduler {
    state: SchedulerState,
    controller: ScrollCameraController,
    frame_pending: bool,
    ticks: u64,
    skipped: u64,
}

impl AnimationScheduler {
    pub fn new(controller: ScrollCameraController) -> Self {
        Self {
            state: SchedulerState::Stopped,
            controller,
            frame_pending: false,
            ticks: 0,
            skipped: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn skipped_frames(&self) -> u64 {
        self.skipped
    }

    pub fn controller(&self) -> &ScrollCameraController {
        &self.controller
    }

    /// Moves to `Running` and requests the first frame. Starting an already
    /// running scheduler does not request a second frame chain.
    pub fn start<H: FrameHost + ?Sized>(&mut self, host: &mut H) -> Result<(), SchedulerError> {
        match self.state {
            SchedulerState::Running => {
                debug!("animation scheduler already running");
                Ok(())
            }
            SchedulerState::Faulted => Err(SchedulerError::Faulted),
            SchedulerState::Stopped => {
                info!("starting animation loop");
                self.state = SchedulerState::Running;
                self.schedule(host)
            }
        }
    }

    /// Runs one frame. Rotation updates are kept even if presenting fails.
    pub fn tick<S, R, H>(
        &mut self,
        scene: &mut SceneGraph,
        scroll: &S,
        surface: &mut R,
        host: &mut H,
    ) -> Result<FrameStatus, SchedulerError>
    where
        S: ScrollSource + ?Sized,
        R: RenderSurface + ?Sized,
        H: FrameHost + ?Sized,
    {
        match self.state {
            SchedulerState::Stopped => return Err(SchedulerError::NotRunning),
            SchedulerState::Faulted => return Err(SchedulerError::Faulted),
            SchedulerState::Running => {}
        }
        self.frame_pending = false;
        self.ticks += 1;

        advance_animations(scene);
        let offset = scroll.scroll_offset();
        self.controller.update(scene.camera_mut(), offset);

        let status = match surface.present(scene, scene.camera()) {
            Ok(status) => status,
            Err(err) => {
                error!("frame {} failed, stopping animation loop: {err}", self.ticks);
                self.state = SchedulerState::Faulted;
                return Err(err.into());
            }
        };
        if status == FrameStatus::Skipped {
            self.skipped += 1;
            debug!("frame {} skipped by surface", self.ticks);
        }

        self.schedule(host)?;
        Ok(status)
    }

    fn schedule<H: FrameHost + ?Sized>(&mut self, host: &mut H) -> Result<(), SchedulerError> {
        if self.frame_pending {
            return Ok(());
        }
        if let Err(err) = host.request_frame() {
            error!("failed to request next frame: {err:#}");
            self.state = SchedulerState::Faulted;
            return Err(SchedulerError::Host(format!("{err:#}")));
        }
        self.frame_pending = true;
        Ok(())
    }
}

/// Applies every entity's rotation plan once. Returns how many moved.
pub fn advance_animations(scene: &mut SceneGraph) -> usize {
    let mut animated = 0;
    for entity in scene.entities_mut() {
        if let Some(plan) = entity.animation {
            plan.apply(&mut entity.transform);
            animated += 1;
        }
    }
    animated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::FixedScroll;
    use crate::render::HeadlessSurface;
    use crate::scene::{AnimationPlan, Camera, Entity, Geometry, Material};
    use glam::Vec3;

    #[derive(Default)]
    struct CountingHost {
        requests: usize,
        fail: bool,
    }

    impl FrameHost for CountingHost {
        fn request_frame(&mut self) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("no animation frames available");
            }
            self.requests += 1;
            Ok(())
        }
    }

    fn torus_scene() -> SceneGraph {
        let mut scene = SceneGraph::new(Camera::perspective(100.0, 1.0, 0.1, 1000.0));
        scene.add(
            Entity::new(
                "torus",
                Geometry::Torus {
                    radius: 10.0,
                    tube: 3.0,
                    radial_segments: 16,
                    tubular_segments: 100,
                },
                Material::from_hex(0xf983ff),
            )
            .animated(AnimationPlan::new(0.01, 0.008, 0.01)),
        );
        scene.add(Entity::new(
            "star",
            Geometry::Sphere {
                radius: 0.25,
                width_segments: 24,
                height_segments: 24,
            },
            Material::from_hex(0xffffff),
        ));
        scene
    }

    fn assert_close(actual: Vec3, expected: Vec3) {
        assert!(
            (actual - expected).abs().max_element() < 1e-4,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn ten_ticks_without_scroll() {
        let mut scene = torus_scene();
        let mut scheduler = AnimationScheduler::new(ScrollCameraController::default());
        let mut surface = HeadlessSurface::new();
        let mut host = CountingHost::default();

        scheduler.start(&mut host).unwrap();
        for _ in 0..10 {
            scheduler
                .tick(&mut scene, &FixedScroll(0.0), &mut surface, &mut host)
                .unwrap();
        }

        assert_eq!(scene.camera().transform.position, Vec3::ZERO);
        let torus = scene.find("torus").unwrap();
        assert_close(torus.transform.rotation, Vec3::new(0.1, 0.08, 0.1));
        assert_eq!(scene.find("star").unwrap().transform.rotation, Vec3::ZERO);
        assert_eq!(surface.frames_presented(), 10);
        assert_eq!(scheduler.ticks(), 10);
    }

    #[test]
    fn hundred_ticks_reach_one_radian() {
        let mut scene = torus_scene();
        let mut scheduler = AnimationScheduler::new(ScrollCameraController::default());
        let mut surface = HeadlessSurface::new();
        let mut host = CountingHost::default();

        scheduler.start(&mut host).unwrap();
        for _ in 0..100 {
            scheduler
                .tick(&mut scene, &FixedScroll(0.0), &mut surface, &mut host)
                .unwrap();
        }
        let rotation = scene.find("torus").unwrap().transform.rotation;
        assert!((rotation.x - 1.0).abs() < 1e-4);
        assert!((rotation.y - 0.8).abs() < 1e-4);
    }

    #[test]
    fn rotation_accumulates_from_a_nonzero_start() {
        let mut scene = torus_scene();
        let initial = Vec3::new(0.5, -1.25, 3.0);
        scene.entities_mut()[0].transform.rotation = initial;
        let mut scheduler = AnimationScheduler::new(ScrollCameraController::default());
        let mut surface = HeadlessSurface::new();
        let mut host = CountingHost::default();

        scheduler.start(&mut host).unwrap();
        for _ in 0..25 {
            scheduler
                .tick(&mut scene, &FixedScroll(0.0), &mut surface, &mut host)
                .unwrap();
        }
        assert_close(
            scene.find("torus").unwrap().transform.rotation,
            initial + 25.0 * Vec3::new(0.01, 0.008, 0.01),
        );
    }

    #[test]
    fn scroll_offset_drives_camera() {
        let mut scene = torus_scene();
        let mut scheduler = AnimationScheduler::new(ScrollCameraController::default());
        let mut surface = HeadlessSurface::new();
        let mut host = CountingHost::default();

        scheduler.start(&mut host).unwrap();
        scheduler
            .tick(&mut scene, &FixedScroll(-1000.0), &mut surface, &mut host)
            .unwrap();
        assert!((scene.camera().transform.position.z - 10.0).abs() < 1e-4);
    }

    #[test]
    fn start_twice_keeps_single_frame_chain() {
        let mut scene = torus_scene();
        let mut scheduler = AnimationScheduler::new(ScrollCameraController::default());
        let mut surface = HeadlessSurface::new();
        let mut host = CountingHost::default();

        scheduler.start(&mut host).unwrap();
        scheduler.start(&mut host).unwrap();
        assert_eq!(host.requests, 1);

        scheduler
            .tick(&mut scene, &FixedScroll(0.0), &mut surface, &mut host)
            .unwrap();
        scheduler.start(&mut host).unwrap();
        assert_eq!(host.requests, 2);
        assert_eq!(scheduler.state(), SchedulerState::Running);
    }

    #[test]
    fn tick_before_start_is_rejected() {
        let mut scene = torus_scene();
        let mut scheduler = AnimationScheduler::new(ScrollCameraController::default());
        let mut surface = HeadlessSurface::new();
        let mut host = CountingHost::default();

        let err = scheduler
            .tick(&mut scene, &FixedScroll(0.0), &mut surface, &mut host)
            .unwrap_err();
        assert!(matches!(err, SchedulerError::NotRunning));
        assert_eq!(scene.find("torus").unwrap().transform.rotation, Vec3::ZERO);
        assert_eq!(host.requests, 0);
    }

    #[test]
    fn present_failure_faults_without_rolling_back() {
        let mut scene = torus_scene();
        let mut scheduler = AnimationScheduler::new(ScrollCameraController::default());
        let mut surface = HeadlessSurface::failing_at(3);
        let mut host = CountingHost::default();

        scheduler.start(&mut host).unwrap();
        for _ in 0..2 {
            scheduler
                .tick(&mut scene, &FixedScroll(0.0), &mut surface, &mut host)
                .unwrap();
        }
        let err = scheduler
            .tick(&mut scene, &FixedScroll(0.0), &mut surface, &mut host)
            .unwrap_err();
        assert!(matches!(err, SchedulerError::Present(_)));
        assert_eq!(scheduler.state(), SchedulerState::Faulted);
        assert_close(
            scene.find("torus").unwrap().transform.rotation,
            Vec3::new(0.03, 0.024, 0.03),
        );
        // start + two successful ticks; nothing after the failure
        assert_eq!(host.requests, 3);

        let err = scheduler
            .tick(&mut scene, &FixedScroll(0.0), &mut surface, &mut host)
            .unwrap_err();
        assert!(matches!(err, SchedulerError::Faulted));
        assert!(matches!(
            scheduler.start(&mut host),
            Err(SchedulerError::Faulted)
        ));
        assert_eq!(host.requests, 3);
    }

    #[test]
    fn host_failure_faults() {
        let mut scheduler = AnimationScheduler::new(ScrollCameraController::default());
        let mut host = CountingHost {
            fail: true,
            ..CountingHost::default()
        };
        assert!(matches!(
            scheduler.start(&mut host),
            Err(SchedulerError::Host(_))
        ));
        assert_eq!(scheduler.state(), SchedulerState::Faulted);
    }

    #[test]
    fn skipped_frames_keep_the_loop_alive() {
        let mut scene = torus_scene();
        let mut scheduler = AnimationScheduler::new(ScrollCameraController::default());
        let mut surface = HeadlessSurface::new();
        surface.skip_next();
        let mut host = CountingHost::default();

        scheduler.start(&mut host).unwrap();
        let status = scheduler
            .tick(&mut scene, &FixedScroll(0.0), &mut surface, &mut host)
            .unwrap();
        assert_eq!(status, FrameStatus::Skipped);
        assert_eq!(scheduler.skipped_frames(), 1);
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(host.requests, 2);
    }

    #[test]
    fn advance_counts_animated_entities() {
        let mut scene = torus_scene();
        assert_eq!(advance_animations(&mut scene), 1);
    }
}
