//! Scroll-driven 3D scene.
//!
//! The crate owns the scene state (camera, meshes, lights), the per-frame
//! animation loop and the mapping from page scroll to camera position.
//! Drawing, windowing and asset access sit behind small traits so the core
//! runs headless in tests and tooling.

pub mod app;
pub mod assets;
pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod scheduler;
pub mod starfield;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{build_scene, final_state_report};
pub use assets::{AssetLoader, FsAssetLoader, NoAssets, TextureHandle};
pub use camera::ScrollCameraController;
pub use config::SceneConfig;
pub use error::{AssetLoadError, PresentError, SceneError, SchedulerError};
pub use input::{FixedScroll, ScrollSource, WheelScroll};
pub use render::{FrameStatus, HeadlessSurface, RenderSurface, Renderer};
pub use scene::{
    AnimationPlan, Camera, Entity, Geometry, Light, LightKind, Material, SceneGraph, Transform,
};
pub use scheduler::{AnimationScheduler, FrameHost, SchedulerState};
pub use starfield::ProceduralStarField;
