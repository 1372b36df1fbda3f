use thiserror::Error;

/// Failures raised while assembling the scene or its rendering surface.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The drawable surface or graphics device is unavailable.
    #[error("failed to initialize {0}")]
    Initialization(String),
}

/// A texture path could not be resolved.
#[derive(Debug, Error)]
#[error("failed to load asset {path}: {reason}")]
pub struct AssetLoadError {
    pub path: String,
    pub reason: String,
}

/// The render surface failed while drawing a frame.
#[derive(Debug, Error)]
#[error("present failed: {message}")]
pub struct PresentError {
    pub message: String,
}

impl PresentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`crate::AnimationScheduler`].
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Present(#[from] PresentError),
    #[error("frame request failed: {0}")]
    Host(String),
    #[error("scheduler has not been started")]
    NotRunning,
    #[error("scheduler stopped after a fatal frame error")]
    Faulted,
}
