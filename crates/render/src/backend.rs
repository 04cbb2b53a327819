use lumen_common::Viewport;
use lumen_scene::{PerspectiveCamera, Scene};

/// Failure to acquire a GPU-backed rendering surface. Terminal for rendering.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("failed to create surface: {0}")]
    CreateSurface(String),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(String),
    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,
}

/// Failure while producing a single frame. The loop keeps running.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("surface lost")]
    Lost,
    #[error("surface outdated")]
    Outdated,
    #[error("timed out acquiring the next frame")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("{0}")]
    Other(String),
}

impl FrameError {
    /// Lost and outdated surfaces are reconfigured by the backend; the next
    /// frame is expected to succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Lost | Self::Outdated | Self::Timeout)
    }
}

/// Renderer-agnostic interface. A backend owns the renderer and its
/// post-processing pipeline; both are created together and resized together.
///
/// The backend reads the scene and camera. It never mutates them.
pub trait RenderBackend {
    /// Resize the renderer and the pipeline to the new viewport.
    fn set_size(&mut self, viewport: Viewport);

    /// Render the whole pipeline once: scene pass, then post-processing.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), FrameError>;
}

/// User-visible message shown when no renderer could be created.
pub trait FallbackNotice {
    fn show(&mut self, message: &str);
}
