use lumen_assets::AssetEvent;
use lumen_common::Viewport;
use lumen_common::constants::FALLBACK_MESSAGE;
use lumen_input::{InputEvent, pointer_rotation};
use lumen_scene::{Mapping, PerspectiveCamera, Scene};

use crate::backend::{FallbackNotice, RenderBackend, SurfaceError};

/// Render loop state. There is no way back from `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    NotRunning,
    Running,
}

/// What the platform should do after a redraw tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was attempted; schedule the next one.
    Continue,
    /// The loop is not running; schedule nothing.
    Idle,
}

/// Application state: scene, camera, the optional backend and the loop state.
///
/// Owned by the UI thread and driven by platform callbacks. Loads, input and
/// redraws arrive in any order; every handler tolerates the backend or the
/// model being absent.
pub struct Viewer<B> {
    scene: Scene,
    camera: PerspectiveCamera,
    viewport: Viewport,
    backend: Option<B>,
    loop_state: LoopState,
    init_attempted: bool,
    frames_rendered: u64,
}

impl<B: RenderBackend> Viewer<B> {
    /// Build the scene and camera. Cannot fail; no GPU work happens here.
    pub fn new(viewport: Viewport) -> Self {
        let aspect = if viewport.is_empty() {
            1.0
        } else {
            viewport.aspect()
        };
        Self {
            scene: Scene::new(),
            camera: PerspectiveCamera::for_aspect(aspect),
            viewport,
            backend: None,
            loop_state: LoopState::NotRunning,
            init_attempted: false,
            frames_rendered: 0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Try once to create the renderer and its pipeline.
    ///
    /// On failure the error is logged, `notice` shows the fallback message and
    /// `false` is returned. Later calls never retry and never show the notice
    /// again; they report the outcome of the first attempt.
    pub fn initialize<F>(
        &mut self,
        viewport: Viewport,
        build: F,
        notice: &mut dyn FallbackNotice,
    ) -> bool
    where
        F: FnOnce(Viewport) -> Result<B, SurfaceError>,
    {
        if self.init_attempted {
            tracing::warn!("renderer initialization already attempted");
            return self.backend.is_some();
        }
        self.init_attempted = true;

        if !viewport.is_empty() {
            self.viewport = viewport;
            self.camera.set_aspect(viewport.aspect());
        }

        match build(self.viewport) {
            Ok(backend) => {
                self.backend = Some(backend);
                tracing::info!(
                    width = self.viewport.width,
                    height = self.viewport.height,
                    pixel_ratio = self.viewport.pixel_ratio(),
                    "renderer initialized"
                );
                true
            }
            Err(e) => {
                tracing::error!("failed to create GPU renderer: {e}");
                notice.show(FALLBACK_MESSAGE);
                false
            }
        }
    }

    /// Enter `Running` if the backend exists. Idempotent.
    pub fn start(&mut self) -> LoopState {
        if self.loop_state == LoopState::NotRunning && self.backend.is_some() {
            self.loop_state = LoopState::Running;
            tracing::info!("render loop started");
        }
        self.loop_state
    }

    /// One redraw tick. Renders only while running.
    pub fn frame(&mut self) -> FrameOutcome {
        if self.loop_state != LoopState::Running {
            return FrameOutcome::Idle;
        }
        let Some(backend) = self.backend.as_mut() else {
            return FrameOutcome::Idle;
        };

        match backend.render(&self.scene, &self.camera) {
            Ok(()) => {
                self.frames_rendered += 1;
                tracing::trace!(frame = self.frames_rendered, "frame rendered");
            }
            Err(e) if e.is_transient() => tracing::debug!("frame skipped: {e}"),
            Err(e) => tracing::error!("frame failed: {e}"),
        }
        FrameOutcome::Continue
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved { x, y } => self.pointer_moved(x, y),
            InputEvent::Resized(viewport) => self.resized(viewport),
        }
    }

    /// Assign the model rotation from the pointer position. No-op without a model.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if !self.scene.has_model() || self.viewport.is_empty() {
            return;
        }
        let rotation = pointer_rotation(
            x,
            y,
            self.viewport.width as f64,
            self.viewport.height as f64,
        );
        self.scene.set_model_rotation(rotation);
    }

    /// Track the new viewport; when the backend exists, update the camera
    /// projection and resize renderer and pipeline.
    pub fn resized(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            tracing::debug!("ignoring zero-area resize");
            return;
        }
        self.viewport = viewport;

        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        self.camera.set_aspect(viewport.aspect());
        backend.set_size(viewport);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            "viewport resized"
        );
    }

    pub fn handle_asset_event(&mut self, event: AssetEvent) {
        match event {
            AssetEvent::EnvironmentLoaded(mut env) => {
                env.mapping = Mapping::EquirectangularReflection;
                let (width, height) = (env.width, env.height);
                if self.scene.set_environment(env) {
                    tracing::info!(width, height, "environment map assigned");
                }
            }
            AssetEvent::EnvironmentFailed(e) => {
                tracing::error!("An error occurred while loading the environment map: {e}");
            }
            AssetEvent::ModelProgress(progress) => {
                if let Some(pct) = progress.percent() {
                    tracing::info!("Loading model: {pct}%");
                }
            }
            AssetEvent::ModelLoaded(model) => {
                let triangles = model.triangle_count();
                if self.scene.add_model(model) {
                    tracing::info!(triangles, "model added to scene");
                }
            }
            AssetEvent::ModelFailed(e) => {
                tracing::error!("An error occurred while loading the model: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FrameError;
    use lumen_assets::{AssetError, LoadProgress};
    use lumen_common::Rotation;
    use lumen_scene::{EnvironmentMap, Model, SceneEvent};

    #[derive(Default)]
    struct RecordingBackend {
        renders: usize,
        sizes: Vec<Viewport>,
        seen_model: Vec<bool>,
        fail_with: Option<FrameError>,
    }

    impl RenderBackend for RecordingBackend {
        fn set_size(&mut self, viewport: Viewport) {
            self.sizes.push(viewport);
        }

        fn render(&mut self, scene: &Scene, _camera: &PerspectiveCamera) -> Result<(), FrameError> {
            self.renders += 1;
            self.seen_model.push(scene.has_model());
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    #[derive(Default)]
    struct CountingNotice {
        messages: Vec<String>,
    }

    impl FallbackNotice for CountingNotice {
        fn show(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(1280, 720, 1.0)
    }

    fn ready_viewer() -> Viewer<RecordingBackend> {
        let mut viewer = Viewer::new(viewport());
        let mut notice = CountingNotice::default();
        assert!(viewer.initialize(viewport(), |_| Ok(RecordingBackend::default()), &mut notice));
        viewer
    }

    fn failing_build(_: Viewport) -> Result<RecordingBackend, SurfaceError> {
        Err(SurfaceError::NoAdapter)
    }

    #[test]
    fn successful_init_starts_loop() {
        let mut viewer = ready_viewer();
        assert_eq!(viewer.start(), LoopState::Running);
        assert_eq!(viewer.frame(), FrameOutcome::Continue);
        assert_eq!(viewer.backend().unwrap().renders, 1);
        assert_eq!(viewer.frames_rendered(), 1);
    }

    #[test]
    fn failed_init_shows_notice_once_and_never_runs() {
        let mut viewer: Viewer<RecordingBackend> = Viewer::new(viewport());
        let mut notice = CountingNotice::default();

        assert!(!viewer.initialize(viewport(), failing_build, &mut notice));
        assert!(!viewer.initialize(viewport(), failing_build, &mut notice));
        assert_eq!(notice.messages, vec![FALLBACK_MESSAGE.to_string()]);

        assert_eq!(viewer.start(), LoopState::NotRunning);
        assert_eq!(viewer.frame(), FrameOutcome::Idle);
        assert!(viewer.backend().is_none());
    }

    #[test]
    fn second_init_does_not_rebuild() {
        let mut viewer = ready_viewer();
        let mut notice = CountingNotice::default();
        let mut called = false;
        assert!(viewer.initialize(
            viewport(),
            |_| {
                called = true;
                Ok(RecordingBackend::default())
            },
            &mut notice
        ));
        assert!(!called);
        assert!(notice.messages.is_empty());
    }

    #[test]
    fn no_frame_before_pipeline_exists() {
        let mut viewer: Viewer<RecordingBackend> = Viewer::new(viewport());
        assert_eq!(viewer.frame(), FrameOutcome::Idle);
        assert_eq!(viewer.start(), LoopState::NotRunning);
        assert_eq!(viewer.frame(), FrameOutcome::Idle);

        let mut notice = CountingNotice::default();
        viewer.initialize(viewport(), |_| Ok(RecordingBackend::default()), &mut notice);
        // Initialized but not started: still nothing rendered.
        assert_eq!(viewer.frame(), FrameOutcome::Idle);
        assert_eq!(viewer.backend().unwrap().renders, 0);

        viewer.start();
        viewer.frame();
        viewer.frame();
        assert_eq!(viewer.backend().unwrap().renders, 2);
    }

    #[test]
    fn start_is_idempotent() {
        let mut viewer = ready_viewer();
        assert_eq!(viewer.start(), LoopState::Running);
        assert_eq!(viewer.start(), LoopState::Running);
    }

    #[test]
    fn frame_errors_keep_loop_running() {
        let mut viewer = ready_viewer();
        viewer.start();
        viewer.backend.as_mut().unwrap().fail_with = Some(FrameError::OutOfMemory);
        assert_eq!(viewer.frame(), FrameOutcome::Continue);
        viewer.backend.as_mut().unwrap().fail_with = Some(FrameError::Lost);
        assert_eq!(viewer.frame(), FrameOutcome::Continue);
        assert_eq!(viewer.frames_rendered(), 0);
        assert_eq!(viewer.loop_state(), LoopState::Running);
    }

    #[test]
    fn resize_updates_aspect_exactly() {
        let mut viewer = ready_viewer();
        for (w, h) in [(1, 1), (1920, 1080), (333, 777), (4096, 17), (17, 4096)] {
            viewer.resized(Viewport::new(w, h, 1.0));
            assert_eq!(viewer.camera().aspect(), w as f32 / h as f32);
        }
        let sizes = &viewer.backend().unwrap().sizes;
        assert_eq!(sizes.len(), 5);
        assert_eq!(sizes[1], Viewport::new(1920, 1080, 1.0));
    }

    #[test]
    fn resize_before_init_is_noop() {
        let mut viewer: Viewer<RecordingBackend> = Viewer::new(viewport());
        let aspect = viewer.camera().aspect();
        viewer.resized(Viewport::new(300, 900, 1.0));
        assert_eq!(viewer.camera().aspect(), aspect);
        assert!(viewer.backend().is_none());
    }

    #[test]
    fn zero_area_resize_is_ignored() {
        let mut viewer = ready_viewer();
        viewer.resized(Viewport::new(0, 0, 1.0));
        assert!(viewer.backend().unwrap().sizes.is_empty());
        assert_eq!(viewer.viewport(), viewport());
    }

    #[test]
    fn pointer_before_model_is_noop() {
        let mut viewer = ready_viewer();
        viewer.pointer_moved(1280.0, 720.0);
        viewer.handle_input(InputEvent::PointerMoved { x: 0.0, y: 0.0 });
        assert!(viewer.scene().events().is_empty());

        // Moves recorded before the model arrived are not replayed.
        viewer.handle_asset_event(AssetEvent::ModelLoaded(Model::default()));
        assert_eq!(viewer.scene().model().unwrap().rotation, Rotation::ZERO);
    }

    #[test]
    fn pointer_rotates_loaded_model() {
        let mut viewer = ready_viewer();
        viewer.handle_asset_event(AssetEvent::ModelLoaded(Model::default()));

        viewer.pointer_moved(640.0, 360.0);
        assert_eq!(viewer.scene().model().unwrap().rotation, Rotation::ZERO);

        viewer.pointer_moved(1280.0, 720.0);
        let r = viewer.scene().model().unwrap().rotation;
        assert!((r.yaw - 0.4).abs() < 1e-6);
        assert!((r.pitch - 0.4).abs() < 1e-6);

        viewer.pointer_moved(0.0, 0.0);
        let r = viewer.scene().model().unwrap().rotation;
        assert!((r.yaw + 0.4).abs() < 1e-6);
        assert!((r.pitch + 0.4).abs() < 1e-6);
    }

    #[test]
    fn sustained_pointer_motion_keeps_event_log_bounded() {
        let mut viewer = ready_viewer();
        viewer.start();
        viewer.handle_asset_event(AssetEvent::ModelLoaded(Model::default()));
        for i in 0..100_000u32 {
            viewer.pointer_moved(f64::from(i % 1280), f64::from(i % 720));
            if i % 1_000 == 0 {
                viewer.frame();
            }
        }
        assert_eq!(viewer.scene().events().len(), 2);
        assert!(matches!(
            viewer.scene().events()[1],
            SceneEvent::ModelRotated { .. }
        ));
    }

    #[test]
    fn pointer_uses_latest_viewport() {
        let mut viewer = ready_viewer();
        viewer.handle_asset_event(AssetEvent::ModelLoaded(Model::default()));
        viewer.handle_input(InputEvent::Resized(Viewport::new(200, 100, 1.0)));
        viewer.pointer_moved(100.0, 50.0);
        assert_eq!(viewer.scene().model().unwrap().rotation, Rotation::ZERO);
    }

    #[test]
    fn model_and_environment_work_without_renderer() {
        let mut viewer: Viewer<RecordingBackend> = Viewer::new(viewport());
        viewer.handle_asset_event(AssetEvent::ModelProgress(LoadProgress {
            loaded: 5,
            total: 10,
        }));
        viewer.handle_asset_event(AssetEvent::ModelLoaded(Model::default()));
        viewer.handle_asset_event(AssetEvent::EnvironmentLoaded(EnvironmentMap::new(
            1,
            1,
            vec![1.0; 4],
        )));
        assert!(viewer.scene().has_model());
        assert_eq!(
            viewer.scene().environment().unwrap().mapping,
            Mapping::EquirectangularReflection
        );
        assert_eq!(viewer.frame(), FrameOutcome::Idle);
    }

    #[test]
    fn load_failures_leave_scene_empty() {
        let mut viewer = ready_viewer();
        viewer.start();
        viewer.handle_asset_event(AssetEvent::ModelFailed(AssetError::EmptyModel));
        viewer.handle_asset_event(AssetEvent::EnvironmentFailed(AssetError::Io(
            std::io::Error::other("offline"),
        )));
        assert!(!viewer.scene().has_model());
        assert!(viewer.scene().environment().is_none());
        assert_eq!(viewer.frame(), FrameOutcome::Continue);
        assert_eq!(viewer.backend().unwrap().seen_model, vec![false]);
    }

    #[test]
    fn model_arriving_mid_loop_is_rendered() {
        let mut viewer = ready_viewer();
        viewer.start();
        viewer.frame();
        viewer.handle_asset_event(AssetEvent::ModelLoaded(Model::default()));
        viewer.frame();
        assert_eq!(viewer.backend().unwrap().seen_model, vec![false, true]);
        assert!(matches!(
            viewer.scene().events()[0],
            SceneEvent::ModelAttached { .. }
        ));
    }
}
