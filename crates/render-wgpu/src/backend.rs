use crate::composer::Composer;
use crate::gpu::GpuContext;
use lumen_common::Viewport;
use lumen_render::{FrameError, RenderBackend, SurfaceError};
use lumen_scene::{PerspectiveCamera, Scene};

/// wgpu implementation of [`RenderBackend`]: a window surface plus the
/// composer that renders into it.
pub struct WgpuBackend {
    gpu: GpuContext,
    composer: Composer,
}

impl WgpuBackend {
    /// Create the surface, device and render pipeline for `target`.
    ///
    /// Fails when the platform offers no usable GPU; nothing is retried.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        viewport: Viewport,
    ) -> Result<Self, SurfaceError> {
        let gpu = GpuContext::new(target, viewport)?;
        let composer = Composer::new(
            gpu.device(),
            gpu.queue(),
            gpu.surface_format(),
            gpu.sample_count(),
            viewport.render_size(),
        );
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            pixel_ratio = viewport.pixel_ratio(),
            "render backend ready"
        );
        Ok(Self { gpu, composer })
    }
}

impl RenderBackend for WgpuBackend {
    fn set_size(&mut self, viewport: Viewport) {
        self.gpu.resize(viewport.width, viewport.height);
        self.composer
            .set_size(self.gpu.device(), viewport.render_size());
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), FrameError> {
        let frame = self.gpu.acquire()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.composer
            .render(self.gpu.device(), self.gpu.queue(), scene, camera, &view);

        frame.present();
        Ok(())
    }
}
