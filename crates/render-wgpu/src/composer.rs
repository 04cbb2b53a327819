use crate::gpu::{DEPTH_FORMAT, HDR_FORMAT};
use crate::rgb_shift::RgbShiftPass;
use crate::scene_pass::{ScenePass, SceneTarget};
use lumen_scene::{PerspectiveCamera, Scene};

/// Offscreen attachments for the scene pass. With multisampling the scene
/// is drawn into `msaa` and resolved into `color`; `color` is what the post
/// pass samples.
struct RenderTarget {
    width: u32,
    height: u32,
    color: wgpu::TextureView,
    msaa: Option<wgpu::TextureView>,
    depth: wgpu::TextureView,
}

impl RenderTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32, sample_count: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let color = create_texture(
            device,
            "scene_color",
            width,
            height,
            1,
            HDR_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let msaa = (sample_count > 1).then(|| {
            create_texture(
                device,
                "scene_color_msaa",
                width,
                height,
                sample_count,
                HDR_FORMAT,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
        });
        let depth = create_texture(
            device,
            "scene_depth",
            width,
            height,
            sample_count,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );

        Self {
            width,
            height,
            color,
            msaa,
            depth,
        }
    }

    fn scene_target(&self) -> SceneTarget<'_> {
        match &self.msaa {
            Some(msaa) => SceneTarget {
                color: msaa,
                resolve: Some(&self.color),
                depth: &self.depth,
            },
            None => SceneTarget {
                color: &self.color,
                resolve: None,
                depth: &self.depth,
            },
        }
    }
}

fn create_texture(
    device: &wgpu::Device,
    label: &str,
    width: u32,
    height: u32,
    sample_count: u32,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

/// The post-processing pipeline: scene pass into an offscreen target, then
/// the RGB-shift pass onto the output. Passes run in this fixed order.
pub struct Composer {
    sample_count: u32,
    target: RenderTarget,
    scene_pass: ScenePass,
    rgb_shift: RgbShiftPass,
}

impl Composer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        output_format: wgpu::TextureFormat,
        sample_count: u32,
        (width, height): (u32, u32),
    ) -> Self {
        let target = RenderTarget::new(device, width, height, sample_count);
        let scene_pass = ScenePass::new(device, queue, sample_count);
        let rgb_shift = RgbShiftPass::new(device, output_format, &target.color);
        Self {
            sample_count,
            target,
            scene_pass,
            rgb_shift,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.target.width, self.target.height)
    }

    /// Recreate the offscreen targets at the new render size.
    pub fn set_size(&mut self, device: &wgpu::Device, (width, height): (u32, u32)) {
        if (width.max(1), height.max(1)) == self.size() {
            return;
        }
        self.target = RenderTarget::new(device, width, height, self.sample_count);
        self.rgb_shift.set_input(device, &self.target.color);
        tracing::debug!(width, height, "composer resized");
    }

    /// Run every pass once and submit.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        camera: &PerspectiveCamera,
        output: &wgpu::TextureView,
    ) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("composer_encoder"),
        });

        self.scene_pass.render(
            device,
            queue,
            &mut encoder,
            self.target.scene_target(),
            scene,
            camera,
        );
        self.rgb_shift.render(&mut encoder, output);

        queue.submit(std::iter::once(encoder.finish()));
    }
}
