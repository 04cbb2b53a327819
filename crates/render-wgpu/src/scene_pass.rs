use crate::gpu::{DEPTH_FORMAT, HDR_FORMAT};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use lumen_scene::{EnvironmentMap, ImageRgba8, Material, MeshPrimitive, Model, PerspectiveCamera, Scene};
use std::collections::{HashMap, HashSet};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    env_params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct DrawUniforms {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct MaterialUniforms {
    base_color: [f32; 4],
    emissive: [f32; 4],
    metallic_roughness: [f32; 4],
}

impl MaterialUniforms {
    fn from_material(material: &Material) -> Self {
        let [er, eg, eb] = material.emissive_factor;
        Self {
            base_color: material.base_color_factor,
            emissive: [er, eg, eb, 0.0],
            metallic_roughness: [material.metallic_factor, material.roughness_factor, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

/// Interleave a primitive's attribute streams. Missing normals or texture
/// coordinates are filled with zeros.
fn interleave(primitive: &MeshPrimitive) -> Vec<Vertex> {
    primitive
        .positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: primitive.normals.get(i).copied().unwrap_or([0.0; 3]),
            uv: primitive.tex_coords.get(i).copied().unwrap_or([0.0; 2]),
        })
        .collect()
}

/// Inverse-transpose of the upper 3x3, for transforming normals. A singular
/// transform yields the identity.
fn normal_matrix(model: Mat4) -> Mat4 {
    let linear = Mat3::from_mat4(model);
    if linear.determinant().abs() <= f32::EPSILON {
        return Mat4::IDENTITY;
    }
    Mat4::from_mat3(linear.inverse().transpose())
}

fn draw_uniforms(model_rotation: Mat4, primitive: &MeshPrimitive) -> DrawUniforms {
    let model = model_rotation * primitive.transform;
    DrawUniforms {
        model: model.to_cols_array_2d(),
        normal: normal_matrix(model).to_cols_array_2d(),
    }
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    /// Index into [`GpuModel::materials`]; `None` draws with the default material.
    material: Option<usize>,
    /// Position in [`Model::primitives`], used to look the transform up each frame.
    source: usize,
}

struct GpuModel {
    revision: u64,
    primitives: Vec<GpuPrimitive>,
    materials: Vec<wgpu::BindGroup>,
}

/// Draws the scene's model into the offscreen HDR target, lit by the
/// environment map.
pub struct ScenePass {
    pipeline: wgpu::RenderPipeline,
    frame_layout: wgpu::BindGroupLayout,
    draw_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    env_sampler: wgpu::Sampler,
    materials: MaterialResources,
    default_material: wgpu::BindGroup,
    env_revision: u64,
    has_environment: bool,
    model: Option<GpuModel>,
}

impl ScenePass {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, sample_count: u32) -> Self {
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_frame_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                // Rgba32Float is not filterable without an optional feature.
                texture_entry(1, false),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_draw_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_material_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(1, true),
                texture_entry(2, true),
                texture_entry(3, true),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                camera_position: [0.0; 4],
                env_params: [0.0; 4],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let env_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("env_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let material_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("material_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let placeholder_env = upload_environment_texels(device, queue, 1, 1, &[0.0, 0.0, 0.0, 1.0]);
        let frame_bind_group =
            create_frame_bind_group(device, &frame_layout, &frame_buffer, &placeholder_env, &env_sampler);

        let white = ImageRgba8 {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        };
        let materials = MaterialResources {
            white_srgb: upload_image(device, queue, &white, true),
            white_linear: upload_image(device, queue, &white, false),
            layout: material_layout,
            sampler: material_sampler,
        };
        let default_material = materials.bind_group(device, &Material::default(), &HashMap::new());

        Self {
            pipeline,
            frame_layout,
            draw_layout,
            frame_buffer,
            frame_bind_group,
            env_sampler,
            materials,
            default_material,
            env_revision: 0,
            has_environment: false,
            model: None,
        }
    }

    /// Record the scene pass. `color` and `resolve` follow wgpu's MSAA
    /// convention: without multisampling, `resolve` is `None`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: SceneTarget<'_>,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) {
        self.sync_environment(device, queue, scene);
        self.sync_model(device, queue, scene);

        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
                camera_position: camera.position.extend(1.0).to_array(),
                env_params: [if self.has_environment { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
            }),
        );

        if let (Some(gpu_model), Some(model)) = (&self.model, scene.model()) {
            let rotation = model.rotation_matrix();
            for primitive in &gpu_model.primitives {
                if let Some(source) = model.primitives.get(primitive.source) {
                    queue.write_buffer(
                        &primitive.draw_buffer,
                        0,
                        bytemuck::bytes_of(&draw_uniforms(rotation, source)),
                    );
                }
            }
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color,
                resolve_target: target.resolve,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        let Some(gpu_model) = &self.model else {
            return;
        };

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for primitive in &gpu_model.primitives {
            let material = primitive
                .material
                .and_then(|i| gpu_model.materials.get(i))
                .unwrap_or(&self.default_material);
            pass.set_bind_group(1, &primitive.draw_bind_group, &[]);
            pass.set_bind_group(2, material, &[]);
            pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
            pass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..primitive.index_count, 0, 0..1);
        }
    }

    fn sync_environment(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) {
        if scene.environment_revision() == self.env_revision {
            return;
        }
        self.env_revision = scene.environment_revision();

        let Some(env) = scene.environment() else {
            return;
        };
        let max = device.limits().max_texture_dimension_2d;
        let expected = env.width as usize * env.height as usize * 4;
        if !fits_texture_limit(env.width, env.height, max) || env.texels.len() != expected {
            tracing::warn!(
                width = env.width,
                height = env.height,
                max,
                "environment map exceeds texture limits or is malformed; lighting disabled"
            );
            return;
        }

        let view = upload_environment(device, queue, env);
        self.frame_bind_group = create_frame_bind_group(
            device,
            &self.frame_layout,
            &self.frame_buffer,
            &view,
            &self.env_sampler,
        );
        self.has_environment = true;
        tracing::debug!(width = env.width, height = env.height, "environment uploaded");
    }

    fn sync_model(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) {
        let revision = scene.model_revision();
        if self.model.as_ref().map(|m| m.revision) == Some(revision) {
            return;
        }
        let Some(model) = scene.model() else {
            return;
        };
        self.model = Some(self.upload_model(device, queue, model, revision));
    }

    fn upload_model(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        model: &Model,
        revision: u64,
    ) -> GpuModel {
        let max = device.limits().max_texture_dimension_2d;
        let mut textures: HashMap<(usize, bool), wgpu::TextureView> = HashMap::new();
        let mut rejected: HashSet<usize> = HashSet::new();
        let mut materials = Vec::with_capacity(model.materials.len());
        for material in &model.materials {
            let wanted = [
                (material.base_color_texture, true),
                (material.metallic_roughness_texture, false),
                (material.emissive_texture, true),
            ];
            for (index, srgb) in wanted {
                let Some(index) = index else { continue };
                if textures.contains_key(&(index, srgb)) || rejected.contains(&index) {
                    continue;
                }
                let Some(image) = model.images.get(index) else {
                    continue;
                };
                if !image_uploadable(image, max) {
                    // The white fallback binds in its place.
                    tracing::warn!(
                        index,
                        width = image.width,
                        height = image.height,
                        max,
                        "material texture exceeds texture limits or is malformed; skipping"
                    );
                    rejected.insert(index);
                    continue;
                }
                textures.insert((index, srgb), upload_image(device, queue, image, srgb));
            }
            materials.push(self.materials.bind_group(device, material, &textures));
        }

        let rotation = model.rotation_matrix();
        let primitives: Vec<GpuPrimitive> = model
            .primitives
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.indices.is_empty() && !p.positions.is_empty())
            .map(|(source, primitive)| {
                let vertices = interleave(primitive);
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("model_vertex_buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("model_index_buffer"),
                    contents: bytemuck::cast_slice(&primitive.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let draw_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("model_draw_uniforms"),
                    contents: bytemuck::bytes_of(&draw_uniforms(rotation, primitive)),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let draw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("model_draw_bind_group"),
                    layout: &self.draw_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: draw_buffer.as_entire_binding(),
                    }],
                });
                GpuPrimitive {
                    vertex_buffer,
                    index_buffer,
                    index_count: primitive.indices.len() as u32,
                    draw_buffer,
                    draw_bind_group,
                    material: primitive.material.filter(|&i| i < materials.len()),
                    source,
                }
            })
            .collect();

        tracing::debug!(
            primitives = primitives.len(),
            materials = materials.len(),
            textures = textures.len(),
            "model uploaded"
        );

        GpuModel {
            revision,
            primitives,
            materials,
        }
    }
}

/// Inputs shared by every material bind group: layout, sampler and the
/// white textures that stand in for missing maps.
struct MaterialResources {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white_srgb: wgpu::TextureView,
    white_linear: wgpu::TextureView,
}

impl MaterialResources {
    fn bind_group(
        &self,
        device: &wgpu::Device,
        material: &Material,
        textures: &HashMap<(usize, bool), wgpu::TextureView>,
    ) -> wgpu::BindGroup {
        let lookup = |index: Option<usize>, srgb: bool| {
            let fallback = if srgb { &self.white_srgb } else { &self.white_linear };
            index
                .and_then(|i| textures.get(&(i, srgb)))
                .unwrap_or(fallback)
        };

        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("material_uniforms"),
            contents: bytemuck::bytes_of(&MaterialUniforms::from_material(material)),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material_bind_group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(lookup(material.base_color_texture, true)),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(lookup(
                        material.metallic_roughness_texture,
                        false,
                    )),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(lookup(material.emissive_texture, true)),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

/// Whether a `width` x `height` 2D texture is non-empty and within the
/// device's `max_texture_dimension_2d`.
fn fits_texture_limit(width: u32, height: u32, max: u32) -> bool {
    (1..=max).contains(&width) && (1..=max).contains(&height)
}

/// An RGBA8 image can be uploaded when it fits the device and its pixel
/// buffer matches its dimensions.
fn image_uploadable(image: &ImageRgba8, max: u32) -> bool {
    fits_texture_limit(image.width, image.height, max)
        && image.pixels.len() == image.width as usize * image.height as usize * 4
}

/// Attachments for one scene pass.
pub struct SceneTarget<'a> {
    pub color: &'a wgpu::TextureView,
    pub resolve: Option<&'a wgpu::TextureView>,
    pub depth: &'a wgpu::TextureView,
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, filterable: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn create_frame_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    frame_buffer: &wgpu::Buffer,
    env: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("scene_frame_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(env),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn upload_environment(device: &wgpu::Device, queue: &wgpu::Queue, env: &EnvironmentMap) -> wgpu::TextureView {
    upload_environment_texels(device, queue, env.width, env.height, &env.texels)
}

fn upload_environment_texels(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    width: u32,
    height: u32,
    texels: &[f32],
) -> wgpu::TextureView {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("environment_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        bytemuck::cast_slice(texels),
    );
    texture.create_view(&Default::default())
}

fn upload_image(device: &wgpu::Device, queue: &wgpu::Queue, image: &ImageRgba8, srgb: bool) -> wgpu::TextureView {
    let format = if srgb {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    };
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("material_texture"),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    );
    texture.create_view(&Default::default())
}
