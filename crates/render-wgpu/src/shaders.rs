/// WGSL shader for the scene pass: metallic-roughness materials lit only by
/// the equirectangular environment map, plus emission.
pub const SCENE_SHADER: &str = r#"
const PI: f32 = 3.14159265;

struct Frame {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    // x: 1.0 when an environment map is bound, 0.0 otherwise
    env_params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;
@group(0) @binding(1)
var env_tex: texture_2d<f32>;
@group(0) @binding(2)
var env_sampler: sampler;

struct Draw {
    model: mat4x4<f32>,
    normal: mat4x4<f32>,
};

@group(1) @binding(0)
var<uniform> draw: Draw;

struct Material {
    base_color: vec4<f32>,
    emissive: vec4<f32>,
    // x: metallic, y: roughness
    metallic_roughness: vec4<f32>,
};

@group(2) @binding(0)
var<uniform> material: Material;
@group(2) @binding(1)
var base_color_tex: texture_2d<f32>;
@group(2) @binding(2)
var metallic_roughness_tex: texture_2d<f32>;
@group(2) @binding(3)
var emissive_tex: texture_2d<f32>;
@group(2) @binding(4)
var material_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world = draw.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_position = world.xyz;
    out.world_normal = (draw.normal * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.uv = vertex.uv;
    return out;
}

fn equirect_uv(dir: vec3<f32>) -> vec2<f32> {
    let d = normalize(dir);
    let u = atan2(d.z, d.x) * (0.5 / PI) + 0.5;
    let v = 0.5 - asin(clamp(d.y, -1.0, 1.0)) / PI;
    return vec2<f32>(u, v);
}

fn sample_env(dir: vec3<f32>) -> vec3<f32> {
    return textureSampleLevel(env_tex, env_sampler, equirect_uv(dir), 0.0).rgb;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = material.base_color * textureSample(base_color_tex, material_sampler, in.uv);
    let mr = textureSample(metallic_roughness_tex, material_sampler, in.uv);
    let emissive = material.emissive.rgb * textureSample(emissive_tex, material_sampler, in.uv).rgb;

    // glTF packs roughness in green and metalness in blue.
    let metallic = clamp(material.metallic_roughness.x * mr.b, 0.0, 1.0);
    let roughness = clamp(material.metallic_roughness.y * mr.g, 0.04, 1.0);

    let n = normalize(in.world_normal);
    let v = normalize(frame.camera_position.xyz - in.world_position);
    let r = reflect(-v, n);
    let n_dot_v = max(dot(n, v), 0.0);

    let f0 = mix(vec3<f32>(0.04), base.rgb, metallic);
    let fresnel = f0 + (max(vec3<f32>(1.0 - roughness), f0) - f0) * pow(1.0 - n_dot_v, 5.0);

    let irradiance = sample_env(n);
    let radiance = mix(sample_env(r), irradiance, roughness * roughness);
    let diffuse = irradiance * base.rgb * (1.0 - metallic);
    let specular = radiance * fresnel;
    let ambient = (diffuse * (vec3<f32>(1.0) - fresnel) + specular) * frame.env_params.x;

    return vec4<f32>(ambient + emissive, base.a);
}
"#;

/// WGSL shader for the RGB-shift post pass. Red is sampled at +offset, blue
/// at -offset, green and alpha in place.
pub const RGB_SHIFT_SHADER: &str = r#"
struct Shift {
    offset: vec2<f32>,
    _pad: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> shift: Shift;
@group(0) @binding(1)
var source_tex: texture_2d<f32>;
@group(0) @binding(2)
var source_sampler: sampler;

struct FullscreenOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_fullscreen(@builtin(vertex_index) index: u32) -> FullscreenOutput {
    // Oversized triangle covering the viewport: (-1,-1), (3,-1), (-1,3).
    let x = f32(i32(index & 1u) * 4 - 1);
    let y = f32(i32(index >> 1u) * 4 - 1);

    var out: FullscreenOutput;
    out.clip_position = vec4<f32>(x, y, 0.0, 1.0);
    out.uv = vec2<f32>(x * 0.5 + 0.5, 0.5 - y * 0.5);
    return out;
}

@fragment
fn fs_rgb_shift(in: FullscreenOutput) -> @location(0) vec4<f32> {
    let cr = textureSample(source_tex, source_sampler, in.uv + shift.offset);
    let cga = textureSample(source_tex, source_sampler, in.uv);
    let cb = textureSample(source_tex, source_sampler, in.uv - shift.offset);
    return vec4<f32>(cr.r, cga.g, cb.b, cga.a);
}
"#;
