use std::fs::File;
use std::io::Read;
use std::path::Path;

use glam::{Mat4, Vec3};
use gltf::image::Format;
use lumen_scene::{ImageRgba8, Material, MeshPrimitive, Model};

use crate::error::AssetError;

const CHUNK_SIZE: usize = 64 * 1024;

/// Bytes read so far out of the file's total size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: u64,
}

impl LoadProgress {
    /// Percentage complete, or `None` when the total is unknown.
    pub fn percent(&self) -> Option<f64> {
        (self.total > 0).then(|| self.loaded as f64 / self.total as f64 * 100.0)
    }
}

/// Load a `.gltf` or `.glb` model and flatten it into world-space primitives.
///
/// `on_progress` is called after every chunk of the main file is read.
/// External buffers and images resolve relative to the file's directory.
pub fn load_model(
    path: &Path,
    mut on_progress: impl FnMut(LoadProgress),
) -> Result<Model, AssetError> {
    let _span = tracing::info_span!("load_model", path = %path.display()).entered();

    let bytes = read_with_progress(path, &mut on_progress)?;
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(&bytes)?;
    let base = path.parent();
    let buffers = gltf::import_buffers(&document, base, blob)?;
    let images = gltf::import_images(&document, base, &buffers)?;

    let model = build_model(&document, &buffers, images)?;
    tracing::debug!(
        primitives = model.primitives.len(),
        triangles = model.triangle_count(),
        materials = model.materials.len(),
        images = model.images.len(),
        "model flattened"
    );
    Ok(model)
}

fn read_with_progress(
    path: &Path,
    on_progress: &mut impl FnMut(LoadProgress),
) -> Result<Vec<u8>, AssetError> {
    let mut file = File::open(path)?;
    let total = file.metadata()?.len();
    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        on_progress(LoadProgress {
            loaded: bytes.len() as u64,
            total,
        });
    }
    if bytes.is_empty() {
        on_progress(LoadProgress { loaded: 0, total });
    }
    Ok(bytes)
}

fn build_model(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: Vec<gltf::image::Data>,
) -> Result<Model, AssetError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());

    let mut primitives = Vec::new();
    if let Some(scene) = &scene {
        for node in scene.nodes() {
            visit_node(&node, Mat4::IDENTITY, buffers, &mut primitives);
        }
    }
    if primitives.is_empty() {
        return Err(AssetError::EmptyModel);
    }

    let materials = document.materials().map(convert_material).collect();
    let images = images
        .into_iter()
        .enumerate()
        .map(|(index, data)| convert_image(index, data))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Model {
        name: scene.and_then(|s| s.name().map(str::to_string)),
        primitives,
        materials,
        images,
        ..Model::default()
    })
}

fn visit_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshPrimitive>,
) {
    let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::warn!(
                    mesh = mesh.name().unwrap_or("unnamed"),
                    mode = ?primitive.mode(),
                    "skipping non-triangle primitive"
                );
                continue;
            }
            if let Some(p) = read_primitive(&primitive, transform, buffers) {
                out.push(p);
            }
        }
    }

    for child in node.children() {
        visit_node(&child, transform, buffers, out);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive,
    transform: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Option<MeshPrimitive> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(normals) => normals.collect(),
        None => smooth_normals(&positions, &indices),
    };
    let tex_coords: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
        Some(uvs) => uvs.into_f32().collect(),
        None => vec![[0.0, 0.0]; positions.len()],
    };

    Some(MeshPrimitive {
        positions,
        normals,
        tex_coords,
        indices,
        material: primitive.material().index(),
        transform,
    })
}

/// Area-weighted vertex normals for meshes that ship without them.
fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from(positions[a]);
        let face = (Vec3::from(positions[b]) - pa).cross(Vec3::from(positions[c]) - pa);
        acc[a] += face;
        acc[b] += face;
        acc[c] += face;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

fn convert_material(material: gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let image_of = |info: Option<gltf::texture::Info<'_>>| info.map(|i| i.texture().source().index());
    Material {
        name: material.name().map(str::to_string),
        base_color_factor: pbr.base_color_factor(),
        base_color_texture: image_of(pbr.base_color_texture()),
        metallic_factor: pbr.metallic_factor(),
        roughness_factor: pbr.roughness_factor(),
        metallic_roughness_texture: image_of(pbr.metallic_roughness_texture()),
        emissive_factor: material.emissive_factor(),
        emissive_texture: image_of(material.emissive_texture()),
    }
}

fn convert_image(index: usize, data: gltf::image::Data) -> Result<ImageRgba8, AssetError> {
    let (width, height) = (data.width, data.height);
    let src = data.pixels;
    let pixels: Vec<u8> = match data.format {
        Format::R8G8B8A8 => src,
        Format::R8G8B8 => src
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => src
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[1], 0, 255])
            .collect(),
        Format::R8 => src.iter().flat_map(|&r| [r, r, r, 255]).collect(),
        // 16-bit channels are little-endian; keep the high byte.
        Format::R16G16B16A16 => src
            .chunks_exact(8)
            .flat_map(|p| [p[1], p[3], p[5], p[7]])
            .collect(),
        Format::R16G16B16 => src
            .chunks_exact(6)
            .flat_map(|p| [p[1], p[3], p[5], 255])
            .collect(),
        other => {
            return Err(AssetError::UnsupportedImageFormat {
                index,
                format: format!("{other:?}"),
            });
        }
    };
    Ok(ImageRgba8 {
        width,
        height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{EMPTY_GLTF, TRIANGLE_GLTF, write_temp};

    #[test]
    fn progress_percent() {
        let p = LoadProgress {
            loaded: 50,
            total: 200,
        };
        assert_eq!(p.percent(), Some(25.0));
        let unknown = LoadProgress {
            loaded: 10,
            total: 0,
        };
        assert_eq!(unknown.percent(), None);
    }

    #[test]
    fn loads_embedded_triangle() {
        let tmp = write_temp(TRIANGLE_GLTF.as_bytes(), ".gltf");
        let model = load_model(tmp.path(), |_| {}).unwrap();

        assert_eq!(model.primitives.len(), 1);
        assert_eq!(model.triangle_count(), 1);
        let prim = &model.primitives[0];
        assert_eq!(prim.indices, vec![0, 1, 2]);
        assert_eq!(prim.positions[1], [1.0, 0.0, 0.0]);
        assert_eq!(prim.tex_coords.len(), 3);
        assert_eq!(prim.transform.w_axis.y, 2.0);
        assert_eq!(prim.material, Some(0));
    }

    #[test]
    fn missing_normals_are_generated() {
        let tmp = write_temp(TRIANGLE_GLTF.as_bytes(), ".gltf");
        let model = load_model(tmp.path(), |_| {}).unwrap();
        for n in &model.primitives[0].normals {
            assert_eq!(*n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn materials_are_converted() {
        let tmp = write_temp(TRIANGLE_GLTF.as_bytes(), ".gltf");
        let model = load_model(tmp.path(), |_| {}).unwrap();
        let mat = model.material(Some(0)).unwrap();
        assert_eq!(mat.name.as_deref(), Some("red"));
        assert_eq!(mat.base_color_factor, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mat.metallic_factor, 0.25);
        assert_eq!(mat.roughness_factor, 0.75);
        assert_eq!(mat.emissive_factor, [0.1, 0.2, 0.3]);
        assert!(mat.base_color_texture.is_none());
    }

    #[test]
    fn progress_reaches_total() {
        let tmp = write_temp(TRIANGLE_GLTF.as_bytes(), ".gltf");
        let mut seen = Vec::new();
        load_model(tmp.path(), |p| seen.push(p)).unwrap();

        let last = seen.last().copied().unwrap();
        assert_eq!(last.loaded, last.total);
        assert_eq!(last.total, TRIANGLE_GLTF.len() as u64);
        assert!(seen.windows(2).all(|w| w[0].loaded <= w[1].loaded));
    }

    #[test]
    fn model_without_geometry_is_rejected() {
        let tmp = write_temp(EMPTY_GLTF.as_bytes(), ".gltf");
        let err = load_model(tmp.path(), |_| {}).unwrap_err();
        assert!(matches!(err, AssetError::EmptyModel));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_model(Path::new("/no/such/model.gltf"), |_| {}).unwrap_err();
        assert!(matches!(err, AssetError::Io(_)));
    }

    #[test]
    fn invalid_json_is_gltf_error() {
        let tmp = write_temp(b"{ not gltf", ".gltf");
        let err = load_model(tmp.path(), |_| {}).unwrap_err();
        assert!(matches!(err, AssetError::Gltf(_)));
    }

    #[test]
    fn rgb_images_gain_opaque_alpha() {
        let data = gltf::image::Data {
            pixels: vec![10, 20, 30, 40, 50, 60],
            format: Format::R8G8B8,
            width: 2,
            height: 1,
        };
        let img = convert_image(0, data).unwrap();
        assert_eq!(img.pixels, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn float_images_are_unsupported() {
        let data = gltf::image::Data {
            pixels: vec![0; 12],
            format: Format::R32G32B32FLOAT,
            width: 1,
            height: 1,
        };
        assert!(matches!(
            convert_image(3, data),
            Err(AssetError::UnsupportedImageFormat { index: 3, .. })
        ));
    }
}
