use glam::Mat4;
use lumen_common::Rotation;

/// A triangle list with its node's world transform baked in as a matrix.
#[derive(Debug, Clone)]
pub struct MeshPrimitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    /// Index into [`Model::materials`]. `None` uses the default material.
    pub material: Option<usize>,
    pub transform: Mat4,
}

impl MeshPrimitive {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Metallic-roughness material. Texture fields index [`Model::images`].
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<usize>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<usize>,
    pub emissive_factor: [f32; 3],
    pub emissive_texture: Option<usize>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
            emissive_factor: [0.0, 0.0, 0.0],
            emissive_texture: None,
        }
    }
}

/// Tightly packed 8-bit RGBA image.
#[derive(Debug, Clone)]
pub struct ImageRgba8 {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// A loaded model: flattened primitives plus the materials and images they use.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: Option<String>,
    pub primitives: Vec<MeshPrimitive>,
    pub materials: Vec<Material>,
    pub images: Vec<ImageRgba8>,
    pub rotation: Rotation,
}

impl Model {
    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(MeshPrimitive::triangle_count).sum()
    }

    pub fn material(&self, index: Option<usize>) -> Option<&Material> {
        index.and_then(|i| self.materials.get(i))
    }

    /// Rotation as a matrix, applied on top of every primitive's node transform.
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation.to_quat())
    }
}
