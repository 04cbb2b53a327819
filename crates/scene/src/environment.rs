/// How a texture is projected when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mapping {
    /// Plain 2D lookup by texture coordinate.
    #[default]
    Uv,
    /// Panorama sampled by reflection direction.
    EquirectangularReflection,
}

/// High dynamic range panorama used for ambient lighting and reflections.
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    /// Linear RGBA texels, row-major, top row first.
    pub texels: Vec<f32>,
    pub mapping: Mapping,
}

impl EnvironmentMap {
    pub fn new(width: u32, height: u32, texels: Vec<f32>) -> Self {
        Self {
            width,
            height,
            texels,
            mapping: Mapping::default(),
        }
    }

    /// Texel at (x, y) as RGBA.
    pub fn texel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.texels
            .get(i..i + 4)
            .map(|t| [t[0], t[1], t[2], t[3]])
    }
}
