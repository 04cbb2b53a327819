use image::ImageFormat;
use lumen_scene::EnvironmentMap;

use crate::error::AssetError;
use crate::source::AssetSource;

/// Fetch and decode a Radiance HDR panorama.
///
/// The returned map keeps the default mapping; the caller decides how it is
/// projected when it is assigned to a scene.
pub fn load_environment(source: &AssetSource) -> Result<EnvironmentMap, AssetError> {
    let _span = tracing::info_span!("load_environment", %source).entered();
    let bytes = source.read()?;
    decode_hdr(&bytes)
}

/// Decode Radiance HDR bytes into linear RGBA texels.
pub fn decode_hdr(bytes: &[u8]) -> Result<EnvironmentMap, AssetError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Hdr)?;
    let rgba = img.to_rgba32f();
    let (width, height) = (rgba.width(), rgba.height());
    tracing::debug!(width, height, "decoded HDR environment");
    Ok(EnvironmentMap::new(width, height, rgba.into_raw()))
}
