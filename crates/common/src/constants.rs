//! Fixed viewer parameters. These are literal constants, not configuration.

/// Vertical field of view of the camera, in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 25.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 100.0;
/// Distance of the camera from the origin along +Z.
pub const CAMERA_DISTANCE: f32 = 5.0;

/// Upper bound applied to the display scale factor.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

pub const RGB_SHIFT_AMOUNT: f32 = 0.0015;
pub const RGB_SHIFT_ANGLE: f32 = 0.0;

/// Scale from normalized pointer position ([-1, 1]) to model rotation in radians.
pub const POINTER_SENSITIVITY: f32 = 0.4;

pub const DEFAULT_MODEL_PATH: &str = "./DamagedHelmet.gltf";
pub const DEFAULT_ENVIRONMENT_URL: &str =
    "https://dl.polyhaven.org/file/ph-assets/HDRIs/hdr/4k/pond_bridge_night_4k.hdr";

pub const FALLBACK_MESSAGE: &str = "GPU rendering is not available on this system. \
Please update your graphics drivers or try a different machine.";
