use glam::{EulerRot, Quat};

use crate::constants::MAX_PIXEL_RATIO;

/// Size of the drawable area in physical pixels plus the display scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// Width over height. Callers guard against zero-area viewports.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Device pixel ratio clamped to [`MAX_PIXEL_RATIO`].
    pub fn pixel_ratio(&self) -> f64 {
        self.scale_factor.min(MAX_PIXEL_RATIO)
    }

    /// Resolution offscreen render targets are allocated at: the logical
    /// size multiplied by the clamped pixel ratio.
    pub fn render_size(&self) -> (u32, u32) {
        let scale = if self.scale_factor > 0.0 {
            self.pixel_ratio() / self.scale_factor
        } else {
            1.0
        };
        let w = (self.width as f64 * scale).round() as u32;
        let h = (self.height as f64 * scale).round() as u32;
        (w.max(1), h.max(1))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720, 1.0)
    }
}

/// Euler rotation applied to the model, in radians, XYZ order.
///
/// `pitch` rotates about X, `yaw` about Y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
}

impl Rotation {
    pub const ZERO: Self = Self {
        pitch: 0.0,
        yaw: 0.0,
    };

    pub fn new(pitch: f32, yaw: f32) -> Self {
        Self { pitch, yaw }
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_is_width_over_height() {
        let vp = Viewport::new(1920, 1080, 1.0);
        assert_eq!(vp.aspect(), 1920.0 / 1080.0);
    }

    #[test]
    fn pixel_ratio_is_clamped() {
        assert_eq!(Viewport::new(100, 100, 1.0).pixel_ratio(), 1.0);
        assert_eq!(Viewport::new(100, 100, 1.5).pixel_ratio(), 1.5);
        assert_eq!(Viewport::new(100, 100, 3.0).pixel_ratio(), 2.0);
    }

    #[test]
    fn render_size_follows_clamped_ratio() {
        // 3x display: 600x300 physical is 200x100 logical, rendered at 2x.
        let vp = Viewport::new(600, 300, 3.0);
        assert_eq!(vp.render_size(), (400, 200));

        let vp = Viewport::new(800, 600, 2.0);
        assert_eq!(vp.render_size(), (800, 600));
    }

    #[test]
    fn empty_viewport_detected() {
        assert!(Viewport::new(0, 720, 1.0).is_empty());
        assert!(!Viewport::default().is_empty());
    }

    #[test]
    fn value_types_are_plain_copies() {
        let vp = Viewport::default();
        let copy = vp;
        assert_eq!(vp, copy);
        assert_eq!(Rotation::default(), Rotation::ZERO);
    }

    #[test]
    fn zero_rotation_is_identity() {
        assert_eq!(Rotation::ZERO.to_quat(), Quat::IDENTITY);
    }
}
