use lumen_common::Rotation;
use lumen_common::constants::POINTER_SENSITIVITY;

/// Map a pointer position to an absolute model rotation.
///
/// The position is normalized to [-1, 1] across the viewport (centre is 0)
/// and scaled by [`POINTER_SENSITIVITY`]. Horizontal position drives yaw,
/// vertical position drives pitch. `x`/`y` must be in the same units as
/// `width`/`height`.
pub fn pointer_rotation(x: f64, y: f64, width: f64, height: f64) -> Rotation {
    let nx = (x / width) * 2.0 - 1.0;
    let ny = (y / height) * 2.0 - 1.0;
    Rotation {
        pitch: ny as f32 * POINTER_SENSITIVITY,
        yaw: nx as f32 * POINTER_SENSITIVITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn assert_rotation(r: Rotation, pitch: f32, yaw: f32) {
        assert!((r.pitch - pitch).abs() < EPS, "pitch {} != {pitch}", r.pitch);
        assert!((r.yaw - yaw).abs() < EPS, "yaw {} != {yaw}", r.yaw);
    }

    #[test]
    fn center_is_zero() {
        assert_rotation(pointer_rotation(640.0, 360.0, 1280.0, 720.0), 0.0, 0.0);
        assert_rotation(pointer_rotation(0.5, 0.5, 1.0, 1.0), 0.0, 0.0);
    }

    #[test]
    fn far_corner_is_positive_sensitivity() {
        assert_rotation(pointer_rotation(1280.0, 720.0, 1280.0, 720.0), 0.4, 0.4);
    }

    #[test]
    fn origin_corner_is_negative_sensitivity() {
        assert_rotation(pointer_rotation(0.0, 0.0, 1280.0, 720.0), -0.4, -0.4);
    }

    #[test]
    fn axes_are_independent() {
        // Right edge, vertical centre: yaw only.
        assert_rotation(pointer_rotation(800.0, 300.0, 800.0, 600.0), 0.0, 0.4);
        // Horizontal centre, top edge: pitch only.
        assert_rotation(pointer_rotation(400.0, 0.0, 800.0, 600.0), -0.4, 0.0);
    }

    #[test]
    fn mapping_is_absolute() {
        let a = pointer_rotation(100.0, 100.0, 1000.0, 1000.0);
        let b = pointer_rotation(900.0, 900.0, 1000.0, 1000.0);
        let a_again = pointer_rotation(100.0, 100.0, 1000.0, 1000.0);
        assert_ne!(a, b);
        assert_eq!(a, a_again);
    }
}
