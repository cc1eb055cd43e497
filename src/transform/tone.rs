use crate::video::frame::Frame;

/// Remap one channel value: `min(round(|contrast * v + brightness|), 255)`.
///
/// The absolute value means strongly negative results fold back into the
/// visible range instead of clamping to zero.
pub fn scale_abs(value: u8, contrast: f32, brightness: i32) -> u8 {
    let mapped = (contrast * value as f32 + brightness as f32).abs().round();
    if mapped > 255.0 {
        255
    } else {
        mapped as u8
    }
}

/// Apply a brightness/contrast remap uniformly across all three channels
pub fn adjust(frame: &Frame, brightness: i32, contrast: f32) -> Frame {
    let mut out = frame.clone();
    for value in out.as_image_mut().iter_mut() {
        *value = scale_abs(*value, contrast, brightness);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn identity_parameters_leave_pixels_unchanged() {
        let mut frame = Frame::black(4, 4);
        frame.put_pixel(1, 1, Rgb([10, 128, 250]));
        let out = adjust(&frame, 0, 1.0);
        assert_eq!(out.get_pixel(1, 1), Rgb([10, 128, 250]));
        assert_eq!(out.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn high_values_saturate_at_255() {
        assert_eq!(scale_abs(200, 2.0, 0), 255);
        assert_eq!(scale_abs(250, 1.0, 100), 255);
        assert_eq!(scale_abs(255, 3.0, 100), 255);
    }

    #[test]
    fn negative_results_fold_through_absolute_value() {
        // 1.0 * 10 - 100 = -90, |.| = 90
        assert_eq!(scale_abs(10, 1.0, -100), 90);
        assert_eq!(scale_abs(0, 1.0, -100), 100);
    }

    #[test]
    fn rounding_is_to_nearest() {
        // 0.5 * 101 = 50.5 rounds to 51 (away from zero)
        assert_eq!(scale_abs(101, 0.5, 0), 51);
        // 0.5 * 100 = 50.0
        assert_eq!(scale_abs(100, 0.5, 0), 50);
    }

    #[test]
    fn adjust_preserves_dimensions() {
        let frame = Frame::black(17, 9);
        let out = adjust(&frame, 50, 1.5);
        assert_eq!(out.width(), 17);
        assert_eq!(out.height(), 9);
    }
}
