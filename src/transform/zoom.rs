use image::imageops::{self, FilterType};

use crate::video::frame::Frame;

/// Apply a zoom factor to a frame. Output dimensions always equal input
/// dimensions.
///
/// Factor >= 1.0 crops a centered `(w/f, h/f)` region (integer truncation,
/// top-left bias on odd remainders) and rescales it back up with a linear
/// filter. Factor < 1.0 shrinks the whole frame and pastes it centered on a
/// black canvas. If either shrunken dimension truncates below one pixel the
/// result is an all-black frame.
pub fn zoom(frame: &Frame, factor: f64) -> Frame {
    let (w, h) = (frame.width(), frame.height());

    if factor >= 1.0 {
        let crop_w = (w as f64 / factor) as u32;
        let crop_h = (h as f64 / factor) as u32;
        if crop_w < 1 || crop_h < 1 {
            return Frame::black(w, h);
        }

        let x = (w - crop_w) / 2;
        let y = (h - crop_h) / 2;
        let cropped = imageops::crop_imm(frame.as_image(), x, y, crop_w, crop_h).to_image();
        let scaled = imageops::resize(&cropped, w, h, FilterType::Triangle);
        Frame::new(scaled)
    } else {
        let new_w = (w as f64 * factor) as u32;
        let new_h = (h as f64 * factor) as u32;
        if new_w < 1 || new_h < 1 {
            return Frame::black(w, h);
        }

        let scaled = imageops::resize(frame.as_image(), new_w, new_h, FilterType::Triangle);
        let mut canvas = Frame::black(w, h);
        let x = ((w - new_w) / 2) as i64;
        let y = ((h - new_h) / 2) as i64;
        imageops::overlay(canvas.as_image_mut(), &scaled, x, y);
        canvas
    }
}
