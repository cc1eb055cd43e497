use image::Rgb;
use rayon::prelude::*;

use crate::{config::FilterKind, video::frame::Frame};

const EDGE_LOW_THRESHOLD: i32 = 100;
const EDGE_HIGH_THRESHOLD: i32 = 200;

/// Apply the selected pixel filter. Output dimensions equal input dimensions
/// and the result is always three-channel, even for gray and edge maps.
pub fn apply(frame: &Frame, kind: &FilterKind) -> Frame {
    match kind {
        FilterKind::Gray => gray(frame),
        FilterKind::Blur { kernel } => blur(frame, *kernel),
        FilterKind::Edge => edge(frame),
    }
}

/// Rec.601 luma for one pixel
fn luma(pixel: Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

/// Single-channel luma plane in row-major order
fn luma_plane(frame: &Frame) -> Vec<u8> {
    frame
        .as_raw()
        .chunks_exact(3)
        .map(|px| luma(Rgb([px[0], px[1], px[2]])))
        .collect()
}

/// Grayscale conversion, luma replicated back to all three channels
fn gray(frame: &Frame) -> Frame {
    let mut out = frame.clone();
    for pixel in out.as_image_mut().pixels_mut() {
        let y = luma(*pixel);
        *pixel = Rgb([y, y, y]);
    }
    out
}

/// Normalized 1-D Gaussian weights for a square kernel of side `k` (odd).
///
/// Sigma follows the kernel size: `0.3 * ((k - 1) * 0.5 - 1) + 0.8`.
fn gaussian_kernel(k: usize) -> Vec<f32> {
    let sigma = 0.3 * ((k as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let radius = (k / 2) as isize;
    let mut weights: Vec<f32> = (-radius..=radius)
        .map(|x| (-(x * x) as f32 / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Separable Gaussian blur with replicated borders, row-parallel
fn blur(frame: &Frame, kernel: u32) -> Frame {
    let k = crate::config::ensure_odd(kernel) as usize;
    if k <= 1 {
        return frame.clone();
    }

    let w = frame.width() as usize;
    let h = frame.height() as usize;
    let weights = gaussian_kernel(k);
    let radius = (k / 2) as isize;
    let src = frame.as_raw();
    let row_len = w * 3;

    // Horizontal pass into f32 to avoid double quantization
    let mut tmp = vec![0f32; w * h * 3];
    tmp.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, out_row)| {
            let in_row = &src[y * row_len..(y + 1) * row_len];
            for x in 0..w {
                for c in 0..3 {
                    let mut acc = 0f32;
                    for (i, weight) in weights.iter().enumerate() {
                        let sx = (x as isize + i as isize - radius).clamp(0, w as isize - 1);
                        acc += weight * in_row[sx as usize * 3 + c] as f32;
                    }
                    out_row[x * 3 + c] = acc;
                }
            }
        });

    // Vertical pass back to u8
    let mut out = vec![0u8; w * h * 3];
    out.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, out_row)| {
            for x in 0..w {
                for c in 0..3 {
                    let mut acc = 0f32;
                    for (i, weight) in weights.iter().enumerate() {
                        let sy = (y as isize + i as isize - radius).clamp(0, h as isize - 1);
                        acc += weight * tmp[sy as usize * row_len + x * 3 + c];
                    }
                    out_row[x * 3 + c] = acc.round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    Frame::from_raw(w as u32, h as u32, out)
        .unwrap_or_else(|| Frame::black(w as u32, h as u32))
}

/// Gradient direction quantized to four bins for non-maximum suppression
fn quantize_direction(gx: i32, gy: i32) -> u8 {
    let angle = (gy as f32).atan2(gx as f32).to_degrees();
    let angle = if angle < 0.0 { angle + 180.0 } else { angle };
    if !(22.5..157.5).contains(&angle) {
        0 // horizontal gradient, compare left/right
    } else if angle < 67.5 {
        1 // diagonal /
    } else if angle < 112.5 {
        2 // vertical gradient, compare up/down
    } else {
        3 // diagonal \
    }
}

/// Canny-style edge map: Sobel gradients on luma, non-maximum suppression,
/// dual-threshold hysteresis. Binary 0/255 output on all three channels.
fn edge(frame: &Frame) -> Frame {
    let w = frame.width() as usize;
    let h = frame.height() as usize;
    if w < 3 || h < 3 {
        return Frame::black(w as u32, h as u32);
    }

    let plane = luma_plane(frame);
    let at = |x: isize, y: isize| -> i32 {
        let x = x.clamp(0, w as isize - 1) as usize;
        let y = y.clamp(0, h as isize - 1) as usize;
        plane[y * w + x] as i32
    };

    // 3x3 Sobel, L1 magnitude
    let mut mag = vec![0i32; w * h];
    let mut dir = vec![0u8; w * h];
    mag.par_chunks_mut(w)
        .zip(dir.par_chunks_mut(w))
        .enumerate()
        .for_each(|(y, (mag_row, dir_row))| {
            let y = y as isize;
            for x in 0..w as isize {
                let gx = -at(x - 1, y - 1) + at(x + 1, y - 1) - 2 * at(x - 1, y)
                    + 2 * at(x + 1, y)
                    - at(x - 1, y + 1)
                    + at(x + 1, y + 1);
                let gy = -at(x - 1, y - 1) - 2 * at(x, y - 1) - at(x + 1, y - 1)
                    + at(x - 1, y + 1)
                    + 2 * at(x, y + 1)
                    + at(x + 1, y + 1);
                mag_row[x as usize] = gx.abs() + gy.abs();
                dir_row[x as usize] = quantize_direction(gx, gy);
            }
        });

    // Non-maximum suppression along the quantized gradient direction
    let mut nms = vec![0i32; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            let (a, b) = match dir[idx] {
                0 => (mag[idx - 1], mag[idx + 1]),
                1 => (mag[idx - w + 1], mag[idx + w - 1]),
                2 => (mag[idx - w], mag[idx + w]),
                _ => (mag[idx - w - 1], mag[idx + w + 1]),
            };
            if mag[idx] >= a && mag[idx] >= b {
                nms[idx] = mag[idx];
            }
        }
    }

    // Hysteresis: strong pixels seed, weak pixels join when 8-connected
    let mut edges = vec![false; w * h];
    let mut stack = Vec::new();
    for (idx, &m) in nms.iter().enumerate() {
        if m >= EDGE_HIGH_THRESHOLD && !edges[idx] {
            edges[idx] = true;
            stack.push(idx);
            while let Some(cur) = stack.pop() {
                let cx = (cur % w) as isize;
                let cy = (cur / w) as isize;
                for dy in -1..=1isize {
                    for dx in -1..=1isize {
                        let nx = cx + dx;
                        let ny = cy + dy;
                        if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                            continue;
                        }
                        let n = ny as usize * w + nx as usize;
                        if !edges[n] && nms[n] >= EDGE_LOW_THRESHOLD {
                            edges[n] = true;
                            stack.push(n);
                        }
                    }
                }
            }
        }
    }

    let out: Vec<u8> = edges
        .iter()
        .flat_map(|&e| {
            let v = if e { 255u8 } else { 0 };
            [v, v, v]
        })
        .collect();
    Frame::from_raw(w as u32, h as u32, out)
        .unwrap_or_else(|| Frame::black(w as u32, h as u32))
}
