//! Frame and region binarization.
//!
//! The frame-level pipeline (blur, adaptive threshold, vertical opening,
//! Canny) feeds the calibration feature detector; the region-level
//! transform binarizes display crops so glyph strokes become foreground.

use image::{imageops, GrayImage, RgbImage};

use crate::params::EngineParams;

/// Resize a frame to the reference height, preserving aspect ratio.
pub(crate) fn resize_to_height(frame: &RgbImage, height: u32) -> RgbImage {
    if frame.height() == height {
        return frame.clone();
    }
    let scale = height as f64 / frame.height() as f64;
    let width = ((frame.width() as f64 * scale).round() as u32).max(1);
    imageops::resize(frame, width, height, imageops::FilterType::Triangle)
}

/// Mean-based adaptive threshold, inverted: a pixel becomes foreground
/// (255) when `src <= local_mean - bias`.
///
/// `bias` follows OpenCV's `C` convention, so the calibrated `-30` raises
/// the cut 30 levels above the local mean. The local window is
/// `(2·block_radius + 1)²`, clipped at the image border.
pub(crate) fn adaptive_threshold_inv(src: &GrayImage, block_radius: u32, bias: i32) -> GrayImage {
    let (w, h) = src.dimensions();
    let mut out = GrayImage::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }

    let (wu, hu) = (w as usize, h as usize);
    let stride = wu + 1;
    let mut sat = vec![0u64; stride * (hu + 1)];
    for y in 0..hu {
        let mut row = 0u64;
        for x in 0..wu {
            row += u64::from(src.as_raw()[y * wu + x]);
            sat[(y + 1) * stride + x + 1] = sat[y * stride + x + 1] + row;
        }
    }

    let r = i64::from(block_radius);
    for y in 0..hu {
        for x in 0..wu {
            let x0 = (x as i64 - r).max(0) as usize;
            let y0 = (y as i64 - r).max(0) as usize;
            let x1 = ((x as i64 + r).min(wu as i64 - 1) + 1) as usize;
            let y1 = ((y as i64 + r).min(hu as i64 - 1) + 1) as usize;
            let area = ((x1 - x0) * (y1 - y0)) as i64;
            let sum = (sat[y1 * stride + x1] + sat[y0 * stride + x0])
                - (sat[y0 * stride + x1] + sat[y1 * stride + x0]);
            let mean = sum as i64 / area;
            let cut = mean - i64::from(bias);
            let v = i64::from(src.as_raw()[y * wu + x]);
            out.as_mut()[y * wu + x] = if v <= cut { 255 } else { 0 };
        }
    }
    out
}

/// Binary opening with a 1×k vertical kernel.
///
/// Removes foreground runs shorter than `k` pixels within a column, which
/// is how thin horizontal noise strips from the adaptive threshold are
/// suppressed. Pixels outside the image count as foreground during
/// erosion so edge-touching strokes survive.
pub(crate) fn open_vertical(src: &GrayImage, k: u32) -> GrayImage {
    if k <= 1 {
        return src.clone();
    }
    let (w, h) = src.dimensions();
    let half = (k / 2) as i64;

    let mut eroded = GrayImage::new(w, h);
    for x in 0..w {
        for y in 0..h {
            let mut keep = true;
            for dy in -half..=half {
                let yy = y as i64 + dy;
                if yy < 0 || yy >= h as i64 {
                    continue;
                }
                if src.get_pixel(x, yy as u32)[0] == 0 {
                    keep = false;
                    break;
                }
            }
            eroded.put_pixel(x, y, image::Luma([if keep { 255 } else { 0 }]));
        }
    }

    let mut opened = GrayImage::new(w, h);
    for x in 0..w {
        for y in 0..h {
            let mut on = false;
            for dy in -half..=half {
                let yy = y as i64 + dy;
                if yy < 0 || yy >= h as i64 {
                    continue;
                }
                if eroded.get_pixel(x, yy as u32)[0] != 0 {
                    on = true;
                    break;
                }
            }
            opened.put_pixel(x, y, image::Luma([if on { 255 } else { 0 }]));
        }
    }
    opened
}

/// Region-level binarization: grayscale, adaptive inverse threshold,
/// vertical opening, then a final inversion.
///
/// The double inversion means foreground ends up on pixels that stand out
/// *bright* against their neighborhood, which is where the display's lit
/// strokes (and their halos on dark panels) land.
pub(crate) fn binarize_region(crop: &RgbImage, params: &EngineParams) -> GrayImage {
    let gray = imageops::grayscale(crop);
    let thresh = adaptive_threshold_inv(&gray, params.thresh_block_radius, params.thresh_bias);
    let mut opened = open_vertical(&thresh, params.vertical_open);
    imageops::invert(&mut opened);
    opened
}
