//! Seven-segment glyph decoding.
//!
//! A glyph's color sub-crop is binarized on its own (the same transform as
//! the region, re-run locally so segment edges stay sharp), then the
//! foreground fill ratio is measured inside seven sub-rectangles of the
//! glyph box, one per segment. The on/off pattern is matched against the
//! segment table. Segment order is top, top-left, top-right, center,
//! bottom-left, bottom-right, bottom.

use image::{imageops, GrayImage, RgbImage};
use sevenseg_core::Bounds;

use crate::params::EngineParams;
use crate::preprocess::binarize_region;

/// On/off state of the seven segments, in table order.
type SegmentVector = [bool; 7];

/// Pattern table in segment order. Unlisted patterns are unreadable.
fn lookup(on: SegmentVector) -> Option<u8> {
    match on {
        [true, true, true, false, true, true, true] => Some(0),
        [false, false, true, false, false, true, false] => Some(1),
        [true, false, true, true, true, false, true] => Some(2),
        [true, false, true, true, false, true, true] => Some(3),
        [false, true, true, true, false, true, false] => Some(4),
        [true, true, false, true, false, true, true] => Some(5),
        [true, true, false, true, true, true, true] => Some(6),
        [true, false, true, false, false, true, false] => Some(7),
        [true, true, true, true, true, true, true] => Some(8),
        [true, true, true, true, false, true, true] => Some(9),
        _ => None,
    }
}

/// Foreground fill ratio of a window in ROI coordinates. Degenerate
/// windows count as empty.
fn fill_ratio(roi: &GrayImage, x0: i32, y0: i32, x1: i32, y1: i32) -> f32 {
    let x0 = x0.clamp(0, roi.width() as i32);
    let x1 = x1.clamp(0, roi.width() as i32);
    let y0 = y0.clamp(0, roi.height() as i32);
    let y1 = y1.clamp(0, roi.height() as i32);
    if x1 <= x0 || y1 <= y0 {
        return 0.0;
    }
    let mut lit = 0u32;
    for y in y0..y1 {
        for x in x0..x1 {
            if roi.get_pixel(x as u32, y as u32)[0] != 0 {
                lit += 1;
            }
        }
    }
    lit as f32 / ((x1 - x0) * (y1 - y0)) as f32
}

/// The thin glyph "1" has no horizontal strokes; any apparent top, center
/// or bottom fill is bleed from the vertical bar, and the left-column
/// readings belong to the right column.
fn thin_correct(on: &mut SegmentVector) {
    on[0] = false;
    on[3] = false;
    on[6] = false;
    on[2] = on[1] || on[2];
    on[5] = on[4] || on[5];
    on[1] = false;
    on[4] = false;
}

/// Decode a binarized glyph ROI whose dimensions equal the glyph box.
///
/// `None` when the segment pattern matches no digit, after one retry with
/// the bottom window shifted upward (the bottom stroke of worn displays
/// sits above the nominal box edge). The retry can only switch the bottom
/// segment on, never off.
fn decode_roi(roi: &GrayImage, thin: bool, threshold: f32) -> Option<u8> {
    let (w, h) = (roi.width() as i32, roi.height() as i32);
    let mut dw = (w as f32 * 0.21) as i32;
    if thin {
        dw *= 3;
    }
    let dh = (h as f32 * 0.15) as i32;
    let dhc = (h as f32 * 0.05) as i32;

    let windows: [(i32, i32, i32, i32); 7] = [
        (0, 0, w, dh),
        (0, 0, dw, h / 2),
        (w - dw, 0, w, h / 2),
        (0, h / 2 - dhc, w, h / 2 + dhc),
        (0, h / 2, dw, h),
        (w - (1.2 * dw as f32) as i32, h / 2, w - (0.2 * dw as f32) as i32, h),
        (0, h - dh, w, h),
    ];

    let mut on: SegmentVector = [false; 7];
    for (i, &(x0, y0, x1, y1)) in windows.iter().enumerate() {
        on[i] = fill_ratio(roi, x0, y0, x1, y1) > threshold;
    }

    let finish = |mut on: SegmentVector| {
        if thin {
            thin_correct(&mut on);
        }
        lookup(on)
    };

    if let Some(digit) = finish(on) {
        return Some(digit);
    }

    let y0 = h - (1.3 * dh as f32) as i32;
    let y1 = h - (0.3 * dh as f32) as i32;
    if fill_ratio(roi, 0, y0, w, y1) > threshold {
        on[6] = true;
    }
    finish(on)
}

/// Decode one glyph out of a display crop: cut its color ROI, re-run the
/// region binarization on it, and sample the segment windows.
pub(crate) fn decode_glyph(
    region: &RgbImage,
    glyph: Bounds,
    thin_digit_width: i32,
    params: &EngineParams,
) -> Option<u8> {
    let roi = imageops::crop_imm(
        region,
        glyph.x as u32,
        glyph.y as u32,
        glyph.w as u32,
        glyph.h as u32,
    )
    .to_image();
    let bin = binarize_region(&roi, params);
    decode_roi(&bin, glyph.w < thin_digit_width, params.flood_threshold)
}
