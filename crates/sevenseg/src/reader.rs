//! Reading assembly: from a frame to a two-digit temperature.

use std::path::Path;

use image::{imageops, RgbImage};

use crate::debug_dump::DebugSink;
use crate::decode::decode_glyph;
use crate::error::ReadError;
use crate::features::{detect_reference_features, CalibrationFeature, FeatureMap, ReferenceCategory};
use crate::glyphs::extract_glyphs;
use crate::params::EngineParams;
use crate::preprocess::{binarize_region, resize_to_height};
use crate::region::resolve_region;

/// The recognition engine. Holds the tuning parameters; all per-call state
/// lives on the stack.
#[derive(Clone, Debug, Default)]
pub struct DisplayReader {
    params: EngineParams,
}

impl DisplayReader {
    pub fn new(params: EngineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Read the displayed temperature from a frame. `None` when no
    /// calibration feature leads to two decodable glyphs.
    pub fn read_image(&self, frame: &RgbImage, dbg: &DebugSink) -> Option<u32> {
        let resized = resize_to_height(frame, self.params.reference_height);
        dbg.save_rgb("00-input.png", &resized);
        let features = detect_reference_features(&resized, &self.params, dbg);
        self.read_with_features(&resized, &features, dbg)
    }

    /// Read from a frame already resized to the reference height, using
    /// previously detected features. Categories are tried in fixed
    /// reliability order; the first feature whose display region yields
    /// two decodable glyphs wins.
    pub fn read_with_features(
        &self,
        frame: &RgbImage,
        features: &FeatureMap,
        dbg: &DebugSink,
    ) -> Option<u32> {
        for category in ReferenceCategory::PRIORITY {
            for (i, feature) in features.get(category).iter().enumerate() {
                if let Some(reading) = self.try_feature(frame, feature, i, dbg) {
                    log::info!("reading {reading} via {category}");
                    return Some(reading);
                }
            }
        }
        log::debug!("no feature produced a reading");
        None
    }

    /// Load an image file and read it. Only the load can fail; an
    /// unrecognized display is `Ok(None)`.
    pub fn read_path(&self, path: impl AsRef<Path>, dbg: &DebugSink) -> Result<Option<u32>, ReadError> {
        let path = path.as_ref();
        let frame = image::open(path)
            .map_err(|source| ReadError::Load {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        Ok(self.read_image(&frame, dbg))
    }

    fn try_feature(
        &self,
        frame: &RgbImage,
        feature: &CalibrationFeature,
        index: usize,
        dbg: &DebugSink,
    ) -> Option<u32> {
        let resolved = resolve_region(feature, frame.width(), frame.height())?;
        let rect = resolved.rect;
        let crop = imageops::crop_imm(
            frame,
            rect.left as u32,
            rect.top as u32,
            rect.width() as u32,
            rect.height() as u32,
        )
        .to_image();
        dbg.save_rgb(&format!("03-{}-{index}-display.png", feature.category), &crop);
        // The archive is written per attempt, independent of whether the
        // decode below succeeds.
        dbg.archive_display(&crop);

        let bin = binarize_region(&crop, &self.params);
        dbg.save_gray(&format!("04-{}-{index}-binary.png", feature.category), &bin);

        let glyphs = extract_glyphs(&bin, resolved.retrieval, &self.params);
        if glyphs.len() < 2 {
            log::debug!("{}: {} glyph(s), need 2", feature.category, glyphs.len());
            return None;
        }

        // Only the two leftmost glyphs carry the temperature.
        let mut digits = [0u8; 2];
        for (d, glyph) in glyphs.iter().take(2).enumerate() {
            if dbg.is_enabled() {
                dbg.save_rgb(
                    &format!("05-{}-{index}-glyph-{}.png", feature.category, d + 1),
                    &imageops::crop_imm(
                        &crop,
                        glyph.x as u32,
                        glyph.y as u32,
                        glyph.w as u32,
                        glyph.h as u32,
                    )
                    .to_image(),
                );
            }
            digits[d] = decode_glyph(&crop, *glyph, resolved.thin_digit_width, &self.params)?;
        }
        Some(u32::from(digits[0]) * 10 + u32::from(digits[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_frame_reads_nothing() {
        let reader = DisplayReader::default();
        let frame = RgbImage::new(640, 480);
        assert_eq!(reader.read_image(&frame, &DebugSink::disabled()), None);
    }

    #[test]
    fn empty_feature_map_reads_nothing() {
        let reader = DisplayReader::default();
        let frame = RgbImage::new(1920, 1080);
        let features = FeatureMap::default();
        assert_eq!(
            reader.read_with_features(&frame, &features, &DebugSink::disabled()),
            None
        );
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let reader = DisplayReader::default();
        let err = reader
            .read_path("/nonexistent/frame.jpg", &DebugSink::disabled())
            .unwrap_err();
        assert!(matches!(err, ReadError::Load { .. }));
    }
}
