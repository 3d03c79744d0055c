use serde::{Deserialize, Serialize};

/// Configuration for the recognition engine.
///
/// Every tunable that is *not* a per-category calibration constant lives
/// here; the per-category classification rules and region recipes are data
/// tables in [`crate::features`] and [`crate::region`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineParams {
    /// Frames are resized to this height before any analysis. All pixel
    /// constants below (and the calibration tables) are tuned at this scale.
    pub reference_height: u32,
    /// Gaussian blur sigma applied before the frame-level threshold.
    pub blur_sigma: f32,
    /// Half block size of the mean adaptive threshold (block = 2·r + 1).
    pub thresh_block_radius: u32,
    /// Bias subtracted from the local mean before comparison (OpenCV `C`).
    /// Negative values raise the cut above the mean.
    pub thresh_bias: i32,
    /// Height of the vertical opening kernel that suppresses horizontal
    /// noise lines after thresholding.
    pub vertical_open: u32,
    /// Canny hysteresis thresholds for the frame edge map.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Number of largest edge contours examined by the feature classifier.
    /// Reference features are printed panel artwork and always rank among
    /// the biggest shapes.
    pub max_feature_candidates: usize,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub approx_tolerance: f64,
    /// Run the glyph clusterer when a region yields at least this many
    /// contours (excellent-quality photos split glyphs into fragments).
    pub cluster_trigger: usize,
    /// Merge threshold handed to the clusterer at the glyph call site.
    pub cluster_distance: f32,
    /// Admissible glyph bounding-box width, inclusive, at reference scale.
    pub glyph_width: [i32; 2],
    /// Admissible glyph bounding-box height, inclusive, at reference scale.
    pub glyph_height: [i32; 2],
    /// A segment is "on" when its foreground fill ratio exceeds this.
    /// Field deployments used both 0.44 and 0.50; 0.44 is the permissive
    /// default.
    pub flood_threshold: f32,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            reference_height: 1080,
            blur_sigma: 2.0,
            thresh_block_radius: 18,
            thresh_bias: -30,
            vertical_open: 5,
            canny_low: 50.0,
            canny_high: 200.0,
            max_feature_candidates: 10,
            approx_tolerance: 0.02,
            cluster_trigger: 8,
            cluster_distance: 3.0,
            glyph_width: [10, 62],
            glyph_height: [44, 85],
            flood_threshold: 0.44,
        }
    }
}

impl EngineParams {
    #[inline]
    pub(crate) fn glyph_size_ok(&self, w: i32, h: i32) -> bool {
        (self.glyph_width[0]..=self.glyph_width[1]).contains(&w)
            && (self.glyph_height[0]..=self.glyph_height[1]).contains(&h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_roundtrip_through_json() {
        let params = EngineParams::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: EngineParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back.reference_height, 1080);
        assert_eq!(back.glyph_width, [10, 62]);
        assert_relative_eq!(back.flood_threshold, 0.44);
    }

    #[test]
    fn glyph_size_bounds_are_inclusive() {
        let params = EngineParams::default();
        assert!(params.glyph_size_ok(10, 44));
        assert!(params.glyph_size_ok(62, 85));
        assert!(!params.glyph_size_ok(9, 44));
        assert!(!params.glyph_size_ok(10, 86));
    }
}
