//! Calibration feature detection.
//!
//! The thermostat panel carries printed artwork (curly brackets, helper
//! frames, a top line, a logo mark) whose shape and position are stable
//! across photographs. The detector traces the frame's edge map, examines
//! the largest contours and classifies them against a fixed rule table
//! keyed on simplified-polygon vertex count, raw point count, bounding-box
//! size and frame half. Each classified contour becomes a
//! [`CalibrationFeature`] from which the display region is later derived.

use std::collections::BTreeMap;
use std::fmt;

use image::RgbImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point as IpPoint;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use sevenseg_core::{Bounds, Contour, Extremes};

use crate::debug_dump::DebugSink;
use crate::params::EngineParams;
use crate::preprocess::{adaptive_threshold_inv, open_vertical};

/// The closed set of panel artifacts the detector recognizes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceCategory {
    TopLine,
    LeftCurly,
    RightCurly,
    OuterHelper,
    OuterHelperAlt,
    TopHelper,
    ManualDisplay,
    LogoMark,
}

impl ReferenceCategory {
    /// Assembly order: the curly panel marks are the most reliable, the
    /// logo mark the least.
    pub const PRIORITY: [ReferenceCategory; 8] = [
        ReferenceCategory::LeftCurly,
        ReferenceCategory::RightCurly,
        ReferenceCategory::OuterHelperAlt,
        ReferenceCategory::OuterHelper,
        ReferenceCategory::TopHelper,
        ReferenceCategory::TopLine,
        ReferenceCategory::ManualDisplay,
        ReferenceCategory::LogoMark,
    ];
}

impl fmt::Display for ReferenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceCategory::TopLine => "top-line",
            ReferenceCategory::LeftCurly => "left-curly",
            ReferenceCategory::RightCurly => "right-curly",
            ReferenceCategory::OuterHelper => "outer-top-helper",
            ReferenceCategory::OuterHelperAlt => "outer-top-helper-alt",
            ReferenceCategory::TopHelper => "top-helper",
            ReferenceCategory::ManualDisplay => "manual-display",
            ReferenceCategory::LogoMark => "logo-mark",
        };
        f.write_str(name)
    }
}

/// One classified panel artifact.
#[derive(Clone, Debug)]
pub struct CalibrationFeature {
    pub category: ReferenceCategory,
    pub contour: Contour,
    pub extremes: Extremes,
    /// `right.x − left.x` of the raw contour.
    pub width: i32,
    /// `bottom.y − top.y` of the raw contour.
    pub height: i32,
    /// Vertical placement correction for the scale variant that matched.
    pub ty_shift: i32,
}

impl CalibrationFeature {
    /// Build a feature from a traced contour. `None` for empty contours.
    pub fn from_contour(
        category: ReferenceCategory,
        contour: Contour,
        ty_shift: i32,
    ) -> Option<Self> {
        let extremes = contour.extremes()?;
        Some(Self {
            category,
            width: extremes.width(),
            height: extremes.height(),
            extremes,
            contour,
            ty_shift,
        })
    }
}

/// Per-category feature lists, in detection order (contour area descending).
#[derive(Clone, Debug, Default)]
pub struct FeatureMap {
    by_category: BTreeMap<ReferenceCategory, Vec<CalibrationFeature>>,
}

impl FeatureMap {
    pub fn insert(&mut self, feature: CalibrationFeature) {
        self.by_category
            .entry(feature.category)
            .or_default()
            .push(feature);
    }

    pub fn get(&self, category: ReferenceCategory) -> &[CalibrationFeature] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_category.values().all(Vec::is_empty)
    }

    pub fn categories(&self) -> impl Iterator<Item = ReferenceCategory> + '_ {
        self.by_category
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| *k)
    }
}

/// Which half of the frame the contour's first traced point must fall in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameHalf {
    Left,
    Right,
    Any,
}

/// One classification rule. First match wins; the rules are mutually
/// exclusive by construction. Two rules per curly bracket exist because
/// the artwork is photographed at two different scales in the field.
struct ClassRule {
    category: ReferenceCategory,
    /// Admissible vertex counts of the simplified polygon.
    vertices: &'static [usize],
    /// Minimum raw point count of the traced contour.
    min_points: usize,
    half: FrameHalf,
    /// Inclusive bounding-box bounds of the simplified polygon.
    min_w: i32,
    max_w: i32,
    min_h: i32,
    max_h: i32,
    ty_shift: i32,
    /// Also register the feature under [`ReferenceCategory::OuterHelperAlt`].
    also_alt: bool,
    /// Keep only the first match in this category.
    once: bool,
}

impl ClassRule {
    fn matches(
        &self,
        vertex_count: usize,
        point_count: usize,
        first_x: i32,
        mid_x: i32,
        b: Bounds,
    ) -> bool {
        if !self.vertices.contains(&vertex_count) || point_count < self.min_points {
            return false;
        }
        match self.half {
            FrameHalf::Left if first_x >= mid_x => return false,
            FrameHalf::Right if first_x <= mid_x => return false,
            _ => {}
        }
        (self.min_w..=self.max_w).contains(&b.w) && (self.min_h..=self.max_h).contains(&b.h)
    }
}

/// Shape signatures at the 1080-high reference scale. Order matters.
const CLASS_RULES: &[ClassRule] = &[
    ClassRule {
        category: ReferenceCategory::TopLine,
        vertices: &[3, 4],
        min_points: 0,
        half: FrameHalf::Any,
        min_w: 1314,
        max_w: 1449,
        min_h: 81,
        max_h: 119,
        ty_shift: 0,
        also_alt: false,
        once: false,
    },
    // Left curly bracket, near scale.
    ClassRule {
        category: ReferenceCategory::LeftCurly,
        vertices: &[6],
        min_points: 301,
        half: FrameHalf::Left,
        min_w: 301,
        max_w: 339,
        min_h: 126,
        max_h: 149,
        ty_shift: 0,
        also_alt: false,
        once: false,
    },
    // Left curly bracket, far scale.
    ClassRule {
        category: ReferenceCategory::LeftCurly,
        vertices: &[6],
        min_points: 241,
        half: FrameHalf::Left,
        min_w: 221,
        max_w: 259,
        min_h: 126,
        max_h: 149,
        ty_shift: 10,
        also_alt: false,
        once: false,
    },
    // Right curly bracket, near scale.
    ClassRule {
        category: ReferenceCategory::RightCurly,
        vertices: &[6],
        min_points: 231,
        half: FrameHalf::Right,
        min_w: 301,
        max_w: 339,
        min_h: 126,
        max_h: 149,
        ty_shift: -20,
        also_alt: false,
        once: false,
    },
    // Right curly bracket, far scale.
    ClassRule {
        category: ReferenceCategory::RightCurly,
        vertices: &[6],
        min_points: 181,
        half: FrameHalf::Right,
        min_w: 251,
        max_w: 299,
        min_h: 126,
        max_h: 149,
        ty_shift: 5,
        also_alt: false,
        once: false,
    },
    // Inner helper frame above the display.
    ClassRule {
        category: ReferenceCategory::TopHelper,
        vertices: &[4],
        min_points: 0,
        half: FrameHalf::Any,
        min_w: 261,
        max_w: 284,
        min_h: 161,
        max_h: 169,
        ty_shift: 0,
        also_alt: false,
        once: false,
    },
    // Outer helper frame; tried at two display placements.
    ClassRule {
        category: ReferenceCategory::OuterHelper,
        vertices: &[4, 6],
        min_points: 0,
        half: FrameHalf::Any,
        min_w: 286,
        max_w: 299,
        min_h: 171,
        max_h: 194,
        ty_shift: 0,
        also_alt: true,
        once: false,
    },
    ClassRule {
        category: ReferenceCategory::ManualDisplay,
        vertices: &[4],
        min_points: 0,
        half: FrameHalf::Any,
        min_w: 181,
        max_w: 219,
        min_h: 0,
        max_h: i32::MAX,
        ty_shift: 0,
        also_alt: false,
        once: false,
    },
    ClassRule {
        category: ReferenceCategory::LogoMark,
        vertices: &[5, 6],
        min_points: 0,
        half: FrameHalf::Any,
        min_w: 0,
        max_w: 99,
        min_h: 0,
        max_h: i32::MAX,
        ty_shift: 0,
        also_alt: false,
        once: true,
    },
];

pub(crate) fn to_core_contour(points: &[IpPoint<i32>]) -> Contour {
    Contour::new(points.iter().map(|p| Point2::new(p.x, p.y)).collect())
}

fn to_ip_points(contour: &Contour) -> Vec<IpPoint<i32>> {
    contour.points.iter().map(|p| IpPoint::new(p.x, p.y)).collect()
}

/// Scan a resized frame for calibration features.
///
/// An empty map is a legitimate outcome (no recognizable panel in frame),
/// not an error.
pub fn detect_reference_features(
    frame: &RgbImage,
    params: &EngineParams,
    dbg: &DebugSink,
) -> FeatureMap {
    let gray = image::imageops::grayscale(frame);
    let blurred = gaussian_blur_f32(&gray, params.blur_sigma);
    let thresh = adaptive_threshold_inv(&blurred, params.thresh_block_radius, params.thresh_bias);
    let opened = open_vertical(&thresh, params.vertical_open);
    let edges = canny(&opened, params.canny_low, params.canny_high);
    dbg.save_gray("01-edges.png", &edges);

    let mut contours: Vec<Contour> = imageproc::contours::find_contours::<i32>(&edges)
        .iter()
        .map(|c| to_core_contour(&c.points))
        .collect();
    contours.sort_by(|a, b| {
        b.area()
            .partial_cmp(&a.area())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mid_x = frame.width() as i32 / 2;
    let mut map = FeatureMap::default();

    for (i, contour) in contours
        .into_iter()
        .take(params.max_feature_candidates)
        .enumerate()
    {
        dbg.save_contour_overlay(&format!("02-candidate-{:02}.png", i + 1), frame, &contour);

        let ip = to_ip_points(&contour);
        let perimeter = arc_length(&ip, true);
        let approx = approximate_polygon_dp(&ip, params.approx_tolerance * perimeter, true);
        let bounds = to_core_contour(&approx).bounds();
        let first_x = contour.first_point().map(|p| p.x).unwrap_or(0);

        log::debug!(
            "candidate {}: {} vertices, {} points, {}x{} at x={}",
            i + 1,
            approx.len(),
            contour.len(),
            bounds.w,
            bounds.h,
            first_x
        );

        for rule in CLASS_RULES {
            if !rule.matches(approx.len(), contour.len(), first_x, mid_x, bounds) {
                continue;
            }
            if rule.once && !map.get(rule.category).is_empty() {
                break;
            }
            log::debug!("candidate {} classified as {}", i + 1, rule.category);
            if let Some(feature) =
                CalibrationFeature::from_contour(rule.category, contour.clone(), rule.ty_shift)
            {
                if rule.also_alt {
                    let mut alt = feature.clone();
                    alt.category = ReferenceCategory::OuterHelperAlt;
                    map.insert(alt);
                }
                map.insert(feature);
            }
            break;
        }
    }

    log::debug!(
        "reference categories found: {:?}",
        map.categories().collect::<Vec<_>>()
    );
    map
}
