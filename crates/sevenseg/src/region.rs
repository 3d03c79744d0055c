//! Display region derivation.
//!
//! Each reference category carries a closed-form recipe that places the
//! display's crop rectangle relative to the feature's extreme points, in
//! multiples of the feature's own measured width/height. The coefficients
//! are calibration constants measured on reference-scale photographs; they
//! are data, not logic, so they live in one table keyed by category.

use serde::{Deserialize, Serialize};

use crate::features::{CalibrationFeature, ReferenceCategory};

/// Axis-aligned display crop rectangle in resized-frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRegion {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl DisplayRegion {
    #[inline]
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Clip to frame bounds. `None` when nothing usable remains; an
    /// out-of-frame region is a recoverable miss, not a crash.
    pub fn clipped(self, frame_w: u32, frame_h: u32) -> Option<DisplayRegion> {
        let left = self.left.max(0);
        let top = self.top.max(0);
        let right = self.right.min(frame_w as i32);
        let bottom = self.bottom.min(frame_h as i32);
        (right > left && bottom > top).then_some(DisplayRegion {
            left,
            top,
            right,
            bottom,
        })
    }
}

/// Contour retrieval mode for the glyph extractor.
///
/// Logo-adjacent crops contain nested noise, so the logo recipe keeps only
/// outermost contours; every other category uses the full list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ContourRetrieval {
    All,
    External,
}

/// Which extreme point of the feature anchors a coordinate.
#[derive(Clone, Copy, Debug)]
enum AnchorPoint {
    Left,
    Right,
    Top,
    Bottom,
}

/// A length expressed as `w·feature_width + h·feature_height + px`.
#[derive(Clone, Copy, Debug)]
struct Coeff {
    w: f32,
    h: f32,
    px: f32,
}

impl Coeff {
    const ZERO: Coeff = Coeff {
        w: 0.0,
        h: 0.0,
        px: 0.0,
    };

    const fn of_width(w: f32) -> Coeff {
        Coeff { w, h: 0.0, px: 0.0 }
    }

    const fn of_height(h: f32) -> Coeff {
        Coeff { w: 0.0, h, px: 0.0 }
    }

    const fn of_px(px: f32) -> Coeff {
        Coeff { w: 0.0, h: 0.0, px }
    }

    fn eval(&self, feat_w: i32, feat_h: i32) -> i32 {
        (self.w * feat_w as f32 + self.h * feat_h as f32 + self.px) as i32
    }
}

/// Placement recipe for one reference category.
struct RegionRecipe {
    h_anchor: AnchorPoint,
    /// When set, `dx` positions the region's *right* edge instead of its left.
    anchor_right_edge: bool,
    dx: Coeff,
    width: Coeff,
    v_anchor: AnchorPoint,
    /// Apply the feature's scale-variant vertical shift on top of `dy`.
    use_ty_shift: bool,
    dy: Coeff,
    height: Coeff,
    /// Glyphs narrower than this are treated as the thin digit "1".
    thin_digit: Coeff,
    retrieval: ContourRetrieval,
}

/// Calibration table, one row per category.
fn recipe_for(category: ReferenceCategory) -> RegionRecipe {
    match category {
        // Display sits half a line-width right of the line's left end and
        // just below its bottom edge; box units are fractions of the line.
        ReferenceCategory::TopLine => RegionRecipe {
            h_anchor: AnchorPoint::Left,
            anchor_right_edge: false,
            dx: Coeff::of_width(4.0 / 8.0),
            width: Coeff::of_width(1.0 / 8.0),
            v_anchor: AnchorPoint::Bottom,
            use_ty_shift: false,
            dy: Coeff::of_width(2.3 / 16.0),
            height: Coeff::of_width(1.0 / 16.0),
            thin_digit: Coeff::of_width(1.0 / 65.0),
            retrieval: ContourRetrieval::All,
        },
        ReferenceCategory::LeftCurly => RegionRecipe {
            h_anchor: AnchorPoint::Right,
            anchor_right_edge: false,
            dx: Coeff::of_width(1.3 / 2.1),
            width: Coeff::of_width(1.0 / 2.1),
            v_anchor: AnchorPoint::Right,
            use_ty_shift: true,
            dy: Coeff::ZERO,
            height: Coeff::of_width(1.0 / 3.2),
            thin_digit: Coeff::of_width(1.0 / 15.0),
            retrieval: ContourRetrieval::All,
        },
        ReferenceCategory::RightCurly => RegionRecipe {
            h_anchor: AnchorPoint::Left,
            anchor_right_edge: true,
            dx: Coeff::of_width(-0.3 / 2.3),
            width: Coeff::of_width(1.0 / 2.3),
            v_anchor: AnchorPoint::Left,
            use_ty_shift: true,
            dy: Coeff::ZERO,
            height: Coeff::of_width(1.0 / 3.4),
            thin_digit: Coeff::of_width(1.0 / 15.0),
            retrieval: ContourRetrieval::All,
        },
        ReferenceCategory::OuterHelper => RegionRecipe {
            h_anchor: AnchorPoint::Left,
            anchor_right_edge: false,
            dx: Coeff::of_px(40.0),
            width: Coeff {
                w: 0.6,
                h: 0.0,
                px: -40.0,
            },
            v_anchor: AnchorPoint::Bottom,
            use_ty_shift: false,
            dy: Coeff::of_height(1.2),
            height: Coeff::of_height(0.55),
            thin_digit: Coeff::of_width(1.0 / 14.0),
            retrieval: ContourRetrieval::All,
        },
        ReferenceCategory::OuterHelperAlt => RegionRecipe {
            h_anchor: AnchorPoint::Left,
            anchor_right_edge: false,
            dx: Coeff::of_width(1.0 / 3.2),
            width: Coeff::of_width(1.0 - 0.25 - 1.0 / 3.2),
            v_anchor: AnchorPoint::Bottom,
            use_ty_shift: false,
            dy: Coeff::of_height(1.5),
            height: Coeff::of_height(0.5),
            thin_digit: Coeff::of_width(1.0 / 14.0),
            retrieval: ContourRetrieval::All,
        },
        ReferenceCategory::TopHelper => RegionRecipe {
            h_anchor: AnchorPoint::Left,
            anchor_right_edge: false,
            dx: Coeff::of_px(20.0),
            width: Coeff {
                w: 0.6,
                h: 0.0,
                px: -20.0,
            },
            v_anchor: AnchorPoint::Bottom,
            use_ty_shift: false,
            dy: Coeff::of_height(1.375),
            height: Coeff::of_height(0.55),
            thin_digit: Coeff::of_width(1.0 / 14.0),
            retrieval: ContourRetrieval::All,
        },
        ReferenceCategory::ManualDisplay => RegionRecipe {
            h_anchor: AnchorPoint::Left,
            anchor_right_edge: false,
            dx: Coeff::of_width(0.1),
            width: Coeff {
                w: 1.0 - 1.0 / 3.5 - 0.1,
                h: 0.0,
                px: 1.0,
            },
            v_anchor: AnchorPoint::Top,
            use_ty_shift: false,
            dy: Coeff::of_px(20.0),
            height: Coeff {
                w: 0.0,
                h: 1.0,
                px: -40.0,
            },
            thin_digit: Coeff::of_width(0.1),
            retrieval: ContourRetrieval::All,
        },
        ReferenceCategory::LogoMark => RegionRecipe {
            h_anchor: AnchorPoint::Right,
            anchor_right_edge: false,
            dx: Coeff::of_width(2.4),
            width: Coeff::of_width(2.4),
            v_anchor: AnchorPoint::Bottom,
            use_ty_shift: false,
            dy: Coeff::of_height(1.6),
            height: Coeff::of_height(1.2),
            thin_digit: Coeff::of_width(1.0 / 3.0),
            retrieval: ContourRetrieval::External,
        },
    }
}

/// A resolved display region plus the decode hints that travel with it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ResolvedRegion {
    pub rect: DisplayRegion,
    pub thin_digit_width: i32,
    pub retrieval: ContourRetrieval,
}

/// Apply the category's recipe to one feature, clipped to frame bounds.
pub(crate) fn resolve_region(
    feature: &CalibrationFeature,
    frame_w: u32,
    frame_h: u32,
) -> Option<ResolvedRegion> {
    let recipe = recipe_for(feature.category);
    let (fw, fh) = (feature.width, feature.height);

    let anchor = |which: AnchorPoint| match which {
        AnchorPoint::Left => feature.extremes.left,
        AnchorPoint::Right => feature.extremes.right,
        AnchorPoint::Top => feature.extremes.top,
        AnchorPoint::Bottom => feature.extremes.bottom,
    };

    let width = recipe.width.eval(fw, fh);
    let ax = anchor(recipe.h_anchor).x;
    let (left, right) = if recipe.anchor_right_edge {
        let right = ax + recipe.dx.eval(fw, fh);
        (right - width, right)
    } else {
        let left = ax + recipe.dx.eval(fw, fh);
        (left, left + width)
    };

    let mut top = anchor(recipe.v_anchor).y + recipe.dy.eval(fw, fh);
    if recipe.use_ty_shift {
        top += feature.ty_shift;
    }
    let bottom = top + recipe.height.eval(fw, fh);

    let rect = DisplayRegion {
        left,
        top,
        right,
        bottom,
    }
    .clipped(frame_w, frame_h)?;

    Some(ResolvedRegion {
        rect,
        thin_digit_width: recipe.thin_digit.eval(fw, fh).max(0),
        retrieval: recipe.retrieval,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use sevenseg_core::Contour;

    fn feature(
        category: ReferenceCategory,
        left: (i32, i32),
        right: (i32, i32),
        top: (i32, i32),
        bottom: (i32, i32),
        ty_shift: i32,
    ) -> CalibrationFeature {
        let contour = Contour::new(vec![
            Point2::new(left.0, left.1),
            Point2::new(right.0, right.1),
            Point2::new(top.0, top.1),
            Point2::new(bottom.0, bottom.1),
        ]);
        CalibrationFeature::from_contour(category, contour, ty_shift).unwrap()
    }

    #[test]
    fn left_curly_places_display_right_of_bracket() {
        // width 320: box_w = 152, box_h = 100, dx = 198.
        let f = feature(
            ReferenceCategory::LeftCurly,
            (60, 150),
            (380, 100),
            (200, 40),
            (220, 190),
            0,
        );
        let r = resolve_region(&f, 1920, 1080).unwrap();
        assert_eq!(r.rect.left, 380 + 198);
        assert_eq!(r.rect.width(), 152);
        assert_eq!(r.rect.top, 100);
        assert_eq!(r.rect.height(), 100);
        assert_eq!(r.thin_digit_width, 21);
        assert_eq!(r.retrieval, ContourRetrieval::All);
    }

    #[test]
    fn curly_shift_moves_the_region_down() {
        let base = feature(
            ReferenceCategory::LeftCurly,
            (60, 150),
            (380, 100),
            (200, 40),
            (220, 190),
            0,
        );
        let shifted = feature(
            ReferenceCategory::LeftCurly,
            (60, 150),
            (380, 100),
            (200, 40),
            (220, 190),
            10,
        );
        let a = resolve_region(&base, 1920, 1080).unwrap();
        let b = resolve_region(&shifted, 1920, 1080).unwrap();
        assert_eq!(b.rect.top, a.rect.top + 10);
        assert_eq!(b.rect.height(), a.rect.height());
    }

    #[test]
    fn right_curly_anchors_the_right_edge() {
        // width 330: box_w = 143, right edge = left.x - 43.
        let f = feature(
            ReferenceCategory::RightCurly,
            (900, 150),
            (1230, 100),
            (1000, 40),
            (1100, 190),
            0,
        );
        let r = resolve_region(&f, 1920, 1080).unwrap();
        assert_eq!(r.rect.right, 900 - 43);
        assert_eq!(r.rect.width(), 143);
        assert_eq!(r.rect.top, 150);
    }

    #[test]
    fn manual_display_insets_the_feature_box() {
        let f = feature(
            ReferenceCategory::ManualDisplay,
            (500, 300),
            (700, 310),
            (600, 250),
            (620, 450),
            0,
        );
        let r = resolve_region(&f, 1920, 1080).unwrap();
        assert_eq!(r.rect.left, 500 + 20); // width 200 / 10
        assert_eq!(r.rect.top, 250 + 20);
        assert_eq!(r.rect.bottom, 250 + 20 + (200 - 40));
        assert_eq!(r.thin_digit_width, 20);
    }

    #[test]
    fn logo_mark_uses_outer_contours_only() {
        let f = feature(
            ReferenceCategory::LogoMark,
            (1320, 330),
            (1400, 300),
            (1350, 280),
            (1380, 360),
            0,
        );
        let r = resolve_region(&f, 1920, 1080).unwrap();
        assert_eq!(r.retrieval, ContourRetrieval::External);
        assert_eq!(r.rect.left, 1400 + 192); // 2.4 × width 80
        assert_eq!(r.rect.width(), 192);
        assert_eq!(r.rect.top, 360 + 128); // 1.6 × height 80
        assert_eq!(r.rect.height(), 96);
    }

    #[test]
    fn out_of_frame_region_is_rejected() {
        let f = feature(
            ReferenceCategory::LogoMark,
            (1850, 330),
            (1919, 300),
            (1870, 280),
            (1880, 360),
            0,
        );
        assert!(resolve_region(&f, 1920, 360).is_none());
    }

    #[test]
    fn clipping_trims_partial_overflow() {
        let rect = DisplayRegion {
            left: -10,
            top: 5,
            right: 50,
            bottom: 2000,
        };
        let clipped = rect.clipped(100, 100).unwrap();
        assert_eq!(clipped.left, 0);
        assert_eq!(clipped.bottom, 100);
    }

    #[test]
    fn every_category_has_a_recipe() {
        for category in ReferenceCategory::PRIORITY {
            // A generous fake feature; recipes must all evaluate.
            let f = feature(category, (400, 500), (800, 480), (600, 400), (620, 620), 0);
            let _ = resolve_region(&f, 1920, 1080);
        }
    }
}
