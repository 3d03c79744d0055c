use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// An ordered polygon traced from a binary image.
///
/// Contours are value-like and never mutated after creation; merging two
/// contours concatenates their point sets into a *new* contour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point2<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point2<i32>>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First traced point, in frame coordinates.
    pub fn first_point(&self) -> Option<Point2<i32>> {
        self.points.first().copied()
    }

    /// Axis-aligned bounding box. Empty contours get a zero box at the origin.
    pub fn bounds(&self) -> Bounds {
        let Some(first) = self.points.first() else {
            return Bounds::ZERO;
        };
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Bounds {
            x: min_x,
            y: min_y,
            w: max_x - min_x + 1,
            h: max_y - min_y + 1,
        }
    }

    /// Extreme points along each axis (first occurrence wins on ties).
    pub fn extremes(&self) -> Option<Extremes> {
        let mut it = self.points.iter().copied();
        let first = it.next()?;
        let mut e = Extremes {
            left: first,
            right: first,
            top: first,
            bottom: first,
        };
        for p in it {
            if p.x < e.left.x {
                e.left = p;
            }
            if p.x > e.right.x {
                e.right = p;
            }
            if p.y < e.top.y {
                e.top = p;
            }
            if p.y > e.bottom.y {
                e.bottom = p;
            }
        }
        Some(e)
    }

    /// Enclosed polygon area (shoelace formula, absolute value).
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let mut twice = 0i64;
        for (a, b) in self
            .points
            .iter()
            .zip(self.points.iter().cycle().skip(1))
            .take(self.points.len())
        {
            twice += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
        }
        twice.abs() as f64 * 0.5
    }

    /// Point-set concatenation; inputs stay valid.
    pub fn merged(&self, other: &Contour) -> Contour {
        let mut points = Vec::with_capacity(self.points.len() + other.points.len());
        points.extend_from_slice(&self.points);
        points.extend_from_slice(&other.points);
        Contour { points }
    }
}

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Bounds {
    pub const ZERO: Bounds = Bounds {
        x: 0,
        y: 0,
        w: 0,
        h: 0,
    };

    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.w as f32 * 0.5,
            self.y as f32 + self.h as f32 * 0.5,
        )
    }

    /// Smallest box covering both inputs.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let r = (self.x + self.w).max(other.x + other.w);
        let b = (self.y + self.h).max(other.y + other.h);
        Bounds {
            x,
            y,
            w: r - x,
            h: b - y,
        }
    }
}

/// Leftmost, rightmost, topmost and bottommost contour points.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Extremes {
    pub left: Point2<i32>,
    pub right: Point2<i32>,
    pub top: Point2<i32>,
    pub bottom: Point2<i32>,
}

impl Extremes {
    #[inline]
    pub fn width(&self) -> i32 {
        self.right.x - self.left.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bottom.y - self.top.y
    }
}

/// Gap between two bounding boxes along the dominant axis.
///
/// Negative when the boxes overlap, zero when they touch. This is the
/// clustering metric: `max(|Δcx| − (w1+w2)/2, |Δcy| − (h1+h2)/2)`.
pub fn bounds_gap(a: &Bounds, b: &Bounds) -> f32 {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    let gx = (ax - bx).abs() - (a.w + b.w) as f32 * 0.5;
    let gy = (ay - by).abs() - (a.h + b.h) as f32 * 0.5;
    gx.max(gy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect_contour(x: i32, y: i32, w: i32, h: i32) -> Contour {
        Contour::new(vec![
            Point2::new(x, y),
            Point2::new(x + w - 1, y),
            Point2::new(x + w - 1, y + h - 1),
            Point2::new(x, y + h - 1),
        ])
    }

    #[test]
    fn bounds_of_rectangle() {
        let c = rect_contour(10, 20, 5, 8);
        assert_eq!(
            c.bounds(),
            Bounds {
                x: 10,
                y: 20,
                w: 5,
                h: 8
            }
        );
    }

    #[test]
    fn extremes_of_diamond() {
        let c = Contour::new(vec![
            Point2::new(5, 0),
            Point2::new(10, 5),
            Point2::new(5, 10),
            Point2::new(0, 5),
        ]);
        let e = c.extremes().unwrap();
        assert_eq!(e.left, Point2::new(0, 5));
        assert_eq!(e.right, Point2::new(10, 5));
        assert_eq!(e.top, Point2::new(5, 0));
        assert_eq!(e.bottom, Point2::new(5, 10));
        assert_eq!(e.width(), 10);
        assert_eq!(e.height(), 10);
    }

    #[test]
    fn extremes_first_occurrence_wins_on_ties() {
        let c = Contour::new(vec![
            Point2::new(0, 1),
            Point2::new(0, 7),
            Point2::new(3, 1),
        ]);
        let e = c.extremes().unwrap();
        assert_eq!(e.left, Point2::new(0, 1));
        assert_eq!(e.top, Point2::new(0, 1));
    }

    #[test]
    fn area_of_square() {
        let c = Contour::new(vec![
            Point2::new(0, 0),
            Point2::new(10, 0),
            Point2::new(10, 10),
            Point2::new(0, 10),
        ]);
        assert_eq!(c.area(), 100.0);
    }

    #[test]
    fn merged_concatenates_and_keeps_inputs() {
        let a = rect_contour(0, 0, 2, 2);
        let b = rect_contour(10, 10, 2, 2);
        let m = a.merged(&b);
        assert_eq!(m.len(), a.len() + b.len());
        assert_eq!(a.len(), 4);
        assert_eq!(
            m.bounds(),
            Bounds {
                x: 0,
                y: 0,
                w: 12,
                h: 12
            }
        );
    }

    #[test]
    fn gap_is_negative_for_overlapping_boxes() {
        let a = Bounds {
            x: 0,
            y: 0,
            w: 10,
            h: 10,
        };
        let b = Bounds {
            x: 5,
            y: 0,
            w: 10,
            h: 10,
        };
        assert!(bounds_gap(&a, &b) < 0.0);
    }

    #[test]
    fn gap_measures_horizontal_distance() {
        let a = Bounds {
            x: 0,
            y: 0,
            w: 10,
            h: 10,
        };
        let b = Bounds {
            x: 14,
            y: 0,
            w: 10,
            h: 10,
        };
        assert_relative_eq!(bounds_gap(&a, &b), 4.0);
    }

    #[test]
    fn center_of_odd_sized_box() {
        let b = Bounds {
            x: 2,
            y: 4,
            w: 5,
            h: 3,
        };
        let (cx, cy) = b.center();
        assert_relative_eq!(cx, 4.5);
        assert_relative_eq!(cy, 5.5);
    }
}
