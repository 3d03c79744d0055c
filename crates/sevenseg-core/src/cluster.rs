//! Single-linkage agglomerative clustering of contour fragments.
//!
//! Edge tracing on worn display segments often splits one glyph into
//! several fragments. Fragments whose bounding boxes are close (gap below a
//! threshold, negative when overlapping) are merged back into a single
//! contour by repeatedly joining the closest pair.

use crate::geometry::{bounds_gap, Contour};

/// Default merge threshold in pixels at the reference frame scale.
pub const DEFAULT_CLUSTER_DISTANCE: f32 = 40.0;

/// Merge nearby contours until the closest remaining pair is at least
/// `threshold_distance` apart (or one contour remains).
///
/// Selection is deterministic: among equally close pairs the first in scan
/// order wins. A single-element input is returned unchanged.
pub fn agglomerative_cluster(contours: Vec<Contour>, threshold_distance: f32) -> Vec<Contour> {
    let mut current = contours;

    while current.len() > 1 {
        let mut min_distance = f32::INFINITY;
        let mut min_pair = (0usize, 0usize);

        let boxes: Vec<_> = current.iter().map(Contour::bounds).collect();
        for x in 0..current.len() - 1 {
            for y in x + 1..current.len() {
                let distance = bounds_gap(&boxes[x], &boxes[y]);
                if distance < min_distance {
                    min_distance = distance;
                    min_pair = (x, y);
                }
            }
        }

        if min_distance < threshold_distance {
            let (i, j) = min_pair;
            current[i] = current[i].merged(&current[j]);
            current.remove(j);
        } else {
            break;
        }
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn rect_contour(x: i32, y: i32, w: i32, h: i32) -> Contour {
        Contour::new(vec![
            Point2::new(x, y),
            Point2::new(x + w - 1, y),
            Point2::new(x + w - 1, y + h - 1),
            Point2::new(x, y + h - 1),
        ])
    }

    #[test]
    fn single_contour_is_returned_unchanged() {
        let c = rect_contour(3, 4, 10, 20);
        let out = agglomerative_cluster(vec![c.clone()], 3.0);
        assert_eq!(out, vec![c]);
    }

    #[test]
    fn close_pair_merges_into_union_box() {
        // Boxes 2 px apart, threshold 3: one merged contour covering both.
        let a = rect_contour(0, 0, 10, 10);
        let b = rect_contour(12, 0, 10, 10);
        let expected = a.bounds().union(&b.bounds());

        let out = agglomerative_cluster(vec![a, b], 3.0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bounds(), expected);
    }

    #[test]
    fn pair_at_threshold_stays_separate() {
        let a = rect_contour(0, 0, 10, 10);
        let b = rect_contour(13, 0, 10, 10); // gap exactly 3.0
        let out = agglomerative_cluster(vec![a, b], 3.0);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn overlapping_fragments_collapse() {
        let fragments = vec![
            rect_contour(0, 0, 20, 30),
            rect_contour(5, 10, 20, 30),
            rect_contour(10, 20, 20, 30),
        ];
        let out = agglomerative_cluster(fragments, 3.0);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn distant_groups_survive() {
        let out = agglomerative_cluster(
            vec![rect_contour(0, 0, 10, 10), rect_contour(200, 0, 10, 10)],
            40.0,
        );
        assert_eq!(out.len(), 2);
    }
}
