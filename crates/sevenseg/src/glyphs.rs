//! Glyph extraction from a binarized display crop.

use image::GrayImage;
use sevenseg_core::{agglomerative_cluster, Bounds, Contour};

use crate::features::to_core_contour;
use crate::params::EngineParams;
use crate::region::ContourRetrieval;

/// Extract candidate glyph boxes from a binarized display crop, sorted
/// left to right.
///
/// Sharp photographs split each digit's strokes into many small contours;
/// when the crop yields at least `cluster_trigger` of them the fragments
/// are merged back into whole glyphs before the size gate runs.
pub(crate) fn extract_glyphs(
    bin: &GrayImage,
    retrieval: ContourRetrieval,
    params: &EngineParams,
) -> Vec<Bounds> {
    let traced = imageproc::contours::find_contours::<i32>(bin);
    let mut contours: Vec<Contour> = traced
        .iter()
        .filter(|c| match retrieval {
            ContourRetrieval::All => true,
            ContourRetrieval::External => c.parent.is_none(),
        })
        .map(|c| to_core_contour(&c.points))
        .filter(|c| !c.is_empty())
        .collect();

    if contours.len() >= params.cluster_trigger {
        log::debug!(
            "clustering {} fragments (threshold {})",
            contours.len(),
            params.cluster_distance
        );
        contours = agglomerative_cluster(contours, params.cluster_distance);
    }

    let mut glyphs: Vec<Bounds> = contours
        .iter()
        .map(Contour::bounds)
        .filter(|b| params.glyph_size_ok(b.w, b.h))
        .collect();
    glyphs.sort_by_key(|b| b.x);
    log::debug!("{} glyph-sized boxes after size gate", glyphs.len());
    glyphs
}
