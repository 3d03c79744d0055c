//! Optional dumps of intermediate pipeline images.
//!
//! A disabled sink is free; every save call checks the target directory
//! first. Save failures are logged and swallowed so a full disk never
//! breaks recognition.

use std::path::PathBuf;

use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use sevenseg_core::Contour;

/// Destination for intermediate images (edge maps, candidate overlays,
/// binarized display crops).
#[derive(Clone, Debug, Default)]
pub struct DebugSink {
    dir: Option<PathBuf>,
    display_archive: Option<PathBuf>,
}

impl DebugSink {
    /// A sink that drops everything.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Dump into `dir`, creating it if needed. Falls back to disabled when
    /// the directory cannot be created.
    pub fn to_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(err) = std::fs::create_dir_all(&dir) {
            log::warn!("cannot create debug directory {}: {err}", dir.display());
            return Self::disabled();
        }
        Self {
            dir: Some(dir),
            display_archive: None,
        }
    }

    /// Additionally archive the winning display crop to this exact path,
    /// independent of the dump directory.
    pub fn with_display_archive(mut self, path: impl Into<PathBuf>) -> Self {
        self.display_archive = Some(path.into());
        self
    }

    /// Build a sink from `SEVENSEG_DEBUG_DIR` and `SEVENSEG_SAVE_DISPLAY`;
    /// disabled when both are unset or empty.
    pub fn from_env() -> Self {
        let mut sink = match std::env::var("SEVENSEG_DEBUG_DIR") {
            Ok(dir) if !dir.is_empty() => Self::to_dir(dir),
            _ => Self::disabled(),
        };
        if let Ok(path) = std::env::var("SEVENSEG_SAVE_DISPLAY") {
            if !path.is_empty() {
                sink = sink.with_display_archive(path);
            }
        }
        sink
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some() || self.display_archive.is_some()
    }

    /// Archive the current display crop; each attempt overwrites the
    /// previous one, so the file reflects the last region examined.
    pub(crate) fn archive_display(&self, crop: &RgbImage) {
        let Some(path) = &self.display_archive else {
            return;
        };
        if let Err(err) = crop.save(path) {
            log::warn!("display archive {} failed: {err}", path.display());
        }
    }

    pub(crate) fn save_gray(&self, name: &str, img: &GrayImage) {
        let Some(dir) = &self.dir else { return };
        let path = dir.join(name);
        if let Err(err) = img.save(&path) {
            log::warn!("debug dump {} failed: {err}", path.display());
        }
    }

    pub(crate) fn save_rgb(&self, name: &str, img: &RgbImage) {
        let Some(dir) = &self.dir else { return };
        let path = dir.join(name);
        if let Err(err) = img.save(&path) {
            log::warn!("debug dump {} failed: {err}", path.display());
        }
    }

    /// Draw the contour's points and bounding box over a copy of the frame.
    pub(crate) fn save_contour_overlay(&self, name: &str, frame: &RgbImage, contour: &Contour) {
        if self.dir.is_none() {
            return;
        }
        let mut canvas = frame.clone();
        let highlight = Rgb([255u8, 0, 0]);
        for p in &contour.points {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < canvas.width() && (p.y as u32) < canvas.height()
            {
                canvas.put_pixel(p.x as u32, p.y as u32, highlight);
            }
        }
        let b = contour.bounds();
        if b.w > 0 && b.h > 0 {
            draw_hollow_rect_mut(
                &mut canvas,
                Rect::at(b.x, b.y).of_size(b.w as u32, b.h as u32),
                highlight,
            );
        }
        self.save_rgb(name, &canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn disabled_sink_saves_nothing() {
        let sink = DebugSink::disabled();
        assert!(!sink.is_enabled());
        // Must be a no-op, not a panic.
        sink.save_gray("x.png", &GrayImage::new(4, 4));
    }

    #[test]
    fn sink_writes_into_its_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DebugSink::to_dir(tmp.path().join("dumps"));
        assert!(sink.is_enabled());
        sink.save_gray("edges.png", &GrayImage::new(8, 8));
        assert!(tmp.path().join("dumps/edges.png").exists());
    }

    #[test]
    fn overlay_handles_out_of_frame_points() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DebugSink::to_dir(tmp.path());
        let contour = Contour::new(vec![Point2::new(-5, 2), Point2::new(3, 3)]);
        sink.save_contour_overlay("c.png", &RgbImage::new(8, 8), &contour);
        assert!(tmp.path().join("c.png").exists());
    }
}
