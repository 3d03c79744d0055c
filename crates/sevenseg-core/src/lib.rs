//! Core types and utilities for seven-segment display reading.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete image type or decoder.

mod cluster;
mod geometry;
mod logger;

pub use cluster::{agglomerative_cluster, DEFAULT_CLUSTER_DISTANCE};
pub use geometry::{bounds_gap, Bounds, Contour, Extremes};
pub use logger::init_with_level;
