// src/metrics.rs - Physical crack metrics from the analysis stages

use serde::Serialize;

use crate::errors::{CrackError, Result};
use crate::mask::{BinaryMask, Skeleton};
use crate::point_analysis::Topology;
use crate::width_analysis::WidthStats;

/// Crack measurements. Area, length and widths are in physical units
/// (`pixel_scale` per pixel); counts are unscaled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub area: f64,
    pub length: f64,
    pub avg_width: f64,
    pub max_width: f64,
    pub endpoint_count: usize,
    pub branch_point_count: usize,
    pub regular_point_count: usize,
    /// Heuristic segment count, see [`estimate_branch_count`]
    pub estimated_branch_count: usize,
    /// Area divided by length: mean width of the crack as a band
    pub area_per_length_width: f64,
    pub foreground_pixels: usize,
    pub skeleton_pixels: usize,
    pub pixel_scale: f64,
}

/// Physical length of one pixel side, finite and positive once constructed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale(f64);

impl PixelScale {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(CrackError::invalid_input(format!(
                "pixel scale must be a positive number, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

/// Approximate number of crack segments from point counts.
///
/// Branch points plus one; without branch points, at least one segment per
/// endpoint pair. Not a topological invariant: closed loops have neither
/// endpoints nor branch points and count as zero.
pub fn estimate_branch_count(endpoint_count: usize, branch_point_count: usize) -> usize {
    if endpoint_count == 0 && branch_point_count == 0 {
        0
    } else if branch_point_count == 0 && endpoint_count >= 2 {
        (endpoint_count / 2).max(1)
    } else {
        branch_point_count + 1
    }
}

/// Aggregate mask, skeleton, width and topology results into [`Metrics`]
pub fn compute_metrics(
    mask: &BinaryMask,
    skeleton: &Skeleton,
    width: &WidthStats,
    topology: &Topology,
    scale: PixelScale,
) -> Metrics {
    let pixel_scale = scale.get();
    let foreground_pixels = mask.count_foreground();
    let skeleton_pixels = skeleton.pixel_count();

    let area = foreground_pixels as f64 * pixel_scale * pixel_scale;
    let length = skeleton_pixels as f64 * pixel_scale;
    let area_per_length_width = if length > 0.0 { area / length } else { 0.0 };

    Metrics {
        area,
        length,
        avg_width: width.avg_width * pixel_scale,
        max_width: width.max_width * pixel_scale,
        endpoint_count: topology.endpoint_count,
        branch_point_count: topology.branch_point_count,
        regular_point_count: topology.regular_count,
        estimated_branch_count: estimate_branch_count(
            topology.endpoint_count,
            topology.branch_point_count,
        ),
        area_per_length_width,
        foreground_pixels,
        skeleton_pixels,
        pixel_scale,
    }
}
